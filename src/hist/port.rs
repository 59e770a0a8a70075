// Port frequency histogram
//
// Counts TCP ports per the configured role filter and renders the
// top-N busiest ports as a bar chart. Packets that do not parse as
// IPv4+TCP are silently skipped; heterogeneous traffic is expected.

use ratatui::buffer::Buffer;
use ratatui::style::{Color, Style};

use crate::counter::RankedCounter;
use crate::hist::RoleFilter;
use crate::packet::{self, PacketInfo};
use crate::plot::{self, Bounds};
use crate::report::ReportConfig;

#[derive(Debug, Clone)]
pub struct PortHistogram {
    title: String,
    role: RoleFilter,
    counter: RankedCounter<u16>,
}

impl PortHistogram {
    pub fn new(role: RoleFilter, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            role,
            counter: RankedCounter::new(),
        }
    }

    /// Count the packet's TCP port(s) per the role filter. Non-TCP or
    /// unparseable packets are a no-op.
    pub fn ingest(&mut self, pi: &PacketInfo<'_>) {
        let Some(ip) = packet::ipv4(pi.captured()) else {
            return;
        };
        let Some((sport, dport)) = packet::tcp_ports(&ip) else {
            return;
        };

        if self.role.counts_sender() {
            self.counter.record(sport);
        }
        if self.role.counts_receiver() {
            self.counter.record(dport);
        }
    }

    pub fn top_n(&self, n: usize) -> Vec<(u16, u64)> {
        self.counter.top_n(n)
    }

    pub fn total(&self) -> u64 {
        self.counter.total()
    }

    /// Draw the chart frame, ranked bars and a port label row.
    pub fn render(&self, buf: &mut Buffer, bounds: &Bounds, conf: &ReportConfig) {
        let content = plot::render_frame(buf, bounds, &self.title);
        let ranked = self.top_n(conf.max_bars);
        render_labeled_bars(
            buf,
            &content,
            &ranked
                .iter()
                .map(|(port, count)| (port.to_string(), *count))
                .collect::<Vec<_>>(),
            conf.bar_space_factor,
        );
    }
}

/// Shared bar-plus-label drawing for the ranked histograms: bars fill
/// the content region except for one bottom row holding each bar's key
/// label, clipped to the bar slot width.
pub(super) fn render_labeled_bars(
    buf: &mut Buffer,
    content: &Bounds,
    ranked: &[(String, u64)],
    bar_space_factor: f64,
) {
    if ranked.is_empty() {
        return;
    }

    let label_rows = if content.height > 2.0 { 1.0 } else { 0.0 };
    let bars_bounds = Bounds::new(
        content.x,
        content.y,
        content.width,
        content.height - label_rows,
    );
    let counts: Vec<u64> = ranked.iter().map(|(_, count)| *count).collect();
    plot::render_bars(
        buf,
        &bars_bounds,
        &counts,
        bar_space_factor,
        Style::default().fg(Color::Cyan),
    );

    if label_rows > 0.0 {
        let offset_unit = content.width / ranked.len() as f64;
        let label_y = content.y + content.height - 1.0;
        for (i, (label, _)) in ranked.iter().enumerate() {
            plot::draw_text(
                buf,
                content.x + i as f64 * offset_unit,
                label_y,
                offset_unit,
                label,
                Style::default().fg(Color::Gray),
            );
        }
    }
}
