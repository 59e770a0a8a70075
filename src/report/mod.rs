// One-page report orchestrator
//
// Owns the aggregate counters and one instance of every summary
// component, fans each ingested packet out to them, and drives a single
// top-to-bottom render pass over a bounded page. The pass is a fold
// over an ordered list of section functions; each section draws inside
// the remaining bounds and reports the vertical space it consumed,
// which advances the shared layout cursor.

pub mod config;

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use thiserror::Error;

use crate::hist::{AddressHistogram, BandwidthHistogram, Packetfall, PortHistogram, RoleFilter};
use crate::packet::{self, PacketInfo, IPPROTO_TCP, IPPROTO_UDP};
use crate::plot::{self, Bounds};

pub use config::ReportConfig;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("invalid report configuration: {0}")]
    Config(String),

    #[error("report already rendered; ingestion is closed")]
    AlreadyRendered,

    #[error("failed to write report artifact: {0}")]
    Io(#[from] io::Error),
}

/// Aggregates per-packet telemetry and renders it as one page.
///
/// Lifecycle: construct, call `ingest_packet` any number of times, then
/// `render` exactly once. Ingestion after rendering is rejected; the
/// aggregate state is frozen once a pass has run.
pub struct OnePageReport {
    conf: ReportConfig,
    source_identifier: String,
    packet_count: u64,
    byte_count: u64,
    earliest: Option<u64>,
    latest: Option<u64>,
    transport_counts: HashMap<u8, u64>,
    bandwidth: BandwidthHistogram,
    src_addr_histogram: AddressHistogram,
    dst_addr_histogram: AddressHistogram,
    src_port_histogram: PortHistogram,
    dst_port_histogram: PortHistogram,
    pfall: Packetfall,
    rendered: bool,
}

/// Read-only view of the aggregate state handed to section functions.
///
/// Sections get exactly the fields they need to draw; none of them can
/// mutate the report or each other.
struct ReportView<'a> {
    conf: &'a ReportConfig,
    source_identifier: &'a str,
    packet_count: u64,
    byte_count: u64,
    earliest: Option<u64>,
    latest: Option<u64>,
    transport_counts: &'a HashMap<u8, u64>,
    bandwidth: &'a BandwidthHistogram,
    src_addr_histogram: &'a AddressHistogram,
    dst_addr_histogram: &'a AddressHistogram,
    src_port_histogram: &'a PortHistogram,
    dst_port_histogram: &'a PortHistogram,
    pfall: &'a Packetfall,
}

/// A section draws inside the remaining bounds and returns the vertical
/// space it consumed, inter-section pad included.
type SectionFn = fn(&ReportView<'_>, &mut Buffer, Bounds) -> f64;

/// Fixed top-to-bottom section order of the page.
const SECTIONS: [(&str, SectionFn); 6] = [
    ("header", render_header),
    ("bandwidth", render_bandwidth_histogram),
    ("addresses", render_address_histograms),
    ("ports", render_port_histograms),
    ("map", render_map),
    ("flows", render_packetfall),
];

impl OnePageReport {
    pub fn new(
        conf: ReportConfig,
        source_identifier: impl Into<String>,
    ) -> Result<Self, ReportError> {
        conf.validate()?;
        Ok(Self {
            conf,
            source_identifier: source_identifier.into(),
            packet_count: 0,
            byte_count: 0,
            earliest: None,
            latest: None,
            transport_counts: HashMap::new(),
            bandwidth: BandwidthHistogram::new(),
            src_addr_histogram: AddressHistogram::new(RoleFilter::Sender, "top source addresses"),
            dst_addr_histogram: AddressHistogram::new(
                RoleFilter::Receiver,
                "top destination addresses",
            ),
            src_port_histogram: PortHistogram::new(RoleFilter::Sender, "top source ports"),
            dst_port_histogram: PortHistogram::new(RoleFilter::Receiver, "top destination ports"),
            pfall: Packetfall::new(),
            rendered: false,
        })
    }

    pub fn packet_count(&self) -> u64 {
        self.packet_count
    }

    pub fn byte_count(&self) -> u64 {
        self.byte_count
    }

    /// Fold one packet into the aggregate state and fan it out to every
    /// summary component.
    pub fn ingest_packet(&mut self, pi: &PacketInfo<'_>) -> Result<(), ReportError> {
        if self.rendered {
            return Err(ReportError::AlreadyRendered);
        }

        self.packet_count += 1;
        self.byte_count += pi.caplen as u64;
        // First packet initializes both bounds; later packets only widen.
        self.earliest = Some(self.earliest.map_or(pi.ts_micros, |t| t.min(pi.ts_micros)));
        self.latest = Some(self.latest.map_or(pi.ts_micros, |t| t.max(pi.ts_micros)));

        if let Some(ip) = packet::ipv4(pi.captured()) {
            *self.transport_counts.entry(ip.protocol).or_insert(0) += 1;
        }

        self.bandwidth.ingest(pi);
        self.src_addr_histogram.ingest(pi);
        self.dst_addr_histogram.ingest(pi);
        self.src_port_histogram.ingest(pi);
        self.dst_port_histogram.ingest(pi);
        self.pfall.ingest(pi);
        Ok(())
    }

    /// Run one render pass and write the finished page to `path`.
    ///
    /// The artifact is written to a temporary sibling and atomically
    /// renamed into place, so a failed pass never leaves a partial file
    /// at the final path.
    pub fn render(&mut self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        self.rendered = true;

        let page = Rect::new(
            0,
            0,
            self.conf.page_width.round() as u16,
            self.conf.page_height.round() as u16,
        );
        let mut buf = Buffer::empty(page);
        let end_of_content = self.run_pass(&mut buf);

        tracing::info!(
            packets = self.packet_count,
            bytes = self.byte_count,
            end_of_content,
            "render pass complete"
        );
        write_artifact(&buf, path.as_ref())?;
        Ok(())
    }

    /// Fold the section list over the page, threading the layout cursor
    /// through each call. Returns the final cursor position.
    fn run_pass(&self, buf: &mut Buffer) -> f64 {
        let view = self.view();
        let margin = self.conf.page_width * self.conf.page_margin_factor;
        let content = Bounds::new(
            margin,
            margin,
            self.conf.page_width - 2.0 * margin,
            self.conf.page_height - 2.0 * margin,
        );

        let mut end_of_content = 0.0_f64;
        for (name, section) in SECTIONS {
            let remaining = Bounds::new(
                content.x,
                content.y + end_of_content,
                content.width,
                content.height - end_of_content,
            );
            if remaining.height <= 0.0 {
                tracing::warn!(section = name, "page exhausted, section skipped");
                continue;
            }
            let consumed = section(&view, buf, remaining);
            // Pad overshoot at the bottom edge clamps to the page.
            end_of_content = (end_of_content + consumed).min(content.height);
        }
        end_of_content
    }

    fn view(&self) -> ReportView<'_> {
        ReportView {
            conf: &self.conf,
            source_identifier: &self.source_identifier,
            packet_count: self.packet_count,
            byte_count: self.byte_count,
            earliest: self.earliest,
            latest: self.latest,
            transport_counts: &self.transport_counts,
            bandwidth: &self.bandwidth,
            src_addr_histogram: &self.src_addr_histogram,
            dst_addr_histogram: &self.dst_addr_histogram,
            src_port_histogram: &self.src_port_histogram,
            dst_port_histogram: &self.dst_port_histogram,
            pfall: &self.pfall,
        }
    }
}

// ============================================================================
// Section functions
// ============================================================================

fn render_header(view: &ReportView<'_>, buf: &mut Buffer, remaining: Bounds) -> f64 {
    let conf = view.conf;
    let line_space = conf.header_font_size * conf.line_space_factor;
    let lines = header_lines(view);
    let needed = lines.len() as f64 * line_space;
    if needed > remaining.height {
        tracing::warn!("header does not fit, section skipped");
        return 0.0;
    }

    for (i, line) in lines.iter().enumerate() {
        let style = if i == 0 {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        plot::draw_text(
            buf,
            remaining.x,
            remaining.y + i as f64 * line_space,
            remaining.width,
            line,
            style,
        );
    }
    needed * conf.histogram_pad_factor_y
}

fn header_lines(view: &ReportView<'_>) -> Vec<String> {
    let tcp = view.transport_counts.get(&IPPROTO_TCP).copied().unwrap_or(0);
    let udp = view.transport_counts.get(&IPPROTO_UDP).copied().unwrap_or(0);
    let other = view.transport_counts.values().sum::<u64>() - tcp - udp;

    let span = match (view.earliest, view.latest) {
        (Some(earliest), Some(latest)) => format!(
            "capture span: {:.1} s (epoch {}..{})",
            (latest - earliest) as f64 / 1e6,
            earliest / 1_000_000,
            latest / 1_000_000,
        ),
        _ => "capture span: no packets".to_string(),
    };

    vec![
        format!("one-page traffic report v{}", env!("CARGO_PKG_VERSION")),
        format!("source: {}", view.source_identifier),
        format!(
            "{} packets, {}",
            view.packet_count,
            config::format_bytes(view.byte_count)
        ),
        format!("transport: {tcp} TCP, {udp} UDP, {other} other"),
        span,
    ]
}

fn render_bandwidth_histogram(view: &ReportView<'_>, buf: &mut Buffer, remaining: Bounds) -> f64 {
    let height = view.conf.bandwidth_histogram_height;
    if height > remaining.height {
        tracing::warn!("bandwidth histogram does not fit, section skipped");
        return 0.0;
    }
    let strip = Bounds::new(remaining.x, remaining.y, remaining.width, height);
    view.bandwidth.render(buf, &strip);
    height * view.conf.histogram_pad_factor_y
}

fn render_address_histograms(view: &ReportView<'_>, buf: &mut Buffer, remaining: Bounds) -> f64 {
    let conf = view.conf;
    let height = conf.address_histogram_height;
    if height > remaining.height {
        tracing::warn!("address histograms do not fit, section skipped");
        return 0.0;
    }

    let width = remaining.width / conf.address_histogram_width_divisor;
    let left = Bounds::new(remaining.x, remaining.y, width, height);
    let right = Bounds::new(
        remaining.x + remaining.width - width,
        remaining.y,
        width,
        height,
    );
    view.src_addr_histogram.render(buf, &left, conf);
    view.dst_addr_histogram.render(buf, &right, conf);
    height * conf.histogram_pad_factor_y
}

fn render_port_histograms(view: &ReportView<'_>, buf: &mut Buffer, remaining: Bounds) -> f64 {
    let conf = view.conf;
    let height = conf.port_histogram_height;
    if height > remaining.height {
        tracing::warn!("port histograms do not fit, section skipped");
        return 0.0;
    }

    let width = remaining.width / conf.address_histogram_width_divisor;
    let left = Bounds::new(remaining.x, remaining.y, width, height);
    let right = Bounds::new(
        remaining.x + remaining.width - width,
        remaining.y,
        width,
        height,
    );
    view.src_port_histogram.render(buf, &left, conf);
    view.dst_port_histogram.render(buf, &right, conf);
    height * conf.histogram_pad_factor_y
}

fn render_map(_view: &ReportView<'_>, _buf: &mut Buffer, _remaining: Bounds) -> f64 {
    // Reserved slot in the section order; there is no map data source
    // yet, so the section draws nothing and consumes no space.
    0.0
}

fn render_packetfall(view: &ReportView<'_>, buf: &mut Buffer, remaining: Bounds) -> f64 {
    let height = view.conf.packetfall_height.min(remaining.height);
    if height < 3.0 {
        tracing::warn!("flow-fall does not fit, section skipped");
        return 0.0;
    }
    let strip = Bounds::new(remaining.x, remaining.y, remaining.width, height);
    view.pfall.render(buf, &strip);
    height * view.conf.histogram_pad_factor_y
}

// ============================================================================
// Artifact output
// ============================================================================

/// Serialize the finished page to text lines and atomically move it
/// into place.
fn write_artifact(buf: &Buffer, path: &Path) -> io::Result<()> {
    let area = buf.area;
    let mut out = String::with_capacity((area.width as usize + 1) * area.height as usize);
    for y in area.top()..area.bottom() {
        let mut line = String::with_capacity(area.width as usize);
        for x in area.left()..area.right() {
            line.push_str(buf[(x, y)].symbol());
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "output path has no file name")
    })?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    fs::write(&tmp, out.as_bytes())?;
    fs::rename(&tmp, path)?;
    Ok(())
}
