// Bandwidth-over-time histogram
//
// Ingestion buckets captured bytes per whole second; rendering
// re-buckets the capture span into at most one column per content cell
// and draws the columns as contiguous normalized bars.

use std::collections::BTreeMap;

use ratatui::buffer::Buffer;
use ratatui::style::{Color, Style};

use crate::packet::PacketInfo;
use crate::plot::{self, Bounds};

const MICROS_PER_SECOND: u64 = 1_000_000;

#[derive(Debug, Clone, Default)]
pub struct BandwidthHistogram {
    // second since epoch -> captured bytes in that second
    buckets: BTreeMap<u64, u64>,
}

impl BandwidthHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest(&mut self, pi: &PacketInfo<'_>) {
        let second = pi.ts_micros / MICROS_PER_SECOND;
        *self.buckets.entry(second).or_insert(0) += pi.caplen as u64;
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total bytes across the capture.
    pub fn total_bytes(&self) -> u64 {
        self.buckets.values().sum()
    }

    /// Seconds between the first and last bucket, inclusive.
    pub fn span_seconds(&self) -> u64 {
        match (self.buckets.keys().next(), self.buckets.keys().next_back()) {
            (Some(first), Some(last)) => last - first + 1,
            _ => 0,
        }
    }

    /// Fold the per-second buckets into at most `columns` time-ordered
    /// columns covering the whole span.
    pub fn columns(&self, columns: usize) -> Vec<u64> {
        if columns == 0 || self.buckets.is_empty() {
            return Vec::new();
        }

        let first = *self.buckets.keys().next().unwrap_or(&0);
        let span = self.span_seconds();
        let columns = columns.min(span as usize).max(1);
        let mut out = vec![0u64; columns];
        for (second, bytes) in &self.buckets {
            let col = ((second - first) * columns as u64 / span) as usize;
            out[col.min(columns - 1)] += bytes;
        }
        out
    }

    pub fn render(&self, buf: &mut Buffer, bounds: &Bounds) {
        let content = plot::render_frame(buf, bounds, "bandwidth over time");
        if self.is_empty() || content.height < 2.0 {
            return;
        }

        let bars_bounds = Bounds::new(
            content.x,
            content.y,
            content.width,
            content.height - 1.0,
        );
        let cols = self.columns(content.width.floor().max(0.0) as usize);
        // Contiguous columns, no inter-bar gap for a time series.
        plot::render_bars(
            buf,
            &bars_bounds,
            &cols,
            1.0,
            Style::default().fg(Color::Green),
        );

        let label = format!("{} s span, {} bytes", self.span_seconds(), self.total_bytes());
        plot::draw_text(
            buf,
            content.x,
            content.y + content.height - 1.0,
            content.width,
            &label,
            Style::default().fg(Color::Gray),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::tcp_packet;

    #[test]
    fn test_ingest_buckets_by_second() {
        let mut hist = BandwidthHistogram::new();
        let bytes = tcp_packet([10, 0, 0, 1], [10, 0, 0, 2], 80, 443);
        hist.ingest(&PacketInfo::new(&bytes, 0));
        hist.ingest(&PacketInfo::new(&bytes, 500_000));
        hist.ingest(&PacketInfo::new(&bytes, 3 * MICROS_PER_SECOND));

        assert_eq!(hist.span_seconds(), 4);
        assert_eq!(hist.total_bytes(), 3 * bytes.len() as u64);
    }

    #[test]
    fn test_columns_preserve_total_and_order() {
        let mut hist = BandwidthHistogram::new();
        let bytes = tcp_packet([10, 0, 0, 1], [10, 0, 0, 2], 80, 443);
        for second in [0u64, 1, 2, 3, 8, 9] {
            hist.ingest(&PacketInfo::new(&bytes, second * MICROS_PER_SECOND));
        }

        let cols = hist.columns(5);
        assert_eq!(cols.len(), 5);
        assert_eq!(cols.iter().sum::<u64>(), hist.total_bytes());
        // Early seconds land in early columns.
        assert!(cols[0] > 0);
        assert!(cols[4] > 0);
    }

    #[test]
    fn test_columns_empty_histogram() {
        let hist = BandwidthHistogram::new();
        assert!(hist.columns(10).is_empty());
        assert_eq!(hist.span_seconds(), 0);
    }

    #[test]
    fn test_columns_never_exceed_span() {
        let mut hist = BandwidthHistogram::new();
        let bytes = tcp_packet([10, 0, 0, 1], [10, 0, 0, 2], 80, 443);
        hist.ingest(&PacketInfo::new(&bytes, 0));
        // One second of data never fans out into many columns.
        assert_eq!(hist.columns(50).len(), 1);
    }
}
