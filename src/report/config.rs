// Report layout configuration
//
// One immutable struct built at startup and passed by reference into
// the orchestrator and its sections; there is no process-wide layout
// state. Dimensions are in page cells, ratios are unitless.

use super::ReportError;

/// Suffix table for humanized byte counts.
pub const SIZE_SUFFIXES: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Page size in cells.
    pub page_width: f64,
    pub page_height: f64,

    /// Rows consumed by one header text line before line spacing.
    pub header_font_size: f64,

    // ========================================================================
    // Ratio constants
    // ========================================================================
    /// Fraction of the page width used as margin on every edge.
    pub page_margin_factor: f64,
    /// Multiplier on the font size giving the per-line advance.
    pub line_space_factor: f64,
    /// Multiplier on each section strip giving the inter-section pad.
    pub histogram_pad_factor_y: f64,
    /// Content width divided by this gives each of the two side-by-side
    /// frequency charts; must be >= 2 so the pair cannot overlap.
    pub address_histogram_width_divisor: f64,
    /// Slot width divided by this gives the bar width; > 1 leaves an
    /// inter-bar gap.
    pub bar_space_factor: f64,

    // ========================================================================
    // Size constants
    // ========================================================================
    pub bandwidth_histogram_height: f64,
    pub address_histogram_height: f64,
    pub port_histogram_height: f64,
    pub packetfall_height: f64,

    /// Maximum bars in a ranked frequency chart.
    pub max_bars: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            page_width: 100.0,
            page_height: 80.0,
            header_font_size: 1.0,
            page_margin_factor: 0.02,
            line_space_factor: 1.0,
            histogram_pad_factor_y: 1.1,
            address_histogram_width_divisor: 2.1,
            bar_space_factor: 1.5,
            bandwidth_histogram_height: 16.0,
            address_histogram_height: 14.0,
            port_histogram_height: 14.0,
            packetfall_height: 14.0,
            max_bars: 10,
        }
    }
}

impl ReportConfig {
    /// Reject configurations that cannot produce a sane page.
    pub fn validate(&self) -> Result<(), ReportError> {
        if self.page_width < 4.0 || self.page_height < 4.0 {
            return Err(ReportError::Config(format!(
                "page bounds too small: {}x{}",
                self.page_width, self.page_height
            )));
        }
        if !(0.0..0.5).contains(&self.page_margin_factor) {
            return Err(ReportError::Config(format!(
                "page_margin_factor must be in [0, 0.5): {}",
                self.page_margin_factor
            )));
        }
        if self.header_font_size <= 0.0 || self.line_space_factor <= 0.0 {
            return Err(ReportError::Config(
                "header font size and line spacing must be positive".into(),
            ));
        }
        if self.histogram_pad_factor_y < 1.0 {
            return Err(ReportError::Config(format!(
                "histogram_pad_factor_y must be >= 1: {}",
                self.histogram_pad_factor_y
            )));
        }
        if self.address_histogram_width_divisor < 2.0 {
            return Err(ReportError::Config(format!(
                "address_histogram_width_divisor must be >= 2: {}",
                self.address_histogram_width_divisor
            )));
        }
        if self.bar_space_factor <= 1.0 {
            return Err(ReportError::Config(format!(
                "bar_space_factor must be > 1: {}",
                self.bar_space_factor
            )));
        }
        if self.bandwidth_histogram_height <= 0.0
            || self.address_histogram_height <= 0.0
            || self.port_histogram_height <= 0.0
            || self.packetfall_height <= 0.0
        {
            return Err(ReportError::Config("section heights must be positive".into()));
        }
        if self.max_bars == 0 {
            return Err(ReportError::Config("max_bars must be at least 1".into()));
        }
        Ok(())
    }
}

/// Humanize a byte count through the suffix table.
pub fn format_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut idx = 0;
    while value >= 1024.0 && idx < SIZE_SUFFIXES.len() - 1 {
        value /= 1024.0;
        idx += 1;
    }
    if idx == 0 {
        format!("{bytes} {}", SIZE_SUFFIXES[0])
    } else {
        format!("{value:.1} {}", SIZE_SUFFIXES[idx])
    }
}
