// Low-level plotting helpers over a bounded drawing surface
//
// Layout math runs in f64 `Bounds` so section heights and the page
// cursor compose exactly; coordinates are rasterized to buffer cells
// only at draw time. Chart frames hand back the interior content bounds
// available for the caller's own bar or series drawing.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Widget};

const BAR_SYMBOL: &str = "█";

/// A rectangular region of the page in f64 page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rasterize to whole buffer cells.
    pub fn to_rect(&self) -> Rect {
        Rect::new(
            clamp_cell(self.x),
            clamp_cell(self.y),
            clamp_cell(self.width),
            clamp_cell(self.height),
        )
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self::new(
            f64::from(rect.x),
            f64::from(rect.y),
            f64::from(rect.width),
            f64::from(rect.height),
        )
    }
}

fn clamp_cell(v: f64) -> u16 {
    v.round().clamp(0.0, f64::from(u16::MAX)) as u16
}

/// One bar's geometry, relative to the content region's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Compute bar rectangles for a rank-ordered count list.
///
/// Pure function over the region size. Returns an empty list when there
/// is nothing to draw (no entries, or every count is zero) so callers
/// never divide by zero. Heights are normalized against the largest
/// count: the tallest bar always exactly fills the region height.
/// `bar_space_factor` >= 1 shrinks each bar within its slot to leave an
/// inter-bar gap.
pub fn bar_geometry(
    width: f64,
    height: f64,
    counts: &[u64],
    bar_space_factor: f64,
) -> Vec<BarRect> {
    let greatest = counts.iter().copied().max().unwrap_or(0);
    if counts.is_empty() || greatest == 0 {
        return Vec::new();
    }

    let offset_unit = width / counts.len() as f64;
    let bar_width = offset_unit / bar_space_factor;

    counts
        .iter()
        .enumerate()
        .map(|(i, count)| {
            let bar_height = (*count as f64 / greatest as f64) * height;
            BarRect {
                x: i as f64 * offset_unit,
                y: height - bar_height,
                width: bar_width,
                height: bar_height,
            }
        })
        .collect()
}

/// Draw a bordered chart frame with a title and return the interior
/// content bounds.
pub fn render_frame(buf: &mut Buffer, bounds: &Bounds, title: &str) -> Bounds {
    let rect = bounds.to_rect().intersection(buf.area);
    let block = Block::default().borders(Borders::ALL).title(title.to_string());
    let inner = block.inner(rect);
    block.render(rect, buf);
    Bounds::from_rect(inner)
}

/// Rasterize proportional bars into `content`.
///
/// Draws only inside `content`; cells outside the region are never
/// touched. Bars with a positive but sub-cell height still get one cell
/// so small counts stay visible.
pub fn render_bars(
    buf: &mut Buffer,
    content: &Bounds,
    counts: &[u64],
    bar_space_factor: f64,
    style: Style,
) {
    let rect = content.to_rect().intersection(buf.area);
    if rect.width == 0 || rect.height == 0 {
        return;
    }

    for bar in bar_geometry(
        f64::from(rect.width),
        f64::from(rect.height),
        counts,
        bar_space_factor,
    ) {
        if bar.height <= 0.0 {
            continue;
        }
        let x0 = rect.x + (bar.x.round() as u16).min(rect.width.saturating_sub(1));
        let w = (bar.width.round() as u16).max(1).min(rect.right() - x0);
        let h = (bar.height.ceil() as u16).clamp(1, rect.height);
        let run = BAR_SYMBOL.repeat(w as usize);
        for y in rect.bottom() - h..rect.bottom() {
            buf.set_string(x0, y, &run, style);
        }
    }
}

/// Write one line of text clipped to `max_width` cells, skipping rows
/// outside the surface.
pub fn draw_text(buf: &mut Buffer, x: f64, y: f64, max_width: f64, text: &str, style: Style) {
    let cx = clamp_cell(x);
    let cy = clamp_cell(y);
    let area = buf.area;
    if cy < area.top() || cy >= area.bottom() || cx >= area.right() {
        return;
    }
    let width = (max_width.floor().max(0.0) as usize).min((area.right() - cx) as usize);
    buf.set_stringn(cx, cy, text, width, style);
}
