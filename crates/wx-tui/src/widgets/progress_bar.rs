//! Smooth Unicode progress bar widget.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::{C_MUTED, C_SECONDARY};

/// Render a smooth bar in `area`, filled to `progress` (0.0..=1.0), with
/// optional labels either side.
pub fn draw_progress(
    frame: &mut Frame,
    area: Rect,
    progress: f64,
    left_label: Option<&str>,
    right_label: Option<&str>,
    color: Color,
) {
    if area.width < 4 || area.height == 0 {
        return;
    }

    let left_label = left_label.unwrap_or_default();
    let right_label = right_label.unwrap_or_default();
    let label_w = (left_label.chars().count() + right_label.chars().count() + 2) as u16;
    let bar_w = area.width.saturating_sub(label_w).max(4) as usize;

    let mut spans = Vec::new();
    if !left_label.is_empty() {
        spans.push(Span::styled(
            format!("{} ", left_label),
            Style::default().fg(C_SECONDARY),
        ));
    }
    spans.push(Span::styled(bar(progress, bar_w), Style::default().fg(color)));
    if !right_label.is_empty() {
        spans.push(Span::styled(
            format!(" {}", right_label),
            Style::default().fg(C_MUTED),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Unicode smooth fill: 8 eighths per cell.
fn bar(progress: f64, width: usize) -> String {
    const BLOCKS: [char; 9] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

    let eighths = (progress.clamp(0.0, 1.0) * width as f64 * 8.0) as usize;
    let full_blocks = eighths / 8;
    let partial = eighths % 8;

    let mut bar = String::with_capacity(width + 4);
    for _ in 0..full_blocks.min(width) {
        bar.push('█');
    }
    if full_blocks < width {
        bar.push(BLOCKS[partial]);
        for _ in (full_blocks + 1)..width {
            bar.push(' ');
        }
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_width_is_constant() {
        for p in [0.0, 0.33, 0.5, 1.0, 1.7] {
            assert_eq!(bar(p, 20).chars().count(), 20, "progress {}", p);
        }
    }

    #[test]
    fn test_bar_full_and_empty() {
        assert_eq!(bar(1.0, 4), "████");
        assert_eq!(bar(0.0, 4), "    ");
        assert_eq!(bar(0.5, 4), "██  ");
    }
}
