//! Status bar: bottom lines with the last log message and keybindings.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::action::ComponentId;
use crate::theme::{C_FETCHING, C_MUTED, C_PLAYING, C_SECONDARY, C_SEPARATOR};

/// Draw the log bar: fetch activity dot + last log line.
pub fn draw_log_bar(frame: &mut Frame, area: Rect, last_log: Option<&str>, fetching: bool) {
    let dot = if fetching {
        Span::styled("●", Style::default().fg(C_FETCHING))
    } else {
        Span::styled("●", Style::default().fg(C_PLAYING))
    };
    let log_span = Span::styled(last_log.unwrap_or(""), Style::default().fg(C_SECONDARY));

    frame.render_widget(
        Paragraph::new(Line::from(vec![dot, Span::raw(" "), log_span])),
        area,
    );
}

/// Draw a horizontal separator line.
pub fn draw_separator(frame: &mut Frame, area: Rect) {
    let line = Line::from(Span::styled(
        "─".repeat(area.width as usize),
        Style::default().fg(C_SEPARATOR),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

/// Draw the keybindings footer bar (one row).
pub fn draw_keys_bar(frame: &mut Frame, area: Rect, focus: ComponentId) {
    let (label, keys) = match focus {
        ComponentId::Controls => (
            "SELECT",
            " ↑↓/jk field  ←→/hl change  Enter/f fetch  Space play  [/] step  Tab frames  q quit",
        ),
        ComponentId::Frames => (
            "FRAMES",
            " ←→/hl step  Home/End first/last  0-9 jump  Space play/pause  f fetch  Tab select  q quit",
        ),
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", label),
            Style::default().fg(C_SECONDARY).add_modifier(Modifier::BOLD),
        ),
        Span::styled(keys, Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
