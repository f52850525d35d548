//! Toast notification system: transient status messages.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use crate::theme::{C_TOAST_ERROR, C_TOAST_INFO, C_TOAST_SUCCESS, C_TOAST_WARNING};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

struct Toast {
    message: String,
    severity: Severity,
    expires: Instant,
}

/// A persistent spinner toast that animates until resolved.
struct SpinnerToast {
    message: String,
    frame: usize,
}

const SPINNER_FRAMES: &[&str] = &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

pub struct ToastManager {
    toasts: VecDeque<Toast>,
    spinner: Option<SpinnerToast>,
    max_visible: usize,
}

impl ToastManager {
    pub fn new() -> Self {
        Self {
            toasts: VecDeque::new(),
            spinner: None,
            max_visible: 4,
        }
    }

    pub fn push(&mut self, message: impl Into<String>, severity: Severity, duration: Duration) {
        let msg = message.into();
        self.toasts.retain(|t| t.message != msg);
        self.toasts.push_back(Toast {
            message: msg,
            severity,
            expires: Instant::now() + duration,
        });
        while self.toasts.len() > self.max_visible * 2 {
            self.toasts.pop_front();
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Info, Duration::from_secs(3));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Warning, Duration::from_secs(6));
    }

    /// Start or replace the spinner. It animates on every `tick()` and stays
    /// until `resolve_spinner` is called.
    pub fn spinner(&mut self, message: impl Into<String>) {
        self.spinner = Some(SpinnerToast {
            message: message.into(),
            frame: 0,
        });
    }

    /// Replace the spinner with a normal expiring toast.
    pub fn resolve_spinner(
        &mut self,
        severity: Severity,
        message: impl Into<String>,
        duration: Duration,
    ) {
        self.spinner = None;
        self.push(message, severity, duration);
    }

    /// Remove expired toasts and advance the spinner frame. Call each tick.
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.toasts.retain(|t| t.expires > now);
        if let Some(ref mut s) = self.spinner {
            s.frame = (s.frame + 1) % SPINNER_FRAMES.len();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty() && self.spinner.is_none()
    }

    /// Render toasts in the top-right corner of `area`.
    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        if self.is_empty() {
            return;
        }
        let max_width = (area.width / 2).clamp(30, 80);
        let mut y = area.y + 1;

        let spinner_row = self.spinner.as_ref().map(|s| {
            let icon = SPINNER_FRAMES[s.frame % SPINNER_FRAMES.len()];
            (format!(" {} {} ", icon, s.message), C_TOAST_INFO)
        });
        let rows = spinner_row.into_iter().chain(
            self.toasts
                .iter()
                .rev()
                .take(self.max_visible)
                .map(|toast| {
                    let (icon, color) = match toast.severity {
                        Severity::Info => ("·", C_TOAST_INFO),
                        Severity::Success => ("✓", C_TOAST_SUCCESS),
                        Severity::Warning => ("!", C_TOAST_WARNING),
                        Severity::Error => ("✗", C_TOAST_ERROR),
                    };
                    (format!(" {} {} ", icon, toast.message), color)
                }),
        );

        for (text, color) in rows {
            if y >= area.y + area.height {
                break;
            }
            let w = (text.chars().count() as u16).min(max_width).min(area.width);
            let toast_area = Rect {
                x: area.x + area.width.saturating_sub(w + 1),
                y,
                width: w,
                height: 1,
            };
            frame.render_widget(Clear, toast_area);
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    text,
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ))),
                toast_area,
            );
            y += 1;
        }
    }
}

impl Default for ToastManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_resolves_into_toast() {
        let mut toasts = ToastManager::new();
        toasts.spinner("Fetching");
        assert!(!toasts.is_empty());
        toasts.resolve_spinner(Severity::Success, "done", Duration::from_secs(3));
        assert!(toasts.spinner.is_none());
        assert_eq!(toasts.toasts.len(), 1);
    }

    #[test]
    fn test_expired_toasts_removed_on_tick() {
        let mut toasts = ToastManager::new();
        toasts.push("gone", Severity::Info, Duration::ZERO);
        toasts.tick();
        assert!(toasts.is_empty());
    }

    #[test]
    fn test_duplicate_messages_collapse() {
        let mut toasts = ToastManager::new();
        toasts.info("same");
        toasts.info("same");
        assert_eq!(toasts.toasts.len(), 1);
    }
}
