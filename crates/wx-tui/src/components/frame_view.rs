//! Frame panel: metadata for the frame under the playhead and a timeline.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use wx_core::PlaybackState;

use crate::action::{Action, ComponentId};
use crate::app_state::AppState;
use crate::component::Component;
use crate::theme::{
    style_default, style_muted, style_secondary, C_ACCENT, C_FETCHING, C_MUTED, C_PLAYING, C_TAG,
};
use crate::widgets::pane_chrome::{pane_chrome, Badge};
use crate::widgets::progress_bar::draw_progress;

#[derive(Default)]
pub struct FramePanel;

impl FramePanel {
    pub fn new() -> Self {
        Self
    }

    fn badge(state: &AppState) -> Badge<'static> {
        if state.is_fetching() {
            return Badge {
                text: "LOADING",
                color: C_FETCHING,
            };
        }
        match state.playback.state() {
            PlaybackState::Empty => Badge {
                text: "EMPTY",
                color: C_MUTED,
            },
            PlaybackState::Paused { .. } => Badge {
                text: "PAUSED",
                color: C_TAG,
            },
            PlaybackState::Playing { .. } => Badge {
                text: "PLAY",
                color: C_PLAYING,
            },
        }
    }

    fn draw_fetch(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let Some(fetch) = &state.fetch else {
            return;
        };
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
            .split(area);

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(" Loading ", style_secondary()),
                Span::styled(fetch.label.as_str(), style_default()),
            ])),
            rows[0],
        );
        let pct = format!("{:>3.0}%", fetch.progress);
        draw_progress(
            frame,
            rows[1],
            fetch.progress / 100.0,
            None,
            Some(&pct),
            C_FETCHING,
        );
    }

    fn draw_frame(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let Some(info) = state.playback.current_info() else {
            let hint = Line::from(Span::styled(
                " No frames loaded. Pick a model and run, then press Enter to fetch.",
                style_muted(),
            ));
            frame.render_widget(Paragraph::new(hint), area);
            return;
        };

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        if let Some(label) = &state.loaded_label {
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(format!(" {}", label), style_secondary()))),
                rows[0],
            );
        }

        for (row, text) in [
            (rows[1], &info.run_label),
            (rows[2], &info.hour_label),
            (rows[3], &info.valid_label),
        ] {
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(format!(" {}", text), style_default()))),
                row,
            );
        }

        if let Some(current) = state.playback.current_frame() {
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    format!(" {}", current.source),
                    style_muted(),
                ))),
                rows[4],
            );
        }

        let position = format!("{}/{}", info.index + 1, info.count);
        let hour = format!("F{:03}", info.forecast_hour);
        draw_progress(
            frame,
            rows[6],
            (info.index + 1) as f64 / info.count as f64,
            Some(&hour),
            Some(&position),
            C_ACCENT,
        );
    }
}

impl Component for FramePanel {
    fn id(&self) -> ComponentId {
        ComponentId::Frames
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if state.is_fetching() || state.playback.is_empty() {
            return Vec::new();
        }
        match key.code {
            KeyCode::Right | KeyCode::Char('l') => vec![Action::NextFrame],
            KeyCode::Left | KeyCode::Char('h') => vec![Action::PrevFrame],
            KeyCode::Home | KeyCode::Char('g') => vec![Action::FirstFrame],
            KeyCode::End | KeyCode::Char('G') => vec![Action::LastFrame],
            KeyCode::Char(c @ '0'..='9') => vec![Action::SeekTenth(c as u8 - b'0')],
            _ => Vec::new(),
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let block = pane_chrome("Frames", focused, Some(Self::badge(state)));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if state.is_fetching() {
            self.draw_fetch(frame, inner, state);
        } else {
            self.draw_frame(frame, inner, state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ratatui::crossterm::event::KeyModifiers;
    use std::path::PathBuf;
    use wx_core::config::Config;
    use wx_core::{generate_run_times, Frame as WxFrame, FrameSource, PlaybackController, RunTime, Sequence};

    fn state_with(hours: &[u32]) -> AppState {
        let now = chrono::Utc.with_ymd_and_hms(2024, 1, 1, 7, 30, 0).unwrap();
        let run = RunTime::from_key("2024010100").unwrap();
        let frames = hours
            .iter()
            .map(|&h| WxFrame::new(run, h, FrameSource::File(PathBuf::from(format!("{}.png", h)))))
            .collect();
        let mut playback = PlaybackController::default();
        playback.load(Sequence::new(run, frames));
        AppState {
            config: Config::default(),
            run_times: generate_run_times(now),
            playback,
            fetch: None,
            loaded_label: None,
            logs: Vec::new(),
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_navigation_keys() {
        let state = state_with(&[0, 3, 6]);
        let mut panel = FramePanel::new();
        assert_eq!(panel.handle_key(key(KeyCode::Right), &state), vec![Action::NextFrame]);
        assert_eq!(panel.handle_key(key(KeyCode::Char('h')), &state), vec![Action::PrevFrame]);
        assert_eq!(panel.handle_key(key(KeyCode::End), &state), vec![Action::LastFrame]);
        assert_eq!(panel.handle_key(key(KeyCode::Char('5')), &state), vec![Action::SeekTenth(5)]);
    }

    #[test]
    fn test_keys_ignored_without_frames() {
        let state = state_with(&[]);
        let mut panel = FramePanel::new();
        assert!(panel.handle_key(key(KeyCode::Right), &state).is_empty());
    }

    #[test]
    fn test_badge_follows_playback_state() {
        let state = state_with(&[]);
        assert_eq!(FramePanel::badge(&state).text, "EMPTY");
        let state = state_with(&[0]);
        assert_eq!(FramePanel::badge(&state).text, "PAUSED");
    }
}
