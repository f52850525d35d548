//! Selection panel: model, run, region and parameter pickers.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use wx_core::SequenceRequest;

use crate::action::{Action, ComponentId};
use crate::app_state::AppState;
use crate::component::Component;
use crate::theme::{style_default, style_secondary, style_selected_focused, C_FETCHING};
use crate::widgets::pane_chrome::{pane_chrome, Badge};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Model,
    Run,
    Region,
    Parameter,
}

const FIELDS: [Field; 4] = [Field::Model, Field::Run, Field::Region, Field::Parameter];

impl Field {
    fn label(self) -> &'static str {
        match self {
            Field::Model => "Model",
            Field::Run => "Model Run",
            Field::Region => "Region",
            Field::Parameter => "Parameter",
        }
    }
}

/// Indices into the config tables and the run catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub model: usize,
    pub run: usize,
    pub region: usize,
    pub parameter: usize,
}

impl Selection {
    fn get(&self, field: Field) -> usize {
        match field {
            Field::Model => self.model,
            Field::Run => self.run,
            Field::Region => self.region,
            Field::Parameter => self.parameter,
        }
    }

    fn get_mut(&mut self, field: Field) -> &mut usize {
        match field {
            Field::Model => &mut self.model,
            Field::Run => &mut self.run,
            Field::Region => &mut self.region,
            Field::Parameter => &mut self.parameter,
        }
    }
}

pub struct ControlsPanel {
    selection: Selection,
    focused_field: Field,
}

impl ControlsPanel {
    pub fn new(selection: Selection) -> Self {
        Self {
            selection,
            focused_field: Field::Model,
        }
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Request for the current selection plus a human-readable label, or
    /// `None` when a table is empty.
    pub fn request(&self, state: &AppState) -> Option<(SequenceRequest, String)> {
        let sel = self.selection;
        let model = state.config.models.get(sel.model)?;
        let run = state.run_times.get(sel.run)?;
        let region = state.config.regions.get(sel.region)?;
        let parameter = state.config.parameters.get(sel.parameter)?;

        let request = SequenceRequest {
            base_url: model.base_url.clone(),
            model: model.id.clone(),
            run: run.run,
            parameter: parameter.code.clone(),
            region: region.code.clone(),
        };
        let label = format!(
            "{} {} · {} · {}",
            model.label,
            run.run.label(),
            parameter.label,
            region.label
        );
        Some((request, label))
    }

    fn options<'a>(&self, field: Field, state: &'a AppState) -> Vec<&'a str> {
        match field {
            Field::Model => state.config.models.iter().map(|m| m.label.as_str()).collect(),
            Field::Run => state.run_times.iter().map(|r| r.label.as_str()).collect(),
            Field::Region => state.config.regions.iter().map(|r| r.label.as_str()).collect(),
            Field::Parameter => state
                .config
                .parameters
                .iter()
                .map(|p| p.label.as_str())
                .collect(),
        }
    }

    fn move_field(&mut self, delta: isize) {
        let pos = FIELDS
            .iter()
            .position(|f| *f == self.focused_field)
            .unwrap_or(0) as isize;
        let next = (pos + delta).rem_euclid(FIELDS.len() as isize) as usize;
        self.focused_field = FIELDS[next];
    }

    fn cycle_value(&mut self, delta: isize, len: usize) -> bool {
        if len == 0 {
            return false;
        }
        let slot = self.selection.get_mut(self.focused_field);
        let next = (*slot as isize + delta).rem_euclid(len as isize) as usize;
        let changed = next != *slot;
        *slot = next;
        changed
    }
}

impl Component for ControlsPanel {
    fn id(&self) -> ComponentId {
        ComponentId::Controls
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.move_field(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_field(1),
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Right | KeyCode::Char('l') => {
                // Selection is locked while a fetch runs.
                if state.is_fetching() {
                    return Vec::new();
                }
                let delta = if matches!(key.code, KeyCode::Left | KeyCode::Char('h')) {
                    -1
                } else {
                    1
                };
                let len = self.options(self.focused_field, state).len();
                if self.cycle_value(delta, len) {
                    return vec![Action::SelectionChanged];
                }
            }
            KeyCode::Enter => return vec![Action::Fetch],
            _ => {}
        }
        Vec::new()
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let badge = state.is_fetching().then_some(Badge {
            text: "FETCHING",
            color: C_FETCHING,
        });
        let block = pane_chrome("Select", focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines: Vec<Line> = FIELDS
            .iter()
            .map(|&field| {
                let options = self.options(field, state);
                let value = options
                    .get(self.selection.get(field))
                    .copied()
                    .unwrap_or("—");
                let active = focused && field == self.focused_field;
                let value_style = if active {
                    style_selected_focused()
                } else {
                    style_default()
                };
                let (open, close) = if active { ("◂ ", " ▸") } else { ("  ", "  ") };
                Line::from(vec![
                    Span::styled(format!(" {:<11}", field.label()), style_secondary()),
                    Span::styled(open, Style::default()),
                    Span::styled(value.to_string(), value_style),
                    Span::styled(close, Style::default()),
                ])
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::FetchStatus;
    use chrono::TimeZone;
    use ratatui::crossterm::event::KeyModifiers;
    use wx_core::config::Config;
    use wx_core::{generate_run_times, ModelId, PlaybackController};

    fn state() -> AppState {
        let now = chrono::Utc.with_ymd_and_hms(2024, 1, 1, 7, 30, 0).unwrap();
        AppState {
            config: Config::default(),
            run_times: generate_run_times(now),
            playback: PlaybackController::default(),
            fetch: None,
            loaded_label: None,
            logs: Vec::new(),
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_request_from_default_selection() {
        let panel = ControlsPanel::new(Selection::default());
        let (request, label) = panel.request(&state()).unwrap();
        assert_eq!(request.model, ModelId::Gfs);
        assert_eq!(request.run.key(), "2024010106");
        assert_eq!(request.parameter, "refcmp");
        assert_eq!(request.region, "conus");
        assert_eq!(
            label,
            "GFS 2024-01-01 06Z · Composite Reflectivity · Continental US"
        );
    }

    #[test]
    fn test_cycle_model_wraps() {
        let state = state();
        let mut panel = ControlsPanel::new(Selection::default());
        let actions = panel.handle_key(key(KeyCode::Left), &state);
        assert_eq!(actions, vec![Action::SelectionChanged]);
        assert_eq!(panel.selection().model, 3);

        let (request, _) = panel.request(&state).unwrap();
        assert_eq!(request.model, ModelId::EcmwfFull);
    }

    #[test]
    fn test_field_navigation_then_change_run() {
        let state = state();
        let mut panel = ControlsPanel::new(Selection::default());
        panel.handle_key(key(KeyCode::Down), &state);
        panel.handle_key(key(KeyCode::Right), &state);
        assert_eq!(panel.selection().run, 1);
        assert_eq!(panel.selection().model, 0);
    }

    #[test]
    fn test_selection_locked_while_fetching() {
        let mut state = state();
        state.fetch = Some(FetchStatus {
            label: "GFS".to_string(),
            run_label: "2024-01-01 06Z (Latest)".to_string(),
            progress: 10.0,
        });
        let mut panel = ControlsPanel::new(Selection::default());
        assert!(panel.handle_key(key(KeyCode::Right), &state).is_empty());
        assert_eq!(panel.selection(), Selection::default());
    }

    #[test]
    fn test_enter_requests_fetch() {
        let mut panel = ControlsPanel::new(Selection::default());
        assert_eq!(panel.handle_key(key(KeyCode::Enter), &state()), vec![Action::Fetch]);
    }
}
