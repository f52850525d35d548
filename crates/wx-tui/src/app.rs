//! App: component-based event loop.
//!
//! Architecture:
//! - `App` owns the components and `AppState` (shared read-only data for components).
//! - Terminal events arrive over a `tokio::mpsc` channel from a blocking reader task.
//! - A running fetch is polled on the UI tick; it never blocks the loop.
//! - The animation timer sleeps until the playback controller's next deadline.
//! - Components return `Vec<Action>`; App dispatches each Action.

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use wx_core::config::Config;
use wx_core::{
    generate_run_times, DiskStore, EventReceiver, FetchEvent, PlaybackController, Polled,
    Sequence, SequenceFetcher,
};

use crate::{
    action::{Action, ComponentId},
    app_state::{AppState, FetchStatus},
    component::Component,
    components::{
        controls::{ControlsPanel, Selection},
        frame_view::FramePanel,
    },
    widgets::{
        status_bar,
        toast::{Severity, ToastManager},
    },
};

// ── Internal event bus ────────────────────────────────────────────────────────

enum AppMessage {
    Event(Event),
}

const MAX_LOG_LINES: usize = 200;

// ── Persistence serde structs ─────────────────────────────────────────────────

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
struct UiSessionState {
    focused_component: String,
    model: Option<String>,
    /// Run key, e.g. `2024010112`. Only restored if still in the catalog.
    run: Option<String>,
    region: Option<String>,
    parameter: Option<String>,
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App {
    ui_state_path: PathBuf,

    // ── Shared state (passed read-only to components) ─────────────────────────
    pub state: AppState,

    // ── Components ────────────────────────────────────────────────────────────
    controls: ControlsPanel,
    frames: FramePanel,
    focus: ComponentId,

    // ── Fetching ──────────────────────────────────────────────────────────────
    fetcher: SequenceFetcher<DiskStore>,
    fetch_rx: Option<EventReceiver>,

    toast: ToastManager,
    should_quit: bool,
}

impl App {
    pub fn new(
        config: Config,
        ui_state_path: PathBuf,
        fetcher: SequenceFetcher<DiskStore>,
    ) -> Self {
        let run_times = generate_run_times(chrono::Utc::now());
        let playback =
            PlaybackController::new(Duration::from_millis(config.playback.frame_interval_ms));

        let ui_state = load_ui_session_state(&ui_state_path);

        let state = AppState {
            config,
            run_times,
            playback,
            fetch: None,
            loaded_label: None,
            logs: Vec::new(),
        };

        let selection = restore_selection(&ui_state, &state);
        let focus = match ui_state.focused_component.as_str() {
            "frames" => ComponentId::Frames,
            _ => ComponentId::Controls,
        };

        Self {
            ui_state_path,
            state,
            controls: ControlsPanel::new(selection),
            frames: FramePanel::new(),
            focus,
            fetcher,
            fetch_rx: None,
            toast: ToastManager::new(),
            should_quit: false,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        let (tx, mut rx) = mpsc::channel::<AppMessage>(256);
        self.push_log("wxloop started".to_string());

        // ── Background task: keyboard events ──────────────────────────────────
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // Fetch polling, toast expiry and spinner animation.
        let mut ui_tick = tokio::time::interval(Duration::from_millis(100));
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // ── Main loop ─────────────────────────────────────────────────────────
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }

            if self.should_quit {
                break;
            }

            let anim_due = self.state.playback.next_due();

            needs_redraw = tokio::select! {
                Some(msg) = rx.recv() => {
                    let mut redraw = self.handle_message(msg);
                    while let Ok(next) = rx.try_recv() {
                        redraw |= self.handle_message(next);
                    }
                    redraw
                }

                _ = ui_tick.tick() => {
                    self.poll_fetch();
                    self.toast.tick();
                    true
                }

                _ = sleep_until(anim_due) => self.state.playback.tick(Instant::now()),
            };
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        self.save_ui_session_state();
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        Ok(())
    }

    fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::Event(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                self.handle_key(key);
                true
            }
            AppMessage::Event(Event::Resize(..)) => true,
            AppMessage::Event(_) => false,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.dispatch(Action::Quit);
            return;
        }

        let global = match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            KeyCode::Char(' ') => Some(Action::TogglePlay),
            KeyCode::Char('f') => Some(Action::Fetch),
            KeyCode::Char('[') => Some(Action::PrevFrame),
            KeyCode::Char(']') => Some(Action::NextFrame),
            KeyCode::Tab | KeyCode::BackTab => Some(Action::FocusNext),
            _ => None,
        };
        if let Some(action) = global {
            self.dispatch(action);
            return;
        }

        let actions = if self.controls.id() == self.focus {
            self.controls.handle_key(key, &self.state)
        } else {
            self.frames.handle_key(key, &self.state)
        };
        for action in actions {
            self.dispatch(action);
        }
    }

    fn dispatch(&mut self, action: Action) {
        match action {
            Action::Fetch => self.start_fetch(),
            Action::SelectionChanged => self.save_ui_session_state(),
            Action::TogglePlay => {
                if self.state.playback.toggle(Instant::now()) {
                    debug!("playback: {:?}", self.state.playback.state());
                } else if self.state.playback.is_empty() && !self.state.is_fetching() {
                    self.toast.info("Nothing to play yet: press Enter to fetch a sequence");
                }
            }
            Action::NextFrame => self.state.playback.next(),
            Action::PrevFrame => self.state.playback.prev(),
            Action::FirstFrame => self.state.playback.first(),
            Action::LastFrame => self.state.playback.last(),
            Action::SeekFrame(index) => {
                if let Err(e) = self.state.playback.seek(index) {
                    debug!("seek ignored: {}", e);
                }
            }
            Action::SeekTenth(tenth) => {
                let index = tenth as usize * self.state.playback.len() / 10;
                self.dispatch(Action::SeekFrame(index));
            }
            Action::FocusNext => self.focus = self.focus.toggle(),
            Action::Quit => self.should_quit = true,
        }
    }

    // ── Fetching ──────────────────────────────────────────────────────────────

    fn start_fetch(&mut self) {
        if self.state.is_fetching() {
            self.toast.warning("A download is already in progress");
            return;
        }
        let Some((request, label)) = self.controls.request(&self.state) else {
            self.toast.warning("Nothing to fetch: a selection list is empty");
            return;
        };
        let run_label = self
            .state
            .run_times
            .get(self.controls.selection().run)
            .map_or_else(|| request.run.label(), |r| r.label.clone());

        info!("starting fetch: {}", label);
        // Drop the previous sequence before the first frame arrives.
        self.state.playback.load(Sequence::new(request.run, Vec::new()));
        self.state.loaded_label = None;
        self.state.fetch = Some(FetchStatus {
            label: label.clone(),
            run_label,
            progress: 0.0,
        });
        self.fetch_rx = Some(self.fetcher.spawn(request));
        self.toast.spinner(format!("Downloading {}", label));
        self.push_log(format!("Downloading {}", label));
    }

    /// Drain whatever the fetch task has emitted since the last tick.
    fn poll_fetch(&mut self) {
        let Some(mut rx) = self.fetch_rx.take() else {
            return;
        };
        loop {
            match rx.poll() {
                Polled::Event(FetchEvent::Progress(p)) => {
                    if let Some(fetch) = self.state.fetch.as_mut() {
                        fetch.progress = p;
                    }
                }
                Polled::Event(FetchEvent::Finished(sequence)) => {
                    self.finish_fetch(sequence);
                    return;
                }
                Polled::Pending => {
                    self.fetch_rx = Some(rx);
                    return;
                }
                Polled::Closed => {
                    warn!("fetch task ended without a result");
                    self.state.fetch = None;
                    self.toast.resolve_spinner(
                        Severity::Error,
                        "Download stopped unexpectedly",
                        Duration::from_secs(6),
                    );
                    return;
                }
            }
        }
    }

    fn finish_fetch(&mut self, sequence: Sequence) {
        let (label, run_label) = match self.state.fetch.take() {
            Some(fetch) => (fetch.label, fetch.run_label),
            None => (String::new(), sequence.run.label()),
        };
        let count = sequence.len();

        self.state.playback.load(sequence);

        if count == 0 {
            let msg = no_data_message(&run_label);
            warn!("{}", msg);
            self.state.loaded_label = None;
            self.toast
                .resolve_spinner(Severity::Warning, msg.clone(), Duration::from_secs(8));
            self.push_log(msg);
        } else {
            let msg = format!("Loaded {} frames", count);
            info!("{} for {}", msg, label);
            self.state.loaded_label = Some(label);
            self.toast
                .resolve_spinner(Severity::Success, msg.clone(), Duration::from_secs(3));
            self.push_log(msg);
            self.focus = ComponentId::Frames;
        }
    }

    fn push_log(&mut self, line: String) {
        self.state.logs.push(line);
        if self.state.logs.len() > MAX_LOG_LINES {
            let excess = self.state.logs.len() - MAX_LOG_LINES;
            self.state.logs.drain(..excess);
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut ratatui::Frame) {
        let area = frame.area();

        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);

        let controls_focused = self.controls.id() == self.focus;
        let frames_focused = self.frames.id() == self.focus;
        self.controls
            .draw(frame, outer[0], controls_focused, &self.state);
        self.frames.draw(frame, outer[1], frames_focused, &self.state);
        status_bar::draw_separator(frame, outer[2]);
        status_bar::draw_log_bar(
            frame,
            outer[3],
            self.state.last_log(),
            self.state.is_fetching(),
        );
        status_bar::draw_keys_bar(frame, outer[4], self.focus);

        // ── Toast notifications (topmost layer) ──────────────────────────────
        self.toast.draw(frame, area);
    }

    // ── Session persistence ───────────────────────────────────────────────────

    fn save_ui_session_state(&self) {
        let ui_state = session_state(self.controls.selection(), self.focus, &self.state);
        if let Err(e) = save_ui_session_state(&self.ui_state_path, &ui_state) {
            warn!("failed to save UI state: {}", e);
        }
    }
}

fn no_data_message(run_label: &str) -> String {
    format!(
        "Could not download any images for the {} run. \
         The selected parameter may not be available for this model.",
        run_label
    )
}

async fn sleep_until(due: Option<Instant>) {
    match due {
        Some(due) => tokio::time::sleep_until(tokio::time::Instant::from_std(due)).await,
        None => std::future::pending().await,
    }
}

fn session_state(selection: Selection, focus: ComponentId, state: &AppState) -> UiSessionState {
    UiSessionState {
        focused_component: match focus {
            ComponentId::Controls => "controls".to_string(),
            ComponentId::Frames => "frames".to_string(),
        },
        model: state
            .config
            .models
            .get(selection.model)
            .map(|m| m.label.clone()),
        run: state.run_times.get(selection.run).map(|r| r.key()),
        region: state
            .config
            .regions
            .get(selection.region)
            .map(|r| r.label.clone()),
        parameter: state
            .config
            .parameters
            .get(selection.parameter)
            .map(|p| p.label.clone()),
    }
}

/// Map saved labels back onto indices; anything no longer present falls
/// back to the first entry.
fn restore_selection(ui_state: &UiSessionState, state: &AppState) -> Selection {
    fn position<T>(items: &[T], wanted: Option<&str>, key: impl Fn(&T) -> String) -> usize {
        wanted
            .and_then(|w| items.iter().position(|item| key(item) == w))
            .unwrap_or(0)
    }

    Selection {
        model: position(&state.config.models, ui_state.model.as_deref(), |m| {
            m.label.clone()
        }),
        run: position(&state.run_times, ui_state.run.as_deref(), |r| r.key()),
        region: position(&state.config.regions, ui_state.region.as_deref(), |r| {
            r.label.clone()
        }),
        parameter: position(
            &state.config.parameters,
            ui_state.parameter.as_deref(),
            |p| p.label.clone(),
        ),
    }
}

fn load_ui_session_state(path: &PathBuf) -> UiSessionState {
    let Ok(content) = std::fs::read_to_string(path) else {
        return UiSessionState::default();
    };
    serde_json::from_str(&content).unwrap_or_default()
}

fn save_ui_session_state(path: &PathBuf, state: &UiSessionState) -> anyhow::Result<()> {
    std::fs::write(path, serde_json::to_string_pretty(state)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

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

    #[test]
    fn test_session_round_trip() {
        let state = state();
        let selection = Selection {
            model: 2,
            run: 3,
            region: 4,
            parameter: 5,
        };
        let saved = session_state(selection, ComponentId::Frames, &state);
        assert_eq!(saved.model.as_deref(), Some("HRRR"));
        assert_eq!(saved.run.as_deref(), Some("2023123112"));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ui_state.json");
        save_ui_session_state(&path, &saved).unwrap();
        let loaded = load_ui_session_state(&path);
        assert_eq!(loaded.focused_component, "frames");
        assert_eq!(restore_selection(&loaded, &state), selection);
    }

    #[test]
    fn test_stale_labels_fall_back_to_first_entry() {
        let ui_state = UiSessionState {
            model: Some("RAP".to_string()),
            run: Some("1999010100".to_string()),
            region: Some("Europe".to_string()),
            ..UiSessionState::default()
        };
        let selection = restore_selection(&ui_state, &state());
        assert_eq!(selection.model, 0);
        assert_eq!(selection.run, 0);
        assert_eq!(selection.region, 12);
        assert_eq!(selection.parameter, 0);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_ui_session_state(&dir.path().join("ui_state.json"));
        assert!(loaded.model.is_none());
        assert_eq!(restore_selection(&loaded, &state()), Selection::default());
    }

    fn app(dir: &tempfile::TempDir) -> App {
        let client = wx_core::fetch::build_client(&Config::default().http).unwrap();
        let fetcher = SequenceFetcher::new(
            client,
            DiskStore::new(dir.path().join("frames")),
            wx_core::FetchPolicy::default(),
        );
        App::new(Config::default(), dir.path().join("ui_state.json"), fetcher)
    }

    #[test]
    fn test_empty_result_names_the_picked_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.state.fetch = Some(FetchStatus {
            label: "GFS 2024-01-01 00Z · Composite Reflectivity · Continental US".to_string(),
            run_label: "2024-01-01 00Z (Latest)".to_string(),
            progress: 100.0,
        });

        let run = wx_core::RunTime::from_key("2024010100").unwrap();
        app.finish_fetch(Sequence::new(run, Vec::new()));

        assert!(!app.state.is_fetching());
        assert!(app.state.playback.is_empty());
        assert!(app.state.loaded_label.is_none());
        assert_eq!(
            app.state.last_log(),
            Some(no_data_message("2024-01-01 00Z (Latest)").as_str())
        );
        assert!(app
            .state
            .last_log()
            .is_some_and(|l| l.contains("for the 2024-01-01 00Z (Latest) run.")));
    }

    #[test]
    fn test_play_without_frames_shows_notice() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        assert!(app.toast.is_empty());

        app.dispatch(Action::TogglePlay);

        assert!(!app.state.playback.is_playing());
        assert!(!app.toast.is_empty());
    }

    #[test]
    fn test_keys_route_to_focused_component() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.focus = ComponentId::Controls;

        app.handle_key(KeyEvent::new(KeyCode::Right, KeyModifiers::NONE));
        assert_eq!(app.controls.selection().model, 1);

        app.dispatch(Action::FocusNext);
        app.handle_key(KeyEvent::new(KeyCode::Right, KeyModifiers::NONE));
        assert_eq!(app.controls.selection().model, 1);
    }

    #[test]
    fn test_only_visible_changes_request_a_redraw() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);

        let press = KeyEvent::new(KeyCode::Down, KeyModifiers::NONE);
        let release = KeyEvent::new_with_kind(KeyCode::Down, KeyModifiers::NONE, KeyEventKind::Release);
        assert!(app.handle_message(AppMessage::Event(Event::Key(press))));
        assert!(!app.handle_message(AppMessage::Event(Event::Key(release))));
        assert!(app.handle_message(AppMessage::Event(Event::Resize(80, 24))));
        assert!(!app.handle_message(AppMessage::Event(Event::FocusGained)));
    }
}
