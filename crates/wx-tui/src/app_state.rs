//! AppState: shared read-only data passed to all components during render/event.
//!
//! The App event-loop is the only thing that writes to AppState.

use wx_core::config::Config;
use wx_core::{PlaybackController, RunTimeOption};

/// A fetch that has been started and whose terminal event hasn't arrived.
#[derive(Debug, Clone)]
pub struct FetchStatus {
    /// e.g. `GFS 2024-01-01 00Z · Composite Reflectivity · Continental US`
    pub label: String,
    /// Run as listed in the picker, e.g. `2024-01-01 00Z (Latest)`.
    pub run_label: String,
    /// 0.0..=100.0
    pub progress: f64,
}

pub struct AppState {
    pub config: Config,
    pub run_times: Vec<RunTimeOption>,

    /// Playback of the most recently fetched sequence.
    pub playback: PlaybackController,
    pub fetch: Option<FetchStatus>,
    /// Label of the selection the loaded sequence came from.
    pub loaded_label: Option<String>,

    pub logs: Vec<String>,
}

impl AppState {
    pub fn is_fetching(&self) -> bool {
        self.fetch.is_some()
    }

    pub fn last_log(&self) -> Option<&str> {
        self.logs.last().map(String::as_str)
    }
}
