//! Forecast-model image sequences: which frames to fetch, fetching them,
//! and playing them back.

pub mod config;
pub mod events;
pub mod fetch;
pub mod frame;
pub mod model;
pub mod platform;
pub mod playback;
pub mod run_time;
pub mod storage;

pub use events::{EventReceiver, EventSender, FetchEvent, Polled};
pub use fetch::{FetchPolicy, FrameError, SequenceFetcher};
pub use frame::{Frame, FrameRequest, FrameSource, Sequence, SequenceRequest, StorageKey};
pub use model::{forecast_hours, Cadence, ModelId, ModelSpec};
pub use playback::{FrameInfo, PlaybackController, PlaybackState, SeekError};
pub use run_time::{generate_run_times, RunTime, RunTimeOption};
pub use storage::{DiskStore, FrameStore, MemoryStore};
