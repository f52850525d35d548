//! Playback controller: turns a fetched [`Sequence`] into a loopable animation.
//!
//! # States
//! ```text
//!  Empty: nothing loaded; navigation is a no-op
//!  Paused { index }: sequence loaded, frame `index` shown
//!  Playing { index, due }: advancing one frame every interval
//! ```
//!
//! Time is injected: the host calls [`PlaybackController::tick`] with the
//! current instant from its own timer. Pausing drops the pending deadline, so
//! a tick arriving after `pause()` never advances.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::frame::{Frame, Sequence};

pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Empty,
    Paused { index: usize },
    Playing { index: usize, due: Instant },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeekError {
    #[error("no sequence loaded")]
    Empty,
    #[error("frame {index} out of range (sequence has {len} frames)")]
    OutOfRange { index: usize, len: usize },
}

/// Display metadata for the frame under the playhead.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameInfo {
    pub index: usize,
    pub count: usize,
    pub forecast_hour: u32,
    pub valid_time: DateTime<Utc>,
    /// `Model Run: 2024-01-01 00:00Z`
    pub run_label: String,
    /// `Forecast Hour: F012`
    pub hour_label: String,
    /// `Valid Time: 2024-01-01 12:00Z`
    pub valid_label: String,
}

#[derive(Debug)]
pub struct PlaybackController {
    sequence: Option<Sequence>,
    state: PlaybackState,
    interval: Duration,
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}

impl PlaybackController {
    pub fn new(interval: Duration) -> Self {
        Self {
            sequence: None,
            state: PlaybackState::Empty,
            interval,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn sequence(&self) -> Option<&Sequence> {
        self.sequence.as_ref()
    }

    pub fn len(&self) -> usize {
        self.sequence.as_ref().map_or(0, Sequence::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, PlaybackState::Playing { .. })
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            PlaybackState::Empty => None,
            PlaybackState::Paused { index } | PlaybackState::Playing { index, .. } => Some(index),
        }
    }

    pub fn current_frame(&self) -> Option<&Frame> {
        let index = self.current_index()?;
        self.sequence.as_ref()?.frames.get(index)
    }

    /// When the next animation tick is due, if playing.
    pub fn next_due(&self) -> Option<Instant> {
        match self.state {
            PlaybackState::Playing { due, .. } => Some(due),
            _ => None,
        }
    }

    /// Replace whatever was loaded. An empty sequence leaves the controller
    /// `Empty`; otherwise it is paused on the first frame.
    pub fn load(&mut self, sequence: Sequence) {
        if sequence.is_empty() {
            self.sequence = None;
            self.state = PlaybackState::Empty;
        } else {
            self.sequence = Some(sequence);
            self.state = PlaybackState::Paused { index: 0 };
        }
    }

    /// Start animating. The first tick is due immediately.
    pub fn play(&mut self, now: Instant) -> bool {
        match self.state {
            PlaybackState::Paused { index } => {
                self.state = PlaybackState::Playing { index, due: now };
                true
            }
            _ => false,
        }
    }

    pub fn pause(&mut self) -> bool {
        match self.state {
            PlaybackState::Playing { index, .. } => {
                self.state = PlaybackState::Paused { index };
                true
            }
            _ => false,
        }
    }

    pub fn toggle(&mut self, now: Instant) -> bool {
        if self.is_playing() {
            self.pause()
        } else {
            self.play(now)
        }
    }

    pub fn next(&mut self) {
        let len = self.len();
        if let Some(index) = self.current_index() {
            self.set_index((index + 1) % len);
        }
    }

    pub fn prev(&mut self) {
        let len = self.len();
        if let Some(index) = self.current_index() {
            self.set_index((index + len - 1) % len);
        }
    }

    pub fn first(&mut self) {
        if self.current_index().is_some() {
            self.set_index(0);
        }
    }

    pub fn last(&mut self) {
        let len = self.len();
        if self.current_index().is_some() {
            self.set_index(len - 1);
        }
    }

    pub fn seek(&mut self, index: usize) -> Result<(), SeekError> {
        let len = self.len();
        if self.current_index().is_none() {
            return Err(SeekError::Empty);
        }
        if index >= len {
            return Err(SeekError::OutOfRange { index, len });
        }
        self.set_index(index);
        Ok(())
    }

    /// Advance if playing and the deadline has passed. Returns `true` when
    /// the frame changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.state {
            PlaybackState::Playing { due, .. } if now >= due => {
                self.next();
                if let PlaybackState::Playing { index, .. } = self.state {
                    self.state = PlaybackState::Playing {
                        index,
                        due: now + self.interval,
                    };
                }
                true
            }
            _ => false,
        }
    }

    /// Metadata for the current frame, derived from the loaded run each call.
    pub fn current_info(&self) -> Option<FrameInfo> {
        let sequence = self.sequence.as_ref()?;
        let index = self.current_index()?;
        let frame = sequence.frames.get(index)?;
        let valid_time = sequence.run.valid_time(frame.forecast_hour);

        Some(FrameInfo {
            index,
            count: sequence.len(),
            forecast_hour: frame.forecast_hour,
            valid_time,
            run_label: format!(
                "Model Run: {}",
                sequence.run.datetime().format("%Y-%m-%d %H:%MZ")
            ),
            hour_label: format!("Forecast Hour: F{:03}", frame.forecast_hour),
            valid_label: format!("Valid Time: {}", valid_time.format("%Y-%m-%d %H:%MZ")),
        })
    }

    fn set_index(&mut self, new_index: usize) {
        match &mut self.state {
            PlaybackState::Empty => {}
            PlaybackState::Paused { index } | PlaybackState::Playing { index, .. } => {
                *index = new_index;
            }
        }
    }
}
