//! Frame requests, retrieved frames and the sequences they form.

use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::model::ModelId;
use crate::run_time::RunTime;

/// Everything that identifies one sequence: model run, field and map crop.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceRequest {
    pub base_url: String,
    pub model: ModelId,
    pub run: RunTime,
    pub parameter: String,
    pub region: String,
}

impl SequenceRequest {
    pub fn frame(&self, forecast_hour: u32) -> FrameRequest {
        FrameRequest {
            model: self.model.clone(),
            run: self.run,
            forecast_hour,
            parameter: self.parameter.clone(),
            region: self.region.clone(),
        }
    }
}

/// A single forecast-hour image on the tile server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameRequest {
    pub model: ModelId,
    pub run: RunTime,
    pub forecast_hour: u32,
    pub parameter: String,
    pub region: String,
}

impl FrameRequest {
    /// `{base}/maps/models/{model}/{run}/{hour:03}/{parameter}.{region}.png`
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}/maps/models/{}/{}/{:03}/{}.{}.png",
            base_url.trim_end_matches('/'),
            self.model,
            self.run.key(),
            self.forecast_hour,
            self.parameter,
            self.region
        )
    }

    pub fn storage_key(&self) -> StorageKey {
        StorageKey(format!(
            "{}_{}_{:03}_{}_{}",
            self.model,
            self.run.key(),
            self.forecast_hour,
            self.parameter,
            self.region
        ))
    }
}

/// Stable name for a stored frame, `{model}_{run}_{hour:03}_{parameter}_{region}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn file_name(&self) -> String {
        format!("{}.png", self.0)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a frame's image bytes live.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameSource {
    File(PathBuf),
    Memory(Arc<[u8]>),
}

impl fmt::Display for FrameSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameSource::File(path) => write!(f, "{}", path.display()),
            FrameSource::Memory(bytes) => write!(f, "<{} bytes in memory>", bytes.len()),
        }
    }
}

/// A successfully retrieved forecast image.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub forecast_hour: u32,
    pub valid_time: DateTime<Utc>,
    pub source: FrameSource,
}

impl Frame {
    pub fn new(run: RunTime, forecast_hour: u32, source: FrameSource) -> Self {
        Self {
            forecast_hour,
            valid_time: run.valid_time(forecast_hour),
            source,
        }
    }
}

/// Frames of one model run in request order.
///
/// Forecast hours are strictly increasing; gaps are expected where the
/// server did not publish an hour.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    pub run: RunTime,
    pub frames: Vec<Frame>,
}

impl Sequence {
    pub fn new(run: RunTime, frames: Vec<Frame>) -> Self {
        debug_assert!(frames
            .windows(2)
            .all(|w| w[0].forecast_hour < w[1].forecast_hour));
        Self { run, frames }
    }

    pub fn run_key(&self) -> String {
        self.run.key()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn forecast_hours(&self) -> Vec<u32> {
        self.frames.iter().map(|f| f.forecast_hour).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(hour: u32) -> FrameRequest {
        FrameRequest {
            model: ModelId::Gfs,
            run: RunTime::from_key("2024010100").unwrap(),
            forecast_hour: hour,
            parameter: "refcmp".to_string(),
            region: "conus".to_string(),
        }
    }

    #[test]
    fn test_url_zero_pads_hour() {
        assert_eq!(
            request(6).url("https://m1o.pivotalweather.com"),
            "https://m1o.pivotalweather.com/maps/models/gfs/2024010100/006/refcmp.conus.png"
        );
        assert_eq!(
            request(240).url("http://localhost:9000/"),
            "http://localhost:9000/maps/models/gfs/2024010100/240/refcmp.conus.png"
        );
    }

    #[test]
    fn test_storage_key_is_stable() {
        let key = request(12).storage_key();
        assert_eq!(key.as_str(), "gfs_2024010100_012_refcmp_conus");
        assert_eq!(key.file_name(), "gfs_2024010100_012_refcmp_conus.png");
        assert_eq!(key, request(12).storage_key());
        assert_ne!(key, request(15).storage_key());
    }

    #[test]
    fn test_frame_valid_time() {
        let run = RunTime::from_key("2024010100").unwrap();
        let frame = Frame::new(run, 12, FrameSource::File(PathBuf::from("x.png")));
        assert_eq!(frame.valid_time.to_rfc3339(), "2024-01-01T12:00:00+00:00");
    }
}
