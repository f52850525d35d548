//! Forecast models and the forecast-hour schedule each one publishes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-side model code.
///
/// Unknown codes are kept verbatim in `Other` so they still produce valid
/// request URLs; they fall back to the sparse default cadence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModelId {
    Gfs,
    Nam,
    Hrrr,
    EcmwfFull,
    Other(String),
}

impl ModelId {
    pub fn code(&self) -> &str {
        match self {
            ModelId::Gfs => "gfs",
            ModelId::Nam => "nam",
            ModelId::Hrrr => "hrrr",
            ModelId::EcmwfFull => "ecmwf_full",
            ModelId::Other(code) => code,
        }
    }

    /// Publication schedule for this model family.
    pub fn cadence(&self) -> Cadence {
        match self {
            ModelId::Gfs | ModelId::EcmwfFull => Cadence::DenseThenSparse,
            ModelId::Nam => Cadence::Hourly { last: 84 },
            ModelId::Hrrr => Cadence::Hourly { last: 48 },
            ModelId::Other(_) => Cadence::Sparse,
        }
    }
}

impl From<&str> for ModelId {
    fn from(code: &str) -> Self {
        match code {
            "gfs" => ModelId::Gfs,
            "nam" => ModelId::Nam,
            "hrrr" => ModelId::Hrrr,
            "ecmwf_full" => ModelId::EcmwfFull,
            other => ModelId::Other(other.to_string()),
        }
    }
}

impl From<String> for ModelId {
    fn from(code: String) -> Self {
        ModelId::from(code.as_str())
    }
}

impl From<ModelId> for String {
    fn from(id: ModelId) -> Self {
        match id {
            ModelId::Other(code) => code,
            known => known.code().to_string(),
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Forecast-hour cadence rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// 3-hourly to F240, then 6-hourly to F384.
    DenseThenSparse,
    /// Every hour from F000 to `last` inclusive.
    Hourly { last: u32 },
    /// 6-hourly to F240.
    Sparse,
}

impl Cadence {
    pub fn hours(self) -> Vec<u32> {
        match self {
            Cadence::DenseThenSparse => (0..=240)
                .step_by(3)
                .chain((246..=384).step_by(6))
                .collect(),
            Cadence::Hourly { last } => (0..=last).collect(),
            Cadence::Sparse => (0..=240).step_by(6).collect(),
        }
    }
}

/// Ordered forecast hours the server is expected to publish for `model`.
///
/// Always non-empty and strictly increasing.
pub fn forecast_hours(model: &ModelId) -> Vec<u32> {
    model.cadence().hours()
}

/// A model entry from the registry: display label, code and tile server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub label: String,
    pub id: ModelId,
    pub base_url: String,
}

impl ModelSpec {
    pub fn new(label: &str, id: &str, base_url: &str) -> Self {
        Self {
            label: label.to_string(),
            id: ModelId::from(id),
            base_url: base_url.to_string(),
        }
    }

    pub fn cadence(&self) -> Cadence {
        self.id.cadence()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strictly_increasing(hours: &[u32]) -> bool {
        hours.windows(2).all(|w| w[0] < w[1])
    }

    #[test]
    fn test_global_models_dense_then_sparse() {
        let mut expected: Vec<u32> = (0..=80).map(|i| i * 3).collect();
        expected.extend((0..=23).map(|i| 246 + i * 6));

        for code in ["gfs", "ecmwf_full"] {
            let hours = forecast_hours(&ModelId::from(code));
            assert_eq!(hours, expected, "{}", code);
            assert!(strictly_increasing(&hours));
        }
        assert_eq!(expected.len(), 105);
        assert_eq!(*expected.last().unwrap(), 384);
    }

    #[test]
    fn test_nam_hourly() {
        let hours = forecast_hours(&ModelId::Nam);
        assert_eq!(hours, (0..=84).collect::<Vec<u32>>());
    }

    #[test]
    fn test_hrrr_hourly() {
        let hours = forecast_hours(&ModelId::Hrrr);
        assert_eq!(hours, (0..=48).collect::<Vec<u32>>());
    }

    #[test]
    fn test_unknown_model_falls_back() {
        let hours = forecast_hours(&ModelId::from("rap"));
        assert_eq!(hours, (0..=40).map(|i| i * 6).collect::<Vec<u32>>());

        let hours = forecast_hours(&ModelId::from(""));
        assert!(!hours.is_empty());
    }

    #[test]
    fn test_model_id_round_trips_codes() {
        assert_eq!(ModelId::from("ecmwf_full"), ModelId::EcmwfFull);
        assert_eq!(ModelId::from("rap").to_string(), "rap");
        assert_eq!(String::from(ModelId::Hrrr), "hrrr");
    }
}
