use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::platform;
use crate::fetch::DEFAULT_MAX_CONSECUTIVE_FAILURES;
use crate::model::ModelSpec;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default = "default_models")]
    pub models: Vec<ModelSpec>,
    #[serde(default = "default_parameters")]
    pub parameters: Vec<LabeledCode>,
    #[serde(default = "default_regions")]
    pub regions: Vec<LabeledCode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Give up on a sequence after this many missing hours in a row.
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
    /// Reuse frames already on disk from an earlier fetch.
    #[serde(default)]
    pub reuse_cached: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

/// User-configurable paths for downloaded frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory frames are written to.
    /// Defaults to `~/.cache/wxloop/frames`.
    #[serde(default = "default_frames_dir")]
    pub frames_dir: PathBuf,
}

/// A human-readable label and the code the tile server expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledCode {
    pub label: String,
    pub code: String,
}

impl LabeledCode {
    fn new(label: &str, code: &str) -> Self {
        Self {
            label: label.to_string(),
            code: code.to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_consecutive_failures: default_max_consecutive_failures(),
            reuse_cached: false,
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            frames_dir: default_frames_dir(),
        }
    }
}

fn default_user_agent() -> String {
    format!("wxloop/{}", env!("CARGO_PKG_VERSION"))
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_consecutive_failures() -> u32 {
    DEFAULT_MAX_CONSECUTIVE_FAILURES
}

fn default_frame_interval_ms() -> u64 {
    200
}

fn default_frames_dir() -> PathBuf {
    platform::cache_dir().join("frames")
}

fn default_models() -> Vec<ModelSpec> {
    vec![
        ModelSpec::new("GFS", "gfs", "https://m1o.pivotalweather.com"),
        ModelSpec::new("NAM", "nam", "https://m1o.pivotalweather.com"),
        ModelSpec::new("HRRR", "hrrr", "https://m2o.pivotalweather.com"),
        ModelSpec::new("ECMWF", "ecmwf_full", "https://m1o.pivotalweather.com"),
    ]
}

fn default_parameters() -> Vec<LabeledCode> {
    [
        // Severe
        ("Composite Reflectivity", "refcmp"),
        ("Supercell Composite", "scp"),
        ("Significant Tornado", "stp"),
        ("Surface-Based CAPE", "sbcape"),
        ("Most Unstable CAPE", "mucape"),
        ("Updraft Helicity (0-3km)", "uh03_max"),
        ("Storm Relative Helicity (0-3km)", "srh03"),
        ("Surface-500mb Bulk Shear", "bs0500"),
        // Winter
        ("Precipitation Type", "prateptype_cat-imp"),
        ("24hr Kuchera Snow Accum", "snku_024h-imp"),
        ("Snow Depth", "snod-imp"),
        // Synoptic
        ("Surface Temp", "sfct-imp"),
        ("2m Dewpoint", "sfctd-imp"),
        ("Surface Relative Humidity", "sfcrh"),
        ("Mean Sea Level Pressure", "pmsl_mslp"),
        ("10m Wind", "10mwind"),
        ("24hr Total Precipitation", "qpf_024h-imp"),
        // Upper air
        ("500mb Height & Vorticity", "500hv"),
    ]
    .iter()
    .map(|(label, code)| LabeledCode::new(label, code))
    .collect()
}

fn default_regions() -> Vec<LabeledCode> {
    [
        ("Continental US", "conus"),
        ("Northeast US", "us_ne"),
        ("Southeast US", "us_se"),
        ("Midwest US", "us_mw"),
        ("South Central US", "us_sc"),
        ("North Central US", "us_nc"),
        ("Southwest US", "us_sw"),
        ("West Coast US", "us_wn"),
        ("Pacific Northwest", "us_pnw"),
        ("North America", "n_america"),
        ("Canada", "canada"),
        ("Alaska", "alaska"),
        ("Europe", "europe"),
    ]
    .iter()
    .map(|(label, code)| LabeledCode::new(label, code))
    .collect()
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        if config.models.is_empty() {
            anyhow::bail!("config lists no models");
        }
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            fetch: FetchConfig::default(),
            playback: PlaybackConfig::default(),
            paths: PathsConfig::default(),
            models: default_models(),
            parameters: default_parameters(),
            regions: default_regions(),
        }
    }
}
