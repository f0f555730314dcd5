use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: Logging,
    pub zoom: ZoomCfg,
    pub viewport: ViewportCfg,
    pub gaps: GapsCfg,
}

impl Config {
    pub fn load(path_opt: Option<&Path>) -> Result<Self> {
        let default_path = Path::new("config.toml");
        let path = if let Some(p) = path_opt {
            Some(p)
        } else if default_path.exists() {
            Some(default_path)
        } else {
            None
        };

        let Some(path) = path else {
            return Ok(Config::default());
        };

        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed reading config file: {}", path.display()))?;
        Self::from_toml(&raw)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn to_toml_pretty(&self) -> Result<String> {
        let s = toml::to_string_pretty(self).context("failed serializing config as TOML")?;
        Ok(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub format: String,
    pub debug_sentence_samples: usize,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            debug_sentence_samples: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomCfg {
    pub min_pixels_per_second: f64,
    pub max_pixels_per_second: f64,
    pub step: f64,
    pub initial_pixels_per_second: f64,
}

impl Default for ZoomCfg {
    fn default() -> Self {
        Self {
            min_pixels_per_second: crate::zoom::MIN_PIXELS_PER_SECOND,
            max_pixels_per_second: crate::zoom::MAX_PIXELS_PER_SECOND,
            step: crate::zoom::ZOOM_STEP,
            initial_pixels_per_second: crate::zoom::DEFAULT_PIXELS_PER_SECOND,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportCfg {
    pub width: f64,
    pub height: f64,
    /// Row height used when the host lays sentences out uniformly.
    pub row_height: f64,
    /// Fraction of the viewport width kept clear on each side of the playhead.
    pub safe_zone_buffer: f64,
}

impl Default for ViewportCfg {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            row_height: 48.0,
            safe_zone_buffer: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GapsCfg {
    pub max_gap_seconds: f64,
    pub forced: bool,
}

impl Default for GapsCfg {
    fn default() -> Self {
        Self {
            max_gap_seconds: 0.5,
            forced: false,
        }
    }
}

pub fn init_tracing(logging: &Logging, cli_override_level: Option<&str>) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = cli_override_level.unwrap_or(logging.level.as_str());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let is_json = logging.format.eq_ignore_ascii_case("json");

    // Logs go to stderr so command output on stdout stays machine-readable.
    if is_json {
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .event_format(fmt::format().json())
            .with_target(true)
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .pretty()
            .init();
    }

    tracing::debug!(
        level = level,
        format = logging.format.as_str(),
        "logging initialized"
    );

    Ok(())
}
