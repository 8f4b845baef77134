use std::{
    fs::File,
    path::{Path, PathBuf},
    time::Duration,
};

use egui::{Pos2, Vec2};
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    LiveGraphError,
    telemetry::{Retention, TimeAxis, monitor::MonitorSettings},
};

const CONFIG_DIR_NAME: &str = "livegraph";
const CONFIG_FILE_NAME: &str = "config.json";
const DEFAULT_TELEMETRY_FILE: &str = "telemetry.csv";
const REFRESH_RATE_MS: u64 = 1000;
const RENDER_RATE_MS: u64 = 33;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct WindowPosition {
    x: f32,
    y: f32,
}

impl Default for WindowPosition {
    fn default() -> Self {
        Self { x: 100., y: 100. }
    }
}

impl From<WindowPosition> for Pos2 {
    fn from(value: WindowPosition) -> Self {
        Pos2::new(value.x, value.y)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct WindowSize {
    width: f32,
    height: f32,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: 800.,
            height: 600.,
        }
    }
}

impl From<WindowSize> for Vec2 {
    fn from(value: WindowSize) -> Self {
        Vec2::new(value.width, value.height)
    }
}

/// Settings read at startup. The app never writes them back.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub telemetry_file: PathBuf,
    pub refresh_rate_ms: u64,
    pub render_rate_ms: u64,
    pub time_axis: TimeAxis,
    pub retention: Retention,
    pub window_position: WindowPosition,
    pub window_size: WindowSize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            telemetry_file: PathBuf::from(DEFAULT_TELEMETRY_FILE),
            refresh_rate_ms: REFRESH_RATE_MS,
            render_rate_ms: RENDER_RATE_MS,
            time_axis: TimeAxis::default(),
            retention: Retention::default(),
            window_position: WindowPosition::default(),
            window_size: WindowSize::default(),
        }
    }
}

impl AppConfig {
    /// Loads the config from the user's config directory, `None` if there is none.
    pub fn from_local_file() -> Result<Option<Self>, LiveGraphError> {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(None);
        };
        let config_path = config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Self::from_file(&config_path).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, LiveGraphError> {
        let file = File::open(path).map_err(|e| LiveGraphError::ConfigIOError { source: e })?;
        let config: Self = serde_json::from_reader(file)
            .map_err(|e| LiveGraphError::ConfigParseError { source: e })?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LiveGraphError> {
        if self.refresh_rate_ms == 0 {
            return Err(LiveGraphError::InvalidConfig {
                reason: "refresh rate must be at least 1ms".to_string(),
            });
        }
        if self.render_rate_ms == 0 {
            return Err(LiveGraphError::InvalidConfig {
                reason: "render rate must be at least 1ms".to_string(),
            });
        }
        match self.retention {
            Retention::Count(0) => Err(LiveGraphError::InvalidConfig {
                reason: "sample retention must keep at least one sample".to_string(),
            }),
            Retention::Span(span) if !(span > 0.) => Err(LiveGraphError::InvalidConfig {
                reason: format!("retention span must be positive, got {}", span),
            }),
            _ => Ok(()),
        }
    }

    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            refresh_period: Duration::from_millis(self.refresh_rate_ms),
            render_period: Duration::from_millis(self.render_rate_ms),
            retention: self.retention,
            time_axis: self.time_axis,
        }
    }
}
