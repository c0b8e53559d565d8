//! Stream and unit configuration
//!
//! [`StreamConfig`] is what a single stream needs. [`SessionConfig`] is the
//! YAML file describing every unit of a logging session:
//!
//! ```yaml
//! units:
//!   - name: ins381
//!     packet_type: s1
//!     source: { replay: { path: log.bin, chunk_size: 4096 } }
//!     delivery: backpressure
//!     channel_capacity: 256
//!     reset_command: "55555352007E4F"
//!   - name: ins1000
//!     packet_type: nav
//!     source: { serial: { port: COM15, baud: 230400 } }
//!     delivery: latest
//!     enable: false
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::sink::{DEFAULT_CAPACITY, Delivery};
use crate::sources::ReplaySource;
use crate::types::PacketType;
use crate::{Result, TelemetryError};

/// Reset command sent when a unit asks for a reset without naming one
pub const DEFAULT_RESET_COMMAND: &str = "5555725300FC88";

/// Baud rate of serial units that do not name one
pub const DEFAULT_BAUD: u32 = 115_200;

/// Everything one packet stream needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// Packet type to frame and decode
    pub packet_type: PacketType,
    /// How events reach the consumer
    pub delivery: Delivery,
    /// Bytes written to the device once before reading starts
    pub reset_command: Option<Vec<u8>>,
}

impl StreamConfig {
    pub fn new(packet_type: PacketType) -> Self {
        Self { packet_type, delivery: Delivery::default(), reset_command: None }
    }

    /// Build from a packet type tag such as `"S1"` or `"z1"`.
    ///
    /// Unknown tags fail here, before any I/O.
    pub fn from_tag(tag: &str) -> Result<Self> {
        Ok(Self::new(tag.parse()?))
    }

    pub fn with_delivery(mut self, delivery: Delivery) -> Self {
        self.delivery = delivery;
        self
    }

    pub fn with_reset_command(mut self, command: impl Into<Vec<u8>>) -> Self {
        self.reset_command = Some(command.into());
        self
    }
}

/// Where a unit's bytes come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceConfig {
    /// Previously captured log file
    Replay {
        path: PathBuf,
        /// Bytes per read; absent or 0 reads the whole file at once
        #[serde(default)]
        chunk_size: Option<usize>,
    },
    /// Serial port, opened by the caller
    Serial {
        port: String,
        #[serde(default = "default_baud")]
        baud: u32,
    },
}

fn default_baud() -> u32 {
    DEFAULT_BAUD
}

/// Delivery policy as written in configuration files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// Never miss a sample
    #[default]
    Backpressure,
    /// Only the latest sample matters
    Latest,
}

/// One device in a logging session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitConfig {
    /// Unit name, unique within the session
    pub name: String,
    /// Packet type the unit outputs
    pub packet_type: PacketType,
    pub source: SourceConfig,
    #[serde(default)]
    pub delivery: DeliveryMode,
    /// Queue depth for backpressure delivery
    #[serde(default = "default_capacity")]
    pub channel_capacity: usize,
    /// Send a reset command before reading
    #[serde(default)]
    pub reset: bool,
    /// Reset command as a hex string; implies `reset`
    #[serde(default)]
    pub reset_command: Option<String>,
    /// Disabled units are kept in the file but not started
    #[serde(default = "default_enable")]
    pub enable: bool,
    /// Keys this version does not understand
    #[serde(flatten)]
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_enable() -> bool {
    true
}

impl UnitConfig {
    /// Decoded reset command, if the unit wants one
    pub fn reset_command_bytes(&self) -> Result<Option<Vec<u8>>> {
        match (&self.reset_command, self.reset) {
            (Some(command), _) => {
                let compact: String = command.chars().filter(|c| !c.is_whitespace()).collect();
                if compact.is_empty() {
                    return Err(TelemetryError::config(format!(
                        "unit '{}': reset_command is empty",
                        self.name
                    )));
                }
                Ok(Some(hex::decode(compact)?))
            }
            (None, true) => Ok(Some(hex::decode(DEFAULT_RESET_COMMAND)?)),
            (None, false) => Ok(None),
        }
    }

    /// Validated stream configuration for this unit
    pub fn stream_config(&self) -> Result<StreamConfig> {
        let delivery = match self.delivery {
            DeliveryMode::Backpressure => {
                if self.channel_capacity == 0 {
                    return Err(TelemetryError::config(format!(
                        "unit '{}': channel_capacity must be at least 1",
                        self.name
                    )));
                }
                Delivery::Backpressure { capacity: self.channel_capacity }
            }
            DeliveryMode::Latest => Delivery::Latest,
        };

        Ok(StreamConfig {
            packet_type: self.packet_type,
            delivery,
            reset_command: self.reset_command_bytes()?,
        })
    }

    /// Open the capture file of a replay unit
    pub async fn open_replay(&self) -> Result<ReplaySource> {
        match &self.source {
            SourceConfig::Replay { path, chunk_size } => {
                let source = ReplaySource::open(path).await?;
                Ok(source.with_chunk_size(chunk_size.unwrap_or(0)))
            }
            SourceConfig::Serial { port, .. } => Err(TelemetryError::config(format!(
                "unit '{}' reads from serial port {}, not a capture file",
                self.name, port
            ))),
        }
    }

    /// Resolve a relative replay path against `base`
    fn rebase(&mut self, base: &Path) {
        if let SourceConfig::Replay { path, .. } = &mut self.source {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// All units of a logging session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub units: Vec<UnitConfig>,
}

impl SessionConfig {
    /// Parse and validate a session from YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: SessionConfig = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a session file; relative replay paths are taken from the file's
    /// directory.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| TelemetryError::file_error(path.to_path_buf(), e))?;

        let mut config = Self::from_yaml(&yaml)?;
        if let Some(base) = path.parent() {
            for unit in &mut config.units {
                unit.rebase(base);
            }
        }
        debug!("Loaded session {} with {} units", path.display(), config.units.len());
        Ok(config)
    }

    /// Validate unit names and every unit's stream configuration
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for unit in &self.units {
            if unit.name.trim().is_empty() {
                return Err(TelemetryError::config("unit name must not be empty"));
            }
            if !names.insert(unit.name.as_str()) {
                return Err(TelemetryError::config(format!("duplicate unit name '{}'", unit.name)));
            }
            if !unit.unknown_fields.is_empty() {
                let mut keys: Vec<_> = unit.unknown_fields.keys().map(String::as_str).collect();
                keys.sort_unstable();
                warn!(unit = %unit.name, ?keys, "Ignoring unknown unit keys");
            }
            unit.stream_config()?;
        }
        Ok(())
    }

    /// Units with `enable: true`
    pub fn enabled_units(&self) -> impl Iterator<Item = &UnitConfig> {
        self.units.iter().filter(|unit| unit.enable)
    }

    pub fn unit(&self, name: &str) -> Option<&UnitConfig> {
        self.units.iter().find(|unit| unit.name == name)
    }
}
