//! JSON configuration for the policy model, the UCI engine and the two
//! movers. Every section is optional and falls back to the defaults the
//! engines were tuned with.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    error::BlendError,
    oracle::SharedOracle,
    policy::{Backend, DEFAULT_INPUT_NAME, DEFAULT_OUTPUT_NAME, OnnxPolicy},
    selector::MoverConfig,
    uci::UciOracle,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default = "MoverConfig::mover_a")]
    pub mover_a: MoverConfig,
    #[serde(default = "MoverConfig::mover_b")]
    pub mover_b: MoverConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            model: ModelConfig::default(),
            oracle: OracleConfig::default(),
            mover_a: MoverConfig::mover_a(),
            mover_b: MoverConfig::mover_b(),
        }
    }
}

/// ONNX policy model location and tensor names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_path")]
    pub path: String,
    #[serde(default = "default_input_name")]
    pub input_name: String,
    #[serde(default = "default_output_name")]
    pub output_name: String,
    #[serde(default)]
    pub backend: Backend,
}

fn default_model_path() -> String {
    "policy.onnx".to_string()
}

fn default_input_name() -> String {
    DEFAULT_INPUT_NAME.to_string()
}

fn default_output_name() -> String {
    DEFAULT_OUTPUT_NAME.to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            input_name: default_input_name(),
            output_name: default_output_name(),
            backend: Backend::default(),
        }
    }
}

/// External UCI engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default = "default_engine")]
    pub engine: String,
    #[serde(default = "default_depth")]
    pub depth: u32,
    /// Passed to the engine with `setoption` after the handshake.
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

fn default_engine() -> String {
    "stockfish".to_string()
}

fn default_depth() -> u32 {
    15
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            depth: default_depth(),
            options: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BlendError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| BlendError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, BlendError> {
        serde_json::from_str(text).map_err(|e| BlendError::Config(e.to_string()))
    }

    pub fn load_policy(&self) -> Result<OnnxPolicy, BlendError> {
        self.model.backend.install();
        Ok(OnnxPolicy::from_file(&self.model.path)?
            .with_io_names(&self.model.input_name, &self.model.output_name))
    }

    /// Starts the engine and wraps it in a shared handle.
    pub fn spawn_oracle(&self) -> Result<SharedOracle, BlendError> {
        let options: Vec<(String, String)> = self
            .oracle
            .options
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let engine = UciOracle::spawn(&self.oracle.engine, self.oracle.depth, &options)?;
        Ok(SharedOracle::new(engine))
    }
}
