use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::agent::DEFAULT_FOUNDATION_MODEL;
use crate::error::{AgentError, Result};

/// Static harness configuration, loaded once at startup.
///
/// Credential resolution itself stays with the AWS SDK default chain; this
/// only carries what the harness decides per agent: model, region, trace
/// flag, and the request timeout applied at the runtime boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HarnessConfig {
    #[serde(default = "default_foundation_model")]
    pub foundation_model: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub enable_trace: bool,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_foundation_model() -> String {
    DEFAULT_FOUNDATION_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            foundation_model: default_foundation_model(),
            region: None,
            enable_trace: false,
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

impl HarnessConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        toml::from_str(&raw)
            .map_err(|err| AgentError::Config(format!("failed to parse configuration: {err}")))
    }

    /// Load from a file, then apply environment overrides.
    pub fn from_env_or_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut cfg = Self::from_file(path)?;
        cfg.apply_env();
        Ok(cfg)
    }

    /// Defaults plus environment overrides, for hosts without a config file.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env();
        cfg
    }

    fn apply_env(&mut self) {
        if let Ok(model) = env::var("BEDROCK_AGENT_MODEL") {
            self.foundation_model = model;
        }
        if let Ok(region) = env::var("AWS_REGION") {
            self.region = Some(region);
        }
        if let Ok(trace) = env::var("BEDROCK_AGENT_TRACE") {
            if let Ok(parsed) = trace.parse::<bool>() {
                self.enable_trace = parsed;
            }
        }
        if let Ok(timeout) = env::var("BEDROCK_AGENT_TIMEOUT_SECS") {
            if let Ok(parsed) = timeout.parse::<u64>() {
                self.request_timeout_secs = parsed;
            }
        }
    }
}
