use anyhow::Context;
use magma_vulkan::{device_type_score, CompatibilityChecker, DebugSettings, DeviceSelector};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scoring {
    #[default]
    DeviceType,
    FirstCompatible,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MagmaConfig {
    pub validation_layer: bool,
    pub debug_utils_extension: bool,
    pub verbose: bool,
    pub required_extensions: Vec<String>,
    pub scoring: Scoring,
}

impl Default for MagmaConfig {
    fn default() -> Self {
        Self {
            validation_layer: false,
            debug_utils_extension: false,
            verbose: false,
            required_extensions: vec![String::from("VK_KHR_swapchain")],
            scoring: Scoring::default(),
        }
    }
}

impl MagmaConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn debug_settings(&self) -> DebugSettings {
        DebugSettings {
            validation_layer: self.validation_layer,
            debug_utils: self.debug_utils_extension,
            verbose: self.verbose,
        }
    }

    /// Verbose validation messages are forwarded at trace, so verbose mode has to let them through.
    pub fn log_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Trace
        } else {
            log::LevelFilter::Info
        }
    }

    pub fn device_selector(&self) -> DeviceSelector {
        let selector = DeviceSelector::new(CompatibilityChecker::standard(
            self.required_extensions.as_slice(),
        ));
        match self.scoring {
            Scoring::DeviceType => selector.with_score_function(device_type_score),
            Scoring::FirstCompatible => selector,
        }
    }
}
