// Extraction settings persistence
use crate::extractor::classifier::ClassifierConfig;
use crate::extractor::enums::EnumSectionConfig;
use crate::extractor::extended::ExtendedLayout;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything that tunes an extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub classifier: ClassifierConfig,
    pub enum_sections: EnumSectionConfig,
    /// Known extended instruction set layouts
    pub extended: Vec<ExtendedLayout>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            enum_sections: EnumSectionConfig::default(),
            extended: vec![ExtendedLayout::glsl_std_450(), ExtendedLayout::opencl_std()],
        }
    }
}

impl ExtractConfig {
    /// Load settings from a JSON file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config: ExtractConfig = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            Ok(config)
        } else {
            log::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Layout registered under `name`, matched against the language
    /// (`OpenCL.std`) or the full key (`GLSL.std.450`).
    pub fn layout(&self, name: &str) -> Option<&ExtendedLayout> {
        self.extended
            .iter()
            .find(|layout| layout.key() == name || layout.language == name)
    }
}
