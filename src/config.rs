use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{Result, EpisubError};
use crate::subtitle::SubtitleFormat;

fn default_input_extension() -> String {
    ".vtt".to_string()
}

fn default_strip_entities() -> Vec<String> {
    vec!["&lrm;".to_string()]
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub convert: ConvertConfig,
    #[serde(default)]
    pub check: CheckConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Name of the output folder created inside the input directory
    pub output_dir_name: String,
    /// Case-sensitive filename suffix selecting input subtitles
    pub input_extension: String,
    /// Format written for every converted file
    pub target_format: SubtitleFormat,
    /// Release tag cut from the file stem when deriving the show folder
    pub release_tag: String,
    /// Literal entities removed from cue text before writing
    pub strip_entities: Vec<String>,
    /// Replace output files that already exist
    pub overwrite: bool,
    /// Write every file straight into the output folder, no per-show nesting
    pub flat: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Case-sensitive filename suffix selecting files to check
    #[serde(default = "default_input_extension")]
    pub input_extension: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            output_dir_name: "out".to_string(),
            input_extension: default_input_extension(),
            target_format: SubtitleFormat::Srt,
            release_tag: ".WEBRip.Netflix".to_string(),
            strip_entities: default_strip_entities(),
            overwrite: false,
            flat: false,
        }
    }
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            input_extension: default_input_extension(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EpisubError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| EpisubError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| EpisubError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Reject settings the conversion run cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.convert.output_dir_name.trim().is_empty() {
            return Err(EpisubError::Config("convert.output_dir_name must not be empty".to_string()));
        }
        if self.convert.input_extension.is_empty() || self.check.input_extension.is_empty() {
            return Err(EpisubError::Config("input_extension must not be empty".to_string()));
        }
        if self.convert.target_format != SubtitleFormat::Srt {
            return Err(EpisubError::UnsupportedFormat(format!(
                "conversion target {:?}, only Srt is written",
                self.convert.target_format
            )));
        }
        Ok(())
    }
}
