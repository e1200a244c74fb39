//! Runtime configuration, loaded from environment variables.

use crate::error::{Error, Result};
use crate::output::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which improvement provider to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI-compatible chat completion API
    OpenAi,
    /// Offline rule-based improver
    Rules,
}

/// Pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root for the working directories
    pub data_dir: PathBuf,

    /// Override for the improved-output directory
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Improvement provider
    pub provider: Provider,

    /// API key for the OpenAI provider
    #[serde(skip_serializing, default)]
    pub openai_api_key: Option<String>,

    /// Model name for the OpenAI provider
    pub openai_model: String,

    /// Base URL for the OpenAI provider
    pub openai_base_url: String,

    /// Maximum accepted input size in megabytes
    pub max_file_size_mb: u64,

    /// Output format for improved documents
    pub output_format: OutputFormat,

    /// Rewrite DOCX input in place of its original runs when possible
    pub preserve_formatting: bool,

    /// Printer name, if a specific printer should be used
    pub printer_name: Option<String>,

    /// Fall back to the platform default printer
    pub use_default_printer: bool,

    /// Print each improved document after saving
    pub auto_print: bool,

    /// Improvement retry budget in seconds
    pub max_processing_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: None,
            provider: Provider::Rules,
            openai_api_key: None,
            openai_model: "gpt-4o-mini".to_string(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            max_file_size_mb: 10,
            output_format: OutputFormat::Docx,
            preserve_formatting: true,
            printer_name: None,
            use_default_printer: true,
            auto_print: false,
            max_processing_secs: 300,
        }
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    std::env::var(name)
        .map(|v| v.to_lowercase() == "true" || v == "1")
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from the environment, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let provider = match std::env::var("LLM_PROVIDER").as_deref() {
            Ok("openai") => Provider::OpenAi,
            Ok("rules") | Ok("mock") | Err(_) => Provider::Rules,
            Ok(other) => {
                return Err(Error::Config(format!(
                    "unknown LLM_PROVIDER '{other}' (expected 'openai' or 'rules')"
                )))
            }
        };

        let output_format = match std::env::var("OUTPUT_FORMAT") {
            Ok(name) => OutputFormat::from_name(&name)
                .ok_or_else(|| Error::Config(format!("unknown OUTPUT_FORMAT '{name}'")))?,
            Err(_) => defaults.output_format,
        };

        let max_file_size_mb = match std::env::var("MAX_FILE_SIZE_MB") {
            Ok(v) => v
                .parse()
                .map_err(|_| Error::Config(format!("MAX_FILE_SIZE_MB '{v}' is not a number")))?,
            Err(_) => defaults.max_file_size_mb,
        };

        let max_processing_secs = match std::env::var("MAX_PROCESSING_TIME") {
            Ok(v) => v
                .parse()
                .map_err(|_| Error::Config(format!("MAX_PROCESSING_TIME '{v}' is not a number")))?,
            Err(_) => defaults.max_processing_secs,
        };

        let config = Self {
            data_dir: std::env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            output_dir: None,
            provider,
            openai_api_key: std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            openai_model: std::env::var("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            openai_base_url: std::env::var("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            max_file_size_mb,
            output_format,
            preserve_formatting: env_bool("PRESERVE_FORMATTING", defaults.preserve_formatting),
            printer_name: std::env::var("PRINTER_NAME").ok().filter(|p| !p.is_empty()),
            use_default_printer: env_bool("USE_DEFAULT_PRINTER", defaults.use_default_printer),
            auto_print: env_bool("AUTO_PRINT", defaults.auto_print),
            max_processing_secs,
        };

        config.validate()?;
        Ok(config)
    }

    /// Directory watched for new documents.
    pub fn incoming_dir(&self) -> PathBuf {
        self.data_dir.join("incoming")
    }

    /// Directory for improved output and archived originals.
    pub fn processed_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => self.data_dir.join("processed"),
        }
    }

    /// Directory for processing records.
    pub fn logs_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    /// Create the working directories if they do not exist.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [self.incoming_dir(), self.processed_dir(), self.logs_dir()] {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(())
    }

    /// Maximum accepted input size in bytes.
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }

    /// Check cross-field consistency.
    pub fn validate(&self) -> Result<()> {
        if self.provider == Provider::OpenAi && self.openai_api_key.is_none() {
            return Err(Error::Config(
                "OPENAI_API_KEY must be set when LLM_PROVIDER is 'openai'".into(),
            ));
        }
        if self.max_file_size_mb == 0 {
            return Err(Error::Config("MAX_FILE_SIZE_MB must be positive".into()));
        }
        Ok(())
    }

    /// Use a different data directory root.
    pub fn with_data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.data_dir = dir.as_ref().to_path_buf();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.provider, Provider::Rules);
        assert_eq!(config.max_file_size_mb, 10);
        assert_eq!(config.output_format, OutputFormat::Docx);
        assert!(config.preserve_formatting);
        assert!(!config.auto_print);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_openai_requires_key() {
        let config = Config {
            provider: Provider::OpenAi,
            openai_api_key: None,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_size_limit_rejected() {
        let config = Config {
            max_file_size_mb: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dir_layout() {
        let config = Config::default().with_data_dir("/tmp/docs");
        assert_eq!(config.incoming_dir(), PathBuf::from("/tmp/docs/incoming"));
        assert_eq!(config.processed_dir(), PathBuf::from("/tmp/docs/processed"));
        assert_eq!(config.logs_dir(), PathBuf::from("/tmp/docs/logs"));
    }

    #[test]
    fn test_output_dir_override() {
        let config = Config {
            output_dir: Some(PathBuf::from("/tmp/out")),
            ..Config::default().with_data_dir("/tmp/docs")
        };
        assert_eq!(config.processed_dir(), PathBuf::from("/tmp/out"));
        assert_eq!(config.logs_dir(), PathBuf::from("/tmp/docs/logs"));
    }

    #[test]
    fn test_ensure_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default().with_data_dir(dir.path().join("data"));
        config.ensure_dirs().unwrap();
        assert!(config.incoming_dir().is_dir());
        assert!(config.processed_dir().is_dir());
        assert!(config.logs_dir().is_dir());
    }
}
