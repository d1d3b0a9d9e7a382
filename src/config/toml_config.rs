use crate::config::{default_extensions, DEFAULT_DESTINATION_DIR, DEFAULT_MARKER};
use crate::core::ConfigProvider;
use crate::utils::error::{Result, VoucherError};
use crate::utils::validation::{validate_batch_config, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[cfg(feature = "cli")]
use crate::config::CliConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub roots: RootsConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RootsConfig {
    #[serde(default)]
    pub projects: Vec<PathBuf>,
    #[serde(default)]
    pub sources: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    #[serde(default = "default_marker")]
    pub marker: String,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_destination_dir")]
    pub destination_dir: String,
    pub log_file: Option<PathBuf>,
}

fn default_marker() -> String {
    DEFAULT_MARKER.to_string()
}

fn default_destination_dir() -> String {
    DEFAULT_DESTINATION_DIR.to_string()
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            marker: default_marker(),
            extensions: default_extensions(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            destination_dir: default_destination_dir(),
            log_file: None,
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| VoucherError::ConfigError {
            message: format!("Cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| VoucherError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${VOUCHER_ROOT})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        static PLACEHOLDER: OnceLock<regex::Regex> = OnceLock::new();
        let re = match PLACEHOLDER.get() {
            Some(re) => re,
            None => {
                let compiled = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| {
                    VoucherError::ConfigError {
                        message: format!("Invalid placeholder pattern: {}", e),
                    }
                })?;
                PLACEHOLDER.get_or_init(|| compiled)
            }
        };

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    /// CLI 指定的根目錄清單整組取代檔案中的；其餘選項只有非預設值才覆寫
    #[cfg(feature = "cli")]
    pub fn with_cli_overrides(mut self, cli: &CliConfig) -> Self {
        if !cli.project_roots.is_empty() {
            self.roots.projects = cli.project_roots.clone();
        }
        if !cli.source_roots.is_empty() {
            self.roots.sources = cli.source_roots.clone();
        }
        if cli.has_custom_marker() {
            self.extract.marker = cli.marker.clone();
        }
        if cli.has_custom_extensions() {
            self.extract.extensions = cli.extensions.clone();
        }
        if cli.has_custom_destination() {
            self.output.destination_dir = cli.destination_dir.clone();
        }
        if cli.log_file.is_some() {
            self.output.log_file = cli.log_file.clone();
        }
        self
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_batch_config(self)
    }
}

impl ConfigProvider for TomlConfig {
    fn project_roots(&self) -> &[PathBuf] {
        &self.roots.projects
    }

    fn source_roots(&self) -> &[PathBuf] {
        &self.roots.sources
    }

    fn identifier_marker(&self) -> &str {
        &self.extract.marker
    }

    fn destination_dir_name(&self) -> &str {
        &self.output.destination_dir
    }

    fn spreadsheet_extensions(&self) -> &[String] {
        &self.extract.extensions
    }

    fn log_file(&self) -> Option<&Path> {
        self.output.log_file.as_deref()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
