use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoucherError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Directory walk failed: {0}")]
    WalkError(#[from] walkdir::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("XML parsing error: {message}")]
    XmlError { message: String },

    #[error("Spreadsheet error in '{path}': {message}")]
    SpreadsheetError { path: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

impl VoucherError {
    /// 把任何可顯示的 XML 相關錯誤包成 `XmlError`
    pub fn xml<E: std::fmt::Display>(error: E) -> Self {
        VoucherError::XmlError {
            message: error.to_string(),
        }
    }

    pub fn spreadsheet(path: impl Into<String>, message: impl Into<String>) -> Self {
        VoucherError::SpreadsheetError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// 給終端使用者看的簡短訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            VoucherError::MissingConfigError { field } => match field.as_str() {
                "project_roots" => "请先选择教师文件目录和财务文件目录。(no project root configured)".to_string(),
                "source_roots" => "请先选择教师文件目录和财务文件目录。(no source root configured)".to_string(),
                _ => format!("Missing required setting: {}", field),
            },
            VoucherError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            VoucherError::ConfigValidationError { field, message } => {
                format!("Configuration problem in '{}': {}", field, message)
            }
            VoucherError::IoError(e) => format!("File system error: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            VoucherError::MissingConfigError { .. } => {
                "Pass at least one --project-root and one --source-root, or list them under [roots] in the config file"
            }
            VoucherError::InvalidConfigValueError { .. } => {
                "Fix the setting named above in the command-line flags or the config file"
            }
            VoucherError::ConfigValidationError { .. } | VoucherError::ConfigError { .. } => {
                "Make sure the config file exists and is valid TOML"
            }
            VoucherError::IoError(_) | VoucherError::WalkError(_) => {
                "Check file permissions and free disk space, then run again"
            }
            _ => "Run again with --verbose for more details",
        }
    }
}

pub type Result<T> = std::result::Result<T, VoucherError>;
