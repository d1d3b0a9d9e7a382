use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, VoucherError};
use std::path::{Component, Path, PathBuf};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &Path) -> Result<()> {
    let text = path.to_string_lossy();
    if text.is_empty() {
        return Err(VoucherError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: text.into_owned(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if text.contains('\0') {
        return Err(VoucherError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: text.into_owned(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_required_list<T>(field_name: &str, values: &[T]) -> Result<()> {
    if values.is_empty() {
        return Err(VoucherError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(VoucherError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// 必須是單一的一般路徑元件，例如 `PZIMG`
pub fn validate_dir_name(field_name: &str, name: &str) -> Result<()> {
    validate_non_empty_string(field_name, name)?;

    let mut components = Path::new(name).components();
    let is_plain = !name.contains(|c: char| c == '/' || c == '\\')
        && matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );

    if !is_plain {
        return Err(VoucherError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Must be a single folder name without separators".to_string(),
        });
    }
    Ok(())
}

pub fn validate_extensions(field_name: &str, extensions: &[String]) -> Result<()> {
    if extensions.is_empty() {
        return Err(VoucherError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: String::new(),
            reason: "At least one spreadsheet extension is required".to_string(),
        });
    }

    for extension in extensions {
        if extension.trim().is_empty()
            || extension.contains(|c: char| c == '.' || c == '/' || c == '\\')
        {
            return Err(VoucherError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: extension.clone(),
                reason: "Extensions are bare names like 'xlsx', without dots".to_string(),
            });
        }
    }
    Ok(())
}

/// 路徑格式錯誤才擋下；不存在的目錄只警告，執行時會被略過
fn validate_roots(field_name: &str, roots: &[PathBuf]) -> Result<()> {
    validate_required_list(field_name, roots)?;
    for root in roots {
        validate_path(field_name, root)?;
        if !root.is_dir() {
            tracing::warn!(
                "⚠️ {} entry {} is not an existing directory and will contribute nothing",
                field_name,
                root.display()
            );
        }
    }
    Ok(())
}

/// Everything a batch needs before it may touch the filesystem.
pub fn validate_batch_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    // 兩組根目錄都缺時，先回報專案根目錄
    validate_required_list("project_roots", config.project_roots())?;
    validate_required_list("source_roots", config.source_roots())?;

    validate_roots("project_roots", config.project_roots())?;
    validate_roots("source_roots", config.source_roots())?;

    validate_non_empty_string("marker", config.identifier_marker())?;
    validate_dir_name("destination_dir", config.destination_dir_name())?;
    validate_extensions("extensions", config.spreadsheet_extensions())?;

    if let Some(log_file) = config.log_file() {
        validate_path("log_file", log_file)?;
    }
    Ok(())
}
