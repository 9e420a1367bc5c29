use crate::utils::error::{DutyError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(DutyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(DutyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// Every configured extension must be one of `allowed_extensions` (case-insensitive).
pub fn validate_extensions(
    field_name: &str,
    extensions: &[String],
    allowed_extensions: &[&str],
) -> Result<()> {
    if extensions.is_empty() {
        return Err(DutyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: String::new(),
            reason: "At least one tabular file extension is required".to_string(),
        });
    }

    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for extension in extensions {
        let normalized = extension.trim_start_matches('.').to_ascii_lowercase();
        if !allowed_set.contains(normalized.as_str()) {
            return Err(DutyError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: extension.clone(),
                reason: format!(
                    "Unsupported file extension. Allowed extensions: {}",
                    allowed_extensions.join(", ")
                ),
            });
        }
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DutyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}
