use crate::core::{ConfigProvider, OutputFormat};
use crate::utils::error::{DutyError, Result};
use crate::utils::validation::{validate_extensions, validate_path, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_DATA_DIR: &str = "./data/csvs";
pub const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "tsv"];
const VALID_FORMATS: &[&str] = &["text", "json"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub tariff: TariffConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            extensions: default_extensions(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
        }
    }
}

fn default_data_dir() -> String {
    DEFAULT_DATA_DIR.to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["csv".to_string()]
}

fn default_format() -> String {
    "text".to_string()
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DutyError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| DutyError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${HTS_DATA_DIR})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        use once_cell::sync::Lazy;
        use regex::Regex;

        static ENV_VAR_RE: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var regex"));

        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_path("tariff.data_dir", &self.tariff.data_dir)?;
        validate_extensions("tariff.extensions", &self.tariff.extensions, SUPPORTED_EXTENSIONS)?;

        if !VALID_FORMATS.contains(&self.output.format.to_ascii_lowercase().as_str()) {
            return Err(DutyError::InvalidConfigValueError {
                field: "output.format".to_string(),
                value: self.output.format.clone(),
                reason: format!("Unsupported format. Valid formats: {}", VALID_FORMATS.join(", ")),
            });
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn data_dir(&self) -> &str {
        &self.tariff.data_dir
    }

    fn extensions(&self) -> &[String] {
        &self.tariff.extensions
    }

    fn output_format(&self) -> OutputFormat {
        if self.output.format.eq_ignore_ascii_case("json") {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[tariff]
data_dir = "/srv/hts/csvs"
extensions = ["csv", "tsv"]

[output]
format = "json"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.data_dir(), "/srv/hts/csvs");
        assert_eq!(config.extensions(), &["csv".to_string(), "tsv".to_string()]);
        assert_eq!(config.output_format(), OutputFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.data_dir(), DEFAULT_DATA_DIR);
        assert_eq!(config.extensions(), &["csv".to_string()]);
        assert_eq!(config.output_format(), OutputFormat::Text);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("HTS_DUTY_TEST_DATA_DIR", "/tmp/hts-test");

        let toml_content = r#"
[tariff]
data_dir = "${HTS_DUTY_TEST_DATA_DIR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.tariff.data_dir, "/tmp/hts-test");

        std::env::remove_var("HTS_DUTY_TEST_DATA_DIR");
    }

    #[test]
    fn test_unset_env_var_is_left_in_place() {
        let config = TomlConfig::from_toml_str(
            "[tariff]\ndata_dir = \"${HTS_DUTY_SURELY_UNSET_VARIABLE}\"\n",
        )
        .unwrap();
        assert_eq!(config.tariff.data_dir, "${HTS_DUTY_SURELY_UNSET_VARIABLE}");
    }

    #[test]
    fn test_config_validation() {
        let bad_extension = TomlConfig::from_toml_str("[tariff]\nextensions = [\"xlsx\"]\n").unwrap();
        assert!(bad_extension.validate().is_err());

        let bad_format = TomlConfig::from_toml_str("[output]\nformat = \"yaml\"\n").unwrap();
        assert!(bad_format.validate().is_err());

        let bad_path = TomlConfig::from_toml_str("[tariff]\ndata_dir = \"\"\n").unwrap();
        assert!(bad_path.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_validation_error() {
        let err = TomlConfig::from_toml_str("[tariff\ndata_dir = 1").unwrap_err();
        assert!(matches!(err, DutyError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[tariff]\ndata_dir = \"./fixtures\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.data_dir(), "./fixtures");
    }
}
