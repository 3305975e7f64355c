use crate::domain::model::AreaUnit;
use crate::inference::client::{InferenceSettings, DEFAULT_BASE_URL, DEFAULT_MODEL_VERSION};
use crate::utils::error::{FarmError, Result};
use crate::utils::validation::{
    validate_path, validate_positive_number, validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub calculator: CalculatorConfig,
    #[serde(default)]
    pub export: ExportConfig,
    pub inference: Option<InferenceConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalculatorConfig {
    pub default_unit: Option<AreaUnit>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    pub output_path: Option<String>,
    pub archive: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    pub base_url: Option<String>,
    pub api_token: Option<String>,
    pub model_version: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub max_attempts: Option<u32>,
    pub max_new_tokens: Option<u32>,
    pub temperature: Option<f64>,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FarmError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| FarmError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${REPLICATE_API_TOKEN})，未設定者保留原字串
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn default_unit(&self) -> AreaUnit {
        self.calculator.default_unit.unwrap_or_default()
    }

    pub fn output_path(&self) -> &str {
        self.export.output_path.as_deref().unwrap_or("./output")
    }

    pub fn archive_enabled(&self) -> bool {
        self.export.archive.unwrap_or(false)
    }

    /// Builds client settings. A token passed by the caller wins over the file.
    pub fn inference_settings(&self, api_token: Option<&str>) -> Result<InferenceSettings> {
        let section = self.inference.as_ref();

        let token = api_token
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .or_else(|| section.and_then(|s| s.api_token.clone()))
            .filter(|t| !t.is_empty() && !env_var_pattern().is_match(t))
            .ok_or_else(|| FarmError::MissingConfigError {
                field: "inference.api_token".to_string(),
            })?;

        let mut settings = InferenceSettings::new(token).with_base_url(
            section
                .and_then(|s| s.base_url.clone())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        );

        if let Some(section) = section {
            settings.model_version = section
                .model_version
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL_VERSION.to_string());
            if let Some(tokens) = section.max_new_tokens {
                settings.max_new_tokens = tokens;
            }
            if let Some(temperature) = section.temperature {
                settings.temperature = temperature;
            }
            let interval = section
                .poll_interval_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| settings.poll.interval());
            let max_attempts = section.max_attempts.unwrap_or(settings.poll.max_attempts());
            settings = settings.with_poll(interval, max_attempts);
        }

        Ok(settings)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        if let Some(path) = &self.export.output_path {
            validate_path("export.output_path", path)?;
        }

        if let Some(inference) = &self.inference {
            if let Some(url) = &inference.base_url {
                validate_url("inference.base_url", url)?;
            }
            if let Some(attempts) = inference.max_attempts {
                validate_positive_number("inference.max_attempts", attempts as u64, 1)?;
            }
            if let Some(interval) = inference.poll_interval_ms {
                validate_positive_number("inference.poll_interval_ms", interval, 1)?;
            }
            if let Some(temperature) = inference.temperature {
                validate_range("inference.temperature", temperature, 0.0, 2.0)?;
            }
        }

        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
