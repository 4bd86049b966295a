use crate::core::engine::ItemSource;
use crate::core::pipeline::DEFAULT_PACING;
use crate::core::presentation::DisplayOptions;
use crate::domain::model::FilterConfig;
use crate::utils::error::{NutritionError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CACHE_DIRECTORY: &str = ".nutrition-filter";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub source: SourceConfig,
    pub cache: CacheConfig,
    pub pacing: PacingConfig,
    /// 未設定時使用上次儲存的篩選條件
    pub filter: Option<FilterConfig>,
    pub display: Option<DisplayOptions>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub listing_url: Option<String>,
    pub items: Vec<String>,
    pub user_agent: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub directory: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: DEFAULT_CACHE_DIRECTORY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub interval_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_PACING.as_millis() as u64,
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| NutritionError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SHOP_LISTING_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}")?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn item_source(&self) -> Option<ItemSource> {
        if !self.source.items.is_empty() {
            Some(ItemSource::Explicit(self.source.items.clone()))
        } else {
            self.source.listing_url.clone().map(ItemSource::Listing)
        }
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing.interval_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.source.timeout_seconds.map(Duration::from_secs)
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(url) = &self.source.listing_url {
            validation::validate_url("source.listing_url", url)?;
        }
        for item in &self.source.items {
            validation::validate_url("source.items", item)?;
        }
        if let Some(user_agent) = &self.source.user_agent {
            validation::validate_non_empty("source.user_agent", user_agent)?;
        }
        if let Some(timeout) = self.source.timeout_seconds {
            validation::validate_at_least("source.timeout_seconds", timeout, 1)?;
        }

        validation::validate_path("cache.directory", &self.cache.directory)?;

        if let Some(filter) = &self.filter {
            validate_filter("filter", filter)?;
        }

        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

/// 檢查閾值與運算子
pub fn validate_filter(prefix: &str, filter: &FilterConfig) -> Result<()> {
    let fields = [
        ("protein", &filter.protein),
        ("fat", &filter.fat),
        ("carbs", &filter.carbs),
        ("calories", &filter.calories),
    ];

    for (name, field) in fields {
        validation::validate_threshold(&format!("{}.{}.threshold", prefix, name), field.threshold)?;
        if !field.op.is_recognized() {
            return Err(NutritionError::InvalidConfigValueError {
                field: format!("{}.{}.op", prefix, name),
                value: field.op.to_string(),
                reason: "Operator must be one of <, <=, =, >=, >".to_string(),
            });
        }
    }
    Ok(())
}
