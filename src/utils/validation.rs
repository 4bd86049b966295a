use crate::utils::error::{NutritionError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> NutritionError {
    NutritionError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// 商品與列表頁只接受帶主機名稱的 http(s) 連結
pub fn validate_url(field: &str, raw: &str) -> Result<()> {
    let url = Url::parse(raw).map_err(|e| invalid(field, raw, format!("not a URL: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(field, raw, "only http and https pages can be fetched"));
    }
    if url.host_str().is_none() {
        return Err(invalid(field, raw, "URL has no host"));
    }
    Ok(())
}

pub fn validate_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "must not be blank"));
    }
    Ok(())
}

/// 快取目錄
pub fn validate_path(field: &str, path: &str) -> Result<()> {
    validate_non_empty(field, path)?;
    if path.contains('\0') {
        return Err(invalid(field, path.escape_default(), "path contains a NUL byte"));
    }
    Ok(())
}

pub fn validate_at_least(field: &str, value: u64, min: u64) -> Result<()> {
    if value < min {
        return Err(invalid(field, value, format!("must be at least {}", min)));
    }
    Ok(())
}

/// 閾值必須是有限且非負的數字
pub fn validate_threshold(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(field, value, "threshold must be a finite, non-negative number"));
    }
    Ok(())
}
