use crate::core::presentation::DisplayOptions;
use crate::domain::model::{FieldFilter, FilterConfig, Operator};
use crate::domain::ports::KeyValueStore;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};

pub const FILTER_VALUES_KEY: &str = "filter_values";
pub const HIDE_WITHOUT_NUTRITION_KEY: &str = "hide_without_nutrition";
pub const HIDE_NON_MATCHING_KEY: &str = "hide_non_matching";
pub const ONLY_PROTEIN_MORE_THAN_FAT_KEY: &str = "only_protein_more_than_fat";

/// 上次使用的篩選條件與顯示選項
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preferences {
    pub filter: FilterConfig,
    pub display: DisplayOptions,
}

/// 儲存格式沿用 `{proteinOp, proteinVal, ...}`
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilterValues {
    protein_op: Option<String>,
    protein_val: Option<f64>,
    fat_op: Option<String>,
    fat_val: Option<f64>,
    carbs_op: Option<String>,
    carbs_val: Option<f64>,
    calories_op: Option<String>,
    calories_val: Option<f64>,
}

fn merge_field(op: Option<String>, value: Option<f64>, default: FieldFilter) -> FieldFilter {
    FieldFilter {
        op: op
            .filter(|op| !op.is_empty())
            .map(Operator::from)
            .unwrap_or(default.op),
        threshold: value.unwrap_or(default.threshold),
    }
}

impl FilterValues {
    fn from_config(config: &FilterConfig) -> Self {
        Self {
            protein_op: Some(config.protein.op.to_string()),
            protein_val: Some(config.protein.threshold),
            fat_op: Some(config.fat.op.to_string()),
            fat_val: Some(config.fat.threshold),
            carbs_op: Some(config.carbs.op.to_string()),
            carbs_val: Some(config.carbs.threshold),
            calories_op: Some(config.calories.op.to_string()),
            calories_val: Some(config.calories.threshold),
        }
    }

    fn into_config(self, protein_dominant_only: bool) -> FilterConfig {
        let defaults = FilterConfig::default();
        FilterConfig {
            protein: merge_field(self.protein_op, self.protein_val, defaults.protein),
            fat: merge_field(self.fat_op, self.fat_val, defaults.fat),
            carbs: merge_field(self.carbs_op, self.carbs_val, defaults.carbs),
            calories: merge_field(self.calories_op, self.calories_val, defaults.calories),
            protein_dominant_only,
        }
    }
}

pub struct PreferenceStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> PreferenceStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// 讀取失敗時回到預設值
    pub fn load(&self) -> Preferences {
        let values = match self.store.get(FILTER_VALUES_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("⚠️ Ignoring malformed saved filter values: {}", e);
                FilterValues::default()
            }),
            Ok(None) => FilterValues::default(),
            Err(e) => {
                tracing::warn!("⚠️ Failed to read saved filter values: {}", e);
                FilterValues::default()
            }
        };

        Preferences {
            filter: values.into_config(self.flag(ONLY_PROTEIN_MORE_THAN_FAT_KEY)),
            display: DisplayOptions {
                hide_without_nutrition: self.flag(HIDE_WITHOUT_NUTRITION_KEY),
                hide_non_matching: self.flag(HIDE_NON_MATCHING_KEY),
            },
        }
    }

    pub fn save(&self, preferences: &Preferences) -> Result<()> {
        let values = serde_json::to_string(&FilterValues::from_config(&preferences.filter))?;
        self.store.set(FILTER_VALUES_KEY, &values)?;
        self.set_flag(HIDE_WITHOUT_NUTRITION_KEY, preferences.display.hide_without_nutrition)?;
        self.set_flag(HIDE_NON_MATCHING_KEY, preferences.display.hide_non_matching)?;
        self.set_flag(
            ONLY_PROTEIN_MORE_THAN_FAT_KEY,
            preferences.filter.protein_dominant_only,
        )?;
        tracing::debug!("Saved filter preferences");
        Ok(())
    }

    fn flag(&self, key: &str) -> bool {
        matches!(self.store.get(key), Ok(Some(value)) if value == "true")
    }

    fn set_flag(&self, key: &str, value: bool) -> Result<()> {
        self.store.set(key, if value { "true" } else { "false" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::MemoryStore;

    #[test]
    fn test_load_without_saved_values_gives_defaults() {
        let prefs = PreferenceStore::new(MemoryStore::new()).load();
        assert_eq!(prefs, Preferences::default());
    }

    #[test]
    fn test_save_then_load() {
        let store = MemoryStore::new();
        let prefs = Preferences {
            filter: FilterConfig {
                protein: FieldFilter::new(">", 15.0),
                fat: FieldFilter::new("<", 2.0),
                carbs: FieldFilter::new("=", 5.0),
                calories: FieldFilter::new("<=", 90.0),
                protein_dominant_only: true,
            },
            display: DisplayOptions {
                hide_without_nutrition: true,
                hide_non_matching: false,
            },
        };

        PreferenceStore::new(store.clone()).save(&prefs).unwrap();

        assert_eq!(store.get(HIDE_NON_MATCHING_KEY).unwrap().as_deref(), Some("false"));
        assert_eq!(PreferenceStore::new(store).load(), prefs);
    }

    #[test]
    fn test_partial_filter_values_fall_back_per_field() {
        let store = MemoryStore::new();
        store
            .set(FILTER_VALUES_KEY, r#"{"proteinOp": ">", "proteinVal": 20, "fatOp": ""}"#)
            .unwrap();

        let prefs = PreferenceStore::new(store).load();

        assert_eq!(prefs.filter.protein, FieldFilter::new(">", 20.0));
        assert_eq!(prefs.filter.fat, FieldFilter::new("<=", 10.0));
        assert_eq!(prefs.filter.calories, FieldFilter::new("<=", 200.0));
    }

    #[test]
    fn test_malformed_filter_values_are_ignored() {
        let store = MemoryStore::new();
        store.set(FILTER_VALUES_KEY, "[1, 2").unwrap();
        store.set(ONLY_PROTEIN_MORE_THAN_FAT_KEY, "true").unwrap();

        let prefs = PreferenceStore::new(store).load();

        assert_eq!(prefs.filter.protein, FilterConfig::default().protein);
        assert!(prefs.filter.protein_dominant_only);
    }
}
