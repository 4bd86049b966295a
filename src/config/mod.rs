#[cfg(feature = "cli")]
pub mod cli;
pub mod preferences;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use preferences::{PreferenceStore, Preferences};
pub use toml_config::TomlConfig;

use crate::core::engine::ItemSource;
use crate::core::presentation::DisplayOptions;
use crate::domain::model::FilterConfig;
use crate::utils::error::{NutritionError, Result};
use std::time::Duration;

/// 合併命令列、設定檔與已儲存偏好後的執行設定
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub items: ItemSource,
    pub filter: FilterConfig,
    pub display: DisplayOptions,
    pub pacing: Duration,
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

#[cfg(feature = "cli")]
impl RunSettings {
    /// 優先順序：命令列 > 設定檔 > 已儲存偏好 > 預設值
    pub fn resolve(cli: &CliConfig, file: &TomlConfig, saved: &Preferences) -> Result<Self> {
        let items = if !cli.items.is_empty() {
            ItemSource::Explicit(cli.items.clone())
        } else if let Some(url) = &cli.listing_url {
            ItemSource::Listing(url.clone())
        } else {
            file.item_source().ok_or_else(|| NutritionError::MissingConfigError {
                field: "source.listing_url (or --listing-url / --item)".to_string(),
            })?
        };

        let mut filter = file.filter.clone().unwrap_or_else(|| saved.filter.clone());
        if let Some(protein) = &cli.protein {
            filter.protein = protein.clone();
        }
        if let Some(fat) = &cli.fat {
            filter.fat = fat.clone();
        }
        if let Some(carbs) = &cli.carbs {
            filter.carbs = carbs.clone();
        }
        if let Some(calories) = &cli.calories {
            filter.calories = calories.clone();
        }
        filter.protein_dominant_only |= cli.only_protein_dominant;
        toml_config::validate_filter("filter", &filter)?;

        let mut display = file.display.unwrap_or(saved.display);
        display.hide_without_nutrition |= cli.hide_without_nutrition;
        display.hide_non_matching |= cli.hide_non_matching;

        let pacing = cli
            .pacing_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| file.pacing());

        Ok(Self {
            items,
            filter,
            display,
            pacing,
            timeout: file.timeout(),
            user_agent: file.source.user_agent.clone(),
        })
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            filter: self.filter.clone(),
            display: self.display,
        }
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;
    use crate::domain::model::FieldFilter;
    use clap::Parser;

    #[test]
    fn test_resolve_prefers_cli_over_file_and_saved() {
        let cli = CliConfig::parse_from([
            "nutrition-filter",
            "--listing-url",
            "https://silpo.ua/category/kefir-15",
            "--fat",
            "<1",
            "--hide-non-matching",
        ]);
        let file = TomlConfig::from_toml_str(
            r#"
[source]
listing_url = "https://silpo.ua/category/ignored"

[filter]
protein = { op = ">", threshold = 5 }

[pacing]
interval_ms = 40
"#,
        )
        .unwrap();
        let saved = Preferences::default();

        let settings = RunSettings::resolve(&cli, &file, &saved).unwrap();

        assert_eq!(
            settings.items,
            ItemSource::Listing("https://silpo.ua/category/kefir-15".to_string())
        );
        assert_eq!(settings.filter.protein, FieldFilter::new(">", 5.0));
        assert_eq!(settings.filter.fat, FieldFilter::new("<", 1.0));
        assert!(settings.display.hide_non_matching);
        assert_eq!(settings.pacing, Duration::from_millis(40));
    }

    #[test]
    fn test_resolve_uses_saved_filter_without_file_filter() {
        let cli = CliConfig::parse_from(["nutrition-filter", "--item", "https://silpo.ua/product/a"]);
        let mut saved = Preferences::default();
        saved.filter.carbs = FieldFilter::new("<", 4.0);
        saved.display.hide_without_nutrition = true;

        let settings = RunSettings::resolve(&cli, &TomlConfig::default(), &saved).unwrap();

        assert_eq!(settings.filter.carbs, FieldFilter::new("<", 4.0));
        assert!(settings.display.hide_without_nutrition);
        assert_eq!(settings.preferences(), saved);
    }

    #[test]
    fn test_resolve_without_items_is_error() {
        let cli = CliConfig::parse_from(["nutrition-filter"]);
        let err = RunSettings::resolve(&cli, &TomlConfig::default(), &Preferences::default())
            .unwrap_err();
        assert!(matches!(err, NutritionError::MissingConfigError { .. }));
    }
}
