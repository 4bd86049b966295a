use crate::domain::model::{FieldFilter, Operator};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "nutrition-filter")]
#[command(about = "Check product pages for protein, fat, carbs and calories, and filter them")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Product listing page to scan for product links
    #[arg(long)]
    pub listing_url: Option<String>,

    /// Product page to check (repeatable); overrides the listing page
    #[arg(long = "item", value_name = "URL")]
    pub items: Vec<String>,

    /// Directory for the nutrition cache and saved preferences
    #[arg(long)]
    pub cache_dir: Option<String>,

    /// Protein filter, e.g. ">=10"
    #[arg(long, value_name = "OP_VALUE", value_parser = parse_field_filter)]
    pub protein: Option<FieldFilter>,

    /// Fat filter, e.g. "<=10"
    #[arg(long, value_name = "OP_VALUE", value_parser = parse_field_filter)]
    pub fat: Option<FieldFilter>,

    /// Carbs filter, e.g. "<=20"
    #[arg(long, value_name = "OP_VALUE", value_parser = parse_field_filter)]
    pub carbs: Option<FieldFilter>,

    /// Calories filter, e.g. "<=200"; ignored for products without calorie data
    #[arg(long, value_name = "OP_VALUE", value_parser = parse_field_filter)]
    pub calories: Option<FieldFilter>,

    /// Only match products with more protein than fat
    #[arg(long)]
    pub only_protein_dominant: bool,

    /// Hide products whose nutrition data could not be found
    #[arg(long)]
    pub hide_without_nutrition: bool,

    /// Hide products that do not match the filter
    #[arg(long)]
    pub hide_non_matching: bool,

    /// Delay between products in milliseconds
    #[arg(long)]
    pub pacing_ms: Option<u64>,

    /// Remember the effective filter for the next run
    #[arg(long)]
    pub save_preferences: bool,

    /// Clear the nutrition cache and exit
    #[arg(long)]
    pub clear_cache: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

/// 解析 ">=10"、"< 3,5" 這類字串
pub fn parse_field_filter(raw: &str) -> std::result::Result<FieldFilter, String> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| format!("'{}' has no threshold; expected e.g. \">=10\"", raw))?;
    let (op, value) = raw.split_at(split);

    let op = Operator::from(op);
    if !op.is_recognized() {
        return Err(format!(
            "unknown operator '{}'; expected one of <, <=, =, >=, >",
            op
        ));
    }

    let threshold = value
        .trim()
        .replacen(',', ".", 1)
        .parse::<f64>()
        .map_err(|e| format!("invalid threshold '{}': {}", value, e))?;

    Ok(FieldFilter { op, threshold })
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.listing_url {
            validation::validate_url("--listing-url", url)?;
        }
        for item in &self.items {
            validation::validate_url("--item", item)?;
        }
        if let Some(dir) = &self.cache_dir {
            validation::validate_path("--cache-dir", dir)?;
        }
        Ok(())
    }
}
