pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, RunSettings};

pub use adapters::{FileStore, HttpMarkupSource, MemoryStore};
pub use config::{PreferenceStore, Preferences, TomlConfig};
pub use core::{
    cache::ExpiringRecordCache,
    cancellation::CancellationToken,
    engine::{FilterEngine, ItemSource},
    extractor::NutritionExtractor,
    pipeline::BatchPipeline,
};
pub use domain::model::{BatchResult, EvaluationOutcome, FieldFilter, FilterConfig, NutritionRecord};
pub use utils::error::{NutritionError, Result};
