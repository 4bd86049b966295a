pub mod cache;
pub mod cancellation;
pub mod engine;
pub mod extractor;
pub mod listing;
pub mod pipeline;
pub mod predicate;
pub mod presentation;

pub use crate::domain::model::{
    BatchResult, CacheEntry, EvaluationOutcome, FilterConfig, NutritionRecord,
};
pub use crate::domain::ports::{BatchObserver, KeyValueStore, MarkupSource};
pub use crate::utils::error::Result;
