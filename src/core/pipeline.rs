use crate::core::cache::ExpiringRecordCache;
use crate::core::cancellation::CancellationToken;
use crate::core::extractor::NutritionExtractor;
use crate::core::listing::is_item_detail;
use crate::core::predicate::evaluate;
use crate::domain::model::{BatchResult, EvaluationOutcome, FilterConfig, NutritionRecord};
use crate::domain::ports::{BatchObserver, KeyValueStore, MarkupSource};
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Duration;

/// 每個商品之間的間隔，避免對來源網站造成負擔
pub const DEFAULT_PACING: Duration = Duration::from_millis(100);

/// 依序處理商品：查快取 → 抓取並擷取 → 寫入快取 → 篩選
///
/// 單一商品失敗只會變成 `Unavailable`，不會中斷整批。
pub struct BatchPipeline<S: KeyValueStore, M: MarkupSource> {
    cache: Arc<ExpiringRecordCache<S>>,
    source: M,
    extractor: NutritionExtractor,
    pacing: Duration,
}

impl<S: KeyValueStore, M: MarkupSource> BatchPipeline<S, M> {
    pub fn new(cache: Arc<ExpiringRecordCache<S>>, source: M) -> Result<Self> {
        Ok(Self {
            cache,
            source,
            extractor: NutritionExtractor::new()?,
            pacing: DEFAULT_PACING,
        })
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn cache(&self) -> &ExpiringRecordCache<S> {
        &self.cache
    }

    pub fn source(&self) -> &M {
        &self.source
    }

    pub async fn run<I, T, O>(
        &self,
        source_ids: I,
        config: &FilterConfig,
        cancel: &CancellationToken,
        observer: &mut O,
    ) -> BatchResult
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
        O: BatchObserver + ?Sized,
    {
        let mut result = BatchResult::default();
        let mut pace_pending = false;

        tracing::info!("🔍 Starting nutrition check");

        for source_id in source_ids {
            let source_id = source_id.as_ref();

            if !self.checkpoint(cancel, std::mem::take(&mut pace_pending)).await {
                result.cancelled = true;
                tracing::info!(
                    "⛔ Cancelled after {} items ({} matched)",
                    result.processed,
                    result.matched
                );
                break;
            }

            if !is_item_detail(source_id) {
                tracing::debug!("Skipping non-product link: {}", source_id);
                continue;
            }

            let outcome = self.process_item(source_id, config).await;
            result.record(&outcome);
            observer.on_item(source_id, &outcome, &result);
            pace_pending = true;
        }

        tracing::info!(
            "✅ Checked {} items: {} matched, {} not matched, {} without data",
            result.processed,
            result.matched,
            result.unmatched,
            result.unavailable
        );
        result
    }

    pub async fn process_item(&self, source_id: &str, config: &FilterConfig) -> EvaluationOutcome {
        match self.lookup_or_extract(source_id).await {
            Some(record) => {
                let evaluation = evaluate(&record, config);
                tracing::debug!(
                    "{} → protein {} fat {} carbs {} kcal {} (matched: {})",
                    source_id,
                    record.protein,
                    record.fat,
                    record.carbs,
                    record.calories,
                    evaluation.matched
                );
                EvaluationOutcome::from_evaluation(record, evaluation)
            }
            None => EvaluationOutcome::Unavailable,
        }
    }

    async fn lookup_or_extract(&self, source_id: &str) -> Option<NutritionRecord> {
        if let Some(entry) = self.cache.get(source_id) {
            tracing::debug!("Cache hit: {}", source_id);
            return Some(entry.record);
        }

        let markup = match self.source.fetch(source_id).await {
            Ok(markup) => markup,
            Err(e) => {
                tracing::warn!("⚠️ Failed to fetch nutrition for {}: {}", source_id, e);
                return None;
            }
        };

        let record = self.extractor.extract(&markup);
        match record {
            Some(record) => self.cache.put(source_id, record),
            None => tracing::debug!("No nutrition data found: {}", source_id),
        }
        record
    }

    /// 先等待間隔（可被取消打斷），再檢查是否已取消
    async fn checkpoint(&self, cancel: &CancellationToken, pace: bool) -> bool {
        if pace && !self.pacing.is_zero() {
            tokio::select! {
                _ = tokio::time::sleep(self.pacing) => {}
                _ = cancel.cancelled() => {}
            }
        }
        !cancel.is_cancelled()
    }
}
