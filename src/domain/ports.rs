use crate::domain::model::{BatchResult, EvaluationOutcome};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 持久化的 key-value 儲存（依 namespace 存取整段文字）
pub trait KeyValueStore: Send + Sync {
    fn get(&self, namespace: &str) -> Result<Option<String>>;
    fn set(&self, namespace: &str, value: &str) -> Result<()>;
    fn remove(&self, namespace: &str) -> Result<()>;
}

/// 取得商品頁面原始 HTML
#[async_trait]
pub trait MarkupSource: Send + Sync {
    async fn fetch(&self, source_id: &str) -> Result<String>;
}

/// 每處理完一個商品就會被呼叫
pub trait BatchObserver: Send {
    fn on_item(&mut self, source_id: &str, outcome: &EvaluationOutcome, progress: &BatchResult);
}

impl<F> BatchObserver for F
where
    F: FnMut(&str, &EvaluationOutcome, &BatchResult) + Send,
{
    fn on_item(&mut self, source_id: &str, outcome: &EvaluationOutcome, progress: &BatchResult) {
        self(source_id, outcome, progress)
    }
}

/// 不做任何事的 observer
pub struct NullObserver;

impl BatchObserver for NullObserver {
    fn on_item(&mut self, _source_id: &str, _outcome: &EvaluationOutcome, _progress: &BatchResult) {}
}
