use crate::core::cancellation::CancellationToken;
use crate::core::listing::ListingScanner;
use crate::core::pipeline::BatchPipeline;
use crate::domain::model::{BatchResult, FilterConfig};
use crate::domain::ports::{BatchObserver, KeyValueStore, MarkupSource};
use crate::utils::error::{NutritionError, Result};

/// 商品來源：列表頁或直接給定的連結
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemSource {
    Listing(String),
    Explicit(Vec<String>),
}

pub struct FilterEngine<S: KeyValueStore, M: MarkupSource> {
    pipeline: BatchPipeline<S, M>,
    scanner: ListingScanner,
}

impl<S: KeyValueStore, M: MarkupSource> FilterEngine<S, M> {
    pub fn new(pipeline: BatchPipeline<S, M>) -> Result<Self> {
        Ok(Self {
            pipeline,
            scanner: ListingScanner::new()?,
        })
    }

    pub fn pipeline(&self) -> &BatchPipeline<S, M> {
        &self.pipeline
    }

    pub async fn collect_items(&self, items: &ItemSource) -> Result<Vec<String>> {
        let ids = match items {
            ItemSource::Explicit(ids) => ids.clone(),
            ItemSource::Listing(url) => {
                tracing::info!("📄 Reading product listing: {}", url);
                self.scanner.discover(self.pipeline.source(), url).await?
            }
        };

        if ids.is_empty() {
            return Err(NutritionError::ProcessingError {
                message: "no products found on this page".to_string(),
            });
        }

        tracing::info!("🔍 Found {} products, starting check", ids.len());
        Ok(ids)
    }

    /// 只有在找不到商品時才會回傳錯誤；批次本身一定會完成
    pub async fn run<O>(
        &self,
        items: &ItemSource,
        config: &FilterConfig,
        cancel: &CancellationToken,
        observer: &mut O,
    ) -> Result<BatchResult>
    where
        O: BatchObserver + ?Sized,
    {
        let ids = self.collect_items(items).await?;
        Ok(self.pipeline.run(&ids, config, cancel, observer).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::MemoryStore;
    use crate::core::cache::ExpiringRecordCache;
    use crate::domain::ports::NullObserver;
    use std::sync::Arc;
    use std::time::Duration;

    struct ListingOnly;

    #[async_trait::async_trait]
    impl MarkupSource for ListingOnly {
        async fn fetch(&self, source_id: &str) -> Result<String> {
            if source_id.ends_with("/category/empty") {
                Ok("<html><body><p>Порожньо</p></body></html>".to_string())
            } else if source_id.contains("/category/") {
                Ok(r#"<div class="product-card"><a href="/product/a-1">A</a></div>
                      <div class="product-card"><a href="/product/b-2">B</a></div>"#
                    .to_string())
            } else {
                Err(NutritionError::HttpStatusError {
                    url: source_id.to_string(),
                    status: 500,
                })
            }
        }
    }

    fn engine() -> FilterEngine<MemoryStore, ListingOnly> {
        let cache = Arc::new(ExpiringRecordCache::open(MemoryStore::new()));
        let pipeline = BatchPipeline::new(cache, ListingOnly)
            .unwrap()
            .with_pacing(Duration::ZERO);
        FilterEngine::new(pipeline).unwrap()
    }

    #[tokio::test]
    async fn test_collect_items_from_listing() {
        let ids = engine()
            .collect_items(&ItemSource::Listing("https://shop.test/category/kefir".to_string()))
            .await
            .unwrap();

        assert_eq!(
            ids,
            vec![
                "https://shop.test/product/a-1".to_string(),
                "https://shop.test/product/b-2".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_listing_is_error() {
        let err = engine()
            .collect_items(&ItemSource::Listing("https://shop.test/category/empty".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, NutritionError::ProcessingError { .. }));
    }

    #[tokio::test]
    async fn test_run_completes_even_when_every_item_fails() {
        let result = engine()
            .run(
                &ItemSource::Listing("https://shop.test/category/kefir".to_string()),
                &FilterConfig::default(),
                &CancellationToken::new(),
                &mut NullObserver,
            )
            .await
            .unwrap();

        assert_eq!(result.processed, 2);
        assert_eq!(result.unavailable, 2);
    }
}
