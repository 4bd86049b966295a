use crate::domain::ports::MarkupSource;
use crate::utils::error::{NutritionError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = concat!("nutrition-filter/", env!("CARGO_PKG_VERSION"));

/// 透過 HTTP GET 取得頁面 HTML；不做重試
#[derive(Debug, Clone)]
pub struct HttpMarkupSource {
    client: Client,
}

impl HttpMarkupSource {
    pub fn new(user_agent: Option<&str>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl MarkupSource for HttpMarkupSource {
    async fn fetch(&self, source_id: &str) -> Result<String> {
        tracing::debug!("Fetching {}", source_id);
        let response = self.client.get(source_id).send().await?;

        let status = response.status();
        tracing::debug!("Response status for {}: {}", source_id, status);
        if !status.is_success() {
            return Err(NutritionError::HttpStatusError {
                url: source_id.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = MockServer::start();
        let page_mock = server.mock(|when, then| {
            when.method(GET).path("/product/kefir-1");
            then.status(200)
                .header("Content-Type", "text/html; charset=utf-8")
                .body("<html><body>Білки (г) 3</body></html>");
        });

        let source = HttpMarkupSource::new(None, Some(Duration::from_secs(5))).unwrap();
        let body = source.fetch(&server.url("/product/kefir-1")).await.unwrap();

        page_mock.assert();
        assert!(body.contains("Білки (г) 3"));
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_error() {
        let server = MockServer::start();
        let page_mock = server.mock(|when, then| {
            when.method(GET).path("/product/missing");
            then.status(404);
        });

        let source = HttpMarkupSource::new(Some("test-agent"), None).unwrap();
        let err = source.fetch(&server.url("/product/missing")).await.unwrap_err();

        page_mock.assert();
        assert!(matches!(err, NutritionError::HttpStatusError { status: 404, .. }));
    }
}
