use crate::domain::ports::MarkupSource;
use crate::utils::error::{NutritionError, Result};
use scraper::{Html, Selector};
use url::Url;

/// 商品詳細頁的路徑特徵
pub const ITEM_PATH_MARKER: &str = "/product/";

/// 依序嘗試，第一個有結果的 selector 決定商品卡片
pub const CARD_SELECTORS: [&str; 4] = [
    r#"article[class*="product"]"#,
    r#"div[class*="product-card"]"#,
    r#"a[href*="/product/"]"#,
    r#"[data-testid*="product"]"#,
];

pub fn is_item_detail(source_id: &str) -> bool {
    source_id.contains(ITEM_PATH_MARKER)
}

fn parse_selector(raw: &str) -> Result<Selector> {
    Selector::parse(raw).map_err(|e| NutritionError::ConfigError {
        message: format!("invalid selector '{}': {:?}", raw, e),
    })
}

/// 從商品列表頁找出每張卡片的連結
pub struct ListingScanner {
    card_selectors: Vec<Selector>,
    anchor: Selector,
}

impl ListingScanner {
    pub fn new() -> Result<Self> {
        let card_selectors = CARD_SELECTORS
            .iter()
            .map(|raw| parse_selector(raw))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            card_selectors,
            anchor: parse_selector("a[href]")?,
        })
    }

    /// 回傳卡片連結（已轉成絕對 URL），保留頁面順序
    pub fn scan(&self, markup: &str, base_url: &Url) -> Vec<String> {
        let document = Html::parse_document(markup);

        let cards = self
            .card_selectors
            .iter()
            .map(|selector| document.select(selector).collect::<Vec<_>>())
            .find(|cards| !cards.is_empty())
            .unwrap_or_default();

        tracing::debug!("Found {} product cards on listing page", cards.len());

        cards
            .into_iter()
            .filter_map(|card| {
                card.value().attr("href").or_else(|| {
                    card.select(&self.anchor)
                        .next()
                        .and_then(|anchor| anchor.value().attr("href"))
                })
            })
            .filter_map(|href| match base_url.join(href) {
                Ok(url) => Some(url.to_string()),
                Err(e) => {
                    tracing::debug!("Skipping unresolvable link '{}': {}", href, e);
                    None
                }
            })
            .collect()
    }

    pub async fn discover<M: MarkupSource + ?Sized>(
        &self,
        source: &M,
        listing_url: &str,
    ) -> Result<Vec<String>> {
        let base_url = Url::parse(listing_url)?;
        let markup = source.fetch(listing_url).await?;
        Ok(self.scan(&markup, &base_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://silpo.ua/category/molochni-produkty-234").unwrap()
    }

    #[test]
    fn test_is_item_detail() {
        assert!(is_item_detail("https://silpo.ua/product/kefir-2-5-123"));
        assert!(!is_item_detail("https://silpo.ua/category/kefir-15"));
        assert!(!is_item_detail(""));
    }

    #[test]
    fn test_scan_article_cards_uses_nested_anchor() {
        let markup = r#"<html><body>
            <article class="product-card-wrapper"><a href="/product/kefir-1">Кефір</a></article>
            <article class="product-card-wrapper"><a href="/product/ryazhanka-2">Ряжанка</a></article>
            <article class="product-card-wrapper"><a href="/promo/week">Акція</a></article>
            <a href="/product/not-a-card">outside</a>
        </body></html>"#;

        let links = ListingScanner::new().unwrap().scan(markup, &base());

        assert_eq!(
            links,
            vec![
                "https://silpo.ua/product/kefir-1".to_string(),
                "https://silpo.ua/product/ryazhanka-2".to_string(),
                "https://silpo.ua/promo/week".to_string(),
            ]
        );
    }

    #[test]
    fn test_scan_falls_back_to_product_anchors() {
        let markup = r#"<ul>
            <li><a href="https://silpo.ua/product/syr-3">Сир</a></li>
            <li><a href="/product/moloko-4">Молоко</a></li>
            <li><a href="/about">Про нас</a></li>
        </ul>"#;

        let links = ListingScanner::new().unwrap().scan(markup, &base());

        assert_eq!(
            links,
            vec![
                "https://silpo.ua/product/syr-3".to_string(),
                "https://silpo.ua/product/moloko-4".to_string(),
            ]
        );
    }

    #[test]
    fn test_scan_card_without_link_is_skipped() {
        let markup = r#"<div class="product-card"><span>no link</span></div>
            <div class="product-card"><a href="/product/jogurt-5">Йогурт</a></div>"#;

        let links = ListingScanner::new().unwrap().scan(markup, &base());
        assert_eq!(links, vec!["https://silpo.ua/product/jogurt-5".to_string()]);
    }

    #[test]
    fn test_scan_no_cards() {
        let links = ListingScanner::new()
            .unwrap()
            .scan("<html><body><p>Порожньо</p></body></html>", &base());
        assert!(links.is_empty());
    }
}
