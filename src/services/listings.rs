// src/services/listings.rs

//! Listing extraction service.
//!
//! Fetches a search-results page and reads listing cards using configured
//! CSS selectors.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{
    CompiledSelectors, Config, Listing, ListingSelectors, MessagesConfig, SearchConfig,
};
use crate::utils::clean_text;
use crate::utils::http::{create_async_client, fetch_text};
use crate::utils::url::{extract_listing_id, normalize, resolve};

/// Source of search-result page bodies.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetches pages over HTTP with the configured user agent and timeout.
pub struct HttpPageSource {
    client: Client,
}

impl HttpPageSource {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: create_async_client(&config.crawler)?,
        })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self, url: &str) -> Result<String> {
        fetch_text(&self.client, url).await
    }
}

/// Turns search-result markup into [`Listing`] records.
pub struct ListingExtractor {
    selectors: CompiledSelectors,
    base_url: String,
    max_listings: usize,
    currency_suffix: String,
    date_missing: String,
    rating_missing: String,
}

impl ListingExtractor {
    /// Create an extractor, compiling the selectors once.
    pub fn new(
        search: &SearchConfig,
        selectors: &ListingSelectors,
        messages: &MessagesConfig,
    ) -> Result<Self> {
        Ok(Self {
            selectors: selectors.compile()?,
            base_url: search.base_url.clone(),
            max_listings: search.max_listings,
            currency_suffix: search.currency_suffix.clone(),
            date_missing: messages.date_missing.clone(),
            rating_missing: messages.rating_missing.clone(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.search, &config.selectors, &config.messages)
    }

    /// Fetch a search page and extract its listings.
    pub async fn extract(&self, source: &dyn PageSource, url: &str) -> Result<Vec<Listing>> {
        let html = source.fetch(url).await?;
        let listings = self.parse(&html);
        log::debug!("Extracted {} listings from {}", listings.len(), url);
        Ok(listings)
    }

    /// Parse up to `max_listings` cards in document order.
    ///
    /// A card that fails to parse is logged and skipped.
    pub fn parse(&self, html: &str) -> Vec<Listing> {
        let document = Html::parse_document(html);

        document
            .select(&self.selectors.card)
            .take(self.max_listings)
            .enumerate()
            .filter_map(|(position, card)| match self.parse_card(&card) {
                Ok(listing) => Some(listing),
                Err(error) => {
                    log::warn!("Skipping listing card #{}: {}", position + 1, error);
                    None
                }
            })
            .collect()
    }

    fn parse_card(&self, card: &ElementRef) -> Result<Listing> {
        let sel = &self.selectors;

        let title = card
            .select(&sel.title)
            .next()
            .map(|el| clean_text(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::parse("card", "missing title"))?;

        let price = card
            .select(&sel.price)
            .next()
            .and_then(|el| el.value().attr(&sel.price_attr))
            .map(str::trim)
            .ok_or_else(|| AppError::parse(&title, "missing price"))?;
        let price = if self.currency_suffix.is_empty() {
            price.to_string()
        } else {
            format!("{} {}", price, self.currency_suffix)
        };

        let href = card
            .select(&sel.link)
            .next()
            .and_then(|el| el.value().attr("href"))
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| AppError::parse(&title, "missing link"))?;
        let link = normalize(&resolve(&self.base_url, href.trim()));

        let id = card
            .value()
            .attr(&sel.id_attr)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .or_else(|| extract_listing_id(&link))
            .ok_or_else(|| AppError::parse(&title, "missing listing id"))?;

        let date_posted = self.optional_text(card, &sel.date, &self.date_missing);
        let seller_rating = self.optional_text(card, &sel.seller_rating, &self.rating_missing);

        Ok(Listing {
            id,
            title,
            price,
            link,
            date_posted,
            seller_rating,
        })
    }

    fn optional_text(&self, card: &ElementRef, selector: &Selector, fallback: &str) -> String {
        card.select(selector)
            .next()
            .map(|el| clean_text(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{StaticPages, card_html, page_html, serve_once};

    fn extractor() -> ListingExtractor {
        ListingExtractor::from_config(&Config::default()).unwrap()
    }

    #[test]
    fn test_parse_full_card() {
        let html = page_html(&[r#"
            <div data-marker="item" data-item-id="4012345678">
              <a itemprop="url" href="/moskva/videokarty/rx_580_4012345678?context=abc">
                <h3 itemprop="name">  RX 580
                  8GB </h3>
              </a>
              <meta itemprop="price" content="9500">
              <p data-marker="item-date">2 hours ago</p>
              <span data-marker="seller-rating/score">4,9</span>
            </div>"#
            .to_string()]);

        let listings = extractor().parse(&html);
        assert_eq!(listings.len(), 1);
        let listing = &listings[0];
        assert_eq!(listing.id, "4012345678");
        assert_eq!(listing.title, "RX 580 8GB");
        assert_eq!(listing.price, "9500 ₽");
        assert_eq!(
            listing.link,
            "https://www.avito.ru/moskva/videokarty/rx_580_4012345678"
        );
        assert_eq!(listing.date_posted, "2 hours ago");
        assert_eq!(listing.seller_rating, "4,9");
    }

    #[test]
    fn test_missing_optional_fields_use_placeholders() {
        let html = page_html(&[r#"
            <div data-marker="item" data-item-id="1">
              <a itemprop="url" href="/a/item_1"><h3 itemprop="name">B450</h3></a>
              <meta itemprop="price" content="4000">
            </div>"#
            .to_string()]);

        let listings = extractor().parse(&html);
        assert_eq!(listings[0].date_posted, "Date not specified");
        assert_eq!(listings[0].seller_rating, "Rating not specified");
    }

    #[test]
    fn test_malformed_card_is_skipped() {
        let mut cards: Vec<String> = (1..=4).map(card_html).collect();
        // No price element
        cards.insert(
            2,
            r#"<div data-marker="item" data-item-id="999">
                 <a itemprop="url" href="/a/broken_999"><h3 itemprop="name">Broken</h3></a>
               </div>"#
                .to_string(),
        );

        let listings = extractor().parse(&page_html(&cards));
        assert_eq!(listings.len(), 4);
        let ids: Vec<_> = listings.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_caps_at_max_listings() {
        let cards: Vec<String> = (1..=20).map(card_html).collect();
        let listings = extractor().parse(&page_html(&cards));
        assert_eq!(listings.len(), 15);
        assert_eq!(listings[14].id, "15");
    }

    #[test]
    fn test_id_falls_back_to_link() {
        let html = page_html(&[r#"
            <div data-marker="item">
              <a itemprop="url" href="/kazan/platy/b450_4023456789"><h3 itemprop="name">B450</h3></a>
              <meta itemprop="price" content="4000">
            </div>"#
            .to_string()]);

        let listings = extractor().parse(&html);
        assert_eq!(listings[0].id, "4023456789");
    }

    #[test]
    fn test_absolute_link_is_kept() {
        let html = page_html(&[r#"
            <div data-marker="item" data-item-id="5">
              <a itemprop="url" href="https://m.avito.ru/item_5#gallery"><h3 itemprop="name">X</h3></a>
              <meta itemprop="price" content="1">
            </div>"#
            .to_string()]);

        let listings = extractor().parse(&html);
        assert_eq!(listings[0].link, "https://m.avito.ru/item_5");
    }

    #[test]
    fn test_page_without_cards() {
        assert!(extractor().parse("<html><body>Nothing</body></html>").is_empty());
    }

    #[tokio::test]
    async fn test_extract_propagates_fetch_error() {
        let source = StaticPages::new();
        let result = extractor()
            .extract(&source, "https://example.com/unknown")
            .await;
        assert!(matches!(result, Err(AppError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_extract_from_source() {
        let source = StaticPages::new().with_page(
            "https://example.com/s",
            page_html(&[card_html(1), card_html(2)]),
        );
        let listings = extractor()
            .extract(&source, "https://example.com/s")
            .await
            .unwrap();
        assert_eq!(listings.len(), 2);
    }

    #[tokio::test]
    async fn test_http_source_extracts_served_page() {
        let body = page_html(&[card_html(1), card_html(2)]);
        let (url, server) = serve_once("200 OK", &body).await;
        let source = HttpPageSource::new(&Config::default()).unwrap();

        let listings = extractor().extract(&source, &url).await.unwrap();
        assert_eq!(listings.len(), 2);
        assert!(server.await.unwrap().contains("user-agent: mozilla/5.0"));
    }

    #[tokio::test]
    async fn test_http_source_fails_on_server_error() {
        let (url, server) = serve_once("503 Service Unavailable", "").await;
        let source = HttpPageSource::new(&Config::default()).unwrap();

        let result = extractor().extract(&source, &url).await;
        assert!(matches!(result, Err(AppError::Status { status: 503, .. })));
        server.await.unwrap();
    }
}
