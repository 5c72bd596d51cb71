// src/models/selectors.rs

//! CSS selectors for scraping listing cards off a search-results page.

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// CSS selectors for scraping a search-results page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSelectors {
    /// Selector for each listing card
    #[serde(default = "defaults::card")]
    pub card: String,

    /// Title element within a card
    #[serde(default = "defaults::title")]
    pub title: String,

    /// Price element within a card (value read from `price_attr`)
    #[serde(default = "defaults::price")]
    pub price: String,

    #[serde(default = "defaults::price_attr")]
    pub price_attr: String,

    /// Link element within a card (value read from `href`)
    #[serde(default = "defaults::link")]
    pub link: String,

    /// Optional posted-date element
    #[serde(default = "defaults::date")]
    pub date: String,

    /// Optional seller rating element
    #[serde(default = "defaults::seller_rating")]
    pub seller_rating: String,

    /// Card attribute holding the site-assigned listing id
    #[serde(default = "defaults::id_attr")]
    pub id_attr: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            card: defaults::card(),
            title: defaults::title(),
            price: defaults::price(),
            price_attr: defaults::price_attr(),
            link: defaults::link(),
            date: defaults::date(),
            seller_rating: defaults::seller_rating(),
            id_attr: defaults::id_attr(),
        }
    }
}

/// Parsed form of [`ListingSelectors`], built once per extractor.
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    pub card: Selector,
    pub title: Selector,
    pub price: Selector,
    pub price_attr: String,
    pub link: Selector,
    pub date: Selector,
    pub seller_rating: Selector,
    pub id_attr: String,
}

impl ListingSelectors {
    /// Parse every selector, failing on the first invalid one.
    pub fn compile(&self) -> Result<CompiledSelectors> {
        Ok(CompiledSelectors {
            card: parse_selector(&self.card)?,
            title: parse_selector(&self.title)?,
            price: parse_selector(&self.price)?,
            price_attr: self.price_attr.clone(),
            link: parse_selector(&self.link)?,
            date: parse_selector(&self.date)?,
            seller_rating: parse_selector(&self.seller_rating)?,
            id_attr: self.id_attr.clone(),
        })
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

mod defaults {
    pub fn card() -> String {
        r#"div[data-marker="item"]"#.into()
    }
    pub fn title() -> String {
        r#"h3[itemprop="name"]"#.into()
    }
    pub fn price() -> String {
        r#"meta[itemprop="price"]"#.into()
    }
    pub fn price_attr() -> String {
        "content".into()
    }
    pub fn link() -> String {
        r#"a[itemprop="url"]"#.into()
    }
    pub fn date() -> String {
        r#"p[data-marker="item-date"]"#.into()
    }
    pub fn seller_rating() -> String {
        r#"span[data-marker="seller-rating/score"]"#.into()
    }
    pub fn id_attr() -> String {
        "data-item-id".into()
    }
}
