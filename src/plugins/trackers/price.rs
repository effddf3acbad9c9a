use rust_decimal::Decimal;
use scraper::{Html, Selector};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::config::TrackerConfig;
use crate::models::Listing;
use crate::plugins::traits::ListingParser;
use crate::utils::error::{AppError, Result};

/// Parses pages that render the price as two sibling elements, a whole part
/// and a cents part (`<span class="a-price-whole">29.</span>
/// <span class="a-price-fraction">99</span>`).
pub struct SplitPriceParser {
    title_selector: Selector,
    title_selector_src: String,
    whole_selector: Selector,
    fraction_selector: Selector,
}

impl SplitPriceParser {
    pub fn new(title: &str, whole: &str, fraction: &str) -> Result<Self> {
        Ok(Self {
            title_selector: parse_selector(title)?,
            title_selector_src: title.to_string(),
            whole_selector: parse_selector(whole)?,
            fraction_selector: parse_selector(fraction)?,
        })
    }

    pub fn from_config(config: &TrackerConfig) -> Result<Self> {
        Self::new(
            &config.title_selector,
            &config.price_whole_selector,
            &config.price_fraction_selector,
        )
    }

    fn extract_price(&self, document: &Html) -> Option<Decimal> {
        let whole = first_text(document, &self.whole_selector)?;
        let fraction = first_text(document, &self.fraction_selector)?;
        combine_price_parts(&whole, &fraction)
    }
}

impl ListingParser for SplitPriceParser {
    fn name(&self) -> &str {
        "split-price"
    }

    fn parse(&self, html: &str) -> Result<Listing> {
        let document = Html::parse_document(html);

        let title = first_text(&document, &self.title_selector)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Extraction {
                field: "title".to_string(),
                selector: self.title_selector_src.clone(),
            })?;

        let price = self.extract_price(&document);
        match price {
            Some(p) => debug!(%title, price = %p, "listing parsed"),
            None => warn!(%title, "price elements missing or malformed, recording no price"),
        }

        Ok(Listing { title, price })
    }
}

/// `whole + fraction / 100`. Thousands separators, whitespace and a trailing
/// decimal point are stripped from the whole part; both parts must be digits.
pub fn combine_price_parts(whole: &str, fraction: &str) -> Option<Decimal> {
    let whole: String = whole
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    let whole = whole.trim_end_matches('.');
    let fraction = fraction.trim();

    if !is_digits(whole) || !is_digits(fraction) {
        return None;
    }

    let whole = Decimal::from_str(whole).ok()?;
    let fraction = Decimal::from_str(fraction).ok()?;
    whole.checked_add(fraction / Decimal::ONE_HUNDRED)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>())
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| AppError::Selector(format!("{}: {}", selector, e)))
}
