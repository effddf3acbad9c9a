// Integration tests for pricewatch
// These tests verify that all components work together correctly

pub mod price_check_tests;

use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};

use pricewatch::config::ScraperConfig;
use pricewatch::plugins::notifiers::{PriceAlertNotifier, StaticCredentials};
use pricewatch::plugins::trackers::SplitPriceParser;
use pricewatch::plugins::traits::{Mailer, PriceAlert, SenderCredentials};
use pricewatch::price_check::PriceChecker;
use pricewatch::price_log::PriceLog;
use pricewatch::scraper::PageFetcher;
use rust_decimal::Decimal;

pub const TEST_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

/// Scraper settings with a short timeout for tests
pub fn test_scraper_config(timeout_secs: u64) -> ScraperConfig {
    ScraperConfig {
        request_timeout: timeout_secs,
        user_agent: TEST_USER_AGENT.to_string(),
        accept_language: "en-US,en;q=0.9".to_string(),
    }
}

/// Product page in the split whole/fraction price layout
pub fn product_page(title: &str, price: Option<(&str, &str)>) -> String {
    let price_html = match price {
        Some((whole, fraction)) => format!(
            r#"<span class="a-price"><span class="a-price-whole">{}<span class="a-price-decimal">.</span></span><span class="a-price-fraction">{}</span></span>"#,
            whole, fraction
        ),
        None => r#"<div id="availability">Currently unavailable.</div>"#.to_string(),
    };
    format!(
        r#"<!DOCTYPE html><html><body><div id="centerCol"><span id="productTitle">
            {}
        </span>{}</div></body></html>"#,
        title, price_html
    )
}

/// Mailer that records alerts instead of delivering them
#[derive(Clone, Default)]
pub struct RecordingMailer {
    pub sent: Arc<Mutex<Vec<(SenderCredentials, PriceAlert)>>>,
}

impl RecordingMailer {
    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, credentials: &SenderCredentials, alert: &PriceAlert) -> pricewatch::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((credentials.clone(), alert.clone()));
        Ok(())
    }
}

pub fn credentials(address: Option<&str>, password: Option<&str>) -> StaticCredentials {
    StaticCredentials {
        address: address.map(str::to_string),
        password: password.map(str::to_string),
    }
}

/// Checker wired to test doubles, logging into `log_path`
pub fn create_test_checker(
    log_path: &Path,
    target_price: Decimal,
    creds: StaticCredentials,
    mailer: RecordingMailer,
) -> anyhow::Result<PriceChecker> {
    Ok(PriceChecker::new(
        PageFetcher::new(&test_scraper_config(5))?,
        Box::new(SplitPriceParser::new("#productTitle", ".a-price-whole", ".a-price-fraction")?),
        PriceLog::new(log_path),
        PriceAlertNotifier::new(target_price, Box::new(creds), Box::new(mailer)),
    ))
}

/// Latin-1 encoded sales fixture: 3 distinct orders totalling $300 once
/// duplicates and undated rows are removed
pub fn sales_fixture_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"Row ID,Order ID,Order Date,Ship Mode,Region,Category,Sales,Profit,Discount\n");
    bytes.extend_from_slice(b"1,CA-2016-1,08/11/2016,Second Class,South,Furniture,120.00,20.00,0.0\n");
    bytes.extend_from_slice(b"2,CA-2016-1,08/11/2016,Second Class,South,Technology,30.00,10.00,0.2\n");
    bytes.extend_from_slice(b"2,CA-2016-1,08/11/2016,Second Class,South,Technology,30.00,10.00,0.2\n");
    bytes.extend_from_slice(b"3,CA-2017-2,15/01/2017,Standard Class,West,Office Supplies,50.00,-5.00,0.4\n");
    bytes.extend_from_slice(b"4,CA-2017-3,02/02/2017,First Class,Qu\xe9bec,Furniture,100.00,25.00,0.2\n");
    bytes.extend_from_slice(b"5,CA-2017-4,,First Class,West,Furniture,999.00,1.00,0.0\n");
    bytes
}
