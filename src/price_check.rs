use chrono::NaiveDate;
use std::time::Instant;
use tracing::{info, instrument};

use crate::config::AppConfig;
use crate::models::PriceRecord;
use crate::plugins::notifiers::{EnvCredentials, NotifyOutcome, PriceAlertNotifier, SmtpMailer};
use crate::plugins::trackers::SplitPriceParser;
use crate::plugins::traits::ListingParser;
use crate::price_log::PriceLog;
use crate::scraper::PageFetcher;
use crate::utils::error::Result;

#[derive(Debug, Clone)]
pub struct CheckResult {
    pub record: PriceRecord,
    pub notification: NotifyOutcome,
    pub total_time_ms: u64,
}

/// One fetch, one extraction, one log append and at most one alert.
pub struct PriceChecker {
    fetcher: PageFetcher,
    parser: Box<dyn ListingParser>,
    log: PriceLog,
    notifier: PriceAlertNotifier,
}

impl PriceChecker {
    pub fn new(
        fetcher: PageFetcher,
        parser: Box<dyn ListingParser>,
        log: PriceLog,
        notifier: PriceAlertNotifier,
    ) -> Self {
        Self {
            fetcher,
            parser,
            log,
            notifier,
        }
    }

    /// Wires the production components: reqwest fetcher, split-price parser,
    /// CSV log and SMTP alerts with credentials from the environment.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let smtp = &config.notifications.smtp;
        Ok(Self::new(
            PageFetcher::new(&config.scraper)?,
            Box::new(SplitPriceParser::from_config(&config.tracker)?),
            PriceLog::new(&config.tracker.log_path),
            PriceAlertNotifier::new(
                config.tracker.target_price,
                Box::new(EnvCredentials::from_config(smtp)),
                Box::new(SmtpMailer::from_config(smtp)),
            ),
        ))
    }

    /// The record is appended before the alert goes out, so a delivery
    /// failure still leaves the observation in the log.
    #[instrument(skip(self), fields(parser = self.parser.name()))]
    pub async fn check(&self, url: &str, today: NaiveDate) -> Result<CheckResult> {
        let start_time = Instant::now();

        let html = self.fetcher.fetch(url).await?;
        let listing = self.parser.parse(&html)?;
        let record = PriceRecord::new(listing, today, url);

        self.log.append(&record)?;
        let notification = self.notifier.notify(&record).await?;

        let total_time_ms = start_time.elapsed().as_millis() as u64;
        info!(
            title = %record.title,
            price = %record.formatted_price(),
            ?notification,
            total_time_ms,
            "price check complete"
        );

        Ok(CheckResult {
            record,
            notification,
            total_time_ms,
        })
    }
}
