use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use crate::models::PriceRecord;
use crate::utils::error::{AppError, Result};

pub const HEADER: [&str; 4] = ["Title", "Price", "Date", "URL"];
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Serialize, Deserialize)]
struct LogRow {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Price")]
    price: String,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "URL")]
    url: String,
}

/// Append-only CSV log of price observations.
///
/// Every call to [`PriceLog::append`] adds exactly one row; repeated checks on
/// the same day are kept as separate rows.
#[derive(Debug, Clone)]
pub struct PriceLog {
    path: PathBuf,
}

impl PriceLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &PriceRecord) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        // Held until `file` is dropped; keeps concurrent runs from interleaving.
        file.lock()?;

        let write_header = file.metadata()?.len() == 0;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(&file);
        if write_header {
            writer.write_record(HEADER)?;
        }
        writer.serialize(LogRow {
            title: record.title.clone(),
            price: record.formatted_price(),
            date: record.date.format(DATE_FORMAT).to_string(),
            url: record.url.clone(),
        })?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;
        debug!(path = %self.path.display(), header = write_header, "price record appended");
        Ok(())
    }

    pub fn read_all(&self) -> Result<Vec<PriceRecord>> {
        let file = File::open(&self.path)?;
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

        let mut records = Vec::new();
        for (idx, row) in reader.deserialize::<LogRow>().enumerate() {
            let row = row?;
            let line = idx + 2;

            let date = NaiveDate::parse_from_str(row.date.trim(), DATE_FORMAT).map_err(|e| {
                AppError::Parse {
                    message: format!("line {}: invalid date '{}': {}", line, row.date, e),
                }
            })?;

            let price = match row.price.trim() {
                "" => None,
                text => Some(Decimal::from_str(text).map_err(|e| AppError::Parse {
                    message: format!("line {}: invalid price '{}': {}", line, text, e),
                })?),
            };

            records.push(PriceRecord {
                title: row.title,
                price,
                date,
                url: row.url,
            });
        }
        Ok(records)
    }
}
