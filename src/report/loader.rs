use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use encoding_rs::Encoding;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

use crate::models::SalesRecord;
use crate::utils::error::{AppError, Result};

const ORDER_ID: &str = "Order ID";
const ORDER_DATE: &str = "Order Date";
const REGION: &str = "Region";
const CATEGORY: &str = "Category";
const SALES: &str = "Sales";
const PROFIT: &str = "Profit";
const DISCOUNT: &str = "Discount";

/// Sales rows that survived cleaning, plus what was dropped on the way.
#[derive(Debug, Clone, Default)]
pub struct CleanedSales {
    pub records: Vec<SalesRecord>,
    pub rows_read: usize,
    pub duplicates_removed: usize,
    pub invalid_dates: usize,
    /// Kept rows with at least one blank or non-numeric amount.
    pub missing_amounts: usize,
}

struct Columns {
    order_id: usize,
    order_date: usize,
    region: usize,
    category: usize,
    sales: usize,
    profit: usize,
    discount: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
                .ok_or_else(|| AppError::Parse {
                    message: format!("missing column '{}'", name),
                })
        };

        Ok(Self {
            order_id: find(ORDER_ID)?,
            order_date: find(ORDER_DATE)?,
            region: find(REGION)?,
            category: find(CATEGORY)?,
            sales: find(SALES)?,
            profit: find(PROFIT)?,
            discount: find(DISCOUNT)?,
        })
    }
}

pub fn load_sales(path: &Path, encoding_label: &str, date_format: &str) -> Result<CleanedSales> {
    let bytes = std::fs::read(path)?;
    debug!(path = %path.display(), bytes = bytes.len(), "sales file read");
    parse_sales(&bytes, encoding_label, date_format)
}

/// Decodes `bytes`, drops exact-duplicate rows (first occurrence wins) and
/// rows whose order date does not match `date_format`. Short rows are padded
/// with blanks; unreadable amounts become `None` and the row is kept.
pub fn parse_sales(bytes: &[u8], encoding_label: &str, date_format: &str) -> Result<CleanedSales> {
    let encoding = Encoding::for_label(encoding_label.as_bytes()).ok_or_else(|| AppError::Parse {
        message: format!("unknown encoding '{}'", encoding_label),
    })?;
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        warn!(encoding = encoding.name(), "input contained undecodable bytes");
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());
    let columns = Columns::locate(reader.headers()?)?;

    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let mut cleaned = CleanedSales::default();

    for (idx, row) in reader.records().enumerate() {
        let row = row?;
        let line = idx + 2;
        cleaned.rows_read += 1;

        if !seen.insert(row.iter().map(str::to_string).collect()) {
            cleaned.duplicates_removed += 1;
            continue;
        }

        let field = |i: usize| row.get(i).unwrap_or("").trim();

        let Ok(order_date) = NaiveDate::parse_from_str(field(columns.order_date), date_format) else {
            debug!(line, value = field(columns.order_date), "unparseable order date, row dropped");
            cleaned.invalid_dates += 1;
            continue;
        };

        let sales = parse_amount(field(columns.sales));
        let profit = parse_amount(field(columns.profit));
        let discount = parse_amount(field(columns.discount));
        if sales.is_none() || profit.is_none() || discount.is_none() {
            debug!(line, "blank or non-numeric amount, kept as missing");
            cleaned.missing_amounts += 1;
        }

        cleaned.records.push(SalesRecord {
            order_id: field(columns.order_id).to_string(),
            order_date,
            year_month: order_date.format("%Y-%m").to_string(),
            region: field(columns.region).to_string(),
            category: field(columns.category).to_string(),
            sales,
            profit,
            discount,
        });
    }

    Ok(cleaned)
}

fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| *c != ',' && *c != '$').collect();
    cleaned.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
