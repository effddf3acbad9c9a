use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use std::path::Path;
use tracing::info;

use crate::models::PriceRecord;
use crate::price_log::PriceLog;
use crate::report::renderer::{render_time_series, ChartLabels};
use crate::utils::error::{AppError, Result};

/// Logged prices as chart points: blank prices dropped, sorted by date.
pub fn price_points(records: &[PriceRecord]) -> Vec<(NaiveDate, f64)> {
    let mut points: Vec<(NaiveDate, f64)> = records
        .iter()
        .filter_map(|r| Some((r.date, r.price?.to_f64()?)))
        .collect();
    points.sort_by_key(|(date, _)| *date);
    points
}

/// Plots the price log as a line over time. Returns the number of points drawn.
pub fn render_price_history(log: &PriceLog, output: &Path) -> Result<usize> {
    let records = log.read_all()?;
    let points = price_points(&records);
    if points.is_empty() {
        return Err(AppError::Render(format!(
            "{} has no rows with a price",
            log.path().display()
        )));
    }

    let title = records
        .iter()
        .rev()
        .find(|r| r.price.is_some())
        .map(|r| format!("{} Price History", r.title))
        .unwrap_or_else(|| "Price History".to_string());

    render_time_series(
        output,
        &ChartLabels::new(&title, "Date", "Price ($)"),
        &points,
        "%Y-%m-%d",
    )?;

    info!(points = points.len(), output = %output.display(), "price history rendered");
    Ok(points.len())
}
