//! Offline sales report: load and clean a sales CSV, reduce it to KPIs and
//! grouped views, then render one chart per view.

pub mod aggregator;
pub mod loader;
pub mod renderer;
pub mod summary;

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::ReportConfig;
use crate::models::SalesReport;
use crate::utils::error::Result;

pub use aggregator::aggregate;
pub use loader::{load_sales, CleanedSales};

pub const SALES_BY_REGION_FILE: &str = "01_sales_by_region.svg";
pub const PROFIT_BY_CATEGORY_FILE: &str = "02_profit_by_category.svg";
pub const SALES_TREND_FILE: &str = "03_sales_trend.svg";
pub const PROFIT_HEATMAP_FILE: &str = "04_profit_heatmap.svg";

/// Loads, cleans and aggregates the configured input file.
pub fn build_report(config: &ReportConfig) -> Result<SalesReport> {
    let cleaned = load_sales(&config.input_path, &config.encoding, &config.date_format)?;
    info!(
        rows_read = cleaned.rows_read,
        duplicates_removed = cleaned.duplicates_removed,
        invalid_dates = cleaned.invalid_dates,
        missing_amounts = cleaned.missing_amounts,
        kept = cleaned.records.len(),
        "sales data cleaned"
    );
    Ok(aggregate(&cleaned.records))
}

/// Renders the four report charts into `output_dir`, skipping empty views.
/// Returns the paths actually written.
pub fn render_charts(report: &SalesReport, output_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;
    let mut written = Vec::new();

    if report.sales_by_region.is_empty() {
        warn!("no regional sales, skipping {}", SALES_BY_REGION_FILE);
    } else {
        let path = output_dir.join(SALES_BY_REGION_FILE);
        renderer::render_bar(
            &path,
            &renderer::ChartLabels::new("Sales by Region", "Region", "Total Sales ($)"),
            &report.sales_by_region,
        )?;
        written.push(path);
    }

    if report.profit_by_category.is_empty() {
        warn!("no category profits, skipping {}", PROFIT_BY_CATEGORY_FILE);
    } else {
        let path = output_dir.join(PROFIT_BY_CATEGORY_FILE);
        renderer::render_bar(
            &path,
            &renderer::ChartLabels::new("Profit by Category", "Category", "Total Profit ($)"),
            &report.profit_by_category,
        )?;
        written.push(path);
    }

    if report.monthly_sales.is_empty() {
        warn!("no monthly sales, skipping {}", SALES_TREND_FILE);
    } else {
        let path = output_dir.join(SALES_TREND_FILE);
        let points: Vec<_> = report
            .monthly_sales
            .iter()
            .map(|p| (p.month_start, p.sales))
            .collect();
        renderer::render_time_series(
            &path,
            &renderer::ChartLabels::new("Monthly Sales Trend", "Month", "Sales ($)"),
            &points,
            "%Y-%m",
        )?;
        written.push(path);
    }

    if report.profit_matrix.is_empty() {
        warn!("empty profit matrix, skipping {}", PROFIT_HEATMAP_FILE);
    } else {
        let path = output_dir.join(PROFIT_HEATMAP_FILE);
        renderer::render_heatmap(
            &path,
            &renderer::ChartLabels::new("Profit Heatmap (Region x Category)", "Category", "Region"),
            &report.profit_matrix,
        )?;
        written.push(path);
    }

    info!(charts = written.len(), dir = %output_dir.display(), "charts rendered");
    Ok(written)
}
