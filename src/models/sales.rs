use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One cleaned row of the sales input file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SalesRecord {
    pub order_id: String,
    pub order_date: NaiveDate,
    /// `YYYY-MM` bucket derived from `order_date`.
    pub year_month: String,
    pub region: String,
    pub category: String,
    /// Amounts are `None` when the cell was blank or not a number; aggregates
    /// skip them.
    pub sales: Option<f64>,
    pub profit: Option<f64>,
    pub discount: Option<f64>,
}

/// Headline figures. Ratios are `None` when their divisor is zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Kpis {
    pub total_sales: f64,
    pub total_profit: f64,
    pub total_orders: usize,
    pub avg_discount: Option<f64>,
    /// Average order value: total sales over distinct orders.
    pub aov: Option<f64>,
    pub profit_margin: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyPoint {
    pub year_month: String,
    /// First day of the month, used for the time axis.
    pub month_start: NaiveDate,
    pub sales: f64,
}

/// Profit summed per (region, category). Absent combinations are 0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ProfitMatrix {
    pub regions: Vec<String>,
    pub categories: Vec<String>,
    /// Indexed `values[region][category]`.
    pub values: Vec<Vec<f64>>,
}

impl ProfitMatrix {
    pub fn get(&self, region: &str, category: &str) -> Option<f64> {
        let r = self.regions.iter().position(|x| x == region)?;
        let c = self.categories.iter().position(|x| x == category)?;
        Some(self.values[r][c])
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty() || self.categories.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SalesReport {
    pub kpis: Kpis,
    /// Sorted by total sales, largest first.
    pub sales_by_region: Vec<(String, f64)>,
    /// Sorted by total profit, largest first.
    pub profit_by_category: Vec<(String, f64)>,
    /// Ordered by month.
    pub monthly_sales: Vec<MonthlyPoint>,
    pub profit_matrix: ProfitMatrix,
}
