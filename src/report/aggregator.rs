use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::models::{Kpis, MonthlyPoint, ProfitMatrix, SalesRecord, SalesReport};

/// Reduces cleaned records to the report views. Pure: the same input always
/// yields the same report.
pub fn aggregate(records: &[SalesRecord]) -> SalesReport {
    SalesReport {
        kpis: kpis(records),
        sales_by_region: sum_by_desc(records, |r| &r.region, |r| r.sales),
        profit_by_category: sum_by_desc(records, |r| &r.category, |r| r.profit),
        monthly_sales: monthly_sales(records),
        profit_matrix: profit_matrix(records),
    }
}

pub fn kpis(records: &[SalesRecord]) -> Kpis {
    let total_sales: f64 = records.iter().filter_map(|r| r.sales).sum();
    let total_profit: f64 = records.iter().filter_map(|r| r.profit).sum();
    let total_orders = records
        .iter()
        .map(|r| r.order_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    // Mean over the rows that carry a discount.
    let discounts: Vec<f64> = records.iter().filter_map(|r| r.discount).collect();
    let avg_discount = ratio(discounts.iter().sum(), discounts.len() as f64);

    Kpis {
        total_sales,
        total_profit,
        total_orders,
        avg_discount,
        aov: ratio(total_sales, total_orders as f64),
        profit_margin: ratio(total_profit, total_sales),
    }
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    (denominator != 0.0).then(|| numerator / denominator)
}

/// Sums `value` per `key`, largest total first; equal totals keep label order.
/// A group whose values are all missing totals 0.
fn sum_by_desc<K, V>(records: &[SalesRecord], key: K, value: V) -> Vec<(String, f64)>
where
    K: Fn(&SalesRecord) -> &String,
    V: Fn(&SalesRecord) -> Option<f64>,
{
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for record in records {
        *totals.entry(key(record).as_str()).or_default() += value(record).unwrap_or(0.0);
    }

    let mut sorted: Vec<(String, f64)> = totals
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1));
    sorted
}

fn monthly_sales(records: &[SalesRecord]) -> Vec<MonthlyPoint> {
    let mut months: BTreeMap<&str, (NaiveDate, f64)> = BTreeMap::new();
    for record in records {
        let month_start = record.order_date.with_day(1).unwrap_or(record.order_date);
        months
            .entry(record.year_month.as_str())
            .or_insert((month_start, 0.0))
            .1 += record.sales.unwrap_or(0.0);
    }

    months
        .into_iter()
        .map(|(label, (month_start, sales))| MonthlyPoint {
            year_month: label.to_string(),
            month_start,
            sales,
        })
        .collect()
}

fn profit_matrix(records: &[SalesRecord]) -> ProfitMatrix {
    let regions: BTreeSet<&str> = records.iter().map(|r| r.region.as_str()).collect();
    let categories: BTreeSet<&str> = records.iter().map(|r| r.category.as_str()).collect();

    let regions: Vec<String> = regions.into_iter().map(str::to_string).collect();
    let categories: Vec<String> = categories.into_iter().map(str::to_string).collect();
    let mut values = vec![vec![0.0; categories.len()]; regions.len()];

    for record in records {
        // Both lookups hit: the axes were built from these same records.
        if let (Ok(r), Ok(c), Some(profit)) = (
            regions.binary_search(&record.region),
            categories.binary_search(&record.category),
            record.profit,
        ) {
            values[r][c] += profit;
        }
    }

    ProfitMatrix {
        regions,
        categories,
        values,
    }
}
