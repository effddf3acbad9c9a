use crate::models::Kpis;

const NOT_AVAILABLE: &str = "n/a";

/// Human-readable KPI block, one figure per line.
pub fn format_kpis(kpis: &Kpis) -> String {
    [
        format!("Total Sales: {}", money(kpis.total_sales)),
        format!("Total Profit: {}", money(kpis.total_profit)),
        format!("Total Orders: {}", group_thousands(&kpis.total_orders.to_string())),
        format!("Average Discount: {}", optional(kpis.avg_discount, percent)),
        format!("AOV (Avg Order Value): {}", optional(kpis.aov, money)),
        format!("Profit Margin: {}", optional(kpis.profit_margin, percent)),
    ]
    .join("\n")
}

fn optional(value: Option<f64>, format: fn(f64) -> String) -> String {
    value.map(format).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn money(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (whole, cents) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));
    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, group_thousands(whole), cents)
}

fn percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
