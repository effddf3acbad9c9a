use chrono::NaiveDate;
use plotters::coord::combinators::WithKeyPoints;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::fmt::Display;
use std::path::Path;
use tracing::debug;

use crate::models::ProfitMatrix;
use crate::utils::error::{AppError, Result};

const SIZE: (u32, u32) = (900, 560);
const FONT: &str = "sans-serif";
const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);
const LINE_COLOR: RGBColor = RGBColor(31, 119, 180);
/// Share of each bar slot left empty on either side of the bar.
const BAR_GAP: f64 = 0.15;

pub struct ChartLabels<'a> {
    pub title: &'a str,
    pub x_desc: &'a str,
    pub y_desc: &'a str,
}

impl<'a> ChartLabels<'a> {
    pub fn new(title: &'a str, x_desc: &'a str, y_desc: &'a str) -> Self {
        Self {
            title,
            x_desc,
            y_desc,
        }
    }
}

fn render_err<E: Display>(err: E) -> AppError {
    AppError::Render(err.to_string())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Axis range covering every value and zero, padded by 10%.
fn value_range(values: impl Iterator<Item = f64>) -> std::ops::Range<f64> {
    let (min, max) = values.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if min == max {
        return 0.0..1.0;
    }
    let pad = (max - min) * 0.1;
    let lo = if min < 0.0 { min - pad } else { 0.0 };
    let hi = if max > 0.0 { max + pad } else { 0.0 };
    lo..hi
}

/// Unit-wide slot axis `0..count` with one tick in the middle of each slot.
fn slot_axis(count: usize) -> WithKeyPoints<RangedCoordf64> {
    let centers = (0..count).map(|i| i as f64 + 0.5).collect();
    (0.0..count as f64).with_key_points(centers)
}

/// Label of the slot whose center is at `x`.
fn slot_label<S: AsRef<str>>(labels: &[S], x: f64) -> String {
    let idx = x.floor();
    if idx < 0.0 {
        return String::new();
    }
    labels
        .get(idx as usize)
        .map(|s| s.as_ref().to_string())
        .unwrap_or_default()
}

/// One bar per labelled value, in the given order.
pub fn render_bar(path: &Path, labels: &ChartLabels, data: &[(String, f64)]) -> Result<()> {
    if data.is_empty() {
        return Err(AppError::Render(format!("{}: nothing to plot", labels.title)));
    }
    ensure_parent(path)?;

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let names: Vec<&str> = data.iter().map(|(name, _)| name.as_str()).collect();
    let mut chart = ChartBuilder::on(&root)
        .caption(labels.title, (FONT, 24))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(
            slot_axis(data.len()),
            value_range(data.iter().map(|(_, v)| *v)),
        )
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(labels.x_desc)
        .y_desc(labels.y_desc)
        .x_label_formatter(&|x: &f64| slot_label(&names, *x))
        .y_label_formatter(&|v: &f64| format!("{:.0}", v))
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(data.iter().enumerate().map(|(i, (_, v))| {
            let left = i as f64;
            Rectangle::new(
                [(left + BAR_GAP, 0.0), (left + 1.0 - BAR_GAP, *v)],
                BAR_COLOR.filled(),
            )
        }))
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    debug!(path = %path.display(), bars = data.len(), "bar chart written");
    Ok(())
}

/// Line with point markers over a date axis. Points must be sorted by date.
pub fn render_time_series(
    path: &Path,
    labels: &ChartLabels,
    points: &[(NaiveDate, f64)],
    date_format: &str,
) -> Result<()> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Err(AppError::Render(format!("{}: nothing to plot", labels.title)));
    };
    ensure_parent(path)?;

    let start = first.0;
    let end = if last.0 > start {
        last.0
    } else {
        start.succ_opt().unwrap_or(start)
    };

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(labels.title, (FONT, 24))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(start..end, value_range(points.iter().map(|(_, v)| *v)))
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc(labels.x_desc)
        .y_desc(labels.y_desc)
        .x_labels(12)
        .x_label_formatter(&|d: &NaiveDate| d.format(date_format).to_string())
        .y_label_formatter(&|v: &f64| format!("{:.2}", v))
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(LineSeries::new(points.iter().copied(), &LINE_COLOR))
        .map_err(render_err)?;
    chart
        .draw_series(points.iter().map(|p| Circle::new(*p, 4, LINE_COLOR.filled())))
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    debug!(path = %path.display(), points = points.len(), "time series written");
    Ok(())
}

/// Diverging fill: red for losses, green for gains, white at zero.
fn heat_color(value: f64, max_abs: f64) -> RGBColor {
    let t = if max_abs > 0.0 {
        (value / max_abs).clamp(-1.0, 1.0)
    } else {
        0.0
    };
    let fade = |full: u8, t: f64| (255.0 - (255.0 - full as f64) * t.abs()).round() as u8;
    if t < 0.0 {
        RGBColor(fade(214, t), fade(39, t), fade(40, t))
    } else {
        RGBColor(fade(44, t), fade(160, t), fade(44, t))
    }
}

/// Region rows by category columns, each cell annotated with its value.
pub fn render_heatmap(path: &Path, labels: &ChartLabels, matrix: &ProfitMatrix) -> Result<()> {
    if matrix.is_empty() {
        return Err(AppError::Render(format!("{}: nothing to plot", labels.title)));
    }
    ensure_parent(path)?;

    let cols = matrix.categories.len();
    let rows = matrix.regions.len();
    let max_abs = matrix
        .values
        .iter()
        .flatten()
        .fold(0.0f64, |acc, v| acc.max(v.abs()));

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(labels.title, (FONT, 24))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(110)
        .build_cartesian_2d(slot_axis(cols), slot_axis(rows))
        .map_err(render_err)?;

    let column_label = |x: &f64| slot_label(&matrix.categories, *x);
    let row_label = |y: &f64| slot_label(&matrix.regions, *y);

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(labels.x_desc)
        .y_desc(labels.y_desc)
        .x_label_formatter(&column_label)
        .y_label_formatter(&row_label)
        .draw()
        .map_err(render_err)?;

    let cells = matrix.values.iter().enumerate().flat_map(|(r, row)| {
        row.iter()
            .enumerate()
            .map(move |(c, v)| (c as f64, r as f64, *v))
    });

    chart
        .draw_series(cells.clone().map(|(c, r, v)| {
            Rectangle::new(
                [(c, r), (c + 1.0, r + 1.0)],
                heat_color(v, max_abs).filled(),
            )
        }))
        .map_err(render_err)?;

    let value_style = TextStyle::from((FONT, 16).into_font()).pos(Pos::new(HPos::Center, VPos::Center));
    chart
        .draw_series(cells.map(|(c, r, v)| {
            Text::new(
                format!("{:.0}", v),
                (c + 0.5, r + 0.5),
                value_style.clone(),
            )
        }))
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    debug!(path = %path.display(), rows, cols, "heatmap written");
    Ok(())
}
