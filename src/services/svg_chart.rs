//! SVG 图表后端
//!
//! 趋势图为折线，构成图为环形图。存活实例即渲染好的 SVG 文档，
//! 静态图像直接复制 SVG 字节。

use std::fmt::Write as _;

use tracing::debug;

use crate::error::{AppResult, ClientError};
use crate::models::{LandCover, TimeSeries};
use crate::services::visualization::{ChartBackend, ChartDataset, FrozenImage, Slot};

const PRIMARY_COLOR: &str = "#10b981";
const SECONDARY_COLOR: &str = "#f97316";
const MUTED_COLOR: &str = "#6b7280";
const GRID_COLOR: &str = "rgba(107,114,128,0.3)";
const MARGIN: f64 = 36.0;

/// 存活的 SVG 图表
#[derive(Debug, Clone, PartialEq)]
pub struct SvgChart {
    slot: Slot,
    svg: String,
    width: u32,
    height: u32,
}

impl SvgChart {
    pub fn slot(&self) -> Slot {
        self.slot
    }

    pub fn svg(&self) -> &str {
        &self.svg
    }
}

/// SVG 图表后端
#[derive(Debug, Clone)]
pub struct SvgChartBackend {
    width: u32,
    height: u32,
    live: usize,
}

impl SvgChartBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            live: 0,
        }
    }

    /// 当前存活的实例数
    pub fn live_charts(&self) -> usize {
        self.live
    }
}

impl Default for SvgChartBackend {
    fn default() -> Self {
        Self::new(440, 220)
    }
}

impl ChartBackend for SvgChartBackend {
    type Chart = SvgChart;

    fn create(&mut self, slot: Slot, dataset: &ChartDataset) -> AppResult<SvgChart> {
        let (width, height) = (self.width as f64, self.height as f64);
        let svg = match (slot, dataset) {
            (Slot::Trend, ChartDataset::Trend(series)) => trend_svg(series, width, height),
            (Slot::Composition, ChartDataset::Composition(cover)) => {
                composition_svg(cover, width, height)
            }
            _ => return Err(ClientError::chart(slot, "数据类型与槽位不匹配")),
        }
        .map_err(|e| ClientError::chart(slot, e.to_string()))?;

        self.live += 1;
        debug!("创建 SVG 图表 ({}), 存活 {}", slot, self.live);

        Ok(SvgChart {
            slot,
            svg,
            width: self.width,
            height: self.height,
        })
    }

    fn snapshot(&self, chart: &SvgChart) -> AppResult<FrozenImage> {
        Ok(FrozenImage {
            media_type: "image/svg+xml",
            bytes: chart.svg.as_bytes().to_vec(),
            width: chart.width,
            height: chart.height,
        })
    }

    fn release(&mut self, chart: SvgChart) {
        self.live = self.live.saturating_sub(1);
        debug!("释放 SVG 图表 ({}), 存活 {}", chart.slot, self.live);
    }
}

fn open_svg(out: &mut String, width: f64, height: f64, title: &str) -> std::fmt::Result {
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = width,
        h = height
    )?;
    writeln!(
        out,
        r#"<text x="{}" y="18" text-anchor="middle" font-family="sans-serif" font-size="13" fill="{}">{}</text>"#,
        width / 2.0,
        MUTED_COLOR,
        title
    )
}

fn trend_svg(series: &TimeSeries, width: f64, height: f64) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    open_svg(&mut out, width, height, "Mean NDVI Trend")?;

    let points = series.points();
    let values: Vec<f64> = points.iter().filter_map(|p| p.ndvi).collect();
    let plot_w = width - 2.0 * MARGIN;
    let plot_h = height - 2.0 * MARGIN;

    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    let (min, max) = if values.is_empty() {
        (0.0, 1.0)
    } else if (max - min).abs() < f64::EPSILON {
        (min - 0.1, max + 0.1)
    } else {
        (min, max)
    };

    let x_at = |i: usize| -> f64 {
        if points.len() <= 1 {
            MARGIN + plot_w / 2.0
        } else {
            MARGIN + plot_w * i as f64 / (points.len() - 1) as f64
        }
    };
    let y_at = |v: f64| -> f64 { MARGIN + plot_h * (1.0 - (v - min) / (max - min)) };

    // 横向网格与纵轴刻度
    for step in 0..=4 {
        let v = min + (max - min) * step as f64 / 4.0;
        let y = y_at(v);
        writeln!(
            out,
            r#"<line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="{}"/>"#,
            MARGIN,
            width - MARGIN,
            GRID_COLOR
        )?;
        writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end" font-family="sans-serif" font-size="10" fill="{}">{:.2}</text>"#,
            MARGIN - 4.0,
            y + 3.0,
            MUTED_COLOR,
            v
        )?;
    }

    for (i, point) in points.iter().enumerate() {
        writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-family="sans-serif" font-size="10" fill="{}">{}</text>"#,
            x_at(i),
            height - MARGIN + 14.0,
            MUTED_COLOR,
            point.year
        )?;
    }

    // 缺失值处断开折线
    let mut segment: Vec<String> = Vec::new();
    let mut segments: Vec<Vec<String>> = Vec::new();
    for (i, point) in points.iter().enumerate() {
        match point.ndvi {
            Some(v) => segment.push(format!("{:.1},{:.1}", x_at(i), y_at(v))),
            None if !segment.is_empty() => segments.push(std::mem::take(&mut segment)),
            None => {}
        }
    }
    if !segment.is_empty() {
        segments.push(segment);
    }

    for segment in &segments {
        writeln!(
            out,
            r#"<polyline fill="none" stroke="{}" stroke-width="2" points="{}"/>"#,
            PRIMARY_COLOR,
            segment.join(" ")
        )?;
    }

    for (i, point) in points.iter().enumerate() {
        if let Some(v) = point.ndvi {
            writeln!(
                out,
                r#"<circle cx="{:.1}" cy="{:.1}" r="3" fill="{}"/>"#,
                x_at(i),
                y_at(v),
                PRIMARY_COLOR
            )?;
        }
    }

    out.push_str("</svg>\n");
    Ok(out)
}

fn composition_svg(cover: &LandCover, width: f64, height: f64) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    open_svg(&mut out, width, height, "Land Cover Composition")?;

    let radius = ((height - 2.0 * MARGIN) / 2.0).max(10.0);
    let cx = MARGIN + radius;
    let cy = height / 2.0 + 8.0;
    let circumference = 2.0 * std::f64::consts::PI * radius;
    let mangrove_len = circumference * cover.mangrove_fraction();

    // 底环为非红树林，上层弧段为红树林
    writeln!(
        out,
        r#"<circle cx="{cx:.1}" cy="{cy:.1}" r="{radius:.1}" fill="none" stroke="{}" stroke-width="22"/>"#,
        SECONDARY_COLOR
    )?;
    writeln!(
        out,
        r#"<circle cx="{cx:.1}" cy="{cy:.1}" r="{radius:.1}" fill="none" stroke="{}" stroke-width="22" stroke-dasharray="{:.2} {:.2}" transform="rotate(-90 {cx:.1} {cy:.1})"/>"#,
        PRIMARY_COLOR,
        mangrove_len,
        circumference
    )?;

    let legend_x = cx + radius + 30.0;
    let entries = [
        ("Mangrove", PRIMARY_COLOR, cover.mangrove_area_m2),
        ("Non-Mangrove", SECONDARY_COLOR, cover.non_mangrove_area_m2()),
    ];
    for (i, (label, color, area_m2)) in entries.iter().enumerate() {
        let y = cy - 12.0 + 24.0 * i as f64;
        writeln!(
            out,
            r#"<rect x="{:.1}" y="{:.1}" width="10" height="10" fill="{}"/>"#,
            legend_x,
            y - 9.0,
            color
        )?;
        writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" font-family="sans-serif" font-size="11" fill="{}">{} ({:.2} ha)</text>"#,
            legend_x + 16.0,
            y,
            MUTED_COLOR,
            label,
            area_m2 / 10_000.0
        )?;
    }

    out.push_str("</svg>\n");
    Ok(out)
}
