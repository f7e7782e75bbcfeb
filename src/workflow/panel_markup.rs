//! 面板 HTML
//!
//! 同一份面板结构既可以渲染为在线形态（图表区域为 canvas），
//! 也可以渲染为导出形态（图表区域替换为静态图像）。

use std::fmt::Write as _;

use crate::services::visualization::{FrozenImage, Slot};
use crate::workflow::display_state::{
    format_hectares, format_index, ChartRegion, PanelState, StatsSection, ANALYZING_AREA,
    LOADING_TIMESERIES,
};

pub const PANEL_ELEMENT_ID: &str = "analysis-panel";

/// 图表区域的渲染方式
#[derive(Debug, Clone, Copy)]
pub enum ChartMarkup<'a> {
    /// 在线图表
    Live,
    /// 导出用静态图像
    Frozen(&'a FrozenImage),
}

/// 渲染面板内部结构
pub fn render_panel(panel: &PanelState, trend: ChartMarkup<'_>, composition: ChartMarkup<'_>) -> String {
    let mut out = String::new();
    // 写入 String 不会失败
    let _ = write_panel(&mut out, panel, trend, composition);
    out
}

/// 渲染离屏快照文档
///
/// 面板克隆体放在可视区域之外，按面板自然宽度、自适应高度排版
pub fn render_offscreen_document(
    panel: &PanelState,
    trend: &FrozenImage,
    composition: &FrozenImage,
    width: u32,
) -> String {
    let body = render_panel(panel, ChartMarkup::Frozen(trend), ChartMarkup::Frozen(composition));
    format!(
        concat!(
            "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">",
            "<style>body{{margin:0;font-family:sans-serif;background:#1f2937;color:#f9fafb}}",
            "#{id} img{{display:block;max-width:100%}}</style></head>\n<body>\n",
            "<div id=\"{id}\" style=\"position:absolute;top:-9999px;left:0px;width:{width}px;height:auto;padding:16px;box-sizing:border-box\">\n",
            "{body}</div>\n</body></html>\n"
        ),
        id = PANEL_ELEMENT_ID,
        width = width,
        body = body
    )
}

fn write_panel(
    out: &mut String,
    panel: &PanelState,
    trend: ChartMarkup<'_>,
    composition: ChartMarkup<'_>,
) -> std::fmt::Result {
    writeln!(out, r#"<div id="stats-container">"#)?;
    match &panel.stats {
        Some(StatsSection::Ready(result)) => {
            writeln!(
                out,
                r#"<h3 class="font-bold text-xl mb-2">Zonal Statistics ({})</h3>"#,
                result.year
            )?;
            for (name, value) in result.stats.entries() {
                writeln!(
                    out,
                    r#"<p><strong>Mean {}:</strong> <span class="font-mono">{}</span></p>"#,
                    name,
                    format_index(value)
                )?;
            }
            writeln!(
                out,
                r#"<p><strong>Total Area:</strong> <span class="font-mono">{}</span></p>"#,
                format_hectares(result.area_m2)
            )?;
        }
        Some(StatsSection::Loading) => writeln!(out, "<p>{}</p>", ANALYZING_AREA)?,
        Some(StatsSection::Failed(message)) => {
            writeln!(out, r#"<p class="text-red-500">Error: {}</p>"#, escape_html(message))?
        }
        None => {}
    }
    writeln!(out, "</div>")?;

    write_chart_region(out, "chart-container", Slot::Trend, &panel.trend, trend)?;
    write_chart_region(out, "pie-chart-container", Slot::Composition, &panel.composition, composition)
}

fn write_chart_region(
    out: &mut String,
    container_id: &str,
    slot: Slot,
    region: &ChartRegion,
    markup: ChartMarkup<'_>,
) -> std::fmt::Result {
    writeln!(out, r#"<div id="{}">"#, container_id)?;
    match (region, markup) {
        (ChartRegion::Bound, ChartMarkup::Frozen(image)) => writeln!(
            out,
            r#"<img id="{}" src="{}" width="{}" height="{}">"#,
            slot.element_id(),
            image.to_data_url(),
            image.width,
            image.height
        )?,
        (ChartRegion::Bound, ChartMarkup::Live) | (ChartRegion::Empty, _) => {
            writeln!(out, r#"<canvas id="{}"></canvas>"#, slot.element_id())?
        }
        (ChartRegion::Loading, _) => writeln!(out, "<p>{}</p>", LOADING_TIMESERIES)?,
        (ChartRegion::Failed(message), _) => {
            writeln!(out, r#"<p class="text-red-500">Error: {}</p>"#, escape_html(message))?
        }
    }
    writeln!(out, "</div>")
}

/// 转义服务端返回的文本
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalysisResult, GeometryId, IndexValues, LandCover};

    fn ready_panel() -> PanelState {
        PanelState {
            visible: true,
            geometry_id: Some(GeometryId(1)),
            stats: Some(StatsSection::Ready(AnalysisResult {
                stats: IndexValues {
                    ndvi: Some(0.452),
                    ndwi: Some(-0.1),
                    mvi: Some(0.3),
                },
                area_m2: 50000.0,
                year: 2023,
                land_cover: LandCover {
                    mangrove_area_m2: 30000.0,
                    total_area_m2: 50000.0,
                },
            })),
            trend: ChartRegion::Bound,
            composition: ChartRegion::Bound,
        }
    }

    fn image(tag: &[u8]) -> FrozenImage {
        FrozenImage {
            media_type: "image/svg+xml",
            bytes: tag.to_vec(),
            width: 200,
            height: 100,
        }
    }

    #[test]
    fn test_live_panel_uses_canvas() {
        let html = render_panel(&ready_panel(), ChartMarkup::Live, ChartMarkup::Live);
        assert!(html.contains(r#"<canvas id="timeseries-chart">"#));
        assert!(html.contains(r#"<canvas id="pie-chart">"#));
        assert!(html.contains("Zonal Statistics (2023)"));
        assert!(html.contains("5.00 ha"));
        assert!(html.contains("-0.100"));
    }

    #[test]
    fn test_offscreen_document_embeds_images() {
        let trend = image(b"trend");
        let composition = image(b"pie");
        let html = render_offscreen_document(&ready_panel(), &trend, &composition, 480);

        assert!(!html.contains("<canvas"));
        assert!(html.contains(&trend.to_data_url()));
        assert!(html.contains(&composition.to_data_url()));
        assert!(html.contains("position:absolute;top:-9999px;left:0px;width:480px;height:auto"));
    }

    #[test]
    fn test_error_text_is_escaped() {
        let panel = PanelState {
            visible: true,
            stats: Some(StatsSection::Failed("<b>quota</b> & more".to_string())),
            ..PanelState::default()
        };
        let html = render_panel(&panel, ChartMarkup::Live, ChartMarkup::Live);
        assert!(html.contains("Error: &lt;b&gt;quota&lt;/b&gt; &amp; more"));
    }
}
