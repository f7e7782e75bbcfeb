//! 无头浏览器渲染器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"栅格化"和"组装文档"两个能力

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, PrintToPdfParams};
use chromiumoxide::Page;
use image::GenericImageView;
use tracing::debug;

use crate::error::{AppResult, ClientError};
use crate::services::report_export::{DocumentComposer, RasterImage, Rasterizer};
use crate::workflow::panel_markup::PANEL_ELEMENT_ID;

/// CSS 像素与英寸的换算
const CSS_PX_PER_INCH: f64 = 96.0;

/// 无头浏览器渲染器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 快照文档 → PNG（元素截图）
/// - PNG → 单页 PDF（页面尺寸等于图像像素尺寸）
pub struct HeadlessRenderer {
    page: Page,
}

impl HeadlessRenderer {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }
}

impl Rasterizer for HeadlessRenderer {
    async fn rasterize(&self, markup: &str) -> AppResult<RasterImage> {
        self.page.set_content(markup).await?;

        // 元素截图要求元素位于可视区域
        self.page
            .evaluate(format!(
                "document.getElementById('{}').style.top = '0px'",
                PANEL_ELEMENT_ID
            ))
            .await?;

        let element = self
            .page
            .find_element(format!("#{}", PANEL_ELEMENT_ID))
            .await?;
        let png = element.screenshot(CaptureScreenshotFormat::Png).await?;

        let (width, height) = png_dimensions(&png)?;
        debug!("面板截图 {}x{} ({} 字节)", width, height, png.len());

        Ok(RasterImage { png, width, height })
    }
}

impl DocumentComposer for HeadlessRenderer {
    async fn compose(&self, image: &RasterImage) -> AppResult<Vec<u8>> {
        self.page.set_content(image_document(image)).await?;

        let params = PrintToPdfParams {
            print_background: Some(true),
            prefer_css_page_size: Some(true),
            paper_width: Some(image.width as f64 / CSS_PX_PER_INCH),
            paper_height: Some(image.height as f64 / CSS_PX_PER_INCH),
            margin_top: Some(0.0),
            margin_bottom: Some(0.0),
            margin_left: Some(0.0),
            margin_right: Some(0.0),
            ..Default::default()
        };
        let pdf = self.page.pdf(params).await?;
        debug!("PDF 生成完成 ({} 字节)", pdf.len());
        Ok(pdf)
    }
}

/// 只包含一张图像的单页文档
fn image_document(image: &RasterImage) -> String {
    format!(
        concat!(
            "<!DOCTYPE html><html><head><style>",
            "@page{{size:{w}px {h}px;margin:0}}",
            "html,body{{margin:0;padding:0}}img{{display:block;width:{w}px;height:{h}px}}",
            "</style></head><body><img src=\"data:image/png;base64,{data}\"></body></html>"
        ),
        w = image.width,
        h = image.height,
        data = STANDARD.encode(&image.png)
    )
}

/// 解码截图并读取宽高
pub fn png_dimensions(png: &[u8]) -> AppResult<(u32, u32)> {
    let decoded = image::load_from_memory(png)
        .map_err(|e| ClientError::export_failed("rasterize", format!("截图解码失败: {}", e)))?;
    Ok(decoded.dimensions())
}
