//! 报告导出 - 业务能力层
//!
//! 快照 → 栅格化 → 组装单页文档 → 写入固定文件名

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{AppResult, ClientError};
use crate::services::visualization::{ChartBackend, FrozenImage, Slot, VisualizationLifecycle};
use crate::workflow::display_state::{ChartRegion, PanelState};
use crate::workflow::panel_markup::render_offscreen_document;

/// 报告文件名
pub const REPORT_FILE_NAME: &str = "mangrove-pulse-report.pdf";

/// 栅格化后的图像（PNG）
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// 把快照文档渲染为一张图像
#[allow(async_fn_in_trait)]
pub trait Rasterizer {
    async fn rasterize(&self, markup: &str) -> AppResult<RasterImage>;
}

/// 把图像组装为单页文档，页面尺寸等于图像像素尺寸
#[allow(async_fn_in_trait)]
pub trait DocumentComposer {
    async fn compose(&self, image: &RasterImage) -> AppResult<Vec<u8>>;
}

/// 导出快照
///
/// 面板的克隆体，图表区域已替换为静态图像；生成文档后即丢弃
#[derive(Debug, Clone, PartialEq)]
pub struct ExportableSnapshot {
    panel: PanelState,
    trend: FrozenImage,
    composition: FrozenImage,
    width: u32,
}

impl ExportableSnapshot {
    pub fn panel(&self) -> &PanelState {
        &self.panel
    }

    /// 离屏排版后的 HTML
    pub fn markup(&self) -> String {
        render_offscreen_document(&self.panel, &self.trend, &self.composition, self.width)
    }
}

/// 报告导出流水线
pub struct ReportExportPipeline<R> {
    renderer: R,
    output_dir: PathBuf,
    panel_width: u32,
}

impl<R: Rasterizer + DocumentComposer> ReportExportPipeline<R> {
    pub fn new(renderer: R, output_dir: impl Into<PathBuf>, panel_width: u32) -> Self {
        Self {
            renderer,
            output_dir: output_dir.into(),
            panel_width,
        }
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(REPORT_FILE_NAME)
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// 构建导出快照
    ///
    /// 区域统计未到达或任一图表槽位为空时返回 `IncompleteAnalysis`；
    /// 只读取面板和图表，不做任何修改
    pub fn build_snapshot<B: ChartBackend>(
        &self,
        panel: &PanelState,
        charts: &VisualizationLifecycle<B>,
    ) -> AppResult<ExportableSnapshot> {
        if panel.analysis().is_none() {
            return Err(ClientError::IncompleteAnalysis {
                missing: "area statistics",
            });
        }

        let trend = frozen_chart(panel, charts, Slot::Trend, "trend chart")?;
        let composition = frozen_chart(panel, charts, Slot::Composition, "composition chart")?;

        Ok(ExportableSnapshot {
            panel: panel.clone(),
            trend,
            composition,
            width: self.panel_width,
        })
    }

    /// 栅格化快照、组装文档并写入报告文件
    ///
    /// 任一阶段失败都返回 `ExportFailed`
    pub async fn write_report(&self, snapshot: ExportableSnapshot) -> AppResult<PathBuf> {
        let markup = snapshot.markup();
        drop(snapshot);

        info!("🖼️ 正在栅格化分析面板...");
        let image = self
            .renderer
            .rasterize(&markup)
            .await
            .map_err(|e| ClientError::export_failed("rasterize", e))?;
        debug!("栅格化完成: {}x{}", image.width, image.height);

        let document = self
            .renderer
            .compose(&image)
            .await
            .map_err(|e| ClientError::export_failed("compose", e))?;

        let path = self.report_path();
        persist(&path, &document)
            .await
            .map_err(|e| ClientError::export_failed("write", e))?;

        info!("📄 报告已保存: {}", path.display());
        Ok(path)
    }
}

fn frozen_chart<B: ChartBackend>(
    panel: &PanelState,
    charts: &VisualizationLifecycle<B>,
    slot: Slot,
    missing: &'static str,
) -> AppResult<FrozenImage> {
    let region = match slot {
        Slot::Trend => &panel.trend,
        Slot::Composition => &panel.composition,
    };
    if *region != ChartRegion::Bound {
        return Err(ClientError::IncompleteAnalysis { missing });
    }

    charts
        .render(slot)?
        .ok_or(ClientError::IncompleteAnalysis { missing })
}

async fn persist(path: &Path, document: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, document).await
}
