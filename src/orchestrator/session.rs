//! 会话 - 编排层
//!
//! ## 职责
//!
//! 命令行的入口，负责资源组装和一次交互脚本的执行：
//!
//! 1. **应用初始化**：会话日志、分析后端客户端、编排器
//! 2. **几何加载**：GeoJSON 文件或外接矩形
//! 3. **命令执行**：点位查询 / 区域分析 / 导出 / 图层
//! 4. **资源管理**：只有在导出报告时才启动无头浏览器，报告写完即关闭

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use geojson::{GeoJson, Geometry};
use tracing::{error, info, warn};

use crate::browser;
use crate::cli::{Command, ShapeArgs};
use crate::clients::HttpAnalysisClient;
use crate::config::Config;
use crate::infrastructure::HeadlessRenderer;
use crate::models::{rectangle_polygon, LatLon, LayerKind, ShapeKind};
use crate::orchestrator::analysis_orchestrator::{AnalysisOrchestrator, AreaOutcome};
use crate::services::job_dispatch::JobOutcome;
use crate::services::report_export::ReportExportPipeline;
use crate::services::svg_chart::SvgChartBackend;
use crate::utils::logging::{init_log_file, log_display_state, log_session_complete, log_startup};
use crate::workflow::app_state::LegOutcome;

/// 应用主结构
pub struct App {
    config: Config,
    orchestrator: AnalysisOrchestrator<HttpAnalysisClient, SvgChartBackend>,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config, command: &str) -> Result<Self> {
        init_log_file(&config.output_log_file, command)?;
        log_startup(&config.api_base_url, command);

        let client = HttpAnalysisClient::new(&config).context("无法创建分析后端客户端")?;
        let orchestrator = AnalysisOrchestrator::new(
            Arc::new(client),
            SvgChartBackend::default(),
            config.default_year,
        );

        Ok(Self {
            config,
            orchestrator,
        })
    }

    /// 执行一条命令
    pub async fn run(&self, command: Command, layer: LayerKind) -> Result<()> {
        let year = self.config.default_year;
        self.orchestrator.set_layer(layer, year);

        match command {
            Command::Point { lat, lon } => {
                self.orchestrator.analyze_point(LatLon::new(lat, lon)).await;
                log_display_state(&self.orchestrator.display());
            }
            Command::Area { shape, report } => {
                self.draw(&shape)?;
                let outcome = self.orchestrator.analyze_active_area().await?;
                log_display_state(&self.orchestrator.display());
                log_area_outcome(&outcome);

                if report {
                    self.export_report().await?;
                }
            }
            Command::ExportTiff { shape } => {
                self.draw(&shape)?;
                let outcome = self.orchestrator.export_raster().await?;
                open_download(outcome)?;
            }
            Command::ExportDrive { shape } => {
                self.draw(&shape)?;
                let outcome = self.orchestrator.export_batch().await?;
                open_download(outcome)?;
            }
            Command::Layer => {
                let source = self.orchestrator.select_layer(layer, year).await?;
                println!("{}", source);
            }
        }

        log_session_complete(&self.config.output_log_file);
        Ok(())
    }

    fn draw(&self, shape: &ShapeArgs) -> Result<()> {
        let (geometry, kind) = load_shape(shape)?;
        self.orchestrator.draw(geometry, kind)?;
        Ok(())
    }

    /// 导出报告（期间持有浏览器）
    async fn export_report(&self) -> Result<()> {
        let (mut browser, page) =
            browser::launch_headless_browser(self.config.chrome_executable.as_deref()).await?;
        let pipeline = ReportExportPipeline::new(
            HeadlessRenderer::new(page),
            &self.config.report_output_dir,
            self.config.panel_width,
        );

        let result = self.orchestrator.export_report(&pipeline).await;

        if let Err(e) = browser.close().await {
            warn!("⚠️ 关闭浏览器失败: {}", e);
        }

        let path = result.context("报告导出失败")?;
        println!("{}", path.display());
        Ok(())
    }
}

/// 加载几何：矩形参数或 GeoJSON 文件
pub fn load_shape(shape: &ShapeArgs) -> Result<(Geometry, ShapeKind)> {
    if let Some(bbox) = &shape.bbox {
        let [min_lon, min_lat, max_lon, max_lat] = bbox.as_slice() else {
            bail!("--bbox 需要 4 个数值，实际为 {}", bbox.len());
        };
        return Ok((
            rectangle_polygon(*min_lon, *min_lat, *max_lon, *max_lat),
            ShapeKind::Rectangle,
        ));
    }

    let path = shape
        .geojson
        .as_deref()
        .ok_or_else(|| anyhow!("需要 --geojson 或 --bbox"))?;
    load_geojson(path)
}

fn load_geojson(path: &Path) -> Result<(Geometry, ShapeKind)> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("无法读取 GeoJSON 文件: {}", path.display()))?;
    let parsed: GeoJson = content
        .parse()
        .with_context(|| format!("GeoJSON 解析失败: {}", path.display()))?;

    let geometry = match parsed {
        GeoJson::Geometry(geometry) => Some(geometry),
        GeoJson::Feature(feature) => feature.geometry,
        GeoJson::FeatureCollection(collection) => collection
            .features
            .into_iter()
            .next()
            .and_then(|feature| feature.geometry),
    }
    .ok_or_else(|| anyhow!("GeoJSON 中没有几何图形: {}", path.display()))?;

    let kind = ShapeKind::infer(&geometry)
        .ok_or_else(|| anyhow!("不支持的几何类型（仅支持点、线、多边形）: {}", path.display()))?;
    Ok((geometry, kind))
}

/// 输出下载地址或任务受理信息
fn open_download(outcome: JobOutcome) -> Result<()> {
    match outcome {
        JobOutcome::Completed { download_url } => {
            info!("⬇️ 下载地址已生成");
            println!("{}", download_url);
            Ok(())
        }
        JobOutcome::Accepted { message } => {
            info!("☁️ {}", message);
            println!("{}", message);
            Ok(())
        }
        JobOutcome::Failed { message } => {
            error!("❌ 导出失败: {}", message);
            bail!(message)
        }
    }
}

// ========== 日志辅助函数 ==========

fn log_area_outcome(outcome: &AreaOutcome) {
    match outcome {
        AreaOutcome::Applied {
            trend: LegOutcome::Applied,
        } => info!("✅ 区域分析完成"),
        AreaOutcome::Applied {
            trend: LegOutcome::Failed(message),
        } => warn!("⚠️ 区域统计完成，趋势图失败: {}", message),
        AreaOutcome::Applied {
            trend: LegOutcome::Superseded,
        }
        | AreaOutcome::Superseded => info!("几何已被替换，结果未显示"),
        AreaOutcome::Failed { message } => error!("❌ 区域分析失败: {}", message),
    }
}
