//! 分析编排器 - 编排层
//!
//! ## 职责
//!
//! 把几何变化和点击事件转换为一串相互依赖的远程调用，并把结果写回应用状态：
//!
//! 1. **点位查询**：一次指数查询，写入弹窗
//! 2. **区域分析**：区域统计 → 构成图 → 时间序列 → 趋势图
//! 3. **导出任务**：栅格导出、批量导出、报告导出，期间对应按钮处于忙碌状态
//!
//! ## 并发约定
//!
//! 状态锁只在同步片段内持有，任何 `.await` 之前都已释放。
//! 每个请求在发出时记录 `GeometryId`，响应到达时与当前几何比对，
//! 不一致的结果直接丢弃。

use std::path::PathBuf;
use std::sync::Arc;

use geojson::Geometry;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::clients::RemoteAnalysisService;
use crate::error::{AppResult, ClientError};
use crate::models::{ActiveGeometry, LatLon, LayerKind, ShapeKind, TimeSeries};
use crate::services::job_dispatch::{validate_export, JobOutcome, RemoteJobDispatch};
use crate::services::layer_selection::{resolve_tile_source, LayerSelection, TileSource};
use crate::services::report_export::{DocumentComposer, Rasterizer, ReportExportPipeline};
use crate::services::visualization::{ChartBackend, Slot};
use crate::workflow::app_state::{AppState, LegOutcome};
use crate::workflow::display_state::{Affordances, DisplayState, PopupContent, TriggerState};

const FETCH_FAILED: &str = "Failed to fetch data.";
const ANALYSIS_CONNECT_FAILED: &str = "Failed to connect to the analysis server.";
const TIMESERIES_FAILED: &str = "Failed to load time series data.";

/// 区域分析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AreaOutcome {
    /// 统计结果已写入面板
    Applied { trend: LegOutcome },
    /// 区域统计失败，面板显示错误
    Failed { message: String },
    /// 几何已被替换，结果被丢弃
    Superseded,
}

/// 导出任务类型
#[derive(Debug, Clone, Copy)]
enum JobKind {
    Raster,
    Batch,
}

impl JobKind {
    fn trigger(self, affordances: &mut Affordances) -> &mut TriggerState {
        match self {
            JobKind::Raster => &mut affordances.export_raster,
            JobKind::Batch => &mut affordances.export_batch,
        }
    }
}

/// 分析编排器
pub struct AnalysisOrchestrator<S, B: ChartBackend> {
    service: Arc<S>,
    dispatch: RemoteJobDispatch<S>,
    state: Mutex<AppState<B>>,
}

impl<S: RemoteAnalysisService, B: ChartBackend> AnalysisOrchestrator<S, B> {
    /// 创建编排器
    ///
    /// # 参数
    /// - `service`: 分析后端
    /// - `backend`: 图表后端
    /// - `default_year`: 初始年份
    pub fn new(service: Arc<S>, backend: B, default_year: i32) -> Self {
        let layer = LayerSelection::new(LayerKind::default(), default_year);
        Self {
            dispatch: RemoteJobDispatch::new(service.clone()),
            service,
            state: Mutex::new(AppState::new(backend, layer)),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// 当前显示状态的副本
    pub fn display(&self) -> DisplayState {
        self.state.lock().display().clone()
    }

    pub fn active_geometry(&self) -> Option<ActiveGeometry> {
        self.state.lock().geometry().geometry().cloned()
    }

    pub fn layer(&self) -> LayerSelection {
        self.state.lock().layer()
    }

    pub fn is_bound(&self, slot: Slot) -> bool {
        self.state.lock().charts().is_bound(slot)
    }

    /// 在锁内读取应用状态
    pub fn with_state<T>(&self, f: impl FnOnce(&AppState<B>) -> T) -> T {
        f(&self.state.lock())
    }

    /// 绘制新几何，替换当前几何
    ///
    /// # 返回
    /// 返回是否启用分析类操作
    pub fn draw(&self, shape: Geometry, kind: ShapeKind) -> AppResult<bool> {
        let mut state = self.state.lock();
        let enabled = state.set_geometry(shape, kind)?;
        info!("✏️ 已绘制 {} ({})", kind, state.display().affordances.summary());
        Ok(enabled)
    }

    // ========== 点位查询 ==========

    /// 查询单点指数
    ///
    /// 错误都转换为弹窗内容，不向上返回
    pub async fn analyze_point(&self, at: LatLon) -> PopupContent {
        let ticket = self.state.lock().begin_point(at);
        info!("📍 正在查询点位指数 ({})...", at);

        let content = match self.service.point_indices(at).await {
            Ok(values) => PopupContent::Indices(values),
            Err(e) => {
                warn!("⚠️ 点位查询失败: {}", e);
                PopupContent::Error(e.user_message(FETCH_FAILED))
            }
        };

        self.state.lock().finish_point(ticket, content.clone());
        content
    }

    // ========== 区域分析 ==========

    /// 分析当前几何
    pub async fn analyze_active_area(&self) -> AppResult<AreaOutcome> {
        let geometry = self.active_geometry().ok_or(ClientError::NoGeometry)?;
        self.analyze_area(&geometry).await
    }

    /// 区域分析
    ///
    /// 流程：区域统计 → 构成图 → 时间序列（几何中心点）→ 趋势图
    pub async fn analyze_area(&self, geometry: &ActiveGeometry) -> AppResult<AreaOutcome> {
        if !geometry.kind().supports_area_analysis() {
            return Err(ClientError::InvalidGeometryType {
                kind: geometry.kind(),
            });
        }

        let id = geometry.id();
        {
            let mut state = self.state.lock();
            if !state.geometry().is_current(id) {
                debug!("几何 {} 已不是当前几何，跳过分析", id);
                return Ok(AreaOutcome::Superseded);
            }
            state.begin_area(id);
        }

        info!("🌿 正在分析区域 {} ...", id);
        let statistics = self.service.area_statistics(geometry.shape()).await;

        let result = match statistics {
            Ok(result) => result,
            Err(e) => {
                warn!("⚠️ 区域统计失败: {}", e);
                let message = e.user_message(ANALYSIS_CONNECT_FAILED);
                let applied = self.state.lock().fail_statistics(id, message.clone());
                return Ok(if applied {
                    AreaOutcome::Failed { message }
                } else {
                    AreaOutcome::Superseded
                });
            }
        };

        info!(
            "✓ 区域统计完成: {:.2} ha ({})",
            result.area_hectares(),
            result.year
        );
        if !self.state.lock().apply_statistics(id, result) {
            return Ok(AreaOutcome::Superseded);
        }

        let centroid = geometry.centroid();
        info!("📈 正在加载时间序列 ({})...", centroid);
        let trend = match self.service.time_series(centroid).await {
            Ok(points) => {
                let series = TimeSeries::new(centroid, points);
                debug!("时间序列共 {} 年", series.points().len());
                self.state.lock().apply_time_series(id, series)
            }
            Err(e) => {
                warn!("⚠️ 时间序列加载失败: {}", e);
                let message = e.user_message(TIMESERIES_FAILED);
                self.state.lock().fail_time_series(id, message)
            }
        };

        Ok(AreaOutcome::Applied { trend })
    }

    // ========== 图层 ==========

    /// 只记录图层与年份，不解析瓦片
    pub fn set_layer(&self, layer: LayerKind, year: i32) {
        self.state.lock().set_layer(LayerSelection::new(layer, year));
    }

    /// 切换图层与年份，返回瓦片来源
    pub async fn select_layer(&self, layer: LayerKind, year: i32) -> AppResult<TileSource> {
        self.set_layer(layer, year);
        let source = resolve_tile_source(self.service.as_ref(), layer, year).await?;
        info!("🗺️ 当前图层: {} {} → {}", layer, year, source);
        Ok(source)
    }

    // ========== 导出 ==========

    /// 栅格导出（GeoTIFF 下载地址）
    pub async fn export_raster(&self) -> AppResult<JobOutcome> {
        self.run_job(JobKind::Raster).await
    }

    /// 批量导出（只确认受理）
    pub async fn export_batch(&self) -> AppResult<JobOutcome> {
        self.run_job(JobKind::Batch).await
    }

    async fn run_job(&self, kind: JobKind) -> AppResult<JobOutcome> {
        let (geometry, selection) = {
            let mut state = self.state.lock();
            let geometry = state
                .geometry()
                .geometry()
                .cloned()
                .ok_or(ClientError::NoGeometry)?;
            let selection = state.layer();
            validate_export(&geometry, selection.layer)?;
            *kind.trigger(state.affordances_mut()) = TriggerState::Busy;
            (geometry, selection)
        };

        let outcome = match kind {
            JobKind::Raster => {
                self.dispatch
                    .request_raster_export(&geometry, selection.year, selection.layer)
                    .await
            }
            JobKind::Batch => {
                self.dispatch
                    .request_batch_export(&geometry, selection.year, selection.layer)
                    .await
            }
        };

        {
            let mut state = self.state.lock();
            let idle = state.idle_job_trigger();
            let trigger = kind.trigger(state.affordances_mut());
            if *trigger == TriggerState::Busy {
                *trigger = idle;
            }
        }

        outcome
    }

    /// 导出分析报告
    ///
    /// 快照不完整时返回 `IncompleteAnalysis`，按钮保持原状；
    /// 其余情况下按钮在导出期间忙碌，结束后恢复
    pub async fn export_report<R>(&self, pipeline: &ReportExportPipeline<R>) -> AppResult<PathBuf>
    where
        R: Rasterizer + DocumentComposer,
    {
        let snapshot = {
            let mut state = self.state.lock();
            if !state.panel_is_current() {
                debug!("面板对应的几何已被替换，不导出报告");
                return Err(ClientError::IncompleteAnalysis {
                    missing: "analysis of the current geometry",
                });
            }
            let snapshot = pipeline.build_snapshot(&state.display().panel, state.charts())?;
            state.affordances_mut().export_report = TriggerState::Busy;
            snapshot
        };

        info!("📄 正在导出分析报告...");
        let written = pipeline.write_report(snapshot).await;

        {
            let mut state = self.state.lock();
            if state.display().affordances.export_report == TriggerState::Busy {
                state.affordances_mut().export_report = TriggerState::Hidden;
                state.refresh_report_trigger();
            }
        }

        written
    }
}
