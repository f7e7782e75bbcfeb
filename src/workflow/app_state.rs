//! 应用状态 - 流程层
//!
//! 几何、显示状态、图表和图层选择集中在一个对象里，由编排层独占写入。
//! 所有方法都是同步的状态转换；带 `GeometryId` 的方法在几何已被替换时
//! 不做任何修改。

use geojson::Geometry;
use tracing::{debug, warn};

use crate::error::AppResult;
use crate::models::{AnalysisResult, GeometryId, LatLon, ShapeKind, TimeSeries};
use crate::services::geometry_state::GeometryState;
use crate::services::layer_selection::LayerSelection;
use crate::services::visualization::{ChartBackend, ChartDataset, Slot, VisualizationLifecycle};
use crate::workflow::display_state::{
    Affordances, ChartRegion, DisplayState, PointPopup, PopupContent, StatsSection, TriggerState,
};

/// 时间序列这一步的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegOutcome {
    Applied,
    Failed(String),
    /// 几何已被替换，结果被丢弃
    Superseded,
}

/// 应用状态
pub struct AppState<B: ChartBackend> {
    geometry: GeometryState,
    display: DisplayState,
    charts: VisualizationLifecycle<B>,
    layer: LayerSelection,
    point_ticket: u64,
}

impl<B: ChartBackend> AppState<B> {
    pub fn new(backend: B, layer: LayerSelection) -> Self {
        Self {
            geometry: GeometryState::new(),
            display: DisplayState::default(),
            charts: VisualizationLifecycle::new(backend),
            layer,
            point_ticket: 0,
        }
    }

    pub fn geometry(&self) -> &GeometryState {
        &self.geometry
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn charts(&self) -> &VisualizationLifecycle<B> {
        &self.charts
    }

    pub fn layer(&self) -> LayerSelection {
        self.layer
    }

    pub fn set_layer(&mut self, layer: LayerSelection) {
        self.layer = layer;
    }

    pub(crate) fn affordances_mut(&mut self) -> &mut Affordances {
        &mut self.display.affordances
    }

    /// 替换几何并重新计算操作按钮
    ///
    /// 面板内容保留，迟到的旧响应由 `GeometryId` 过滤
    pub fn set_geometry(&mut self, shape: Geometry, kind: ShapeKind) -> AppResult<bool> {
        let enabled = self.geometry.set_geometry(shape, kind)?;
        self.display.affordances.apply_geometry(enabled);
        Ok(enabled)
    }

    // ========== 点位查询 ==========

    /// 打开等待中的弹窗，返回本次点击的序号
    pub fn begin_point(&mut self, at: LatLon) -> u64 {
        self.point_ticket += 1;
        self.display.popup = Some(PointPopup {
            at,
            ticket: self.point_ticket,
            content: PopupContent::Pending,
        });
        self.point_ticket
    }

    /// 填充弹窗；已有更新的点击时返回 `false`
    pub fn finish_point(&mut self, ticket: u64, content: PopupContent) -> bool {
        match self.display.popup.as_mut() {
            Some(popup) if popup.ticket == ticket => {
                popup.content = content;
                true
            }
            _ => {
                debug!("点位响应 #{} 已过期，丢弃", ticket);
                false
            }
        }
    }

    // ========== 区域分析 ==========

    /// 开始区域分析：显示加载中的面板，清空图表，隐藏报告导出
    pub fn begin_area(&mut self, id: GeometryId) {
        self.display.panel.begin(id);
        self.display.affordances.export_report = TriggerState::Hidden;
        self.charts.clear_all();
    }

    /// 写入区域统计并绑定构成图
    pub fn apply_statistics(&mut self, id: GeometryId, result: AnalysisResult) -> bool {
        if !self.accepts(id) {
            return false;
        }

        let cover = result.land_cover;
        self.display.panel.stats = Some(StatsSection::Ready(result));
        self.display.panel.composition = self.bind_region(Slot::Composition, ChartDataset::Composition(cover));
        // 同一几何的上一轮趋势图作废，等待本轮时间序列
        self.charts.clear(Slot::Trend);
        self.display.panel.trend = ChartRegion::Loading;
        self.refresh_report_trigger();
        true
    }

    pub fn fail_statistics(&mut self, id: GeometryId, message: String) -> bool {
        if !self.accepts(id) {
            return false;
        }
        self.display.panel.stats = Some(StatsSection::Failed(message));
        true
    }

    /// 绑定趋势图
    pub fn apply_time_series(&mut self, id: GeometryId, series: TimeSeries) -> LegOutcome {
        if !self.accepts(id) {
            return LegOutcome::Superseded;
        }

        let region = self.bind_region(Slot::Trend, ChartDataset::Trend(series));
        self.display.panel.trend = region.clone();
        self.refresh_report_trigger();

        match region {
            ChartRegion::Failed(message) => LegOutcome::Failed(message),
            _ => LegOutcome::Applied,
        }
    }

    /// 时间序列失败只影响趋势图区域
    pub fn fail_time_series(&mut self, id: GeometryId, message: String) -> LegOutcome {
        if !self.accepts(id) {
            return LegOutcome::Superseded;
        }
        self.display.panel.trend = ChartRegion::Failed(message.clone());
        LegOutcome::Failed(message)
    }

    /// 面板描述的是否为当前几何
    pub fn panel_is_current(&self) -> bool {
        self.display
            .panel
            .geometry_id
            .is_some_and(|id| self.geometry.is_current(id))
    }

    /// 面板属于当前几何、统计结果和两个图表都就绪时启用报告导出
    pub fn refresh_report_trigger(&mut self) {
        let panel = &self.display.panel;
        let complete = self.panel_is_current()
            && panel.analysis().is_some()
            && panel.trend == ChartRegion::Bound
            && panel.composition == ChartRegion::Bound
            && Slot::ALL.iter().all(|slot| self.charts.is_bound(*slot));
        let trigger = &mut self.display.affordances.export_report;
        if *trigger != TriggerState::Busy {
            *trigger = if complete {
                TriggerState::Enabled
            } else {
                TriggerState::Hidden
            };
        }
    }

    /// 导出类按钮结束忙碌后的状态
    pub fn idle_job_trigger(&self) -> TriggerState {
        if self.geometry.analysis_enabled() {
            TriggerState::Enabled
        } else {
            TriggerState::Hidden
        }
    }

    /// 响应对应的几何是否仍是当前面板描述的几何
    fn accepts(&self, id: GeometryId) -> bool {
        let current = self.geometry.is_current(id) && self.display.panel.geometry_id == Some(id);
        if !current {
            debug!("几何 {} 的响应已过期，丢弃", id);
        }
        current
    }

    fn bind_region(&mut self, slot: Slot, dataset: ChartDataset) -> ChartRegion {
        match self.charts.bind(slot, dataset) {
            Ok(()) => ChartRegion::Bound,
            Err(e) => {
                warn!("⚠️ 图表绑定失败: {}", e);
                ChartRegion::Failed(e.to_string())
            }
        }
    }
}
