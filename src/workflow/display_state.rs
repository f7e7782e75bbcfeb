//! 显示状态
//!
//! 编排层写入的"屏幕"：分析面板、点位弹窗、操作按钮

use crate::models::{AnalysisResult, GeometryId, IndexValues, LatLon};

/// 操作按钮状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerState {
    #[default]
    Hidden,
    Enabled,
    /// 操作进行中，暂时禁用
    Busy,
}

impl TriggerState {
    fn label(self) -> &'static str {
        match self {
            TriggerState::Hidden => "hidden",
            TriggerState::Enabled => "enabled",
            TriggerState::Busy => "busy",
        }
    }
}

/// 所有操作按钮
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Affordances {
    pub analyze_area: TriggerState,
    pub export_report: TriggerState,
    pub export_raster: TriggerState,
    pub export_batch: TriggerState,
}

impl Affordances {
    /// 几何替换后重新计算（报告导出按钮总是隐藏）
    pub fn apply_geometry(&mut self, analysis_enabled: bool) {
        let state = if analysis_enabled {
            TriggerState::Enabled
        } else {
            TriggerState::Hidden
        };
        self.analyze_area = state;
        self.export_raster = state;
        self.export_batch = state;
        self.export_report = TriggerState::Hidden;
    }

    pub fn summary(&self) -> String {
        format!(
            "analyze={} report={} tiff={} drive={}",
            self.analyze_area.label(),
            self.export_report.label(),
            self.export_raster.label(),
            self.export_batch.label()
        )
    }
}

/// 统计区域
#[derive(Debug, Clone, PartialEq)]
pub enum StatsSection {
    Loading,
    Ready(AnalysisResult),
    Failed(String),
}

/// 图表区域
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChartRegion {
    #[default]
    Empty,
    Loading,
    Bound,
    Failed(String),
}

/// 分析面板
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PanelState {
    pub visible: bool,
    /// 面板当前描述的几何
    pub geometry_id: Option<GeometryId>,
    pub stats: Option<StatsSection>,
    pub trend: ChartRegion,
    pub composition: ChartRegion,
}

impl PanelState {
    /// 开始一次新的区域分析
    pub fn begin(&mut self, id: GeometryId) {
        *self = PanelState {
            visible: true,
            geometry_id: Some(id),
            stats: Some(StatsSection::Loading),
            trend: ChartRegion::Empty,
            composition: ChartRegion::Empty,
        };
    }

    /// 已到达的区域统计结果
    pub fn analysis(&self) -> Option<&AnalysisResult> {
        match &self.stats {
            Some(StatsSection::Ready(result)) => Some(result),
            _ => None,
        }
    }

    pub fn summary_lines(&self) -> Vec<String> {
        if !self.visible {
            return vec!["analysis panel hidden".to_string()];
        }

        let mut lines = Vec::new();
        match &self.stats {
            Some(StatsSection::Ready(result)) => {
                lines.push(format!("Zonal Statistics ({})", result.year));
                for (name, value) in result.stats.entries() {
                    lines.push(format!("Mean {}: {}", name, format_index(value)));
                }
                lines.push(format!("Total Area: {}", format_hectares(result.area_m2)));
                lines.push(format!(
                    "Mangrove: {:.0} m² / Non-Mangrove: {:.0} m²",
                    result.land_cover.mangrove_area_m2,
                    result.land_cover.non_mangrove_area_m2()
                ));
            }
            Some(StatsSection::Loading) => lines.push(ANALYZING_AREA.to_string()),
            Some(StatsSection::Failed(message)) => lines.push(format!("Error: {}", message)),
            None => {}
        }
        lines.push(format!("trend chart: {}", region_label(&self.trend)));
        lines.push(format!("composition chart: {}", region_label(&self.composition)));
        lines
    }
}

fn region_label(region: &ChartRegion) -> String {
    match region {
        ChartRegion::Empty => "empty".to_string(),
        ChartRegion::Loading => "loading".to_string(),
        ChartRegion::Bound => "bound".to_string(),
        ChartRegion::Failed(message) => format!("error ({})", message),
    }
}

/// 点位弹窗内容
#[derive(Debug, Clone, PartialEq)]
pub enum PopupContent {
    /// 请求进行中
    Pending,
    Indices(IndexValues),
    Error(String),
}

/// 点位弹窗
#[derive(Debug, Clone, PartialEq)]
pub struct PointPopup {
    pub at: LatLon,
    /// 点击序号，新点击使旧弹窗失效
    pub ticket: u64,
    pub content: PopupContent,
}

impl PointPopup {
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = match &self.content {
            PopupContent::Pending => vec![FETCHING_INDICES.to_string()],
            PopupContent::Indices(values) => values
                .entries()
                .iter()
                .map(|(name, value)| format!("{}: {}", name, format_index(*value)))
                .collect(),
            PopupContent::Error(message) => vec![format!("Error: {}", message)],
        };
        lines.push(self.at.to_string());
        lines
    }
}

/// 整个屏幕的显示状态
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayState {
    pub panel: PanelState,
    pub popup: Option<PointPopup>,
    pub affordances: Affordances,
}

pub const FETCHING_INDICES: &str = "Fetching indices...";
pub const ANALYZING_AREA: &str = "Analyzing area, please wait...";
pub const LOADING_TIMESERIES: &str = "Loading time series chart...";

/// 指数值保留三位小数，缺失显示 N/A
pub fn format_index(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.3}", v))
        .unwrap_or_else(|| "N/A".to_string())
}

/// 平方米转公顷，保留两位小数
pub fn format_hectares(area_m2: f64) -> String {
    format!("{:.2} ha", area_m2 / 10_000.0)
}
