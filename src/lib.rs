//! # Mangrove Pulse
//!
//! 红树林遥感分析客户端：绘制区域、查询后端计算的植被/水体指数、导出分析报告
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure / Clients）
//! - `clients/` - 分析后端 HTTP 客户端（`HttpAnalysisClient`）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露栅格化和组装文档能力
//! - `HeadlessRenderer` - 唯一的 page owner
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `GeometryState` - 唯一的激活几何
//! - `VisualizationLifecycle` - 两个图表槽位，先释放再创建
//! - `ReportExportPipeline` - 快照 → 栅格化 → PDF
//! - `RemoteJobDispatch` - 栅格导出 / 批量导出
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 应用状态与显示状态
//! - `AppState` - 带过期检查的同步状态转换
//! - `DisplayState` - 面板、弹窗、操作按钮
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/analysis_orchestrator` - 事件 → 远程调用序列
//! - `orchestrator/session` - 命令行会话
//!
//! ## 模块结构

pub mod browser;
pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{HttpAnalysisClient, RemoteAnalysisService};
pub use config::Config;
pub use error::{AppResult, ClientError, RemoteError};
pub use infrastructure::HeadlessRenderer;
pub use models::{ActiveGeometry, LatLon, LayerKind, ShapeKind};
pub use orchestrator::{AnalysisOrchestrator, App, AreaOutcome};
pub use services::{JobOutcome, ReportExportPipeline, Slot, SvgChartBackend};
pub use workflow::{DisplayState, LegOutcome, PopupContent, TriggerState};
