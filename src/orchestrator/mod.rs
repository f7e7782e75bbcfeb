//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层把用户事件（绘制、点击、导出）转换为远程调用序列，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `analysis_orchestrator` - 分析编排器
//! - 持有应用状态（几何、显示状态、图表、图层）
//! - 点位查询、区域分析、图层切换
//! - 栅格导出、批量导出、报告导出，维护对应按钮的忙碌状态
//! - 丢弃已被替换几何的迟到响应
//!
//! ### `session` - 命令行会话
//! - 管理应用生命周期（初始化、运行）
//! - 加载几何（GeoJSON 文件 / 外接矩形）
//! - 按需启动无头浏览器导出报告
//!
//! ## 层次关系
//!
//! ```text
//! session (一次命令行会话)
//!     ↓
//! analysis_orchestrator (事件 → 远程调用序列)
//!     ↓
//! workflow::AppState (同步状态转换)
//!     ↓
//! services (能力层：几何 / 图表 / 导出 / 图层)
//!     ↓
//! clients + infrastructure (HTTP 客户端、无头浏览器)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一写入者**：只有编排器写应用状态
//! 2. **锁不跨越 await**：状态锁只在同步片段内持有
//! 3. **向下依赖**：编排层 → workflow → services → clients / infrastructure

pub mod analysis_orchestrator;
pub mod session;

// 重新导出主要类型
pub use analysis_orchestrator::{AnalysisOrchestrator, AreaOutcome};
pub use session::{load_shape, App};
