use thiserror::Error;

use crate::models::{LayerKind, ShapeKind};
use crate::services::visualization::Slot;

/// 客户端错误类型
#[derive(Debug, Error)]
pub enum ClientError {
    /// 操作需要几何图形，但当前没有
    #[error("当前没有已绘制的几何图形")]
    NoGeometry,

    /// 操作需要多边形/矩形
    #[error("该操作需要多边形或矩形，当前几何类型为 {kind}")]
    InvalidGeometryType { kind: ShapeKind },

    /// 在非分析图层（卫星底图）上请求导出
    #[error("图层 {layer} 不支持导出")]
    UnsupportedLayer { layer: LayerKind },

    /// GeoJSON 无法解析为可用的几何图形
    #[error("几何图形无效: {reason}")]
    MalformedGeometry { reason: String },

    /// 远程服务错误
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// 依赖结果尚未到达
    #[error("分析尚未完成，缺少: {missing}")]
    IncompleteAnalysis { missing: &'static str },

    /// 栅格化或文档组装失败
    #[error("报告导出失败 ({stage}): {reason}")]
    ExportFailed { stage: &'static str, reason: String },

    /// 图表创建或快照失败
    #[error("图表错误 ({slot}): {reason}")]
    Chart { slot: Slot, reason: String },

    /// 浏览器错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 文件错误
    #[error("文件错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 远程服务错误
///
/// 每一类远程调用（点位、区域、时间序列、导出）各自独立地产生这些错误，
/// 由编排层在调用边界转换为面板内的提示信息。
#[derive(Debug, Error)]
pub enum RemoteError {
    /// 网络请求失败
    #[error("请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// 服务返回 status≠OK
    #[error("服务返回错误 ({endpoint}): {message}")]
    BadResponse { endpoint: String, message: String },

    /// JSON 解析失败
    #[error("JSON解析失败 ({endpoint}): {source}")]
    JsonParseFailed {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RemoteError {
    /// 创建网络请求失败错误
    pub fn request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RemoteError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        }
    }

    /// 创建服务端错误响应
    pub fn bad_response(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        RemoteError::BadResponse {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// 面向用户的提示文本
    ///
    /// 服务端给出的错误原文直接展示；传输层错误使用 `fallback`。
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            RemoteError::BadResponse { message, .. } => message.clone(),
            RemoteError::RequestFailed { .. } | RemoteError::JsonParseFailed { .. } => {
                fallback.to_string()
            }
        }
    }
}

impl ClientError {
    /// 创建导出失败错误
    pub fn export_failed(stage: &'static str, reason: impl std::fmt::Display) -> Self {
        ClientError::ExportFailed {
            stage,
            reason: reason.to_string(),
        }
    }

    /// 创建图表错误
    pub fn chart(slot: Slot, reason: impl Into<String>) -> Self {
        ClientError::Chart {
            slot,
            reason: reason.into(),
        }
    }
}

/// 客户端结果类型
pub type AppResult<T> = Result<T, ClientError>;
