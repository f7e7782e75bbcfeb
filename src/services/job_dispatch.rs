//! 远程导出任务 - 业务能力层
//!
//! 栅格下载返回可直接打开的地址；批量导出只表示任务已被受理，
//! 完成通知由远端另行发送（云盘/邮件），客户端不轮询也不接收结果。

use std::sync::Arc;

use tracing::{info, warn};

use crate::clients::{ExportRequest, RemoteAnalysisService};
use crate::error::{AppResult, ClientError};
use crate::models::{ActiveGeometry, LayerKind};

const EXPORT_CONNECT_FAILED: &str = "Failed to connect to the export server.";

/// 导出任务结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// 结果已就绪，可直接下载
    Completed { download_url: String },
    /// 远端任务已受理，结果未知
    Accepted { message: String },
    Failed { message: String },
}

/// 校验图层与几何类型，返回后端指数名
///
/// 卫星图层先于几何类型检查，两者都在发出请求之前完成
pub fn validate_export(geometry: &ActiveGeometry, layer: LayerKind) -> AppResult<&'static str> {
    let index_name = layer
        .index_name()
        .ok_or(ClientError::UnsupportedLayer { layer })?;

    if !geometry.kind().supports_area_analysis() {
        return Err(ClientError::InvalidGeometryType {
            kind: geometry.kind(),
        });
    }

    Ok(index_name)
}

/// 远程导出任务
pub struct RemoteJobDispatch<S> {
    service: Arc<S>,
}

impl<S: RemoteAnalysisService> RemoteJobDispatch<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }

    /// 栅格导出
    pub async fn request_raster_export(
        &self,
        geometry: &ActiveGeometry,
        year: i32,
        layer: LayerKind,
    ) -> AppResult<JobOutcome> {
        let request = build_request(geometry, year, layer)?;
        info!("🗺️ 正在请求 GeoTIFF 导出 ({} {})...", request.index_name, year);

        let outcome = match self.service.raster_export(&request).await {
            Ok(download_url) => {
                info!("✓ GeoTIFF 已就绪");
                JobOutcome::Completed { download_url }
            }
            Err(e) => {
                warn!("⚠️ GeoTIFF 导出失败: {}", e);
                JobOutcome::Failed {
                    message: e.user_message(EXPORT_CONNECT_FAILED),
                }
            }
        };
        Ok(outcome)
    }

    /// 批量导出（只确认受理）
    pub async fn request_batch_export(
        &self,
        geometry: &ActiveGeometry,
        year: i32,
        layer: LayerKind,
    ) -> AppResult<JobOutcome> {
        let request = build_request(geometry, year, layer)?;
        info!("☁️ 正在提交批量导出任务 ({} {})...", request.index_name, year);

        let outcome = match self.service.batch_export(&request).await {
            Ok(message) => {
                info!("✓ 批量导出任务已受理");
                JobOutcome::Accepted { message }
            }
            Err(e) => {
                warn!("⚠️ 批量导出任务提交失败: {}", e);
                JobOutcome::Failed {
                    message: e.user_message(EXPORT_CONNECT_FAILED),
                }
            }
        };
        Ok(outcome)
    }
}

fn build_request(geometry: &ActiveGeometry, year: i32, layer: LayerKind) -> AppResult<ExportRequest> {
    let index_name = validate_export(geometry, layer)?;
    Ok(ExportRequest {
        polygon: geometry.shape().clone(),
        year,
        index_name: index_name.to_string(),
    })
}
