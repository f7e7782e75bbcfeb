//! 远程分析服务
//!
//! `RemoteAnalysisService` 是编排层依赖的唯一远程接口，
//! 生产环境使用 `HttpAnalysisClient`，测试中注入替身实现。

pub mod analysis_client;
pub mod wire;

pub use analysis_client::HttpAnalysisClient;
pub use wire::ExportRequest;

use crate::error::RemoteError;
use crate::models::{AnalysisResult, IndexValues, LatLon, LayerKind, YearValue};

/// 远程分析服务
#[allow(async_fn_in_trait)]
pub trait RemoteAnalysisService {
    /// 点位指数
    async fn point_indices(&self, at: LatLon) -> Result<IndexValues, RemoteError>;

    /// 瓦片图层地址
    async fn tile_layer(&self, layer: LayerKind, year: i32) -> Result<String, RemoteError>;

    /// 区域统计（含土地覆盖构成）
    async fn area_statistics(
        &self,
        geometry: &geojson::Geometry,
    ) -> Result<AnalysisResult, RemoteError>;

    /// NDVI 年度序列
    async fn time_series(&self, at: LatLon) -> Result<Vec<YearValue>, RemoteError>;

    /// 栅格导出，返回可直接打开的下载地址
    async fn raster_export(&self, request: &ExportRequest) -> Result<String, RemoteError>;

    /// 批量导出任务，返回受理消息
    async fn batch_export(&self, request: &ExportRequest) -> Result<String, RemoteError>;
}
