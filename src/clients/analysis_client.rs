/// 分析后端 HTTP 客户端
///
/// 封装所有与分析后端相关的调用逻辑
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::clients::wire::{
    AreaStatisticsBody, BatchExportBody, ExportRequest, PointIndicesBody, RasterExportBody, Reply,
    TileLayerBody, TimeSeriesBody,
};
use crate::clients::RemoteAnalysisService;
use crate::config::Config;
use crate::error::{AppResult, ClientError, RemoteError};
use crate::models::{AnalysisResult, IndexValues, LatLon, LayerKind, YearValue};
use crate::utils::logging::truncate_text;

const INDICES: &str = "indices";
const ANALYZE_AREA: &str = "analyze-area";
const TIMESERIES: &str = "timeseries";
const EXPORT_TIFF: &str = "export-tiff";
const EXPORT_TO_DRIVE: &str = "export-to-drive";

/// 分析后端客户端
pub struct HttpAnalysisClient {
    http: Client,
    base_url: String,
}

impl HttpAnalysisClient {
    /// 创建新的后端客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ClientError::Config(format!("无法创建 HTTP 客户端: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET 请求并解析响应外壳
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<Reply<T>, RemoteError> {
        debug!("GET {} {:?}", endpoint, query);
        let request = self.http.get(self.url(endpoint)).query(query);
        self.send(endpoint, request).await
    }

    /// POST JSON 请求并解析响应外壳
    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<Reply<T>, RemoteError> {
        debug!("POST {}", endpoint);
        let request = self.http.post(self.url(endpoint)).json(body);
        self.send(endpoint, request).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<Reply<T>, RemoteError> {
        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::request_failed(endpoint, e))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RemoteError::request_failed(endpoint, e))?;

        debug!("{} 响应 ({}): {}", endpoint, status, truncate_text(&text, 200));

        match serde_json::from_str::<Reply<T>>(&text) {
            Ok(reply) => Ok(reply),
            // 非 JSON 的错误页（如 5xx）按服务端错误处理
            Err(_) if !status.is_success() => Err(RemoteError::bad_response(
                endpoint,
                format!("HTTP {}", status),
            )),
            Err(source) => Err(RemoteError::JsonParseFailed {
                endpoint: endpoint.to_string(),
                source,
            }),
        }
    }
}

fn coordinate_query(at: LatLon) -> [(&'static str, String); 2] {
    [("lat", at.lat.to_string()), ("lon", at.lon.to_string())]
}

impl RemoteAnalysisService for HttpAnalysisClient {
    async fn point_indices(&self, at: LatLon) -> Result<IndexValues, RemoteError> {
        let reply: Reply<PointIndicesBody> = self.get_json(INDICES, &coordinate_query(at)).await?;
        let body = reply.into_body(INDICES)?;
        Ok(body.indices.unwrap_or_default())
    }

    async fn tile_layer(&self, layer: LayerKind, year: i32) -> Result<String, RemoteError> {
        let endpoint = format!("map_layer/{}", layer.as_str());
        let reply: Reply<TileLayerBody> = self
            .get_json(&endpoint, &[("year", year.to_string())])
            .await?;

        // 该端点以 tile_url 是否存在作为成功标志
        match reply.body.tile_url {
            Some(url) => Ok(url),
            None => Err(RemoteError::bad_response(
                endpoint,
                reply.error.unwrap_or_else(|| "missing tile_url".to_string()),
            )),
        }
    }

    async fn area_statistics(
        &self,
        geometry: &geojson::Geometry,
    ) -> Result<AnalysisResult, RemoteError> {
        let reply: Reply<AreaStatisticsBody> = self.post_json(ANALYZE_AREA, geometry).await?;
        reply.into_body(ANALYZE_AREA)?.into_result(ANALYZE_AREA)
    }

    async fn time_series(&self, at: LatLon) -> Result<Vec<YearValue>, RemoteError> {
        let reply: Reply<TimeSeriesBody> = self.get_json(TIMESERIES, &coordinate_query(at)).await?;
        Ok(reply.into_body(TIMESERIES)?.timeline)
    }

    async fn raster_export(&self, request: &ExportRequest) -> Result<String, RemoteError> {
        let reply: Reply<RasterExportBody> = self.post_json(EXPORT_TIFF, request).await?;
        reply
            .into_body(EXPORT_TIFF)?
            .download_url
            .ok_or_else(|| RemoteError::bad_response(EXPORT_TIFF, "missing download_url"))
    }

    async fn batch_export(&self, request: &ExportRequest) -> Result<String, RemoteError> {
        let reply: Reply<BatchExportBody> = self.post_json(EXPORT_TO_DRIVE, request).await?;
        let body = reply.into_body(EXPORT_TO_DRIVE)?;
        Ok(body
            .message
            .unwrap_or_else(|| "Export task started.".to_string()))
    }
}
