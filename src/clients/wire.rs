//! 分析后端的 JSON 报文
//!
//! 所有响应都带 `status` / `error` 两个字段，业务字段平铺在同一层。

use serde::{Deserialize, Serialize};

use crate::error::RemoteError;
use crate::models::{AnalysisResult, IndexValues, LandCover, YearValue};

pub const STATUS_OK: &str = "OK";

/// 通用响应外壳
#[derive(Debug, Deserialize)]
pub struct Reply<T> {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub body: T,
}

impl<T> Reply<T> {
    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some(STATUS_OK)
    }

    /// status=OK 时取出业务字段，否则转换为 `BadResponse`
    pub fn into_body(self, endpoint: &str) -> Result<T, RemoteError> {
        if self.is_ok() {
            Ok(self.body)
        } else {
            Err(RemoteError::bad_response(endpoint, self.failure_message()))
        }
    }

    fn failure_message(&self) -> String {
        match (&self.error, &self.status) {
            (Some(error), _) => error.clone(),
            (None, Some(status)) => format!("status {}", status),
            (None, None) => "unknown error".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PointIndicesBody {
    #[serde(default)]
    pub indices: Option<IndexValues>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TileLayerBody {
    #[serde(default)]
    pub tile_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AreaStatisticsBody {
    #[serde(default)]
    pub stats: Option<IndexValues>,
    #[serde(default)]
    pub area_m2: Option<f64>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub land_cover: Option<LandCover>,
}

impl AreaStatisticsBody {
    pub fn into_result(self, endpoint: &str) -> Result<AnalysisResult, RemoteError> {
        let (Some(area_m2), Some(year), Some(land_cover)) = (self.area_m2, self.year, self.land_cover)
        else {
            return Err(RemoteError::bad_response(endpoint, "incomplete area statistics"));
        };

        Ok(AnalysisResult {
            stats: self.stats.unwrap_or_default(),
            area_m2,
            year,
            land_cover,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TimeSeriesBody {
    #[serde(default)]
    pub timeline: Vec<YearValue>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RasterExportBody {
    #[serde(default)]
    pub download_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BatchExportBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// 导出请求体（栅格下载与批量任务共用）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRequest {
    pub polygon: geojson::Geometry,
    pub year: i32,
    pub index_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_reply_yields_body() {
        let reply: Reply<PointIndicesBody> = serde_json::from_str(
            r#"{"status": "OK", "lat": -7.8, "lon": 110.4, "indices": {"NDVI": 0.61, "MVI": 0.2}}"#,
        )
        .unwrap();

        let body = reply.into_body("/indices").unwrap();
        let indices = body.indices.unwrap();
        assert_eq!(indices.ndvi, Some(0.61));
        assert_eq!(indices.ndwi, None);
    }

    #[test]
    fn test_error_reply_carries_server_text() {
        let reply: Reply<PointIndicesBody> =
            serde_json::from_str(r#"{"status": "ERR", "error": "out of bounds"}"#).unwrap();

        match reply.into_body("/indices") {
            Err(RemoteError::BadResponse { message, .. }) => assert_eq!(message, "out of bounds"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_area_body_requires_land_cover() {
        let reply: Reply<AreaStatisticsBody> =
            serde_json::from_str(r#"{"status": "OK", "stats": {}, "area_m2": 10.0, "year": 2024}"#)
                .unwrap();

        let body = reply.into_body("/analyze-area").unwrap();
        assert!(body.into_result("/analyze-area").is_err());
    }

    #[test]
    fn test_area_body_converts() {
        let reply: Reply<AreaStatisticsBody> = serde_json::from_str(
            r#"{"status":"OK","stats":{"NDVI":0.452,"NDWI":-0.1,"MVI":0.3},"area_m2":50000,"year":2023,
                "land_cover":{"mangrove_area_m2":30000,"total_area_m2":50000}}"#,
        )
        .unwrap();

        let result = reply
            .into_body("/analyze-area")
            .and_then(|body| body.into_result("/analyze-area"))
            .unwrap();
        assert_eq!(result.year, 2023);
        assert_eq!(result.stats.ndvi, Some(0.452));
        assert_eq!(result.land_cover.non_mangrove_area_m2(), 20000.0);
    }

    #[test]
    fn test_export_request_shape() {
        let request = ExportRequest {
            polygon: crate::models::rectangle_polygon(0.0, 0.0, 1.0, 1.0),
            year: 2023,
            index_name: "NDVI".to_string(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["polygon"]["type"], "Polygon");
        assert_eq!(value["year"], 2023);
        assert_eq!(value["index_name"], "NDVI");
    }
}
