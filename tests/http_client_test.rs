use std::collections::HashMap;
use std::net::SocketAddr;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value as JsonValue};

use mangrove_pulse::clients::ExportRequest;
use mangrove_pulse::error::RemoteError;
use mangrove_pulse::models::{rectangle_polygon, LatLon, LayerKind};
use mangrove_pulse::{Config, HttpAnalysisClient, RemoteAnalysisService};

/// 模拟分析后端
fn backend() -> Router {
    Router::new()
        .route(
            "/indices",
            get(|Query(query): Query<HashMap<String, f64>>| async move {
                if query.get("lat").copied().unwrap_or_default() < -60.0 {
                    return Json(json!({"status": "ERR", "error": "out of bounds"}));
                }
                Json(json!({"status": "OK", "indices": {"NDVI": 0.4521, "MVI": 0.3}}))
            }),
        )
        .route(
            "/map_layer/:layer",
            get(
                |Path(layer): Path<String>, Query(query): Query<HashMap<String, String>>| async move {
                    if layer == "MVI" {
                        return Json(json!({"error": "Earth Engine quota exceeded"}));
                    }
                    let year = query.get("year").cloned().unwrap_or_default();
                    Json(json!({"tile_url": format!("https://tiles.example.test/{}/{}", layer, year)}))
                },
            ),
        )
        .route(
            "/analyze-area",
            post(|Json(body): Json<JsonValue>| async move {
                if body["type"] != "Polygon" {
                    return Json(json!({"status": "ERR", "error": "expected a polygon"}));
                }
                Json(json!({
                    "status": "OK",
                    "stats": {"NDVI": 0.452, "NDWI": -0.1, "MVI": 0.3},
                    "area_m2": 50000,
                    "year": 2023,
                    "land_cover": {"mangrove_area_m2": 30000, "total_area_m2": 50000}
                }))
            }),
        )
        .route(
            "/timeseries",
            get(|| async {
                Json(json!({
                    "status": "OK",
                    "timeline": [
                        {"year": 2021.0, "ndvi": 0.41},
                        {"year": 2019.0, "ndvi": 0.38},
                        {"year": 2020.0, "ndvi": null}
                    ]
                }))
            }),
        )
        .route(
            "/export-tiff",
            post(|Json(body): Json<JsonValue>| async move {
                if body["year"] == 2016 {
                    return Json(json!({"status": "ERR", "error": "No cloud-free imagery available."}));
                }
                Json(json!({
                    "status": "OK",
                    "download_url": format!("https://download.example.test/{}.tif", body["index_name"].as_str().unwrap_or(""))
                }))
            }),
        )
        .route(
            "/export-to-drive",
            post(|Json(body): Json<JsonValue>| async move {
                assert!(body["polygon"]["coordinates"].is_array());
                Json(json!({"status": "OK", "message": "Export task started. Task ID: 42"}))
            }),
        )
}

/// 返回纯文本 5xx 的后端
fn broken_backend() -> Router {
    Router::new().route(
        "/indices",
        get(|| async { (StatusCode::BAD_GATEWAY, "upstream unavailable") }),
    )
}

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn client_for(addr: SocketAddr) -> HttpAnalysisClient {
    let config = Config {
        api_base_url: format!("http://{}", addr),
        request_timeout_secs: 5,
        ..Config::default()
    };
    HttpAnalysisClient::new(&config).unwrap()
}

fn export_request(year: i32) -> ExportRequest {
    ExportRequest {
        polygon: rectangle_polygon(110.0, -8.0, 110.1, -7.9),
        year,
        index_name: "NDVI".to_string(),
    }
}

#[tokio::test]
async fn test_point_indices() {
    let client = client_for(serve(backend()).await);

    let values = client.point_indices(LatLon::new(-7.8, 110.4)).await.unwrap();

    assert_eq!(values.ndvi, Some(0.4521));
    assert_eq!(values.ndwi, None);
    assert_eq!(values.mvi, Some(0.3));
}

#[tokio::test]
async fn test_point_indices_server_error() {
    let client = client_for(serve(backend()).await);

    let err = client.point_indices(LatLon::new(-80.0, 110.4)).await.unwrap_err();

    assert!(matches!(err, RemoteError::BadResponse { ref message, .. } if message == "out of bounds"));
    assert_eq!(err.user_message("Failed to fetch data."), "out of bounds");
}

#[tokio::test]
async fn test_area_statistics() {
    let client = client_for(serve(backend()).await);

    let result = client
        .area_statistics(&rectangle_polygon(110.0, -8.0, 110.1, -7.9))
        .await
        .unwrap();

    assert_eq!(result.area_m2, 50000.0);
    assert_eq!(result.year, 2023);
    assert_eq!(result.land_cover.non_mangrove_area_m2(), 20000.0);
    assert_eq!(result.stats.ndwi, Some(-0.1));
}

#[tokio::test]
async fn test_time_series_accepts_float_years() {
    let client = client_for(serve(backend()).await);

    let points = client.time_series(LatLon::new(-7.95, 110.05)).await.unwrap();

    let years: Vec<i32> = points.iter().map(|p| p.year).collect();
    assert_eq!(years, vec![2021, 2019, 2020]);
    assert_eq!(points[2].ndvi, None);
}

#[tokio::test]
async fn test_tile_layer() {
    let client = client_for(serve(backend()).await);

    let url = client.tile_layer(LayerKind::Ndwi, 2022).await.unwrap();
    assert_eq!(url, "https://tiles.example.test/NDWI/2022");

    let err = client.tile_layer(LayerKind::Mvi, 2022).await.unwrap_err();
    assert_eq!(err.user_message("fallback"), "Earth Engine quota exceeded");
}

#[tokio::test]
async fn test_exports() {
    let client = client_for(serve(backend()).await);

    let url = client.raster_export(&export_request(2023)).await.unwrap();
    assert_eq!(url, "https://download.example.test/NDVI.tif");

    let err = client.raster_export(&export_request(2016)).await.unwrap_err();
    assert_eq!(err.user_message("fallback"), "No cloud-free imagery available.");

    let message = client.batch_export(&export_request(2023)).await.unwrap();
    assert_eq!(message, "Export task started. Task ID: 42");
}

#[tokio::test]
async fn test_non_json_error_page() {
    let client = client_for(serve(broken_backend()).await);

    let err = client.point_indices(LatLon::new(-7.8, 110.4)).await.unwrap_err();

    assert!(matches!(err, RemoteError::BadResponse { ref message, .. } if message.contains("502")));
}

#[tokio::test]
async fn test_connection_refused_is_request_failed() {
    // 绑定后立即释放，得到一个没有监听的端口
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let client = client_for(addr);

    let err = client.point_indices(LatLon::new(-7.8, 110.4)).await.unwrap_err();

    assert!(matches!(err, RemoteError::RequestFailed { .. }));
    assert_eq!(err.user_message("Failed to fetch data."), "Failed to fetch data.");
}
