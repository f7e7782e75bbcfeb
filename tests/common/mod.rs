//! 集成测试共用的替身实现
#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;

use geojson::Geometry;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use mangrove_pulse::clients::ExportRequest;
use mangrove_pulse::error::{AppResult, ClientError, RemoteError};
use mangrove_pulse::models::{AnalysisResult, IndexValues, LandCover, LatLon, LayerKind, YearValue};
use mangrove_pulse::services::{DocumentComposer, RasterImage, Rasterizer};
use mangrove_pulse::RemoteAnalysisService;

/// 远程调用记录
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Indices(LatLon),
    Tile(LayerKind, i32),
    Area(Geometry),
    TimeSeries(LatLon),
    Raster(ExportRequest),
    Batch(ExportRequest),
}

/// 预设的失败方式
#[derive(Debug, Clone)]
pub enum Failure {
    /// status≠OK，携带服务端原文
    Server(String),
    /// 连接失败
    Transport,
}

impl Failure {
    fn into_error(self, endpoint: &str) -> RemoteError {
        match self {
            Failure::Server(message) => RemoteError::bad_response(endpoint, message),
            Failure::Transport => RemoteError::request_failed(
                endpoint,
                io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
            ),
        }
    }
}

struct Scripted<T> {
    reply: Result<T, Failure>,
    gate: Option<oneshot::Receiver<()>>,
}

type Queue<T> = Mutex<VecDeque<Scripted<T>>>;

/// 按脚本应答的分析后端
///
/// 每个端点一个队列，调用时按顺序取出；带闸门的应答在闸门打开前挂起
#[derive(Default)]
pub struct FakeService {
    calls: Mutex<Vec<Call>>,
    indices: Queue<IndexValues>,
    tiles: Queue<String>,
    areas: Queue<AnalysisResult>,
    series: Queue<Vec<YearValue>>,
    rasters: Queue<String>,
    batches: Queue<String>,
}

fn push<T>(queue: &Queue<T>, reply: Result<T, Failure>) {
    queue.lock().push_back(Scripted { reply, gate: None });
}

fn push_gated<T>(queue: &Queue<T>, reply: Result<T, Failure>) -> oneshot::Sender<()> {
    let (tx, rx) = oneshot::channel();
    queue.lock().push_back(Scripted {
        reply,
        gate: Some(rx),
    });
    tx
}

async fn answer<T>(queue: &Queue<T>, endpoint: &str) -> Result<T, RemoteError> {
    let scripted = queue
        .lock()
        .pop_front()
        .unwrap_or_else(|| panic!("unexpected call to {}", endpoint));
    if let Some(gate) = scripted.gate {
        let _ = gate.await;
    }
    scripted.reply.map_err(|failure| failure.into_error(endpoint))
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn script_indices(&self, reply: Result<IndexValues, Failure>) {
        push(&self.indices, reply);
    }

    pub fn script_indices_gated(&self, reply: Result<IndexValues, Failure>) -> oneshot::Sender<()> {
        push_gated(&self.indices, reply)
    }

    pub fn script_tile(&self, reply: Result<String, Failure>) {
        push(&self.tiles, reply);
    }

    pub fn script_area(&self, reply: Result<AnalysisResult, Failure>) {
        push(&self.areas, reply);
    }

    pub fn script_area_gated(&self, reply: Result<AnalysisResult, Failure>) -> oneshot::Sender<()> {
        push_gated(&self.areas, reply)
    }

    pub fn script_series(&self, reply: Result<Vec<YearValue>, Failure>) {
        push(&self.series, reply);
    }

    pub fn script_series_gated(&self, reply: Result<Vec<YearValue>, Failure>) -> oneshot::Sender<()> {
        push_gated(&self.series, reply)
    }

    pub fn script_raster(&self, reply: Result<String, Failure>) {
        push(&self.rasters, reply);
    }

    pub fn script_raster_gated(&self, reply: Result<String, Failure>) -> oneshot::Sender<()> {
        push_gated(&self.rasters, reply)
    }

    pub fn script_batch(&self, reply: Result<String, Failure>) {
        push(&self.batches, reply);
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

impl RemoteAnalysisService for FakeService {
    async fn point_indices(&self, at: LatLon) -> Result<IndexValues, RemoteError> {
        self.record(Call::Indices(at));
        answer(&self.indices, "indices").await
    }

    async fn tile_layer(&self, layer: LayerKind, year: i32) -> Result<String, RemoteError> {
        self.record(Call::Tile(layer, year));
        answer(&self.tiles, "map_layer").await
    }

    async fn area_statistics(&self, geometry: &Geometry) -> Result<AnalysisResult, RemoteError> {
        self.record(Call::Area(geometry.clone()));
        answer(&self.areas, "analyze-area").await
    }

    async fn time_series(&self, at: LatLon) -> Result<Vec<YearValue>, RemoteError> {
        self.record(Call::TimeSeries(at));
        answer(&self.series, "timeseries").await
    }

    async fn raster_export(&self, request: &ExportRequest) -> Result<String, RemoteError> {
        self.record(Call::Raster(request.clone()));
        answer(&self.rasters, "export-tiff").await
    }

    async fn batch_export(&self, request: &ExportRequest) -> Result<String, RemoteError> {
        self.record(Call::Batch(request.clone()));
        answer(&self.batches, "export-to-drive").await
    }
}

/// 不启动浏览器的渲染器
#[derive(Default)]
pub struct FakeRenderer {
    pub fail_rasterize: bool,
    pub markups: Mutex<Vec<String>>,
}

impl Rasterizer for FakeRenderer {
    async fn rasterize(&self, markup: &str) -> AppResult<RasterImage> {
        self.markups.lock().push(markup.to_string());
        if self.fail_rasterize {
            return Err(ClientError::Config("renderer unavailable".to_string()));
        }
        Ok(RasterImage {
            png: vec![0x89, b'P', b'N', b'G'],
            width: 480,
            height: 960,
        })
    }
}

impl DocumentComposer for FakeRenderer {
    async fn compose(&self, image: &RasterImage) -> AppResult<Vec<u8>> {
        Ok(format!("%PDF-1.4 {}x{}", image.width, image.height).into_bytes())
    }
}

/// 5 公顷矩形的分析结果
pub fn five_hectare_result() -> AnalysisResult {
    AnalysisResult {
        stats: IndexValues {
            ndvi: Some(0.452),
            ndwi: Some(-0.1),
            mvi: Some(0.3),
        },
        area_m2: 50000.0,
        year: 2023,
        land_cover: LandCover {
            mangrove_area_m2: 30000.0,
            total_area_m2: 50000.0,
        },
    }
}

pub fn timeline() -> Vec<YearValue> {
    vec![
        YearValue { year: 2021, ndvi: Some(0.41) },
        YearValue { year: 2019, ndvi: Some(0.38) },
        YearValue { year: 2020, ndvi: None },
    ]
}
