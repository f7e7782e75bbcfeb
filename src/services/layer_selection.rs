//! 图层选择 - 业务能力层

use std::fmt;

use tracing::{debug, info};

use crate::clients::RemoteAnalysisService;
use crate::error::AppResult;
use crate::models::{LayerKind, SATELLITE_TILE_URL};

/// 当前选中的图层与年份
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerSelection {
    pub layer: LayerKind,
    pub year: i32,
}

impl LayerSelection {
    pub fn new(layer: LayerKind, year: i32) -> Self {
        Self { layer, year }
    }
}

impl Default for LayerSelection {
    fn default() -> Self {
        Self::new(LayerKind::default(), 2024)
    }
}

/// 瓦片来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileSource {
    /// 固定的卫星底图模板
    Satellite(&'static str),
    /// 分析后端生成的瓦片地址
    Remote(String),
}

impl TileSource {
    pub fn url(&self) -> &str {
        match self {
            TileSource::Satellite(url) => url,
            TileSource::Remote(url) => url,
        }
    }
}

impl fmt::Display for TileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url())
    }
}

/// 解析图层的瓦片来源
///
/// 卫星图层直接使用固定模板，不访问后端
pub async fn resolve_tile_source<S: RemoteAnalysisService>(
    service: &S,
    layer: LayerKind,
    year: i32,
) -> AppResult<TileSource> {
    if !layer.is_analytic() {
        debug!("卫星图层使用固定瓦片模板");
        return Ok(TileSource::Satellite(SATELLITE_TILE_URL));
    }

    info!("🧭 正在获取 {} ({}) 图层瓦片地址...", layer, year);
    let url = service.tile_layer(layer, year).await?;
    Ok(TileSource::Remote(url))
}
