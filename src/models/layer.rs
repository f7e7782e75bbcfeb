//! 底图图层

use std::fmt;
use std::str::FromStr;

/// 卫星底图瓦片模板（不经过分析后端）
pub const SATELLITE_TILE_URL: &str = "https://{s}.google.com/vt/lyrs=s&x={x}&y={y}&z={z}";

/// 图层类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LayerKind {
    #[default]
    Ndvi,
    Ndwi,
    Mvi,
    /// 非分析图层
    Satellite,
}

impl LayerKind {
    pub const ALL: [LayerKind; 4] = [
        LayerKind::Ndvi,
        LayerKind::Ndwi,
        LayerKind::Mvi,
        LayerKind::Satellite,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LayerKind::Ndvi => "NDVI",
            LayerKind::Ndwi => "NDWI",
            LayerKind::Mvi => "MVI",
            LayerKind::Satellite => "Satellite",
        }
    }

    /// 后端使用的指数名；卫星图层没有
    pub fn index_name(self) -> Option<&'static str> {
        match self {
            LayerKind::Satellite => None,
            other => Some(other.as_str()),
        }
    }

    pub fn is_analytic(self) -> bool {
        self.index_name().is_some()
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LayerKind::ALL
            .into_iter()
            .find(|layer| layer.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("未知的图层: {}", s))
    }
}
