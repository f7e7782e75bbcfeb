//! 绘制的几何图形

use std::fmt;
use std::str::FromStr;

use geo::{BoundingRect, Rect};
use geojson::{Geometry, Value};
use serde::{Deserialize, Serialize};

use crate::error::{AppResult, ClientError};

/// 几何类型标签（来自绘制事件）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Point,
    Line,
    Polygon,
    Rectangle,
}

impl ShapeKind {
    /// 是否允许区域分析、栅格导出、批量导出
    pub fn supports_area_analysis(self) -> bool {
        matches!(self, ShapeKind::Polygon | ShapeKind::Rectangle)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Point => "point",
            ShapeKind::Line => "line",
            ShapeKind::Polygon => "polygon",
            ShapeKind::Rectangle => "rectangle",
        }
    }

    /// 根据 GeoJSON 几何推断类型（矩形无法从坐标区分，按多边形处理）
    pub fn infer(geometry: &Geometry) -> Option<Self> {
        match geometry.value {
            Value::Point(_) => Some(ShapeKind::Point),
            Value::LineString(_) => Some(ShapeKind::Line),
            Value::Polygon(_) => Some(ShapeKind::Polygon),
            _ => None,
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapeKind {
    type Err = String;

    /// 同时接受绘制工具的图层名（marker / polyline）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "point" | "marker" => Ok(ShapeKind::Point),
            "line" | "polyline" => Ok(ShapeKind::Line),
            "polygon" => Ok(ShapeKind::Polygon),
            "rectangle" => Ok(ShapeKind::Rectangle),
            other => Err(format!("未知的几何类型: {}", other)),
        }
    }
}

/// 几何标识，每次替换时递增
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GeometryId(pub(crate) u64);

impl fmt::Display for GeometryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 经纬度坐标
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lat: {:.4}, Lon: {:.4}", self.lat, self.lon)
    }
}

/// 当前激活的几何图形
///
/// 创建后不可变；替换时整体换掉。
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveGeometry {
    id: GeometryId,
    kind: ShapeKind,
    shape: Geometry,
    bounds: Rect<f64>,
}

impl ActiveGeometry {
    pub(crate) fn new(id: GeometryId, shape: Geometry, kind: ShapeKind) -> AppResult<Self> {
        let bounds = bounding_rect(&shape)?;
        Ok(Self {
            id,
            kind,
            shape,
            bounds,
        })
    }

    pub fn id(&self) -> GeometryId {
        self.id
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn shape(&self) -> &Geometry {
        &self.shape
    }

    pub fn bounds(&self) -> Rect<f64> {
        self.bounds
    }

    /// 外接矩形中心
    pub fn centroid(&self) -> LatLon {
        let center = self.bounds.center();
        LatLon::new(center.y, center.x)
    }
}

/// 由经纬度范围构造矩形多边形（逆时针闭合环）
pub fn rectangle_polygon(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Geometry {
    Geometry::new(Value::Polygon(vec![vec![
        vec![min_lon, min_lat],
        vec![max_lon, min_lat],
        vec![max_lon, max_lat],
        vec![min_lon, max_lat],
        vec![min_lon, min_lat],
    ]]))
}

fn bounding_rect(shape: &Geometry) -> AppResult<Rect<f64>> {
    let geometry = geo::Geometry::<f64>::try_from(shape.clone()).map_err(|e| {
        ClientError::MalformedGeometry {
            reason: e.to_string(),
        }
    })?;

    geometry
        .bounding_rect()
        .ok_or_else(|| ClientError::MalformedGeometry {
            reason: "几何图形没有坐标".to_string(),
        })
}
