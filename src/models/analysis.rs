//! 分析结果数据模型

use serde::{Deserialize, Deserializer, Serialize};

use crate::models::geometry::LatLon;

/// 三个指数，每个都可能缺失
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexValues {
    #[serde(rename = "NDVI", default)]
    pub ndvi: Option<f64>,
    #[serde(rename = "NDWI", default)]
    pub ndwi: Option<f64>,
    #[serde(rename = "MVI", default)]
    pub mvi: Option<f64>,
}

impl IndexValues {
    pub fn is_empty(&self) -> bool {
        self.ndvi.is_none() && self.ndwi.is_none() && self.mvi.is_none()
    }

    /// 按展示顺序返回 (名称, 值)
    pub fn entries(&self) -> [(&'static str, Option<f64>); 3] {
        [("NDVI", self.ndvi), ("NDWI", self.ndwi), ("MVI", self.mvi)]
    }
}

/// 土地覆盖构成
///
/// 非红树林面积由总面积减去红树林面积得到，两者之和恒等于总面积。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LandCover {
    #[serde(default)]
    pub mangrove_area_m2: f64,
    pub total_area_m2: f64,
}

impl LandCover {
    pub fn non_mangrove_area_m2(&self) -> f64 {
        self.total_area_m2 - self.mangrove_area_m2
    }

    /// 红树林占比（总面积为 0 时为 0）
    pub fn mangrove_fraction(&self) -> f64 {
        if self.total_area_m2 > 0.0 {
            (self.mangrove_area_m2 / self.total_area_m2).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// 区域分析结果
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub stats: IndexValues,
    pub area_m2: f64,
    pub year: i32,
    pub land_cover: LandCover,
}

impl AnalysisResult {
    pub fn area_hectares(&self) -> f64 {
        self.area_m2 / 10_000.0
    }
}

/// 时间序列中的一年
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearValue {
    #[serde(deserialize_with = "deserialize_year")]
    pub year: i32,
    #[serde(default)]
    pub ndvi: Option<f64>,
}

/// NDVI 年度序列，按年份升序，允许不连续
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    origin: LatLon,
    points: Vec<YearValue>,
}

impl TimeSeries {
    pub fn new(origin: LatLon, mut points: Vec<YearValue>) -> Self {
        points.sort_by_key(|p| p.year);
        Self { origin, points }
    }

    /// 查询所用的坐标（几何中心）
    pub fn origin(&self) -> LatLon {
        self.origin
    }

    pub fn points(&self) -> &[YearValue] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// 后端的年份可能以浮点数形式返回（如 2019.0）
fn deserialize_year<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if raw.fract() != 0.0 || raw < i32::MIN as f64 || raw > i32::MAX as f64 {
        return Err(serde::de::Error::custom(format!("无效的年份: {}", raw)));
    }
    Ok(raw as i32)
}
