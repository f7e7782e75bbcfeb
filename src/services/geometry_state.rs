//! 几何状态 - 业务能力层
//!
//! 只持有"当前激活的几何图形"这一个槽位

use geojson::Geometry;
use tracing::debug;

use crate::error::{AppResult, ClientError};
use crate::models::{ActiveGeometry, GeometryId, LatLon, ShapeKind};

/// 几何状态
///
/// 职责：
/// - 任何时刻最多一个激活几何
/// - 新几何整体替换旧几何，不累积
/// - 每次替换分配新的 `GeometryId`，供编排层判断响应是否过期
#[derive(Debug, Default)]
pub struct GeometryState {
    active: Option<ActiveGeometry>,
    last_id: u64,
}

impl GeometryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 替换当前几何
    ///
    /// # 返回
    /// 返回是否启用分析类操作（区域分析、栅格导出、批量导出）
    ///
    /// 几何无法解析时保持原状态不变
    pub fn set_geometry(&mut self, shape: Geometry, kind: ShapeKind) -> AppResult<bool> {
        let id = GeometryId(self.last_id + 1);
        let geometry = ActiveGeometry::new(id, shape, kind)?;

        self.last_id = id.0;
        if let Some(previous) = self.active.replace(geometry) {
            debug!("几何 {} 被 {} 替换", previous.id(), id);
        }

        Ok(kind.supports_area_analysis())
    }

    pub fn geometry(&self) -> Option<&ActiveGeometry> {
        self.active.as_ref()
    }

    pub fn current_id(&self) -> Option<GeometryId> {
        self.active.as_ref().map(ActiveGeometry::id)
    }

    /// `id` 是否仍是当前几何
    pub fn is_current(&self, id: GeometryId) -> bool {
        self.current_id() == Some(id)
    }

    pub fn analysis_enabled(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|g| g.kind().supports_area_analysis())
    }

    pub fn centroid(&self) -> AppResult<LatLon> {
        self.active
            .as_ref()
            .map(ActiveGeometry::centroid)
            .ok_or(ClientError::NoGeometry)
    }
}
