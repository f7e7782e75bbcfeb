pub mod analysis;
pub mod geometry;
pub mod layer;

pub use analysis::{AnalysisResult, IndexValues, LandCover, TimeSeries, YearValue};
pub use geometry::{rectangle_polygon, ActiveGeometry, GeometryId, LatLon, ShapeKind};
pub use layer::{LayerKind, SATELLITE_TILE_URL};
