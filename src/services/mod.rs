pub mod geometry_state;
pub mod job_dispatch;
pub mod layer_selection;
pub mod report_export;
pub mod svg_chart;
pub mod visualization;

pub use geometry_state::GeometryState;
pub use job_dispatch::{validate_export, JobOutcome, RemoteJobDispatch};
pub use layer_selection::{resolve_tile_source, LayerSelection, TileSource};
pub use report_export::{
    DocumentComposer, ExportableSnapshot, RasterImage, Rasterizer, ReportExportPipeline,
    REPORT_FILE_NAME,
};
pub use svg_chart::{SvgChart, SvgChartBackend};
pub use visualization::{ChartBackend, ChartDataset, FrozenImage, Slot, VisualizationLifecycle};
