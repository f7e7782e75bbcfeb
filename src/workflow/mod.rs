pub mod app_state;
pub mod display_state;
pub mod panel_markup;

pub use app_state::{AppState, LegOutcome};
pub use display_state::{
    Affordances, ChartRegion, DisplayState, PanelState, PointPopup, PopupContent, StatsSection,
    TriggerState,
};
pub use panel_markup::{render_panel, ChartMarkup, PANEL_ELEMENT_ID};
