pub mod headless_renderer;

pub use headless_renderer::{png_dimensions, HeadlessRenderer};
