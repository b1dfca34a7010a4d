//! Frame building for the graph view: camera, color model, draw commands,
//! and (with the `svg` feature) SVG serialization.

pub mod camera;
pub mod color;
pub mod frame;
#[cfg(feature = "svg")]
pub mod svg;

pub use camera::{ease_out_quad, Camera, CameraAnimation};
pub use color::{category_color, heat_color, turbo, ColorMode, ColorScale, HeatScores, Rgba};
pub use frame::{render_frame, DrawCommand, Frame, Glow, RenderPolicy, ViewState};
#[cfg(feature = "svg")]
pub use svg::frame_to_svg;
