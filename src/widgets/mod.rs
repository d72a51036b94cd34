//! Concrete surfaces - raster canvas and logging controls
//!
//! The engine only sees these through the traits in `entities::traits`.

pub mod canvas;
pub mod controls;

pub use canvas::Canvas;
pub use controls::LogControls;
