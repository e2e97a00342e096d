//! Interactive charting on a retained scene graph.
//!
//! [`canvas::Canvas`] owns sizing, margins, the no-data fallback and the
//! render lifecycle; [`chart::Chart`] layers a legend, tooltips and series
//! state on top of it; [`sunburst::Sunburst`] is a radial partition chart
//! with click-to-zoom. Everything draws into a [`scene::Scene`], which the
//! [`render`] plugin turns into Bevy meshes.

pub mod arc;
pub mod canvas;
pub mod chart;
pub mod color;
pub mod core;
pub mod dispatch;
pub mod options;
pub mod partition;
pub mod render;
pub mod runtime;
pub mod scale;
pub mod scene;
pub mod sunburst;
pub mod transition;
#[cfg(target_arch = "wasm32")]
pub mod wasm_api;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartError {
    /// An option failed validation.
    Config,
    /// Input data could not be parsed or is unusable.
    Data,
    /// The drawing surface was addressed with an element it does not own.
    Surface,
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartError::Config => write!(f, "invalid chart configuration"),
            ChartError::Data => write!(f, "invalid chart data"),
            ChartError::Surface => write!(f, "drawing surface error"),
        }
    }
}

impl std::error::Error for ChartError {}

pub type Result<T> = std::result::Result<T, error_stack::Report<ChartError>>;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

pub mod prelude {
    pub use crate::canvas::*;
    pub use crate::chart::*;
    pub use crate::color::*;
    pub use crate::core::*;
    pub use crate::dispatch::*;
    pub use crate::options::*;
    pub use crate::partition::*;
    pub use crate::scene::*;
    pub use crate::sunburst::*;
    pub use crate::{ChartError, Result};
}
