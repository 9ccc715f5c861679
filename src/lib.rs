//! Live performance metrics overlay.
//!
//! Metrics (frame rate, CPU and estimated GPU frame time, process memory and
//! any number of custom values) are pushed from the host's frame loop,
//! aggregated into samples, kept in bounded histories and drawn as stacked
//! chart blocks by a dedicated render thread.
//!
//! The crate can be used directly through [`PerfOverlay`] or inside a Bevy app
//! through [`PerfOverlayPlugin`].
//!
//! # Example
//! ```
//! use bevy_metrics_overlay::{HeadlessSurfaceFactory, OverlaySettings, PerfOverlay};
//!
//! let surfaces = HeadlessSurfaceFactory::new();
//! let mut overlay = PerfOverlay::new().with_surface_factory(surfaces.clone());
//! overlay.initialize(OverlaySettings::with_builtins()).unwrap();
//! overlay.show_window().unwrap();
//!
//! for _ in 0..3 {
//!     overlay.begin().unwrap();
//!     // frame work
//!     overlay.end(1.0 / 60.0).unwrap();
//! }
//!
//! overlay.close().unwrap();
//! ```

mod aggregator;
mod block;
mod canvas;
mod chart;
mod config;
mod constants;
mod error;
mod history;
mod memory;
mod normalize;
mod overlay;
mod plugin;
mod systems;
mod timer;
mod window;

pub use aggregator::SampleAggregator;
pub use block::MetricBlock;
pub use canvas::{
    Canvas, DrawCommand, DrawList, FixedFontMetrics, FontMetrics, Paint, PaintStyle, Path,
    PathVerb,
};
pub use chart::Chart;
pub use config::{ChartKind, MetricConfig, OverlaySettings, SampleMode};
pub use constants::*;
pub use error::{OverlayError, Result, SurfaceError};
pub use history::{HistoryBuffer, HistoryPolicy};
pub use memory::{bytes_to_mb, MemorySource, ProcessMemory};
pub use normalize::{normalize, normalize_into};
pub use overlay::{OverlayState, PerfOverlay};
pub use plugin::PerfOverlayPlugin;
pub use systems::{begin_frame, close_overlay_on_exit, end_frame, show_overlay_window};
pub use timer::{FrameTimers, FrameTiming, RateGate, Stopwatch};
pub use window::{HeadlessSurfaceFactory, OverlaySurface, OverlayWindow, SurfaceFactory};
