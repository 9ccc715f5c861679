//! Constants used throughout the metrics overlay.
//!
//! This module centralizes layout numbers, timing defaults and the string
//! identifiers of the built-in metrics.

use std::time::Duration;

/// Metric key of the frames-per-second block
pub const FPS_METRIC_ID: &str = "FPS";

/// Metric key of the CPU frame time block (milliseconds)
pub const CPU_METRIC_ID: &str = "CPU";

/// Metric key of the estimated GPU frame time block (milliseconds)
pub const GPU_METRIC_ID: &str = "GPU";

/// Metric key of the process memory block (megabytes)
pub const MEM_METRIC_ID: &str = "MEM";

/// Unit shown after CPU and GPU frame times
pub const FRAME_TIME_UNIT: &str = "ms";

/// Unit shown after the memory value
pub const MEMORY_UNIT: &str = "mb";

/// Vertical offset of the first block from the top of the overlay
pub const TOP_MARGIN: f32 = 12.0;

/// Horizontal margin and vertical gap between stacked blocks
pub const BLOCK_GAP: f32 = 14.0;

/// Space between the label row and the chart area of a block
pub const TEXT_PADDING: f32 = 5.0;

/// Inset applied to the top and bottom of normalized chart values
pub const CHART_INSET: f32 = 2.0;

/// Corner radius of the chart background
pub const CHART_CORNER_RADIUS: f32 = 3.0;

/// Stroke width of line charts
pub const LINE_STROKE_WIDTH: f32 = 2.0;

/// Default overlay width in pixels
pub const DEFAULT_WINDOW_WIDTH: f32 = 350.0;

/// Default label font size in pixels
pub const DEFAULT_FONT_SIZE: f32 = 15.0;

/// Title handed to surface factories
pub const DEFAULT_WINDOW_TITLE: &str = "Metrics";

/// Default delay between two redraws of the overlay
pub const DEFAULT_REDRAW_INTERVAL: Duration = Duration::from_millis(100);

/// Minimum delay between two process memory queries
pub const MEMORY_SAMPLE_INTERVAL: Duration = Duration::from_millis(1000);

/// Name given to the overlay render thread
pub const RENDER_THREAD_NAME: &str = "metrics-overlay";

/// Bytes per megabyte used for the memory conversion
pub const BYTES_PER_MB: f32 = 1024.0 * 1024.0;
