//! Configuration structures for the metrics overlay.
//!
//! This module contains the per-metric configuration ([`MetricConfig`]) and the
//! overlay-wide settings ([`OverlaySettings`]) consumed by
//! [`PerfOverlay::initialize`](crate::PerfOverlay::initialize).

use std::time::Duration;

use bevy::color::Color;

use crate::{constants::*, history::HistoryPolicy};

/// How raw values pushed into a metric become stored samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleMode {
    /// Every pushed value is stored as-is
    EachValue,
    /// Average every `n` pushed values into one sample
    Ticks(u32),
    /// Average all values pushed within a wall-clock window into one sample
    TimeWindow(Duration),
}

impl Default for SampleMode {
    fn default() -> Self {
        Self::TimeWindow(Duration::from_secs_f32(0.35))
    }
}

/// Shape used to draw a metric's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    /// One filled bar per sample, anchored to the bottom of the chart
    #[default]
    Bars,
    /// A stroked polyline through the samples
    Line,
    /// The polyline closed down to the baseline and filled
    Hills,
}

/// Configuration of a single metric block.
///
/// The configuration is fixed once the metric is registered. For the built-in
/// metrics (FPS, CPU, GPU, MEM) the label and unit are overridden by the
/// overlay, and MEM always stores each value.
///
/// # Example
/// ```
/// use bevy_metrics_overlay::{ChartKind, MetricConfig, SampleMode};
///
/// let draw_calls = MetricConfig::new("Draw calls")
///     .with_chart(ChartKind::Line)
///     .with_sample_mode(SampleMode::Ticks(10))
///     .imprecise();
/// assert_eq!(draw_calls.label, "Draw calls");
/// ```
#[derive(Debug, Clone)]
pub struct MetricConfig {
    /// Display label, also the key used by `update_metric`
    pub label: String,
    /// Unit string shown after the value (e.g. "ms")
    pub unit: Option<String>,
    /// Show two decimals when true, a truncated integer otherwise
    pub precise: bool,
    /// Aggregation applied to pushed values
    pub sample_mode: SampleMode,
    /// Drop the first completed averaging window
    pub skip_warmup: bool,
    /// Number of samples kept in history
    pub max_values: usize,
    /// Eviction policy of the history
    pub history: HistoryPolicy,
    /// Chart shape
    pub chart: ChartKind,
    /// Height of the whole block (label row included) in pixels
    pub height: f32,
    /// Label text color
    pub text_color: Color,
    /// Bar, line or area color
    pub chart_color: Color,
    /// Chart background color
    pub background_color: Color,
}

impl Default for MetricConfig {
    fn default() -> Self {
        Self {
            label: String::new(),
            unit: None,
            precise: true,
            sample_mode: SampleMode::default(),
            skip_warmup: true,
            max_values: 40,
            history: HistoryPolicy::Continuous,
            chart: ChartKind::Bars,
            height: 55.0,
            text_color: Color::BLACK,
            chart_color: Color::BLACK,
            background_color: Color::srgb_u8(200, 200, 210),
        }
    }
}

impl MetricConfig {
    /// Create a configuration with default settings and the given label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Set the unit suffix.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Set the chart shape.
    pub fn with_chart(mut self, chart: ChartKind) -> Self {
        self.chart = chart;
        self
    }

    /// Set the aggregation mode.
    pub fn with_sample_mode(mut self, mode: SampleMode) -> Self {
        self.sample_mode = mode;
        self
    }

    /// Set history capacity and eviction policy.
    pub fn with_history(mut self, max_values: usize, policy: HistoryPolicy) -> Self {
        self.max_values = max_values;
        self.history = policy;
        self
    }

    /// Set the block height in pixels.
    pub fn with_height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    /// Set text, chart and background colors.
    pub fn with_colors(mut self, text: Color, chart: Color, background: Color) -> Self {
        self.text_color = text;
        self.chart_color = chart;
        self.background_color = background;
        self
    }

    /// Display the value as a truncated integer.
    pub fn imprecise(mut self) -> Self {
        self.precise = false;
        self
    }

    /// Keep the first averaging window instead of discarding it.
    pub fn keep_warmup(mut self) -> Self {
        self.skip_warmup = false;
        self
    }
}

/// Overlay-wide settings.
///
/// Each built-in metric is shown only when its configuration is `Some`.
///
/// # Example
/// ```
/// use bevy_metrics_overlay::{MetricConfig, OverlaySettings};
///
/// let settings = OverlaySettings {
///     fps: Some(MetricConfig::default().imprecise()),
///     mem: Some(MetricConfig::default()),
///     ..Default::default()
/// };
/// assert!(settings.cpu.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct OverlaySettings {
    /// Width of the overlay surface in pixels
    pub window_width: f32,
    /// Title handed to the surface factory
    pub title: String,
    /// Color the overlay is cleared with before each redraw
    pub background_color: Color,
    /// Label font size in pixels
    pub font_size: f32,
    /// Delay between two redraws of the render thread
    pub redraw_interval: Duration,
    /// Frames-per-second block
    pub fps: Option<MetricConfig>,
    /// CPU frame time block
    pub cpu: Option<MetricConfig>,
    /// Estimated GPU frame time block
    pub gpu: Option<MetricConfig>,
    /// Process memory block
    pub mem: Option<MetricConfig>,
    /// User metrics, stacked below the built-ins in order
    pub custom_metrics: Vec<MetricConfig>,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            window_width: DEFAULT_WINDOW_WIDTH,
            title: DEFAULT_WINDOW_TITLE.to_owned(),
            background_color: Color::WHITE,
            font_size: DEFAULT_FONT_SIZE,
            redraw_interval: DEFAULT_REDRAW_INTERVAL,
            fps: None,
            cpu: None,
            gpu: None,
            mem: None,
            custom_metrics: Vec::new(),
        }
    }
}

impl OverlaySettings {
    /// Settings with all four built-in metrics enabled using default configs.
    pub fn with_builtins() -> Self {
        Self {
            fps: Some(MetricConfig {
                precise: false,
                chart: ChartKind::Line,
                ..Default::default()
            }),
            cpu: Some(MetricConfig {
                chart_color: Color::srgb(0.18, 0.55, 0.34),
                ..Default::default()
            }),
            gpu: Some(MetricConfig {
                chart_color: Color::srgb(0.80, 0.36, 0.36),
                ..Default::default()
            }),
            mem: Some(MetricConfig {
                chart: ChartKind::Hills,
                chart_color: Color::srgb(0.37, 0.62, 0.63),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Append a custom metric.
    pub fn with_custom_metric(mut self, metric: MetricConfig) -> Self {
        self.custom_metrics.push(metric);
        self
    }
}
