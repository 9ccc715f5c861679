//! The overlay orchestrator.
//!
//! [`PerfOverlay`] owns the metric registry, the frame timers and the render
//! thread handle. It is an explicit context object: hosts create one, call
//! [`initialize`](PerfOverlay::initialize) once, then bracket each frame with
//! [`begin`](PerfOverlay::begin) and [`end`](PerfOverlay::end). Through
//! [`PerfOverlayPlugin`](crate::PerfOverlayPlugin) it lives as a Bevy resource.

use std::{collections::HashMap, sync::Arc, time::Instant};

use bevy::{
    color::Color,
    log::{debug, error, info, warn},
    math::{Rect, Vec2},
    prelude::Resource,
};
use parking_lot::Mutex;

use crate::{
    block::MetricBlock,
    canvas::{Canvas, FixedFontMetrics, FontMetrics},
    config::{MetricConfig, OverlaySettings, SampleMode},
    constants::*,
    error::{OverlayError, Result},
    memory::{bytes_to_mb, MemorySource, ProcessMemory},
    timer::{FrameTimers, FrameTiming, RateGate},
    window::{HeadlessSurfaceFactory, OverlayWindow, SurfaceFactory},
};

/// Lifecycle state of a [`PerfOverlay`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    /// Created, `initialize` not called yet
    Uninitialized,
    /// Metrics registered, no render thread running
    Initialized,
    /// Render thread running
    WindowShown,
    /// Closed for good; the window cannot be shown again
    Closed,
}

/// Metric blocks laid out for one overlay, shared with the render thread.
///
/// Immutable after construction apart from the per-block locks.
pub(crate) struct BlockRegistry {
    blocks: Vec<Mutex<MetricBlock>>,
    keys: Vec<String>,
    index: HashMap<String, usize>,
    size: Vec2,
    background: Color,
}

impl BlockRegistry {
    /// Register the enabled built-ins followed by the custom metrics,
    /// stacking them from the top of the overlay.
    pub(crate) fn build(settings: &OverlaySettings, fonts: &dyn FontMetrics) -> Result<Self> {
        let text_height = fonts.text_height(settings.font_size);
        let left = BLOCK_GAP;
        let right = (settings.window_width - BLOCK_GAP).max(left);

        let mut registry = Self {
            blocks: Vec::new(),
            keys: Vec::new(),
            index: HashMap::new(),
            size: Vec2::new(settings.window_width.max(0.0), TOP_MARGIN),
            background: settings.background_color,
        };

        let configs = builtin_configs(settings).chain(settings.custom_metrics.iter().cloned());
        let mut top = TOP_MARGIN;
        for config in configs {
            let key = config.label.clone();
            if registry.index.contains_key(&key) {
                return Err(OverlayError::DuplicateMetric(key));
            }

            let height = config.height.max(0.0);
            let rect = Rect::new(left, top, right, top + height);
            top += height + BLOCK_GAP;

            registry.index.insert(key.clone(), registry.blocks.len());
            registry.keys.push(key);
            registry.blocks.push(Mutex::new(MetricBlock::new(
                config,
                rect,
                text_height,
                settings.font_size,
            )));
        }
        registry.size.y = top;

        Ok(registry)
    }

    pub(crate) fn size(&self) -> Vec2 {
        self.size
    }

    /// Record one overlay frame: clear, then every block in order.
    pub(crate) fn render(&self, canvas: &mut dyn Canvas) {
        canvas.clear(self.background);
        for block in &self.blocks {
            block.lock().draw(canvas);
        }
    }

    fn block(&self, key: &str) -> Option<&Mutex<MetricBlock>> {
        self.index.get(key).map(|&i| &self.blocks[i])
    }

    /// Push into a block if it is registered. Returns false otherwise.
    fn push(&self, key: &str, value: f32) -> bool {
        match self.block(key) {
            Some(block) => {
                block.lock().update_value(value);
                true
            }
            None => false,
        }
    }
}

/// Built-in metric configs in display order, with forced labels and units.
fn builtin_configs(settings: &OverlaySettings) -> impl Iterator<Item = MetricConfig> + '_ {
    [
        (FPS_METRIC_ID, settings.fps.as_ref(), None),
        (CPU_METRIC_ID, settings.cpu.as_ref(), Some(FRAME_TIME_UNIT)),
        (GPU_METRIC_ID, settings.gpu.as_ref(), Some(FRAME_TIME_UNIT)),
        (MEM_METRIC_ID, settings.mem.as_ref(), Some(MEMORY_UNIT)),
    ]
    .into_iter()
    .filter_map(|(id, config, unit)| {
        let mut config = config?.clone();
        config.label = id.to_owned();
        config.unit = unit.map(str::to_owned);
        if id == MEM_METRIC_ID {
            // sampled once per second already, averaging would hide it
            config.sample_mode = SampleMode::EachValue;
        }
        Some(config)
    })
}

/// Live performance metrics overlay.
///
/// # Example
/// ```
/// use bevy_metrics_overlay::{MetricConfig, OverlaySettings, PerfOverlay, SampleMode};
///
/// let mut overlay = PerfOverlay::new();
/// overlay
///     .initialize(OverlaySettings::default().with_custom_metric(
///         MetricConfig::new("Entities").with_sample_mode(SampleMode::EachValue),
///     ))
///     .unwrap();
///
/// overlay.begin().unwrap();
/// overlay.update_metric("Entities", 42.0).unwrap();
/// overlay.end(1.0 / 60.0).unwrap();
///
/// assert_eq!(overlay.latest("Entities").unwrap(), 42.0);
/// ```
#[derive(Resource)]
pub struct PerfOverlay {
    state: OverlayState,
    settings: OverlaySettings,
    registry: Option<Arc<BlockRegistry>>,
    timers: FrameTimers,
    memory_gate: RateGate,
    memory: Box<dyn MemorySource>,
    factory: Arc<dyn SurfaceFactory>,
    window: Option<OverlayWindow>,
}

impl Default for PerfOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl PerfOverlay {
    /// Uninitialized overlay sampling this process' memory and presenting to
    /// an in-memory surface.
    pub fn new() -> Self {
        Self::new_at(Instant::now())
    }

    fn new_at(now: Instant) -> Self {
        Self {
            state: OverlayState::Uninitialized,
            settings: OverlaySettings::default(),
            registry: None,
            timers: FrameTimers::new(),
            memory_gate: RateGate::starting_at(MEMORY_SAMPLE_INTERVAL, now),
            memory: Box::new(ProcessMemory::new()),
            factory: Arc::new(HeadlessSurfaceFactory::new()),
            window: None,
        }
    }

    /// Replace the memory source used for the MEM block.
    pub fn with_memory_source(mut self, source: impl MemorySource + 'static) -> Self {
        self.memory = Box::new(source);
        self
    }

    /// Replace the factory creating the render thread's surface.
    pub fn with_surface_factory(mut self, factory: impl SurfaceFactory + 'static) -> Self {
        self.factory = Arc::new(factory);
        self
    }

    /// Same as [`with_surface_factory`](Self::with_surface_factory) for a
    /// factory that is already shared.
    pub fn with_shared_surface_factory(mut self, factory: Arc<dyn SurfaceFactory>) -> Self {
        self.factory = factory;
        self
    }

    /// Register the metrics of `settings`, measuring text with
    /// [`FixedFontMetrics`].
    pub fn initialize(&mut self, settings: OverlaySettings) -> Result<()> {
        self.initialize_with_fonts(settings, &FixedFontMetrics::default())
    }

    /// Register the metrics of `settings`.
    ///
    /// # Errors
    /// [`OverlayError::AlreadyInitialized`] on a second call,
    /// [`OverlayError::Closed`] after [`close`](Self::close) and
    /// [`OverlayError::DuplicateMetric`] when two metrics share a label.
    pub fn initialize_with_fonts(
        &mut self,
        settings: OverlaySettings,
        fonts: &dyn FontMetrics,
    ) -> Result<()> {
        match self.state {
            OverlayState::Uninitialized => {}
            OverlayState::Closed => return Err(OverlayError::Closed),
            OverlayState::Initialized | OverlayState::WindowShown => {
                return Err(OverlayError::AlreadyInitialized)
            }
        }

        let registry = BlockRegistry::build(&settings, fonts)?;
        info!(
            "metrics overlay initialized with {} metrics ({}x{} px)",
            registry.keys.len(),
            registry.size.x,
            registry.size.y
        );

        self.registry = Some(Arc::new(registry));
        self.settings = settings;
        self.state = OverlayState::Initialized;
        Ok(())
    }

    /// Start the render thread if it is not already running.
    ///
    /// Thread or surface failures are logged and leave the overlay ready for
    /// another attempt.
    pub fn show_window(&mut self) -> Result<()> {
        if self.state == OverlayState::Closed {
            return Err(OverlayError::Closed);
        }
        let registry = Arc::clone(self.registry()?);

        if self.is_window_active() {
            return Ok(());
        }
        if let Some(previous) = self.window.take() {
            // still finishing its last frame; it exits on its own
            if previous.is_running() {
                previous.detach();
            }
        }

        match OverlayWindow::spawn(
            registry,
            Arc::clone(&self.factory),
            self.settings.title.clone(),
            self.settings.redraw_interval,
        ) {
            Ok(window) => {
                info!("metrics overlay window shown");
                self.window = Some(window);
                self.state = OverlayState::WindowShown;
            }
            Err(err) => error!("failed to show metrics overlay window: {err}"),
        }
        Ok(())
    }

    /// Stop the render thread; the window can be shown again later.
    pub fn close_window(&mut self) -> Result<()> {
        self.registry()?;
        self.signal_close();
        if self.state == OverlayState::WindowShown {
            self.state = OverlayState::Initialized;
        }
        Ok(())
    }

    /// Stop the render thread for good. Idempotent.
    pub fn close(&mut self) -> Result<()> {
        self.registry()?;
        self.signal_close();
        if self.state != OverlayState::Closed {
            info!("metrics overlay closed");
            self.state = OverlayState::Closed;
        }
        Ok(())
    }

    /// Mark the start of the host's frame work.
    pub fn begin(&mut self) -> Result<()> {
        self.registry()?;
        self.timers.begin();
        Ok(())
    }

    /// Mark the end of the host's frame work and record the built-in metrics.
    ///
    /// `delta_seconds` is the full frame duration used for FPS; it must be
    /// positive. GPU time is estimated as the gap between the previous `end`
    /// and this frame's `begin`.
    pub fn end(&mut self, delta_seconds: f32) -> Result<()> {
        self.registry()?;
        let timing = self.timers.end();
        self.record_frame(delta_seconds, timing, Instant::now());
        Ok(())
    }

    /// Like [`end`](Self::end), with a GPU time measured by the host (for
    /// example through timestamp queries).
    pub fn end_with_gpu_time(&mut self, delta_seconds: f32, gpu_ms: f32) -> Result<()> {
        self.registry()?;
        let mut timing = self.timers.end();
        timing.gpu_ms = gpu_ms;
        self.record_frame(delta_seconds, timing, Instant::now());
        Ok(())
    }

    /// Push a value into any registered metric, built-ins included.
    pub fn update_metric(&self, key: &str, value: f32) -> Result<()> {
        if self.registry()?.push(key, value) {
            Ok(())
        } else {
            Err(OverlayError::UnknownMetric(key.to_owned()))
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> OverlayState {
        match self.state {
            OverlayState::WindowShown if !self.is_window_active() => OverlayState::Initialized,
            state => state,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.registry.is_some()
    }

    /// True while the render thread is running and not asked to close.
    pub fn is_window_active(&self) -> bool {
        self.window.as_ref().is_some_and(OverlayWindow::is_active)
    }

    /// Keys of the registered metrics in display order.
    pub fn metric_keys(&self) -> Result<&[String]> {
        Ok(&self.registry()?.keys)
    }

    /// Copy of a metric's stored samples in storage order.
    pub fn history(&self, key: &str) -> Result<Vec<f32>> {
        self.with_block(key, MetricBlock::history)
    }

    /// Last sample emitted by a metric's aggregator.
    pub fn latest(&self, key: &str) -> Result<f32> {
        self.with_block(key, MetricBlock::latest)
    }

    /// Label a metric would draw now.
    pub fn label_text(&self, key: &str) -> Result<String> {
        self.with_block(key, MetricBlock::label_text)
    }

    /// Rectangle of a metric block inside the overlay.
    pub fn block_rect(&self, key: &str) -> Result<Rect> {
        self.with_block(key, MetricBlock::rect)
    }

    /// Size of the overlay surface in pixels.
    pub fn overlay_size(&self) -> Result<Vec2> {
        Ok(self.registry()?.size())
    }

    /// Draw the frame the render thread would present, for hosts that
    /// composite the overlay themselves.
    pub fn render_frame(&self, canvas: &mut dyn Canvas) -> Result<()> {
        self.registry()?.render(canvas);
        Ok(())
    }

    fn registry(&self) -> Result<&Arc<BlockRegistry>> {
        self.registry.as_ref().ok_or(OverlayError::NotInitialized)
    }

    fn with_block<T>(&self, key: &str, f: impl FnOnce(&MetricBlock) -> T) -> Result<T> {
        let block = self
            .registry()?
            .block(key)
            .ok_or_else(|| OverlayError::UnknownMetric(key.to_owned()))?;
        let block = block.lock();
        Ok(f(&block))
    }

    fn signal_close(&mut self) {
        if let Some(window) = self.window.as_mut() {
            if window.is_active() {
                debug!("closing metrics overlay window");
            }
            window.close();
        }
    }

    fn record_frame(&mut self, delta_seconds: f32, timing: FrameTiming, now: Instant) {
        let Some(registry) = self.registry.as_ref() else {
            return;
        };

        registry.push(FPS_METRIC_ID, 1000.0 / (delta_seconds * 1000.0));
        registry.push(CPU_METRIC_ID, timing.cpu_ms);
        registry.push(GPU_METRIC_ID, timing.gpu_ms);

        if self.settings.mem.is_some() && self.memory_gate.is_open_at(now) {
            match self.memory.resident_bytes() {
                Some(bytes) => {
                    registry.push(MEM_METRIC_ID, bytes_to_mb(bytes));
                }
                None => warn!("could not read process memory"),
            }
            self.memory_gate.reset_at(now);
        }
    }
}
