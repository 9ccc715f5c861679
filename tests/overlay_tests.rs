//! Integration tests for the overlay orchestrator
//!
//! These drive the public API the way a host frame loop does, including the
//! render thread.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use bevy::math::UVec2;
use bevy_metrics_overlay::{
    normalize, ChartKind, DrawCommand, HeadlessSurfaceFactory, HistoryPolicy, MemorySource,
    MetricConfig, OverlayError, OverlaySettings, OverlayState, OverlaySurface, PerfOverlay,
    SampleMode, SurfaceError,
};

struct FixedMemory {
    bytes: u64,
    queries: Arc<AtomicUsize>,
}

impl MemorySource for FixedMemory {
    fn resident_bytes(&mut self) -> Option<u64> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Some(self.bytes)
    }
}

fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

fn fast_redraw() -> OverlaySettings {
    OverlaySettings {
        redraw_interval: Duration::from_millis(5),
        ..OverlaySettings::with_builtins()
    }
}

#[test]
fn fps_history_keeps_latest_values_and_normalizes() {
    let settings = OverlaySettings {
        fps: Some(
            MetricConfig::default()
                .with_sample_mode(SampleMode::EachValue)
                .with_history(3, HistoryPolicy::Continuous),
        ),
        ..Default::default()
    };
    let mut overlay = PerfOverlay::new();
    overlay.initialize(settings).unwrap();

    for fps in [10.0, 20.0, 30.0, 40.0] {
        overlay.update_metric("FPS", fps).unwrap();
    }

    let history = overlay.history("FPS").unwrap();
    assert_eq!(history, vec![20.0, 30.0, 40.0]);
    assert_eq!(normalize(&history, 0.0, 100.0), vec![0.0, 50.0, 100.0]);
}

#[test]
fn frame_bracketing_feeds_cpu_and_gpu() {
    let settings = OverlaySettings {
        cpu: Some(MetricConfig::default().with_sample_mode(SampleMode::EachValue)),
        gpu: Some(MetricConfig::default().with_sample_mode(SampleMode::EachValue)),
        ..Default::default()
    };
    let mut overlay = PerfOverlay::new();
    overlay.initialize(settings).unwrap();

    overlay.begin().unwrap();
    thread::sleep(Duration::from_millis(20));
    overlay.end(0.02).unwrap();

    thread::sleep(Duration::from_millis(15));
    overlay.begin().unwrap();
    overlay.end(0.02).unwrap();

    let cpu = overlay.history("CPU").unwrap();
    assert_eq!(cpu.len(), 2);
    assert!(cpu[0] >= 20.0, "cpu time {}", cpu[0]);

    let gpu = overlay.history("GPU").unwrap();
    assert_eq!(gpu.len(), 2);
    assert!(gpu[1] >= 15.0, "gpu gap {}", gpu[1]);
}

#[test]
fn memory_queries_are_rate_limited() {
    let queries = Arc::new(AtomicUsize::new(0));
    let mut overlay = PerfOverlay::new().with_memory_source(FixedMemory {
        bytes: 300 * 1024 * 1024,
        queries: Arc::clone(&queries),
    });
    overlay
        .initialize(OverlaySettings {
            mem: Some(MetricConfig::default()),
            ..Default::default()
        })
        .unwrap();

    overlay.end(0.016).unwrap();
    thread::sleep(Duration::from_millis(100));
    overlay.end(0.016).unwrap();
    assert!(queries.load(Ordering::SeqCst) <= 1);

    thread::sleep(Duration::from_millis(1100));
    overlay.end(0.016).unwrap();
    assert_eq!(queries.load(Ordering::SeqCst), 1);
    assert_eq!(overlay.history("MEM").unwrap(), vec![300.0]);
    assert_eq!(overlay.label_text("MEM").unwrap(), "MEM: 300.00 mb");
}

#[test]
fn render_thread_draws_every_block() {
    let surfaces = HeadlessSurfaceFactory::new();
    let settings = fast_redraw().with_custom_metric(
        MetricConfig::new("Draw calls")
            .with_chart(ChartKind::Hills)
            .with_sample_mode(SampleMode::EachValue)
            .imprecise(),
    );
    let mut overlay = PerfOverlay::new().with_surface_factory(surfaces.clone());
    overlay.initialize(settings).unwrap();
    overlay.update_metric("Draw calls", 120.0).unwrap();

    overlay.show_window().unwrap();
    assert_eq!(overlay.state(), OverlayState::WindowShown);
    assert!(wait_until(|| surfaces.frames_presented() >= 2));

    let frame = surfaces.latest_frame().unwrap();
    assert_eq!(frame.size(), overlay.overlay_size().unwrap().ceil());
    assert!(matches!(frame.commands()[0], DrawCommand::Clear(_)));
    let labels: Vec<_> = frame.texts().collect();
    assert_eq!(labels.len(), 5);
    assert_eq!(labels[4], "Draw calls: 120");

    overlay.close().unwrap();
}

#[test]
fn show_window_twice_keeps_one_thread() {
    let surfaces = HeadlessSurfaceFactory::new();
    let mut overlay = PerfOverlay::new().with_surface_factory(surfaces.clone());
    overlay.initialize(fast_redraw()).unwrap();

    overlay.show_window().unwrap();
    overlay.show_window().unwrap();
    assert!(wait_until(|| surfaces.frames_presented() >= 1));
    assert_eq!(surfaces.surfaces_created(), 1);
}

#[test]
fn window_can_be_reshown_after_close_window() {
    let surfaces = HeadlessSurfaceFactory::new();
    let mut overlay = PerfOverlay::new().with_surface_factory(surfaces.clone());
    overlay.initialize(fast_redraw()).unwrap();

    overlay.show_window().unwrap();
    assert!(wait_until(|| surfaces.surfaces_created() == 1));

    overlay.close_window().unwrap();
    overlay.close_window().unwrap();
    assert!(!overlay.is_window_active());
    assert_eq!(overlay.state(), OverlayState::Initialized);

    overlay.show_window().unwrap();
    assert!(wait_until(|| surfaces.surfaces_created() == 2));
    assert!(overlay.is_window_active());
}

#[test]
fn close_is_terminal_and_idempotent() {
    let mut overlay = PerfOverlay::new();
    overlay.initialize(fast_redraw()).unwrap();
    overlay.show_window().unwrap();

    overlay.close().unwrap();
    overlay.close().unwrap();
    assert_eq!(overlay.state(), OverlayState::Closed);
    assert!(matches!(overlay.show_window(), Err(OverlayError::Closed)));

    // metrics keep recording for hosts that composite the overlay themselves
    overlay.update_metric("FPS", 30.0).unwrap();
}

#[test]
fn surface_failure_leaves_overlay_retryable() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let surfaces = HeadlessSurfaceFactory::new();

    let factory = {
        let attempts = Arc::clone(&attempts);
        let surfaces = surfaces.clone();
        move |size: UVec2, title: &str| -> Result<Box<dyn OverlaySurface>, SurfaceError> {
            if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(SurfaceError::Creation("display not ready".into()))
            } else {
                bevy_metrics_overlay::SurfaceFactory::create(&surfaces, size, title)
            }
        }
    };

    let mut overlay = PerfOverlay::new().with_surface_factory(factory);
    overlay.initialize(fast_redraw()).unwrap();

    overlay.show_window().unwrap();
    assert!(wait_until(|| !overlay.is_window_active()));
    assert_eq!(overlay.state(), OverlayState::Initialized);

    overlay.show_window().unwrap();
    assert!(wait_until(|| surfaces.frames_presented() >= 1));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn custom_metrics_average_over_ticks() {
    let settings = OverlaySettings::default().with_custom_metric(
        MetricConfig::new("Latency")
            .with_unit("us")
            .with_sample_mode(SampleMode::Ticks(2))
            .keep_warmup(),
    );
    let mut overlay = PerfOverlay::new();
    overlay.initialize(settings).unwrap();

    for v in [1.0, 3.0, 10.0, 20.0, 5.0] {
        overlay.update_metric("Latency", v).unwrap();
    }
    assert_eq!(overlay.history("Latency").unwrap(), vec![2.0, 15.0]);
    assert_eq!(overlay.label_text("Latency").unwrap(), "Latency: 15.00 us");
}

struct SlowSurface {
    size: UVec2,
    presenting: Arc<AtomicUsize>,
}

impl OverlaySurface for SlowSurface {
    fn canvas_size(&self) -> UVec2 {
        self.size
    }

    fn present(&mut self, _frame: &bevy_metrics_overlay::DrawList) -> Result<(), SurfaceError> {
        self.presenting.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(800));
        Ok(())
    }
}

#[test]
fn reshow_does_not_wait_for_a_slow_frame() {
    let presenting = Arc::new(AtomicUsize::new(0));
    let factory = {
        let presenting = Arc::clone(&presenting);
        move |size: UVec2, _: &str| -> Result<Box<dyn OverlaySurface>, SurfaceError> {
            Ok(Box::new(SlowSurface {
                size,
                presenting: Arc::clone(&presenting),
            }))
        }
    };

    let mut overlay = PerfOverlay::new().with_surface_factory(factory);
    overlay.initialize(fast_redraw()).unwrap();
    overlay.show_window().unwrap();
    assert!(wait_until(|| presenting.load(Ordering::SeqCst) >= 1));

    // the first thread is inside its 800 ms present
    overlay.close_window().unwrap();
    let started = Instant::now();
    overlay.show_window().unwrap();
    assert!(
        started.elapsed() < Duration::from_millis(400),
        "show_window blocked for {:?}",
        started.elapsed()
    );
    assert!(overlay.is_window_active());
}
