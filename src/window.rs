//! Overlay render thread and the surfaces it presents to.
//!
//! The thread owns its [`OverlaySurface`] from creation to drop. Every
//! `redraw_interval` it records one frame of all metric blocks into a
//! [`DrawList`] and presents it. Closing is signalled over a bounded channel so
//! the host never waits for a frame to finish.

use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use bevy::{
    log::{debug, error, warn},
    math::UVec2,
};
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use parking_lot::Mutex;

use crate::{
    canvas::DrawList,
    constants::RENDER_THREAD_NAME,
    error::{Result, SurfaceError},
    overlay::BlockRegistry,
};

/// Window-like target the render thread presents frames to.
///
/// Created, used and dropped on the render thread only.
pub trait OverlaySurface {
    /// Drawable size in pixels.
    fn canvas_size(&self) -> UVec2;

    /// Show a recorded frame.
    fn present(&mut self, frame: &DrawList) -> Result<(), SurfaceError>;

    /// True once the user closed the surface.
    fn should_close(&self) -> bool {
        false
    }
}

/// Creates the overlay surface on the render thread.
///
/// Any `Fn(UVec2, &str) -> Result<Box<dyn OverlaySurface>, SurfaceError>`
/// closure is a factory.
pub trait SurfaceFactory: Send + Sync {
    fn create(&self, size: UVec2, title: &str) -> Result<Box<dyn OverlaySurface>, SurfaceError>;
}

impl<F> SurfaceFactory for F
where
    F: Fn(UVec2, &str) -> Result<Box<dyn OverlaySurface>, SurfaceError> + Send + Sync + 'static,
{
    fn create(&self, size: UVec2, title: &str) -> Result<Box<dyn OverlaySurface>, SurfaceError> {
        self(size, title)
    }
}

/// Factory for surfaces that keep the latest presented frame in memory.
///
/// Clones share state, so a clone kept by the host observes what the render
/// thread presents.
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurfaceFactory {
    latest: Arc<Mutex<Option<DrawList>>>,
    presented: Arc<AtomicUsize>,
    created: Arc<AtomicUsize>,
}

impl HeadlessSurfaceFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the most recently presented frame.
    pub fn latest_frame(&self) -> Option<DrawList> {
        self.latest.lock().clone()
    }

    /// Number of frames presented by all surfaces of this factory.
    pub fn frames_presented(&self) -> usize {
        self.presented.load(Ordering::Acquire)
    }

    /// Number of surfaces created so far.
    pub fn surfaces_created(&self) -> usize {
        self.created.load(Ordering::Acquire)
    }
}

impl SurfaceFactory for HeadlessSurfaceFactory {
    fn create(&self, size: UVec2, title: &str) -> Result<Box<dyn OverlaySurface>, SurfaceError> {
        debug!("creating headless overlay surface `{title}` ({}x{})", size.x, size.y);
        self.created.fetch_add(1, Ordering::AcqRel);
        Ok(Box::new(HeadlessSurface {
            size,
            latest: Arc::clone(&self.latest),
            presented: Arc::clone(&self.presented),
        }))
    }
}

struct HeadlessSurface {
    size: UVec2,
    latest: Arc<Mutex<Option<DrawList>>>,
    presented: Arc<AtomicUsize>,
}

impl OverlaySurface for HeadlessSurface {
    fn canvas_size(&self) -> UVec2 {
        self.size
    }

    fn present(&mut self, frame: &DrawList) -> Result<(), SurfaceError> {
        *self.latest.lock() = Some(frame.clone());
        self.presented.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}

/// Clears the alive flag when the render thread exits, panics included.
struct AliveGuard(Arc<AtomicBool>);

impl Drop for AliveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Handle to a running overlay render thread.
pub struct OverlayWindow {
    close_tx: Sender<()>,
    alive: Arc<AtomicBool>,
    closing: bool,
    handle: Option<JoinHandle<()>>,
}

impl OverlayWindow {
    /// Spawn the render thread drawing `registry` onto a surface from `factory`.
    pub(crate) fn spawn(
        registry: Arc<BlockRegistry>,
        factory: Arc<dyn SurfaceFactory>,
        title: String,
        redraw_interval: Duration,
    ) -> Result<Self> {
        let (close_tx, close_rx) = bounded::<()>(1);
        let alive = Arc::new(AtomicBool::new(true));
        let guard = AliveGuard(Arc::clone(&alive));

        let handle = thread::Builder::new()
            .name(RENDER_THREAD_NAME.to_string())
            .spawn(move || {
                let _guard = guard;
                let size = registry.size().ceil().as_uvec2();

                let mut surface = match factory.create(size, &title) {
                    Ok(surface) => surface,
                    Err(err) => {
                        error!("metrics overlay surface unavailable: {err}");
                        return;
                    }
                };

                let mut frame = DrawList::new(surface.canvas_size().as_vec2());
                loop {
                    registry.render(&mut frame);
                    if let Err(err) = surface.present(&frame) {
                        warn!("failed to present metrics overlay frame: {err}");
                    }
                    if surface.should_close() {
                        debug!("metrics overlay surface closed by the user");
                        break;
                    }

                    match close_rx.recv_timeout(redraw_interval) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("metrics overlay render thread exiting");
            })?;

        Ok(Self {
            close_tx,
            alive,
            closing: false,
            handle: Some(handle),
        })
    }

    /// True while the render thread runs and no close was requested.
    pub fn is_active(&self) -> bool {
        !self.closing && self.alive.load(Ordering::Acquire)
    }

    /// True while the render thread has not exited yet.
    pub fn is_running(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Ask the render thread to exit. Never blocks; repeated calls are no-ops.
    pub fn close(&mut self) {
        self.closing = true;
        let _ = self.close_tx.try_send(());
    }

    /// Close without joining; the thread finishes its frame and exits alone.
    pub(crate) fn detach(mut self) {
        self.close();
        self.handle.take();
    }
}

impl Drop for OverlayWindow {
    fn drop(&mut self) {
        self.close();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("metrics overlay render thread panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MetricConfig, OverlaySettings, SampleMode};
    use std::time::Instant;

    fn registry() -> Arc<BlockRegistry> {
        let settings = OverlaySettings::default().with_custom_metric(
            MetricConfig::new("Jobs").with_sample_mode(SampleMode::EachValue),
        );
        let registry = BlockRegistry::build(&settings, &crate::canvas::FixedFontMetrics::default())
            .expect("valid settings");
        Arc::new(registry)
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

    #[test]
    fn render_thread_presents_frames() {
        let factory = HeadlessSurfaceFactory::new();
        let window = OverlayWindow::spawn(
            registry(),
            Arc::new(factory.clone()),
            "test".into(),
            Duration::from_millis(5),
        )
        .expect("spawn");

        assert!(wait_until(|| factory.frames_presented() >= 3));
        assert!(window.is_active());

        let frame = factory.latest_frame().expect("frame presented");
        assert_eq!(frame.texts().collect::<Vec<_>>(), vec!["Jobs: 0.00"]);
    }

    #[test]
    fn close_is_idempotent_and_stops_the_thread() {
        let factory = HeadlessSurfaceFactory::new();
        let mut window = OverlayWindow::spawn(
            registry(),
            Arc::new(factory),
            "test".into(),
            Duration::from_secs(60),
        )
        .expect("spawn");

        window.close();
        window.close();
        assert!(!window.is_active());
        assert!(wait_until(|| !window.is_running()));
    }

    #[test]
    fn failing_factory_ends_the_thread() {
        let factory = |_: UVec2, _: &str| -> Result<Box<dyn OverlaySurface>, SurfaceError> {
            Err(SurfaceError::Creation("no display".into()))
        };
        let window = OverlayWindow::spawn(
            registry(),
            Arc::new(factory),
            "test".into(),
            Duration::from_millis(5),
        )
        .expect("spawn");

        assert!(wait_until(|| !window.is_running()));
        assert!(!window.is_active());
    }
}
