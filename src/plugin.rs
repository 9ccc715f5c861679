//! Bevy plugin wiring a [`PerfOverlay`] into an app.
//!
//! This module contains the [`PerfOverlayPlugin`] and its setup logic.

use std::sync::Arc;

use bevy::{
    app::{App, First, Last, Plugin, Startup},
    log::error,
    prelude::IntoScheduleConfigs,
};

use crate::{
    begin_frame, close_overlay_on_exit, end_frame, show_overlay_window, HeadlessSurfaceFactory,
    OverlaySettings, PerfOverlay, SurfaceFactory,
};

/// Plugin inserting a [`PerfOverlay`] resource and driving it every frame.
///
/// The overlay is initialized with `settings` while the plugin is built.
/// `begin` runs in [`First`], `end` in [`Last`] with the frame delta from
/// [`Time`](bevy::time::Time). The render thread is started at startup when
/// `show_window` is set, and closed when the app exits.
///
/// # Example
///
/// ```no_run
/// use bevy::prelude::*;
/// use bevy_metrics_overlay::{OverlaySettings, PerfOverlayPlugin};
///
/// let mut app = App::new();
/// app.add_plugins(MinimalPlugins);
/// app.add_plugins(PerfOverlayPlugin {
///     settings: OverlaySettings::with_builtins(),
///     ..default()
/// });
/// app.run();
/// ```
#[derive(Clone)]
pub struct PerfOverlayPlugin {
    /// Metrics and layout of the overlay
    pub settings: OverlaySettings,
    /// Start the render thread at startup
    pub show_window: bool,
    /// Creates the surface the render thread presents to
    pub factory: Arc<dyn SurfaceFactory>,
}

impl Default for PerfOverlayPlugin {
    fn default() -> Self {
        Self {
            settings: OverlaySettings::with_builtins(),
            show_window: true,
            factory: Arc::new(HeadlessSurfaceFactory::new()),
        }
    }
}

impl Plugin for PerfOverlayPlugin {
    fn build(&self, app: &mut App) {
        let mut overlay = PerfOverlay::new().with_shared_surface_factory(Arc::clone(&self.factory));
        if let Err(err) = overlay.initialize(self.settings.clone()) {
            error!("metrics overlay disabled: {err}");
        }

        app.insert_resource(overlay)
            .add_systems(First, begin_frame)
            .add_systems(Last, (end_frame, close_overlay_on_exit).chain());

        if self.show_window {
            app.add_systems(Startup, show_overlay_window);
        }
    }
}
