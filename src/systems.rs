//! Bevy systems driving a [`PerfOverlay`] resource.
//!
//! - `begin_frame` / `end_frame`: bracket the app's frame
//! - `show_overlay_window`: starts the render thread at startup
//! - `close_overlay_on_exit`: stops it when the app exits

use bevy::{
    app::AppExit,
    ecs::{
        event::EventReader,
        system::{Res, ResMut},
    },
    log::{error, warn, warn_once},
    time::Time,
};

use crate::overlay::PerfOverlay;

/// Starts CPU timing at the beginning of the frame.
pub fn begin_frame(mut overlay: ResMut<PerfOverlay>) {
    if let Err(err) = overlay.begin() {
        warn_once!("metrics overlay frame not recorded: {err}");
    }
}

/// Records the built-in metrics at the end of the frame.
pub fn end_frame(mut overlay: ResMut<PerfOverlay>, time: Res<Time>) {
    let delta = time.delta_secs();
    // first update has no delta yet
    if delta <= 0.0 {
        return;
    }
    if let Err(err) = overlay.end(delta) {
        warn_once!("metrics overlay frame not recorded: {err}");
    }
}

pub fn show_overlay_window(mut overlay: ResMut<PerfOverlay>) {
    if let Err(err) = overlay.show_window() {
        error!("could not show metrics overlay: {err}");
    }
}

pub fn close_overlay_on_exit(mut exits: EventReader<AppExit>, mut overlay: ResMut<PerfOverlay>) {
    if exits.read().next().is_none() {
        return;
    }
    if !overlay.is_initialized() {
        return;
    }
    if let Err(err) = overlay.close() {
        warn!("could not close metrics overlay: {err}");
    }
}
