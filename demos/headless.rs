use std::{thread, time::Duration};

use bevy::{
    app::ScheduleRunnerPlugin,
    log::{info, warn_once, LogPlugin},
    prelude::*,
};
use bevy_metrics_overlay::{
    ChartKind, HeadlessSurfaceFactory, HistoryPolicy, MetricConfig, OverlaySettings, PerfOverlay,
    PerfOverlayPlugin, SampleMode,
};

/// Runs the overlay in a windowless app and logs what the render thread draws
fn main() {
    let surfaces = HeadlessSurfaceFactory::new();

    let settings = OverlaySettings::with_builtins().with_custom_metric(
        MetricConfig::new("Work")
            .with_unit("ms")
            .with_chart(ChartKind::Hills)
            .with_sample_mode(SampleMode::Ticks(10))
            .with_history(60, HistoryPolicy::Looping),
    );

    App::new()
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / 60.0,
            ))),
        )
        .add_plugins(LogPlugin::default())
        .add_plugins(PerfOverlayPlugin {
            settings,
            show_window: true,
            factory: std::sync::Arc::new(surfaces.clone()),
        })
        .insert_resource(Surfaces(surfaces))
        .add_systems(Update, (simulate_work, report).chain())
        .run();
}

#[derive(Resource)]
struct Surfaces(HeadlessSurfaceFactory);

/// Busy the frame for a varying amount of time and report it as a metric
fn simulate_work(time: Res<Time>, overlay: Res<PerfOverlay>) {
    let load = (time.elapsed_secs().sin() + 1.0) * 2.0;
    thread::sleep(Duration::from_secs_f32(load / 1000.0));

    if let Err(err) = overlay.update_metric("Work", load) {
        warn_once!("{err}");
    }
}

fn report(
    time: Res<Time>,
    surfaces: Res<Surfaces>,
    mut last_report: Local<f32>,
    mut exit: EventWriter<AppExit>,
) {
    let now = time.elapsed_secs();
    if now - *last_report < 1.0 {
        return;
    }
    *last_report = now;

    if let Some(frame) = surfaces.0.latest_frame() {
        let labels: Vec<_> = frame.texts().collect();
        info!(
            "frame #{}: {}",
            surfaces.0.frames_presented(),
            labels.join(" | ")
        );
    }

    if now > 5.0 {
        exit.write(AppExit::Success);
    }
}
