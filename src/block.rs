//! Self-contained metric widget: chart plus formatted label.

use std::fmt::Write as _;

use bevy::math::{Rect, Vec2};

use crate::{
    canvas::Canvas,
    chart::Chart,
    config::MetricConfig,
    constants::TEXT_PADDING,
};

/// One metric's configuration, chart and label, positioned in the overlay.
#[derive(Debug, Clone)]
pub struct MetricBlock {
    config: MetricConfig,
    rect: Rect,
    text_height: f32,
    font_size: f32,
    chart: Chart,
    label: String,
}

impl MetricBlock {
    /// Create a block occupying `rect`.
    ///
    /// The top `text_height + TEXT_PADDING` pixels hold the label; the chart
    /// fills the remainder.
    pub fn new(config: MetricConfig, rect: Rect, text_height: f32, font_size: f32) -> Self {
        let label_row = (text_height + TEXT_PADDING).min(rect.height());
        let chart_rect = Rect::new(rect.min.x, rect.min.y + label_row, rect.max.x, rect.max.y);
        let chart = Chart::new(&config, chart_rect);

        Self {
            config,
            rect,
            text_height,
            font_size,
            chart,
            label: String::new(),
        }
    }

    /// Feed a raw value to the block's chart.
    pub fn update_value(&mut self, value: f32) {
        self.chart.add_value(value);
    }

    /// Draw the chart, then the label above it.
    pub fn draw(&mut self, canvas: &mut dyn Canvas) {
        self.chart.draw(canvas);
        self.format_label();

        let origin = Vec2::new(self.rect.min.x, self.rect.min.y + self.text_height);
        canvas.draw_text(&self.label, origin, self.font_size, self.config.text_color);
    }

    /// Label text as it would be drawn now, e.g. `"CPU: 4.25 ms"`.
    pub fn label_text(&self) -> String {
        let mut out = String::new();
        write_label(&mut out, &self.config, self.chart.latest());
        out
    }

    pub fn config(&self) -> &MetricConfig {
        &self.config
    }

    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    /// Full block rectangle, label row included.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn latest(&self) -> f32 {
        self.chart.latest()
    }

    /// Copy of the stored samples in storage order.
    pub fn history(&self) -> Vec<f32> {
        self.chart.history().snapshot()
    }

    fn format_label(&mut self) {
        self.label.clear();
        write_label(&mut self.label, &self.config, self.chart.latest());
    }
}

fn write_label(out: &mut String, config: &MetricConfig, value: f32) {
    // Writing into a String cannot fail
    let _ = if config.precise {
        write!(out, "{}: {:.2}", config.label, value)
    } else {
        write!(out, "{}: {}", config.label, value.trunc() as i64)
    };

    if let Some(unit) = config.unit.as_deref().filter(|u| !u.is_empty()) {
        out.push(' ');
        out.push_str(unit);
    }
}
