//! Chart renderers.
//!
//! A [`Chart`] owns the aggregation state and history of one metric and turns
//! the normalized history into drawing calls. The three shapes form a closed
//! set and are dispatched with a `match` on [`ChartKind`].

use bevy::{
    color::Color,
    math::{Rect, Vec2},
};

use crate::{
    aggregator::SampleAggregator,
    canvas::{Canvas, Paint, Path},
    config::{ChartKind, MetricConfig},
    constants::{CHART_CORNER_RADIUS, CHART_INSET, LINE_STROKE_WIDTH},
    history::HistoryBuffer,
    normalize::normalize_into,
};

/// History, aggregation and drawing of one metric's chart.
#[derive(Debug, Clone)]
pub struct Chart {
    kind: ChartKind,
    rect: Rect,
    chart_color: Color,
    background_color: Color,
    aggregator: SampleAggregator,
    history: HistoryBuffer,
    // Reused between draws to avoid per-frame allocations
    scratch_values: Vec<f32>,
    scratch_heights: Vec<f32>,
}

impl Chart {
    /// Build a chart for `config` drawn inside `rect`.
    pub fn new(config: &MetricConfig, rect: Rect) -> Self {
        Self {
            kind: config.chart,
            rect,
            chart_color: config.chart_color,
            background_color: config.background_color,
            aggregator: SampleAggregator::new(config.sample_mode, config.skip_warmup),
            history: HistoryBuffer::new(config.max_values, config.history),
            scratch_values: Vec::with_capacity(config.max_values),
            scratch_heights: Vec::with_capacity(config.max_values),
        }
    }

    /// Feed a raw value; stores a sample when the aggregator emits one.
    pub fn add_value(&mut self, value: f32) {
        if let Some(sample) = self.aggregator.push(value) {
            self.history.push(sample);
        }
    }

    /// Most recently emitted sample.
    pub fn latest(&self) -> f32 {
        self.aggregator.latest()
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Draw the background followed by the chart shape.
    pub fn draw(&mut self, canvas: &mut dyn Canvas) {
        canvas.fill_round_rect(self.rect, CHART_CORNER_RADIUS, self.background_color);

        self.history.copy_into(&mut self.scratch_values);
        let top = CHART_INSET.min(self.rect.height() * 0.5);
        let bottom = (self.rect.height() - CHART_INSET).max(top);
        normalize_into(&self.scratch_values, top, bottom, &mut self.scratch_heights);

        let capacity = self.history.capacity();
        match self.kind {
            ChartKind::Bars => {
                draw_bars(canvas, self.rect, capacity, &self.scratch_heights, self.chart_color)
            }
            ChartKind::Line => {
                if let Some(path) = polyline(self.rect, capacity, &self.scratch_heights) {
                    canvas.draw_path(&path, &Paint::stroke(self.chart_color, LINE_STROKE_WIDTH));
                }
            }
            ChartKind::Hills => {
                if let Some(path) = hills(self.rect, capacity, &self.scratch_heights) {
                    canvas.draw_path(&path, &Paint::fill(self.chart_color));
                }
            }
        }
    }
}

fn draw_bars(canvas: &mut dyn Canvas, rect: Rect, capacity: usize, heights: &[f32], color: Color) {
    if capacity == 0 {
        return;
    }
    let bar_width = rect.width() / capacity as f32;
    let bottom = rect.max.y;

    for (i, &height) in heights.iter().enumerate() {
        let left = rect.min.x + bar_width * i as f32;
        canvas.fill_rect(Rect::new(left, bottom - height, left + bar_width, bottom), color);
    }
}

/// Horizontal distance between two consecutive points of a line chart.
fn point_step(rect: Rect, capacity: usize) -> f32 {
    if capacity > 1 {
        rect.width() / (capacity - 1) as f32
    } else {
        rect.width()
    }
}

fn point(rect: Rect, step: f32, index: usize, height: f32) -> Vec2 {
    Vec2::new(rect.min.x + step * index as f32, rect.max.y - height)
}

fn polyline(rect: Rect, capacity: usize, heights: &[f32]) -> Option<Path> {
    if heights.len() < 2 {
        return None;
    }
    let step = point_step(rect, capacity);
    let mut path = Path::with_capacity(heights.len());

    path.move_to(point(rect, step, 0, heights[0]));
    for (i, &height) in heights.iter().enumerate().skip(1) {
        path.line_to(point(rect, step, i, height));
    }
    Some(path)
}

fn hills(rect: Rect, capacity: usize, heights: &[f32]) -> Option<Path> {
    if heights.len() < 2 {
        return None;
    }
    let step = point_step(rect, capacity);
    let baseline = rect.max.y;
    let last = heights.len() - 1;
    let mut path = Path::with_capacity(heights.len() + 3);

    path.move_to(Vec2::new(rect.min.x, baseline));
    for (i, &height) in heights.iter().enumerate() {
        path.line_to(point(rect, step, i, height));
    }
    path.line_to(Vec2::new(rect.min.x + step * last as f32, baseline));
    path.close();
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        canvas::{DrawCommand, DrawList, PaintStyle, PathVerb},
        config::SampleMode,
        history::HistoryPolicy,
    };

    fn chart(kind: ChartKind, capacity: usize) -> Chart {
        let config = MetricConfig::new("test")
            .with_chart(kind)
            .with_sample_mode(SampleMode::EachValue)
            .with_history(capacity, HistoryPolicy::Continuous);
        Chart::new(&config, Rect::new(10.0, 20.0, 110.0, 60.0))
    }

    fn record(chart: &mut Chart) -> Vec<DrawCommand> {
        let mut list = DrawList::new(Vec2::new(200.0, 100.0));
        chart.draw(&mut list);
        list.commands().to_vec()
    }

    #[test]
    fn empty_history_draws_background_only() {
        for kind in [ChartKind::Bars, ChartKind::Line, ChartKind::Hills] {
            let commands = record(&mut chart(kind, 10));
            assert_eq!(commands.len(), 1, "{kind:?}");
            assert!(matches!(commands[0], DrawCommand::RoundRect { .. }));
        }
    }

    #[test]
    fn single_sample_does_not_fail() {
        let mut bars = chart(ChartKind::Bars, 10);
        bars.add_value(5.0);
        assert_eq!(record(&mut bars).len(), 2);

        for kind in [ChartKind::Line, ChartKind::Hills] {
            let mut c = chart(kind, 10);
            c.add_value(5.0);
            assert_eq!(record(&mut c).len(), 1, "{kind:?}");
        }
    }

    #[test]
    fn bars_are_bottom_anchored_with_uniform_width() {
        let mut c = chart(ChartKind::Bars, 4);
        for v in [0.0, 10.0] {
            c.add_value(v);
        }
        let commands = record(&mut c);
        assert_eq!(commands.len(), 3);

        let DrawCommand::Rect { rect: low, .. } = &commands[1] else {
            panic!("expected bar");
        };
        let DrawCommand::Rect { rect: high, .. } = &commands[2] else {
            panic!("expected bar");
        };
        assert_eq!(low.width(), 25.0);
        assert_eq!(low.min.x, 10.0);
        assert_eq!(high.min.x, 35.0);
        assert_eq!(low.max.y, 60.0);
        assert_eq!(high.max.y, 60.0);
        // normalized into [2, height - 2]
        assert_eq!(low.height(), 2.0);
        assert_eq!(high.height(), 38.0);
    }

    #[test]
    fn line_is_one_stroked_path() {
        let mut c = chart(ChartKind::Line, 5);
        for v in [1.0, 2.0, 3.0] {
            c.add_value(v);
        }
        let commands = record(&mut c);
        assert_eq!(commands.len(), 2);
        let DrawCommand::Path { path, paint } = &commands[1] else {
            panic!("expected path");
        };
        assert!(matches!(paint.style, PaintStyle::Stroke { .. }));
        assert_eq!(path.point_count(), 3);
        assert_eq!(path.verbs()[0], PathVerb::MoveTo(Vec2::new(10.0, 58.0)));
        assert_eq!(path.verbs()[2], PathVerb::LineTo(Vec2::new(60.0, 22.0)));
    }

    #[test]
    fn hills_close_to_baseline_and_fill() {
        let mut c = chart(ChartKind::Hills, 3);
        for v in [4.0, 8.0, 6.0] {
            c.add_value(v);
        }
        let commands = record(&mut c);
        let DrawCommand::Path { path, paint } = &commands[1] else {
            panic!("expected path");
        };
        assert_eq!(paint.style, PaintStyle::Fill);
        let verbs = path.verbs();
        assert_eq!(verbs.first(), Some(&PathVerb::MoveTo(Vec2::new(10.0, 60.0))));
        assert_eq!(verbs[verbs.len() - 2], PathVerb::LineTo(Vec2::new(110.0, 60.0)));
        assert_eq!(verbs.last(), Some(&PathVerb::Close));
    }

    #[test]
    fn flat_history_draws_finite_geometry() {
        let mut c = chart(ChartKind::Hills, 8);
        for _ in 0..8 {
            c.add_value(3.0);
        }
        for command in record(&mut c) {
            if let DrawCommand::Path { path, .. } = command {
                for verb in path.verbs() {
                    if let PathVerb::MoveTo(p) | PathVerb::LineTo(p) = verb {
                        assert!(p.is_finite());
                    }
                }
            }
        }
    }

    #[test]
    fn latest_tracks_emitted_sample() {
        let mut c = chart(ChartKind::Bars, 4);
        c.add_value(12.5);
        assert_eq!(c.latest(), 12.5);
        assert_eq!(c.history().snapshot(), vec![12.5]);
    }
}
