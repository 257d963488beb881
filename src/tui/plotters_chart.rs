//! Plotters-powered attribution bar chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A render-only description of one horizontal bar per feature.
///
/// Bars and bounds are computed outside the render call.
pub struct AttributionChart<'a> {
    /// `(axis label, contribution)` top to bottom.
    pub bars: &'a [(&'static str, f64)],
    /// Symmetric x extent: the axis spans `[-x_bound, x_bound]`.
    pub x_bound: f64,
}

impl AttributionChart<'_> {
    /// Symmetric bound with a little headroom; falls back to `0.1` when all bars are zero.
    pub fn bound_for(bars: &[(&'static str, f64)]) -> f64 {
        let max = bars.iter().map(|(_, v)| v.abs()).fold(0.0_f64, f64::max);
        if max.is_finite() && max > 0.0 {
            max * 1.1
        } else {
            0.1
        }
    }
}

impl Widget for AttributionChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        if area.width < 30 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let bound = self.x_bound;
        if !bound.is_finite() || bound <= 0.0 || self.bars.is_empty() {
            return;
        }
        let n = self.bars.len() as i32;
        // Row 0 is drawn at the top.
        let bars: Vec<(i32, &'static str, f64)> = self
            .bars
            .iter()
            .enumerate()
            .map(|(i, &(label, v))| (n - 1 - i as i32, label, v))
            .collect();

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 12)
                .set_label_area_size(LabelAreaPosition::Bottom, 2)
                .build_cartesian_2d(-bound..bound, (0..n).into_segmented())?;

            let label_for = |v: &SegmentValue<i32>| match v {
                SegmentValue::CenterOf(row) => bars
                    .iter()
                    .find(|(r, _, _)| r == row)
                    .map(|(_, label, _)| label.to_string())
                    .unwrap_or_default(),
                _ => String::new(),
            };

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(5)
                .y_labels(bars.len())
                .x_label_formatter(&|v| format!("{v:+.2}"))
                .y_label_formatter(&label_for)
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .draw()?;

            let up = RGBColor(0x28, 0xa7, 0x45);
            let down = RGBColor(0xdc, 0x35, 0x45);

            chart.draw_series(bars.iter().map(|&(row, _, v)| {
                let color = if v < 0.0 { down } else { up };
                let corners = [
                    (0.0, SegmentValue::Exact(row)),
                    (v, SegmentValue::Exact(row + 1)),
                ];
                Rectangle::new(corners, color.filled())
            }))?;

            // Zero axis.
            let (bottom, top) = (SegmentValue::Exact(0), SegmentValue::Exact(n));
            chart.draw_series(LineSeries::new([(0.0, bottom), (0.0, top)], &WHITE))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
