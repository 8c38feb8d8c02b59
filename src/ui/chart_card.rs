// src/ui/chart_card.rs
use chrono::{DateTime, Local, Utc};
use ratatui::buffer::Buffer;
use ratatui::prelude::*;
use ratatui::symbols;
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget};

use crate::chart::sample::epoch_seconds;
use crate::chart::{ColorChart, TerminalBridge};
use crate::ui::style;

const TIME_FORMAT: &str = "%H:%M:%S";

struct ViewData {
    line_points: Vec<(f64, f64)>,
    cursor_point: Option<(f64, f64)>,
    x_labels: Vec<String>,
    y_labels: Vec<String>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    y_label: String,
    background: Color,
}

fn format_time(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format(TIME_FORMAT).to_string()
}

fn get_view_data(chart: &ColorChart<TerminalBridge>) -> Option<ViewData> {
    let buffer = chart.buffer();
    let len = buffer.len();
    let range = chart.viewport().range(len);
    if range.is_empty() {
        return None;
    }

    let values = chart.plotted();
    let timestamps = buffer.timestamps();

    let line_points: Vec<(f64, f64)> = range
        .clone()
        .filter(|&i| values[i].is_finite())
        .map(|i| (epoch_seconds(&timestamps[i]), values[i]))
        .collect();

    let cursor_point = chart
        .viewport()
        .cursor(len)
        .filter(|c| range.contains(c) && values[*c].is_finite())
        .map(|c| (epoch_seconds(&timestamps[c]), values[c]));

    let (t_min, t_max) = buffer.time_bounds(range.clone())?;
    let x_min = epoch_seconds(&t_min);
    // a single sample still needs a non-empty axis
    let x_max = epoch_seconds(&t_max).max(x_min + 1.0);
    let t_mid = t_min + (t_max - t_min) / 2;

    let (min_y, max_y) = buffer
        .value_bounds(chart.channel(), range)
        .unwrap_or((0.0, 1.0));
    let y_range = (max_y - min_y).max(1.0);
    let y_padding = y_range * 0.1;
    let y_min = min_y - y_padding;
    let y_max = max_y + y_padding;

    let background = if chart.background().opaque {
        let (r, g, b) = chart.background().rgb;
        Color::Rgb(r, g, b)
    } else {
        Color::Reset
    };

    Some(ViewData {
        line_points,
        cursor_point,
        x_labels: vec![format_time(&t_min), format_time(&t_mid), format_time(&t_max)],
        y_labels: vec![
            format!("{:.1}", y_min),
            format!("{:.1}", (y_min + y_max) / 2.0),
            format!("{:.1}", y_max),
        ],
        x_bounds: [x_min, x_max],
        y_bounds: [y_min, y_max],
        y_label: chart.bridge().y_label().to_string(),
        background,
    })
}

/// Draw the time series for the selected channel.
pub fn render_chart(chart: &ColorChart<TerminalBridge>, title: &str, area: Rect, buf: &mut Buffer) {
    let zoom_hint = if chart.viewport().is_zoomed() { " [zoomed]" } else { "" };
    let block = Block::default()
        .title(format!(" {}{} ", title, zoom_hint))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(style::BORDER));

    let Some(ViewData {
        line_points,
        cursor_point,
        x_labels,
        y_labels,
        x_bounds,
        y_bounds,
        y_label,
        background,
    }) = get_view_data(chart)
    else {
        let inner = block.inner(area);
        block.render(area, buf);
        Paragraph::new("Waiting for samples...")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center)
            .render(inner, buf);
        return;
    };

    let cursor_points: Vec<(f64, f64)> = cursor_point.into_iter().collect();

    let x_axis = Axis::default()
        .title("Time")
        .style(Style::default().fg(Color::Gray))
        .labels(x_labels)
        .bounds(x_bounds);

    let y_axis = Axis::default()
        .title(y_label.clone())
        .style(Style::default().fg(Color::Gray))
        .labels(y_labels)
        .bounds(y_bounds);

    let datasets = vec![
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(style::LINE))
            .data(&line_points),
        Dataset::default()
            .name(y_label)
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(style::POINT))
            .data(&line_points),
        Dataset::default()
            .marker(symbols::Marker::Block)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(style::CURSOR))
            .data(&cursor_points),
    ];

    let chart_widget = Chart::new(datasets)
        .block(block)
        .style(Style::default().bg(background))
        .x_axis(x_axis)
        .y_axis(y_axis);

    Widget::render(chart_widget, area, buf);
}
