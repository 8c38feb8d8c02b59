pub mod channel_menu;
pub mod chart_card;
pub mod style;
pub mod thumbnail;

use chrono::Local;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use throbber_widgets_tui::{Throbber, WhichUse, BRAILLE_EIGHT};

use crate::app::App;
use crate::chart::{Sample, SelectedChannel};
use crate::poll::PollState;
use crate::ui::thumbnail::Thumbnail;

const SIDE_PANEL_WIDTH: u16 = 34;
const HELP: &str = " c channel · 1-5 pick · ←/→ cursor · h/l pan · +/- zoom · 0 reset · q quit ";

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // status
                Constraint::Min(8),    // chart + side panel
                Constraint::Length(1), // help
            ])
            .split(area);

        render_status(self, rows[0], buf);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(30), Constraint::Length(SIDE_PANEL_WIDTH)])
            .split(rows[1]);

        chart_card::render_chart(&self.chart, &self.config.title, body[0], buf);
        render_side_panel(self, body[1], buf);

        Paragraph::new(HELP)
            .style(Style::default().fg(style::MUTED))
            .render(rows[2], buf);

        if self.menu.is_open() {
            let popup = centered_rect(30, 40, area);
            self.menu.render(popup, buf);
        }
    }
}

fn render_status(app: &App, area: Rect, buf: &mut Buffer) {
    let status = app.poll_status.borrow().clone();

    let (symbol, state) = match status.state {
        PollState::Fetching => (
            Throbber::default()
                .throbber_set(BRAILLE_EIGHT)
                .use_type(WhichUse::Spin)
                .throbber_style(Style::default().fg(style::CURSOR))
                .to_symbol_span(&app.throbber),
            "fetching",
        ),
        PollState::Applying => (Span::raw("·"), "applying"),
        PollState::Failed => (Span::styled("✗", Style::default().fg(style::ERROR)), "failed"),
        PollState::Idle => (Span::raw("·"), "idle"),
    };

    let mut spans = vec![
        Span::styled(format!(" {} ", app.config.title), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        symbol,
        Span::raw(format!(" {} │ {} samples │ {} polls ", state, app.chart.buffer().len(), status.cycles)),
    ];

    if let Some(error) = status.last_error.as_ref().or(app.last_rejection.as_ref()) {
        spans.push(Span::styled(format!("│ {} ", error), Style::default().fg(style::ERROR)));
    }

    Paragraph::new(Line::from(spans)).render(area, buf);
}

fn render_side_panel(app: &mut App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(11), Constraint::Min(4)])
        .split(area);

    let len = app.chart.buffer().len();
    let sample = app
        .chart
        .viewport()
        .cursor(len)
        .and_then(|i| app.chart.buffer().sample(i).map(|s| (i, s)));

    let details = Block::default().title(" Sample ").borders(Borders::ALL);
    let lines = match &sample {
        Some((index, sample)) => sample_lines(*index, len, sample, app.chart.channel()),
        None => vec![Line::from("no sample selected")],
    };
    Paragraph::new(lines).block(details).render(chunks[0], buf);

    let thumb_block = Block::default().title(" Thumbnail ").borders(Borders::ALL);
    let inner = thumb_block.inner(chunks[1]);
    thumb_block.render(chunks[1], buf);

    let url = sample.map(|(_, s)| s.image_url).unwrap_or_default();
    let placeholder = if url.is_empty() {
        "no image"
    } else if !app.thumbnails.supports_images() {
        "terminal can't show images"
    } else {
        match app.thumbnails.get_mut(&url) {
            Some(Thumbnail::Ready(renderer)) => {
                renderer.render(inner, buf);
                return;
            }
            Some(Thumbnail::Failed(_)) => "image failed to load",
            Some(Thumbnail::Loading) | None => "loading...",
        }
    };

    Paragraph::new(placeholder)
        .style(Style::default().fg(style::MUTED))
        .alignment(Alignment::Center)
        .render(inner, buf);
}

fn sample_lines(index: usize, len: usize, sample: &Sample, selected: SelectedChannel) -> Vec<Line<'static>> {
    let metric = |channel: SelectedChannel, value: f64| {
        let style = if channel == selected {
            Style::default().fg(style::CURSOR).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Line::from(Span::styled(format!("{:<11}{:>10.3}", channel.label(), value), style))
    };

    vec![
        Line::from(format!("#{} of {}", index + 1, len)),
        Line::from(sample.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()),
        Line::from(Span::styled(sample.id.clone(), Style::default().fg(Color::DarkGray))),
        metric(SelectedChannel::Luminance, sample.luminance),
        metric(SelectedChannel::Saturation, sample.saturation),
        metric(SelectedChannel::Chroma, sample.chroma),
        metric(SelectedChannel::Hue, sample.hue),
        metric(SelectedChannel::ChannelA, sample.channel_a),
        metric(SelectedChannel::ChannelB, sample.channel_b),
    ]
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
