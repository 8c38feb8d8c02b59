use color_eyre::Result;
use ratatui::{
    DefaultTerminal,
    crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
};
use ratatui_image::picker::Picker;
use throbber_widgets_tui::ThrobberState;
use tokio::sync::{mpsc, watch};

use crate::chart::{ApplyOutcome, ColorChart, SelectedChannel, TerminalBridge};
use crate::config::ChartConfig;
use crate::event::{AppEvent, Event, EventHandler};
use crate::poll::{
    ChartChannel, HttpPollSource, PollHandle, PollLoop, PollMessage, PollSource, PollState, PollStatus,
    SyntheticSource,
};
use crate::ui::channel_menu::ChannelMenu;
use crate::ui::thumbnail::ThumbnailLoader;
use crate::{log_debug, log_error, log_info};

/// Application.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    pub running: bool,
    pub config: ChartConfig,
    /// The chart widget; only ever mutated from this struct's event loop.
    pub chart: ColorChart<TerminalBridge>,
    pub menu: ChannelMenu,
    pub thumbnails: ThumbnailLoader,
    /// Event handler.
    pub events: EventHandler,
    /// Payloads from the poll task, each waiting for our ack.
    pub poll_rx: mpsc::UnboundedReceiver<PollMessage>,
    pub poll_status: watch::Receiver<PollStatus>,
    poll_handle: Option<PollHandle>,
    /// Status bar spinner, advanced on ticks while a fetch is in flight.
    pub throbber: ThrobberState,
    /// Last payload the chart refused, shown in the status bar.
    pub last_rejection: Option<String>,
}

impl App {
    /// Constructs a new instance of [`App`] polling whatever the config points at.
    pub fn new(config: ChartConfig, picker: Option<Picker>) -> Result<Self> {
        let events = EventHandler::new();
        if config.demo {
            log_info!("Demo mode: using synthetic samples");
            Self::with_source(config, SyntheticSource::new(), picker, events)
        } else {
            let source = HttpPollSource::from_config(&config)?;
            log_info!("Polling {}", source.url());
            Self::with_source(config, source, picker, events)
        }
    }

    pub fn with_source<S: PollSource + 'static>(
        config: ChartConfig,
        source: S,
        picker: Option<Picker>,
        events: EventHandler,
    ) -> Result<Self> {
        let mut chart = ColorChart::with_channel(TerminalBridge::new(), config.initial_channel);
        let [r, g, b] = config.background;
        chart.set_background_color(r, g, b);

        let thumbnails = ThumbnailLoader::new(&config.base_url, config.request_timeout(), picker)?;

        let (sink, poll_rx) = ChartChannel::new();
        let poll_loop = PollLoop::new(source, config.poll_interval());
        let poll_status = poll_loop.status();
        let poll_handle = poll_loop.spawn(sink);

        Ok(Self {
            running: true,
            config,
            chart,
            menu: ChannelMenu::default(),
            thumbnails,
            events,
            poll_rx,
            poll_status,
            poll_handle: Some(poll_handle),
            throbber: ThrobberState::default(),
            last_rejection: None,
        })
    }

    /// Run the application's main loop.
    pub async fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        let mut needs_redraw = true;

        while self.running {
            if needs_redraw {
                terminal.draw(|frame| frame.render_widget(&mut self, frame.area()))?;
                needs_redraw = false;
            }

            tokio::select! {
                event = self.events.next() => {
                    match event? {
                        Event::Tick => needs_redraw = self.tick(),
                        Event::Crossterm(crossterm::event::Event::Key(key_event)) => {
                            self.handle_key_events(key_event)?;
                        }
                        Event::Crossterm(crossterm::event::Event::Resize(_, _)) => needs_redraw = true,
                        Event::Crossterm(_) => {}
                        Event::App(app_event) => {
                            self.handle_app_event(app_event);
                            needs_redraw = true;
                        }
                    }
                }
                message = self.poll_rx.recv() => {
                    if let Some(message) = message {
                        self.handle_poll_message(message);
                        needs_redraw = true;
                    }
                }
            }
        }

        self.shutdown().await;
        Ok(())
    }

    /// Stop polling. The chart is left as it was.
    pub async fn shutdown(&mut self) {
        if let Some(handle) = self.poll_handle.take() {
            handle.shutdown().await;
            log_info!("Poll loop stopped");
        }
    }

    /// Handles the key events and updates the state of [`App`].
    pub fn handle_key_events(&mut self, key_event: KeyEvent) -> Result<()> {
        if key_event.kind != KeyEventKind::Press {
            return Ok(());
        }

        if key_event.code == KeyCode::Char('c') && key_event.modifiers == KeyModifiers::CONTROL {
            self.events.send(AppEvent::Quit);
            return Ok(());
        }

        if self.menu.is_open() {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('c') => self.events.send(AppEvent::CloseChannelMenu),
                KeyCode::Up | KeyCode::Char('k') => self.events.send(AppEvent::MenuUp),
                KeyCode::Down | KeyCode::Char('j') => self.events.send(AppEvent::MenuDown),
                KeyCode::Enter | KeyCode::Char(' ') => self.events.send(AppEvent::MenuConfirm),
                _ => {}
            }
            return Ok(());
        }

        match key_event.code {
            KeyCode::Esc | KeyCode::Char('q') => self.events.send(AppEvent::Quit),
            KeyCode::Char('c') => self.events.send(AppEvent::OpenChannelMenu),
            KeyCode::Char(digit @ '1'..='5') => {
                let index = digit as usize - '1' as usize;
                self.events.send(AppEvent::SelectChannel(SelectedChannel::MENU[index]));
            }
            KeyCode::Char('s') => self.events.send(AppEvent::SelectChannel(SelectedChannel::Saturation)),
            KeyCode::Left => self.events.send(AppEvent::CursorLeft),
            KeyCode::Right => self.events.send(AppEvent::CursorRight),
            KeyCode::Char('h') => self.events.send(AppEvent::PanLeft),
            KeyCode::Char('l') => self.events.send(AppEvent::PanRight),
            KeyCode::Char('+' | '=') => self.events.send(AppEvent::ZoomIn),
            KeyCode::Char('-') => self.events.send(AppEvent::ZoomOut),
            KeyCode::Char('0') => self.events.send(AppEvent::ResetView),
            KeyCode::Char('r') => self.events.send(AppEvent::Redraw),
            _ => {}
        }
        Ok(())
    }

    pub fn handle_app_event(&mut self, app_event: AppEvent) {
        log_debug!("app event: {:?}", app_event);
        match app_event {
            AppEvent::Quit => self.quit(),
            AppEvent::Redraw => self.chart.bridge_mut().request_redraw(),
            AppEvent::OpenChannelMenu => self.menu.open(self.chart.channel()),
            AppEvent::CloseChannelMenu => self.menu.close(),
            AppEvent::MenuUp => self.menu.up(),
            AppEvent::MenuDown => self.menu.down(),
            AppEvent::MenuConfirm => {
                let channel = self.menu.confirm();
                self.chart.select_channel(channel);
            }
            AppEvent::SelectChannel(channel) => {
                self.chart.select_channel(channel);
            }
            AppEvent::CursorLeft => self.with_viewport(|view, len| view.cursor_left(len)),
            AppEvent::CursorRight => self.with_viewport(|view, len| view.cursor_right(len)),
            AppEvent::PanLeft => self.with_viewport(|view, len| view.pan_left(len)),
            AppEvent::PanRight => self.with_viewport(|view, len| view.pan_right(len)),
            AppEvent::ZoomIn => self.with_viewport(|view, len| view.zoom_in(len)),
            AppEvent::ZoomOut => self.with_viewport(|view, len| view.zoom_out(len)),
            AppEvent::ResetView => self.with_viewport(|view, _| view.reset()),
        }
    }

    fn with_viewport(&mut self, f: impl FnOnce(&mut crate::chart::Viewport, usize)) {
        let (view, len) = self.chart.viewport_mut();
        f(view, len);
        self.request_cursor_thumbnail();
    }

    /// Apply a polled payload and release the poll loop.
    pub fn handle_poll_message(&mut self, message: PollMessage) {
        match message.apply_to(&mut self.chart) {
            Ok(ApplyOutcome::Replaced(len)) => {
                log_debug!(
                    "chart now holds {} samples, newest {}",
                    len,
                    self.chart.buffer().ids().last().map(String::as_str).unwrap_or("-")
                );
                self.last_rejection = None;
                self.request_cursor_thumbnail();
            }
            Ok(ApplyOutcome::Unchanged(_)) => {}
            Err(e) => {
                log_error!("Payload rejected: {}", e);
                self.last_rejection = Some(e.to_string());
            }
        }
    }

    pub fn request_cursor_thumbnail(&mut self) {
        let len = self.chart.buffer().len();
        let Some(index) = self.chart.viewport().cursor(len) else { return };
        if let Some(url) = self.chart.buffer().image_urls().get(index).cloned() {
            self.thumbnails.request(&url);
        }
    }

    /// Handles the tick event of the terminal. Returns whether anything needs drawing.
    pub fn tick(&mut self) -> bool {
        let mut redraw = self.thumbnails.process_messages();
        if self.poll_status.borrow().state == PollState::Fetching {
            self.throbber.calc_next();
            redraw = true;
        }
        if self.poll_status.has_changed().unwrap_or(false) {
            let _ = self.poll_status.borrow_and_update();
            redraw = true;
        }
        redraw | self.chart.bridge_mut().take_redraw()
    }

    /// Set running to false to quit the application.
    pub fn quit(&mut self) {
        self.running = false;
    }
}
