// src/ui/channel_menu.rs
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, StatefulWidget, Widget},
};

use crate::chart::SelectedChannel;
use crate::ui::style::dim_unless_focused;

/// The "Select Channel" dropdown.
#[derive(Debug, Default)]
pub struct ChannelMenu {
    open: bool,
    list_state: ListState,
}

impl ChannelMenu {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Opens with the current channel highlighted (or the first entry if it
    /// isn't in the menu).
    pub fn open(&mut self, current: SelectedChannel) {
        let index = SelectedChannel::MENU
            .iter()
            .position(|c| *c == current)
            .unwrap_or(0);
        self.list_state.select(Some(index));
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn up(&mut self) {
        let len = SelectedChannel::MENU.len();
        let index = self.list_state.selected().unwrap_or(0);
        self.list_state.select(Some((index + len - 1) % len));
    }

    pub fn down(&mut self) {
        let len = SelectedChannel::MENU.len();
        let index = self.list_state.selected().unwrap_or(0);
        self.list_state.select(Some((index + 1) % len));
    }

    pub fn highlighted(&self) -> SelectedChannel {
        self.list_state
            .selected()
            .and_then(|i| SelectedChannel::MENU.get(i).copied())
            .unwrap_or_default()
    }

    /// Closes the menu and returns the highlighted channel.
    pub fn confirm(&mut self) -> SelectedChannel {
        self.open = false;
        self.highlighted()
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer) {
        if !self.open {
            return;
        }
        let selected = self.list_state.selected();
        let items: Vec<ListItem> = SelectedChannel::MENU
            .iter()
            .enumerate()
            .map(|(i, channel)| {
                let focused = selected == Some(i);
                ListItem::new(format!(" {}  {}", i + 1, channel.label()))
                    .style(dim_unless_focused(focused, Style::default().fg(Color::White)))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title(" Select Channel ")
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::Yellow)),
            )
            .highlight_symbol("▶ ");

        Clear.render(area, buf);
        StatefulWidget::render(list, area, buf, &mut self.list_state);
    }
}
