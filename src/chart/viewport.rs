// src/chart/viewport.rs
use std::ops::Range;

/// Zooming stops once this many samples are visible.
pub const MIN_VISIBLE: usize = 2;

/// Visible window over sample indices plus the cursor that picks the
/// thumbnail. Holds no data itself; every method takes the current buffer
/// length so it stays valid after replacements.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    start: usize,
    /// `None` shows everything.
    span: Option<usize>,
    /// `None` follows the newest sample.
    cursor: Option<usize>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { start: 0, span: None, cursor: None }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_zoomed(&self) -> bool {
        self.span.is_some()
    }

    pub fn range(&self, len: usize) -> Range<usize> {
        match self.span {
            None => 0..len,
            Some(span) => {
                let span = span.clamp(MIN_VISIBLE.min(len), len);
                let start = self.start.min(len - span);
                start..start + span
            }
        }
    }

    pub fn cursor(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.cursor.map_or(len - 1, |c| c.min(len - 1)))
    }

    /// Pull indices back inside the buffer after it changed size.
    pub fn clamp(&mut self, len: usize) {
        let range = self.range(len);
        self.start = range.start;
        if let Some(span) = self.span {
            if span >= len {
                self.span = None;
                self.start = 0;
            }
        }
        if let Some(c) = self.cursor {
            if len == 0 {
                self.cursor = None;
            } else {
                self.cursor = Some(c.min(len - 1));
            }
        }
    }

    pub fn zoom_in(&mut self, len: usize) {
        let visible = self.range(len).len();
        if visible <= MIN_VISIBLE {
            return;
        }
        let span = (visible / 2).max(MIN_VISIBLE);
        let center = self.cursor(len).unwrap_or(0);
        self.start = center.saturating_sub(span / 2).min(len - span);
        self.span = Some(span);
    }

    pub fn zoom_out(&mut self, len: usize) {
        let Some(span) = self.span else { return };
        let span = span.saturating_mul(2);
        if span >= len {
            self.reset();
            return;
        }
        let grow = span / 4;
        self.start = self.start.saturating_sub(grow).min(len - span);
        self.span = Some(span);
    }

    pub fn pan_left(&mut self, len: usize) {
        let range = self.range(len);
        let step = (range.len() / 4).max(1);
        self.start = range.start.saturating_sub(step);
        self.keep_cursor_visible(len);
    }

    pub fn pan_right(&mut self, len: usize) {
        let range = self.range(len);
        let step = (range.len() / 4).max(1);
        self.start = (range.start + step).min(len - range.len());
        self.keep_cursor_visible(len);
    }

    pub fn cursor_left(&mut self, len: usize) {
        if let Some(c) = self.cursor(len) {
            self.cursor = Some(c.saturating_sub(1));
            self.follow_cursor(len);
        }
    }

    pub fn cursor_right(&mut self, len: usize) {
        if let Some(c) = self.cursor(len) {
            if c + 1 >= len {
                // back to following the newest sample
                self.cursor = None;
            } else {
                self.cursor = Some(c + 1);
            }
            self.follow_cursor(len);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn keep_cursor_visible(&mut self, len: usize) {
        let range = self.range(len);
        if let Some(c) = self.cursor(len) {
            if !range.contains(&c) && !range.is_empty() {
                self.cursor = Some(c.clamp(range.start, range.end - 1));
            }
        }
    }

    fn follow_cursor(&mut self, len: usize) {
        let range = self.range(len);
        let Some(c) = self.cursor(len) else { return };
        if c < range.start {
            self.start = c;
        } else if c >= range.end {
            self.start = c + 1 - range.len();
        }
    }
}
