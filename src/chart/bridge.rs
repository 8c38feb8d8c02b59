// src/chart/bridge.rs

/// What the chart tells whoever draws it. The drawing side reads the data
/// straight from the chart when it renders; the bridge only carries "something
/// changed" and the axis label.
pub trait RenderBridge {
    fn notify_data_changed(&mut self);
    fn set_y_axis_label(&mut self, label: &str);
}

/// Bridge for the ratatui front end.
#[derive(Debug, Default, Clone)]
pub struct TerminalBridge {
    revision: u64,
    y_label: String,
    needs_redraw: bool,
}

impl TerminalBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bumped on every data notification.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn y_label(&self) -> &str {
        &self.y_label
    }

    pub fn request_redraw(&mut self) {
        self.needs_redraw = true;
    }

    /// Returns whether a redraw was requested since the last call, and clears it.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }
}

impl RenderBridge for TerminalBridge {
    fn notify_data_changed(&mut self) {
        self.revision = self.revision.wrapping_add(1);
        self.needs_redraw = true;
    }

    fn set_y_axis_label(&mut self, label: &str) {
        if self.y_label != label {
            self.y_label = label.to_string();
            self.needs_redraw = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redraw_flag_is_drained_once() {
        let mut bridge = TerminalBridge::new();
        assert!(!bridge.take_redraw());

        bridge.notify_data_changed();
        bridge.notify_data_changed();
        assert_eq!(bridge.revision(), 2);
        assert!(bridge.take_redraw());
        assert!(!bridge.take_redraw());
    }

    #[test]
    fn test_same_label_does_not_request_redraw() {
        let mut bridge = TerminalBridge::new();
        bridge.set_y_axis_label("Hue");
        assert!(bridge.take_redraw());

        bridge.set_y_axis_label("Hue");
        assert!(!bridge.take_redraw());
        assert_eq!(bridge.y_label(), "Hue");
    }
}
