pub mod bridge;
pub mod buffer;
pub mod channel;
pub mod color_chart;
pub mod sample;
pub mod viewport;

pub use bridge::{RenderBridge, TerminalBridge};
pub use buffer::{DataBuffer, SampleColumns};
pub use channel::SelectedChannel;
pub use color_chart::{ApplyOutcome, Background, ColorChart};
pub use sample::{Sample, WireTimestamp};
pub use viewport::Viewport;
