pub mod app;
pub mod chart;
pub mod config;
pub mod error;
pub mod event;
pub mod poll;
pub mod ui;
pub mod util;

pub use chart::{ColorChart, DataBuffer, RenderBridge, SelectedChannel};
pub use config::ChartConfig;
pub use poll::{PollHandle, PollLoop, PollSource};
