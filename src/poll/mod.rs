pub mod payload;
pub mod poll_loop;
pub mod source;
pub mod synthetic;

pub use payload::{RawSamplePayload, ScreenshotResponse};
pub use poll_loop::{
    ChartChannel, CycleOutcome, PollHandle, PollLoop, PollMessage, PollSink, PollState, PollStatus,
};
pub use source::{HttpPollSource, PollSource};
pub use synthetic::SyntheticSource;
