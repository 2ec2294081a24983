pub mod steps;
pub mod wait;

pub use steps::{handle_login, publish_and_wait, PostVariant};
pub use wait::{poll_until, PublishSignal, WaitPolicy};
