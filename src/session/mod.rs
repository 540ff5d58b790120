// Multi-channel session state: registry, navigation, command parsing,
// message formatting, and the controller that ties them together.

pub mod command;
pub mod controller;
pub mod format;
pub mod navigator;
pub mod registry;

pub use controller::{SessionController, SessionState, SetupOutcome, SetupPhase};
pub use registry::ChannelStatus;
