//! Terminal helpers: spinners, styling and logging setup

pub mod logging;
pub mod progress;
pub mod styling;

pub use logging::*;
pub use progress::*;
pub use styling::*;
