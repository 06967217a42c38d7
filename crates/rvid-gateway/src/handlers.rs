//! Request handlers.

pub mod health;
pub mod jobs;
pub mod stats;
pub mod video;

pub use health::*;
pub use jobs::*;
pub use stats::*;
pub use video::*;
