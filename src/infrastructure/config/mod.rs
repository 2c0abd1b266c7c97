//! Infrastructure configuration modules.

pub mod display;
pub mod feed;
pub mod logging;
pub mod reconnection;
pub mod settings;

pub use settings::Config;
