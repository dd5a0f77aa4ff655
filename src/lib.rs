pub mod browse;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod platform;
pub mod recorder;
pub mod report;
pub mod scan;
pub mod store;
pub mod util;

pub use error::{Error, Result};
