mod config;
mod logging;

#[cfg(any(test, feature = "test"))]
pub mod test;

pub use config::{ConfigError, read_toml, write_toml};
pub use logging::init_logging;
