mod config;
mod logging;

pub use config::Config;
pub use logging::init as init_logging;
