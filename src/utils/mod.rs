pub mod exchange_factory;
pub mod logging;

pub use exchange_factory::{ExchangeFactory, ExchangeType};
pub use logging::{init_logging, try_init_logging, LogConfig, LogFormat, LogLevel};
