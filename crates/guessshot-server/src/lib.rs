//! Runtime pieces of the GuessShot server: configuration, locale tables,
//! outbound chat transports, and the daily broadcast scheduler.

pub mod config;
pub mod locale;
pub mod scheduler;
pub mod transport;

pub use config::ServerConfig;
