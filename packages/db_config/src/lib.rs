pub mod config;
pub mod env;
pub mod errors;
pub mod param;

pub use config::DbConfig;
pub use errors::DbConfigError;
pub use param::DbParam;
