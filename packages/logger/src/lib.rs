pub mod logs;

pub use logs::{init, try_init, LogFormat, SerdeLogging};
