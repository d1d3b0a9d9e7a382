pub mod error;
pub mod log_export;
pub mod logger;
pub mod monitor;
pub mod validation;
