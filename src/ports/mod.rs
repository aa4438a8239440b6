//! Port traits the domain depends on.

pub mod clock_port;
pub mod config_port;
pub mod price_port;
pub mod report_port;
