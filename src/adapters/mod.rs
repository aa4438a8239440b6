//! Concrete adapter implementations for ports.

pub mod clock_adapter;
pub mod file_config_adapter;
pub mod price_adapter;
pub mod script_adapter;
pub mod text_report_adapter;
