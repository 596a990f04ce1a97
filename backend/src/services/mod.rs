//! Business logic services
//!
//! Services wrap the shared engine with configuration defaults and render
//! its output for the API.

pub mod calculation;
pub mod export;

pub use calculation::CalculationService;
pub use export::ExportService;
