pub mod auth;
pub mod cli;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod settings;
pub mod storage;

pub use error::DashboardError;
