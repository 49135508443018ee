//! Report types and the service that builds them from violation queries.

pub mod dto;
pub mod service;

pub use dto::{CameraPopularityRow, DriverOffenseReportRow, SummaryStatisticsRow, TopDriverRow};
pub use service::ViolationService;
