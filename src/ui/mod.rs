pub mod charts;
pub mod dashboard;
pub mod format;
pub mod metrics;
pub mod panels;
