pub mod charts;
pub mod cli;
pub mod config;
pub mod insights;
pub mod metrics;
pub mod pipeline;
pub mod render;
pub mod report;
pub mod store;
pub mod util;
