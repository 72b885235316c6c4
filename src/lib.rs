mod common;
mod features;

pub mod app;
pub mod config;
pub mod data_model;
pub mod logging;
pub mod metrics;
pub mod metrics_aggregate;
pub mod probe;
pub mod probe_engine;
pub mod runtime;
pub mod settings;
pub mod ui;
