pub mod entities;
pub mod error;
pub mod flash;
pub mod forms;
pub mod metrics;
pub mod migrator;
pub mod render;
pub mod repo;
pub mod storage;
pub mod telemetry;
pub mod web;
