pub mod calendar;
pub mod clock;
pub mod config;
pub mod datetime;
pub mod error;
pub mod hal;
pub mod models;
pub mod routes;
pub mod scheduler;
pub mod startup;
pub mod store;
pub mod telemetry;
pub mod validation;
