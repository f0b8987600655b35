pub mod cli;
pub mod configuration;
pub mod connectors;
pub mod errors;
pub mod forms;
pub mod helpers;
pub mod models;
pub mod routes;
pub mod session;
pub mod startup;
pub mod store;
pub mod stream;
pub mod telegram;
pub mod telemetry;
