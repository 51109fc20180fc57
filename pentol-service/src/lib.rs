pub mod configuration;
pub mod error;
pub mod model;
pub mod routes;
pub mod startup;
pub mod store;
pub mod telemetry;
pub mod transaction_log;

pub use startup::run;
