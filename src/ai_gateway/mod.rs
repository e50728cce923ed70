pub mod adapters;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod reliability;
pub mod telemetry;
pub mod types;
