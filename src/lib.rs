pub mod ai_gateway;
pub mod cli;
pub mod config;
pub mod insights;
pub mod lfa;
pub mod logging;
pub mod server;
