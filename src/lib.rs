pub mod db;
pub mod pagination;
pub mod quiz;
pub mod server;
pub mod settings;
pub mod telemetry;
pub mod transfer;
