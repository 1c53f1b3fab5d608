pub mod app;
mod extractors;
pub mod routes;
