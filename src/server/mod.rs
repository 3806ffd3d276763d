pub mod config;
mod http_layers;
mod job_routes;
pub mod server;
pub mod session;
pub mod state;
mod track_routes;
mod transform_routes;

pub use config::ServerConfig;
pub use http_layers::*;
pub use server::{make_app, run_server};
