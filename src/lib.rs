pub mod api;
pub mod board;
pub mod client;
pub mod config;
pub mod join;

pub use self::{board::StatusBoard, client::Client, config::Config};
