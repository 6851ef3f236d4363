pub mod config;
pub mod database;
pub mod errors;
pub mod utils;

pub use config::Config;
pub use database::Database;
