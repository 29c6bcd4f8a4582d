pub mod config;
pub mod directory_refresh;
