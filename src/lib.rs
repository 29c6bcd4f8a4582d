pub mod presence;
pub mod server;
pub mod version;
pub mod web;
