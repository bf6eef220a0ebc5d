pub mod location;
pub mod server;
