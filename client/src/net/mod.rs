pub mod api;
pub mod endpoints;
pub mod error;
pub mod refresh;
pub mod transport;
