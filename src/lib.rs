pub mod api;
pub mod blockchain;
pub mod error;
pub mod node;
pub mod utils;
