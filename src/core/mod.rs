pub mod bridge;
pub mod endpoint;
pub mod error;
pub mod lifecycle;
pub mod message;
pub mod stats;

mod reader;
mod writer;
