mod message;
pub mod service;
mod thought;
mod tools;

pub use message::*;
pub use service::Service;
pub use thought::*;
pub use tools::*;
