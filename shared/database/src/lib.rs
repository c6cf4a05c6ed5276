pub mod connection;
pub mod models;
pub mod store;

pub use connection::*;
pub use models::*;
pub use store::*;
