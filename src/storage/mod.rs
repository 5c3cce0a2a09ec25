mod config;
mod error;
mod records;
mod store;
mod table;

pub use config::*;
pub use error::*;
pub use store::*;
pub use table::*;
