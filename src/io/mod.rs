pub mod export;
pub mod generate;

pub use export::*;
pub use generate::*;
