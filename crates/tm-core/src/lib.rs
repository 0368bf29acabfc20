pub mod config;
pub mod error;
pub mod span;
pub mod token;

pub use config::*;
pub use error::*;
pub use span::*;
pub use token::*;
