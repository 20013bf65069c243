pub mod application;
pub mod entities;
pub mod error;
pub mod infrastructure;
pub mod reports;

pub use application::*;
pub use entities::*;
pub use error::*;
pub use infrastructure::*;
pub use reports::*;
