pub mod report;
pub mod schema;
pub mod types;

pub use report::*;
pub use schema::*;
pub use types::*;
