pub mod column;
pub mod config;
pub mod project;
pub mod sheet;
pub mod slot;

pub use column::*;
pub use config::*;
pub use project::*;
pub use sheet::*;
pub use slot::*;
