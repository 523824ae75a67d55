pub mod derive;
pub mod history;
pub mod notify;
pub mod patch;
pub mod store;

pub use derive::*;
pub use history::*;
pub use notify::*;
pub use patch::*;
pub use store::*;
