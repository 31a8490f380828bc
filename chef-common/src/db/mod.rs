//! Database models and queries

pub mod init;
pub mod models;
pub mod queue;
pub mod records;
pub mod settings;

pub use init::*;
pub use models::*;
pub use queue::*;
pub use records::*;
pub use settings::*;
