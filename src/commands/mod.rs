//! CLI commands implementation

pub mod init;
pub mod sections;
pub mod sql;
pub mod steps;
pub mod templates;
pub mod words;

pub use init::*;
pub use sections::*;
pub use sql::*;
pub use steps::*;
pub use templates::*;
pub use words::*;
