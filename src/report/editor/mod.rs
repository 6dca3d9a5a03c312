//! Per-entity configuration state and the actions that act on it
//!
//! Each editor owns the in-memory copy of one record. Actions take
//! `&mut self`, so an editor has at most one request outstanding, and
//! every action resolves to a [`Notice`](crate::notice::Notice).

mod query;
mod section;
mod step;
mod template;

pub use query::*;
pub use section::*;
pub use step::*;
pub use template::*;

