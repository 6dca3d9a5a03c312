//! Report builder: templates, sections, queries and processing steps

mod client;
pub mod editor;
pub mod form;
pub mod models;
pub mod preview;

pub use client::ReportClient;
pub use editor::*;
pub use form::*;
pub use models::*;
pub use preview::*;
