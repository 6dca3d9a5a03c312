//! lexreport: listening-practice word lists and report template configuration
//!
//! Two clients over REST backends: [`listen`] fetches a vocabulary list,
//! filters it, and requests generated audio; [`report`] edits report
//! templates, sections, SQL queries and processing steps.

pub mod backend;
pub mod commands;
pub mod config;
pub mod error;
pub mod listen;
pub mod notice;
pub mod progress;
pub mod report;
