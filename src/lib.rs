//! Episub - Subtitle Collection Tooling
//!
//! Batch conversion of WebVTT episode subtitles to SRT, filed into one folder
//! per show, and season/episode consistency checks over a collection.

pub mod cli;
pub mod config;
pub mod error;
pub mod filename;
pub mod subtitle;
pub mod validator;
pub mod workflow;
