// Degree Defender - Community Notes API Core
//
// This crate provides the backend for community notes: fact-check
// annotations attached to answers, their moderation lifecycle, one-per-day
// submission limits and helpful/not-helpful voting, with note events pushed
// to moderation dashboards over SSE.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
