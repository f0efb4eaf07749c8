//! Tap in when you start working, tap out when you stop. tapclock keeps the sessions in a small
//! json store next to its logs and tells you how many hours you've put in today and this month,
//! and how far that is from the monthly target.
//!

pub mod cli;
pub mod fs;
pub mod storage;
pub mod tracker;
pub mod utils;
