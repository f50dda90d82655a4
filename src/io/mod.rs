//! File outputs for design summaries.

pub mod export;
