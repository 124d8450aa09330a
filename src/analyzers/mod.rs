//! Duration bucketing and answer-rate aggregation.
//!
//! This module classifies normalized durations into fixed hour ranges,
//! computes per-job and overall percentages, and summarizes qualifying
//! question answers per job.

pub mod aggregate;
pub mod analyzer;
pub mod answers;
pub mod bucket;
pub mod utility;
