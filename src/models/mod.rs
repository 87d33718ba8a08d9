pub mod candidate;
pub mod detail;
pub mod handoff;
pub mod job;
pub mod query;
