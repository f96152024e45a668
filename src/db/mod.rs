//! Storage layer.
//!
//! Repository-style operations over users, quests, completions, streaks,
//! and day rollups. The shipped backend is in-memory; every operation is
//! still fallible so a relational backend can satisfy the same contract.

pub mod memory;

pub use memory::Db;
