//! Staged diff extraction by shelling out to the system `git` binary.

pub mod diff;

pub use diff::{read_staged_diff, staged_diff};
