//! # minigit
//!
//! Facade crate re-exporting [`minigit_core`]. The `minigit` binary lives in
//! the `minigit-cli` workspace member.

pub use minigit_core::*;
