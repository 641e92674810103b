//! # Matterpress CLI
//!
//! The `mpress` binary: argument parsing, vault walking and output
//! formatting around the `matterpress-core` rewrite engine.

pub mod cli;
pub mod output;
pub mod walker;
