//! Subcommands of the `seg2segy` binary.

pub mod convert;
pub mod info;
