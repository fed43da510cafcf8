//! Integration points for the package manager.

pub mod hooks;
