//! Git operations for repoclone
//!
//! This module runs the external clone command for individual repositories.

mod clone;

pub use clone::{clone_into_owner_dir, owner_dir, Cloner, GitCloner};
