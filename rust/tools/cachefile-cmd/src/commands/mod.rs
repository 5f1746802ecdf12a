//! Command implementations for cachefile-cmd

pub mod cat;
pub mod reverse;
