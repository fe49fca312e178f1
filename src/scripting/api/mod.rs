//! API modules for the `marks` namespace
//!
//! Each submodule provides functions under `marks::<module>::*`

pub mod config;
pub mod lines;
