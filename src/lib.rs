//! linemark: bookmark lines in files and jump back to them
//!
//! Bookmarks live in a flat text file, one record per line, kept free of
//! blank and duplicate records and alphabetized with the generic line sorter
//! in [`sort`]. A small modal terminal editor hosts the bookmark commands and
//! a Rhai engine exposes settings and the sorter to scripts.

pub mod bookmark;
pub mod config;
pub mod editor;
pub mod error;
pub mod input;
pub mod render;
pub mod scripting;
pub mod sort;

pub use error::{Error, Result};

/// Fresh, empty directory under the system temp dir for one test
#[cfg(test)]
pub(crate) fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("linemark-{}-{}", std::process::id(), name));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
