//! The bookmark file: one record per line, kept deduplicated and sorted

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::menu::Menu;
use super::record::Bookmark;
use crate::error::{Error, Result};
use crate::sort::{compare_lines, sort_all};

pub const DEFAULT_PREVIEW_WIDTH: usize = 60;

/// Where the store lives and how it labels new bookmarks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub bookmark_file: PathBuf,
    pub preview_width: usize,
}

impl StoreConfig {
    pub fn new(bookmark_file: impl Into<PathBuf>) -> Self {
        Self {
            bookmark_file: bookmark_file.into(),
            preview_width: DEFAULT_PREVIEW_WIDTH,
        }
    }

    pub fn with_preview_width(mut self, width: usize) -> Self {
        self.preview_width = width;
        self
    }
}

/// In-memory copy of the bookmark file
pub struct BookmarkStore {
    config: StoreConfig,
    lines: Vec<String>,
}

impl BookmarkStore {
    /// Open the store. A missing bookmark file is an empty store.
    pub fn open(config: StoreConfig) -> Result<Self> {
        let lines = read_lines(&config.bookmark_file)?;
        tracing::info!(
            "Loaded {} bookmark records from {}",
            lines.len(),
            config.bookmark_file.display()
        );
        Ok(Self { config, lines })
    }

    pub fn path(&self) -> &Path {
        &self.config.bookmark_file
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Raw record lines, as they would be written
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Throw away in-memory state and re-read the file
    pub fn reload(&mut self) -> Result<()> {
        self.lines = read_lines(&self.config.bookmark_file)?;
        Ok(())
    }

    /// Append a bookmark, then rebuild and persist
    pub fn add(&mut self, bookmark: &Bookmark) -> Result<Menu> {
        tracing::debug!("Adding bookmark {}", bookmark);
        self.lines.push(bookmark.to_record());
        self.rebuild()
    }

    /// Bookmark `line` (1-based) of `path`, whose text is `text`
    pub fn add_line(&mut self, path: &Path, line: usize, text: &str) -> Result<Menu> {
        let bookmark = Bookmark::from_line(path, line, text, self.config.preview_width);
        self.add(&bookmark)
    }

    /// Drop blank and duplicate records and alphabetize the rest
    pub fn tidy(&mut self) {
        let before = self.lines.len();
        let mut seen = HashSet::new();
        self.lines
            .retain(|line| !line.trim().is_empty() && seen.insert(line.clone()));
        sort_all(&mut self.lines, compare_lines);

        let dropped = before - self.lines.len();
        if dropped > 0 {
            tracing::debug!("Dropped {} blank or duplicate bookmark records", dropped);
        }
    }

    /// Write all records back, creating the parent directory if needed
    pub fn save(&self) -> Result<()> {
        let path = &self.config.bookmark_file;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut content = self.lines.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        fs::write(path, content)?;

        tracing::debug!("Saved {} bookmark records to {}", self.lines.len(), path.display());
        Ok(())
    }

    /// Tidy, persist, and regenerate the menu
    pub fn rebuild(&mut self) -> Result<Menu> {
        self.tidy();
        self.save()?;
        let menu = self.menu();
        tracing::info!("Rebuilt bookmark menu with {} entries", menu.len());
        Ok(menu)
    }

    /// Menu of the current records, without touching the file
    pub fn menu(&self) -> Menu {
        Menu::from_bookmarks(self.bookmarks())
    }

    /// Parsed records in store order. Malformed lines are skipped.
    pub fn bookmarks(&self) -> Vec<Bookmark> {
        self.lines
            .iter()
            .filter_map(|line| match Bookmark::parse(line) {
                Ok(bookmark) => Some(bookmark),
                Err(e) => {
                    if !line.trim().is_empty() {
                        tracing::warn!("Skipping bookmark record: {}", e);
                    }
                    None
                }
            })
            .collect()
    }

    /// Remove the `index`-th menu entry (0-based) and persist
    pub fn remove(&mut self, index: usize) -> Result<Bookmark> {
        let (line_idx, bookmark) = self
            .lines
            .iter()
            .enumerate()
            .filter_map(|(i, line)| Bookmark::parse(line).ok().map(|bm| (i, bm)))
            .nth(index)
            .ok_or(Error::NoSuchBookmark(index))?;

        self.lines.remove(line_idx);
        self.save()?;
        tracing::info!("Removed bookmark {}", bookmark);
        Ok(bookmark)
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content.lines().map(String::from).collect()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}
