use super::record::{Bookmark, JumpTarget};

/// One navigable menu entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    pub location: String,
    pub target: JumpTarget,
}

impl From<Bookmark> for MenuItem {
    fn from(bookmark: Bookmark) -> Self {
        Self {
            label: bookmark.label,
            location: bookmark.target.location(),
            target: bookmark.target,
        }
    }
}

/// The generated bookmark menu, in store order
#[derive(Debug, Clone, Default)]
pub struct Menu {
    items: Vec<MenuItem>,
}

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bookmarks(bookmarks: impl IntoIterator<Item = Bookmark>) -> Self {
        Self {
            items: bookmarks.into_iter().map(MenuItem::from).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MenuItem> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// Drop every entry. Clearing an empty menu is fine.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Render entries as numbered rows no wider than `width` characters
    pub fn rows(&self, width: usize) -> Vec<String> {
        let digits = self.items.len().max(1).to_string().len();
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let row = format!(
                    "{:>digits$}. {}  {}",
                    i + 1,
                    item.label,
                    item.location,
                    digits = digits
                );
                row.chars().take(width).collect()
            })
            .collect()
    }
}
