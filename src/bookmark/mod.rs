//! Line bookmarks: records, the flat-file store, and the generated menu

mod menu;
mod preview;
mod record;
mod store;

pub use menu::{Menu, MenuItem};
pub use preview::{compress_preview, escape_field, unescape_field};
pub use record::{Bookmark, JumpTarget};
pub use store::{BookmarkStore, DEFAULT_PREVIEW_WIDTH, StoreConfig};
