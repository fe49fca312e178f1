mod buffer;
mod cursor;
mod editor;
mod mode;

pub use buffer::Buffer;
pub use cursor::Cursor;
pub use editor::Editor;
pub use mode::Mode;
