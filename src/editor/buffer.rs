use ropey::Rope;
use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::sort::LineSeq;

pub struct Buffer {
    text: Rope,
    filepath: Option<PathBuf>,
    dirty: bool,
}

impl Buffer {
    pub fn new() -> Self {
        Self {
            text: Rope::new(),
            filepath: None,
            dirty: false,
        }
    }

    /// Open `path`. A file that does not exist yet gives an empty buffer
    /// that will be created on save.
    pub fn from_file(path: PathBuf) -> io::Result<Self> {
        let text = match File::open(&path) {
            Ok(file) => Rope::from_reader(BufReader::new(file))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Rope::new(),
            Err(e) => return Err(e),
        };
        Ok(Self {
            text,
            filepath: Some(path),
            dirty: false,
        })
    }

    /// Create a buffer from a string (useful for testing)
    #[cfg(test)]
    pub fn from_text(s: &str) -> Self {
        Self {
            text: Rope::from_str(s),
            filepath: None,
            dirty: false,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.filepath.as_deref()
    }

    pub fn set_path(&mut self, path: PathBuf) {
        self.filepath = Some(path);
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn save(&mut self) -> io::Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let path = self
            .filepath
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "No file name"))?;
        let mut writer = BufWriter::new(File::create(path)?);
        self.text.write_to(&mut writer)?;
        writer.flush()?;
        self.dirty = false;
        Ok(())
    }

    pub fn line_count(&self) -> usize {
        self.text.len_lines()
    }

    /// Lines holding text. Unlike `line_count`, the empty line after a
    /// trailing newline is not counted.
    pub fn content_line_count(&self) -> usize {
        let count = self.text.len_lines();
        if count > 0 && self.text.line(count - 1).len_chars() == 0 {
            count - 1
        } else {
            count
        }
    }

    pub fn line(&self, idx: usize) -> ropey::RopeSlice<'_> {
        self.text.line(idx)
    }

    /// Line text without its line break
    pub fn line_text(&self, idx: usize) -> String {
        let line = self.text.line(idx);
        line.slice(..self.line_len(idx)).to_string()
    }

    /// Length excluding the line break. `\r\n` counts as one break.
    pub fn line_len(&self, idx: usize) -> usize {
        let line = self.text.line(idx);
        let len = line.len_chars();
        if len == 0 {
            return 0;
        }
        match line.char(len - 1) {
            '\n' if len > 1 && line.char(len - 2) == '\r' => len - 2,
            c if is_line_break(c) => len - 1,
            _ => len,
        }
    }

    /// The break ending line `idx`, empty for the last line
    fn line_break(&self, idx: usize) -> String {
        let line = self.text.line(idx);
        line.slice(self.line_len(idx)..).to_string()
    }

    /// Get character at position, returns None if out of bounds
    pub fn char_at(&self, line: usize, col: usize) -> Option<char> {
        if line >= self.line_count() {
            return None;
        }
        let rope_line = self.text.line(line);
        if col >= rope_line.len_chars() {
            return None;
        }
        Some(rope_line.char(col))
    }

    /// Convert (line, col) to a char index in the rope
    fn line_col_to_char(&self, line: usize, col: usize) -> usize {
        self.text.line_to_char(line) + col
    }

    /// Replace the text of line `idx`, keeping its line break
    pub fn set_line(&mut self, idx: usize, text: &str) {
        let mut start = self.text.line_to_char(idx);
        let end = start + self.line_len(idx);

        // A lone CR followed by an empty LF line would read back as one
        // CRLF break, so the CR grows into a CRLF.
        let mut replacement = text.to_string();
        if text.is_empty()
            && idx > 0
            && self.line_break(idx - 1) == "\r"
            && self.line_break(idx) == "\n"
        {
            start -= 1;
            replacement.push_str("\r\n");
        }

        self.text.remove(start..end);
        self.text.insert(start, &replacement);
        self.dirty = true;
    }

    pub fn insert_char(&mut self, line: usize, col: usize, ch: char) {
        let idx = self.line_col_to_char(line, col);
        self.text.insert_char(idx, ch);
        self.dirty = true;
    }

    pub fn delete_char(&mut self, line: usize, col: usize) {
        let idx = self.line_col_to_char(line, col);
        if idx < self.text.len_chars() {
            self.text.remove(idx..idx + 1);
            self.dirty = true;
        }
    }

    /// Delete the character before the given position (backspace)
    pub fn delete_char_backward(&mut self, line: usize, col: usize) -> bool {
        if col > 0 {
            self.delete_char(line, col - 1);
            true
        } else if line > 0 {
            // At start of line, join with previous line
            let idx = self.line_col_to_char(line, 0);
            self.text.remove(idx - 1..idx);
            self.dirty = true;
            true
        } else {
            false
        }
    }

    pub fn insert_newline(&mut self, line: usize, col: usize) {
        self.insert_char(line, col, '\n');
    }
}

/// Line breaks as ropey counts them
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Buffer lines as a sortable sequence; position 1 is the first line
impl LineSeq for Buffer {
    fn line_count(&self) -> usize {
        self.content_line_count()
    }

    fn line_at(&self, pos: usize) -> Cow<'_, str> {
        let line = self.text.line(pos - 1);
        match line.slice(..self.line_len(pos - 1)).as_str() {
            Some(s) => Cow::Borrowed(s),
            None => Cow::Owned(self.line_text(pos - 1)),
        }
    }

    fn swap_lines(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let first = self.line_text(a - 1);
        let second = self.line_text(b - 1);
        self.set_line(a - 1, &second);
        self.set_line(b - 1, &first);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scratch_dir;
    use crate::sort::{compare_lines, sort_all, sort_range};
    use proptest::prelude::*;

    fn text(buf: &Buffer) -> String {
        buf.text.to_string()
    }

    #[test]
    fn new_buffer_is_empty() {
        let buf = Buffer::new();
        assert_eq!(buf.line_count(), 1); // empty rope has 1 line
        assert_eq!(buf.content_line_count(), 0);
    }

    #[test]
    fn content_line_count_ignores_trailing_newline() {
        let buf = Buffer::from_text("hello\nworld\ntest\n");
        assert_eq!(buf.line_count(), 4);
        assert_eq!(buf.content_line_count(), 3);

        let buf = Buffer::from_text("hello\nworld");
        assert_eq!(buf.content_line_count(), 2);
    }

    #[test]
    fn line_text_drops_newline() {
        let buf = Buffer::from_text("first\nsecond\nthird");
        assert_eq!(buf.line(0).to_string(), "first\n");
        assert_eq!(buf.line_text(0), "first");
        assert_eq!(buf.line_text(2), "third");
    }

    #[test]
    fn line_len_handles_empty_lines() {
        let buf = Buffer::from_text("hello\n\nworld");
        assert_eq!(buf.line_len(0), 5);
        assert_eq!(buf.line_len(1), 0);
        assert_eq!(buf.line_len(2), 5);
    }

    #[test]
    fn set_line_keeps_newline_and_marks_dirty() {
        let mut buf = Buffer::from_text("one\ntwo\nthree\n");
        buf.set_line(1, "TWO!");
        assert_eq!(text(&buf), "one\nTWO!\nthree\n");
        assert!(buf.is_dirty());
    }

    #[test]
    fn sort_whole_buffer() {
        let mut buf = Buffer::from_text("cherry\napple\nbanana\n");
        sort_all(&mut buf, compare_lines);
        assert_eq!(text(&buf), "apple\nbanana\ncherry\n");
    }

    #[test]
    fn sort_buffer_range_only() {
        let mut buf = Buffer::from_text("z\nc\nb\na\n0");
        sort_range(&mut buf, 2, 4, compare_lines);
        assert_eq!(text(&buf), "z\na\nb\nc\n0");
    }

    #[test]
    fn sort_handles_last_line_without_newline() {
        let mut buf = Buffer::from_text("b\nc\na");
        sort_all(&mut buf, compare_lines);
        assert_eq!(text(&buf), "a\nb\nc");
    }

    #[test]
    fn line_len_strips_any_line_break() {
        let buf = Buffer::from_text("ab\r\ncd\ref\u{2028}g");
        assert_eq!(buf.line_text(0), "ab");
        assert_eq!(buf.line_text(1), "cd");
        assert_eq!(buf.line_text(2), "ef");
        assert_eq!(buf.line_text(3), "g");
    }

    #[test]
    fn set_line_keeps_crlf() {
        let mut buf = Buffer::from_text("one\r\ntwo\r\n");
        buf.set_line(0, "ONE");
        assert_eq!(text(&buf), "ONE\r\ntwo\r\n");
    }

    #[test]
    fn sort_crlf_buffer_keeps_line_endings() {
        let mut buf = Buffer::from_text("b\r\nc\r\na");
        sort_all(&mut buf, compare_lines);
        assert_eq!(text(&buf), "a\r\nb\r\nc");
        assert_eq!(buf.content_line_count(), 3);
    }

    #[test]
    fn sort_lone_cr_buffer_keeps_every_line() {
        let mut buf = Buffer::from_text("b\rc\ra\n");
        sort_all(&mut buf, compare_lines);
        assert_eq!(text(&buf), "a\rb\rc\n");
        assert_eq!(buf.content_line_count(), 3);
    }

    #[test]
    fn empty_line_after_lone_cr_stays_a_line() {
        // Moving the empty line between the CR and LF lines
        let mut buf = Buffer::from_text("b\ra\n\n");
        buf.swap_lines(2, 3);
        assert_eq!(buf.content_line_count(), 3);
        assert_eq!(buf.line_text(0), "b");
        assert_eq!(buf.line_text(1), "");
        assert_eq!(buf.line_text(2), "a");
    }

    proptest! {
        #[test]
        fn sort_mixed_endings_is_ordered_permutation(
            lines in prop::collection::vec(("[a-c]{0,2}", 0..3usize), 1..12),
        ) {
            let breaks = ["\n", "\r\n", "\r"];
            let mut source = String::new();
            for (content, brk) in &lines {
                source.push_str(content);
                source.push_str(breaks[*brk]);
            }
            let mut buf = Buffer::from_text(&source);
            let count = buf.content_line_count();

            let mut expected: Vec<String> = (0..count).map(|i| buf.line_text(i)).collect();
            expected.sort();

            sort_all(&mut buf, compare_lines);
            prop_assert_eq!(buf.content_line_count(), count);
            let got: Vec<String> = (0..count).map(|i| buf.line_text(i)).collect();
            prop_assert_eq!(got, expected);
        }
    }

    #[test]
    fn backspace_at_line_start_joins_lines() {
        let mut buf = Buffer::from_text("ab\ncd");
        assert!(buf.delete_char_backward(1, 0));
        assert_eq!(text(&buf), "abcd");
        assert!(!buf.delete_char_backward(0, 0));
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = scratch_dir("buffer-missing");
        let buf = Buffer::from_file(dir.join("new.txt")).unwrap();
        assert_eq!(buf.content_line_count(), 0);
        assert!(!buf.is_dirty());
    }

    #[test]
    fn save_writes_and_clears_dirty() {
        let dir = scratch_dir("buffer-save");
        let path = dir.join("out.txt");
        let mut buf = Buffer::from_file(path.clone()).unwrap();
        buf.insert_char(0, 0, 'x');
        buf.save().unwrap();
        assert!(!buf.is_dirty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x");
    }

    #[test]
    fn save_without_path_fails() {
        let mut buf = Buffer::from_text("");
        buf.insert_char(0, 0, 'x');
        assert!(buf.save().is_err());
    }
}
