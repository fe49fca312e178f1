use std::path::{self, Path, PathBuf};

use super::{Buffer, Cursor, Mode};
use crate::bookmark::{BookmarkStore, JumpTarget, Menu};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::sort::{compare_lines, sort_range};

pub struct Editor {
    pub buffer: Buffer,
    pub cursor: Cursor,
    pub mode: Mode,
    pub command_buffer: String,
    pub running: bool,
    pub message: Option<String>,
    pub scroll_offset: usize,
    pub settings: Settings,
    pub store: BookmarkStore,
    pub menu: Menu,
    pub menu_selected: usize,
}

impl Editor {
    pub fn new(settings: Settings, store: BookmarkStore) -> Self {
        let menu = store.menu();
        Self {
            buffer: Buffer::new(),
            cursor: Cursor::new(),
            mode: Mode::default(),
            command_buffer: String::new(),
            running: true,
            message: None,
            scroll_offset: 0,
            settings,
            store,
            menu,
            menu_selected: 0,
        }
    }

    /// Replace the current buffer with `path`
    pub fn open(&mut self, path: PathBuf) -> Result<()> {
        tracing::debug!("Opening {}", path.display());
        self.buffer = Buffer::from_file(path)?;
        self.cursor = Cursor::new();
        self.scroll_offset = 0;
        Ok(())
    }

    /// Adjust scroll offset to keep cursor visible within viewport
    pub fn adjust_scroll(&mut self, viewport_height: usize) {
        if self.cursor.line < self.scroll_offset {
            self.scroll_offset = self.cursor.line;
        }
        if self.cursor.line >= self.scroll_offset + viewport_height {
            self.scroll_offset = self.cursor.line + 1 - viewport_height.max(1);
        }
    }

    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    fn report(&mut self, result: Result<()>) {
        if let Err(e) = result {
            tracing::warn!("{}", e);
            self.set_message(format!("Error: {}", e));
        }
    }

    // Movement

    pub fn move_left(&mut self) {
        self.cursor.move_left();
    }

    pub fn move_right(&mut self) {
        let line_len = self.buffer.line_len(self.cursor.line);
        self.cursor.move_right(line_len);
    }

    pub fn move_up(&mut self) {
        self.cursor.move_up();
        self.clamp_cursor_col();
    }

    pub fn move_down(&mut self) {
        let line_count = self.buffer.line_count();
        self.cursor.move_down(line_count);
        self.clamp_cursor_col();
    }

    fn clamp_cursor_col(&mut self) {
        let line_len = self.buffer.line_len(self.cursor.line);
        if self.cursor.col > line_len {
            self.cursor.col = line_len;
        }
    }

    pub fn move_to_line_start(&mut self) {
        self.cursor.col = 0;
    }

    pub fn move_to_line_end(&mut self) {
        let line_len = self.buffer.line_len(self.cursor.line);
        self.cursor.col = line_len.saturating_sub(1);
    }

    pub fn move_to_first_line(&mut self) {
        self.cursor.line = 0;
        self.clamp_cursor_col();
    }

    pub fn move_to_last_line(&mut self) {
        self.cursor.line = self.buffer.content_line_count().saturating_sub(1);
        self.clamp_cursor_col();
    }

    // Modes

    pub fn enter_insert_mode(&mut self) {
        self.mode = Mode::Insert;
    }

    /// Append after cursor (a)
    pub fn append(&mut self) {
        let line_len = self.buffer.line_len(self.cursor.line);
        if self.cursor.col < line_len {
            self.cursor.col += 1;
        }
        self.enter_insert_mode();
    }

    /// Append at end of line (A)
    pub fn append_end_of_line(&mut self) {
        self.cursor.col = self.buffer.line_len(self.cursor.line);
        self.enter_insert_mode();
    }

    /// Open line below (o)
    pub fn open_line_below(&mut self) {
        self.cursor.col = self.buffer.line_len(self.cursor.line);
        self.buffer.insert_newline(self.cursor.line, self.cursor.col);
        self.cursor.line += 1;
        self.cursor.col = 0;
        self.enter_insert_mode();
    }

    /// Open line above (O)
    pub fn open_line_above(&mut self) {
        self.cursor.col = 0;
        self.buffer.insert_newline(self.cursor.line, 0);
        self.enter_insert_mode();
    }

    pub fn enter_normal_mode(&mut self) {
        self.mode = Mode::Normal;
        self.command_buffer.clear();
        self.clamp_cursor_col();
    }

    pub fn enter_command_mode(&mut self) {
        self.mode = Mode::Command;
        self.command_buffer.clear();
    }

    // Text editing

    pub fn insert_char(&mut self, ch: char) {
        self.buffer.insert_char(self.cursor.line, self.cursor.col, ch);
        self.cursor.col += 1;
    }

    pub fn delete_char_backward(&mut self) {
        if self.cursor.col > 0 {
            self.buffer
                .delete_char_backward(self.cursor.line, self.cursor.col);
            self.cursor.col -= 1;
        } else if self.cursor.line > 0 {
            // Join with previous line
            let prev_line_len = self.buffer.line_len(self.cursor.line - 1);
            self.buffer
                .delete_char_backward(self.cursor.line, self.cursor.col);
            self.cursor.line -= 1;
            self.cursor.col = prev_line_len;
        }
    }

    pub fn insert_newline(&mut self) {
        self.buffer.insert_newline(self.cursor.line, self.cursor.col);
        self.cursor.line += 1;
        self.cursor.col = 0;
    }

    // Commands

    pub fn execute_command(&mut self) {
        let cmd = self.command_buffer.trim().to_string();
        self.command_buffer.clear();
        self.mode = Mode::Normal;

        let (name, arg) = match cmd.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (cmd.as_str(), ""),
        };

        match name {
            "q" | "quit" => {
                if self.buffer.is_dirty() {
                    self.set_message(Error::UnsavedChanges.to_string());
                } else {
                    self.quit();
                }
            }
            "q!" => self.quit(),
            "w" | "write" => {
                let result = self.save();
                if result.is_ok() {
                    self.set_message("Written");
                }
                self.report(result);
            }
            "wq" => match self.save() {
                Ok(()) => self.quit(),
                Err(e) => self.set_message(format!("Error: {}", e)),
            },
            "e" | "edit" if !arg.is_empty() => {
                let result = self.edit(PathBuf::from(arg));
                self.report(result);
            }
            "mark" => {
                let result = self.bookmark_current_line();
                self.report(result);
            }
            "marks" => {
                let result = self.open_bookmark_menu();
                self.report(result);
            }
            "unmark" => {
                let result = match arg.parse::<usize>() {
                    Ok(n) if n > 0 => self.remove_bookmark(n - 1),
                    _ => Err(Error::NoSuchBookmark(0)),
                };
                self.report(result);
            }
            "tidy" => {
                let result = self.tidy_bookmarks();
                self.report(result);
            }
            "sort" => {
                let count = self.buffer.content_line_count();
                let result = self.sort_lines(1, count);
                self.report(result);
            }
            "" => {}
            _ => match parse_range_sort(&cmd) {
                Some((start, end)) => {
                    let result = self.sort_lines(start, end);
                    self.report(result);
                }
                None => self.set_message(format!("Unknown command: {}", cmd)),
            },
        }
    }

    /// Run a named action, as bound with `marks::config::bind`.
    /// Returns false for unknown action names.
    pub fn run_action(&mut self, action: &str) -> bool {
        match action {
            "bookmark_add" => {
                let result = self.bookmark_current_line();
                self.report(result);
            }
            "bookmark_menu" => {
                let result = self.open_bookmark_menu();
                self.report(result);
            }
            "sort_buffer" => {
                let count = self.buffer.content_line_count();
                let result = self.sort_lines(1, count);
                self.report(result);
            }
            "save" => {
                let result = self.save();
                self.report(result);
            }
            "quit" => self.quit(),
            _ => return false,
        }
        true
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn save(&mut self) -> Result<()> {
        if self.buffer.path().is_none() {
            return Err(Error::NoFileName);
        }
        self.buffer.save()?;
        Ok(())
    }

    /// Switch to another file, refusing to drop unsaved changes
    pub fn edit(&mut self, path: PathBuf) -> Result<()> {
        if self.buffer.is_dirty() && !self.is_current_file(&path) {
            return Err(Error::UnsavedChanges);
        }
        self.open(path)
    }

    fn is_current_file(&self, path: &Path) -> bool {
        match self.buffer.path() {
            Some(current) => same_file(current, path),
            None => false,
        }
    }

    /// Sort buffer lines `start..=end` (1-based) alphabetically
    pub fn sort_lines(&mut self, start: usize, end: usize) -> Result<()> {
        let count = self.buffer.content_line_count();
        if end > count {
            return Err(Error::LineOutOfRange { line: end, count });
        }
        if start == 0 {
            return Err(Error::LineOutOfRange { line: start, count });
        }
        sort_range(&mut self.buffer, start, end, compare_lines);
        self.clamp_cursor_col();
        let sorted = if end >= start { end - start + 1 } else { 0 };
        self.set_message(format!("Sorted {} lines", sorted));
        Ok(())
    }

    // Bookmarks

    /// Bookmark the cursor line of the current file
    pub fn bookmark_current_line(&mut self) -> Result<()> {
        let file = self.buffer.path().ok_or(Error::NoFileName)?;
        let path = path::absolute(file)?;
        let line = self.cursor.line + 1;
        let text = self.buffer.line_text(self.cursor.line);

        self.menu = self.store.add_line(&path, line, &text)?;
        let location = JumpTarget::new(path, line).location();
        self.set_message(format!("Bookmarked {}", location));
        Ok(())
    }

    /// Re-read and rebuild the bookmark file, then show the menu
    pub fn open_bookmark_menu(&mut self) -> Result<()> {
        self.store.reload()?;
        self.menu = self.store.rebuild()?;
        if self.menu.is_empty() {
            self.set_message("No bookmarks");
            self.mode = Mode::Normal;
            return Ok(());
        }
        self.menu_selected = self.menu_selected.min(self.menu.len() - 1);
        self.mode = Mode::Bookmarks;
        Ok(())
    }

    pub fn close_bookmark_menu(&mut self) {
        self.mode = Mode::Normal;
    }

    pub fn menu_next(&mut self) {
        if self.menu_selected + 1 < self.menu.len() {
            self.menu_selected += 1;
        }
    }

    pub fn menu_prev(&mut self) {
        self.menu_selected = self.menu_selected.saturating_sub(1);
    }

    /// Jump to the highlighted menu entry
    pub fn open_selected_bookmark(&mut self) -> Result<()> {
        let target = match self.menu.get(self.menu_selected) {
            Some(item) => item.target.clone(),
            None => return Err(Error::NoSuchBookmark(self.menu_selected)),
        };
        self.mode = Mode::Normal;
        self.jump_to(&target)
    }

    /// Delete the highlighted menu entry
    pub fn delete_selected_bookmark(&mut self) -> Result<()> {
        self.remove_bookmark(self.menu_selected)?;
        if self.menu.is_empty() {
            self.mode = Mode::Normal;
        } else {
            self.menu_selected = self.menu_selected.min(self.menu.len() - 1);
        }
        Ok(())
    }

    /// Remove menu entry `index` (0-based) and rebuild the menu
    pub fn remove_bookmark(&mut self, index: usize) -> Result<()> {
        let removed = self.store.remove(index)?;
        self.menu = self.store.rebuild()?;
        self.set_message(format!("Removed bookmark {}", removed.target.location()));
        Ok(())
    }

    pub fn tidy_bookmarks(&mut self) -> Result<()> {
        self.store.reload()?;
        self.menu = self.store.rebuild()?;
        self.set_message(format!("{} bookmarks", self.menu.len()));
        Ok(())
    }

    /// Open the target's file if needed and move to its line
    pub fn jump_to(&mut self, target: &JumpTarget) -> Result<()> {
        if !self.is_current_file(&target.path) {
            self.edit(target.path.clone())?;
        }

        let count = self.buffer.content_line_count();
        if self.cursor.goto_line(target.line, count) {
            self.set_message(target.location());
        } else {
            self.set_message(format!(
                "{} (file now has {} lines)",
                target.location(),
                count
            ));
        }
        Ok(())
    }
}

/// `<start>,<end>sort` with 1-based inclusive line numbers
fn parse_range_sort(cmd: &str) -> Option<(usize, usize)> {
    let range = cmd.strip_suffix("sort")?;
    let (start, end) = range.split_once(',')?;
    Some((start.trim().parse().ok()?, end.trim().parse().ok()?))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (path::absolute(a), path::absolute(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::bookmark::{Bookmark, StoreConfig};
    use crate::scratch_dir;

    fn editor_in(dir: &Path) -> Editor {
        let store = BookmarkStore::open(StoreConfig::new(dir.join("bookmarks"))).unwrap();
        Editor::new(Settings::default(), store)
    }

    fn editor_with_text(dir: &Path, s: &str) -> Editor {
        let mut editor = editor_in(dir);
        editor.buffer = Buffer::from_text(s);
        editor
    }

    fn editor_with_file(dir: &Path, name: &str, s: &str) -> (Editor, PathBuf) {
        let path = dir.join(name);
        fs::write(&path, s).unwrap();
        let mut editor = editor_in(dir);
        editor.open(path.clone()).unwrap();
        (editor, path)
    }

    fn run(editor: &mut Editor, cmd: &str) {
        editor.enter_command_mode();
        editor.command_buffer = cmd.to_string();
        editor.execute_command();
    }

    #[test]
    fn new_editor_starts_in_normal_mode() {
        let dir = scratch_dir("editor-new");
        let editor = editor_in(&dir);
        assert_eq!(editor.mode, Mode::Normal);
        assert!(editor.running);
        assert!(editor.menu.is_empty());
    }

    #[test]
    fn move_down_clamps_col_to_shorter_line() {
        let dir = scratch_dir("editor-move");
        let mut editor = editor_with_text(&dir, "hello world\nhi");
        editor.cursor.col = 10;
        editor.move_down();
        assert_eq!(editor.cursor.line, 1);
        assert_eq!(editor.cursor.col, 2);
    }

    #[test]
    fn adjust_scroll_follows_cursor() {
        let dir = scratch_dir("editor-scroll");
        let mut editor = editor_with_text(&dir, "1\n2\n3\n4\n5\n6\n7\n8\n9\n10");
        editor.cursor.line = 8;
        editor.adjust_scroll(5);
        assert_eq!(editor.scroll_offset, 4);
        editor.cursor.line = 2;
        editor.adjust_scroll(5);
        assert_eq!(editor.scroll_offset, 2);
    }

    #[test]
    fn quit_refuses_with_unsaved_changes() {
        let dir = scratch_dir("editor-quit");
        let mut editor = editor_with_text(&dir, "x");
        editor.insert_char('y');
        run(&mut editor, "q");
        assert!(editor.running);
        run(&mut editor, "q!");
        assert!(!editor.running);
    }

    #[test]
    fn unknown_command_sets_message() {
        let dir = scratch_dir("editor-unknown");
        let mut editor = editor_in(&dir);
        run(&mut editor, "frobnicate");
        assert_eq!(editor.mode, Mode::Normal);
        assert_eq!(
            editor.message.as_deref(),
            Some("Unknown command: frobnicate")
        );
    }

    #[test]
    fn sort_command_sorts_buffer() {
        let dir = scratch_dir("editor-sort");
        let mut editor = editor_with_text(&dir, "banana\napple\ncherry\n");
        run(&mut editor, "sort");
        assert_eq!(editor.buffer.line_text(0), "apple");
        assert_eq!(editor.buffer.line_text(2), "cherry");
        assert_eq!(editor.message.as_deref(), Some("Sorted 3 lines"));
    }

    #[test]
    fn range_sort_command_sorts_inner_lines() {
        let dir = scratch_dir("editor-range-sort");
        let mut editor = editor_with_text(&dir, "z\nc\nb\na\n0\n");
        run(&mut editor, "2,4sort");
        let lines: Vec<String> = (0..5).map(|i| editor.buffer.line_text(i)).collect();
        assert_eq!(lines, ["z", "a", "b", "c", "0"]);
    }

    #[test]
    fn range_sort_past_end_is_an_error() {
        let dir = scratch_dir("editor-range-oob");
        let mut editor = editor_with_text(&dir, "b\na\n");
        run(&mut editor, "1,9sort");
        assert_eq!(editor.buffer.line_text(0), "b");
        assert!(editor.message.unwrap().starts_with("Error: Line 9 out of range"));
    }

    #[test]
    fn mark_without_file_name_fails() {
        let dir = scratch_dir("editor-mark-noname");
        let mut editor = editor_with_text(&dir, "text");
        run(&mut editor, "mark");
        assert_eq!(editor.message.as_deref(), Some("Error: No file name"));
        assert!(editor.store.is_empty());
    }

    #[test]
    fn mark_adds_cursor_line() {
        let dir = scratch_dir("editor-mark");
        let (mut editor, path) = editor_with_file(&dir, "notes.txt", "first\n   second line  \n");
        editor.move_down();
        run(&mut editor, "mark");

        assert_eq!(editor.menu.len(), 1);
        let item = editor.menu.get(0).unwrap();
        assert_eq!(item.label, "second line");
        assert_eq!(item.target.line, 2);
        assert_eq!(item.target.path, path::absolute(&path).unwrap());
        assert_eq!(editor.message.as_deref(), Some("Bookmarked notes.txt:2"));
    }

    #[test]
    fn bookmark_menu_lists_sorted_entries() {
        let dir = scratch_dir("editor-menu");
        let (mut editor, _) = editor_with_file(&dir, "a.txt", "zebra\napple\n");
        editor.bookmark_current_line().unwrap();
        editor.move_down();
        editor.bookmark_current_line().unwrap();

        editor.open_bookmark_menu().unwrap();
        assert_eq!(editor.mode, Mode::Bookmarks);
        let labels: Vec<&str> = editor.menu.items().iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, ["apple", "zebra"]);
    }

    #[test]
    fn empty_menu_stays_in_normal_mode() {
        let dir = scratch_dir("editor-menu-empty");
        let mut editor = editor_in(&dir);
        run(&mut editor, "marks");
        assert_eq!(editor.mode, Mode::Normal);
        assert_eq!(editor.message.as_deref(), Some("No bookmarks"));
    }

    #[test]
    fn selecting_bookmark_jumps_to_other_file() {
        let dir = scratch_dir("editor-jump");
        let target = dir.join("target.txt");
        fs::write(&target, "one\ntwo\nthree\n").unwrap();
        let (mut editor, _) = editor_with_file(&dir, "start.txt", "start\n");
        editor
            .store
            .add(&Bookmark::new("three", path::absolute(&target).unwrap(), 3))
            .unwrap();

        editor.open_bookmark_menu().unwrap();
        editor.open_selected_bookmark().unwrap();

        assert_eq!(editor.mode, Mode::Normal);
        assert_eq!(editor.cursor.line, 2);
        assert!(editor.is_current_file(&target));
    }

    #[test]
    fn jump_refuses_to_drop_changes() {
        let dir = scratch_dir("editor-jump-dirty");
        let other = dir.join("other.txt");
        fs::write(&other, "a\n").unwrap();
        let (mut editor, start) = editor_with_file(&dir, "start.txt", "start\n");
        editor.insert_char('!');

        let result = editor.jump_to(&JumpTarget::new(&other, 1));
        assert!(matches!(result, Err(Error::UnsavedChanges)));
        assert!(editor.is_current_file(&start));
    }

    #[test]
    fn jump_past_end_clamps_and_says_so() {
        let dir = scratch_dir("editor-jump-stale");
        let (mut editor, path) = editor_with_file(&dir, "short.txt", "a\nb\n");
        editor.jump_to(&JumpTarget::new(&path, 40)).unwrap();
        assert_eq!(editor.cursor.line, 1);
        assert_eq!(
            editor.message.as_deref(),
            Some("short.txt:40 (file now has 2 lines)")
        );
    }

    #[test]
    fn unmark_removes_by_menu_number() {
        let dir = scratch_dir("editor-unmark");
        let (mut editor, _) = editor_with_file(&dir, "f.txt", "beta\nalpha\n");
        editor.bookmark_current_line().unwrap();
        editor.move_down();
        editor.bookmark_current_line().unwrap();

        run(&mut editor, "unmark 1");
        assert_eq!(editor.menu.len(), 1);
        assert_eq!(editor.menu.get(0).unwrap().label, "beta");

        run(&mut editor, "unmark 7");
        assert_eq!(editor.message.as_deref(), Some("Error: No bookmark at index 6"));
    }

    #[test]
    fn delete_last_menu_entry_leaves_menu() {
        let dir = scratch_dir("editor-menu-delete");
        let (mut editor, _) = editor_with_file(&dir, "f.txt", "only\n");
        editor.bookmark_current_line().unwrap();
        editor.open_bookmark_menu().unwrap();
        editor.delete_selected_bookmark().unwrap();
        assert!(editor.menu.is_empty());
        assert_eq!(editor.mode, Mode::Normal);
    }

    #[test]
    fn menu_navigation_stays_in_bounds() {
        let dir = scratch_dir("editor-menu-nav");
        let (mut editor, _) = editor_with_file(&dir, "f.txt", "a\nb\n");
        editor.bookmark_current_line().unwrap();
        editor.move_down();
        editor.bookmark_current_line().unwrap();
        editor.open_bookmark_menu().unwrap();

        editor.menu_prev();
        assert_eq!(editor.menu_selected, 0);
        editor.menu_next();
        editor.menu_next();
        assert_eq!(editor.menu_selected, 1);
    }

    #[test]
    fn run_action_knows_bookmark_actions() {
        let dir = scratch_dir("editor-actions");
        let (mut editor, _) = editor_with_file(&dir, "f.txt", "line\n");
        assert!(editor.run_action("bookmark_add"));
        assert_eq!(editor.store.len(), 1);
        assert!(editor.run_action("bookmark_menu"));
        assert_eq!(editor.mode, Mode::Bookmarks);
        assert!(!editor.run_action("no_such_action"));
    }

    #[test]
    fn write_saves_file() {
        let dir = scratch_dir("editor-write");
        let (mut editor, path) = editor_with_file(&dir, "w.txt", "abc\n");
        editor.insert_char('>');
        run(&mut editor, "w");
        assert_eq!(editor.message.as_deref(), Some("Written"));
        assert_eq!(fs::read_to_string(&path).unwrap(), ">abc\n");
    }

    #[test]
    fn parse_range_sort_accepts_spaces() {
        assert_eq!(parse_range_sort("3, 9sort"), Some((3, 9)));
        assert_eq!(parse_range_sort("3,9 sort"), Some((3, 9)));
        assert_eq!(parse_range_sort("sort"), None);
        assert_eq!(parse_range_sort("a,bsort"), None);
    }
}
