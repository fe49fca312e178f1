/// Cursor position; `line` and `col` are 0-based
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor {
    pub line: usize,
    pub col: usize,
}

impl Cursor {
    pub fn new() -> Self {
        Self { line: 0, col: 0 }
    }

    pub fn move_left(&mut self) {
        self.col = self.col.saturating_sub(1);
    }

    pub fn move_right(&mut self, line_len: usize) {
        self.col = (self.col + 1).min(line_len);
    }

    pub fn move_up(&mut self) {
        self.line = self.line.saturating_sub(1);
    }

    pub fn move_down(&mut self, line_count: usize) {
        self.line = (self.line + 1).min(line_count.saturating_sub(1));
    }

    /// Jump to a 1-based line number, clamped to `1..=line_count`.
    /// Returns false when the line had to be clamped.
    pub fn goto_line(&mut self, line: usize, line_count: usize) -> bool {
        let last = line_count.max(1);
        let target = line.clamp(1, last);
        self.line = target - 1;
        self.col = 0;
        target == line
    }
}
