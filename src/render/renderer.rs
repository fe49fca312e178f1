use std::io::{self, Write, stdout};

use crossterm::{
    cursor::{Hide, MoveTo, SetCursorStyle, Show},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, Clear, ClearType, DisableLineWrap, EnableLineWrap, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};

use crate::editor::{Editor, Mode};

const GUTTER_WIDTH: u16 = 5;

const LINE_NUMBER: Color = Color::DarkGrey;
const LINE_NUMBER_ACTIVE: Color = Color::Yellow;
const STATUS_BG: Color = Color::DarkBlue;
const STATUS_FG: Color = Color::White;
const MENU_BG: Color = Color::Black;
const MENU_FG: Color = Color::Grey;
const MENU_SELECTED_BG: Color = Color::DarkCyan;
const MESSAGE_FG: Color = Color::Yellow;

pub struct Renderer {
    pub width: u16,
    pub height: u16,
}

impl Renderer {
    pub fn new() -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self { width, height })
    }

    pub fn setup() -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            EnterAlternateScreen,
            DisableLineWrap,
            Hide,
            Clear(ClearType::All)
        )?;
        Ok(())
    }

    pub fn teardown() -> io::Result<()> {
        execute!(
            stdout(),
            SetCursorStyle::DefaultUserShape,
            ResetColor,
            Show,
            EnableLineWrap,
            LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    /// Rows available for buffer text (everything but the status line)
    pub fn text_height(&self) -> usize {
        self.height.saturating_sub(1) as usize
    }

    pub fn render(&self, editor: &Editor) -> io::Result<()> {
        let mut stdout = stdout();

        // Hide cursor during redraw to prevent flicker
        queue!(stdout, Hide)?;

        self.render_buffer(&mut stdout, editor)?;

        if editor.mode == Mode::Bookmarks {
            self.render_menu(&mut stdout, editor)?;
        }

        self.render_status_line(&mut stdout, editor)?;
        self.position_cursor(&mut stdout, editor)?;

        stdout.flush()?;
        Ok(())
    }

    fn render_buffer(&self, stdout: &mut impl Write, editor: &Editor) -> io::Result<()> {
        let settings = &editor.settings;
        // The cursor may sit on the empty line after a trailing newline
        let line_count = editor
            .buffer
            .content_line_count()
            .max(editor.cursor.line + 1);
        let gutter = if settings.show_line_numbers {
            GUTTER_WIDTH
        } else {
            0
        };
        let text_width = self.width.saturating_sub(gutter) as usize;

        queue!(stdout, ResetColor)?;

        for row in 0..self.text_height() {
            let line_idx = row + editor.scroll_offset;
            queue!(stdout, MoveTo(0, row as u16))?;

            if line_idx >= line_count {
                queue!(stdout, SetForegroundColor(LINE_NUMBER))?;
                let filler = format!("{:<width$}", "~", width = self.width as usize);
                queue!(stdout, Print(filler))?;
                continue;
            }

            let is_cursor_line = line_idx == editor.cursor.line;

            if settings.show_line_numbers {
                let number = if settings.relative_line_numbers && !is_cursor_line {
                    line_idx.abs_diff(editor.cursor.line)
                } else {
                    line_idx + 1
                };
                let color = if is_cursor_line {
                    LINE_NUMBER_ACTIVE
                } else {
                    LINE_NUMBER
                };
                queue!(stdout, SetForegroundColor(color))?;
                queue!(stdout, Print(format!("{:>4} ", number)))?;
            }

            let content: String = editor
                .buffer
                .line_text(line_idx)
                .chars()
                .map(|c| if c == '\t' { ' ' } else { c })
                .take(text_width)
                .collect();
            let padded = format!("{:<width$}", content, width = text_width);

            queue!(stdout, ResetColor)?;
            queue!(stdout, Print(padded))?;
        }

        Ok(())
    }

    /// Bookmark menu, drawn as a box over the lower part of the buffer
    fn render_menu(&self, stdout: &mut impl Write, editor: &Editor) -> io::Result<()> {
        let width = self.width as usize;
        let max_rows = (self.text_height() / 2).max(3);
        let visible = editor.menu.len().min(max_rows.saturating_sub(1));
        let top = self.text_height().saturating_sub(visible + 1);

        // Keep the selection in view
        let first = editor
            .menu_selected
            .saturating_sub(visible.saturating_sub(1));
        let rows = editor.menu.rows(width.saturating_sub(2));

        queue!(stdout, MoveTo(0, top as u16))?;
        queue!(stdout, SetBackgroundColor(MENU_BG), SetForegroundColor(STATUS_FG))?;
        queue!(stdout, SetAttribute(Attribute::Bold))?;
        let title = format!(
            " Bookmarks ({})  j/k move  Enter jump  d delete  Esc close",
            editor.menu.len()
        );
        queue!(stdout, Print(fit(&title, width)))?;
        queue!(stdout, SetAttribute(Attribute::Reset))?;

        for (offset, row) in rows.iter().skip(first).take(visible).enumerate() {
            let idx = first + offset;
            queue!(stdout, MoveTo(0, (top + 1 + offset) as u16))?;
            if idx == editor.menu_selected {
                queue!(
                    stdout,
                    SetBackgroundColor(MENU_SELECTED_BG),
                    SetForegroundColor(STATUS_FG)
                )?;
            } else {
                queue!(stdout, SetBackgroundColor(MENU_BG), SetForegroundColor(MENU_FG))?;
            }
            queue!(stdout, Print(fit(&format!(" {}", row), width)))?;
        }

        queue!(stdout, ResetColor)?;
        Ok(())
    }

    fn render_status_line(&self, stdout: &mut impl Write, editor: &Editor) -> io::Result<()> {
        let status_row = self.height.saturating_sub(1);
        let width = self.width as usize;
        queue!(stdout, MoveTo(0, status_row))?;

        // Command mode - just show the command
        if editor.mode == Mode::Command {
            queue!(stdout, ResetColor, Clear(ClearType::CurrentLine))?;
            queue!(stdout, Print(format!(":{}", editor.command_buffer)))?;
            return Ok(());
        }

        if let Some(ref msg) = editor.message {
            queue!(stdout, ResetColor, Clear(ClearType::CurrentLine))?;
            queue!(stdout, SetForegroundColor(MESSAGE_FG))?;
            queue!(stdout, Print(fit(msg, width)))?;
            queue!(stdout, ResetColor)?;
            return Ok(());
        }

        queue!(
            stdout,
            SetBackgroundColor(STATUS_BG),
            SetForegroundColor(STATUS_FG)
        )?;

        let filename = editor
            .buffer
            .path()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "[No Name]".to_string());
        let modified = if editor.buffer.is_dirty() { " [+]" } else { "" };
        let position = format!("{}:{}", editor.cursor.line + 1, editor.cursor.col + 1);

        let left = format!(" {} | {}{} ", editor.mode.display(), filename, modified);
        let right = format!(" {} marks | {} ", editor.menu.len(), position);
        let padding = width.saturating_sub(left.chars().count() + right.chars().count());

        let status = format!("{}{}{}", left, " ".repeat(padding), right);
        queue!(stdout, Print(fit(&status, width)))?;
        queue!(stdout, ResetColor)?;

        Ok(())
    }

    fn position_cursor(&self, stdout: &mut impl Write, editor: &Editor) -> io::Result<()> {
        match editor.mode {
            Mode::Command => {
                let cmd_col = 1 + editor.command_buffer.chars().count() as u16;
                queue!(stdout, MoveTo(cmd_col, self.height.saturating_sub(1)))?;
                queue!(stdout, SetCursorStyle::BlinkingBar, Show)?;
            }
            Mode::Bookmarks => {
                queue!(stdout, Hide)?;
            }
            Mode::Normal | Mode::Insert => {
                let gutter = if editor.settings.show_line_numbers {
                    GUTTER_WIDTH
                } else {
                    0
                };
                let x = gutter + editor.cursor.col as u16;
                let y = editor.cursor.line.saturating_sub(editor.scroll_offset) as u16;
                queue!(stdout, MoveTo(x, y))?;

                let cursor_style = match editor.mode {
                    Mode::Insert => SetCursorStyle::BlinkingBar,
                    _ => SetCursorStyle::SteadyBlock,
                };
                queue!(stdout, cursor_style, Show)?;
            }
        }
        Ok(())
    }
}

/// Pad or cut `text` to exactly `width` characters
fn fit(text: &str, width: usize) -> String {
    let cut: String = text.chars().take(width).collect();
    format!("{:<width$}", cut, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_pads_short_text() {
        assert_eq!(fit("ab", 4), "ab  ");
    }

    #[test]
    fn fit_cuts_long_text_by_chars() {
        assert_eq!(fit("héllo", 3), "hél");
    }
}
