use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::editor::{Editor, Mode};

pub fn handle_event(editor: &mut Editor, event: Event) {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => {
            // Clear any message on keypress
            editor.clear_message();
            handle_key(editor, key);
        }
        Event::Resize(_, _) => {
            // Resize is handled by the renderer
        }
        _ => {}
    }
}

fn handle_key(editor: &mut Editor, key: KeyEvent) {
    match editor.mode {
        Mode::Normal => handle_normal_mode(editor, key),
        Mode::Insert => handle_insert_mode(editor, key),
        Mode::Command => handle_command_mode(editor, key),
        Mode::Bookmarks => handle_bookmarks_mode(editor, key),
    }
}

/// Action bound to `key` in settings, if any
fn custom_binding(editor: &Editor, key: &KeyEvent) -> Option<String> {
    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            editor.settings.keybinds.get(&c.to_string()).cloned()
        }
        _ => None,
    }
}

fn handle_normal_mode(editor: &mut Editor, key: KeyEvent) {
    if let Some(action) = custom_binding(editor, &key) {
        if editor.run_action(&action) {
            return;
        }
        editor.set_message(format!("Unknown action: {}", action));
        return;
    }

    match key.code {
        // Quick quit with Ctrl-C
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            editor.quit();
        }

        // Basic movement
        KeyCode::Char('h') | KeyCode::Left => editor.move_left(),
        KeyCode::Char('j') | KeyCode::Down => editor.move_down(),
        KeyCode::Char('k') | KeyCode::Up => editor.move_up(),
        KeyCode::Char('l') | KeyCode::Right => editor.move_right(),

        // Line motions
        KeyCode::Char('0') => editor.move_to_line_start(),
        KeyCode::Char('$') => editor.move_to_line_end(),
        KeyCode::Char('g') => editor.move_to_first_line(),
        KeyCode::Char('G') => editor.move_to_last_line(),

        // Insert mode entry
        KeyCode::Char('i') => editor.enter_insert_mode(),
        KeyCode::Char('a') => editor.append(),
        KeyCode::Char('A') => editor.append_end_of_line(),
        KeyCode::Char('o') => editor.open_line_below(),
        KeyCode::Char('O') => editor.open_line_above(),

        // Bookmarks
        KeyCode::Char('m') => {
            editor.run_action("bookmark_add");
        }
        KeyCode::Char('\'') => {
            editor.run_action("bookmark_menu");
        }

        // Command mode
        KeyCode::Char(':') => editor.enter_command_mode(),

        _ => {}
    }
}

fn handle_insert_mode(editor: &mut Editor, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => editor.enter_normal_mode(),
        KeyCode::Char(c) => editor.insert_char(c),
        KeyCode::Backspace => editor.delete_char_backward(),
        KeyCode::Enter => editor.insert_newline(),

        KeyCode::Left => editor.move_left(),
        KeyCode::Right => editor.move_right(),
        KeyCode::Up => editor.move_up(),
        KeyCode::Down => editor.move_down(),

        _ => {}
    }
}

fn handle_command_mode(editor: &mut Editor, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => editor.enter_normal_mode(),
        KeyCode::Enter => editor.execute_command(),
        KeyCode::Backspace => {
            editor.command_buffer.pop();
            if editor.command_buffer.is_empty() {
                editor.enter_normal_mode();
            }
        }
        KeyCode::Char(c) => editor.command_buffer.push(c),
        _ => {}
    }
}

fn handle_bookmarks_mode(editor: &mut Editor, key: KeyEvent) {
    let result = match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            editor.close_bookmark_menu();
            Ok(())
        }
        KeyCode::Char('j') | KeyCode::Down => {
            editor.menu_next();
            Ok(())
        }
        KeyCode::Char('k') | KeyCode::Up => {
            editor.menu_prev();
            Ok(())
        }
        KeyCode::Enter => editor.open_selected_bookmark(),
        KeyCode::Char('d') => editor.delete_selected_bookmark(),
        _ => Ok(()),
    };

    if let Err(e) = result {
        editor.set_message(format!("Error: {}", e));
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;
    use crate::bookmark::{BookmarkStore, StoreConfig};
    use crate::config::Settings;
    use crate::scratch_dir;

    fn press(editor: &mut Editor, code: KeyCode) {
        handle_event(editor, Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn editor_on_file(dir: &Path, settings: Settings) -> Editor {
        let path = dir.join("file.txt");
        fs::write(&path, "second\nfirst\n").unwrap();
        let store = BookmarkStore::open(StoreConfig::new(dir.join("bookmarks"))).unwrap();
        let mut editor = Editor::new(settings, store);
        editor.open(path).unwrap();
        editor
    }

    #[test]
    fn m_bookmarks_and_quote_opens_menu() {
        let dir = scratch_dir("handler-mark");
        let mut editor = editor_on_file(&dir, Settings::default());
        press(&mut editor, KeyCode::Char('m'));
        press(&mut editor, KeyCode::Char('j'));
        press(&mut editor, KeyCode::Char('m'));
        press(&mut editor, KeyCode::Char('\''));

        assert_eq!(editor.mode, Mode::Bookmarks);
        assert_eq!(editor.menu.len(), 2);
    }

    #[test]
    fn enter_in_menu_jumps() {
        let dir = scratch_dir("handler-jump");
        let mut editor = editor_on_file(&dir, Settings::default());
        press(&mut editor, KeyCode::Char('j'));
        press(&mut editor, KeyCode::Char('m'));
        press(&mut editor, KeyCode::Char('g'));
        press(&mut editor, KeyCode::Char('\''));
        press(&mut editor, KeyCode::Enter);

        assert_eq!(editor.mode, Mode::Normal);
        assert_eq!(editor.cursor.line, 1);
    }

    #[test]
    fn escape_closes_menu() {
        let dir = scratch_dir("handler-escape");
        let mut editor = editor_on_file(&dir, Settings::default());
        press(&mut editor, KeyCode::Char('m'));
        press(&mut editor, KeyCode::Char('\''));
        press(&mut editor, KeyCode::Esc);
        assert_eq!(editor.mode, Mode::Normal);
    }

    #[test]
    fn custom_binding_runs_action() {
        let dir = scratch_dir("handler-binding");
        let mut settings = Settings::default();
        settings
            .keybinds
            .insert("S".to_string(), "sort_buffer".to_string());
        let mut editor = editor_on_file(&dir, settings);

        press(&mut editor, KeyCode::Char('S'));
        assert_eq!(editor.buffer.line_text(0), "first");
    }

    #[test]
    fn unknown_binding_reports_action() {
        let dir = scratch_dir("handler-bad-binding");
        let mut settings = Settings::default();
        settings.keybinds.insert("X".to_string(), "explode".to_string());
        let mut editor = editor_on_file(&dir, settings);

        press(&mut editor, KeyCode::Char('X'));
        assert_eq!(editor.message.as_deref(), Some("Unknown action: explode"));
    }

    #[test]
    fn typed_command_runs_on_enter() {
        let dir = scratch_dir("handler-command");
        let mut editor = editor_on_file(&dir, Settings::default());
        for c in ":sort".chars() {
            press(&mut editor, KeyCode::Char(c));
        }
        press(&mut editor, KeyCode::Enter);
        assert_eq!(editor.mode, Mode::Normal);
        assert_eq!(editor.buffer.line_text(0), "first");
    }
}
