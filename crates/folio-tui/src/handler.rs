use std::time::Instant;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, Screen};
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Paste(text) => {
            if app.chat.state().is_panel_open() && app.input_focused {
                // single-line input
                let flat: String = text.chars().filter(|c| !c.is_control()).collect();
                app.chat.input_mut().insert_str(&flat);
            }
        }
        AppEvent::Resize(_, _) => app.scroll_to_end_pending = true,
        AppEvent::Tick => app.tick(Instant::now()),
    }
    app.poll_query_task().await;
    app.apply_effects(Instant::now());
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if !app.chat.state().is_panel_open() {
        handle_page_keys(app, key);
    } else if app.input_focused {
        handle_input_keys(app, key);
    } else {
        handle_panel_keys(app, key);
    }
}

fn handle_page_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Open the chat widget
        KeyCode::Char('c') | KeyCode::Char('a') | KeyCode::Enter => app.open_chat(),

        // Page switching
        KeyCode::Tab | KeyCode::BackTab => {
            app.screen = app.screen.next();
            app.page_scroll = 0;
        }
        KeyCode::Char('1') => {
            app.screen = Screen::Home;
            app.page_scroll = 0;
        }
        KeyCode::Char('2') => {
            app.screen = Screen::Dashboard;
            app.page_scroll = 0;
        }

        KeyCode::Char('j') | KeyCode::Down => app.page_scroll = app.page_scroll.saturating_add(1),
        KeyCode::Char('k') | KeyCode::Up => app.page_scroll = app.page_scroll.saturating_sub(1),
        KeyCode::Char('g') => app.page_scroll = 0,

        _ => {}
    }
}

/// Panel open, input not focused (before the focus delay elapses or after Esc).
fn handle_panel_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Esc | KeyCode::Char('c') => app.close_chat(),
        KeyCode::Char('i') | KeyCode::Char('/') => {
            app.focus_at = None;
            app.input_focused = true;
        }

        KeyCode::Char('j') | KeyCode::Down => {
            if app.chat.show_suggestions() {
                app.suggestion_nav_down();
            } else {
                app.scroll_chat_down(1);
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if app.chat.show_suggestions() {
                app.suggestion_nav_up();
            } else {
                app.scroll_chat_up(1);
            }
        }
        KeyCode::Enter => {
            if let Some(i) = app.suggestion_state.selected() {
                app.submit_suggestion(i);
            }
        }
        KeyCode::Char(d @ '1'..='9') => {
            if let Some(n) = d.to_digit(10) {
                app.submit_suggestion(n as usize - 1);
            }
        }

        // Half-page scroll
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_chat_down(app.chat_height / 2);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_chat_up(app.chat_height / 2);
        }
        KeyCode::Char('G') => app.scroll_chat_to_end(),

        _ => {}
    }
}

fn handle_input_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_focused = false;
        }
        KeyCode::Enter => {
            // With nothing typed, Enter picks the highlighted suggestion.
            if app.chat.input().is_blank() {
                if let Some(i) = app.suggestion_state.selected() {
                    app.submit_suggestion(i);
                    return;
                }
            }
            app.submit_input();
        }
        KeyCode::Up => {
            if app.chat.show_suggestions() {
                app.suggestion_nav_up();
            } else {
                app.scroll_chat_up(1);
            }
        }
        KeyCode::Down => {
            if app.chat.show_suggestions() {
                app.suggestion_nav_down();
            } else {
                app.scroll_chat_down(1);
            }
        }
        KeyCode::PageUp => app.scroll_chat_up(app.chat_height.max(1)),
        KeyCode::PageDown => app.scroll_chat_down(app.chat_height.max(1)),

        KeyCode::Backspace => app.chat.input_mut().backspace(),
        KeyCode::Delete => app.chat.input_mut().delete(),
        KeyCode::Left => app.chat.input_mut().move_left(),
        KeyCode::Right => app.chat.input_mut().move_right(),
        KeyCode::Home => app.chat.input_mut().move_home(),
        KeyCode::End => app.chat.input_mut().move_end(),
        // Ctrl and Alt chords are not text
        KeyCode::Char(c) if key.modifiers.difference(KeyModifiers::SHIFT).is_empty() => {
            app.chat.input_mut().insert(c)
        }
        _ => {}
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    let in_chat = app.chat_area.is_some_and(|r| point_in_rect(x, y, r));
    let in_launcher = app.launcher_area.is_some_and(|r| point_in_rect(x, y, r));

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            if in_chat {
                app.scroll_chat_down(3);
            } else {
                app.page_scroll = app.page_scroll.saturating_add(3);
            }
        }
        MouseEventKind::ScrollUp => {
            if in_chat {
                app.scroll_chat_up(3);
            } else {
                app.page_scroll = app.page_scroll.saturating_sub(3);
            }
        }
        MouseEventKind::Down(MouseButton::Left) => {
            if in_launcher {
                app.toggle_chat();
            } else if let Some(area) = app.suggestions_area {
                // one suggestion per row inside the bordered list
                if app.chat.show_suggestions() && point_in_rect(x, y, area) && y > area.y {
                    let index = (y - area.y - 1) as usize;
                    app.submit_suggestion(index);
                }
            }
        }
        _ => {}
    }
}
