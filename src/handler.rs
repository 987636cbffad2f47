use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::App;
use crate::router::Route;
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick(),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.is_chat_open() {
        handle_chat_key(app, key);
    } else {
        handle_page_key(app, key);
    }
}

fn handle_page_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Routes
        KeyCode::Char('1') => app.navigate(Route::Home),
        KeyCode::Char('2') => app.navigate(Route::Requirements),
        KeyCode::Char('3') => app.navigate(Route::Tuition),
        KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => app.navigate(app.route.next()),
        KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => app.navigate(app.route.prev()),

        // Half-page scroll
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_down();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_up();
        }

        // Page scroll
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(1),
        KeyCode::PageDown => app.scroll_half_page_down(),
        KeyCode::PageUp => app.scroll_half_page_up(),
        KeyCode::Char('g') | KeyCode::Home => app.scroll_top(),
        KeyCode::Char('G') | KeyCode::End => app.scroll_bottom(),

        // Chat with our Assistant
        KeyCode::Char('c') => app.open_chat(),
        KeyCode::Enter if app.route == Route::Home => app.open_chat(),

        _ => {}
    }
}

fn handle_chat_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        app.close_chat();
        return;
    }

    let Some(chat) = app.chat.as_mut() else {
        return;
    };

    match key.code {
        KeyCode::Enter => {
            chat.submit_input();
        }
        KeyCode::Backspace => chat.backspace(),
        KeyCode::Delete => chat.delete(),
        KeyCode::Left => chat.cursor_left(),
        KeyCode::Right => chat.cursor_right(),
        KeyCode::Home => chat.cursor_home(),
        KeyCode::End => chat.cursor_end(),

        // Transcript scroll
        KeyCode::Up => chat.scroll_up(1),
        KeyCode::Down => chat.scroll_down(1),
        KeyCode::PageUp => chat.scroll_up(5),
        KeyCode::PageDown => chat.scroll_down(5),

        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => chat.insert_char(c),
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    // The chat panel sits on top of the page
    let in_chat = app.chat_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_page = app.page_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            if in_chat {
                if let Some(chat) = app.chat.as_mut() {
                    chat.scroll_down(3);
                }
            } else if in_page {
                app.scroll_down(3);
            }
        }
        MouseEventKind::ScrollUp => {
            if in_chat {
                if let Some(chat) = app.chat.as_mut() {
                    chat.scroll_up(3);
                }
            } else if in_page {
                app.scroll_up(3);
            }
        }
        _ => {}
    }
}
