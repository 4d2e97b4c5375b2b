//! Keybinding handlers for the chat screen
//!
//! Navigation keys always work. Editing keys only reach the input box while
//! the session accepts a submission.

use crate::core::session::ChatSession;
use crate::ui::view::ChatView;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tui_textarea::Input as TAInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLoopAction {
    Continue,
    Break,
}

pub fn handle_key_event(
    key: &KeyEvent,
    view: &mut ChatView,
    session: &mut ChatSession,
) -> KeyLoopAction {
    if key.kind == KeyEventKind::Release {
        return KeyLoopAction::Continue;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    match key.code {
        KeyCode::Char('c') | KeyCode::Char('d') if ctrl => return KeyLoopAction::Break,
        _ => {}
    }

    if handle_navigation_keys(key, view) {
        return KeyLoopAction::Continue;
    }

    if !session.accepts_input() {
        return KeyLoopAction::Continue;
    }

    match key.code {
        KeyCode::Enter if alt || shift => view.insert_newline(),
        KeyCode::Enter => submit_input(view, session),
        _ => {
            view.textarea_mut().input(TAInput::from(*key));
        }
    }

    KeyLoopAction::Continue
}

/// Handles transcript scrolling keys
fn handle_navigation_keys(key: &KeyEvent, view: &mut ChatView) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Up => view.scroll_up(1),
        KeyCode::Down => view.scroll_down(1),
        KeyCode::PageUp => view.page_up(),
        KeyCode::PageDown => view.page_down(),
        KeyCode::Home if ctrl => view.scroll_up(u16::MAX),
        KeyCode::End if ctrl => view.scroll_to_bottom(),
        _ => return false,
    }
    true
}

pub fn handle_paste(text: &str, view: &mut ChatView, session: &ChatSession) {
    if session.accepts_input() {
        view.insert_paste(text);
    }
}

fn submit_input(view: &mut ChatView, session: &mut ChatSession) {
    let text = view.get_input_text();
    let result = session.submit(&text).map(|_| ());
    view.record_submit(result);
}
