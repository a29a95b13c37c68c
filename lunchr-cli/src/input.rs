use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::App;

#[derive(Debug, Clone, Copy)]
pub(crate) enum Action {
    None,
    Quit,
    /// Ask the service for a refetch.
    Refresh,
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Char, Down, End, Home, Up};

    // Global quit shortcuts
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }
    if !key.modifiers.is_empty() && key.modifiers != KeyModifiers::SHIFT {
        return Action::None;
    }

    match key.code {
        Char('q') | KeyCode::Esc => return Action::Quit,
        Char('r') => return Action::Refresh,
        Up | Char('k') => app.select_previous(),
        Down | Char('j') => app.select_next(),
        Home | Char('g') => app.list_index = 0,
        End | Char('G') => app.list_index = app.menus().len().saturating_sub(1),
        _ => {}
    }
    Action::None
}
