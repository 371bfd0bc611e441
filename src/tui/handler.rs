use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::Mode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    MoveUp,
    MoveDown,
    NextPage,
    PrevPage,
    CycleStatus,
    CycleDateRange,
    ClearFilters,
    Refresh,
    ViewDraft,
    EditDraft,
    SendDraft,
    DeleteDraft,
    ConfirmYes,
    OpenInBrowser,
    ShowIntegrations,
    DisconnectPlatform,
    ShowHelp,
    ClosePopup,
    // Search input actions
    StartSearch,
    SearchChar(char),
    SearchBackspace,
    SearchDone,
    // Edit/send form actions
    FormChar(char),
    FormBackspace,
    FormNextField,
    FormNewline,
    FormConfirm,
}

pub fn handle_key_event(key: KeyEvent, mode: &Mode) -> Option<AppAction> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(AppAction::Quit);
    }

    match mode {
        // Any key closes help
        Mode::Help => Some(AppAction::ClosePopup),

        Mode::Search => match key.code {
            KeyCode::Enter | KeyCode::Esc => Some(AppAction::SearchDone),
            KeyCode::Backspace => Some(AppAction::SearchBackspace),
            KeyCode::Char(c) => Some(AppAction::SearchChar(c)),
            _ => None,
        },

        Mode::Edit(_) | Mode::Send(_) => match key.code {
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => Some(AppAction::FormNewline),
            KeyCode::Enter => Some(AppAction::FormConfirm),
            KeyCode::Esc => Some(AppAction::ClosePopup),
            KeyCode::Tab => Some(AppAction::FormNextField),
            KeyCode::Backspace => Some(AppAction::FormBackspace),
            KeyCode::Char(c) => Some(AppAction::FormChar(c)),
            _ => None,
        },

        Mode::ConfirmDelete(_) => match key.code {
            KeyCode::Char('y') | KeyCode::Enter => Some(AppAction::ConfirmYes),
            KeyCode::Char('n') | KeyCode::Esc => Some(AppAction::ClosePopup),
            _ => None,
        },

        Mode::ViewDraft => match key.code {
            KeyCode::Char('e') => Some(AppAction::EditDraft),
            KeyCode::Char('s') => Some(AppAction::SendDraft),
            KeyCode::Char('o') => Some(AppAction::OpenInBrowser),
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => Some(AppAction::ClosePopup),
            _ => None,
        },

        Mode::Integrations => match key.code {
            KeyCode::Char('j') | KeyCode::Down => Some(AppAction::MoveDown),
            KeyCode::Char('k') | KeyCode::Up => Some(AppAction::MoveUp),
            KeyCode::Char('x') => Some(AppAction::DisconnectPlatform),
            KeyCode::Char('r') => Some(AppAction::ShowIntegrations),
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('i') => Some(AppAction::ClosePopup),
            _ => None,
        },

        Mode::Normal => match key.code {
            KeyCode::Char('q') => Some(AppAction::Quit),

            KeyCode::Char('j') | KeyCode::Down => Some(AppAction::MoveDown),
            KeyCode::Char('k') | KeyCode::Up => Some(AppAction::MoveUp),
            KeyCode::Char(']') | KeyCode::Right => Some(AppAction::NextPage),
            KeyCode::Char('[') | KeyCode::Left => Some(AppAction::PrevPage),

            KeyCode::Char('f') => Some(AppAction::CycleStatus),
            KeyCode::Char('t') => Some(AppAction::CycleDateRange),
            KeyCode::Char('/') => Some(AppAction::StartSearch),
            KeyCode::Char('c') => Some(AppAction::ClearFilters),
            KeyCode::Char('r') => Some(AppAction::Refresh),

            KeyCode::Enter => Some(AppAction::ViewDraft),
            KeyCode::Char('e') => Some(AppAction::EditDraft),
            KeyCode::Char('s') => Some(AppAction::SendDraft),
            KeyCode::Char('d') => Some(AppAction::DeleteDraft),
            KeyCode::Char('o') => Some(AppAction::OpenInBrowser),

            KeyCode::Char('i') => Some(AppAction::ShowIntegrations),
            KeyCode::Char('?') => Some(AppAction::ShowHelp),

            _ => None,
        },
    }
}
