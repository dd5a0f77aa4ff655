#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    SelectUp,
    SelectDown,
    Enter,
    Parent,
    JumpTop,
    ChartLeft,
    ChartRight,
    CycleUnit,
    None,
}

#[cfg(feature = "tui")]
pub fn handle_key(key: crossterm::event::KeyEvent) -> Action {
    use crossterm::event::{KeyCode, KeyModifiers};

    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _)
        | (KeyCode::Esc, _)
        | (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,

        // raw CR / LF arrive as Enter or as Ctrl-M / Ctrl-J depending on the terminal
        (KeyCode::Enter, _)
        | (KeyCode::Char('l'), KeyModifiers::NONE)
        | (KeyCode::Char('m'), KeyModifiers::CONTROL)
        | (KeyCode::Char('j'), KeyModifiers::CONTROL) => Action::Enter,

        // arrow keys and vim jk
        (KeyCode::Up, _) | (KeyCode::Char('k'), _) => Action::SelectUp,
        (KeyCode::Down, _) | (KeyCode::Char('j'), _) => Action::SelectDown,

        (KeyCode::Backspace, _) => Action::Parent,

        (KeyCode::Home, _) | (KeyCode::Char('g'), _) => Action::JumpTop,

        // Chart scrolling
        (KeyCode::Left, _) | (KeyCode::Char('h'), _) | (KeyCode::Char('['), _) => Action::ChartLeft,
        (KeyCode::Right, _) | (KeyCode::Char(']'), _) => Action::ChartRight,

        (KeyCode::Char('u'), _) => Action::CycleUnit,

        _ => Action::None,
    }
}
