use std::collections::BTreeMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Actions of the demo host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    OpenFileMenu,
    OpenEditMenu,
    OpenViewMenu,
    OpenCentered,
    OpenNested,
    ToggleModalRoute,
    DismissTopmost,
    DismissAll,
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::OpenFileMenu => "Open the File menu",
            Action::OpenEditMenu => "Open the Edit menu",
            Action::OpenViewMenu => "Open the View menu",
            Action::OpenCentered => "Open a centered message",
            Action::OpenNested => "Open a nested panel over the top one",
            Action::ToggleModalRoute => "Push / pop a simulated modal route",
            Action::DismissTopmost => "Dismiss the topmost panel",
            Action::DismissAll => "Dismiss every panel",
            Action::Quit => "Quit",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        key.code == self.code && key.modifiers == self.mods
    }

    pub fn display(&self) -> String {
        let mut parts = Vec::new();
        if self.mods.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.mods.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }
        let code = match self.code {
            KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::F(n) => format!("F{}", n),
            _ => format!("{:?}", self.code),
        };
        parts.push(code);
        parts.join("+")
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeyBindings {
    map: BTreeMap<Action, Vec<KeyCombo>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn standard() -> Self {
        use Action::*;
        let mut kb = Self::new();
        kb.add(OpenFileMenu, KeyCombo::plain(KeyCode::Char('1')));
        kb.add(OpenEditMenu, KeyCombo::plain(KeyCode::Char('2')));
        kb.add(OpenViewMenu, KeyCombo::plain(KeyCode::Char('3')));
        kb.add(OpenCentered, KeyCombo::plain(KeyCode::Char('c')));
        kb.add(OpenNested, KeyCombo::plain(KeyCode::Char('n')));
        kb.add(ToggleModalRoute, KeyCombo::plain(KeyCode::Char('m')));
        kb.add(DismissTopmost, KeyCombo::plain(KeyCode::Esc));
        kb.add(DismissAll, KeyCombo::plain(KeyCode::Char('x')));
        kb.add(Quit, KeyCombo::plain(KeyCode::Char('q')));
        kb.add(Quit, KeyCombo::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        kb
    }

    pub fn add(&mut self, action: Action, combo: KeyCombo) {
        self.map.entry(action).or_default().push(combo);
    }

    pub fn matches(&self, action: Action, key: &KeyEvent) -> bool {
        self.map
            .get(&action)
            .is_some_and(|list| list.iter().any(|c| c.matches(key)))
    }

    pub fn action_for_key(&self, key: &KeyEvent) -> Option<Action> {
        self.map
            .iter()
            .find(|(_, list)| list.iter().any(|c| c.matches(key)))
            .map(|(act, _)| *act)
    }

    /// `(action, key labels)` in declaration order.
    pub fn help_entries(&self) -> Vec<(Action, Vec<String>)> {
        self.map
            .iter()
            .map(|(act, list)| (*act, list.iter().map(KeyCombo::display).collect()))
            .collect()
    }
}
