use std::fmt;
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyParseError {
    #[error("empty key")]
    Empty,
    #[error("unknown modifier: {0}")]
    UnknownModifier(String),
    #[error("unknown key: {0}")]
    UnknownKey(String),
}

/// A single key with modifiers, written as `"ctrl+c"`, `"Esc"` or `"F1"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl Key {
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub const fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c))
    }

    pub const fn with_ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    /// Character keys compare case-sensitively and ignore SHIFT, since the
    /// character already carries it (`'O'` arrives as `Char('O')` + SHIFT).
    pub fn matches(&self, event: &KeyEvent) -> bool {
        match (self.code, event.code) {
            (KeyCode::Char(a), KeyCode::Char(b)) => {
                a == b
                    && (self.modifiers - KeyModifiers::SHIFT)
                        == (event.modifiers - KeyModifiers::SHIFT)
            }
            _ => self.code == event.code && self.modifiers == event.modifiers,
        }
    }

    pub fn display(&self) -> String {
        let mut parts = Vec::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            parts.push("ctrl".to_string());
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            parts.push("alt".to_string());
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            parts.push("shift".to_string());
        }

        parts.push(match self.code {
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::F(n) => format!("F{n}"),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::Backspace => "Backspace".to_string(),
            KeyCode::Delete => "Delete".to_string(),
            KeyCode::Home => "Home".to_string(),
            KeyCode::End => "End".to_string(),
            KeyCode::PageUp => "PageUp".to_string(),
            KeyCode::PageDown => "PageDown".to_string(),
            KeyCode::Up => "Up".to_string(),
            KeyCode::Down => "Down".to_string(),
            KeyCode::Left => "Left".to_string(),
            KeyCode::Right => "Right".to_string(),
            _ => "?".to_string(),
        });
        parts.join("+")
    }
}

fn parse_code(name: &str) -> Result<KeyCode, KeyParseError> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        // Single characters keep their case.
        return Ok(KeyCode::Char(c));
    }

    let lower = name.to_ascii_lowercase();
    let code = match lower.as_str() {
        "enter" | "return" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" | "pgup" => KeyCode::PageUp,
        "pagedown" | "pgdn" => KeyCode::PageDown,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "space" => KeyCode::Char(' '),
        other => match other.strip_prefix('f').map(str::parse::<u8>) {
            Some(Ok(n)) => KeyCode::F(n),
            _ => return Err(KeyParseError::UnknownKey(name.to_string())),
        },
    };
    Ok(code)
}

impl FromStr for Key {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // "+" alone, or a trailing "+" as in "ctrl++", names the plus key.
        let (prefix, name) = match s.strip_suffix("++") {
            Some(prefix) => (Some(prefix), "+"),
            None if s == "+" => (None, "+"),
            None => match s.rsplit_once('+') {
                Some((prefix, name)) => (Some(prefix), name),
                None => (None, s),
            },
        };
        if name.is_empty() {
            return Err(KeyParseError::Empty);
        }

        let mut modifiers = KeyModifiers::NONE;
        for part in prefix.into_iter().flat_map(|p| p.split('+')) {
            modifiers |= match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => KeyModifiers::CONTROL,
                "alt" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                _ => return Err(KeyParseError::UnknownModifier(part.to_string())),
            };
        }

        Ok(Self {
            code: parse_code(name)?,
            modifiers,
        })
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl Serialize for Key {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.display())
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// One key, or a list of alternatives (`"q"` or `["Up", "k"]` in TOML).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyBinding {
    Single(Key),
    Multiple(Vec<Key>),
}

impl KeyBinding {
    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.keys().iter().any(|key| key.matches(event))
    }

    pub fn display(&self) -> String {
        self.keys()
            .iter()
            .map(Key::display)
            .collect::<Vec<_>>()
            .join("/")
    }

    pub fn keys(&self) -> &[Key] {
        match self {
            Self::Single(key) => std::slice::from_ref(key),
            Self::Multiple(keys) => keys,
        }
    }
}

impl From<Key> for KeyBinding {
    fn from(key: Key) -> Self {
        Self::Single(key)
    }
}

impl From<Vec<Key>> for KeyBinding {
    fn from(keys: Vec<Key>) -> Self {
        Self::Multiple(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_key_parsing() {
        assert_eq!("q".parse::<Key>().unwrap(), Key::char('q'));
        assert_eq!("O".parse::<Key>().unwrap(), Key::char('O'));
        assert_eq!("Esc".parse::<Key>().unwrap(), Key::new(KeyCode::Esc));
        assert_eq!("pgdn".parse::<Key>().unwrap(), Key::new(KeyCode::PageDown));
        assert_eq!("F1".parse::<Key>().unwrap(), Key::new(KeyCode::F(1)));
        assert_eq!(
            "ctrl+c".parse::<Key>().unwrap(),
            Key::with_ctrl(KeyCode::Char('c'))
        );
        assert_eq!("+".parse::<Key>().unwrap(), Key::char('+'));
        assert_eq!(
            "ctrl++".parse::<Key>().unwrap(),
            Key::with_ctrl(KeyCode::Char('+'))
        );
    }

    #[test]
    fn test_key_parse_errors() {
        assert_eq!("".parse::<Key>(), Err(KeyParseError::Empty));
        assert_eq!(
            "hyper+x".parse::<Key>(),
            Err(KeyParseError::UnknownModifier("hyper".to_string()))
        );
        assert_eq!(
            "banana".parse::<Key>(),
            Err(KeyParseError::UnknownKey("banana".to_string()))
        );
    }

    #[test]
    fn test_key_display_round_trips() {
        for text in ["q", "ctrl+c", "Esc", "F5", "Space", "alt+Enter"] {
            assert_eq!(text.parse::<Key>().unwrap().display(), text);
        }
    }

    #[test]
    fn test_char_keys_are_case_sensitive() {
        let lower = Key::char('o');
        let upper = Key::char('O');
        let shifted = press(KeyCode::Char('O'), KeyModifiers::SHIFT);

        assert!(upper.matches(&shifted));
        assert!(!lower.matches(&shifted));
        assert!(lower.matches(&press(KeyCode::Char('o'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_modifiers_must_match() {
        let key = Key::with_ctrl(KeyCode::Char('c'));
        assert!(key.matches(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!key.matches(&press(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!Key::new(KeyCode::Esc).matches(&press(KeyCode::Esc, KeyModifiers::ALT)));
    }

    #[test]
    fn test_binding_alternatives() {
        let binding = KeyBinding::from(vec![Key::new(KeyCode::Up), Key::char('k')]);
        assert!(binding.matches(&press(KeyCode::Char('k'), KeyModifiers::NONE)));
        assert!(binding.matches(&press(KeyCode::Up, KeyModifiers::NONE)));
        assert_eq!(binding.display(), "Up/k");
    }
}
