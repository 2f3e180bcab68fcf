//! Key identifiers and key name mapping
//!
//! Mirrors the platform virtual-key set. The symbolic name (e.g. `F8`,
//! `Number1`, `LeftControl`) is what gets persisted; the numeric code is
//! accepted when parsing so hand-edited settings keep working.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

macro_rules! virtual_keys {
    ($($name:ident = $code:literal),+ $(,)?) => {
        /// A physical key drawn from the platform virtual-key enumeration
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum KeyIdentifier {
            $($name),+
        }

        impl KeyIdentifier {
            /// Every known key, in code order
            pub const ALL: &'static [KeyIdentifier] = &[$(KeyIdentifier::$name),+];

            /// Virtual-key code
            pub const fn code(self) -> u16 {
                match self {
                    $(KeyIdentifier::$name => $code),+
                }
            }

            /// Symbolic name, also the persisted form
            pub const fn name(self) -> &'static str {
                match self {
                    $(KeyIdentifier::$name => stringify!($name)),+
                }
            }

            pub fn from_code(code: u16) -> Option<Self> {
                match code {
                    $($code => Some(KeyIdentifier::$name),)+
                    _ => None,
                }
            }

            fn from_name(name: &str) -> Option<Self> {
                match name {
                    $(stringify!($name) => Some(KeyIdentifier::$name),)+
                    _ => None,
                }
            }
        }
    };
}

virtual_keys! {
    LeftButton = 1,
    RightButton = 2,
    Cancel = 3,
    MiddleButton = 4,
    XButton1 = 5,
    XButton2 = 6,
    Back = 8,
    Tab = 9,
    Clear = 12,
    Enter = 13,
    Shift = 16,
    Control = 17,
    Menu = 18,
    Pause = 19,
    CapitalLock = 20,
    Kana = 21,
    ImeOn = 22,
    Junja = 23,
    Final = 24,
    Hanja = 25,
    ImeOff = 26,
    Escape = 27,
    Convert = 28,
    NonConvert = 29,
    Accept = 30,
    ModeChange = 31,
    Space = 32,
    PageUp = 33,
    PageDown = 34,
    End = 35,
    Home = 36,
    Left = 37,
    Up = 38,
    Right = 39,
    Down = 40,
    Select = 41,
    Print = 42,
    Execute = 43,
    Snapshot = 44,
    Insert = 45,
    Delete = 46,
    Help = 47,
    Number0 = 48,
    Number1 = 49,
    Number2 = 50,
    Number3 = 51,
    Number4 = 52,
    Number5 = 53,
    Number6 = 54,
    Number7 = 55,
    Number8 = 56,
    Number9 = 57,
    A = 65,
    B = 66,
    C = 67,
    D = 68,
    E = 69,
    F = 70,
    G = 71,
    H = 72,
    I = 73,
    J = 74,
    K = 75,
    L = 76,
    M = 77,
    N = 78,
    O = 79,
    P = 80,
    Q = 81,
    R = 82,
    S = 83,
    T = 84,
    U = 85,
    V = 86,
    W = 87,
    X = 88,
    Y = 89,
    Z = 90,
    LeftWindows = 91,
    RightWindows = 92,
    Application = 93,
    Sleep = 95,
    NumberPad0 = 96,
    NumberPad1 = 97,
    NumberPad2 = 98,
    NumberPad3 = 99,
    NumberPad4 = 100,
    NumberPad5 = 101,
    NumberPad6 = 102,
    NumberPad7 = 103,
    NumberPad8 = 104,
    NumberPad9 = 105,
    Multiply = 106,
    Add = 107,
    Separator = 108,
    Subtract = 109,
    Decimal = 110,
    Divide = 111,
    F1 = 112,
    F2 = 113,
    F3 = 114,
    F4 = 115,
    F5 = 116,
    F6 = 117,
    F7 = 118,
    F8 = 119,
    F9 = 120,
    F10 = 121,
    F11 = 122,
    F12 = 123,
    F13 = 124,
    F14 = 125,
    F15 = 126,
    F16 = 127,
    F17 = 128,
    F18 = 129,
    F19 = 130,
    F20 = 131,
    F21 = 132,
    F22 = 133,
    F23 = 134,
    F24 = 135,
    NavigationView = 136,
    NavigationMenu = 137,
    NavigationUp = 138,
    NavigationDown = 139,
    NavigationLeft = 140,
    NavigationRight = 141,
    NavigationAccept = 142,
    NavigationCancel = 143,
    NumberKeyLock = 144,
    Scroll = 145,
    LeftShift = 160,
    RightShift = 161,
    LeftControl = 162,
    RightControl = 163,
    LeftMenu = 164,
    RightMenu = 165,
    GoBack = 166,
    GoForward = 167,
    Refresh = 168,
    Stop = 169,
    Search = 170,
    Favorites = 171,
    GoHome = 172,
    GamepadA = 195,
    GamepadB = 196,
    GamepadX = 197,
    GamepadY = 198,
    GamepadRightShoulder = 199,
    GamepadLeftShoulder = 200,
    GamepadLeftTrigger = 201,
    GamepadRightTrigger = 202,
    GamepadDPadUp = 203,
    GamepadDPadDown = 204,
    GamepadDPadLeft = 205,
    GamepadDPadRight = 206,
    GamepadMenu = 207,
    GamepadView = 208,
    GamepadLeftThumbstickButton = 209,
    GamepadRightThumbstickButton = 210,
    GamepadLeftThumbstickUp = 211,
    GamepadLeftThumbstickDown = 212,
    GamepadLeftThumbstickRight = 213,
    GamepadLeftThumbstickLeft = 214,
    GamepadRightThumbstickUp = 215,
    GamepadRightThumbstickDown = 216,
    GamepadRightThumbstickRight = 217,
    GamepadRightThumbstickLeft = 218,
}

/// Alternate names for keys sharing a code with another key
const ALIASES: &[(&str, KeyIdentifier)] = &[
    ("Hangul", KeyIdentifier::Kana),
    ("Kanji", KeyIdentifier::Hanja),
];

/// Error returned when a string names no known key
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown key identifier: {0:?}")]
pub struct UnknownKey(pub String);

impl KeyIdentifier {
    /// Human-readable label for UI display
    pub fn display_name(self) -> String {
        let name = self.name();

        if let Some(digit) = name.strip_prefix("NumberPad") {
            return format!("Numpad {digit}");
        }
        if let Some(digit) = name.strip_prefix("Number")
            && digit.len() == 1
        {
            return digit.to_string();
        }

        match self {
            KeyIdentifier::LeftButton => "Left Mouse".to_string(),
            KeyIdentifier::RightButton => "Right Mouse".to_string(),
            KeyIdentifier::MiddleButton => "Middle Mouse".to_string(),
            KeyIdentifier::XButton1 => "Mouse 4".to_string(),
            KeyIdentifier::XButton2 => "Mouse 5".to_string(),
            KeyIdentifier::Back => "Backspace".to_string(),
            KeyIdentifier::Escape => "Esc".to_string(),
            KeyIdentifier::Menu => "Alt".to_string(),
            KeyIdentifier::LeftMenu => "Left Alt".to_string(),
            KeyIdentifier::RightMenu => "Right Alt".to_string(),
            KeyIdentifier::CapitalLock => "Caps Lock".to_string(),
            KeyIdentifier::NumberKeyLock => "Num Lock".to_string(),
            KeyIdentifier::Scroll => "Scroll Lock".to_string(),
            KeyIdentifier::Snapshot => "Print Screen".to_string(),
            KeyIdentifier::Application => "Context Menu".to_string(),
            KeyIdentifier::ImeOn => "IME On".to_string(),
            KeyIdentifier::ImeOff => "IME Off".to_string(),
            KeyIdentifier::GamepadDPadUp => "Gamepad D-Pad Up".to_string(),
            KeyIdentifier::GamepadDPadDown => "Gamepad D-Pad Down".to_string(),
            KeyIdentifier::GamepadDPadLeft => "Gamepad D-Pad Left".to_string(),
            KeyIdentifier::GamepadDPadRight => "Gamepad D-Pad Right".to_string(),
            // Split CamelCase into words: PageUp -> Page Up, LeftControl -> Left Control
            _ => {
                let mut label = String::with_capacity(name.len() + 4);
                for (i, ch) in name.chars().enumerate() {
                    if i > 0 && ch.is_ascii_uppercase() {
                        label.push(' ');
                    }
                    label.push(ch);
                }
                // Single letters and F-keys contain no inner capitals, so they pass through unchanged
                label
            }
        }
    }
}

impl fmt::Display for KeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KeyIdentifier {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if let Some(key) = KeyIdentifier::from_name(trimmed) {
            return Ok(key);
        }
        if let Some((_, key)) = ALIASES.iter().find(|(alias, _)| *alias == trimmed) {
            return Ok(*key);
        }

        trimmed
            .parse::<u16>()
            .ok()
            .and_then(KeyIdentifier::from_code)
            .ok_or_else(|| UnknownKey(s.to_string()))
    }
}

impl Serialize for KeyIdentifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for KeyIdentifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_symbolic_names() {
        assert_eq!("F8".parse::<KeyIdentifier>(), Ok(KeyIdentifier::F8));
        assert_eq!("F".parse::<KeyIdentifier>(), Ok(KeyIdentifier::F));
        assert_eq!(
            "LeftControl".parse::<KeyIdentifier>(),
            Ok(KeyIdentifier::LeftControl)
        );
        assert_eq!(" Space ".parse::<KeyIdentifier>(), Ok(KeyIdentifier::Space));
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!("f8".parse::<KeyIdentifier>().is_err());
        assert!("space".parse::<KeyIdentifier>().is_err());
    }

    #[test]
    fn test_parse_numeric_codes() {
        assert_eq!("119".parse::<KeyIdentifier>(), Ok(KeyIdentifier::F8));
        assert_eq!("70".parse::<KeyIdentifier>(), Ok(KeyIdentifier::F));
        // Gap in the enumeration
        assert!("7".parse::<KeyIdentifier>().is_err());
        assert!("0".parse::<KeyIdentifier>().is_err());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(
            "NotAKey".parse::<KeyIdentifier>(),
            Err(UnknownKey("NotAKey".to_string()))
        );
        assert!("".parse::<KeyIdentifier>().is_err());
        assert!("None".parse::<KeyIdentifier>().is_err());
    }

    #[test]
    fn test_codes_and_names_are_consistent() {
        for key in KeyIdentifier::ALL {
            assert_eq!(KeyIdentifier::from_code(key.code()), Some(*key));
            assert_eq!(key.name().parse::<KeyIdentifier>(), Ok(*key));
        }
    }

    #[test]
    fn test_display_uses_symbolic_name() {
        assert_eq!(KeyIdentifier::F8.to_string(), "F8");
        assert_eq!(KeyIdentifier::NumberPad3.to_string(), "NumberPad3");
    }

    #[test]
    fn test_display_name() {
        assert_eq!(KeyIdentifier::F8.display_name(), "F8");
        assert_eq!(KeyIdentifier::A.display_name(), "A");
        assert_eq!(KeyIdentifier::Number1.display_name(), "1");
        assert_eq!(KeyIdentifier::NumberPad5.display_name(), "Numpad 5");
        assert_eq!(KeyIdentifier::PageUp.display_name(), "Page Up");
        assert_eq!(KeyIdentifier::LeftControl.display_name(), "Left Control");
        assert_eq!(KeyIdentifier::Escape.display_name(), "Esc");
        assert_eq!(KeyIdentifier::XButton1.display_name(), "Mouse 4");
        assert_eq!(KeyIdentifier::NumberKeyLock.display_name(), "Num Lock");
    }

    #[test]
    fn test_ime_keys_and_aliases() {
        assert_eq!("Kana".parse::<KeyIdentifier>(), Ok(KeyIdentifier::Kana));
        assert_eq!("Hangul".parse::<KeyIdentifier>(), Ok(KeyIdentifier::Kana));
        assert_eq!("Kanji".parse::<KeyIdentifier>(), Ok(KeyIdentifier::Hanja));
        assert_eq!("25".parse::<KeyIdentifier>(), Ok(KeyIdentifier::Hanja));
        assert_eq!(
            "NonConvert".parse::<KeyIdentifier>(),
            Ok(KeyIdentifier::NonConvert)
        );
        assert_eq!(KeyIdentifier::ModeChange.code(), 31);

        // Aliases resolve to the primary name when written back
        let key: KeyIdentifier = serde_json::from_str(r#""Hangul""#).unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), r#""Kana""#);
    }

    #[test]
    fn test_gamepad_and_navigation_keys() {
        assert_eq!("GamepadA".parse::<KeyIdentifier>(), Ok(KeyIdentifier::GamepadA));
        assert_eq!(
            "218".parse::<KeyIdentifier>(),
            Ok(KeyIdentifier::GamepadRightThumbstickLeft)
        );
        assert_eq!(
            "NavigationCancel".parse::<KeyIdentifier>(),
            Ok(KeyIdentifier::NavigationCancel)
        );
        assert_eq!(KeyIdentifier::NavigationView.code(), 136);
        assert_eq!(
            KeyIdentifier::GamepadLeftShoulder.display_name(),
            "Gamepad Left Shoulder"
        );
        assert_eq!(KeyIdentifier::GamepadDPadUp.display_name(), "Gamepad D-Pad Up");
        assert_eq!(KeyIdentifier::ImeOn.display_name(), "IME On");
    }

    #[test]
    fn test_serde_as_name() {
        let json = serde_json::to_string(&KeyIdentifier::F8).unwrap();
        assert_eq!(json, r#""F8""#);

        let key: KeyIdentifier = serde_json::from_str(r#""Tab""#).unwrap();
        assert_eq!(key, KeyIdentifier::Tab);

        assert!(serde_json::from_str::<KeyIdentifier>(r#""Bogus""#).is_err());
    }
}
