use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of questions per category (indices run 1..=QUESTIONS_PER_CATEGORY)
pub const QUESTIONS_PER_CATEGORY: u8 = 5;

/// Every question offers exactly this many choices
pub const CHOICE_COUNT: usize = 4;

/// Quiz categories shown on the first play screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "토티쌤")]
    Totissaem,
    #[serde(rename = "캔바")]
    Canva,
    #[serde(rename = "학자시")]
    Hakjasi,
}

impl Category {
    /// Enumeration order of the question bank
    pub const ALL: [Category; 3] = [Category::Totissaem, Category::Canva, Category::Hakjasi];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Totissaem => "토티쌤",
            Self::Canva => "캔바",
            Self::Hakjasi => "학자시",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single quiz card in the question bank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub category: Category,
    pub index: u8,
    pub question: String,
    pub choices: [String; CHOICE_COUNT],
    pub answer: u8,
    pub enabled: bool,
}

impl Question {
    /// Deterministic id for a (category, index) slot, e.g. `캔바-3`
    pub fn make_id(category: Category, index: u8) -> String {
        format!("{}-{}", category.as_str(), index)
    }

    /// The placeholder card used for a slot that has no stored data
    pub fn placeholder(category: Category, index: u8) -> Self {
        Self {
            id: Self::make_id(category, index),
            category,
            index,
            question: format!("{} {}번 문제", category.as_str(), index),
            choices: ["보기1", "보기2", "보기3", "보기4"].map(String::from),
            answer: 0,
            enabled: true,
        }
    }

    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.answer as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
}

/// A roulette peripheral seen while the device picker is open
#[cfg_attr(not(windows), allow(dead_code))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedDevice {
    pub name: String,
    pub address: u64,
    pub signal_strength: i16,
}

/// The user's answer to the device picker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevicePick {
    Selected(u64),
    Cancelled,
}

/// A pick tagged with the picker prompt it answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickerAnswer {
    pub request: u64,
    pub pick: DevicePick,
}

/// Events flowing from the Bluetooth worker back to the UI
#[derive(Debug, Clone)]
pub enum AppEvent {
    ConnectionStatus(ConnectionStatus),
    /// Name of the peripheral once the link is up
    DeviceConnected(String),
    /// The worker is waiting on picker prompt `n`
    PickerOpened(u64),
    #[cfg_attr(not(windows), allow(dead_code))]
    DeviceFound(ScannedDevice),
    StartSent(String),
    LogMessage(StatusMessage),
}

/// Commands sent from the UI to the Bluetooth worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BluetoothCommand {
    Connect,
    Disconnect,
    SendStart,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub message: String,
    pub severity: MessageSeverity,
}

impl StatusMessage {
    pub fn new(message: impl Into<String>, severity: MessageSeverity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSeverity {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Play,
    Admin,
    Settings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_id_format() {
        assert_eq!(Question::make_id(Category::Canva, 3), "캔바-3");
    }

    #[test]
    fn test_category_serializes_as_korean_name() {
        let json = serde_json::to_string(&Category::Hakjasi).unwrap();
        assert_eq!(json, "\"학자시\"");
        let parsed: Category = serde_json::from_str("\"토티쌤\"").unwrap();
        assert_eq!(parsed, Category::Totissaem);
        assert!(serde_json::from_str::<Category>("\"unknown\"").is_err());
    }

    #[test]
    fn test_placeholder_question() {
        let q = Question::placeholder(Category::Canva, 3);
        assert_eq!(q.question, "캔바 3번 문제");
        assert_eq!(q.choices[3], "보기4");
        assert!(q.enabled);
        assert!(q.is_correct(0));
        assert!(!q.is_correct(1));
    }
}
