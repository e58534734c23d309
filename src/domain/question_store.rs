//! Question bank persistence.
//!
//! The bank always has the fixed shape `Category::ALL × 1..=QUESTIONS_PER_CATEGORY`.
//! Whatever is read from storage or imported is merged onto that shape field by
//! field; anything that does not fit the shape is dropped.

use crate::domain::error::ImportError;
use crate::domain::models::{Category, Question, CHOICE_COUNT, QUESTIONS_PER_CATEGORY};
use crate::infrastructure::storage::{SharedStore, KEY_QUESTIONS};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Partial question record as found in storage or an import document.
///
/// Fields are only `Some` when they had the right JSON type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionPatch {
    pub id: Option<String>,
    pub question: Option<String>,
    pub choices: Option<Vec<Option<String>>>,
    pub answer: Option<i64>,
    pub enabled: Option<bool>,
}

impl QuestionPatch {
    /// Read a patch from one JSON element. Non-objects yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            id: obj.get("id").and_then(Value::as_str).map(str::to_string),
            question: obj
                .get("question")
                .and_then(Value::as_str)
                .map(str::to_string),
            choices: obj.get("choices").and_then(Value::as_array).map(|items| {
                items
                    .iter()
                    .map(|c| c.as_str().map(str::to_string))
                    .collect()
            }),
            answer: obj.get("answer").and_then(Value::as_i64),
            enabled: obj.get("enabled").and_then(Value::as_bool),
        })
    }

    fn apply(&self, base: &mut Question) {
        if let Some(text) = &self.question {
            base.question = text.clone();
        }
        if let Some(choices) = &self.choices {
            for (slot, choice) in base.choices.iter_mut().zip(choices) {
                if let Some(choice) = choice {
                    *slot = choice.clone();
                }
            }
        }
        if let Some(answer) = self.answer {
            if (0..CHOICE_COUNT as i64).contains(&answer) {
                base.answer = answer as u8;
            }
        }
        if let Some(enabled) = self.enabled {
            base.enabled = enabled;
        }
    }
}

impl From<&Question> for QuestionPatch {
    fn from(q: &Question) -> Self {
        Self {
            id: Some(q.id.clone()),
            question: Some(q.question.clone()),
            choices: Some(q.choices.iter().cloned().map(Some).collect()),
            answer: Some(q.answer as i64),
            enabled: Some(q.enabled),
        }
    }
}

/// Fresh bank in enumeration order: categories outer, indices inner
pub fn default_bank() -> Vec<Question> {
    Category::ALL
        .into_iter()
        .flat_map(|category| {
            (1..=QUESTIONS_PER_CATEGORY).map(move |index| Question::placeholder(category, index))
        })
        .collect()
}

/// Merge candidate records onto the fixed bank shape.
///
/// Matching is by id. When an id repeats, the later record wins.
pub fn normalize(candidates: &[QuestionPatch]) -> Vec<Question> {
    let mut by_id: HashMap<&str, &QuestionPatch> = HashMap::new();
    for patch in candidates {
        if let Some(id) = patch.id.as_deref() {
            by_id.insert(id, patch);
        }
    }

    default_bank()
        .into_iter()
        .map(|mut question| {
            if let Some(patch) = by_id.get(question.id.as_str()) {
                patch.apply(&mut question);
            }
            question
        })
        .collect()
}

pub fn normalize_questions(questions: &[Question]) -> Vec<Question> {
    let patches: Vec<QuestionPatch> = questions.iter().map(QuestionPatch::from).collect();
    normalize(&patches)
}

fn patches_from_array(items: &[Value]) -> Vec<QuestionPatch> {
    items.iter().filter_map(QuestionPatch::from_value).collect()
}

pub fn find(bank: &[Question], category: Category, index: u8) -> Option<&Question> {
    let id = Question::make_id(category, index);
    bank.iter().find(|q| q.id == id)
}

/// Loads and saves the bank through the shared key-value store
#[derive(Clone)]
pub struct QuestionStore {
    store: SharedStore,
}

impl QuestionStore {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Read the persisted bank. Absent or malformed data degrades to defaults.
    pub fn load(&self) -> Vec<Question> {
        let Some(raw) = self.store.get(KEY_QUESTIONS) else {
            debug!("No stored question bank, using defaults");
            return default_bank();
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(items)) => normalize(&patches_from_array(&items)),
            Ok(_) => {
                warn!("Stored question bank is not an array, using defaults");
                default_bank()
            }
            Err(e) => {
                warn!("Stored question bank is malformed, using defaults: {}", e);
                default_bank()
            }
        }
    }

    /// Normalize and persist. Returns exactly what was written.
    pub fn save(&self, questions: &[Question]) -> Vec<Question> {
        let normalized = normalize_questions(questions);
        self.persist(&normalized);
        normalized
    }

    /// Replace a single card by id and persist the whole bank
    pub fn save_one(&self, question: &Question) -> Vec<Question> {
        let mut bank = self.load();
        if let Some(slot) = bank.iter_mut().find(|q| q.id == question.id) {
            *slot = question.clone();
        } else {
            warn!("Ignoring save for unknown question id {}", question.id);
        }
        self.save(&bank)
    }

    pub fn reset(&self) -> Vec<Question> {
        info!("Resetting question bank to defaults");
        let bank = default_bank();
        self.persist(&bank);
        bank
    }

    pub fn export_json(&self) -> String {
        serde_json::to_string_pretty(&self.load()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Replace the bank with an imported document. On error the bank is untouched.
    pub fn import_json(&self, document: &str) -> Result<Vec<Question>, ImportError> {
        let value: Value = serde_json::from_str(document)
            .map_err(|e| ImportError::InvalidJson(e.to_string()))?;
        let Value::Array(items) = value else {
            return Err(ImportError::NotAnArray);
        };

        let bank = normalize(&patches_from_array(&items));
        self.persist(&bank);
        info!("Imported question bank ({} records in document)", items.len());
        Ok(bank)
    }

    fn persist(&self, bank: &[Question]) {
        let json = match serde_json::to_string(bank) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to encode question bank: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(KEY_QUESTIONS, &json) {
            warn!("Failed to persist question bank: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::{KeyValueStore, MemoryStore};
    use std::sync::Arc;

    fn store_with(raw: Option<&str>) -> QuestionStore {
        let backing = MemoryStore::new();
        if let Some(raw) = raw {
            backing.set(KEY_QUESTIONS, raw).unwrap();
        }
        QuestionStore::new(Arc::new(backing))
    }

    fn assert_fixed_shape(bank: &[Question]) {
        assert_eq!(
            bank.len(),
            Category::ALL.len() * QUESTIONS_PER_CATEGORY as usize
        );
        let mut expected = Vec::new();
        for category in Category::ALL {
            for index in 1..=QUESTIONS_PER_CATEGORY {
                expected.push(Question::make_id(category, index));
            }
        }
        let ids: Vec<&str> = bank.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, expected);
        assert!(bank.iter().all(|q| (q.answer as usize) < CHOICE_COUNT));
    }

    #[test]
    fn test_load_absent_or_malformed_gives_defaults() {
        for raw in [None, Some("not json"), Some("{\"a\":1}"), Some("42"), Some("[1, \"x\", null]")] {
            let bank = store_with(raw).load();
            assert_fixed_shape(&bank);
            assert_eq!(bank, default_bank());
        }
    }

    #[test]
    fn test_normalize_follows_shape_order_and_drops_unknown() {
        let candidates = vec![
            QuestionPatch {
                id: Some("학자시-5".into()),
                question: Some("last".into()),
                ..Default::default()
            },
            QuestionPatch {
                id: Some("캔바-99".into()),
                question: Some("out of range".into()),
                ..Default::default()
            },
            QuestionPatch {
                id: None,
                question: Some("no id".into()),
                ..Default::default()
            },
        ];

        let bank = normalize(&candidates);
        assert_fixed_shape(&bank);
        assert_eq!(bank.last().unwrap().question, "last");
        assert!(bank.iter().all(|q| q.question != "out of range"));
        assert!(bank.iter().all(|q| q.question != "no id"));
    }

    #[test]
    fn test_normalize_field_validation() {
        let raw = r#"[{"id":"토티쌤-1","answer":7,"choices":["a",3,"c","d","e"],"enabled":"no","question":5}]"#;
        let bank = store_with(Some(raw)).load();
        let q = find(&bank, Category::Totissaem, 1).unwrap();
        assert_eq!(q.answer, 0);
        assert_eq!(q.choices, ["a", "보기2", "c", "d"].map(String::from));
        assert!(q.enabled);
        assert_eq!(q.question, "토티쌤 1번 문제");
    }

    #[test]
    fn test_duplicate_ids_later_record_wins() {
        let raw = r#"[{"id":"캔바-1","answer":1},{"id":"캔바-1","answer":3}]"#;
        let bank = store_with(Some(raw)).load();
        assert_fixed_shape(&bank);
        assert_eq!(find(&bank, Category::Canva, 1).unwrap().answer, 3);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = r#"[{"id":"캔바-2","question":"Q?","choices":["x"],"answer":2,"enabled":false}]"#;
        let once = store_with(Some(raw)).load();
        let twice = normalize_questions(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let store = store_with(None);
        let mut bank = default_bank();
        bank[4].question = "edited".into();
        bank[4].answer = 3;
        bank[7].enabled = false;
        bank.swap(0, 10);

        let saved = store.save(&bank);
        assert_eq!(saved, normalize_questions(&bank));
        assert_eq!(store.load(), saved);
        assert_fixed_shape(&saved);
    }

    #[test]
    fn test_save_one_replaces_single_card() {
        let store = store_with(None);
        let mut card = Question::placeholder(Category::Hakjasi, 2);
        card.question = "새 문제".into();
        card.answer = 1;

        let bank = store.save_one(&card);
        assert_eq!(find(&bank, Category::Hakjasi, 2), Some(&card));
        assert_eq!(store.load(), bank);
    }

    #[test]
    fn test_import_partial_record() {
        let store = store_with(None);
        let bank = store.import_json(r#"[{"id":"캔바-3","answer":2}]"#).unwrap();

        let mut expected = default_bank();
        let slot = expected.iter_mut().find(|q| q.id == "캔바-3").unwrap();
        slot.answer = 2;
        assert_eq!(bank, expected);
        assert_eq!(store.load(), expected);
    }

    #[test]
    fn test_invalid_import_leaves_bank_unchanged() {
        let store = store_with(None);
        let mut card = Question::placeholder(Category::Canva, 1);
        card.question = "keep me".into();
        let before = store.save_one(&card);

        assert!(matches!(
            store.import_json("{oops"),
            Err(ImportError::InvalidJson(_))
        ));
        assert_eq!(
            store.import_json(r#"{"id":"캔바-1"}"#),
            Err(ImportError::NotAnArray)
        );
        assert_eq!(store.load(), before);
    }

    #[test]
    fn test_export_then_reset() {
        let store = store_with(None);
        let mut card = Question::placeholder(Category::Totissaem, 4);
        card.enabled = false;
        let bank = store.save_one(&card);

        let exported = store.export_json();
        let parsed: Vec<Question> = serde_json::from_str(&exported).unwrap();
        assert_eq!(parsed, bank);

        assert_eq!(store.reset(), default_bank());
        assert_eq!(store.load(), default_bank());
    }
}
