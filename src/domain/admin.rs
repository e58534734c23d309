//! Admin screen: PIN gate, question edit buffer, booth selection and
//! bulk import/export.
//!
//! The login flag is persisted and survives restarts until an explicit
//! logout. It behaves like a long-lived credential, not a session.

use crate::domain::booth::{Booth, BoothRegistry};
use crate::domain::error::{AuthError, ImportError};
use crate::domain::models::Question;
use crate::domain::question_store::QuestionStore;
use crate::infrastructure::storage::{SharedStore, KEY_ADMIN};
use std::collections::HashMap;
use tracing::{info, warn};

pub const ADMIN_PIN: &str = "0228";

#[derive(Clone)]
pub struct AdminGate {
    store: SharedStore,
}

impl AdminGate {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.get(KEY_ADMIN).as_deref() == Some("true")
    }

    pub fn login(&self, pin: &str) -> Result<(), AuthError> {
        if pin != ADMIN_PIN {
            warn!("Admin login rejected");
            return Err(AuthError::AuthenticationFailure);
        }
        if let Err(e) = self.store.set(KEY_ADMIN, "true") {
            warn!("Failed to persist admin flag: {}", e);
        }
        info!("Admin logged in");
        Ok(())
    }

    pub fn logout(&self) {
        if let Err(e) = self.store.remove(KEY_ADMIN) {
            warn!("Failed to clear admin flag: {}", e);
        }
        info!("Admin logged out");
    }
}

/// In-memory drafts keyed by question id.
///
/// The UI edits drafts; the store only ever receives complete records.
#[derive(Debug, Default)]
pub struct EditBuffer {
    order: Vec<String>,
    saved: HashMap<String, Question>,
    drafts: HashMap<String, Question>,
}

impl EditBuffer {
    pub fn from_bank(bank: &[Question]) -> Self {
        let mut buffer = Self::default();
        buffer.sync(bank);
        buffer
    }

    /// Replace baseline and drafts with the given bank
    pub fn sync(&mut self, bank: &[Question]) {
        self.order = bank.iter().map(|q| q.id.clone()).collect();
        self.saved = bank.iter().map(|q| (q.id.clone(), q.clone())).collect();
        self.drafts = self.saved.clone();
    }

    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn draft(&self, id: &str) -> Option<&Question> {
        self.drafts.get(id)
    }

    pub fn draft_mut(&mut self, id: &str) -> Option<&mut Question> {
        self.drafts.get_mut(id)
    }

    pub fn is_dirty(&self, id: &str) -> bool {
        self.drafts.get(id) != self.saved.get(id)
    }

    pub fn has_changes(&self) -> bool {
        self.order.iter().any(|id| self.is_dirty(id))
    }

    /// Drafts in bank order
    pub fn to_bank(&self) -> Vec<Question> {
        self.order
            .iter()
            .filter_map(|id| self.drafts.get(id).cloned())
            .collect()
    }

    /// Throw away unsaved edits
    pub fn discard(&mut self) {
        self.drafts = self.saved.clone();
    }

    /// Single-card save. Other drafts keep their unsaved edits.
    pub fn commit(&mut self, id: &str, questions: &QuestionStore) -> Option<Question> {
        let draft = self.drafts.get(id)?.clone();
        let bank = questions.save_one(&draft);
        let pending: Vec<Question> = self
            .order
            .iter()
            .filter(|other| other.as_str() != id && self.is_dirty(other))
            .filter_map(|other| self.drafts.get(other).cloned())
            .collect();

        self.sync(&bank);
        for q in pending {
            self.drafts.insert(q.id.clone(), q);
        }
        self.saved.get(id).cloned()
    }

    pub fn commit_all(&mut self, questions: &QuestionStore) -> Vec<Question> {
        let bank = questions.save(&self.to_bank());
        self.sync(&bank);
        bank
    }
}

/// Everything the admin tab edits
pub struct AdminFlow {
    gate: AdminGate,
    questions: QuestionStore,
    booths: BoothRegistry,
    pub buffer: EditBuffer,
    /// Text area used for export output and import input
    pub document: String,
}

impl AdminFlow {
    pub fn new(gate: AdminGate, questions: QuestionStore, booths: BoothRegistry) -> Self {
        let buffer = EditBuffer::from_bank(&questions.load());
        Self {
            gate,
            questions,
            booths,
            buffer,
            document: String::new(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.gate.is_authenticated()
    }

    pub fn login(&mut self, pin: &str) -> Result<(), AuthError> {
        self.gate.login(pin)?;
        self.refresh();
        Ok(())
    }

    pub fn logout(&mut self) {
        self.gate.logout();
        self.document.clear();
    }

    /// Reload drafts from storage, dropping unsaved edits
    pub fn refresh(&mut self) {
        self.buffer.sync(&self.questions.load());
    }

    pub fn save_card(&mut self, id: &str) -> Option<Question> {
        self.buffer.commit(id, &self.questions)
    }

    pub fn save_all(&mut self) -> Vec<Question> {
        self.buffer.commit_all(&self.questions)
    }

    pub fn reset_bank(&mut self) -> Vec<Question> {
        let bank = self.questions.reset();
        self.buffer.sync(&bank);
        bank
    }

    pub fn export(&mut self) -> &str {
        self.document = self.questions.export_json();
        &self.document
    }

    /// Import from the document text area
    pub fn import(&mut self) -> Result<Vec<Question>, ImportError> {
        let bank = self.questions.import_json(&self.document)?;
        self.buffer.sync(&bank);
        Ok(bank)
    }

    pub fn booth(&self) -> Booth {
        self.booths.get_booth()
    }

    pub fn set_booth(&self, booth: Booth) {
        self.booths.set_booth(booth.number() as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::question_store::default_bank;
    use crate::infrastructure::storage::MemoryStore;

    fn admin_flow() -> AdminFlow {
        let store = MemoryStore::shared();
        AdminFlow::new(
            AdminGate::new(store.clone()),
            QuestionStore::new(store.clone()),
            BoothRegistry::new(store),
        )
    }

    #[test]
    fn test_pin_gate() {
        let mut flow = admin_flow();
        assert!(!flow.is_authenticated());
        assert_eq!(flow.login("1234"), Err(AuthError::AuthenticationFailure));
        assert!(!flow.is_authenticated());

        flow.login(ADMIN_PIN).unwrap();
        assert!(flow.is_authenticated());

        flow.logout();
        assert!(!flow.is_authenticated());
    }

    #[test]
    fn test_login_flag_is_persisted() {
        let store = MemoryStore::shared();
        AdminGate::new(store.clone()).login(ADMIN_PIN).unwrap();
        assert!(AdminGate::new(store).is_authenticated());
    }

    #[test]
    fn test_commit_single_card_keeps_other_drafts() {
        let mut flow = admin_flow();
        flow.buffer.draft_mut("캔바-1").unwrap().question = "first".into();
        flow.buffer.draft_mut("캔바-2").unwrap().question = "second".into();
        assert!(flow.buffer.is_dirty("캔바-1"));

        let saved = flow.save_card("캔바-1").unwrap();
        assert_eq!(saved.question, "first");
        assert!(!flow.buffer.is_dirty("캔바-1"));
        assert!(flow.buffer.is_dirty("캔바-2"));

        let stored = flow.questions.load();
        assert_eq!(stored.iter().find(|q| q.id == "캔바-2").unwrap().question, "캔바 2번 문제");
    }

    #[test]
    fn test_commit_all_and_discard() {
        let mut flow = admin_flow();
        flow.buffer.draft_mut("학자시-5").unwrap().answer = 3;
        flow.save_all();
        assert!(!flow.buffer.has_changes());
        assert_eq!(flow.questions.load().last().unwrap().answer, 3);

        flow.buffer.draft_mut("학자시-5").unwrap().enabled = false;
        flow.buffer.discard();
        assert!(flow.buffer.draft("학자시-5").unwrap().enabled);
    }

    #[test]
    fn test_import_export_and_reset() {
        let mut flow = admin_flow();
        flow.document = r#"[{"id":"토티쌤-2","question":"imported"}]"#.to_string();
        flow.import().unwrap();
        assert_eq!(flow.buffer.draft("토티쌤-2").unwrap().question, "imported");

        let exported = flow.export().to_string();
        assert!(exported.contains("imported"));

        flow.document = "not json".to_string();
        assert!(flow.import().is_err());
        assert_eq!(flow.buffer.draft("토티쌤-2").unwrap().question, "imported");

        assert_eq!(flow.reset_bank(), default_bank());
        assert_eq!(flow.buffer.to_bank(), default_bank());
    }

    #[test]
    fn test_booth_selection() {
        let flow = admin_flow();
        assert_eq!(flow.booth().number(), 1);
        flow.set_booth(Booth::new(4).unwrap());
        assert_eq!(flow.booth().token(), "D4");
    }
}
