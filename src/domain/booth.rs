use crate::infrastructure::storage::{SharedStore, KEY_BOOTH};
use std::fmt;
use tracing::warn;

/// Booth number → token sent to the roulette device
const TOKENS: [(u8, &str); 4] = [(1, "A1"), (2, "B2"), (3, "C3"), (4, "D4")];

/// A kiosk station, always one of 1..=4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Booth(u8);

impl Booth {
    pub const ALL: [Booth; 4] = [Booth(1), Booth(2), Booth(3), Booth(4)];

    pub fn new(number: u8) -> Option<Self> {
        token_for(number).map(|_| Self(number))
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    pub fn token(&self) -> &'static str {
        token_for(self.0).unwrap_or("A1")
    }
}

impl Default for Booth {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for Booth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}번 ({})", self.0, self.token())
    }
}

/// Token lookup. `None` for booths outside 1..=4.
pub fn token_for(booth: u8) -> Option<&'static str> {
    TOKENS
        .iter()
        .find(|(number, _)| *number == booth)
        .map(|(_, token)| *token)
}

/// Persists the selected booth
#[derive(Clone)]
pub struct BoothRegistry {
    store: SharedStore,
}

impl BoothRegistry {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Stored booth, coerced to 1 when missing, unparsable or out of range
    pub fn get_booth(&self) -> Booth {
        self.store
            .get(KEY_BOOTH)
            .and_then(|raw| raw.trim().parse::<u8>().ok())
            .and_then(Booth::new)
            .unwrap_or_default()
    }

    /// Writes the value as given; coercion only happens on read.
    pub fn set_booth(&self, booth: i64) {
        if let Err(e) = self.store.set(KEY_BOOTH, &booth.to_string()) {
            warn!("Failed to persist booth selection: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::{KeyValueStore, MemoryStore};
    use std::sync::Arc;

    #[test]
    fn test_token_table() {
        assert_eq!(token_for(1), Some("A1"));
        assert_eq!(token_for(3), Some("C3"));
        assert_eq!(token_for(4), Some("D4"));
        assert_eq!(token_for(0), None);
        assert_eq!(token_for(5), None);
    }

    #[test]
    fn test_get_booth_coerces_invalid_values() {
        let store = Arc::new(MemoryStore::new());
        let registry = BoothRegistry::new(store.clone());
        assert_eq!(registry.get_booth().number(), 1);

        for raw in ["99", "0", "-3", "abc", "", "2.5"] {
            store.set(KEY_BOOTH, raw).unwrap();
            assert_eq!(registry.get_booth().number(), 1, "stored {:?}", raw);
        }
    }

    #[test]
    fn test_set_booth_writes_verbatim() {
        let store = Arc::new(MemoryStore::new());
        let registry = BoothRegistry::new(store.clone());

        registry.set_booth(3);
        assert_eq!(registry.get_booth().token(), "C3");

        registry.set_booth(42);
        assert_eq!(store.get(KEY_BOOTH).as_deref(), Some("42"));
        assert_eq!(registry.get_booth(), Booth::default());
    }
}
