//! History and favorites, persisted on every change (made by FontLab https://www.fontlab.com/)

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::AsciiLabError;
use crate::store::KeyValueStore;

pub const HISTORY_KEY: &str = "history";
pub const FAVORITES_KEY: &str = "favorites";
pub const HISTORY_LIMIT: usize = 10;

/// A (text, typeface) pair that rendered successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "t")]
    pub text: String,
    #[serde(rename = "f")]
    pub typeface: String,
}

impl HistoryEntry {
    pub fn new(text: impl Into<String>, typeface: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            typeface: typeface.into(),
        }
    }
}

#[derive(Debug)]
pub struct Ledger<S> {
    store: S,
    history: Vec<HistoryEntry>,
    favorites: BTreeSet<String>,
}

impl<S: KeyValueStore> Ledger<S> {
    /// Read both records from `store`; anything absent or malformed starts empty.
    pub async fn load(store: S) -> Self {
        let mut history: Vec<HistoryEntry> = read_record(&store, HISTORY_KEY)
            .await
            .unwrap_or_default();
        history.truncate(HISTORY_LIMIT);
        let favorites: Vec<String> = read_record(&store, FAVORITES_KEY)
            .await
            .unwrap_or_default();

        tracing::debug!(
            history = history.len(),
            favorites = favorites.len(),
            "ledger loaded"
        );

        Self {
            store,
            history,
            favorites: favorites.into_iter().collect(),
        }
    }

    /// Newest first.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn entry(&self, index: usize) -> Option<&HistoryEntry> {
        self.history.get(index)
    }

    pub fn favorites(&self) -> &BTreeSet<String> {
        &self.favorites
    }

    pub fn is_favorite(&self, name: &str) -> bool {
        self.favorites.contains(name)
    }

    /// Move (or insert) the pair to the front. Blank text is ignored.
    pub async fn record(&mut self, text: &str, typeface: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }

        self.history
            .retain(|h| h.text != text || h.typeface != typeface);
        self.history.insert(0, HistoryEntry::new(text, typeface));
        self.history.truncate(HISTORY_LIMIT);
        self.persist_history().await;
        true
    }

    pub async fn clear_history(&mut self) {
        self.history.clear();
        self.persist_history().await;
    }

    /// Returns whether `name` is a favorite afterwards.
    pub async fn toggle_favorite(&mut self, name: &str) -> bool {
        let now_favorite = if self.favorites.remove(name) {
            false
        } else {
            self.favorites.insert(name.to_string());
            true
        };
        self.persist_favorites().await;
        now_favorite
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn persist_history(&mut self) {
        write_record(&mut self.store, HISTORY_KEY, &self.history).await;
    }

    async fn persist_favorites(&mut self) {
        let names: Vec<&String> = self.favorites.iter().collect();
        write_record(&mut self.store, FAVORITES_KEY, &names).await;
    }
}

async fn read_record<S: KeyValueStore, T: DeserializeOwned>(store: &S, key: &str) -> Option<T> {
    let parsed = match store.read(key).await {
        Ok(Some(raw)) => serde_json::from_str(&raw).map_err(|err| err.to_string()),
        Ok(None) => return None,
        Err(err) => Err(format!("{err:#}")),
    };

    match parsed {
        Ok(value) => Some(value),
        Err(message) => {
            let err = AsciiLabError::PersistenceReadFailure {
                key: key.to_string(),
                message,
            };
            tracing::warn!(error = %err, "starting with an empty record");
            None
        }
    }
}

async fn write_record<S: KeyValueStore, T: Serialize + ?Sized>(
    store: &mut S,
    key: &str,
    value: &T,
) {
    let result = match serde_json::to_string(value) {
        Ok(json) => store.write(key, &json).await,
        Err(err) => Err(err.into()),
    };
    if let Err(err) = result {
        tracing::warn!(key, error = %format!("{err:#}"), "could not persist ledger record");
    }
}
