//! Top score persistence
//!
//! One integer under one key. LocalStorage on the web; in-memory elsewhere
//! (native builds and tests).

use crate::error::StorageError;

/// LocalStorage key
pub const TOP_SCORE_KEY: &str = "hoop_shot_top_score";

/// Key-value port for the best score
pub trait TopScoreStore {
    /// Stored best, 0 if nothing saved yet
    fn load(&self) -> Result<u32, StorageError>;
    fn save(&mut self, score: u32) -> Result<(), StorageError>;
}

/// Parse a stored value, treating a missing key as 0
pub fn parse_top_score(raw: Option<&str>) -> Result<u32, StorageError> {
    match raw {
        None => Ok(0),
        Some(s) => s
            .trim()
            .parse::<u32>()
            .map_err(|_| StorageError::Corrupt(s.to_string())),
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    value: Option<String>,
    /// Number of successful saves
    pub writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_top_score(score: u32) -> Self {
        Self {
            value: Some(score.to_string()),
            writes: 0,
        }
    }

    /// Store whatever raw text LocalStorage might hold
    pub fn with_raw(raw: &str) -> Self {
        Self {
            value: Some(raw.to_string()),
            writes: 0,
        }
    }
}

impl TopScoreStore for MemoryStore {
    fn load(&self) -> Result<u32, StorageError> {
        parse_top_score(self.value.as_deref())
    }

    fn save(&mut self, score: u32) -> Result<(), StorageError> {
        self.value = Some(score.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// Browser LocalStorage backed store
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StorageError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl TopScoreStore for LocalStorageStore {
    fn load(&self) -> Result<u32, StorageError> {
        let storage = Self::storage()?;
        let raw = storage
            .get_item(TOP_SCORE_KEY)
            .map_err(|_| StorageError::Unavailable)?;
        let score = parse_top_score(raw.as_deref())?;
        log::info!("Loaded top score {}", score);
        Ok(score)
    }

    fn save(&mut self, score: u32) -> Result<(), StorageError> {
        Self::storage()?
            .set_item(TOP_SCORE_KEY, &score.to_string())
            .map_err(|_| StorageError::WriteFailed)?;
        log::info!("Top score saved ({})", score);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_top_score() {
        assert_eq!(parse_top_score(None).unwrap(), 0);
        assert_eq!(parse_top_score(Some("42")).unwrap(), 42);
        assert_eq!(parse_top_score(Some(" 7 ")).unwrap(), 7);
        assert!(matches!(
            parse_top_score(Some("lots")),
            Err(StorageError::Corrupt(_))
        ));
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load().unwrap(), 0);
        store.save(55).unwrap();
        assert_eq!(store.load().unwrap(), 55);
        assert_eq!(store.writes, 1);
    }
}
