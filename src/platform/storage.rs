//! Persisted JSON blobs
//!
//! LocalStorage on wasm32; one `<key>.json` file per key on native, written
//! through a temp file so a crash never leaves half a document behind.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// Key/value store for small JSON documents
#[derive(Debug, Clone)]
pub struct Store {
    #[cfg(not(target_arch = "wasm32"))]
    dir: std::path::PathBuf,
}

#[cfg(target_arch = "wasm32")]
impl Store {
    /// The page's `window.localStorage`
    pub fn local() -> Self {
        Self {}
    }

    fn storage() -> Result<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| crate::Error::Storage("localStorage is not available".to_string()))
    }

    pub fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let storage = Self::storage()?;
        match storage.get_item(key) {
            Ok(Some(json)) => Ok(Some(serde_json::from_str(&json)?)),
            Ok(None) => Ok(None),
            Err(_) => Err(crate::Error::Storage(format!("failed to read `{key}`"))),
        }
    }

    pub fn save_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let storage = Self::storage()?;
        let json = serde_json::to_string(value)?;
        storage
            .set_item(key, &json)
            .map_err(|_| crate::Error::Storage(format!("failed to write `{key}`")))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Store {
    /// Files under `dir` (created on first save)
    pub fn in_dir(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> std::path::PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    pub fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::highscores::{HighScoreEntry, HighScores};

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "asteroid-arena-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_missing_key_is_none() {
        let store = Store::in_dir(scratch_dir("missing"));
        let loaded: Option<HighScores> = store.load_json("nothing").expect("readable");
        assert!(loaded.is_none());
    }

    #[test]
    fn test_high_scores_persist() {
        let dir = scratch_dir("persist");
        let store = Store::in_dir(&dir);

        let mut scores = HighScores::new();
        scores.add_score(HighScoreEntry {
            score: 120,
            name: "ace".to_string(),
            seconds_played: 60,
            timestamp: 1.0,
        });
        scores.save(&store).expect("saved");

        assert_eq!(HighScores::load(&store), scores);
        assert!(!dir.join("asteroid_arena_highscores.json.tmp").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_corrupt_file_is_an_error_and_loads_fresh() {
        let dir = scratch_dir("corrupt");
        std::fs::create_dir_all(&dir).expect("dir");
        std::fs::write(dir.join(format!("{}.json", HighScores::STORAGE_KEY)), "{oops")
            .expect("write");
        let store = Store::in_dir(&dir);

        let raw: Result<Option<HighScores>> = store.load_json(HighScores::STORAGE_KEY);
        assert!(matches!(raw, Err(crate::Error::Json(_))));
        assert!(HighScores::load(&store).is_empty());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
