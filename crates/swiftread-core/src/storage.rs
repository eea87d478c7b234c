//! Document identity and durable reading progress.

use std::{
    collections::BTreeMap,
    fmt, fs,
    path::{Path, PathBuf},
};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    chapter::Chapter,
    error::StoreError,
    settings::{ReaderSettings, SettingsStore},
};

/// Stable key of a loaded document, compared by value.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Identity derived from the source file: name followed by byte size.
    pub fn from_file(name: &str, size: u64) -> Self {
        Self(format!("{name}{size}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Full word data of the current document slot.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub words: Vec<String>,
    pub chapters: Vec<Chapter>,
}

/// Abstract progress persistence backend.
///
/// Holds a per-document last position and a single current-document slot
/// with the full word data.
pub trait ProgressStore {
    type Error: fmt::Debug;

    fn last_position(&mut self, id: &DocumentId) -> Result<Option<usize>, Self::Error>;
    fn set_last_position(&mut self, id: &DocumentId, position: usize) -> Result<(), Self::Error>;
    fn save_document(
        &mut self,
        id: &DocumentId,
        words: &[String],
        chapters: &[Chapter],
    ) -> Result<(), Self::Error>;
    fn load_document(&mut self) -> Result<Option<StoredDocument>, Self::Error>;
}

/// Volatile store, used when no durable backend is available.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    positions: BTreeMap<DocumentId, usize>,
    document: Option<StoredDocument>,
    settings: Option<ReaderSettings>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryStore {
    type Error = core::convert::Infallible;

    fn last_position(&mut self, id: &DocumentId) -> Result<Option<usize>, Self::Error> {
        Ok(self.positions.get(id).copied())
    }

    fn set_last_position(&mut self, id: &DocumentId, position: usize) -> Result<(), Self::Error> {
        self.positions.insert(id.clone(), position);
        Ok(())
    }

    fn save_document(
        &mut self,
        id: &DocumentId,
        words: &[String],
        chapters: &[Chapter],
    ) -> Result<(), Self::Error> {
        self.document = Some(StoredDocument {
            id: id.clone(),
            words: words.to_vec(),
            chapters: chapters.to_vec(),
        });
        Ok(())
    }

    fn load_document(&mut self) -> Result<Option<StoredDocument>, Self::Error> {
        Ok(self.document.clone())
    }
}

impl SettingsStore for MemoryStore {
    type Error = core::convert::Infallible;

    fn load(&mut self) -> Result<Option<ReaderSettings>, Self::Error> {
        Ok(self.settings)
    }

    fn save(&mut self, settings: &ReaderSettings) -> Result<(), Self::Error> {
        self.settings = Some(*settings);
        Ok(())
    }
}

const POSITIONS_FILE: &str = "positions.json";
const DOCUMENT_FILE: &str = "current_document.json";
const SETTINGS_FILE: &str = "settings.json";

/// JSON files under a state directory: one map of positions, one current
/// document slot and the reader settings.
#[derive(Debug)]
pub struct JsonFileStore {
    root: PathBuf,
    positions: BTreeMap<DocumentId, usize>,
}

impl JsonFileStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;

        let positions = match read_json(&root.join(POSITIONS_FILE)) {
            Ok(positions) => positions.unwrap_or_default(),
            Err(StoreError::Serialization(err)) => {
                warn!(
                    "store: positions unreadable, starting empty root={} err={}",
                    root.display(),
                    err
                );
                BTreeMap::new()
            }
            Err(err) => return Err(err),
        };
        debug!("store: opened root={}", root.display());

        Ok(Self { root, positions })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn write_json<T: Serialize>(&self, file: &str, value: &T) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(value)?;
        fs::write(self.root.join(file), bytes)?;
        Ok(())
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>, StoreError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

impl ProgressStore for JsonFileStore {
    type Error = StoreError;

    fn last_position(&mut self, id: &DocumentId) -> Result<Option<usize>, Self::Error> {
        Ok(self.positions.get(id).copied())
    }

    fn set_last_position(&mut self, id: &DocumentId, position: usize) -> Result<(), Self::Error> {
        if self.positions.get(id) == Some(&position) {
            return Ok(());
        }
        self.positions.insert(id.clone(), position);
        self.write_json(POSITIONS_FILE, &self.positions)
    }

    fn save_document(
        &mut self,
        id: &DocumentId,
        words: &[String],
        chapters: &[Chapter],
    ) -> Result<(), Self::Error> {
        #[derive(Serialize)]
        struct DocumentRef<'a> {
            id: &'a DocumentId,
            words: &'a [String],
            chapters: &'a [Chapter],
        }

        self.write_json(DOCUMENT_FILE, &DocumentRef { id, words, chapters })
    }

    fn load_document(&mut self) -> Result<Option<StoredDocument>, Self::Error> {
        let document: Option<StoredDocument> = read_json(&self.root.join(DOCUMENT_FILE))?;
        Ok(document.filter(|document| !document.words.is_empty()))
    }
}

impl SettingsStore for JsonFileStore {
    type Error = StoreError;

    fn load(&mut self) -> Result<Option<ReaderSettings>, Self::Error> {
        read_json(&self.root.join(SETTINGS_FILE))
    }

    fn save(&mut self, settings: &ReaderSettings) -> Result<(), Self::Error> {
        self.write_json(SETTINGS_FILE, settings)
    }
}
