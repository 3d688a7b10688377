use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cases::case_model::TestCaseBatch;
use crate::error::{QaError, Result};
use crate::knowledge::knowledge_model::KnowledgeBase;

pub const KNOWLEDGE_FILE: &str = "knowledge.json";
pub const TEST_CASES_FILE: &str = "test_cases.json";
pub const PAGE_FILE: &str = "page.html";

// ============================================================================
// Store abstraction
// ============================================================================

/// Single-slot persistence for the current knowledge base and test-case batch.
///
/// Every save replaces the previous record. Concurrent writers race and the
/// last one wins; callers that need isolation serialize externally.
pub trait KnowledgeStore {
    fn save_knowledge(&self, knowledge: &KnowledgeBase) -> Result<()>;
    fn load_knowledge(&self) -> Result<KnowledgeBase>;
    fn save_test_cases(&self, batch: &TestCaseBatch) -> Result<()>;
    fn load_test_cases(&self) -> Result<TestCaseBatch>;
}

// ============================================================================
// FileStore
// ============================================================================

/// JSON files under a data directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn knowledge_path(&self) -> PathBuf {
        self.dir.join(KNOWLEDGE_FILE)
    }

    pub fn test_cases_path(&self) -> PathBuf {
        self.dir.join(TEST_CASES_FILE)
    }

    pub fn page_path(&self) -> PathBuf {
        self.dir.join(PAGE_FILE)
    }

    /// Keep a copy of the ingested HTML page for generated scripts to open.
    pub fn save_page(&self, html: &[u8]) -> Result<PathBuf> {
        let path = self.page_path();
        self.write_atomic(&path, html)?;
        Ok(path)
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| QaError::structural(format!("serializing {}", path.display()), e))?;
        self.write_atomic(path, json.as_bytes())
    }

    /// Write to a sibling temp file, then rename over the target.
    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| QaError::io(format!("creating {}", self.dir.display()), e))?;

        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, bytes)
            .map_err(|e| QaError::io(format!("writing {}", tmp.display()), e))?;
        std::fs::rename(&tmp, path)
            .map_err(|e| QaError::io(format!("replacing {}", path.display()), e))
    }

    /// `Ok(None)` when the file does not exist.
    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(QaError::io(format!("reading {}", path.display()), e)),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| QaError::structural(format!("decoding {}", path.display()), e))
    }
}

impl KnowledgeStore for FileStore {
    fn save_knowledge(&self, knowledge: &KnowledgeBase) -> Result<()> {
        self.write_json(&self.knowledge_path(), knowledge)
    }

    fn load_knowledge(&self) -> Result<KnowledgeBase> {
        let path = self.knowledge_path();
        self.read_json(&path)?
            .ok_or_else(|| QaError::KnowledgeBaseNotFound {
                path: path.display().to_string(),
            })
    }

    fn save_test_cases(&self, batch: &TestCaseBatch) -> Result<()> {
        self.write_json(&self.test_cases_path(), batch)
    }

    fn load_test_cases(&self) -> Result<TestCaseBatch> {
        let path = self.test_cases_path();
        self.read_json(&path)?
            .ok_or_else(|| QaError::TestCasesNotFound {
                path: path.display().to_string(),
            })
    }
}

// ============================================================================
// MemoryStore
// ============================================================================

/// In-process store, for tests and embedding.
#[derive(Default)]
pub struct MemoryStore {
    knowledge: Mutex<Option<KnowledgeBase>>,
    test_cases: Mutex<Option<TestCaseBatch>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

const MEMORY_PATH: &str = "<memory>";

impl KnowledgeStore for MemoryStore {
    fn save_knowledge(&self, knowledge: &KnowledgeBase) -> Result<()> {
        let mut slot = self.knowledge.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(knowledge.clone());
        Ok(())
    }

    fn load_knowledge(&self) -> Result<KnowledgeBase> {
        let slot = self.knowledge.lock().unwrap_or_else(|e| e.into_inner());
        slot.clone().ok_or_else(|| QaError::KnowledgeBaseNotFound {
            path: MEMORY_PATH.to_string(),
        })
    }

    fn save_test_cases(&self, batch: &TestCaseBatch) -> Result<()> {
        let mut slot = self.test_cases.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(batch.clone());
        Ok(())
    }

    fn load_test_cases(&self) -> Result<TestCaseBatch> {
        let slot = self.test_cases.lock().unwrap_or_else(|e| e.into_inner());
        slot.clone().ok_or_else(|| QaError::TestCasesNotFound {
            path: MEMORY_PATH.to_string(),
        })
    }
}
