//! Quiz catalog storage.
//!
//! Sessions consume the [`QuizStore`] trait only; two backends satisfy it:
//! an in-memory store and a JSON-file-backed store. Both enforce non-empty
//! question and answer text on create/update. Concurrent writers race under
//! last-write-wins; sessions perform no client-side locking.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;
use thiserror::Error;
use tracing::{debug, info, trace};

/// An identified question/answer pair. The id is unique and stable for the
/// quiz's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub question: String,
    pub answer: String,
}

/// Storage operation failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// No quiz with the given id
    #[error("quiz {0} not found")]
    NotFound(i64),

    /// Create/update content rejected; messages are user-facing
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Backing file could not be read or written
    #[error("catalog io error: {0}")]
    Io(#[from] std::io::Error),
}

/// The catalog contract sessions depend on. Every operation is one logical
/// step that resolves with a value or fails with a typed error; callers
/// perform no retries.
#[async_trait]
pub trait QuizStore: Send + Sync {
    /// All quizzes, in no particular order
    async fn list(&self) -> Result<Vec<Quiz>, StoreError>;

    /// One quiz by id
    async fn get(&self, id: i64) -> Result<Quiz, StoreError>;

    /// Create a quiz, assigning a fresh id
    async fn create(&self, question: &str, answer: &str) -> Result<Quiz, StoreError>;

    /// Replace an existing quiz's question and answer
    async fn update(&self, id: i64, question: &str, answer: &str) -> Result<Quiz, StoreError>;

    /// Remove a quiz
    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}

/// Reject empty (post-trim) question or answer text with the user-facing
/// validation messages.
fn validate_content(question: &str, answer: &str) -> Result<(), StoreError> {
    let mut messages = Vec::new();
    if question.trim().is_empty() {
        messages.push("La pregunta no puede estar vacía.".to_string());
    }
    if answer.trim().is_empty() {
        messages.push("La respuesta no puede estar vacía.".to_string());
    }
    if messages.is_empty() {
        Ok(())
    } else {
        Err(StoreError::Validation(messages))
    }
}

/// Thread-safe in-memory catalog
pub struct MemoryStore {
    quizzes: RwLock<HashMap<i64, Quiz>>,
    next_id: AtomicI64,
}

impl MemoryStore {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            quizzes: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn insert_new(&self, question: &str, answer: &str) -> Quiz {
        let quiz = Quiz {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            question: question.to_string(),
            answer: answer.to_string(),
        };
        self.quizzes
            .write()
            .unwrap()
            .insert(quiz.id, quiz.clone());
        quiz
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuizStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Quiz>, StoreError> {
        let mut all: Vec<Quiz> = self.quizzes.read().unwrap().values().cloned().collect();
        all.sort_by_key(|q| q.id);
        Ok(all)
    }

    async fn get(&self, id: i64) -> Result<Quiz, StoreError> {
        self.quizzes
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn create(&self, question: &str, answer: &str) -> Result<Quiz, StoreError> {
        validate_content(question, answer)?;
        let quiz = self.insert_new(question, answer);
        trace!(id = quiz.id, "Quiz created");
        Ok(quiz)
    }

    async fn update(&self, id: i64, question: &str, answer: &str) -> Result<Quiz, StoreError> {
        validate_content(question, answer)?;
        let mut quizzes = self.quizzes.write().unwrap();
        let quiz = quizzes.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        quiz.question = question.to_string();
        quiz.answer = answer.to_string();
        trace!(id, "Quiz updated");
        Ok(quiz.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        match self.quizzes.write().unwrap().remove(&id) {
            Some(_) => {
                trace!(id, "Quiz deleted");
                Ok(())
            }
            None => Err(StoreError::NotFound(id)),
        }
    }
}

/// Catalog persisted to a JSON file. Holds a [`MemoryStore`] as its working
/// set and rewrites the whole file after each successful mutation; the last
/// successful write wins.
pub struct FileStore {
    inner: MemoryStore,
    path: PathBuf,
}

/// The classic starter quizzes, seeded when no catalog file exists yet
const SEED_QUIZZES: &[(&str, &str)] = &[
    ("Capital de Italia", "Roma"),
    ("Capital de Francia", "París"),
    ("Capital de España", "Madrid"),
    ("Capital de Portugal", "Lisboa"),
];

impl FileStore {
    /// Open the catalog file, creating and seeding it if absent
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        let inner = MemoryStore::new();

        match std::fs::read(&path) {
            Ok(contents) => {
                let quizzes: Vec<Quiz> = serde_json::from_slice(&contents)
                    .map_err(|e| StoreError::Io(std::io::Error::other(e)))?;
                let max_id = quizzes.iter().map(|q| q.id).max().unwrap_or(0);
                let mut map = inner.quizzes.write().unwrap();
                for quiz in quizzes {
                    map.insert(quiz.id, quiz);
                }
                drop(map);
                inner.next_id.store(max_id + 1, Ordering::SeqCst);
                info!(path = %path.display(), count = inner.quizzes.read().unwrap().len(), "Catalog loaded");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                for (question, answer) in SEED_QUIZZES {
                    inner.insert_new(question, answer);
                }
                info!(path = %path.display(), "No catalog file, seeding starter quizzes");
            }
            Err(e) => return Err(StoreError::Io(e)),
        }

        Ok(Self { inner, path })
    }

    async fn persist(&self) -> Result<(), StoreError> {
        let all = self.inner.list().await?;
        let contents = serde_json::to_vec_pretty(&all)
            .map_err(|e| StoreError::Io(std::io::Error::other(e)))?;
        tokio::fs::write(&self.path, contents).await?;
        debug!(path = %self.path.display(), count = all.len(), "Catalog persisted");
        Ok(())
    }
}

#[async_trait]
impl QuizStore for FileStore {
    async fn list(&self) -> Result<Vec<Quiz>, StoreError> {
        self.inner.list().await
    }

    async fn get(&self, id: i64) -> Result<Quiz, StoreError> {
        self.inner.get(id).await
    }

    async fn create(&self, question: &str, answer: &str) -> Result<Quiz, StoreError> {
        let quiz = self.inner.create(question, answer).await?;
        self.persist().await?;
        Ok(quiz)
    }

    async fn update(&self, id: i64, question: &str, answer: &str) -> Result<Quiz, StoreError> {
        let quiz = self.inner.update(id, question, answer).await?;
        self.persist().await?;
        Ok(quiz)
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.inner.delete(id).await?;
        self.persist().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_assigns_stable_ids() {
        let store = MemoryStore::new();
        let a = store.create("Capital de Perú", "Lima").await.unwrap();
        let b = store.create("Capital de Chile", "Santiago").await.unwrap();
        assert_ne!(a.id, b.id);

        let got = store.get(a.id).await.unwrap();
        assert_eq!(got.question, "Capital de Perú");
        assert_eq!(got.answer, "Lima");
    }

    #[tokio::test]
    async fn test_validation_rejects_empty_fields() {
        let store = MemoryStore::new();
        match store.create("", "  ").await {
            Err(StoreError::Validation(messages)) => {
                assert_eq!(messages.len(), 2);
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete_miss() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.update(99, "q", "a").await,
            Err(StoreError::NotFound(99))
        ));
        assert!(matches!(
            store.delete(99).await,
            Err(StoreError::NotFound(99))
        ));
    }

    #[tokio::test]
    async fn test_update_replaces_both_fields() {
        let store = MemoryStore::new();
        let quiz = store.create("2+2", "5").await.unwrap();
        store.update(quiz.id, "2+2?", "4").await.unwrap();
        let got = store.get(quiz.id).await.unwrap();
        assert_eq!(got.question, "2+2?");
        assert_eq!(got.answer, "4");
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = std::env::temp_dir().join(format!("quizd-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("quizzes.json");
        let _ = std::fs::remove_file(&path);

        let store = FileStore::open(path.clone()).unwrap();
        // Fresh file gets the starter quizzes
        assert_eq!(store.list().await.unwrap().len(), SEED_QUIZZES.len());

        let quiz = store.create("2+2?", "4").await.unwrap();
        drop(store);

        let reopened = FileStore::open(path.clone()).unwrap();
        let got = reopened.get(quiz.id).await.unwrap();
        assert_eq!(got.question, "2+2?");
        assert_eq!(got.answer, "4");

        // New ids keep advancing past the loaded maximum
        let newer = reopened.create("Capital de Bolivia", "La Paz").await.unwrap();
        assert!(newer.id > quiz.id);

        let _ = std::fs::remove_file(&path);
    }
}
