// src/storage/json.rs
//
// Flat-file content store: news and docs live in-memory in DashMaps and are
// persisted to one JSON file per collection. Writes go to a temp file first
// and are renamed over the target so a crash never leaves a half-written
// collection on disk.

use std::fs;
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use log::info;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::models::content::{DocPage, NewsPost};

const NEWS_FILE: &str = "news.json";
const DOCS_FILE: &str = "docs.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub struct ContentStore {
    news: DashMap<String, NewsPost>,
    docs: DashMap<String, DocPage>,
    data_dir: PathBuf,
    // Serializes persist calls so concurrent mutations cannot interleave
    // their temp-file writes.
    persist_lock: Mutex<()>,
}

impl ContentStore {
    pub fn load(data_dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(data_dir)?;

        let news = DashMap::new();
        for post in read_collection::<NewsPost>(&data_dir.join(NEWS_FILE))? {
            news.insert(post.id.clone(), post);
        }

        let docs = DashMap::new();
        for page in read_collection::<DocPage>(&data_dir.join(DOCS_FILE))? {
            docs.insert(page.id.clone(), page);
        }

        info!(
            "content store loaded: {} news posts, {} doc pages",
            news.len(),
            docs.len()
        );

        Ok(Self {
            news,
            docs,
            data_dir: data_dir.to_path_buf(),
            persist_lock: Mutex::new(()),
        })
    }

    pub fn list_news(&self) -> Vec<NewsPost> {
        let mut posts: Vec<NewsPost> = self.news.iter().map(|r| r.value().clone()).collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts
    }

    pub fn get_news(&self, id: &str) -> Option<NewsPost> {
        self.news.get(id).map(|r| r.value().clone())
    }

    pub fn upsert_news(&self, post: NewsPost) -> Result<(), StorageError> {
        self.news.insert(post.id.clone(), post);
        self.persist(NEWS_FILE, &self.list_news())
    }

    pub fn delete_news(&self, id: &str) -> Result<bool, StorageError> {
        if self.news.remove(id).is_none() {
            return Ok(false);
        }
        self.persist(NEWS_FILE, &self.list_news())?;
        Ok(true)
    }

    pub fn list_docs(&self) -> Vec<DocPage> {
        let mut pages: Vec<DocPage> = self.docs.iter().map(|r| r.value().clone()).collect();
        pages.sort_by(|a, b| a.title.cmp(&b.title));
        pages
    }

    pub fn get_doc(&self, id: &str) -> Option<DocPage> {
        self.docs.get(id).map(|r| r.value().clone())
    }

    pub fn upsert_doc(&self, page: DocPage) -> Result<(), StorageError> {
        self.docs.insert(page.id.clone(), page);
        self.persist(DOCS_FILE, &self.list_docs())
    }

    pub fn delete_doc(&self, id: &str) -> Result<bool, StorageError> {
        if self.docs.remove(id).is_none() {
            return Ok(false);
        }
        self.persist(DOCS_FILE, &self.list_docs())?;
        Ok(true)
    }

    /// Write the collection to `<file>.tmp`, then rename over the target.
    fn persist<T: Serialize>(&self, file: &str, items: &[T]) -> Result<(), StorageError> {
        let _guard = self.persist_lock.lock();
        let path = self.data_dir.join(file);
        let tmp = self.data_dir.join(format!("{}.tmp", file));
        fs::write(&tmp, serde_json::to_vec_pretty(items)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Missing file means an empty collection; malformed JSON is an error.
fn read_collection<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StorageError> {
    match fs::read(path) {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}
