use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

use anyhow::Result;

use crate::document::DocumentSnapshot;

/// Generic trait for cacheable content
pub trait CacheableContent: Clone + Send + Sync {
    /// Number of pages/slides held by the content
    fn total_units(&self) -> usize;

    /// Rough weight of the entry, used for statistics only
    fn weight(&self) -> usize;
}

impl CacheableContent for DocumentSnapshot {
    fn total_units(&self) -> usize {
        self.slides.len()
    }

    fn weight(&self) -> usize {
        self.slides.iter().map(|page| page.page_elements.len()).sum()
    }
}

/// Generic cache entry
#[derive(Debug, Clone)]
pub struct CacheEntry<T: CacheableContent> {
    pub content: T,
    pub file_path: String,
    pub last_modified: Option<SystemTime>,
}

impl<T: CacheableContent> CacheEntry<T> {
    pub fn new(content: T, file_path: String) -> Self {
        let last_modified = modified_time(&file_path);

        Self {
            content,
            file_path,
            last_modified,
        }
    }

    /// Check if the cache entry is still valid (file hasn't been modified)
    pub fn is_valid(&self) -> bool {
        match (self.last_modified, modified_time(&self.file_path)) {
            (Some(cached_time), Some(current_time)) => current_time <= cached_time,
            // Missing file: the entry can no longer be trusted
            (_, None) => false,
            (None, Some(_)) => true,
        }
    }
}

fn modified_time(file_path: &str) -> Option<SystemTime> {
    std::fs::metadata(Path::new(file_path))
        .and_then(|metadata| metadata.modified())
        .ok()
}

/// Generic cache manager keyed by file path
pub struct CacheManager<T: CacheableContent> {
    cache: Arc<Mutex<HashMap<String, CacheEntry<T>>>>,
}

impl<T: CacheableContent> CacheManager<T> {
    pub fn new() -> Self {
        Self {
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<T>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get or create cached content
    pub fn get_or_cache<F>(&self, file_path: &str, extractor: F) -> Result<T>
    where
        F: FnOnce(&str) -> Result<T>,
    {
        {
            let cache = self.lock();
            if let Some(cached_entry) = cache.get(file_path) {
                if cached_entry.is_valid() {
                    log::debug!("Cache hit for {}", file_path);
                    return Ok(cached_entry.content.clone());
                }
            }
        }

        let content = extractor(file_path)?;

        {
            let mut cache = self.lock();
            let entry = CacheEntry::new(content.clone(), file_path.to_string());
            cache.insert(file_path.to_string(), entry);
        }

        Ok(content)
    }

    /// Drop one entry
    pub fn invalidate(&self, file_path: &str) {
        self.lock().remove(file_path);
    }

    /// Get cache statistics (entries, total units, total weight)
    pub fn get_stats(&self) -> (usize, usize, usize) {
        let cache = self.lock();
        let units = cache.values().map(|entry| entry.content.total_units()).sum();
        let weight = cache.values().map(|entry| entry.content.weight()).sum();
        (cache.len(), units, weight)
    }

    /// Remove invalid cache entries
    pub fn cleanup(&self) {
        self.lock().retain(|_, entry| entry.is_valid());
    }
}

impl<T: CacheableContent> Default for CacheManager<T> {
    fn default() -> Self {
        Self::new()
    }
}
