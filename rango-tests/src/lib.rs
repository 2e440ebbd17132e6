/// Test utilities and helpers for Rango testing
///
/// This module provides common test utilities to simplify writing tests.

use chrono::{DateTime, TimeZone, Utc};
use rango_core::{Category, Directory, DirectoryConfig, Page};
use std::path::PathBuf;
use tempfile::TempDir;

/// Test directory wrapper that manages the temporary snapshot lifecycle
pub struct TestDirectory {
    pub directory: Directory,
    pub path: PathBuf,
    _temp_dir: Option<TempDir>,
}

impl TestDirectory {
    /// Create a persistent directory inside a fresh temporary folder
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("rango.json");
        let directory =
            Directory::create(&path, DirectoryConfig::default()).expect("Failed to create directory");

        Self {
            directory,
            path,
            _temp_dir: Some(temp_dir),
        }
    }

    /// Create an in-memory directory
    pub fn in_memory() -> Self {
        let directory =
            Directory::in_memory(DirectoryConfig::default()).expect("Failed to create directory");

        Self {
            directory,
            path: PathBuf::from(":memory:"),
            _temp_dir: None,
        }
    }

    /// Create a persistent directory seeded with the sample data
    pub fn populated() -> Self {
        let test_dir = Self::new();
        test_dir.directory.populate().expect("Failed to populate");
        test_dir
    }

    /// Flush pending changes
    pub fn flush(&self) {
        self.directory.flush().expect("Failed to flush");
    }

    /// Flush, drop and reopen the snapshot (for testing persistence)
    pub fn reopen(self) -> Self {
        self.flush();
        let Self {
            directory,
            path,
            _temp_dir,
        } = self;
        drop(directory);

        let directory =
            Directory::open(&path, DirectoryConfig::default()).expect("Failed to reopen directory");
        Self {
            directory,
            path,
            _temp_dir,
        }
    }
}

impl Default for TestDirectory {
    fn default() -> Self {
        Self::new()
    }
}

/// Add `count` categories named `Category 0`, `Category 1`, ...
pub fn add_categories(directory: &Directory, count: usize) -> Vec<Category> {
    (0..count)
        .map(|i| {
            directory
                .add_category(&format!("Category {}", i))
                .expect("Failed to add category")
        })
        .collect()
}

/// Add `count` pages to `category`
pub fn add_pages(directory: &Directory, category: &Category, count: usize) -> Vec<Page> {
    (0..count)
        .map(|i| {
            directory
                .add_page(category.id, &format!("Page {}", i), &format!("example.com/{}", i))
                .expect("Failed to add page")
        })
        .collect()
}

/// A fixed UTC instant, for deterministic visit tests
pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("Invalid test timestamp")
}
