/// Directory store: categories, pages and their counters
///
/// All state lives behind one `RwLock`. Counter increments run their
/// read-modify-write inside a single write-lock critical section, so
/// concurrent increments never lose updates.
///
/// A persistent directory is backed by a JSON snapshot file. Every mutation
/// bumps a generation number; [`Directory::flush`] serializes the state under
/// a read lock, then rewrites the snapshot atomically (temp file, fsync,
/// rename) without holding the store lock.

use crate::{
    config::DirectoryConfig,
    slug::{legacy, Slug},
    types::{Category, CategoryId, DirectoryStats, Page, PageId},
    Error, Result,
};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

const SNAPSHOT_VERSION: u32 = 1;

/// A counter that can be incremented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    CategoryViews(CategoryId),
    CategoryLikes(CategoryId),
    PageViews(PageId),
}

impl Counter {
    /// Short label, used for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Counter::CategoryViews(_) => "category_views",
            Counter::CategoryLikes(_) => "category_likes",
            Counter::PageViews(_) => "page_views",
        }
    }
}

/// On-disk snapshot layout
#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    next_category_id: u64,
    next_page_id: u64,
    categories: Vec<Category>,
    pages: Vec<Page>,
}

struct DirectoryInner {
    categories: BTreeMap<CategoryId, Category>,
    pages: BTreeMap<PageId, Page>,
    /// Case-folded category name -> id
    names: HashMap<String, CategoryId>,
    next_category_id: u64,
    next_page_id: u64,
    /// Bumped on every mutation
    generation: u64,
    /// Generation last written to the snapshot file
    saved_generation: u64,
}

impl DirectoryInner {
    fn empty() -> Self {
        Self {
            categories: BTreeMap::new(),
            pages: BTreeMap::new(),
            names: HashMap::new(),
            next_category_id: 1,
            next_page_id: 1,
            generation: 0,
            saved_generation: 0,
        }
    }

    fn mark_dirty(&mut self) {
        self.generation += 1;
    }

    fn is_dirty(&self) -> bool {
        self.generation != self.saved_generation
    }

    fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(Error::Corruption(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }

        let mut inner = Self::empty();

        for category in snapshot.categories {
            if category.id.0 >= snapshot.next_category_id {
                return Err(Error::Corruption(format!(
                    "category id {} not below next id {}",
                    category.id, snapshot.next_category_id
                )));
            }
            if inner.names.insert(fold(&category.name), category.id).is_some() {
                return Err(Error::Corruption(format!(
                    "duplicate category name {:?}",
                    category.name
                )));
            }
            if inner.categories.insert(category.id, category.clone()).is_some() {
                return Err(Error::Corruption(format!(
                    "duplicate category id {}",
                    category.id
                )));
            }
        }

        for page in snapshot.pages {
            if page.id.0 >= snapshot.next_page_id {
                return Err(Error::Corruption(format!(
                    "page id {} not below next id {}",
                    page.id, snapshot.next_page_id
                )));
            }
            if !inner.categories.contains_key(&page.category) {
                return Err(Error::Corruption(format!(
                    "page {} references missing category {}",
                    page.id, page.category
                )));
            }
            if inner.pages.insert(page.id, page.clone()).is_some() {
                return Err(Error::Corruption(format!("duplicate page id {}", page.id)));
            }
        }

        inner.next_category_id = snapshot.next_category_id;
        inner.next_page_id = snapshot.next_page_id;
        Ok(inner)
    }

    fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            next_category_id: self.next_category_id,
            next_page_id: self.next_page_id,
            categories: self.categories.values().cloned().collect(),
            pages: self.pages.values().cloned().collect(),
        }
    }

    fn category_mut(&mut self, id: CategoryId) -> Result<&mut Category> {
        self.categories
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("category {}", id)))
    }

    fn page_mut(&mut self, id: PageId) -> Result<&mut Page> {
        self.pages
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("page {}", id)))
    }
}

/// Directory handle, cheap to clone and safe to share across threads
#[derive(Clone)]
pub struct Directory {
    inner: Arc<RwLock<DirectoryInner>>,
    /// Serializes snapshot writers; readers and writers of the store never take it
    flush_lock: Arc<Mutex<()>>,
    path: Option<PathBuf>,
    config: DirectoryConfig,
}

impl Directory {
    /// Create a directory that is never written to disk
    pub fn in_memory(config: DirectoryConfig) -> Result<Self> {
        config.validate().map_err(Error::InvalidArgument)?;
        Ok(Self {
            inner: Arc::new(RwLock::new(DirectoryInner::empty())),
            flush_lock: Arc::new(Mutex::new(())),
            path: None,
            config,
        })
    }

    /// Create a new, empty snapshot file at `path`
    pub fn create(path: impl AsRef<Path>, config: DirectoryConfig) -> Result<Self> {
        config.validate().map_err(Error::InvalidArgument)?;
        let path = path.as_ref().to_path_buf();
        if path.exists() {
            return Err(Error::AlreadyExists(path.display().to_string()));
        }

        let directory = Self {
            inner: Arc::new(RwLock::new(DirectoryInner::empty())),
            flush_lock: Arc::new(Mutex::new(())),
            path: Some(path),
            config,
        };
        directory.inner.write().mark_dirty();
        directory.flush()?;

        info!("Created directory at {:?}", directory.path);
        Ok(directory)
    }

    /// Open an existing snapshot file
    pub fn open(path: impl AsRef<Path>, config: DirectoryConfig) -> Result<Self> {
        config.validate().map_err(Error::InvalidArgument)?;
        let path = path.as_ref().to_path_buf();

        let data = fs::read(&path)?;
        let snapshot: Snapshot = serde_json::from_slice(&data)
            .map_err(|e| Error::Corruption(format!("{}: {}", path.display(), e)))?;
        let inner = DirectoryInner::from_snapshot(snapshot)?;

        info!(
            "Opened directory at {:?} ({} categories, {} pages)",
            path,
            inner.categories.len(),
            inner.pages.len()
        );

        Ok(Self {
            inner: Arc::new(RwLock::new(inner)),
            flush_lock: Arc::new(Mutex::new(())),
            path: Some(path),
            config,
        })
    }

    /// Open `path` if it exists, otherwise create it
    pub fn open_or_create(path: impl AsRef<Path>, config: DirectoryConfig) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path, config)
        } else {
            Self::create(path, config)
        }
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    /// Snapshot path, `None` for in-memory directories
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether there are changes not yet flushed
    pub fn is_dirty(&self) -> bool {
        self.inner.read().is_dirty()
    }

    /// Write pending changes to the snapshot file.
    ///
    /// Returns `true` if a snapshot was written. Only the serialization holds
    /// the store lock (shared); file I/O runs with the store unlocked, so
    /// mutations made meanwhile stay dirty for the next flush.
    pub fn flush(&self) -> Result<bool> {
        let path = match &self.path {
            Some(path) => path,
            None => return Ok(false),
        };

        let _flushing = self.flush_lock.lock();

        let (data, generation) = {
            let inner = self.inner.read();
            if !inner.is_dirty() {
                return Ok(false);
            }
            (serde_json::to_vec_pretty(&inner.to_snapshot())?, inner.generation)
        };

        write_snapshot(path, &data)?;

        let mut inner = self.inner.write();
        inner.saved_generation = inner.saved_generation.max(generation);

        debug!(
            "Flushed directory snapshot generation {} ({} bytes) to {:?}",
            generation,
            data.len(),
            path
        );
        Ok(true)
    }

    /// Add a category.
    ///
    /// Names are trimmed. A name equal to an existing one ignoring case is
    /// rejected, which keeps case-insensitive lookups unambiguous.
    pub fn add_category(&self, name: &str) -> Result<Category> {
        let name = validate_text("category name", name, self.config.max_category_name_len)?;
        let folded = fold(&name);

        let mut inner = self.inner.write();
        if let Some(existing) = inner.names.get(&folded) {
            let existing = &inner.categories[existing].name;
            return Err(Error::AlreadyExists(format!(
                "category {:?} (matches {:?})",
                name, existing
            )));
        }

        let id = CategoryId(inner.next_category_id);
        inner.next_category_id += 1;

        let category = Category {
            id,
            name,
            views: 0,
            likes: 0,
        };
        inner.names.insert(folded, id);
        inner.categories.insert(id, category.clone());
        inner.mark_dirty();

        info!("Added category {} {:?}", id, category.name);
        Ok(category)
    }

    pub fn get_category(&self, id: CategoryId) -> Result<Category> {
        self.inner
            .read()
            .categories
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("category {}", id)))
    }

    /// Case-insensitive exact lookup by name
    pub fn find_category(&self, name: &str) -> Result<Category> {
        let inner = self.inner.read();
        inner
            .names
            .get(&fold(name))
            .and_then(|id| inner.categories.get(id))
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("category {:?}", name)))
    }

    /// Resolve a URL slug to a category.
    ///
    /// Canonical slugs are decoded with [`Slug`]. Anything else, including
    /// links minted by the legacy codec for names with punctuation or
    /// non-ASCII letters, is looked up by its legacy decoding.
    pub fn find_category_by_slug(&self, slug: &str) -> Result<Category> {
        if let Ok(parsed) = Slug::parse(slug) {
            if let Ok(category) = self.find_category(&parsed.to_name()) {
                return Ok(category);
            }
        }

        let name = legacy::decode(slug);
        debug!("Looking up slug {:?} as legacy name {:?}", slug, name);
        self.find_category(&name)
            .map_err(|_| Error::NotFound(format!("category slug {:?}", slug)))
    }

    /// All categories, sorted by name
    pub fn categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> =
            self.inner.read().categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        categories
    }

    /// Most liked categories first, ties broken by name
    pub fn top_categories(&self, n: usize) -> Vec<Category> {
        let mut categories = self.categories();
        categories.sort_by(|a, b| b.likes.cmp(&a.likes).then_with(|| a.name.cmp(&b.name)));
        categories.truncate(n);
        categories
    }

    /// Add a page under `category`.
    ///
    /// URLs without an `http://` or `https://` scheme get `http://` prepended.
    pub fn add_page(&self, category: CategoryId, title: &str, url: &str) -> Result<Page> {
        let title = validate_text("page title", title, self.config.max_page_title_len)?;
        let url = normalize_url(url)?;
        if url.chars().count() > self.config.max_page_url_len {
            return Err(Error::InvalidArgument(format!(
                "page url longer than {} characters",
                self.config.max_page_url_len
            )));
        }

        let mut inner = self.inner.write();
        if !inner.categories.contains_key(&category) {
            return Err(Error::NotFound(format!("category {}", category)));
        }

        let id = PageId(inner.next_page_id);
        inner.next_page_id += 1;

        let page = Page {
            id,
            category,
            title,
            url,
            views: 0,
        };
        inner.pages.insert(id, page.clone());
        inner.mark_dirty();

        info!("Added page {} {:?} to category {}", id, page.title, category);
        Ok(page)
    }

    pub fn get_page(&self, id: PageId) -> Result<Page> {
        self.inner
            .read()
            .pages
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("page {}", id)))
    }

    /// Pages of a category, most viewed first, ties broken by title
    pub fn pages_for(&self, category: CategoryId) -> Result<Vec<Page>> {
        let inner = self.inner.read();
        if !inner.categories.contains_key(&category) {
            return Err(Error::NotFound(format!("category {}", category)));
        }

        let mut pages: Vec<Page> = inner
            .pages
            .values()
            .filter(|page| page.category == category)
            .cloned()
            .collect();
        pages.sort_by(|a, b| b.views.cmp(&a.views).then_with(|| a.title.cmp(&b.title)));
        Ok(pages)
    }

    /// Most viewed pages across all categories
    pub fn top_pages(&self, n: usize) -> Vec<Page> {
        let mut pages: Vec<Page> = self.inner.read().pages.values().cloned().collect();
        pages.sort_by(|a, b| b.views.cmp(&a.views).then_with(|| a.id.cmp(&b.id)));
        pages.truncate(n);
        pages
    }

    /// Atomically increment a counter and return its new value
    pub fn increment(&self, counter: Counter) -> Result<u64> {
        let mut inner = self.inner.write();
        let value = match counter {
            Counter::CategoryViews(id) => {
                let category = inner.category_mut(id)?;
                category.views = category.views.saturating_add(1);
                category.views
            }
            Counter::CategoryLikes(id) => {
                let category = inner.category_mut(id)?;
                category.likes = category.likes.saturating_add(1);
                category.likes
            }
            Counter::PageViews(id) => {
                let page = inner.page_mut(id)?;
                page.views = page.views.saturating_add(1);
                page.views
            }
        };
        inner.mark_dirty();

        debug!("Incremented {:?} to {}", counter, value);
        Ok(value)
    }

    /// Like a category. Likes are not de-duplicated per visitor.
    pub fn like_category(&self, id: CategoryId) -> Result<u64> {
        self.increment(Counter::CategoryLikes(id))
    }

    pub fn view_category(&self, id: CategoryId) -> Result<u64> {
        self.increment(Counter::CategoryViews(id))
    }

    /// Count a click-through and return the page with its new view count
    pub fn view_page(&self, id: PageId) -> Result<Page> {
        let mut inner = self.inner.write();
        let page = inner.page_mut(id)?;
        page.views = page.views.saturating_add(1);
        let page = page.clone();
        inner.mark_dirty();
        Ok(page)
    }

    /// Categories whose name starts with `prefix` (case-sensitive), sorted by
    /// name and capped at `max` when `max > 0`. An empty prefix suggests
    /// nothing.
    pub fn suggest(&self, prefix: &str, max: usize) -> Vec<Category> {
        if prefix.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<Category> = self
            .categories()
            .into_iter()
            .filter(|category| category.name.starts_with(prefix))
            .collect();
        if max > 0 {
            matches.truncate(max);
        }
        matches
    }

    pub fn stats(&self) -> DirectoryStats {
        let inner = self.inner.read();
        DirectoryStats {
            total_categories: inner.categories.len(),
            total_pages: inner.pages.len(),
            total_category_views: inner.categories.values().map(|c| c.views).sum(),
            total_category_likes: inner.categories.values().map(|c| c.likes).sum(),
            total_page_views: inner.pages.values().map(|p| p.views).sum(),
        }
    }

    /// Raise counters to at least the given values, never lowering them
    pub(crate) fn raise_category_counters(&self, id: CategoryId, views: u64, likes: u64) -> Result<Category> {
        let mut inner = self.inner.write();
        let category = inner.category_mut(id)?;
        category.views = category.views.max(views);
        category.likes = category.likes.max(likes);
        let category = category.clone();
        inner.mark_dirty();
        Ok(category)
    }

    pub(crate) fn raise_page_views(&self, id: PageId, views: u64) -> Result<Page> {
        let mut inner = self.inner.write();
        let page = inner.page_mut(id)?;
        page.views = page.views.max(views);
        let page = page.clone();
        inner.mark_dirty();
        Ok(page)
    }
}

/// Case-insensitive key for category names.
///
/// Lowercasing plus the two folds lowercasing misses for common names
/// (`ß` -> `ss`, final sigma). Other multi-character folds, such as ligatures,
/// are not applied.
fn fold(name: &str) -> String {
    let mut folded = String::with_capacity(name.len());
    for ch in name.to_lowercase().chars() {
        match ch {
            'ß' => folded.push_str("ss"),
            'ς' => folded.push('σ'),
            _ => folded.push(ch),
        }
    }
    folded
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Replace `path` with `data` via a synced temp file. The temp file is
/// removed if any step fails.
fn write_snapshot(path: &Path, data: &[u8]) -> Result<()> {
    let tmp = tmp_path(path);

    let written = write_synced(&tmp, data).and_then(|()| fs::rename(&tmp, path));
    if let Err(e) = written {
        if let Err(cleanup) = fs::remove_file(&tmp) {
            if cleanup.kind() != io::ErrorKind::NotFound {
                warn!("Failed to remove {:?}: {}", tmp, cleanup);
            }
        }
        return Err(e.into());
    }
    Ok(())
}

fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}

fn validate_text(field: &str, value: &str, max_len: usize) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::InvalidArgument(format!("{} must not be empty", field)));
    }
    if value.chars().count() > max_len {
        return Err(Error::InvalidArgument(format!(
            "{} longer than {} characters",
            field, max_len
        )));
    }
    Ok(value.to_string())
}

/// Trim, prepend `http://` when no scheme is given and check the result is
/// an absolute URL that can be sent back in a `Location` header.
pub fn normalize_url(url: &str) -> Result<String> {
    let url = url.trim();
    if url.is_empty() {
        return Err(Error::InvalidArgument("page url must not be empty".to_string()));
    }
    if url.chars().any(char::is_control) {
        return Err(Error::InvalidArgument(format!(
            "page url {:?} contains control characters",
            url
        )));
    }

    let lower = url.to_ascii_lowercase();
    let url = if lower.starts_with("http://") || lower.starts_with("https://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    };

    match url::Url::parse(&url) {
        Ok(parsed) if parsed.has_host() => Ok(url),
        Ok(_) => Err(Error::InvalidArgument(format!("page url {:?} has no host", url))),
        Err(e) => Err(Error::InvalidArgument(format!("page url {:?}: {}", url, e))),
    }
}
