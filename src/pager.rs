//! Page bitmap cache for paged documents.
//!
//! A producer/cache/consumer pipeline: consumers ask for a page, the store
//! answers from a small LRU cache and kicks off a background render when the
//! page is missing. Rendering itself is behind [`PageRenderer`]; the store
//! only owns scheduling, caching, and shutdown.
//!
//! Open and render failures never escape this module as errors: a document
//! that cannot be opened is an empty store (zero pages), a page that cannot
//! be rendered simply never shows up in the cache.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use log::{debug, error, warn};
use thiserror::Error;

/// Number of rendered pages kept in memory.
pub const PAGE_CACHE_CAPACITY: usize = 10;

/// Errors surfaced by [`PageRenderer`] implementations. The store logs and
/// swallows them; they exist so backends can say what went wrong.
#[derive(Debug, Error)]
pub enum PagerError {
    #[error("Failed to open document: {message}")]
    OpenFailed { message: String },

    #[error("Failed to render page {index}: {message}")]
    RenderFailed { index: usize, message: String },
}

/// A rendered page. Pixel data is shared, so clones are cheap.
#[derive(Debug, Clone)]
pub struct PageBitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Arc<[u8]>,
}

/// Requested output size for a page render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    pub fn new(width: u32, height: u32) -> Self {
        // A degenerate request still produces a 1x1 bitmap.
        TargetSize {
            width: width.max(1),
            height: height.max(1),
        }
    }
}

/// Decoding backend for one open document.
pub trait PageRenderer: Send + Sync + 'static {
    fn page_count(&self) -> usize;
    fn render_page(&self, index: usize, target: TargetSize) -> Result<PageBitmap, PagerError>;
}

/// Bounded page cache with least-recently-used eviction.
#[derive(Default)]
struct BitmapCache {
    pages: HashMap<usize, PageBitmap>,
    order: VecDeque<usize>,
}

impl BitmapCache {
    fn get(&mut self, index: usize) -> Option<PageBitmap> {
        let bitmap = self.pages.get(&index).cloned()?;
        self.touch(index);
        Some(bitmap)
    }

    fn put(&mut self, index: usize, bitmap: PageBitmap) {
        if self.pages.insert(index, bitmap).is_none() && self.pages.len() > PAGE_CACHE_CAPACITY {
            if let Some(evicted) = self.order.pop_front() {
                self.pages.remove(&evicted);
            }
        }
        self.touch(index);
    }

    fn touch(&mut self, index: usize) {
        self.order.retain(|&i| i != index);
        self.order.push_back(index);
    }

    fn clear(&mut self) {
        self.pages.clear();
        self.order.clear();
    }
}

/// Thread-safe page store: synchronous cache lookups, asynchronous renders.
pub struct PageStore {
    renderer: Mutex<Option<Arc<dyn PageRenderer>>>,
    cache: Arc<Mutex<BitmapCache>>,
    jobs: Arc<Mutex<HashSet<usize>>>,
    closed: Arc<AtomicBool>,
    total_pages: usize,
}

impl PageStore {
    /// Wrap an opened document. An open failure degrades to an empty store.
    pub fn open<R: PageRenderer>(renderer: Result<R, PagerError>) -> Self {
        match renderer {
            Ok(renderer) => {
                let total_pages = renderer.page_count();
                PageStore {
                    renderer: Mutex::new(Some(Arc::new(renderer))),
                    cache: Arc::new(Mutex::new(BitmapCache::default())),
                    jobs: Arc::new(Mutex::new(HashSet::new())),
                    closed: Arc::new(AtomicBool::new(false)),
                    total_pages,
                }
            }
            Err(e) => {
                warn!("Document open failed, presenting empty state: {e}");
                PageStore::empty()
            }
        }
    }

    /// A store with no document: zero pages, every lookup misses.
    pub fn empty() -> Self {
        PageStore {
            renderer: Mutex::new(None),
            cache: Arc::new(Mutex::new(BitmapCache::default())),
            jobs: Arc::new(Mutex::new(HashSet::new())),
            closed: Arc::new(AtomicBool::new(true)),
            total_pages: 0,
        }
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Return the page if cached; otherwise schedule a background render
    /// (at most one per page) and return `None` immediately.
    pub fn request_page_bitmap(&self, index: usize, target: TargetSize) -> Option<PageBitmap> {
        if index >= self.total_pages || self.closed.load(Ordering::Acquire) {
            return None;
        }

        if let Some(bitmap) = lock(&self.cache).get(index) {
            return Some(bitmap);
        }

        let renderer = lock(&self.renderer).clone()?;

        {
            let mut jobs = lock(&self.jobs);
            if !jobs.insert(index) {
                // A render for this page is already in flight.
                return None;
            }
        }

        let cache = Arc::clone(&self.cache);
        let jobs = Arc::clone(&self.jobs);
        let closed = Arc::clone(&self.closed);

        let spawned = thread::Builder::new()
            .name(format!("page-render-{index}"))
            .spawn(move || {
                if !closed.load(Ordering::Acquire) {
                    match renderer.render_page(index, target) {
                        Ok(bitmap) => {
                            if !closed.load(Ordering::Acquire) {
                                lock(&cache).put(index, bitmap);
                                debug!("Rendered page {index}");
                            }
                        }
                        Err(e) => error!("{e}"),
                    }
                }
                lock(&jobs).remove(&index);
            });

        if spawned.is_err() {
            lock(&self.jobs).remove(&index);
        }

        None
    }

    /// Synchronous cache lookup; never triggers a render.
    pub fn get_cached_bitmap(&self, index: usize) -> Option<PageBitmap> {
        lock(&self.cache).get(index)
    }

    /// Whether a render is currently in flight for the page.
    pub fn is_rendering(&self, index: usize) -> bool {
        lock(&self.jobs).contains(&index)
    }

    /// Release the document and drop all cached pages. Safe to call any
    /// number of times.
    pub fn close_all(&self) {
        self.closed.store(true, Ordering::Release);
        lock(&self.jobs).clear();
        lock(&self.cache).clear();
        *lock(&self.renderer) = None;
    }
}

impl Drop for PageStore {
    fn drop(&mut self) {
        self.close_all();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
