//! Prioritized, cached thumbnail loading.
//!
//! Glues the grid engine's load queue, memory cache and pressure monitor to
//! the photo library: grid cells request thumbnails at normal priority, the
//! viewport promotes visible cells to high, and at most three loads run at
//! once. Decoded data URLs live in the shared memory cache; under pressure
//! the cache shrinks and cells simply re-request on their next mount.

use dioxus::prelude::*;
use dioxus_grid::{
    ImageMemoryCache, LoadPriority, LoadQueue, LoaderConfig, MemoryConfig, MemoryGauge,
    MemoryMonitor,
};
use photo_library::{Photo, PhotoSize};
use std::collections::HashMap;

use crate::services::{error_log, photo_service};

/// Load state of one thumbnail key, as seen by a grid cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ThumbState {
    Loading,
    Ready(String),
    Failed,
}

/// Cache key: photo uuid plus size discriminator.
pub fn thumb_key(photo: &Photo, size: PhotoSize) -> String {
    let tag = match size {
        PhotoSize::Small => "s",
        PhotoSize::Medium => "m",
        PhotoSize::Original => "o",
    };
    format!("{}:{}", photo.uuid, tag)
}

#[derive(Clone, Copy)]
pub struct ThumbnailLoader {
    queue: Signal<LoadQueue>,
    cache: Signal<ImageMemoryCache>,
    /// Loading/Failed markers; ready data lives in the cache.
    markers: Signal<HashMap<String, ThumbState>>,
    /// Key → absolute file path, filled at request time.
    paths: Signal<HashMap<String, String>>,
}

struct CacheGauge {
    used: usize,
    limit: usize,
}

impl MemoryGauge for CacheGauge {
    fn used_ratio(&self) -> Option<f64> {
        if self.limit == 0 {
            return None;
        }
        Some(self.used as f64 / self.limit as f64)
    }
}

/// Installs the loader into context and starts the pressure sampling loop.
/// Call once near the app root.
pub fn provide_thumbnail_loader() -> ThumbnailLoader {
    let queue = use_signal(|| LoadQueue::new(LoaderConfig::default()));
    let cache = use_signal(|| ImageMemoryCache::new(MemoryConfig::default()));
    let markers = use_signal(HashMap::new);
    let paths = use_signal(HashMap::new);

    let loader = use_context_provider(|| ThumbnailLoader {
        queue,
        cache,
        markers,
        paths,
    });

    use_hook(move || {
        spawn(async move {
            let mut monitor = MemoryMonitor::new();
            monitor.register(move || loader.run_cleanup());
            let (interval, threshold) = {
                let config = cache.peek().config().clone();
                (config.sample_interval, config.pressure_threshold)
            };
            loop {
                tokio::time::sleep(interval).await;
                let gauge = CacheGauge {
                    used: cache.peek().total_bytes(),
                    limit: cache.peek().config().max_bytes,
                };
                monitor.tick(&gauge, threshold);
            }
        });
    });

    loader
}

pub fn use_thumbnail_loader() -> ThumbnailLoader {
    use_context::<ThumbnailLoader>()
}

impl ThumbnailLoader {
    /// Queues a thumbnail load unless it is cached or already under way.
    /// Returns the cache key.
    pub fn request(&self, photo: &Photo, size: PhotoSize, priority: LoadPriority) -> String {
        let key = thumb_key(photo, size);

        let mut cache = self.cache;
        if cache.write().get(&key).is_some() {
            return key;
        }
        if self.markers.peek().contains_key(&key) {
            return key;
        }

        let mut paths = self.paths;
        paths
            .write()
            .insert(key.clone(), photo_service::photo_file_path(photo, size));

        let mut markers = self.markers;
        markers.write().insert(key.clone(), ThumbState::Loading);

        let mut queue = self.queue;
        queue.write().enqueue(key.clone(), priority);
        self.pump();
        key
    }

    /// Promotes a key to high priority on viewport intersection. At most
    /// once per key; the queue tracks the promotion.
    pub fn promote_visible(&self, key: &str) {
        let mut queue = self.queue;
        let promoted = queue.write().mark_visible(key);
        if promoted {
            self.pump();
        }
    }

    /// Current state for a key. Reads are reactive: grid cells re-render
    /// when the cache or a marker changes.
    pub fn lookup(&self, key: &str) -> ThumbState {
        if let Some(url) = self.cache.read().peek(key) {
            return ThumbState::Ready(url.to_string());
        }
        self.markers
            .read()
            .get(key)
            .cloned()
            .unwrap_or(ThumbState::Loading)
    }

    pub fn cache_stats(&self) -> (usize, usize) {
        let cache = self.cache.read();
        (cache.len(), cache.total_bytes())
    }

    /// Registered with the memory monitor; also callable directly from the
    /// diagnostics view.
    pub fn run_cleanup(&self) {
        let mut cache = self.cache;
        let evicted = cache.write().cleanup();
        if evicted > 0 {
            log::info!("memory pressure evicted {} thumbnails", evicted);
        }
    }

    fn pump(&self) {
        let mut queue = self.queue;
        let admitted = queue.write().admit();
        for key in admitted {
            self.spawn_load(key);
        }
    }

    fn spawn_load(&self, key: String) {
        let loader = *self;
        spawn(async move {
            let path = loader.paths.peek().get(&key).cloned();
            let result = match path {
                Some(path) => {
                    tokio::task::spawn_blocking(move || {
                        crate::image_processing::image_path_to_data_url(&path)
                    })
                    .await
                    .unwrap_or_else(|e| Err(crate::error::AppError::Other(format!(
                        "Thumbnail task failed: {}",
                        e
                    ))))
                }
                None => Err(crate::error::AppError::NotFound("Thumbnail path".to_string())),
            };

            let mut cache = loader.cache;
            let mut markers = loader.markers;
            match result {
                Ok(url) => {
                    cache.write().insert(key.clone(), url);
                    markers.write().remove(&key);
                }
                Err(e) => {
                    error_log::record("thumbnail load", &e.to_string());
                    markers.write().insert(key.clone(), ThumbState::Failed);
                }
            }

            let mut queue = loader.queue;
            let next = queue.write().complete(&key);
            for key in next {
                loader.spawn_load(key);
            }
        });
    }
}
