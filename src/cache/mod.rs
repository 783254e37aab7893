//! Rendered-image cache with request coalescing.
//!
//! Each distinct request renders at most once at a time: the first caller
//! parks a placeholder under the lock and renders outside it, concurrent
//! callers for the same request block on the condvar until the image (or
//! the failure) comes back.

use std::hash::Hasher;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};
use twox_hash::XxHash64;

use crate::error::Error;
use crate::protocol::request::RenderRequest;


/// Images older than this are dropped by [`ImageCache::purge`].
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

const KEY_LEN: usize = 8;

/// Something that can turn an encoded render request into image bytes.
pub trait RenderBackend: Send + Sync {
    fn render(&self, encoded: &[u8]) -> Result<Vec<u8>, Error>;
}

/// Short hex handle for a cached image, stable for the lifetime of the
/// cache entry it names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageKey(String);

impl ImageKey {
    fn digest(bytes: &[u8]) -> Self {
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(bytes);
        let mut hex = format!("{:016x}", hasher.finish());
        hex.truncate(KEY_LEN);
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

enum EntryState {
    Pending,
    Ready { image: Arc<[u8]>, created: Instant },
}

struct Entry {
    key: ImageKey,
    state: EntryState,
}

#[derive(Default)]
struct Maps {
    forward: FxHashMap<RenderRequest, Entry>,
    reverse: FxHashMap<ImageKey, RenderRequest>,
}

pub struct ImageCache<B> {
    backend: B,
    ttl: Duration,
    maps: Mutex<Maps>,
    resolved: Condvar,
}

impl<B: RenderBackend> ImageCache<B> {
    pub fn new(backend: B) -> Self {
        Self::with_ttl(backend, DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(backend: B, ttl: Duration) -> Self {
        Self {
            backend,
            ttl,
            maps: Mutex::new(Maps::default()),
            resolved: Condvar::new(),
        }
    }

    /// Returns the key for `request`, rendering through the backend on a
    /// miss. Blocks while another caller is rendering the same request.
    pub fn get_image_key(&self, request: &RenderRequest) -> Result<ImageKey, Error> {
        let encoded = request.encode()?;

        let mut maps = self.maps.lock();
        loop {
            match maps.forward.get(request) {
                Some(Entry {
                    key,
                    state: EntryState::Ready { .. },
                }) => {
                    debug!(key = %key, "cache hit");
                    return Ok(key.clone());
                }
                Some(Entry {
                    state: EntryState::Pending,
                    ..
                }) => {
                    self.resolved.wait(&mut maps);
                    // The renderer may have failed; the placeholder is
                    // gone in that case and this caller reports it too.
                    if !maps.forward.contains_key(request) {
                        return Err(Error::BackendUnavailable(
                            "render failed in a concurrent caller".into(),
                        ));
                    }
                }
                None => break,
            }
        }

        let key = derive_unique_key(&maps.reverse, &encoded);
        maps.forward.insert(
            request.clone(),
            Entry {
                key: key.clone(),
                state: EntryState::Pending,
            },
        );
        maps.reverse.insert(key.clone(), request.clone());
        drop(maps);

        match self.backend.render(&encoded) {
            Ok(image) => {
                let mut maps = self.maps.lock();
                if let Some(entry) = maps.forward.get_mut(request) {
                    entry.state = EntryState::Ready {
                        image: image.into(),
                        created: Instant::now(),
                    };
                }
                self.resolved.notify_all();
                debug!(key = %key, "render cached");
                Ok(key)
            }
            Err(err) => {
                warn!(error = %err, "render failed, dropping placeholder");
                let mut maps = self.maps.lock();
                if let Some(entry) = maps.forward.remove(request) {
                    maps.reverse.remove(&entry.key);
                }
                self.resolved.notify_all();
                Err(err)
            }
        }
    }

    /// Looks up a previously returned key. `None` for unknown or purged
    /// keys, and for entries still being rendered.
    pub fn get_image_by_key(&self, key: &ImageKey) -> Option<Arc<[u8]>> {
        let maps = self.maps.lock();
        let request = maps.reverse.get(key)?;
        match &maps.forward.get(request)?.state {
            EntryState::Ready { image, .. } => Some(Arc::clone(image)),
            EntryState::Pending => None,
        }
    }

    /// Drops every image older than the configured TTL.
    pub fn purge(&self) {
        self.purge_older_than(self.ttl);
    }

    /// Drops every image older than `ttl`. In-flight renders are left
    /// alone.
    pub fn purge_older_than(&self, ttl: Duration) {
        let now = Instant::now();
        let mut maps = self.maps.lock();
        let mut expired = Vec::new();
        maps.forward.retain(|_, entry| match &entry.state {
            EntryState::Ready { created, .. } if now.duration_since(*created) > ttl => {
                expired.push(entry.key.clone());
                false
            }
            _ => true,
        });
        for key in &expired {
            maps.reverse.remove(key);
        }
        if !expired.is_empty() {
            debug!(count = expired.len(), "purged expired images");
        }
    }

    pub fn len(&self) -> usize {
        self.maps.lock().forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Derives a key no live entry already uses, by rehashing the previous
/// key together with the encoded request until the collision clears.
fn derive_unique_key(reverse: &FxHashMap<ImageKey, RenderRequest>, encoded: &[u8]) -> ImageKey {
    let mut key = ImageKey::digest(encoded);
    while reverse.contains_key(&key) {
        let mut seed = key.0.into_bytes();
        seed.extend_from_slice(encoded);
        key = ImageKey::digest(&seed);
    }
    key
}
