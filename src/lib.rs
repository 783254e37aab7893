//! Client-side caching layer for a remote text-rendering daemon.
//!
//! The daemon turns a styled text request into a PNG; this crate speaks
//! its wire protocol, normalizes the color specs that go into every
//! request, and keeps rendered images in a process-local cache keyed by
//! short hex handles. Identical requests are coalesced so a burst of
//! callers costs one round trip.
//!
//! ```no_run
//! use textwriter_client::{Config, ImageCache, RenderRequest, TextwriterClient};
//!
//! # fn main() -> Result<(), textwriter_client::Error> {
//! let client = TextwriterClient::connect(&Config::default())?;
//! let cache = ImageCache::new(client);
//!
//! let request = RenderRequest {
//!     font: "DejaVu Sans".into(),
//!     size: 14,
//!     bold: true,
//!     italic: false,
//!     background: "white".into(),
//!     foreground: "rgb(30,30,30)".into(),
//!     text: "hello".into(),
//! };
//! let key = cache.get_image_key(&request)?;
//! let png = cache.get_image_by_key(&key);
//! # let _ = png;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod color;
pub mod config;
pub mod error;
pub mod protocol;

pub use cache::{ImageCache, ImageKey, RenderBackend, DEFAULT_CACHE_TTL};
pub use client::TextwriterClient;
pub use color::{complete_color, normalize_color, CanonicalColor};
pub use config::{Config, TEXTWRITER_PORT};
pub use error::Error;
pub use protocol::fonts::FontRecord;
pub use protocol::request::RenderRequest;
