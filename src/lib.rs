//! # APOD Desktop
//!
//! Downloads NASA's Astronomy Picture of the Day, deduplicates it
//! against previously downloaded images by SHA-256 content hash, records
//! it in an SQLite index and sets it as the desktop background.
//!
//! ## Example
//!
//! ```rust
//! # async fn test(database: &str, image_dir: &std::path::Path, date: chrono::NaiveDate) {
//! use apod_desktop::{image_path_for_url, ApodClient, ApodConfig, ImageCache};
//!
//! // Open (and initialize, if needed) the image cache index
//! let mut cache = ImageCache::open(database).await.unwrap();
//!
//! // Fetch the day's metadata and download the image
//! let client = ApodClient::new(ApodConfig::default()).unwrap();
//! let info = client.fetch_info(date).await.unwrap();
//! let blob = client.download(&info.url).await.unwrap();
//!
//! // Store it, unless identical content was downloaded before
//! let outcome = cache
//!     .store(&blob, &image_path_for_url(&info.url, image_dir))
//!     .await
//!     .unwrap();
//!
//! // use the image at `outcome.path`
//! // ...
//! # }
//! ```

mod apod;
mod cache;
mod database;
mod fingerprint;

pub mod errors;
pub mod wallpaper;

pub use apod::{ApodClient, ApodConfig, ApodInfo};
pub use cache::{image_path_for_url, ImageCache, StoreOutcome};
pub use database::models::CacheRecord;
pub use fingerprint::Fingerprint;

// Re-exports of public API arguments from extern crates
#[doc(no_inline)]
pub use chrono::{DateTime, NaiveDate, Utc};
