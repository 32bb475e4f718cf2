use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, trace};

use crate::database::models::NewCacheRecord;
use crate::database::{self, api, Connection};
use crate::errors::{Error, NonUtf8PathError};
use crate::{CacheRecord, Fingerprint};

type Result<T> = std::result::Result<T, Error>;

/// What [`ImageCache::store`] did with a blob.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreOutcome {
    /// Path at which the image content is available.
    ///
    /// The previously recorded path on a cache hit, the candidate path
    /// on a miss.
    pub path: PathBuf,

    /// Whether identical content was already recorded.
    pub already_cached: bool,
}

/// Content-addressed image cache.
///
/// Stores each distinct image on disk at most once. Identity is the
/// SHA-256 [`Fingerprint`] of the image bytes; the decision "seen
/// before?" is backed by a persisted SQLite index.
pub struct ImageCache {
    /// Cache index database connection.
    db: Connection,
}

impl ImageCache {
    /// Open the cache index at `database_url`.
    ///
    /// Initializes the database if it doesn't exist; existing entries
    /// are preserved.
    pub async fn open(database_url: &str) -> Result<Self> {
        trace!("running migrations on {}", database_url);
        database::run_migrations(database_url).await?;

        trace!("establishing cache database connection: {}", database_url);
        let db = database::establish_connection(database_url).await?;

        Ok(Self { db })
    }

    /// Store a downloaded blob, unless identical content is already cached.
    ///
    /// On a fingerprint hit the previously recorded path is returned and
    /// nothing is written. On a miss the blob is written to
    /// `candidate_path` (overwriting whatever happens to be there) and a
    /// record is added to the index, in that order, so the index never
    /// references a file whose write has not completed.
    pub async fn store(&mut self, blob: &[u8], candidate_path: &Path) -> Result<StoreOutcome> {
        let fingerprint = Fingerprint::of(blob);
        debug!("store {} bytes, fingerprint {}", blob.len(), fingerprint);

        if let Some(record) = api::find_by_fingerprint(&mut self.db, &fingerprint).await? {
            debug!("cache hit: {}", record.location_path);
            return Ok(StoreOutcome {
                path: PathBuf::from(record.location_path),
                already_cached: true,
            });
        }

        debug!("cache miss: writing {}", candidate_path.display());
        let location_path = candidate_path.to_str().ok_or(NonUtf8PathError)?.to_string();
        write_blob(blob, candidate_path).await?;

        let new_record = NewCacheRecord::new(&location_path, blob.len() as i64, &fingerprint);
        match api::insert(&mut self.db, new_record).await {
            Ok(_) => Ok(StoreOutcome {
                path: candidate_path.to_path_buf(),
                already_cached: false,
            }),
            Err(err) if err.is_unique_violation() => {
                // A concurrent invocation recorded the same content between
                // our lookup and insert. Its entry wins; the file we just
                // wrote stays around as a harmless duplicate on disk.
                debug!("lost insert race for {}", fingerprint);
                match api::find_by_fingerprint(&mut self.db, &fingerprint).await? {
                    Some(record) => Ok(StoreOutcome {
                        path: PathBuf::from(record.location_path),
                        already_cached: true,
                    }),
                    None => Err(err.into()),
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Find the record for previously stored content.
    ///
    /// `None` means the fingerprint was never recorded. That is the
    /// normal miss outcome, not a failure.
    pub async fn lookup(&mut self, fingerprint: &Fingerprint) -> Result<Option<CacheRecord>> {
        Ok(api::find_by_fingerprint(&mut self.db, fingerprint).await?)
    }

    /// List every record in the index.
    pub async fn list(&mut self) -> Result<Vec<CacheRecord>> {
        Ok(api::get_all(&mut self.db).await?)
    }
}

/// Write `blob` to `path` through a temporary sibling file.
///
/// The rename publishes the content only after the full write succeeded,
/// so a crash mid-write leaves a `.part` file, never a half-written image
/// at the final path. Leftover files are harmless: the index is the
/// source of truth and only ever points at fully written images.
async fn write_blob(blob: &[u8], path: &Path) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".part");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, blob).await?;
    fs::rename(&tmp, path).await
}

/// Path at which an image downloaded from `url` is saved locally:
/// the last path segment of the URL, joined to the images directory.
pub fn image_path_for_url(url: &str, image_dir: &Path) -> PathBuf {
    let name = url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("apod");
    image_dir.join(name)
}

/// Cache fixtures. Helps in testing cache-related code.
#[cfg(test)]
pub(crate) mod fixtures {
    use rstest::fixture;
    use tempfile::TempDir;

    use super::ImageCache;

    /// Fixture for initialized cache with a temp images directory.
    pub(crate) struct CacheFixture {
        /// Holds images directory (and the index inside it), destroys
        /// both on drop.
        pub image_dir: TempDir,

        /// Cache with temp index database.
        pub cache: ImageCache,
    }

    impl CacheFixture {
        pub async fn new() -> Self {
            let image_dir = tempfile::tempdir().unwrap();
            let db_path = image_dir.path().join("apod_images.db");
            let cache = ImageCache::open(db_path.to_str().unwrap()).await.unwrap();
            Self { image_dir, cache }
        }
    }

    /// New empty cache.
    #[fixture]
    pub(crate) async fn cache() -> CacheFixture {
        CacheFixture::new().await
    }
}
