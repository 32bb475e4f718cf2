//! End-to-end pipeline tests: metadata fetch, image download,
//! content-addressed store, wallpaper hand-off.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDate;
use warp::Filter;

use apod_desktop::errors::PlatformError;
use apod_desktop::wallpaper::DesktopBackgroundSetter;
use apod_desktop::{image_path_for_url, ApodClient, ApodConfig, Fingerprint, ImageCache};

const IMAGE_BYTES: &[u8] = &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9];
const IMAGE_DIGEST: &str = "1f825aa2f0020ef7cf91dfa30da4668d791c5d4824fc8e41354b89ec05795ab3";

/// Stub APOD service: metadata on `/apod`, image bytes on `/image/starfield.jpg`.
fn spawn_stub_server() -> SocketAddr {
    let apod = warp::path("apod").map(move || {
        warp::reply::json(&serde_json::json!({
            "date": "2022-03-24",
            "title": "Starfield",
            "media_type": "image",
            "url": "https://apod.nasa.gov/apod/image/2203/starfield.jpg",
        }))
    });
    let image = warp::path!("image" / "starfield.jpg")
        .map(|| warp::http::Response::builder().body(IMAGE_BYTES.to_vec()));
    let (addr, server) = warp::serve(apod.or(image)).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

/// Setter double which records every path it was asked to set.
#[derive(Default)]
struct RecordingSetter {
    seen: Mutex<Vec<PathBuf>>,
}

impl DesktopBackgroundSetter for RecordingSetter {
    fn set(&self, path: &Path) -> Result<(), PlatformError> {
        self.seen.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

async fn run_pipeline(
    client: &ApodClient,
    cache: &mut ImageCache,
    image_url: &str,
    image_dir: &Path,
    setter: &dyn DesktopBackgroundSetter,
) -> anyhow::Result<apod_desktop::StoreOutcome> {
    let date = NaiveDate::from_ymd_opt(2022, 3, 24).unwrap();
    let info = client.fetch_info(date).await?;
    assert!(info.is_image());

    // The stub can't know its own port, so the image URL comes from the
    // test instead of the metadata body.
    let blob = client.download(image_url).await?;
    let outcome = cache
        .store(&blob, &image_path_for_url(image_url, image_dir))
        .await?;
    setter.set(&outcome.path)?;
    Ok(outcome)
}

#[tokio::test]
async fn test_pipeline_caches_and_sets_background() -> anyhow::Result<()> {
    let addr = spawn_stub_server();
    let image_dir = tempfile::tempdir()?;
    let db_path = image_dir.path().join("apod_images.db");

    let client = ApodClient::new(ApodConfig {
        endpoint: format!("http://{}/apod", addr),
        api_key: "TEST_KEY".to_string(),
    })?;
    let mut cache = ImageCache::open(db_path.to_str().unwrap()).await?;
    let setter = RecordingSetter::default();

    let image_url = format!("http://{}/image/starfield.jpg", addr);
    let expected_path = image_dir.path().join("starfield.jpg");

    // First run: miss. Image lands on disk, one record in the index.
    let outcome = run_pipeline(&client, &mut cache, &image_url, image_dir.path(), &setter).await?;
    assert!(!outcome.already_cached);
    assert_eq!(outcome.path, expected_path);
    assert_eq!(std::fs::read(&expected_path)?, IMAGE_BYTES);

    let records = cache.list().await?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].hash_value, IMAGE_DIGEST);
    assert_eq!(records[0].file_size, IMAGE_BYTES.len() as i64);

    // Second run: identical content, so a hit; still exactly one record.
    let outcome = run_pipeline(&client, &mut cache, &image_url, image_dir.path(), &setter).await?;
    assert!(outcome.already_cached);
    assert_eq!(outcome.path, expected_path);
    assert_eq!(cache.list().await?.len(), 1);

    // The wallpaper collaborator saw the cached path both times.
    let seen = setter.seen.lock().unwrap();
    assert_eq!(seen.as_slice(), [expected_path.clone(), expected_path]);
    Ok(())
}

#[tokio::test]
async fn test_separate_invocations_share_the_index() -> anyhow::Result<()> {
    let addr = spawn_stub_server();
    let image_dir = tempfile::tempdir()?;
    let db_path = image_dir.path().join("apod_images.db");
    let db_url = db_path.to_str().unwrap();

    let client = ApodClient::new(ApodConfig {
        endpoint: format!("http://{}/apod", addr),
        api_key: "TEST_KEY".to_string(),
    })?;
    let image_url = format!("http://{}/image/starfield.jpg", addr);

    // Scheduled daily runs open the index anew every time.
    {
        let mut cache = ImageCache::open(db_url).await?;
        let blob = client.download(&image_url).await?;
        let outcome = cache
            .store(&blob, &image_path_for_url(&image_url, image_dir.path()))
            .await?;
        assert!(!outcome.already_cached);
    }
    {
        let mut cache = ImageCache::open(db_url).await?;
        let blob = client.download(&image_url).await?;
        assert_eq!(Fingerprint::of(&blob).as_str(), IMAGE_DIGEST);
        let outcome = cache
            .store(&blob, &image_path_for_url(&image_url, image_dir.path()))
            .await?;
        assert!(outcome.already_cached);
        assert_eq!(cache.list().await?.len(), 1);
    }
    Ok(())
}
