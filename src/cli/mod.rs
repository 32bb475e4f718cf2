use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing::info;

use apod_desktop::errors::{Error, NonUtf8PathError};
use apod_desktop::wallpaper::{self, DesktopBackgroundSetter};
use apod_desktop::{image_path_for_url, ApodClient, ApodConfig, Fingerprint, ImageCache};

/// CLI interface of APOD desktop.
#[derive(Parser, Clone, Debug)]
#[command(version, about = "APOD desktop CLI")]
pub struct Cli {
    /// Directory in which downloaded APOD images are stored.
    #[arg(value_name = "IMAGE_DIR")]
    image_dir: PathBuf,

    /// APOD date (format: YYYY-MM-DD).
    ///
    /// Defaults to today.
    #[arg(value_name = "APOD_DATE")]
    apod_date: Option<NaiveDate>,

    /// Path to the image index database.
    ///
    /// Defaults to `apod_images.db` inside the images directory.
    #[arg(short = 'd', long, value_name = "PATH")]
    database: Option<PathBuf>,

    /// APOD API key.
    #[arg(long, value_name = "KEY", env = "APOD_API_KEY")]
    api_key: Option<String>,

    /// APOD API endpoint.
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Download and cache the image, but leave the desktop background alone.
    #[arg(long)]
    no_wallpaper: bool,

    /// Print every cached image instead of fetching anything.
    #[arg(long)]
    list: bool,
}

impl Cli {
    pub async fn execute(&self) -> anyhow::Result<()> {
        if !self.image_dir.is_dir() {
            anyhow::bail!("non-existent directory '{}'", self.image_dir.display());
        }

        let database = self
            .database
            .clone()
            .unwrap_or_else(|| self.image_dir.join("apod_images.db"));
        let database = database
            .as_os_str()
            .to_str()
            .ok_or(NonUtf8PathError)
            .context("failed to open image index")?;

        let mut cache = ImageCache::open(database)
            .await
            .context("failed to open image index")?;

        if self.list {
            for record in cache.list().await.context("failed to list cached images")? {
                println!(
                    "{}\t{} bytes\t{}\t{}",
                    record.location_path, record.file_size, record.hash_value, record.date_time
                );
            }
            return Ok(());
        }

        let date = self.apod_date.unwrap_or_else(|| Local::now().date_naive());
        info!("APOD date: {}", date);

        let mut config = ApodConfig::default();
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(api_key) = &self.api_key {
            config.api_key = api_key.clone();
        }

        let client = ApodClient::new(config).context("failed to build APOD client")?;
        let info = client
            .fetch_info(date)
            .await
            .context("failed to fetch APOD metadata")?;
        if !info.is_image() {
            return Err(Error::NotAnImage {
                date: date.to_string(),
                media_type: info
                    .media_type
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string()),
            }
            .into());
        }

        let blob = client
            .download(&info.url)
            .await
            .context("failed to download APOD image")?;
        let candidate_path = image_path_for_url(&info.url, &self.image_dir);

        println!("APOD information:");
        if let Some(title) = &info.title {
            println!("\tTitle: {}", title);
        }
        println!("\tURL: {}", info.url);
        println!("\tFile path: {}", candidate_path.display());
        println!("\tFile size: {} bytes", blob.len());
        println!("\tSHA-256: {}", Fingerprint::of(&blob));

        let outcome = cache
            .store(&blob, &candidate_path)
            .await
            .context("failed to store APOD image")?;
        if outcome.already_cached {
            println!("Image is already in cache: {}", outcome.path.display());
        } else {
            println!("New image saved to cache: {}", outcome.path.display());
        }

        if !self.no_wallpaper {
            let path = std::path::absolute(&outcome.path)
                .context("failed to resolve image path")?;
            wallpaper::platform_setter()
                .set(&path)
                .context("failed to set desktop background")?;
            println!("Desktop background set to {}", path.display());
        }

        Ok(())
    }
}
