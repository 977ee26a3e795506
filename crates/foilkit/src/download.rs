use crate::http::{create_client, fetch_bytes, fetch_text, polite_delay, HttpConfig};
use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use foilkit_core::scrape::{extract_dat_links, file_name_from_url, resolve_url};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};

const UIUC_LISTING_URL: &str = "https://m-selig.ae.illinois.edu/ads/coord_database.html";

#[derive(Debug, clap::Parser)]
#[command(name = "download")]
#[command(about = "Download every coordinate file listed on the UIUC airfoil database")]
pub struct App {
    /// Listing page enumerating the `.dat` files
    #[arg(long, env = "FOILKIT_UIUC_URL", default_value = UIUC_LISTING_URL)]
    pub url: String,

    /// Directory the raw coordinate files are written to
    #[arg(long, env = "FOILKIT_SOURCE_DIR", default_value = "airfoils/origin")]
    pub output_dir: PathBuf,

    /// Seconds to wait between requests
    #[arg(long, env = "FOILKIT_DELAY", default_value = "2.0")]
    pub delay: f64,

    /// Request timeout in seconds
    #[arg(long, env = "FOILKIT_TIMEOUT", default_value = "30")]
    pub timeout: u64,

    /// Download at most this many files
    #[arg(long)]
    pub limit: Option<usize>,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let config = HttpConfig::new(app.delay, app.timeout)?;
    let client = create_client(&config)?;

    if global.verbose {
        println!("Listing: {}", app.url);
        println!("Output: {}", app.output_dir.display());
        println!();
    }

    let listing = fetch_text(&client, &app.url).await?;
    let links = download_targets(&app.url, &listing, app.limit)?;

    if links.is_empty() {
        return Err(eyre!("No .dat links found on {}", app.url));
    }

    fs::create_dir_all(&app.output_dir)
        .with_context(|| format!("Failed to create {}", app.output_dir.display()))?;

    let progress = ProgressBar::new(links.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map_err(|e| eyre!("Invalid progress template: {}", e))?
            .progress_chars("=> "),
    );

    let mut downloaded = 0;
    for url in &links {
        polite_delay(&config).await;
        progress.set_message(url.clone());

        match download_file(&client, url, &app.output_dir).await {
            Ok(_) => downloaded += 1,
            Err(err) => {
                progress.suspend(|| eprintln!("{} {}", "⚠".yellow(), err));
                log::warn!("{url}: {err}");
            }
        }
        progress.inc(1);
    }

    progress.finish_and_clear();
    println!(
        "Downloaded {} of {} airfoil files into {}",
        downloaded.to_string().green().bold(),
        links.len(),
        app.output_dir.display()
    );

    Ok(())
}

/// Absolute URLs of the `.dat` files on a listing page, capped at `limit`
pub fn download_targets(
    listing_url: &str,
    listing: &str,
    limit: Option<usize>,
) -> Result<Vec<String>> {
    let mut links = extract_dat_links(listing);
    if let Some(limit) = limit {
        links.truncate(limit);
    }

    links
        .iter()
        .map(|href| resolve_url(listing_url, href).map_err(|e| eyre!("{}", e)))
        .collect()
}

/// Where a downloaded file is stored: `output_dir` plus the URL's last segment
pub fn output_path(output_dir: &Path, url: &str) -> Result<PathBuf, Error> {
    let file_name = file_name_from_url(url)
        .ok_or_else(|| Error::NotFound(format!("no file name in {url}")))?;
    Ok(output_dir.join(file_name))
}

/// Fetch one coordinate file into `output_dir`
pub async fn download_file(
    client: &reqwest::Client,
    url: &str,
    output_dir: &Path,
) -> Result<PathBuf, Error> {
    let path = output_path(output_dir, url)?;

    let bytes = fetch_bytes(client, url).await?;
    fs::write(&path, bytes)?;

    Ok(path)
}
