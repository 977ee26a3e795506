use crate::http::{create_client, fetch_text, polite_delay, HttpConfig};
use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use foilkit_core::scrape::{
    parse_detail_page, resolve_url, sanitize_filename, select_block, select_links,
    DetailSelectors, Link,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const AIRFOILTOOLS_LISTING_URL: &str = "http://airfoiltools.com/search/airfoils";

#[derive(Debug, clap::Parser)]
#[command(name = "scrape")]
#[command(about = "Scrape coordinates and polars from an airfoil detail site")]
pub struct App {
    /// Listing page linking to every airfoil detail page
    #[arg(long, env = "FOILKIT_SCRAPE_URL", default_value = AIRFOILTOOLS_LISTING_URL)]
    pub url: String,

    /// Scrape only these airfoils (detail-site identifiers, e.g. "naca2412-il")
    #[arg(long = "airfoil", value_name = "NAME")]
    pub airfoils: Vec<String>,

    /// Directory scraped files are written to
    #[arg(long, env = "FOILKIT_SCRAPE_DIR", default_value = "airfoils/scraped")]
    pub output_dir: PathBuf,

    /// CSS selector for detail links on the listing page
    #[arg(long, default_value = r#"a[href*="airfoil/details"]"#)]
    pub listing_selector: String,

    /// CSS selector for the airfoil name on a detail page
    #[arg(long, default_value = "h1")]
    pub title_selector: String,

    /// CSS selector for the coordinate block on a detail page
    #[arg(long, default_value = "pre")]
    pub coordinates_selector: String,

    /// CSS selector for polar links on a detail page
    #[arg(long, default_value = r#"a[href*="polar/details"]"#)]
    pub polar_selector: String,

    /// CSS selector for the data block on a polar page
    #[arg(long, default_value = "pre")]
    pub polar_data_selector: String,

    /// Do not fetch polar pages
    #[arg(long)]
    pub skip_polars: bool,

    /// Seconds to wait between requests
    #[arg(long, env = "FOILKIT_DELAY", default_value = "2.0")]
    pub delay: f64,

    /// Request timeout in seconds
    #[arg(long, env = "FOILKIT_TIMEOUT", default_value = "30")]
    pub timeout: u64,

    /// Scrape at most this many airfoils
    #[arg(long)]
    pub limit: Option<usize>,
}

impl App {
    fn selectors(&self) -> DetailSelectors {
        DetailSelectors {
            listing: self.listing_selector.clone(),
            title: self.title_selector.clone(),
            coordinates: self.coordinates_selector.clone(),
            polar_link: self.polar_selector.clone(),
            polar_data: self.polar_data_selector.clone(),
        }
    }
}

/// Files written for one airfoil
#[derive(Debug, Clone)]
pub struct Scraped {
    pub coordinates: PathBuf,
    pub polar: Option<PathBuf>,
}

/// Detail page URL for a detail-site identifier, on the same site as `site_url`
pub fn detail_url(site_url: &str, airfoil: &str) -> Result<String, Error> {
    let path = format!("/airfoil/details?airfoil={}", urlencoding::encode(airfoil));
    resolve_url(site_url, &path).map_err(|e| Error::MalformedInput(e.to_string()))
}

/// Keep the first link for each target, in page order
pub fn unique_links(links: Vec<Link>) -> Vec<Link> {
    let mut seen = HashSet::new();
    links
        .into_iter()
        .filter(|link| seen.insert(link.href.clone()))
        .collect()
}

/// Display name used for the output file
///
/// Prefers the page title, then the link text, then `fallback`.
pub fn airfoil_name(title: Option<&str>, link_text: &str, fallback: &str) -> String {
    let name = title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .or_else(|| Some(link_text.trim()).filter(|t| !t.is_empty()))
        .unwrap_or(fallback);
    sanitize_filename(name)
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let config = HttpConfig::new(app.delay, app.timeout)?;
    let client = create_client(&config)?;
    let selectors = app.selectors();

    // Either the requested airfoils or everything on the listing page
    let mut targets: Vec<Link> = if app.airfoils.is_empty() {
        if global.verbose {
            println!("Listing: {}", app.url);
        }
        let listing = fetch_text(&client, &app.url).await?;
        let links = select_links(&listing, &selectors.listing).map_err(|e| eyre!("{}", e))?;
        unique_links(links)
            .into_iter()
            .map(|link| {
                Ok(Link {
                    href: resolve_url(&app.url, &link.href).map_err(|e| eyre!("{}", e))?,
                    text: link.text,
                })
            })
            .collect::<Result<_>>()?
    } else {
        app.airfoils
            .iter()
            .map(|name| {
                Ok(Link {
                    href: detail_url(&app.url, name)?,
                    text: name.clone(),
                })
            })
            .collect::<Result<_>>()?
    };

    if let Some(limit) = app.limit {
        targets.truncate(limit);
    }

    if targets.is_empty() {
        return Err(eyre!("No airfoil detail links found on {}", app.url));
    }

    fs::create_dir_all(&app.output_dir)
        .with_context(|| format!("Failed to create {}", app.output_dir.display()))?;

    let progress = ProgressBar::new(targets.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map_err(|e| eyre!("Invalid progress template: {}", e))?
            .progress_chars("=> "),
    );

    let mut scraped = 0;
    for target in &targets {
        polite_delay(&config).await;
        progress.set_message(target.text.clone());

        match scrape_airfoil(&client, &config, &selectors, target, &app).await {
            Ok(result) => {
                scraped += 1;
                if global.verbose {
                    progress.suspend(|| {
                        println!("{} {}", "✓".green(), result.coordinates.display());
                        if let Some(polar) = &result.polar {
                            println!("  {} {}", "✓".green(), polar.display());
                        }
                    });
                }
            }
            Err(err) => {
                progress.suspend(|| eprintln!("{} {}: {}", "⚠".yellow(), target.text, err));
                log::warn!("{}: {}", target.href, err);
            }
        }
        progress.inc(1);
    }

    progress.finish_and_clear();
    println!(
        "Scraped {} of {} airfoils into {}",
        scraped.to_string().green().bold(),
        targets.len(),
        app.output_dir.display()
    );

    Ok(())
}

/// Scrape one detail page and, unless disabled, its first polar page
async fn scrape_airfoil(
    client: &reqwest::Client,
    config: &HttpConfig,
    selectors: &DetailSelectors,
    target: &Link,
    app: &App,
) -> Result<Scraped, Error> {
    let html = fetch_text(client, &target.href).await?;
    let page =
        parse_detail_page(&html, selectors).map_err(|e| Error::MalformedInput(e.to_string()))?;

    let coordinates = page
        .coordinates
        .ok_or_else(|| Error::NotFound("no coordinate block on the detail page".to_string()))?;

    let name = airfoil_name(page.title.as_deref(), &target.text, "airfoil");
    let coordinates_path = write_text(&app.output_dir, &format!("{name}.dat"), &coordinates)?;

    if app.skip_polars {
        return Ok(Scraped {
            coordinates: coordinates_path,
            polar: None,
        });
    }

    let Some(polar_link) = page.polar_links.first() else {
        log::warn!("{name}: no polar link on the detail page");
        return Ok(Scraped {
            coordinates: coordinates_path,
            polar: None,
        });
    };

    polite_delay(config).await;
    let polar_url = resolve_url(&target.href, &polar_link.href)
        .map_err(|e| Error::MalformedInput(e.to_string()))?;
    let polar_html = fetch_text(client, &polar_url).await?;
    let polar = match select_block(&polar_html, &selectors.polar_data)
        .map_err(|e| Error::MalformedInput(e.to_string()))?
    {
        Some(block) => Some(write_text(
            &app.output_dir,
            &format!("{name}_polar.txt"),
            &block,
        )?),
        None => {
            log::warn!("{name}: no data block on {polar_url}");
            None
        }
    };

    Ok(Scraped {
        coordinates: coordinates_path,
        polar,
    })
}

fn write_text(dir: &Path, file_name: &str, content: &str) -> Result<PathBuf, Error> {
    let path = dir.join(file_name);
    fs::write(&path, format!("{content}\n"))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_detail_url_encodes_identifier() {
        assert_eq!(
            detail_url(AIRFOILTOOLS_LISTING_URL, "naca2412-il").unwrap(),
            "http://airfoiltools.com/airfoil/details?airfoil=naca2412-il"
        );
        assert_eq!(
            detail_url(AIRFOILTOOLS_LISTING_URL, "fx 63/137").unwrap(),
            "http://airfoiltools.com/airfoil/details?airfoil=fx%2063%2F137"
        );
    }

    #[test]
    fn test_detail_url_follows_site_url() {
        assert_eq!(
            detail_url("https://mirror.example.org/search/airfoils", "e387-il").unwrap(),
            "https://mirror.example.org/airfoil/details?airfoil=e387-il"
        );
    }

    #[test]
    fn test_detail_url_invalid_site_url() {
        let result = detail_url("airfoils", "e387-il");
        assert!(matches!(result, Err(Error::MalformedInput(_))));
    }

    #[test]
    fn test_airfoil_name_prefers_title() {
        assert_eq!(
            airfoil_name(Some("NACA 2412 (naca2412-il)"), "link", "x"),
            "NACA 2412 (naca2412-il)"
        );
    }

    #[test]
    fn test_airfoil_name_falls_back_and_sanitizes() {
        assert_eq!(airfoil_name(Some("  "), "FX 63/137", "x"), "FX 63_137");
        assert_eq!(airfoil_name(None, "", "airfoil"), "airfoil");
    }

    #[test]
    fn test_unique_links() {
        let link = |href: &str| Link {
            href: href.to_string(),
            text: String::new(),
        };
        let links = unique_links(vec![link("/a"), link("/b"), link("/a")]);
        assert_eq!(links, vec![link("/a"), link("/b")]);
    }

    #[test]
    fn test_write_text_appends_newline() {
        let dir = TempDir::new().unwrap();
        let path = write_text(dir.path(), "naca2412.dat", "NACA 2412\n1.0 0.0").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "NACA 2412\n1.0 0.0\n");
    }
}
