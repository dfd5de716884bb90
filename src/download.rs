/*!
RouteViews RIB archive discovery and retrieval.

The collectors publish `rib.YYYYMMDD.HHMM.bz2` snapshots under
month-per-directory trees; the same tree is served over HTTP and FTP, and
HTTP is used here. Directory listings are plain HTML, scraped for links.
*/
use crate::error::IpasnError;
use chrono::NaiveDate;
use log::{info, warn};
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

const ARCHIVE_HOST: &str = "http://archive.routeviews.org";

/// Which collector tree to pull from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFamily {
    V4,
    V6,
    V46,
}

impl ArchiveFamily {
    fn archive_root(&self) -> &'static str {
        match self {
            ArchiveFamily::V4 => "bgpdata",
            ArchiveFamily::V6 => "route-views6/bgpdata",
            ArchiveFamily::V46 => "route-views4/bgpdata",
        }
    }
}

fn read_listing(url: &str) -> Result<String, IpasnError> {
    let mut reader = oneio::get_reader(url)?;
    let mut html = String::new();
    reader.read_to_string(&mut html)?;
    Ok(html)
}

/// Pull the link targets out of an HTML directory index.
fn listing_links(html: &str) -> Vec<String> {
    let href = Regex::new(r#"href="([^"?][^"]*)""#).expect("static pattern compiles");
    href.captures_iter(html)
        .map(|captures| captures[1].to_string())
        .collect()
}

fn month_directories(html: &str) -> Vec<String> {
    let month = Regex::new(r"^\d{4}\.\d{2}/$").expect("static pattern compiles");
    let mut months: Vec<String> = listing_links(html)
        .into_iter()
        .filter(|link| month.is_match(link))
        .map(|link| link.trim_end_matches('/').to_string())
        .collect();
    months.sort();
    months
}

fn rib_files(html: &str) -> Vec<String> {
    let rib = Regex::new(r"^(rib|bview)\.\d{8}\.\d{4}\.(bz2|gz)$").expect("static pattern compiles");
    let mut files: Vec<String> = listing_links(html)
        .into_iter()
        .filter(|link| rib.is_match(link))
        .collect();
    files.sort();
    files
}

/// Fetch the most recent RIB archive of a collector tree into the
/// current directory. Returns the local file name.
///
/// Right after a month rolls over its directory may exist with no
/// snapshots yet, so an empty newest month falls back to the one before.
pub fn download_latest(family: ArchiveFamily) -> Result<String, IpasnError> {
    let root_url = format!("{ARCHIVE_HOST}/{}/", family.archive_root());
    info!("listing {root_url}");
    let months = month_directories(&read_listing(&root_url)?);

    for month in months.iter().rev().take(2) {
        let ribs_url = format!("{root_url}{month}/RIBS/");
        info!("finding most recent archive in {ribs_url}");
        let files = rib_files(&read_listing(&ribs_url)?);
        if let Some(filename) = files.last() {
            let remote = format!("{ribs_url}{filename}");
            info!("downloading {remote}");
            oneio::download(&remote, filename)?;
            return Ok(filename.clone());
        }
    }

    Err(IpasnError::ParseError(
        "no RIB archive found in the two most recent months".to_string(),
    ))
}

/// Fetch v4 archives for the dates listed in a file, one `YYYYMMDD` per
/// line (blanks and `#` comments skipped).
///
/// For each date the 06:00 snapshot is preferred for consistency, then
/// 05:00, then midnight. Dates with no matching snapshot are reported
/// and skipped.
pub fn download_for_dates(dates_file: &Path) -> Result<Vec<String>, IpasnError> {
    let mut dates = Vec::new();
    for line in BufReader::new(File::open(dates_file)?).lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let date = NaiveDate::parse_from_str(line, "%Y%m%d").map_err(|_| {
            IpasnError::ParseError(format!("malformed date '{line}', expected YYYYMMDD"))
        })?;
        dates.push(date);
    }

    let mut downloaded = Vec::new();
    for date in dates {
        let month_url = format!(
            "{ARCHIVE_HOST}/bgpdata/{}/RIBS/",
            date.format("%Y.%m")
        );
        info!("searching {month_url} for {date}");
        let files = rib_files(&read_listing(&month_url)?);
        let day_prefix = format!("rib.{}", date.format("%Y%m%d"));
        let candidate = ["0600", "0500", "0000"].iter().find_map(|hour| {
            let wanted = format!("{day_prefix}.{hour}");
            files.iter().find(|name| name.starts_with(&wanted))
        });
        match candidate {
            Some(filename) => {
                let remote = format!("{month_url}{filename}");
                info!("downloading {remote}");
                oneio::download(&remote, filename)?;
                downloaded.push(filename.clone());
            }
            None => warn!("no archive found for {date}"),
        }
    }
    Ok(downloaded)
}
