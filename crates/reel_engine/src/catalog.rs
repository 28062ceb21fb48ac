use rand::seq::SliceRandom;
use reel_core::{Fetcher, MediaCatalog, TransportError};
use reel_logging::{reel_info, reel_warn};
use url::Url;

/// Picks a random entry from a list of media locators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistCatalog {
    entries: Vec<Url>,
}

impl PlaylistCatalog {
    pub fn new(entries: Vec<Url>) -> Self {
        Self { entries }
    }

    /// Reads one locator per line. Blank lines and `#` comments (as in
    /// M3U playlists) are skipped, unparsable lines are logged and dropped.
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| match Url::parse(line) {
                Ok(url) => Some(url),
                Err(err) => {
                    reel_warn!("skipping playlist entry {:?}: {}", line, err);
                    None
                }
            })
            .collect();
        Self { entries }
    }

    /// Downloads a playlist and parses it.
    pub async fn fetch(fetcher: &dyn Fetcher, url: &str) -> Result<Self, TransportError> {
        let body = fetcher.fetch_bytes(url).await?;
        let catalog = Self::parse(&String::from_utf8_lossy(&body));
        reel_info!("playlist {} lists {} entries", url, catalog.len());
        Ok(catalog)
    }

    pub fn extend(&mut self, other: PlaylistCatalog) {
        for entry in other.entries {
            if !self.entries.contains(&entry) {
                self.entries.push(entry);
            }
        }
    }

    pub fn entries(&self) -> &[Url] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MediaCatalog for PlaylistCatalog {
    fn resolve_random_resource(&self) -> Option<Url> {
        self.entries.choose(&mut rand::thread_rng()).cloned()
    }
}
