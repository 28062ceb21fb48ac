use std::sync::Arc;

use reel_core::{gallery, Fetcher};
use reel_engine::{IntervalTicker, PlaylistCatalog, ReqwestFetcher, SimulatedPlayer, SystemClock};
use reel_logging::{reel_info, reel_warn};

use crate::config::{AppConfig, ConfigError};

/// Production collaborators wired for the gallery reducer.
pub struct Live {
    pub environment: gallery::Environment,
    /// Kept concrete so the driver can move its clock forward.
    pub player: Arc<SimulatedPlayer>,
}

pub async fn assemble(config: &AppConfig) -> Result<Live, ConfigError> {
    let fetcher: Arc<dyn Fetcher> = Arc::new(ReqwestFetcher::new(config.fetch_settings()));
    let mut catalog = PlaylistCatalog::new(config.playlist_urls()?);

    if let Some(url) = &config.playlist_url {
        match PlaylistCatalog::fetch(fetcher.as_ref(), url).await {
            Ok(remote) => {
                reel_info!("Fetched {} playlist entries from {}", remote.len(), url);
                catalog.extend(remote);
            }
            Err(err) => reel_warn!("Playlist {} unavailable, using configured entries: {}", url, err),
        }
    }
    if catalog.is_empty() {
        reel_warn!("Media catalog is empty; random reloads will clear the player");
    }

    let clock = Arc::new(SystemClock);
    let player = Arc::new(SimulatedPlayer::new(config.media_duration_secs));
    let environment = gallery::Environment {
        clock: clock.clone(),
        ticker: Arc::new(IntervalTicker::new(clock)),
        tick_interval: config.tick_interval(),
        catalog: Arc::new(catalog),
        player: player.clone(),
        fetcher,
    };

    Ok(Live {
        environment,
        player,
    })
}
