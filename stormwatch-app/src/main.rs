use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};
use std::{path::PathBuf, sync::Arc};
use stormwatch::{
    background::driver::spawn_dashboard, core::dashboard::ApiStatus, ActiveLayer, Dashboard,
    DashboardConfig, DashboardStatus, HeadlessProvider, HttpStrikeSource, LatLng,
    SelectedLocation,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Runs the lightning dashboard engine headless", long_about = None)]
struct Cli {
    /// Base URL of the weather backend
    #[arg(long)]
    api_url: Option<String>,
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Layer to show: lightning, weather or radar
    #[arg(long, default_value = "lightning")]
    layer: ActiveLayer,
    /// Fly to a location, given as `lat,lon[,name]`
    #[arg(long, value_parser = parse_location)]
    location: Option<SelectedLocation>,
    /// Start with the upstream connection flagged down
    #[arg(long)]
    offline: bool,
    /// Exit after this many poll periods
    #[arg(long)]
    ticks: Option<u32>,
}

fn parse_location(raw: &str) -> Result<SelectedLocation> {
    let mut parts = raw.splitn(3, ',');
    let (Some(lat), Some(lon)) = (parts.next(), parts.next()) else {
        bail!("expected lat,lon[,name]");
    };
    let lat: f64 = lat.trim().parse().context("latitude")?;
    let lon: f64 = lon.trim().parse().context("longitude")?;
    if !LatLng::new(lat, lon).is_valid() {
        bail!("coordinates out of range: {}, {}", lat, lon);
    }
    Ok(match parts.next().map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => SelectedLocation::new(LatLng::new(lat, lon), name),
        None => SelectedLocation::from_geolocation(lat, lon),
    })
}

fn log_status(status: &DashboardStatus) {
    let api = match status.api_status {
        ApiStatus::Connected => "connected",
        ApiStatus::Degraded => "degraded",
        ApiStatus::Offline => "offline",
    };
    let updated = status
        .last_update
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());
    info!(
        "api={} strikes={} markers={} layer={} updated={} pointer={}",
        api,
        status.strike_count,
        status.marker_count,
        status.active_layer,
        updated,
        status.pointer.readout()
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    stormwatch::init_logging();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => DashboardConfig::from_file(path)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("loading {}", path.display()))?,
        None => DashboardConfig::default(),
    }
    .with_env_overrides();
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }
    if cli.offline {
        config.start_connected = false;
    }
    config.validate().map_err(|e| anyhow::anyhow!("{}", e))?;

    let provider = HeadlessProvider::new(config.map_access_token.clone());
    let source = Arc::new(HttpStrikeSource::from_config(&config));
    let poll_interval = config.feed.poll_interval();
    info!("Polling {} every {:?}", source.endpoint(), poll_interval);

    let mut dashboard = Dashboard::new(config);
    if !dashboard.mount(&provider) {
        warn!("No map surface; set STORMWATCH_MAP_TOKEN to enable markers");
    }
    dashboard.set_active_layer(cli.layer);
    dashboard.on("fetchfailed", |event| warn!("{:?}", event));

    let handle = spawn_dashboard(dashboard, source);
    if let Some(location) = cli.location {
        handle
            .select_location(location)
            .map_err(|e| anyhow::anyhow!("{}", e))?;
    }

    let status = handle.subscribe();
    let mut polls = tokio::time::interval(poll_interval);
    polls.tick().await;
    let mut remaining = cli.ticks;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            _ = polls.tick() => {
                log_status(&status.borrow());
                if let Some(n) = remaining.as_mut() {
                    *n = n.saturating_sub(1);
                    if *n == 0 {
                        break;
                    }
                }
            }
        }
    }

    let last = handle.shutdown().await;
    log_status(&last);
    Ok(())
}
