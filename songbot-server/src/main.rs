use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use songbot_common::models::credential::Platform;
use songbot_core::auth::CredentialManager;
use songbot_core::config::AppConfig;
use songbot_core::eventbus::EventBus;
use songbot_core::platforms::spotify::{SpotifyClient, SpotifyRefresher};
use songbot_core::platforms::twitch::{TwitchHelixClient, TwitchRefresher};
use songbot_core::repositories::FileCredentialsRepository;
use songbot_core::services::dispatch_service::DispatchService;
use songbot_core::services::playback_service::PlaybackService;
use songbot_core::tasks::reward_sync;

/// Ceiling for every outbound call; a hung remote surfaces as a remote
/// error instead of a stuck dispatch task.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser, Debug)]
#[command(name = "songbot")]
#[command(author, version, about = "Bridges Twitch channel-point redemptions to Spotify playback")]
struct Args {
    /// Path to the JSON config document (doubles as the credential store).
    #[arg(long, default_value = "config/config.json")]
    config: PathBuf,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("songbot=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)
        .expect("Failed to set global subscriber");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = AppConfig::load(&args.config)
        .with_context(|| format!("loading config from {}", args.config.display()))?;
    let mapping = config.action_mapping();

    let http = reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("building http client")?;

    let store = Arc::new(
        FileCredentialsRepository::open(&args.config)
            .await
            .context("opening credential store")?,
    );
    let credentials = Arc::new(CredentialManager::new(store));
    credentials.register_refresher(
        Platform::Twitch,
        Arc::new(TwitchRefresher::new(
            http.clone(),
            config.twitch.client_id.clone(),
            config.twitch.client_secret.clone(),
        )),
    );
    credentials.register_refresher(
        Platform::Spotify,
        Arc::new(SpotifyRefresher::new(
            http.clone(),
            config.spotify.client_id.clone(),
            config.spotify.client_secret.clone(),
        )),
    );

    if !credentials.load(Platform::Twitch).await? {
        anyhow::bail!(
            "no twitch credential in {}; seed twitch.token and twitch.refreshToken first",
            args.config.display()
        );
    }
    if !credentials.load(Platform::Spotify).await? {
        info!("no spotify credential stored yet; connect in chat with !sr-spotify <code>");
    }

    let twitch = Arc::new(TwitchHelixClient::new(
        http.clone(),
        config.twitch.client_id.clone(),
        Arc::clone(&credentials),
    ));
    let broadcaster_id = twitch
        .resolve_broadcaster(&config.twitch.channel)
        .await
        .context("resolving broadcaster id")?;
    info!("broadcaster '{}' => id={}", config.twitch.channel, broadcaster_id);

    // Reconcile configured rewards before consuming any events.
    reward_sync::sync_rewards(twitch.as_ref(), &mapping)
        .await
        .context("reconciling channel-point rewards")?;

    let spotify = Arc::new(SpotifyClient::new(http, &config.spotify, Arc::clone(&credentials)));
    let player = Arc::new(PlaybackService::new(Arc::clone(&spotify)));

    // The chat/pubsub transport publishes inbound notifications onto
    // this bus; the dispatcher is its only subscriber here.
    let bus = EventBus::new();
    let events = bus.subscribe(None).await;

    let dispatcher = Arc::new(DispatchService::new(
        mapping,
        Arc::clone(&credentials),
        player,
        Arc::clone(&spotify),
        Arc::clone(&twitch),
        twitch,
    ));
    let dispatch_handle = tokio::spawn(dispatcher.run(events, bus.shutdown_rx.clone()));

    tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;
    info!("shutting down");
    bus.shutdown();
    let _ = dispatch_handle.await;
    Ok(())
}
