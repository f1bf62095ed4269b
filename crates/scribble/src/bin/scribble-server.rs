use scribble::{ScribbleError, ScribbleServerBuilder, ServerConfig};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ScribbleError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        bind = %config.bind_addr,
        turn_ticks = config.room.turn_ticks,
        pause_ticks = config.room.pause_ticks,
        tick_interval = ?config.room.tick_interval,
        idle_timeout = ?config.idle_timeout,
        "starting scribble server"
    );

    let server = ScribbleServerBuilder::from_config(config).build().await?;
    server.run().await
}
