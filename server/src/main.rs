mod broadcaster;
mod decision_client;
mod games;
mod identifiers;
mod server_config;
mod tick_scheduler;
mod web_server;
mod ws_handler;

use std::path::PathBuf;

use clap::Parser;
use tokio::sync::mpsc;

use common::games::SessionRng;
use common::games::snake::SnakeGame;
use common::store::YamlFileStore;
use common::{log, logger};

use broadcaster::ViewerBroadcaster;
use decision_client::{spawn_decision_client, DecisionLink};
use games::snake::GameSession;
use server_config::{get_config_manager, COMMAND_BUFFER, DEFAULT_CONFIG_FILE};
use web_server::{run_web_server, WebServerState};

#[derive(Parser)]
#[command(name = "snake_server")]
struct Args {
    #[arg(long, env = "HOST", default_value = "localhost")]
    host: String,

    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,

    #[arg(long, env = "STATIC_DIR", default_value = "server/static")]
    static_dir: PathBuf,

    #[arg(long, env = "DECISION_URL", default_value = "ws://localhost:5000/ws")]
    decision_url: String,

    /// Play without the external decision service.
    #[arg(long)]
    no_decision_service: bool,

    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    #[arg(long, default_value = "snake_high_score.yaml")]
    high_score_file: String,

    #[arg(long)]
    use_log_prefix: bool,

    /// Fixed food placement seed, for reproducible games.
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let prefix = if args.use_log_prefix {
        Some("Snake".to_string())
    } else {
        None
    };
    logger::init_logger(prefix);

    let settings = get_config_manager(&args.config).get_config()?;
    log!(
        "Tick intervals: normal {}ms, fast {}ms",
        settings.normal_tick_ms,
        settings.fast_tick_ms
    );

    let (commands, commands_rx) = mpsc::channel(COMMAND_BUFFER);

    let decisions = if args.no_decision_service {
        log!("Decision service disabled");
        DecisionLink::offline()
    } else {
        spawn_decision_client(args.decision_url.clone(), settings.decision_retry(), commands.clone())
    };

    let rng = match args.seed {
        Some(seed) => SessionRng::new(seed),
        None => SessionRng::from_random(),
    };

    let viewers = ViewerBroadcaster::new();
    let session = GameSession::new(
        SnakeGame::new(rng),
        YamlFileStore::open(&args.high_score_file),
        decisions,
        viewers.clone(),
        settings,
    );
    let session_task = tokio::spawn(session.run(commands_rx));

    let addr = format!("{}:{}", args.host, args.port);
    let state = WebServerState { viewers, commands };
    run_web_server(&addr, &args.static_dir, state).await?;

    session_task.abort();
    log!("Server shut down");

    Ok(())
}
