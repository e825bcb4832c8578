use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use owo_colors::OwoColorize;
use poker_agent::session::request_start;
use poker_agent::{
    Agent, AgentConfig, HttpGameServer, Seat, SessionId, SessionOrigin, WeightedRandomPolicy,
    establish,
};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "poker-agent",
    version,
    about = "Plays poker against a remote game server by polling its API",
    author
)]
struct Cli {
    /// Display name the agent joins under
    name: String,

    /// Session to join; a new one is created when omitted
    session: Option<String>,

    /// Game server API root
    #[arg(long)]
    server: Option<String>,

    /// JSON config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// RNG seed for the decision policy (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Wait between polls, in milliseconds
    #[arg(long = "poll-ms")]
    poll_ms: Option<u64>,

    /// Wait after a failed poll, in milliseconds
    #[arg(long = "backoff-ms")]
    backoff_ms: Option<u64>,

    /// Timeout for each request to the server, in milliseconds
    #[arg(long = "timeout-ms")]
    timeout_ms: Option<u64>,

    /// Seats at a newly created table
    #[arg(long = "max-players")]
    max_players: Option<u32>,

    /// Starting chips at a newly created table
    #[arg(long = "starting-chips")]
    starting_chips: Option<u32>,

    /// Small blind at a newly created table
    #[arg(long = "small-blind")]
    small_blind: Option<u32>,

    /// Big blind at a newly created table
    #[arg(long = "big-blind")]
    big_blind: Option<u32>,

    /// Ask the server to start the session after joining
    #[arg(long, default_value_t = false)]
    start: bool,

    /// Disable ANSI colors in console output
    #[arg(long = "no-color", default_value_t = false)]
    no_color: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

impl Cli {
    fn resolve_config(&self) -> Result<AgentConfig> {
        let mut config = match &self.config {
            Some(path) => AgentConfig::from_json_file(path)?,
            None => AgentConfig::default(),
        };

        if let Some(server) = &self.server {
            config.server_url = server.clone();
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(ms) = self.poll_ms {
            config.pacing.poll = Duration::from_millis(ms);
        }
        if let Some(ms) = self.backoff_ms {
            config.pacing.backoff = Duration::from_millis(ms);
        }
        if let Some(ms) = self.timeout_ms {
            config.request_timeout = Duration::from_millis(ms);
        }
        if let Some(max_players) = self.max_players {
            config.table.max_players = max_players;
        }
        if let Some(chips) = self.starting_chips {
            config.table.starting_chips = chips;
        }
        if let Some(blind) = self.small_blind {
            config.table.small_blind = blind;
        }
        if let Some(blind) = self.big_blind {
            config.table.big_blind = blind;
        }
        config.auto_start |= self.start;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.resolve_config()?;
    let server = HttpGameServer::from_config(&config)?;
    let existing = cli.session.clone().map(SessionId::new);

    let seat = match establish(&server, &cli.name, existing, &config.table).await {
        Ok(seat) => seat,
        Err(err) => {
            error!(error = %err, "setup failed");
            return Err(err.into());
        }
    };
    print_seat(&seat, &cli.name, cli.no_color);

    if config.auto_start {
        request_start(&server, &seat).await;
    }

    let policy = WeightedRandomPolicy::seeded(config.seed).raise_increment(config.raise_increment);
    let mut agent = Agent::new(server, policy, seat, config.pacing);
    agent.run(interrupted()).await;
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn interrupted() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "could not listen for ctrl-c; run until killed");
        std::future::pending::<()>().await;
    }
}

fn print_seat(seat: &Seat, name: &str, no_color: bool) {
    let created = seat.origin() == SessionOrigin::Created;
    if no_color {
        if created {
            println!("Session {} created", seat.session());
            println!("Join it with: poker-agent <NAME> {}", seat.session());
        }
        println!("{}", seat_line(seat, name, false));
        return;
    }

    if created {
        println!(
            "{} {} {}",
            "Session".bold().cyan(),
            seat.session().bold().yellow(),
            "created".bold().cyan()
        );
        println!(
            "{} poker-agent <NAME> {}",
            "Join it with:".bold().white(),
            seat.session()
        );
    }
    println!("{}", seat_line(seat, name, true));
}

fn seat_line(seat: &Seat, name: &str, color: bool) -> String {
    if !color {
        return format!(
            "{} seated at position {} (player {})",
            name,
            seat.position(),
            seat.participant()
        );
    }
    format!(
        "{} {} {} ({} {})",
        name.bold().green(),
        "seated at position".bold().white(),
        seat.position(),
        "player".bold().white(),
        seat.participant()
    )
}
