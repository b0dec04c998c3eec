//! `tictactoe` - play, bridge, serve results and show the leaderboard.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Command};
use std::sync::Arc;
use tictactoe_engine::{Engine, Position, SharedEngine};
use tictactoe_server::{
    AppConfig, Bridge, GameRepository, GameSession, Notifier, ReceiverState, TracingMailer,
    router,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout belongs to the game or the bridge protocol
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,tictactoe_server=info")),
        )
        .init();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(path) = cli.database {
        config.set_database_path(path);
    }

    match cli.command {
        Command::Play {
            difficulty,
            side,
            name,
            email,
        } => {
            if let Some(difficulty) = difficulty {
                config.set_difficulty(difficulty);
            }
            if let Some(side) = side {
                config.set_human_player(side.into());
            }
            let session = build_session(&config, name.zip(email))?;
            run_play(session).await
        }
        Command::Bridge { name, email } => {
            let session = build_session(&config, name.zip(email))?;
            run_bridge(session).await
        }
        Command::Serve { host, port } => {
            if let Some(port) = port {
                config.set_listen_port(port);
            }
            let host = host.unwrap_or_else(|| config.listen_host().clone());
            run_receiver(&config, host).await
        }
        Command::Leaderboard { limit } => run_leaderboard(&config, limit),
    }
}

fn open_repository(config: &AppConfig) -> Result<GameRepository> {
    let repository = GameRepository::new(config.database_path().clone())?;
    repository
        .run_migrations()
        .with_context(|| format!("preparing database '{}'", config.database_path()))?;
    Ok(repository)
}

/// Builds a session; storage and notifications are only wired up for a
/// registered player.
#[instrument(skip(config))]
fn build_session(config: &AppConfig, player: Option<(String, String)>) -> Result<GameSession> {
    let engine = SharedEngine::new(Engine::new(*config.difficulty(), *config.human_player()));
    let mut session = GameSession::new(engine);

    let Some((name, email)) = player else {
        info!("Anonymous session; results are not recorded");
        return Ok(session);
    };

    session = session.with_repository(open_repository(config)?);
    if let Some(url) = config.notify_url() {
        session = session.with_notifier(Notifier::new(url.clone()));
    }
    session.register(&name, &email)?;
    Ok(session)
}

async fn run_play(session: GameSession) -> Result<()> {
    let mut state = session.current_state();
    println!(
        "You are {} on {} difficulty. Enter moves as `row col` (0-2), `q` to quit.",
        state.human_player(),
        state.difficulty()
    );
    if state.is_computer_turn() {
        state = session.computer_turn().await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while !state.is_game_over() {
        println!("\n{}\n", state.board());
        println!("Your move:");
        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Ok(());
        }
        let position = match parse_move(line) {
            Ok(position) => position,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        match session.play_turn(position).await {
            Ok(next) => state = next,
            Err(e) => println!("{}", e),
        }
    }

    println!("\n{}\n", state.board());
    match state.result().winner() {
        Some(winner) if winner == state.human_player() => println!("You win!"),
        Some(_) => println!("Computer wins."),
        None => println!("Draw."),
    }
    Ok(())
}

fn parse_move(line: &str) -> Result<Position> {
    let parts: Vec<&str> = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|p| !p.is_empty())
        .collect();
    let [row, col] = parts.as_slice() else {
        bail!("expected two numbers: row col");
    };
    let row: i64 = row.parse().context("row is not a number")?;
    let col: i64 = col.parse().context("column is not a number")?;
    Position::checked(row, col).context("row and column must be 0, 1 or 2")
}

async fn run_bridge(session: GameSession) -> Result<()> {
    info!("Serving bridge on stdio");
    let bridge = Bridge::new(session);
    bridge
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;
    Ok(())
}

async fn run_receiver(config: &AppConfig, host: String) -> Result<()> {
    let state = ReceiverState::new(Arc::new(TracingMailer), config.mail_from().clone());
    let app = router(state);

    let listener = tokio::net::TcpListener::bind((host.as_str(), *config.listen_port())).await?;
    info!(
        "Receiver ready at http://{}:{}/api/games",
        host,
        config.listen_port()
    );
    axum::serve(listener, app).await?;
    Ok(())
}

fn run_leaderboard(config: &AppConfig, limit: usize) -> Result<()> {
    let repository = open_repository(config)?;
    let entries = repository.leaderboard()?;
    if entries.is_empty() {
        warn!("No games recorded yet");
        println!("No games recorded yet.");
        return Ok(());
    }
    println!("{:<4} {:<24} {:>6} {:>6} {:>6}", "#", "Player", "Best", "Wins", "Games");
    for (rank, entry) in entries.iter().take(limit).enumerate() {
        println!(
            "{:<4} {:<24} {:>6} {:>6} {:>6}",
            rank + 1,
            entry.name(),
            entry.best_streak(),
            entry.wins(),
            entry.total()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_move() {
        assert_eq!(parse_move("1 2").expect("valid"), Position::new(1, 2));
        assert_eq!(parse_move(" 0,0 ").expect("valid"), Position::new(0, 0));
        assert!(parse_move("3 0").is_err());
        assert!(parse_move("1").is_err());
        assert!(parse_move("a b").is_err());
    }

    #[test]
    fn test_player_from_side() {
        use tictactoe_engine::Player;
        assert_eq!(Player::from(cli::Side::O), Player::O);
    }
}
