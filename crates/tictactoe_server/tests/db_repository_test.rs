//! Tests for database repository operations.

use chrono::{NaiveDate, NaiveDateTime};
use tempfile::NamedTempFile;
use tictactoe_engine::{Difficulty, Outcome};
use tictactoe_server::{DbErrorKind, GameRepository, NewGame};

/// Creates a temporary database file with schema applied, returns the file
/// handle (must stay in scope to keep the file alive) and a ready repository.
fn setup_test_db() -> (NamedTempFile, GameRepository) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let repo = GameRepository::new(db_path).expect("Failed to create repository");
    repo.run_migrations().expect("Migrations failed");
    (db_file, repo)
}

fn at(minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 4, 1)
        .and_then(|d| d.and_hms_opt(10, minute, 0))
        .expect("valid timestamp")
}

fn play(repo: &GameRepository, player_id: i32, outcome: Outcome, minute: u32) {
    repo.save_game(NewGame::from_parts(
        player_id,
        outcome,
        Difficulty::Hard,
        20,
        at(minute),
    ))
    .expect("Save failed");
}

fn streak_of(repo: &GameRepository, player_id: i32) -> i32 {
    repo.current_streak(player_id)
        .expect("Query failed")
        .map(|s| *s.wins_count())
        .unwrap_or(0)
}

#[test]
fn test_upsert_player_inserts() {
    let (_db, repo) = setup_test_db();
    let player = repo
        .upsert_player("Ann", "ann@example.com")
        .expect("Upsert failed");
    assert_eq!(player.name(), "Ann");
    assert_eq!(player.email(), "ann@example.com");
    assert!(*player.id() > 0);
}

#[test]
fn test_upsert_player_updates_name_for_same_email() {
    let (_db, repo) = setup_test_db();
    let first = repo
        .upsert_player("Ann", "ann@example.com")
        .expect("Upsert failed");
    let second = repo
        .upsert_player("Annie", "ann@example.com")
        .expect("Upsert failed");
    assert_eq!(first.id(), second.id());
    assert_eq!(second.name(), "Annie");

    let found = repo
        .get_player_by_email("ann@example.com")
        .expect("Query failed")
        .expect("Player missing");
    assert_eq!(found.name(), "Annie");
}

#[test]
fn test_get_player_by_email_not_found() {
    let (_db, repo) = setup_test_db();
    let found = repo
        .get_player_by_email("nobody@example.com")
        .expect("Query failed");
    assert!(found.is_none());
}

#[test]
fn test_save_game_returns_stored_row() {
    let (_db, repo) = setup_test_db();
    let player = repo.upsert_player("Ann", "ann@example.com").expect("Upsert failed");
    let stored = repo
        .save_game(NewGame::from_parts(
            *player.id(),
            Outcome::Draw,
            Difficulty::Medium,
            33,
            at(5),
        ))
        .expect("Save failed");
    assert_eq!(stored.player_id(), player.id());
    assert_eq!(stored.parse_outcome().expect("outcome"), Outcome::Draw);
    assert_eq!(stored.difficulty(), "medium");
    assert_eq!(*stored.duration_secs(), 33);
    assert_eq!(*stored.played_at(), at(5));
}

#[test]
fn test_wins_extend_one_open_streak() {
    let (_db, repo) = setup_test_db();
    let id = *repo.upsert_player("Ann", "ann@example.com").expect("Upsert failed").id();

    assert!(repo.current_streak(id).expect("Query failed").is_none());
    play(&repo, id, Outcome::Win, 1);
    play(&repo, id, Outcome::Win, 2);
    play(&repo, id, Outcome::Win, 3);

    let streak = repo
        .current_streak(id)
        .expect("Query failed")
        .expect("Streak missing");
    assert!(streak.is_open());
    assert_eq!(*streak.wins_count(), 3);
    assert_eq!(*streak.started_at(), at(1));
}

#[test]
fn test_loss_closes_streak() {
    let (_db, repo) = setup_test_db();
    let id = *repo.upsert_player("Ann", "ann@example.com").expect("Upsert failed").id();

    play(&repo, id, Outcome::Win, 1);
    play(&repo, id, Outcome::Win, 2);
    play(&repo, id, Outcome::Loss, 3);
    assert_eq!(streak_of(&repo, id), 0);

    play(&repo, id, Outcome::Win, 4);
    assert_eq!(streak_of(&repo, id), 1);
}

#[test]
fn test_draw_closes_streak() {
    let (_db, repo) = setup_test_db();
    let id = *repo.upsert_player("Ann", "ann@example.com").expect("Upsert failed").id();

    play(&repo, id, Outcome::Win, 1);
    play(&repo, id, Outcome::Draw, 2);
    assert_eq!(streak_of(&repo, id), 0);
}

#[test]
fn test_non_win_without_streak_is_harmless() {
    let (_db, repo) = setup_test_db();
    let id = *repo.upsert_player("Ann", "ann@example.com").expect("Upsert failed").id();

    play(&repo, id, Outcome::Loss, 1);
    play(&repo, id, Outcome::Draw, 2);
    assert_eq!(streak_of(&repo, id), 0);
    assert_eq!(repo.games_for_player(id).expect("Query failed").len(), 2);
}

#[test]
fn test_streaks_are_per_player() {
    let (_db, repo) = setup_test_db();
    let ann = *repo.upsert_player("Ann", "ann@example.com").expect("Upsert failed").id();
    let bob = *repo.upsert_player("Bob", "bob@example.com").expect("Upsert failed").id();

    play(&repo, ann, Outcome::Win, 1);
    play(&repo, bob, Outcome::Win, 2);
    play(&repo, bob, Outcome::Loss, 3);

    assert_eq!(streak_of(&repo, ann), 1);
    assert_eq!(streak_of(&repo, bob), 0);
}

#[test]
fn test_invalid_outcome_writes_nothing() {
    let (_db, repo) = setup_test_db();
    let id = *repo.upsert_player("Ann", "ann@example.com").expect("Upsert failed").id();

    let bogus = NewGame::new(id, "forfeit".to_string(), "hard".to_string(), 1, at(1));
    let err = repo.save_game(bogus).expect_err("Invalid outcome accepted");
    assert_eq!(err.kind, DbErrorKind::Record);
    assert!(repo.games_for_player(id).expect("Query failed").is_empty());
}

#[test]
fn test_games_for_player_most_recent_first() {
    let (_db, repo) = setup_test_db();
    let id = *repo.upsert_player("Ann", "ann@example.com").expect("Upsert failed").id();

    play(&repo, id, Outcome::Loss, 1);
    play(&repo, id, Outcome::Win, 9);
    play(&repo, id, Outcome::Draw, 5);

    let minutes: Vec<NaiveDateTime> = repo
        .games_for_player(id)
        .expect("Query failed")
        .iter()
        .map(|g| *g.played_at())
        .collect();
    assert_eq!(minutes, vec![at(9), at(5), at(1)]);
}

#[test]
fn test_leaderboard_ordering() {
    let (_db, repo) = setup_test_db();
    let ann = *repo.upsert_player("Ann", "ann@example.com").expect("Upsert failed").id();
    let bob = *repo.upsert_player("Bob", "bob@example.com").expect("Upsert failed").id();
    let cat = *repo.upsert_player("Cat", "cat@example.com").expect("Upsert failed").id();
    repo.upsert_player("Dan", "dan@example.com").expect("Upsert failed");

    // Ann: best streak 2, three wins in total.
    play(&repo, ann, Outcome::Win, 1);
    play(&repo, ann, Outcome::Win, 2);
    play(&repo, ann, Outcome::Loss, 3);
    play(&repo, ann, Outcome::Win, 4);
    // Bob: best streak 2, two wins.
    play(&repo, bob, Outcome::Win, 5);
    play(&repo, bob, Outcome::Win, 6);
    // Cat: never won.
    play(&repo, cat, Outcome::Loss, 7);

    let board = repo.leaderboard().expect("Query failed");
    let names: Vec<&str> = board.iter().map(|e| e.name().as_str()).collect();
    assert_eq!(names, vec!["Ann", "Bob", "Cat"], "Dan has no games");

    assert_eq!(*board[0].best_streak(), 2);
    assert_eq!(*board[0].wins(), 3);
    assert_eq!(*board[0].total(), 4);
    assert_eq!(*board[1].wins(), 2);
    assert_eq!(*board[2].best_streak(), 0);
    assert_eq!(*board[2].total(), 1);
}

#[test]
fn test_leaderboard_ties_break_by_name() {
    let (_db, repo) = setup_test_db();
    let zed = *repo.upsert_player("Zed", "zed@example.com").expect("Upsert failed").id();
    let amy = *repo.upsert_player("Amy", "amy@example.com").expect("Upsert failed").id();

    play(&repo, zed, Outcome::Win, 1);
    play(&repo, amy, Outcome::Win, 2);

    let board = repo.leaderboard().expect("Query failed");
    assert_eq!(board[0].name(), "Amy");
    assert_eq!(board[1].name(), "Zed");
}

#[test]
fn test_unreachable_database_reports_connection_error() {
    let repo = GameRepository::new("/nonexistent/dir/games.sqlite".to_string())
        .expect("Path accepted");
    let err = repo.leaderboard().expect_err("Connection should fail");
    assert_eq!(err.kind, DbErrorKind::Connection);
}
