use std::time::{Duration, Instant};

use plink::sentence::Sentence;
use plink::session::{GameSession, SessionPhase, SessionSettings};
use plink::stats::{SessionSummary, StatsDb};
use tempfile::tempdir;

/// Integration tests wiring GameSession to the round-history store.

#[test]
fn won_rounds_land_in_the_stats_db() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("stats.db");

    let sentences = vec![
        Sentence::parse("a b").unwrap(),
        Sentence::parse("c d").unwrap(),
    ];
    let mut session = GameSession::with_recorder(
        SessionSettings::new(sentences),
        StatsDb::open_at(&db_path).unwrap(),
    );

    let t0 = Instant::now();
    session.start_session(t0).unwrap();

    let mut now = t0;
    loop {
        now += Duration::from_secs(2);
        let target = session.target().unwrap().words().to_vec();
        for word in &target {
            session.submit_word(word, now);
        }
        if session.phase() == SessionPhase::SessionComplete {
            break;
        }
        session.next_round(now).unwrap();
    }

    // Re-open independently and check both rounds were recorded
    let db = StatsDb::open_at(&db_path).unwrap();
    assert_eq!(db.total_rounds().unwrap(), 2);

    let history_a = db.sentence_history("a b").unwrap();
    let history_c = db.sentence_history("c d").unwrap();
    assert_eq!(history_a.len(), 1);
    assert_eq!(history_c.len(), 1);
    assert_eq!(history_a[0].mistakes, 0);
    assert!(db.last_round_at().unwrap().is_some());
}

#[test]
fn flawed_round_records_its_mistakes() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("stats.db");

    let sentences = vec![Sentence::parse("x y").unwrap()];
    let mut session = GameSession::with_recorder(
        SessionSettings::new(sentences),
        StatsDb::open_at(&db_path).unwrap(),
    );

    let t0 = Instant::now();
    session.start_session(t0).unwrap();

    // Miss once, recover, then clear manually, then win
    session.submit_word("y", t0);
    session.submit_word("x", t0);
    session.on_tick(t0 + Duration::from_secs(1));
    session.clear_round();
    session.submit_word("x", t0 + Duration::from_secs(2));
    session.submit_word("y", t0 + Duration::from_secs(2));
    assert_eq!(session.phase(), SessionPhase::SessionComplete);

    let db = StatsDb::open_at(&db_path).unwrap();
    let history = db.sentence_history("x y").unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].mistakes, 2);
    assert_eq!(history[0].streak_after, 0);
    assert_eq!(db.mistake_rate("x y").unwrap(), 100.0);
}

#[test]
fn summary_and_log_agree_on_round_count() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("sessions.csv");

    let durations = [
        Duration::from_millis(1500),
        Duration::from_millis(2500),
        Duration::from_millis(2000),
    ];
    let summary = SessionSummary::from_rounds(&durations, 3);
    assert_eq!(summary.rounds, 3);
    assert_eq!(summary.total, Duration::from_millis(6000));
    assert_eq!(summary.mean_round_ms, 2000.0);

    summary.append_to_log(&log_path).unwrap();

    let mut reader = csv::Reader::from_path(&log_path).unwrap();
    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 1);
    assert_eq!(&records[0][1], "3");
    assert_eq!(&records[0][3], "3");
}
