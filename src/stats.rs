use chrono::{DateTime, Local};
use rusqlite::{params, Connection, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_dirs::AppDirs;
use crate::util;

/// One won round, as persisted to the history store.
#[derive(Debug, Clone)]
pub struct RoundRecord {
    pub sentence: String,
    pub duration_ms: u64,
    pub mistakes: u32,
    pub streak_after: u32,
    pub timestamp: DateTime<Local>,
}

/// Per-sentence aggregate across all recorded rounds.
#[derive(Debug, Clone)]
pub struct SentenceSummary {
    pub sentence: String,
    pub avg_duration_ms: f64,
    pub mistake_rate: f64,
    pub attempts: i64,
}

/// SQLite-backed round history.
#[derive(Debug)]
pub struct StatsDb {
    conn: Connection,
}

impl StatsDb {
    /// Open (and if needed create) the store at its default location.
    pub fn new() -> Result<Self> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("plink_stats.db"));
        Self::open_at(db_path)
    }

    /// Open the store at an explicit path; tests point this at a temp dir.
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        let conn = Connection::open(path)?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS round_results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                sentence TEXT NOT NULL,
                duration_ms INTEGER NOT NULL,
                mistakes INTEGER NOT NULL,
                streak_after INTEGER NOT NULL,
                timestamp TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_round_results_sentence ON round_results(sentence)",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_round_results_timestamp ON round_results(timestamp)",
            [],
        )?;

        Ok(StatsDb { conn })
    }

    pub fn record_round(&self, record: &RoundRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO round_results
            (sentence, duration_ms, mistakes, streak_after, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                record.sentence,
                record.duration_ms,
                record.mistakes,
                record.streak_after,
                record.timestamp.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// All recorded rounds for one sentence, most recent first.
    pub fn sentence_history(&self, sentence: &str) -> Result<Vec<RoundRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT sentence, duration_ms, mistakes, streak_after, timestamp
            FROM round_results
            WHERE sentence = ?1
            ORDER BY timestamp DESC
            "#,
        )?;

        let record_iter = stmt.query_map([sentence], |row| {
            let timestamp_str: String = row.get(4)?;
            let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
                .map_err(|_| {
                    rusqlite::Error::InvalidColumnType(
                        4,
                        "timestamp".to_string(),
                        rusqlite::types::Type::Text,
                    )
                })?
                .with_timezone(&Local);

            Ok(RoundRecord {
                sentence: row.get(0)?,
                duration_ms: row.get(1)?,
                mistakes: row.get(2)?,
                streak_after: row.get(3)?,
                timestamp,
            })
        })?;

        let mut records = Vec::new();
        for record in record_iter {
            records.push(record?);
        }

        Ok(records)
    }

    pub fn avg_duration_ms(&self, sentence: &str) -> Result<Option<f64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT AVG(duration_ms) FROM round_results WHERE sentence = ?1")?;

        let avg: Option<f64> = stmt.query_row([sentence], |row| row.get(0))?;
        Ok(avg)
    }

    /// Percentage of recorded rounds of this sentence that had a mistake.
    pub fn mistake_rate(&self, sentence: &str) -> Result<f64> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT
                COUNT(*) as total,
                SUM(CASE WHEN mistakes > 0 THEN 1 ELSE 0 END) as flawed
            FROM round_results
            WHERE sentence = ?1
            "#,
        )?;

        // SUM is NULL when no rows match
        let (total, flawed): (i64, Option<i64>) =
            stmt.query_row([sentence], |row| Ok((row.get(0)?, row.get(1)?)))?;

        if total == 0 {
            Ok(0.0)
        } else {
            Ok((flawed.unwrap_or(0) as f64 / total as f64) * 100.0)
        }
    }

    /// Aggregate over every sentence ever played, slowest first.
    pub fn all_sentence_summary(&self) -> Result<Vec<SentenceSummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT
                sentence,
                AVG(duration_ms) as avg_duration,
                (SUM(CASE WHEN mistakes > 0 THEN 1 ELSE 0 END) * 100.0 / COUNT(*)) as mistake_rate,
                COUNT(*) as attempts
            FROM round_results
            GROUP BY sentence
            ORDER BY avg_duration DESC
            "#,
        )?;

        let summary_iter = stmt.query_map([], |row| {
            let avg_duration: Option<f64> = row.get(1)?;
            Ok(SentenceSummary {
                sentence: row.get(0)?,
                avg_duration_ms: avg_duration.unwrap_or(0.0),
                mistake_rate: row.get(2)?,
                attempts: row.get(3)?,
            })
        })?;

        let mut summary = Vec::new();
        for item in summary_iter {
            summary.push(item?);
        }

        Ok(summary)
    }

    /// Timestamp of the most recent recorded round, if any.
    pub fn last_round_at(&self) -> Result<Option<DateTime<Local>>> {
        let mut stmt = self
            .conn
            .prepare("SELECT MAX(timestamp) FROM round_results")?;

        let latest: Option<String> = stmt.query_row([], |row| row.get(0))?;
        Ok(latest.and_then(|s| {
            DateTime::parse_from_rfc3339(&s)
                .ok()
                .map(|dt| dt.with_timezone(&Local))
        }))
    }

    pub fn total_rounds(&self) -> Result<i64> {
        let mut stmt = self.conn.prepare("SELECT COUNT(*) FROM round_results")?;
        stmt.query_row([], |row| row.get(0))
    }

    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM round_results", [])?;
        Ok(())
    }
}

/// Summary of one finished session, appended to the session log.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub rounds: usize,
    pub total: Duration,
    pub best_streak: u32,
    pub mean_round_ms: f64,
    pub std_dev_ms: f64,
}

impl SessionSummary {
    pub fn from_rounds(durations: &[Duration], best_streak: u32) -> Self {
        let ms: Vec<f64> = durations.iter().map(|d| d.as_millis() as f64).collect();
        Self {
            rounds: durations.len(),
            total: durations.iter().sum(),
            best_streak,
            mean_round_ms: util::mean(&ms).unwrap_or(0.0),
            std_dev_ms: util::std_dev(&ms).unwrap_or(0.0),
        }
    }

    /// Append this summary to the CSV session log, emitting the header when
    /// the file is new.
    pub fn append_to_log(&self, path: &Path) -> csv::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let needs_header = !path.exists();

        let file = std::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if needs_header {
            writer.write_record([
                "date",
                "rounds",
                "total_secs",
                "best_streak",
                "avg_round_ms",
                "std_dev_ms",
            ])?;
        }

        writer.write_record([
            Local::now().format("%c").to_string(),
            self.rounds.to_string(),
            format!("{:.2}", self.total.as_secs_f64()),
            self.best_streak.to_string(),
            format!("{:.0}", self.mean_round_ms),
            format!("{:.2}", self.std_dev_ms),
        ])?;

        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(sentence: &str, duration_ms: u64, mistakes: u32) -> RoundRecord {
        RoundRecord {
            sentence: sentence.to_string(),
            duration_ms,
            mistakes,
            streak_after: 0,
            timestamp: Local::now(),
        }
    }

    #[test]
    fn test_record_and_read_back() {
        let dir = tempdir().unwrap();
        let db = StatsDb::open_at(dir.path().join("stats.db")).unwrap();

        db.record_round(&record("a b c", 4200, 1)).unwrap();
        db.record_round(&record("a b c", 3100, 0)).unwrap();

        let history = db.sentence_history("a b c").unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().any(|r| r.duration_ms == 4200));
        assert_eq!(db.total_rounds().unwrap(), 2);
    }

    #[test]
    fn test_avg_duration() {
        let dir = tempdir().unwrap();
        let db = StatsDb::open_at(dir.path().join("stats.db")).unwrap();

        assert_eq!(db.avg_duration_ms("a").unwrap(), None);

        db.record_round(&record("a", 1000, 0)).unwrap();
        db.record_round(&record("a", 3000, 0)).unwrap();
        assert_eq!(db.avg_duration_ms("a").unwrap(), Some(2000.0));
    }

    #[test]
    fn test_mistake_rate() {
        let dir = tempdir().unwrap();
        let db = StatsDb::open_at(dir.path().join("stats.db")).unwrap();

        assert_eq!(db.mistake_rate("a").unwrap(), 0.0);

        db.record_round(&record("a", 1000, 2)).unwrap();
        db.record_round(&record("a", 1000, 0)).unwrap();
        db.record_round(&record("a", 1000, 0)).unwrap();
        db.record_round(&record("a", 1000, 1)).unwrap();
        assert_eq!(db.mistake_rate("a").unwrap(), 50.0);
    }

    #[test]
    fn test_summary_groups_by_sentence() {
        let dir = tempdir().unwrap();
        let db = StatsDb::open_at(dir.path().join("stats.db")).unwrap();

        db.record_round(&record("slow one", 9000, 1)).unwrap();
        db.record_round(&record("fast one", 1000, 0)).unwrap();

        let summary = db.all_sentence_summary().unwrap();
        assert_eq!(summary.len(), 2);
        // Slowest first
        assert_eq!(summary[0].sentence, "slow one");
        assert_eq!(summary[0].attempts, 1);
        assert_eq!(summary[0].mistake_rate, 100.0);
        assert_eq!(summary[1].mistake_rate, 0.0);
    }

    #[test]
    fn test_last_round_at() {
        let dir = tempdir().unwrap();
        let db = StatsDb::open_at(dir.path().join("stats.db")).unwrap();

        assert!(db.last_round_at().unwrap().is_none());
        db.record_round(&record("a", 1000, 0)).unwrap();
        assert!(db.last_round_at().unwrap().is_some());
    }

    #[test]
    fn test_clear_all() {
        let dir = tempdir().unwrap();
        let db = StatsDb::open_at(dir.path().join("stats.db")).unwrap();
        db.record_round(&record("a", 1000, 0)).unwrap();
        db.clear_all().unwrap();
        assert_eq!(db.total_rounds().unwrap(), 0);
    }

    #[test]
    fn test_session_summary_from_rounds() {
        let durations = [Duration::from_millis(2000), Duration::from_millis(4000)];
        let summary = SessionSummary::from_rounds(&durations, 2);

        assert_eq!(summary.rounds, 2);
        assert_eq!(summary.total, Duration::from_millis(6000));
        assert_eq!(summary.mean_round_ms, 3000.0);
        assert_eq!(summary.std_dev_ms, 1000.0);
    }

    #[test]
    fn test_session_summary_empty() {
        let summary = SessionSummary::from_rounds(&[], 0);
        assert_eq!(summary.rounds, 0);
        assert_eq!(summary.mean_round_ms, 0.0);
        assert_eq!(summary.std_dev_ms, 0.0);
    }

    #[test]
    fn test_log_header_written_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.csv");

        let summary = SessionSummary::from_rounds(&[Duration::from_secs(3)], 1);
        summary.append_to_log(&path).unwrap();
        summary.append_to_log(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("date,rounds,total_secs"));
        assert!(!lines[1].starts_with("date"));
    }
}
