use clap::{Parser, ValueEnum};
use itertools::Itertools;
use rand::seq::SliceRandom;
use std::error::Error;
use std::time::{Duration, Instant};
use time_humanize::HumanTime;

use plink::app_dirs::AppDirs;
use plink::config::{Config, ConfigStore, FileConfigStore};
use plink::phrases::{generate_sentences, PhraseSet};
use plink::runtime::{FixedTicker, GameEvent, GameEventSource, Runner, StdinEventSource, Ticker};
use plink::sentence::Sentence;
use plink::session::{GameSession, SessionPhase, SessionSettings, SubmitOutcome};
use plink::stats::{SessionSummary, StatsDb};
use plink::timer::format_mm_ss;

const TICK_RATE_MS: u64 = 250;

/// word-target shooting range for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A word-target shooting range: each target sentence's words are scattered as targets; pick them off in order to rebuild the sentence. The clock runs across the whole session and misses cost your streak."
)]
pub struct Cli {
    /// phrase set to draw target sentences from
    #[clap(short = 'l', long, value_enum)]
    phrase_set: Option<SupportedPhraseSet>,

    /// number of target sentences per session
    #[clap(short = 'r', long)]
    rounds: Option<usize>,

    /// custom target sentences, separated by ';'
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// build the session from this many generated sentences
    #[clap(short = 'g', long)]
    generated: Option<usize>,

    /// recovery delay after a mismatched sentence, in milliseconds
    #[clap(long)]
    mismatch_delay_ms: Option<u64>,

    /// forget the best streak when returning to the title screen
    #[clap(long)]
    reset_best_on_title: bool,

    /// print historical round statistics and exit
    #[clap(long)]
    stats: bool,
}

#[derive(Debug, Copy, Clone, ValueEnum, strum_macros::Display)]
pub enum SupportedPhraseSet {
    English,
    Proverbs,
    Pangrams,
}

impl SupportedPhraseSet {
    fn as_set(&self) -> PhraseSet {
        PhraseSet::new(self.to_string().to_lowercase())
    }

    fn from_name(name: &str) -> Self {
        match name {
            "proverbs" => SupportedPhraseSet::Proverbs,
            "pangrams" => SupportedPhraseSet::Pangrams,
            _ => SupportedPhraseSet::English,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.stats {
        return print_stats();
    }

    let store = FileConfigStore::new();
    let cfg = merge_config(store.load(), &cli);
    let _ = store.save(&cfg);

    let sentences = build_sentences(&cli, &cfg)?;

    let mut settings = SessionSettings::new(sentences);
    settings.mismatch_delay = Duration::from_millis(cfg.mismatch_delay_ms);
    settings.keep_best_on_title = cfg.keep_best_on_title;

    let mut session = match StatsDb::new() {
        Ok(db) => GameSession::with_recorder(settings, db),
        Err(_) => GameSession::new(settings),
    };

    let runner = Runner::new(
        StdinEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    run(&mut session, &runner)
}

fn merge_config(mut cfg: Config, cli: &Cli) -> Config {
    if let Some(set) = cli.phrase_set {
        cfg.phrase_set = set.to_string().to_lowercase();
    }
    if let Some(rounds) = cli.rounds {
        cfg.rounds_per_session = rounds;
    }
    if let Some(delay) = cli.mismatch_delay_ms {
        cfg.mismatch_delay_ms = delay;
    }
    if cli.reset_best_on_title {
        cfg.keep_best_on_title = false;
    }
    cfg
}

fn build_sentences(cli: &Cli, cfg: &Config) -> Result<Vec<Sentence>, Box<dyn Error>> {
    if let Some(ref prompt) = cli.prompt {
        let sentences: Vec<Sentence> = prompt.split(';').filter_map(Sentence::parse).collect();
        if sentences.is_empty() {
            return Err("no usable sentences in --prompt".into());
        }
        return Ok(sentences);
    }

    if let Some(num) = cli.generated {
        if num == 0 {
            return Err("--generated needs at least one sentence".into());
        }
        return Ok(generate_sentences(num));
    }

    let all = SupportedPhraseSet::from_name(&cfg.phrase_set)
        .as_set()
        .normalized();
    let picked: Vec<Sentence> = all
        .choose_multiple(&mut rand::thread_rng(), cfg.rounds_per_session)
        .cloned()
        .collect();
    if picked.is_empty() {
        return Err("session needs at least one round".into());
    }
    Ok(picked)
}

fn run<E: GameEventSource, T: Ticker>(
    session: &mut GameSession,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    session.start_session(Instant::now())?;
    print_round_intro(session);

    loop {
        match runner.step() {
            GameEvent::Tick => {
                if session.on_tick(Instant::now()) {
                    println!("-- targets restored --");
                    print_targets(session);
                }
            }
            GameEvent::Line(line) => {
                let now = Instant::now();
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }

                match input {
                    ":quit" | ":q" => return Ok(()),
                    ":clear" | ":c" => {
                        if session.clear_round() {
                            println!("-- cleared (that run is off the streak) --");
                            print_targets(session);
                        }
                    }
                    ":next" | ":n" => {
                        if session.next_round(now)? {
                            print_round_intro(session);
                        }
                    }
                    ":time" | ":t" => {
                        println!("time {}", format_mm_ss(session.elapsed(now)));
                    }
                    ":title" => {
                        session.go_to_title(now);
                        let best = session.streak().best;
                        println!("back at the title screen (best streak {best}): :start to play, :quit to exit");
                    }
                    ":start" => {
                        if session.phase() == SessionPhase::Idle {
                            session.start_session(now)?;
                            print_round_intro(session);
                        }
                    }
                    word => handle_word(session, word, now),
                }

                if session.phase() == SessionPhase::SessionComplete {
                    finish_session(session, now);
                    return Ok(());
                }
            }
        }
    }
}

fn handle_word(session: &mut GameSession, word: &str, now: Instant) {
    let word = word.to_lowercase();
    match session.submit_word(&word, now) {
        SubmitOutcome::Ignored => println!("(no active round)"),
        SubmitOutcome::Continue => {
            println!("dock: {}", session.submitted_words().iter().join(" "));
        }
        SubmitOutcome::Mismatch => {
            println!(
                "MISS: that's not the sentence: \"{}\"",
                session.submitted_words().iter().join(" ")
            );
        }
        SubmitOutcome::Win { session_complete } => {
            let streak = session.streak();
            println!(
                "HIT: sentence cleared at {} (streak {}, best {})",
                format_mm_ss(session.elapsed(now)),
                streak.current,
                streak.best
            );
            if !session_complete {
                println!(
                    "{} sentence(s) left: :next when ready",
                    session.remaining_count()
                );
            }
        }
    }
}

fn print_round_intro(session: &GameSession) {
    println!(
        "round {} of {}: rebuild the sentence, one word per line",
        session.rounds_won() + 1,
        session.rounds_won() + 1 + session.remaining_count()
    );
    print_targets(session);
}

fn print_targets(session: &GameSession) {
    let Some(target) = session.target() else {
        return;
    };
    // Scatter the tiles: one target per word occurrence, order hidden
    let mut words = target.words().to_vec();
    words.shuffle(&mut rand::thread_rng());
    println!("targets: [{}]", words.iter().join("] ["));
}

fn finish_session(session: &GameSession, now: Instant) {
    let streak = session.streak();
    let summary = SessionSummary::from_rounds(session.round_durations(), streak.best);

    println!(
        "session complete: {} round(s) in {}, streak {} (best {})",
        summary.rounds,
        format_mm_ss(session.elapsed(now)),
        streak.current,
        streak.best
    );
    println!(
        "avg round {:.1}s (sd {:.1}s)",
        summary.mean_round_ms / 1000.0,
        summary.std_dev_ms / 1000.0
    );

    if let Some(path) = AppDirs::session_log_path() {
        let _ = summary.append_to_log(&path);
    }
}

fn print_stats() -> Result<(), Box<dyn Error>> {
    let db = StatsDb::new()?;
    let summary = db.all_sentence_summary()?;

    if summary.is_empty() {
        println!("no rounds recorded yet");
        return Ok(());
    }

    println!("{} round(s) recorded", db.total_rounds()?);
    if let Some(last) = db.last_round_at()? {
        let secs_ago = (chrono::Local::now() - last).num_seconds();
        println!("last round {}", HumanTime::from(-secs_ago));
    }

    println!("slowest sentences:");
    for entry in summary.iter().take(10) {
        println!(
            "  {:>6.1}s  {:>5.1}% missed  {:>3} plays  {}",
            entry.avg_duration_ms / 1000.0,
            entry.mistake_rate,
            entry.attempts,
            entry.sentence
        );
    }
    Ok(())
}
