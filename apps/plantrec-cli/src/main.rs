//! Operator binary for the recommendation pipeline: run a questionnaire
//! or free-text ranking against the configured catalog, browse recorded
//! runs, rate them, or purge the store.

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use rand::rngs::StdRng;
use rand::SeedableRng;

use plantrec_core::catalog::JsonCatalog;
use plantrec_core::config::Config;
use plantrec_core::query::Query;
use plantrec_core::questionnaire::{QuestionBank, UserAnswer};
use plantrec_core::traits::{CatalogSource, RecommendationStore, Scorer};
use plantrec_core::types::{AlgorithmDetail, Plant};
use plantrec_lexical::LexicalScorer;
use plantrec_rank::{record_run, RankedTiers, Recommender};
use plantrec_semantic::{default_embedder, SemanticScorer};
use plantrec_store::LanceStore;

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() {
        eprintln!("Usage: {prog} <questions|rank|rank-text|history|rate|purge> [args...]");
        std::process::exit(1);
    }
    let cmd = args.remove(0);
    (cmd, args)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::load().context("loading configuration")?;
    let (cmd, args) = parse_args();
    match cmd.as_str() {
        "questions" => questions(),
        "rank" => rank_structured(&config, &args),
        "rank-text" => rank_free_text(&config, &args),
        "history" => history(&config, &args),
        "rate" => rate(&config, &args),
        "purge" => purge(&config),
        _ => {
            eprintln!("Unknown command: {cmd}");
            std::process::exit(1);
        }
    }
}

fn questions() -> anyhow::Result<()> {
    let bank = QuestionBank::default();
    for question in bank.questions() {
        println!("[{}] {}", question.id, question.text);
        for answer in bank.answers_for(question.id) {
            println!("    {} = {}", answer.id, answer.value);
        }
    }
    Ok(())
}

/// `rank 1=3 2=9 ...`: question-id=answer-id pairs from `questions`.
fn rank_structured(config: &Config, args: &[String]) -> anyhow::Result<()> {
    if args.is_empty() {
        eprintln!("Usage: plantrec-cli rank <question_id=answer_id> ...");
        std::process::exit(1);
    }
    let mut answers = Vec::new();
    for arg in args {
        let (question, answer) = arg
            .split_once('=')
            .ok_or_else(|| anyhow!("expected question_id=answer_id, got '{arg}'"))?;
        answers.push(UserAnswer {
            question_id: question.trim().parse().context("question id")?,
            answer_id: answer.trim().parse().context("answer id")?,
        });
    }
    let choices = QuestionBank::default().resolve(&answers)?;
    let query = Query::Structured(choices);

    let catalog = load_catalog(config)?;
    let scorer = LexicalScorer::new(&catalog)?;
    run_and_record(config, &catalog, &scorer, &query, None)
}

/// `rank-text "a hardy plant for a dark bathroom"`
fn rank_free_text(config: &Config, args: &[String]) -> anyhow::Result<()> {
    let raw = args.first().map(String::as_str).unwrap_or_else(|| {
        eprintln!("Usage: plantrec-cli rank-text \"<free text>\"");
        std::process::exit(1);
    });
    let query = Query::free_text(raw);
    let free_text = match &query {
        Query::FreeText(text) => text.clone(),
        Query::Structured(_) => unreachable!("free_text always builds the FreeText variant"),
    };

    let catalog = load_catalog(config)?;
    let model_dir: Option<PathBuf> = config.get::<String>("semantic.model_dir").ok().map(PathBuf::from);
    let embedder = default_embedder(model_dir)?;
    let scorer = SemanticScorer::new(embedder, &catalog)?;
    run_and_record(config, &catalog, &scorer, &query, Some(free_text.as_str()))
}

fn run_and_record(
    config: &Config,
    catalog: &[Plant],
    scorer: &dyn Scorer,
    query: &Query,
    free_text: Option<&str>,
) -> anyhow::Result<()> {
    let settings = config.ranking()?;
    let counts = settings.counts;
    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let recommender = Recommender::new(scorer, catalog, settings);
    let run = recommender.rank(query, counts, &mut rng)?;
    print_run(&run);

    let store = open_store(config)?;
    let submission = store.create_submission(free_text)?;
    let written = record_run(&store, submission, &run)?;
    println!("✅ Recorded {written} recommendations under submission {submission}");
    println!("   Rate it later with: plantrec-cli rate {submission} <1-5>");
    Ok(())
}

fn print_run(run: &RankedTiers) {
    for tier in run.tiers() {
        println!("\n== {} ({} plants) ==", tier.label, tier.results.len());
        for (plant, metadata) in &tier.results {
            let stats = &metadata.stats;
            print!(
                "  #{:<4} {:<16} norm {:.2}  pct {:.3}  rank {}",
                plant.id, plant.name, stats.score_norm, stats.score_percentile, stats.rank
            );
            match &metadata.detail {
                AlgorithmDetail::Bm25 { match_count, max_matches, match_ratio, .. } => {
                    println!("  matches {match_count}/{max_matches} ({match_ratio:.2})");
                }
                AlgorithmDetail::Sbert { cosine_distance, gap_to_best } => {
                    println!("  dist {cosine_distance:.4}  gap {gap_to_best:.4}");
                }
            }
        }
    }
}

fn history(config: &Config, args: &[String]) -> anyhow::Result<()> {
    let rated_only = args.iter().any(|a| a == "--rated");
    let store = open_store(config)?;
    let histories = store.list_submissions(!rated_only)?;
    if histories.is_empty() {
        println!("No submissions recorded yet");
        return Ok(());
    }
    for history in histories {
        let s = &history.submission;
        let rating = s.rating.map_or("unrated".to_string(), |r| format!("{r}/5"));
        let query = s.free_text.as_deref().unwrap_or("(questionnaire)");
        println!("submission {} [{}] {} \"{}\"", s.id, s.created_at.to_rfc3339(), rating, query);
        for rec in &history.recommendations {
            println!(
                "    {} plant {} (norm {:.2}, rank {})",
                rec.record.label(),
                rec.record.plant_id,
                rec.metadata.stats.score_norm,
                rec.metadata.stats.rank
            );
        }
    }
    Ok(())
}

fn rate(config: &Config, args: &[String]) -> anyhow::Result<()> {
    let (submission, rating) = match (args.first(), args.get(1)) {
        (Some(s), Some(r)) => (s.parse().context("submission id")?, r.parse().context("rating")?),
        _ => {
            eprintln!("Usage: plantrec-cli rate <submission_id> <1-5>");
            std::process::exit(1);
        }
    };
    let store = open_store(config)?;
    store.add_rating(submission, rating)?;
    println!("✅ Submission {submission} rated {rating}/5");
    Ok(())
}

fn purge(config: &Config) -> anyhow::Result<()> {
    let store = open_store(config)?;
    store.purge_all()?;
    println!("✅ All recorded submissions, recommendations and metadata deleted");
    Ok(())
}

fn load_catalog(config: &Config) -> anyhow::Result<Vec<Plant>> {
    let path: String =
        config.get("data.catalog_path").unwrap_or_else(|_| "data/plants.json".to_string());
    let catalog = JsonCatalog::new(&path).list_all()?;
    if catalog.is_empty() {
        return Err(anyhow!("catalog at {path} is empty"));
    }
    Ok(catalog)
}

fn open_store(config: &Config) -> anyhow::Result<LanceStore> {
    let dir: String = config.get("data.lancedb_dir").unwrap_or_else(|_| "data/store".to_string());
    Ok(LanceStore::open(PathBuf::from(dir))?)
}
