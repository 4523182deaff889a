use anyhow::{Context, Result};
use clap::Parser;
use dedupe_lib::matching::{find_candidate_sets_with_filter, FinderOptions};
use dedupe_lib::session::{MergeSession, SessionConfig, SessionOutcome};
use dedupe_lib::table::{ColumnMap, Table, TableWriter};
use dedupe_lib::utils::constants::{
    CITY_COLUMN, DEFAULT_SOURCE_FILE, ENTRY_RECORDED_BY_COLUMN, NAME_COLUMN, STATE_COLUMN,
    STREET_ADDRESS_COLUMN, UPDATED_AT_COLUMN,
};
use dedupe_lib::utils::contributor_filter::EntryRecordedByFilter;
use dedupe_lib::utils::env::load_env;
use dedupe_lib::utils::logging::{DedupeLogger, Phase};
use dedupe_lib::utils::progress_config::ProgressConfig;
use log::{info, warn};
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Review and merge duplicate repository records in a CSV file", long_about = None)]
struct Args {
    /// CSV file to de-duplicate
    #[arg(env = "DEDUPE_SOURCE", default_value = DEFAULT_SOURCE_FILE)]
    source: PathBuf,

    /// Where to write the result (defaults to overwriting SOURCE)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only review sets containing a record entered by this person
    #[arg(long)]
    entry_recorded_by: Option<String>,

    /// Leave records with a PO box street address out of duplicate detection
    #[arg(long)]
    no_pobox: bool,

    /// Also group records that have no street address
    #[arg(long)]
    include_missing_address: bool,

    /// Print the candidate sets and exit without reviewing them
    #[arg(long)]
    list: bool,

    #[arg(long, default_value = NAME_COLUMN)]
    name_column: String,

    #[arg(long, default_value = CITY_COLUMN)]
    city_column: String,

    #[arg(long, default_value = STATE_COLUMN)]
    state_column: String,

    #[arg(long, default_value = STREET_ADDRESS_COLUMN)]
    address_column: String,

    #[arg(long, default_value = ENTRY_RECORDED_BY_COLUMN)]
    recorded_by_column: String,

    #[arg(long, default_value = UPDATED_AT_COLUMN)]
    updated_column: String,
}

impl Args {
    fn column_map(&self) -> ColumnMap {
        ColumnMap {
            name: self.name_column.clone(),
            city: self.city_column.clone(),
            state: self.state_column.clone(),
            street_address: self.address_column.clone(),
            entry_recorded_by: self.recorded_by_column.clone(),
            updated_at: self.updated_column.clone(),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    load_env();
    let args = Args::parse();
    info!("Starting repository record de-duplication for {}", args.source.display());

    let recorded_by = EntryRecordedByFilter::new(args.entry_recorded_by.clone());
    recorded_by.log_config();
    let progress_config = ProgressConfig::from_env();

    // Phase 1: load
    let loader = DedupeLogger::new(Phase::Loader);
    loader.log_start(&args.source.display().to_string());
    let table = Table::load(&args.source)
        .with_context(|| format!("Failed to load {}", args.source.display()))?;
    loader.log_phase("Resolving columns", None);
    let columns = args
        .column_map()
        .resolve(&table)
        .context("Source is missing a required column")?;
    recorded_by.validate(&table, &columns);
    loader.log_completion(&format!("{} records, {} columns", table.len(), table.columns().len()));

    // Phase 2: find candidate sets
    let options = FinderOptions {
        no_pobox: args.no_pobox,
        require_street_address: !args.include_missing_address,
    };
    let pb = progress_config.create_bar(table.len(), "Grouping records...");
    let report =
        find_candidate_sets_with_filter(&table, &columns, &options, Some(&recorded_by), pb.as_ref());
    if let Some(pb) = pb {
        pb.finish_with_message(format!("{} candidate sets", report.sets.len()));
    }

    if args.list {
        for (i, set) in report.sets.iter().enumerate() {
            let rows: Vec<String> = set.members.iter().map(|id| id.to_string()).collect();
            println!("{:>4}. {}  [{}]", i + 1, set.key, rows.join(", "));
        }
        println!("{} candidate sets", report.sets.len());
        return Ok(());
    }
    if report.sets.is_empty() {
        info!("No duplicate candidates found; nothing to review");
        return Ok(());
    }

    // Phase 3: interactive review
    let writer = TableWriter::new(args.output.clone().unwrap_or_else(|| args.source.clone()));
    let mut session = MergeSession::new(table, columns, report.sets, SessionConfig::from_env());
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    let outcome = session
        .run(&mut input, &mut output, &writer)
        .context("Review session failed")?;

    // Phase 4: write
    match outcome {
        SessionOutcome::Completed => {
            let logger = DedupeLogger::new(Phase::Writer);
            logger.log_start(&writer.destination().display().to_string());
            let table = session.into_table();
            writer
                .write(&table)
                .with_context(|| format!("Failed to write {}", writer.destination().display()))?;
            logger.log_completion(&format!("{} records", table.len()));
        }
        SessionOutcome::Aborted => {
            if session.has_unsaved_changes() {
                warn!("Session ended without saving; the last changes were not written");
            } else {
                info!("Session ended; no unsaved changes");
            }
        }
    }
    Ok(())
}
