use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing::warn;

use catalog_normalizer::parser::dedup::GroupIdSource;
use catalog_normalizer::{db, export, ingest, parser, settings};

#[derive(Parser)]
#[command(
    name = "catalog_normalizer",
    about = "University course-catalog schedule normalizer"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema
    Init,
    /// Stage raw term JSON files from a directory
    Ingest {
        /// Directory of raw term files (default: configured raw dir)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
    /// Normalize staged terms into schedule records
    Process {
        /// Max terms to process (default: all unprocessed)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Ingest + process in one pipeline
    Run {
        /// Directory of raw term files (default: configured raw dir)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
    /// Export stored records as CSV
    Export {
        /// Output file
        #[arg(short, long, default_value = "data/class_sections.csv")]
        out: PathBuf,
        /// Filter by semester (Fall, Spring, Summer, Winter)
        #[arg(short, long)]
        semester: Option<String>,
        /// Filter by year
        #[arg(short, long)]
        year: Option<i32>,
    },
    /// Stored records table
    Overview {
        /// Filter by semester
        #[arg(short, long)]
        semester: Option<String>,
        /// Filter by year
        #[arg(short, long)]
        year: Option<i32>,
        /// Filter by department abbreviation
        #[arg(short, long)]
        dept: Option<String>,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Show pipeline statistics
    Stats,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            println!("Schema ready at {:?}", settings::load().db_path);
            Ok(())
        }
        Commands::Ingest { dir } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let dir = dir.unwrap_or_else(|| settings::load().raw_dir);
            let terms = ingest::load_directory(&dir)?;
            if terms.is_empty() {
                println!("No raw term files found in {:?}.", dir);
                return Ok(());
            }
            let staged = db::stage_raw_terms(&conn, &terms)?;
            println!("Staged {} terms.", staged);
            Ok(())
        }
        Commands::Process { limit } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let terms = db::fetch_unprocessed(&conn, limit)?;
            if terms.is_empty() {
                println!("No unprocessed terms. Run 'ingest' first or all terms are done.");
                return Ok(());
            }
            println!("Processing {} terms...", terms.len());
            let counts = process_terms(&conn, &terms)?;
            counts.print();
            Ok(())
        }
        Commands::Run { dir } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let dir = dir.unwrap_or_else(|| settings::load().raw_dir);

            // Phase 1: Ingest
            let t_ingest = Instant::now();
            let terms = ingest::load_directory(&dir)?;
            if terms.is_empty() {
                println!("No raw term files found in {:?}.", dir);
                return Ok(());
            }
            let staged = db::stage_raw_terms(&conn, &terms)?;
            println!(
                "Staged {} terms in {:.1}s",
                staged,
                t_ingest.elapsed().as_secs_f64()
            );

            // Phase 2: Process
            let t_process = Instant::now();
            let unprocessed = db::fetch_unprocessed(&conn, None)?;
            if unprocessed.is_empty() {
                println!("Nothing to process.");
                return Ok(());
            }
            println!("Processing {} terms...", unprocessed.len());
            let counts = process_terms(&conn, &unprocessed)?;
            println!("Processed in {:.1}s", t_process.elapsed().as_secs_f64());
            counts.print();
            Ok(())
        }
        Commands::Export { out, semester, year } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let written = export::write_csv(&conn, &out, semester.as_deref(), year)?;
            println!("Wrote {} records to {:?}", written, out);
            Ok(())
        }
        Commands::Overview {
            semester,
            year,
            dept,
            limit,
        } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let rows = db::fetch_records(
                &conn,
                semester.as_deref(),
                year,
                dept.as_deref(),
                Some(limit),
            )?;
            if rows.is_empty() {
                println!("No records found.");
                return Ok(());
            }

            println!(
                "{:>4} | {:<11} | {:<10} | {:<4} | {:<4} | {:<8} | {:<14} | {:<18} | {:<10}",
                "#", "Term", "Course", "Sec", "Type", "Days", "Time", "Instructor", "Location"
            );
            println!("{}", "-".repeat(104));

            for (i, r) in rows.iter().enumerate() {
                let term = format!("{} {}", r.semester, r.year);
                let course = truncate(&format!("{} {}", r.dept_abbr, r.course_number), 10);
                let instructor =
                    truncate(&format!("{} {}", r.instructor_ln, r.instructor_fn), 18);
                println!(
                    "{:>4} | {:<11} | {:<10} | {:<4} | {:<4} | {:<8} | {:<14} | {:<18} | {:<10}",
                    i + 1,
                    term,
                    course,
                    truncate(&r.section_number, 4),
                    r.section_type,
                    truncate(&r.days, 8),
                    truncate(&r.time_raw, 14),
                    instructor,
                    truncate(&r.location, 10),
                );
            }

            println!("\n{} records shown", rows.len());
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Terms:       {}", s.terms);
            println!("Processed:   {}", s.processed);
            println!("Unprocessed: {}", s.unprocessed);
            println!("Records:     {}", s.records);
            println!("Departments: {}", s.departments);
            println!("Groups:      {}", s.groups);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

#[derive(Default)]
struct ProcessCounts {
    terms: usize,
    records: usize,
    duplicates: usize,
    time_errors: usize,
}

impl ProcessCounts {
    fn print(&self) {
        println!(
            "Saved {} records from {} terms ({} duplicate rows dropped, {} unparseable times).",
            self.records, self.terms, self.duplicates, self.time_errors,
        );
    }
}

fn process_terms(
    conn: &rusqlite::Connection,
    terms: &[db::StagedTerm],
) -> anyhow::Result<ProcessCounts> {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(terms.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    let ids = GroupIdSource::new();
    let mut counts = ProcessCounts::default();

    for staged in terms {
        let term: ingest::TermSchedule = match serde_json::from_str(&staged.payload) {
            Ok(term) => term,
            Err(e) => {
                warn!(
                    "Term {} {} has a malformed payload, skipping: {}",
                    staged.semester, staged.year, e
                );
                pb.inc(1);
                continue;
            }
        };

        let raw_sections = ingest::total_sections(&term);
        let records = parser::flatten_term(&term, &ids);

        counts.terms += 1;
        counts.duplicates += raw_sections - records.len();
        counts.time_errors += records
            .iter()
            .filter(|r| r.time.start.raw == "error")
            .count();
        counts.records += records.len();

        db::save_records(conn, staged.id, &records)?;
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(counts)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
