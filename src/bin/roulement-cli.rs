#![forbid(unsafe_code)]
use anyhow::{bail, Result};
use roulement::{
    io,
    scheduler::{FairnessReport, SchedError, Scheduler, SolveOptions},
    storage::{JsonStorage, Storage},
    table::ScheduleTable,
    PlanConfig,
};
use clap::{Parser, Subcommand};
use std::time::Duration;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de génération de roulements (calendrier, exclusions, PLNE)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du roulement résolu
    #[arg(long, global = true, default_value = "schedule.json")]
    schedule: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Lister les slots générés et leurs exclusions
    Calendar {
        #[arg(long)]
        plan: String,
    },

    /// Résoudre l'assignation et sauvegarder le roulement
    Solve {
        #[arg(long)]
        plan: String,
        /// Remplace le roster du plan (CSV, header `name`)
        #[arg(long)]
        workers_csv: Option<String>,
        /// Budget de résolution (prioritaire sur le plan)
        #[arg(long)]
        time_limit_secs: Option<u64>,
    },

    /// Revalider le roulement sauvegardé
    Check {
        /// Export CSV des conflits (optionnel)
        #[arg(long)]
        report: Option<String>,
    },

    /// Exporter le roulement sauvegardé
    Export {
        /// Tableau date × machine avec colonne repos
        #[arg(long)]
        out_csv: Option<String>,
        /// Une ligne par slot
        #[arg(long)]
        out_long_csv: Option<String>,
        #[arg(long)]
        out_json: Option<String>,
        /// Colonne recopiée dans le tableau, ex. `night=ward` (répétable)
        #[arg(long = "link", value_name = "SOURCE=TARGET")]
        links: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.schedule)?;

    let code = match cli.cmd {
        Commands::Calendar { plan } => {
            let config = PlanConfig::load(plan)?;
            let scheduler = Scheduler::new(&config)?;
            for slot in scheduler.slots() {
                let conflicts: Vec<String> =
                    slot.conflicts.iter().map(ToString::to_string).collect();
                println!("{} {} | excludes [{}]", slot.id, slot, conflicts.join(" "));
            }
            0
        }
        Commands::Solve {
            plan,
            workers_csv,
            time_limit_secs,
        } => {
            let mut config = PlanConfig::load(plan)?;
            if let Some(path) = workers_csv {
                config.workers = io::import_workers_csv(path)?
                    .into_iter()
                    .map(|w| w.as_str().to_owned())
                    .collect();
            }
            if time_limit_secs.is_some() {
                config.time_limit_secs = time_limit_secs;
            }
            let scheduler = Scheduler::new(&config)?;
            let opts = SolveOptions {
                time_limit: config.time_limit(),
            };
            match scheduler.solve_schedule(opts) {
                Ok(schedule) => {
                    let report = scheduler.validate(&schedule.assignment);
                    print_fairness(&report.fairness);
                    storage.save(&schedule)?;
                    println!("Saved {} slot(s) to {}", schedule.slots.len(), cli.schedule);
                    0
                }
                Err(SchedError::Infeasible) => {
                    eprintln!("INFEASIBLE: no assignment satisfies the exclusion rules");
                    3
                }
                Err(SchedError::Timeout(limit)) => {
                    eprintln!("TIMEOUT: no solution within {}", format_limit(limit));
                    4
                }
                Err(err) => return Err(err.into()),
            }
        }
        Commands::Check { report } => {
            let stored = storage.read()?;
            println!("Schedule saved at {}", stored.saved_at.to_rfc3339());
            let schedule = stored.schedule;
            let scheduler =
                Scheduler::from_parts(schedule.machines, schedule.slots, schedule.workers)?;
            let result = scheduler.validate(&schedule.assignment);
            print_fairness(&result.fairness);
            for issue in &result.coverage {
                eprintln!("coverage: {issue:?}");
            }
            if result.is_valid() {
                println!("OK: no conflicts");
                0
            } else {
                eprintln!("Found {} conflict(s)", result.violations.len());
                if let Some(path) = report {
                    let mut w = csv::Writer::from_path(path)?;
                    w.write_record(["worker", "slot", "conflicting"])?;
                    for v in &result.violations {
                        let slot = v.slot.index().to_string();
                        let conflicting = v.conflicting.index().to_string();
                        w.write_record([v.worker.as_str(), slot.as_str(), conflicting.as_str()])?;
                    }
                    w.flush()?;
                }
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::Export {
            out_csv,
            out_long_csv,
            out_json,
            links,
        } => {
            if out_csv.is_none() && out_long_csv.is_none() && out_json.is_none() {
                bail!("nothing to export: pass --out-csv, --out-long-csv or --out-json");
            }
            let links = parse_links(&links)?;
            let schedule = storage.load()?;
            if let Some(path) = out_csv {
                let table = ScheduleTable::build(&schedule).with_links(links.iter().copied());
                io::export_table_csv(path, &table)?;
            }
            if let Some(path) = out_long_csv {
                io::export_assignment_csv(path, &schedule)?;
            }
            if let Some(path) = out_json {
                io::export_schedule_json(path, &schedule)?;
            }
            0
        }
    };

    std::process::exit(code);
}

fn print_fairness(fairness: &FairnessReport) {
    for (worker, count) in &fairness.counts {
        println!("{worker}: {count}");
    }
    println!(
        "mean {:.2} | abs deviation {:.2} | variance {:.3} | spread {}",
        fairness.mean, fairness.absolute_deviation, fairness.variance, fairness.spread
    );
}

fn parse_links(raw: &[String]) -> Result<Vec<(&str, &str)>> {
    raw.iter()
        .map(|link| match link.split_once('=') {
            Some((source, target)) if !source.is_empty() && !target.is_empty() => {
                Ok((source, target))
            }
            _ => bail!("invalid --link {link:?}: expected SOURCE=TARGET"),
        })
        .collect()
}

fn format_limit(limit: Duration) -> String {
    format!("{}s", limit.as_secs_f64())
}
