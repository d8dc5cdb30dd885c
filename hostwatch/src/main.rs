use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use drilldown::{Dashboard, HostDetail};
use hostwatch_core::{now_local, GroupStatus, Settings, ThresholdDays};
use ipnet::Ipv4Net;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use store_sqlite::{Db, SourceBatch, SourceCounts};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat { Text, Json, Jsonl }

#[derive(Debug, Parser)]
#[command(name = "hostwatch", version, about = "Antivirus and log-shipping compliance dashboard")]
struct Cli {
    /// Optional config file (YAML). If omitted, loads ./hostwatch.yaml if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Record store (SQLite file). Overrides the config file.
    #[arg(long, global = true, value_name = "FILE")]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print version information
    Version,
    /// Replace inventory and signal tables with synthetic data
    Seed {
        /// Number of inventory hosts
        #[arg(long)]
        hosts: Option<usize>,
        /// Number of hosts that get an antivirus timestamp
        #[arg(long)]
        antivirus: Option<usize>,
        /// Number of hosts that get a log timestamp
        #[arg(long)]
        logs: Option<usize>,
        /// IPv4 CIDR to draw addresses from
        #[arg(long)]
        cidr: Option<String>,
        /// RNG seed for reproducible data
        #[arg(long)]
        seed: Option<u64>,
        /// Run a consolidation pass afterwards
        #[arg(long, default_value_t = false)]
        consolidate: bool,
    },
    /// Load inventory and signal tables from CSV files
    Import {
        /// CSV with address,hostname,purpose,classification
        #[arg(long, value_name = "FILE")]
        inventory: Option<PathBuf>,
        /// CSV with address,timestamp
        #[arg(long, value_name = "FILE")]
        antivirus: Option<PathBuf>,
        /// CSV with address,timestamp
        #[arg(long, value_name = "FILE")]
        logs: Option<PathBuf>,
        /// Keep existing rows instead of clearing all source tables first
        #[arg(long, default_value_t = false)]
        append: bool,
    },
    /// Rebuild the unified host snapshot from inventory and signals
    Consolidate {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Status per classification
    Status {
        /// Recency threshold in days; invalid values use the configured default
        #[arg(long)]
        days: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Status per purpose within one classification
    Purposes {
        classification: String,
        /// Recency threshold in days; invalid values use the configured default
        #[arg(long)]
        days: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Hosts of one classification and purpose with per-signal freshness
    Hosts {
        classification: String,
        purpose: String,
        /// Recency threshold in days; invalid values use the configured default
        #[arg(long)]
        days: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Output file (overwrites)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
        /// Write CSV to the --out file instead of text/json
        #[arg(long, default_value_t = false, requires = "out")]
        csv: bool,
    },
    /// Dump the unified snapshot as CSV
    Export {
        #[arg(long, value_name = "FILE")]
        out: PathBuf,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,hostwatch=info,store_sqlite=info,consolidate=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let cfg = config::load_config(cli.config.as_deref()).unwrap_or_default();
    let settings = cfg.settings(cli.db.as_deref());
    tracing::debug!(store = %settings.store_location.display(), default_days = %settings.default_threshold_days, "settings resolved");

    match cli.command {
        Commands::Version => {
            println!("hostwatch {} (core {})", env!("CARGO_PKG_VERSION"), hostwatch_core::version());
        }
        Commands::Seed { hosts, antivirus, logs, cidr, seed, consolidate } => {
            let synth_cfg = cfg.synth.clone().unwrap_or_default();
            let defaults = synth::SynthOptions::default();
            let cidr = match cidr.or(synth_cfg.cidr) {
                Some(c) => c.parse::<Ipv4Net>().with_context(|| format!("invalid --cidr {c}"))?,
                None => defaults.cidr,
            };
            let opts = synth::SynthOptions {
                hosts: hosts.or(synth_cfg.hosts).unwrap_or(defaults.hosts),
                antivirus: antivirus.or(synth_cfg.antivirus).unwrap_or(defaults.antivirus),
                logs: logs.or(synth_cfg.logs).unwrap_or(defaults.logs),
                cidr,
                seed: seed.or(synth_cfg.seed),
            };
            let data = synth::generate(&opts, now_local())?;
            let mut db = Db::open_or_create(&settings.store_location)?;
            let batch = SourceBatch {
                inventory: Some(data.inventory),
                antivirus: Some(data.antivirus),
                logs: Some(data.logs),
            };
            let counts = db.load_sources(&batch, false)?;
            println!(
                "seeded {} hosts, {} antivirus and {} log records into {}",
                counts.inventory,
                counts.antivirus,
                counts.logs,
                settings.store_location.display()
            );
            if consolidate {
                let summary = consolidate::run(&mut db)?;
                println!("consolidated {} hosts", summary.hosts);
            }
        }
        Commands::Import { inventory, antivirus, logs, append } => {
            let db = Db::open_or_create(&settings.store_location)?;
            let counts = import_sources(&db, inventory.as_deref(), antivirus.as_deref(), logs.as_deref(), append)?;
            println!(
                "imported {} inventory, {} antivirus and {} log rows",
                counts.inventory, counts.antivirus, counts.logs
            );
        }
        Commands::Consolidate { format } => {
            let mut db = Db::open_or_create(&settings.store_location)?;
            let started = Instant::now();
            let summary = consolidate::run(&mut db)?;
            let duration_ms = started.elapsed().as_millis();
            match format {
                OutputFormat::Text => println!(
                    "consolidated {} hosts ({} with antivirus, {} with logs, {} ms)",
                    summary.hosts, summary.with_antivirus, summary.with_logs, duration_ms
                ),
                OutputFormat::Json | OutputFormat::Jsonl => {
                    let obj = serde_json::json!({
                        "hosts": summary.hosts,
                        "with_antivirus": summary.with_antivirus,
                        "with_logs": summary.with_logs,
                        "duration_ms": duration_ms,
                    });
                    println!("{}", serde_json::to_string(&obj)?);
                }
            }
        }
        Commands::Status { days, format } => {
            let dash = open_dashboard(&settings)?;
            let threshold = dash.threshold(days.as_deref());
            let groups = dash.top_level_statuses(threshold)?;
            print_groups("classification", None, groups, threshold, format)?;
        }
        Commands::Purposes { classification, days, format } => {
            let dash = open_dashboard(&settings)?;
            let threshold = dash.threshold(days.as_deref());
            let groups = dash.purpose_statuses(&classification, threshold)?;
            print_groups("purpose", Some(&classification), groups, threshold, format)?;
        }
        Commands::Hosts { classification, purpose, days, format, out, csv } => {
            let dash = open_dashboard(&settings)?;
            let threshold = dash.threshold(days.as_deref());
            let hosts = dash.host_details(&classification, &purpose, threshold)?;
            match (out, csv) {
                (Some(path), true) => {
                    let mut wtr = csv::Writer::from_writer(File::create(&path)?);
                    wtr.write_record(["address","hostname","purpose","classification","antivirus_last_updated","log_last_received","antivirus_fresh","log_fresh","compliant"])?;
                    for h in &hosts {
                        wtr.write_record([
                            h.host.address.as_str(),
                            h.host.hostname.as_str(),
                            h.host.purpose.as_str(),
                            h.host.classification.as_str(),
                            h.host.antivirus_last_updated.as_deref().unwrap_or_default(),
                            h.host.log_last_received.as_deref().unwrap_or_default(),
                            if h.antivirus_fresh { "true" } else { "false" },
                            if h.log_fresh { "true" } else { "false" },
                            if h.compliant { "true" } else { "false" },
                        ])?;
                    }
                    wtr.flush()?;
                }
                (out, _) => {
                    let lines = host_lines(&hosts, threshold, format)?;
                    write_lines(out.as_deref(), &lines)?;
                }
            }
        }
        Commands::Export { out } => {
            let db = Db::open_read_only(&settings.store_location)?;
            let n = db.write_snapshot_csv(BufWriter::new(File::create(&out)?))?;
            println!("exported {} hosts to {}", n, out.display());
        }
    }
    Ok(())
}

fn open_input(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("opening {}", path.display()))
}

/// Every CSV is parsed before the store is touched, and the load itself is one transaction.
fn import_sources(
    db: &Db,
    inventory: Option<&Path>,
    antivirus: Option<&Path>,
    logs: Option<&Path>,
    append: bool,
) -> Result<SourceCounts> {
    let batch = SourceBatch {
        inventory: inventory
            .map(|p| store_sqlite::read_inventory_csv(open_input(p)?).with_context(|| format!("parsing {}", p.display())))
            .transpose()?,
        antivirus: antivirus
            .map(|p| store_sqlite::read_signals_csv(open_input(p)?).with_context(|| format!("parsing {}", p.display())))
            .transpose()?,
        logs: logs
            .map(|p| store_sqlite::read_signals_csv(open_input(p)?).with_context(|| format!("parsing {}", p.display())))
            .transpose()?,
    };
    db.load_sources(&batch, append)
}

fn open_dashboard(settings: &Settings) -> Result<Dashboard<Db>> {
    let db = Db::open_read_only(&settings.store_location)?;
    Ok(Dashboard::new(db, settings.clone()))
}

fn print_groups(
    key: &str,
    parent: Option<&str>,
    groups: impl IntoIterator<Item = (String, GroupStatus)>,
    threshold: ThresholdDays,
    format: OutputFormat,
) -> Result<()> {
    let groups: Vec<(String, GroupStatus)> = groups.into_iter().collect();
    match format {
        OutputFormat::Text => {
            if let Some(p) = parent {
                println!("{} (threshold {} days)", p, threshold);
            } else {
                println!("threshold {} days", threshold);
            }
            if groups.is_empty() {
                println!("  no hosts");
            }
            for (name, status) in &groups {
                println!("  {:<24} {:<6} {} hosts", name, status.tier, status.member_count);
            }
        }
        OutputFormat::Json => {
            let rows: Vec<_> = groups
                .iter()
                .map(|(name, s)| serde_json::json!({ key: name, "status": s.tier, "count": s.member_count }))
                .collect();
            let obj = serde_json::json!({ "threshold_days": threshold, "parent": parent, "groups": rows });
            println!("{}", serde_json::to_string(&obj)?);
        }
        OutputFormat::Jsonl => {
            for (name, s) in &groups {
                let obj = serde_json::json!({ key: name, "status": s.tier, "count": s.member_count, "threshold_days": threshold });
                println!("{}", serde_json::to_string(&obj)?);
            }
        }
    }
    Ok(())
}

fn freshness_label(fresh: bool, raw: Option<&str>) -> String {
    format!("{}({})", if fresh { "fresh" } else { "stale" }, raw.unwrap_or("-"))
}

fn host_lines(hosts: &[HostDetail], threshold: ThresholdDays, format: OutputFormat) -> Result<Vec<String>> {
    let mut lines = Vec::with_capacity(hosts.len() + 1);
    match format {
        OutputFormat::Text => {
            lines.push(format!("{} hosts (threshold {} days)", hosts.len(), threshold));
            for h in hosts {
                lines.push(format!(
                    "{:<16} {:<20} av={} log={}{}",
                    h.host.address,
                    h.host.hostname,
                    freshness_label(h.antivirus_fresh, h.host.antivirus_last_updated.as_deref()),
                    freshness_label(h.log_fresh, h.host.log_last_received.as_deref()),
                    if h.compliant { "" } else { " NONCOMPLIANT" },
                ));
            }
        }
        OutputFormat::Json => {
            let obj = serde_json::json!({ "threshold_days": threshold, "hosts": hosts });
            lines.push(serde_json::to_string(&obj)?);
        }
        OutputFormat::Jsonl => {
            for h in hosts {
                lines.push(serde_json::to_string(h)?);
            }
        }
    }
    Ok(lines)
}

fn write_lines(out: Option<&Path>, lines: &[String]) -> Result<()> {
    match out {
        Some(path) => {
            let file = OpenOptions::new().create(true).truncate(true).write(true).open(path)?;
            let mut w = BufWriter::new(file);
            for line in lines {
                writeln!(w, "{}", line)?;
            }
            w.flush()?;
        }
        None => {
            for line in lines {
                println!("{}", line);
            }
        }
    }
    Ok(())
}
