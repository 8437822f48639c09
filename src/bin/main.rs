use std::path::PathBuf;
use std::sync::Arc;

use bgpkit_mirror::converter::{ArchiveConverter, ConversionEvent, EventOutcome};
use bgpkit_mirror::origin::{HttpMirror, LocalMirror, OriginConnector};
use bgpkit_mirror::store::{LocalStore, Project, StoreReceiver};
use bgpkit_mirror::sync::{SyncConfig, SyncOrchestrator};
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use log::{error, info};

/// bgpkit-mirror mirrors route collectors' MRT update archives and converts them to JSON lines.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Opts {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload the archives of a time window that are missing from the store
    Sync {
        /// Origin root: a local directory, or an http(s) URL serving directory indexes
        #[clap(short, long)]
        origin: String,

        /// Directory of the archive store
        #[clap(short, long)]
        store: PathBuf,

        /// JSON file with synchronization settings
        #[clap(short, long)]
        config: Option<PathBuf>,

        /// Start of the window, RFC3339. Defaults to now minus --max-lapse
        #[clap(long)]
        start: Option<DateTime<Utc>>,

        /// End of the window, RFC3339. Defaults to now minus --min-lapse
        #[clap(long)]
        end: Option<DateTime<Utc>>,

        /// Minimum age in hours of an archive before it is synchronized
        #[clap(long, default_value_t = 1)]
        min_lapse: i64,

        /// Maximum age in hours of an archive to look back for
        #[clap(long, default_value_t = 360)]
        max_lapse: i64,

        /// Minimum number of collectors a listing must find
        #[clap(long)]
        min_collectors: Option<usize>,

        /// Upload workers per collector
        #[clap(short, long)]
        workers: Option<usize>,

        /// Project the archives are uploaded for
        #[clap(short, long)]
        project: Option<Project>,
    },
    /// Convert archives of a source store into gzip-compressed JSON lines
    Convert {
        /// Directory of the source archives
        #[clap(short, long)]
        source: PathBuf,

        /// Directory receiving the converted archives
        #[clap(short, long)]
        destination: PathBuf,

        /// Number of conversion threads
        #[clap(short, long, default_value_t = 4)]
        workers: usize,

        /// Project of the source archives
        #[clap(short, long, default_value = "ROUTEVIEWS")]
        project: Project,

        /// Read a storage notification from this file and convert the object it names
        #[clap(short, long)]
        event: Option<PathBuf>,

        /// Archive paths, relative to the source directory
        #[clap(name = "PATH")]
        paths: Vec<String>,
    },
}

fn exit_with(msg: String) -> ! {
    error!("{}", msg);
    eprintln!("{}", msg);
    std::process::exit(1);
}

fn main() {
    let opts: Opts = Opts::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match opts.command {
        Command::Sync {
            origin,
            store,
            config,
            start,
            end,
            min_lapse,
            max_lapse,
            min_collectors,
            workers,
            project,
        } => {
            let mut sync_config = match config {
                None => SyncConfig::default(),
                Some(path) => {
                    let content = std::fs::read_to_string(&path).unwrap_or_else(|e| {
                        exit_with(format!("cannot read {}: {}", path.display(), e))
                    });
                    SyncConfig::from_json(&content).unwrap_or_else(|e| {
                        exit_with(format!("invalid config {}: {}", path.display(), e))
                    })
                }
            };
            if let Some(v) = min_collectors {
                sync_config = sync_config.with_min_collectors(v);
            }
            if let Some(v) = workers {
                sync_config = sync_config.with_workers(v);
            }
            if let Some(v) = project {
                sync_config = sync_config.with_project(v);
            }

            let connector: Arc<dyn OriginConnector> = match origin.starts_with("http") {
                true => match HttpMirror::new(&origin, sync_config.fetch_timeout) {
                    Ok(mirror) => Arc::new(mirror),
                    Err(e) => exit_with(e.to_string()),
                },
                false => Arc::new(LocalMirror::new(&origin)),
            };
            let store = Arc::new(LocalStore::new(store));
            let receiver = StoreReceiver::new().with_store(sync_config.project, store.clone());

            let now = Utc::now();
            let start = start.unwrap_or(now - Duration::hours(max_lapse));
            let end = end.unwrap_or(now - Duration::hours(min_lapse));
            info!(
                "start synchronization from {} to {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            );

            let orchestrator =
                SyncOrchestrator::new(connector, store, Arc::new(receiver), sync_config);
            match orchestrator.sync(start, end) {
                Ok(report) => match serde_json::to_string_pretty(&report) {
                    Ok(s) => println!("{}", s),
                    Err(e) => exit_with(e.to_string()),
                },
                Err(e) => exit_with(e.to_string()),
            }
        }
        Command::Convert {
            source,
            destination,
            workers,
            project,
            event,
            paths,
        } => {
            let converter = ArchiveConverter::new(
                Arc::new(LocalStore::new(source)),
                Arc::new(LocalStore::new(destination)),
                project,
            );

            if let Some(path) = event {
                let payload = std::fs::read(&path).unwrap_or_else(|e| {
                    exit_with(format!("cannot read {}: {}", path.display(), e))
                });
                let event = ConversionEvent::from_json(&payload)
                    .unwrap_or_else(|e| exit_with(format!("invalid event: {}", e)));
                match converter.handle_event(&event) {
                    Ok(EventOutcome::Processed(outcome)) => println!("{:?}", outcome),
                    Ok(EventOutcome::Ignored(kind)) => println!("ignored {:?} event", kind),
                    Err(e) => exit_with(e.to_string()),
                }
            }

            let mut failed = false;
            for (path, result) in converter.process_all(&paths, workers) {
                match result {
                    Ok(outcome) => println!("{}: {:?}", path, outcome),
                    Err(e) => {
                        eprintln!("{}: {}", path, e);
                        failed = true;
                    }
                }
            }
            if failed {
                std::process::exit(1);
            }
        }
    }
}
