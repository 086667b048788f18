use clap::{Parser, Subcommand};
use std::path::PathBuf;

use audino_relocate::config::{self, CommitMode, DatabaseConfig, JoinMode, RelocationConfig};
use audino_relocate::db::SyncDb;
use audino_relocate::db_mysql::SyncDbMysql;
use audino_relocate::relocate::{load_snapshot, run_relocation};
use audino_relocate::summary::{summarize, summary_header};
use audino_relocate::{RecordStore, RelocateResult};

#[derive(Parser, Debug)]
#[command(author, version, about = "Reassign Audino audio records from one annotator to another")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Move records from source users to a target user
    Relocate {
        /// Path to config file (TOML format)
        #[arg(short, long)]
        config: PathBuf,

        /// Source username, repeatable (overrides from_users in config file)
        #[arg(long = "from")]
        from: Vec<String>,

        /// Target username (overrides to_user in config file)
        #[arg(long = "to")]
        to: Option<String>,

        /// Transcript join mode (overrides config file)
        #[arg(long, value_enum)]
        join_mode: Option<JoinMode>,

        /// Commit mode for the updates (overrides config file)
        #[arg(long, value_enum)]
        commit_mode: Option<CommitMode>,

        /// Only move records of this project (overrides config file)
        #[arg(long)]
        project: Option<i64>,

        /// Show what would move without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Print record counts per user
    Summary {
        /// Path to config file (TOML format)
        #[arg(short, long)]
        config: PathBuf,

        /// Transcript join mode (overrides config file)
        #[arg(long, value_enum)]
        join_mode: Option<JoinMode>,

        /// Only count records of this project
        #[arg(long)]
        project: Option<i64>,
    },
}

enum Action {
    Relocate {
        relocation: RelocationConfig,
        dry_run: bool,
    },
    Summary {
        join_mode: JoinMode,
        project: Option<i64>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let (database, action) = match args.command {
        Command::Relocate {
            config,
            from,
            to,
            join_mode,
            commit_mode,
            project,
            dry_run,
        } => {
            let loaded = config::load_config(&config)?;
            let mut relocation = loaded.relocation;
            if !from.is_empty() {
                relocation.from_users = from;
            }
            relocation.to_user = to.or(relocation.to_user);
            relocation.join_mode = join_mode.or(relocation.join_mode);
            relocation.commit_mode = commit_mode.or(relocation.commit_mode);
            relocation.project_id = project.or(relocation.project_id);
            relocation.validate()?;
            (loaded.database, Action::Relocate { relocation, dry_run })
        }
        Command::Summary {
            config,
            join_mode,
            project,
        } => {
            let loaded = config::load_config(&config)?;
            let join_mode = join_mode.unwrap_or(loaded.relocation.join_mode());
            let project = project.or(loaded.relocation.project_id);
            (loaded.database, Action::Summary { join_mode, project })
        }
    };

    match database {
        DatabaseConfig::Mysql(mysql) => {
            let db = SyncDbMysql::connect(&mysql.resolve()?)?;
            let result = execute(&db, &action);
            db.close();
            result?;
        }
        DatabaseConfig::Sqlite { path } => {
            let db = SyncDb::open(&path)?;
            let result = execute(&db, &action);
            db.close();
            result?;
        }
    }

    Ok(())
}

fn execute(store: &impl RecordStore, action: &Action) -> RelocateResult<()> {
    match action {
        Action::Relocate { relocation, dry_run } => {
            let report = run_relocation(store, relocation, *dry_run)?;
            println!("{}", report);
        }
        Action::Summary { join_mode, project } => {
            let snapshot = load_snapshot(store, *join_mode, *project)?;
            println!("{}", summary_header());
            for summary in summarize(&snapshot.groups) {
                println!("{}", summary);
            }
        }
    }
    Ok(())
}
