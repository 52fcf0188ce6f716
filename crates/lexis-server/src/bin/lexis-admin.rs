//! lexis-admin: offline maintenance for a Lexis database.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use lexis_db::Database;
use lexis_server::config::db_path_from_env;

#[derive(Parser)]
#[command(name = "lexis-admin")]
#[command(about = "Maintenance tasks for a Lexis dictionary database")]
struct Cli {
    /// Database file (defaults to LEXIS_DB_PATH, then lexis.db)
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Give every word that shares its slug with an older word a fresh slug
    FixSlugs {
        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,

        /// Print every changed slug
        #[arg(short, long)]
        verbose: bool,
    },

    /// Grant a user staff rights (or moderator rights with --moderator)
    Promote {
        #[arg(value_name = "USERNAME")]
        username: String,

        #[arg(long)]
        moderator: bool,
    },
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lexis_db=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let path = cli.db.unwrap_or_else(db_path_from_env);
    let db = Database::open(&path)
        .with_context(|| format!("cannot open database {}", path.display()))?;

    match cli.command {
        Commands::FixSlugs { dry_run, verbose } => {
            let fixes = db.repair_slugs(dry_run)?;
            if fixes.is_empty() {
                println!("All slugs are unique.");
                return Ok(());
            }
            if verbose {
                for fix in &fixes {
                    println!(
                        "  #{} {} ({}): {} -> {}",
                        fix.id, fix.word, fix.language, fix.old_slug, fix.new_slug
                    );
                }
            }
            if dry_run {
                println!("{} slug(s) would change. Dry run: nothing written.", fixes.len());
            } else {
                println!("{} slug(s) changed.", fixes.len());
            }
        }
        Commands::Promote {
            username,
            moderator,
        } => {
            let row = db
                .get_user_by_username(&username)?
                .with_context(|| format!("no user named {username:?}"))?;
            let user = db.set_user_roles(
                &username,
                row.user.is_staff || !moderator,
                row.user.is_moderator || moderator,
            )?;
            println!(
                "{}: staff={} moderator={}",
                user.username, user.is_staff, user.is_moderator
            );
        }
    }

    Ok(())
}
