use ccquery_db::boundary::{collapse, Operation};
use ccquery_db::{classify, editor, CompilationDatabase, Classified, QueryConfig, Session};
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ccquery")]
#[command(author, version, about = "Per-file compiler flags from a compilation database")]
struct Cli {
    /// Compilation database file, or a directory to start searching from
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Configuration file (ccquery.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log resolution details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print include flags followed by the other options
    All {
        /// Source file to query
        file: PathBuf,
    },

    /// Print the options without include flags
    Options {
        /// Source file to query
        file: PathBuf,
    },

    /// Print the include directories
    Includes {
        /// Source file to query
        file: PathBuf,
    },

    /// Print an editor flag list (falls back to defaults)
    Flags {
        /// Source file to query
        file: PathBuf,

        /// Project root; include directories outside it become -isystem
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Show the records matching a file and how their arguments classify
    Records {
        /// Source file to query
        file: PathBuf,
    },

    /// Print the path of the compilation database that would be used
    Locate {
        /// Where to start searching (default: current directory)
        path: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    // stdout carries the answer; logs go to stderr
    let default_directive = if cli.verbose { "ccquery=debug" } else { "ccquery=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => QueryConfig::from_file(path)?,
        None => QueryConfig::default(),
    };

    match &cli.command {
        Commands::All { file } => answer(&cli, config, Operation::IncludesAndOptions, file),
        Commands::Options { file } => answer(&cli, config, Operation::Options, file),
        Commands::Includes { file } => answer(&cli, config, Operation::Includes, file),

        Commands::Flags { file, root } => {
            let fallback = config.editor.clone();
            let session = match load_session(&cli, config, file) {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::debug!("{}", e);
                    None
                }
            };
            let flags = editor::flags_for_file(session.as_ref(), file, root.as_deref(), &fallback);
            println!("{}", flags.join(" "));
        }

        Commands::Records { file } => {
            let session = load_session(&cli, config, file)?;
            let resolved = session.lookup(file)?;
            if let Some(substitute) = &resolved.substitute {
                println!("# {} answered by {}", resolved.path.display(), substitute.display());
            }
            for record in resolved.records() {
                println!("#{} {} (in {})", record.index, record.file.display(), record.directory.display());
                println!("  compiler: {}", record.compiler());
                for item in classify(record, &session.config().classify).items {
                    match item {
                        Classified::Include { dir, spelling } => println!("  include     {} ({:?})", dir, spelling),
                        Classified::Bookkeeping { tokens } => println!("  bookkeeping {}", tokens.join(" ")),
                        Classified::Generic(token) => println!("  option      {}", token),
                    }
                }
            }
        }

        Commands::Locate { path } => {
            let start = match (path, &cli.database) {
                (Some(path), _) => path.clone(),
                (None, Some(db)) => db.clone(),
                (None, None) => std::env::current_dir().into_diagnostic()?,
            };
            let found = ccquery_db::locate(&start, &config.database)?;
            println!("{}", found.display());
        }
    }

    Ok(())
}

/// Run one of the host operations; failures print an empty line.
fn answer(cli: &Cli, config: QueryConfig, op: Operation, file: &Path) {
    let result = load_session(cli, config, file).and_then(|session| op.query(&session, file));
    println!("{}", collapse(result, file));
}

fn load_session(cli: &Cli, config: QueryConfig, file: &Path) -> ccquery_db::Result<Session> {
    let hint = cli.database.as_deref().unwrap_or(file);
    let db = CompilationDatabase::load(hint, &config.database)?;
    for rejected in db.rejected() {
        tracing::warn!("{}", rejected);
    }
    Ok(Session::new(db, config))
}
