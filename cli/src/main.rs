mod error;
mod identity;
mod logging;
mod prompts;
mod store;

use clap::{Parser, Subcommand};
use secretstore_crypto::UnixSshAgent;
use secretstore_service::{Config, Coordinator, Database, ServiceError};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "secret-store", about = "A local, multi-identity secret store")]
struct Args {
    /// Verbose logging, including target names
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Identity operations
    Identity {
        #[command(subcommand)]
        cmd: identity::IdentityCmd,
    },
    /// Store operations
    Store {
        #[command(subcommand)]
        cmd: store::StoreCmd,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init_tracing(args.debug);

    if let Err(err) = run(args) {
        match err.downcast_ref::<ServiceError>() {
            Some(service_err) => {
                eprintln!("{service_err}");
                return error::exit_code_for(service_err);
            }
            None => {
                eprintln!("{err:#}");
                return ExitCode::from(1);
            }
        }
    }
    ExitCode::SUCCESS
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = Config::resolve();
    config.ensure_root()?;

    let agent = UnixSshAgent::from_env()?;

    match args.command {
        Command::Identity { cmd } => {
            let db = Database::open(&config.db_path())?;
            identity::run(cmd, &db.conn, &agent)
        }
        Command::Store { cmd } => {
            let identity_db = Database::open(&config.db_path())?;
            let db = Database::open(&config.db_path())?;
            let mut coordinator = Coordinator::new(db, &agent);
            store::run(cmd, &mut coordinator, &identity_db.conn)
        }
    }
}
