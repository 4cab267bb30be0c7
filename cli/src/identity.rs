use clap::Subcommand;
use rusqlite::Connection;
use secretstore_crypto::SshAgent;
use secretstore_service::identity_manager;

#[derive(Subcommand)]
pub enum IdentityCmd {
    /// Create missing identities for available ssh keys
    Sync,
    /// List identities
    List {
        /// List all identities instead of owned ones only
        #[arg(long)]
        all: bool,
    },
}

pub fn run(cmd: IdentityCmd, conn: &Connection, agent: &dyn SshAgent) -> anyhow::Result<()> {
    match cmd {
        IdentityCmd::Sync => sync(conn, agent),
        IdentityCmd::List { all } => list(conn, agent, all),
    }
}

fn sync(conn: &Connection, agent: &dyn SshAgent) -> anyhow::Result<()> {
    let fingerprints = identity_manager::create_identities(conn, agent)?;
    if fingerprints.is_empty() {
        println!("No identity created");
    } else {
        for fingerprint in fingerprints {
            println!("Created: {fingerprint}");
        }
    }
    Ok(())
}

fn list(conn: &Connection, agent: &dyn SshAgent, all: bool) -> anyhow::Result<()> {
    let identities = if all {
        identity_manager::get_identities(conn)?
    } else {
        identity_manager::get_identities_based_ssh_agent(conn, agent)?
    };

    if identities.is_empty() {
        println!("No identity was found. Sync identities with secret-store identity sync");
    }
    for identity in identities {
        println!("{}", identity.fingerprint);
    }
    Ok(())
}
