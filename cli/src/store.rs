use crate::prompts;
use clap::Subcommand;
use rusqlite::Connection;
use secretstore_model::Store;
use secretstore_service::{identity_manager, Coordinator};
use std::collections::BTreeMap;

#[derive(Subcommand)]
pub enum StoreCmd {
    /// Create a new store, or set a field on an existing one
    New {
        /// The name of the store
        name: String,
        /// The field to create/update
        field: String,
        /// Prompt for the value without echoing it
        #[arg(short, long)]
        secret: bool,
    },
    /// Show the store data
    Show {
        /// The name of the store
        name: String,
        /// Display as json
        #[arg(long)]
        json: bool,
        /// Print one raw field value, no decoration
        #[arg(long)]
        field: Option<String>,
    },
    /// List owned stores
    List,
    /// Remove a store
    Rm {
        /// The name of the store
        name: String,
    },
    /// Share the store with an identity
    Share {
        /// The name of the store
        name: String,
        /// The identity fingerprint to share the store with
        fingerprint: String,
    },
}

/// Runs a store subcommand. `identity_conn` is a second connection onto the
/// same database file, used only to resolve a fingerprint to a
/// `PublicIdentity` for `share` — a lookup the coordinator's contract has no
/// reason to expose.
pub fn run(
    cmd: StoreCmd,
    coordinator: &mut Coordinator<'_>,
    identity_conn: &Connection,
) -> anyhow::Result<()> {
    match cmd {
        StoreCmd::New { name, field, secret } => new(coordinator, &name, &field, secret),
        StoreCmd::Show { name, json, field } => show(coordinator, &name, json, field.as_deref()),
        StoreCmd::List => list(coordinator),
        StoreCmd::Rm { name } => rm(coordinator, &name),
        StoreCmd::Share { name, fingerprint } => share(coordinator, identity_conn, &name, &fingerprint),
    }
}

fn new(coordinator: &mut Coordinator<'_>, name: &str, field: &str, secret: bool) -> anyhow::Result<()> {
    let existing = coordinator.get_store(name)?;
    let (mut data, exists) = match existing {
        Some(store) => (store.data, true),
        None => (BTreeMap::new(), false),
    };

    if exists && data.contains_key(field) {
        let overwrite = prompts::yes(&format!("The field '{field}' already exists, do you want to override it?"))?;
        if !overwrite {
            return Ok(());
        }
    }

    let value = prompts::read_value(field, secret)?;
    data.insert(field.to_string(), value);

    let store = Store::new(name, data);
    if exists {
        coordinator.update_store(&store)?;
    } else {
        coordinator.new_store(&store)?;
    }
    Ok(())
}

fn show(coordinator: &mut Coordinator<'_>, name: &str, json: bool, field: Option<&str>) -> anyhow::Result<()> {
    let Some(store) = coordinator.get_store(name)? else {
        println!("The store '{name}' was not found");
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string(&store.data)?);
    } else if let Some(field) = field {
        match store.data.get(field) {
            Some(value) => print!("{value}"),
            None => eprintln!("The field '{field}' was not found in '{name}'"),
        }
    } else {
        println!("=== {} ===", store.name);
        for (key, value) in &store.data {
            println!("{key}: {value}");
        }
    }
    Ok(())
}

fn list(coordinator: &mut Coordinator<'_>) -> anyhow::Result<()> {
    for name in coordinator.list_stores_name()? {
        println!("{name}");
    }
    Ok(())
}

fn rm(coordinator: &mut Coordinator<'_>, name: &str) -> anyhow::Result<()> {
    let Some(store) = coordinator.get_store(name)? else {
        println!("The store '{name}' was not found");
        return Ok(());
    };

    if prompts::yes(&format!("Are you sure to delete {}", store.name))? {
        coordinator.delete_store(&store.name)?;
        println!("deleted");
    }
    Ok(())
}

fn share(
    coordinator: &mut Coordinator<'_>,
    identity_conn: &Connection,
    name: &str,
    fingerprint: &str,
) -> anyhow::Result<()> {
    let Some(identity) = identity_manager::get_identity(identity_conn, fingerprint)? else {
        println!("The identity '{fingerprint}' was not found");
        return Ok(());
    };

    if coordinator.get_encrypted_store(name)?.is_none() {
        println!("The store '{name}' was not found");
        return Ok(());
    }

    coordinator.share_store(name, &identity)?;
    Ok(())
}
