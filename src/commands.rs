//! CLI command bodies

use std::path::Path;

use pomotrack::{CURRENT_VERSION, Store, config};

/// Open the store and bring its schema to the current version.
pub fn run_init(database: &Path) -> anyhow::Result<()> {
    config::ensure_db_dir(database)?;

    let mut store = Store::open(database);
    let outcome = store.initialize();

    if outcome.successful() {
        println!("{}", store.message());
        return Ok(());
    }

    for err in outcome.errors() {
        eprintln!("error: {err}");
    }
    anyhow::bail!("store initialization failed for {}", database.display());
}

/// Report the stored schema version and table counts.
pub fn run_status(database: &Path, json: bool) -> anyhow::Result<()> {
    let store = Store::open(database);
    if !store.is_open() {
        anyhow::bail!("{}", store.message());
    }

    let version = store.probe_version();

    if json {
        let stats = match version {
            Some(_) => store.stats().ok().map(|s| {
                serde_json::json!({
                    "activity_types": s.activity_types,
                    "users": s.users,
                    "sessions": s.sessions,
                })
            }),
            None => None,
        };
        let data = serde_json::json!({
            "path": store.path(),
            "version": version,
            "target_version": CURRENT_VERSION,
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!("Store: {}", store.path());
    match version {
        Some(v) if v == CURRENT_VERSION => println!("Schema version: {v} (current)"),
        Some(v) => println!("Schema version: {v} (target is {CURRENT_VERSION})"),
        None => {
            println!("Schema version: none (run `pomotrack init`)");
            return Ok(());
        }
    }
    print!("{}", store.stats()?);
    Ok(())
}
