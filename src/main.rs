//! Genlib Kinship - Entry Point
//!
//! Skriver ut släktingarna till en person som JSON.

use anyhow::Context;
use genlib_kinship::utils::path::display_path;
use genlib_kinship::{Database, KinshipService, Settings};

fn main() -> anyhow::Result<()> {
    let settings = Settings::load();

    // Initiera logging
    tracing_subscriber::fmt()
        .with_max_level(settings.tracing_level())
        .with_target(false)
        .init();

    tracing::info!("Startar Genlib Kinship v{}", env!("CARGO_PKG_VERSION"));

    let db = Database::open(&settings.database_path)
        .with_context(|| format!("Kunde inte öppna {}", display_path(&settings.database_path)))?;
    db.migrate().context("Migrering misslyckades")?;
    tracing::info!("Databas: {}", display_path(&settings.database_path));

    let Some(person_id) = std::env::args().nth(1) else {
        let count = db.persons().count()?;
        println!("{} personer i {}", count, display_path(&settings.database_path));
        println!("Användning: genlib-kinship <person-id>");
        return Ok(());
    };

    let detail = KinshipService::new(&db).person_detail(&person_id)?;
    println!("{}", serde_json::to_string_pretty(&detail)?);

    Ok(())
}
