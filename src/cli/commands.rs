use std::path::Path;

use chrono::Local;

use crate::config::Config;
use crate::db::schema;
use crate::import;
use crate::queries::stats_queries;
use crate::server;

pub(super) async fn serve(config: &Config) -> anyhow::Result<()> {
    let conn = schema::open(&config.storage.database_path)?;
    server::serve(config, conn).await
}

pub(super) fn import_checklist(config: &Config, file: &Path) -> anyhow::Result<()> {
    let conn = schema::open(&config.storage.database_path)?;
    let stats = import::import_file(&conn, file)?;

    println!("Imported {}:", file.display());
    println!("  Families:  {}", stats.families);
    println!("  Birds:     {}", stats.birds);
    println!("  Locations: {}", stats.locations);
    if stats.reused > 0 {
        println!("  ({} existing entries reused)", stats.reused);
    }
    Ok(())
}

pub(super) fn stats(config: &Config) -> anyhow::Result<()> {
    let conn = schema::open(&config.storage.database_path)?;
    let dashboard = stats_queries::dashboard(&conn, Local::now().date_naive())?;

    println!("Life list: {} species", dashboard.life_list_count);
    println!();
    for count in [
        &dashboard.this_year,
        &dashboard.last_year,
        &dashboard.this_month,
        &dashboard.last_month,
    ] {
        println!("  {:<16} {}", count.label, count.species);
    }
    println!();

    if dashboard.todays_sightings.is_empty() {
        println!("No sightings today.");
    } else {
        println!("Today ({}):", dashboard.todays_sightings.len());
        for s in &dashboard.todays_sightings {
            let heard = if s.sighting.heard_not_seen { " (heard)" } else { "" };
            println!("  {} x{} at {}{}", s.bird_name, s.sighting.count, s.location_name, heard);
        }
    }
    Ok(())
}
