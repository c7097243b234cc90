use crate::config::Config;
use crate::db::Store;

pub async fn cmd_stats(config: &Config) -> anyhow::Result<()> {
    let store = Store::from_config(&config.general).await?;

    let locations = store.locations().count().await?;
    let weathers = store.weathers().count().await?;
    let meetups = store.meetups().count().await?;

    println!("Cache contents ({})", config.general.database_path);
    println!("{:-<40}", "");
    println!("Locations: {locations:>8}");
    println!("Forecasts: {weathers:>8}");
    println!("Meetups:   {meetups:>8}");

    Ok(())
}
