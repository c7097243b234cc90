use crate::config::Config;
use crate::db::Store;

pub async fn cmd_init(config: &Config) -> anyhow::Result<()> {
    if Config::create_default_if_missing()? {
        println!("Created config.toml with default settings");
    } else {
        println!("config.toml already exists, leaving it untouched");
    }

    Store::from_config(&config.general).await?;
    println!("Database ready at {}", config.general.database_path);

    Ok(())
}
