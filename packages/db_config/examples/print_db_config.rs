use db_config::DbConfig;
use logger::SerdeLogging;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logger::init();

    let prefix = std::env::args().nth(1);
    let config = DbConfig::from_env_with_prefix(prefix.as_deref());

    log::info!("Database config: {:?}", config);
    println!("{}", config.to_public_map().as_json_str());

    match config.public_connection_string() {
        Ok(connection_string) => log::info!("Data layer would connect to {}", connection_string),
        Err(error) => log::warn!("{}", error),
    }

    Ok(())
}
