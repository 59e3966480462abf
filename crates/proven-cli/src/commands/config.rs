use anyhow::Result;
use colored::Colorize;

use super::Context;

pub fn show(context: &Context) -> Result<()> {
    let service = context.config_service();
    let config = service.load_effective()?;

    println!("{} {}", "Config file:".bold(), service.path().display());
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

pub fn set_api_url(context: &Context, url: &str) -> Result<()> {
    let service = context.config_service();
    let mut config = service.load()?;
    config.api_base_url = url.trim().to_string();
    service.save(&config)?;

    println!("{} {}", "API base URL set to".green(), config.api_base_url);
    Ok(())
}
