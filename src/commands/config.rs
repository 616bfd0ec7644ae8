use crate::commands::AppContext;
use anyhow::Result;
use log::info;

pub fn show_config(ctx: &AppContext) -> Result<()> {
    println!("# {}", ctx.config_path.display());
    print!("{}", toml::to_string_pretty(&ctx.config)?);
    Ok(())
}

pub fn set_config(ctx: &mut AppContext, key: &str, value: &str) -> Result<()> {
    ctx.config.set(key, value)?;
    ctx.config.save_to(&ctx.config_path)?;
    info!("Set {} = {}", key, value);
    println!("Updated {}", key);
    Ok(())
}
