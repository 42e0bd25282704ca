use clap::{Parser, Subcommand};
use skycast_core::Config;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Terminal weather lookup client")]
pub struct Cli {
    /// City to search at startup, overriding the remembered one.
    pub city: Option<String>,

    /// Start with temperatures in Fahrenheit.
    #[arg(long)]
    pub fahrenheit: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Command::Configure) => configure(),
            None => crate::app::run(self).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let key = inquire::Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .prompt()?;

    config.set_api_key(key.trim().to_string());
    config.save()?;

    println!("API key saved to {}", Config::config_file_path()?.display());
    Ok(())
}
