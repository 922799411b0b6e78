use clap::{Parser, Subcommand};
use color_eyre::Result;
use std::path::PathBuf;

use vinx::{app, config, logging, shell};

#[derive(Parser, Debug)]
#[command(name = "vinx")]
#[command(about = "Decode VINs via the NHTSA vPIC API, with an offline history")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/vinx/config.yaml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Path to the history database
  #[arg(short, long, global = true)]
  database: Option<PathBuf>,

  /// Print JSON instead of text
  #[arg(long, global = true)]
  json: bool,

  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
  /// Decode a VIN (falls back to history when offline)
  Decode {
    vin: String,
    /// Use the extended decode endpoint
    #[arg(short, long)]
    extended: bool,
  },
  /// Show a VIN from history, plus other models of its make and year
  Show { vin: String },
  /// List decoded VINs, newest first
  History {
    /// Only VINs whose VIN, make, model or year contains this text
    #[arg(short, long)]
    search: Option<String>,
    /// Only favorites
    #[arg(short, long)]
    favorites: bool,
  },
  /// Mark a VIN as favorite
  Favorite { vin: String },
  /// Remove a VIN from favorites
  Unfavorite { vin: String },
  /// Delete a VIN from history
  Delete { vin: String },
  /// Delete the whole history
  Clear,
  /// List models for a make and model year
  Models { make: String, year: String },
  /// Number of VINs in history
  Count,
  /// Interactive prompt
  Shell,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;

  // Override database if specified on command line
  if let Some(database) = args.database {
    config.database.path = Some(database);
  }

  let _log_guard = logging::init(&config.logging, &config.log_file_path()?, args.verbose)?;

  let app = app::App::new(&config)?.with_json(args.json);

  let output = match args.command {
    Cmd::Decode { vin, extended } => app.decode(&vin, extended).await?,
    Cmd::Show { vin } => app.show(&vin).await?,
    Cmd::History { search, favorites } => app.history(search.as_deref(), favorites)?,
    Cmd::Favorite { vin } => app.set_favorite(&vin, true)?,
    Cmd::Unfavorite { vin } => app.set_favorite(&vin, false)?,
    Cmd::Delete { vin } => app.delete(&vin)?,
    Cmd::Clear => app.clear()?,
    Cmd::Models { make, year } => app.models(&make, &year).await?,
    Cmd::Count => app.count()?,
    Cmd::Shell => {
      shell::run(&app).await?;
      return Ok(());
    }
  };

  println!("{}", output);
  Ok(())
}
