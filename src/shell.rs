//! Interactive prompt. A background task follows the history and the
//! favorites and reports their sizes whenever the store changes.

use color_eyre::{eyre::eyre, Result};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use crate::app::App;
use crate::commands::{self, CommandKind, Invocation, COMMANDS};
use crate::store::VinStorage;

pub async fn run<S: VinStorage + 'static>(app: &App<S>) -> Result<()> {
  let mut history = app.observe_history();
  let mut favorites = app.observe_favorites();
  let initial = history.next().await?;
  let mut favorite_count = favorites.next().await?.len();
  println!(
    "{} VINs in history, {} favorites. Type 'help' for commands.",
    initial.len(),
    favorite_count
  );

  let watcher = tokio::spawn(async move {
    loop {
      tokio::select! {
        records = history.next() => match records {
          Ok(records) => println!("[history: {} VINs]", records.len()),
          Err(e) => {
            warn!(error = %e, "History subscription ended");
            break;
          }
        },
        records = favorites.next() => match records {
          Ok(records) if records.len() != favorite_count => {
            favorite_count = records.len();
            println!("[favorites: {}]", favorite_count);
          }
          Ok(_) => {}
          Err(e) => {
            warn!(error = %e, "Favorites subscription ended");
            break;
          }
        },
      }
    }
  });

  let mut lines = BufReader::new(tokio::io::stdin()).lines();

  loop {
    print!("vinx> ");
    std::io::stdout()
      .flush()
      .map_err(|e| eyre!("Failed to write prompt: {}", e))?;

    let Some(line) = lines
      .next_line()
      .await
      .map_err(|e| eyre!("Failed to read input: {}", e))?
    else {
      break;
    };

    match commands::parse_line(&line) {
      Ok(None) => {}
      Ok(Some(inv)) if inv.kind == CommandKind::Quit => break,
      Ok(Some(inv)) => match execute(app, &inv).await {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Error: {}", e),
      },
      Err(msg) => eprintln!("{}", msg),
    }
  }

  watcher.abort();
  Ok(())
}

/// Run one parsed command. Arity has already been checked by the parser.
async fn execute<S: VinStorage + 'static>(app: &App<S>, inv: &Invocation) -> Result<String> {
  let arg = |i: usize| inv.args.get(i).map(String::as_str).unwrap_or_default();

  match inv.kind {
    CommandKind::Decode => {
      let extended = match inv.args.get(1).map(String::as_str) {
        None => false,
        Some("--extended") | Some("-e") => true,
        Some(other) => return Err(eyre!("Unknown option: {}", other)),
      };
      app.decode(arg(0), extended).await
    }
    CommandKind::Show => app.show(arg(0)).await,
    CommandKind::History => app.history(None, false),
    CommandKind::Favorites => app.history(None, true),
    CommandKind::Search => app.history(Some(&inv.args.join(" ")), false),
    CommandKind::Favorite => app.set_favorite(arg(0), true),
    CommandKind::Unfavorite => app.set_favorite(arg(0), false),
    CommandKind::Delete => app.delete(arg(0)),
    CommandKind::Clear => app.clear(),
    CommandKind::Models => app.models(arg(0), arg(1)).await,
    CommandKind::Count => app.count(),
    CommandKind::Help => Ok(help_text()),
    CommandKind::Quit => Ok(String::new()),
  }
}

fn help_text() -> String {
  COMMANDS
    .iter()
    .map(|cmd| {
      format!(
        "  {:<28}{} ({})",
        cmd.usage,
        cmd.description,
        cmd.aliases.join(", ")
      )
    })
    .collect::<Vec<_>>()
    .join("\n")
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::ApiConfig;
  use crate::nhtsa::NhtsaClient;
  use crate::repository::VinRepository;
  use crate::store::SqliteStorage;
  use serde_json::json;
  use std::sync::Arc;
  use wiremock::matchers::{method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  const VIN: &str = "1HGBH41JXMN109186";

  async fn app_with_honda() -> (MockServer, App<SqliteStorage>) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path(format!("/vehicles/DecodeVin/{}", VIN)))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "Count": 3,
        "Results": [
          {"Value": "HONDA", "Variable": "Make"},
          {"Value": "Accord", "Variable": "Model"},
          {"Value": "2021", "Variable": "Model Year"}
        ]
      })))
      .mount(&server)
      .await;

    let api = NhtsaClient::new(&ApiConfig {
      base_url: server.uri(),
      ..Default::default()
    })
    .unwrap();
    let storage = SqliteStorage::open_in_memory().unwrap();
    let app = App::with_repository(VinRepository::new(Arc::new(api), Arc::new(storage)));
    (server, app)
  }

  async fn run_line(app: &App<SqliteStorage>, line: &str) -> Result<String> {
    let inv = commands::parse_line(line)
      .map_err(|e| eyre!(e))?
      .ok_or_else(|| eyre!("blank line"))?;
    execute(app, &inv).await
  }

  #[tokio::test]
  async fn test_execute_dispatches_parsed_lines() {
    let (_server, app) = app_with_honda().await;

    let decoded = run_line(&app, "d 1hgbh41jxmn109186").await.unwrap();
    assert!(decoded.starts_with("2021 HONDA Accord"));

    assert_eq!(run_line(&app, "n").await.unwrap(), "1");
    assert_eq!(
      run_line(&app, &format!("star {}", VIN)).await.unwrap(),
      format!("★ Added {} to favorites", VIN)
    );
    assert!(run_line(&app, "favs").await.unwrap().contains(VIN));
    assert!(run_line(&app, "search honda accord").await.unwrap().contains("No VINs match"));
    assert!(run_line(&app, "find accord").await.unwrap().contains(VIN));
    assert_eq!(
      run_line(&app, &format!("rm {}", VIN)).await.unwrap(),
      format!("Deleted {}", VIN)
    );
    assert_eq!(run_line(&app, "count").await.unwrap(), "0");
  }

  #[tokio::test]
  async fn test_execute_rejects_unknown_decode_option() {
    let (_server, app) = app_with_honda().await;

    let err = run_line(&app, &format!("decode {} --full", VIN))
      .await
      .unwrap_err();
    assert_eq!(err.to_string(), "Unknown option: --full");
    assert_eq!(run_line(&app, "count").await.unwrap(), "0");
  }

  #[tokio::test]
  async fn test_ambiguous_prefix_does_not_clear_history() {
    let (_server, app) = app_with_honda().await;
    run_line(&app, &format!("decode {}", VIN)).await.unwrap();

    assert!(run_line(&app, "c").await.is_err());
    assert_eq!(run_line(&app, "count").await.unwrap(), "1");
  }

  #[test]
  fn test_help_lists_every_command() {
    let text = help_text();
    for cmd in COMMANDS {
      assert!(text.contains(cmd.usage), "missing {}", cmd.name);
    }
  }
}
