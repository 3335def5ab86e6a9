//! `cram`: command-line client for the Cram study API.
//!
//! # Usage
//!
//! ```
//! cram --user 6f1c… create quiz --file notes.txt --count 8
//! cram --config ~/.config/cram/config.toml list flashcards
//! cram take-quiz 0b6e…
//! ```

mod app;
mod client;
mod print;
mod ui;

use std::{io, path::PathBuf, time::Duration};

use anyhow::{Context, Result, bail};
use app::App;
use clap::{Parser, Subcommand};
use client::{ApiClient, CreateRequest, Kind, Material, Source};
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "cram", about = "Generate and practise study material")]
struct Args {
  /// Path to a TOML config file (url, user_id).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the cram server (default: http://localhost:4000).
  #[arg(long, env = "CRAM_API_URL")]
  url: Option<String>,

  /// Id of the user that owns the material.
  #[arg(long, env = "CRAM_USER_ID")]
  user: Option<Uuid>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Generate a summary, quiz or flashcard set.
  Create {
    kind:  Kind,
    #[arg(long)]
    title: Option<String>,
    /// Number of questions or cards.
    #[arg(long)]
    count: Option<usize>,
    /// Source text.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    text:  Option<String>,
    /// Plain-text file to upload.
    #[arg(long)]
    file:  Option<PathBuf>,
  },
  /// List your material of one kind, newest first.
  List { kind: Kind },
  /// Print one record.
  Show { kind: Kind, id: Uuid },
  /// Delete one record.
  Delete { kind: Kind, id: Uuid },
  /// Take a quiz interactively.
  TakeQuiz { id: Uuid },
  /// Study a flashcard set interactively.
  Study { id: Uuid },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:     String,
  #[serde(default)]
  user_id: Option<Uuid>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let base_url = args
    .url
    .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
    .unwrap_or_else(|| "http://localhost:4000".to_string());
  let user = args.user.or(file_cfg.user_id);

  let client = ApiClient::new(base_url)?;
  let require_user = || user.context("no user id; pass --user or set CRAM_USER_ID");

  match args.command {
    Command::Create { kind, title, count, text, file } => {
      let source = match (text, file) {
        (_, Some(path)) => Source::File(path),
        (Some(text), None) => Source::Text(text),
        (None, None) => bail!("one of --text or --file is required"),
      };
      let req = CreateRequest { user_id: require_user()?, title, source, count };
      eprintln!("Generating… this can take a while.");
      let item = client.create(kind, &req).await?;
      println!("{}", print::detail(&item));
      println!("id: {}", material_id(&item));
    }
    Command::List { kind } => {
      let items = client.list(kind, require_user()?).await?;
      if items.is_empty() {
        println!("Nothing here yet.");
      }
      for item in &items {
        println!("{}", print::list_line(item));
      }
    }
    Command::Show { kind, id } => {
      println!("{}", print::detail(&client.get(kind, id).await?));
    }
    Command::Delete { kind, id } => {
      client.delete(kind, id).await?;
      println!("Deleted {id}.");
    }
    Command::TakeQuiz { id } => {
      let quiz = client.get_quiz(id).await?;
      run_tui(App::quiz(quiz))?;
    }
    Command::Study { id } => {
      let set = client.get_flashcard_set(id).await?;
      run_tui(App::deck(set))?;
    }
  }
  Ok(())
}

fn material_id(item: &Material) -> Uuid {
  match item {
    Material::Summary(s) => s.id,
    Material::Quiz(q) => q.id,
    Material::Flashcards(f) => f.id,
  }
}

// ─── Event loop ───────────────────────────────────────────────────────────────

fn run_tui(mut app: App) -> Result<()> {
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let run_result = run_event_loop(&mut terminal, &mut app);

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event {
      if key.kind == event::KeyEventKind::Press && !app.handle_key(key) {
        break;
      }
    }
  }
  Ok(())
}
