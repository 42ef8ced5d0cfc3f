use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use reqwest::Url;
use time::macros::format_description;
use time::Date;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use colloscope_calendar::{VacationCalendar, DEFAULT_ENDPOINT};
use colloscope_core::input::GroupRange;
use colloscope_core::{Colloscope, ColloscopeError};

use crate::app::App;

mod app;
mod ascii;
mod shell;

#[derive(Parser)]
#[command(author, version, about, long_about)]
struct Args {
  /// Directory holding one `<class>/colloscope.csv` and `<class>/legende.csv` per class
  #[arg(long, short, env = "COLLOSCOPE_DATA_DIR", default_value = "data")]
  data_dir: PathBuf,
  #[arg(long, short, env = "COLLOSCOPE_SETTINGS", default_value = "settings.txt")]
  settings: PathBuf,
  /// First Monday of term, DD/MM/YYYY
  #[arg(long, env = "COLLOSCOPE_START_DATE", default_value = "16/09/2024", value_parser = parse_date)]
  start_date: Date,
  #[arg(long, short, env = "COLLOSCOPE_ZONE", default_value = "Zone A")]
  zone: String,
  /// School year of the vacation calendar, YYYY-YYYY, derived from today if absent
  #[arg(long, env = "COLLOSCOPE_SCHOOL_YEAR")]
  school_year: Option<String>,
  #[arg(long, env = "COLLOSCOPE_VACATIONS_URL", default_value = DEFAULT_ENDPOINT)]
  vacations_url: Url,
  #[arg(long, env = "COLLOSCOPE_GROUP_MIN", default_value_t = 1)]
  group_min: u32,
  #[arg(long, env = "COLLOSCOPE_GROUP_MAX", default_value_t = 20)]
  group_max: u32,
  /// Last valid week number
  #[arg(long, env = "COLLOSCOPE_WEEK_CAP", default_value_t = 30)]
  week_cap: u32,
  #[arg(long, env = "COLLOSCOPE_SENTRY_DSN")]
  sentry_dsn: Option<String>,
  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Show the sessions of a group, defaults to the last selection
  Show {
    #[arg(long, short)]
    group: Option<String>,
    #[arg(long, short)]
    week: Option<String>,
    #[arg(long, short)]
    class: Option<String>,
  },
  /// Print the current and next week of term
  Week,
  /// Interactive session
  Shell,
}

fn parse_date(value: &str) -> Result<Date, time::error::Parse> {
  Date::parse(value, format_description!("[day]/[month]/[year]"))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
  let args = Args::parse();

  let _sentry = args.sentry_dsn.as_deref().map(|dsn| {
    sentry::init((
      dsn,
      sentry::ClientOptions {
        release: sentry::release_name!(),
        ..Default::default()
      },
    ))
  });

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .with(sentry_tracing::layer())
    .init();

  let result = run(args).await;
  if let Err(err) = &result {
    sentry::integrations::anyhow::capture_anyhow(err);
  }
  result
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
  let app = App {
    colloscope: Colloscope::new(args.data_dir.clone()),
    calendar: VacationCalendar::new(args.vacations_url.clone()),
    settings_path: args.settings.clone(),
    start_date: args.start_date,
    zone: args.zone.clone(),
    school_year: args.school_year.clone(),
    range: GroupRange {
      min: args.group_min,
      max: args.group_max,
    },
    cap: args.week_cap,
  };

  match args.command {
    None => show(&app, None, None, None).await,
    Some(Command::Show { group, week, class }) => show(&app, group, week, class).await,
    Some(Command::Week) => {
      let settings = app.settings().await;
      print!("{}", app.weeks(Some(&settings)).await);
      Ok(ExitCode::SUCCESS)
    }
    Some(Command::Shell) => {
      let settings = app.settings().await;
      shell::run(&app, settings).await?;
      Ok(ExitCode::SUCCESS)
    }
  }
}

async fn show(
  app: &App,
  group: Option<String>,
  week: Option<String>,
  class: Option<String>,
) -> anyhow::Result<ExitCode> {
  let mut settings = app.settings().await;
  if let Some(group) = group {
    settings.group = group;
  }
  if let Some(week) = week {
    settings.week = week;
  }
  if let Some(class) = class {
    settings.class = class;
  }

  match app.show(&settings).await {
    Ok(text) => {
      print!("{text}");
      info!("Displayed {} week {}", settings.group, settings.week);
      Ok(ExitCode::SUCCESS)
    }
    Err(err @ ColloscopeError::Source { .. }) => Err(err.into()),
    Err(err) => {
      info!("Rejected selection: {}", err);
      eprintln!("Erreur : {err}");
      Ok(ExitCode::from(2))
    }
  }
}
