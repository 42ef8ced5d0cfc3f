use std::path::PathBuf;

use time::{Date, OffsetDateTime};
use tracing::{info, warn};

use colloscope_calendar::VacationCalendar;
use colloscope_core::input::GroupRange;
use colloscope_core::settings::Settings;
use colloscope_core::week::{current_week, format_day_month, school_year, week_bounds, CurrentWeek};
use colloscope_core::{Colloscope, ColloscopeError, Request};

use crate::ascii;

pub struct App {
  pub colloscope: Colloscope,
  pub calendar: VacationCalendar,
  pub settings_path: PathBuf,
  pub start_date: Date,
  pub zone: String,
  pub school_year: Option<String>,
  pub range: GroupRange,
  pub cap: u32,
}

impl App {
  pub fn today() -> Date {
    OffsetDateTime::now_local()
      .unwrap_or_else(|_| OffsetDateTime::now_utc())
      .date()
  }

  /// Configured school year, else the one stored in the settings, else the one of `today`.
  pub fn school_year(&self, settings: Option<&Settings>, today: Date) -> String {
    self
      .school_year
      .clone()
      .or_else(|| settings.and_then(|settings| settings.school_year.clone()))
      .unwrap_or_else(|| school_year(today))
  }

  pub async fn current_week(&self, school_year: &str, today: Date) -> CurrentWeek {
    let vacations = self.calendar.vacations(&self.zone, school_year).await;
    current_week(self.start_date, today, &vacations, self.cap)
  }

  /// Stored selection, else the defaults at the current week.
  pub async fn settings(&self) -> Settings {
    if let Some(settings) = Settings::read(&self.settings_path).await {
      return settings;
    }

    let today = Self::today();
    let year = self.school_year(None, today);
    let week = self.current_week(&year, today).await;
    Settings::defaults(week.number)
  }

  /// Saves the selection as typed, then validates and looks it up.
  pub async fn show(&self, settings: &Settings) -> Result<String, ColloscopeError> {
    if let Err(err) = settings.save(&self.settings_path).await {
      warn!("{:#}", err);
    }

    let request = Request::from_settings(settings, self.range, self.cap)?;
    info!(
      "Looking up {} week {} of class {}",
      request.group, request.week, request.class
    );

    let lookup = self.colloscope.lookup(request).await?;
    Ok(ascii::lookup(&lookup))
  }

  /// Start of the current and next week of term and the current week number.
  pub async fn weeks(&self, settings: Option<&Settings>) -> String {
    let today = Self::today();
    let year = self.school_year(settings, today);
    let (current, next) = week_bounds(self.start_date, today);
    let week = self.current_week(&year, today).await;

    format!(
      "Semaine actuelle : {}\nSemaine suivante : {}\nAujourd'hui : {} ({}, {})\n",
      format_day_month(current),
      format_day_month(next),
      format_day_month(today),
      week,
      year,
    )
  }

  pub async fn clear_cache(&self) {
    self.colloscope.clear_cache().await;
    self.calendar.clear_cache().await;
  }
}

#[cfg(test)]
mod test {
  use std::path::Path;

  use reqwest::Url;
  use time::macros::date;

  use colloscope_core::input::InputError;

  use super::*;
  use crate::shell::{execute, Command};

  const LEGEND_1: &str = "M1,Dupont,Lundi,08h,A101\n";
  const LEGEND_2: &str = "M1,Leroy,Mercredi,14h,B204\n";

  fn write_class(dir: &Path, class: &str, legend: &str) -> anyhow::Result<()> {
    let class = dir.join(class);
    std::fs::create_dir_all(&class)?;
    std::fs::write(class.join("colloscope.csv"), "G1,M1\n")?;
    std::fs::write(class.join("legende.csv"), legend)?;
    Ok(())
  }

  fn app(dir: &Path) -> anyhow::Result<App> {
    Ok(App {
      colloscope: Colloscope::new(dir.join("data")),
      calendar: VacationCalendar::new(Url::parse("http://127.0.0.1:9/records")?),
      settings_path: dir.join("settings.txt"),
      start_date: date!(2024 - 09 - 16),
      zone: "Zone A".to_string(),
      school_year: None,
      range: GroupRange::default(),
      cap: 30,
    })
  }

  #[tokio::test]
  async fn selection_is_saved_before_validation() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let app = app(dir.path())?;

    let settings = Settings {
      week: "abc".to_string(),
      ..Settings::defaults(1)
    };

    assert!(matches!(
      app.show(&settings).await,
      Err(ColloscopeError::Input(InputError::WeekNotANumber(week))) if week == "abc"
    ));
    assert_eq!(std::fs::read_to_string(&app.settings_path)?, "G1\nabc\n1\n");
    Ok(())
  }

  #[tokio::test]
  async fn class_command_switches_tables() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    write_class(&dir.path().join("data"), "1", LEGEND_1)?;
    write_class(&dir.path().join("data"), "2", LEGEND_2)?;
    let app = app(dir.path())?;
    let mut selection = Settings::defaults(1);

    let output = execute(&app, &mut selection, Command::parse("afficher")).await;
    assert!(output.unwrap().contains("Dupont"));

    execute(&app, &mut selection, Command::Class("2".to_string())).await;
    let output = execute(&app, &mut selection, Command::parse("afficher")).await.unwrap();
    assert!(output.contains("Classe 2, groupe G1, semaine 1"), "{output}");
    assert!(output.contains("Leroy"), "{output}");
    assert!(!output.contains("Dupont"), "{output}");

    assert_eq!(Settings::read(&app.settings_path).await, Some(selection));
    Ok(())
  }

  #[tokio::test]
  async fn school_year_command_is_stored() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    write_class(&dir.path().join("data"), "1", LEGEND_1)?;
    let app = app(dir.path())?;
    let mut selection = Settings::defaults(1);

    let output = execute(&app, &mut selection, Command::parse("annee 2023-2024")).await;
    assert_eq!(output.as_deref(), Some("Année scolaire 2023-2024\n"));
    execute(&app, &mut selection, Command::parse("afficher")).await;
    assert_eq!(
      std::fs::read_to_string(&app.settings_path)?,
      "G1\n1\n1\n2023-2024\n"
    );
    assert_eq!(
      app.school_year(Some(&selection), date!(2025 - 10 - 01)),
      "2023-2024"
    );

    execute(&app, &mut selection, Command::parse("annee auto")).await;
    execute(&app, &mut selection, Command::parse("afficher")).await;
    assert_eq!(std::fs::read_to_string(&app.settings_path)?, "G1\n1\n1\n");
    Ok(())
  }

  #[tokio::test]
  async fn school_year_precedence() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut app = app(dir.path())?;
    let today = date!(2024 - 10 - 01);
    let stored = Settings {
      school_year: Some("2023-2024".to_string()),
      ..Settings::defaults(1)
    };

    assert_eq!(app.school_year(None, today), "2024-2025");
    assert_eq!(app.school_year(Some(&Settings::defaults(1)), today), "2024-2025");
    assert_eq!(app.school_year(Some(&stored), today), "2023-2024");

    app.school_year = Some("2022-2023".to_string());
    assert_eq!(app.school_year(Some(&stored), today), "2022-2023");
    assert_eq!(app.school_year(None, today), "2022-2023");
    Ok(())
  }

  #[tokio::test]
  async fn stored_settings_win_over_defaults() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let app = app(dir.path())?;

    let defaults = app.settings().await;
    assert_eq!(defaults.group, "G1");
    assert_eq!(defaults.class, "1");
    assert!(defaults.week.parse::<u32>().is_ok_and(|week| (1..=30).contains(&week)));

    std::fs::write(&app.settings_path, "G4\n17\n2\n2023-2024\n")?;
    let settings = app.settings().await;
    assert_eq!(settings.group, "G4");
    assert_eq!(settings.week, "17");
    assert_eq!(settings.school_year.as_deref(), Some("2023-2024"));
    Ok(())
  }
}
