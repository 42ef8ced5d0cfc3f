use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;

use colloscope_core::settings::Settings;
use colloscope_core::week::is_school_year;
use colloscope_core::ColloscopeError;

use crate::app::App;

const HELP: &str = "\
Commandes :
  afficher [groupe] [semaine]  affiche les colles de la sélection
  groupe <groupe>              choisit le groupe, par exemple G4
  semaine <semaine>            choisit la semaine
  classe <classe>              choisit la classe
  annee <AAAA-AAAA>|auto       choisit l'année scolaire du calendrier des vacances
  semaines                     affiche la semaine actuelle et la suivante
  vider-cache                  relit les tableaux et le calendrier
  aide                         affiche cette aide
  quitter                      termine la session
";

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
  Show {
    group: Option<String>,
    week: Option<String>,
  },
  Group(String),
  Week(String),
  Class(String),
  /// School year of the vacation calendar, `None` to derive it from the date.
  Year(Option<String>),
  Weeks,
  ClearCache,
  Help,
  Quit,
  Empty,
  Unknown(String),
}

impl Command {
  pub fn parse(line: &str) -> Self {
    let mut words = line.split_whitespace();
    let command = match words.next() {
      None => return Command::Empty,
      Some(command) => command,
    };
    let argument = words.next().map(str::to_string);

    match (command, argument) {
      ("afficher", group) => Command::Show {
        group,
        week: words.next().map(str::to_string),
      },
      ("groupe", Some(group)) => Command::Group(group),
      ("semaine", Some(week)) => Command::Week(week),
      ("classe", Some(class)) => Command::Class(class),
      ("annee", Some(year)) if year == "auto" => Command::Year(None),
      ("annee", Some(year)) if is_school_year(&year) => Command::Year(Some(year)),
      ("semaines", None) => Command::Weeks,
      ("vider-cache", None) => Command::ClearCache,
      ("aide", None) => Command::Help,
      ("quitter", None) => Command::Quit,
      _ => Command::Unknown(line.trim().to_string()),
    }
  }
}

/// Applies one command to the selection, returns `None` when the session ends.
pub async fn execute(app: &App, selection: &mut Settings, command: Command) -> Option<String> {
  let output = match command {
    Command::Show { group, week } => {
      if let Some(group) = group {
        selection.group = group;
      }
      if let Some(week) = week {
        selection.week = week;
      }
      show(app, selection).await
    }
    Command::Group(group) => {
      selection.group = group;
      format!("Groupe {}\n", selection.group)
    }
    Command::Week(week) => {
      selection.week = week;
      format!("Semaine {}\n", selection.week)
    }
    Command::Class(class) => {
      selection.class = class;
      format!("Classe {}\n", selection.class)
    }
    Command::Year(year) => {
      selection.school_year = year;
      format!(
        "Année scolaire {}\n",
        app.school_year(Some(&*selection), App::today())
      )
    }
    Command::Weeks => app.weeks(Some(&*selection)).await,
    Command::ClearCache => {
      app.clear_cache().await;
      "Cache vidé.\n".to_string()
    }
    Command::Help => HELP.to_string(),
    Command::Quit => return None,
    Command::Empty => String::new(),
    Command::Unknown(line) => format!("Commande inconnue : {line}\n{HELP}"),
  };

  Some(output)
}

pub async fn show(app: &App, selection: &Settings) -> String {
  match app.show(selection).await {
    Ok(text) => text,
    Err(err @ ColloscopeError::Source { .. }) => {
      error!("{}", err);
      format!("Erreur : {err}\n")
    }
    Err(err) => format!("Erreur : {err}\n"),
  }
}

pub async fn run(app: &App, mut selection: Settings) -> anyhow::Result<()> {
  let mut lines = BufReader::new(tokio::io::stdin()).lines();
  let mut stdout = std::io::stdout();

  print!("{HELP}");
  loop {
    print!(
      "[classe {} {} semaine {}] > ",
      selection.class, selection.group, selection.week
    );
    stdout.flush()?;

    let line = match lines.next_line().await? {
      None => break,
      Some(line) => line,
    };

    match execute(app, &mut selection, Command::parse(&line)).await {
      None => break,
      Some(output) => print!("{output}"),
    }
  }

  Ok(())
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn parse_commands() {
    assert_eq!(
      Command::parse("afficher"),
      Command::Show {
        group: None,
        week: None
      }
    );
    assert_eq!(
      Command::parse("  afficher G4 12 "),
      Command::Show {
        group: Some("G4".to_string()),
        week: Some("12".to_string())
      }
    );
    assert_eq!(Command::parse("groupe G2"), Command::Group("G2".to_string()));
    assert_eq!(Command::parse("semaine x"), Command::Week("x".to_string()));
    assert_eq!(Command::parse("classe 2"), Command::Class("2".to_string()));
    assert_eq!(
      Command::parse("annee 2023-2024"),
      Command::Year(Some("2023-2024".to_string()))
    );
    assert_eq!(Command::parse("annee auto"), Command::Year(None));
    assert_eq!(Command::parse("semaines"), Command::Weeks);
    assert_eq!(Command::parse("vider-cache"), Command::ClearCache);
    assert_eq!(Command::parse("aide"), Command::Help);
    assert_eq!(Command::parse("quitter"), Command::Quit);
    assert_eq!(Command::parse("   "), Command::Empty);
  }

  #[test]
  fn incomplete_commands_are_unknown() {
    assert_eq!(
      Command::parse("groupe"),
      Command::Unknown("groupe".to_string())
    );
    assert_eq!(
      Command::parse("quitter maintenant"),
      Command::Unknown("quitter maintenant".to_string())
    );
    assert_eq!(
      Command::parse("annee 2023"),
      Command::Unknown("annee 2023".to_string())
    );
    assert_eq!(
      Command::parse("supprimer"),
      Command::Unknown("supprimer".to_string())
    );
  }
}
