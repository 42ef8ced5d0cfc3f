use std::io::ErrorKind;
use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

/// Last selection, stored as typed by the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
  pub group: String,
  pub week: String,
  pub class: String,
  pub school_year: Option<String>,
}

impl Settings {
  pub fn defaults(week: u32) -> Self {
    Self {
      group: "G1".to_string(),
      week: week.to_string(),
      class: "1".to_string(),
      school_year: None,
    }
  }

  /// Parses `group`, `week`, `class` and an optional `school_year`, one per line.
  pub fn parse(text: &str) -> Option<Self> {
    let mut lines = text.lines().map(str::trim);

    let group = lines.next()?.to_string();
    let week = lines.next()?.to_string();
    let class = lines.next()?.to_string();
    let school_year = lines
      .next()
      .filter(|line| !line.is_empty())
      .map(str::to_string);

    Some(Self {
      group,
      week,
      class,
      school_year,
    })
  }

  /// Reads the settings file, or `None` if it is missing, unreadable or short.
  pub async fn read(path: &Path) -> Option<Self> {
    let text = match tokio::fs::read_to_string(path).await {
      Ok(text) => text,
      Err(err) if err.kind() == ErrorKind::NotFound => {
        info!("No settings at {}", path.display());
        return None;
      }
      Err(err) => {
        warn!("Unable to read settings {}: {}", path.display(), err);
        return None;
      }
    };

    let settings = Self::parse(&text);
    if settings.is_none() {
      warn!("Malformed settings {}", path.display());
    }
    settings
  }

  /// Overwrites the settings file.
  pub async fn save(&self, path: &Path) -> anyhow::Result<()> {
    let mut text = format!("{}\n{}\n{}\n", self.group, self.week, self.class);
    if let Some(school_year) = &self.school_year {
      text.push_str(school_year);
      text.push('\n');
    }

    tokio::fs::write(path, text)
      .await
      .with_context(|| format!("unable to write settings {}", path.display()))
  }
}
