use thiserror::Error;

use crate::subject::{classify, Subject};
use crate::table::{LegendTable, ScheduleTable, WeekLabel};

/// Column headers of the display output.
pub const HEADERS: [&str; 5] = ["Professeur", "Jour", "Heure", "Salle", "Matière"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
  pub id: String,
  /// Legend cells, each joined into one display field.
  pub fields: Vec<String>,
  pub subject: Subject,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Row {
  Resolved(Session),
  /// Identifier missing from the legend.
  Unresolved(String),
}

impl Row {
  pub fn id(&self) -> &str {
    match self {
      Row::Resolved(session) => &session.id,
      Row::Unresolved(id) => id,
    }
  }

  /// The row padded to the five display columns.
  pub fn columns(&self) -> [String; 5] {
    match self {
      Row::Resolved(session) => {
        let mut columns: [String; 5] = Default::default();
        for (column, field) in columns.iter_mut().take(4).zip(&session.fields) {
          column.clone_from(field);
        }
        if session.fields.len() > 4 {
          columns[3] = session.fields[3..].join(" ");
        }
        columns[4] = session.subject.to_string();
        columns
      }
      Row::Unresolved(id) => [
        format!("Identifiant inconnu : {id}"),
        String::new(),
        String::new(),
        String::new(),
        classify(id).to_string(),
      ],
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
  Rows {
    label: Option<WeekLabel>,
    rows: Vec<Row>,
  },
  /// The week lies past the last column of the group: nothing is planned.
  NoSession { week: u32, available: usize },
}

impl Outcome {
  pub fn rows(&self) -> &[Row] {
    match self {
      Outcome::Rows { rows, .. } => rows,
      Outcome::NoSession { .. } => &[],
    }
  }

  pub fn is_empty(&self) -> bool {
    self.rows().is_empty()
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
  #[error("le groupe {0} est inconnu")]
  UnknownGroup(String),
  #[error("la semaine {week} est invalide pour le groupe {group}")]
  InvalidWeek { group: String, week: u32 },
}

/// Looks up the sessions of `group` in the 1-based `week` and resolves them through the legend.
pub fn resolve(
  group: &str,
  week: u32,
  schedule: &ScheduleTable,
  legend: &LegendTable,
) -> Result<Outcome, ResolveError> {
  let weeks = schedule
    .weeks(group)
    .ok_or_else(|| ResolveError::UnknownGroup(group.to_string()))?;

  if week == 0 {
    return Err(ResolveError::InvalidWeek {
      group: group.to_string(),
      week,
    });
  }

  let ids = match weeks.get(week as usize - 1) {
    None => {
      return Ok(Outcome::NoSession {
        week,
        available: weeks.len(),
      })
    }
    Some(ids) => ids,
  };

  let rows = ids
    .iter()
    .map(|id| match legend.get(id) {
      None => Row::Unresolved(id.clone()),
      Some(entry) => Row::Resolved(Session {
        id: id.clone(),
        fields: entry.fields(),
        subject: classify(id),
      }),
    })
    .collect();

  Ok(Outcome::Rows {
    label: schedule.label(week),
    rows,
  })
}
