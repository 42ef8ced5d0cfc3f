use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::io::Read;
use std::str::FromStr;

use anyhow::anyhow;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::input::is_group_key;

static WEEK_LABEL_REGEX: Lazy<Regex> =
  Lazy::new(|| Regex::new("\\((\\d{2})/(\\d{2})\\)").unwrap());

/// Session identifiers of one group in one week, possibly empty.
pub type Week = Vec<String>;

/// Date printed in the header of a week column, e.g. `Semaine 3 (30/09)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct WeekLabel {
  pub day: u8,
  pub month: u8,
}

impl WeekLabel {
  /// Finds the first embedded `(DD/MM)` in a free-text header cell.
  pub fn find(text: &str) -> Option<Self> {
    let captures = WEEK_LABEL_REGEX.captures(text)?;
    let day = u8::from_str(captures.get(1)?.as_str()).ok()?;
    let month = u8::from_str(captures.get(2)?.as_str()).ok()?;

    if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
      return None;
    }

    Some(Self { day, month })
  }
}

impl Display for WeekLabel {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{:0>2}/{:0>2}", self.day, self.month)
  }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScheduleTable {
  groups: HashMap<String, Vec<Week>>,
  labels: Vec<Option<WeekLabel>>,
}

impl ScheduleTable {
  pub fn new(groups: HashMap<String, Vec<Week>>) -> Self {
    Self {
      groups,
      labels: Vec::new(),
    }
  }

  pub fn with_labels(mut self, labels: Vec<Option<WeekLabel>>) -> Self {
    self.labels = labels;
    self
  }

  pub fn weeks(&self, group: &str) -> Option<&[Week]> {
    self.groups.get(group).map(Vec::as_slice)
  }

  /// Label of a 1-based week column, if the grid had a header.
  pub fn label(&self, week: u32) -> Option<WeekLabel> {
    let index = usize::try_from(week).ok()?.checked_sub(1)?;
    self.labels.get(index).copied().flatten()
  }

  pub fn groups(&self) -> impl Iterator<Item = &str> {
    self.groups.keys().map(String::as_str)
  }

  /// Reads the exported schedule grid: one row per group, one column per week.
  pub fn from_csv<R: Read>(reader: R) -> anyhow::Result<Self> {
    let mut reader = csv::ReaderBuilder::new()
      .has_headers(false)
      .flexible(true)
      .from_reader(reader);

    let mut table = Self::default();

    for (index, record) in reader.records().enumerate() {
      let record = record?;
      let mut cells = record.iter();

      let group = match cells.next() {
        None => continue,
        Some(group) => group.trim(),
      };

      if index == 0 && is_header(&record) {
        table.labels = record.iter().skip(1).map(WeekLabel::find).collect();
        debug!("Found {} week labels", table.labels.len());
        continue;
      }

      if group.is_empty() {
        continue;
      }

      if table.groups.contains_key(group) {
        warn!("Duplicate row for group {}, keeping the first one", group);
        continue;
      }

      let weeks = cells.map(tokens).collect::<Vec<Week>>();
      table.groups.insert(group.to_string(), weeks);
    }

    if table.groups.is_empty() {
      return Err(anyhow!("schedule grid contains no group"));
    }

    Ok(table)
  }
}

/// The first row is a header unless it starts with a group and carries no week date.
fn is_header(record: &csv::StringRecord) -> bool {
  let mut cells = record.iter();
  let starts_with_group = cells.next().map_or(false, is_group_key);
  !starts_with_group || cells.any(|cell| WeekLabel::find(cell).is_some())
}

/// Descriptive cells of one identifier in source order (teacher, day, time, room).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LegendEntry {
  pub cells: Vec<Vec<String>>,
}

impl LegendEntry {
  pub fn new(cells: Vec<Vec<String>>) -> Self {
    Self { cells }
  }

  /// Each cell's tokens joined by a single space.
  pub fn fields(&self) -> Vec<String> {
    self.cells.iter().map(|cell| cell.join(" ")).collect()
  }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LegendTable {
  entries: HashMap<String, LegendEntry>,
}

impl LegendTable {
  pub fn new(entries: HashMap<String, LegendEntry>) -> Self {
    Self { entries }
  }

  pub fn get(&self, id: &str) -> Option<&LegendEntry> {
    self.entries.get(id)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Reads the exported legend grid: identifier in the first column, details after it.
  pub fn from_csv<R: Read>(reader: R) -> anyhow::Result<Self> {
    let mut reader = csv::ReaderBuilder::new()
      .has_headers(false)
      .flexible(true)
      .from_reader(reader);

    let mut entries = HashMap::new();

    for record in reader.records() {
      let record = record?;
      let mut cells = record.iter();

      let id = match cells.next().map(str::trim) {
        None | Some("") => continue,
        Some(id) => id.to_string(),
      };

      let cells = cells.map(tokens).collect::<Vec<Vec<String>>>();
      if entries.insert(id.clone(), LegendEntry::new(cells)).is_some() {
        warn!("Identifier {} defined twice in legend, keeping the last one", id);
      }
    }

    Ok(Self { entries })
  }
}

fn tokens(cell: &str) -> Vec<String> {
  cell.split_whitespace().map(str::to_string).collect()
}
