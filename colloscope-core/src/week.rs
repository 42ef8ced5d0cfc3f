use std::fmt::{Display, Formatter};

use time::{Date, Duration, Month};
use tracing::debug;

/// Closed period `[start, end]` without teaching.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VacationInterval {
  pub start: Date,
  pub end: Date,
}

impl VacationInterval {
  pub fn new(start: Date, end: Date) -> Self {
    Self { start, end }
  }

  pub fn is_valid(&self) -> bool {
    self.start <= self.end
  }

  /// Both boundaries belong to the vacation.
  pub fn contains(&self, date: Date) -> bool {
    self.start <= date && date <= self.end
  }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WeekMode {
  /// Weeks since the start of term, vacations excluded.
  Teaching,
  /// Calendar week of the year.
  Iso,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CurrentWeek {
  pub number: u32,
  pub mode: WeekMode,
}

impl Display for CurrentWeek {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.mode {
      WeekMode::Teaching => write!(f, "semaine {} de cours", self.number),
      WeekMode::Iso => write!(f, "semaine {} du calendrier", self.number),
    }
  }
}

/// Counts the weeks of term up to `reference`, skipping the ones starting inside a vacation.
///
/// Walks from `start` in steps of seven days. Returns at least 1, also before term starts.
/// Intervals ending before they start are ignored.
pub fn teaching_week(start: Date, reference: Date, vacations: &[VacationInterval]) -> u32 {
  let vacations = vacations
    .iter()
    .filter(|vacation| {
      let valid = vacation.is_valid();
      if !valid {
        debug!(
          "Ignoring vacation ending before it starts: {} - {}",
          vacation.start, vacation.end
        );
      }
      valid
    })
    .collect::<Vec<_>>();

  let mut counter: u32 = 0;
  let mut date = start;

  while date <= reference {
    if !vacations.iter().any(|vacation| vacation.contains(date)) {
      counter += 1;
    }

    date = match date.checked_add(Duration::weeks(1)) {
      None => break,
      Some(next) => next,
    };
  }

  counter.max(1)
}

/// ISO calendar week of `reference`, capped.
pub fn iso_week(reference: Date, cap: u32) -> u32 {
  u32::from(reference.iso_week()).min(cap).max(1)
}

/// Teaching week when a vacation calendar is known, ISO week otherwise, clamped to `cap`.
pub fn current_week(
  start: Date,
  today: Date,
  vacations: &[VacationInterval],
  cap: u32,
) -> CurrentWeek {
  if vacations.is_empty() {
    return CurrentWeek {
      number: iso_week(today, cap),
      mode: WeekMode::Iso,
    };
  }

  CurrentWeek {
    number: teaching_week(start, today, vacations).min(cap).max(1),
    mode: WeekMode::Teaching,
  }
}

/// First day of the current week of term and of the following one.
pub fn week_bounds(start: Date, today: Date) -> (Date, Date) {
  let elapsed = if today < start {
    0
  } else {
    (today - start).whole_weeks()
  };

  let current = start + Duration::weeks(elapsed);
  (current, current + Duration::weeks(1))
}

/// School year containing `date`, as `YYYY-YYYY`. A new year begins in August.
pub fn school_year(date: Date) -> String {
  let year = if date.month() as u8 >= Month::August as u8 {
    date.year()
  } else {
    date.year() - 1
  };

  format!("{}-{}", year, year + 1)
}

/// Whether `text` names a school year, two consecutive years as in `2024-2025`.
pub fn is_school_year(text: &str) -> bool {
  match text.split_once('-') {
    Some((first, second)) if first.len() == 4 && second.len() == 4 => {
      match (first.parse::<u16>(), second.parse::<u16>()) {
        (Ok(first), Ok(second)) => second == first + 1,
        _ => false,
      }
    }
    _ => false,
  }
}

pub fn format_day_month(date: Date) -> String {
  format!("{:0>2}/{:0>2}", date.day(), date.month() as u8)
}
