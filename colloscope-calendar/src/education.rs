use std::collections::HashMap;

use reqwest::{Client, Url};
use serde::Deserialize;
use time::format_description::well_known::Iso8601;
use time::macros::offset;
use time::{Date, OffsetDateTime, UtcOffset};
use tokio::sync::RwLock;
use tracing::{info, warn};

use colloscope_core::week::VacationInterval;

/// The feed marks midnights of metropolitan France, at +01:00 or +02:00 depending on the season.
/// Read at +02:00, every such instant falls on its French calendar date, whatever offset it was
/// written with.
const FEED_OFFSET: UtcOffset = offset!(+2);

pub const DEFAULT_ENDPOINT: &str = "https://data.education.gouv.fr/api/explore/v2.1/catalog/datasets/fr-en-calendrier-scolaire/records";

/// School holiday calendar of the French ministry of education.
pub struct VacationCalendar {
  client: Client,
  endpoint: Url,
  cache: RwLock<HashMap<(String, String), Vec<VacationInterval>>>,
}

#[derive(Debug, Deserialize)]
struct Records {
  results: Vec<Record>,
}

#[derive(Debug, Deserialize)]
struct Record {
  #[serde(default)]
  description: Option<String>,
  start_date: Option<String>,
  end_date: Option<String>,
}

impl VacationCalendar {
  pub fn new(endpoint: Url) -> Self {
    Self {
      client: Client::new(),
      endpoint,
      cache: RwLock::new(HashMap::new()),
    }
  }

  /// Vacations of `zone` in `school_year` (`YYYY-YYYY`), empty if the feed is unavailable.
  pub async fn vacations(&self, zone: &str, school_year: &str) -> Vec<VacationInterval> {
    let key = (zone.to_string(), school_year.to_string());

    if let Some(vacations) = self.cache.read().await.get(&key) {
      return vacations.clone();
    }

    match self.fetch(zone, school_year).await {
      Ok(vacations) => {
        info!(
          "Fetched {} vacations for {} {}",
          vacations.len(),
          zone,
          school_year
        );
        self.cache.write().await.insert(key, vacations.clone());
        vacations
      }
      Err(err) => {
        warn!(
          "Unable to fetch vacations for {} {}, continuing without: {:#}",
          zone, school_year, err
        );
        Vec::new()
      }
    }
  }

  pub async fn clear_cache(&self) {
    self.cache.write().await.clear();
  }

  fn url(&self, zone: &str, school_year: &str) -> Url {
    let mut url = self.endpoint.clone();
    url
      .query_pairs_mut()
      .append_pair(
        "where",
        &format!("zones=\"{zone}\" and annee_scolaire=\"{school_year}\""),
      )
      .append_pair("limit", "100");
    url
  }

  async fn fetch(&self, zone: &str, school_year: &str) -> anyhow::Result<Vec<VacationInterval>> {
    let text = self
      .client
      .get(self.url(zone, school_year))
      .send()
      .await?
      .error_for_status()?
      .text()
      .await?;

    parse_records(&text)
  }
}

/// Reads the feed's JSON answer. Records with missing or unreadable dates are skipped.
pub fn parse_records(text: &str) -> anyhow::Result<Vec<VacationInterval>> {
  let records: Records = serde_json::from_str(text)?;

  let mut vacations = records
    .results
    .into_iter()
    .filter_map(|record| {
      let interval = interval(&record);
      if interval.is_none() {
        warn!("Skipping vacation record {:?}", record.description);
      }
      interval
    })
    .collect::<Vec<VacationInterval>>();

  // the feed lists a period once per academy
  vacations.sort();
  vacations.dedup();

  Ok(vacations)
}

fn interval(record: &Record) -> Option<VacationInterval> {
  let start = instant(record.start_date.as_deref()?)?.date();
  let end = last_day(instant(record.end_date.as_deref()?)?)?;
  Some(VacationInterval::new(start, end))
}

fn instant(value: &str) -> Option<OffsetDateTime> {
  OffsetDateTime::parse(value, &Iso8601::DEFAULT)
    .ok()
    .map(|instant| instant.to_offset(FEED_OFFSET))
}

/// The feed ends a vacation at the midnight classes resume, which is not a vacation day.
fn last_day(end: OffsetDateTime) -> Option<Date> {
  if end.hour() < 2 {
    end.date().previous_day()
  } else {
    Some(end.date())
  }
}
