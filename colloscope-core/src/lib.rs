use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::input::{validate_group, validate_week, GroupRange, InputError};
use crate::resolver::{resolve, Outcome, ResolveError};
use crate::settings::Settings;
use crate::table::{LegendTable, ScheduleTable};

pub mod input;
pub mod resolver;
pub mod settings;
pub mod subject;
pub mod table;
pub mod week;

const SCHEDULE_FILE: &str = "colloscope.csv";
const LEGEND_FILE: &str = "legende.csv";

/// A validated selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
  pub group: String,
  pub week: u32,
  pub class: String,
}

impl Request {
  /// Validates the raw selection, group first.
  pub fn from_settings(
    settings: &Settings,
    range: GroupRange,
    cap: u32,
  ) -> Result<Self, InputError> {
    Ok(Self {
      group: validate_group(&settings.group, range)?,
      week: validate_week(&settings.week, cap)?,
      class: settings.class.trim().to_string(),
    })
  }
}

#[derive(Debug, Error)]
pub enum ColloscopeError {
  #[error(transparent)]
  Input(#[from] InputError),
  #[error(transparent)]
  Resolve(#[from] ResolveError),
  #[error("impossible de charger le colloscope de la classe {class} : {cause:#}")]
  Source { class: String, cause: anyhow::Error },
}

pub struct Tables {
  pub schedule: ScheduleTable,
  pub legend: LegendTable,
}

impl Tables {
  pub async fn load(dir: &Path) -> anyhow::Result<Self> {
    let schedule = read(&dir.join(SCHEDULE_FILE)).await?;
    let schedule = ScheduleTable::from_csv(schedule.as_slice())
      .with_context(|| format!("invalid schedule grid in {}", dir.display()))?;

    let legend = read(&dir.join(LEGEND_FILE)).await?;
    let legend = LegendTable::from_csv(legend.as_slice())
      .with_context(|| format!("invalid legend grid in {}", dir.display()))?;

    Ok(Self { schedule, legend })
  }
}

async fn read(path: &Path) -> anyhow::Result<Vec<u8>> {
  tokio::fs::read(path)
    .await
    .with_context(|| format!("unable to read {}", path.display()))
}

pub struct Lookup {
  pub request: Request,
  pub outcome: Outcome,
}

pub struct Colloscope {
  data_dir: PathBuf,
  tables: RwLock<Option<(String, Arc<Tables>)>>,
}

impl Colloscope {
  pub fn new(data_dir: PathBuf) -> Self {
    Self {
      data_dir,
      tables: RwLock::new(None),
    }
  }

  /// Tables of `class`, read from disk unless they are the cached ones.
  pub async fn tables(&self, class: &str) -> anyhow::Result<Arc<Tables>> {
    if let Some((cached, tables)) = self.tables.read().await.as_ref() {
      if cached == class {
        debug!("Using cached tables of class {}", class);
        return Ok(tables.clone());
      }
    }

    let mut cache = self.tables.write().await;

    let tables = Arc::new(Tables::load(&self.data_dir.join(class)).await?);
    info!(
      "Loaded class {}, {} legend entries",
      class,
      tables.legend.len()
    );

    *cache = Some((class.to_string(), tables.clone()));
    Ok(tables)
  }

  pub async fn clear_cache(&self) {
    *self.tables.write().await = None;
    info!("Cleared table cache");
  }

  pub async fn lookup(&self, request: Request) -> Result<Lookup, ColloscopeError> {
    let tables = self
      .tables(&request.class)
      .await
      .map_err(|cause| ColloscopeError::Source {
        class: request.class.clone(),
        cause,
      })?;

    let outcome = resolve(
      &request.group,
      request.week,
      &tables.schedule,
      &tables.legend,
    )?;

    Ok(Lookup { request, outcome })
  }
}
