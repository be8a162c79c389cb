use backlog_ready::config::{AppConfig, DorConfig};
use backlog_ready::error::AppError;
use backlog_ready::workflows::backlog::{BacklogCull, RefinementPrep};
use backlog_ready::workflows::readiness::DorChecker;
use backlog_ready::workflows::tracker::parse_timestamp;
use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Engines built once from the Definition of Ready file and shared across requests.
#[derive(Clone)]
pub(crate) struct Services {
    pub(crate) checker: Arc<DorChecker>,
    pub(crate) cull: Arc<BacklogCull>,
    pub(crate) refinement: Arc<RefinementPrep>,
}

impl Services {
    pub(crate) fn from_config(config: &DorConfig) -> Result<Self, AppError> {
        let checker = Arc::new(DorChecker::new(config)?);
        Ok(Self {
            cull: Arc::new(BacklogCull::from_config(checker.clone(), config)),
            refinement: Arc::new(RefinementPrep::from_config(checker.clone(), config)),
            checker,
        })
    }
}

/// An explicit `--config` path wins over `DOR_CONFIG_PATH`.
pub(crate) fn load_dor_config(
    config: &AppConfig,
    override_path: Option<&Path>,
) -> Result<DorConfig, AppError> {
    let dor = match override_path {
        Some(path) => DorConfig::from_path(path)?,
        None => config.load_dor()?,
    };
    Ok(dor)
}

pub(crate) fn load_issue_file(path: &Path) -> Result<Value, AppError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub(crate) fn parse_now(raw: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(raw.trim())
        .map(|instant| instant.with_timezone(&Utc))
        .ok_or_else(|| format!("failed to parse '{raw}' as an RFC 3339 timestamp or YYYY-MM-DD"))
}
