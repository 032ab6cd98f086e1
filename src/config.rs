//! Layered configuration.
//!
//! Built-in defaults, then the global file, then the project file (or a
//! single explicit file), then `TASKCTX_*` environment variables. Files are
//! partial patches: every key is optional.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::context::composite::{BlendWeights, RelevancePolicy};
use crate::context::mmr::SelectionPolicy;
use crate::context::pipeline::RankingPolicy;
use crate::context::signals::{ActionabilityWeights, RecencyPolicy};
use crate::error::{CtxError, Result};
use crate::search::IndexBackend;

pub const CONFIG_ENV: &str = "TASKCTX_CONFIG";
pub const PROJECT_CONFIG_PATH: &str = ".taskctx/config.toml";

/// Looks up an environment variable. Injected so overrides are testable.
type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub actionability: ActionabilityWeights,
    #[serde(default)]
    pub recency: RecencyPolicy,
    #[serde(default)]
    pub blend: BlendWeights,
    #[serde(default)]
    pub relevance: RelevancePolicy,
    #[serde(default)]
    pub selection: SelectionPolicy,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where and how the full-text index is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    pub backend: IndexBackend,
    /// On-disk location. `None` keeps the index in memory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Skip re-indexing when the task set is unchanged.
    pub reuse_unchanged: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: IndexBackend::Fts5,
            path: None,
            reuse_unchanged: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Always emit JSON, as with `--robot`.
    pub robot: bool,
}

impl Config {
    /// Load configuration for a project rooted at `project_root`.
    pub fn load(explicit_path: Option<&Path>, project_root: &Path) -> Result<Self> {
        Self::load_with(explicit_path, project_root, &|key| std::env::var(key).ok())
    }

    fn load_with(
        explicit_path: Option<&Path>,
        project_root: &Path,
        env: EnvLookup<'_>,
    ) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| env(CONFIG_ENV).map(PathBuf::from));

        if let Some(path) = explicit {
            let patch = Self::load_patch(&path)?
                .ok_or_else(|| CtxError::ConfigNotFound(path.display().to_string()))?;
            config.merge_patch(patch);
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_project(project_root)? {
                config.merge_patch(project);
            }
        }

        config.apply_overrides(env)?;
        config.validate()?;

        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let Some(dir) = dirs::config_dir() else {
            return Ok(None);
        };
        Self::load_patch(&dir.join("taskctx/config.toml"))
    }

    fn load_project(project_root: &Path) -> Result<Option<ConfigPatch>> {
        Self::load_patch(&project_root.join(PROJECT_CONFIG_PATH))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| CtxError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| CtxError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.actionability {
            self.actionability.merge(patch);
        }
        if let Some(patch) = patch.recency {
            self.recency.merge(patch);
        }
        if let Some(patch) = patch.blend {
            self.blend.merge(patch);
        }
        if let Some(patch) = patch.relevance {
            self.relevance.merge(patch);
        }
        if let Some(patch) = patch.selection {
            self.selection.merge(patch);
        }
        if let Some(patch) = patch.index {
            self.index.merge(patch);
        }
        if let Some(patch) = patch.output {
            self.output.merge(patch);
        }
    }

    fn apply_overrides(&mut self, env: EnvLookup<'_>) -> Result<()> {
        if let Some(value) = env_string(env, "TASKCTX_INDEX_BACKEND") {
            self.index.backend = value.parse().map_err(CtxError::Config)?;
        }
        if let Some(value) = env_string(env, "TASKCTX_INDEX_PATH") {
            self.index.path = Some(PathBuf::from(value));
        }
        if let Some(value) = env_bool(env, "TASKCTX_INDEX_REUSE") {
            self.index.reuse_unchanged = value;
        }

        if let Some(value) = env_f64(env, "TASKCTX_SELECTION_LAMBDA")? {
            self.selection.lambda = value;
        }
        if let Some(value) = env_usize(env, "TASKCTX_SELECTION_K")? {
            self.selection.default_k = value;
        }
        if let Some(value) = env_usize(env, "TASKCTX_SELECTION_POOL")? {
            self.selection.candidate_pool = value;
        }

        if let Some(value) = env_f64(env, "TASKCTX_RECENCY_DECAY_DAYS")? {
            self.recency.decay_days = value;
        }

        if env_bool(env, "TASKCTX_ROBOT").unwrap_or(false) {
            self.output.robot = true;
        }

        Ok(())
    }

    /// Reject settings the pipeline cannot honor.
    pub fn validate(&self) -> Result<()> {
        let lambda = self.selection.lambda;
        if !(0.0..=1.0).contains(&lambda) {
            return Err(CtxError::Config(format!(
                "selection.lambda must be within [0, 1], got {lambda}"
            )));
        }
        if self.selection.candidate_pool == 0 {
            return Err(CtxError::Config(
                "selection.candidate_pool must be at least 1".to_string(),
            ));
        }
        if self.recency.decay_days.is_nan() || self.recency.decay_days <= 0.0 {
            return Err(CtxError::Config(format!(
                "recency.decay_days must be positive, got {}",
                self.recency.decay_days
            )));
        }
        let unknown = self.recency.unknown;
        if unknown.is_nan() || unknown <= 0.0 || unknown > 1.0 {
            return Err(CtxError::Config(format!(
                "recency.unknown must be within (0, 1], got {unknown}"
            )));
        }
        if self.relevance.provider_limit == 0 {
            return Err(CtxError::Config(
                "relevance.provider_limit must be at least 1".to_string(),
            ));
        }
        if self.actionability.floor.is_nan() || self.actionability.floor <= 0.0 {
            return Err(CtxError::Config(format!(
                "actionability.floor must be positive, got {}",
                self.actionability.floor
            )));
        }
        if self.actionability.momentum_min > self.actionability.momentum_max {
            return Err(CtxError::Config(format!(
                "actionability.momentum_min ({}) exceeds momentum_max ({})",
                self.actionability.momentum_min, self.actionability.momentum_max
            )));
        }
        if self.index.backend != IndexBackend::None
            && self.index.reuse_unchanged
            && self.index.path.as_ref().is_some_and(|p| p.as_os_str().is_empty())
        {
            return Err(CtxError::MissingConfig("index.path".to_string()));
        }
        Ok(())
    }

    /// The ranking tunables as one value.
    pub fn ranking_policy(&self) -> RankingPolicy {
        RankingPolicy {
            actionability: self.actionability.clone(),
            recency: self.recency.clone(),
            blend: self.blend.clone(),
            relevance: self.relevance.clone(),
            selection: self.selection.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    actionability: Option<ActionabilityPatch>,
    recency: Option<RecencyPatch>,
    blend: Option<BlendPatch>,
    relevance: Option<RelevancePatch>,
    selection: Option<SelectionPatch>,
    index: Option<IndexPatch>,
    output: Option<OutputPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ActionabilityPatch {
    base: Option<f64>,
    in_progress_bonus: Option<f64>,
    blocked_penalty: Option<f64>,
    next_action_bonus: Option<f64>,
    priority_high: Option<f64>,
    priority_medium: Option<f64>,
    priority_low: Option<f64>,
    open_blocker_penalty: Option<f64>,
    momentum_bonus: Option<f64>,
    momentum_min: Option<i64>,
    momentum_max: Option<i64>,
    floor: Option<f64>,
}

impl ActionabilityWeights {
    fn merge(&mut self, patch: ActionabilityPatch) {
        if let Some(v) = patch.base {
            self.base = v;
        }
        if let Some(v) = patch.in_progress_bonus {
            self.in_progress_bonus = v;
        }
        if let Some(v) = patch.blocked_penalty {
            self.blocked_penalty = v;
        }
        if let Some(v) = patch.next_action_bonus {
            self.next_action_bonus = v;
        }
        if let Some(v) = patch.priority_high {
            self.priority_high = v;
        }
        if let Some(v) = patch.priority_medium {
            self.priority_medium = v;
        }
        if let Some(v) = patch.priority_low {
            self.priority_low = v;
        }
        if let Some(v) = patch.open_blocker_penalty {
            self.open_blocker_penalty = v;
        }
        if let Some(v) = patch.momentum_bonus {
            self.momentum_bonus = v;
        }
        if let Some(v) = patch.momentum_min {
            self.momentum_min = v;
        }
        if let Some(v) = patch.momentum_max {
            self.momentum_max = v;
        }
        if let Some(v) = patch.floor {
            self.floor = v;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RecencyPatch {
    decay_days: Option<f64>,
    unknown: Option<f64>,
}

impl RecencyPolicy {
    fn merge(&mut self, patch: RecencyPatch) {
        if let Some(v) = patch.decay_days {
            self.decay_days = v;
        }
        if let Some(v) = patch.unknown {
            self.unknown = v;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct BlendPatch {
    execute_query_relevance: Option<f64>,
    execute_query_actionability: Option<f64>,
    execute_query_recency: Option<f64>,
    execute_plain_actionability: Option<f64>,
    execute_plain_recency: Option<f64>,
    plan_actionability: Option<f64>,
    plan_recency: Option<f64>,
}

impl BlendWeights {
    fn merge(&mut self, patch: BlendPatch) {
        if let Some(v) = patch.execute_query_relevance {
            self.execute_query_relevance = v;
        }
        if let Some(v) = patch.execute_query_actionability {
            self.execute_query_actionability = v;
        }
        if let Some(v) = patch.execute_query_recency {
            self.execute_query_recency = v;
        }
        if let Some(v) = patch.execute_plain_actionability {
            self.execute_plain_actionability = v;
        }
        if let Some(v) = patch.execute_plain_recency {
            self.execute_plain_recency = v;
        }
        if let Some(v) = patch.plan_actionability {
            self.plan_actionability = v;
        }
        if let Some(v) = patch.plan_recency {
            self.plan_recency = v;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RelevancePatch {
    no_query: Option<f64>,
    substring_fallback: Option<f64>,
    provider_limit: Option<usize>,
    title_weight: Option<f64>,
    details_weight: Option<f64>,
    full_text_weight: Option<f64>,
}

impl RelevancePolicy {
    fn merge(&mut self, patch: RelevancePatch) {
        if let Some(v) = patch.no_query {
            self.no_query = v;
        }
        if let Some(v) = patch.substring_fallback {
            self.substring_fallback = v;
        }
        if let Some(v) = patch.provider_limit {
            self.provider_limit = v;
        }
        if let Some(v) = patch.title_weight {
            self.title_weight = v;
        }
        if let Some(v) = patch.details_weight {
            self.details_weight = v;
        }
        if let Some(v) = patch.full_text_weight {
            self.full_text_weight = v;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SelectionPatch {
    candidate_pool: Option<usize>,
    lambda: Option<f64>,
    default_k: Option<usize>,
}

impl SelectionPolicy {
    fn merge(&mut self, patch: SelectionPatch) {
        if let Some(v) = patch.candidate_pool {
            self.candidate_pool = v;
        }
        if let Some(v) = patch.lambda {
            self.lambda = v;
        }
        if let Some(v) = patch.default_k {
            self.default_k = v;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct IndexPatch {
    backend: Option<IndexBackend>,
    path: Option<PathBuf>,
    reuse_unchanged: Option<bool>,
}

impl IndexConfig {
    fn merge(&mut self, patch: IndexPatch) {
        if let Some(v) = patch.backend {
            self.backend = v;
        }
        if let Some(v) = patch.path {
            self.path = Some(v);
        }
        if let Some(v) = patch.reuse_unchanged {
            self.reuse_unchanged = v;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct OutputPatch {
    robot: Option<bool>,
}

impl OutputConfig {
    fn merge(&mut self, patch: OutputPatch) {
        if let Some(v) = patch.robot {
            self.robot = v;
        }
    }
}

fn env_string(env: EnvLookup<'_>, key: &str) -> Option<String> {
    env(key).filter(|value| !value.trim().is_empty())
}

fn env_bool(env: EnvLookup<'_>, key: &str) -> Option<bool> {
    env(key).map(|value| {
        matches!(
            value.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn env_f64(env: EnvLookup<'_>, key: &str) -> Result<Option<f64>> {
    match env(key) {
        Some(value) => value.trim().parse::<f64>().map(Some).map_err(|err| {
            CtxError::Config(format!("invalid {key} value {value}: {err}"))
        }),
        None => Ok(None),
    }
}

fn env_usize(env: EnvLookup<'_>, key: &str) -> Result<Option<usize>> {
    match env(key) {
        Some(value) => value.trim().parse::<usize>().map(Some).map_err(|err| {
            CtxError::Config(format!("invalid {key} value {value}: {err}"))
        }),
        None => Ok(None),
    }
}
