//! Async driver of the selection cascade.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use data_access::{CacheEntry, DataCache, VisorData};
use field_combiner::{
    combine, combine_point, expected_max_speed, wind_glyphs, PointSeries, WindGlyph,
};
use projection::{border_extent, domain_border, Extent};
use scenario::{ScenarioRow, ScenarioVectors};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};
use visor_common::{
    frame_time, instance_for_date, parse_instance, Alert, CacheKey, FieldError, ScenarioError,
};
use visor_protocol::ApiContext;

use crate::config::SessionConfig;
use crate::events::StateEvent;
use crate::transition::{
    pick_instance, pick_variable, Effect, Selection, Transition, TransitionOutcome,
};

/// Point series with the node it was sampled at and one timestamp per step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSeries {
    pub lon: f64,
    pub lat: f64,
    pub series: PointSeries,
    /// Empty when the instance name does not parse as a run time.
    pub times: Vec<DateTime<Utc>>,
}

/// Closed border ring of the current domain and its extent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainOutline {
    pub ring: Vec<(f64, f64)>,
    pub extent: Extent,
}

struct SessionState {
    selection: Selection,
    instances: Vec<String>,
    variables: Vec<String>,
    current: CacheEntry,
    /// Edited scenarios, kept for the whole session.
    scenarios: HashMap<CacheKey, ScenarioVectors>,
    /// Bumped by every upstream change; async results from an older
    /// generation are dropped.
    generation: u64,
}

/// One interactive visor session.
///
/// Setters apply a [`Transition`] and then await the follow-up work in
/// order: instance list, variable list, data load. A newer upstream change
/// supersedes any cascade still in flight.
pub struct VisorSession {
    cache: DataCache,
    config: SessionConfig,
    context: ApiContext,
    state: RwLock<SessionState>,
    events: broadcast::Sender<StateEvent>,
}

impl VisorSession {
    /// Fetch the context (falling back when unreachable) and run the
    /// start-up cascade.
    pub async fn connect(cache: DataCache, config: SessionConfig) -> Self {
        let context = match cache.api().context().await {
            Ok(context) => context,
            Err(err) => {
                warn!(error = %err, "Context unavailable, using fallback context");
                ApiContext::fallback()
            }
        };
        let session = Self::with_context(cache, config, context);
        session.init().await;
        session
    }

    /// A session with an empty selection. Call [`init`](Self::init) to
    /// select the first domain.
    pub fn with_context(cache: DataCache, config: SessionConfig, context: ApiContext) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            cache,
            config,
            context,
            state: RwLock::new(SessionState {
                selection: Selection::default(),
                instances: Vec::new(),
                variables: Vec::new(),
                current: None,
                scenarios: HashMap::new(),
                generation: 0,
            }),
            events,
        }
    }

    /// Select the first context domain, the configured instance (or the
    /// latest) and the start-up variable.
    pub async fn init(&self) {
        let domain = self.context.domains.first().cloned();
        let variable = self
            .context
            .default_variable()
            .unwrap_or(self.config.default_variable.as_str())
            .to_string();
        info!(domain = ?domain, variable = %variable, "Starting session");

        if let Some((generation, effect)) = self.begin(Transition::SetDomain(domain)).await {
            let instance = self.config.default_instance.clone();
            self.cascade(generation, effect, instance, Some(variable)).await;
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.events.subscribe()
    }

    pub fn context(&self) -> &ApiContext {
        &self.context
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn cache(&self) -> &DataCache {
        &self.cache
    }

    pub async fn selection(&self) -> Selection {
        self.state.read().await.selection.clone()
    }

    pub async fn instances(&self) -> Vec<String> {
        self.state.read().await.instances.clone()
    }

    pub async fn variables(&self) -> Vec<String> {
        self.state.read().await.variables.clone()
    }

    /// Data behind the selection; `None` while incomplete or after a
    /// failed load.
    pub async fn current(&self) -> CacheEntry {
        self.state.read().await.current.clone()
    }

    pub async fn generation(&self) -> u64 {
        self.state.read().await.generation
    }

    /// Series location offered by the context.
    pub fn default_point(&self) -> Option<(f64, f64)> {
        self.context.point_serie_default.map(|p| (p.lon, p.lat))
    }

    /// Returns whether the selection changed.
    pub async fn set_domain(&self, domain: &str) -> bool {
        let variable = self.current_variable().await;
        match self.begin(Transition::SetDomain(Some(domain.to_string()))).await {
            Some((generation, effect)) => {
                self.cascade(generation, effect, None, variable).await;
                true
            }
            None => false,
        }
    }

    /// Returns whether the selection changed.
    pub async fn set_instance(&self, instance: &str) -> bool {
        let variable = self.current_variable().await;
        match self.begin(Transition::SetInstance(Some(instance.to_string()))).await {
            Some((generation, effect)) => {
                self.cascade(generation, effect, None, variable).await;
                true
            }
            None => false,
        }
    }

    /// Returns whether the selection changed.
    pub async fn set_variable(&self, variable: &str) -> bool {
        match self.begin(Transition::SetVariable(Some(variable.to_string()))).await {
            Some((generation, effect)) => {
                self.cascade(generation, effect, None, None).await;
                true
            }
            None => false,
        }
    }

    /// Returns whether the selection changed. Nothing is refetched.
    pub async fn set_frame(&self, frame: usize) -> bool {
        self.begin(Transition::SetFrame(frame)).await.is_some()
    }

    /// Returns whether the selection changed. Nothing is refetched.
    pub async fn set_level(&self, level: usize) -> bool {
        self.begin(Transition::SetLevel(level)).await.is_some()
    }

    /// Select the first listed instance of a `YYYY-MM-DD` date.
    pub async fn select_date(&self, date: &str) -> bool {
        let instance = {
            let state = self.state.read().await;
            instance_for_date(&state.instances, date).map(str::to_string)
        };
        match instance {
            Some(instance) => self.set_instance(&instance).await,
            None => {
                debug!(date, "No instance for date");
                false
            }
        }
    }

    /// Scenario of the current data, edited or default.
    pub async fn scenario(&self) -> Option<ScenarioVectors> {
        let state = self.state.read().await;
        let data = state.current.as_ref()?;
        Some(
            state
                .scenarios
                .get(&data.key)
                .cloned()
                .unwrap_or_else(|| data.default_scenario.clone()),
        )
    }

    /// Apply table edits to the current scenario. Returns `Ok(false)` when
    /// no data is loaded.
    pub async fn set_scenario_rows(&self, rows: &[ScenarioRow]) -> Result<bool, ScenarioError> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        let Some(data) = state.current.as_ref() else {
            return Ok(false);
        };
        let scenario = state
            .scenarios
            .entry(data.key.clone())
            .or_insert_with(|| data.default_scenario.clone());
        scenario.apply_rows(rows)?;

        debug!(key = %data.key, rows = rows.len(), "Scenario edited");
        self.publish(StateEvent::ScenarioChanged {
            key: data.key.clone(),
        });
        Ok(true)
    }

    /// Restore the default scenario of the current data.
    pub async fn reset_scenario(&self) -> bool {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        let Some(data) = state.current.as_ref() else {
            return false;
        };
        state
            .scenarios
            .insert(data.key.clone(), data.default_scenario.clone());
        self.publish(StateEvent::ScenarioChanged {
            key: data.key.clone(),
        });
        true
    }

    /// Combined field at the current frame and level.
    pub async fn current_field(&self) -> Result<Option<Vec<f64>>, FieldError> {
        let Some((data, scenario, selection)) = self.snapshot().await else {
            return Ok(None);
        };
        combine(
            &data.payload,
            &data.layer,
            selection.frame(),
            selection.level(),
            &scenario,
        )
        .map(Some)
    }

    /// Per-project series at the node nearest to `(lon, lat)`.
    pub async fn point_series(&self, lon: f64, lat: f64) -> Result<Option<SessionSeries>, FieldError> {
        let Some((data, scenario, _)) = self.snapshot().await else {
            return Ok(None);
        };
        let (i, j) = data.to_index(lon, lat);
        let series = combine_point(
            &data.payload,
            &data.layer,
            i,
            j,
            self.config.series_level,
            &scenario,
        )?;

        let times = match parse_instance(data.key.instance()) {
            Some(start) => (0..series.len())
                .map(|t| frame_time(start, t, self.context.ref_dt))
                .collect(),
            None => {
                warn!(instance = data.key.instance(), "Instance is not a run time");
                Vec::new()
            }
        };
        let (node_lon, node_lat) = data.to_lonlat(i as f64, j as f64);

        Ok(Some(SessionSeries {
            lon: node_lon,
            lat: node_lat,
            series,
            times,
        }))
    }

    /// Outline of the current domain, taken from the grid of the first
    /// listed variable matching the outline hint.
    pub async fn domain_outline(&self) -> Option<DomainOutline> {
        let (domain, instance, reference) = {
            let state = self.state.read().await;
            let reference = state
                .variables
                .iter()
                .find(|v| v.contains(&self.config.outline_hint))?
                .clone();
            (
                state.selection.domain()?.to_string(),
                state.selection.instance()?.to_string(),
                reference,
            )
        };

        let data = self.cache.load(&domain, &instance, &reference).await?;
        let ring = domain_border(&data.coords);
        let extent = border_extent(&ring)?;
        Some(DomainOutline { ring, extent })
    }

    /// Wind glyphs at the current frame; `None` when either component is
    /// unavailable for the current domain and instance.
    ///
    /// Glyphs reach full size at `wind_max_speed` unless the config opts into
    /// the components' `vmax`.
    pub async fn wind_glyphs(&self) -> Result<Option<Vec<WindGlyph>>, FieldError> {
        let (domain, instance, frame) = {
            let state = self.state.read().await;
            match (state.selection.domain(), state.selection.instance()) {
                (Some(d), Some(i)) => (d.to_string(), i.to_string(), state.selection.frame()),
                _ => return Ok(None),
            }
        };

        let u = self
            .cache
            .load(&domain, &instance, &self.config.wind_u_variable)
            .await;
        let v = self
            .cache
            .load(&domain, &instance, &self.config.wind_v_variable)
            .await;
        let (Some(u), Some(v)) = (u, v) else {
            return Ok(None);
        };

        let max_speed = if self.config.wind_speed_from_vmax {
            expected_max_speed(&u.payload.attributes, &v.payload.attributes)
                .unwrap_or(self.config.wind_max_speed)
        } else {
            self.config.wind_max_speed
        };
        wind_glyphs(&u.payload, &v.payload, &u.coords, frame, 0, max_speed).map(Some)
    }

    async fn snapshot(&self) -> Option<(Arc<VisorData>, ScenarioVectors, Selection)> {
        let state = self.state.read().await;
        let data = state.current.clone()?;
        let scenario = state
            .scenarios
            .get(&data.key)
            .cloned()
            .unwrap_or_else(|| data.default_scenario.clone());
        Some((data, scenario, state.selection.clone()))
    }

    async fn current_variable(&self) -> Option<String> {
        self.state
            .read()
            .await
            .selection
            .variable()
            .map(str::to_string)
    }

    /// Apply a user transition. Returns the generation its follow-up work
    /// runs under, or `None` when nothing changed.
    async fn begin(&self, transition: Transition) -> Option<(u64, Effect)> {
        let mut state = self.state.write().await;
        let effect = self.apply_locked(&mut state, transition)?;
        if effect.is_upstream() {
            state.generation += 1;
        }
        Some((state.generation, effect))
    }

    fn apply_locked(&self, state: &mut SessionState, transition: Transition) -> Option<Effect> {
        match state.selection.apply(transition) {
            TransitionOutcome::Unchanged => None,
            TransitionOutcome::Rejected { missing } => {
                warn!(missing = %missing, "Selection change rejected");
                None
            }
            TransitionOutcome::Changed { changes, effect } => {
                for change in changes {
                    debug!(field = %change.field, old = ?change.old, new = ?change.new, "Selection changed");
                    self.publish(change.into());
                }
                Some(effect)
            }
        }
    }

    async fn cascade(
        &self,
        generation: u64,
        effect: Effect,
        instance: Option<String>,
        variable: Option<String>,
    ) {
        if effect == Effect::ResolveInstances
            && !self.resolve_instances(generation, instance.as_deref()).await
        {
            return;
        }
        if matches!(effect, Effect::ResolveInstances | Effect::ResolveVariables)
            && !self.resolve_variables(generation, variable.as_deref()).await
        {
            return;
        }
        if effect.is_upstream() {
            self.load_current(generation).await;
        }
    }

    fn fallback_instances(&self) -> Vec<String> {
        self.context.instance_fallback.iter().cloned().collect()
    }

    async fn resolve_instances(&self, generation: u64, preferred: Option<&str>) -> bool {
        let domain = self
            .state
            .read()
            .await
            .selection
            .domain()
            .map(str::to_string);

        let instances = match domain.as_deref() {
            None => Vec::new(),
            Some(domain) => match self.cache.api().instances(domain).await {
                Ok(Some(instances)) => instances,
                Ok(None) => {
                    warn!(domain, "Instance list missing, using fallback");
                    self.fallback_instances()
                }
                Err(err) => {
                    warn!(domain, error = %err, "Instance listing failed, using fallback");
                    self.publish(StateEvent::Alert(Alert::from_fetch_error(&err, "instances")));
                    self.fallback_instances()
                }
            },
        };

        let mut state = self.state.write().await;
        if state.generation != generation {
            debug!(generation, current = state.generation, "Discarding stale instance list");
            return false;
        }
        let instance = pick_instance(&instances, preferred, state.selection.instance());
        state.instances = instances.clone();
        self.publish(StateEvent::InstancesChanged(instances));
        self.apply_locked(&mut state, Transition::SetInstance(instance));
        true
    }

    async fn resolve_variables(&self, generation: u64, preferred: Option<&str>) -> bool {
        let target = {
            let state = self.state.read().await;
            match (state.selection.domain(), state.selection.instance()) {
                (Some(d), Some(i)) => Some((d.to_string(), i.to_string())),
                _ => None,
            }
        };

        let variables = match &target {
            None => Vec::new(),
            Some((domain, instance)) => match self.cache.api().variables(domain, instance).await {
                Ok(variables) => variables.unwrap_or_default(),
                Err(err) => {
                    warn!(domain = %domain, instance = %instance, error = %err, "Variable listing failed");
                    self.publish(StateEvent::Alert(Alert::from_fetch_error(&err, "variables")));
                    Vec::new()
                }
            },
        };

        let mut state = self.state.write().await;
        if state.generation != generation {
            debug!(generation, current = state.generation, "Discarding stale variable list");
            return false;
        }
        let variable = pick_variable(&variables, preferred, state.selection.variable());
        state.variables = variables.clone();
        self.publish(StateEvent::VariablesChanged(variables));
        self.apply_locked(&mut state, Transition::SetVariable(variable));
        true
    }

    async fn load_current(&self, generation: u64) {
        let key = {
            let state = self.state.read().await;
            state
                .selection
                .triple()
                .and_then(|(d, i, v)| match CacheKey::new(d, i, v) {
                    Ok(key) => Some(key),
                    Err(err) => {
                        warn!(error = %err, "Selection does not form a cache key");
                        None
                    }
                })
        };

        let entry = match &key {
            Some(key) => self.cache.load_key(key).await,
            None => None,
        };

        let mut state = self.state.write().await;
        if state.generation != generation {
            debug!(generation, current = state.generation, "Discarding stale data load");
            return;
        }
        if let Some(data) = &entry {
            state
                .scenarios
                .entry(data.key.clone())
                .or_insert_with(|| data.default_scenario.clone());
        }
        let loaded = entry.is_some();
        state.current = entry;
        if let Some(key) = &key {
            info!(key = %key, loaded, "Current data replaced");
        }
        self.publish(StateEvent::CurrentDataChanged { key, loaded });
    }

    fn publish(&self, event: StateEvent) {
        // No receivers is fine.
        let _ = self.events.send(event);
    }
}
