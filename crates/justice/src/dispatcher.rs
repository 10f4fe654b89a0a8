// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

//! Reactive recomputation of chart slots.
//!
//! Each new [`SelectionState`] is diffed against the previous one. The static
//! [`DependencyTable`] maps changed fields to the slots of the active tab that must be
//! recomputed; every other slot keeps its last spec. Work is split into
//! [`Dispatcher::prepare`] (compute) and [`Dispatcher::commit`] (publish) so that
//! [`SharedDispatcher`] can drop results overtaken by a newer trigger.

use crate::charts::{ChartDescriptor, ChartId, ChartPipeline, ChartRegistry, ChartSpec};
use crate::selection::{SelectionField, SelectionState, Tab};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct DependencyTable {
    by_field: BTreeMap<SelectionField, BTreeSet<ChartId>>,
    by_tab: BTreeMap<Tab, Vec<ChartId>>,
}

impl DependencyTable {
    pub fn from_registry(registry: &ChartRegistry) -> Self {
        let mut table = Self::default();
        for chart in registry.iter() {
            for field in chart.depends_on() {
                table
                    .by_field
                    .entry(field)
                    .or_default()
                    .insert(chart.id.clone());
            }
            table
                .by_tab
                .entry(chart.tab)
                .or_default()
                .push(chart.id.clone());
        }
        table
    }
    pub fn dependents(&self, field: SelectionField) -> impl Iterator<Item = &ChartId> {
        self.by_field.get(&field).into_iter().flatten()
    }
    pub fn tab_charts(&self, tab: Tab) -> &[ChartId] {
        self.by_tab.get(&tab).map(Vec::as_slice).unwrap_or(&[])
    }
    /// Slots of the active tab to recompute, in display order.
    ///
    /// A tab switch recomputes the whole newly active tab; otherwise only active-tab slots that
    /// depend on a changed field are returned.
    pub fn affected(
        &self,
        changed: &BTreeSet<SelectionField>,
        active: Option<Tab>,
    ) -> Vec<ChartId> {
        let Some(tab) = active else {
            return Vec::new();
        };
        let slots = self.tab_charts(tab);
        if changed.contains(&SelectionField::ActiveTab) {
            return slots.to_vec();
        }
        let hit: BTreeSet<&ChartId> = changed.iter().flat_map(|f| self.dependents(*f)).collect();
        slots
            .iter()
            .filter(|id| hit.contains(id))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    Idle,
    Computing,
}

#[derive(Debug, Clone)]
pub struct ChartSlot {
    pub chart: ChartId,
    pub spec: Arc<ChartSpec>,
    /// Dispatch that produced `spec`.
    pub generation: u64,
    /// Inputs changed while its tab was hidden; the next visit to the tab recomputes it.
    pub stale: bool,
}

/// What the rendering surface shows for the active tab.
#[derive(Debug, Clone)]
pub enum RenderOutput {
    Charts { tab: Tab, specs: Vec<Arc<ChartSpec>> },
    Fallback(String),
}

impl RenderOutput {
    pub fn specs(&self) -> &[Arc<ChartSpec>] {
        match self {
            RenderOutput::Charts { specs, .. } => specs,
            RenderOutput::Fallback(_) => &[],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    pub generation: u64,
    pub changed: BTreeSet<SelectionField>,
    pub recomputed: Vec<ChartId>,
    pub failed: Vec<ChartId>,
    pub elapsed: Duration,
}

impl DispatchReport {
    pub fn is_noop(&self) -> bool {
        self.recomputed.is_empty()
    }
}

/// Computed but not yet published slots.
#[derive(Debug)]
pub struct PendingDispatch {
    selection: Arc<SelectionState>,
    changed: BTreeSet<SelectionField>,
    computed: Vec<(ChartId, ChartSpec)>,
    started: Instant,
}

impl PendingDispatch {
    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }
    pub fn changed(&self) -> &BTreeSet<SelectionField> {
        &self.changed
    }
}

pub struct Dispatcher {
    pipeline: ChartPipeline,
    registry: Arc<ChartRegistry>,
    dependencies: DependencyTable,
    state: DispatcherState,
    current: Option<Arc<SelectionState>>,
    slots: BTreeMap<ChartId, ChartSlot>,
    generation: u64,
}

impl Dispatcher {
    pub fn new(pipeline: ChartPipeline, registry: Arc<ChartRegistry>) -> Self {
        let dependencies = DependencyTable::from_registry(&registry);
        Self {
            pipeline,
            registry,
            dependencies,
            state: DispatcherState::Idle,
            current: None,
            slots: BTreeMap::new(),
            generation: 0,
        }
    }
    pub fn state(&self) -> DispatcherState {
        self.state
    }
    pub fn selection(&self) -> Option<&SelectionState> {
        self.current.as_deref()
    }
    pub fn dependencies(&self) -> &DependencyTable {
        &self.dependencies
    }
    pub fn generation(&self) -> u64 {
        self.generation
    }
    pub fn slot(&self, id: &ChartId) -> Option<&ChartSlot> {
        self.slots.get(id)
    }
    /// Initial render: every slot of the active tab.
    pub fn start(&mut self, initial: SelectionState) -> DispatchReport {
        self.current = None;
        self.slots.clear();
        self.submit(initial)
    }
    pub fn submit(&mut self, next: SelectionState) -> DispatchReport {
        let pending = self.prepare(next);
        self.commit(pending)
    }
    /// Computes the affected slots for `next` without publishing them.
    pub fn prepare(&mut self, next: SelectionState) -> PendingDispatch {
        self.state = DispatcherState::Computing;
        let started = Instant::now();
        let changed = match &self.current {
            Some(previous) => previous.changed_fields(&next),
            None => SelectionField::ALL.into_iter().collect(),
        };
        let targets = self.dependencies.affected(&changed, next.active_tab);
        let selection = Arc::new(next);
        let descriptors: Vec<&ChartDescriptor> = targets
            .iter()
            .filter_map(|id| self.registry.get(id))
            .collect();
        let computed = compute_slots(&self.pipeline, &descriptors, &selection);
        PendingDispatch {
            selection,
            changed,
            computed,
            started,
        }
    }
    /// Publishes prepared slots and makes their selection current.
    pub fn commit(&mut self, pending: PendingDispatch) -> DispatchReport {
        self.generation += 1;
        let generation = self.generation;
        let active = pending.selection.active_tab;
        for (id, slot) in self.slots.iter_mut() {
            let inactive = self.registry.get(id).map(|c| Some(c.tab) != active);
            let touched = pending
                .changed
                .iter()
                .any(|f| self.dependencies.dependents(*f).any(|d| d == id));
            if inactive == Some(true) && touched {
                slot.stale = true;
            }
        }
        let mut recomputed = Vec::with_capacity(pending.computed.len());
        let mut failed = Vec::new();
        for (id, spec) in pending.computed {
            if spec.is_failed() {
                failed.push(id.clone());
            }
            recomputed.push(id.clone());
            self.slots.insert(
                id.clone(),
                ChartSlot {
                    chart: id,
                    spec: Arc::new(spec),
                    generation,
                    stale: false,
                },
            );
        }
        self.current = Some(pending.selection);
        self.state = DispatcherState::Idle;
        let report = DispatchReport {
            generation,
            changed: pending.changed,
            recomputed,
            failed,
            elapsed: pending.started.elapsed(),
        };
        info!(
            generation,
            recomputed = report.recomputed.len(),
            failed = report.failed.len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "dispatch committed"
        );
        report
    }
    /// Drops prepared slots; the current selection stays as it was.
    pub fn abandon(&mut self, pending: PendingDispatch) {
        debug!(
            discarded = pending.computed.len(),
            "superseded dispatch discarded"
        );
        self.state = DispatcherState::Idle;
    }
    pub fn output(&self) -> RenderOutput {
        let Some(selection) = &self.current else {
            return RenderOutput::Fallback("Waiting for the first selection.".to_string());
        };
        let Some(tab) = selection.active_tab else {
            return RenderOutput::Fallback("Select a tab to display charts.".to_string());
        };
        let ids = self.dependencies.tab_charts(tab);
        if ids.is_empty() {
            return RenderOutput::Fallback(format!(
                "No charts are available for the {} tab yet.",
                tab.label()
            ));
        }
        let specs = ids
            .iter()
            .filter_map(|id| self.slots.get(id))
            .map(|slot| slot.spec.clone())
            .collect();
        RenderOutput::Charts { tab, specs }
    }
}

#[cfg(not(feature = "parallel-slots"))]
fn compute_slots(
    pipeline: &ChartPipeline,
    descriptors: &[&ChartDescriptor],
    selection: &Arc<SelectionState>,
) -> Vec<(ChartId, ChartSpec)> {
    descriptors
        .iter()
        .map(|d| (d.id.clone(), pipeline.render(d, selection)))
        .collect()
}

#[cfg(feature = "parallel-slots")]
fn compute_slots(
    pipeline: &ChartPipeline,
    descriptors: &[&ChartDescriptor],
    selection: &Arc<SelectionState>,
) -> Vec<(ChartId, ChartSpec)> {
    use rayon::prelude::*;
    descriptors
        .par_iter()
        .map(|d| (d.id.clone(), pipeline.render(d, selection)))
        .collect()
}

/// Issued by [`SharedDispatcher::ticket`]; a higher ticket supersedes lower ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Last-write-wins serialisation for callers on several threads.
pub struct SharedDispatcher {
    inner: Mutex<Dispatcher>,
    latest: AtomicU64,
}

impl SharedDispatcher {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            inner: Mutex::new(dispatcher),
            latest: AtomicU64::new(0),
        }
    }
    pub fn ticket(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }
    fn is_latest(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
    pub fn trigger(&self, next: SelectionState) -> Option<DispatchReport> {
        let ticket = self.ticket();
        self.run(ticket, next)
    }
    /// `None` when a newer ticket was issued before this one could publish.
    pub fn run(&self, ticket: Ticket, next: SelectionState) -> Option<DispatchReport> {
        let mut dispatcher = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.is_latest(ticket) {
            debug!(ticket = ticket.0, "trigger superseded before start");
            return None;
        }
        let pending = dispatcher.prepare(next);
        if !self.is_latest(ticket) {
            dispatcher.abandon(pending);
            return None;
        }
        Some(dispatcher.commit(pending))
    }
    pub fn output(&self) -> RenderOutput {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .output()
    }
    pub fn selection(&self) -> Option<SelectionState> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .selection()
            .cloned()
    }
}
