//! One user's render session (made by FontLab https://www.fontlab.com/)
//!
//! The session owns the parameters, the fallback controller (and through it
//! the catalog) and the ledger. Rendering is split in two so a driver can
//! absorb input that arrives while the engine is busy: [`Session::render`]
//! only produces an outcome, [`Session::commit`] publishes it and decides
//! whether it still belongs in history.

use serde::{Deserialize, Serialize};

use crate::catalog::{Step, TypefaceCatalog};
use crate::codec;
use crate::engine::{RenderEngine, RenderRequest};
use crate::error::AsciiLabError;
use crate::fallback::{FallbackController, RenderResult};
use crate::ledger::Ledger;
use crate::params::{
    clamp_preview_size, clamp_text, clamp_width, Layout, RenderParameters, DEFAULT_TYPEFACE,
    FATAL_OUTPUT, PLACEHOLDER_OUTPUT,
};
use crate::probe::TypefaceProbe;
use crate::query::CatalogQuery;
use crate::scheduler::RenderPhase;
use crate::store::KeyValueStore;

/// A user edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Text(String),
    Typeface(String),
    Width(i64),
    AutoWidth(bool),
    PreviewSize(i64),
    HorizontalLayout(Layout),
    VerticalLayout(Layout),
    StepTypeface(Step),
    RandomTypeface,
    /// Replace everything from a shared fragment.
    Restore(String),
    /// Reuse the text and typeface of a history entry.
    FromHistory(usize),
}

/// What one render cycle produced, before it is committed.
#[derive(Debug)]
pub enum CycleOutcome {
    Placeholder,
    Rendered(RenderResult),
    Fatal(AsciiLabError),
}

/// What a presentation layer shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preview {
    pub output: String,
    pub warning: Option<String>,
    pub used_typeface: Option<String>,
    pub busy: bool,
    pub phase: RenderPhase,
    pub preview_size: u8,
}

impl Preview {
    fn idle(preview_size: u8) -> Self {
        Self {
            output: String::new(),
            warning: None,
            used_typeface: None,
            busy: false,
            phase: RenderPhase::Idle,
            preview_size,
        }
    }
}

#[derive(Debug)]
pub struct Session<P, E, S> {
    params: RenderParameters,
    controller: FallbackController<P, E>,
    ledger: Ledger<S>,
    query: CatalogQuery,
    preview: Preview,
}

impl<P, E, S> Session<P, E, S>
where
    P: TypefaceProbe,
    E: RenderEngine,
    S: KeyValueStore,
{
    pub fn new(controller: FallbackController<P, E>, ledger: Ledger<S>) -> Self {
        let params = RenderParameters::default();
        let preview = Preview::idle(params.preview_size);
        Self {
            params,
            controller,
            ledger,
            query: CatalogQuery::new(),
            preview,
        }
    }

    pub fn params(&self) -> &RenderParameters {
        &self.params
    }

    pub fn preview(&self) -> &Preview {
        &self.preview
    }

    pub fn ledger(&self) -> &Ledger<S> {
        &self.ledger
    }

    pub fn controller(&self) -> &FallbackController<P, E> {
        &self.controller
    }

    pub fn catalog(&self) -> &TypefaceCatalog {
        self.controller.catalog()
    }

    /// Shareable encoding of the current parameters.
    pub fn fragment(&self) -> String {
        codec::encode(&self.params)
    }

    /// Offered typefaces under the current search, favorites first.
    pub fn listing(&self) -> Vec<String> {
        self.catalog().listing(&self.query, self.ledger.favorites())
    }

    pub fn set_search(&mut self, search: &str) {
        self.query = self.query.clone().with_search(search);
    }

    pub fn set_query(&mut self, query: CatalogQuery) {
        self.query = query;
    }

    pub async fn toggle_favorite(&mut self, name: &str) -> bool {
        self.ledger.toggle_favorite(name).await
    }

    pub async fn clear_history(&mut self) {
        self.ledger.clear_history().await;
    }

    /// Apply one edit, clamped to the parameter invariants. Returns whether anything changed.
    pub fn apply(&mut self, change: Change) -> bool {
        let before = self.params.clone();
        match change {
            Change::Text(text) => self.params.text = clamp_text(&text),
            Change::Typeface(name) => {
                if self.catalog().is_offered(&name) {
                    self.params.typeface = name;
                } else {
                    tracing::debug!(typeface = %name, "ignoring typeface outside the catalog");
                }
            }
            Change::Width(width) => self.params.width = clamp_width(width),
            Change::AutoWidth(yes) => self.params.auto_width = yes,
            Change::PreviewSize(size) => self.params.preview_size = clamp_preview_size(size),
            Change::HorizontalLayout(layout) => self.params.horizontal_layout = layout,
            Change::VerticalLayout(layout) => self.params.vertical_layout = layout,
            Change::StepTypeface(step) => {
                if let Some(name) = self.catalog().step(
                    &self.params.typeface,
                    step,
                    &self.query,
                    self.ledger.favorites(),
                ) {
                    self.params.typeface = name;
                }
            }
            Change::RandomTypeface => {
                if let Some(name) = self.catalog().random(&mut rand::thread_rng()) {
                    self.params.typeface = name;
                }
            }
            Change::Restore(fragment) => {
                self.params = codec::decode(&fragment);
                self.reset_unlisted_selection();
            }
            Change::FromHistory(index) => {
                if let Some(entry) = self.ledger.entry(index).cloned() {
                    self.params.text = clamp_text(&entry.text);
                    if self.catalog().is_offered(&entry.typeface) {
                        self.params.typeface = entry.typeface;
                    }
                }
            }
        }
        self.preview.preview_size = self.params.preview_size;
        self.params != before
    }

    /// Run one render cycle for `snapshot` without touching history or the preview.
    pub async fn render(&mut self, snapshot: &RenderParameters) -> CycleOutcome {
        if snapshot.text.trim().is_empty() {
            return CycleOutcome::Placeholder;
        }

        match self
            .controller
            .render(&RenderRequest::from_params(snapshot))
            .await
        {
            Ok(result) => CycleOutcome::Rendered(result),
            Err(err) => CycleOutcome::Fatal(err),
        }
    }

    /// Publish an outcome. History is only touched when `snapshot` still
    /// matches the current parameters.
    pub async fn commit(
        &mut self,
        snapshot: &RenderParameters,
        outcome: CycleOutcome,
    ) -> RenderPhase {
        let phase = match outcome {
            CycleOutcome::Placeholder => {
                self.preview.output = PLACEHOLDER_OUTPUT.to_string();
                self.preview.warning = None;
                self.preview.used_typeface = None;
                RenderPhase::Done
            }
            CycleOutcome::Rendered(result) => {
                if self.params == *snapshot {
                    self.ledger
                        .record(&snapshot.text, &result.used_typeface)
                        .await;
                } else {
                    tracing::debug!("parameters moved on during render; history untouched");
                }
                self.preview.output = result.text;
                self.preview.warning = result.warning;
                self.preview.used_typeface = Some(result.used_typeface);
                RenderPhase::Done
            }
            CycleOutcome::Fatal(err) => {
                tracing::debug!(error = %err, "showing failure in preview");
                self.preview.output = FATAL_OUTPUT.to_string();
                self.preview.warning = None;
                self.preview.used_typeface = None;
                RenderPhase::Failed
            }
        };

        self.reset_unlisted_selection();
        self.preview.busy = false;
        self.preview.phase = phase;
        phase
    }

    /// Render the current parameters and commit the outcome in one go.
    pub async fn render_once(&mut self) -> RenderPhase {
        let snapshot = self.params.clone();
        let outcome = self.render(&snapshot).await;
        self.commit(&snapshot, outcome).await
    }

    /// Put a typeface that is not in the catalog up for selection (it will
    /// still be probed before use). Excluded typefaces stay excluded.
    pub fn offer_typeface(&mut self, name: &str) -> bool {
        self.controller.offer(name)
    }

    fn reset_unlisted_selection(&mut self) {
        if !self.catalog().is_offered(&self.params.typeface) {
            tracing::debug!(
                typeface = %self.params.typeface,
                "selection no longer offered; back to default"
            );
            self.params.typeface = DEFAULT_TYPEFACE.to_string();
        }
    }
}
