//! Consumer-side query state, keyed by domain.
//!
//! Starting a query replaces all prior state wholesale: records, summaries,
//! filter/sort selection, and AI detail expansion. Outcomes that belong to a
//! superseded query are discarded when they arrive.

use tracing::{debug, info, instrument, warn};

use rankscope_shared::{
    AiEngine, AiVisibilityReport, Domain, KeywordReport, MaxPosition, QueryId, RankScopeError,
    Region, Result, SortKey,
};

use crate::export::{CsvExport, CsvQuoting, export_csv};
use crate::query::{Pipelines, QueryOutcome, QueryTicket};
use crate::summary::{AiSummary, KeywordSummary, summarize_ai};
use crate::view::{Expansion, KeywordView, ViewConfig, apply_view};

/// Lifecycle of one pipeline within a query.
#[derive(Debug)]
pub enum PipelineState<T> {
    /// Not requested by this query.
    Idle,
    Pending,
    Ready(T),
    /// The round trip failed; no data is exposed.
    Failed(RankScopeError),
}

impl<T> PipelineState<T> {
    fn for_request(requested: bool) -> Self {
        if requested { Self::Pending } else { Self::Idle }
    }

    fn settle(result: Option<Result<T>>) -> Self {
        match result {
            None => Self::Idle,
            Some(Ok(value)) => Self::Ready(value),
            Some(Err(e)) => Self::Failed(e),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&RankScopeError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// State owned by the current query.
#[derive(Debug)]
pub struct QueryState {
    pub id: QueryId,
    pub domain: Domain,
    pub region: Region,
    pub keywords: PipelineState<KeywordReport>,
    pub ai: PipelineState<AiVisibilityReport>,
    pub view: ViewConfig,
    pub expansion: Expansion,
}

/// Whether an outcome was installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Applied,
    /// The outcome belonged to a superseded query and was dropped.
    Stale,
}

/// The consumer's view of the most recent query.
#[derive(Debug, Default)]
pub struct Session {
    defaults: ViewConfig,
    current: Option<QueryState>,
}

impl Session {
    /// A session whose queries start with `defaults` as filter/sort selection.
    pub fn new(defaults: ViewConfig) -> Self {
        Self {
            defaults,
            current: None,
        }
    }

    /// Start a new query, discarding everything known about the previous one.
    #[instrument(skip_all, fields(%domain, %region, ?pipelines))]
    pub fn begin(&mut self, domain: Domain, region: Region, pipelines: Pipelines) -> QueryTicket {
        let id = QueryId::new();
        if let Some(previous) = &self.current {
            debug!(previous = %previous.id, "replacing previous query state");
        }

        self.current = Some(QueryState {
            id,
            domain: domain.clone(),
            region,
            keywords: PipelineState::for_request(pipelines.keywords()),
            ai: PipelineState::for_request(pipelines.ai()),
            view: self.defaults,
            expansion: Expansion::Collapsed,
        });

        info!(%id, "query started");
        QueryTicket {
            id,
            domain,
            region,
            pipelines,
        }
    }

    /// Install a settled outcome if it belongs to the current query.
    pub fn apply(&mut self, outcome: QueryOutcome) -> Applied {
        let Some(state) = self.current.as_mut().filter(|s| s.id == outcome.id) else {
            debug!(id = %outcome.id, domain = %outcome.domain, "discarding stale query outcome");
            return Applied::Stale;
        };

        state.keywords = PipelineState::settle(outcome.keywords);
        state.ai = PipelineState::settle(outcome.ai);

        for error in [state.keywords.error(), state.ai.error()].into_iter().flatten() {
            warn!(id = %state.id, error = %error, "pipeline failed");
        }
        Applied::Applied
    }

    pub fn current(&self) -> Option<&QueryState> {
        self.current.as_ref()
    }

    /// Whether any pipeline of the current query is still in flight.
    pub fn is_analyzing(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|s| s.keywords.is_pending() || s.ai.is_pending())
    }

    pub fn set_max_position(&mut self, max_position: MaxPosition) {
        if let Some(state) = self.current.as_mut() {
            state.view.max_position = max_position;
        }
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        if let Some(state) = self.current.as_mut() {
            state.view.sort = sort;
        }
    }

    /// Toggle the detail card for `engine` and return the new expansion.
    pub fn select_engine(&mut self, engine: AiEngine) -> Expansion {
        match self.current.as_mut() {
            Some(state) => {
                state.expansion = state.expansion.select(engine);
                state.expansion
            }
            None => Expansion::Collapsed,
        }
    }

    /// The keyword view under the current filter/sort, once records arrived.
    pub fn keyword_view(&self) -> Option<KeywordView<'_>> {
        let state = self.current.as_ref()?;
        let report = state.keywords.ready()?;
        Some(apply_view(&report.keywords, state.view))
    }

    /// Summary of the current keyword view; recomputed on every call.
    pub fn keyword_summary(&self) -> Option<KeywordSummary> {
        self.keyword_view().map(|view| view.summary())
    }

    pub fn ai_summary(&self) -> Option<AiSummary> {
        let report = self.current.as_ref()?.ai.ready()?;
        Some(summarize_ai(&report.results))
    }

    /// Export the current keyword view.
    pub fn export(&self, quoting: CsvQuoting) -> Option<CsvExport> {
        let view = self.keyword_view()?;
        let domain = &self.current.as_ref()?.domain;
        Some(export_csv(view.iter(), domain, quoting))
    }
}
