//! Per-query asynchronous operation handle.
//!
//! A query runs its requested pipelines concurrently on a spawned task. The
//! consumer polls [`QueryHandle::status`] for a loading indicator and awaits
//! [`QueryHandle::join`] for the outcome; no shared mutable flag is involved.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{Instrument, info, info_span};

use rankscope_shared::{
    AiVisibilityReport, Domain, KeywordReport, QueryId, RankScopeError, Region, Result,
};
use rankscope_source::{RecordSource, fetch_ai_report, fetch_keyword_report};

/// Which pipelines a query runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pipelines {
    Keywords,
    Ai,
    #[default]
    Both,
}

impl Pipelines {
    pub fn keywords(self) -> bool {
        matches!(self, Self::Keywords | Self::Both)
    }

    pub fn ai(self) -> bool {
        matches!(self, Self::Ai | Self::Both)
    }
}

/// Everything needed to run one query, issued by [`crate::Session::begin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    pub id: QueryId,
    pub domain: Domain,
    pub region: Region,
    pub pipelines: Pipelines,
}

/// Results of a settled query. A pipeline that was not requested is `None`;
/// each requested pipeline succeeds or fails independently.
#[derive(Debug)]
pub struct QueryOutcome {
    pub id: QueryId,
    pub domain: Domain,
    pub keywords: Option<Result<KeywordReport>>,
    pub ai: Option<Result<AiVisibilityReport>>,
}

/// Observable state of an in-flight query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Pending,
    Settled,
}

/// Handle to a spawned query.
#[derive(Debug)]
pub struct QueryHandle {
    ticket: QueryTicket,
    task: JoinHandle<QueryOutcome>,
}

impl QueryHandle {
    /// Spawn the ticket's pipelines on the current Tokio runtime.
    pub fn spawn(source: Arc<dyn RecordSource>, ticket: QueryTicket) -> Self {
        let span = info_span!("query", id = %ticket.id, domain = %ticket.domain);
        let task_ticket = ticket.clone();
        let task = tokio::spawn(
            async move { run_query(source.as_ref(), &task_ticket).await }.instrument(span),
        );
        Self { ticket, task }
    }

    pub fn id(&self) -> QueryId {
        self.ticket.id
    }

    pub fn domain(&self) -> &Domain {
        &self.ticket.domain
    }

    /// Non-blocking status check.
    pub fn status(&self) -> QueryStatus {
        if self.task.is_finished() {
            QueryStatus::Settled
        } else {
            QueryStatus::Pending
        }
    }

    /// Cancel the query; a later [`join`](Self::join) reports `Cancelled`.
    pub fn abort(&self) {
        self.task.abort();
    }

    /// Wait for the query to settle.
    pub async fn join(self) -> Result<QueryOutcome> {
        let id = self.ticket.id;
        self.task.await.map_err(|e| {
            if e.is_cancelled() {
                RankScopeError::Cancelled(format!("query {id} was superseded"))
            } else {
                RankScopeError::source_unavailable(format!("query {id} task failed: {e}"))
            }
        })
    }
}

/// Run the requested pipelines for a ticket concurrently.
pub async fn run_query(source: &dyn RecordSource, ticket: &QueryTicket) -> QueryOutcome {
    let keywords = async {
        if ticket.pipelines.keywords() {
            Some(fetch_keyword_report(source, &ticket.domain, ticket.region).await)
        } else {
            None
        }
    };
    let ai = async {
        if ticket.pipelines.ai() {
            Some(fetch_ai_report(source, &ticket.domain, ticket.region).await)
        } else {
            None
        }
    };
    let (keywords, ai) = tokio::join!(keywords, ai);

    info!(
        keywords_ok = keywords.as_ref().map(|r| r.is_ok()),
        ai_ok = ai.as_ref().map(|r| r.is_ok()),
        "query settled"
    );

    QueryOutcome {
        id: ticket.id,
        domain: ticket.domain.clone(),
        keywords,
        ai,
    }
}
