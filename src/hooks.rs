//! Lifecycle hook chains
//!
//! Application code registers handlers per named event; the engine runs
//! them strictly in registration order, awaiting each one. A handler
//! signals success by returning the (possibly modified) payload and
//! failure by returning an error, which aborts the remaining chain and
//! the surrounding operation. Chains never fan out.

use std::collections::HashMap;
use std::fmt;

use futures_util::future::BoxFuture;
use tracing::trace;

use crate::error::{ModelError, Result};
use crate::query::Query;
use crate::record::Record;

/// Named lifecycle events a handler can attach to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookEvent {
    Init,
    BeforeValidate,
    Validate,
    BeforeCreate,
    Create,
    BeforeSave,
    Save,
    BeforeUpdate,
    Update,
    BeforeDestroy,
    Destroy,
}

impl HookEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookEvent::Init => "init",
            HookEvent::BeforeValidate => "before_validate",
            HookEvent::Validate => "validate",
            HookEvent::BeforeCreate => "before_create",
            HookEvent::Create => "create",
            HookEvent::BeforeSave => "before_save",
            HookEvent::Save => "save",
            HookEvent::BeforeUpdate => "before_update",
            HookEvent::Update => "update",
            HookEvent::BeforeDestroy => "before_destroy",
            HookEvent::Destroy => "destroy",
        }
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The in-flight value a hook chain threads through its handlers
///
/// Mutation hooks (`beforeValidate` through `update`) see the candidate
/// record; `beforeDestroy` sees the query; `destroy` sees the removed
/// records; `init` carries nothing.
#[derive(Debug)]
pub enum HookPayload {
    Record(Record),
    Records(Vec<Record>),
    Query(Query),
    Empty,
}

impl HookPayload {
    pub fn record(&self) -> Option<&Record> {
        match self {
            HookPayload::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn record_mut(&mut self) -> Option<&mut Record> {
        match self {
            HookPayload::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn records(&self) -> Option<&[Record]> {
        match self {
            HookPayload::Records(records) => Some(records),
            _ => None,
        }
    }

    pub fn query(&self) -> Option<&Query> {
        match self {
            HookPayload::Query(query) => Some(query),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            HookPayload::Record(_) => "record",
            HookPayload::Records(_) => "records",
            HookPayload::Query(_) => "query",
            HookPayload::Empty => "empty",
        }
    }

    pub(crate) fn try_into_record(self) -> Result<Record> {
        match self {
            HookPayload::Record(record) => Ok(record),
            other => Err(ModelError::hook(format!(
                "hook replaced the record payload with a {} payload",
                other.kind()
            ))),
        }
    }

    pub(crate) fn try_into_records(self) -> Result<Vec<Record>> {
        match self {
            HookPayload::Records(records) => Ok(records),
            other => Err(ModelError::hook(format!(
                "hook replaced the records payload with a {} payload",
                other.kind()
            ))),
        }
    }

    pub(crate) fn try_into_query(self) -> Result<Query> {
        match self {
            HookPayload::Query(query) => Ok(query),
            other => Err(ModelError::hook(format!(
                "hook replaced the query payload with a {} payload",
                other.kind()
            ))),
        }
    }
}

/// Future type returned by hook handlers
pub type HookFuture = BoxFuture<'static, Result<HookPayload>>;

type Handler = Box<dyn Fn(HookPayload) -> HookFuture + Send + Sync>;

/// Per-event handler registry
#[derive(Default)]
pub struct Hooks {
    handlers: HashMap<HookEvent, Vec<Handler>>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for an event; handlers run in registration order
    pub fn on<F>(&mut self, event: HookEvent, handler: F)
    where
        F: Fn(HookPayload) -> HookFuture + Send + Sync + 'static,
    {
        self.handlers.entry(event).or_default().push(Box::new(handler));
    }

    /// Number of handlers registered for an event
    pub fn count(&self, event: HookEvent) -> usize {
        self.handlers.get(&event).map_or(0, Vec::len)
    }

    /// Run the chain for an event, threading the payload through each
    /// handler in registration order
    ///
    /// The first handler error aborts the chain and is returned verbatim.
    /// An event with no handlers completes immediately with the payload
    /// unchanged.
    pub async fn run(&self, event: HookEvent, mut payload: HookPayload) -> Result<HookPayload> {
        let Some(handlers) = self.handlers.get(&event) else {
            return Ok(payload);
        };

        trace!(event = %event, handlers = handlers.len(), "running hook chain");

        for handler in handlers {
            payload = handler(payload).await?;
        }

        Ok(payload)
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut counts: Vec<(&'static str, usize)> = self
            .handlers
            .iter()
            .map(|(event, handlers)| (event.as_str(), handlers.len()))
            .collect();
        counts.sort_unstable();
        f.debug_struct("Hooks").field("handlers", &counts).finish()
    }
}
