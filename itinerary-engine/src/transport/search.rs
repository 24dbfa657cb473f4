//! Route search lifecycle.
//!
//! A view issuing searches needs to tell "not searched yet" from "searched,
//! nothing found", and must ignore results that arrive after it started a
//! newer search or lost interest. `RouteSearch` tracks both with tickets.

use serde::Serialize;
use tracing::debug;

use crate::domain::TransportOption;

use super::matcher::{RouteFinder, TransportMatcher};
use super::query::{Endpoint, SearchError};

/// Where a route search stands.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", content = "options", rename_all = "kebab-case")]
pub enum SearchState {
    #[default]
    NotSearched,
    Searching,
    /// Finished; the list may be empty.
    Searched(Vec<TransportOption>),
    Failed(String),
}

impl SearchState {
    pub fn options(&self) -> Option<&[TransportOption]> {
        match self {
            SearchState::Searched(options) => Some(options),
            _ => None,
        }
    }
}

/// Identifies one issued search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Search state for one view, with late-result discard.
#[derive(Debug, Default)]
pub struct RouteSearch {
    state: SearchState,
    generation: u64,
}

impl RouteSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Start a search. Any outstanding ticket becomes stale.
    pub fn begin(&mut self) -> Ticket {
        self.generation += 1;
        self.state = SearchState::Searching;
        Ticket(self.generation)
    }

    /// Stop caring about the outstanding search.
    pub fn abandon(&mut self) {
        self.generation += 1;
        if self.state == SearchState::Searching {
            self.state = SearchState::NotSearched;
        }
    }

    /// Deliver a result. Returns `false` and changes nothing if the ticket
    /// is stale.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<TransportOption>, SearchError>,
    ) -> bool {
        if ticket.0 != self.generation {
            debug!(ticket = ticket.0, current = self.generation, "discarding stale route result");
            return false;
        }

        self.state = match result {
            Ok(options) => SearchState::Searched(options),
            Err(e) => SearchState::Failed(e.to_string()),
        };
        true
    }

    /// Begin, run and complete one search.
    pub async fn run<F: RouteFinder>(
        &mut self,
        matcher: &TransportMatcher<'_, F>,
        origin: &Endpoint,
        destination: &Endpoint,
    ) -> &SearchState {
        let ticket = self.begin();
        let result = matcher.find_routes(origin, destination).await;
        self.complete(ticket, result);
        &self.state
    }
}
