//! Host-resolved gateway
//!
//! Requests are recorded and stay pending until the host calls
//! [`ManualGateway::resolve`]. Identifiers registered with
//! [`ManualGateway::provide`] resolve on the next poll without host action.

use crate::error::LoadError;
use crate::gateway::{AssetGateway, LoadCompletion, LoadTicket};
use crate::prototype::VisualPrototype;
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Default)]
pub struct ManualGateway {
    pending: Vec<(LoadTicket, String)>,
    ready: VecDeque<LoadCompletion>,
    provided: HashMap<String, VisualPrototype>,
    next_ticket: u64,
    requests_made: usize,
}

impl ManualGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every future request for `identifier` with `prototype`
    pub fn provide(&mut self, identifier: impl Into<String>, prototype: VisualPrototype) {
        self.provided.insert(identifier.into(), prototype);
    }

    /// Builder form of [`provide`](Self::provide)
    pub fn with_prototype(mut self, identifier: impl Into<String>, prototype: VisualPrototype) -> Self {
        self.provide(identifier, prototype);
        self
    }

    /// Complete a pending request. Returns false if the ticket is unknown.
    pub fn resolve(&mut self, ticket: LoadTicket, result: Result<VisualPrototype, LoadError>) -> bool {
        let Some(pos) = self.pending.iter().position(|(t, _)| *t == ticket) else {
            return false;
        };
        let (ticket, identifier) = self.pending.remove(pos);
        self.ready.push_back(LoadCompletion {
            ticket,
            identifier,
            result,
        });
        true
    }

    /// Fail a pending request
    pub fn reject(&mut self, ticket: LoadTicket, reason: impl Into<String>) -> bool {
        let identifier = self
            .pending
            .iter()
            .find(|(t, _)| *t == ticket)
            .map(|(_, id)| id.clone())
            .unwrap_or_default();
        self.resolve(
            ticket,
            Err(LoadError::Rejected {
                identifier,
                reason: reason.into(),
            }),
        )
    }

    /// Oldest pending ticket for `identifier`
    pub fn pending_ticket(&self, identifier: &str) -> Option<LoadTicket> {
        self.pending
            .iter()
            .find(|(_, id)| id == identifier)
            .map(|(t, _)| *t)
    }

    /// Total requests received so far
    pub fn requests_made(&self) -> usize {
        self.requests_made
    }
}

impl AssetGateway for ManualGateway {
    fn request(&mut self, identifier: &str) -> LoadTicket {
        self.next_ticket += 1;
        self.requests_made += 1;
        let ticket = LoadTicket(self.next_ticket);
        self.pending.push((ticket, identifier.to_string()));
        ticket
    }

    fn poll(&mut self) -> Vec<LoadCompletion> {
        let auto: Vec<_> = self
            .pending
            .iter()
            .filter_map(|(ticket, id)| self.provided.get(id).map(|p| (*ticket, p.clone())))
            .collect();
        for (ticket, proto) in auto {
            self.resolve(ticket, Ok(proto));
        }

        self.ready.drain(..).collect()
    }

    fn pending_count(&self) -> usize {
        self.pending.len() + self.ready.len()
    }
}
