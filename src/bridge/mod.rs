//! The narrow contract to the project/task backend.
//!
//! Requests are queued in an outbox the host drains and ships; the host feeds
//! the backend's replies back in as [`BackendEvent`]s. The core never blocks
//! on a reply and never retries.

pub mod event;
pub mod request;

pub use event::{BackendEvent, Created};
pub use request::Request;

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub request_id: RequestId,
    pub request: Request,
}

#[derive(Debug, Default)]
pub struct CommandBridge {
    next_id: u64,
    outbox: VecDeque<Envelope>,
    in_flight: HashMap<RequestId, Request>,
}

impl CommandBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a request and return the id its reply will carry.
    pub fn send(&mut self, request: Request) -> RequestId {
        self.next_id += 1;
        let request_id = RequestId(self.next_id);
        log::info!("request {} {}", request_id, request.name());
        self.in_flight.insert(request_id, request.clone());
        self.outbox.push_back(Envelope {
            request_id,
            request,
        });
        request_id
    }

    /// Hand every queued request to the host, oldest first.
    pub fn drain(&mut self) -> Vec<Envelope> {
        self.outbox.drain(..).collect()
    }

    /// Requests queued but not yet drained.
    pub fn pending(&self) -> impl Iterator<Item = &Envelope> {
        self.outbox.iter()
    }

    /// Mark a request as answered, returning it if it was still outstanding.
    pub fn settle(&mut self, request_id: RequestId) -> Option<Request> {
        self.in_flight.remove(&request_id)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_in_flight(&self, request_id: RequestId) -> bool {
        self.in_flight.contains_key(&request_id)
    }
}
