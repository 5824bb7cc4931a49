//! The gateway contract between the scene and whatever resolves assets

use crate::error::LoadError;
use crate::prototype::VisualPrototype;

/// Identifies one request made through a gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadTicket(pub u64);

/// Outcome of one request
#[derive(Debug)]
pub struct LoadCompletion {
    /// Ticket returned by [`AssetGateway::request`]
    pub ticket: LoadTicket,
    /// Identifier that was requested
    pub identifier: String,
    /// The prototype, or why it could not be produced
    pub result: Result<VisualPrototype, LoadError>,
}

/// Asynchronous producer of visual prototypes.
///
/// `request` only enqueues. Results surface through `poll`, so callers never
/// observe a completion inside the call that asked for it.
pub trait AssetGateway {
    /// Ask for the prototype named `identifier`
    fn request(&mut self, identifier: &str) -> LoadTicket;

    /// Drain every completion that is ready
    fn poll(&mut self) -> Vec<LoadCompletion>;

    /// Number of requests not yet completed
    fn pending_count(&self) -> usize;
}

impl<G: AssetGateway + ?Sized> AssetGateway for Box<G> {
    fn request(&mut self, identifier: &str) -> LoadTicket {
        (**self).request(identifier)
    }

    fn poll(&mut self) -> Vec<LoadCompletion> {
        (**self).poll()
    }

    fn pending_count(&self) -> usize {
        (**self).pending_count()
    }
}
