//! Middleware dispatch engine
//!
//! Each packet code routes to an ordered chain of policy steps. A step sees
//! the request and a mutable response shell (header copied from the request,
//! code set by policy) and decides how the chain proceeds.

use radius_wire::{Code, Packet};
use std::collections::HashMap;
use tracing::debug;

/// Chain progression returned by a policy step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Proceed to the next step; reaching the end of the chain sends the response
    Continue,
    /// Stop the chain without dropping: the response as built so far is final
    Accept,
    /// Stop immediately and drop the exchange; nothing is transmitted
    Drop,
}

/// A single unit of request-handling policy
///
/// This is the only extension point for authentication/accounting business
/// logic. Closures with the matching signature implement it directly.
pub trait PolicyStep: Send + Sync {
    fn handle(&self, request: &Packet, response: &mut Packet) -> Flow;
}

impl<F> PolicyStep for F
where
    F: Fn(&Packet, &mut Packet) -> Flow + Send + Sync,
{
    fn handle(&self, request: &Packet, response: &mut Packet) -> Flow {
        self(request, response)
    }
}

/// Observability hook, invoked with the request and the response shell
pub type Hook = Box<dyn Fn(&Packet, &Packet) + Send + Sync>;

/// Terminal outcome of dispatching one datagram
#[derive(Debug)]
pub enum Outcome {
    /// Response ready for encode + authenticate + transmit
    Sent(Packet),
    /// Exchange silently dropped; peers retransmit on timeout
    Dropped,
}

/// Routes packets by code to their policy chains
#[derive(Default)]
pub struct Dispatcher {
    routes: HashMap<Code, Vec<Box<dyn PolicyStep>>>,
    on_drop: Option<Hook>,
    on_reply: Option<Hook>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a policy step to the chain for `code`
    pub fn route(&mut self, code: Code, step: impl PolicyStep + 'static) -> &mut Self {
        self.routes.entry(code).or_default().push(Box::new(step));
        self
    }

    /// Register a hook invoked whenever a policy step drops an exchange
    pub fn on_drop(&mut self, hook: impl Fn(&Packet, &Packet) + Send + Sync + 'static) -> &mut Self {
        self.on_drop = Some(Box::new(hook));
        self
    }

    /// Register a hook invoked after a response has been transmitted
    pub fn on_reply(&mut self, hook: impl Fn(&Packet, &Packet) + Send + Sync + 'static) -> &mut Self {
        self.on_reply = Some(Box::new(hook));
        self
    }

    /// Evaluate the policy chain for one decoded request
    ///
    /// No route for the packet code is a silent drop. Within the chain,
    /// [`Flow::Drop`] wins immediately, [`Flow::Accept`] stops evaluation
    /// with the response as built, and running off the end sends whatever
    /// the chain produced.
    pub fn dispatch(&self, request: &Packet) -> Outcome {
        let Some(chain) = self.routes.get(&request.code) else {
            debug!(
                packet_type = %request.code,
                request_id = request.identifier,
                "no policy chain registered, dropping"
            );
            return Outcome::Dropped;
        };

        let mut response = request.response_shell();
        for step in chain {
            match step.handle(request, &mut response) {
                Flow::Continue => {}
                Flow::Accept => break,
                Flow::Drop => {
                    debug!(
                        packet_type = %request.code,
                        request_id = request.identifier,
                        "policy chain dropped request"
                    );
                    if let Some(hook) = &self.on_drop {
                        hook(request, &response);
                    }
                    return Outcome::Dropped;
                }
            }
        }

        Outcome::Sent(response)
    }

    /// Invoke the reply hook; called by the transport after a successful send
    pub fn notify_reply(&self, request: &Packet, response: &Packet) {
        if let Some(hook) = &self.on_reply {
            hook(request, response);
        }
    }
}
