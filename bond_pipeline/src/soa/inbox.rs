//! Inbound channels and the pump that drains them.
//!
//! Every service owns an `Inbox` (an unbounded crossbeam channel). Connectors
//! and upstream listeners only ever send into it; the service consumes it in
//! `Node::handle`. The composition root calls `Pump::pump` on each service in
//! topological order until no inbox has pending messages, so one inbound
//! record is fully propagated before the next one is read.
use bond_common::Result;
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::trace;

/// Unbounded single-consumer inbox.
pub struct Inbox<M> {
    tx: Sender<M>,
    rx: Receiver<M>,
}

impl<M> Default for Inbox<M> {
    fn default() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }
}

impl<M> Inbox<M> {
    /// A new sending handle.
    pub fn sender(&self) -> Sender<M> {
        self.tx.clone()
    }

    /// Messages waiting to be handled.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    fn receiver(&self) -> Receiver<M> {
        self.rx.clone()
    }
}

/// A service that consumes messages from its inbox.
pub trait Node {
    /// Inbound message type; may differ from the stored value type.
    type Message;

    /// Service name for logs.
    fn name(&self) -> &'static str;

    /// The service's inbox.
    fn inbox(&self) -> &Inbox<Self::Message>;

    /// Consume one message.
    fn handle(&mut self, message: Self::Message) -> Result<()>;
}

/// Object-safe view of a node used by the composition root.
pub trait Pump {
    /// Handle every pending message, including ones enqueued while handling.
    /// Returns the number of messages handled.
    fn pump(&mut self) -> Result<usize>;
}

impl<N: Node> Pump for N {
    fn pump(&mut self) -> Result<usize> {
        let rx = self.inbox().receiver();
        let mut handled = 0;
        while let Ok(message) = rx.try_recv() {
            self.handle(message)?;
            handled += 1;
        }
        if handled > 0 {
            trace!("{} handled {} messages", self.name(), handled);
        }
        Ok(handled)
    }
}
