//! Listener contract and the relay adapter that bridges two services.
use std::marker::PhantomData;

use bond_common::{Result, TradingError};
use crossbeam_channel::Sender;

/// Observer invoked by a service on add, update and remove events.
///
/// Adapters implement only the events meaningful to their wiring; the rest
/// default to no-ops.
pub trait ServiceListener<V> {
    /// A key was seen for the first time.
    fn process_add(&mut self, data: &V) -> Result<()>;

    /// A key was removed. No service in this system removes keys.
    fn process_remove(&mut self, _data: &V) -> Result<()> {
        Ok(())
    }

    /// An existing key received a new value.
    fn process_update(&mut self, _data: &V) -> Result<()> {
        Ok(())
    }
}

/// Send `message` into a downstream inbox.
pub(crate) fn deliver<M>(target: &Sender<M>, to: &'static str, message: M) -> Result<()> {
    target
        .send(message)
        .map_err(|_| TradingError::ChannelSend(format!("{} inbox closed", to)))
}

/// Listener that translates each added or updated `V` into a message for
/// another service's inbox.
pub struct Relay<V, M> {
    target: Sender<M>,
    to: &'static str,
    translate: fn(&V) -> M,
    _upstream: PhantomData<fn(&V)>,
}

impl<V, M> Relay<V, M> {
    /// Build a relay into `target`, labelled `to` in errors.
    pub fn new(target: Sender<M>, to: &'static str, translate: fn(&V) -> M) -> Self {
        Self {
            target,
            to,
            translate,
            _upstream: PhantomData,
        }
    }
}

impl<V, M> ServiceListener<V> for Relay<V, M> {
    fn process_add(&mut self, data: &V) -> Result<()> {
        deliver(&self.target, self.to, (self.translate)(data))
    }

    fn process_update(&mut self, data: &V) -> Result<()> {
        deliver(&self.target, self.to, (self.translate)(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn relays_adds_and_updates_but_not_removes() {
        let (tx, rx) = unbounded::<u32>();
        let mut relay: Relay<u32, u32> = Relay::new(tx, "doubler", |v| v * 2);
        relay.process_add(&1).unwrap();
        relay.process_update(&2).unwrap();
        relay.process_remove(&3).unwrap();
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![2, 4]);
    }

    #[test]
    fn closed_inbox_is_a_channel_error() {
        let (tx, rx) = unbounded::<u32>();
        drop(rx);
        let mut relay: Relay<u32, u32> = Relay::new(tx, "gone", |v| *v);
        assert!(matches!(relay.process_add(&1), Err(TradingError::ChannelSend(_))));
    }
}
