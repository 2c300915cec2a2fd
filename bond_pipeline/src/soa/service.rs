//! Keyed service contract and the generic store behind every service.
//!
//! A service maps a string key to exactly one current value. `on_message` is an
//! upsert: the first value seen for a key fires `process_add` on every
//! registered listener, later values for the same key fire `process_update`.
//! Listeners are notified in registration order, after the store is updated.
use std::collections::HashMap;
use std::collections::hash_map::Entry;

use bond_common::{Result, TradingError};

use crate::soa::listener::ServiceListener;

/// Values that carry their own store key.
pub trait Keyed {
    /// Natural key of the value (product id, trade id, inquiry id).
    fn key(&self) -> String;
}

/// Values with an ordered string rendering, used by the historical sinks.
pub trait Persistable: Keyed {
    /// Fields in output order.
    fn fields(&self) -> Vec<String>;
}

/// Capability set of a business service keyed on `K` holding values `V`.
pub trait Service<K: ?Sized, V> {
    /// Boundary adapter of this service.
    type Connector;

    /// Current value for `key`; fails with [`TradingError::NotFound`] when absent.
    fn get_data(&self, key: &K) -> Result<&V>;

    /// Sole ingestion path: upsert `data` and notify listeners.
    fn on_message(&mut self, data: V) -> Result<()>;

    /// Register a downstream observer. Registration is permanent.
    fn add_listener(&mut self, listener: Box<dyn ServiceListener<V>>);

    /// Registered observers in registration order.
    fn listeners(&self) -> &[Box<dyn ServiceListener<V>>];

    /// The service's connector.
    fn connector(&self) -> &Self::Connector;
}

/// Generic keyed store plus listener registry.
pub struct ServiceStore<V> {
    name: &'static str,
    data: HashMap<String, V>,
    listeners: Vec<Box<dyn ServiceListener<V>>>,
}

impl<V: Keyed> ServiceStore<V> {
    /// Create an empty store; `name` appears in lookup errors and logs.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            data: HashMap::new(),
            listeners: Vec::new(),
        }
    }

    /// Owning service name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Look up the current value for `key`.
    pub fn get(&self, key: &str) -> Result<&V> {
        self.data.get(key).ok_or_else(|| TradingError::NotFound {
            service: self.name,
            key: key.to_string(),
        })
    }

    /// Whether a value is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when nothing has been ingested yet.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate over the stored values in no particular order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.data.values()
    }

    /// Store `value` under its key, then notify every listener.
    pub fn upsert(&mut self, value: V) -> Result<()> {
        let (fresh, stored) = match self.data.entry(value.key()) {
            Entry::Occupied(mut slot) => {
                slot.insert(value);
                (false, slot.into_mut())
            }
            Entry::Vacant(slot) => (true, slot.insert(value)),
        };
        for listener in self.listeners.iter_mut() {
            if fresh {
                listener.process_add(stored)?;
            } else {
                listener.process_update(stored)?;
            }
        }
        Ok(())
    }

    /// Append a listener.
    pub fn add_listener(&mut self, listener: Box<dyn ServiceListener<V>>) {
        self.listeners.push(listener);
    }

    /// Registered listeners.
    pub fn listeners(&self) -> &[Box<dyn ServiceListener<V>>] {
        &self.listeners
    }
}

/// Implement [`Service`] for a struct with `store: ServiceStore<V>` and
/// `connector: C` fields.
macro_rules! keyed_service {
    ($service:ty, $value:ty, $connector:ty) => {
        impl $crate::soa::service::Service<str, $value> for $service {
            type Connector = $connector;

            fn get_data(&self, key: &str) -> bond_common::Result<&$value> {
                self.store.get(key)
            }

            fn on_message(&mut self, data: $value) -> bond_common::Result<()> {
                self.store.upsert(data)
            }

            fn add_listener(&mut self, listener: Box<dyn $crate::soa::listener::ServiceListener<$value>>) {
                self.store.add_listener(listener);
            }

            fn listeners(&self) -> &[Box<dyn $crate::soa::listener::ServiceListener<$value>>] {
                self.store.listeners()
            }

            fn connector(&self) -> &$connector {
                &self.connector
            }
        }
    };
}

pub(crate) use keyed_service;

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    struct Tick {
        id: &'static str,
        level: u32,
    }

    impl Keyed for Tick {
        fn key(&self) -> String {
            self.id.to_string()
        }
    }

    type Journal = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        tag: &'static str,
        journal: Journal,
    }

    impl ServiceListener<Tick> for Recorder {
        fn process_add(&mut self, data: &Tick) -> Result<()> {
            let entry = format!("{} add {}={}", self.tag, data.id, data.level);
            self.journal.borrow_mut().push(entry);
            Ok(())
        }

        fn process_update(&mut self, data: &Tick) -> Result<()> {
            let entry = format!("{} update {}={}", self.tag, data.id, data.level);
            self.journal.borrow_mut().push(entry);
            Ok(())
        }
    }

    fn store_with(tags: &[&'static str]) -> (ServiceStore<Tick>, Journal) {
        let journal: Journal = Rc::default();
        let mut store = ServiceStore::new("ticks");
        for &tag in tags {
            store.add_listener(Box::new(Recorder {
                tag,
                journal: journal.clone(),
            }));
        }
        (store, journal)
    }

    #[test]
    fn missing_key_is_not_found() {
        let (store, _) = store_with(&[]);
        assert!(matches!(
            store.get("nope"),
            Err(TradingError::NotFound {
                service: "ticks",
                ..
            })
        ));
    }

    #[test]
    fn upsert_keeps_last_write() {
        let (mut store, _) = store_with(&[]);
        store.upsert(Tick { id: "a", level: 1 }).unwrap();
        store.upsert(Tick { id: "a", level: 2 }).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a").unwrap().level, 2);
    }

    #[test]
    fn fans_out_in_registration_order_with_add_then_update() {
        let (mut store, journal) = store_with(&["first", "second", "third"]);
        store.upsert(Tick { id: "a", level: 1 }).unwrap();
        store.upsert(Tick { id: "a", level: 2 }).unwrap();
        assert_eq!(
            *journal.borrow(),
            vec![
                "first add a=1",
                "second add a=1",
                "third add a=1",
                "first update a=2",
                "second update a=2",
                "third update a=2",
            ]
        );
    }

    #[test]
    fn duplicate_registration_notifies_twice() {
        let journal: Journal = Rc::default();
        let mut store = ServiceStore::new("ticks");
        for _ in 0..2 {
            store.add_listener(Box::new(Recorder {
                tag: "same",
                journal: journal.clone(),
            }));
        }
        store.upsert(Tick { id: "b", level: 9 }).unwrap();
        assert_eq!(journal.borrow().len(), 2);
        assert_eq!(store.listeners().len(), 2);
    }
}
