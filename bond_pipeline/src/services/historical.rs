//! Historical persistence: terminal sinks that append values to flat logs.
//!
//! One `HistoricalDataService` exists per sink kind. Each owns exactly one
//! bound listener, which upstream services register, and one connector, which
//! appends a line per persisted value to the kind's file:
//!
//! ```text
//! 2024-01-02 03:04:05.007 ,91282CJL6,TRSY1,1000000,1000000,
//! ```
//!
//! Under the default [`PersistPolicy::FirstArrival`] only the first value seen
//! for a key is written; updates are ignored.
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use bond_common::clock::timestamp;
use bond_common::files::{
    EXECUTIONS_SINK, INQUIRIES_SINK, POSITIONS_SINK, RISK_SINK, STREAMING_SINK,
};
use bond_common::{Result, TradingError};
use crossbeam_channel::Sender;
use log::{debug, info};
use strum_macros::Display;

use crate::soa::connector::{Connector, FeedStats};
use crate::soa::inbox::{Inbox, Node};
use crate::soa::listener::{ServiceListener, deliver};
use crate::soa::service::{Persistable, Service, ServiceStore};

/// Which log a sink writes to.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum SinkKind {
    Position,
    Risk,
    Execution,
    Streaming,
    Inquiry,
}

impl SinkKind {
    /// File name of the sink's log.
    pub fn file_name(self) -> &'static str {
        match self {
            SinkKind::Position => POSITIONS_SINK,
            SinkKind::Risk => RISK_SINK,
            SinkKind::Execution => EXECUTIONS_SINK,
            SinkKind::Streaming => STREAMING_SINK,
            SinkKind::Inquiry => INQUIRIES_SINK,
        }
    }
}

/// Which upstream events are persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PersistPolicy {
    /// Only the first value seen for each key.
    #[default]
    FirstArrival,
    /// Every add and every update.
    EveryChange,
}

/// Terminal sink service for values of type `V`.
pub struct HistoricalDataService<V: Persistable + Clone + 'static> {
    kind: SinkKind,
    store: ServiceStore<V>,
    inbox: Inbox<V>,
    connector: HistoricalConnector<V>,
    listener: HistoricalListener<V>,
}

impl<V: Persistable + Clone + 'static> HistoricalDataService<V> {
    /// Sink of `kind` writing under `dir`, persisting first arrivals only.
    pub fn new(kind: SinkKind, dir: &Path) -> Self {
        Self::with_policy(kind, dir, PersistPolicy::default())
    }

    /// Sink of `kind` writing under `dir` with an explicit policy.
    pub fn with_policy(kind: SinkKind, dir: &Path, policy: PersistPolicy) -> Self {
        let inbox = Inbox::default();
        let listener = HistoricalListener {
            target: inbox.sender(),
            policy,
        };
        Self {
            kind,
            store: ServiceStore::new("historical"),
            inbox,
            connector: HistoricalConnector::new(dir.join(kind.file_name())),
            listener,
        }
    }

    /// Sink kind.
    pub fn kind(&self) -> SinkKind {
        self.kind
    }

    /// The bound listener; register it on the upstream service.
    pub fn listener(&self) -> HistoricalListener<V> {
        self.listener.clone()
    }

    /// Append `data` to the sink's log.
    pub fn persist_data(&mut self, key: &str, data: &V) -> Result<()> {
        debug!("persist {} {}", self.kind, key);
        self.connector.publish(data)
    }

    /// Lines written so far.
    pub fn written(&self) -> usize {
        self.connector.written
    }
}

impl<V: Persistable + Clone + 'static> Service<str, V> for HistoricalDataService<V> {
    type Connector = HistoricalConnector<V>;

    fn get_data(&self, key: &str) -> Result<&V> {
        self.store.get(key)
    }

    fn on_message(&mut self, data: V) -> Result<()> {
        self.store.upsert(data)
    }

    fn add_listener(&mut self, listener: Box<dyn ServiceListener<V>>) {
        self.store.add_listener(listener);
    }

    fn listeners(&self) -> &[Box<dyn ServiceListener<V>>] {
        self.store.listeners()
    }

    fn connector(&self) -> &HistoricalConnector<V> {
        &self.connector
    }
}

impl<V: Persistable + Clone + 'static> Node for HistoricalDataService<V> {
    type Message = V;

    fn name(&self) -> &'static str {
        self.kind.file_name()
    }

    fn inbox(&self) -> &Inbox<V> {
        &self.inbox
    }

    fn handle(&mut self, data: V) -> Result<()> {
        let key = data.key();
        self.on_message(data.clone())?;
        self.persist_data(&key, &data)
    }
}

/// Upstream adapter bound to one historical sink.
pub struct HistoricalListener<V> {
    target: Sender<V>,
    policy: PersistPolicy,
}

impl<V> Clone for HistoricalListener<V> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            policy: self.policy,
        }
    }
}

impl<V: Clone> ServiceListener<V> for HistoricalListener<V> {
    fn process_add(&mut self, data: &V) -> Result<()> {
        deliver(&self.target, "historical", data.clone())
    }

    fn process_update(&mut self, data: &V) -> Result<()> {
        match self.policy {
            PersistPolicy::FirstArrival => Ok(()),
            PersistPolicy::EveryChange => deliver(&self.target, "historical", data.clone()),
        }
    }
}

/// Appends one timestamped line per value to the sink file.
///
/// The file is opened in append mode on the first write and flushed after
/// every line.
pub struct HistoricalConnector<V> {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    written: usize,
    _value: PhantomData<fn(&V)>,
}

impl<V> HistoricalConnector<V> {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            writer: None,
            written: 0,
            _value: PhantomData,
        }
    }

    /// Path of the sink file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sink_error(&self, source: std::io::Error) -> TradingError {
        TradingError::Sink {
            path: self.path.clone(),
            source,
        }
    }

    fn writer(&mut self) -> Result<&mut BufWriter<File>> {
        let writer = match self.writer.take() {
            Some(writer) => writer,
            None => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.path)
                    .map_err(|e| self.sink_error(e))?;
                info!("opened sink {}", self.path.display());
                BufWriter::new(file)
            }
        };
        Ok(self.writer.insert(writer))
    }
}

/// Render `fields` as a sink line: timestamp, then every field followed by a comma.
pub fn sink_line(stamp: &str, fields: &[String]) -> String {
    let mut line = format!("{},", stamp);
    for field in fields {
        line.push_str(field);
        line.push(',');
    }
    line.push('\n');
    line
}

impl<V: Persistable> Connector<V> for HistoricalConnector<V> {
    fn publish(&mut self, data: &V) -> Result<()> {
        let line = sink_line(&timestamp(), &data.fields());
        let writer = self.writer()?;
        let outcome = writer.write_all(line.as_bytes()).and_then(|_| writer.flush());
        outcome.map_err(|e| self.sink_error(e))?;
        self.written += 1;
        Ok(())
    }

    fn subscribe(
        &mut self,
        _source: &mut dyn BufRead,
        _settle: &mut dyn FnMut() -> Result<()>,
    ) -> Result<FeedStats> {
        Ok(FeedStats::default())
    }
}
