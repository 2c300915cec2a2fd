//! Composition root: builds every service once, wires the listener graph and
//! drives the four input feeds through it.
//!
//! Wiring:
//!
//! ```text
//! pricing ──► algo streaming ──► streaming ──► historical(STREAMING)
//!    └──────► gui
//! market data ──► algo execution ──► execution ──► trade booking ──► position ──► risk ──► historical(RISK)
//!                                        └──► historical(EXECUTION)       └──► historical(POSITION)
//! inquiry ──► historical(INQUIRY)
//! ```
//!
//! Propagation runs through per-service inboxes. After every record a
//! connector delivers, [`TradingSystem::settle`] pumps the inboxes in
//! topological order until all of them are empty.
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::time::Duration;

use bond_common::Result;
use bond_common::files::{INQUIRIES_FILE, MARKET_DATA_FILE, PRICES_FILE, TRADES_FILE};
use log::info;
use serde::Serialize;
use strum_macros::Display;

use crate::model::{ExecutionOrder, Inquiry, Position, PriceStream, Pv01};
use crate::services::gui::{DEFAULT_MAX_UPDATES, DEFAULT_THROTTLE};
use crate::services::{
    AlgoExecutionService, AlgoStreamingService, ExecutionService, GuiService,
    HistoricalDataService, InquiryService, MarketDataService, PositionService, PricingService,
    RiskService, SinkKind, StreamingService, TradeBookingService,
};
use crate::soa::{Connector, FeedStats, Pump, Service};

/// Run-time settings of the pipeline.
#[derive(Debug, Clone)]
pub struct SystemConfig {
    /// Directory holding the input feeds and the sink logs.
    pub data_dir: PathBuf,
    /// Minimum gap between GUI ticks.
    pub gui_throttle: Duration,
    /// Cap on GUI ticks.
    pub gui_max_updates: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            gui_throttle: DEFAULT_THROTTLE,
            gui_max_updates: DEFAULT_MAX_UPDATES,
        }
    }
}

/// Input feeds in ingestion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Feed {
    /// `prices.txt`
    #[strum(serialize = "Price data")]
    Prices,
    /// `trades.txt`
    #[strum(serialize = "Trade data")]
    Trades,
    /// `marketdata.txt`
    #[strum(serialize = "Market data")]
    MarketData,
    /// `inquiries.txt`
    #[strum(serialize = "Inquiry data")]
    Inquiries,
}

impl Feed {
    /// Fixed ingestion sequence.
    pub const ORDER: [Feed; 4] = [Feed::Prices, Feed::Trades, Feed::MarketData, Feed::Inquiries];

    /// File name of the feed.
    pub fn file_name(self) -> &'static str {
        match self {
            Feed::Prices => PRICES_FILE,
            Feed::Trades => TRADES_FILE,
            Feed::MarketData => MARKET_DATA_FILE,
            Feed::Inquiries => INQUIRIES_FILE,
        }
    }
}

/// End-of-run counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Subscribe statistics per feed.
    pub feeds: BTreeMap<String, FeedStats>,
    /// Distinct keys or published values per service.
    pub services: BTreeMap<&'static str, u64>,
    /// Lines appended per sink file.
    pub sinks: BTreeMap<&'static str, usize>,
}

/// Every service of the trading system, wired together.
pub struct TradingSystem {
    config: SystemConfig,
    pricing: PricingService,
    gui: GuiService,
    algo_streaming: AlgoStreamingService,
    streaming: StreamingService,
    market_data: MarketDataService,
    algo_execution: AlgoExecutionService,
    execution: ExecutionService,
    trade_booking: TradeBookingService,
    position: PositionService,
    risk: RiskService,
    inquiry: InquiryService,
    historical_position: HistoricalDataService<Position>,
    historical_risk: HistoricalDataService<Pv01>,
    historical_execution: HistoricalDataService<ExecutionOrder>,
    historical_streaming: HistoricalDataService<PriceStream>,
    historical_inquiry: HistoricalDataService<Inquiry>,
}

impl TradingSystem {
    /// Instantiate every service. Call [`TradingSystem::link`] before ingesting.
    pub fn new(config: SystemConfig) -> Self {
        let dir = config.data_dir.as_path();
        Self {
            pricing: PricingService::default(),
            gui: GuiService::new(config.gui_throttle, config.gui_max_updates),
            algo_streaming: AlgoStreamingService::default(),
            streaming: StreamingService::default(),
            market_data: MarketDataService::default(),
            algo_execution: AlgoExecutionService::default(),
            execution: ExecutionService::default(),
            trade_booking: TradeBookingService::default(),
            position: PositionService::default(),
            risk: RiskService::default(),
            inquiry: InquiryService::default(),
            historical_position: HistoricalDataService::new(SinkKind::Position, dir),
            historical_risk: HistoricalDataService::new(SinkKind::Risk, dir),
            historical_execution: HistoricalDataService::new(SinkKind::Execution, dir),
            historical_streaming: HistoricalDataService::new(SinkKind::Streaming, dir),
            historical_inquiry: HistoricalDataService::new(SinkKind::Inquiry, dir),
            config,
        }
    }

    /// Register every listener. Calling this twice registers everything twice.
    pub fn link(&mut self) {
        self.pricing.add_listener(Box::new(self.algo_streaming.listener()));
        self.pricing.add_listener(Box::new(self.gui.listener()));
        self.algo_streaming.add_listener(Box::new(self.streaming.listener()));
        self.streaming.add_listener(Box::new(self.historical_streaming.listener()));
        self.market_data.add_listener(Box::new(self.algo_execution.listener()));
        self.algo_execution.add_listener(Box::new(self.execution.listener()));
        self.execution.add_listener(Box::new(self.trade_booking.listener()));
        self.execution.add_listener(Box::new(self.historical_execution.listener()));
        self.trade_booking.add_listener(Box::new(self.position.listener()));
        self.position.add_listener(Box::new(self.risk.listener()));
        self.position.add_listener(Box::new(self.historical_position.listener()));
        self.risk.add_listener(Box::new(self.historical_risk.listener()));
        self.inquiry.add_listener(Box::new(self.historical_inquiry.listener()));
        info!("services linked");
    }

    /// Drain every inbox, upstream first, until nothing is pending.
    pub fn settle(&mut self) -> Result<()> {
        loop {
            let nodes: [&mut dyn Pump; 16] = [
                &mut self.pricing,
                &mut self.gui,
                &mut self.algo_streaming,
                &mut self.streaming,
                &mut self.historical_streaming,
                &mut self.market_data,
                &mut self.algo_execution,
                &mut self.execution,
                &mut self.historical_execution,
                &mut self.trade_booking,
                &mut self.position,
                &mut self.historical_position,
                &mut self.risk,
                &mut self.historical_risk,
                &mut self.inquiry,
                &mut self.historical_inquiry,
            ];
            let mut handled = 0;
            for node in nodes {
                handled += node.pump()?;
            }
            if handled == 0 {
                return Ok(());
            }
        }
    }

    /// Feed `source` through the connector of the service that owns `feed`.
    pub fn ingest(&mut self, feed: Feed, source: &mut dyn BufRead) -> Result<FeedStats> {
        let stats = match feed {
            Feed::Prices => {
                let mut connector = self.pricing.connector().clone();
                connector.subscribe(source, &mut || self.settle())?
            }
            Feed::Trades => {
                let mut connector = self.trade_booking.connector().clone();
                connector.subscribe(source, &mut || self.settle())?
            }
            Feed::MarketData => {
                let mut connector = self.market_data.connector().clone();
                connector.subscribe(source, &mut || self.settle())?
            }
            Feed::Inquiries => {
                let mut connector = self.inquiry.connector().clone();
                connector.subscribe(source, &mut || self.settle())?
            }
        };
        self.settle()?;
        Ok(stats)
    }

    /// Open `feed` under the data directory and ingest it.
    pub fn ingest_file(&mut self, feed: Feed) -> Result<FeedStats> {
        let path = self.config.data_dir.join(feed.file_name());
        info!("reading {}", path.display());
        let mut source = BufReader::new(File::open(&path)?);
        self.ingest(feed, &mut source)
    }

    /// Ingest all four feeds in order, calling `on_feed` before each one.
    pub fn run_with(&mut self, mut on_feed: impl FnMut(Feed)) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for feed in Feed::ORDER {
            on_feed(feed);
            let stats = self.ingest_file(feed)?;
            summary.feeds.insert(feed.to_string(), stats);
        }
        self.fill_summary(&mut summary);
        Ok(summary)
    }

    /// Ingest all four feeds in order.
    pub fn run(&mut self) -> Result<RunSummary> {
        self.run_with(|_| {})
    }

    fn fill_summary(&self, summary: &mut RunSummary) {
        summary.services.insert("pricing", self.pricing.len() as u64);
        summary.services.insert("gui", self.gui.published() as u64);
        summary.services.insert("streaming", self.streaming.published());
        summary.services.insert("algo_execution", self.algo_execution.orders());
        summary.services.insert("execution", self.execution.executed());
        summary.services.insert("trade_booking", self.trade_booking.len() as u64);
        summary.services.insert("inquiry", self.inquiry.len() as u64);

        summary.sinks.insert(SinkKind::Position.file_name(), self.historical_position.written());
        summary.sinks.insert(SinkKind::Risk.file_name(), self.historical_risk.written());
        summary.sinks.insert(SinkKind::Execution.file_name(), self.historical_execution.written());
        summary.sinks.insert(SinkKind::Streaming.file_name(), self.historical_streaming.written());
        summary.sinks.insert(SinkKind::Inquiry.file_name(), self.historical_inquiry.written());
    }

    /// Position service, for inspection after a run.
    pub fn positions(&self) -> &PositionService {
        &self.position
    }

    /// Risk service, for inspection after a run.
    pub fn risk(&self) -> &RiskService {
        &self.risk
    }

    /// Inquiry service, for inspection after a run.
    pub fn inquiries(&self) -> &InquiryService {
        &self.inquiry
    }

    /// Market data service, for inspection after a run.
    pub fn market_data(&self) -> &MarketDataService {
        &self.market_data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soa::{Keyed, ServiceListener};
    use bond_common::wire::InquiryState;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct SinkJournal {
        sink: &'static str,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl<V: Keyed> ServiceListener<V> for SinkJournal {
        fn process_add(&mut self, data: &V) -> Result<()> {
            self.log.borrow_mut().push(format!("{} {}", self.sink, data.key()));
            Ok(())
        }
    }

    fn system(dir: &std::path::Path) -> TradingSystem {
        let mut system = TradingSystem::new(SystemConfig {
            data_dir: dir.to_path_buf(),
            ..SystemConfig::default()
        });
        system.link();
        system
    }

    #[test]
    fn trade_reaches_position_risk_and_both_sinks() {
        let dir = tempfile::tempdir().unwrap();
        let mut system = system(dir.path());
        let mut feed = "91282CJL6,AB12CD34EF56,99-000,TRSY2,3000000,BUY\n".as_bytes();
        let stats = system.ingest(Feed::Trades, &mut feed).unwrap();
        assert_eq!(stats.delivered, 1);

        let position = system.positions().get_data("91282CJL6").unwrap();
        assert_eq!(position.position("TRSY2"), 3_000_000);
        assert_eq!(system.risk().get_data("91282CJL6").unwrap().quantity, 3_000_000);

        let positions = std::fs::read_to_string(dir.path().join("positions.txt")).unwrap();
        let risk = std::fs::read_to_string(dir.path().join("risk.txt")).unwrap();
        assert!(positions.ends_with(",91282CJL6,TRSY2,3000000,3000000,\n"));
        assert!(risk.ends_with(",91282CJL6,0.02,3000000,\n"));
    }

    #[test]
    fn each_trade_persists_position_before_risk() {
        let dir = tempfile::tempdir().unwrap();
        let mut system = system(dir.path());
        let log = Rc::new(RefCell::new(Vec::new()));
        system.historical_position.add_listener(Box::new(SinkJournal {
            sink: "position",
            log: log.clone(),
        }));
        system.historical_risk.add_listener(Box::new(SinkJournal {
            sink: "risk",
            log: log.clone(),
        }));

        let mut feed = "91282CJL6,T1,99-000,TRSY1,1000000,BUY\n\
                        91282CJP7,T2,100-000,TRSY2,2000000,SELL\n"
            .as_bytes();
        system.ingest(Feed::Trades, &mut feed).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                "position 91282CJL6",
                "risk 91282CJL6",
                "position 91282CJP7",
                "risk 91282CJP7",
            ]
        );
    }

    #[test]
    fn oversized_trades_are_skipped_and_the_feed_continues() {
        let dir = tempfile::tempdir().unwrap();
        let mut system = system(dir.path());
        let mut feed = "91282CJL6,T1,99-000,TRSY1,9223372036854775807,BUY\n\
                        91282CJL6,T2,99-000,TRSY1,9223372036854775807,BUY\n\
                        91282CJL6,T3,99-000,TRSY1,18446744073709551615,BUY\n\
                        91282CJL6,T4,100-000,TRSY1,1,SELL\n"
            .as_bytes();
        let stats = system.ingest(Feed::Trades, &mut feed).unwrap();
        assert_eq!(
            stats,
            FeedStats {
                records: 4,
                skipped: 2,
                delivered: 2
            }
        );

        let position = system.positions().get_data("91282CJL6").unwrap();
        assert_eq!(position.position("TRSY1"), i64::MAX - 1);
        assert_eq!(position.aggregate(), i64::MAX - 1);
        assert_eq!(
            system.risk().get_data("91282CJL6").unwrap().quantity,
            i64::MAX - 1
        );
    }

    #[test]
    fn tight_book_is_executed_and_booked() {
        let dir = tempfile::tempdir().unwrap();
        let mut system = system(dir.path());
        let mut feed = "91282CJN2,98-317,1000000,BID\n91282CJN2,99-001,1000000,OFFER\n".as_bytes();
        system.ingest(Feed::MarketData, &mut feed).unwrap();

        let executions = std::fs::read_to_string(dir.path().join("executions.txt")).unwrap();
        let expected = ",91282CJN2,BID,ALGO0000000001,MARKET,99-001,1000000,0,,False,";
        assert!(executions.contains(expected));
        let position = system.positions().get_data("91282CJN2").unwrap();
        assert_eq!(position.position("TRSY1"), 1_000_000);
    }

    #[test]
    fn inquiries_complete_and_log_first_arrival() {
        let dir = tempfile::tempdir().unwrap();
        let mut system = system(dir.path());
        let mut feed = "Q1W2E3R4T5Y6,912810TV0,BUY,2000000,100-000,RECEIVED\n".as_bytes();
        system.ingest(Feed::Inquiries, &mut feed).unwrap();

        assert_eq!(system.inquiries().get_data("Q1W2E3R4T5Y6").unwrap().state, InquiryState::Done);
        let logged = std::fs::read_to_string(dir.path().join("allinquiries.txt")).unwrap();
        assert_eq!(logged.lines().count(), 1);
        assert!(logged.ends_with(",Q1W2E3R4T5Y6,912810TV0,BUY,2000000,100-000,RECEIVED,\n"));
    }

    #[test]
    fn missing_feed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut system = system(dir.path());
        assert!(system.ingest_file(Feed::Prices).is_err());
    }
}
