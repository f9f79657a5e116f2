//! STUN client implementation
//!
//! The client wraps an [`Agent`] and adds retransmission: a request that
//! times out is sent again with a linearly growing deadline until the
//! attempt budget is spent. It never touches a socket. Outbound bytes are
//! pulled with [`Client::poll_write`], received datagrams are pushed with
//! [`Client::handle_read`], and time advances through
//! [`Client::handle_event`].
//!
//! ```
//! use std::time::Instant;
//! use stun::{ClientBuilder, ClientEvent, MessageBuilder, MessageType, TransportProtocol};
//!
//! let mut client = ClientBuilder::new().build(
//!     "10.0.0.2:40000".parse().unwrap(),
//!     "198.51.100.1:3478".parse().unwrap(),
//!     TransportProtocol::Udp,
//! );
//! let request = MessageBuilder::new(MessageType::BINDING_REQUEST).build().unwrap();
//! client.handle_write(request, Instant::now()).unwrap();
//!
//! let transmit = client.poll_write().unwrap();
//! assert_eq!(transmit.payload.len(), 20);
//! assert!(matches!(client.poll_event(), Some(ClientEvent::Timeout(_))));
//! ```

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::path::Path;
use std::time::{Duration, Instant};

use logging::Logger;
use serde::Deserialize;

use crate::agent::{Agent, Event};
use crate::errors::{Result, StunError};
use crate::message::Message;
use crate::transaction_id::TransactionId;
use crate::transport::{Transmit, TransportProtocol};

/// Default capacity of the outbound and transaction queues.
pub const DEFAULT_BUFFER_SIZE: usize = 8;
/// Default retransmission timeout.
pub const DEFAULT_RTO: Duration = Duration::from_millis(300);
/// Default resolution of deadline checks.
pub const DEFAULT_RTO_RATE: Duration = Duration::from_millis(5);
/// Default number of retransmissions before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 7;

/// Upper bound for the RTO and the check resolution.
pub const MAX_RTO: Duration = Duration::from_secs(60);
/// Upper bound for the queue capacity hint.
pub const MAX_BUFFER_SIZE: usize = 1024;

const SETTING_RTO: &str = "stun.rto_ms";
const SETTING_RTO_RATE: &str = "stun.rto_rate_ms";
const SETTING_BUFFER_SIZE: &str = "stun.buffer_size";

/// Input the embedding application feeds the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientInput {
    /// The clock reached the given instant.
    Timeout(Instant),
    /// Abort every transaction and stop accepting work.
    Close,
}

/// Output of [`Client::poll_event`].
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// Call back with [`ClientInput::Timeout`] once this instant is reached.
    Timeout(Instant),
    /// A transaction reached its terminal state.
    Transaction(Event),
}

/// Per-request retransmission state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientTransaction {
    pub id: TransactionId,
    /// Retransmissions performed so far.
    pub attempt: u32,
    pub start: Instant,
    pub rto: Duration,
    pub raw: Vec<u8>,
}

impl ClientTransaction {
    /// Deadline of the current attempt counted from `from`, or `None` if it
    /// falls outside the clock's range.
    fn next_deadline(&self, from: Instant) -> Option<Instant> {
        from.checked_add(self.rto.saturating_mul(self.attempt.saturating_add(1)))
    }
}

/// Client tuning read from the `[stun]` table of a TOML file.
///
/// ```toml
/// [stun]
/// rto_ms = 300
/// rto_rate_ms = 5
/// max_attempts = 7
/// buffer_size = 8
/// no_retransmit = false
/// ```
///
/// Absent keys keep the builder defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientSettings {
    pub rto_ms: Option<u64>,
    pub rto_rate_ms: Option<u64>,
    pub max_attempts: Option<u32>,
    pub buffer_size: Option<usize>,
    pub no_retransmit: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SettingsFile {
    stun: ClientSettings,
}

impl ClientSettings {
    /// Parses TOML text. Tables other than `[stun]` are ignored.
    ///
    /// # Returns
    /// * `Err(StunError::Config)` - invalid TOML, unknown key or wrong value type
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: SettingsFile = toml::from_str(content)
            .map_err(|e| StunError::Config(format!("Invalid STUN settings: {}", e)))?;
        Ok(file.stun)
    }

    /// Reads and parses a settings file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_toml(&config_loader::load_config_file(path)?)
    }
}

/// Builder for [`Client`].
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    buffer_size: usize,
    rto: Duration,
    rto_rate: Duration,
    max_attempts: u32,
    logger: Option<Logger>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            rto: DEFAULT_RTO,
            rto_rate: DEFAULT_RTO_RATE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            logger: None,
        }
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies parsed settings on top of the defaults.
    ///
    /// # Returns
    /// * `Err(StunError::Config)` - `rto_ms` is zero, or a duration exceeds
    ///   [`MAX_RTO`], or `buffer_size` exceeds [`MAX_BUFFER_SIZE`]
    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        let mut builder = Self::default();

        if let Some(ms) = settings.rto_ms {
            builder = builder.with_rto(millis_in_range(SETTING_RTO, ms, 1)?);
        }
        if let Some(ms) = settings.rto_rate_ms {
            builder = builder.with_rto_rate(millis_in_range(SETTING_RTO_RATE, ms, 0)?);
        }
        if let Some(attempts) = settings.max_attempts {
            builder = builder.with_max_attempts(attempts);
        }
        if let Some(size) = settings.buffer_size {
            if size > MAX_BUFFER_SIZE {
                return Err(StunError::Config(format!(
                    "{} out of range: {} > {}",
                    SETTING_BUFFER_SIZE, size, MAX_BUFFER_SIZE
                )));
            }
            builder = builder.with_buffer_size(size);
        }
        if settings.no_retransmit {
            builder = builder.with_no_retransmit();
        }

        Ok(builder)
    }

    /// Capacity hint for the queues, capped at [`MAX_BUFFER_SIZE`].
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Base retransmission timeout, capped at [`MAX_RTO`].
    pub fn with_rto(mut self, rto: Duration) -> Self {
        self.rto = rto;
        self
    }

    /// Deadlines closer than `rto_rate` to the instant passed with
    /// [`ClientInput::Timeout`] count as expired. Capped at [`MAX_RTO`].
    pub fn with_rto_rate(mut self, rto_rate: Duration) -> Self {
        self.rto_rate = rto_rate;
        self
    }

    /// Sets how many times a request is retransmitted. `0` disables
    /// retransmission.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Same as `with_max_attempts(0)`.
    pub fn with_no_retransmit(self) -> Self {
        self.with_max_attempts(0)
    }

    /// Attaches a logger shared by the client and its agent.
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Creates a client sending from `local` to `remote`.
    pub fn build(
        self,
        local: SocketAddr,
        remote: SocketAddr,
        protocol: TransportProtocol,
    ) -> Client {
        let base = self.rto.min(MAX_RTO);
        // Without retransmissions a single deadline covers the whole budget.
        let rto = if self.max_attempts == 0 {
            base.saturating_mul(DEFAULT_MAX_ATTEMPTS)
        } else {
            base
        };
        let capacity = self.buffer_size.min(MAX_BUFFER_SIZE);

        let mut agent = Agent::new();
        if let Some(ref logger) = self.logger {
            agent = agent.with_logger(logger.clone());
        }

        Client {
            local,
            remote,
            protocol,
            agent,
            transactions: HashMap::with_capacity(capacity),
            outbound: VecDeque::with_capacity(capacity),
            rto,
            rto_rate: self.rto_rate.min(MAX_RTO),
            max_attempts: self.max_attempts,
            last_now: None,
            last_timeout_hint: None,
            closed: false,
            logger: self.logger,
        }
    }
}

fn millis_in_range(key: &str, ms: u64, min: u64) -> Result<Duration> {
    let value = Duration::from_millis(ms);
    if ms < min || value > MAX_RTO {
        return Err(StunError::Config(format!(
            "{} out of range: {} (expected {}..={})",
            key,
            ms,
            min,
            MAX_RTO.as_millis()
        )));
    }
    Ok(value)
}

/// Sans-I/O STUN client with retransmission.
#[derive(Debug)]
pub struct Client {
    local: SocketAddr,
    remote: SocketAddr,
    protocol: TransportProtocol,
    agent: Agent,
    transactions: HashMap<TransactionId, ClientTransaction>,
    outbound: VecDeque<Transmit>,
    rto: Duration,
    rto_rate: Duration,
    max_attempts: u32,
    last_now: Option<Instant>,
    /// Deadline last reported as [`ClientEvent::Timeout`]; reset by any input.
    last_timeout_hint: Option<Instant>,
    closed: bool,
    logger: Option<Logger>,
}

impl Client {
    /// Starts a transaction for `message` and queues its first transmit.
    ///
    /// # Returns
    /// * `Err(StunError::ClientClosed)` - client was closed
    /// * `Err(StunError::TransactionExists)` - a transaction with the same id is pending
    /// * `Err(StunError::Config)` - the first deadline is past the clock's range
    pub fn handle_write(&mut self, message: Message, now: Instant) -> Result<()> {
        if self.closed {
            return Err(StunError::ClientClosed);
        }

        let transaction = ClientTransaction {
            id: message.transaction_id,
            attempt: 0,
            start: now,
            rto: self.rto,
            raw: message.raw,
        };
        let deadline = transaction.next_deadline(now).ok_or_else(|| {
            StunError::Config(format!("RTO {:?} overflows the clock", self.rto))
        })?;
        self.agent.start(transaction.id, deadline)?;

        self.last_now = Some(now);
        self.last_timeout_hint = None;
        self.log_info(&format!(
            "Sending request {} to {} over {}",
            transaction.id, self.remote, self.protocol
        ));
        self.enqueue(transaction.raw.clone(), now);
        self.transactions.insert(transaction.id, transaction);
        Ok(())
    }

    /// Decodes a received datagram and completes its transaction.
    ///
    /// # Returns
    /// * `Err(StunError::ClientClosed)` - client was closed
    /// * `Err(StunError)` - the datagram is not a valid STUN message
    pub fn handle_read(&mut self, datagram: &[u8]) -> Result<()> {
        if self.closed {
            return Err(StunError::ClientClosed);
        }

        let message = Message::decode(datagram)?;
        self.last_timeout_hint = None;
        self.agent.process(message)
    }

    /// Advances time or closes the client.
    ///
    /// `Timeout(now)` expires every transaction whose deadline is earlier
    /// than `now` plus the check resolution.
    pub fn handle_event(&mut self, input: ClientInput) -> Result<()> {
        if self.closed {
            return Err(StunError::ClientClosed);
        }

        self.last_timeout_hint = None;
        match input {
            ClientInput::Timeout(now) => {
                self.last_now = Some(now);
                let horizon = now.checked_add(self.rto_rate).unwrap_or(now);
                self.agent.collect(horizon)
            }
            ClientInput::Close => {
                self.closed = true;
                self.log_info("Closing");
                self.agent.close()
            }
        }
    }

    /// Pops the oldest queued transmit.
    pub fn poll_write(&mut self) -> Option<Transmit> {
        self.outbound.pop_front()
    }

    /// Next client event.
    ///
    /// The earliest pending deadline is reported first as
    /// [`ClientEvent::Timeout`], unless that same deadline was already
    /// reported and no input arrived since. Then terminal agent events are
    /// drained: timed out transactions with attempts left are retransmitted
    /// instead of being reported. A deadline set by such a retransmission
    /// is reported before returning `None`.
    pub fn poll_event(&mut self) -> Option<ClientEvent> {
        if let Some(hint) = self.next_timeout_hint() {
            return Some(hint);
        }

        while let Some(event) = self.agent.poll_event() {
            let Some(mut transaction) = self.transactions.remove(&event.id) else {
                continue;
            };

            let timed_out = event.result == Err(StunError::TransactionTimeOut);
            if !timed_out || transaction.attempt >= self.max_attempts {
                self.log_outcome(&event, transaction.attempt);
                return Some(ClientEvent::Transaction(event));
            }

            transaction.attempt += 1;
            let now = self.last_now.unwrap_or(transaction.start);
            let restarted = match transaction.next_deadline(now) {
                Some(deadline) => self.agent.start(transaction.id, deadline),
                None => Err(StunError::Config(format!(
                    "RTO {:?} overflows the clock",
                    transaction.rto
                ))),
            };
            if let Err(e) = restarted {
                self.log_error(&format!(
                    "Retransmission of {} abandoned: {}",
                    transaction.id, e
                ));
                return Some(ClientEvent::Transaction(event));
            }

            self.log_debug(&format!(
                "Retransmitting {} (attempt {})",
                transaction.id, transaction.attempt
            ));
            self.enqueue(transaction.raw.clone(), now);
            self.transactions.insert(transaction.id, transaction);
        }

        self.next_timeout_hint()
    }

    /// Earliest pending deadline.
    pub fn poll_timeout(&self) -> Option<Instant> {
        self.agent.poll_timeout()
    }

    /// Number of transactions awaiting a terminal event.
    pub fn pending(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn next_timeout_hint(&mut self) -> Option<ClientEvent> {
        let deadline = self.agent.poll_timeout()?;
        if self.last_timeout_hint == Some(deadline) {
            return None;
        }
        self.last_timeout_hint = Some(deadline);
        Some(ClientEvent::Timeout(deadline))
    }

    fn enqueue(&mut self, payload: Vec<u8>, now: Instant) {
        self.outbound.push_back(Transmit {
            now,
            local: self.local,
            remote: self.remote,
            protocol: self.protocol,
            payload,
        });
    }

    fn log_outcome(&self, event: &Event, attempt: u32) {
        match event.result {
            Ok(ref response) => self.log_info(&format!(
                "Transaction {} succeeded after {} retransmissions: {}",
                event.id, attempt, response
            )),
            Err(ref e) => self.log_error(&format!("Transaction {} failed: {}", event.id, e)),
        }
    }

    // ========== Logging ==========

    /// Formats a log message with STUN Client prefix
    fn format_log(&self, message: &str) -> String {
        format!("[STUN Client] {}", message)
    }

    fn log_debug(&self, message: &str) {
        if let Some(ref logger) = self.logger {
            logger.debug(&self.format_log(message));
        }
    }

    /// Logs an info message
    fn log_info(&self, message: &str) {
        if let Some(ref logger) = self.logger {
            logger.info(&self.format_log(message));
        }
    }

    /// Logs an error message
    fn log_error(&self, message: &str) {
        if let Some(ref logger) = self.logger {
            logger.error(&self.format_log(message));
        }
    }
}
