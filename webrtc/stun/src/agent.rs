//! STUN transaction agent
//!
//! The agent tracks outstanding request transactions by id and deadline.
//! It owns no timers and performs no I/O: the caller supplies the current
//! time and drains terminal [`Event`]s from a FIFO queue.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use logging::Logger;

use crate::errors::{Result, StunError};
use crate::message::Message;
use crate::transaction_id::TransactionId;

/// Terminal outcome of a transaction.
///
/// `result` is the response on success, or one of
/// [`StunError::TransactionTimeOut`], [`StunError::TransactionStopped`] and
/// [`StunError::AgentClosed`].
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: TransactionId,
    pub result: Result<Message>,
}

/// A transaction as tracked by the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentTransaction {
    pub id: TransactionId,
    pub deadline: Instant,
}

/// Sans-I/O transaction bookkeeping.
#[derive(Debug, Default)]
pub struct Agent {
    transactions: HashMap<TransactionId, AgentTransaction>,
    events: VecDeque<Event>,
    closed: bool,
    logger: Option<Logger>,
}

impl Agent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a logger to the agent.
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Registers a transaction that times out at `deadline`.
    ///
    /// # Returns
    /// * `Err(StunError::AgentClosed)` - agent was closed
    /// * `Err(StunError::TransactionExists)` - `id` is already tracked
    pub fn start(&mut self, id: TransactionId, deadline: Instant) -> Result<()> {
        if self.closed {
            return Err(StunError::AgentClosed);
        }
        if self.transactions.contains_key(&id) {
            return Err(StunError::TransactionExists);
        }

        self.transactions
            .insert(id, AgentTransaction { id, deadline });
        self.log_debug(&format!("Transaction {} started", id));
        Ok(())
    }

    /// Cancels a transaction, emitting a [`StunError::TransactionStopped`] event.
    ///
    /// # Returns
    /// * `Err(StunError::AgentClosed)` - agent was closed
    /// * `Err(StunError::TransactionNotExists)` - `id` is not tracked
    pub fn stop(&mut self, id: TransactionId) -> Result<()> {
        if self.closed {
            return Err(StunError::AgentClosed);
        }
        if self.transactions.remove(&id).is_none() {
            return Err(StunError::TransactionNotExists);
        }

        self.log_debug(&format!("Transaction {} stopped", id));
        self.events.push_back(Event {
            id,
            result: Err(StunError::TransactionStopped),
        });
        Ok(())
    }

    /// Completes the transaction matching `message`'s id.
    ///
    /// Messages matching no tracked transaction are dropped without an
    /// event; late retransmitted responses end up here.
    pub fn process(&mut self, message: Message) -> Result<()> {
        if self.closed {
            return Err(StunError::AgentClosed);
        }

        let id = message.transaction_id;
        if self.transactions.remove(&id).is_none() {
            self.log_trace(&format!("Dropping unmatched message {}", message));
            return Ok(());
        }

        self.log_debug(&format!("Transaction {} completed", id));
        self.events.push_back(Event {
            id,
            result: Ok(message),
        });
        Ok(())
    }

    /// Times out every transaction whose deadline is strictly before `now`.
    pub fn collect(&mut self, now: Instant) -> Result<()> {
        if self.closed {
            return Err(StunError::AgentClosed);
        }

        let mut expired: Vec<AgentTransaction> = self
            .transactions
            .values()
            .filter(|t| t.deadline < now)
            .copied()
            .collect();
        expired.sort_by_key(|t| (t.deadline, t.id));

        for transaction in expired {
            self.transactions.remove(&transaction.id);
            self.log_debug(&format!("Transaction {} timed out", transaction.id));
            self.events.push_back(Event {
                id: transaction.id,
                result: Err(StunError::TransactionTimeOut),
            });
        }
        Ok(())
    }

    /// Aborts every transaction with [`StunError::AgentClosed`] and refuses
    /// further work.
    ///
    /// # Returns
    /// * `Err(StunError::AgentClosed)` - already closed
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(StunError::AgentClosed);
        }

        let mut pending: Vec<AgentTransaction> = self.transactions.drain().map(|(_, t)| t).collect();
        pending.sort_by_key(|t| (t.deadline, t.id));

        if !pending.is_empty() {
            self.log_info(&format!("Closing with {} pending transactions", pending.len()));
        }
        for transaction in pending {
            self.events.push_back(Event {
                id: transaction.id,
                result: Err(StunError::AgentClosed),
            });
        }

        self.closed = true;
        Ok(())
    }

    /// Pops the oldest terminal event.
    pub fn poll_event(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    /// Earliest deadline among tracked transactions.
    pub fn poll_timeout(&self) -> Option<Instant> {
        self.transactions.values().map(|t| t.deadline).min()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    // ========== Logging ==========

    fn format_log(&self, message: &str) -> String {
        format!("[STUN Agent] {}", message)
    }

    fn log_trace(&self, message: &str) {
        if let Some(ref logger) = self.logger {
            logger.trace(&self.format_log(message));
        }
    }

    fn log_debug(&self, message: &str) {
        if let Some(ref logger) = self.logger {
            logger.debug(&self.format_log(message));
        }
    }

    fn log_info(&self, message: &str) {
        if let Some(ref logger) = self.logger {
            logger.info(&self.format_log(message));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message_type::MessageType;
    use logging::LogLevel;
    use std::time::Duration;

    fn id(n: u8) -> TransactionId {
        TransactionId([n; 12])
    }

    fn response(n: u8) -> Message {
        Message::new(MessageType::BINDING_SUCCESS, id(n))
    }

    #[test]
    fn test_start_rejects_duplicate() {
        let now = Instant::now();
        let mut agent = Agent::new();
        agent.start(id(1), now).unwrap();

        assert_eq!(agent.start(id(1), now), Err(StunError::TransactionExists));
        assert_eq!(agent.len(), 1);
    }

    #[test]
    fn test_process_emits_success() {
        let now = Instant::now();
        let mut agent = Agent::new();
        agent.start(id(1), now + Duration::from_secs(1)).unwrap();
        agent.process(response(1)).unwrap();

        let event = agent.poll_event().unwrap();
        assert_eq!(event.id, id(1));
        assert_eq!(event.result, Ok(response(1)));
        assert!(agent.is_empty());
        assert!(agent.poll_event().is_none());
    }

    #[test]
    fn test_process_drops_unmatched() {
        let mut agent = Agent::new();
        agent.process(response(9)).unwrap();

        assert!(agent.poll_event().is_none());
    }

    #[test]
    fn test_stop() {
        let mut agent = Agent::new();
        agent.start(id(1), Instant::now()).unwrap();
        agent.stop(id(1)).unwrap();

        assert_eq!(
            agent.poll_event().unwrap().result,
            Err(StunError::TransactionStopped)
        );
        assert_eq!(agent.stop(id(1)), Err(StunError::TransactionNotExists));
    }

    #[test]
    fn test_collect_only_expired() {
        let now = Instant::now();
        let mut agent = Agent::new();
        agent.start(id(1), now - Duration::from_millis(10)).unwrap();
        agent.start(id(2), now + Duration::from_millis(10)).unwrap();
        agent.start(id(3), now - Duration::from_millis(20)).unwrap();
        // deadline equal to now is not yet expired
        agent.start(id(4), now).unwrap();

        agent.collect(now).unwrap();

        let first = agent.poll_event().unwrap();
        let second = agent.poll_event().unwrap();
        assert_eq!(first.id, id(3));
        assert_eq!(second.id, id(1));
        assert_eq!(first.result, Err(StunError::TransactionTimeOut));
        assert!(agent.poll_event().is_none());
        assert_eq!(agent.len(), 2);
    }

    #[test]
    fn test_poll_timeout_is_min_deadline() {
        let now = Instant::now();
        let mut agent = Agent::new();
        assert_eq!(agent.poll_timeout(), None);

        agent.start(id(1), now + Duration::from_millis(300)).unwrap();
        agent.start(id(2), now + Duration::from_millis(100)).unwrap();
        assert_eq!(agent.poll_timeout(), Some(now + Duration::from_millis(100)));
    }

    #[test]
    fn test_close() {
        let now = Instant::now();
        let mut agent = Agent::new();
        agent.start(id(1), now).unwrap();
        agent.start(id(2), now + Duration::from_millis(1)).unwrap();
        agent.close().unwrap();

        assert!(agent.is_closed());
        assert!(agent.is_empty());
        assert_eq!(agent.poll_event().unwrap().id, id(1));
        assert_eq!(
            agent.poll_event().unwrap().result,
            Err(StunError::AgentClosed)
        );

        assert_eq!(agent.close(), Err(StunError::AgentClosed));
        assert_eq!(agent.start(id(3), now), Err(StunError::AgentClosed));
        assert_eq!(agent.process(response(1)), Err(StunError::AgentClosed));
        assert_eq!(agent.collect(now), Err(StunError::AgentClosed));
        assert_eq!(agent.stop(id(1)), Err(StunError::AgentClosed));
    }

    #[test]
    fn test_logs_through_injected_logger() {
        let logger = Logger::in_memory(LogLevel::Debug);
        let mut agent = Agent::new().with_logger(logger.clone());
        agent.start(id(1), Instant::now()).unwrap();

        let lines = logger.captured().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("[STUN Agent] Transaction 010101010101010101010101 started"));
    }
}
