//! Ticket registry: the set of distinct registered lottery numbers.

use std::collections::BTreeSet;

use rand::Rng;
use thiserror::Error;
use tombola_types::TICKET_DIGITS;

/// Rejection of a candidate ticket before it reaches the registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TicketError {
    #[error("invalid ticket {candidate:?}: expected exactly six decimal digits")]
    InvalidFormat { candidate: String },
}

/// Outcome of a registration attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The number was not yet present and has been recorded.
    Registered(u32),
    /// The number is already registered; the registry is unchanged.
    Duplicate(u32),
}

/// The set of distinct registered ticket values.
///
/// Entries are stored ordered so draw sampling is independent of any hash
/// iteration order. The registry only grows; there is no removal and no
/// persistence across restarts.
#[derive(Debug, Default)]
pub struct TicketRegistry {
    entries: BTreeSet<u32>,
}

impl TicketRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and record a candidate ticket.
    ///
    /// The candidate must be exactly six ASCII decimal digits. Leading
    /// zeros are significant in string form only; the stored value is the
    /// numeric parse, so `"000123"` and a later `"000123"` collide.
    pub fn register(&mut self, candidate: &str) -> Result<RegisterOutcome, TicketError> {
        if candidate.len() != TICKET_DIGITS || !candidate.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TicketError::InvalidFormat {
                candidate: candidate.to_string(),
            });
        }
        // Six decimal digits always fit in a u32.
        let value: u32 = candidate.parse().map_err(|_| TicketError::InvalidFormat {
            candidate: candidate.to_string(),
        })?;
        if !self.entries.insert(value) {
            return Ok(RegisterOutcome::Duplicate(value));
        }
        Ok(RegisterOutcome::Registered(value))
    }

    /// Uniformly select one registered ticket, leaving the registry
    /// unchanged. Returns `None` when nothing is registered.
    pub fn draw(&self, rng: &mut impl Rng) -> Option<u32> {
        if self.entries.is_empty() {
            return None;
        }
        // Index sampling over the ordered snapshot keeps the selection
        // uniform over the current entry set.
        let index = rng.gen_range(0..self.entries.len());
        self.entries.iter().nth(index).copied()
    }

    /// Exact-value membership test.
    pub fn contains(&self, value: u32) -> bool {
        self.entries.contains(&value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
