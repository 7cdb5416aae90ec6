//! Address Sequencer - Per-Sender Send Ordering
//!
//! Many ledgers require monotonically increasing per-account sequence
//! numbers, so concurrent submission from one account causes spurious
//! rejections. The sequencer keeps one async mutex per
//! `(network, from_address)`: sends for the same sender serialize, sends
//! for unrelated senders never block each other, and there is no global
//! lock across networks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;

use crate::domain::network::NetworkId;

/// Map entries are pruned lazily once the table grows past this size.
const PRUNE_THRESHOLD: usize = 1024;

/// Per-(network, sender) async lock table.
#[derive(Default)]
pub struct AddressSequencer {
  locks: Mutex<HashMap<(NetworkId, String), Arc<tokio::sync::Mutex<()>>>>,
}

impl AddressSequencer {
  pub fn new() -> Self {
    Self::default()
  }

  /// Acquire the ordering lock for one sender on one network.
  ///
  /// The returned guard must be held across the sequencing-sensitive
  /// section (a single send, or a whole batch for that sender).
  pub async fn acquire(
    &self,
    network: NetworkId,
    from: &str,
  ) -> OwnedMutexGuard<()> {
    let lock = {
      let mut table = self.locks.lock().expect("sequencer lock poisoned");
      if table.len() > PRUNE_THRESHOLD {
        // Entries nobody holds or waits on have strong_count == 1.
        table.retain(|_, l| Arc::strong_count(l) > 1);
      }
      Arc::clone(
        table
          .entry((network, from.to_string()))
          .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
      )
    };

    lock.lock_owned().await
  }

  /// Number of tracked senders (diagnostics only).
  pub fn tracked(&self) -> usize {
    self.locks.lock().expect("sequencer lock poisoned").len()
  }
}
