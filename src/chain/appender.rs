//! Chain appender
//!
//! Appends go through one lock so that two writers can never both read the
//! same tip and link to it. The store additionally refuses any entry whose
//! `prev_hash` is not the current tip, so a writer that bypasses this type
//! still cannot fork the chain.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::canonical::to_canonical_value;
use super::entry::{LedgerEntry, NewLedgerEntry};
use super::verify::{verify_entries, ChainVerification};
use crate::clock::Clock;
use crate::observability::{Event, MetricsRegistry};
use crate::store::{ChainStore, StoreError, StoreResult};

pub struct HashChain<S: ChainStore + ?Sized> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    metrics: Option<Arc<MetricsRegistry>>,
    append_lock: Mutex<()>,
}

impl<S: ChainStore + ?Sized> HashChain<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            metrics: None,
            append_lock: Mutex::new(()),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Link `data` onto the current tip and persist it.
    ///
    /// The first entry of an empty chain is the genesis entry and links to
    /// `null`.
    pub fn append<T: Serialize + ?Sized>(
        &self,
        subject: Option<&str>,
        data: &T,
    ) -> StoreResult<LedgerEntry> {
        let _guard = self
            .append_lock
            .lock()
            .map_err(|_| StoreError::Poisoned("hash chain append lock"))?;

        let prev_hash = self.store.last_entry()?.map(|e| e.hash);
        let new = NewLedgerEntry::link(
            prev_hash,
            subject.map(str::to_string),
            to_canonical_value(data),
            self.clock.now(),
        );
        let entry = self.store.append_entry(new)?;

        if let Some(metrics) = &self.metrics {
            metrics.increment_chain_entries();
        }
        tracing::debug!(
            event = %Event::ChainAppended,
            sequence = entry.sequence,
            subject = entry.subject.as_deref().unwrap_or(""),
            hash = %entry.hash,
            genesis = entry.is_genesis()
        );

        Ok(entry)
    }

    pub fn entries(&self) -> StoreResult<Vec<LedgerEntry>> {
        self.store.entries()
    }

    /// Re-derive every digest from genesis.
    pub fn verify(&self) -> StoreResult<ChainVerification> {
        let entries = self.store.entries()?;
        let result = verify_entries(&entries);

        if let Some(metrics) = &self.metrics {
            metrics.record_verification(result.is_intact());
        }
        match &result.first_tampered {
            None => tracing::info!(
                event = %Event::ChainVerified,
                entries = result.total,
                "hash chain intact"
            ),
            Some(tampered) => tracing::error!(
                event = %Event::ChainTampered,
                entries = result.total,
                verified = result.verified,
                index = tampered.index,
                sequence = tampered.sequence,
                "hash chain tampered"
            ),
        }

        Ok(result)
    }
}
