//! The sync driver: one load, one transform, one replace per cycle.
//!
//! A failed `load` aborts the cycle before anything is merged or processed,
//! so the store is never touched on that path. A processor failure only
//! affects its own record.

use std::io::Read;

use serde::Serialize;

use recsync_core::{merge, IngestBatch, MergeStats, RecordId, RecordSet};
use recsync_storage::RecordStore;

use crate::error::SyncError;
use crate::processor::{ProcessError, RecordProcessor};

/// Outcome of an ingest cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Items in the batch, duplicates included.
    pub received: usize,
    /// Distinct ids that were new to the store.
    pub created: usize,
    /// Distinct ids that overwrote a stored record.
    pub updated: usize,
    /// Records in the store after the cycle.
    pub total: usize,
}

/// Outcome of a process cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessReport {
    /// Records the processor accepted; now clean.
    pub processed: Vec<RecordId>,
    /// Records the processor rejected; still dirty.
    pub failed: Vec<(RecordId, String)>,
    /// Records that were already clean and were not visited.
    pub skipped: usize,
}

impl ProcessReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs sync cycles against one backend.
pub struct SyncDriver<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> SyncDriver<S> {
    pub fn new(store: S) -> Self {
        SyncDriver { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Current contents of the store.
    pub fn records(&self) -> Result<RecordSet, SyncError> {
        Ok(self.store.load()?)
    }

    /// Ingest cycle: load, merge `batch`, replace.
    pub fn ingest(&mut self, batch: &IngestBatch) -> Result<IngestReport, SyncError> {
        let existing = self.store.load()?;
        let stats = MergeStats::compute(&existing, &batch.items);
        let merged = merge(existing, &batch.items);
        self.store.replace(&merged)?;

        tracing::info!(
            backend = self.store.backend_name(),
            received = stats.received,
            created = stats.created,
            updated = stats.updated,
            total = merged.len(),
            "ingest cycle complete"
        );
        Ok(IngestReport {
            received: stats.received,
            created: stats.created,
            updated: stats.updated,
            total: merged.len(),
        })
    }

    /// Decodes a `{"items": [...]}` document from `reader`, then ingests it.
    ///
    /// Nothing is loaded from the store if the document is invalid.
    pub fn ingest_from_reader<R: Read>(&mut self, mut reader: R) -> Result<IngestReport, SyncError> {
        let mut input = String::new();
        reader.read_to_string(&mut input)?;
        let batch = IngestBatch::from_json(&input)?;
        self.ingest(&batch)
    }

    /// Process cycle: load, offer every dirty record to `processor` in
    /// ascending id order, clear the flag of each accepted record, replace.
    ///
    /// Rejected records stay dirty and the cycle carries on. The full set,
    /// still partially dirty if anything was rejected, is persisted at the end.
    pub fn process<P>(&mut self, processor: &mut P) -> Result<ProcessReport, SyncError>
    where
        P: RecordProcessor + ?Sized,
    {
        let mut records = self.store.load()?;

        let mut dirty_ids: Vec<RecordId> = records
            .values()
            .filter(|record| record.dirty)
            .map(|record| record.id)
            .collect();
        dirty_ids.sort();

        let mut report = ProcessReport {
            skipped: records.len() - dirty_ids.len(),
            ..Default::default()
        };

        for id in dirty_ids {
            let Some(record) = records.get_mut(&id) else {
                continue;
            };
            match processor.process(record) {
                Ok(()) => {
                    record.dirty = false;
                    tracing::debug!(%id, "record processed");
                    report.processed.push(id);
                }
                Err(ProcessError { reason }) => {
                    tracing::warn!(%id, %reason, "record left dirty");
                    report.failed.push((id, reason));
                }
            }
        }

        self.store.replace(&records)?;

        tracing::info!(
            backend = self.store.backend_name(),
            processed = report.processed.len(),
            failed = report.failed.len(),
            skipped = report.skipped,
            "process cycle complete"
        );
        Ok(report)
    }
}
