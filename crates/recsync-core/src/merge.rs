//! Upsert-merge of an incoming batch into an existing record set.
//!
//! Every incoming item replaces the stored record wholesale and marks it
//! dirty, whether or not its name or content actually changed. Records the
//! batch does not mention pass through untouched, dirty flag included.
//! Nothing is ever removed.

use std::collections::HashSet;

use crate::record::{IncomingRecord, Record, RecordId, RecordSet};

/// Merges `incoming` into `existing`, in batch order.
///
/// Duplicate ids within the batch resolve last-write-wins.
pub fn merge(existing: RecordSet, incoming: &[IncomingRecord]) -> RecordSet {
    let mut merged = existing;
    for item in incoming {
        merged.insert(
            item.id,
            Record::dirty(item.id, item.name.clone(), item.content.clone()),
        );
    }
    merged
}

/// What a batch does to an existing set, counted over distinct ids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Items in the batch, duplicates included.
    pub received: usize,
    /// Distinct ids not present before the merge.
    pub created: usize,
    /// Distinct ids that overwrote a stored record.
    pub updated: usize,
}

impl MergeStats {
    /// Classifies `incoming` against `existing` without merging.
    pub fn compute(existing: &RecordSet, incoming: &[IncomingRecord]) -> Self {
        let distinct: HashSet<RecordId> = incoming.iter().map(|item| item.id).collect();
        let updated = distinct.iter().filter(|id| existing.contains_key(id)).count();
        MergeStats {
            received: incoming.len(),
            created: distinct.len() - updated,
            updated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::record_set;
    use proptest::prelude::*;

    fn existing() -> RecordSet {
        record_set([
            Record::clean(RecordId(1), "one", "first"),
            Record::dirty(RecordId(2), "two", "second"),
            Record::clean(RecordId(3), "three", ""),
        ])
    }

    #[test]
    fn test_new_item_is_created_dirty() {
        let merged = merge(RecordSet::new(), &[IncomingRecord::new(1, "n", "c")]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[&RecordId(1)], Record::dirty(RecordId(1), "n", "c"));
    }

    #[test]
    fn test_existing_item_is_overwritten_and_dirtied() {
        let merged = merge(existing(), &[IncomingRecord::new(1, "uno", "primero")]);
        assert_eq!(merged[&RecordId(1)], Record::dirty(RecordId(1), "uno", "primero"));
    }

    #[test]
    fn test_unchanged_reingest_still_dirties() {
        let merged = merge(existing(), &[IncomingRecord::new(3, "three", "")]);
        assert!(merged[&RecordId(3)].dirty);
    }

    #[test]
    fn test_untouched_records_pass_through() {
        let before = existing();
        let merged = merge(before.clone(), &[IncomingRecord::new(9, "nine", "")]);
        for (id, record) in &before {
            assert_eq!(&merged[id], record);
        }
        assert_eq!(merged.len(), 4);
    }

    #[test]
    fn test_last_write_wins_within_batch() {
        let merged = merge(
            RecordSet::new(),
            &[IncomingRecord::new(1, "a", ""), IncomingRecord::new(1, "b", "")],
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[&RecordId(1)].name, "b");
    }

    #[test]
    fn test_empty_batch_is_identity() {
        assert_eq!(merge(existing(), &[]), existing());
    }

    #[test]
    fn test_stats_count_distinct_ids() {
        let stats = MergeStats::compute(
            &existing(),
            &[
                IncomingRecord::new(1, "a", ""),
                IncomingRecord::new(4, "b", ""),
                IncomingRecord::new(4, "c", ""),
            ],
        );
        assert_eq!(
            stats,
            MergeStats {
                received: 3,
                created: 1,
                updated: 1,
            }
        );
    }

    fn record_strategy() -> impl Strategy<Value = Record> {
        (0i64..32, any::<bool>(), "[a-z]{0,8}", ".{0,16}").prop_map(|(id, dirty, name, content)| {
            Record {
                id: RecordId(id),
                dirty,
                name,
                content,
            }
        })
    }

    fn incoming_strategy() -> impl Strategy<Value = IncomingRecord> {
        (0i64..32, "[a-z]{0,8}", ".{0,16}")
            .prop_map(|(id, name, content)| IncomingRecord::new(id, name, content))
    }

    proptest! {
        #[test]
        fn prop_merge_preserves_untouched(
            stored in prop::collection::vec(record_strategy(), 0..20),
            batch in prop::collection::vec(incoming_strategy(), 0..20),
        ) {
            let before = record_set(stored);
            let merged = merge(before.clone(), &batch);
            for (id, record) in &before {
                if !batch.iter().any(|item| item.id == *id) {
                    prop_assert_eq!(&merged[id], record);
                }
            }
        }

        #[test]
        fn prop_every_ingested_id_is_dirty_with_last_value(
            stored in prop::collection::vec(record_strategy(), 0..20),
            batch in prop::collection::vec(incoming_strategy(), 0..20),
        ) {
            let merged = merge(record_set(stored), &batch);
            for item in &batch {
                let last = batch.iter().rev().find(|other| other.id == item.id).unwrap();
                let record = &merged[&item.id];
                prop_assert!(record.dirty);
                prop_assert_eq!(&record.name, &last.name);
                prop_assert_eq!(&record.content, &last.content);
            }
        }

        #[test]
        fn prop_merge_never_removes(
            stored in prop::collection::vec(record_strategy(), 0..20),
            batch in prop::collection::vec(incoming_strategy(), 0..20),
        ) {
            let before = record_set(stored);
            let stats = MergeStats::compute(&before, &batch);
            let merged = merge(before.clone(), &batch);
            prop_assert_eq!(merged.len(), before.len() + stats.created);
        }

        #[test]
        fn prop_reingest_is_stable(
            stored in prop::collection::vec(record_strategy(), 0..20),
            batch in prop::collection::vec(incoming_strategy(), 0..20),
        ) {
            let once = merge(record_set(stored), &batch);
            let twice = merge(once.clone(), &batch);
            prop_assert_eq!(once, twice);
        }
    }
}
