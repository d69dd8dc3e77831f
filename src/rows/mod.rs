//! Row source module
//!
//! Produces the ordered stream of records that feed the export pipeline.
//! The synthetic generator stands in for whatever query or feed a real
//! deployment would read from.

use serde::Serialize;

/// A single exported row.
///
/// Immutable once produced; rows only live as long as the batch that holds
/// them. `id` is strictly increasing across the whole stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub status: String,
    pub education: String,
    pub category: String,
    pub address: String,
    pub age: u32,
    pub counter: u64,
}

impl Record {
    /// Column names, in serialization order. Used by encoders for the
    /// header record.
    pub const COLUMNS: [&'static str; 9] = [
        "id",
        "first_name",
        "last_name",
        "status",
        "education",
        "category",
        "address",
        "age",
        "counter",
    ];
}

/// An ordered, resumable source of rows.
///
/// `next_batch` returns up to `max_rows` records starting at the internal
/// cursor and a flag that is `true` once the source has nothing further to
/// produce. The final batch may be partial or empty. Implementations must
/// never skip or reorder rows; they are not re-entrant from multiple callers
/// without external synchronization.
pub trait RowSource: Send {
    fn next_batch(&mut self, max_rows: usize) -> (Vec<Record>, bool);
}

/// Synthetic row generator producing `limit` demo records with ids 1..=limit.
#[derive(Debug)]
pub struct SyntheticRows {
    next_id: u64,
    limit: u64,
}

impl SyntheticRows {
    pub fn new(limit: u64) -> Self {
        Self { next_id: 1, limit }
    }

    fn generate(id: u64) -> Record {
        Record {
            id,
            first_name: format!("Jane {}", id),
            last_name: format!("Smith Rodriguez {}", id),
            status: "active and pending review".into(),
            education: "undergraduate, applying for a masters".into(),
            category: "bulk export sample data".into(),
            address: "0 Example Street, Springfield".into(),
            age: 20 + (id % 30) as u32,
            counter: id + 2,
        }
    }
}

impl RowSource for SyntheticRows {
    fn next_batch(&mut self, max_rows: usize) -> (Vec<Record>, bool) {
        let mut batch = Vec::with_capacity(max_rows.min(1024));
        while self.next_id <= self.limit && batch.len() < max_rows {
            batch.push(Self::generate(self.next_id));
            self.next_id += 1;
        }
        (batch, self.next_id > self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_batch_not_exhausted() {
        let mut source = SyntheticRows::new(10);
        let (batch, exhausted) = source.next_batch(4);
        assert_eq!(batch.len(), 4);
        assert!(!exhausted);
        assert_eq!(batch[0].id, 1);
        assert_eq!(batch[3].id, 4);
    }

    #[test]
    fn test_final_partial_batch() {
        let mut source = SyntheticRows::new(10);
        let (_, exhausted) = source.next_batch(8);
        assert!(!exhausted);
        let (batch, exhausted) = source.next_batch(8);
        assert_eq!(batch.len(), 2);
        assert!(exhausted);
    }

    #[test]
    fn test_exhausted_source_returns_empty() {
        let mut source = SyntheticRows::new(3);
        let (batch, exhausted) = source.next_batch(10);
        assert_eq!(batch.len(), 3);
        assert!(exhausted);

        let (batch, exhausted) = source.next_batch(10);
        assert!(batch.is_empty());
        assert!(exhausted);
    }

    #[test]
    fn test_ids_strictly_increasing_across_batches() {
        let mut source = SyntheticRows::new(100);
        let mut last_id = 0;
        loop {
            let (batch, exhausted) = source.next_batch(7);
            for record in &batch {
                assert!(record.id > last_id);
                last_id = record.id;
            }
            if exhausted {
                break;
            }
        }
        assert_eq!(last_id, 100);
    }

    #[test]
    fn test_zero_limit_is_immediately_exhausted() {
        let mut source = SyntheticRows::new(0);
        let (batch, exhausted) = source.next_batch(10);
        assert!(batch.is_empty());
        assert!(exhausted);
    }
}
