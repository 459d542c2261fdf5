// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ordered, deduplicated image collection. Insertion order is page order.

use std::sync::Arc;

use crate::error::{BildwerkError, Result};
use crate::types::{ImageIdentity, ImageRecord, Rotation};

/// Ordered store of [`ImageRecord`]s with no two records sharing an identity.
///
/// The collection has a single owner. Composition runs never borrow it; they
/// work from a [`snapshot`](Self::snapshot) taken up front, so mutations made
/// while a document is being built cannot be observed by that run.
///
/// Index arguments are validated on every call. Callers holding an index
/// across a mutation should re-resolve it with [`position_of`](Self::position_of).
#[derive(Debug, Clone, Default)]
pub struct ImageCollection {
    records: Vec<ImageRecord>,
}

impl ImageCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ImageRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageRecord> {
        self.records.iter()
    }

    /// Sum of the encoded sizes of all images.
    pub fn total_bytes(&self) -> u64 {
        self.records.iter().map(ImageRecord::size_bytes).sum()
    }

    /// Current position of the record with the given identity.
    pub fn position_of(&self, identity: &ImageIdentity) -> Option<usize> {
        self.records.iter().position(|r| &r.identity == identity)
    }

    /// Append a record unless one with the same identity is already present.
    ///
    /// Returns `false` (and leaves the collection unchanged) for duplicates.
    pub fn append(&mut self, record: ImageRecord) -> bool {
        if self.position_of(&record.identity).is_some() {
            return false;
        }
        self.records.push(record);
        true
    }

    /// Append several records in order, returning how many were actually added.
    ///
    /// Duplicates within `records` itself are suppressed too.
    pub fn extend(&mut self, records: impl IntoIterator<Item = ImageRecord>) -> usize {
        records
            .into_iter()
            .map(|record| self.append(record))
            .filter(|added| *added)
            .count()
    }

    /// Remove and return the record at `index`; later records move up by one.
    pub fn remove(&mut self, index: usize) -> Result<ImageRecord> {
        self.check_index(index)?;
        Ok(self.records.remove(index))
    }

    /// Move the record at `from` so that it ends up at position `to`.
    ///
    /// The relative order of all other records is preserved.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from == to {
            return Ok(());
        }
        let record = self.records.remove(from);
        self.records.insert(to, record);
        Ok(())
    }

    /// Advance the rotation of the record at `index` by 90 degrees.
    pub fn rotate(&mut self, index: usize) -> Result<Rotation> {
        self.check_index(index)?;
        let record = &mut self.records[index];
        record.rotation = record.rotation.advance();
        Ok(record.rotation)
    }

    /// Rotate by identity, returning `None` if no such record exists.
    pub fn rotate_identity(&mut self, identity: &ImageIdentity) -> Option<Rotation> {
        let index = self.position_of(identity)?;
        self.rotate(index).ok()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Immutable, cheaply clonable view of the current order.
    pub fn snapshot(&self) -> Arc<[ImageRecord]> {
        self.records.iter().cloned().collect()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.records.len() {
            return Err(BildwerkError::IndexOutOfRange {
                index,
                len: self.records.len(),
            });
        }
        Ok(())
    }
}

impl FromIterator<ImageRecord> for ImageCollection {
    fn from_iter<T: IntoIterator<Item = ImageRecord>>(iter: T) -> Self {
        let mut collection = Self::new();
        ImageCollection::extend(&mut collection, iter);
        collection
    }
}

/// Human-readable byte size: kilobytes with one decimal, megabytes with two
/// once the size passes 1024 KB.
pub fn format_size(bytes: u64) -> String {
    let kb = bytes as f64 / 1024.0;
    if kb > 1024.0 {
        format!("{:.2} MB", kb / 1024.0)
    } else {
        format!("{:.1} KB", kb)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::types::SourceFormat;

    /// Helper: a record whose identity is `name` + `len` bytes.
    fn record(name: &str, len: usize) -> ImageRecord {
        ImageRecord::new(name, vec![0u8; len], SourceFormat::Jpeg, 40, 30)
    }

    fn names(collection: &ImageCollection) -> Vec<String> {
        collection.iter().map(|r| r.name().to_string()).collect()
    }

    #[test]
    fn duplicate_append_is_a_no_op() {
        let mut collection = ImageCollection::new();
        assert!(collection.append(record("a.jpg", 10)));
        assert!(!collection.append(record("a.jpg", 10)));
        assert_eq!(collection.len(), 1);

        let added = collection.extend(vec![record("a.jpg", 10)]);
        assert_eq!(added, 0);
    }

    #[test]
    fn same_name_different_size_is_a_different_image() {
        let mut collection = ImageCollection::new();
        let added = collection.extend(vec![record("a.jpg", 10), record("a.jpg", 11)]);
        assert_eq!(added, 2);
    }

    #[test]
    fn four_rotations_return_to_start() {
        let mut collection: ImageCollection = vec![record("a.jpg", 1)].into_iter().collect();
        let start = collection.get(0).expect("record").rotation;
        for _ in 0..4 {
            collection.rotate(0).expect("rotate");
        }
        assert_eq!(collection.get(0).expect("record").rotation, start);
    }

    #[test]
    fn move_preserves_membership() {
        let mut collection: ImageCollection = ["a", "b", "c", "d"]
            .iter()
            .map(|n| record(n, 1))
            .collect();
        let before: HashSet<_> = collection.iter().map(|r| r.identity.clone()).collect();

        collection.move_item(0, 2).expect("move");
        assert_eq!(names(&collection), ["b", "c", "a", "d"]);

        collection.move_item(3, 0).expect("move");
        assert_eq!(names(&collection), ["d", "b", "c", "a"]);

        collection.move_item(1, 1).expect("no-op move");
        assert_eq!(names(&collection), ["d", "b", "c", "a"]);

        let after: HashSet<_> = collection.iter().map(|r| r.identity.clone()).collect();
        assert_eq!(collection.len(), 4);
        assert_eq!(before, after);
    }

    #[test]
    fn remove_renumbers_following_records() {
        let mut collection: ImageCollection = ["a", "b", "c"].iter().map(|n| record(n, 1)).collect();
        let removed = collection.remove(1).expect("remove");
        assert_eq!(removed.name(), "b");
        assert_eq!(names(&collection), ["a", "c"]);
        assert_eq!(collection.position_of(&ImageIdentity::new("c", 1)), Some(1));
    }

    #[test]
    fn out_of_range_indices_are_errors() {
        let mut collection: ImageCollection = vec![record("a", 1)].into_iter().collect();
        assert!(matches!(
            collection.remove(1),
            Err(BildwerkError::IndexOutOfRange { index: 1, len: 1 })
        ));
        assert!(collection.move_item(0, 5).is_err());
        assert!(collection.rotate(9).is_err());
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn snapshot_is_isolated_from_later_mutation() {
        let mut collection: ImageCollection = ["a", "b"].iter().map(|n| record(n, 1)).collect();
        let snapshot = collection.snapshot();
        collection.clear();
        collection.append(record("z", 1));

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].name(), "a");
        assert!(Arc::ptr_eq(&snapshot[0].data, &snapshot[0].clone().data));
    }

    #[test]
    fn rotate_by_identity() {
        let mut collection: ImageCollection = ["a", "b"].iter().map(|n| record(n, 1)).collect();
        let rotation = collection.rotate_identity(&ImageIdentity::new("b", 1));
        assert_eq!(rotation, Some(Rotation::Deg90));
        assert_eq!(collection.rotate_identity(&ImageIdentity::new("x", 1)), None);
    }

    #[test]
    fn totals_and_size_formatting() {
        let collection: ImageCollection = vec![record("a", 1024), record("b", 512)]
            .into_iter()
            .collect();
        assert_eq!(collection.total_bytes(), 1536);
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }
}
