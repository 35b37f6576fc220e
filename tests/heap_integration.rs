//! Integration tests for heap files on both storage backends.

use std::sync::Arc;

use equijoin::heap::{HeapFile, RecordId};
use equijoin::relation::{Cursor, Relation};
use equijoin::storage::{FileStorage, MemoryStorage, Storage, StorageError};
use tempfile::tempdir;

const LEN: usize = 100;

fn tuple(n: u32) -> [u8; LEN] {
    let mut buf = [0u8; LEN];
    buf[..4].copy_from_slice(&n.to_le_bytes());
    buf[LEN - 1] = (n % 251) as u8;
    buf
}

fn fill_and_scan<S: Storage>(storage: Arc<S>) {
    let mut file = HeapFile::create(storage).unwrap();
    let rids: Vec<RecordId> = (0..500).map(|n| file.insert(&tuple(n)).unwrap()).collect();
    assert_eq!(file.len(), 500);
    assert!(file.page_ids().len() > 1);

    let mut cursor = file.open_cursor().unwrap();
    let mut buf = [0u8; LEN];
    let mut n = 0;
    while let Some(rid) = cursor.read_next(&mut buf).unwrap() {
        assert_eq!(rid, rids[n as usize]);
        assert_eq!(buf, tuple(n));
        n += 1;
    }
    assert_eq!(n, 500);

    // Reposition into the middle of the second page.
    let target = rids
        .iter()
        .position(|rid| rid.page_id == file.page_ids()[1])
        .unwrap()
        + 3;
    cursor.move_to(rids[target]).unwrap();
    assert_eq!(cursor.read_next(&mut buf).unwrap(), Some(rids[target]));
    assert_eq!(buf, tuple(target as u32));

    cursor.rewind().unwrap();
    assert_eq!(cursor.read_next(&mut buf).unwrap(), Some(rids[0]));

    file.fetch(rids[321], &mut buf).unwrap();
    assert_eq!(buf, tuple(321));
}

#[test]
fn test_heap_file_on_memory_storage() {
    fill_and_scan(Arc::new(MemoryStorage::new()));
}

#[test]
fn test_heap_file_on_file_storage() {
    let dir = tempdir().unwrap();
    fill_and_scan(Arc::new(FileStorage::open(dir.path().join("heap.db")).unwrap()));
}

#[test]
fn test_ephemeral_relations_release_pages() {
    let dir = tempdir().unwrap();
    let storage = Arc::new(FileStorage::open(dir.path().join("heap.db")).unwrap());

    let base = HeapFile::create(Arc::clone(&storage)).unwrap();
    {
        let mut scratch = base.create_ephemeral().unwrap();
        for n in 0..300 {
            scratch.insert(&tuple(n)).unwrap();
        }
        assert!(storage.page_count() > 1);
    }
    assert_eq!(storage.page_count(), 1);

    // Freed pages are reused by the next relation.
    let mut again = base.create_ephemeral().unwrap();
    again.insert(&tuple(1)).unwrap();
    assert_eq!(storage.page_count(), 2);
}

#[test]
fn test_wrong_staging_buffer() {
    let storage = Arc::new(MemoryStorage::new());
    let mut file = HeapFile::create(storage).unwrap();
    let rid = file.insert(&tuple(7)).unwrap();

    let mut short = [0u8; LEN - 1];
    assert!(matches!(
        file.fetch(rid, &mut short),
        Err(StorageError::TupleLengthMismatch { .. })
    ));
    let mut cursor = file.open_cursor().unwrap();
    assert!(matches!(
        cursor.read_next(&mut short),
        Err(StorageError::TupleLengthMismatch { .. })
    ));
}
