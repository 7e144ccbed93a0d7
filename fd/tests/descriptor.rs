use std::error::Error;

use handle_map_fd::{Descriptor, DescriptorError, DescriptorTable, InvalidHandle, TableConfig};
use proptest::prelude::*;

#[derive(Debug, PartialEq)]
struct File {
    path: &'static str,
    cursor: u64,
}

impl File {
    fn open(path: &'static str) -> Self { Self { path, cursor: 0 } }
}

#[test]
fn closed_descriptor_stays_closed_after_reuse() {
    let mut table = DescriptorTable::new();
    let log = table.open(File::open("log.txt"));
    let data = table.open(File::open("data.bin"));

    assert_eq!(table.close(log).map(|file| file.path), Ok("log.txt"));

    let config = table.open(File::open("config.toml"));
    assert_eq!(config.handle().index(), log.handle().index());
    assert_ne!(config, log);

    let err = table.get(log).unwrap_err();
    assert_eq!(err.descriptor(), Some(log));
    assert!(matches!(err, DescriptorError::Closed { .. }));
    assert!(matches!(
        err.source().and_then(|source| source.downcast_ref::<InvalidHandle>()),
        Some(InvalidHandle::StaleGeneration { .. })
    ));

    assert_eq!(table.get(config).map(|file| file.path), Ok("config.toml"));
    assert_eq!(table.get(data).map(|file| file.path), Ok("data.bin"));
}

#[test]
fn seek_through_with() {
    let mut table = DescriptorTable::new();
    let fd = table.open(File::open("a"));

    let cursor = table.with(fd, |file| {
        file.cursor += 128;
        file.cursor
    });
    assert_eq!(cursor, Ok(128));
    assert_eq!(table.get(fd).map(|file| file.cursor), Ok(128));
}

#[test]
fn descriptors_from_other_tables_are_foreign() {
    let mut files = DescriptorTable::with_config(TableConfig { type_id: 1, reserve: 4 });
    let mut sockets = DescriptorTable::with_config(TableConfig { type_id: 0, reserve: 4 });

    let file = files.open("file");
    let socket = sockets.open("socket");

    assert!(matches!(files.get(socket), Err(DescriptorError::Foreign { .. })));
    assert!(matches!(sockets.close(file), Err(DescriptorError::Foreign { .. })));
    assert_eq!(sockets.len(), 1);
}

#[test]
fn close_all_invalidates_everything() {
    let mut table = DescriptorTable::new();
    let fds = (0..8).map(|i| table.open(i)).collect::<Vec<_>>();

    assert_eq!(table.close_all(), 8);
    assert!(table.is_empty());
    assert!(fds.iter().all(|&fd| !table.is_open(fd)));

    let fresh = table.open(100);
    assert!(fds.iter().all(|&fd| fd != fresh));
    assert_eq!(table.descriptors().collect::<Vec<_>>(), [fresh]);
}

#[test]
fn raw_round_trip() {
    let mut table = DescriptorTable::new();
    let fd = table.open("stdin");
    let raw = u32::from(fd);

    assert_eq!(Descriptor::from_raw(raw), Some(fd));
    assert_eq!(table.lookup(raw), Ok(&"stdin"));
    assert_eq!(fd.to_string(), raw.to_string());
}

proptest! {
    #[test]
    fn open_close_matches_model(ops in proptest::collection::vec(any::<Option<u8>>(), 1..100)) {
        let mut table = DescriptorTable::new();
        let mut open: Vec<(Descriptor, u8)> = Vec::new();
        let mut closed: Vec<Descriptor> = Vec::new();

        for op in ops {
            match op {
                Some(value) => open.push((table.open(value), value)),
                None if !open.is_empty() => {
                    let (fd, value) = open.remove(0);
                    prop_assert_eq!(table.close(fd), Ok(value));
                    closed.push(fd);
                }
                None => {}
            }

            prop_assert_eq!(table.len(), open.len());
            for &(fd, value) in &open {
                prop_assert_eq!(table.get(fd), Ok(&value));
            }
            for &fd in &closed {
                prop_assert!(!table.is_open(fd));
            }
        }

        let mut listed = table.iter().map(|(fd, &value)| (fd, value)).collect::<Vec<_>>();
        listed.sort_unstable();
        open.sort_unstable();
        prop_assert_eq!(listed, open);
    }
}
