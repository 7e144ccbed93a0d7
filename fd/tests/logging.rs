use std::{
    io,
    sync::{Arc, Mutex},
};

use handle_map_fd::{DescriptorError, DescriptorTable, TableConfig};
use tracing::Level;

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

impl Captured {
    fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes).lines().map(String::from).collect()
    }
}

fn capture<F: FnOnce()>(f: F) -> Vec<String> {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, f);
    captured.lines()
}

#[test]
fn stale_descriptors_are_not_warnings() {
    let lines = capture(|| {
        let mut table = DescriptorTable::new();
        let fd = table.open(1);
        assert_eq!(table.close(fd), Ok(1));

        assert!(matches!(table.get(fd), Err(DescriptorError::Closed { .. })));
        assert!(matches!(table.close(fd), Err(DescriptorError::Closed { .. })));
    });

    let rejected = lines.iter().filter(|line| line.contains("rejected descriptor")).collect::<Vec<_>>();
    assert_eq!(rejected.len(), 2, "{:#?}", lines);
    assert!(rejected.iter().all(|line| line.contains("DEBUG")), "{:#?}", lines);
    assert!(lines.iter().all(|line| !line.contains("WARN")), "{:#?}", lines);
}

#[test]
fn foreign_descriptors_are_warnings() {
    let lines = capture(|| {
        let mut files = DescriptorTable::with_config(TableConfig { type_id: 0, reserve: 0 });
        let mut sockets = DescriptorTable::with_config(TableConfig { type_id: 1, reserve: 0 });
        files.open("file");
        let socket = sockets.open("socket");

        assert!(matches!(files.get(socket), Err(DescriptorError::Foreign { .. })));
    });

    let rejected = lines.iter().filter(|line| line.contains("rejected foreign descriptor")).collect::<Vec<_>>();
    assert_eq!(rejected.len(), 1, "{:#?}", lines);
    assert!(rejected[0].contains("WARN"), "{:#?}", lines);
}
