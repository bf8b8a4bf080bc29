use std::{
    cell::RefCell,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use serde::Serialize;

use crate::{Envelope, Meta, Result, monitoring::Monitor};

/// Records every dispatched envelope's metadata to a JSON Lines file.
///
/// Payloads are opaque to the bus and are not recorded; each line carries
/// the envelope [`Meta`], the payload type name and the number of
/// subscribers it was dispatched to.
pub struct Recorder {
    writer: RefCell<BufWriter<File>>,
}

#[derive(Serialize)]
struct Record<'a> {
    meta: &'a Meta,
    payload_type: &'static str,
    subscribers: usize,
}

impl Recorder {
    /// Create a new recorder that writes to the specified path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: RefCell::new(BufWriter::new(file)),
        })
    }

    fn write(&self, record: &Record<'_>) -> std::io::Result<()> {
        let mut writer = self.writer.borrow_mut();
        serde_json::to_writer(&mut *writer, record)?;
        writer.write_all(b"\n")?;
        writer.flush()
    }
}

impl Monitor for Recorder {
    fn on_event_dispatched(&self, envelope: &Envelope, subscribers: usize) {
        let record = Record {
            meta: envelope.meta(),
            payload_type: envelope.payload_type_name(),
            subscribers,
        };
        if let Err(e) = self.write(&record) {
            tracing::warn!(error = %e, "Recorder failed to write event");
        }
    }

    fn name(&self) -> std::borrow::Cow<'static, str> {
        "recorder".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventType;

    #[test]
    fn test_recorder_writes_json_lines() {
        let path = std::env::temp_dir().join(format!("tapline-{}.jsonl", uuid::Uuid::new_v4()));
        let recorder = Recorder::new(&path).unwrap();

        let envelope = Envelope::new(EventType::from("beer-data-fetched"), vec![1_u32, 2, 3]);
        recorder.on_event_dispatched(&envelope, 2);
        recorder.on_event_dispatched(&envelope, 1);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let record: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(record["meta"]["event_type"], "beer-data-fetched");
        assert_eq!(record["subscribers"], 2);
        assert!(record["payload_type"].as_str().unwrap().contains("Vec<u32>"));

        let _ = std::fs::remove_file(&path);
    }
}
