//! Background loader: reads and encodes a tile off the render thread.
//!
//! Protocol: zero or more `Status` messages, then exactly one terminal
//! message, either `Loaded` (the texture moves to the receiver) or `Failed`.
//! Records, statistics and the slot map never leave the worker.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};

use canopy_core::constants::PROGRESS_REPORT_INTERVAL;
use canopy_core::{TileConfig, TileLoad};
use canopy_ingest::{IngestError, RecordParser, TileSource};

use crate::encoder::TileEncoder;

pub const TASK_READING: &str = "Reading records";
pub const TASK_PROCESSING: &str = "Processing data";

/// Messages sent from the loader to its consumer.
#[derive(Debug)]
pub enum LoaderMessage {
    Status {
        task: String,
        progress: Option<f32>,
    },
    /// Terminal. No texture was produced; the request may be re-issued.
    Failed { task: String },
    /// Terminal. Ownership of the finished tile.
    Loaded(Box<TileLoad>),
}

impl LoaderMessage {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LoaderMessage::Status { .. })
    }
}

fn status(task: &str, progress: Option<f32>) -> LoaderMessage {
    LoaderMessage::Status {
        task: task.to_string(),
        progress,
    }
}

/// Result of a non-blocking poll on a loader.
#[derive(Debug)]
pub enum LoaderPoll {
    Message(LoaderMessage),
    /// The loader is still running.
    Pending,
    /// The loader is gone and nothing is queued. Ends any poll loop, even if
    /// no terminal message was ever received.
    Disconnected,
}

/// Receiving end of a spawned loader.
pub struct LoaderHandle {
    receiver: Receiver<LoaderMessage>,
    thread: Option<JoinHandle<()>>,
}

impl LoaderHandle {
    /// Non-blocking poll.
    pub fn try_recv(&self) -> LoaderPoll {
        match self.receiver.try_recv() {
            Ok(message) => LoaderPoll::Message(message),
            Err(TryRecvError::Empty) => LoaderPoll::Pending,
            Err(TryRecvError::Disconnected) => LoaderPoll::Disconnected,
        }
    }

    /// Block until the next message. None once the loader has finished.
    pub fn recv(&self) -> Option<LoaderMessage> {
        self.receiver.recv().ok()
    }

    /// Block until the terminal message, passing status updates to `on_status`.
    pub fn wait(mut self, mut on_status: impl FnMut(&str, Option<f32>)) -> Result<TileLoad, String> {
        let mut outcome = Err("loader exited without a result".to_string());
        while let Some(message) = self.recv() {
            match message {
                LoaderMessage::Status { task, progress } => on_status(&task, progress),
                LoaderMessage::Failed { task } => {
                    outcome = Err(task);
                    break;
                }
                LoaderMessage::Loaded(tile) => {
                    outcome = Ok(*tile);
                    break;
                }
            }
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("Loader thread panicked");
            }
        }
        outcome
    }
}

/// Start a loader thread for `source`.
pub fn spawn_loader(source: TileSource, config: TileConfig) -> std::io::Result<LoaderHandle> {
    let (tx, rx) = mpsc::channel();
    let thread = thread::Builder::new()
        .name("tile-loader".to_string())
        .spawn(move || {
            run_loader(source, &config, |message| {
                // A dropped receiver means nobody is listening any more.
                let _ = tx.send(message);
            });
        })?;
    Ok(LoaderHandle {
        receiver: rx,
        thread: Some(thread),
    })
}

/// Run the full load synchronously, reporting through `emit`.
/// Always ends with exactly one terminal message.
pub fn run_loader(source: TileSource, config: &TileConfig, mut emit: impl FnMut(LoaderMessage)) {
    let name = source.describe();
    emit(status(TASK_READING, None));
    match build_tile(source, config, &mut emit) {
        Ok(tile) => emit(LoaderMessage::Loaded(Box::new(tile))),
        Err(e) => {
            log::error!("Failed to load {name}: {e}");
            emit(LoaderMessage::Failed {
                task: format!("Failed to load {name}: {e}"),
            });
        }
    }
}

fn build_tile(
    source: TileSource,
    config: &TileConfig,
    emit: &mut impl FnMut(LoaderMessage),
) -> Result<TileLoad, IngestError> {
    let mut reader = source.open()?;
    let mut parser = RecordParser::new();
    while let Some(chunk) = reader.next_chunk()? {
        parser.feed(chunk)?;
        emit(status(TASK_READING, reader.progress()));
    }
    log::debug!(
        "Read {} bytes, {} complete records",
        reader.bytes_read(),
        parser.records_parsed()
    );
    let corpus = parser.finish()?;

    let mut encoder = TileEncoder::new(&corpus.statistics, config)?;
    let total = corpus.records.len().max(1);
    for (i, record) in corpus.records.iter().enumerate() {
        if i % PROGRESS_REPORT_INTERVAL == 0 {
            emit(status(TASK_PROCESSING, Some(i as f32 / total as f32)));
        }
        encoder.encode(record);
    }
    emit(status(TASK_PROCESSING, Some(1.0)));

    let (tile, _report) = encoder.finish();
    Ok(tile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    const SAMPLE: &str = "Year,Cell,SLA,Wooddens,Longevity,Height\n\
        2000,0,1.0,1.0,1.0,10\n\
        2000,1,1.0,1.0,1.0,20\n\
        2001,0,1.0,1.0,1.0,10\n";

    fn collect(source: TileSource) -> Vec<LoaderMessage> {
        let mut messages = Vec::new();
        run_loader(source, &TileConfig::default(), |m| messages.push(m));
        messages
    }

    #[test]
    fn test_exactly_one_terminal_message_last() {
        let messages = collect(TileSource::Memory(SAMPLE.as_bytes().to_vec()));
        let terminal: Vec<_> = messages.iter().filter(|m| m.is_terminal()).collect();
        assert_eq!(terminal.len(), 1);
        assert!(messages.last().expect("has messages").is_terminal());
        assert!(matches!(messages.last(), Some(LoaderMessage::Loaded(_))));
    }

    #[test]
    fn test_progress_in_unit_range() {
        for message in collect(TileSource::Memory(SAMPLE.as_bytes().to_vec())) {
            if let LoaderMessage::Status {
                progress: Some(p), ..
            } = message
            {
                assert!((0.0..=1.0).contains(&p), "progress {p} out of range");
            }
        }
    }

    #[test]
    fn test_loaded_tile_contents() {
        let messages = collect(TileSource::Memory(SAMPLE.as_bytes().to_vec()));
        let Some(LoaderMessage::Loaded(tile)) = messages.into_iter().last() else {
            panic!("expected a loaded tile");
        };
        assert_eq!(tile.cell_rows_per_tile, 1);
        assert_eq!(tile.tree_rows_per_cell, 6);
        assert_eq!(tile.tree_rows_per_tile, 6);
        assert_eq!(tile.first_year, 2000);
        assert_eq!(tile.last_year, 2001);
        assert_eq!(tile.year_count, 1);
        let lit: Vec<u8> = tile
            .texture
            .as_bytes()
            .iter()
            .copied()
            .filter(|&b| b != 0)
            .collect();
        assert_eq!(lit, vec![128, 128]);
    }

    #[test]
    fn test_missing_source_fails_without_texture() {
        let messages = collect(TileSource::File(PathBuf::from("/no/such/tile.csv")));
        match messages.last() {
            Some(LoaderMessage::Failed { task }) => assert!(task.contains("Failed to load")),
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(!messages
            .iter()
            .any(|m| matches!(m, LoaderMessage::Loaded(_))));
    }

    #[test]
    fn test_spawned_loader_transfers_tile() {
        let handle = spawn_loader(
            TileSource::Memory(SAMPLE.as_bytes().to_vec()),
            TileConfig::default(),
        )
        .expect("spawn loader");
        let mut statuses = 0;
        let tile = handle
            .wait(|_, _| statuses += 1)
            .expect("load should succeed");
        assert!(statuses >= 2);
        assert_eq!(tile.texture.as_bytes().len(), 6 * 6 * 2);
    }

    #[test]
    fn test_bad_header_reports_failure() {
        let handle = spawn_loader(
            TileSource::Memory(b"Year,Cell\n2000,0\n".to_vec()),
            TileConfig::default(),
        )
        .expect("spawn loader");
        let err = handle.wait(|_, _| {}).expect_err("load should fail");
        assert!(err.contains("missing required column"), "got: {err}");
    }

    #[test]
    fn test_outlier_year_span_reports_failure() {
        let text = "Year,Cell,SLA,Wooddens,Longevity,Height\n\
            -2147483648,0,1.0,1.0,1.0,10\n\
            2147483647,0,1.0,1.0,1.0,10\n";
        let messages = collect(TileSource::Memory(text.as_bytes().to_vec()));
        match messages.last() {
            Some(LoaderMessage::Failed { task }) => {
                assert!(task.contains("year layers"), "got: {task}")
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_outlier_cell_still_loads() {
        let text = "Year,Cell,SLA,Wooddens,Longevity,Height\n\
            2000,0,1.0,1.0,1.0,10\n\
            2000,4000000000,1.0,1.0,1.0,5\n";
        let config = TileConfig {
            max_cell_rows_per_tile: 4,
            ..TileConfig::default()
        };
        let mut messages = Vec::new();
        run_loader(TileSource::Memory(text.as_bytes().to_vec()), &config, |m| {
            messages.push(m)
        });
        let Some(LoaderMessage::Loaded(tile)) = messages.into_iter().last() else {
            panic!("expected a loaded tile");
        };
        assert_eq!(tile.cell_rows_per_tile, 4);
        assert_eq!(tile.texture.as_bytes().len(), 24 * 24);
    }

    #[test]
    fn test_polling_reaches_terminal_then_disconnect() {
        let handle = spawn_loader(
            TileSource::Memory(SAMPLE.as_bytes().to_vec()),
            TileConfig::default(),
        )
        .expect("spawn loader");

        let mut terminal = None;
        let mut disconnected = false;
        while !disconnected {
            match handle.try_recv() {
                LoaderPoll::Message(message) if message.is_terminal() => {
                    assert!(terminal.is_none(), "second terminal message");
                    terminal = Some(message);
                }
                LoaderPoll::Message(_) => {}
                LoaderPoll::Pending => thread::sleep(Duration::from_millis(1)),
                LoaderPoll::Disconnected => disconnected = true,
            }
        }
        assert!(matches!(terminal, Some(LoaderMessage::Loaded(_))));
    }

    #[test]
    fn test_dropped_sender_is_reported() {
        let (tx, rx) = mpsc::channel::<LoaderMessage>();
        let handle = LoaderHandle {
            receiver: rx,
            thread: None,
        };
        tx.send(status(TASK_READING, None)).expect("send");
        assert!(matches!(handle.try_recv(), LoaderPoll::Message(_)));
        assert!(matches!(handle.try_recv(), LoaderPoll::Pending));

        drop(tx);
        assert!(matches!(handle.try_recv(), LoaderPoll::Disconnected));
        let err = handle.wait(|_, _| {}).expect_err("no terminal message");
        assert!(err.contains("without a result"), "got: {err}");
    }
}
