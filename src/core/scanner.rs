//! Line-oriented barcode scanner input.
//!
//! Hardware scanners in keyboard-wedge or serial mode deliver one barcode per
//! line. A [`ScannerSession`] opens such a device (a tty, FIFO or plain file),
//! reads it on a dedicated thread and posts every decoded barcode to the
//! session channel.
//!
//! The device is opened non-blocking on the caller's thread, so a FIFO with no
//! writer yet does not stall the session and an unreadable device fails with
//! [`BarcoError::ScannerUnavailable`] before anything starts. The reader thread
//! is the sole owner of the device handle and checks its stop flag at least
//! every [`POLL_INTERVAL`]. Stopping (or dropping) the session raises the flag
//! and joins the reader, so the handle is closed by the time `stop` returns.
//! Each session carries a generation number so events from a stopped session
//! that were already queued can be told apart from those of its successor.
//!
//! A FIFO is followed across writers: end of input only means no writer is
//! connected right now. Plain files and ttys end the session at end of input.

use crate::core::error::{BarcoError, Result};
use crate::core::state::validate_barcode;
use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How long the reader sleeps when the device has no input
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    Scanned { generation: u64, barcode: String },
    Closed { generation: u64, error: Option<String> },
}

impl ScanEvent {
    pub fn generation(&self) -> u64 {
        match self {
            Self::Scanned { generation, .. } | Self::Closed { generation, .. } => *generation,
        }
    }
}

pub struct ScannerSession {
    generation: u64,
    device: PathBuf,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ScannerSession {
    /// Open `device` and start reading barcodes from it
    pub fn start<E, F>(device: &Path, generation: u64, events: Sender<E>, wrap: F) -> Result<Self>
    where
        E: Send + 'static,
        F: Fn(ScanEvent) -> E + Send + 'static,
    {
        let file = open_device(device).map_err(|e| BarcoError::scanner_unavailable(device, e))?;
        let follow = is_fifo(&file);
        let stop = Arc::new(AtomicBool::new(false));

        let reader_stop = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name(format!("scanner-{generation}"))
            .spawn(move || {
                let error = read_barcodes(file, &reader_stop, follow, |barcode| {
                    events
                        .send(wrap(ScanEvent::Scanned {
                            generation,
                            barcode,
                        }))
                        .is_ok()
                });
                let _ = events.send(wrap(ScanEvent::Closed { generation, error }));
            })?;

        log::debug!("Scanner {generation} reading {}", device.display());
        Ok(Self {
            generation,
            device: device.to_path_buf(),
            stop,
            handle: Some(handle),
        })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn device(&self) -> &Path {
        &self.device
    }

    /// Stop the reader and release the device
    pub fn stop(mut self) {
        self.signal_stop();
    }

    fn signal_stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("Scanner {} reader panicked", self.generation);
            }
        }
        log::debug!("Scanner {} stopped", self.generation);
    }
}

impl Drop for ScannerSession {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.signal_stop();
        }
    }
}

fn open_device(device: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.read(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.custom_flags(libc::O_NONBLOCK);
    }
    options.open(device)
}

#[cfg(unix)]
fn is_fifo(file: &File) -> bool {
    use std::os::unix::fs::FileTypeExt;
    file.metadata()
        .map(|meta| meta.file_type().is_fifo())
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_fifo(_file: &File) -> bool {
    false
}

/// Read barcodes until end of input, a read error, a stop request or a
/// closed channel
///
/// With `follow`, end of input is treated like "no data yet". Returns the read
/// error message, if any.
fn read_barcodes<R: Read>(
    mut reader: R,
    stop: &AtomicBool,
    follow: bool,
    mut emit: impl FnMut(String) -> bool,
) -> Option<String> {
    let mut pending: Vec<u8> = Vec::new();
    let mut chunk = [0u8; 512];

    loop {
        if stop.load(Ordering::SeqCst) {
            return None;
        }
        match reader.read(&mut chunk) {
            Ok(0) if follow => thread::sleep(POLL_INTERVAL),
            Ok(0) => {
                if !pending.is_empty() {
                    let line = std::mem::take(&mut pending);
                    emit_line(&line, stop, &mut emit);
                }
                return None;
            }
            Ok(n) => {
                pending.extend_from_slice(&chunk[..n]);
                while let Some(end) = pending.iter().position(|&b| b == b'\n') {
                    let line: Vec<u8> = pending.drain(..=end).collect();
                    if !emit_line(&line, stop, &mut emit) {
                        return None;
                    }
                }
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => thread::sleep(POLL_INTERVAL),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Some(e.to_string()),
        }
    }
}

/// Hand one raw line to `emit`; `false` means reading should end
fn emit_line(line: &[u8], stop: &AtomicBool, emit: &mut impl FnMut(String) -> bool) -> bool {
    if stop.load(Ordering::SeqCst) {
        return false;
    }
    let text = String::from_utf8_lossy(line);
    if text.trim().is_empty() {
        return true;
    }
    match validate_barcode(&text) {
        Ok(barcode) => emit(barcode),
        Err(e) => {
            log::warn!("Ignoring scanner input: {e}");
            true
        }
    }
}
