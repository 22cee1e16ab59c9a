// CLASSIFICATION: COMMUNITY
// Filename: trigger.rs v0.2
// Date Modified: 2026-10-19
// Author: Lukas Bower
//
// ─────────────────────────────────────────────────────────────
// micboot · Boot Trigger
//
// Starts a card boot by writing a descriptor to the MIC driver's
// sysfs `state` attribute.  The write only requests a boot; the
// doorbells are what confirm it happened.
//
// Descriptor grammar:
//
//   boot:linux:<loader-image>:<payload-image>
// ─────────────────────────────────────────────────────────────

use log::{debug, info};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while triggering a boot.
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("Couldn't open file {} ({source})", .path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("Couldn't write file {} ({source})", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("Couldn't write file {} (short write: {written} of {expected} bytes)", .path.display())]
    ShortWrite {
        path: PathBuf,
        written: usize,
        expected: usize,
    },
}

/// Loader and payload images handed to the card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootDescriptor {
    pub loader: String,
    pub payload: String,
}

impl BootDescriptor {
    pub fn new(loader: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            loader: loader.into(),
            payload: payload.into(),
        }
    }
}

impl fmt::Display for BootDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "boot:linux:{}:{}", self.loader, self.payload)
    }
}

/// Writable control attribute of one card.
#[derive(Debug, Clone)]
pub struct ControlChannel {
    path: PathBuf,
}

impl ControlChannel {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current card state as reported by the driver, trimmed.
    pub fn state(&self) -> io::Result<String> {
        fs::read_to_string(&self.path).map(|s| s.trim().to_string())
    }

    /// Write `descriptor` to the channel in a single call.
    ///
    /// The file is closed before returning, success or not.
    pub fn trigger(&self, descriptor: &BootDescriptor) -> Result<(), TriggerError> {
        let payload = descriptor.to_string();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)
            .map_err(|source| TriggerError::Open {
                path: self.path.clone(),
                source,
            })?;

        debug!("trigger: writing '{}' to {}", payload, self.path.display());
        let sent = self.deliver(&mut file, &payload);
        drop(file);
        sent?;

        info!("boot requested via {}", self.path.display());
        Ok(())
    }

    /// One `write` of `payload` into `sink`; a partial write is an error.
    fn deliver<W: Write>(&self, sink: &mut W, payload: &str) -> Result<(), TriggerError> {
        let written = sink
            .write(payload.as_bytes())
            .map_err(|source| TriggerError::Write {
                path: self.path.clone(),
                source,
            })?;
        if written != payload.len() {
            return Err(TriggerError::ShortWrite {
                path: self.path.clone(),
                written,
                expected: payload.len(),
            });
        }
        Ok(())
    }
}

// ───────────────────────────── tests ─────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn descriptor_format() {
        let d = BootDescriptor::new("/boot/weever", "/boot/kernel.bin");
        assert_eq!(d.to_string(), "boot:linux:/boot/weever:/boot/kernel.bin");
    }

    #[test]
    fn writes_full_descriptor() {
        let file = NamedTempFile::new().unwrap();
        let chan = ControlChannel::new(file.path());
        let d = BootDescriptor::new("/a", "/b");
        chan.trigger(&d).unwrap();
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "boot:linux:/a:/b");
        assert_eq!(chan.state().unwrap(), "boot:linux:/a:/b");
    }

    #[test]
    fn missing_channel_names_path() {
        let chan = ControlChannel::new("/nonexistent/mic9/state");
        let err = chan.trigger(&BootDescriptor::new("/a", "/b")).unwrap_err();
        assert!(matches!(err, TriggerError::Open { .. }));
        let msg = err.to_string();
        assert!(msg.starts_with("Couldn't open file /nonexistent/mic9/state ("));
    }

    /// Accepts at most `limit` bytes per call.
    struct Trickle {
        limit: usize,
        taken: Vec<u8>,
    }

    impl Write for Trickle {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = buf.len().min(self.limit);
            self.taken.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn partial_write_is_short_write() {
        let chan = ControlChannel::new("/sys/class/mic/mic0/state");
        let mut sink = Trickle {
            limit: 4,
            taken: Vec::new(),
        };
        let err = chan.deliver(&mut sink, "boot:linux:/a:/b").unwrap_err();
        match &err {
            TriggerError::ShortWrite {
                written, expected, ..
            } => {
                assert_eq!(*written, 4);
                assert_eq!(*expected, 16);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(sink.taken, b"boot");
        assert_eq!(
            err.to_string(),
            "Couldn't write file /sys/class/mic/mic0/state (short write: 4 of 16 bytes)"
        );
    }

    #[test]
    fn whole_write_is_accepted() {
        let chan = ControlChannel::new("/sys/class/mic/mic0/state");
        let mut sink = Trickle {
            limit: usize::MAX,
            taken: Vec::new(),
        };
        chan.deliver(&mut sink, "boot:linux:/a:/b").unwrap();
        assert_eq!(sink.taken, b"boot:linux:/a:/b");
    }

    #[test]
    fn full_device_is_write_error() {
        let full = Path::new("/dev/full");
        if !full.exists() {
            return;
        }
        let chan = ControlChannel::new(full);
        let err = chan.trigger(&BootDescriptor::new("/a", "/b")).unwrap_err();
        assert!(matches!(err, TriggerError::Write { .. }));
        assert!(err.to_string().starts_with("Couldn't write file /dev/full ("));
    }

    #[test]
    fn directory_channel_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let chan = ControlChannel::new(dir.path());
        assert!(chan.trigger(&BootDescriptor::new("/a", "/b")).is_err());
    }
}
