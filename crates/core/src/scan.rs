//! Patient scan input.
//!
//! A scanner is any device that turns an optical code into text. The rest of the system only
//! ever sees the decoded patient identifier. [`ScanSession`] scopes the device: it is
//! acquired when the session begins and released on the first successful decode or when the
//! session is dropped, whichever comes first.
//!
//! Device trouble never reaches the operator. Failures are logged. A frame that failed to
//! decode is skipped and scanning continues. If the device itself fails the session keeps
//! showing as scanning but stops polling, and waits for the operator to dismiss it.

use needle_types::PatientId;
use std::io::{self, BufRead};

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The device could not be started or stopped working.
    #[error("scan device unavailable: {0}")]
    Device(String),
    /// One read produced nothing usable; the device is still live.
    #[error("failed to decode scan: {0}")]
    Decode(String),
}

/// Result of polling a scanner once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanPoll {
    Decoded(String),
    /// Nothing decoded yet.
    Pending,
    /// The input has ended; no further decodes will arrive.
    Closed,
}

/// An optical-code reader.
pub trait ScanInput {
    fn start(&mut self) -> Result<(), ScanError>;
    fn poll(&mut self) -> Result<ScanPoll, ScanError>;
    fn stop(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Polling,
    /// The device failed; the session still shows as scanning until dismissed.
    DeviceLost,
    Finished,
}

/// One scan from device acquisition to the first decoded patient identifier.
pub struct ScanSession<'a, S: ScanInput + ?Sized> {
    input: &'a mut S,
    state: SessionState,
    acquired: bool,
}

impl<'a, S: ScanInput + ?Sized> ScanSession<'a, S> {
    /// Acquires the device.
    ///
    /// If the device cannot be started the failure is logged and the session stays in the
    /// scanning state without a device: [`ScanSession::next_decoded`] returns `None` without
    /// touching it.
    pub fn begin(input: &'a mut S) -> Self {
        let (state, acquired) = match input.start() {
            Ok(()) => (SessionState::Polling, true),
            Err(e) => {
                tracing::error!("failed to start scanner: {}", e);
                (SessionState::DeviceLost, false)
            }
        };

        Self {
            input,
            state,
            acquired,
        }
    }

    /// True until a patient identifier is decoded or the input closes.
    ///
    /// A session whose device failed is still scanning from the operator's point of view.
    pub fn is_scanning(&self) -> bool {
        self.state != SessionState::Finished
    }

    /// Waits for the first decoded patient identifier and releases the device.
    ///
    /// Returns `None` if the session is already finished, the input closes, or the device
    /// is unavailable. Only a closed input finishes the session; after a device failure
    /// [`ScanSession::is_scanning`] stays true. Blank decodes and per-read decode failures
    /// are skipped.
    pub fn next_decoded(&mut self) -> Option<PatientId> {
        while self.state == SessionState::Polling {
            match self.input.poll() {
                Ok(ScanPoll::Decoded(text)) => match PatientId::new(&text) {
                    Ok(patient_id) => {
                        tracing::debug!("decoded patient {}", patient_id);
                        self.state = SessionState::Finished;
                        self.release();
                        return Some(patient_id);
                    }
                    Err(_) => continue,
                },
                Ok(ScanPoll::Pending) => continue,
                Ok(ScanPoll::Closed) => {
                    tracing::debug!("scan input closed before a patient was decoded");
                    self.state = SessionState::Finished;
                    self.release();
                }
                Err(ScanError::Decode(reason)) => {
                    tracing::error!("scan decode failed: {}", reason);
                }
                Err(e) => {
                    tracing::error!("scanner failed: {}", e);
                    self.state = SessionState::DeviceLost;
                    self.release();
                }
            }
        }
        None
    }

    fn release(&mut self) {
        if self.acquired {
            self.input.stop();
            self.acquired = false;
        }
    }
}

impl<S: ScanInput + ?Sized> Drop for ScanSession<'_, S> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Blocks until the operator closes `console`, discarding anything typed meanwhile.
///
/// Used to hold a scan view whose device failed until the operator dismisses it. A console
/// that fails to read counts as dismissed.
pub fn wait_for_dismissal<R: BufRead>(mut console: R) {
    let mut line = String::new();
    loop {
        line.clear();
        match console.read_line(&mut line) {
            Ok(0) => return,
            Ok(_) => continue,
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::Interrupted | io::ErrorKind::InvalidData
                ) =>
            {
                continue
            }
            Err(e) => {
                tracing::debug!("console closed: {}", e);
                return;
            }
        }
    }
}

/// Scanner that reads one decoded code per line.
///
/// Hardware code readers in keyboard mode type the decoded text followed by a newline, so
/// standard input doubles as the device.
pub struct LineScanner<R: BufRead> {
    reader: R,
    started: bool,
}

impl<R: BufRead> LineScanner<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            started: false,
        }
    }
}

impl<R: BufRead> ScanInput for LineScanner<R> {
    fn start(&mut self) -> Result<(), ScanError> {
        self.started = true;
        Ok(())
    }

    fn poll(&mut self) -> Result<ScanPoll, ScanError> {
        if !self.started {
            return Err(ScanError::Device("scanner not started".into()));
        }

        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => Ok(ScanPoll::Closed),
            Ok(_) => {
                let text = line.trim();
                if text.is_empty() {
                    Ok(ScanPoll::Pending)
                } else {
                    Ok(ScanPoll::Decoded(text.to_owned()))
                }
            }
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                Err(ScanError::Decode(e.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(ScanPoll::Pending),
            Err(e) => Err(ScanError::Device(e.to_string())),
        }
    }

    fn stop(&mut self) {
        self.started = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io::Cursor;

    /// Scripted device that records its start/stop calls.
    #[derive(Default)]
    struct ScriptedScanner {
        fail_start: bool,
        script: VecDeque<Result<ScanPoll, ScanError>>,
        starts: usize,
        stops: usize,
        polls: usize,
    }

    impl ScanInput for ScriptedScanner {
        fn start(&mut self) -> Result<(), ScanError> {
            self.starts += 1;
            if self.fail_start {
                return Err(ScanError::Device("no camera".into()));
            }
            Ok(())
        }

        fn poll(&mut self) -> Result<ScanPoll, ScanError> {
            self.polls += 1;
            self.script.pop_front().unwrap_or(Ok(ScanPoll::Closed))
        }

        fn stop(&mut self) {
            self.stops += 1;
        }
    }

    fn scripted(script: Vec<Result<ScanPoll, ScanError>>) -> ScriptedScanner {
        ScriptedScanner {
            script: script.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_decode_releases_device() {
        let mut scanner = scripted(vec![
            Ok(ScanPoll::Pending),
            Ok(ScanPoll::Decoded("P001".into())),
            Ok(ScanPoll::Decoded("P002".into())),
        ]);

        {
            let mut session = ScanSession::begin(&mut scanner);
            assert!(session.is_scanning());
            assert_eq!(session.next_decoded().unwrap().as_str(), "P001");
            assert!(!session.is_scanning());
            // Inert after the first decode.
            assert!(session.next_decoded().is_none());
        }

        assert_eq!(scanner.starts, 1);
        assert_eq!(scanner.stops, 1);
        assert_eq!(scanner.polls, 2);
    }

    #[test]
    fn test_dropping_session_releases_device() {
        let mut scanner = scripted(vec![]);
        {
            let session = ScanSession::begin(&mut scanner);
            assert!(session.is_scanning());
        }
        assert_eq!(scanner.stops, 1);
    }

    #[test]
    fn test_start_failure_keeps_session_scanning() {
        let mut scanner = ScriptedScanner {
            fail_start: true,
            ..Default::default()
        };
        {
            let mut session = ScanSession::begin(&mut scanner);
            assert!(session.is_scanning());
            assert!(session.next_decoded().is_none());
            assert!(session.is_scanning());
        }
        assert_eq!(scanner.polls, 0);
        assert_eq!(scanner.stops, 0);
    }

    #[test]
    fn test_decode_failures_keep_scanning() {
        let mut scanner = scripted(vec![
            Err(ScanError::Decode("blurred".into())),
            Ok(ScanPoll::Decoded("   ".into())),
            Ok(ScanPoll::Decoded("P009".into())),
        ]);

        let mut session = ScanSession::begin(&mut scanner);
        assert_eq!(session.next_decoded().unwrap().as_str(), "P009");
    }

    #[test]
    fn test_device_failure_keeps_session_scanning() {
        let mut scanner = scripted(vec![
            Err(ScanError::Device("unplugged".into())),
            Ok(ScanPoll::Decoded("P001".into())),
        ]);

        {
            let mut session = ScanSession::begin(&mut scanner);
            assert!(session.next_decoded().is_none());
            assert!(session.is_scanning());

            // The failed device is not polled again.
            assert!(session.next_decoded().is_none());
            assert!(session.is_scanning());
        }
        assert_eq!(scanner.stops, 1);
        assert_eq!(scanner.polls, 1);
    }

    #[test]
    fn test_closed_input_finishes_session() {
        let mut scanner = scripted(vec![Ok(ScanPoll::Pending), Ok(ScanPoll::Closed)]);
        {
            let mut session = ScanSession::begin(&mut scanner);
            assert!(session.next_decoded().is_none());
            assert!(!session.is_scanning());
        }
        assert_eq!(scanner.stops, 1);
    }

    #[test]
    fn test_wait_for_dismissal_drains_console() {
        let typed = "P001\n\nanything\n";
        let mut console = Cursor::new(typed);
        wait_for_dismissal(&mut console);
        assert_eq!(console.position(), typed.len() as u64);
    }

    #[test]
    fn test_wait_for_dismissal_skips_invalid_utf8() {
        let bytes: Vec<u8> = vec![0xff, b'\n', b'x', b'\n'];
        let len = bytes.len() as u64;
        let mut console = Cursor::new(bytes);
        wait_for_dismissal(&mut console);
        assert_eq!(console.position(), len);
    }

    #[test]
    fn test_line_scanner_reads_trimmed_lines() {
        let mut scanner = LineScanner::new(Cursor::new("\n  P001 \r\nP002\n"));
        scanner.start().unwrap();

        assert_eq!(scanner.poll().unwrap(), ScanPoll::Pending);
        assert_eq!(scanner.poll().unwrap(), ScanPoll::Decoded("P001".into()));
        assert_eq!(scanner.poll().unwrap(), ScanPoll::Decoded("P002".into()));
        assert_eq!(scanner.poll().unwrap(), ScanPoll::Closed);
    }

    #[test]
    fn test_line_scanner_requires_start() {
        let mut scanner = LineScanner::new(Cursor::new("P001\n"));
        assert!(matches!(scanner.poll(), Err(ScanError::Device(_))));
    }

    #[test]
    fn test_line_scanner_skips_invalid_utf8() {
        let bytes: Vec<u8> = vec![0xff, 0xfe, b'\n', b'P', b'7', b'\n'];
        let mut scanner = LineScanner::new(Cursor::new(bytes));

        let mut session = ScanSession::begin(&mut scanner);
        assert_eq!(session.next_decoded().unwrap().as_str(), "P7");
    }

    #[test]
    fn test_session_over_empty_input() {
        let mut scanner = LineScanner::new(Cursor::new(""));
        let mut session = ScanSession::begin(&mut scanner);
        assert!(session.next_decoded().is_none());
    }
}
