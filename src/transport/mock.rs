//! Scripted in-memory link for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::rc::Rc;
use std::time::Duration;

use super::link::Link;

/// One scripted outcome of a `read` call.
#[derive(Debug, Clone)]
pub(crate) enum Step {
    Data(Vec<u8>),
    Eof,
    Timeout,
    Interrupted,
}

impl Step {
    pub(crate) fn data(text: &str) -> Self {
        Step::Data(text.as_bytes().to_vec())
    }
}

/// Observer for what the transport did to the link.
#[derive(Debug, Clone, Default)]
pub(crate) struct Wire {
    written: Rc<RefCell<Vec<u8>>>,
    shutdowns: Rc<Cell<usize>>,
    read_timeout: Rc<Cell<Option<Duration>>>,
}

impl Wire {
    pub(crate) fn written(&self) -> Vec<u8> {
        self.written.borrow().clone()
    }

    pub(crate) fn written_text(&self) -> String {
        String::from_utf8_lossy(&self.written.borrow()).into_owned()
    }

    pub(crate) fn shutdowns(&self) -> usize {
        self.shutdowns.get()
    }

    pub(crate) fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout.get()
    }
}

/// Link that replays scripted reads and records writes.
///
/// Once the script runs out every read reports end of stream.
pub(crate) struct ScriptedLink {
    steps: VecDeque<Step>,
    wire: Wire,
    fail_writes: bool,
}

impl ScriptedLink {
    pub(crate) fn new(steps: Vec<Step>) -> (Self, Wire) {
        let wire = Wire::default();
        let link = Self {
            steps: steps.into(),
            wire: wire.clone(),
            fail_writes: false,
        };
        (link, wire)
    }

    /// Build a link whose replies are complete frames, one per command.
    pub(crate) fn replies(replies: &[&str]) -> (Self, Wire) {
        Self::new(replies.iter().map(|r| Step::data(r)).collect())
    }

    pub(crate) fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }
}

impl Read for ScriptedLink {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.steps.pop_front() {
            None | Some(Step::Eof) => Ok(0),
            Some(Step::Timeout) => Err(io::Error::new(io::ErrorKind::WouldBlock, "timed out")),
            Some(Step::Interrupted) => Err(io::Error::new(io::ErrorKind::Interrupted, "signal")),
            Some(Step::Data(mut data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    self.steps.push_front(Step::Data(data.split_off(n)));
                }
                Ok(n)
            }
        }
    }
}

impl Write for ScriptedLink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer gone"));
        }
        self.wire.written.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Link for ScriptedLink {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        self.wire.read_timeout.set(timeout);
        Ok(())
    }

    fn shutdown(&mut self) -> io::Result<()> {
        self.wire.shutdowns.set(self.wire.shutdowns.get() + 1);
        Ok(())
    }
}
