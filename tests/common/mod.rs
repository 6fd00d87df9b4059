//! Fake MCode controller on a loopback socket.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// What the fake controller does with one received command.
pub enum Reply {
    /// Write these chunks with a short pause between them.
    Chunks(Vec<Vec<u8>>),
    /// Say nothing; the client should time out.
    Silent,
    /// Write these bytes, then close the connection.
    CloseAfter(Vec<u8>),
}

impl Reply {
    /// Echo plus optional value line, ended by `>`.
    pub fn echo(command: &str, value: Option<&str>) -> Self {
        let text = match value {
            Some(v) => format!("{command}\r\n{v}\r\n>"),
            None => format!("{command}\r\n>"),
        };
        Reply::Chunks(vec![text.into_bytes()])
    }

    /// Reply split at the given pieces.
    pub fn chunks(pieces: &[&str]) -> Self {
        Reply::Chunks(pieces.iter().map(|p| p.as_bytes().to_vec()).collect())
    }
}

/// Answers queries like an idle, homed stage.
pub fn idle_stage(command: &str) -> Reply {
    let value = match command.strip_prefix("PR ") {
        Some("MS") => Some("256"),
        Some("TP") => Some("0,0"),
        Some("VM") => Some("102400"),
        Some(_) => Some("0"),
        None => None,
    };
    Reply::echo(command, value)
}

/// A controller that serves one connection on a background thread.
pub struct FakeController {
    port: u16,
    received: Arc<Mutex<Vec<String>>>,
    handle: Option<JoinHandle<()>>,
}

impl FakeController {
    /// Start listening; `handler` decides the reply to each command.
    pub fn spawn<F>(handler: F) -> Self
    where
        F: FnMut(&str) -> Reply + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let port = listener.local_addr().expect("local addr").port();
        let received = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&received);
        let handle = thread::spawn(move || {
            if let Ok((stream, _)) = listener.accept() {
                serve(stream, handler, log);
            }
        });

        Self {
            port,
            received,
            handle: Some(handle),
        }
    }

    /// Port the fake controller listens on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Commands received so far, terminator stripped.
    pub fn received(&self) -> Vec<String> {
        self.received.lock().expect("received lock").clone()
    }

    /// Wait for the connection to end and return every command received.
    pub fn join(mut self) -> Vec<String> {
        if let Some(handle) = self.handle.take() {
            handle.join().expect("fake controller thread");
        }
        self.received()
    }
}

fn serve<F>(stream: TcpStream, mut handler: F, log: Arc<Mutex<Vec<String>>>)
where
    F: FnMut(&str) -> Reply,
{
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("server read timeout");
    let mut writer = stream.try_clone().expect("clone stream");
    let mut reader = BufReader::new(stream);
    let mut frame = Vec::new();

    loop {
        frame.clear();
        match reader.read_until(b'\r', &mut frame) {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }
        let command = String::from_utf8_lossy(&frame)
            .trim_end_matches('\r')
            .to_owned();
        log.lock().expect("received lock").push(command.clone());

        match handler(&command) {
            Reply::Chunks(chunks) => {
                for chunk in chunks {
                    if writer.write_all(&chunk).and_then(|()| writer.flush()).is_err() {
                        return;
                    }
                    thread::sleep(Duration::from_millis(10));
                }
            }
            Reply::Silent => {}
            Reply::CloseAfter(bytes) => {
                let _ = writer.write_all(&bytes);
                return;
            }
        }
    }
}
