//! Test doubles shared by the integration tests.
#![allow(dead_code)]

use std::{
    collections::{BTreeSet, HashMap},
    io::{BufRead, BufReader, Write},
    net::TcpListener,
    path::Path,
    sync::{Arc, Mutex},
    thread::JoinHandle,
};

use deskcrate::{
    error::{InstallerError, InstallerErrorKind},
    inst::InstallConfig,
    net::Fetcher,
    os::{service::ServiceManager, TargetUser},
    prompt::{Choice, UserPrompt},
};

pub const MANIFEST_URL: &str = "https://downloads.test/versions.json";
pub const APP_URL: &str = "https://downloads.test/lumen-2.4.1";
pub const ICON_URL: &str = "https://downloads.test/icon.png";

pub const MANIFEST: &str = r#"{"versions": [
    {"name": "2.4.1", "url": "https://downloads.test/lumen-2.4.1"},
    {"name": "2.3.0", "url": "https://downloads.test/lumen-2.3.0"}
]}"#;

/// Config with every system path and the home directory inside `root`.
pub fn make_config(root: &Path) -> InstallConfig {
    let home = root.join("home/rust");
    std::fs::create_dir_all(&home).unwrap();

    let mut config = InstallConfig::with_roots(root, TargetUser::new("rust", home));
    config.manifest_url = MANIFEST_URL.to_string();
    config.icon_url = ICON_URL.to_string();
    config
}

/// Serves fixed bodies by URL and records each request.
#[derive(Debug, Clone, Default)]
pub struct FakeFetcher {
    bodies: HashMap<String, Vec<u8>>,
    pub requests: Arc<Mutex<Vec<String>>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
            .with_body(MANIFEST_URL, MANIFEST.as_bytes())
            .with_body(APP_URL, b"#!/bin/sh\necho lumen\n")
            .with_body(ICON_URL, b"\x89PNG")
    }

    pub fn with_body(mut self, url: &str, body: &[u8]) -> Self {
        self.bodies.insert(url.to_string(), body.to_vec());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Fetcher for FakeFetcher {
    fn fetch(&self, url: &str, output: &mut dyn Write) -> Result<u64, InstallerError> {
        self.requests.lock().unwrap().push(url.to_string());

        let body = self.bodies.get(url).ok_or_else(|| {
            InstallerError::new(InstallerErrorKind::Network).with_context(format!("GET {url}"))
        })?;
        output.write_all(body)?;

        Ok(body.len() as u64)
    }
}

/// Records service manager calls.
#[derive(Debug, Clone, Default)]
pub struct FakeServiceManager {
    pub calls: Arc<Mutex<Vec<String>>>,
    pub active: bool,
}

impl FakeServiceManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active() -> Self {
        Self {
            active: true,
            ..Self::default()
        }
    }

    pub fn recorded(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ServiceManager for FakeServiceManager {
    fn reload(&self) -> Result<(), InstallerError> {
        self.record("daemon-reload".to_string());
        Ok(())
    }

    fn enable_now(&self, unit: &str) -> Result<(), InstallerError> {
        self.record(format!("enable --now {unit}"));
        Ok(())
    }

    fn stop(&self, unit: &str) -> Result<(), InstallerError> {
        self.record(format!("stop {unit}"));
        Ok(())
    }

    fn disable(&self, unit: &str) -> Result<(), InstallerError> {
        self.record(format!("disable {unit}"));
        Ok(())
    }

    fn is_active(&self, _unit: &str) -> bool {
        self.active
    }
}

/// Answers menus with fixed values and counts how often it was asked.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    pub version: Option<usize>,
    pub options: Option<BTreeSet<usize>>,
    pub calls: Mutex<usize>,
}

impl ScriptedPrompt {
    pub fn new(version: Option<usize>, options: Option<&[usize]>) -> Self {
        Self {
            version,
            options: options.map(|indices| indices.iter().copied().collect()),
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl UserPrompt for ScriptedPrompt {
    fn select_one(&self, _title: &str, _items: &[String]) -> Result<Choice<usize>, InstallerError> {
        *self.calls.lock().unwrap() += 1;

        Ok(match self.version {
            Some(index) => Choice::Chosen(index),
            None => Choice::Cancelled,
        })
    }

    fn select_many(
        &self,
        _title: &str,
        _items: &[String],
        _defaults: &[bool],
    ) -> Result<Choice<BTreeSet<usize>>, InstallerError> {
        *self.calls.lock().unwrap() += 1;

        Ok(match &self.options {
            Some(indices) => Choice::Chosen(indices.clone()),
            None => Choice::Cancelled,
        })
    }
}

/// Answers a single HTTP request with the given status line and body.
///
/// Returns the base URL of the listener.
pub fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();

    let handle = std::thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream);

        loop {
            let mut line = String::new();
            let len = reader.read_line(&mut line).unwrap();

            if len == 0 || line == "\r\n" {
                break;
            }
        }

        let mut stream = reader.into_inner();
        write!(
            stream,
            "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
        .unwrap();
        stream.flush().unwrap();
    });

    (format!("http://{address}"), handle)
}

/// Accepts a single connection, reads the request, and never answers.
///
/// The connection is held open for `hold` before being dropped.
pub fn serve_stalled(hold: std::time::Duration) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();

    let handle = std::thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        std::thread::sleep(hold);
        drop(stream);
    });

    (format!("http://{address}"), handle)
}
