//! Test harness for kvtree integration tests
//!
//! `FakeVault` is a tiny HTTP server that answers the KV v2 list and read
//! endpoints from an in-memory set of secrets and records every request.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::process::Command;
use std::sync::{Arc, Mutex};
use std::thread;

use serde_json::{Value, json};

pub const TOKEN: &str = "s.test-token";

#[derive(Default)]
struct State {
    /// "mount/sub/path" -> fields
    secrets: Vec<(String, Value)>,
    forbidden: HashSet<String>,
    deleted: HashSet<String>,
    broken: HashSet<String>,
    requests: Vec<String>,
}

pub struct FakeVault {
    address: String,
    state: Arc<Mutex<State>>,
}

impl FakeVault {
    pub fn new() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind fake vault");
        let address = format!("http://{}", listener.local_addr().unwrap());
        let state = Arc::new(Mutex::new(State::default()));

        let shared = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                handle(stream, &shared);
            }
        });

        Self { address, state }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Store a secret with string fields at `path` (e.g. `kv/app1`).
    pub fn add_secret(&self, path: &str, fields: &[(&str, &str)]) -> &Self {
        let data: serde_json::Map<String, Value> = fields
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();
        self.add_secret_value(path, Value::Object(data))
    }

    pub fn add_secret_value(&self, path: &str, data: Value) -> &Self {
        self.state
            .lock()
            .unwrap()
            .secrets
            .push((path.to_string(), data));
        self
    }

    /// Answer reads of `path` with 403.
    pub fn forbid(&self, path: &str) -> &Self {
        self.state.lock().unwrap().forbidden.insert(path.to_string());
        self
    }

    /// Report the current version of `path` as soft-deleted.
    pub fn delete(&self, path: &str) -> &Self {
        self.state.lock().unwrap().deleted.insert(path.to_string());
        self
    }

    /// Answer reads of `path` with 500.
    pub fn break_path(&self, path: &str) -> &Self {
        self.state.lock().unwrap().broken.insert(path.to_string());
        self
    }

    /// Request lines seen so far, e.g. `GET /v1/kv/metadata/?list=true`.
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }
}

fn handle(stream: TcpStream, state: &Arc<Mutex<State>>) {
    let mut reader = BufReader::new(stream.try_clone().expect("Failed to clone stream"));

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    let mut headers = HashMap::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 || line.trim().is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_lowercase(), value.trim().to_string());
        }
    }

    let target = request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .to_string();
    let (status, body) = {
        let mut state = state.lock().unwrap();
        state.requests.push(format!("GET {}", target));
        if headers.get("x-vault-token").map(String::as_str) != Some(TOKEN) {
            (403, json!({"errors": ["permission denied"]}))
        } else {
            route(&state, &target)
        }
    };

    let body = body.to_string();
    let reason = match status {
        200 => "OK",
        403 => "Forbidden",
        404 => "Not Found",
        _ => "Internal Server Error",
    };
    let mut stream = stream;
    let _ = write!(
        stream,
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    );
    let _ = stream.flush();
}

fn metadata(deleted: bool) -> Value {
    let deletion_time = if deleted { "2024-02-01T00:00:00Z" } else { "" };
    json!({
        "created_time": "2024-01-15T09:30:00.123456Z",
        "custom_metadata": null,
        "deletion_time": deletion_time,
        "destroyed": false,
        "version": 2
    })
}

fn route(state: &State, target: &str) -> (u16, Value) {
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    let segments: Vec<&str> = path.trim_start_matches("/v1/").split('/').collect();
    if segments.len() < 2 {
        return (404, json!({"errors": []}));
    }
    let mount = segments[0];
    let endpoint = segments[1];
    let sub: Vec<&str> = segments[2..].iter().copied().filter(|s| !s.is_empty()).collect();
    let full = std::iter::once(mount)
        .chain(sub.iter().copied())
        .collect::<Vec<_>>()
        .join("/");

    if state.forbidden.contains(&full) {
        return (403, json!({"errors": ["1 error occurred:\n\t* permission denied\n\n"]}));
    }
    if state.broken.contains(&full) {
        return (500, json!({"errors": ["internal error"]}));
    }

    match endpoint {
        "metadata" if query.contains("list=true") => {
            let prefix = format!("{}/", full);
            let mut keys: Vec<String> = Vec::new();
            for (secret, _) in &state.secrets {
                if let Some(rest) = secret.strip_prefix(&prefix) {
                    let key = match rest.split_once('/') {
                        Some((folder, _)) => format!("{}/", folder),
                        None => rest.to_string(),
                    };
                    if !keys.contains(&key) {
                        keys.push(key);
                    }
                }
            }
            if keys.is_empty() {
                (404, json!({"errors": []}))
            } else {
                (200, json!({"data": {"keys": keys}}))
            }
        }
        "data" => match state.secrets.iter().rev().find(|(p, _)| *p == full) {
            Some(_) if state.deleted.contains(&full) => (
                404,
                json!({"data": {"data": null, "metadata": metadata(true)}}),
            ),
            Some((_, data)) => (
                200,
                json!({"data": {"data": data, "metadata": metadata(false)}}),
            ),
            None => (404, json!({"errors": []})),
        },
        _ => (404, json!({"errors": []})),
    }
}

/// Build a command for the kvtree binary pointed at `vault`, with a clean environment.
pub fn kvtree_command(vault: &FakeVault, home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_kvtree"));
    cmd.env("VAULT_ADDR", vault.address())
        .env("VAULT_TOKEN", TOKEN)
        .env("HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("FORCE_COLOR")
        .env_remove("VAULT_NAMESPACE")
        .env_remove("VAULT_CLIENT_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

pub fn run_kvtree(vault: &FakeVault, args: &[&str]) -> (String, String, bool) {
    let home = tempfile::TempDir::new().expect("Failed to create temp home");
    let output = kvtree_command(vault, home.path())
        .args(args)
        .output()
        .expect("Failed to run kvtree");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();

    (stdout, stderr, success)
}

/// The secrets from the README example: `kv/app1` and `kv/app2/db`.
pub fn scenario() -> FakeVault {
    let vault = FakeVault::new();
    vault
        .add_secret("kv/app1", &[("user", "alice"), ("pass", "secret123")])
        .add_secret("kv/app2/db", &[("host", "db.local")]);
    vault
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harness_routes_listing() {
        let vault = scenario();
        let state = vault.state.lock().unwrap();
        let (status, body) = route(&state, "/v1/kv/metadata/?list=true");
        assert_eq!(status, 200);
        assert_eq!(body["data"]["keys"], json!(["app1", "app2/"]));
    }

    #[test]
    fn test_harness_routes_read() {
        let vault = scenario();
        let state = vault.state.lock().unwrap();
        let (status, body) = route(&state, "/v1/kv/data/app2/db");
        assert_eq!(status, 200);
        assert_eq!(body["data"]["data"]["host"], "db.local");

        let (status, _) = route(&state, "/v1/kv/data/missing");
        assert_eq!(status, 404);
    }
}
