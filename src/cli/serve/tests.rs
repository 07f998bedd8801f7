//! End-to-end tests against a real listener and a fake toolchain.

use super::*;
use crate::build::Toolchain;
use crate::build::testing::{call_count, failing_toolchain, fake_toolchain, succeeding_toolchain};
use crossbeam::channel;
use std::fs;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use std::time::Duration;
use tempfile::TempDir;

struct TestServer {
    addr: SocketAddr,
    root: TempDir,
    tools: TempDir,
    server: Arc<Server>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Start a server whose toolchain is built by `toolchain` inside the tools dir.
    fn start(
        toolchain: impl FnOnce(&Path) -> PathBuf,
        configure: impl FnOnce(&mut ServerConfig),
    ) -> Self {
        let root = TempDir::new().unwrap();
        let tools = TempDir::new().unwrap();
        let program = toolchain(tools.path());

        let mut config = ServerConfig::default();
        config.serve.http = "127.0.0.1:0".to_owned();
        config.serve.root = root.path().to_path_buf();
        configure(&mut config);

        let builder = ArtifactBuilder::with_exe(
            Toolchain::new(program.to_string_lossy()),
            root.path(),
            tools.path().join("wasmserve"),
        );
        let state = Arc::new(ServerState::new(Arc::new(config), builder));
        let bound = bind(state).unwrap();
        let addr = bound.addr();
        let server = bound.server();
        let handle = thread::spawn(move || bound.run().unwrap());

        Self {
            addr,
            root,
            tools,
            server,
            handle: Some(handle),
        }
    }

    fn with_body(body: &str) -> Self {
        Self::start(|dir| succeeding_toolchain(dir, body), |_| {})
    }

    fn write(&self, rel: &str, content: &str) {
        let path = self.root.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn builds(&self) -> usize {
        call_count(self.tools.path())
    }

    fn get(&self, path: &str) -> Reply {
        self.request("GET", path, &[])
    }

    fn request(&self, method: &str, path: &str, headers: &[(&str, &str)]) -> Reply {
        request(self.addr, method, path, headers)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Parsed HTTP response.
#[derive(Debug)]
struct Reply {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Reply {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn request(addr: SocketAddr, method: &str, path: &str, headers: &[(&str, &str)]) -> Reply {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(30))).unwrap();

    let mut head = format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n");
    for (k, v) in headers {
        head.push_str(&format!("{k}: {v}\r\n"));
    }
    head.push_str("\r\n");
    stream.write_all(head.as_bytes()).unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).unwrap();
    parse_response(&raw)
}

fn parse_response(raw: &[u8]) -> Reply {
    let split = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response has a header block");
    let head = String::from_utf8_lossy(&raw[..split]);
    let mut lines = head.split("\r\n");

    let status_line = lines.next().unwrap();
    let status = status_line.split(' ').nth(1).unwrap().parse().unwrap();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_owned(), v.trim().to_owned()))
        .collect();

    let mut body = raw[split + 4..].to_vec();
    let chunked = headers
        .iter()
        .any(|(k, v)| k.eq_ignore_ascii_case("transfer-encoding") && v.contains("chunked"));
    if chunked {
        body = dechunk(&body);
    }

    Reply {
        status,
        headers,
        body,
    }
}

fn dechunk(mut data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let Some(eol) = data.windows(2).position(|w| w == b"\r\n") else {
            return out;
        };
        let size_text = String::from_utf8_lossy(&data[..eol]);
        let size = usize::from_str_radix(size_text.split(';').next().unwrap().trim(), 16).unwrap();
        if size == 0 {
            return out;
        }
        let start = eol + 2;
        out.extend_from_slice(&data[start..start + size]);
        data = &data[start + size + 2..];
    }
}

// ============================================================================
// Rendezvous
// ============================================================================

#[test]
fn test_notify_without_waiters_returns_immediately() {
    let server = TestServer::with_body("wasm");
    let reply = server.get("/_notify");
    assert_eq!(reply.status, 200);
    assert!(reply.body.is_empty());
}

#[test]
fn test_wait_released_by_notify() {
    let server = TestServer::with_body("wasm");
    let addr = server.addr;

    let (tx, rx) = channel::bounded(1);
    thread::spawn(move || {
        let _ = tx.send(request(addr, "GET", "/_wait", &[]));
    });

    // the waiter may not have reached the channel yet; keep notifying
    let mut waiter = None;
    for _ in 0..200 {
        assert_eq!(server.get("/_notify").status, 200);
        if let Ok(reply) = rx.recv_timeout(Duration::from_millis(25)) {
            waiter = Some(reply);
            break;
        }
    }
    let waiter = waiter.expect("wait was released");
    assert_eq!(waiter.status, 200);
    assert!(waiter.body.is_empty());
}

#[test]
fn test_wait_is_not_released_by_earlier_notify() {
    let server = TestServer::with_body("wasm");
    assert_eq!(server.get("/_notify").status, 200);

    let addr = server.addr;
    let (tx, rx) = channel::bounded(1);
    thread::spawn(move || {
        let _ = tx.send(request(addr, "GET", "/_wait", &[]));
    });
    assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
}

// ============================================================================
// Artifact builds
// ============================================================================

#[test]
fn test_artifact_built_on_request() {
    let server = TestServer::with_body("compiled-module");
    let reply = server.get("/main.wasm");

    assert_eq!(reply.status, 200);
    assert_eq!(reply.header("content-type"), Some("application/wasm"));
    assert_eq!(reply.text(), "compiled-module");
    assert_eq!(server.builds(), 1);

    let log = fs::read_to_string(server.tools.path().join("calls.log")).unwrap();
    assert!(log.starts_with("js/wasm/cp run -exec "));
    assert!(log.trim_end().ends_with("main.wasm"));
}

#[test]
fn test_every_artifact_request_rebuilds() {
    let server = TestServer::with_body("m");
    assert_eq!(server.get("/main.wasm").status, 200);
    assert_eq!(server.get("/main.wasm").status, 200);
    assert_eq!(server.builds(), 2);
}

#[test]
fn test_build_failure_returns_diagnostics() {
    let server = TestServer::start(
        |dir| failing_toolchain(dir, "./main.go:3:1: syntax error"),
        |_| {},
    );
    let reply = server.get("/main.wasm");

    assert_eq!(reply.status, 500);
    assert!(reply.header("content-type").unwrap().starts_with("text/plain"));
    assert!(reply.text().contains("# example.com/app"));
    assert!(reply.text().contains("./main.go:3:1: syntax error"));
    assert_eq!(server.builds(), 1);
}

#[test]
fn test_build_args_follow_config() {
    let server = TestServer::start(
        |dir| succeeding_toolchain(dir, "m"),
        |config| {
            config.build.tags = Some("dev".to_owned());
            config.args = vec!["./cmd/game".to_owned(), "-level=2".to_owned()];
        },
    );
    assert_eq!(server.get("/main.wasm").status, 200);

    let log = fs::read_to_string(server.tools.path().join("calls.log")).unwrap();
    assert!(log.contains("-tags dev ./cmd/game "));
    assert!(!log.contains("-level=2"));
}

#[test]
fn test_concurrent_artifact_requests() {
    let server = TestServer::with_body("compiled-module");
    let addr = server.addr;

    let clients: Vec<_> = (0..8)
        .map(|_| thread::spawn(move || request(addr, "GET", "/main.wasm", &[])))
        .collect();
    for client in clients {
        let reply = client.join().unwrap();
        assert_eq!(reply.status, 200);
        assert_eq!(reply.text(), "compiled-module");
    }
    assert_eq!(server.builds(), 8);
}

#[test]
fn test_custom_artifact_name() {
    let server = TestServer::start(
        |dir| succeeding_toolchain(dir, "game"),
        |config| config.build.artifact = "game.wasm".to_owned(),
    );
    assert_eq!(server.get("/game.wasm").text(), "game");
    assert_eq!(server.get("/main.wasm").status, 404);
    assert_eq!(server.builds(), 1);
}

// ============================================================================
// Files on disk take precedence
// ============================================================================

#[test]
fn test_existing_artifact_is_not_built() {
    let server = TestServer::with_body("fresh");
    server.write("main.wasm", "prebuilt");

    let reply = server.get("/main.wasm");
    assert_eq!(reply.status, 200);
    assert_eq!(reply.text(), "prebuilt");
    assert_eq!(server.builds(), 0);
}

#[test]
fn test_existing_index_is_served() {
    let server = TestServer::with_body("m");
    server.write("index.html", "<p>custom</p>");

    let reply = server.get("/");
    assert_eq!(reply.status, 200);
    assert_eq!(reply.text(), "<p>custom</p>");
}

#[test]
fn test_existing_shim_is_served() {
    let server = TestServer::start(|dir| failing_toolchain(dir, "unused"), |_| {});
    server.write("wasm_exec.js", "// local shim");

    let reply = server.get("/wasm_exec.js");
    assert_eq!(reply.status, 200);
    assert_eq!(reply.text(), "// local shim");
    assert_eq!(server.builds(), 0);
}

#[test]
fn test_index_html_redirects_to_directory() {
    let server = TestServer::with_body("m");
    server.write("sub/index.html", "nested");

    let reply = server.get("/sub/index.html");
    assert_eq!(reply.status, 301);
    assert_eq!(reply.header("location"), Some("/sub/"));
    assert_eq!(server.get("/sub/").text(), "nested");
}

// ============================================================================
// Routing
// ============================================================================

#[test]
fn test_directory_without_slash_redirects() {
    let server = TestServer::with_body("m");
    fs::create_dir(server.root.path().join("sub")).unwrap();

    let reply = server.get("/sub?x=1");
    assert_eq!(reply.status, 303);
    assert_eq!(reply.header("location"), Some("/sub/?x=1"));
}

#[test]
fn test_index_page_rendered() {
    let server = TestServer::with_body("m");
    let reply = server.get("/");

    assert_eq!(reply.status, 200);
    assert!(reply.header("content-type").unwrap().starts_with("text/html"));
    assert_eq!(reply.header("cache-control"), Some("no-store"));

    let html = reply.text();
    assert!(html.contains("fetch('main.wasm')"));
    assert!(html.contains("go.argv = [\""));
    assert!(html.contains("wasmserve-"));
    assert!(html.contains("go.env = {"));
    assert_eq!(server.builds(), 0);
}

#[test]
fn test_index_page_escapes_argv() {
    let server = TestServer::start(
        |dir| succeeding_toolchain(dir, "m"),
        |config| config.args = vec![".".to_owned(), r#"say "hi""#.to_owned()],
    );
    let html = server.get("/index.html").text();
    assert!(html.contains(r#"go.argv = [".", "say \"hi\""];"#));
}

#[test]
fn test_subdirectory_without_index_renders_page() {
    let server = TestServer::with_body("m");
    fs::create_dir(server.root.path().join("demo")).unwrap();

    let reply = server.get("/demo/");
    assert_eq!(reply.status, 200);
    assert!(reply.text().contains("fetch('main.wasm')"));
}

#[test]
fn test_shim_from_toolchain_root() {
    let goroot = TempDir::new().unwrap();
    let shim_dir = goroot.path().join("lib").join("wasm");
    fs::create_dir_all(&shim_dir).unwrap();
    fs::write(shim_dir.join("wasm_exec.js"), "// go shim").unwrap();

    let script = format!("#!/bin/sh\necho '{}'\n", goroot.path().display());
    let server = TestServer::start(|dir| fake_toolchain(dir, &script), |_| {});

    let reply = server.get("/wasm_exec.js");
    assert_eq!(reply.status, 200);
    assert!(reply.header("content-type").unwrap().starts_with("text/javascript"));
    assert_eq!(reply.text(), "// go shim");
}

#[test]
fn test_shim_toolchain_failure() {
    let server = TestServer::start(|dir| failing_toolchain(dir, "no go here"), |_| {});
    assert_eq!(server.get("/wasm_exec.js").status, 500);
}

// ============================================================================
// Static files
// ============================================================================

#[test]
fn test_static_file() {
    let server = TestServer::with_body("m");
    server.write("assets/app.css", "body{}");

    let reply = server.get("/assets/app.css");
    assert_eq!(reply.status, 200);
    assert!(reply.header("content-type").unwrap().starts_with("text/css"));
    assert_eq!(reply.text(), "body{}");
}

#[test]
fn test_missing_file_is_404() {
    let server = TestServer::with_body("m");
    assert_eq!(server.get("/missing.txt").status, 404);
}

#[test]
fn test_traversal_is_404() {
    let server = TestServer::with_body("m");
    assert_eq!(server.get("/%2e%2e/etc/passwd").status, 404);
}

#[test]
fn test_stat_error_is_500_with_message() {
    let server = TestServer::with_body("m");
    let expected = fs::metadata(Path::new("a\0b")).unwrap_err().to_string();

    let reply = server.get("/a%00b");
    assert_eq!(reply.status, 500);
    assert!(reply.text().contains(&expected), "body: {}", reply.text());
    assert_eq!(server.builds(), 0);
}

#[test]
fn test_head_has_no_body() {
    let server = TestServer::with_body("m");
    server.write("data.txt", "0123456789");

    let reply = server.request("HEAD", "/data.txt", &[]);
    assert_eq!(reply.status, 200);
    assert!(reply.body.is_empty());
}

#[test]
fn test_range_request() {
    let server = TestServer::with_body("m");
    server.write("data.bin", "0123456789");

    let reply = server.request("GET", "/data.bin", &[("Range", "bytes=2-4")]);
    assert_eq!(reply.status, 206);
    assert_eq!(reply.header("content-range"), Some("bytes 2-4/10"));
    assert_eq!(reply.text(), "234");

    let reply = server.request("GET", "/data.bin", &[("Range", "bytes=20-")]);
    assert_eq!(reply.status, 416);
    assert_eq!(reply.header("content-range"), Some("bytes */10"));
}

#[test]
fn test_cors_header() {
    let server = TestServer::start(
        |dir| succeeding_toolchain(dir, "m"),
        |config| config.serve.allow_origin = Some("*".to_owned()),
    );
    assert_eq!(server.get("/_notify").header("access-control-allow-origin"), Some("*"));
    assert_eq!(server.get("/missing").header("access-control-allow-origin"), Some("*"));
}

#[test]
fn test_no_cors_header_by_default() {
    let server = TestServer::with_body("m");
    assert_eq!(server.get("/_notify").header("access-control-allow-origin"), None);
}
