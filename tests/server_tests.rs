//! End-to-end Server Tests
//!
//! Drive a real server over TCP: the full command scenario, concurrent
//! sessions, and protocol fault handling.

use std::io::Write;
use std::net::{SocketAddr, TcpStream};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tempfile::TempDir;

use cinevault::network::{Client, Server};
use cinevault::protocol::{read_response, write_command, Command, Status, MAX_PAYLOAD_SIZE};
use cinevault::{Config, MovieStore, VaultError};

struct TestServer {
    addr: SocketAddr,
    data_file: PathBuf,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    _dir: TempDir,
}

impl TestServer {
    fn start() -> Self {
        Self::start_with(8, 5_000)
    }

    fn start_with(max_connections: usize, read_timeout_ms: u64) -> Self {
        let dir = TempDir::new().unwrap();
        let data_file = dir.path().join("movies.csv");

        let config = Config::builder()
            .data_file(&data_file)
            .listen_addr("127.0.0.1:0")
            .max_connections(max_connections)
            .read_timeout_ms(read_timeout_ms)
            .build();

        let store = Arc::new(MovieStore::open(&config).unwrap());
        let mut server = Server::bind(config, store).unwrap();

        let addr = server.local_addr().unwrap();
        let shutdown = server.shutdown_handle();
        let handle = thread::spawn(move || server.run().unwrap());

        Self {
            addr,
            data_file,
            shutdown,
            handle: Some(handle),
            _dir: dir,
        }
    }

    fn client(&self) -> Client {
        Client::connect(self.addr).unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Pull the assigned id out of "Movie registered with id N."
fn registered_id(message: &str) -> u64 {
    message
        .trim_end_matches('.')
        .rsplit(' ')
        .next()
        .unwrap()
        .parse()
        .unwrap()
}

fn register(client: &mut Client, title: &str, director: &str, year: u32, genres: &str) -> u64 {
    let response = client
        .request(&Command::Register {
            title: title.to_string(),
            director: director.to_string(),
            year,
            genres: genres.split(';').map(str::to_string).collect(),
        })
        .unwrap();
    assert_eq!(response.status, Status::Ok, "register failed: {}", response.message);
    registered_id(&response.message)
}

// =============================================================================
// Scenario Tests
// =============================================================================

#[test]
fn full_register_mutate_remove_reuse_scenario() {
    let server = TestServer::start();
    let mut client = server.client();

    // register("Matrix", "Wachowski", 1999, "action") -> id 1
    let id = register(&mut client, "Matrix", "Wachowski", 1999, "action");
    assert_eq!(id, 1);

    // addGenre(1, "sciFi") -> genres now "action;sciFi"
    let response = client
        .request(&Command::AddGenre {
            id: 1,
            genre: "sciFi".to_string(),
        })
        .unwrap();
    assert_eq!(response.status, Status::Ok);

    let detail = client.request(&Command::ListById { id: 1 }).unwrap();
    assert_eq!(detail.status, Status::Ok);
    assert!(
        detail.message.contains("Genres: action;sciFi"),
        "got: {}",
        detail.message
    );

    // remove(1), then lookups report NOT_FOUND
    let response = client.request(&Command::Remove { id: 1 }).unwrap();
    assert_eq!(response.status, Status::Ok);

    let missing = client.request(&Command::ListById { id: 1 }).unwrap();
    assert_eq!(missing.status, Status::NotFound);

    // registering again reuses id 1
    let id = register(&mut client, "Matrix2", "Wachowski", 2003, "action");
    assert_eq!(id, 1);

    client.quit().unwrap();
}

#[test]
fn listings_over_the_wire() {
    let server = TestServer::start();
    let mut client = server.client();

    register(&mut client, "Matrix", "Wachowski", 1999, "action;sciFi");
    register(&mut client, "Amelie", "Jeunet", 2001, "romance");

    let ids = client.request(&Command::ListIds).unwrap();
    assert_eq!(ids.message, "1 - Matrix\n2 - Amelie");

    let all = client.request(&Command::ListAll).unwrap();
    assert_eq!(all.message.lines().count(), 2);
    assert!(all.message.contains("Director: Jeunet"));

    let by_genre = client
        .request(&Command::ListByGenre {
            genre: "sciFi".to_string(),
        })
        .unwrap();
    assert!(by_genre.message.contains("Matrix"));
    assert!(!by_genre.message.contains("Amelie"));

    client.quit().unwrap();
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn concurrent_sessions_get_distinct_ids() {
    let server = TestServer::start();

    const SESSIONS: usize = 6;
    let addr = server.addr;

    let handles: Vec<_> = (0..SESSIONS)
        .map(|i| {
            thread::spawn(move || {
                let mut client = Client::connect(addr).unwrap();
                let id = register(
                    &mut client,
                    &format!("Movie {}", i),
                    "Someone",
                    2000,
                    "action",
                );
                client.quit().unwrap();
                id
            })
        })
        .collect();

    let mut ids: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), SESSIONS, "ids must be distinct");

    // The persisted file holds exactly one line per session
    let contents = std::fs::read_to_string(&server.data_file).unwrap();
    assert_eq!(contents.lines().count(), SESSIONS);
}

// =============================================================================
// Protocol Fault Tests
// =============================================================================

/// Build a raw request frame from a code byte and text fields
fn raw_frame(code: u8, fields: &[&str]) -> Vec<u8> {
    let mut payload = Vec::new();
    for field in fields {
        payload.extend_from_slice(&(field.len() as u32).to_be_bytes());
        payload.extend_from_slice(field.as_bytes());
    }

    let mut bytes = vec![code];
    bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    bytes.extend_from_slice(&payload);
    bytes
}

#[test]
fn malformed_id_is_reported_and_session_survives() {
    let server = TestServer::start();
    let mut stream = TcpStream::connect(server.addr).unwrap();

    // REMOVE with a non-numeric id
    stream.write_all(&raw_frame(3, &["abc"])).unwrap();
    let response = read_response(&mut stream).unwrap();
    assert_eq!(response.status, Status::Error);
    assert!(response.message.contains("malformed"), "got: {}", response.message);

    // Same session keeps working
    write_command(&mut stream, &Command::ListIds).unwrap();
    let response = read_response(&mut stream).unwrap();
    assert_eq!(response.status, Status::Ok);
}

#[test]
fn unknown_command_code_keeps_session_in_sync() {
    let server = TestServer::start();
    let mut stream = TcpStream::connect(server.addr).unwrap();

    stream.write_all(&raw_frame(42, &["stray", "fields"])).unwrap();
    let response = read_response(&mut stream).unwrap();
    assert_eq!(response.status, Status::Error);
    assert!(response.message.contains("invalid command"), "got: {}", response.message);

    // The stray fields were consumed with the frame; the next command decodes cleanly
    write_command(&mut stream, &Command::ListIds).unwrap();
    let response = read_response(&mut stream).unwrap();
    assert_eq!(response.status, Status::Ok);
    assert_eq!(response.message, "No movies registered.");
}

#[test]
fn oversized_frame_ends_the_session() {
    let server = TestServer::start();
    let mut stream = TcpStream::connect(server.addr).unwrap();

    // Header claiming an impossible payload, junk bytes where the payload
    // would start, then a valid command
    let mut bytes = vec![4u8];
    bytes.extend_from_slice(&(MAX_PAYLOAD_SIZE + 1).to_be_bytes());
    bytes.extend_from_slice(b"junkbyt");
    stream.write_all(&bytes).unwrap();
    write_command(&mut stream, &Command::ListIds).unwrap();

    let response = read_response(&mut stream).unwrap();
    assert_eq!(response.status, Status::Error);
    assert!(response.message.contains("too large"), "got: {}", response.message);

    // The junk bytes would decode as garbage frames, so the server closes
    // the session instead of answering the follow-up command
    match read_response(&mut stream) {
        Err(VaultError::Io(e)) => assert!(matches!(
            e.kind(),
            std::io::ErrorKind::UnexpectedEof | std::io::ErrorKind::ConnectionReset
        )),
        other => panic!("expected a closed session, got {:?}", other),
    }

    // Fresh sessions are unaffected
    let mut client = server.client();
    assert_eq!(client.request(&Command::ListIds).unwrap().status, Status::Ok);
    client.quit().unwrap();
}

#[test]
fn saturated_server_refuses_new_sessions() {
    // One worker, queue depth one
    let server = TestServer::start_with(1, 5_000);

    // First session occupies the single worker...
    let _held = server.client();
    thread::sleep(Duration::from_millis(300));

    // ...the second sits in the bounded queue...
    let _queued = TcpStream::connect(server.addr).unwrap();
    thread::sleep(Duration::from_millis(300));

    // ...so the third is refused outright
    let mut refused = TcpStream::connect(server.addr).unwrap();
    let response = read_response(&mut refused).unwrap();
    assert_eq!(response.status, Status::Error);
    assert!(
        response.message.contains("server busy"),
        "got: {}",
        response.message
    );
}

#[test]
fn silent_session_is_closed_after_read_timeout() {
    let server = TestServer::start_with(8, 200);

    // Connect and say nothing; the server reclaims the session
    let mut stream = TcpStream::connect(server.addr).unwrap();
    match read_response(&mut stream) {
        Err(VaultError::Io(e)) => assert!(matches!(
            e.kind(),
            std::io::ErrorKind::UnexpectedEof | std::io::ErrorKind::ConnectionReset
        )),
        other => panic!("expected a closed session, got {:?}", other),
    }

    // The worker is free again for a fresh session
    let mut client = server.client();
    assert_eq!(client.request(&Command::ListIds).unwrap().status, Status::Ok);
    client.quit().unwrap();
}

#[test]
fn quit_ends_only_that_session() {
    let server = TestServer::start();

    let client = server.client();
    client.quit().unwrap();

    // The server keeps serving other sessions
    let mut other = server.client();
    let response = other.request(&Command::ListIds).unwrap();
    assert_eq!(response.status, Status::Ok);
    other.quit().unwrap();
}
