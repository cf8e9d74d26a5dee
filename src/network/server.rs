use crate::core::{hashes_per_second, Ledger};
use crate::error::{ChainError, Result};
use crate::identity;
use crate::protocol::{
    CorruptResponse, ErrorResponse, Operation, RecordView, Request, StatusResponse, TimedResponse,
    VerifyResponse, ViewChainResponse,
};
use log::{error, info, warn};
use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Payload and difficulty of the record installed at startup.
const GENESIS_PAYLOAD: &str = "Genesis";
const GENESIS_DIFFICULTY: u32 = 2;

/// A stalled peer must not hold a worker forever.
const TCP_READ_TIMEOUT: u64 = 5000;
const TCP_WRITE_TIMEOUT: u64 = 5000;

/// Serves the ledger to remote callers, one request per connection.
///
/// The ledger is owned here and shared with connection threads behind a
/// mutex: every operation runs inside the lock, which is the
/// single-writer region mutation needs. Mining happens on the connection's
/// own thread, so a slow proof-of-work search only delays callers queued
/// on the lock, never the accept loop.
pub struct Server {
    ledger: Arc<Mutex<Ledger>>,
    listener: TcpListener,
}

impl Server {
    /// Bind the listen socket and install the genesis record.
    pub fn bind(addr: &str) -> Result<Server> {
        let listener = TcpListener::bind(addr)
            .map_err(|e| ChainError::Network(format!("Failed to bind to {addr}: {e}")))?;

        let mut ledger = Ledger::new();
        ledger.append(GENESIS_PAYLOAD, GENESIS_DIFFICULTY)?;
        info!("Ledger initialized with genesis record");

        Ok(Server {
            ledger: Arc::new(Mutex::new(ledger)),
            listener,
        })
    }

    /// The address actually bound, useful when binding port 0.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .map_err(|e| ChainError::Network(format!("Failed to read local address: {e}")))
    }

    /// Accept connections forever, one handler thread per connection.
    pub fn run(&self) -> Result<()> {
        info!("Server listening on {}", self.local_addr()?);

        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let ledger = Arc::clone(&self.ledger);
                    thread::spawn(move || {
                        if let Err(e) = Self::handle_connection(ledger, stream) {
                            error!("Error handling connection: {e}");
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {e}");
                }
            }
        }

        Ok(())
    }

    /// Read one request line, answer with one response line, hang up.
    fn handle_connection(ledger: Arc<Mutex<Ledger>>, mut stream: TcpStream) -> Result<()> {
        let peer_addr = stream
            .peer_addr()
            .map_err(|e| ChainError::Network(format!("Failed to get peer address: {e}")))?;
        stream.set_read_timeout(Some(Duration::from_millis(TCP_READ_TIMEOUT)))?;
        stream.set_write_timeout(Some(Duration::from_millis(TCP_WRITE_TIMEOUT)))?;

        let mut reader = BufReader::new(stream.try_clone()?);
        let mut line = String::new();
        reader.read_line(&mut line)?;

        let reply = Self::process_line(&ledger, line.trim_end());
        info!("Request from {peer_addr} handled");

        writeln!(stream, "{reply}")?;
        stream.flush()?;
        Ok(())
    }

    /// Turn one raw request line into one response line. Every failure maps
    /// to a defined error object, never an empty reply a caller could
    /// mistake for success. Authentication failures all collapse into the
    /// same generic rejection.
    pub fn process_line(ledger: &Mutex<Ledger>, line: &str) -> String {
        let reply = match Self::respond(ledger, line) {
            Ok(json) => return json,
            Err(ChainError::Authentication) => {
                warn!("Rejected request: authentication failed");
                ErrorResponse::rejection()
            }
            Err(ChainError::MalformedRequest(msg)) => {
                warn!("Rejected request: {msg}");
                ErrorResponse {
                    error: format!("Malformed request: {msg}"),
                }
            }
            Err(e) => {
                error!("Request failed: {e}");
                ErrorResponse {
                    error: e.to_string(),
                }
            }
        };
        serde_json::to_string(&reply)
            .unwrap_or_else(|_| format!("{{\"Error\":\"{}\"}}", crate::protocol::GENERIC_REJECTION))
    }

    fn respond(ledger: &Mutex<Ledger>, line: &str) -> Result<String> {
        let request: Request = serde_json::from_str(line)
            .map_err(|e| ChainError::MalformedRequest(e.to_string()))?;
        let operation = request.operation()?;
        let e = request.public_exponent()?;
        let n = request.modulus()?;
        let message = request.canonical_message()?;

        if !identity::authenticate(&request.client_id, &e, &n, &message, &request.sign) {
            return Err(ChainError::Authentication);
        }

        Self::dispatch(ledger, operation, &request)
    }

    /// One accepted request, one ledger call, one encoded response.
    fn dispatch(ledger: &Mutex<Ledger>, operation: Operation, request: &Request) -> Result<String> {
        let mut ledger = ledger
            .lock()
            .map_err(|_| ChainError::Ledger("Ledger lock poisoned".to_string()))?;

        let json = match operation {
            Operation::Status => {
                let latest = ledger
                    .latest()
                    .ok_or_else(|| ChainError::Ledger("Ledger has no records".to_string()))?;
                let response = StatusResponse {
                    operation: operation.code(),
                    chain_size: ledger.len(),
                    hashes_per_second: hashes_per_second(),
                    latest_difficulty: latest.get_difficulty(),
                    latest_nonce: latest.get_nonce().to_str_radix(10),
                    chain_hash: ledger.tip_hash().to_string(),
                };
                serde_json::to_string(&response)?
            }
            Operation::AddTransaction => {
                let difficulty = request.require_difficulty()?;
                let transaction = request.require_transaction()?;
                let start = Instant::now();
                ledger.append(transaction, difficulty)?;
                let response = TimedResponse {
                    operation: operation.code(),
                    execution_time_ms: start.elapsed().as_millis() as u64,
                };
                serde_json::to_string(&response)?
            }
            Operation::VerifyChain => {
                let start = Instant::now();
                let audit = ledger.validate();
                let elapsed = start.elapsed().as_millis() as u64;
                serde_json::to_string(&VerifyResponse::from_audit(&audit, elapsed))?
            }
            Operation::ViewChain => {
                let response = ViewChainResponse {
                    ds_chain: ledger.records().iter().map(RecordView::from).collect(),
                    chain_hash: ledger.tip_hash().to_string(),
                };
                serde_json::to_string(&response)?
            }
            Operation::Corrupt => {
                let block_id = request.require_block_id()?;
                let block_data = request.require_block_data()?;
                ledger.corrupt(block_id, block_data)?;
                warn!("Record {block_id} deliberately corrupted");
                serde_json::to_string(&CorruptResponse {
                    operation: operation.code(),
                })?
            }
            Operation::Repair => {
                let start = Instant::now();
                let repaired = ledger.repair();
                info!("Repair pass re-mined {repaired} record(s)");
                let response = TimedResponse {
                    operation: operation.code(),
                    execution_time_ms: start.elapsed().as_millis() as u64,
                };
                serde_json::to_string(&response)?
            }
        };

        Ok(json)
    }
}
