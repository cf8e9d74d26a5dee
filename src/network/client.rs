use crate::config::GLOBAL_CONFIG;
use crate::error::{ChainError, Result};
use crate::identity::Keypair;
use crate::protocol::{
    ErrorResponse, Operation, Request, StatusResponse, TimedResponse, VerifyResponse,
    ViewChainResponse,
};
use log::info;
use std::io::{self, BufRead, BufReader, Write};
use std::net::TcpStream;
use std::str::FromStr;

/// Interactive client session: a menu-driven loop that signs one request
/// per chosen operation and renders the server's reply.
///
/// The RSA keypair is generated once when the session starts and lives
/// exactly as long as the session.
pub struct ClientSession {
    keypair: Keypair,
    server_addr: String,
}

impl ClientSession {
    pub fn new(server_addr: String) -> Result<ClientSession> {
        let bits = GLOBAL_CONFIG.get_prime_bits();
        let certainty = GLOBAL_CONFIG.get_prime_certainty();

        println!("Generating RSA keypair ({bits}-bit primes)...");
        let keypair = Keypair::generate_with_retry(bits, certainty)?;
        info!("Session identity: {}", keypair.identifier());

        Ok(ClientSession {
            keypair,
            server_addr,
        })
    }

    /// Show the menu until the user exits.
    pub fn run(&self) -> Result<()> {
        println!("Client Running");
        println!();

        loop {
            println!("0. View basic blockchain status.");
            println!("1. Add a transaction to the blockchain.");
            println!("2. Verify the blockchain.");
            println!("3. View the blockchain.");
            println!("4. Corrupt the chain.");
            println!("5. Hide the corruption by repairing the chain.");
            println!("6. Exit.");
            println!();

            let choice: u8 = match prompt_number("") {
                Ok(choice) => choice,
                Err(_) => {
                    println!("Please select only one of the above options");
                    println!();
                    continue;
                }
            };

            let request = match choice {
                0 => Request::status(&self.keypair),
                1 => {
                    let difficulty = prompt_number("Enter difficulty > 0")?;
                    let transaction = prompt_line("Enter transaction")?;
                    Request::add_transaction(&self.keypair, difficulty, &transaction)
                }
                2 => {
                    println!("Verifying entire chain");
                    Request::verify_chain(&self.keypair)
                }
                3 => {
                    println!("View the Blockchain");
                    Request::view_chain(&self.keypair)
                }
                4 => {
                    println!("Corrupt the Blockchain");
                    let block_id = prompt_number("Enter block ID of block to Corrupt")?;
                    let block_data = prompt_line(&format!("Enter new data for block {block_id}"))?;
                    Request::corrupt(&self.keypair, block_id, &block_data)
                }
                5 => {
                    println!("Repairing the entire chain");
                    Request::repair(&self.keypair)
                }
                6 => break,
                _ => {
                    println!("Please select only one of the above options");
                    println!();
                    continue;
                }
            };

            let reply = self.call_server(&request)?;
            self.display_reply(&request, &reply)?;
            println!();
        }

        Ok(())
    }

    /// One connection per request: send the signed line, read the reply line.
    fn call_server(&self, request: &Request) -> Result<String> {
        let stream = TcpStream::connect(&self.server_addr)
            .map_err(|e| ChainError::Network(format!("Failed to connect to {}: {e}", self.server_addr)))?;

        let mut writer = stream.try_clone()?;
        writeln!(writer, "{}", serde_json::to_string(request)?)?;
        writer.flush()?;

        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        reader.read_line(&mut line)?;
        Ok(line.trim_end().to_string())
    }

    fn display_reply(&self, request: &Request, reply: &str) -> Result<()> {
        if let Ok(error) = serde_json::from_str::<ErrorResponse>(reply) {
            println!("Error In Request ({})", error.error);
            return Ok(());
        }

        match request.operation()? {
            Operation::Status => {
                let status: StatusResponse = serde_json::from_str(reply)?;
                println!("Current size of chain: {}", status.chain_size);
                println!(
                    "Current hashes per second by this machine: {}",
                    status.hashes_per_second
                );
                println!(
                    "Difficulty of most recent block: {}",
                    status.latest_difficulty
                );
                println!("Nonce for most recent block: {}", status.latest_nonce);
                println!("Chain hash: {}", status.chain_hash);
            }
            Operation::AddTransaction => {
                let timed: TimedResponse = serde_json::from_str(reply)?;
                println!(
                    "Total execution time to add this block was {} milliseconds",
                    timed.execution_time_ms
                );
            }
            Operation::VerifyChain => {
                let verify: VerifyResponse = serde_json::from_str(reply)?;
                if !verify.is_valid {
                    println!(
                        "..Improper hash on node {} Does not begin with {}",
                        verify.invalid_block_index,
                        verify.hash_target.as_deref().unwrap_or("")
                    );
                }
                println!("Chain verification: {}", verify.is_valid);
                println!(
                    "Total execution time required to verify the chain was {} milliseconds",
                    verify.execution_time_ms
                );
            }
            Operation::ViewChain => {
                let view: ViewChainResponse = serde_json::from_str(reply)?;
                for record in &view.ds_chain {
                    println!(
                        "{{\"index\": {}, \"time stamp\": {}, \"Tx\": \"{}\", \"PrevHash\": \"{}\", \"nonce\": {}, \"difficulty\": {}}}",
                        record.index,
                        record.timestamp,
                        record.tx,
                        record.prev_hash,
                        record.nonce,
                        record.difficulty
                    );
                }
                println!("Chain hash: {}", view.chain_hash);
            }
            Operation::Corrupt => {
                let block_id = request.require_block_id()?;
                let block_data = request.require_block_data()?;
                println!("Block {block_id} now holds {block_data}");
            }
            Operation::Repair => {
                let timed: TimedResponse = serde_json::from_str(reply)?;
                println!(
                    "Total execution time required to repair the chain was {} milliseconds",
                    timed.execution_time_ms
                );
            }
        }

        Ok(())
    }
}

fn prompt_line(message: &str) -> Result<String> {
    if !message.is_empty() {
        println!("{message}");
    }
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim_end().to_string())
}

fn prompt_number<T: FromStr>(message: &str) -> Result<T> {
    let line = prompt_line(message)?;
    line.trim()
        .parse()
        .map_err(|_| ChainError::MalformedRequest(format!("'{line}' is not a number")))
}
