use clap::Parser;
use log::{error, LevelFilter};
use signet_ledger::{ClientSession, Command, Opt, Server, GLOBAL_CONFIG};
use std::process;

fn main() {
    env_logger::builder().filter_level(LevelFilter::Info).init();

    let opt = Opt::parse();

    if let Err(e) = run_command(opt.command) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| GLOBAL_CONFIG.get_node_addr());
            let server = Server::bind(&addr)?;
            server.run()?;
        }
        Command::Client { addr } => {
            let addr = addr.unwrap_or_else(|| GLOBAL_CONFIG.get_node_addr());
            let session = ClientSession::new(addr)?;
            session.run()?;
        }
    }
    Ok(())
}
