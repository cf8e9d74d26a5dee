use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "signet-ledger")]
pub struct Opt {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "serve", about = "Run the ledger server")]
    Serve {
        #[arg(long, help = "Listen address as host:port (default from NODE_ADDRESS)")]
        addr: Option<String>,
    },
    #[command(name = "client", about = "Start an interactive client session")]
    Client {
        #[arg(long, help = "Server address as host:port (default from NODE_ADDRESS)")]
        addr: Option<String>,
    },
}
