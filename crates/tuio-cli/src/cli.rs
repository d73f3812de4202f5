use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tuio", about = "TUIO 2D object decoder", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Listen for TUIO object messages and print each snapshot
    Listen(ListenArgs),
    /// Send a synthetic stream of orbiting objects
    Simulate(SimulateArgs),
    /// Print the effective listener configuration
    Config(ConfigArgs),
}

/// Listener settings shared by `listen` and `config`. Flags override the file.
#[derive(Args, Clone, Debug, Default)]
pub struct ListenerOverrides {
    /// TOML file with listener settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Address to bind
    #[arg(long)]
    pub bind: Option<IpAddr>,
    /// UDP port to bind
    #[arg(short, long)]
    pub port: Option<u16>,
}

#[derive(Args)]
pub struct ListenArgs {
    #[command(flatten)]
    pub listener: ListenerOverrides,
    /// Only print when the set of visible objects changes
    #[arg(long)]
    pub changes_only: bool,
}

#[derive(Args)]
pub struct SimulateArgs {
    /// Where to send the stream
    #[arg(long, default_value = "127.0.0.1:3333")]
    pub target: SocketAddr,
    /// Number of simulated objects
    #[arg(short = 'n', long, default_value = "3")]
    pub objects: usize,
    /// Frames per second
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub fps: u32,
    /// Stop after this many frames; runs until interrupted if omitted
    #[arg(long)]
    pub frames: Option<u64>,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub listener: ListenerOverrides,
}
