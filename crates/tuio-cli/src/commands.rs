use std::future::Future;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use anyhow::Context;
use colored::Colorize;
use tokio::net::UdpSocket;
use tuio_net::{Connection, ListenerConfig};
use tuio_osc::OscCodec;
use tuio_types::{Snapshot, SnapshotDelta};

use crate::cli::*;
use crate::simulate::OrbitSimulator;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Listen(args) => cmd_listen(args, cli.format).await,
        Command::Simulate(args) => cmd_simulate(args).await,
        Command::Config(args) => cmd_config(args, cli.format),
    }
}

/// Load the config file if given, then apply flag overrides.
fn effective_config(overrides: &ListenerOverrides) -> anyhow::Result<ListenerConfig> {
    let mut config = match &overrides.config {
        Some(path) => ListenerConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => ListenerConfig::default(),
    };
    if let Some(bind) = overrides.bind {
        config.bind_addr = bind;
    }
    if let Some(port) = overrides.port {
        config.port = port;
    }
    Ok(config)
}

async fn cmd_listen(args: ListenArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = effective_config(&args.listener)?;
    let mut connection = Connection::bind(&config).await?;
    let local = connection.source().local_addr()?;
    if format == OutputFormat::Text {
        println!("{} Listening on {}", "✓".green().bold(), local.to_string().bold());
    }

    let close = connection.close_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            close.close();
        }
    });

    let mut previous = Snapshot::new();
    while let Some(snapshot) = connection.listen().await? {
        let delta = snapshot.delta(&previous);
        if args.changes_only && delta.appeared.is_empty() && delta.vanished.is_empty() {
            previous = snapshot;
            continue;
        }
        let frame = connection.client().current_frame();
        match format {
            OutputFormat::Text => print!("{}", render_text(frame, &snapshot, &delta)),
            OutputFormat::Json => println!("{}", render_json(frame, &snapshot)?),
        }
        previous = snapshot;
    }

    if format == OutputFormat::Text {
        let stats = connection.client().stats();
        println!(
            "{} Closed after {} frames ({} late)",
            "✓".green(),
            stats.frames_accepted,
            stats.frames_late
        );
    }
    Ok(())
}

fn render_text(frame: i32, snapshot: &Snapshot, delta: &SnapshotDelta) -> String {
    let mut out = format!(
        "{} {}  {} visible\n",
        "frame".dimmed(),
        frame.to_string().yellow(),
        snapshot.len().to_string().bold()
    );
    for object in snapshot.objects() {
        let marker = if delta.appeared.contains(&object.symbol_id) {
            "+".green()
        } else {
            " ".normal()
        };
        out.push_str(&format!(
            "  {} {:>6}  pos {}  angle {:>7.2}°\n",
            marker,
            object.symbol_id.to_string().cyan(),
            object.position,
            object.angle
        ));
    }
    for symbol in &delta.vanished {
        out.push_str(&format!("  {} {:>6}\n", "-".red(), symbol.to_string().cyan()));
    }
    out
}

fn render_json(frame: i32, snapshot: &Snapshot) -> anyhow::Result<String> {
    let value = serde_json::json!({ "frame": frame, "objects": snapshot });
    Ok(serde_json::to_string(&value)?)
}

async fn cmd_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let local: SocketAddr = match args.target.ip() {
        IpAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
        IpAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
    };
    let socket = UdpSocket::bind(local).await?;
    let mut sim = OrbitSimulator::new(args.objects, args.fps);

    println!(
        "{} Sending {} objects at {} fps to {}",
        "→".cyan(),
        args.objects.to_string().bold(),
        args.fps,
        args.target.to_string().bold()
    );

    let interrupted = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };
    let sent = send_frames(&socket, &mut sim, args.target, args.fps, args.frames, interrupted).await?;

    println!("{} Sent {} frames", "✓".green().bold(), sent);
    Ok(())
}

/// Send one simulator frame per tick until `limit` frames are out or
/// `shutdown` resolves. Returns the number of frames sent.
async fn send_frames<F>(
    socket: &UdpSocket,
    sim: &mut OrbitSimulator,
    target: SocketAddr,
    fps: u32,
    limit: Option<u64>,
    shutdown: F,
) -> anyhow::Result<u64>
where
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(Duration::from_secs_f64(1.0 / f64::from(fps.max(1))));
    tokio::pin!(shutdown);

    let mut sent: u64 = 0;
    loop {
        if limit.is_some_and(|limit| sent >= limit) {
            break;
        }
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = ticker.tick() => {}
        }
        let bytes = OscCodec::encode(&sim.next_packet())?;
        socket
            .send_to(&bytes, target)
            .await
            .with_context(|| format!("sending to {target}"))?;
        sent += 1;
        tracing::debug!(frame = sim.frame(), len = bytes.len(), "frame sent");
    }
    Ok(sent)
}

fn cmd_config(args: ConfigArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = effective_config(&args.listener)?;
    match format {
        OutputFormat::Text => print!("{}", config.to_toml_string()?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
    }
    Ok(())
}
