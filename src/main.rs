//! Command line companion for WSJT-X
//!
//! `listen` prints every datagram WSJT-X sends, `send` delivers one command.

use std::net::{IpAddr, SocketAddr};

use anyhow::Context;
use clap::{Parser, Subcommand};
use futures::SinkExt;
use tokio::net::UdpSocket;
use tokio_util::udp::UdpFramed;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt::format::FmtSpan, prelude::*, EnvFilter};

use wsjtx_udp::core::{DEFAULT_PORT, LOCALHOST};
use wsjtx_udp::{parse, Message, ServerConfig, UdpServer, WsjtxCodec};

#[derive(Debug, Parser)]
#[command(name = "wsjtx-udp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long = "debug", short = 'v', global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Listen for WSJT-X datagrams and print them
    Listen {
        /// Address to listen on, a multicast group is joined
        #[arg(long, env = "WSJTX_IP", default_value_t = IpAddr::V4(LOCALHOST))]
        ip: IpAddr,

        /// UDP port
        #[arg(long, env = "WSJTX_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Print each decoded datagram as one JSON line
        #[arg(long)]
        json: bool,
    },
    /// Send one message, given as JSON, to a WSJT-X instance
    Send {
        /// Address WSJT-X receives on
        #[arg(long, env = "WSJTX_ADDR")]
        to: SocketAddr,

        /// Message such as '{"type":"FreeText","id":"WSJT-X","text":"CQ","send":false}'
        message: String,
    },
}

fn init_tracing(debug: bool) -> anyhow::Result<()> {
    let default_level = if debug { "debug" } else { "info" };
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))?;

    let format_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::NONE)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(format_layer)
        .try_init()?;
    Ok(())
}

async fn listen(config: ServerConfig, json: bool) -> anyhow::Result<()> {
    let mut server = UdpServer::bind(config)
        .await
        .context("failed to start UDP server")?;

    loop {
        let datagram = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            datagram = server.recv() => match datagram {
                Some(datagram) => datagram,
                None => {
                    warn!("UDP server stopped");
                    break;
                }
            }
        };

        let hex = hex::encode(&datagram);
        match parse(&datagram) {
            Ok(response) if json => {
                debug!(%hex, "datagram");
                println!("{}", serde_json::to_string(&response)?);
            }
            Ok(response) => info!(
                kind = response.response_type(),
                id = response.id(),
                %hex,
                "{:?}",
                response
            ),
            Err(e) => warn!(error = %e, %hex, "undecodable datagram"),
        }
    }

    let status = server.status();
    info!(
        rx = status.rx_messages,
        tx = status.tx_messages,
        uptime = ?status.uptime,
        "shutting down"
    );
    server.close().await?;
    Ok(())
}

async fn send(to: SocketAddr, message: &str) -> anyhow::Result<()> {
    let message: Message =
        serde_json::from_str(message).context("message is not a valid JSON message")?;

    let local: SocketAddr = match to {
        SocketAddr::V4(_) => "0.0.0.0:0".parse()?,
        SocketAddr::V6(_) => "[::]:0".parse()?,
    };
    let socket = UdpSocket::bind(local).await?;
    let mut framed = UdpFramed::new(socket, WsjtxCodec::new());

    debug!(hex = %hex::encode(&message.encode()), "datagram");
    framed.send((message.clone(), to)).await?;
    info!(%to, kind = ?message.message_type(), "message sent");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug)?;

    match cli.command {
        Command::Listen { ip, port, json } => {
            let config = ServerConfig::default().with_ip(ip).with_port(port);
            listen(config, json).await
        }
        Command::Send { to, message } => send(to, &message).await,
    }
}
