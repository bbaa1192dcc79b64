//! TCP front end: one long-lived duplex connection per player.
//!
//! The server owns the world store, the session registry and the command
//! processor. Each accepted connection gets its own task that reads
//! newline-delimited commands and a paired writer task that drains an
//! outbound channel. Addressed responses from command execution are
//! routed through a delivery map (session id → outbound sender), so a
//! SAY from one connection lands on every room-mate's stream.
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::config::Config;
use crate::metrics;
use crate::mud::commands::CommandProcessor;
use crate::mud::session::{MudResponse, Session, SessionRegistry};
use crate::world::WorldStore;

const WELCOME_BANNER: &str = "\
Welcome to Wiremud, a small world at the end of a long wire.
Type CREATE_USER <username> <password> to create a character,
LOGIN <username> <password> to resume one, or HELP for all commands.";

/// Session id → outbound line channel for every live connection.
type DeliveryMap = Arc<Mutex<HashMap<Uuid, mpsc::UnboundedSender<String>>>>;

pub struct MudServer {
    config: Config,
    processor: Arc<CommandProcessor>,
    outbound: DeliveryMap,
}

impl MudServer {
    /// Open the world store for `config` and prepare a server. Seeding of
    /// the starter world happens inside the store when needed.
    pub fn new(config: Config) -> Result<Self> {
        let store = WorldStore::open(&config.storage.data_dir)
            .with_context(|| format!("opening world store at {}", config.storage.data_dir))?;
        let registry = Arc::new(SessionRegistry::new());
        let processor = Arc::new(CommandProcessor::new(Arc::new(store), registry));
        Ok(MudServer {
            config,
            processor,
            outbound: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    pub fn processor(&self) -> &Arc<CommandProcessor> {
        &self.processor
    }

    /// Bind and serve until the process is stopped.
    pub async fn run(&self) -> Result<()> {
        let addr = format!(
            "{}:{}",
            self.config.server.bind_address, self.config.server.port
        );
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("binding {}", addr))?;
        info!("wiremud listening on {}", addr);

        loop {
            let (stream, peer) = listener.accept().await.context("accepting connection")?;
            let processor = Arc::clone(&self.processor);
            let outbound = Arc::clone(&self.outbound);
            tokio::spawn(async move {
                if let Err(err) = handle_connection(stream, peer, processor, outbound).await {
                    warn!("connection {} ended with error: {:#}", peer, err);
                }
            });
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    processor: Arc<CommandProcessor>,
    outbound: DeliveryMap,
) -> Result<()> {
    metrics::inc_connections_opened();

    let (read_half, mut write_half) = stream.into_split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    // Writer task: everything addressed to this session funnels through
    // one channel so interleaved fan-out from other connections cannot
    // tear a line apart.
    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let framed = format!("{}\r\n", message);
            if write_half.write_all(framed.as_bytes()).await.is_err() {
                break;
            }
        }
    });

    let mut session = Session::new();
    info!("connection from {} became session {}", peer, session.id);
    processor.registry().replace_or_store(session.clone());
    outbound
        .lock()
        .expect("delivery map mutex poisoned")
        .insert(session.id, tx.clone());

    let _ = tx.send(WELCOME_BANNER.to_string());

    let mut lines = BufReader::new(read_half).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                debug!("session {} read error: {}", session.id, err);
                break;
            }
        };

        let responses = processor.process_line(session.clone(), &line).await;
        session = deliver(&outbound, &session, responses);

        if session.should_close {
            debug!("session {} requested close", session.id);
            break;
        }
    }

    // Teardown: deregister before closing the channel so fan-out scans
    // stop addressing this session first. Dropping every sender lets the
    // writer drain queued lines (the goodbye message included) and exit.
    processor.registry().delete(&session);
    outbound
        .lock()
        .expect("delivery map mutex poisoned")
        .remove(&session.id);
    drop(tx);
    let _ = writer.await;
    metrics::inc_connections_closed();
    let totals = metrics::snapshot();
    info!(
        "session {} ({}) disconnected ({} connections so far, {} commands, {} responses)",
        session.id,
        peer,
        totals.connections_opened,
        totals.commands_executed,
        totals.responses_delivered
    );
    Ok(())
}

/// Deliver each response to its addressed session's stream and return
/// the invoker's updated session (commands hand back their mutations in
/// the response envelope).
fn deliver(outbound: &DeliveryMap, invoker: &Session, responses: Vec<MudResponse>) -> Session {
    let mut updated = invoker.clone();
    let map = outbound.lock().expect("delivery map mutex poisoned");
    for response in responses {
        metrics::inc_responses_delivered();
        match map.get(&response.session.id) {
            Some(tx) => {
                if tx.send(response.message).is_err() {
                    debug!(
                        "session {} channel closed; dropping response",
                        response.session.id
                    );
                }
            }
            None => debug!(
                "no live connection for session {}; dropping response",
                response.session.id
            ),
        }
        if response.session.id == updated.id {
            updated = response.session;
        }
    }
    updated
}
