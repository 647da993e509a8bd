//! Decision Load Guard - host binary
//!
//! Reads one JSON command per line on stdin. Writes `{"reply": ...}` for
//! each command and every outbound message as its own JSON line on stdout.
//! EOF on stdin shuts the engine down after a final flush.

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{broadcast, mpsc};

use dls_guard::constants::{APP_NAME, APP_VERSION};
use dls_guard::logic::engine::now_ms;
use dls_guard::logic::events::Emitter;
use dls_guard::logic::storage::{KeyValueStore, MemoryStore, SqliteStore, StorageError};
use dls_guard::{Command, GuardConfig, Reply, Session};

#[derive(Serialize)]
struct ReplyLine<'a> {
    reply: &'a Reply,
}

fn open_store(config: &GuardConfig) -> Result<Box<dyn KeyValueStore>, StorageError> {
    if config.ephemeral {
        log::info!("Using in-memory store (DLS_EPHEMERAL)");
        return Ok(Box::new(MemoryStore::new()));
    }
    let path = config.db_path();
    log::info!("Using SQLite store at {}", path.display());
    Ok(Box::new(SqliteStore::open(&path)?))
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    log::info!("Starting {} v{}", APP_NAME, APP_VERSION);

    let config = GuardConfig::from_env();
    let store = match open_store(&config) {
        Ok(store) => store,
        Err(e) => {
            log::error!("Failed to open store: {}", e);
            std::process::exit(1);
        }
    };

    let session = Session::open(config, store, Emitter::new(), now_ms());
    let (handle, engine) = dls_guard::spawn(session);

    // Single writer so lines never interleave
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(line) = out_rx.recv().await {
            if stdout.write_all(line.as_bytes()).await.is_err() || stdout.write_all(b"\n").await.is_err() {
                break;
            }
            let _ = stdout.flush().await;
        }
    });

    let mut outbound = handle.subscribe();
    let forward_tx = out_tx.clone();
    let forwarder = tokio::spawn(async move {
        loop {
            match outbound.recv().await {
                Ok(message) => match serde_json::to_string(&message) {
                    Ok(line) => {
                        if forward_tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => log::error!("Failed to encode outbound message: {}", e),
                },
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    log::warn!("Output lagging, skipped {} messages", n);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                log::error!("Failed to read stdin: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<Command>(&line) {
            Ok(command) => match handle.submit(command).await {
                Ok(reply) => reply,
                Err(e) => {
                    log::error!("{}", e);
                    break;
                }
            },
            Err(e) => {
                log::warn!("Rejected command: {}", e);
                Reply::error(e)
            }
        };

        match serde_json::to_string(&ReplyLine { reply: &reply }) {
            Ok(json) => {
                let _ = out_tx.send(json);
            }
            Err(e) => log::error!("Failed to encode reply: {}", e),
        }
    }

    drop(handle);
    if let Err(e) = engine.await {
        log::error!("Engine task failed: {}", e);
    }
    // Session dropped with the engine, which closes the outbound channel
    let _ = forwarder.await;
    drop(out_tx);
    let _ = writer.await;
    log::info!("{} stopped", APP_NAME);
}
