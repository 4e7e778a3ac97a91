//! Actor-backed store
//!
//! The production backend: a single spawned task owns the [`StoreState`]
//! and drains a bounded mailbox one command at a time. The mailbox is the
//! execution slot: commands are serialized by arrival order, so a script
//! runs start-to-finish before the next command observes the state. This
//! is also the tie-break among concurrent purchase commits: first into the
//! mailbox wins.
//!
//! [`ActorStore`] is the cloneable client handle. It is cheap to share
//! across request handlers; a full mailbox applies backpressure and a
//! closed one surfaces as `StoreUnavailable`.

use crate::script::{self, Script, ScriptReply};
use crate::state::StoreState;
use crate::store::SaleStore;
use async_trait::async_trait;
use surge_core::{Error, Result, STORE_MAILBOX_DEPTH_MAX};
use tokio::sync::{mpsc, oneshot};

/// A command with its reply channel
#[derive(Debug)]
enum Command {
    GetInt {
        key: String,
        reply: oneshot::Sender<Result<Option<i64>>>,
    },
    SetInt {
        key: String,
        value: i64,
        reply: oneshot::Sender<Result<()>>,
    },
    HashGet {
        key: String,
        field: String,
        reply: oneshot::Sender<Result<Option<String>>>,
    },
    HashSetNx {
        key: String,
        field: String,
        value: String,
        reply: oneshot::Sender<Result<bool>>,
    },
    HashLen {
        key: String,
        reply: oneshot::Sender<Result<u64>>,
    },
    HashAll {
        key: String,
        reply: oneshot::Sender<Result<Vec<(String, String)>>>,
    },
    Delete {
        key: String,
        reply: oneshot::Sender<Result<()>>,
    },
    Eval {
        script: Script,
        reply: oneshot::Sender<Result<ScriptReply>>,
    },
}

/// Cloneable handle to the store actor
#[derive(Debug, Clone)]
pub struct ActorStore {
    tx: mpsc::Sender<Command>,
}

impl ActorStore {
    /// Spawn the store actor and return a handle to it
    ///
    /// The actor runs until every handle is dropped.
    pub fn spawn() -> Self {
        let (tx, mut rx) = mpsc::channel(STORE_MAILBOX_DEPTH_MAX);

        tokio::spawn(async move {
            let mut state = StoreState::new();
            while let Some(command) = rx.recv().await {
                apply(&mut state, command);
            }
            tracing::debug!("store mailbox closed, actor shutting down");
        });

        Self { tx }
    }

    /// Send a command and await its reply
    async fn submit<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T>>) -> Command,
    ) -> Result<T> {
        let (reply, rx) = oneshot::channel();

        self.tx
            .send(build(reply))
            .await
            .map_err(|_| Error::store_unavailable("store actor is not running"))?;

        rx.await
            .map_err(|_| Error::store_unavailable("store actor dropped the request"))?
    }
}

/// Apply one command to the state
///
/// Reply-channel send failures are ignored: a caller that went away does
/// not abort the command, which has already taken effect by the time the
/// reply is sent.
fn apply(state: &mut StoreState, command: Command) {
    match command {
        Command::GetInt { key, reply } => {
            let _ = reply.send(state.get_int(&key));
        }
        Command::SetInt { key, value, reply } => {
            let _ = reply.send(state.set_int(&key, value));
        }
        Command::HashGet { key, field, reply } => {
            let _ = reply.send(
                state
                    .hash_get(&key, &field)
                    .map(|v| v.map(str::to_string)),
            );
        }
        Command::HashSetNx {
            key,
            field,
            value,
            reply,
        } => {
            let _ = reply.send(state.hash_set_nx(&key, &field, &value));
        }
        Command::HashLen { key, reply } => {
            let _ = reply.send(state.hash_len(&key));
        }
        Command::HashAll { key, reply } => {
            let _ = reply.send(state.hash_all(&key));
        }
        Command::Delete { key, reply } => {
            state.delete(&key);
            let _ = reply.send(Ok(()));
        }
        Command::Eval { script, reply } => {
            let _ = reply.send(script::eval(state, &script));
        }
    }
}

#[async_trait]
impl SaleStore for ActorStore {
    async fn get_int(&self, key: &str) -> Result<Option<i64>> {
        let key = key.to_string();
        self.submit(|reply| Command::GetInt { key, reply }).await
    }

    async fn set_int(&self, key: &str, value: i64) -> Result<()> {
        let key = key.to_string();
        self.submit(|reply| Command::SetInt { key, value, reply })
            .await
    }

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>> {
        let key = key.to_string();
        let field = field.to_string();
        self.submit(|reply| Command::HashGet { key, field, reply })
            .await
    }

    async fn hash_set_nx(&self, key: &str, field: &str, value: &str) -> Result<bool> {
        let key = key.to_string();
        let field = field.to_string();
        let value = value.to_string();
        self.submit(|reply| Command::HashSetNx {
            key,
            field,
            value,
            reply,
        })
        .await
    }

    async fn hash_len(&self, key: &str) -> Result<u64> {
        let key = key.to_string();
        self.submit(|reply| Command::HashLen { key, reply }).await
    }

    async fn hash_all(&self, key: &str) -> Result<Vec<(String, String)>> {
        let key = key.to_string();
        self.submit(|reply| Command::HashAll { key, reply }).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.submit(|reply| Command::Delete { key, reply }).await
    }

    async fn eval(&self, script: Script) -> Result<ScriptReply> {
        self.submit(|reply| Command::Eval { script, reply }).await
    }
}
