//! Implements SessionProvider using grammers Client.
//!
//! Resolved peers are cached by dialog id so each chunk send does not walk
//! the dialog list again (avoids FLOOD_WAIT). The cache is dropped whenever
//! the session fails its login check.

use crate::adapters::telegram::mapper;
use crate::domain::RecipientId;
use crate::ports::SessionProvider;
use async_trait::async_trait;
use grammers_client::Client;
use grammers_client::message::InputMessage;
use grammers_client::peer::Peer;
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Chat session adapter. Wraps a grammers Client whose session was authorized by `login`.
pub struct GrammersSessionProvider {
    client: Client,
    peer_cache: Mutex<HashMap<i64, Peer>>,
}

impl GrammersSessionProvider {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            peer_cache: Mutex::new(HashMap::new()),
        }
    }

    async fn cached_peer(&self, recipient: &RecipientId) -> Option<Peer> {
        let cached = self.peer_cache.lock().await.get(&recipient.id).cloned();
        if cached.is_some() {
            return cached;
        }
        // cache was invalidated since resolution
        self.resolve_recipient(&recipient.display_name).await?;
        self.peer_cache.lock().await.get(&recipient.id).cloned()
    }
}

#[async_trait]
impl SessionProvider for GrammersSessionProvider {
    async fn ensure_login(&self) -> bool {
        match mapper::unauthorized_reason(self.client.is_authorized().await) {
            None => true,
            Some(reason) => {
                warn!(%reason, "Telegram session unusable");
                self.peer_cache.lock().await.clear();
                false
            }
        }
    }

    async fn resolve_recipient(&self, display_name: &str) -> Option<RecipientId> {
        let mut dialogs = self.client.iter_dialogs();
        loop {
            match dialogs.next().await {
                Ok(Some(dialog)) => {
                    let peer = dialog.peer();
                    if mapper::peer_matches(peer, display_name) {
                        let recipient = mapper::recipient_from_peer(peer, display_name);
                        self.peer_cache
                            .lock()
                            .await
                            .insert(recipient.id, peer.clone());
                        debug!(id = recipient.id, name = %recipient.display_name, "recipient resolved");
                        return Some(recipient);
                    }
                }
                Ok(None) => return None,
                Err(e) => {
                    warn!(error = %e, "listing dialogs failed");
                    return None;
                }
            }
        }
    }

    async fn send_message(&self, text: &str, recipient: &RecipientId) -> bool {
        let Some(peer) = self.cached_peer(recipient).await else {
            warn!(id = recipient.id, "recipient not found for message");
            return false;
        };
        let Ok(Some(peer_ref)) = peer.to_ref().await else {
            warn!(id = recipient.id, "peer not in session cache");
            return false;
        };
        match self.client.send_message(peer_ref, text).await {
            Ok(_) => true,
            Err(e) => {
                warn!(id = recipient.id, error = %e, "send message failed");
                false
            }
        }
    }

    async fn send_file(&self, path: &Path, recipient: &RecipientId) -> bool {
        let Some(peer) = self.cached_peer(recipient).await else {
            warn!(id = recipient.id, "recipient not found for file");
            return false;
        };
        let Ok(Some(peer_ref)) = peer.to_ref().await else {
            warn!(id = recipient.id, "peer not in session cache");
            return false;
        };
        let uploaded = match self.client.upload_file(path).await {
            Ok(u) => u,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "upload failed");
                return false;
            }
        };
        let caption = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match self
            .client
            .send_message(peer_ref, InputMessage::from(caption.as_str()).document(uploaded))
            .await
        {
            Ok(_) => true,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "send file failed");
                false
            }
        }
    }
}
