//! Event gateway — routes the fixed event set between connections, the
//! room registry, and the persistence collaborators.
//!
//! The gateway is transport-independent: the WebSocket layer feeds raw
//! frames into [`Gateway::handle_event`] and forwards whatever appears on
//! a connection's outbound channel. Every handler is fault-isolated — a
//! failed operation produces a scoped `error` event for the originating
//! connection and nothing else; the connection itself is never torn down.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use margins_core::config::realtime::RealtimeConfig;
use margins_core::error::AppError;
use margins_core::types::id::{CommentId, RoomId};
use margins_entity::{NewComment, TextAnchor};

use crate::collaborators::{CommentStore, MembershipChecker};
use crate::connection::authenticator::AuthenticatedConnection;
use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::connection::pool::ConnectionPool;
use crate::message::types::{ClientEvent, ServerEvent};
use crate::room::registry::RoomRegistry;

/// The realtime event multiplexer.
#[derive(Clone)]
pub struct Gateway {
    /// Active connections.
    pool: Arc<ConnectionPool>,
    /// Presence table.
    registry: Arc<RoomRegistry>,
    /// Room membership collaborator.
    membership: Arc<dyn MembershipChecker>,
    /// Comment persistence collaborator.
    comments: Arc<dyn CommentStore>,
    /// Gateway configuration.
    config: RealtimeConfig,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("connections", &self.pool.connection_count())
            .field("rooms", &self.registry.room_count())
            .finish()
    }
}

impl Gateway {
    /// Creates a new gateway.
    pub fn new(
        config: RealtimeConfig,
        membership: Arc<dyn MembershipChecker>,
        comments: Arc<dyn CommentStore>,
    ) -> Self {
        Self {
            pool: Arc::new(ConnectionPool::new()),
            registry: Arc::new(RoomRegistry::new()),
            membership,
            comments,
            config,
        }
    }

    /// Registers an authenticated connection.
    ///
    /// Returns the connection handle and the receiver the transport must
    /// drain into the socket sink.
    pub fn register(
        &self,
        auth: AuthenticatedConnection,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);

        let handle = Arc::new(ConnectionHandle::new(
            auth.identity.clone(),
            auth.session_id,
            tx,
        ));
        self.pool.add(handle.clone());

        info!(
            conn_id = %handle.id,
            principal_id = %auth.identity.principal_id,
            session_id = %auth.session_id,
            "Connection registered"
        );

        (handle, rx)
    }

    /// Unregisters a connection on disconnect.
    ///
    /// Leaves the room (if joined) with the usual `user-left` broadcast;
    /// connections that never joined produce no broadcast.
    pub fn unregister(&self, conn_id: &ConnectionId) {
        if let Some(handle) = self.pool.remove(conn_id) {
            handle.mark_dead();

            if let Some(departure) = self.registry.leave(*conn_id) {
                self.broadcast(
                    &departure.recipients,
                    &ServerEvent::UserLeft {
                        user: departure.identity,
                    },
                );
            }

            info!(
                conn_id = %conn_id,
                principal_id = %handle.identity.principal_id,
                "Connection unregistered"
            );
        }
    }

    /// Processes one inbound frame from a connection.
    pub async fn handle_event(&self, conn_id: &ConnectionId, raw: &str) {
        let Some(handle) = self.pool.get(conn_id) else {
            warn!(conn_id = %conn_id, "Event from unknown connection");
            return;
        };

        let event: ClientEvent = match serde_json::from_str(raw) {
            Ok(event) => event,
            Err(e) => {
                self.send_error(&handle, &format!("Failed to parse event: {e}"));
                return;
            }
        };

        let result = match event {
            ClientEvent::JoinRoom { room_id } => self.handle_join(&handle, room_id).await,
            ClientEvent::LeaveRoom {} => self.handle_leave(&handle),
            ClientEvent::AddComment {
                room_id,
                content,
                text_anchor,
                parent_id,
            } => {
                self.handle_add_comment(&handle, room_id, content, text_anchor, parent_id)
                    .await
            }
            ClientEvent::UpdateComment {
                comment_id,
                content,
            } => self.handle_update_comment(&handle, comment_id, content).await,
            ClientEvent::ActivityPing { section, detail } => {
                self.handle_activity(&handle, section, detail)
            }
        };

        // Fault isolation: a failed handler notifies only its own
        // connection and never affects other members or pending events.
        if let Err(e) = result {
            debug!(conn_id = %handle.id, error = %e, "Event handler failed");
            self.send_error(&handle, &e.message);
        }
    }

    /// Handles `join-room`.
    async fn handle_join(
        &self,
        handle: &Arc<ConnectionHandle>,
        room_id: RoomId,
    ) -> Result<(), AppError> {
        let allowed = self
            .membership
            .is_member(handle.identity.principal_id, room_id)
            .await?;

        if !allowed {
            return Err(AppError::authorization("Not a member of this room"));
        }

        let outcome = self
            .registry
            .join(handle.id, room_id, handle.identity.clone());

        // The implicit departure must be visible before the join.
        if let Some(departure) = outcome.left {
            self.broadcast(
                &departure.recipients,
                &ServerEvent::UserLeft {
                    user: departure.identity,
                },
            );
        }

        self.broadcast(
            &outcome.recipients,
            &ServerEvent::UserJoined {
                user: outcome.identity,
            },
        );

        handle.send(
            ServerEvent::ActiveUsers {
                users: outcome.snapshot,
            }
            .encode(),
        );

        info!(
            conn_id = %handle.id,
            room_id = %room_id,
            "Joined room"
        );

        Ok(())
    }

    /// Handles `leave-room`. No-op if the connection is not in a room.
    fn handle_leave(&self, handle: &Arc<ConnectionHandle>) -> Result<(), AppError> {
        if let Some(departure) = self.registry.leave(handle.id) {
            self.broadcast(
                &departure.recipients,
                &ServerEvent::UserLeft {
                    user: departure.identity,
                },
            );
            info!(conn_id = %handle.id, room_id = %departure.room_id, "Left room");
        }
        Ok(())
    }

    /// Handles `add-comment`.
    async fn handle_add_comment(
        &self,
        handle: &Arc<ConnectionHandle>,
        room_id: Option<RoomId>,
        content: String,
        text_anchor: Option<TextAnchor>,
        parent_id: Option<CommentId>,
    ) -> Result<(), AppError> {
        let target = room_id
            .or_else(|| self.registry.room_of(handle.id))
            .ok_or_else(|| AppError::validation("No room specified and none joined"))?;

        if content.trim().is_empty() {
            return Err(AppError::validation("Comment content must not be empty"));
        }

        let allowed = self
            .membership
            .is_member(handle.identity.principal_id, target)
            .await?;
        if !allowed {
            return Err(AppError::authorization("Not a member of this room"));
        }

        let comment = self
            .comments
            .create(NewComment {
                room_id: target,
                author: handle.identity.clone(),
                content,
                anchor: text_anchor,
                parent_id,
            })
            .await?;

        let author = comment.author.clone();
        self.broadcast_to_room_including(
            target,
            handle,
            &ServerEvent::CommentAdded { comment, author },
        );

        Ok(())
    }

    /// Handles `update-comment`. Only the original author succeeds.
    async fn handle_update_comment(
        &self,
        handle: &Arc<ConnectionHandle>,
        comment_id: CommentId,
        content: String,
    ) -> Result<(), AppError> {
        if content.trim().is_empty() {
            return Err(AppError::validation("Comment content must not be empty"));
        }

        let comment = self
            .comments
            .update(comment_id, &content, handle.identity.principal_id)
            .await?;

        let room_id = comment.room_id;
        let author = comment.author.clone();
        self.broadcast_to_room_including(
            room_id,
            handle,
            &ServerEvent::CommentUpdated { comment, author },
        );

        Ok(())
    }

    /// Handles `activity-ping`. Fire-and-forget; silently dropped when the
    /// connection is not in a room.
    fn handle_activity(
        &self,
        handle: &Arc<ConnectionHandle>,
        section: String,
        detail: Option<String>,
    ) -> Result<(), AppError> {
        if let Some((_, recipients)) = self.registry.recipients(handle.id) {
            self.broadcast(
                &recipients,
                &ServerEvent::UserPresence {
                    identity: handle.identity.clone(),
                    section,
                    detail,
                    timestamp: Utc::now(),
                },
            );
        }
        Ok(())
    }

    /// Unicasts an error event.
    fn send_error(&self, handle: &ConnectionHandle, message: &str) {
        handle.send(
            ServerEvent::Error {
                message: message.to_string(),
            }
            .encode(),
        );
    }

    /// Sends an event to a recipient set.
    fn broadcast(&self, recipients: &[ConnectionId], event: &ServerEvent) {
        let msg = event.encode();
        for conn_id in recipients {
            if let Some(handle) = self.pool.get(conn_id) {
                handle.send(msg.clone());
            }
        }
    }

    /// Sends an event to every member of a room, always including the
    /// acting connection even when it posted into a room it has not
    /// joined.
    fn broadcast_to_room_including(
        &self,
        room_id: RoomId,
        actor: &Arc<ConnectionHandle>,
        event: &ServerEvent,
    ) {
        let mut recipients = self.registry.room_connections(room_id);
        if !recipients.contains(&actor.id) {
            recipients.push(actor.id);
        }
        self.broadcast(&recipients, event);
    }

    /// Closes all connections (graceful shutdown).
    pub fn close_all(&self) {
        let all = self.pool.all_connections();
        for conn in &all {
            conn.mark_dead();
            self.pool.remove(&conn.id);
        }
        if !all.is_empty() {
            info!(count = all.len(), "All connections closed");
        }
    }

    /// Returns the total connection count.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Returns the registry (presence queries go through its public
    /// operations).
    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }
}
