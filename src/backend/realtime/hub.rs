/**
 * Board Broadcast Hub
 *
 * One topic per board, created on first join and dropped when its last
 * subscriber leaves. Every realtime connection owns a bounded
 * `tokio::sync::mpsc` queue; publishing pushes into each subscriber's
 * queue with `try_send`, so a slow or gone client loses events instead of
 * stalling the publisher.
 *
 * # Delivery
 *
 * - at most once, no acknowledgement, no replay
 * - FIFO per connection (fan-out happens under the hub lock)
 * - the publishing connection is skipped
 *
 * Join, leave and disconnect mutate the subscriber sets under the same
 * lock, so concurrent connects cannot lose a subscriber.
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

use crate::shared::event::{BoardEnvelope, BoardEvent, Presence};

/// Identity of one realtime connection
pub type ConnectionId = Uuid;

/// What a connection's queue carries
pub type Delivery = Arc<BoardEnvelope>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RealtimeError {
    #[error("unknown realtime connection {0}")]
    UnknownConnection(ConnectionId),

    #[error("realtime connection {0} belongs to another user")]
    NotOwner(ConnectionId),

    #[error("'{0}' events are produced by the server")]
    PresenceEvent(&'static str),
}

#[derive(Debug)]
struct Connection {
    user_id: Uuid,
    tx: mpsc::Sender<Delivery>,
    /// Boards joined, in join order
    boards: Vec<Uuid>,
}

#[derive(Debug, Default)]
struct HubState {
    connections: HashMap<ConnectionId, Connection>,
    /// Subscribers per board, in join order
    boards: HashMap<Uuid, Vec<ConnectionId>>,
}

impl HubState {
    fn owned(&self, id: ConnectionId, user_id: Uuid) -> Result<&Connection, RealtimeError> {
        let conn = self
            .connections
            .get(&id)
            .ok_or(RealtimeError::UnknownConnection(id))?;
        if conn.user_id != user_id {
            return Err(RealtimeError::NotOwner(id));
        }
        Ok(conn)
    }

    /// Distinct users subscribed to a board, in join order
    fn presence(&self, board_id: Uuid) -> Vec<Uuid> {
        let mut users = Vec::new();
        for id in self.boards.get(&board_id).into_iter().flatten() {
            if let Some(conn) = self.connections.get(id) {
                if !users.contains(&conn.user_id) {
                    users.push(conn.user_id);
                }
            }
        }
        users
    }

    fn fan_out(&self, board_id: Uuid, event: BoardEvent, origin: Option<ConnectionId>) -> usize {
        let Some(subscribers) = self.boards.get(&board_id) else {
            return 0;
        };
        let delivery: Delivery = Arc::new(BoardEnvelope::new(board_id, event));
        let mut delivered = 0;
        for id in subscribers.iter().filter(|id| Some(**id) != origin) {
            let Some(conn) = self.connections.get(id) else {
                continue;
            };
            match conn.tx.try_send(delivery.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::debug!(
                        "[Realtime] Queue full for connection {}, dropping {}",
                        id,
                        delivery.kind()
                    );
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(
                        "[Realtime] Connection {} closed, dropping {}",
                        id,
                        delivery.kind()
                    );
                }
            }
        }
        delivered
    }

    /// Remove one subscription. `user:left` goes out only once the user
    /// has no connection left on the board.
    fn unsubscribe(&mut self, id: ConnectionId, board_id: Uuid) -> Option<Presence> {
        let conn = self.connections.get_mut(&id)?;
        let user_id = conn.user_id;
        conn.boards.retain(|b| *b != board_id);

        let subscribers = self.boards.get_mut(&board_id)?;
        let before = subscribers.len();
        subscribers.retain(|s| *s != id);
        if subscribers.len() == before {
            return None;
        }
        if subscribers.is_empty() {
            self.boards.remove(&board_id);
            tracing::debug!("[Realtime] Board {} has no subscribers, channel closed", board_id);
        }

        let presence = Presence {
            user_id,
            users: self.presence(board_id),
        };
        // Still present through another connection
        if !presence.users.contains(&user_id) {
            self.fan_out(board_id, BoardEvent::UserLeft(presence.clone()), None);
        }
        Some(presence)
    }
}

/// Per-board publish/subscribe
#[derive(Debug, Clone)]
pub struct BoardHub {
    state: Arc<Mutex<HubState>>,
    capacity: usize,
}

impl BoardHub {
    /// `capacity` is the per-connection queue depth
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(HubState::default())),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a connection for `user_id` and hand back its queue
    pub fn connect(&self, user_id: Uuid) -> (ConnectionId, mpsc::Receiver<Delivery>) {
        let (tx, rx) = mpsc::channel(self.capacity);
        let id = Uuid::new_v4();
        self.lock().connections.insert(
            id,
            Connection {
                user_id,
                tx,
                boards: Vec::new(),
            },
        );
        tracing::info!("[Realtime] Connection {} opened for user {}", id, user_id);
        (id, rx)
    }

    /// Subscribe a connection to a board and announce it to every
    /// subscriber, the joiner included. Joining twice is a no-op.
    pub fn join(
        &self,
        id: ConnectionId,
        user_id: Uuid,
        board_id: Uuid,
    ) -> Result<Presence, RealtimeError> {
        let mut state = self.lock();
        state.owned(id, user_id)?;

        let subscribers = state.boards.entry(board_id).or_default();
        if subscribers.contains(&id) {
            return Ok(Presence {
                user_id,
                users: state.presence(board_id),
            });
        }
        subscribers.push(id);
        if let Some(conn) = state.connections.get_mut(&id) {
            conn.boards.push(board_id);
        }

        let presence = Presence {
            user_id,
            users: state.presence(board_id),
        };
        state.fan_out(board_id, BoardEvent::UserJoined(presence.clone()), None);
        tracing::info!("[Realtime] Connection {} joined board {}", id, board_id);
        Ok(presence)
    }

    /// Unsubscribe and, if this was the user's last connection on the
    /// board, announce `user:left` to the remaining subscribers. Leaving a
    /// board that was never joined is a no-op.
    pub fn leave(
        &self,
        id: ConnectionId,
        user_id: Uuid,
        board_id: Uuid,
    ) -> Result<Presence, RealtimeError> {
        let mut state = self.lock();
        state.owned(id, user_id)?;
        let presence = state.unsubscribe(id, board_id).unwrap_or_else(|| Presence {
            user_id,
            users: state.presence(board_id),
        });
        tracing::info!("[Realtime] Connection {} left board {}", id, board_id);
        Ok(presence)
    }

    /// Leave every joined board and forget the connection
    pub fn disconnect(&self, id: ConnectionId) {
        let mut state = self.lock();
        let boards = match state.connections.get(&id) {
            Some(conn) => conn.boards.clone(),
            None => return,
        };
        for board_id in boards {
            state.unsubscribe(id, board_id);
        }
        state.connections.remove(&id);
        tracing::info!("[Realtime] Connection {} disconnected", id);
    }

    /// Fan an event out to a board's subscribers except `origin`.
    /// Returns how many queues accepted it.
    pub fn publish(&self, board_id: Uuid, event: BoardEvent, origin: Option<ConnectionId>) -> usize {
        let kind = event.kind();
        let delivered = self.lock().fan_out(board_id, event, origin);
        tracing::debug!(
            "[Realtime] {} on board {} delivered to {} subscribers",
            kind,
            board_id,
            delivered
        );
        delivered
    }

    /// Relay an event a client sent over its own connection
    pub fn publish_from(
        &self,
        id: ConnectionId,
        user_id: Uuid,
        envelope: BoardEnvelope,
    ) -> Result<usize, RealtimeError> {
        if envelope.event.is_presence() {
            return Err(RealtimeError::PresenceEvent(envelope.kind()));
        }
        self.lock().owned(id, user_id)?;
        Ok(self.publish(envelope.board_id, envelope.event, Some(id)))
    }

    /// Whether `id` is an open connection of `user_id`
    pub fn is_owned_by(&self, id: ConnectionId, user_id: Uuid) -> bool {
        self.lock().owned(id, user_id).is_ok()
    }

    /// Connections currently subscribed to a board
    pub fn subscriber_count(&self, board_id: Uuid) -> usize {
        self.lock().boards.get(&board_id).map_or(0, Vec::len)
    }

    /// Whether a board currently has a topic
    pub fn has_channel(&self, board_id: Uuid) -> bool {
        self.lock().boards.contains_key(&board_id)
    }

    pub fn presence(&self, board_id: Uuid) -> Vec<Uuid> {
        self.lock().presence(board_id)
    }

    pub fn connection_count(&self) -> usize {
        self.lock().connections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::event::ListRemoved;
    use assert_matches::assert_matches;

    fn drain(rx: &mut mpsc::Receiver<Delivery>) -> Vec<Delivery> {
        let mut out = Vec::new();
        while let Ok(d) = rx.try_recv() {
            out.push(d);
        }
        out
    }

    fn list_deleted() -> BoardEvent {
        BoardEvent::ListDeleted(ListRemoved {
            list_id: Uuid::new_v4(),
        })
    }

    #[test]
    fn test_join_and_leave_presence() {
        let hub = BoardHub::new(16);
        let board = Uuid::new_v4();
        let (x_user, y_user) = (Uuid::new_v4(), Uuid::new_v4());
        let (x, mut x_rx) = hub.connect(x_user);
        let (y, mut y_rx) = hub.connect(y_user);

        hub.join(x, x_user, board).unwrap();
        hub.join(y, y_user, board).unwrap();

        let x_events = drain(&mut x_rx);
        assert_eq!(x_events.len(), 2);
        assert_matches!(
            &x_events[1].event,
            BoardEvent::UserJoined(p) if p.user_id == y_user && p.users == vec![x_user, y_user]
        );
        // The joiner hears its own join
        assert_matches!(
            drain(&mut y_rx).as_slice(),
            [d] if matches!(&d.event, BoardEvent::UserJoined(p) if p.user_id == y_user)
        );

        hub.leave(y, y_user, board).unwrap();
        assert_matches!(
            drain(&mut x_rx).as_slice(),
            [d] if matches!(&d.event, BoardEvent::UserLeft(p) if p.user_id == y_user && p.users == vec![x_user])
        );
        assert!(drain(&mut y_rx).is_empty());
    }

    #[test]
    fn test_publish_skips_origin() {
        let hub = BoardHub::new(16);
        let board = Uuid::new_v4();
        let user = Uuid::new_v4();
        let (a, mut a_rx) = hub.connect(user);
        let (b, mut b_rx) = hub.connect(user);
        hub.join(a, user, board).unwrap();
        hub.join(b, user, board).unwrap();
        drain(&mut a_rx);
        drain(&mut b_rx);

        assert_eq!(hub.publish(board, list_deleted(), Some(a)), 1);
        assert!(drain(&mut a_rx).is_empty());
        assert_eq!(drain(&mut b_rx).len(), 1);

        // Same user twice is listed once
        assert_eq!(hub.presence(board), vec![user]);
    }

    #[test]
    fn test_channel_collected_when_empty() {
        let hub = BoardHub::new(16);
        let board = Uuid::new_v4();
        let user = Uuid::new_v4();
        let (id, _rx) = hub.connect(user);
        assert!(!hub.has_channel(board));
        hub.join(id, user, board).unwrap();
        assert!(hub.has_channel(board));
        hub.leave(id, user, board).unwrap();
        assert!(!hub.has_channel(board));
        assert_eq!(hub.publish(board, list_deleted(), None), 0);
    }

    #[test]
    fn test_disconnect_leaves_every_board() {
        let hub = BoardHub::new(16);
        let (b1, b2) = (Uuid::new_v4(), Uuid::new_v4());
        let (gone_user, peer_user) = (Uuid::new_v4(), Uuid::new_v4());
        let (gone, _gone_rx) = hub.connect(gone_user);
        let (peer, mut peer_rx) = hub.connect(peer_user);
        for board in [b1, b2] {
            hub.join(peer, peer_user, board).unwrap();
            hub.join(gone, gone_user, board).unwrap();
        }
        drain(&mut peer_rx);

        hub.disconnect(gone);
        let left: Vec<_> = drain(&mut peer_rx)
            .iter()
            .filter(|d| matches!(d.event, BoardEvent::UserLeft(_)))
            .map(|d| d.board_id)
            .collect();
        assert_eq!(left, vec![b1, b2]);
        assert_eq!(hub.connection_count(), 1);
        assert_eq!(hub.subscriber_count(b1), 1);
    }

    #[test]
    fn test_left_only_after_last_connection_of_user() {
        let hub = BoardHub::new(16);
        let board = Uuid::new_v4();
        let (user, peer_user) = (Uuid::new_v4(), Uuid::new_v4());
        let (tab_one, _one_rx) = hub.connect(user);
        let (tab_two, _two_rx) = hub.connect(user);
        let (peer, mut peer_rx) = hub.connect(peer_user);
        for (id, owner) in [(peer, peer_user), (tab_one, user), (tab_two, user)] {
            hub.join(id, owner, board).unwrap();
        }
        drain(&mut peer_rx);

        let presence = hub.leave(tab_one, user, board).unwrap();
        assert_eq!(presence.users, vec![peer_user, user]);
        assert!(drain(&mut peer_rx).is_empty());

        hub.disconnect(tab_two);
        assert_matches!(
            drain(&mut peer_rx).as_slice(),
            [d] if matches!(&d.event, BoardEvent::UserLeft(p) if p.user_id == user && p.users == vec![peer_user])
        );
    }

    #[test]
    fn test_full_queue_drops_silently() {
        let hub = BoardHub::new(1);
        let board = Uuid::new_v4();
        let user = Uuid::new_v4();
        let (id, mut rx) = hub.connect(user);
        hub.join(id, user, board).unwrap();
        // The join event already fills the single slot
        assert_eq!(hub.publish(board, list_deleted(), None), 0);
        assert_eq!(drain(&mut rx).len(), 1);
        assert_eq!(hub.publish(board, list_deleted(), None), 1);
    }

    #[test]
    fn test_ownership_and_presence_guards() {
        let hub = BoardHub::new(4);
        let board = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let (id, _rx) = hub.connect(owner);

        assert_eq!(
            hub.join(id, Uuid::new_v4(), board),
            Err(RealtimeError::NotOwner(id))
        );
        let unknown = Uuid::new_v4();
        assert_eq!(
            hub.join(unknown, owner, board),
            Err(RealtimeError::UnknownConnection(unknown))
        );

        let forged = BoardEnvelope::new(
            board,
            BoardEvent::UserJoined(Presence {
                user_id: owner,
                users: vec![owner],
            }),
        );
        assert_eq!(
            hub.publish_from(id, owner, forged),
            Err(RealtimeError::PresenceEvent("user:joined"))
        );
    }
}
