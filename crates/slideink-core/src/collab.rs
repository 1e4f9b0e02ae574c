//! Room membership and presence for multi-user editing.
//!
//! Document content syncs through [`DeckDocument`](crate::crdt::DeckDocument)
//! updates; this module covers the rest of the collaboration surface:
//! authorizing into a room, the connection lifecycle, and the ephemeral
//! awareness state (cursor, user identity) that is never persisted.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Palette of user colors; a user's id hashes to a stable entry.
const USER_COLORS: &[&str] = &[
    "#FF6B6B", // red
    "#4ECDC4", // teal
    "#45B7D1", // blue
    "#FFA07A", // light salmon
    "#98D8C8", // mint
    "#F7DC6F", // yellow
    "#BB8FCE", // purple
    "#85C1E2", // sky blue
];

/// Stable display color for a user id.
pub fn user_color(user_id: &str) -> &'static str {
    let mut hash: i32 = 0;
    for ch in user_id.chars() {
        hash = hash.wrapping_shl(5).wrapping_sub(hash).wrapping_add(ch as i32);
    }
    USER_COLORS[hash.unsigned_abs() as usize % USER_COLORS.len()]
}

/// Display name for an anonymous user, derived from the id prefix.
pub fn display_name(user_id: &str) -> String {
    let prefix: String = user_id.chars().take(8).collect();
    format!("Anonymous User {prefix}")
}

/// Generate a fresh room id.
pub fn generate_room_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a fresh anonymous user id.
pub fn generate_user_id() -> String {
    Uuid::new_v4().to_string()
}

/// Connection state of a room session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// User identity shown to other peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: String,
    pub color: String,
}

impl UserInfo {
    /// Derive the anonymous identity for a user id.
    pub fn anonymous(user_id: &str) -> Self {
        Self { name: display_name(user_id), color: user_color(user_id).to_string() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorPosition {
    pub x: f64,
    pub y: f64,
}

/// Ephemeral per-peer state broadcast alongside document updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AwarenessState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<CursorPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserInfo>,
}

/// Encode an awareness state for broadcast.
pub fn encode_awareness(state: &AwarenessState) -> String {
    serde_json::to_string(state).unwrap_or_default()
}

/// Decode a peer's awareness broadcast; malformed payloads are dropped.
pub fn decode_awareness(json: &str) -> Option<AwarenessState> {
    serde_json::from_str(json).ok()
}

/// Opaque room access token issued by an [`AuthProvider`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomToken(pub String);

/// Errors authorizing into a room.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing user id")]
    MissingUserId,
    #[error("missing room id")]
    MissingRoomId,
    #[error("authorization rejected: {0}")]
    Rejected(String),
}

/// Issues room access tokens. Implementations call out to whatever
/// backend actually signs them.
pub trait AuthProvider {
    fn authorize(&self, user_id: &str, room_id: &str) -> Result<RoomToken, AuthError>;
}

/// One user's membership in a collaboration room.
#[derive(Debug, Clone)]
pub struct RoomSession {
    user_id: String,
    state: ConnectionState,
    room_id: Option<String>,
    token: Option<RoomToken>,
    awareness: AwarenessState,
}

impl RoomSession {
    pub fn new(user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        let awareness = AwarenessState { cursor: None, user: Some(UserInfo::anonymous(&user_id)) };
        Self { user_id, state: ConnectionState::Disconnected, room_id: None, token: None, awareness }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    pub fn token(&self) -> Option<&RoomToken> {
        self.token.as_ref()
    }

    pub fn awareness(&self) -> &AwarenessState {
        &self.awareness
    }

    /// Authorize into a room. A rejected authorization leaves the
    /// session in the error state.
    pub fn connect(
        &mut self,
        provider: &dyn AuthProvider,
        room_id: &str,
    ) -> Result<(), AuthError> {
        if self.user_id.is_empty() {
            return Err(AuthError::MissingUserId);
        }
        if room_id.is_empty() {
            return Err(AuthError::MissingRoomId);
        }

        self.state = ConnectionState::Connecting;
        match provider.authorize(&self.user_id, room_id) {
            Ok(token) => {
                self.token = Some(token);
                self.room_id = Some(room_id.to_string());
                self.state = ConnectionState::Connected;
                Ok(())
            }
            Err(err) => {
                log::warn!("room authorization failed: {err}");
                self.token = None;
                self.state = ConnectionState::Error;
                Err(err)
            }
        }
    }

    /// Leave the room.
    pub fn disconnect(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.room_id = None;
        self.token = None;
        self.awareness.cursor = None;
    }

    /// Broadcastable cursor position update.
    pub fn set_cursor(&mut self, x: f64, y: f64) {
        self.awareness.cursor = Some(CursorPosition { x, y });
    }

    /// Cursor left the canvas.
    pub fn clear_cursor(&mut self) {
        self.awareness.cursor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticProvider {
        result: Result<RoomToken, AuthError>,
    }

    impl AuthProvider for StaticProvider {
        fn authorize(&self, _user_id: &str, _room_id: &str) -> Result<RoomToken, AuthError> {
            self.result.clone()
        }
    }

    #[test]
    fn test_user_color_is_stable_and_in_palette() {
        let c1 = user_color("user-1234");
        let c2 = user_color("user-1234");
        assert_eq!(c1, c2);
        assert!(USER_COLORS.contains(&c1));
        // Different ids should generally spread across the palette.
        assert!(USER_COLORS.contains(&user_color("another-user")));
        assert!(USER_COLORS.contains(&user_color("")));
    }

    #[test]
    fn test_display_name_uses_id_prefix() {
        assert_eq!(display_name("abcdef1234567890"), "Anonymous User abcdef12");
        assert_eq!(display_name("ab"), "Anonymous User ab");
    }

    #[test]
    fn test_connect_success() {
        let provider = StaticProvider { result: Ok(RoomToken("tok".into())) };
        let mut session = RoomSession::new("user-1");
        assert_eq!(session.state(), ConnectionState::Disconnected);

        session.connect(&provider, "room-1").unwrap();
        assert_eq!(session.state(), ConnectionState::Connected);
        assert_eq!(session.room_id(), Some("room-1"));
        assert_eq!(session.token(), Some(&RoomToken("tok".into())));

        session.disconnect();
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert_eq!(session.token(), None);
    }

    #[test]
    fn test_connect_rejection_enters_error_state() {
        let provider = StaticProvider { result: Err(AuthError::Rejected("nope".into())) };
        let mut session = RoomSession::new("user-1");

        let err = session.connect(&provider, "room-1").unwrap_err();
        assert_eq!(err, AuthError::Rejected("nope".into()));
        assert_eq!(session.state(), ConnectionState::Error);
        assert_eq!(session.token(), None);
    }

    #[test]
    fn test_connect_validates_ids() {
        let provider = StaticProvider { result: Ok(RoomToken("tok".into())) };
        let mut session = RoomSession::new("");
        assert_eq!(session.connect(&provider, "room"), Err(AuthError::MissingUserId));

        let mut session = RoomSession::new("user");
        assert_eq!(session.connect(&provider, ""), Err(AuthError::MissingRoomId));
    }

    #[test]
    fn test_awareness_wire_roundtrip() {
        let mut session = RoomSession::new("user-1");
        session.set_cursor(3.0, 4.0);

        let wire = encode_awareness(session.awareness());
        let decoded = decode_awareness(&wire).unwrap();
        assert_eq!(decoded.cursor, Some(CursorPosition { x: 3.0, y: 4.0 }));
        assert_eq!(decoded.user, session.awareness().user);

        assert!(decode_awareness("not json").is_none());
    }

    #[test]
    fn test_awareness_cursor() {
        let mut session = RoomSession::new("user-1");
        assert!(session.awareness().user.is_some());

        session.set_cursor(10.0, 20.0);
        assert_eq!(session.awareness().cursor, Some(CursorPosition { x: 10.0, y: 20.0 }));
        session.clear_cursor();
        assert_eq!(session.awareness().cursor, None);
    }
}
