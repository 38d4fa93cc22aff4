//! Peer references and chat classification.

use std::fmt;

use layer_tl_types as tl;
use serde::Serialize;

// ─── PeerRef ──────────────────────────────────────────────────────────────────

/// A chat-like entity as Telegram addresses it: an ID plus, where the server
/// requires one, the access hash that proves we may see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PeerRef {
    /// Broadcast channel or supergroup.
    Channel { id: i64, access_hash: i64 },
    /// Legacy (basic) group. No access hash needed.
    Chat { id: i64 },
    /// Private conversation with a user.
    User { id: i64, access_hash: i64 },
    /// The logged-in account itself (Saved Messages).
    SelfUser,
}

impl PeerRef {
    /// Bare numeric ID; `0` for [`PeerRef::SelfUser`].
    pub fn id(&self) -> i64 {
        match *self {
            Self::Channel { id, .. } | Self::Chat { id } | Self::User { id, .. } => id,
            Self::SelfUser => 0,
        }
    }

    /// Convert from the wire `InputPeer`. Empty and `*FromMessage` peers have
    /// no stable identity and yield `None`.
    pub fn from_input(peer: &tl::enums::InputPeer) -> Option<Self> {
        match peer {
            tl::enums::InputPeer::Channel(c) => Some(Self::Channel {
                id: c.channel_id, access_hash: c.access_hash,
            }),
            tl::enums::InputPeer::Chat(c)    => Some(Self::Chat { id: c.chat_id }),
            tl::enums::InputPeer::User(u)    => Some(Self::User {
                id: u.user_id, access_hash: u.access_hash,
            }),
            tl::enums::InputPeer::PeerSelf   => Some(Self::SelfUser),
            _ => None,
        }
    }

    /// Convert to the wire `InputPeer`.
    pub fn to_input(&self) -> tl::enums::InputPeer {
        match *self {
            Self::Channel { id, access_hash } => tl::enums::InputPeer::Channel(tl::types::InputPeerChannel {
                channel_id: id, access_hash,
            }),
            Self::Chat { id } => tl::enums::InputPeer::Chat(tl::types::InputPeerChat { chat_id: id }),
            Self::User { id, access_hash } => tl::enums::InputPeer::User(tl::types::InputPeerUser {
                user_id: id, access_hash,
            }),
            Self::SelfUser => tl::enums::InputPeer::PeerSelf,
        }
    }

    /// `InputChannel` for channel-only RPCs (`channels.getChannels`, …).
    pub fn to_input_channel(&self) -> Option<tl::enums::InputChannel> {
        match *self {
            Self::Channel { id, access_hash } => Some(tl::enums::InputChannel::InputChannel(
                tl::types::InputChannel { channel_id: id, access_hash },
            )),
            _ => None,
        }
    }
}

impl fmt::Display for PeerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Channel { id, access_hash } => write!(f, "channel {id} (access hash {access_hash})"),
            Self::Chat { id }                 => write!(f, "group {id}"),
            Self::User { id, .. }             => write!(f, "user {id}"),
            Self::SelfUser                    => write!(f, "self"),
        }
    }
}

// ─── PeerKind ─────────────────────────────────────────────────────────────────

/// What a dialog turns out to be once its entity is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerKind {
    /// One-to-many broadcast channel.
    Channel,
    /// Channel-backed discussion group.
    Supergroup,
    /// Legacy (basic) group.
    Group,
    /// Private chat with a user.
    Private,
}

impl PeerKind {
    /// A resolved channel entity is a broadcast channel when its broadcast
    /// flag is set, a supergroup otherwise.
    pub fn of_channel(broadcast: bool) -> Self {
        if broadcast { Self::Channel } else { Self::Supergroup }
    }

    /// Channels, supergroups and legacy groups. Private chats are not.
    pub fn is_group_like(self) -> bool { !matches!(self, Self::Private) }

    pub fn emoji(self) -> &'static str {
        match self {
            Self::Channel    => "📢",
            Self::Supergroup => "👥",
            Self::Group      => "💬",
            Self::Private    => "👤",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Channel    => "Channel",
            Self::Supergroup => "Supergroup",
            Self::Group      => "Group",
            Self::Private    => "Private chat",
        }
    }
}

impl fmt::Display for PeerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
