//! Dialog enumeration and classification.
//!
//! Every dialog resolves to one [`PeerKind`]. Channel entries need their
//! entity to tell broadcast channels from supergroups; that entity either
//! comes with the dialog listing or from a per-entry `channels.getChannels`
//! call ([`Lookup::Remote`]). A failed per-entry call is logged and the entry
//! skipped; the rest of the list is still processed.

use std::fmt;

use serde::Serialize;

use crate::api::TelegramApi;
use crate::errors::Result;
use crate::peer::{PeerKind, PeerRef};

// ─── Entities ─────────────────────────────────────────────────────────────────

/// A broadcast channel or supergroup entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChannelInfo {
    pub id:                 i64,
    pub access_hash:        Option<i64>,
    pub title:              String,
    pub username:           Option<String>,
    pub broadcast:          bool,
    pub megagroup:          bool,
    pub verified:           bool,
    pub restricted:         bool,
    pub participants_count: Option<i32>,
}

/// A legacy group entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupInfo {
    pub id:                 i64,
    pub title:              String,
    pub participants_count: i32,
}

/// A chat entity as returned by `channels.getChannels` / `messages.getChats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatInfo {
    Channel(ChannelInfo),
    Group(GroupInfo),
}

impl ChatInfo {
    pub fn id(&self) -> i64 {
        match self {
            Self::Channel(c) => c.id,
            Self::Group(g)   => g.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Channel(c) => &c.title,
            Self::Group(g)   => &g.title,
        }
    }

    pub fn kind(&self) -> PeerKind {
        match self {
            Self::Channel(c) => PeerKind::of_channel(c.broadcast),
            Self::Group(_)   => PeerKind::Group,
        }
    }
}

/// Extra data from `channels.getFullChannel`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelFullInfo {
    pub about:              String,
    pub participants_count: Option<i32>,
}

/// One row of the user's dialog list.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogEntry {
    pub peer:    PeerRef,
    pub title:   String,
    /// Deleted account, or a chat we can no longer see.
    pub deleted: bool,
    /// Entity delivered with the listing, if any.
    pub chat:    Option<ChatInfo>,
}

/// A dialog after classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedDialog {
    pub peer:         PeerRef,
    pub kind:         PeerKind,
    pub title:        String,
    pub username:     Option<String>,
    pub participants: Option<i32>,
}

impl ClassifiedDialog {
    fn from_chat(peer: PeerRef, chat: &ChatInfo) -> Self {
        match chat {
            ChatInfo::Channel(c) => Self {
                peer,
                kind:         PeerKind::of_channel(c.broadcast),
                title:        c.title.clone(),
                username:     c.username.clone().filter(|u| !u.is_empty()),
                participants: c.participants_count,
            },
            ChatInfo::Group(g) => Self {
                peer,
                kind:         PeerKind::Group,
                title:        g.title.clone(),
                username:     None,
                participants: Some(g.participants_count),
            },
        }
    }

    /// Case-insensitive substring match on title and username.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.username.as_deref().is_some_and(|u| u.to_lowercase().contains(&needle))
    }
}

/// `📢 Title (@user) - ID: 123` plus a members line when known.
impl fmt::Display for ClassifiedDialog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.kind.emoji(), self.kind, self.title)?;
        if let Some(u) = &self.username {
            write!(f, " (@{u})")?;
        }
        write!(f, " - ID: {}", self.peer.id())?;
        if let Some(n) = self.participants.filter(|n| *n > 0) {
            write!(f, "\n   👥 Members: {n}")?;
        }
        Ok(())
    }
}

/// Pure classification rule.
///
/// Channel peers need their entity; without one the kind is unknown.
pub fn classify(peer: &PeerRef, chat: Option<&ChatInfo>) -> Option<PeerKind> {
    match peer {
        PeerRef::Channel { .. } => match chat {
            Some(ChatInfo::Channel(c)) => Some(PeerKind::of_channel(c.broadcast)),
            _ => None,
        },
        PeerRef::Chat { .. } => Some(PeerKind::Group),
        PeerRef::User { .. } | PeerRef::SelfUser => Some(PeerKind::Private),
    }
}

// ─── Enumeration ──────────────────────────────────────────────────────────────

/// Where entity metadata comes from while enumerating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lookup {
    /// Use the entities delivered with the dialog listing.
    #[default]
    Listing,
    /// Issue one metadata call per channel / group entry.
    Remote,
}

/// Enumerate and classify every non-deleted dialog.
pub async fn enumerate<A: TelegramApi + ?Sized>(api: &A, lookup: Lookup) -> Result<Vec<ClassifiedDialog>> {
    let entries = api.dialogs().await?;
    let mut out = Vec::with_capacity(entries.len());

    for entry in entries {
        if entry.deleted {
            continue;
        }
        if let Some(dialog) = classify_entry(api, &entry, lookup).await {
            out.push(dialog);
        }
    }
    Ok(out)
}

async fn classify_entry<A: TelegramApi + ?Sized>(
    api:    &A,
    entry:  &DialogEntry,
    lookup: Lookup,
) -> Option<ClassifiedDialog> {
    let chat = match (entry.peer, lookup) {
        (PeerRef::User { .. } | PeerRef::SelfUser, _) => {
            return Some(ClassifiedDialog {
                peer:         entry.peer,
                kind:         PeerKind::Private,
                title:        entry.title.clone(),
                username:     None,
                participants: None,
            });
        }
        (_, Lookup::Listing) => entry.chat.clone(),
        (PeerRef::Channel { .. }, Lookup::Remote) => match api.get_channels(&[entry.peer]).await {
            Ok(chats) => chats.into_iter().find(|c| matches!(c, ChatInfo::Channel(_))),
            Err(e) => {
                log::warn!("failed to fetch channel {}: {e}", entry.peer.id());
                return None;
            }
        },
        (PeerRef::Chat { id }, Lookup::Remote) => match api.get_chats(&[id]).await {
            Ok(chats) => chats.into_iter().find(|c| matches!(c, ChatInfo::Group(_))),
            Err(e) => {
                log::warn!("failed to fetch group {id}: {e}");
                return None;
            }
        },
    };

    match (entry.peer, chat) {
        (_, Some(chat)) => Some(ClassifiedDialog::from_chat(entry.peer, &chat)),
        (PeerRef::Chat { .. }, None) => Some(ClassifiedDialog {
            peer:         entry.peer,
            kind:         PeerKind::Group,
            title:        entry.title.clone(),
            username:     None,
            participants: None,
        }),
        (peer, None) => {
            log::debug!("no entity for {peer}, skipping");
            None
        }
    }
}

/// Only dialogs of the given kinds.
pub async fn enumerate_kinds<A: TelegramApi + ?Sized>(
    api:    &A,
    lookup: Lookup,
    kinds:  &[PeerKind],
) -> Result<Vec<ClassifiedDialog>> {
    let mut all = enumerate(api, lookup).await?;
    all.retain(|d| kinds.contains(&d.kind));
    Ok(all)
}

/// Channels, supergroups and legacy groups whose title (or username) contains `name`.
pub async fn find_by_name<A: TelegramApi + ?Sized>(
    api:    &A,
    name:   &str,
    lookup: Lookup,
) -> Result<Vec<ClassifiedDialog>> {
    let mut all = enumerate(api, lookup).await?;
    all.retain(|d| d.kind.is_group_like() && d.matches(name));
    Ok(all)
}

// ─── Organisation statistics ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrganizationStats {
    pub channels:      usize,
    pub supergroups:   usize,
    pub groups:        usize,
    pub private_chats: usize,
    pub folders:       usize,
}

impl OrganizationStats {
    pub fn tally(dialogs: &[ClassifiedDialog]) -> Self {
        let mut stats = Self::default();
        for d in dialogs {
            match d.kind {
                PeerKind::Channel    => stats.channels += 1,
                PeerKind::Supergroup => stats.supergroups += 1,
                PeerKind::Group      => stats.groups += 1,
                PeerKind::Private    => stats.private_chats += 1,
            }
        }
        stats
    }

    /// Channels, supergroups and legacy groups. Private chats do not count.
    pub fn total_group_like(&self) -> usize {
        self.channels + self.supergroups + self.groups
    }

    pub fn average_per_folder(&self) -> Option<f64> {
        (self.folders > 0).then(|| self.total_group_like() as f64 / self.folders as f64)
    }
}

impl fmt::Display for OrganizationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📈 STATISTICS:")?;
        writeln!(f, "   📢 Channels: {}", self.channels)?;
        writeln!(f, "   👥 Supergroups: {}", self.supergroups)?;
        writeln!(f, "   💬 Legacy groups: {}", self.groups)?;
        writeln!(f, "   👤 Private chats: {}", self.private_chats)?;
        writeln!(f, "   📁 Folders: {}", self.folders)?;
        writeln!(f)?;
        writeln!(f, "📋 TOTAL GROUPS/CHANNELS: {}", self.total_group_like())?;
        if let Some(avg) = self.average_per_folder() {
            writeln!(f, "📊 Average chats per folder: {avg:.1}")?;
        }
        Ok(())
    }
}

/// Classify every dialog with per-entry lookups and count folders.
///
/// A failed folder fetch counts as zero folders rather than failing the report.
pub async fn analyze<A: TelegramApi + ?Sized>(api: &A, lookup: Lookup) -> Result<OrganizationStats> {
    let dialogs   = enumerate(api, lookup).await?;
    let mut stats = OrganizationStats::tally(&dialogs);
    stats.folders = match api.dialog_filters().await {
        Ok(list) => list.folders.len(),
        Err(e) => {
            log::warn!("could not count folders: {e}");
            0
        }
    };
    Ok(stats)
}

// ─── Channel details ──────────────────────────────────────────────────────────

/// Everything `channel <id> <hash>` prints.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelReport {
    pub info: ChannelInfo,
    pub full: Option<ChannelFullInfo>,
}

impl fmt::Display for ChannelReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.info;
        writeln!(f, "=== Channel information ===")?;
        writeln!(f, "Name: {}", c.title)?;
        writeln!(f, "ID: {}", c.id)?;
        if let Some(u) = c.username.as_deref().filter(|u| !u.is_empty()) {
            writeln!(f, "Username: @{u}")?;
        }
        writeln!(f, "Broadcast: {}", c.broadcast)?;
        writeln!(f, "Megagroup: {}", c.megagroup)?;
        writeln!(f, "Verified: {}", c.verified)?;
        writeln!(f, "Restricted: {}", c.restricted)?;
        if let Some(n) = c.participants_count {
            writeln!(f, "Members: {n}")?;
        }
        if let Some(full) = &self.full {
            writeln!(f, "Description: {}", full.about)?;
            if let Some(n) = full.participants_count {
                writeln!(f, "Participants: {n}")?;
            }
        }
        Ok(())
    }
}

/// Basic and (best-effort) full information about one channel.
///
/// Returns `Ok(None)` when the server answers but the entity is not a channel.
pub async fn channel_details<A: TelegramApi + ?Sized>(api: &A, channel: PeerRef) -> Result<Option<ChannelReport>> {
    let chats = api.get_channels(&[channel]).await?;
    let Some(info) = chats.into_iter().find_map(|c| match c {
        ChatInfo::Channel(c) => Some(c),
        ChatInfo::Group(_)   => None,
    }) else {
        return Ok(None);
    };

    let full = match api.get_full_channel(channel).await {
        Ok(full) => Some(full),
        Err(e) => {
            log::debug!("full channel info unavailable for {}: {e}", info.id);
            None
        }
    };
    Ok(Some(ChannelReport { info, full }))
}
