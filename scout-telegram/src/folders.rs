//! Folders (dialog filters): reading, resolving to peers, and the few
//! mutations Telegram allows on them.
//!
//! Telegram stores folders server-side. Nothing here is cached: every
//! operation fetches the current list with `messages.getDialogFilters`.

use std::fmt;

use serde::Serialize;

use crate::api::TelegramApi;
use crate::errors::{Error, Result};
use crate::peer::PeerRef;

// ─── Model ────────────────────────────────────────────────────────────────────

/// Which `DialogFilter` constructor a folder came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderKind {
    /// Ordinary user-defined folder.
    Regular,
    /// Shared folder joined through a chat-list invite link.
    Chatlist,
    /// The built-in "All chats" entry. Has no ID.
    Default,
}

/// Which chat categories a regular folder pulls in on top of its explicit peers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FolderFlags {
    pub contacts:         bool,
    pub non_contacts:     bool,
    pub groups:           bool,
    pub broadcasts:       bool,
    pub bots:             bool,
    pub exclude_muted:    bool,
    pub exclude_read:     bool,
    pub exclude_archived: bool,
}

/// A user folder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Folder {
    pub id:             i32,
    pub kind:           FolderKind,
    pub title:          String,
    pub emoji:          Option<String>,
    pub color:          Option<i32>,
    pub flags:          FolderFlags,
    /// Only meaningful for [`FolderKind::Chatlist`].
    pub has_my_invites: bool,
    pub include_peers:  Vec<PeerRef>,
    pub exclude_peers:  Vec<PeerRef>,
    pub pinned_peers:   Vec<PeerRef>,
}

impl Folder {
    /// A new, empty regular folder that shows contacts, non-contacts, groups
    /// and broadcasts but not bots.
    pub fn new(id: i32, title: impl Into<String>) -> Self {
        Self {
            id,
            kind:           FolderKind::Regular,
            title:          title.into(),
            emoji:          None,
            color:          None,
            flags:          FolderFlags {
                contacts:     true,
                non_contacts: true,
                groups:       true,
                broadcasts:   true,
                ..FolderFlags::default()
            },
            has_my_invites: false,
            include_peers:  Vec::new(),
            exclude_peers:  Vec::new(),
            pinned_peers:   Vec::new(),
        }
    }

    /// The "All chats" placeholder.
    pub fn default_entry() -> Self {
        Self {
            kind:  FolderKind::Default,
            flags: FolderFlags::default(),
            ..Self::new(0, "All chats")
        }
    }

    pub fn with_emoji(mut self, emoji: Option<String>) -> Self {
        self.emoji = emoji.filter(|e| !e.is_empty());
        self
    }

    /// Only regular and shared folders can be addressed by ID.
    pub fn has_id(&self) -> bool { self.kind != FolderKind::Default }

    /// One-line listing entry, 1-based `index`.
    pub fn summary_line(&self, index: usize) -> String {
        match self.kind {
            FolderKind::Regular  => format!("{index}. 📁 {}", self.title),
            FolderKind::Chatlist => format!("{index}. 🔗 {} (shared)", self.title),
            FolderKind::Default  => format!("{index}. ⭐ All chats (default)"),
        }
    }
}

/// Detailed view used by `folders show`.
impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FolderKind::Regular  => writeln!(f, "📁 Name: {}", self.title)?,
            FolderKind::Chatlist => writeln!(f, "🔗 Name: {} (shared)", self.title)?,
            FolderKind::Default  => return writeln!(f, "⭐ All chats (default)"),
        }
        if let Some(emoji) = &self.emoji {
            writeln!(f, "😀 Emoji: {emoji}")?;
        }
        if let Some(color) = self.color {
            writeln!(f, "🎨 Colour: {}", color_name(color))?;
        }
        writeln!(f, "📊 Statistics:")?;
        writeln!(f, "   - Included chats: {}", self.include_peers.len())?;
        if self.kind == FolderKind::Regular {
            writeln!(f, "   - Excluded chats: {}", self.exclude_peers.len())?;
        }
        writeln!(f, "   - Pinned chats: {}", self.pinned_peers.len())?;
        if self.kind == FolderKind::Chatlist {
            writeln!(f, "   - Has own invites: {}", self.has_my_invites)?;
        }
        Ok(())
    }
}

/// Result of `messages.getDialogFilters`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FolderList {
    /// Folder tags are shown on chats (Premium).
    pub tags_enabled: bool,
    pub folders:      Vec<Folder>,
}

/// A folder Telegram proposes to create.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestedFolder {
    pub folder:      Folder,
    pub description: String,
}

/// The explicitly included peers of one folder, split by kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderPeers {
    pub channels: Vec<PeerRef>,
    /// Legacy groups. Only searched when the caller opts in.
    pub groups:   Vec<PeerRef>,
}

/// Human name for a folder colour index. `-1` means the colour is hidden.
pub fn color_name(color: i32) -> String {
    match color {
        -1 => "hidden".into(),
        0  => "red".into(),
        1  => "orange".into(),
        2  => "violet".into(),
        3  => "green".into(),
        4  => "cyan".into(),
        5  => "blue".into(),
        6  => "pink".into(),
        n  => format!("colour {n}"),
    }
}

// ─── Pure helpers ─────────────────────────────────────────────────────────────

/// Find the folder with `id`, ignoring the ID-less default entry.
pub fn find_folder(folders: &[Folder], id: i32) -> Result<&Folder> {
    folders.iter()
        .find(|f| f.has_id() && f.id == id)
        .ok_or(Error::FolderNotFound(id))
}

/// Split a folder's included peers into channels and legacy groups, keeping
/// their relative order. Users and the self peer are dropped.
pub fn resolve_folder_peers(folders: &[Folder], id: i32) -> Result<FolderPeers> {
    let folder = find_folder(folders, id)?;
    if folder.include_peers.is_empty() {
        return Err(Error::FolderEmpty(id));
    }

    let mut peers = FolderPeers::default();
    for peer in &folder.include_peers {
        match peer {
            PeerRef::Channel { .. } => peers.channels.push(*peer),
            PeerRef::Chat { .. }    => peers.groups.push(*peer),
            PeerRef::User { .. } | PeerRef::SelfUser => {}
        }
    }
    Ok(peers)
}

/// The lowest unused folder ID: one past the largest existing ID.
pub fn next_folder_id(folders: &[Folder]) -> i32 {
    folders.iter()
        .filter(|f| f.has_id())
        .map(|f| f.id)
        .max()
        .unwrap_or(0)
        + 1
}

/// Multi-line dump of every folder's configuration.
pub fn render_backup(folders: &[Folder]) -> String {
    let mut out = format!("📦 Backing up {} folders...\n", folders.len());
    for (i, f) in folders.iter().enumerate() {
        let n = i + 1;
        match f.kind {
            FolderKind::Regular => {
                out.push_str(&format!("✅ [{n}] Folder: {} (ID: {})\n", f.title, f.id));
                out.push_str(&format!("    - Emoji: {}\n", f.emoji.as_deref().unwrap_or("")));
                out.push_str(&format!("    - Contacts: {}\n", f.flags.contacts));
                out.push_str(&format!("    - Groups: {}\n", f.flags.groups));
                out.push_str(&format!("    - Channels: {}\n", f.flags.broadcasts));
                out.push_str(&format!("    - Included chats: {}\n", f.include_peers.len()));
                out.push_str(&format!("    - Excluded chats: {}\n", f.exclude_peers.len()));
            }
            FolderKind::Chatlist => {
                out.push_str(&format!("✅ [{n}] Shared folder: {} (ID: {})\n", f.title, f.id));
                if let Some(color) = f.color {
                    out.push_str(&format!("    - Colour: {}\n", color_name(color)));
                }
                out.push_str(&format!("    - Included chats: {}\n", f.include_peers.len()));
            }
            FolderKind::Default => {}
        }
    }
    out
}

// ─── API-backed operations ────────────────────────────────────────────────────

/// Fetch every folder, including the default entry if the server sends one.
pub async fn list_folders<A: TelegramApi + ?Sized>(api: &A) -> Result<FolderList> {
    api.dialog_filters().await
}

/// Included channels and legacy groups of folder `id`.
pub async fn folder_peers<A: TelegramApi + ?Sized>(api: &A, id: i32) -> Result<FolderPeers> {
    let list  = api.dialog_filters().await?;
    let peers = resolve_folder_peers(&list.folders, id)?;
    log::debug!(
        "folder {id}: {} channel(s), {} legacy group(s)",
        peers.channels.len(), peers.groups.len()
    );
    Ok(peers)
}

/// Channel-type peers explicitly included in folder `id`.
pub async fn channels_in_folder<A: TelegramApi + ?Sized>(api: &A, id: i32) -> Result<Vec<PeerRef>> {
    Ok(folder_peers(api, id).await?.channels)
}

/// A single folder by ID.
pub async fn folder_details<A: TelegramApi + ?Sized>(api: &A, id: i32) -> Result<Folder> {
    let list = api.dialog_filters().await?;
    find_folder(&list.folders, id).cloned()
}

pub async fn suggested_folders<A: TelegramApi + ?Sized>(api: &A) -> Result<Vec<SuggestedFolder>> {
    api.suggested_filters().await
}

/// Create an empty folder under the next free ID.
///
/// Returns the folder as sent and whether the server accepted it.
pub async fn create_folder<A: TelegramApi + ?Sized>(
    api:   &A,
    title: &str,
    emoji: Option<String>,
) -> Result<(Folder, bool)> {
    let list   = api.dialog_filters().await?;
    let folder = Folder::new(next_folder_id(&list.folders), title).with_emoji(emoji);
    let ok     = api.update_dialog_filter(folder.id, Some(&folder)).await?;
    if ok {
        log::info!("created folder {:?} with ID {}", folder.title, folder.id);
    }
    Ok((folder, ok))
}

/// Delete folder `id`. Telegram treats an update without a body as deletion.
pub async fn delete_folder<A: TelegramApi + ?Sized>(api: &A, id: i32) -> Result<bool> {
    let ok = api.update_dialog_filter(id, None).await?;
    if ok {
        log::info!("deleted folder {id}");
    }
    Ok(ok)
}

pub async fn reorder_folders<A: TelegramApi + ?Sized>(api: &A, order: &[i32]) -> Result<bool> {
    api.update_dialog_filters_order(order).await
}
