//! The raw Telegram surface this crate consumes.
//!
//! [`TelegramApi`] is the single seam between the folder/dialog/search logic
//! and the network. [`layer_client::Client`] implements it by issuing the TL
//! functions directly and converting the answers into this crate's plain
//! records; tests implement it in memory.

use async_trait::async_trait;
use layer_client::{Client, InvocationError};
use layer_tl_types as tl;

use crate::dialogs::{ChannelFullInfo, ChannelInfo, ChatInfo, DialogEntry, GroupInfo};
use crate::errors::{Error, Result};
use crate::folders::{Folder, FolderFlags, FolderKind, FolderList, SuggestedFolder};
use crate::peer::PeerRef;
use crate::search::{FoundMessage, SearchRequest, SearchResponse};

// ─── Trait ────────────────────────────────────────────────────────────────────

/// Telegram RPCs used by folder-scout.
#[async_trait]
pub trait TelegramApi: Send + Sync {
    /// The whole dialog list, every page.
    async fn dialogs(&self) -> Result<Vec<DialogEntry>>;

    /// `channels.getChannels`.
    async fn get_channels(&self, channels: &[PeerRef]) -> Result<Vec<ChatInfo>>;

    /// `messages.getChats` for legacy groups.
    async fn get_chats(&self, ids: &[i64]) -> Result<Vec<ChatInfo>>;

    /// `channels.getFullChannel`.
    async fn get_full_channel(&self, channel: PeerRef) -> Result<ChannelFullInfo>;

    /// `messages.getDialogFilters`.
    async fn dialog_filters(&self) -> Result<FolderList>;

    /// `messages.getSuggestedDialogFilters`.
    async fn suggested_filters(&self) -> Result<Vec<SuggestedFolder>>;

    /// `messages.updateDialogFilter`. `None` deletes the folder.
    async fn update_dialog_filter(&self, id: i32, folder: Option<&Folder>) -> Result<bool>;

    /// `messages.updateDialogFiltersOrder`.
    async fn update_dialog_filters_order(&self, order: &[i32]) -> Result<bool>;

    /// `messages.search` with an empty message filter.
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse>;
}

// ─── layer-client implementation ──────────────────────────────────────────────

#[async_trait]
impl TelegramApi for Client {
    async fn dialogs(&self) -> Result<Vec<DialogEntry>> {
        let mut iter = self.iter_dialogs();
        let mut out  = Vec::new();
        while let Some(dialog) = iter.next(self).await? {
            if let Some(entry) = dialog_entry(&dialog) {
                out.push(entry);
            }
        }
        log::debug!("fetched {} dialogs", out.len());
        Ok(out)
    }

    async fn get_channels(&self, channels: &[PeerRef]) -> Result<Vec<ChatInfo>> {
        let id: Vec<tl::enums::InputChannel> = channels.iter()
            .filter_map(PeerRef::to_input_channel)
            .collect();
        if id.is_empty() {
            return Ok(Vec::new());
        }
        let chats = chats_of(self.invoke(&tl::functions::channels::GetChannels { id }).await?);
        Ok(chats.iter().filter_map(chat_info).collect())
    }

    async fn get_chats(&self, ids: &[i64]) -> Result<Vec<ChatInfo>> {
        let req   = tl::functions::messages::GetChats { id: ids.to_vec() };
        let chats = chats_of(self.invoke(&req).await?);
        Ok(chats.iter().filter_map(chat_info).collect())
    }

    async fn get_full_channel(&self, channel: PeerRef) -> Result<ChannelFullInfo> {
        let input = channel.to_input_channel().ok_or_else(|| {
            Error::Invocation(InvocationError::Deserialize(format!(
                "get_full_channel: {channel} is not a channel"
            )))
        })?;
        let tl::enums::messages::ChatFull::ChatFull(full) = self
            .invoke(&tl::functions::channels::GetFullChannel { channel: input })
            .await?;
        Ok(match full.full_chat {
            tl::enums::ChatFull::ChannelFull(c) => ChannelFullInfo {
                about:              c.about,
                participants_count: c.participants_count,
            },
            tl::enums::ChatFull::ChatFull(c) => ChannelFullInfo {
                about:              c.about,
                participants_count: None,
            },
        })
    }

    async fn dialog_filters(&self) -> Result<FolderList> {
        let tl::enums::messages::DialogFilters::DialogFilters(list) = self
            .invoke(&tl::functions::messages::GetDialogFilters {})
            .await?;
        Ok(FolderList {
            tags_enabled: list.tags_enabled,
            folders:      list.filters.iter().map(folder_from_tl).collect(),
        })
    }

    async fn suggested_filters(&self) -> Result<Vec<SuggestedFolder>> {
        let suggested = self
            .invoke(&tl::functions::messages::GetSuggestedDialogFilters {})
            .await?;
        Ok(suggested.into_iter().map(|s| {
            let tl::enums::DialogFilterSuggested::DialogFilterSuggested(s) = s;
            SuggestedFolder {
                folder:      folder_from_tl(&s.filter),
                description: s.description,
            }
        }).collect())
    }

    async fn update_dialog_filter(&self, id: i32, folder: Option<&Folder>) -> Result<bool> {
        let req = tl::functions::messages::UpdateDialogFilter {
            id,
            filter: folder.map(folder_to_tl),
        };
        Ok(self.invoke(&req).await?)
    }

    async fn update_dialog_filters_order(&self, order: &[i32]) -> Result<bool> {
        let req = tl::functions::messages::UpdateDialogFiltersOrder { order: order.to_vec() };
        Ok(self.invoke(&req).await?)
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let req = tl::functions::messages::Search {
            peer:           request.peer.to_input(),
            q:              request.query.clone(),
            from_id:        None,
            saved_peer_id:  None,
            saved_reaction: None,
            top_msg_id:     None,
            filter:         tl::enums::MessagesFilter::InputMessagesFilterEmpty,
            min_date:       request.min_date,
            max_date:       0,
            offset_id:      0,
            add_offset:     0,
            limit:          request.limit,
            max_id:         0,
            min_id:         0,
            hash:           0,
        };
        Ok(match self.invoke(&req).await? {
            tl::enums::messages::Messages::Messages(m) => SearchResponse::Messages(found_messages(m.messages)),
            tl::enums::messages::Messages::Slice(m) => SearchResponse::Slice {
                messages: found_messages(m.messages),
                count:    m.count,
            },
            tl::enums::messages::Messages::ChannelMessages(m) => SearchResponse::Channel {
                messages: found_messages(m.messages),
                count:    m.count,
            },
            tl::enums::messages::Messages::NotModified(_) => SearchResponse::NotModified,
        })
    }
}

// ─── TL → records ─────────────────────────────────────────────────────────────

fn dialog_entry(dialog: &layer_client::Dialog) -> Option<DialogEntry> {
    let peer = dialog.peer()?;
    Some(entry_from_tl(peer, dialog.chat.as_ref(), dialog.entity.as_ref(), dialog.title()))
}

/// One dialog-list row from its peer and whatever entity came with it.
fn entry_from_tl(
    peer:  &tl::enums::Peer,
    chat:  Option<&tl::enums::Chat>,
    user:  Option<&tl::enums::User>,
    title: String,
) -> DialogEntry {
    let peer = match peer {
        tl::enums::Peer::User(u) => {
            let access_hash = match user {
                Some(tl::enums::User::User(user)) => user.access_hash.unwrap_or(0),
                _ => 0,
            };
            PeerRef::User { id: u.user_id, access_hash }
        }
        tl::enums::Peer::Chat(c) => PeerRef::Chat { id: c.chat_id },
        tl::enums::Peer::Channel(c) => {
            let access_hash = match chat {
                Some(tl::enums::Chat::Channel(ch))          => ch.access_hash.unwrap_or(0),
                Some(tl::enums::Chat::ChannelForbidden(ch)) => ch.access_hash,
                _ => 0,
            };
            PeerRef::Channel { id: c.channel_id, access_hash }
        }
    };

    DialogEntry {
        peer,
        title,
        deleted: is_deleted(chat, user),
        chat:    chat.and_then(chat_info),
    }
}

/// Deleted accounts and chats we can no longer see.
fn is_deleted(chat: Option<&tl::enums::Chat>, user: Option<&tl::enums::User>) -> bool {
    match (chat, user) {
        (Some(tl::enums::Chat::Empty(_) | tl::enums::Chat::Forbidden(_) | tl::enums::Chat::ChannelForbidden(_)), _) => true,
        (_, Some(tl::enums::User::User(u))) => u.deleted,
        (_, Some(tl::enums::User::Empty(_))) => true,
        _ => false,
    }
}

fn chats_of(chats: tl::enums::messages::Chats) -> Vec<tl::enums::Chat> {
    match chats {
        tl::enums::messages::Chats::Chats(c) => c.chats,
        tl::enums::messages::Chats::Slice(c) => c.chats,
    }
}

fn chat_info(chat: &tl::enums::Chat) -> Option<ChatInfo> {
    match chat {
        tl::enums::Chat::Channel(c) => Some(ChatInfo::Channel(ChannelInfo {
            id:                 c.id,
            access_hash:        c.access_hash,
            title:              c.title.clone(),
            username:           c.username.clone(),
            broadcast:          c.broadcast,
            megagroup:          c.megagroup,
            verified:           c.verified,
            restricted:         c.restricted,
            participants_count: c.participants_count,
        })),
        tl::enums::Chat::Chat(c) => Some(ChatInfo::Group(GroupInfo {
            id:                 c.id,
            title:              c.title.clone(),
            participants_count: c.participants_count,
        })),
        _ => None,
    }
}

fn found_messages(messages: Vec<tl::enums::Message>) -> Vec<FoundMessage> {
    messages.into_iter().map(|m| match m {
        tl::enums::Message::Message(x) => FoundMessage { id: x.id, text: Some(x.message), date: x.date },
        tl::enums::Message::Service(x) => FoundMessage { id: x.id, text: None, date: x.date },
        tl::enums::Message::Empty(x)   => FoundMessage { id: x.id, text: None, date: 0 },
    }).collect()
}

fn peers_from_tl(peers: &[tl::enums::InputPeer]) -> Vec<PeerRef> {
    peers.iter().filter_map(PeerRef::from_input).collect()
}

fn peers_to_tl(peers: &[PeerRef]) -> Vec<tl::enums::InputPeer> {
    peers.iter().map(PeerRef::to_input).collect()
}

fn text_of(title: &tl::enums::TextWithEntities) -> String {
    let tl::enums::TextWithEntities::TextWithEntities(t) = title;
    t.text.clone()
}

fn plain_text(text: &str) -> tl::enums::TextWithEntities {
    tl::enums::TextWithEntities::TextWithEntities(tl::types::TextWithEntities {
        text:     text.to_string(),
        entities: Vec::new(),
    })
}

fn folder_from_tl(filter: &tl::enums::DialogFilter) -> Folder {
    match filter {
        tl::enums::DialogFilter::DialogFilter(d) => Folder {
            id:             d.id,
            kind:           FolderKind::Regular,
            title:          text_of(&d.title),
            emoji:          d.emoticon.clone().filter(|e| !e.is_empty()),
            color:          d.color,
            flags:          FolderFlags {
                contacts:         d.contacts,
                non_contacts:     d.non_contacts,
                groups:           d.groups,
                broadcasts:       d.broadcasts,
                bots:             d.bots,
                exclude_muted:    d.exclude_muted,
                exclude_read:     d.exclude_read,
                exclude_archived: d.exclude_archived,
            },
            has_my_invites: false,
            include_peers:  peers_from_tl(&d.include_peers),
            exclude_peers:  peers_from_tl(&d.exclude_peers),
            pinned_peers:   peers_from_tl(&d.pinned_peers),
        },
        tl::enums::DialogFilter::Chatlist(c) => Folder {
            id:             c.id,
            kind:           FolderKind::Chatlist,
            title:          text_of(&c.title),
            emoji:          c.emoticon.clone().filter(|e| !e.is_empty()),
            color:          c.color,
            flags:          FolderFlags::default(),
            has_my_invites: c.has_my_invites,
            include_peers:  peers_from_tl(&c.include_peers),
            exclude_peers:  Vec::new(),
            pinned_peers:   peers_from_tl(&c.pinned_peers),
        },
        tl::enums::DialogFilter::Default => Folder::default_entry(),
    }
}

fn folder_to_tl(folder: &Folder) -> tl::enums::DialogFilter {
    match folder.kind {
        FolderKind::Regular => tl::enums::DialogFilter::DialogFilter(tl::types::DialogFilter {
            contacts:         folder.flags.contacts,
            non_contacts:     folder.flags.non_contacts,
            groups:           folder.flags.groups,
            broadcasts:       folder.flags.broadcasts,
            bots:             folder.flags.bots,
            exclude_muted:    folder.flags.exclude_muted,
            exclude_read:     folder.flags.exclude_read,
            exclude_archived: folder.flags.exclude_archived,
            title_noanimate:  false,
            id:               folder.id,
            title:            plain_text(&folder.title),
            emoticon:         folder.emoji.clone(),
            color:            folder.color,
            pinned_peers:     peers_to_tl(&folder.pinned_peers),
            include_peers:    peers_to_tl(&folder.include_peers),
            exclude_peers:    peers_to_tl(&folder.exclude_peers),
        }),
        FolderKind::Chatlist => tl::enums::DialogFilter::Chatlist(tl::types::DialogFilterChatlist {
            has_my_invites:  folder.has_my_invites,
            title_noanimate: false,
            id:              folder.id,
            title:           plain_text(&folder.title),
            emoticon:        folder.emoji.clone(),
            color:           folder.color,
            pinned_peers:    peers_to_tl(&folder.pinned_peers),
            include_peers:   peers_to_tl(&folder.include_peers),
        }),
        FolderKind::Default => tl::enums::DialogFilter::Default,
    }
}
