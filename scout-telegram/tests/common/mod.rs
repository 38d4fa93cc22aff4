#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use layer_client::{InvocationError, RpcError};
use scout_telegram::dialogs::{ChannelFullInfo, ChannelInfo, ChatInfo, DialogEntry, GroupInfo};
use scout_telegram::folders::{Folder, FolderList, SuggestedFolder};
use scout_telegram::search::{SearchRequest, SearchResponse};
use scout_telegram::{Error, PeerRef, Result, TelegramApi};

/// Every RPC the mock saw, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Dialogs,
    GetChannels(Vec<PeerRef>),
    GetChats(Vec<i64>),
    FullChannel(PeerRef),
    Filters,
    Suggested,
    UpdateFilter(i32, Option<Folder>),
    Order(Vec<i32>),
    Search(SearchRequest),
}

/// In-memory Telegram account.
#[derive(Default)]
pub struct MockApi {
    pub dialogs:         Vec<DialogEntry>,
    pub channels:        HashMap<i64, ChannelInfo>,
    pub groups:          HashMap<i64, GroupInfo>,
    pub full:            HashMap<i64, ChannelFullInfo>,
    /// Channel / group IDs whose metadata lookup fails.
    pub failing:         HashSet<i64>,
    pub folders:         FolderList,
    pub fail_filters:    bool,
    pub suggested:       Vec<SuggestedFolder>,
    pub search_response: Option<SearchResponse>,
    pub calls:           Mutex<Vec<Call>>,
}

pub fn rpc_error(name: &str) -> Error {
    Error::Invocation(InvocationError::Rpc(RpcError::from_telegram(400, name)))
}

pub fn channel_peer(id: i64) -> PeerRef {
    PeerRef::Channel { id, access_hash: id * 10 }
}

pub fn user_peer(id: i64) -> PeerRef {
    PeerRef::User { id, access_hash: id * 10 }
}

pub fn channel_info(id: i64, title: &str, broadcast: bool) -> ChannelInfo {
    ChannelInfo {
        id,
        access_hash: Some(id * 10),
        title: title.to_string(),
        broadcast,
        megagroup: !broadcast,
        ..ChannelInfo::default()
    }
}

pub fn entry(peer: PeerRef, title: &str, chat: Option<ChatInfo>) -> DialogEntry {
    DialogEntry { peer, title: title.to_string(), deleted: false, chat }
}

impl MockApi {
    pub fn with_folders(folders: Vec<Folder>) -> Self {
        Self { folders: FolderList { tags_enabled: false, folders }, ..Self::default() }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl TelegramApi for MockApi {
    async fn dialogs(&self) -> Result<Vec<DialogEntry>> {
        self.record(Call::Dialogs);
        Ok(self.dialogs.clone())
    }

    async fn get_channels(&self, channels: &[PeerRef]) -> Result<Vec<ChatInfo>> {
        self.record(Call::GetChannels(channels.to_vec()));
        let mut out = Vec::new();
        for peer in channels {
            if self.failing.contains(&peer.id()) {
                return Err(rpc_error("CHANNEL_PRIVATE"));
            }
            if let Some(info) = self.channels.get(&peer.id()) {
                out.push(ChatInfo::Channel(info.clone()));
            }
        }
        Ok(out)
    }

    async fn get_chats(&self, ids: &[i64]) -> Result<Vec<ChatInfo>> {
        self.record(Call::GetChats(ids.to_vec()));
        let mut out = Vec::new();
        for id in ids {
            if self.failing.contains(id) {
                return Err(rpc_error("CHAT_ID_INVALID"));
            }
            if let Some(info) = self.groups.get(id) {
                out.push(ChatInfo::Group(info.clone()));
            }
        }
        Ok(out)
    }

    async fn get_full_channel(&self, channel: PeerRef) -> Result<ChannelFullInfo> {
        self.record(Call::FullChannel(channel));
        self.full.get(&channel.id()).cloned().ok_or_else(|| rpc_error("CHANNEL_PRIVATE"))
    }

    async fn dialog_filters(&self) -> Result<FolderList> {
        self.record(Call::Filters);
        if self.fail_filters {
            return Err(rpc_error("FILTERS_UNAVAILABLE"));
        }
        Ok(self.folders.clone())
    }

    async fn suggested_filters(&self) -> Result<Vec<SuggestedFolder>> {
        self.record(Call::Suggested);
        Ok(self.suggested.clone())
    }

    async fn update_dialog_filter(&self, id: i32, folder: Option<&Folder>) -> Result<bool> {
        self.record(Call::UpdateFilter(id, folder.cloned()));
        Ok(true)
    }

    async fn update_dialog_filters_order(&self, order: &[i32]) -> Result<bool> {
        self.record(Call::Order(order.to_vec()));
        Ok(true)
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.record(Call::Search(request.clone()));
        Ok(self.search_response.clone().unwrap_or(SearchResponse::Messages(Vec::new())))
    }
}
