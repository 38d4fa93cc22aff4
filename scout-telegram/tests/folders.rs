mod common;

use common::{Call, MockApi, channel_peer, user_peer};
use scout_telegram::folders::{self, Folder, FolderKind, color_name, next_folder_id, render_backup, resolve_folder_peers};
use scout_telegram::{Error, PeerRef};

fn folder(id: i32, title: &str, peers: Vec<PeerRef>) -> Folder {
    Folder { include_peers: peers, ..Folder::new(id, title) }
}

#[test]
fn resolver_keeps_only_channels_in_order() {
    let folders = vec![
        folder(2, "Other", vec![channel_peer(99)]),
        folder(4, "Deals", vec![
            channel_peer(3),
            user_peer(7),
            PeerRef::Chat { id: 8 },
            channel_peer(1),
            PeerRef::SelfUser,
            channel_peer(2),
        ]),
    ];
    let peers = resolve_folder_peers(&folders, 4).unwrap();
    assert_eq!(peers.channels, vec![channel_peer(3), channel_peer(1), channel_peer(2)]);
    assert_eq!(peers.groups, vec![PeerRef::Chat { id: 8 }]);
}

#[test]
fn resolver_reports_missing_folder() {
    let folders = vec![folder(1, "A", vec![channel_peer(1)])];
    let err = resolve_folder_peers(&folders, 4).unwrap_err();
    assert!(matches!(err, Error::FolderNotFound(4)));
    assert!(err.is_not_found());
}

#[test]
fn resolver_reports_empty_folder() {
    let folders = vec![folder(4, "Empty", vec![])];
    assert!(matches!(resolve_folder_peers(&folders, 4), Err(Error::FolderEmpty(4))));
}

#[test]
fn default_entry_is_never_matched_by_id() {
    let folders = vec![Folder::default_entry()];
    assert!(matches!(resolve_folder_peers(&folders, 0), Err(Error::FolderNotFound(0))));
}

#[test]
fn shared_folders_resolve_too() {
    let mut shared = folder(5, "Shared", vec![channel_peer(11)]);
    shared.kind = FolderKind::Chatlist;
    let peers = resolve_folder_peers(&[shared], 5).unwrap();
    assert_eq!(peers.channels, vec![channel_peer(11)]);
}

#[test]
fn next_id_is_one_past_max() {
    assert_eq!(next_folder_id(&[]), 1);
    assert_eq!(next_folder_id(&[Folder::default_entry()]), 1);
    let folders = vec![folder(2, "a", vec![]), folder(7, "b", vec![]), folder(3, "c", vec![])];
    assert_eq!(next_folder_id(&folders), 8);
}

#[test]
fn colour_names() {
    assert_eq!(color_name(-1), "hidden");
    assert_eq!(color_name(3), "green");
    assert_eq!(color_name(42), "colour 42");
}

#[test]
fn summary_lines_by_kind() {
    let mut shared = folder(5, "Shared", vec![]);
    shared.kind = FolderKind::Chatlist;
    assert_eq!(folder(1, "Work", vec![]).summary_line(1), "1. 📁 Work");
    assert_eq!(shared.summary_line(2), "2. 🔗 Shared (shared)");
    assert_eq!(Folder::default_entry().summary_line(3), "3. ⭐ All chats (default)");
}

#[test]
fn details_show_counts() {
    let mut f = folder(4, "Deals", vec![channel_peer(1), channel_peer(2)])
        .with_emoji(Some("💸".into()));
    f.pinned_peers = vec![channel_peer(1)];
    let text = f.to_string();
    assert!(text.contains("📁 Name: Deals"));
    assert!(text.contains("😀 Emoji: 💸"));
    assert!(text.contains("Included chats: 2"));
    assert!(text.contains("Excluded chats: 0"));
    assert!(text.contains("Pinned chats: 1"));
}

#[test]
fn backup_lists_every_folder() {
    let out = render_backup(&[folder(1, "Work", vec![]), folder(2, "News", vec![channel_peer(1)])]);
    assert!(out.starts_with("📦 Backing up 2 folders"));
    assert!(out.contains("✅ [1] Folder: Work (ID: 1)"));
    assert!(out.contains("✅ [2] Folder: News (ID: 2)"));
}

#[tokio::test]
async fn channels_in_folder_fetches_filters_once() {
    let api = MockApi::with_folders(vec![folder(4, "Deals", vec![channel_peer(1), user_peer(2)])]);
    let channels = folders::channels_in_folder(&api, 4).await.unwrap();
    assert_eq!(channels, vec![channel_peer(1)]);
    assert_eq!(api.calls(), vec![Call::Filters]);
}

#[tokio::test]
async fn create_uses_next_id_and_default_flags() {
    let api = MockApi::with_folders(vec![folder(3, "Old", vec![])]);
    let (created, ok) = folders::create_folder(&api, "New", Some("🆕".into())).await.unwrap();
    assert!(ok);
    assert_eq!(created.id, 4);
    assert!(created.flags.contacts && created.flags.non_contacts);
    assert!(created.flags.groups && created.flags.broadcasts);
    assert!(!created.flags.bots);
    assert!(created.include_peers.is_empty());

    let calls = api.calls();
    assert_eq!(calls.last(), Some(&Call::UpdateFilter(4, Some(created))));
}

#[tokio::test]
async fn delete_sends_update_without_body() {
    let api = MockApi::default();
    assert!(folders::delete_folder(&api, 9).await.unwrap());
    assert_eq!(api.calls(), vec![Call::UpdateFilter(9, None)]);
}

#[tokio::test]
async fn reorder_passes_order_through() {
    let api = MockApi::default();
    assert!(folders::reorder_folders(&api, &[3, 1, 2]).await.unwrap());
    assert_eq!(api.calls(), vec![Call::Order(vec![3, 1, 2])]);
}

#[tokio::test]
async fn details_of_missing_folder_fail() {
    let api = MockApi::with_folders(vec![folder(1, "A", vec![])]);
    assert!(matches!(folders::folder_details(&api, 2).await, Err(Error::FolderNotFound(2))));
}

#[test]
fn folder_serializes_for_backup() {
    let f = folder(4, "Deals", vec![channel_peer(1)]);
    let json = serde_json::to_value(&f).unwrap();
    assert_eq!(json["id"], 4);
    assert_eq!(json["kind"], "regular");
    assert_eq!(json["include_peers"][0]["type"], "channel");
    assert_eq!(json["include_peers"][0]["access_hash"], 10);
}
