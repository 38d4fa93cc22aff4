//! Handlers for the subcommands other than `run`.

use std::error::Error;
use std::path::Path;

use scout_backend::ProductSource;
use scout_telegram::dialogs::{self, Lookup};
use scout_telegram::{PeerRef, TelegramApi, folders};
use tokio_util::sync::CancellationToken;

use crate::cli::{FoldersCommand, KindFilter};
use crate::config::Config;
use crate::flow;

type CmdResult = Result<(), Box<dyn Error>>;

// ─── Search ───────────────────────────────────────────────────────────────────

pub async fn search(api: &dyn TelegramApi, config: &Config, folder: Option<i32>, query: &str) -> CmdResult {
    let folder_id = folder.unwrap_or(config.folder_id);
    let targets   = flow::resolve_targets(api, folder_id, config.include_groups)
        .await
        .inspect_err(|e| {
            if e.is_not_found() {
                println!("💡 `folder-scout folders list` shows every folder and its chats");
            }
        })?;
    println!("🔎 Searching {} chat(s) of folder {folder_id} for \"{query}\"\n", targets.len());

    let reports = flow::search_targets(api, &config.search, &targets, query, &CancellationToken::new()).await?;
    let found: usize = reports.iter().map(|r| r.found()).sum();
    println!("✅ Done: {found} message(s) in {} chat(s)", reports.len());
    Ok(())
}

// ─── Dialogs ──────────────────────────────────────────────────────────────────

pub async fn dialogs(api: &dyn TelegramApi, kind: KindFilter, details: bool) -> CmdResult {
    let lookup = if details { Lookup::Remote } else { Lookup::Listing };
    let list   = dialogs::enumerate_kinds(api, lookup, kind.kinds()).await?;

    println!("📋 {} dialog(s):\n", list.len());
    for d in &list {
        println!("{d}");
    }
    Ok(())
}

pub async fn analyze(api: &dyn TelegramApi) -> CmdResult {
    println!("🔍 Analysing your chats...\n");
    let stats = dialogs::analyze(api, Lookup::Remote).await?;
    print!("{stats}");
    Ok(())
}

pub async fn find(api: &dyn TelegramApi, name: &str) -> CmdResult {
    let found = dialogs::find_by_name(api, name, Lookup::Listing).await?;
    if found.is_empty() {
        println!("❌ No channel or group matches \"{name}\"");
        return Ok(());
    }
    println!("🔍 {} match(es) for \"{name}\":\n", found.len());
    for d in &found {
        println!("{d}");
    }
    Ok(())
}

pub async fn channel(api: &dyn TelegramApi, id: i64, access_hash: i64) -> CmdResult {
    match dialogs::channel_details(api, PeerRef::Channel { id, access_hash }).await? {
        Some(report) => print!("{report}"),
        None         => println!("❌ {id} is not a channel"),
    }
    Ok(())
}

// ─── Folders ──────────────────────────────────────────────────────────────────

pub async fn folders(api: &dyn TelegramApi, cmd: FoldersCommand) -> CmdResult {
    match cmd {
        FoldersCommand::List => {
            let list = folders::list_folders(api).await?;
            println!("📁 {} folder(s):", list.folders.len());
            for (i, f) in list.folders.iter().enumerate() {
                println!("{}", f.summary_line(i + 1));
            }
            if list.tags_enabled {
                println!("\n🏷 Folder tags are enabled");
            }
        }
        FoldersCommand::Show { id } => {
            print!("{}", folders::folder_details(api, id).await?);
        }
        FoldersCommand::Suggested => {
            let suggested = folders::suggested_folders(api).await?;
            if suggested.is_empty() {
                println!("💡 No suggested folders");
            }
            for s in &suggested {
                println!("💡 {}: {}", s.folder.title, s.description);
            }
        }
        FoldersCommand::Backup { output } => {
            let list = folders::list_folders(api).await?;
            print!("{}", folders::render_backup(&list.folders));
            if let Some(path) = output {
                write_backup(&path, &list)?;
                println!("💾 Saved to {}", path.display());
            }
        }
        FoldersCommand::Create { title, emoji } => {
            let (folder, ok) = folders::create_folder(api, &title, emoji).await?;
            if ok {
                println!("✅ Created folder \"{}\" (ID: {})", folder.title, folder.id);
            } else {
                println!("❌ Telegram did not create the folder");
            }
        }
        FoldersCommand::Delete { id } => {
            if folders::delete_folder(api, id).await? {
                println!("✅ Deleted folder {id}");
            } else {
                println!("❌ Telegram did not delete folder {id}");
            }
        }
        FoldersCommand::Reorder { ids } => {
            if folders::reorder_folders(api, &ids).await? {
                println!("✅ New folder order: {ids:?}");
            } else {
                println!("❌ Telegram did not change the order");
            }
        }
    }
    Ok(())
}

fn write_backup(path: &Path, list: &folders::FolderList) -> CmdResult {
    let json = serde_json::to_string_pretty(list)?;
    std::fs::write(path, json)?;
    Ok(())
}

// ─── Backend ──────────────────────────────────────────────────────────────────

pub async fn products(source: &dyn ProductSource) -> CmdResult {
    let products = source.products().await?;
    println!("🛒 {} product(s):", products.len());
    for (i, p) in products.iter().enumerate() {
        println!("[{i}] {p}");
    }
    Ok(())
}

pub async fn sessions(source: &dyn ProductSource) -> CmdResult {
    let sessions = source.sessions().await?;
    println!("🗓 {} session(s):", sessions.len());
    for s in &sessions {
        println!("{s}");
    }
    Ok(())
}
