//! # scout-telegram
//!
//! Telegram user-account helpers for folder-scout, built on `layer-client`.
//!
//! ## What is here
//! - [`auth`]: per-phone session storage and interactive phone + code (+ 2FA) login
//! - [`folders`]: read folders (dialog filters), resolve a folder to its
//!   channels, create / delete / reorder folders
//! - [`dialogs`]: enumerate the dialog list and classify each chat as
//!   channel, supergroup, legacy group or private chat
//! - [`search`]: time-windowed keyword search inside one chat
//!
//! Every network call goes through the [`TelegramApi`] trait, implemented
//! for [`layer_client::Client`].
//!
//! ```rust,no_run
//! # async fn f(client: layer_client::Client) -> Result<(), scout_telegram::Error> {
//! use scout_telegram::{folders, search::{self, SearchOptions}};
//!
//! let options = SearchOptions::default();
//! for channel in folders::channels_in_folder(&client, 4).await? {
//!     let report = search::search_in_peer(&client, &options, channel, "keyboard").await?;
//!     println!("{report}");
//! }
//! # Ok(()) }
//! ```

#![deny(unsafe_code)]

mod errors;
pub mod api;
pub mod auth;
pub mod dialogs;
pub mod folders;
pub mod peer;
pub mod search;

pub use api::TelegramApi;
pub use errors::{Error, Result};
pub use peer::{PeerKind, PeerRef};
