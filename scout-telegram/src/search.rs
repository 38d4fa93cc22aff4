//! Time-windowed keyword search inside one chat.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};

use crate::api::TelegramApi;
use crate::errors::Result;
use crate::peer::PeerRef;

/// Window and result cap applied to every search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Only messages newer than `now - window` are returned.
    pub window: TimeDelta,
    /// Server-side cap on returned messages.
    pub limit:  i32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            window: TimeDelta::hours(2),
            limit:  2,
        }
    }
}

impl SearchOptions {
    pub fn request(&self, peer: PeerRef, query: &str, now: DateTime<Utc>) -> SearchRequest {
        SearchRequest {
            peer,
            query:    query.to_string(),
            min_date: self.min_date(now),
            limit:    self.limit,
        }
    }

    /// `now - window` as a TL date. Windows reaching before 1970 clamp to 0.
    fn min_date(&self, now: DateTime<Utc>) -> i32 {
        now.checked_sub_signed(self.window)
            .map_or(0, |t| i32::try_from(t.timestamp().max(0)).unwrap_or(i32::MAX))
    }
}

/// Parameters of one `messages.search` call (empty message filter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub peer:     PeerRef,
    pub query:    String,
    /// Unix time; older messages are excluded.
    pub min_date: i32,
    pub limit:    i32,
}

/// A message returned by a search. Service and empty messages carry no text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundMessage {
    pub id:   i32,
    pub text: Option<String>,
    /// Unix time, `0` when unknown.
    pub date: i32,
}

impl FoundMessage {
    pub fn text(id: i32, text: impl Into<String>, date: i32) -> Self {
        Self { id, text: Some(text.into()), date }
    }
}

/// The result containers `messages.search` may answer with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResponse {
    /// Every match fits in the response.
    Messages(Vec<FoundMessage>),
    /// A page of matches plus the total count.
    Slice { messages: Vec<FoundMessage>, count: i32 },
    /// Channel-scoped page plus the total count.
    Channel { messages: Vec<FoundMessage>, count: i32 },
    /// The server had nothing new for our hash. Never expected with `hash = 0`.
    NotModified,
}

impl SearchResponse {
    pub fn messages(&self) -> &[FoundMessage] {
        match self {
            Self::Messages(m)                                   => m,
            Self::Slice { messages, .. } | Self::Channel { messages, .. } => messages,
            Self::NotModified                                   => &[],
        }
    }

    /// Total number of matches on the server, when the response says.
    pub fn total(&self) -> Option<i32> {
        match self {
            Self::Slice { count, .. } | Self::Channel { count, .. } => Some(*count),
            _ => None,
        }
    }
}

/// One finished search, ready to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReport {
    pub peer:     PeerRef,
    pub query:    String,
    pub response: SearchResponse,
}

impl SearchReport {
    /// Number of messages the report will print a count for.
    pub fn found(&self) -> usize { self.response.messages().len() }
}

impl fmt::Display for SearchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Searching for product: {} - {} ===", self.query, self.peer.id())?;
        let messages = self.response.messages();
        match &self.response {
            SearchResponse::Messages(_) => {
                writeln!(f, "✅ Found {} messages:", messages.len())?;
            }
            SearchResponse::Slice { count, .. } => {
                writeln!(f, "✅ Found {} of {count} messages:", messages.len())?;
            }
            SearchResponse::Channel { count, .. } => {
                writeln!(f, "✅ Found {} of {count} messages in channel:", messages.len())?;
            }
            SearchResponse::NotModified => {
                return writeln!(f, "❌ Unknown result type: messages.messagesNotModified");
            }
        }

        for (i, msg) in messages.iter().enumerate() {
            let Some(text) = &msg.text else { continue };
            writeln!(f, "🔍 [{}] {text}", i + 1)?;
            if msg.date > 0 {
                write!(f, "    📅 Date: {}", msg.date)?;
                if let Some(at) = DateTime::from_timestamp(i64::from(msg.date), 0) {
                    write!(f, " ({})", at.format("%Y-%m-%d %H:%M:%S UTC"))?;
                }
                writeln!(f)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Search `peer` for `query` within the configured window.
///
/// The cap is applied by the server and is not re-checked here beyond a
/// warning when it is exceeded.
pub async fn search_in_peer<A: TelegramApi + ?Sized>(
    api:     &A,
    options: &SearchOptions,
    peer:    PeerRef,
    query:   &str,
) -> Result<SearchReport> {
    let request  = options.request(peer, query, Utc::now());
    let response = api.search(&request).await?;

    let n = response.messages().len();
    if n > options.limit.max(0) as usize {
        log::warn!("server returned {n} messages for {peer}, above the limit of {}", options.limit);
    }
    log::debug!("search {query:?} in {peer}: {n} message(s)");

    Ok(SearchReport { peer, query: query.to_string(), response })
}
