//! The `run` command: resolve a folder, wait for the product list, search
//! every channel of the folder for the selected product.
//!
//! The search task is spawned before products are fetched and blocks on a
//! one-shot handoff. The main flow then waits for it with a timeout and
//! cancels it on timeout or shutdown.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use scout_backend::{BackendError, Product, ProductSource};
use scout_telegram::search::{self, SearchOptions, SearchReport};
use scout_telegram::{PeerRef, TelegramApi, folders};
use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

// ─── Error ────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum FlowError {
    /// Fewer products than the configured index requires.
    ProductMissing { index: usize, available: usize },
    /// The product sender was dropped without sending.
    HandoffClosed,
    /// Cancelled by shutdown before finishing.
    Cancelled,
    /// The search did not finish within the configured time.
    TimedOut(Duration),
    Telegram(scout_telegram::Error),
    Backend(BackendError),
    /// The search task panicked.
    Task(JoinError),
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProductMissing { index, available } => {
                write!(f, "no product at index {index} ({available} available)")
            }
            Self::HandoffClosed => write!(f, "product list was never delivered to the search task"),
            Self::Cancelled     => write!(f, "search cancelled"),
            Self::TimedOut(d)   => write!(f, "search did not finish within {}s", d.as_secs()),
            Self::Telegram(e)   => write!(f, "{e}"),
            Self::Backend(e)    => write!(f, "{e}"),
            Self::Task(e)       => write!(f, "search task failed: {e}"),
        }
    }
}

impl std::error::Error for FlowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Telegram(e) => Some(e),
            Self::Backend(e)  => Some(e),
            Self::Task(e)     => Some(e),
            _                 => None,
        }
    }
}

impl From<scout_telegram::Error> for FlowError {
    fn from(e: scout_telegram::Error) -> Self { Self::Telegram(e) }
}

impl From<BackendError> for FlowError {
    fn from(e: BackendError) -> Self { Self::Backend(e) }
}

impl From<JoinError> for FlowError {
    fn from(e: JoinError) -> Self { Self::Task(e) }
}

// ─── Pieces ───────────────────────────────────────────────────────────────────

/// Checked lookup of the product to search for.
pub fn select_product(products: &[Product], index: usize) -> Result<&Product, FlowError> {
    products.get(index).ok_or(FlowError::ProductMissing { index, available: products.len() })
}

/// Channels of the folder, followed by its legacy groups when `include_groups` is set.
pub async fn resolve_targets<A: TelegramApi + ?Sized>(
    api:            &A,
    folder_id:      i32,
    include_groups: bool,
) -> scout_telegram::Result<Vec<PeerRef>> {
    let peers = folders::folder_peers(api, folder_id).await?;
    log::info!(
        "folder {folder_id}: {} channel(s), {} legacy group(s)",
        peers.channels.len(),
        peers.groups.len(),
    );

    let mut targets = peers.channels;
    if include_groups {
        targets.extend(peers.groups);
    } else if !peers.groups.is_empty() {
        log::debug!("skipping {} legacy group(s)", peers.groups.len());
    }
    Ok(targets)
}

/// Search each target in turn, printing every report.
///
/// A failed search is logged and skipped. Checks `cancel` before and during
/// each search.
pub async fn search_targets<A: TelegramApi + ?Sized>(
    api:     &A,
    options: &SearchOptions,
    targets: &[PeerRef],
    query:   &str,
    cancel:  &CancellationToken,
) -> Result<Vec<SearchReport>, FlowError> {
    let mut reports = Vec::with_capacity(targets.len());
    for &peer in targets {
        if cancel.is_cancelled() {
            return Err(FlowError::Cancelled);
        }
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FlowError::Cancelled),
            r = search::search_in_peer(api, options, peer, query) => r,
        };
        match result {
            Ok(report) => {
                println!("{report}");
                reports.push(report);
            }
            Err(e) => log::warn!("search in {peer} failed: {e}"),
        }
    }
    Ok(reports)
}

/// What a finished search task produced.
#[derive(Debug)]
pub struct SearchSummary {
    pub product: Product,
    pub reports: Vec<SearchReport>,
}

impl SearchSummary {
    pub fn total_found(&self) -> usize {
        self.reports.iter().map(SearchReport::found).sum()
    }
}

/// Body of the spawned search task.
pub async fn search_task(
    api:           Arc<dyn TelegramApi>,
    options:       SearchOptions,
    targets:       Vec<PeerRef>,
    product_index: usize,
    handoff:       oneshot::Receiver<Vec<Product>>,
    cancel:        CancellationToken,
) -> Result<SearchSummary, FlowError> {
    let products = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(FlowError::Cancelled),
        r = handoff => r.map_err(|_| FlowError::HandoffClosed)?,
    };
    log::debug!("received {} product(s)", products.len());

    let product = select_product(&products, product_index)?.clone();
    println!("🔎 Searching {} chat(s) for \"{}\"\n", targets.len(), product.name);

    let reports = search_targets(api.as_ref(), &options, &targets, &product.name, &cancel).await?;
    Ok(SearchSummary { product, reports })
}

// ─── Run ──────────────────────────────────────────────────────────────────────

/// Settings of one `run`.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub folder_id:      i32,
    pub include_groups: bool,
    pub options:        SearchOptions,
    pub product_index:  usize,
    pub timeout:        Duration,
}

/// Run the whole flow. `shutdown` resolving (Ctrl-C in the binary) cancels it.
pub async fn run<S, F>(
    api:      Arc<dyn TelegramApi>,
    source:   &S,
    plan:     &RunPlan,
    shutdown: F,
) -> Result<SearchSummary, FlowError>
where
    S: ProductSource + ?Sized,
    F: Future<Output = ()>,
{
    let targets = resolve_targets(api.as_ref(), plan.folder_id, plan.include_groups).await?;

    let (tx, rx) = oneshot::channel();
    let cancel   = CancellationToken::new();
    let mut task = tokio::spawn(search_task(
        api,
        plan.options,
        targets,
        plan.product_index,
        rx,
        cancel.clone(),
    ));

    match source.products().await {
        Ok(products) => {
            log::info!("fetched {} product(s)", products.len());
            if tx.send(products).is_err() {
                log::debug!("search task ended before the handoff");
            }
        }
        Err(e) => {
            drop(tx);
            cancel.cancel();
            reap(task).await;
            return Err(e.into());
        }
    }

    tokio::pin!(shutdown);
    tokio::select! {
        res = tokio::time::timeout(plan.timeout, &mut task) => match res {
            Ok(joined) => joined?,
            Err(_) => {
                log::warn!("search still running after {}s, cancelling", plan.timeout.as_secs());
                cancel.cancel();
                reap(task).await;
                Err(FlowError::TimedOut(plan.timeout))
            }
        },
        _ = &mut shutdown => {
            log::info!("shutdown requested, cancelling search");
            cancel.cancel();
            reap(task).await;
            Err(FlowError::Cancelled)
        }
    }
}

/// Wait for a cancelled task. Its own result no longer matters, but a
/// panic inside it is logged.
async fn reap<T>(task: JoinHandle<T>) -> Option<JoinError> {
    match task.await {
        Ok(_) => None,
        Err(e) => {
            log::warn!("search task failed: {e}");
            Some(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use scout_backend::Session;
    use scout_telegram::dialogs::{ChannelFullInfo, ChatInfo, DialogEntry};
    use scout_telegram::folders::{Folder, FolderList, SuggestedFolder};
    use scout_telegram::search::{SearchRequest, SearchResponse};

    use super::*;

    /// A folder-and-search-only account.
    #[derive(Default)]
    struct FakeApi {
        folders:      Vec<Folder>,
        hang_search:  bool,
        fail_peer:    Option<i64>,
        searches:     Mutex<Vec<SearchRequest>>,
    }

    impl FakeApi {
        fn searches(&self) -> Vec<SearchRequest> {
            self.searches.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TelegramApi for FakeApi {
        async fn dialogs(&self) -> scout_telegram::Result<Vec<DialogEntry>> { Ok(Vec::new()) }
        async fn get_channels(&self, _: &[PeerRef]) -> scout_telegram::Result<Vec<ChatInfo>> { Ok(Vec::new()) }
        async fn get_chats(&self, _: &[i64]) -> scout_telegram::Result<Vec<ChatInfo>> { Ok(Vec::new()) }
        async fn get_full_channel(&self, _: PeerRef) -> scout_telegram::Result<ChannelFullInfo> {
            Ok(ChannelFullInfo::default())
        }
        async fn dialog_filters(&self) -> scout_telegram::Result<FolderList> {
            Ok(FolderList { tags_enabled: false, folders: self.folders.clone() })
        }
        async fn suggested_filters(&self) -> scout_telegram::Result<Vec<SuggestedFolder>> { Ok(Vec::new()) }
        async fn update_dialog_filter(&self, _: i32, _: Option<&Folder>) -> scout_telegram::Result<bool> { Ok(true) }
        async fn update_dialog_filters_order(&self, _: &[i32]) -> scout_telegram::Result<bool> { Ok(true) }

        async fn search(&self, request: &SearchRequest) -> scout_telegram::Result<SearchResponse> {
            self.searches.lock().unwrap().push(request.clone());
            if self.hang_search {
                std::future::pending::<()>().await;
            }
            if self.fail_peer == Some(request.peer.id()) {
                return Err(scout_telegram::Error::FolderEmpty(0));
            }
            Ok(SearchResponse::Messages(Vec::new()))
        }
    }

    struct FakeSource(Vec<Product>);

    #[async_trait]
    impl ProductSource for FakeSource {
        async fn products(&self) -> scout_backend::Result<Vec<Product>> { Ok(self.0.clone()) }
        async fn sessions(&self) -> scout_backend::Result<Vec<Session>> { Ok(Vec::new()) }
    }

    struct FailingSource;

    #[async_trait]
    impl ProductSource for FailingSource {
        async fn products(&self) -> scout_backend::Result<Vec<Product>> {
            Err(BackendError::Auth("invalid login credentials".into()))
        }
        async fn sessions(&self) -> scout_backend::Result<Vec<Session>> { Ok(Vec::new()) }
    }

    fn product(id: &str, name: &str) -> Product {
        Product {
            id:         id.into(),
            title:      format!("{name} title"),
            name:       name.into(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    const CHANNEL: PeerRef = PeerRef::Channel { id: 100, access_hash: 1 };
    const GROUP: PeerRef = PeerRef::Chat { id: 300 };

    fn folder_four() -> Folder {
        Folder {
            include_peers: vec![CHANNEL, PeerRef::User { id: 200, access_hash: 2 }, GROUP],
            ..Folder::new(4, "Deals")
        }
    }

    fn plan() -> RunPlan {
        RunPlan {
            folder_id:      4,
            include_groups: false,
            options:        SearchOptions::default(),
            product_index:  0,
            timeout:        Duration::from_secs(5),
        }
    }

    fn api(fake: FakeApi) -> (Arc<FakeApi>, Arc<dyn TelegramApi>) {
        let fake = Arc::new(fake);
        let dynamic: Arc<dyn TelegramApi> = fake.clone();
        (fake, dynamic)
    }

    #[test]
    fn product_index_is_checked() {
        let products = vec![product("1", "Keyboard")];
        assert_eq!(select_product(&products, 0).unwrap().name, "Keyboard");
        assert!(matches!(
            select_product(&products, 1),
            Err(FlowError::ProductMissing { index: 1, available: 1 })
        ));
        assert!(matches!(select_product(&[], 0), Err(FlowError::ProductMissing { index: 0, available: 0 })));
    }

    #[tokio::test]
    async fn searches_the_folder_channel_once_for_the_product() {
        let (fake, api) = api(FakeApi { folders: vec![folder_four()], ..Default::default() });
        let source = FakeSource(vec![product("1", "Keyboard"), product("2", "Mouse")]);

        let summary = run(api, &source, &plan(), std::future::pending()).await.unwrap();
        assert_eq!(summary.product.name, "Keyboard");
        assert_eq!(summary.reports.len(), 1);
        assert_eq!(summary.total_found(), 0);

        let searches = fake.searches();
        assert_eq!(searches.len(), 1);
        assert_eq!(searches[0].peer, CHANNEL);
        assert_eq!(searches[0].query, "Keyboard");
    }

    #[tokio::test]
    async fn groups_are_searched_only_when_enabled() {
        let (fake, api) = api(FakeApi { folders: vec![folder_four()], ..Default::default() });
        let source = FakeSource(vec![product("1", "Keyboard")]);
        let plan = RunPlan { include_groups: true, ..plan() };

        run(api, &source, &plan, std::future::pending()).await.unwrap();
        let peers: Vec<_> = fake.searches().iter().map(|r| r.peer).collect();
        assert_eq!(peers, vec![CHANNEL, GROUP]);
    }

    #[tokio::test]
    async fn configured_index_picks_the_product() {
        let (fake, api) = api(FakeApi { folders: vec![folder_four()], ..Default::default() });
        let source = FakeSource(vec![product("1", "Keyboard"), product("2", "Mouse")]);
        let plan = RunPlan { product_index: 1, ..plan() };

        run(api, &source, &plan, std::future::pending()).await.unwrap();
        assert_eq!(fake.searches()[0].query, "Mouse");
    }

    #[tokio::test]
    async fn short_product_list_fails_without_searching() {
        let (fake, api) = api(FakeApi { folders: vec![folder_four()], ..Default::default() });
        let err = run(api, &FakeSource(Vec::new()), &plan(), std::future::pending()).await.unwrap_err();
        assert!(matches!(err, FlowError::ProductMissing { index: 0, available: 0 }));
        assert!(fake.searches().is_empty());
    }

    #[tokio::test]
    async fn missing_folder_fails_before_fetching_products() {
        let (_, api) = api(FakeApi::default());
        let err = run(api, &FailingSource, &plan(), std::future::pending()).await.unwrap_err();
        assert!(matches!(err, FlowError::Telegram(scout_telegram::Error::FolderNotFound(4))));
    }

    #[tokio::test]
    async fn backend_failure_is_reported() {
        let (fake, api) = api(FakeApi { folders: vec![folder_four()], ..Default::default() });
        let err = run(api, &FailingSource, &plan(), std::future::pending()).await.unwrap_err();
        assert!(matches!(err, FlowError::Backend(BackendError::Auth(_))));
        assert!(fake.searches().is_empty());
    }

    #[tokio::test]
    async fn failed_search_is_skipped() {
        let other = PeerRef::Channel { id: 101, access_hash: 1 };
        let folder = Folder { include_peers: vec![CHANNEL, other], ..Folder::new(4, "Deals") };
        let (fake, api) = api(FakeApi { folders: vec![folder], fail_peer: Some(100), ..Default::default() });

        let summary = run(api, &FakeSource(vec![product("1", "Keyboard")]), &plan(), std::future::pending())
            .await
            .unwrap();
        assert_eq!(fake.searches().len(), 2);
        assert_eq!(summary.reports.len(), 1);
        assert_eq!(summary.reports[0].peer, other);
    }

    #[tokio::test]
    async fn dropped_sender_closes_the_handoff() {
        let (fake, api) = api(FakeApi::default());
        let (tx, rx) = oneshot::channel();
        drop(tx);
        let res = search_task(api, SearchOptions::default(), vec![CHANNEL], 0, rx, CancellationToken::new()).await;
        assert!(matches!(res, Err(FlowError::HandoffClosed)));
        assert!(fake.searches().is_empty());
    }

    #[tokio::test]
    async fn cancelled_task_never_searches() {
        let (fake, api) = api(FakeApi::default());
        let (tx, rx) = oneshot::channel();
        let cancel = CancellationToken::new();
        cancel.cancel();
        tx.send(vec![product("1", "Keyboard")]).unwrap();

        let res = search_task(api, SearchOptions::default(), vec![CHANNEL], 0, rx, cancel).await;
        assert!(matches!(res, Err(FlowError::Cancelled)));
        assert!(fake.searches().is_empty());
    }

    #[tokio::test]
    async fn slow_search_times_out() {
        let (_, api) = api(FakeApi { folders: vec![folder_four()], hang_search: true, ..Default::default() });
        let plan = RunPlan { timeout: Duration::from_millis(50), ..plan() };

        let err = run(api, &FakeSource(vec![product("1", "Keyboard")]), &plan, std::future::pending())
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::TimedOut(d) if d == Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn reaping_reports_a_panicked_task() {
        let finished = tokio::spawn(async { 7 });
        assert!(reap(finished).await.is_none());

        let panicked = tokio::spawn(async { Option::<u8>::None.expect("search blew up") });
        let err = reap(panicked).await.expect("join error");
        assert!(err.is_panic());
    }

    #[tokio::test]
    async fn shutdown_cancels_the_search() {
        let (fake, api) = api(FakeApi { folders: vec![folder_four()], hang_search: true, ..Default::default() });
        let shutdown = async { tokio::time::sleep(Duration::from_millis(20)).await };

        let err = run(api, &FakeSource(vec![product("1", "Keyboard")]), &plan(), shutdown)
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::Cancelled));
        assert_eq!(fake.searches().len(), 1);
    }
}
