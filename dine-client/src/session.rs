//! Session context and table resolution
//!
//! A [`SessionRegistry`] owns one [`SessionContext`] per browsing session.
//! The context is the only cache: token to table, catalog, cart and the
//! local order history all live and die with it.
//!
//! Resolution is single-flight per context and never retried. A failed
//! lookup ends the session; every later call reports
//! [`DineError::SessionInvalid`] until the session is invalidated and
//! created again.

use crate::api::OrderApi;
use crate::cart::CartStore;
use crate::catalog::CatalogCache;
use crate::http::HttpClient;
use crate::{DineError, DineResult};
use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard, RwLock};
use serde::{Deserialize, Serialize};
use shared::models::Order;
use shared::util::now_millis;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Strip routing artifacts from a raw path token
///
/// Removes surrounding whitespace, leading slashes and a retained
/// `token=` (or URL-encoded `token%3D`) fragment.
pub fn normalize_token(raw: &str) -> String {
    let token = raw.trim().trim_start_matches('/');
    let token = ["token=", "token%3D", "token%3d"]
        .iter()
        .find_map(|prefix| token.strip_prefix(prefix))
        .unwrap_or(token);
    token.trim().to_string()
}

/// Resolved token persisted for reloads within the same session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub table_id: i64,
    /// Resolution time (Unix millis)
    pub resolved_at: i64,
}

/// JSON file holding one session's [`StoredSession`]
#[derive(Debug, Clone)]
pub struct SessionStorage {
    path: PathBuf,
}

impl SessionStorage {
    pub fn new(base_path: impl Into<PathBuf>, session_id: &str) -> Self {
        let filename: String = session_id
            .chars()
            .map(|c| match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
                _ => '_',
            })
            .collect();
        let path = base_path.into().join(format!("{}.json", filename));
        Self { path }
    }

    pub fn save(&self, session: &StoredSession) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, json)
    }

    /// Missing or unreadable files load as `None`
    pub fn load(&self) -> Option<StoredSession> {
        if !self.path.exists() {
            return None;
        }
        let json = fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&json).ok()
    }

    pub fn delete(&self) -> std::io::Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// State of one browsing session
#[derive(Debug)]
pub struct SessionContext {
    session_id: String,
    tables: Mutex<HashMap<String, i64>>,
    resolve_lock: tokio::sync::Mutex<()>,
    submit_lock: tokio::sync::Mutex<()>,
    ended: AtomicBool,
    catalog: CatalogCache,
    cart: Mutex<CartStore>,
    orders: RwLock<Vec<Order>>,
    storage: Option<SessionStorage>,
}

impl SessionContext {
    fn new(session_id: String, storage: Option<SessionStorage>) -> Self {
        let mut tables = HashMap::new();
        if let Some(stored) = storage.as_ref().and_then(SessionStorage::load) {
            tracing::debug!(
                session_id = %session_id,
                table_id = stored.table_id,
                "Restored resolved table from session storage"
            );
            tables.insert(stored.token, stored.table_id);
        }
        Self {
            session_id,
            tables: Mutex::new(tables),
            resolve_lock: tokio::sync::Mutex::new(()),
            submit_lock: tokio::sync::Mutex::new(()),
            ended: AtomicBool::new(false),
            catalog: CatalogCache::new(),
            cart: Mutex::new(CartStore::new()),
            orders: RwLock::new(Vec::new()),
            storage,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_ended(&self) -> bool {
        self.ended.load(Ordering::Acquire)
    }

    /// Mark the session as ended (terminal)
    pub fn end(&self) {
        self.ended.store(true, Ordering::Release);
    }

    pub fn catalog(&self) -> &CatalogCache {
        &self.catalog
    }

    /// Claim the session's single submission slot
    ///
    /// `None` while another submission holds it. Never waits.
    pub fn try_begin_submit(&self) -> Option<tokio::sync::MutexGuard<'_, ()>> {
        self.submit_lock.try_lock().ok()
    }

    /// Exclusive access to the cart
    pub fn cart(&self) -> MutexGuard<'_, CartStore> {
        self.cart.lock()
    }

    /// Snapshot of the locally known orders
    pub fn orders(&self) -> Vec<Order> {
        self.orders.read().clone()
    }

    /// Append a freshly submitted order (replaces one with the same id)
    pub fn record_order(&self, order: Order) {
        let mut orders = self.orders.write();
        match orders.iter_mut().find(|o| o.id == order.id) {
            Some(existing) => *existing = order,
            None => orders.push(order),
        }
    }

    /// Replace local history with a fetched list, keeping local-only orders
    pub fn merge_orders(&self, fetched: Vec<Order>) {
        let mut orders = self.orders.write();
        let local_only: Vec<Order> = orders
            .drain(..)
            .filter(|o| !fetched.iter().any(|f| f.id == o.id))
            .collect();
        *orders = fetched;
        orders.extend(local_only);
    }

    /// Table already resolved for `token` in this session
    pub fn cached_table(&self, token: &str) -> Option<i64> {
        self.tables.lock().get(&normalize_token(token)).copied()
    }

    /// Resolve a session token to its table
    ///
    /// Cache first; on miss, exactly one lookup. Failure of any kind (network,
    /// empty result, ambiguous result, unauthorized) ends the session.
    pub async fn resolve_table<C: HttpClient>(
        &self,
        api: &OrderApi<C>,
        raw_token: &str,
    ) -> DineResult<i64> {
        if self.is_ended() {
            return Err(DineError::session_invalid("session has ended"));
        }
        let token = normalize_token(raw_token);
        if token.is_empty() {
            return Err(self.fail("missing session token"));
        }

        if let Some(table_id) = self.tables.lock().get(&token).copied() {
            tracing::debug!(table_id, "Table cache hit");
            return Ok(table_id);
        }

        let _guard = self.resolve_lock.lock().await;
        if let Some(table_id) = self.tables.lock().get(&token).copied() {
            return Ok(table_id);
        }
        if self.is_ended() {
            return Err(DineError::session_invalid("session has ended"));
        }

        tracing::debug!(session_id = %self.session_id, "Table cache miss, looking up token");
        let rows = match api.lookup_table(&token).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(error = %e, "Table lookup failed");
                return Err(self.fail(format!("table lookup failed: {}", e)));
            }
        };

        let table_id = match rows.as_slice() {
            [] => return Err(self.fail("token did not match any table")),
            [first, rest @ ..] if rest.iter().all(|r| r.table_id == first.table_id) => {
                first.table_id
            }
            _ => return Err(self.fail("token matched more than one table")),
        };

        self.tables.lock().insert(token.clone(), table_id);
        if let Some(storage) = &self.storage {
            let stored = StoredSession {
                token,
                table_id,
                resolved_at: now_millis(),
            };
            if let Err(e) = storage.save(&stored) {
                tracing::warn!(error = %e, path = %storage.path().display(), "Failed to persist session");
            }
        }
        tracing::info!(session_id = %self.session_id, table_id, "Table resolved");
        Ok(table_id)
    }

    fn fail(&self, reason: impl Into<String>) -> DineError {
        let reason = reason.into();
        tracing::info!(session_id = %self.session_id, reason = %reason, "Session ended");
        self.end();
        DineError::session_invalid(reason)
    }

    /// Drop all cached state
    fn teardown(&self) {
        self.end();
        self.tables.lock().clear();
        self.catalog.invalidate();
        self.cart.lock().clear();
        self.orders.write().clear();
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.delete() {
                tracing::warn!(error = %e, "Failed to delete session storage");
            }
        }
    }
}

/// Owner of all live session contexts
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, Arc<SessionContext>>,
    storage_dir: Option<PathBuf>,
}

impl SessionRegistry {
    /// Registry without persistence
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry persisting resolved tokens under `dir`
    pub fn with_storage_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            sessions: DashMap::new(),
            storage_dir: Some(dir.into()),
        }
    }

    /// Context for `session_id`, created on first use
    ///
    /// A new context picks up a token resolved earlier in the same session
    /// from session storage.
    pub fn create(&self, session_id: &str) -> Arc<SessionContext> {
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                let storage = self
                    .storage_dir
                    .as_ref()
                    .map(|dir| SessionStorage::new(dir.clone(), session_id));
                tracing::debug!(session_id, "Session created");
                Arc::new(SessionContext::new(session_id.to_string(), storage))
            })
            .clone()
    }

    pub fn get(&self, session_id: &str) -> Option<Arc<SessionContext>> {
        self.sessions.get(session_id).map(|s| s.clone())
    }

    /// End a session and drop every cache it owned
    ///
    /// Holders of the old `Arc` see an ended, empty context.
    pub fn invalidate(&self, session_id: &str) -> bool {
        match self.sessions.remove(session_id) {
            Some((_, ctx)) => {
                ctx.teardown();
                tracing::debug!(session_id, "Session invalidated");
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
