//! Query Cache
//!
//! Keyed cache of server data with staleness, invalidation, request
//! coalescing and lazy garbage collection. Values are stored as JSON so one
//! cache can hold every entity type.
//!
//! A fetch records the id it was started with; if the key is invalidated or
//! overwritten while the fetch is in flight, its late result is dropped
//! instead of clobbering newer state.

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;

use chrono::{DateTime, Duration, Utc};
use futures::future::{FutureExt, LocalBoxFuture, Shared};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::notify::Subscribers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Auth,
    Products,
    Suppliers,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Profile,
    List,
    Detail(u32),
    Active,
    Search(String),
    LowStock,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub resource: Resource,
    pub scope: Scope,
}

impl QueryKey {
    pub fn new(resource: Resource, scope: Scope) -> Self {
        Self { resource, scope }
    }

    /// Collection-shaped keys, i.e. everything a create or update can change
    pub fn is_collection(&self) -> bool {
        matches!(
            self.scope,
            Scope::List | Scope::Active | Scope::Search(_) | Scope::LowStock
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QueryOptions {
    pub stale_time: Duration,
    pub gc_time: Duration,
    /// Extra attempts after a transient failure
    pub retry: u32,
}

impl QueryOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            stale_time: Duration::from_std(config.stale_time).unwrap_or_else(|_| Duration::zero()),
            gc_time: Duration::from_std(config.gc_time).unwrap_or_else(|_| Duration::zero()),
            retry: 1,
        }
    }
}

type SharedFetch = Shared<LocalBoxFuture<'static, AppResult<Value>>>;

struct CacheEntry {
    data: Value,
    updated_at: DateTime<Utc>,
    last_used: DateTime<Utc>,
    invalidated: bool,
}

impl CacheEntry {
    fn new(data: Value) -> Self {
        let now = Utc::now();
        Self { data, updated_at: now, last_used: now, invalidated: false }
    }
}

#[derive(Default)]
struct Cache {
    entries: HashMap<QueryKey, CacheEntry>,
    in_flight: HashMap<QueryKey, (u64, SharedFetch)>,
    next_fetch_id: u64,
}

#[derive(Clone)]
pub struct QueryClient {
    cache: Rc<RefCell<Cache>>,
    options: QueryOptions,
    subscribers: Subscribers,
}

impl QueryClient {
    pub fn new(options: QueryOptions) -> Self {
        Self {
            cache: Rc::new(RefCell::new(Cache::default())),
            options,
            subscribers: Subscribers::default(),
        }
    }

    pub fn subscribe(&self, listener: impl Fn() + 'static) {
        self.subscribers.subscribe(listener);
    }

    /// Return fresh cached data, join an identical in-flight fetch, or start one
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = AppResult<T>> + 'static,
    {
        self.collect_garbage();
        if let Some(data) = self.fresh_data(&key) {
            log::debug!("Cache hit for {:?}", key);
            return decode(data);
        }
        let fetch = self.in_flight_or_start(key, fetcher);
        decode(fetch.await?)
    }

    fn fresh_data(&self, key: &QueryKey) -> Option<Value> {
        let mut cache = self.cache.borrow_mut();
        let entry = cache.entries.get_mut(key)?;
        let now = Utc::now();
        if entry.invalidated || now - entry.updated_at >= self.options.stale_time {
            return None;
        }
        entry.last_used = now;
        Some(entry.data.clone())
    }

    fn in_flight_or_start<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> SharedFetch
    where
        T: Serialize,
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = AppResult<T>> + 'static,
    {
        let mut cache = self.cache.borrow_mut();
        if let Some((_, fetch)) = cache.in_flight.get(&key) {
            log::debug!("Joining in-flight fetch for {:?}", key);
            return fetch.clone();
        }

        cache.next_fetch_id += 1;
        let fetch_id = cache.next_fetch_id;
        let client = self.clone();
        let retries = self.options.retry;
        let fetch_key = key.clone();

        let fetch = async move {
            let mut attempt = 0;
            let result = loop {
                match fetcher().await {
                    Ok(data) => break serde_json::to_value(&data).map_err(AppError::from),
                    Err(e) if attempt < retries && e.is_transient() => {
                        attempt += 1;
                        log::warn!("Retrying {:?} after transient error: {}", fetch_key, e);
                    }
                    Err(e) => break Err(e),
                }
            };
            client.finish_fetch(&fetch_key, fetch_id, &result);
            result
        }
        .boxed_local()
        .shared();

        cache.in_flight.insert(key, (fetch_id, fetch.clone()));
        fetch
    }

    fn finish_fetch(&self, key: &QueryKey, fetch_id: u64, result: &AppResult<Value>) {
        let mut cache = self.cache.borrow_mut();
        let current = matches!(cache.in_flight.get(key), Some((id, _)) if *id == fetch_id);
        if !current {
            log::debug!("Dropping superseded result for {:?}", key);
            return;
        }
        cache.in_flight.remove(key);
        if let Ok(data) = result {
            cache.entries.insert(key.clone(), CacheEntry::new(data.clone()));
        }
    }

    /// Drop entries nobody has read within `gc_time`
    pub fn collect_garbage(&self) {
        let gc_time = self.options.gc_time;
        let now = Utc::now();
        let mut cache = self.cache.borrow_mut();
        let Cache { entries, in_flight, .. } = &mut *cache;
        entries.retain(|key, entry| in_flight.contains_key(key) || now - entry.last_used <= gc_time);
    }

    // ========================
    // Direct cache access
    // ========================

    /// Cached data regardless of freshness
    pub fn get_query_data<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let data = self.cache.borrow().entries.get(key).map(|e| e.data.clone())?;
        decode(data).ok()
    }

    pub fn set_query_data<T: Serialize>(&self, key: QueryKey, data: &T) {
        match serde_json::to_value(data) {
            Ok(value) => {
                {
                    let mut cache = self.cache.borrow_mut();
                    cache.in_flight.remove(&key);
                    cache.entries.insert(key, CacheEntry::new(value));
                }
                self.subscribers.notify();
            }
            Err(e) => log::error!("Failed to cache {:?}: {}", key, e),
        }
    }

    /// Rewrite an existing entry; absent entries stay absent
    pub fn update_query_data<T, F>(&self, key: &QueryKey, update: F) -> bool
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(T) -> T,
    {
        match self.get_query_data::<T>(key) {
            Some(current) => {
                self.set_query_data(key.clone(), &update(current));
                true
            }
            None => false,
        }
    }

    /// Mark matching entries stale and abandon their in-flight fetches
    pub fn invalidate(&self, predicate: impl Fn(&QueryKey) -> bool) {
        let count = {
            let mut cache = self.cache.borrow_mut();
            cache.in_flight.retain(|key, _| !predicate(key));
            let mut count = 0;
            for (key, entry) in cache.entries.iter_mut() {
                if predicate(key) {
                    entry.invalidated = true;
                    count += 1;
                }
            }
            count
        };
        log::debug!("Invalidated {} cache entries", count);
        self.subscribers.notify();
    }

    pub fn remove(&self, predicate: impl Fn(&QueryKey) -> bool) {
        {
            let mut cache = self.cache.borrow_mut();
            cache.in_flight.retain(|key, _| !predicate(key));
            cache.entries.retain(|key, _| !predicate(key));
        }
        self.subscribers.notify();
    }

    pub fn clear(&self) {
        {
            let mut cache = self.cache.borrow_mut();
            cache.in_flight.clear();
            cache.entries.clear();
        }
        log::info!("Query cache cleared");
        self.subscribers.notify();
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.cache.borrow().entries.contains_key(key)
    }
}

fn decode<T: DeserializeOwned>(data: Value) -> AppResult<T> {
    serde_json::from_value(data).map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn options(stale_secs: i64) -> QueryOptions {
        QueryOptions {
            stale_time: Duration::seconds(stale_secs),
            gc_time: Duration::seconds(600),
            retry: 1,
        }
    }

    fn list_key() -> QueryKey {
        QueryKey::new(Resource::Suppliers, Scope::List)
    }

    fn counting_fetcher(
        calls: Rc<Cell<u32>>,
        value: Vec<String>,
    ) -> impl Fn() -> LocalBoxFuture<'static, AppResult<Vec<String>>> {
        move || {
            let calls = calls.clone();
            let value = value.clone();
            async move {
                calls.set(calls.get() + 1);
                tokio::task::yield_now().await;
                Ok(value)
            }
            .boxed_local()
        }
    }

    #[tokio::test]
    async fn test_fresh_data_skips_network() {
        let client = QueryClient::new(options(300));
        let calls = Rc::new(Cell::new(0));

        let first: Vec<String> = client
            .fetch(list_key(), counting_fetcher(calls.clone(), vec!["Acme".to_string()]))
            .await
            .unwrap();
        let second: Vec<String> = client
            .fetch(list_key(), counting_fetcher(calls.clone(), vec!["Other".to_string()]))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_fetches_share_one_request() {
        let client = QueryClient::new(options(300));
        let calls = Rc::new(Cell::new(0));

        let a = client.fetch::<Vec<String>, _, _>(list_key(), counting_fetcher(calls.clone(), vec!["A".to_string()]));
        let b = client.fetch::<Vec<String>, _, _>(list_key(), counting_fetcher(calls.clone(), vec!["B".to_string()]));
        let (a, b) = futures::join!(a, b);

        assert_eq!(a.unwrap(), vec!["A".to_string()]);
        assert_eq!(b.unwrap(), vec!["A".to_string()]);
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let client = QueryClient::new(options(300));
        let calls = Rc::new(Cell::new(0));

        let _: Vec<String> = client.fetch(list_key(), counting_fetcher(calls.clone(), vec![])).await.unwrap();
        client.invalidate(|key| key.resource == Resource::Suppliers);
        let after: Vec<String> = client
            .fetch(list_key(), counting_fetcher(calls.clone(), vec!["Acme".to_string()]))
            .await
            .unwrap();

        assert_eq!(calls.get(), 2);
        assert_eq!(after, vec!["Acme".to_string()]);
    }

    #[tokio::test]
    async fn test_zero_stale_time_always_refetches() {
        let client = QueryClient::new(options(0));
        let calls = Rc::new(Cell::new(0));
        for _ in 0..3 {
            let _: Vec<String> = client.fetch(list_key(), counting_fetcher(calls.clone(), vec![])).await.unwrap();
        }
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_late_result_after_invalidation_is_dropped() {
        let client = QueryClient::new(options(300));
        let calls = Rc::new(Cell::new(0));
        let pending = client.fetch::<Vec<String>, _, _>(
            list_key(),
            counting_fetcher(calls.clone(), vec!["stale".to_string()]),
        );
        // Runs while the fetch is suspended
        let invalidate = async {
            client.set_query_data(list_key(), &vec!["fresh".to_string()]);
        };
        let (result, _) = futures::join!(pending, invalidate);

        // The caller still gets its answer, but the cache keeps the newer write
        assert_eq!(result.unwrap(), vec!["stale".to_string()]);
        assert_eq!(
            client.get_query_data::<Vec<String>>(&list_key()),
            Some(vec!["fresh".to_string()])
        );
    }

    #[tokio::test]
    async fn test_transient_error_is_retried_once() {
        let client = QueryClient::new(options(300));
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let result: AppResult<u32> = client
            .fetch(list_key(), move || {
                let counter = counter.clone();
                async move {
                    counter.set(counter.get() + 1);
                    Err(AppError::Network("offline".to_string()))
                }
            })
            .await;

        assert_eq!(result, Err(AppError::Network("offline".to_string())));
        assert_eq!(calls.get(), 2);
        assert!(!client.contains(&list_key()));
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let client = QueryClient::new(options(300));
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let result: AppResult<u32> = client
            .fetch(list_key(), move || {
                let counter = counter.clone();
                async move {
                    counter.set(counter.get() + 1);
                    Err(AppError::Api { status: 404, message: "Not found".to_string() })
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_update_query_data_only_touches_existing() {
        let client = QueryClient::new(options(300));
        let key = QueryKey::new(Resource::Products, Scope::Detail(4));
        assert!(!client.update_query_data::<u32, _>(&key, |n| n + 1));

        client.set_query_data(key.clone(), &1u32);
        assert!(client.update_query_data::<u32, _>(&key, |n| n + 1));
        assert_eq!(client.get_query_data::<u32>(&key), Some(2));
    }

    #[test]
    fn test_unused_entries_are_collected() {
        let client = QueryClient::new(QueryOptions {
            stale_time: Duration::seconds(300),
            gc_time: Duration::seconds(-1),
            retry: 1,
        });
        client.set_query_data(list_key(), &vec![1u32]);
        client.collect_garbage();
        assert!(!client.contains(&list_key()));
    }

    #[test]
    fn test_mutations_notify_subscribers() {
        let client = QueryClient::new(options(300));
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        client.subscribe(move || counter.set(counter.get() + 1));

        client.set_query_data(list_key(), &vec![1u32]);
        client.invalidate(|_| true);
        client.remove(|key| key.is_collection());
        client.clear();
        assert_eq!(calls.get(), 4);
    }
}
