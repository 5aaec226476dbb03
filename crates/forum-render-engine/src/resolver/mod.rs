//! # Quoted-Post Resolver
//!
//! Cache of quoted posts keyed by [`PostId`], filled from a cheap local source
//! when possible and from the network otherwise.
//!
//! Each id is in at most one of three states: resolved, failed or in flight.
//! All three live behind one lock that is never held across an `.await`, so
//! `load`, `seed`, `post` and `reset_failures` never interleave. A `load` for
//! an id that is already in any state is a no-op, giving at most one
//! outstanding fetch per id. A `load` that is dropped before its fetch
//! completes takes its id out of flight again.
//!
//! Failures are soft: a failed id stays failed until [`QuotedPostResolver::reset_failures`]
//! or a [`QuotedPostResolver::seed`] that includes it. Empty responses and
//! transport errors are treated alike.

pub mod fetch;

pub use fetch::{FetchError, FetchFuture, FetchRequest, FetchResponse, FetchStrategy, PostFetcher};

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;

use crate::models::{Post, PostId};

/// Synchronous lookup into content that is already available, e.g. a loaded page.
pub type LocalProvider = Arc<dyn Fn(&PostId) -> Option<Post> + Send + Sync>;

/// What the UI should show for a quoted post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteStatus {
    Resolved(Post),
    /// Not found; may have been deleted.
    Failed,
    Pending,
}

#[derive(Default)]
struct State {
    resolved: HashMap<PostId, Post>,
    failed: HashSet<PostId>,
    in_flight: HashSet<PostId>,
}

impl State {
    fn resolve(&mut self, id: PostId, post: Post) {
        self.failed.remove(&id);
        self.resolved.insert(id, post);
    }
}

/// Cache of quoted posts. Clones share the same cache.
#[derive(Clone)]
pub struct QuotedPostResolver {
    state: Arc<Mutex<State>>,
    fetcher: Arc<dyn PostFetcher>,
    local: Option<LocalProvider>,
    strategy: FetchStrategy,
}

impl QuotedPostResolver {
    pub fn new(fetcher: Arc<dyn PostFetcher>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            fetcher,
            local: None,
            strategy: FetchStrategy::default(),
        }
    }

    pub fn with_local_provider(
        mut self,
        local: impl Fn(&PostId) -> Option<Post> + Send + Sync + 'static,
    ) -> Self {
        self.local = Some(Arc::new(local));
        self
    }

    /// Strategy hint passed along with every fetch.
    pub fn with_strategy(mut self, strategy: FetchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    fn state(&self) -> MutexGuard<'_, State> {
        lock(&self.state)
    }

    fn local(&self, id: &PostId) -> Option<Post> {
        self.local.as_ref().and_then(|provider| provider(id))
    }

    /// Inserts already-loaded posts and clears any failure recorded for them.
    pub fn seed(&self, posts: impl IntoIterator<Item = Post>) {
        let mut state = self.state();
        for post in posts {
            state.resolve(post.id.clone(), post);
        }
    }

    /// Cached or locally available post. Never touches the network.
    pub fn post(&self, id: &PostId) -> Option<Post> {
        let mut state = self.state();
        if let Some(post) = state.resolved.get(id) {
            return Some(post.clone());
        }
        let post = self.local(id)?;
        state.resolve(id.clone(), post.clone());
        Some(post)
    }

    pub fn status(&self, id: &PostId) -> QuoteStatus {
        if let Some(post) = self.post(id) {
            return QuoteStatus::Resolved(post);
        }
        if self.is_failed(id) {
            QuoteStatus::Failed
        } else {
            QuoteStatus::Pending
        }
    }

    /// Resolves `id`, fetching it if no cached, failed or in-flight entry exists.
    pub async fn load(&self, id: PostId) {
        {
            let mut state = self.state();
            if state.resolved.contains_key(&id)
                || state.failed.contains(&id)
                || state.in_flight.contains(&id)
            {
                return;
            }
            if let Some(post) = self.local(&id) {
                state.resolve(id, post);
                return;
            }
            state.in_flight.insert(id.clone());
        }
        let in_flight = InFlight {
            state: &self.state,
            id,
            finished: false,
        };

        let request = FetchRequest::for_post(&in_flight.id, self.strategy);
        let result = self.fetcher.fetch(request).await;

        let (mut state, id) = in_flight.finish();
        match result.map(|response| response.into_match(&id)) {
            Ok(Some(post)) => state.resolve(id, post),
            Ok(None) => {
                log::debug!("Quoted post {id} not found");
                state.failed.insert(id);
            }
            Err(e) => {
                log::debug!("Failed to load quoted post {id}: {e}");
                state.failed.insert(id);
            }
        }
    }

    /// Runs [`QuotedPostResolver::load`] on the Tokio runtime.
    pub fn spawn_load(&self, id: PostId) -> JoinHandle<()> {
        let resolver = self.clone();
        tokio::spawn(async move { resolver.load(id).await })
    }

    /// Forgets every failure so the ids can be loaded again.
    pub fn reset_failures(&self) {
        self.state().failed.clear();
    }

    pub fn is_failed(&self, id: &PostId) -> bool {
        self.state().failed.contains(id)
    }

    pub fn is_in_flight(&self, id: &PostId) -> bool {
        self.state().in_flight.contains(id)
    }

    pub fn is_resolved(&self, id: &PostId) -> bool {
        self.state().resolved.contains_key(id)
    }
}

/// In-flight entry owned by a running `load`.
///
/// Dropping it without [`InFlight::finish`] (the `load` future was cancelled)
/// removes the id so it can be loaded again.
struct InFlight<'a> {
    state: &'a Mutex<State>,
    id: PostId,
    finished: bool,
}

impl<'a> InFlight<'a> {
    /// Removes the entry and hands back the lock, so the outcome is recorded
    /// without the id ever being in no state.
    fn finish(mut self) -> (MutexGuard<'a, State>, PostId) {
        let mut state = lock(self.state);
        state.in_flight.remove(&self.id);
        self.finished = true;
        (state, self.id.clone())
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            lock(self.state).in_flight.remove(&self.id);
        }
    }
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
