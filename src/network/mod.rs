//! The process-wide fetch slot.
//!
//! Code under test calls [`FetchHook::fetch`] (or the crate-level
//! [`crate::fetch`]) instead of talking to an HTTP client directly. The slot
//! holds exactly one handler at a time:
//!
//! - [`Mode::Passthrough`]: the real network, through `reqwest`
//! - [`Mode::Blocking`]: every call fails with `AllCallsBlocked`
//! - [`Mode::Mocking`]: calls resolve against the registered matchers
//!
//! Installing a handler overwrites the previous one. There is no stacking and
//! no isolation between concurrent users of the same hook: last writer wins.

pub mod passthrough;

use crate::blocker::Blocker;
use crate::config::Config;
use crate::error::FetchMockError;
use crate::mock::{Interceptor, Matcher, MatcherRegistry};
use crate::request::{FetchInput, RequestOptions};
use crate::response::Response;
use futures_util::future::BoxFuture;
use log::debug;
use passthrough::Passthrough;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use strum_macros::{AsRefStr, Display, EnumString};

pub type FetchResult = Result<Arc<Response>, FetchMockError>;
pub type FetchFuture = BoxFuture<'static, FetchResult>;

/// Which kind of handler currently sits in a [`FetchHook`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumString)]
pub enum Mode {
    #[strum(serialize = "passthrough")]
    Passthrough,
    #[strum(serialize = "blocking")]
    Blocking,
    #[strum(serialize = "mocking")]
    Mocking,
}

/// A fetch implementation that can be installed into a [`FetchHook`].
pub trait Fetch: Send + Sync {
    /// Resolves one call. No work happens until the returned future is polled.
    fn fetch(&self, input: FetchInput, options: Option<RequestOptions>) -> FetchFuture;

    fn mode(&self) -> Mode;
}

/// A swappable slot for the current fetch handler, plus the matcher registry
/// the mock interceptor reads from.
///
/// The registry outlives handler swaps: installing the blocker and then
/// registering another mock brings back every matcher registered before.
pub struct FetchHook {
    handler: RwLock<Arc<dyn Fetch>>,
    registry: Arc<MatcherRegistry>,
    config: Config,
}

impl FetchHook {
    /// A hook in passthrough mode using the default config.
    pub fn new() -> Self {
        Self::from_parts(Config::with_defaults())
    }

    /// A hook in passthrough mode whose real client is built from `config`.
    /// The client is built eagerly so that a bad config fails here.
    pub fn with_config(config: Config) -> Result<Self, FetchMockError> {
        passthrough::build_client(&config)?;
        Ok(Self::from_parts(config))
    }

    fn from_parts(config: Config) -> Self {
        let handler: Arc<dyn Fetch> = Arc::new(Passthrough::new(config.clone()));
        Self {
            handler: RwLock::new(handler),
            registry: Arc::new(MatcherRegistry::new()),
            config,
        }
    }

    /// Replaces whatever handler is installed.
    pub fn install(&self, handler: Arc<dyn Fetch>) {
        let mode = handler.mode();
        let mut slot = self.handler.write().unwrap_or_else(PoisonError::into_inner);
        *slot = handler;
        debug!("installed {} fetch handler", mode);
    }

    /// Makes every subsequent call fail with [`FetchMockError::AllCallsBlocked`].
    pub fn install_blocker(&self) {
        self.install(Arc::new(Blocker));
    }

    /// Puts a fresh real-network handler back into the slot. Registered
    /// matchers are kept.
    pub fn restore_passthrough(&self) {
        self.install(Arc::new(Passthrough::new(self.config.clone())));
    }

    /// Registers `response` for every call accepted by `predicate`, ahead of
    /// all matchers registered before it, and makes sure the mock interceptor
    /// is installed.
    pub fn register_mock<P, R>(&self, predicate: P, response: R)
    where
        P: Fn(&FetchInput, Option<&RequestOptions>) -> bool + Send + Sync + 'static,
        R: Into<Arc<Response>>,
    {
        self.register_matcher(Matcher::new(predicate, response));
    }

    /// Same as [`FetchHook::register_mock`] for an already built matcher.
    pub fn register_matcher(&self, matcher: Matcher) {
        self.registry.add(matcher);
        debug!("registered fetch matcher, {} active", self.registry.len());
        self.ensure_interceptor();
    }

    /// Drops every matcher. The interceptor stays installed, so any call
    /// reaching it now fails with [`FetchMockError::NoMatchFound`].
    pub fn reset_mocks(&self) {
        let cleared = self.registry.clear();
        debug!("cleared {} fetch matchers", cleared);
    }

    // Re-installing over an existing interceptor is harmless: both read the same registry.
    fn ensure_interceptor(&self) {
        self.install(Arc::new(Interceptor::new(self.registry.clone())));
    }

    pub fn mode(&self) -> Mode {
        self.current().mode()
    }

    pub fn matcher_count(&self) -> usize {
        self.registry.len()
    }

    pub fn registry(&self) -> &Arc<MatcherRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn current(&self) -> Arc<dyn Fetch> {
        self.handler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sends one call through whichever handler is installed right now.
    pub fn fetch<I: Into<FetchInput>>(
        &self,
        input: I,
        options: Option<RequestOptions>,
    ) -> FetchFuture {
        self.current().fetch(input.into(), options)
    }

    /// Drives [`FetchHook::fetch`] to completion on the current thread.
    ///
    /// Suited to blocked and mocked calls. A passthrough call needs a Tokio
    /// reactor, so here it fails with [`FetchMockError::NoRuntime`] and has to
    /// be awaited from a runtime instead.
    pub fn fetch_blocking<I: Into<FetchInput>>(
        &self,
        input: I,
        options: Option<RequestOptions>,
    ) -> FetchResult {
        futures_executor::block_on(self.fetch(input, options))
    }
}

impl Default for FetchHook {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FetchHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchHook")
            .field("mode", &self.mode())
            .field("matchers", &self.matcher_count())
            .field("config", &self.config)
            .finish()
    }
}

lazy_static::lazy_static! {
    /// Process-wide hook behind the crate-level convenience functions.
    static ref GLOBAL_HOOK: FetchHook = FetchHook::new();
}

/// The process-wide hook.
pub fn global() -> &'static FetchHook {
    &GLOBAL_HOOK
}
