//! Matcher registry and the interceptor that resolves calls against it.
//!
//! Matchers are kept newest first. For a given call the first matcher whose
//! predicate accepts it wins and every later one is ignored, so a test can
//! override an earlier registration just by registering again.

pub mod helpers;

use crate::error::{FetchMockError, PredicateError};
use crate::network::{Fetch, FetchFuture, FetchResult, Mode};
use crate::request::{FetchInput, RequestOptions, extract_method, extract_url};
use crate::response::Response;
use futures_util::FutureExt;
use futures_util::future;
use log::trace;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

type PredicateFn =
    dyn Fn(&FetchInput, Option<&RequestOptions>) -> Result<bool, PredicateError> + Send + Sync;

/// A predicate paired with the response it stands for.
pub struct Matcher {
    predicate: Box<PredicateFn>,
    response: Arc<Response>,
}

impl Matcher {
    pub fn new<P, R>(predicate: P, response: R) -> Self
    where
        P: Fn(&FetchInput, Option<&RequestOptions>) -> bool + Send + Sync + 'static,
        R: Into<Arc<Response>>,
    {
        Self::fallible(
            move |input: &FetchInput, options: Option<&RequestOptions>| {
                Ok(predicate(input, options))
            },
            response,
        )
    }

    /// A matcher whose predicate can fail. The error reaches the caller of
    /// the intercepted fetch as [`FetchMockError::Predicate`], unchanged.
    pub fn fallible<P, R>(predicate: P, response: R) -> Self
    where
        P: Fn(&FetchInput, Option<&RequestOptions>) -> Result<bool, PredicateError>
            + Send
            + Sync
            + 'static,
        R: Into<Arc<Response>>,
    {
        Self {
            predicate: Box::new(predicate),
            response: response.into(),
        }
    }

    pub fn matches(
        &self,
        input: &FetchInput,
        options: Option<&RequestOptions>,
    ) -> Result<bool, PredicateError> {
        (self.predicate)(input, options)
    }

    pub fn response(&self) -> &Arc<Response> {
        &self.response
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("response", &self.response)
            .finish_non_exhaustive()
    }
}

/// Ordered matchers, newest first. Only grows through [`MatcherRegistry::add`]
/// and only shrinks through [`MatcherRegistry::clear`].
#[derive(Debug, Default)]
pub struct MatcherRegistry {
    matchers: RwLock<VecDeque<Arc<Matcher>>>,
}

impl MatcherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts `matcher` in front of every matcher already registered.
    pub fn add(&self, matcher: Matcher) {
        self.matchers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push_front(Arc::new(matcher));
    }

    /// Removes every matcher and returns how many there were.
    pub fn clear(&self) -> usize {
        let mut matchers = self.matchers.write().unwrap_or_else(PoisonError::into_inner);
        let cleared = matchers.len();
        matchers.clear();
        cleared
    }

    pub fn len(&self) -> usize {
        self.matchers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the current priority order. Predicates run against the copy,
    /// never under the lock.
    fn snapshot(&self) -> Vec<Arc<Matcher>> {
        self.matchers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Returns the response of the first matcher accepting the call.
    pub fn resolve(&self, input: &FetchInput, options: Option<&RequestOptions>) -> FetchResult {
        for (position, matcher) in self.snapshot().iter().enumerate() {
            if matcher
                .matches(input, options)
                .map_err(FetchMockError::Predicate)?
            {
                trace!("fetch matcher #{} accepted {}", position, extract_url(input));
                return Ok(matcher.response().clone());
            }
        }
        Err(FetchMockError::NoMatchFound {
            method: extract_method(options),
            url: extract_url(input),
        })
    }
}

/// The handler installed while mocking is active.
#[derive(Debug, Clone)]
pub struct Interceptor {
    registry: Arc<MatcherRegistry>,
}

impl Interceptor {
    pub fn new(registry: Arc<MatcherRegistry>) -> Self {
        Self { registry }
    }
}

impl Fetch for Interceptor {
    fn fetch(&self, input: FetchInput, options: Option<RequestOptions>) -> FetchFuture {
        // Matchers are consulted now, not when the future is first polled.
        future::ready(self.registry.resolve(&input, options.as_ref())).boxed()
    }

    fn mode(&self) -> Mode {
        Mode::Mocking
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn starts_with(prefix: &'static str) -> impl Fn(&FetchInput, Option<&RequestOptions>) -> bool {
        move |input: &FetchInput, _: Option<&RequestOptions>| extract_url(input).starts_with(prefix)
    }

    #[test]
    fn test_resolve_returns_the_registered_response() {
        let registry = MatcherRegistry::new();
        let response = Arc::new(Response::new("Hello world !"));
        registry.add(Matcher::new(|_, _| true, response.clone()));

        let result = registry
            .resolve(&FetchInput::from("https://www.mapado.com"), None)
            .unwrap();
        assert!(Arc::ptr_eq(&result, &response));
    }

    #[test]
    fn test_newest_matcher_wins() {
        let registry = MatcherRegistry::new();
        let older = Arc::new(Response::new("older"));
        let newer = Arc::new(Response::new("newer"));
        registry.add(Matcher::new(|_, _| true, older.clone()));
        registry.add(Matcher::new(|_, _| true, newer.clone()));

        let result = registry.resolve(&FetchInput::from("https://a.test"), None).unwrap();
        assert!(Arc::ptr_eq(&result, &newer));
    }

    #[test]
    fn test_disjoint_matchers() {
        let registry = MatcherRegistry::new();
        registry.add(Matcher::new(starts_with("https://1.match"), Response::new("Match 1")));
        registry.add(Matcher::new(starts_with("https://2.match"), Response::new("Match 2")));

        let first = registry.resolve(&FetchInput::from("https://1.match/test"), None).unwrap();
        let second = registry.resolve(&FetchInput::from("https://2.match/test"), None).unwrap();
        assert_eq!(first.text().unwrap(), "Match 1");
        assert_eq!(second.text().unwrap(), "Match 2");
    }

    #[test]
    fn test_no_match_reports_method_and_url() {
        let registry = MatcherRegistry::new();
        registry.add(Matcher::new(|_, _| false, Response::empty()));

        let options = RequestOptions::with_method("delete");
        let err = registry
            .resolve(&FetchInput::from("https://www.mapado.com"), Some(&options))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unable to match the given \"DELETE\" fetch call to \"https://www.mapado.com\""
        );
    }

    #[test]
    fn test_later_matchers_are_not_consulted() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let counted = calls.clone();
        let registry = MatcherRegistry::new();
        registry.add(Matcher::new(
            move |_, _| {
                counted.fetch_add(1, Ordering::SeqCst);
                true
            },
            Response::empty(),
        ));
        registry.add(Matcher::new(|_, _| true, Response::empty()));

        registry.resolve(&FetchInput::from("https://a.test"), None).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_predicate_error_passes_through() {
        #[derive(Debug)]
        struct Unreadable;
        impl fmt::Display for Unreadable {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "body could not be read")
            }
        }
        impl Error for Unreadable {}

        let registry = MatcherRegistry::new();
        registry.add(Matcher::fallible(
            |_, _| Err(Box::new(Unreadable) as PredicateError),
            Response::empty(),
        ));

        let err = registry.resolve(&FetchInput::from("https://a.test"), None).unwrap_err();
        assert_eq!(err.to_string(), "body could not be read");
        match err {
            FetchMockError::Predicate(inner) => {
                assert!(inner.downcast_ref::<Unreadable>().is_some())
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_clear_empties_registry() {
        let registry = MatcherRegistry::new();
        registry.add(Matcher::new(|_, _| true, Response::empty()));
        registry.add(Matcher::new(|_, _| true, Response::empty()));

        assert_eq!(registry.clear(), 2);
        assert!(registry.is_empty());
        assert!(matches!(
            registry.resolve(&FetchInput::from("https://a.test"), None),
            Err(FetchMockError::NoMatchFound { .. })
        ));
    }

    #[test]
    fn test_interceptor_resolves_at_call_time() {
        let registry = Arc::new(MatcherRegistry::new());
        let interceptor = Interceptor::new(registry.clone());
        registry.add(Matcher::new(|_, _| true, Response::new("early")));

        // Clearing after the call does not affect the pending result.
        let pending = interceptor.fetch(FetchInput::from("https://early.test"), None);
        registry.clear();

        let response = futures_executor::block_on(pending).unwrap();
        assert_eq!(response.text().unwrap(), "early");
        assert_eq!(interceptor.mode(), Mode::Mocking);

        // And a matcher added after the call is not seen by it.
        let pending = interceptor.fetch(FetchInput::from("https://late.test"), None);
        registry.add(Matcher::new(|_, _| true, Response::new("late")));
        assert!(matches!(
            futures_executor::block_on(pending),
            Err(FetchMockError::NoMatchFound { .. })
        ));
    }
}
