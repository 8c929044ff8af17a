use crate::error::FetchMockError;
use crate::network::{Fetch, FetchFuture, Mode};
use crate::request::{FetchInput, RequestOptions, extract_url};

/// Fails every call with [`FetchMockError::AllCallsBlocked`].
///
/// Installed by `install_blocker` so that a test cannot reach a live network
/// by accident. Holds no state.
#[derive(Debug, Default, Clone, Copy)]
pub struct Blocker;

impl Fetch for Blocker {
    fn fetch(&self, input: FetchInput, _options: Option<RequestOptions>) -> FetchFuture {
        Box::pin(async move {
            Err(FetchMockError::AllCallsBlocked {
                url: extract_url(&input),
            })
        })
    }

    fn mode(&self) -> Mode {
        Mode::Blocking
    }
}
