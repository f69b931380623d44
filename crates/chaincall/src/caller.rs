//! `Caller`: dispatches calls through an [`Aggregator`] and writes the
//! results back into them.
//!
//! # How it works
//! - Every call is packed first; one bad call aborts before anything is sent
//! - The packed calls go out as a single `aggregate3` request
//! - Result `i` belongs to call `i`: a failed result marks the call failed,
//!   a successful one is decoded into the call's output record
//! - [`Caller::call_chunked`] repeats this per chunk and only writes the
//!   results back once every chunk succeeded

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, Bytes};
use chaincall_rpc::{connect_with, HttpClientConfig, RpcTransport};

use crate::call::{Call, Outcome};
use crate::chunk::chunk_inputs;
use crate::config::CallerConfig;
use crate::error::CallError;
use crate::multicall::{Aggregator, Call3, CallOptions, Multicall3, MULTICALL3_ADDRESS};

/// Outcomes of one aggregate request, not yet written to the calls.
///
/// `outcomes[i]` belongs to call `i`. When `error` is set, `outcomes` holds
/// the calls before the one that failed to decode.
struct Staged {
    outcomes: Vec<Outcome>,
    error: Option<CallError>,
}

/// Batches calls into aggregate requests.
///
/// Holds no per-dispatch state; one `Caller` can serve any number of
/// sequential or concurrent dispatches over disjoint call lists.
#[derive(Clone)]
pub struct Caller {
    aggregator: Arc<dyn Aggregator>,
    chunk_size: usize,
    cooldown: Duration,
}

impl Caller {
    /// Caller over an existing aggregator, with no chunking and no cooldown.
    pub fn new(aggregator: impl Aggregator + 'static) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            chunk_size: 0,
            cooldown: Duration::ZERO,
        }
    }

    pub fn builder() -> CallerBuilder {
        CallerBuilder::default()
    }

    /// Build a caller from a [`CallerConfig`].
    pub fn from_config(config: &CallerConfig) -> Result<Self, CallError> {
        Self::builder()
            .rpc_url(config.rpc_url.clone())
            .multicall_address(config.multicall_address()?)
            .request_timeout(config.request_timeout())
            .chunk_size(config.chunk_size)
            .cooldown(config.cooldown())
            .build()
    }

    /// Address of the aggregator contract.
    pub fn multicall_address(&self) -> Address {
        self.aggregator.address()
    }

    /// Default chunk size used by [`Caller::call_batched`].
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Default cooldown used by [`Caller::call_batched`].
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Dispatch every call in one aggregate request.
    ///
    /// On success each call is marked dispatched; failed target calls have
    /// [`Call::failed`] set and keep their previous outputs.
    ///
    /// # Errors
    /// - `CallError::Pack`: a call could not be encoded; nothing was sent
    /// - `CallError::Aggregate` / `CallError::ResultCount`: no call was updated
    /// - `CallError::Unpack { index }`: calls before `index` were updated,
    ///   the rest were not
    pub async fn call(&self, opts: &CallOptions, calls: &mut [Call]) -> Result<(), CallError> {
        let staged = self.aggregate(opts, calls).await?;
        for (call, outcome) in calls.iter_mut().zip(staged.outcomes) {
            call.settle(outcome);
        }
        match staged.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Dispatch the calls in chunks of at most `chunk_size`, one aggregate
    /// request per chunk, sleeping `cooldown` between requests.
    ///
    /// See [`chunk_inputs`] for how `chunk_size` splits the list.
    ///
    /// # Errors
    /// `CallError::Chunk` naming the first chunk that failed. In that case
    /// no call is updated, including those of earlier chunks.
    pub async fn call_chunked(
        &self,
        opts: &CallOptions,
        chunk_size: usize,
        cooldown: Duration,
        calls: &mut [Call],
    ) -> Result<(), CallError> {
        let chunks = chunk_inputs(chunk_size, &calls[..]);
        let total = chunks.len();
        let mut outcomes = Vec::with_capacity(calls.len());
        let mut offset = 0;

        for (chunk, batch) in chunks.into_iter().enumerate() {
            if chunk > 0 && !cooldown.is_zero() {
                tracing::trace!(chunk, cooldown_ms = cooldown.as_millis() as u64, "cooling down");
                tokio::time::sleep(cooldown).await;
            }
            tracing::debug!(chunk, total, calls = batch.len(), "dispatching call chunk");

            let staged = match self.aggregate(opts, batch).await {
                Ok(Staged { error: Some(err), .. }) | Err(err) => {
                    return Err(CallError::Chunk {
                        chunk,
                        offset,
                        source: Box::new(err),
                    })
                }
                Ok(staged) => staged,
            };
            outcomes.extend(staged.outcomes);
            offset += batch.len();
        }

        for (call, outcome) in calls.iter_mut().zip(outcomes) {
            call.settle(outcome);
        }
        Ok(())
    }

    /// [`Caller::call_chunked`] with the caller's configured chunk size and
    /// cooldown.
    pub async fn call_batched(&self, opts: &CallOptions, calls: &mut [Call]) -> Result<(), CallError> {
        self.call_chunked(opts, self.chunk_size, self.cooldown, calls).await
    }

    /// One aggregate request for `calls`, without touching them.
    async fn aggregate(&self, opts: &CallOptions, calls: &[Call]) -> Result<Staged, CallError> {
        if calls.is_empty() {
            return Ok(Staged {
                outcomes: Vec::new(),
                error: None,
            });
        }

        let mut requests = Vec::with_capacity(calls.len());
        for (index, call) in calls.iter().enumerate() {
            let call_data = call.pack().map_err(|source| CallError::Pack { index, source })?;
            requests.push(Call3 {
                target: call.target(),
                allow_failure: call.can_fail(),
                call_data: Bytes::from(call_data),
            });
        }

        tracing::debug!(
            calls = requests.len(),
            multicall = %self.aggregator.address(),
            block = ?opts.block,
            "sending aggregate3"
        );
        let results = self.aggregator.aggregate3(opts, requests).await.map_err(|e| {
            tracing::warn!(calls = calls.len(), error = %e, "aggregate3 failed");
            CallError::Aggregate(e)
        })?;

        if results.len() != calls.len() {
            return Err(CallError::ResultCount {
                expected: calls.len(),
                got: results.len(),
            });
        }

        let mut outcomes = Vec::with_capacity(calls.len());
        for (index, (call, result)) in calls.iter().zip(results).enumerate() {
            if !result.success {
                tracing::trace!(index, method = call.method(), target = %call.target(), "call failed");
                outcomes.push(Outcome::Failed);
                continue;
            }
            match call.decode_outputs(&result.return_data) {
                Ok(record) => outcomes.push(Outcome::Decoded(record)),
                Err(source) => {
                    return Ok(Staged {
                        outcomes,
                        error: Some(CallError::Unpack { index, source }),
                    })
                }
            }
        }

        Ok(Staged {
            outcomes,
            error: None,
        })
    }
}

impl fmt::Debug for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Caller")
            .field("multicall", &self.aggregator.address())
            .field("chunk_size", &self.chunk_size)
            .field("cooldown", &self.cooldown)
            .finish()
    }
}

/// Fluent builder for [`Caller`].
///
/// The remote side comes from, in order of precedence: an explicit
/// [`aggregator`](Self::aggregator), a [`client`](Self::client) transport,
/// or an [`rpc_url`](Self::rpc_url) opened over HTTP.
#[derive(Default)]
pub struct CallerBuilder {
    rpc_url: Option<String>,
    client: Option<Arc<dyn RpcTransport>>,
    aggregator: Option<Arc<dyn Aggregator>>,
    multicall_address: Option<Address>,
    request_timeout: Option<Duration>,
    chunk_size: usize,
    cooldown: Duration,
}

impl CallerBuilder {
    /// HTTP(S) JSON-RPC endpoint to open.
    pub fn rpc_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_url = Some(url.into());
        self
    }

    /// Use an already-open transport instead of an URL.
    pub fn client(mut self, client: impl RpcTransport) -> Self {
        self.client = Some(Arc::new(client));
        self
    }

    /// Use a custom aggregator; the transport settings are then ignored.
    pub fn aggregator(mut self, aggregator: impl Aggregator + 'static) -> Self {
        self.aggregator = Some(Arc::new(aggregator));
        self
    }

    /// Multicall3 deployment to call. Defaults to [`MULTICALL3_ADDRESS`].
    pub fn multicall_address(mut self, address: Address) -> Self {
        self.multicall_address = Some(address);
        self
    }

    /// HTTP request timeout when the builder opens the transport itself.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn build(self) -> Result<Caller, CallError> {
        let aggregator = match self.aggregator {
            Some(aggregator) => aggregator,
            None => {
                let transport = match (self.client, self.rpc_url) {
                    (Some(client), _) => client,
                    (None, Some(url)) => {
                        let mut config = HttpClientConfig::default();
                        if let Some(timeout) = self.request_timeout {
                            config.request_timeout = timeout;
                        }
                        let client = connect_with(&url, config).map_err(CallError::Connect)?;
                        Arc::new(client) as Arc<dyn RpcTransport>
                    }
                    (None, None) => return Err(CallError::Config("rpc url is required".into())),
                };
                let address = self.multicall_address.unwrap_or(MULTICALL3_ADDRESS);
                Arc::new(Multicall3::at(transport, address)?) as Arc<dyn Aggregator>
            }
        };

        tracing::debug!(
            multicall = %aggregator.address(),
            chunk_size = self.chunk_size,
            "caller ready"
        );
        Ok(Caller {
            aggregator,
            chunk_size: self.chunk_size,
            cooldown: self.cooldown,
        })
    }
}
