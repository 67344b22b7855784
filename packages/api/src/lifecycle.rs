//! # Lifecycle — single-flight construction and teardown of shared resources
//!
//! Both long-lived resources of the site (the MySQL connection pool and the SMTP
//! transport) follow the same pattern: built lazily by the first caller that needs
//! them, shared by everybody afterwards, and released once when the process shuts
//! down. [`Lifecycle`] owns that pattern so the resource-specific code only has to
//! say *how* to configure, connect and release, via the [`Connector`] trait.
//!
//! ## Guarantees
//!
//! | Operation | Behaviour |
//! |-----------|-----------|
//! | [`Lifecycle::ensure_initialized`] | No-op when ready. Joins an in-flight construction instead of starting a second one. Validates the configuration snapshot before any I/O. |
//! | [`Lifecycle::shutdown`] | Waits for an in-flight construction, then releases the resource exactly once. Concurrent callers share that single release. Never fails. |
//! | [`Lifecycle::handle`] | Read-only shared handle to the ready resource. |
//!
//! In-flight operations are stored as [`Shared`] futures tagged with a numeric
//! token. Bookkeeping at completion only clears a slot entry when it still carries
//! the token it was started with, so a stale completion can never erase a newer
//! operation.
//!
//! The slot lock is a plain [`parking_lot::Mutex`]; it is never held across an
//! `.await`.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

use crate::settings::ConfigurationError;

/// Boxed error returned by connectors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Resource-specific half of a [`Lifecycle`].
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Validated configuration snapshot handed to [`Connector::connect`].
    type Config: Send + 'static;
    /// The shared resource.
    type Resource: Send + Sync + 'static;

    /// Short name used in log lines and errors.
    fn name(&self) -> &'static str;

    /// Read and validate the settings needed to build the resource.
    fn configure(&self) -> Result<Self::Config, ConfigurationError>;

    /// Build the resource.
    async fn connect(&self, config: Self::Config) -> Result<Self::Resource, BoxError>;

    /// Release the resource.
    async fn release(&self, resource: &Self::Resource) -> Result<(), BoxError>;
}

/// Observable state of a managed resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    Uninitialized,
    Initializing,
    Ready,
    Closing,
    Closed,
}

/// Failure of [`Lifecycle::ensure_initialized`].
///
/// Cloneable so that every caller joined on the same construction receives the
/// same error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("failed to create {resource}: {source}")]
    Creation {
        resource: &'static str,
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync>,
    },
}

type InitFuture<R> = Shared<BoxFuture<'static, Result<Arc<R>, LifecycleError>>>;
type CloseFuture = Shared<BoxFuture<'static, ()>>;

struct Slot<R> {
    resource: Option<Arc<R>>,
    initializing: Option<(u64, InitFuture<R>)>,
    closing: Option<(u64, CloseFuture)>,
    closed: bool,
}

impl<R> Default for Slot<R> {
    fn default() -> Self {
        Self {
            resource: None,
            initializing: None,
            closing: None,
            closed: false,
        }
    }
}

struct Inner<C: Connector> {
    connector: C,
    slot: Mutex<Slot<C::Resource>>,
    next_token: AtomicU64,
}

impl<C: Connector> Inner<C> {
    fn token(&self) -> u64 {
        self.next_token.fetch_add(1, Ordering::Relaxed)
    }
}

enum Wait<R> {
    Idle,
    Init(InitFuture<R>),
    Close(CloseFuture),
}

/// Lazily built, single-flight managed resource.
///
/// Cloning is cheap and every clone refers to the same resource.
pub struct Lifecycle<C: Connector> {
    inner: Arc<Inner<C>>,
}

impl<C: Connector> Clone for Lifecycle<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C: Connector> fmt::Debug for Lifecycle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("resource", &self.inner.connector.name())
            .field("state", &self.state())
            .finish()
    }
}

impl<C: Connector> Lifecycle<C> {
    pub fn new(connector: C) -> Self {
        Self {
            inner: Arc::new(Inner {
                connector,
                slot: Mutex::new(Slot::default()),
                next_token: AtomicU64::new(1),
            }),
        }
    }

    pub fn connector(&self) -> &C {
        &self.inner.connector
    }

    /// Build the resource unless it already exists.
    pub async fn ensure_initialized(&self) -> Result<(), LifecycleError> {
        self.acquire().await.map(drop)
    }

    /// Build the resource if needed and return a handle to it.
    pub async fn acquire(&self) -> Result<Arc<C::Resource>, LifecycleError> {
        loop {
            let wait = {
                let slot = self.inner.slot.lock();

                if let Some((_, closing)) = &slot.closing {
                    Wait::Close(closing.clone())
                } else if let Some(resource) = &slot.resource {
                    return Ok(resource.clone());
                } else if let Some((_, init)) = &slot.initializing {
                    Wait::Init(init.clone())
                } else {
                    Wait::Idle
                }
            };

            let init = match wait {
                Wait::Init(init) => init,
                // A rebuild never overlaps a release: wait, then look again.
                Wait::Close(closing) => {
                    closing.await;
                    continue;
                }
                Wait::Idle => {
                    // Unlocked: `configure` may call back into this lifecycle.
                    let config = self.inner.connector.configure().map_err(|e| {
                        tracing::warn!(resource = self.inner.connector.name(), "{}", e);
                        LifecycleError::from(e)
                    })?;

                    match self.start(config) {
                        Some(init) => init,
                        None => continue,
                    }
                }
            };

            return init.await;
        }
    }

    /// Record a new construction, unless another caller got there first.
    fn start(&self, config: C::Config) -> Option<InitFuture<C::Resource>> {
        let mut slot = self.inner.slot.lock();
        if slot.closing.is_some() || slot.resource.is_some() || slot.initializing.is_some() {
            return None;
        }

        let token = self.inner.token();
        let init = Self::initialize(self.inner.clone(), token, config)
            .boxed()
            .shared();
        slot.initializing = Some((token, init.clone()));
        slot.closed = false;
        Some(init)
    }

    /// Release the resource, waiting for any in-flight construction first.
    pub async fn shutdown(&self) {
        loop {
            let wait = {
                let mut slot = self.inner.slot.lock();

                if let Some((_, init)) = &slot.initializing {
                    Wait::Init(init.clone())
                } else if let Some((_, closing)) = &slot.closing {
                    Wait::Close(closing.clone())
                } else if let Some(resource) = slot.resource.clone() {
                    let token = self.inner.token();
                    let closing = Self::release(self.inner.clone(), token, resource)
                        .boxed()
                        .shared();
                    slot.closing = Some((token, closing.clone()));
                    Wait::Close(closing)
                } else {
                    Wait::Idle
                }
            };

            match wait {
                Wait::Idle => return,
                Wait::Init(init) => {
                    // The outcome is irrelevant here; the next pass sees the settled slot.
                    let _ = init.await;
                }
                Wait::Close(closing) => {
                    closing.await;
                    return;
                }
            }
        }
    }

    /// Handle to the resource when it is ready.
    pub fn handle(&self) -> Option<Arc<C::Resource>> {
        let slot = self.inner.slot.lock();
        if slot.closing.is_some() {
            return None;
        }
        slot.resource.clone()
    }

    pub fn state(&self) -> ResourceState {
        let slot = self.inner.slot.lock();
        if slot.closing.is_some() {
            ResourceState::Closing
        } else if slot.resource.is_some() {
            ResourceState::Ready
        } else if slot.initializing.is_some() {
            ResourceState::Initializing
        } else if slot.closed {
            ResourceState::Closed
        } else {
            ResourceState::Uninitialized
        }
    }

    async fn initialize(
        inner: Arc<Inner<C>>,
        token: u64,
        config: C::Config,
    ) -> Result<Arc<C::Resource>, LifecycleError> {
        let name = inner.connector.name();
        tracing::debug!(resource = name, "initializing");

        let outcome = inner.connector.connect(config).await;

        let mut slot = inner.slot.lock();
        if slot.initializing.as_ref().is_some_and(|(t, _)| *t == token) {
            slot.initializing = None;
        }

        match outcome {
            Ok(resource) => {
                let resource = Arc::new(resource);
                slot.resource = Some(resource.clone());
                tracing::info!(resource = name, "initialized");
                Ok(resource)
            }
            Err(e) => {
                tracing::error!(resource = name, "initialization failed: {}", e);
                Err(LifecycleError::Creation {
                    resource: name,
                    source: Arc::from(e),
                })
            }
        }
    }

    async fn release(inner: Arc<Inner<C>>, token: u64, resource: Arc<C::Resource>) {
        let name = inner.connector.name();
        tracing::debug!(resource = name, "releasing");

        if let Err(e) = inner.connector.release(&resource).await {
            tracing::error!(resource = name, "error while releasing: {}", e);
        }

        let mut slot = inner.slot.lock();
        if slot
            .resource
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, &resource))
        {
            slot.resource = None;
            slot.closed = true;
        }
        if slot.closing.as_ref().is_some_and(|(t, _)| *t == token) {
            slot.closing = None;
        }
    }
}
