//! Handshake lifecycle coordination.
//!
//! The coordinator owns the mutable state of one proxy handshake: the
//! completion latch and its deferred-action queue, the one-shot unregister
//! hook, the shrinking time budget, and the proxy credentials. The driver
//! performing the actual byte exchange calls in from one thread while other
//! threads may race to submit dependent work; every public operation is safe
//! under that concurrency and none of them blocks on I/O.

mod budget;
mod credentials;

pub use budget::{DEFAULT_HANDSHAKE_TIMEOUT, HANDSHAKE_GRACE_FLOOR};
pub use credentials::TunnelCredentials;

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::config::{SessionConfig, TIMEOUT_PROPERTY};
use crate::endpoint::TunnelEndpoint;
use crate::error::HandshakeError;
use budget::TimeBudget;

/// Target name for tracing events emitted by the coordinator.
const HANDSHAKE_TARGET: &str = "tunnel::handshake";

/// Boxed error produced by deferred actions and the unregister hook.
pub type ActionError = Box<dyn std::error::Error + Send + Sync>;

type DeferredAction = Box<dyn FnOnce() -> Result<(), ActionError> + Send>;
type UnregisterHook = Box<dyn FnOnce() -> Result<(), ActionError> + Send>;

/// Completion latch and deferred-action queue, mutated as one unit.
///
/// The queue exists only while the handshake is pending; completion replaces
/// the whole state, so queueing after completion is unrepresentable.
enum CompletionState {
    Pending(Vec<DeferredAction>),
    Complete,
}

/// Coordinates one proxy tunnel handshake.
///
/// Constructed per connection attempt with the proxy and target endpoints and
/// optional credentials, then initialized from session configuration before
/// the driver starts the wire exchange. Exactly one [`complete`] call
/// finalizes the state; a completed coordinator is never reused.
///
/// Budget consultation is thread-safe (the budget pair sits behind its own
/// mutex), but the intended usage keeps it on the single driver thread;
/// concurrent consultations charge wall-clock time in whichever order they
/// acquire the lock.
///
/// [`complete`]: HandshakeCoordinator::complete
pub struct HandshakeCoordinator {
    proxy: TunnelEndpoint,
    target: TunnelEndpoint,
    credentials: Mutex<TunnelCredentials>,
    gate: Mutex<CompletionState>,
    done: AtomicBool,
    unregister: Mutex<Option<UnregisterHook>>,
    budget: Mutex<TimeBudget>,
}

impl HandshakeCoordinator {
    /// Creates a coordinator for a handshake through `proxy` to `target`.
    #[must_use]
    pub fn new(
        proxy: TunnelEndpoint,
        target: TunnelEndpoint,
        credentials: TunnelCredentials,
    ) -> Self {
        Self {
            proxy,
            target,
            credentials: Mutex::new(credentials),
            gate: Mutex::new(CompletionState::Pending(Vec::new())),
            done: AtomicBool::new(false),
            unregister: Mutex::new(None),
            budget: Mutex::new(TimeBudget::new()),
        }
    }

    /// Returns the proxy endpoint this handshake negotiates with.
    #[must_use]
    pub const fn proxy_address(&self) -> &TunnelEndpoint {
        &self.proxy
    }

    /// Returns the final target endpoint behind the proxy.
    #[must_use]
    pub const fn target_address(&self) -> &TunnelEndpoint {
        &self.target
    }

    /// Returns the credential user identifier, if any.
    #[must_use]
    pub fn credential_user(&self) -> Option<String> {
        self.credentials
            .lock()
            .expect("credentials mutex poisoned")
            .user()
            .map(str::to_owned)
    }

    /// Calls `f` with a view of the credential secret bytes.
    ///
    /// A retired secret presents as an empty slice. The credentials lock is
    /// held for the duration of `f`; callers must not reenter the
    /// coordinator's credential operations from inside the closure.
    pub fn with_secret<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        self.credentials
            .lock()
            .expect("credentials mutex poisoned")
            .with_secret(f)
    }

    /// Binds the time budget from session configuration.
    ///
    /// Reads [`TIMEOUT_PROPERTY`] as signed milliseconds; a missing or
    /// non-positive value falls back to [`DEFAULT_HANDSHAKE_TIMEOUT`] and is
    /// recovered silently. Must be called once before the driver consults the
    /// budget; calling it again simply rebinds. The checkpoint is left
    /// untouched.
    pub fn initialize(&self, config: &impl SessionConfig) {
        let configured = config.long_property(TIMEOUT_PROPERTY);
        let mut budget = self.budget.lock().expect("budget mutex poisoned");
        budget.rebind_millis(configured);
        tracing::debug!(
            target: HANDSHAKE_TARGET,
            proxy = %self.proxy,
            budget = ?budget.remaining(),
            "handshake budget bound"
        );
    }

    /// Returns the remaining time budget, always greater than zero.
    ///
    /// Charges the wall-clock time elapsed since the previous consultation
    /// against the budget and persists the result, so the budget shrinks
    /// across the handshake's discrete network operations. An exhausted
    /// budget clamps to [`HANDSHAKE_GRACE_FLOOR`]; detecting that as a
    /// timeout and calling [`complete`] with `success = false` is the
    /// driver's policy.
    ///
    /// [`complete`]: HandshakeCoordinator::complete
    pub fn remaining_time(&self) -> Duration {
        let remaining = self
            .budget
            .lock()
            .expect("budget mutex poisoned")
            .consume(Instant::now());
        if remaining == HANDSHAKE_GRACE_FLOOR {
            tracing::debug!(
                target: HANDSHAKE_TARGET,
                proxy = %self.proxy,
                "handshake budget exhausted, reporting grace floor"
            );
        } else {
            tracing::trace!(
                target: HANDSHAKE_TARGET,
                remaining = ?remaining,
                "handshake budget consulted"
            );
        }
        remaining
    }

    /// Re-bases the budget checkpoint to now without charging the elapsed
    /// interval.
    ///
    /// Used when time is known to have been spent on something that should
    /// not count against the handshake, such as an interactive credential
    /// prompt. Callable at any point before completion.
    pub fn exclude_elapsed_time(&self) {
        self.budget
            .lock()
            .expect("budget mutex poisoned")
            .rebase(Instant::now());
        tracing::trace!(target: HANDSHAKE_TARGET, "handshake budget checkpoint re-based");
    }

    /// Installs the one-shot hook invoked when the handshake completes.
    ///
    /// The hook detaches the coordinator from whatever event source fed it.
    /// It runs at most once across any number of [`complete`] calls, outside
    /// every coordinator lock. Installing a second hook replaces an
    /// uninvoked first one.
    ///
    /// [`complete`]: HandshakeCoordinator::complete
    pub fn set_unregister_hook(
        &self,
        hook: impl FnOnce() -> Result<(), ActionError> + Send + 'static,
    ) {
        let mut slot = self.unregister.lock().expect("unregister mutex poisoned");
        *slot = Some(Box::new(hook));
    }

    /// Runs `action` now if the handshake has completed, otherwise queues it.
    ///
    /// A queued action is released by [`complete`]: invoked in submission
    /// order on success, discarded on failure. An action submitted after
    /// completion runs synchronously on the calling thread regardless of the
    /// outcome, and its error is surfaced to this caller. Every submitted
    /// action is invoked at most once, ever.
    ///
    /// [`complete`]: HandshakeCoordinator::complete
    pub fn run_when_ready(
        &self,
        action: impl FnOnce() -> Result<(), ActionError> + Send + 'static,
    ) -> Result<(), HandshakeError> {
        {
            let mut gate = self.gate.lock().expect("completion mutex poisoned");
            if let CompletionState::Pending(queue) = &mut *gate {
                queue.push(Box::new(action));
                tracing::trace!(
                    target: HANDSHAKE_TARGET,
                    queued = queue.len(),
                    "action deferred until handshake completes"
                );
                return Ok(());
            }
        }
        action().map_err(HandshakeError::DeferredAction)
    }

    /// Records the handshake outcome and releases all dependent state.
    ///
    /// Fires the unregister hook (at most once across double completion,
    /// outside every lock since it may call back into the coordinator), then
    /// closes the completion gate and captures the deferred queue. On success
    /// the captured actions run in submission order; on failure they are
    /// discarded so no dependent work proceeds over a dead tunnel. The
    /// credential secret is retired on both outcomes.
    ///
    /// A failing hook or action does not stop the remaining actions; the
    /// first error is surfaced after all of them have been attempted. A
    /// second call finds the hook slot empty and the queue gone and returns
    /// `Ok`.
    pub fn complete(&self, success: bool) -> Result<(), HandshakeError> {
        let hook = self
            .unregister
            .lock()
            .expect("unregister mutex poisoned")
            .take();
        let mut first_error = None;
        if let Some(hook) = hook {
            if let Err(source) = hook() {
                first_error = Some(HandshakeError::Unregister(source));
            }
        }

        let captured = {
            let mut gate = self.gate.lock().expect("completion mutex poisoned");
            self.done.store(true, Ordering::Release);
            match std::mem::replace(&mut *gate, CompletionState::Complete) {
                CompletionState::Pending(queue) => queue,
                CompletionState::Complete => Vec::new(),
            }
        };

        tracing::debug!(
            target: HANDSHAKE_TARGET,
            proxy = %self.proxy,
            target_host = %self.target,
            success,
            released = captured.len(),
            "handshake completed"
        );

        if success {
            for action in captured {
                if let Err(source) = action() {
                    first_error.get_or_insert(HandshakeError::DeferredAction(source));
                }
            }
        }

        self.clear_secret();

        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Overwrites the credential secret with zeros and drops it.
    ///
    /// Invoked automatically by [`complete`]; also available to the driver
    /// once it has sent its last authentication message. Idempotent, and safe
    /// when no secret was ever set.
    ///
    /// [`complete`]: HandshakeCoordinator::complete
    pub fn clear_secret(&self) {
        self.credentials
            .lock()
            .expect("credentials mutex poisoned")
            .clear();
    }

    /// Returns whether the handshake has completed, without blocking.
    ///
    /// Carries no happens-before guarantee that the deferred actions have
    /// run; callers needing that ordering submit through
    /// [`run_when_ready`](HandshakeCoordinator::run_when_ready) instead of
    /// polling.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for HandshakeCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandshakeCoordinator")
            .field("proxy", &self.proxy)
            .field("target", &self.target)
            .field("done", &self.is_done())
            .finish_non_exhaustive()
    }
}
