// ── Bridge commissioning ──
//
// Discovery followed by user registration, driven by an explicit bounded
// retry machine. The only suspension points are the bridge calls and the
// fixed wait between registration attempts; both give way to the
// cancellation token. Nothing here writes the credential anywhere: the
// caller commits the result through `CredentialStore`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use nuimo_hue_api::Error as ApiError;

use crate::bridge::{BridgeDiscovery, BridgeRegistrar};
use crate::credential::BridgeCredential;
use crate::error::CommissionError;

/// Device type reported to the bridge when registering.
pub const DEFAULT_APP_DESCRIPTION: &str = "Nuimo Hue controller app";

// ── Retry policy ─────────────────────────────────────────────────────

/// How long to wait for the operator to press the link button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Default: 5.
    pub max_retries: u32,
    /// Fixed wait between attempts. Default: 5s.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

// ── Registration state machine ───────────────────────────────────────

/// State of the registration loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationState {
    Pending { attempts_made: u32 },
    Registered(String),
    TimedOut,
}

/// Attempt bookkeeping for one commissioning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommissioningAttempt {
    pub attempts_made: u32,
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl CommissioningAttempt {
    pub fn new(policy: &RetryPolicy) -> Self {
        Self {
            attempts_made: 0,
            max_attempts: policy.max_attempts(),
            retry_delay: policy.delay,
        }
    }

    /// Fold the outcome of one registration request into the machine.
    pub fn advance(&mut self, outcome: Result<String, ApiError>) -> RegistrationState {
        self.attempts_made += 1;
        match outcome {
            Ok(username) => RegistrationState::Registered(username),
            Err(_) if self.attempts_made >= self.max_attempts => RegistrationState::TimedOut,
            Err(_) => RegistrationState::Pending {
                attempts_made: self.attempts_made,
            },
        }
    }
}

// ── Observable progress ──────────────────────────────────────────────

/// Commissioning progress, observable through [`BridgeCommissioner::state`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommissioningState {
    Idle,
    Discovering,
    /// About to send registration attempt `attempt` of `max_attempts`;
    /// the operator should press the link button now.
    AwaitingLinkButton { attempt: u32, max_attempts: u32 },
    Registered { host: String },
    Failed,
}

// ── Commissioner ─────────────────────────────────────────────────────

/// Turns whatever credential was stored into a usable one.
pub struct BridgeCommissioner {
    discovery: Arc<dyn BridgeDiscovery>,
    registrar: Arc<dyn BridgeRegistrar>,
    policy: RetryPolicy,
    app_description: String,
    cancel: CancellationToken,
    state: watch::Sender<CommissioningState>,
}

impl BridgeCommissioner {
    pub fn new(discovery: Arc<dyn BridgeDiscovery>, registrar: Arc<dyn BridgeRegistrar>) -> Self {
        let (state, _) = watch::channel(CommissioningState::Idle);
        Self {
            discovery,
            registrar,
            policy: RetryPolicy::default(),
            app_description: DEFAULT_APP_DESCRIPTION.into(),
            cancel: CancellationToken::new(),
            state,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_app_description(mut self, description: impl Into<String>) -> Self {
        self.app_description = description.into();
        self
    }

    /// Abort the run (between or during attempts) when `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Subscribe to progress changes.
    pub fn state(&self) -> watch::Receiver<CommissioningState> {
        self.state.subscribe()
    }

    /// Make sure a usable credential exists.
    ///
    /// A fully configured `stored` credential is returned unchanged
    /// without touching the network. A missing host triggers discovery; a
    /// missing username triggers registration with bounded retries. A
    /// stored username is always kept.
    pub async fn ensure_credential(
        &self,
        stored: &BridgeCredential,
    ) -> Result<BridgeCredential, CommissionError> {
        if stored.is_configured() {
            debug!(host = %stored.host, "bridge already commissioned");
            return Ok(stored.clone());
        }

        let result = self.commission(stored).await;
        if result.is_err() {
            self.state.send_replace(CommissioningState::Failed);
        }
        result
    }

    async fn commission(
        &self,
        stored: &BridgeCredential,
    ) -> Result<BridgeCredential, CommissionError> {
        let host = match stored.host() {
            Some(host) => host.to_owned(),
            None => self.discover_host().await?,
        };

        let username = match stored.username() {
            Some(username) => {
                debug!(host = %host, "keeping stored bridge user");
                username.to_owned()
            }
            None => self.register(&host).await?,
        };

        self.state
            .send_replace(CommissioningState::Registered { host: host.clone() });
        Ok(BridgeCredential::new(host, username))
    }

    async fn discover_host(&self) -> Result<String, CommissionError> {
        self.state.send_replace(CommissioningState::Discovering);

        let bridges = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return Err(CommissionError::Cancelled),
            result = self.discovery.discover_bridges() => result.map_err(|e| {
                warn!(error = %e, "bridge discovery failed");
                CommissionError::DiscoveryFailed { reason: e.to_string() }
            })?,
        };

        let Some(first) = bridges.into_iter().next() else {
            return Err(CommissionError::NoBridgeFound);
        };

        info!(bridge_id = %first.id, host = %first.host(), "discovered bridge");
        Ok(first.host().to_owned())
    }

    async fn register(&self, host: &str) -> Result<String, CommissionError> {
        let mut attempt = CommissioningAttempt::new(&self.policy);
        let mut state = RegistrationState::Pending { attempts_made: 0 };

        loop {
            match state {
                RegistrationState::Registered(username) => {
                    info!(host, attempts = attempt.attempts_made, "registered bridge user");
                    return Ok(username);
                }
                RegistrationState::TimedOut => {
                    warn!(
                        host,
                        attempts = attempt.attempts_made,
                        "link button was never pressed"
                    );
                    return Err(CommissionError::LinkButtonTimeout {
                        attempts: attempt.attempts_made,
                    });
                }
                RegistrationState::Pending { attempts_made } => {
                    self.prompt(attempts_made + 1);
                    if attempts_made > 0 {
                        self.wait(attempt.retry_delay).await?;
                    }

                    let outcome = tokio::select! {
                        biased;
                        () = self.cancel.cancelled() => return Err(CommissionError::Cancelled),
                        outcome = self.registrar.register_user(host, &self.app_description) => outcome,
                    };
                    if let Err(e) = &outcome {
                        debug!(
                            error = %e,
                            transient = e.is_transient(),
                            attempt = attempt.attempts_made + 1,
                            "registration rejected"
                        );
                    }
                    state = attempt.advance(outcome);
                }
            }
        }
    }

    fn prompt(&self, attempt: u32) {
        self.state.send_replace(CommissioningState::AwaitingLinkButton {
            attempt,
            max_attempts: self.policy.max_attempts(),
        });
    }

    async fn wait(&self, delay: Duration) -> Result<(), CommissionError> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(CommissionError::Cancelled),
            () = tokio::time::sleep(delay) => Ok(()),
        }
    }
}
