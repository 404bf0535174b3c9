//! Session state machine.
//!
//! ```text
//! Disconnected ──connect()──▶ Connecting ──ok──▶ Connected
//!      ▲                          │                  │
//!      └──── wallet failure ──────┘                  │
//!      └──────────────── disconnect() ───────────────┘
//! ```
//!
//! Failures surface as a [`TransientError`] next to the status, cleared
//! after the configured display time or by [`SessionController::dismiss_error`].

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use chain_sol::Address;
use sol_rpc::{Commitment, LedgerClient};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Instant};
use tracing::{debug, info, warn};

use crate::amount::{parse_sol_amount, WithdrawAmount};
use crate::config::{DashboardConfig, Destination};
use crate::error::{ConnectError, SessionError, TransferFailure};
use crate::poller::Poller;
use crate::session::{ConnectionStatus, Session, TransientError};
use crate::transfer::{PendingOperation, TransferKind, TransferReceipt, TransferRequest};
use crate::vault::VaultAddressResolver;
use crate::wallet::WalletAdapter;

/// Handle to one wallet session. Clones share the same session.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

struct Inner {
    wallet: Arc<dyn WalletAdapter>,
    ledger: Arc<dyn LedgerClient>,
    vault: VaultAddressResolver,
    destination: Destination,
    commitment: Commitment,
    poll_interval: Duration,
    confirm_timeout: Duration,
    error_display: Duration,

    state: watch::Sender<Session>,
    /// Bumped under the state lock by every connect claim and disconnect.
    /// A connect attempt commits only while its epoch is current.
    connect_epoch: AtomicU64,
    operation_in_flight: AtomicBool,
    poller: Poller,
    error_generation: AtomicU64,
    error_expiry: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(task) = self
            .error_expiry
            .get_mut()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            task.abort();
        }
    }
}

/// Held for the duration of a deposit or withdrawal. Dropping it clears the
/// pending operation and frees the slot, whichever way the operation ended.
struct OperationGuard<'a> {
    inner: &'a Inner,
}

impl<'a> OperationGuard<'a> {
    fn acquire(inner: &'a Inner) -> Result<Self, SessionError> {
        inner
            .operation_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SessionError::OperationInProgress)?;
        Ok(Self { inner })
    }
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.inner
            .state
            .send_if_modified(|s| s.pending.take().is_some());
        self.inner.operation_in_flight.store(false, Ordering::Release);
    }
}

impl SessionController {
    pub fn new(
        config: &DashboardConfig,
        wallet: Arc<dyn WalletAdapter>,
        ledger: Arc<dyn LedgerClient>,
    ) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self {
            inner: Arc::new(Inner {
                wallet,
                ledger,
                vault: VaultAddressResolver::from_config(config),
                destination: config.destination.clone(),
                commitment: config.commitment,
                poll_interval: config.poll_interval(),
                confirm_timeout: config.confirm_timeout(),
                error_display: config.error_display(),
                state,
                connect_epoch: AtomicU64::new(0),
                operation_in_flight: AtomicBool::new(false),
                poller: Poller::default(),
                error_generation: AtomicU64::new(0),
                error_expiry: Mutex::new(None),
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    pub fn vault(&self) -> &VaultAddressResolver {
        &self.inner.vault
    }

    // ─── Connection lifecycle ────────────────────────────────────────

    /// Connect the wallet, fetch the balance once and start polling.
    pub async fn connect(&self) -> Result<Address, SessionError> {
        let mut current = ConnectionStatus::Disconnected;
        let mut epoch = 0;
        let claimed = self.inner.state.send_if_modified(|s| {
            current = s.status;
            if s.status == ConnectionStatus::Disconnected {
                s.status = ConnectionStatus::Connecting;
                epoch = self.inner.connect_epoch.fetch_add(1, Ordering::AcqRel) + 1;
                true
            } else {
                false
            }
        });
        if !claimed {
            return Err(SessionError::InvalidState(current));
        }
        info!(epoch, "connecting wallet");

        if !self.inner.wallet.is_available() {
            self.abandon_connecting(epoch);
            return Err(self.surface(SessionError::WalletNotInstalled));
        }

        let account = match self.inner.wallet.request_connection().await {
            Ok(account) => account,
            Err(err) => {
                if !self.abandon_connecting(epoch) {
                    return Err(SessionError::InvalidState(self.inner.state.borrow().status));
                }
                return Err(self.surface(match err {
                    ConnectError::NotReady(reason) => SessionError::WalletNotReady(reason),
                    ConnectError::Rejected(reason) => SessionError::WalletConnectFailed(reason),
                }));
            }
        };

        let mut current = ConnectionStatus::Disconnected;
        let connected = self.inner.state.send_if_modified(|s| {
            current = s.status;
            if s.status != ConnectionStatus::Connecting
                || self.inner.connect_epoch.load(Ordering::Acquire) != epoch
            {
                return false;
            }
            s.status = ConnectionStatus::Connected;
            s.account = Some(account);
            s.balance_lamports = 0;
            true
        });
        if !connected {
            // Superseded by disconnect(). A newer attempt owns the wallet
            // unless the session went back to Disconnected.
            debug!(epoch, status = ?current, "discarding stale wallet approval");
            if current == ConnectionStatus::Disconnected {
                self.inner.wallet.disconnect().await;
            }
            return Err(SessionError::InvalidState(current));
        }
        info!(%account, "wallet connected");

        if let Err(err) = self.refresh_balance().await {
            debug!(?err, "initial balance fetch failed");
        }
        self.start_balance_polling();
        Ok(account)
    }

    /// Drop the session back to `Disconnected`. Safe to call in any state.
    pub async fn disconnect(&self) -> Result<(), SessionError> {
        self.inner.poller.stop();
        let mut had_account = false;
        self.inner.state.send_if_modified(|s| {
            self.inner.connect_epoch.fetch_add(1, Ordering::AcqRel);
            had_account = s.account.is_some();
            let changed = had_account
                || s.status != ConnectionStatus::Disconnected
                || s.balance_lamports != 0;
            s.status = ConnectionStatus::Disconnected;
            s.account = None;
            s.balance_lamports = 0;
            changed
        });
        self.inner.wallet.disconnect().await;
        if had_account {
            info!("wallet disconnected");
        }
        Ok(())
    }

    /// Revert this attempt's `Connecting` claim. Returns false when a
    /// disconnect or a newer attempt already moved the session on.
    fn abandon_connecting(&self, epoch: u64) -> bool {
        self.inner.state.send_if_modified(|s| {
            if s.status == ConnectionStatus::Connecting
                && self.inner.connect_epoch.load(Ordering::Acquire) == epoch
            {
                s.status = ConnectionStatus::Disconnected;
                true
            } else {
                false
            }
        })
    }

    fn connected_account(&self) -> Result<Address, SessionError> {
        let session = self.inner.state.borrow();
        match (session.status, session.account) {
            (ConnectionStatus::Connected, Some(account)) => Ok(account),
            _ => Err(SessionError::NotConnected),
        }
    }

    // ─── Balance ─────────────────────────────────────────────────────

    /// Query the ledger for the connected account's balance.
    pub async fn refresh_balance(&self) -> Result<u64, SessionError> {
        let account = self.connected_account()?;
        let lamports = match self.inner.ledger.get_balance(&account).await {
            Ok(lamports) => lamports,
            Err(err) => {
                // a poll that outlived disconnect() has nothing to report
                if self.inner.state.borrow().account != Some(account) {
                    return Err(SessionError::NotConnected);
                }
                return Err(self.surface(SessionError::BalanceFetchFailed(err)));
            }
        };

        let mut still_connected = false;
        self.inner.state.send_if_modified(|s| {
            still_connected = s.account == Some(account);
            if still_connected && s.balance_lamports != lamports {
                s.balance_lamports = lamports;
                true
            } else {
                false
            }
        });
        if !still_connected {
            return Err(SessionError::NotConnected);
        }
        debug!(%account, lamports, "balance updated");
        Ok(lamports)
    }

    fn start_balance_polling(&self) {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        self.inner.poller.start(self.inner.poll_interval, move || {
            let weak = weak.clone();
            async move {
                let Some(inner) = weak.upgrade() else {
                    return ControlFlow::Break(());
                };
                let connected = inner.state.borrow().is_connected();
                if !connected {
                    return ControlFlow::Break(());
                }
                let controller = SessionController { inner };
                match controller.refresh_balance().await {
                    Err(SessionError::NotConnected) => ControlFlow::Break(()),
                    _ => ControlFlow::Continue(()),
                }
            }
        });
    }

    // ─── Transfers ───────────────────────────────────────────────────

    /// Deposit a decimal SOL amount from the connected account.
    pub async fn deposit(&self, amount: &str) -> Result<TransferReceipt, SessionError> {
        let account = self.connected_account()?;
        let guard = OperationGuard::acquire(&self.inner)?;
        let result = self.transfer(TransferKind::Deposit, account, amount).await;
        drop(guard);
        result.map_err(|cause| self.surface(SessionError::DepositFailed(cause)))
    }

    /// Withdraw a decimal SOL amount, or `all`, back to the connected account.
    pub async fn withdraw(&self, amount: &str) -> Result<TransferReceipt, SessionError> {
        let account = self.connected_account()?;
        let guard = OperationGuard::acquire(&self.inner)?;
        let result = self.transfer(TransferKind::Withdraw, account, amount).await;
        drop(guard);
        result.map_err(|cause| self.surface(SessionError::WithdrawFailed(cause)))
    }

    async fn transfer(
        &self,
        kind: TransferKind,
        account: Address,
        amount: &str,
    ) -> Result<TransferReceipt, TransferFailure> {
        let request = match kind {
            TransferKind::Deposit => self.deposit_request(account, parse_sol_amount(amount)?)?,
            TransferKind::Withdraw => self.withdraw_request(account, amount.parse()?).await?,
        };
        debug!(
            %kind,
            from = %request.from,
            to = %request.to,
            lamports = request.amount_lamports,
            data = %hex::encode(&request.instruction.data),
            "transfer built"
        );

        self.inner.state.send_modify(|s| {
            s.pending = Some(PendingOperation {
                kind,
                request: request.clone(),
                submitted_at: Instant::now(),
            })
        });

        let signature = self
            .inner
            .wallet
            .sign_and_submit(&request, self.inner.ledger.as_ref())
            .await?;
        info!(%kind, %signature, "transaction submitted");

        let waited = self.inner.confirm_timeout;
        match timeout(waited, self.inner.ledger.confirm(&signature, self.inner.commitment)).await {
            Ok(Ok(())) => {}
            Ok(Err(source)) => return Err(TransferFailure::Rejected { signature, source }),
            Err(_) => return Err(TransferFailure::ConfirmationTimeout { signature, waited }),
        }
        info!(
            %kind,
            %signature,
            lamports = request.amount_lamports,
            "transaction confirmed"
        );

        if let Err(err) = self.refresh_balance().await {
            debug!(?err, "post-transfer balance refresh failed");
        }

        Ok(TransferReceipt {
            kind,
            signature,
            amount_lamports: request.amount_lamports,
        })
    }

    fn deposit_request(
        &self,
        account: Address,
        lamports: u64,
    ) -> Result<TransferRequest, TransferFailure> {
        match &self.inner.destination {
            Destination::Vault => {
                let vault = self.inner.vault.resolve()?;
                Ok(TransferRequest::vault_deposit(
                    self.inner.vault.program_id(),
                    account,
                    vault,
                    lamports,
                )?)
            }
            Destination::Agent { address } => {
                Ok(TransferRequest::system_transfer(account, *address, lamports)?)
            }
        }
    }

    async fn withdraw_request(
        &self,
        account: Address,
        amount: WithdrawAmount,
    ) -> Result<TransferRequest, TransferFailure> {
        if let Destination::Agent { .. } = self.inner.destination {
            return Err(TransferFailure::InvalidRequest(
                "withdrawals are only supported from the program vault".into(),
            ));
        }
        let vault = self.inner.vault.resolve()?;
        let lamports = match amount {
            WithdrawAmount::Lamports(lamports) => lamports,
            WithdrawAmount::All => {
                let held = self
                    .inner
                    .ledger
                    .get_balance(&vault)
                    .await
                    .map_err(TransferFailure::VaultBalance)?;
                if held == 0 {
                    return Err(TransferFailure::InvalidRequest("vault is empty".into()));
                }
                held
            }
        };
        Ok(TransferRequest::vault_withdraw(
            self.inner.vault.program_id(),
            account,
            vault,
            lamports,
        )?)
    }

    // ─── Connectivity & errors ───────────────────────────────────────

    /// Probe the ledger endpoint.
    pub async fn check_connectivity(&self) -> Result<(), SessionError> {
        self.inner
            .ledger
            .ping()
            .await
            .map_err(|err| self.surface(SessionError::NetworkUnreachable(err)))
    }

    /// Clear the transient error now instead of waiting for it to expire.
    pub fn dismiss_error(&self) {
        self.inner.error_generation.fetch_add(1, Ordering::AcqRel);
        self.inner.state.send_if_modified(|s| s.error.take().is_some());
    }

    /// Log `err` in full and show its user-facing message. Precondition
    /// errors pass through untouched.
    fn surface(&self, err: SessionError) -> SessionError {
        let Some(kind) = err.kind() else {
            return err;
        };
        warn!(?kind, error = %err, "session error");

        let operation = match &err {
            SessionError::DepositFailed(_) => Some(TransferKind::Deposit),
            SessionError::WithdrawFailed(_) => Some(TransferKind::Withdraw),
            _ => None,
        };
        let generation = self.inner.error_generation.fetch_add(1, Ordering::AcqRel) + 1;
        let transient = TransientError::new(kind, operation, generation);
        self.inner.state.send_modify(|s| s.error = Some(transient));
        self.schedule_error_expiry(generation);
        err
    }

    fn schedule_error_expiry(&self, generation: u64) {
        let weak = Arc::downgrade(&self.inner);
        let delay = self.inner.error_display;
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                inner.state.send_if_modified(|s| match &s.error {
                    Some(e) if e.generation == generation => {
                        s.error = None;
                        true
                    }
                    _ => false,
                });
            }
        });
        let previous = self
            .inner
            .error_expiry
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(task);
        if let Some(previous) = previous {
            previous.abort();
        }
    }
}

