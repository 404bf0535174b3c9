//! Scriptable wallet and ledger doubles shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chain_sol::{Address, Signature, LAMPORTS_PER_SOL};
use dashboard_core::{
    ConnectError, DashboardConfig, SessionController, SignError, TransferRequest, WalletAdapter,
};
use sol_rpc::{Commitment, LedgerClient, LedgerError};
use tokio::sync::Notify;

pub fn sol(amount: f64) -> u64 {
    (amount * LAMPORTS_PER_SOL as f64) as u64
}

pub fn random_address() -> Address {
    Address::new(rand::random())
}

/// Holds a mocked call until `notify_one` is called.
pub fn gate() -> Arc<Notify> {
    Arc::new(Notify::new())
}

/// Yield to spawned tasks until `done` holds.
pub async fn until(mut done: impl FnMut() -> bool) {
    while !done() {
        tokio::task::yield_now().await;
    }
}

async fn pass(gate: &Mutex<Option<Arc<Notify>>>) {
    let held = gate.lock().unwrap().take();
    if let Some(held) = held {
        held.notified().await;
    }
}

// ─── Ledger ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmBehavior {
    Confirm,
    /// Never resolves.
    Hang,
    FailOnChain,
}

pub struct MockLedger {
    balances: Mutex<HashMap<Address, u64>>,
    /// Balances applied when a transaction is submitted.
    after_submit: Mutex<Vec<(Address, u64)>>,
    confirm: Mutex<ConfirmBehavior>,
    balance_gate: Mutex<Option<Arc<Notify>>>,
    confirm_gate: Mutex<Option<Arc<Notify>>>,
    pub balance_fails: AtomicBool,
    pub reachable: AtomicBool,
    pub balance_queries: AtomicUsize,
    pub submissions: AtomicUsize,
}

impl MockLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            balances: Mutex::new(HashMap::new()),
            after_submit: Mutex::new(Vec::new()),
            confirm: Mutex::new(ConfirmBehavior::Confirm),
            balance_gate: Mutex::new(None),
            confirm_gate: Mutex::new(None),
            balance_fails: AtomicBool::new(false),
            reachable: AtomicBool::new(true),
            balance_queries: AtomicUsize::new(0),
            submissions: AtomicUsize::new(0),
        })
    }

    pub fn set_balance(&self, address: Address, lamports: u64) {
        self.balances.lock().unwrap().insert(address, lamports);
    }

    pub fn on_submit_set_balance(&self, address: Address, lamports: u64) {
        self.after_submit.lock().unwrap().push((address, lamports));
    }

    pub fn set_confirm(&self, behavior: ConfirmBehavior) {
        *self.confirm.lock().unwrap() = behavior;
    }

    /// Hold the next balance query on `gate`.
    pub fn hold_next_balance(&self, gate: Arc<Notify>) {
        *self.balance_gate.lock().unwrap() = Some(gate);
    }

    /// Hold the next confirmation on `gate`.
    pub fn hold_next_confirm(&self, gate: Arc<Notify>) {
        *self.confirm_gate.lock().unwrap() = Some(gate);
    }

    pub fn balance_queries(&self) -> usize {
        self.balance_queries.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn get_balance(&self, address: &Address) -> Result<u64, LedgerError> {
        self.balance_queries.fetch_add(1, Ordering::SeqCst);
        pass(&self.balance_gate).await;
        if self.balance_fails.load(Ordering::SeqCst) {
            return Err(LedgerError::Rpc {
                code: -32005,
                message: "node is behind".into(),
            });
        }
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(address)
            .copied()
            .unwrap_or(0))
    }

    async fn latest_blockhash(&self) -> Result<[u8; 32], LedgerError> {
        Ok([7; 32])
    }

    async fn submit(&self, _signed_transaction: &[u8]) -> Result<Signature, LedgerError> {
        let n = self.submissions.fetch_add(1, Ordering::SeqCst) + 1;
        let updates: Vec<_> = self.after_submit.lock().unwrap().drain(..).collect();
        for (address, lamports) in updates {
            self.set_balance(address, lamports);
        }
        Ok(Signature::new([n as u8; 64]))
    }

    async fn confirm(&self, signature: &Signature, _: Commitment) -> Result<(), LedgerError> {
        pass(&self.confirm_gate).await;
        let behavior = *self.confirm.lock().unwrap();
        match behavior {
            ConfirmBehavior::Confirm => Ok(()),
            ConfirmBehavior::Hang => std::future::pending().await,
            ConfirmBehavior::FailOnChain => Err(LedgerError::TransactionFailed {
                signature: *signature,
                reason: "custom program error: 0x1".into(),
            }),
        }
    }

    async fn ping(&self) -> Result<(), LedgerError> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(LedgerError::MissingResult("getVersion".into()))
        }
    }
}

// ─── Wallet ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectBehavior {
    Approve,
    NotReady,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignBehavior {
    Submit,
    Reject,
    Fail,
}

pub struct MockWallet {
    pub account: Address,
    installed: bool,
    connect: Mutex<ConnectBehavior>,
    sign: Mutex<SignBehavior>,
    /// One gate per upcoming connection request, consumed in order.
    connect_gates: Mutex<VecDeque<Arc<Notify>>>,
    /// Whether the adapter currently holds an approved connection.
    pub connected: AtomicBool,
    pub requests: Mutex<Vec<TransferRequest>>,
    pub connect_calls: AtomicUsize,
    pub disconnect_calls: AtomicUsize,
}

impl MockWallet {
    pub fn new() -> Arc<Self> {
        Self::build(true)
    }

    pub fn not_installed() -> Arc<Self> {
        Self::build(false)
    }

    fn build(installed: bool) -> Arc<Self> {
        Arc::new(Self {
            account: random_address(),
            installed,
            connect: Mutex::new(ConnectBehavior::Approve),
            sign: Mutex::new(SignBehavior::Submit),
            connect_gates: Mutex::new(VecDeque::new()),
            connected: AtomicBool::new(false),
            requests: Mutex::new(Vec::new()),
            connect_calls: AtomicUsize::new(0),
            disconnect_calls: AtomicUsize::new(0),
        })
    }

    pub fn set_connect(&self, behavior: ConnectBehavior) {
        *self.connect.lock().unwrap() = behavior;
    }

    pub fn set_sign(&self, behavior: SignBehavior) {
        *self.sign.lock().unwrap() = behavior;
    }

    /// Hold the next connection request on `gate`. Queued gates are used in
    /// call order.
    pub fn hold_next_connect(&self, gate: Arc<Notify>) {
        self.connect_gates.lock().unwrap().push_back(gate);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    pub fn sign_calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<TransferRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl WalletAdapter for MockWallet {
    fn is_available(&self) -> bool {
        self.installed
    }

    async fn request_connection(&self) -> Result<Address, ConnectError> {
        let held = self.connect_gates.lock().unwrap().pop_front();
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(held) = held {
            held.notified().await;
        }
        let behavior = *self.connect.lock().unwrap();
        match behavior {
            ConnectBehavior::Approve => {
                self.connected.store(true, Ordering::SeqCst);
                Ok(self.account)
            }
            ConnectBehavior::NotReady => Err(ConnectError::NotReady("wallet locked".into())),
            ConnectBehavior::Reject => Err(ConnectError::Rejected("user closed the popup".into())),
        }
    }

    async fn sign_and_submit(
        &self,
        request: &TransferRequest,
        ledger: &dyn LedgerClient,
    ) -> Result<Signature, SignError> {
        self.requests.lock().unwrap().push(request.clone());
        if !self.is_connected() {
            return Err(SignError::SigningFailed("wallet is not connected".into()));
        }
        let behavior = *self.sign.lock().unwrap();
        match behavior {
            SignBehavior::Submit => Ok(ledger.submit(&request.instruction.data).await?),
            SignBehavior::Reject => Err(SignError::UserRejected),
            SignBehavior::Fail => Err(SignError::SigningFailed("device error".into())),
        }
    }

    async fn disconnect(&self) {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);
    }
}

// ─── Fixtures ────────────────────────────────────────────────────────

pub struct Harness {
    pub controller: SessionController,
    pub wallet: Arc<MockWallet>,
    pub ledger: Arc<MockLedger>,
}

pub fn harness() -> Harness {
    harness_with(DashboardConfig::default(), MockWallet::new())
}

pub fn harness_with(config: DashboardConfig, wallet: Arc<MockWallet>) -> Harness {
    let ledger = MockLedger::new();
    let controller = SessionController::new(&config, wallet.clone(), ledger.clone());
    Harness {
        controller,
        wallet,
        ledger,
    }
}

/// A harness already connected with `balance` lamports.
pub async fn connected(balance: u64) -> Harness {
    let h = harness();
    h.ledger.set_balance(h.wallet.account, balance);
    h.controller.connect().await.unwrap();
    h
}
