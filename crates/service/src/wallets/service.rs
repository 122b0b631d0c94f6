use std::sync::Arc;

use chrono::Utc;
use models::{wallet, wallet_transaction};
use models::wallet_transaction::{NewEntry, TxnKind};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::ledger::{self, Balances, LedgerError};
use crate::errors::ServiceError;
use crate::pagination::Pagination;
use crate::payments::gateway::{CreateIntent, GatewayError, IntentStatus, PaymentGateway};
use crate::users::get_user;

/// `type` metadata stamped on intents that may only fund a wallet.
pub const TOPUP_INTENT_TYPE: &str = "wallet_topup";

#[derive(Clone, Debug, Serialize)]
pub struct WalletBalance {
    pub user_id: Uuid,
    pub balance_cents: i64,
    pub total_added_cents: i64,
    pub total_spent_cents: i64,
    pub total_refunded_cents: i64,
}

impl From<&wallet::Model> for WalletBalance {
    fn from(w: &wallet::Model) -> Self {
        Self {
            user_id: w.user_id,
            balance_cents: w.balance_cents,
            total_added_cents: w.total_added_cents,
            total_spent_cents: w.total_spent_cents,
            total_refunded_cents: w.total_refunded_cents,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct WalletSummary {
    #[serde(flatten)]
    pub balance: WalletBalance,
    pub transactions: Vec<wallet_transaction::Model>,
    pub transaction_count: u64,
    pub created_at: sea_orm::prelude::DateTimeWithTimeZone,
}

#[derive(Clone, Debug, Serialize)]
pub struct TransactionList {
    pub user_id: Uuid,
    pub transactions: Vec<wallet_transaction::Model>,
    pub total_transactions: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct TopupIntent {
    pub client_secret: Option<String>,
    pub payment_intent_id: String,
    pub amount_cents: i64,
    pub currency: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct WalletMovement {
    pub wallet: WalletBalance,
    pub transaction: wallet_transaction::Model,
}

#[derive(Clone, Debug, Serialize)]
pub struct Withdrawal {
    pub payout_id: String,
    pub wallet: WalletBalance,
    pub transaction: wallet_transaction::Model,
}

/// One ledger entry to post against a locked wallet.
#[derive(Clone, Debug)]
pub struct Posting {
    pub kind: TxnKind,
    pub amount_cents: i64,
    pub description: String,
    pub related_payment_id: Option<Uuid>,
    pub reference: Option<String>,
}

impl Posting {
    pub fn new(kind: TxnKind, amount_cents: i64, description: impl Into<String>) -> Self {
        Self { kind, amount_cents, description: description.into(), related_payment_id: None, reference: None }
    }

    pub fn for_payment(mut self, payment_id: Uuid) -> Self {
        self.related_payment_id = Some(payment_id);
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

fn ledger_error(e: LedgerError) -> ServiceError {
    match e {
        LedgerError::Insufficient { available_cents, required_cents } => {
            ServiceError::InsufficientFunds { available_cents, required_cents }
        }
        LedgerError::NonPositiveAmount(a) => ServiceError::Validation(format!("amount must be positive, got {}", a)),
        LedgerError::Overflow => ServiceError::Validation("amount too large".into()),
    }
}

/// Insert an empty wallet unless the user already has one.
async fn ensure_wallet<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<(), ServiceError> {
    let now = Utc::now().into();
    let am = wallet::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        balance_cents: Set(0),
        total_added_cents: Set(0),
        total_spent_cents: Set(0),
        total_refunded_cents: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
    };
    wallet::Entity::insert(am)
        .on_conflict(OnConflict::column(wallet::Column::UserId).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Fetch the user's wallet, creating an empty one on first access.
pub async fn get_or_create<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<wallet::Model, ServiceError> {
    if let Some(w) = wallet::Entity::find().filter(wallet::Column::UserId.eq(user_id)).one(db).await? {
        return Ok(w);
    }
    ensure_wallet(db, user_id).await?;
    wallet::Entity::find()
        .filter(wallet::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("wallet"))
}

/// `SELECT ... FOR UPDATE` on the user's wallet. Call inside a transaction.
pub async fn lock_wallet<C: ConnectionTrait>(txn: &C, user_id: Uuid) -> Result<wallet::Model, ServiceError> {
    ensure_wallet(txn, user_id).await?;
    wallet::Entity::find()
        .filter(wallet::Column::UserId.eq(user_id))
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("wallet"))
}

/// Lock several wallets in ascending user-id order, so transactions that
/// touch overlapping wallets always queue on the same row first.
pub async fn lock_wallets<C: ConnectionTrait>(txn: &C, user_ids: &[Uuid]) -> Result<Vec<wallet::Model>, ServiceError> {
    let mut ids = user_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    let mut locked = Vec::with_capacity(ids.len());
    for id in ids {
        locked.push(lock_wallet(txn, id).await?);
    }
    Ok(locked)
}

/// Apply one posting to a wallet row already locked by the caller and append
/// the matching ledger entry.
#[instrument(skip(txn, locked, posting), fields(wallet_id = %locked.id, kind = posting.kind.as_str(), amount = posting.amount_cents))]
pub async fn post<C: ConnectionTrait>(
    txn: &C,
    locked: wallet::Model,
    posting: Posting,
) -> Result<(wallet::Model, wallet_transaction::Model), ServiceError> {
    let next = ledger::apply(Balances::from(&locked), posting.kind, posting.amount_cents).map_err(ledger_error)?;
    let wallet_id = locked.id;
    let user_id = locked.user_id;
    let mut am: wallet::ActiveModel = locked.into();
    am.balance_cents = Set(next.balance_cents);
    am.total_added_cents = Set(next.total_added_cents);
    am.total_spent_cents = Set(next.total_spent_cents);
    am.total_refunded_cents = Set(next.total_refunded_cents);
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(txn).await?;

    let entry = wallet_transaction::append(
        txn,
        NewEntry {
            wallet_id,
            kind: posting.kind,
            amount_cents: posting.amount_cents,
            description: posting.description,
            related_payment_id: posting.related_payment_id,
            reference: posting.reference,
            balance_after_cents: next.balance_cents,
        },
    )
    .await?;

    common::metrics::record_wallet_op(posting.kind.as_str());
    let event = match posting.kind {
        TxnKind::Credit => "wallet_credited",
        TxnKind::Debit => "wallet_debited",
        TxnKind::Refund => "wallet_refunded",
    };
    info!(%user_id, %wallet_id, balance_after = next.balance_cents, "{}", event);
    Ok((updated, entry))
}

/// Wallet operations that touch the payment gateway.
#[derive(Clone)]
pub struct WalletService {
    db: DatabaseConnection,
    gateway: Arc<dyn PaymentGateway>,
    currency: String,
}

impl WalletService {
    pub fn new(db: DatabaseConnection, gateway: Arc<dyn PaymentGateway>, currency: &str) -> Self {
        Self { db, gateway, currency: currency.to_string() }
    }

    pub async fn balance(&self, user_id: Uuid) -> Result<WalletBalance, ServiceError> {
        get_user(&self.db, user_id).await?;
        let w = get_or_create(&self.db, user_id).await?;
        Ok(WalletBalance::from(&w))
    }

    /// Balance, totals and one newest-first page of ledger entries.
    pub async fn summary(&self, user_id: Uuid, page: Pagination) -> Result<WalletSummary, ServiceError> {
        get_user(&self.db, user_id).await?;
        let w = get_or_create(&self.db, user_id).await?;
        let base = wallet_transaction::Entity::find().filter(wallet_transaction::Column::WalletId.eq(w.id));
        let transaction_count = base.clone().count(&self.db).await?;
        let transactions = base
            .order_by_desc(wallet_transaction::Column::CreatedAt)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await?;
        Ok(WalletSummary { balance: WalletBalance::from(&w), transactions, transaction_count, created_at: w.created_at })
    }

    pub async fn transactions(&self, user_id: Uuid, kind: Option<TxnKind>, limit: u64) -> Result<TransactionList, ServiceError> {
        get_user(&self.db, user_id).await?;
        let w = get_or_create(&self.db, user_id).await?;
        let mut q = wallet_transaction::Entity::find().filter(wallet_transaction::Column::WalletId.eq(w.id));
        if let Some(k) = kind {
            q = q.filter(wallet_transaction::Column::Kind.eq(k));
        }
        let total_transactions = q.clone().count(&self.db).await?;
        let transactions = q
            .order_by_desc(wallet_transaction::Column::CreatedAt)
            .limit(limit.clamp(1, crate::pagination::MAX_PER_PAGE))
            .all(&self.db)
            .await?;
        Ok(TransactionList { user_id, transactions, total_transactions })
    }

    /// Create a gateway intent the client confirms before calling [`Self::add_money`].
    #[instrument(skip(self))]
    pub async fn topup_intent(&self, user_id: Uuid, amount_cents: i64) -> Result<TopupIntent, ServiceError> {
        if amount_cents <= 0 {
            return Err(ServiceError::Validation("Invalid amount or user_id".into()));
        }
        get_user(&self.db, user_id).await?;
        let intent = self
            .gateway
            .create_intent(CreateIntent {
                amount_cents,
                currency: self.currency.clone(),
                metadata: vec![("user_id".into(), user_id.to_string()), ("type".into(), TOPUP_INTENT_TYPE.into())],
            })
            .await?;
        info!(%user_id, intent_id = %intent.id, amount_cents, "wallet_topup_intent_created");
        Ok(TopupIntent {
            client_secret: intent.client_secret,
            payment_intent_id: intent.id,
            amount_cents,
            currency: self.currency.clone(),
        })
    }

    /// Credit a confirmed top-up. Each intent can be applied once.
    #[instrument(skip(self))]
    pub async fn add_money(&self, user_id: Uuid, amount_cents: i64, payment_intent_id: &str) -> Result<WalletMovement, ServiceError> {
        if amount_cents <= 0 {
            return Err(ServiceError::Validation("Invalid amount or user_id".into()));
        }
        if payment_intent_id.trim().is_empty() {
            return Err(ServiceError::Validation("payment_intent_id required".into()));
        }
        get_user(&self.db, user_id).await?;
        let intent = match self.gateway.retrieve_intent(payment_intent_id).await {
            Ok(i) => i,
            Err(GatewayError::NotFound(_)) => return Err(ServiceError::Validation("unknown payment intent".into())),
            Err(e) => return Err(e.into()),
        };
        if intent.status != IntentStatus::Succeeded {
            return Err(ServiceError::Validation("Payment not completed".into()));
        }
        if intent.amount_cents != amount_cents {
            return Err(ServiceError::Validation(format!(
                "amount mismatch: intent is {} cents, request is {}",
                intent.amount_cents, amount_cents
            )));
        }
        if intent.metadata.get("type").map(String::as_str) != Some(TOPUP_INTENT_TYPE) {
            return Err(ServiceError::Validation("payment intent is not a wallet top-up".into()));
        }
        if intent.metadata.get("user_id") != Some(&user_id.to_string()) {
            return Err(ServiceError::Validation("payment intent belongs to another user".into()));
        }

        let txn = self.db.begin().await?;
        // look for an earlier credit only once the wallet is ours; the unique
        // reference key still turns any race left into a conflict
        let locked = lock_wallet(&txn, user_id).await?;
        let already = wallet_transaction::Entity::find()
            .filter(wallet_transaction::Column::Reference.eq(payment_intent_id))
            .one(&txn)
            .await?;
        if already.is_some() {
            return Err(ServiceError::Conflict("payment intent already applied".into()));
        }
        let (w, entry) = post(
            &txn,
            locked,
            Posting::new(TxnKind::Credit, amount_cents, "Added money to wallet").with_reference(payment_intent_id),
        )
        .await?;
        txn.commit().await?;
        Ok(WalletMovement { wallet: WalletBalance::from(&w), transaction: entry })
    }

    /// Pay out to a bank account. The wallet row stays locked across the
    /// gateway call; a refused payout leaves the balance untouched.
    #[instrument(skip(self, bank_account_token))]
    pub async fn withdraw(&self, user_id: Uuid, amount_cents: i64, bank_account_token: &str) -> Result<Withdrawal, ServiceError> {
        if amount_cents <= 0 {
            return Err(ServiceError::Validation("Invalid amount or user_id".into()));
        }
        if bank_account_token.trim().is_empty() {
            return Err(ServiceError::Validation("bank_account_token required".into()));
        }
        get_user(&self.db, user_id).await?;

        let txn = self.db.begin().await?;
        let locked = lock_wallet(&txn, user_id).await?;
        if locked.balance_cents < amount_cents {
            return Err(ServiceError::InsufficientFunds { available_cents: locked.balance_cents, required_cents: amount_cents });
        }
        let payout = match self.gateway.payout(amount_cents, &self.currency, bank_account_token).await {
            Ok(p) => p,
            Err(e) => {
                warn!(%user_id, error = %e, "wallet_withdraw_payout_failed");
                txn.rollback().await?;
                return Err(ServiceError::Validation(format!("bank transfer failed: {}", e)));
            }
        };
        let (w, entry) = post(
            &txn,
            locked,
            Posting::new(TxnKind::Debit, amount_cents, "Withdrawal to bank account").with_reference(payout.id.clone()),
        )
        .await?;
        txn.commit().await?;
        info!(%user_id, payout_id = %payout.id, amount_cents, "wallet_withdrawn");
        Ok(Withdrawal { payout_id: payout.id, wallet: WalletBalance::from(&w), transaction: entry })
    }
}
