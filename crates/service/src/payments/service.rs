use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use models::booking::{self, BookingStatus};
use models::invoice::{self, InvoicePaymentStatus};
use models::payment::{self, NewPayment, PaymentMethod, PaymentStatus};
use models::wallet_transaction::TxnKind;
use models::{service, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::fees;
use super::gateway::{CreateIntent, GatewayError, IntentStatus, PaymentGateway};
use crate::bookings::{self, PartySummary};
use crate::errors::ServiceError;
use crate::wallets::service::{lock_wallet, lock_wallets, post, Posting};

#[derive(Clone, Debug, Serialize)]
pub struct CheckoutIntent {
    pub client_secret: Option<String>,
    pub payment_id: Uuid,
    pub amount_cents: i64,
    pub currency: String,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ServiceSummary {
    pub id: Uuid,
    pub name: String,
    pub price_cents: i64,
}

#[derive(Clone, Debug, Serialize)]
pub struct PaymentView {
    #[serde(flatten)]
    pub payment: payment::Model,
    pub service: Option<ServiceSummary>,
    pub customer: Option<PartySummary>,
    pub provider: Option<PartySummary>,
}

#[derive(Clone, Debug, Serialize)]
pub struct WalletCheckout {
    pub payment: payment::Model,
    pub booking: booking::Model,
    pub remaining_balance_cents: i64,
}

#[derive(Clone)]
pub struct PaymentService {
    db: DatabaseConnection,
    gateway: Arc<dyn PaymentGateway>,
    currency: String,
    fee_bps: u32,
}

/// Booking plus the listing it was made for.
async fn load_booking(txn: &DatabaseTransaction, booking_id: Uuid) -> Result<(booking::Model, service::Model), ServiceError> {
    let b = booking::Entity::find_by_id(booking_id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("booking"))?;
    let s = service::Entity::find_by_id(b.service_id).one(txn).await?.ok_or_else(|| ServiceError::not_found("service"))?;
    Ok((b, s))
}

async fn has_succeeded_payment(txn: &DatabaseTransaction, booking_id: Uuid) -> Result<bool, ServiceError> {
    let found = payment::Entity::find()
        .filter(payment::Column::BookingId.eq(booking_id))
        .filter(payment::Column::Status.eq(PaymentStatus::Succeeded))
        .one(txn)
        .await?;
    Ok(found.is_some())
}

impl PaymentService {
    pub fn new(db: DatabaseConnection, gateway: Arc<dyn PaymentGateway>, currency: &str, fee_bps: u32) -> Self {
        Self { db, gateway, currency: currency.to_string(), fee_bps }
    }

    pub fn gateway_name(&self) -> &'static str { self.gateway.name() }

    /// Open a gateway intent for a pending booking and record a pending payment.
    #[instrument(skip(self))]
    pub async fn create_intent(&self, booking_id: Uuid, method: Option<&str>) -> Result<CheckoutIntent, ServiceError> {
        let method = match method {
            Some(m) => PaymentMethod::from_str(m)?,
            None => PaymentMethod::Card,
        };
        if method == PaymentMethod::Wallet {
            return Err(ServiceError::Validation("use pay-with-wallet for wallet payments".into()));
        }
        let txn = self.db.begin().await?;
        let (b, svc) = load_booking(&txn, booking_id).await?;
        if b.status != BookingStatus::Pending {
            return Err(ServiceError::Validation(format!("booking is {}, expected pending", b.status.as_str())));
        }
        if has_succeeded_payment(&txn, b.id).await? {
            return Err(ServiceError::Conflict("booking already paid".into()));
        }
        if svc.price_cents <= 0 {
            return Err(ServiceError::Validation("service has no price".into()));
        }

        let intent = self
            .gateway
            .create_intent(CreateIntent {
                amount_cents: svc.price_cents,
                currency: self.currency.clone(),
                metadata: vec![
                    ("booking_id".into(), b.id.to_string()),
                    ("payment_method".into(), method.as_str().into()),
                ],
            })
            .await?;

        let split = fees::split(svc.price_cents, self.fee_bps);
        let created = payment::create(
            &txn,
            NewPayment {
                booking_id: b.id,
                customer_id: b.customer_id,
                provider_id: b.provider_id,
                service_id: svc.id,
                amount_cents: split.amount_cents,
                currency: self.currency.clone(),
                stripe_payment_intent_id: Some(intent.id.clone()),
                status: PaymentStatus::Pending,
                payment_method: method,
                description: format!("Payment for {}", svc.name),
                platform_fee_cents: split.platform_fee_cents,
                provider_amount_cents: split.provider_amount_cents,
            },
        )
        .await?;
        txn.commit().await?;
        common::metrics::record_payment(method.as_str(), "created");
        info!(payment_id = %created.id, intent_id = %intent.id, amount_cents = created.amount_cents, "payment_intent_created");
        Ok(CheckoutIntent {
            client_secret: intent.client_secret,
            payment_id: created.id,
            amount_cents: created.amount_cents,
            currency: created.currency,
        })
    }

    /// Settle a card payment once the gateway reports the intent succeeded.
    #[instrument(skip(self))]
    pub async fn confirm(&self, payment_intent_id: &str, payment_id: Uuid) -> Result<payment::Model, ServiceError> {
        let existing = self.get(payment_id).await?;
        if existing.stripe_payment_intent_id.as_deref() != Some(payment_intent_id) {
            return Err(ServiceError::Validation("payment intent does not belong to this payment".into()));
        }
        if existing.status == PaymentStatus::Succeeded {
            return Ok(existing);
        }
        if existing.status != PaymentStatus::Pending {
            return Err(ServiceError::Validation(format!("payment is {:?}, cannot confirm", existing.status)));
        }

        let intent = match self.gateway.retrieve_intent(payment_intent_id).await {
            Ok(i) => i,
            Err(GatewayError::NotFound(_)) => return Err(ServiceError::Validation("unknown payment intent".into())),
            Err(e) => return Err(e.into()),
        };
        if intent.status != IntentStatus::Succeeded {
            common::metrics::record_payment(existing.payment_method.as_str(), "incomplete");
            return Err(ServiceError::Validation("Payment not completed".into()));
        }

        let txn = self.db.begin().await?;
        let locked = payment::Entity::find_by_id(payment_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("payment"))?;
        // a concurrent confirm got here first
        if locked.status == PaymentStatus::Succeeded {
            txn.rollback().await?;
            return Ok(locked);
        }

        let b = bookings::get(&txn, locked.booking_id).await?;
        bookings::transition(&txn, b, BookingStatus::Confirmed).await?;

        if locked.provider_amount_cents > 0 {
            let wallet = lock_wallet(&txn, locked.provider_id).await?;
            post(
                &txn,
                wallet,
                Posting::new(TxnKind::Credit, locked.provider_amount_cents, locked.description.clone())
                    .for_payment(locked.id)
                    .with_reference(format!("payment:{}", locked.id)),
            )
            .await?;
        }

        let mut am: payment::ActiveModel = locked.into();
        am.status = Set(PaymentStatus::Succeeded);
        am.completed_at = Set(Some(Utc::now().into()));
        let updated = am.update(&txn).await?;
        txn.commit().await?;

        common::metrics::record_payment(updated.payment_method.as_str(), "succeeded");
        info!(payment_id = %updated.id, booking_id = %updated.booking_id, amount_cents = updated.amount_cents, "payment_confirmed");
        Ok(updated)
    }

    /// Pay a booking from the customer's wallet balance.
    #[instrument(skip(self))]
    pub async fn pay_with_wallet(&self, booking_id: Uuid, customer_id: Uuid) -> Result<WalletCheckout, ServiceError> {
        let txn = self.db.begin().await?;
        let (b, svc) = load_booking(&txn, booking_id).await?;
        if b.customer_id != customer_id {
            return Err(ServiceError::Validation("booking belongs to another customer".into()));
        }
        if b.status != BookingStatus::Pending || has_succeeded_payment(&txn, b.id).await? {
            return Err(ServiceError::Validation("booking is already paid or no longer pending".into()));
        }
        if svc.price_cents <= 0 {
            return Err(ServiceError::Validation("service has no price".into()));
        }

        let split = fees::split(svc.price_cents, self.fee_bps);
        // both wallets, lowest user id first: crossed payments between two
        // providers must not wait on each other
        let customer_wallet = lock_wallets(&txn, &[customer_id, b.provider_id])
            .await?
            .into_iter()
            .find(|w| w.user_id == customer_id)
            .ok_or_else(|| ServiceError::not_found("wallet"))?;
        if customer_wallet.balance_cents < split.amount_cents {
            common::metrics::record_payment(PaymentMethod::Wallet.as_str(), "insufficient_funds");
            return Err(ServiceError::InsufficientFunds {
                available_cents: customer_wallet.balance_cents,
                required_cents: split.amount_cents,
            });
        }

        let created = payment::create(
            &txn,
            NewPayment {
                booking_id: b.id,
                customer_id,
                provider_id: b.provider_id,
                service_id: svc.id,
                amount_cents: split.amount_cents,
                currency: self.currency.clone(),
                stripe_payment_intent_id: None,
                status: PaymentStatus::Succeeded,
                payment_method: PaymentMethod::Wallet,
                description: format!("Payment for {}", svc.name),
                platform_fee_cents: split.platform_fee_cents,
                provider_amount_cents: split.provider_amount_cents,
            },
        )
        .await?;

        let (after, _) = post(
            &txn,
            customer_wallet,
            Posting::new(TxnKind::Debit, created.amount_cents, format!("Payment for {}", svc.name))
                .for_payment(created.id)
                .with_reference(format!("wallet-pay:{}", created.id)),
        )
        .await?;
        if created.provider_amount_cents > 0 {
            // already locked above; read again so a self-booking sees its own debit
            let provider_wallet = lock_wallet(&txn, created.provider_id).await?;
            post(
                &txn,
                provider_wallet,
                Posting::new(TxnKind::Credit, created.provider_amount_cents, format!("Payment for {}", svc.name))
                    .for_payment(created.id)
                    .with_reference(format!("payment:{}", created.id)),
            )
            .await?;
        }
        let confirmed = bookings::transition(&txn, b, BookingStatus::Confirmed).await?;
        txn.commit().await?;

        common::metrics::record_payment(PaymentMethod::Wallet.as_str(), "succeeded");
        info!(payment_id = %created.id, booking_id = %confirmed.id, %customer_id, "payment_confirmed");
        Ok(WalletCheckout { payment: created, booking: confirmed, remaining_balance_cents: after.balance_cents })
    }

    pub async fn get(&self, id: Uuid) -> Result<payment::Model, ServiceError> {
        payment::Entity::find_by_id(id).one(&self.db).await?.ok_or_else(|| ServiceError::not_found("payment"))
    }

    /// Payments where the user is either party, newest first.
    pub async fn history(&self, user_id: Uuid) -> Result<Vec<PaymentView>, ServiceError> {
        let rows = payment::Entity::find()
            .filter(
                Condition::any()
                    .add(payment::Column::CustomerId.eq(user_id))
                    .add(payment::Column::ProviderId.eq(user_id)),
            )
            .order_by_desc(payment::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let service_ids: Vec<Uuid> = rows.iter().map(|p| p.service_id).collect();
        let user_ids: Vec<Uuid> = rows.iter().flat_map(|p| [p.customer_id, p.provider_id]).collect();
        let services: HashMap<Uuid, ServiceSummary> = service::Entity::find()
            .filter(service::Column::Id.is_in(service_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|s| (s.id, ServiceSummary { id: s.id, name: s.name, price_cents: s.price_cents }))
            .collect();
        let users: HashMap<Uuid, user::Model> = user::Entity::find()
            .filter(user::Column::Id.is_in(user_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(rows
            .into_iter()
            .map(|p| PaymentView {
                service: services.get(&p.service_id).cloned(),
                customer: users.get(&p.customer_id).map(PartySummary::from),
                provider: users.get(&p.provider_id).map(PartySummary::from),
                payment: p,
            })
            .collect())
    }

    /// Refund a succeeded payment to where it came from.
    #[instrument(skip(self))]
    pub async fn refund(&self, id: Uuid) -> Result<payment::Model, ServiceError> {
        let existing = self.get(id).await?;
        if existing.status != PaymentStatus::Succeeded {
            return Err(ServiceError::Validation("Only succeeded payments can be refunded".into()));
        }

        let txn = self.db.begin().await?;
        let locked = payment::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("payment"))?;
        if locked.status != PaymentStatus::Succeeded {
            return Err(ServiceError::Validation("Only succeeded payments can be refunded".into()));
        }

        match (locked.payment_method, locked.stripe_payment_intent_id.as_deref()) {
            (PaymentMethod::Wallet, _) => {
                let wallet = lock_wallet(&txn, locked.customer_id).await?;
                post(
                    &txn,
                    wallet,
                    Posting::new(TxnKind::Refund, locked.amount_cents, format!("Refund: {}", locked.description))
                        .for_payment(locked.id)
                        .with_reference(format!("refund:{}", locked.id)),
                )
                .await?;
            }
            (_, Some(intent_id)) => {
                // row lock keeps a second refund out while the gateway call runs
                if let Err(e) = self.gateway.refund(intent_id).await {
                    warn!(payment_id = %id, error = %e, "payment_refund_failed");
                    txn.rollback().await?;
                    return Err(e.into());
                }
            }
            (_, None) => {
                return Err(ServiceError::Validation("payment has no gateway intent to refund".into()));
            }
        }

        let method = locked.payment_method;
        let mut am: payment::ActiveModel = locked.into();
        am.status = Set(PaymentStatus::Refunded);
        let updated = am.update(&txn).await?;

        invoice::Entity::update_many()
            .col_expr(invoice::Column::PaymentStatus, sea_orm::sea_query::Expr::value(InvoicePaymentStatus::Refunded.as_str()))
            .filter(invoice::Column::PaymentId.eq(updated.id))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        common::metrics::record_payment(method.as_str(), "refunded");
        info!(payment_id = %updated.id, amount_cents = updated.amount_cents, method = method.as_str(), "payment_refunded");
        Ok(updated)
    }
}
