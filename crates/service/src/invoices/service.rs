use std::path::{Path, PathBuf};

use chrono::Utc;
use models::invoice::{self, CustomerSnapshot, InvoicePaymentStatus, InvoiceStatus, ProviderSnapshot, ServiceSnapshot};
use models::payment::{self, PaymentStatus};
use models::{booking, service, user};
use models::errors::is_unique_violation;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, NotSet, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::Serialize;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{number, pdf};
use crate::errors::ServiceError;
use crate::pagination::Pagination;

const NUMBER_ATTEMPTS: usize = 5;

#[derive(Clone, Debug, Serialize)]
pub struct InvoicePage {
    pub invoices: Vec<invoice::Model>,
    pub total: u64,
    pub page: u64,
    pub pages: u64,
}

/// Rendered PDF ready to stream.
#[derive(Clone, Debug)]
pub struct InvoiceFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

enum Issued {
    New(invoice::Model),
    Existing(invoice::Model),
}

#[derive(Clone)]
pub struct InvoiceService {
    db: DatabaseConnection,
    invoice_dir: PathBuf,
}

impl InvoiceService {
    pub fn new(db: DatabaseConnection, invoice_dir: impl Into<PathBuf>) -> Self {
        Self { db, invoice_dir: invoice_dir.into() }
    }

    pub fn invoice_dir(&self) -> &Path { &self.invoice_dir }

    fn file_path(&self, invoice_number: &str) -> PathBuf {
        self.invoice_dir.join(format!("{}.pdf", invoice_number))
    }

    async fn write_pdf(&self, inv: &invoice::Model, currency: &str) -> Result<(), pdf::RenderError> {
        let (snapshot, currency) = (inv.clone(), currency.to_string());
        let bytes = tokio::task::spawn_blocking(move || pdf::render_invoice(&snapshot, &currency)).await??;
        tokio::fs::create_dir_all(&self.invoice_dir).await?;
        tokio::fs::write(self.file_path(&inv.invoice_number), bytes).await?;
        Ok(())
    }

    /// Unsaved invoice for `pay`, with snapshots of the parties and listing.
    /// The number is filled in by [`Self::insert_numbered`].
    async fn draft(&self, pay: &payment::Model) -> Result<invoice::ActiveModel, ServiceError> {
        let svc = service::Entity::find_by_id(pay.service_id).one(&self.db).await?.ok_or_else(|| ServiceError::not_found("service"))?;
        let customer = user::Entity::find_by_id(pay.customer_id).one(&self.db).await?.ok_or_else(|| ServiceError::not_found("customer"))?;
        let provider = user::Entity::find_by_id(pay.provider_id).one(&self.db).await?.ok_or_else(|| ServiceError::not_found("provider"))?;
        let booked_for = booking::Entity::find_by_id(pay.booking_id).one(&self.db).await?.map(|b| b.date);

        let now = Utc::now().into();
        let paid = pay.status == PaymentStatus::Succeeded;
        Ok(invoice::ActiveModel {
            id: Set(Uuid::new_v4()),
            invoice_number: NotSet,
            payment_id: Set(pay.id),
            booking_id: Set(pay.booking_id),
            customer_id: Set(pay.customer_id),
            provider_id: Set(pay.provider_id),
            service_id: Set(pay.service_id),
            service_details: Set(ServiceSnapshot {
                name: svc.name,
                description: svc.description,
                price_cents: svc.price_cents,
                date: booked_for,
                location: svc.location,
            }),
            customer_details: Set(CustomerSnapshot { name: customer.name, email: customer.email, phone: customer.phone }),
            provider_details: Set(ProviderSnapshot {
                business_name: provider.business_name.or_else(|| Some(provider.name.clone())),
                name: provider.name,
                email: provider.email,
                phone: provider.phone,
            }),
            subtotal_cents: Set(pay.amount_cents - pay.platform_fee_cents),
            platform_fee_cents: Set(pay.platform_fee_cents),
            tax_cents: Set(0),
            total_cents: Set(pay.amount_cents),
            status: Set(InvoiceStatus::Draft),
            payment_status: Set(if paid { InvoicePaymentStatus::Paid } else { InvoicePaymentStatus::Pending }),
            pdf_url: Set(None),
            notes: Set(None),
            due_date: Set(None),
            issued_date: Set(now),
            paid_date: Set(paid.then_some(now)),
            created_at: Set(now),
        })
    }

    /// Insert `draft` under a fresh number. The unique keys arbitrate: a
    /// clash on the payment means another create won, a clash on the number
    /// draws again.
    async fn insert_numbered(
        &self,
        mut draft: invoice::ActiveModel,
        payment_id: Uuid,
        mut next_number: impl FnMut() -> String,
    ) -> Result<Issued, ServiceError> {
        for _ in 0..NUMBER_ATTEMPTS {
            let candidate = next_number();
            draft.invoice_number = Set(candidate.clone());
            match draft.clone().insert(&self.db).await {
                Ok(m) => return Ok(Issued::New(m)),
                Err(e) if is_unique_violation(&e) => {
                    if let Some(existing) = invoice::Entity::find()
                        .filter(invoice::Column::PaymentId.eq(payment_id))
                        .one(&self.db)
                        .await?
                    {
                        return Ok(Issued::Existing(existing));
                    }
                    warn!(invoice_number = %candidate, "invoice_number_taken");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(ServiceError::Internal("could not allocate an invoice number".into()))
    }

    /// Issue an invoice for a payment, or return the one it already has.
    #[instrument(skip(self))]
    pub async fn create(&self, payment_id: Uuid) -> Result<invoice::Model, ServiceError> {
        let pay = payment::Entity::find_by_id(payment_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("payment"))?;
        if let Some(existing) = invoice::Entity::find()
            .filter(invoice::Column::PaymentId.eq(pay.id))
            .one(&self.db)
            .await?
        {
            return Ok(existing);
        }

        let draft = self.draft(&pay).await?;
        let mut created = match self.insert_numbered(draft, pay.id, number::next_number).await? {
            Issued::New(m) => m,
            Issued::Existing(m) => return Ok(m),
        };

        match self.write_pdf(&created, &pay.currency).await {
            Ok(()) => {
                let number = created.invoice_number.clone();
                let mut am: invoice::ActiveModel = created.into();
                am.status = Set(InvoiceStatus::Sent);
                am.pdf_url = Set(Some(format!("/invoices/{}.pdf", number)));
                created = am.update(&self.db).await?;
            }
            Err(e) => {
                error!(invoice_number = %created.invoice_number, error = %e, "invoice_pdf_failed");
            }
        }

        let mut link: payment::ActiveModel = pay.into();
        link.invoice_id = Set(Some(created.id));
        link.update(&self.db).await?;

        common::metrics::record_invoice();
        info!(invoice_id = %created.id, invoice_number = %created.invoice_number, %payment_id, "invoice_created");
        Ok(created)
    }

    pub async fn get(&self, id: Uuid) -> Result<invoice::Model, ServiceError> {
        invoice::Entity::find_by_id(id).one(&self.db).await?.ok_or_else(|| ServiceError::not_found("invoice"))
    }

    /// Invoices for a customer (default) or provider, newest issued first.
    pub async fn list_for_user(&self, user_id: Uuid, role: Option<&str>, page: Pagination) -> Result<InvoicePage, ServiceError> {
        let cond = match role.map(|r| r.trim().to_ascii_lowercase()).as_deref() {
            None | Some("customer") => Condition::all().add(invoice::Column::CustomerId.eq(user_id)),
            Some("provider") | Some("business") => Condition::all().add(invoice::Column::ProviderId.eq(user_id)),
            Some(_) => Condition::any()
                .add(invoice::Column::CustomerId.eq(user_id))
                .add(invoice::Column::ProviderId.eq(user_id)),
        };
        let q = invoice::Entity::find().filter(cond);
        let total = q.clone().count(&self.db).await?;
        let invoices = q
            .order_by_desc(invoice::Column::IssuedDate)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await?;
        Ok(InvoicePage { invoices, total, page: page.page(), pages: page.pages(total) })
    }

    pub async fn download(&self, id: Uuid) -> Result<InvoiceFile, ServiceError> {
        let inv = self.get(id).await?;
        let path = self.file_path(&inv.invoice_number);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(InvoiceFile { filename: format!("{}.pdf", inv.invoice_number), bytes }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ServiceError::NotFound("PDF file not found".into())),
            Err(e) => Err(ServiceError::Internal(format!("read {}: {}", path.display(), e))),
        }
    }

    pub async fn mark_paid(&self, id: Uuid) -> Result<invoice::Model, ServiceError> {
        let inv = self.get(id).await?;
        let mut am: invoice::ActiveModel = inv.into();
        am.status = Set(InvoiceStatus::Paid);
        am.payment_status = Set(InvoicePaymentStatus::Paid);
        am.paid_date = Set(Some(Utc::now().into()));
        let updated = am.update(&self.db).await?;
        info!(invoice_id = %id, "invoice_marked_paid");
        Ok(updated)
    }

    /// No mail transport is wired; this only records the invoice as sent.
    pub async fn send_email(&self, id: Uuid) -> Result<invoice::Model, ServiceError> {
        let inv = self.get(id).await?;
        let recipient = inv.customer_details.email.clone();
        let mut am: invoice::ActiveModel = inv.into();
        am.status = Set(InvoiceStatus::Sent);
        let updated = am.update(&self.db).await?;
        info!(invoice_id = %id, %recipient, "invoice_sent");
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let inv = self.get(id).await?;
        payment::Entity::update_many()
            .col_expr(payment::Column::InvoiceId, sea_orm::sea_query::Expr::value(Option::<Uuid>::None))
            .filter(payment::Column::InvoiceId.eq(inv.id))
            .exec(&self.db)
            .await?;
        invoice::Entity::delete_by_id(inv.id).exec(&self.db).await?;
        let path = self.file_path(&inv.invoice_number);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "invoice_pdf_remove_failed");
            }
        }
        info!(invoice_id = %id, "invoice_deleted");
        Ok(())
    }
}
