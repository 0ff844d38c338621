//! Promoteur invoicing. Amounts are integer cents; payment happens outside the platform.

use chrono::{Datelike, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use common::types::Page;
use models::invoice::{self, InvoiceStatus};
use models::invoice_line;
use models::lifecycle::Lifecycle;
use models::user::Role;
use models::validate;

use crate::actor::Actor;
use crate::errors::ServiceError;
use crate::pagination::{self, Pagination};
use crate::users;

#[derive(Debug, Clone, Deserialize)]
pub struct NewLine {
    pub description: String,
    pub quantity: i32,
    pub unit_price_cents: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewInvoice {
    pub promoteur_id: Uuid,
    pub tax_rate_bps: i32,
    pub due_date: Option<String>,
    pub lines: Vec<NewLine>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Payment {
    pub payment_reference: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceWithLines {
    #[serde(flatten)]
    pub invoice: invoice::Model,
    pub lines: Vec<invoice_line::Model>,
}

/// Next free number for `year`, counted inside the caller's transaction.
async fn next_number<C: ConnectionTrait>(conn: &C, year: i32) -> Result<String, ServiceError> {
    let taken = invoice::Entity::find()
        .filter(invoice::Column::Number.starts_with(invoice::number_prefix(year)))
        .count(conn)
        .await?;
    Ok(invoice::format_number(year, taken + 1))
}

pub async fn create(db: &DatabaseConnection, actor: &Actor, input: NewInvoice) -> Result<InvoiceWithLines, ServiceError> {
    actor.require_admin()?;
    invoice::validate_tax_rate(input.tax_rate_bps)?;
    if let Some(d) = &input.due_date {
        validate::iso_date("due_date", d)?;
    }
    if input.lines.is_empty() {
        return Err(ServiceError::validation("an invoice needs at least one line"));
    }
    let totals = input
        .lines
        .iter()
        .map(|l| invoice_line::line_total(&l.description, l.quantity, l.unit_price_cents))
        .collect::<Result<Vec<i64>, _>>()?;
    let subtotal = totals
        .iter()
        .try_fold(0i64, |acc, t| acc.checked_add(*t))
        .ok_or_else(|| ServiceError::validation("subtotal overflows"))?;
    let (tax, total) = invoice::totals(subtotal, input.tax_rate_bps)?;

    let promoteur = users::get_user(db, input.promoteur_id).await?;
    if promoteur.role()? != Role::Promoteur {
        return Err(ServiceError::validation("invoices are addressed to promoteurs"));
    }

    let now = Utc::now();
    let txn = db.begin().await?;
    let number = next_number(&txn, now.year()).await?;
    let inv = invoice::ActiveModel {
        id: Set(Uuid::new_v4()),
        number: Set(number),
        promoteur_id: Set(promoteur.id),
        status: Set(InvoiceStatus::Draft.as_str().into()),
        subtotal_cents: Set(subtotal),
        tax_rate_bps: Set(input.tax_rate_bps),
        tax_cents: Set(tax),
        total_cents: Set(total),
        due_date: Set(input.due_date),
        issued_at: Set(None),
        paid_at: Set(None),
        payment_reference: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    let mut lines = Vec::with_capacity(input.lines.len());
    for (idx, (l, total)) in input.lines.into_iter().zip(totals).enumerate() {
        let line = invoice_line::ActiveModel {
            id: Set(Uuid::new_v4()),
            invoice_id: Set(inv.id),
            position: Set(idx as i32 + 1),
            description: Set(l.description),
            quantity: Set(l.quantity),
            unit_price_cents: Set(l.unit_price_cents),
            line_total_cents: Set(total),
        }
        .insert(&txn)
        .await?;
        lines.push(line);
    }
    txn.commit().await?;
    info!(invoice_id = %inv.id, number = %inv.number, total_cents = inv.total_cents, "invoice_created");
    Ok(InvoiceWithLines { invoice: inv, lines })
}

async fn find(db: &DatabaseConnection, id: Uuid) -> Result<invoice::Model, ServiceError> {
    invoice::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("invoice"))
}

pub async fn get(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<InvoiceWithLines, ServiceError> {
    let inv = find(db, id).await?;
    actor.require_owner_or_admin(inv.promoteur_id)?;
    let lines = invoice_line::Entity::find()
        .filter(invoice_line::Column::InvoiceId.eq(inv.id))
        .order_by_asc(invoice_line::Column::Position)
        .all(db)
        .await?;
    Ok(InvoiceWithLines { invoice: inv, lines })
}

pub async fn list(db: &DatabaseConnection, actor: &Actor, opts: Pagination) -> Result<Page<invoice::Model>, ServiceError> {
    let mut q = invoice::Entity::find().order_by_desc(invoice::Column::CreatedAt);
    match actor.role {
        Role::Admin => {}
        Role::Promoteur => q = q.filter(invoice::Column::PromoteurId.eq(actor.user_id)),
        Role::Client => return Err(ServiceError::forbidden("clients have no invoices")),
    }
    pagination::fetch(db, q, opts).await
}

async fn move_to(
    db: &DatabaseConnection,
    actor: &Actor,
    id: Uuid,
    next: InvoiceStatus,
    payment_reference: Option<String>,
) -> Result<invoice::Model, ServiceError> {
    actor.require_admin()?;
    let inv = find(db, id).await?;
    inv.status()?.transition(next)?;
    let now = Utc::now().into();
    let mut am: invoice::ActiveModel = inv.into();
    am.status = Set(next.as_str().into());
    match next {
        InvoiceStatus::Issued => am.issued_at = Set(Some(now)),
        InvoiceStatus::Paid => {
            am.paid_at = Set(Some(now));
            am.payment_reference = Set(payment_reference);
        }
        _ => {}
    }
    am.updated_at = Set(now);
    let updated = am.update(db).await?;
    info!(invoice_id = %id, status = %next, "invoice_status_changed");
    Ok(updated)
}

pub async fn issue(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<invoice::Model, ServiceError> {
    move_to(db, actor, id, InvoiceStatus::Issued, None).await
}

/// Record an external payment. No processor is called.
pub async fn pay(db: &DatabaseConnection, actor: &Actor, id: Uuid, input: Payment) -> Result<invoice::Model, ServiceError> {
    validate::required("payment_reference", &input.payment_reference, 128)?;
    move_to(db, actor, id, InvoiceStatus::Paid, Some(input.payment_reference)).await
}

pub async fn cancel(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<invoice::Model, ServiceError> {
    move_to(db, actor, id, InvoiceStatus::Cancelled, None).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, seed_user};

    fn two_lines(promoteur_id: Uuid) -> NewInvoice {
        NewInvoice {
            promoteur_id,
            tax_rate_bps: 1_800,
            due_date: Some("2026-12-31".into()),
            lines: vec![
                NewLine { description: "Premium listing".into(), quantity: 2, unit_price_cents: 15_000 },
                NewLine { description: "Brochure print".into(), quantity: 1, unit_price_cents: 4_999 },
            ],
        }
    }

    #[tokio::test]
    async fn totals_and_numbering() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, admin) = seed_user(&db, Role::Admin).await?;
        let (p, promoteur) = seed_user(&db, Role::Promoteur).await?;

        let first = create(&db, &admin, two_lines(p.id)).await?;
        assert_eq!(first.invoice.subtotal_cents, 34_999);
        // 18% of 349.99 = 62.9982
        assert_eq!(first.invoice.tax_cents, 6_300);
        assert_eq!(first.invoice.total_cents, 41_299);
        assert_eq!(first.lines.len(), 2);
        assert_eq!(first.lines[0].line_total_cents, 30_000);

        let second = create(&db, &admin, two_lines(p.id)).await?;
        let year = Utc::now().year();
        assert_eq!(first.invoice.number, invoice::format_number(year, 1));
        assert_eq!(second.invoice.number, invoice::format_number(year, 2));

        let fetched = get(&db, &promoteur, first.invoice.id).await?;
        assert_eq!(fetched.lines[1].position, 2);
        assert_eq!(list(&db, &promoteur, Pagination::default()).await?.total, 2);
        Ok(())
    }

    #[tokio::test]
    async fn rejects_bad_input() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, admin) = seed_user(&db, Role::Admin).await?;
        let (p, promoteur) = seed_user(&db, Role::Promoteur).await?;
        let (c, _) = seed_user(&db, Role::Client).await?;

        let mut empty = two_lines(p.id);
        empty.lines.clear();
        assert!(matches!(create(&db, &admin, empty).await, Err(ServiceError::Validation(_))));

        let mut zero_qty = two_lines(p.id);
        zero_qty.lines[0].quantity = 0;
        assert!(create(&db, &admin, zero_qty).await.is_err());

        let mut tax = two_lines(p.id);
        tax.tax_rate_bps = 10_001;
        assert!(create(&db, &admin, tax).await.is_err());

        assert!(create(&db, &admin, two_lines(c.id)).await.is_err());
        assert!(matches!(create(&db, &promoteur, two_lines(p.id)).await, Err(ServiceError::Forbidden(_))));
        // nothing half-written
        assert_eq!(invoice::Entity::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn oversized_amounts_fail_validation() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, admin) = seed_user(&db, Role::Admin).await?;
        let (p, _) = seed_user(&db, Role::Promoteur).await?;

        let input = NewInvoice {
            promoteur_id: p.id,
            tax_rate_bps: 10_000,
            due_date: None,
            lines: vec![NewLine { description: "Tower".into(), quantity: 1, unit_price_cents: 1_000_000_000_000_000 }],
        };
        let inv = create(&db, &admin, input).await?;
        assert_eq!(inv.invoice.total_cents, 2_000_000_000_000_000);

        let input = NewInvoice {
            promoteur_id: p.id,
            tax_rate_bps: 10_000,
            due_date: None,
            lines: vec![NewLine { description: "Tower".into(), quantity: 1, unit_price_cents: i64::MAX / 2 + 1 }],
        };
        let err = create(&db, &admin, input).await.unwrap_err();
        assert!(matches!(err, ServiceError::Model(models::errors::ModelError::Validation(_))), "{err:?}");
        assert_eq!(invoice::Entity::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn lifecycle() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, admin) = seed_user(&db, Role::Admin).await?;
        let (p, _) = seed_user(&db, Role::Promoteur).await?;
        let inv = create(&db, &admin, two_lines(p.id)).await?.invoice;

        let pay_ref = || Payment { payment_reference: "WIRE-2211".into() };
        assert!(pay(&db, &admin, inv.id, pay_ref()).await.is_err());
        let issued = issue(&db, &admin, inv.id).await?;
        assert!(issued.issued_at.is_some());
        let paid = pay(&db, &admin, inv.id, pay_ref()).await?;
        assert_eq!(paid.status, "paid");
        assert_eq!(paid.payment_reference.as_deref(), Some("WIRE-2211"));
        assert!(cancel(&db, &admin, inv.id).await.is_err());
        Ok(())
    }
}
