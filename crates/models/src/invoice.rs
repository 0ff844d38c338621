use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::lifecycle::Lifecycle;

string_enum! {
    pub enum InvoiceStatus {
        Draft => "draft",
        Issued => "issued",
        Paid => "paid",
        Cancelled => "cancelled",
    }
}

impl Lifecycle for InvoiceStatus {
    fn can_transition_to(self, next: Self) -> bool {
        use InvoiceStatus::*;
        matches!((self, next), (Draft, Issued) | (Issued, Paid) | (Issued, Cancelled) | (Draft, Cancelled))
    }

    fn is_terminal(self) -> bool {
        matches!(self, InvoiceStatus::Paid | InvoiceStatus::Cancelled)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoice")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub number: String,
    pub promoteur_id: Uuid,
    pub status: String,
    pub subtotal_cents: i64,
    pub tax_rate_bps: i32,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub due_date: Option<String>,
    pub issued_at: Option<DateTimeWithTimeZone>,
    pub paid_at: Option<DateTimeWithTimeZone>,
    pub payment_reference: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Lines,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Lines => Entity::has_many(crate::invoice_line::Entity).into(),
        }
    }
}

impl Related<crate::invoice_line::Entity> for Entity {
    fn to() -> RelationDef { Relation::Lines.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn status(&self) -> Result<InvoiceStatus, ModelError> { self.status.parse() }
}

pub fn validate_tax_rate(bps: i32) -> Result<(), ModelError> {
    if !(0..=10_000).contains(&bps) {
        return Err(ModelError::Validation("tax_rate_bps must be 0..=10000".into()));
    }
    Ok(())
}

/// Tax on `subtotal_cents` at `bps` basis points, rounded half up to the cent.
pub fn compute_tax(subtotal_cents: i64, bps: i32) -> Result<i64, ModelError> {
    let tax = (subtotal_cents as i128 * bps as i128 + 5_000) / 10_000;
    i64::try_from(tax).map_err(|_| ModelError::Validation("amount overflows".into()))
}

/// `(tax_cents, total_cents)` for a subtotal, failing when the total leaves `i64`.
pub fn totals(subtotal_cents: i64, bps: i32) -> Result<(i64, i64), ModelError> {
    let tax = compute_tax(subtotal_cents, bps)?;
    let total = subtotal_cents
        .checked_add(tax)
        .ok_or_else(|| ModelError::Validation("amount overflows".into()))?;
    Ok((tax, total))
}

/// `INV-YYYY-NNNNN` where `seq` is the 1-based sequence within the year.
pub fn format_number(year: i32, seq: u64) -> String {
    format!("INV-{year}-{seq:05}")
}

pub fn number_prefix(year: i32) -> String {
    format!("INV-{year}-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tax_rounds_half_up() {
        assert_eq!(compute_tax(10_000, 2_000).unwrap(), 2_000);
        // 12.5 cents -> 13
        assert_eq!(compute_tax(125, 1_000).unwrap(), 13);
        // 12.4 cents -> 12
        assert_eq!(compute_tax(124, 1_000).unwrap(), 12);
        assert_eq!(compute_tax(999, 0).unwrap(), 0);
    }

    #[test]
    fn huge_amounts_are_rejected_not_wrapped() {
        assert_eq!(compute_tax(1_000_000_000_000_000, 10_000).unwrap(), 1_000_000_000_000_000);
        assert!(matches!(totals(i64::MAX, 10_000), Err(ModelError::Validation(_))));
        assert!(matches!(totals(i64::MAX / 2 + 1, 10_000), Err(ModelError::Validation(_))));
        assert_eq!(totals(10_000, 2_000).unwrap(), (2_000, 12_000));
    }

    #[test]
    fn number_format() {
        assert_eq!(format_number(2026, 7), "INV-2026-00007");
        assert!(format_number(2026, 7).starts_with(&number_prefix(2026)));
    }

    #[test]
    fn paid_invoices_cannot_be_cancelled() {
        assert!(InvoiceStatus::Paid.transition(InvoiceStatus::Cancelled).is_err());
        assert!(InvoiceStatus::Draft.transition(InvoiceStatus::Paid).is_err());
        assert!(InvoiceStatus::Draft.transition(InvoiceStatus::Cancelled).is_ok());
    }
}
