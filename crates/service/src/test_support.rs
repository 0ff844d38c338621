#![cfg(test)]
//! In-memory SQLite databases migrated with the real `Migrator`, plus fixtures.
use chrono::Utc;
use migration::MigratorTrait;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use uuid::Uuid;

use models::project::{self, ProjectStatus};
use models::user::{self, Role};

use crate::actor::Actor;

/// A fresh, migrated database per test.
///
/// The pool holds exactly one connection: each SQLite `:memory:` connection is its own database.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

pub async fn seed_user(db: &DatabaseConnection, role: Role) -> Result<(user::Model, Actor), anyhow::Error> {
    let email = format!("{}_{}@example.com", role, Uuid::new_v4().simple());
    let u = user::create(db, &email, "Test User", role, Some("+33612345678")).await?;
    let actor = Actor::new(u.id, role);
    Ok((u, actor))
}

/// Inserts a project directly in `status`, bypassing the moderation workflow.
pub async fn seed_project(db: &DatabaseConnection, owner_id: Uuid, status: ProjectStatus) -> Result<project::Model, anyhow::Error> {
    let now = Utc::now().into();
    let am = project::ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_id: Set(owner_id),
        title: Set("Residence Les Palmiers".into()),
        description: Set("Twelve apartments close to the sea.".into()),
        city: Set("Dakar".into()),
        address: Set(Some("12 Corniche Ouest".into())),
        latitude: Set(Some(14.6937)),
        longitude: Set(Some(-17.4441)),
        price_min_cents: Set(Some(5_000_000)),
        price_max_cents: Set(Some(9_000_000)),
        units_total: Set(12),
        delivery_date: Set(Some("2027-06-30".into())),
        status: Set(status.as_str().into()),
        rejection_reason: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}
