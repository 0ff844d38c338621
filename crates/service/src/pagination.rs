//! Page fetching over SeaORM selects.

use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, Select};

pub use common::pagination::Pagination;
use common::types::Page;

use crate::errors::ServiceError;

/// Fetch one page of `select` with the total item count.
pub async fn fetch<E>(db: &DatabaseConnection, select: Select<E>, opts: Pagination) -> Result<Page<E::Model>, ServiceError>
where
    E: EntityTrait,
    E::Model: Send + Sync,
{
    let (page_idx, per_page) = opts.normalize();
    // SeaORM's paginate uses 0-based page index internally via fetch_page
    let paginator = select.paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page_idx).await?;
    let (page, per_page) = opts.effective();
    Ok(Page { items, page, per_page, total })
}
