use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// (name, table, columns, unique)
fn indexes() -> Vec<(&'static str, Alias, Vec<Alias>, bool)> {
    let t = |s: &str| Alias::new(s);
    let cols = |c: &[&str]| c.iter().map(|s| Alias::new(*s)).collect::<Vec<_>>();
    vec![
        // one review per client per project
        ("uniq_review_project_client", t("review"), cols(&["project_id", "client_id"]), true),
        ("uniq_user_badge_user_badge", t("user_badge"), cols(&["user_id", "badge_id"]), true),
        ("uniq_brochure_project_version", t("brochure"), cols(&["project_id", "version"]), true),
        ("uniq_conversation_project_client", t("conversation"), cols(&["project_id", "client_id"]), true),
        ("uniq_lesson_course_position", t("lesson"), cols(&["course_id", "position"]), true),
        ("uniq_enrollment_user_course", t("enrollment"), cols(&["user_id", "course_id"]), true),
        ("uniq_lesson_completion", t("lesson_completion"), cols(&["enrollment_id", "lesson_id"]), true),
        ("idx_project_status_city", t("project"), cols(&["status", "city"]), false),
        ("idx_project_owner", t("project"), cols(&["owner_id"]), false),
        ("idx_lead_promoteur", t("lead"), cols(&["promoteur_id"]), false),
        ("idx_lead_client_project", t("lead"), cols(&["client_id", "project_id"]), false),
        ("idx_appeal_project", t("appeal"), cols(&["project_id"]), false),
        ("idx_report_target", t("report"), cols(&["target_type", "target_id"]), false),
        ("idx_ticket_user", t("support_ticket"), cols(&["user_id"]), false),
        ("idx_chat_message_conversation", t("chat_message"), cols(&["conversation_id"]), false),
        ("idx_invoice_promoteur", t("invoice"), cols(&["promoteur_id"]), false),
    ]
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table, columns, unique) in indexes() {
            let mut stmt = Index::create();
            stmt.name(name).table(table);
            for c in columns {
                stmt.col(c);
            }
            if unique {
                stmt.unique();
            }
            manager.create_index(stmt.to_owned()).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table, _, _) in indexes() {
            manager
                .drop_index(Index::drop().name(name).table(table).to_owned())
                .await?;
        }
        Ok(())
    }
}
