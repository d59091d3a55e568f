use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202508060001_create_code_reviews.rs"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("code_reviews"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alias::new("repo_name")).text().not_null())
                    .col(ColumnDef::new(Alias::new("branch_name")).text().not_null())
                    .col(ColumnDef::new(Alias::new("student_name")).text().null())
                    // serialized JSON: {feedback, results, summary}
                    .col(
                        ColumnDef::new(Alias::new("review_content"))
                            .text()
                            .not_null(),
                    )
                    // formatted "achieved/max" string
                    .col(ColumnDef::new(Alias::new("score")).text().not_null())
                    .col(
                        ColumnDef::new(Alias::new("status"))
                            .text()
                            .not_null()
                            .default("COMPLETED"),
                    )
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp()
                            .not_null()
                            .default(Expr::cust("CURRENT_TIMESTAMP")),
                    )
                    .to_owned(),
            )
            .await?;

        // lookup is always by key, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_code_reviews_lookup")
                    .table(Alias::new("code_reviews"))
                    .col(Alias::new("repo_name"))
                    .col(Alias::new("branch_name"))
                    .col(Alias::new("student_name"))
                    .col(Alias::new("created_at"))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("code_reviews")).to_owned())
            .await
    }
}
