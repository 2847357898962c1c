use super::{DocCatalogs, DocFiles};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DocFiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DocFiles::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DocFiles::Content).text().not_null())
                    .col(
                        ColumnDef::new(DocFiles::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DocCatalogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DocCatalogs::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DocCatalogs::BranchLanguageId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DocCatalogs::DocFileId).string().null())
                    .col(ColumnDef::new(DocCatalogs::Title).string().not_null())
                    .col(ColumnDef::new(DocCatalogs::Path).string().not_null())
                    .col(
                        ColumnDef::new(DocCatalogs::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_doc_catalogs_branch_language_id")
                    .table(DocCatalogs::Table)
                    .col(DocCatalogs::BranchLanguageId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DocCatalogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DocFiles::Table).to_owned())
            .await
    }
}
