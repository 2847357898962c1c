use super::{BranchLanguages, Repositories, RepositoryBranches};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Repositories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Repositories::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Repositories::OrgName).string().not_null())
                    .col(ColumnDef::new(Repositories::RepoName).string().not_null())
                    .col(
                        ColumnDef::new(Repositories::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Repositories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_repositories_org_repo")
                    .table(Repositories::Table)
                    .col(Repositories::OrgName)
                    .col(Repositories::RepoName)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RepositoryBranches::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RepositoryBranches::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RepositoryBranches::RepositoryId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RepositoryBranches::BranchName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RepositoryBranches::IsDeleted)
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
                    .table(BranchLanguages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BranchLanguages::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BranchLanguages::RepositoryBranchId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BranchLanguages::LanguageCode)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BranchLanguages::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BranchLanguages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RepositoryBranches::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Repositories::Table).to_owned())
            .await
    }
}
