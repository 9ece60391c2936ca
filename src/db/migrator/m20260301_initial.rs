use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Assets)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // status and created_at drive the default listing and the recent feed
        for mut index in schema.create_index_from_entity(Assets) {
            manager
                .create_index(index.if_not_exists().to_owned())
                .await?;
        }

        manager
            .create_index(
                Index::create()
                    .name("idx_assets_assigned_to_id")
                    .table(Assets)
                    .col(crate::entities::assets::Column::AssignedToId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Assets).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        Ok(())
    }
}
