use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        self.create_streams_table(manager).await?;
        self.create_stream_tags_table(manager).await?;
        self.create_indexes(manager).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StreamTags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Streams::Table).to_owned())
            .await
    }
}

impl Migration {
    // Helper functions for database-specific types
    fn uuid_column(&self, manager: &SchemaManager, column: impl IntoIden) -> ColumnDef {
        let mut col = ColumnDef::new(column);
        match manager.get_database_backend() {
            sea_orm::DatabaseBackend::Postgres => col.uuid().not_null(),
            _ => col.string().not_null(),
        };
        col
    }

    fn timestamp_column(&self, manager: &SchemaManager, column: impl IntoIden) -> ColumnDef {
        let mut col = ColumnDef::new(column);
        match manager.get_database_backend() {
            sea_orm::DatabaseBackend::Postgres => col.timestamp_with_time_zone().not_null(),
            _ => col.string().not_null(),
        };
        col
    }

    fn nullable_timestamp_column(
        &self,
        manager: &SchemaManager,
        column: impl IntoIden,
    ) -> ColumnDef {
        let mut col = ColumnDef::new(column);
        match manager.get_database_backend() {
            sea_orm::DatabaseBackend::Postgres => col.timestamp_with_time_zone(),
            _ => col.string(),
        };
        col
    }

    async fn create_streams_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Streams::Table)
                    .if_not_exists()
                    .col(self.uuid_column(manager, Streams::Id).primary_key())
                    .col(self.uuid_column(manager, Streams::UserId))
                    .col(ColumnDef::new(Streams::StreamKey).string().not_null())
                    .col(ColumnDef::new(Streams::BroadcastId).string())
                    .col(ColumnDef::new(Streams::Title).string().not_null())
                    .col(ColumnDef::new(Streams::Preview).string())
                    .col(self.nullable_timestamp_column(manager, Streams::Start))
                    .col(self.nullable_timestamp_column(manager, Streams::End))
                    .col(ColumnDef::new(Streams::Path).string())
                    .col(self.timestamp_column(manager, Streams::CreatedAt))
                    .col(self.timestamp_column(manager, Streams::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn create_stream_tags_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StreamTags::Table)
                    .if_not_exists()
                    .col(self.uuid_column(manager, StreamTags::StreamId))
                    .col(self.uuid_column(manager, StreamTags::TagId))
                    .col(self.timestamp_column(manager, StreamTags::CreatedAt))
                    .primary_key(
                        Index::create()
                            .col(StreamTags::StreamId)
                            .col(StreamTags::TagId),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_indexes(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        // Open sessions are listed on every sweep and every public listing
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_streams_end")
                    .table(Streams::Table)
                    .col(Streams::End)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_streams_broadcast_id")
                    .table(Streams::Table)
                    .col(Streams::BroadcastId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_streams_stream_key")
                    .table(Streams::Table)
                    .col(Streams::StreamKey)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_streams_user_id")
                    .table(Streams::Table)
                    .col(Streams::UserId)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Streams {
    Table,
    Id,
    UserId,
    StreamKey,
    BroadcastId,
    Title,
    Preview,
    Start,
    End,
    Path,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum StreamTags {
    Table,
    StreamId,
    TagId,
    CreatedAt,
}
