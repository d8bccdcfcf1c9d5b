use sea_orm_migration::prelude::*;

use crate::m20260301_000001_urls::Urls;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 统计表随 urls 行一起删除
        manager
            .create_table(
                Table::create()
                    .table(UrlStats::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UrlStats::ShortUrl)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UrlStats::Count)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UrlStats::LastIps)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(UrlStats::Referrers)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(UrlStats::LastGeoLocation)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_url_stats_short_url")
                            .from(UrlStats::Table, UrlStats::ShortUrl)
                            .to(Urls::Table, Urls::ShortUrl)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UrlStats::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UrlStats {
    Table,
    ShortUrl,
    Count,
    LastIps,
    Referrers,
    LastGeoLocation,
}
