use sea_orm::entity::prelude::*;

/// 访问统计行，与 `urls` 一一对应
///
/// `last_ips` / `referrers` 以换行符拼接存储
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "url_stats")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub short_url: String,
    pub count: i64,
    #[sea_orm(column_type = "Text")]
    pub last_ips: String,
    #[sea_orm(column_type = "Text")]
    pub referrers: String,
    #[sea_orm(column_type = "Text")]
    pub last_geo_location: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
