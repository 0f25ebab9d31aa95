use crate::api::error::AppError;
use crate::entities::{prelude::*, *};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BotStats {
    pub active_users: u64,
    pub groups: u64,
    pub files: u64,
    pub active_links: u64,
    pub total_clicks: i64,
    pub total_size: i64,
}

pub struct StatsService;

impl StatsService {
    pub async fn collect(db: &DatabaseConnection) -> Result<BotStats, AppError> {
        let active_users = AuthorizedUsers::find()
            .filter(authorized_users::Column::IsActive.eq(true))
            .count(db)
            .await?;
        let groups = FileGroups::find().count(db).await?;
        let files = Files::find().count(db).await?;
        let active_links = FileLinks::find()
            .filter(file_links::Column::IsActive.eq(true))
            .count(db)
            .await?;

        let total_clicks: i64 = FileLinks::find()
            .select_only()
            .column_as(
                Expr::cust("CAST(COALESCE(SUM(clicks), 0) AS BIGINT)"),
                "total_clicks",
            )
            .into_tuple::<i64>()
            .one(db)
            .await?
            .unwrap_or(0);

        let total_size: i64 = Files::find()
            .select_only()
            .column_as(
                Expr::cust("CAST(COALESCE(SUM(file_size), 0) AS BIGINT)"),
                "total_size",
            )
            .into_tuple::<i64>()
            .one(db)
            .await?
            .unwrap_or(0);

        Ok(BotStats {
            active_users,
            groups,
            files,
            active_links,
            total_clicks,
            total_size,
        })
    }
}
