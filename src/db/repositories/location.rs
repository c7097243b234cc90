use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use super::CacheTable;
use crate::domain::LocationId;
use crate::entities::{locations, prelude::*};
use crate::models::{LocationRecord, NewLocation};

pub struct LocationRepository {
    conn: DatabaseConnection,
}

impl LocationRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(m: locations::Model) -> LocationRecord {
        LocationRecord {
            id: LocationId::new(m.id),
            search_query: m.search_query,
            formatted_query: m.formatted_query,
            latitude: m.latitude,
            longitude: m.longitude,
        }
    }

    pub async fn get(&self, id: LocationId) -> Result<Option<LocationRecord>> {
        let row = Locations::find_by_id(id.value()).one(&self.conn).await?;
        Ok(row.map(Self::map_model))
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(Locations::find().count(&self.conn).await?)
    }
}

#[async_trait::async_trait]
impl CacheTable for LocationRepository {
    type Key = str;
    type New = NewLocation;
    type Record = LocationRecord;

    async fn query_by_key(&self, search_query: &str) -> Result<Vec<LocationRecord>> {
        let rows = Locations::find()
            .filter(locations::Column::SearchQuery.eq(search_query))
            .order_by_asc(locations::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    async fn insert(&self, search_query: &str, rows: &[NewLocation]) -> Result<Vec<LocationRecord>> {
        if rows.is_empty() {
            return self.query_by_key(search_query).await;
        }

        let active_models = rows.iter().map(|row| locations::ActiveModel {
            search_query: Set(row.search_query.clone()),
            formatted_query: Set(row.formatted_query.clone()),
            latitude: Set(row.latitude),
            longitude: Set(row.longitude),
            ..Default::default()
        });

        // A row written concurrently by another process wins; we read it back.
        Locations::insert_many(active_models)
            .on_conflict(
                OnConflict::column(locations::Column::SearchQuery)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        self.query_by_key(search_query).await
    }
}
