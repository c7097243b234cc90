use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use super::CacheTable;
use crate::domain::LocationId;
use crate::entities::{prelude::*, weathers};
use crate::models::{NewWeatherEntry, WeatherEntry};

pub struct WeatherRepository {
    conn: DatabaseConnection,
}

impl WeatherRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(m: weathers::Model) -> WeatherEntry {
        WeatherEntry {
            id: m.id,
            forecast: m.forecast,
            time: m.time,
            location_id: LocationId::new(m.location_id),
        }
    }

    pub async fn count(&self) -> Result<u64> {
        let count = Weathers::find().count(&self.conn).await?;
        Ok(count)
    }

    pub async fn count_for_location(&self, location_id: LocationId) -> Result<u64> {
        let count = Weathers::find()
            .filter(weathers::Column::LocationId.eq(location_id.value()))
            .count(&self.conn)
            .await?;
        Ok(count)
    }
}

#[async_trait::async_trait]
impl CacheTable for WeatherRepository {
    type Key = LocationId;
    type New = NewWeatherEntry;
    type Record = WeatherEntry;

    async fn query_by_key(&self, location_id: &LocationId) -> Result<Vec<WeatherEntry>> {
        let rows = Weathers::find()
            .filter(weathers::Column::LocationId.eq(location_id.value()))
            .order_by_asc(weathers::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    async fn insert(
        &self,
        location_id: &LocationId,
        rows: &[NewWeatherEntry],
    ) -> Result<Vec<WeatherEntry>> {
        if rows.is_empty() {
            return self.query_by_key(location_id).await;
        }

        let active_models = rows.iter().map(|row| weathers::ActiveModel {
            forecast: Set(row.forecast.clone()),
            time: Set(row.time.clone()),
            location_id: Set(location_id.value()),
            ..Default::default()
        });

        Weathers::insert_many(active_models)
            .on_conflict(
                OnConflict::columns([weathers::Column::LocationId, weathers::Column::Time])
                    .update_column(weathers::Column::Forecast)
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        self.query_by_key(location_id).await
    }
}
