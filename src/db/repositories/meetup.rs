use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use super::CacheTable;
use crate::domain::LocationId;
use crate::entities::{meetups, prelude::*};
use crate::models::{MeetupEntry, NewMeetupEntry};

pub struct MeetupRepository {
    conn: DatabaseConnection,
}

impl MeetupRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(m: meetups::Model) -> MeetupEntry {
        MeetupEntry {
            id: m.id,
            link: m.link,
            name: m.name,
            creation_date: m.creation_date,
            host: m.host,
            location_id: LocationId::new(m.location_id),
        }
    }

    pub async fn count(&self) -> Result<u64> {
        let count = Meetups::find().count(&self.conn).await?;
        Ok(count)
    }

    pub async fn count_for_location(&self, location_id: LocationId) -> Result<u64> {
        let count = Meetups::find()
            .filter(meetups::Column::LocationId.eq(location_id.value()))
            .count(&self.conn)
            .await?;
        Ok(count)
    }
}

#[async_trait::async_trait]
impl CacheTable for MeetupRepository {
    type Key = LocationId;
    type New = NewMeetupEntry;
    type Record = MeetupEntry;

    async fn query_by_key(&self, location_id: &LocationId) -> Result<Vec<MeetupEntry>> {
        let rows = Meetups::find()
            .filter(meetups::Column::LocationId.eq(location_id.value()))
            .order_by_asc(meetups::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    async fn insert(
        &self,
        location_id: &LocationId,
        rows: &[NewMeetupEntry],
    ) -> Result<Vec<MeetupEntry>> {
        if rows.is_empty() {
            return self.query_by_key(location_id).await;
        }

        let active_models = rows.iter().map(|row| meetups::ActiveModel {
            link: Set(row.link.clone()),
            name: Set(row.name.clone()),
            creation_date: Set(row.creation_date.clone()),
            host: Set(row.host.clone()),
            location_id: Set(location_id.value()),
            ..Default::default()
        });

        Meetups::insert_many(active_models)
            .on_conflict(
                OnConflict::columns([meetups::Column::LocationId, meetups::Column::Link])
                    .update_columns([
                        meetups::Column::Name,
                        meetups::Column::CreationDate,
                        meetups::Column::Host,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        self.query_by_key(location_id).await
    }
}
