//! Faucets and waitlists share one record shape but live in separate tables.

use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

use crate::entities::{faucet, waitlist};

use super::{StoreError, contains_insensitive};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    Faucet,
    Waitlist,
}

impl ListingKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Faucet => "Faucet",
            Self::Waitlist => "Waitlist",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub id: i32,
    pub name: String,
    pub logo_url: Option<String>,
    pub link_url: String,
    pub status: bool,
    pub created_at: DateTime<Utc>,
}

impl From<faucet::Model> for Listing {
    fn from(model: faucet::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            logo_url: model.logo_url,
            link_url: model.link_url,
            status: model.status,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<waitlist::Model> for Listing {
    fn from(model: waitlist::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            logo_url: model.logo_url,
            link_url: model.link_url,
            status: model.status,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewListing {
    pub name: String,
    pub logo_url: Option<String>,
    pub link_url: String,
    pub status: bool,
}

/// Partial listing update; `logo_url: Some(None)` clears the logo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPatch {
    pub name: Option<String>,
    pub logo_url: Option<Option<String>>,
    pub link_url: Option<String>,
    pub status: Option<bool>,
}

pub async fn list_listings(
    database: &DatabaseConnection,
    kind: ListingKind,
    filter: Option<&str>,
) -> Result<Vec<Listing>, StoreError> {
    let backend = database.get_database_backend();
    let listings: Vec<Listing> = match kind {
        ListingKind::Faucet => {
            let mut select = faucet::Entity::find();
            if let Some(needle) = filter {
                select = select.filter(contains_insensitive(backend, faucet::Column::Name, needle));
            }
            select
                .order_by_desc(faucet::Column::CreatedAt)
                .order_by_desc(faucet::Column::Id)
                .all(database)
                .await?
                .into_iter()
                .map(Listing::from)
                .collect()
        }
        ListingKind::Waitlist => {
            let mut select = waitlist::Entity::find();
            if let Some(needle) = filter {
                select = select.filter(contains_insensitive(backend, waitlist::Column::Name, needle));
            }
            select
                .order_by_desc(waitlist::Column::CreatedAt)
                .order_by_desc(waitlist::Column::Id)
                .all(database)
                .await?
                .into_iter()
                .map(Listing::from)
                .collect()
        }
    };
    Ok(listings)
}

pub async fn create_listing(
    database: &DatabaseConnection,
    kind: ListingKind,
    new: NewListing,
) -> Result<Listing, StoreError> {
    let now = Utc::now().fixed_offset();
    let created: Listing = match kind {
        ListingKind::Faucet => faucet::ActiveModel {
            id: NotSet,
            name: Set(new.name),
            logo_url: Set(new.logo_url),
            link_url: Set(new.link_url),
            status: Set(new.status),
            created_at: Set(now),
        }
        .insert(database)
        .await?
        .into(),
        ListingKind::Waitlist => waitlist::ActiveModel {
            id: NotSet,
            name: Set(new.name),
            logo_url: Set(new.logo_url),
            link_url: Set(new.link_url),
            status: Set(new.status),
            created_at: Set(now),
        }
        .insert(database)
        .await?
        .into(),
    };
    Ok(created)
}

pub async fn update_listing(
    database: &DatabaseConnection,
    kind: ListingKind,
    id: i32,
    patch: ListingPatch,
) -> Result<Listing, StoreError> {
    let not_found = || StoreError::not_found(kind.label(), id);
    let updated: Listing = match kind {
        ListingKind::Faucet => {
            let existing = faucet::Entity::find_by_id(id)
                .one(database)
                .await?
                .ok_or_else(not_found)?;
            let mut active: faucet::ActiveModel = existing.clone().into();
            if let Some(name) = patch.name {
                active.name = Set(name);
            }
            if let Some(logo_url) = patch.logo_url {
                active.logo_url = Set(logo_url);
            }
            if let Some(link_url) = patch.link_url {
                active.link_url = Set(link_url);
            }
            if let Some(status) = patch.status {
                active.status = Set(status);
            }
            if active.is_changed() {
                active.update(database).await?.into()
            } else {
                existing.into()
            }
        }
        ListingKind::Waitlist => {
            let existing = waitlist::Entity::find_by_id(id)
                .one(database)
                .await?
                .ok_or_else(not_found)?;
            let mut active: waitlist::ActiveModel = existing.clone().into();
            if let Some(name) = patch.name {
                active.name = Set(name);
            }
            if let Some(logo_url) = patch.logo_url {
                active.logo_url = Set(logo_url);
            }
            if let Some(link_url) = patch.link_url {
                active.link_url = Set(link_url);
            }
            if let Some(status) = patch.status {
                active.status = Set(status);
            }
            if active.is_changed() {
                active.update(database).await?.into()
            } else {
                existing.into()
            }
        }
    };
    Ok(updated)
}

pub async fn delete_listing(
    database: &DatabaseConnection,
    kind: ListingKind,
    id: i32,
) -> Result<(), StoreError> {
    let removed = match kind {
        ListingKind::Faucet => faucet::Entity::delete_by_id(id).exec(database).await?,
        ListingKind::Waitlist => waitlist::Entity::delete_by_id(id).exec(database).await?,
    }
    .rows_affected;
    if removed == 0 {
        return Err(StoreError::not_found(kind.label(), id));
    }
    Ok(())
}
