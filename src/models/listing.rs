use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::listings::{Listing, ListingPatch, NewListing};
use crate::validation::{FieldErrors, Nullable, sanitize_name, sanitize_url};

use super::nullable_field;

/// Wire shape shared by faucets and waitlists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingView {
    pub id: i32,
    pub name: String,
    pub logo_url: Option<String>,
    pub link_url: String,
    pub status: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Listing> for ListingView {
    fn from(listing: Listing) -> Self {
        Self {
            id: listing.id,
            name: listing.name,
            logo_url: listing.logo_url,
            link_url: listing.link_url,
            status: listing.status,
            created_at: listing.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingRequest {
    #[serde(deserialize_with = "nullable_field")]
    pub name: Nullable<String>,
    #[serde(deserialize_with = "nullable_field")]
    pub logo_url: Nullable<String>,
    #[serde(deserialize_with = "nullable_field")]
    pub link_url: Nullable<String>,
    #[serde(deserialize_with = "nullable_field")]
    pub status: Nullable<bool>,
}

impl ListingRequest {
    pub fn into_new(self) -> Result<NewListing, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = errors.require("name", self.name, sanitize_name);
        let link_url = errors.require("linkUrl", self.link_url, sanitize_url);
        let logo_url = errors.check("logoUrl", self.logo_url.flatten().map(Some), sanitize_url);
        let status = errors.non_null("status", self.status, "boolean");
        match (name, link_url) {
            (Some(name), Some(link_url)) => errors.finish(NewListing {
                name,
                logo_url,
                link_url,
                status: status.unwrap_or(false),
            }),
            _ => Err(errors),
        }
    }

    pub fn into_patch(self) -> Result<ListingPatch, FieldErrors> {
        let mut errors = FieldErrors::new();
        let patch = ListingPatch {
            name: errors.check("name", self.name, sanitize_name),
            logo_url: match self.logo_url {
                None => None,
                Some(None) => Some(None),
                Some(url) => errors.check("logoUrl", Some(url), sanitize_url).map(Some),
            },
            link_url: errors.check("linkUrl", self.link_url, sanitize_url),
            status: errors.non_null("status", self.status, "boolean"),
        };
        errors.finish(patch)
    }
}
