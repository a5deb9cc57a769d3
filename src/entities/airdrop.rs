//! Airdrop campaigns tracked on the dashboard.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "airdrops")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "String(StringLen::N(256))")]
    pub name: String,
    /// Social handle or full profile URL
    #[sea_orm(column_type = "String(StringLen::N(512))")]
    pub x_handle: String,
    #[sea_orm(column_type = "Text")]
    pub website_url: String,
    #[sea_orm(column_type = "Text")]
    pub info: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub logo_url: Option<String>,
    /// Completion flag, cleared once per UTC day by the reset gate
    pub status: AirdropStatus,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AirdropStatus {
    #[sea_orm(string_value = "FINISHED")]
    Finished,
    #[sea_orm(string_value = "NOT_FINISHED")]
    NotFinished,
}

impl AirdropStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Finished => "FINISHED",
            Self::NotFinished => "NOT_FINISHED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "FINISHED" => Some(Self::Finished),
            "NOT_FINISHED" => Some(Self::NotFinished),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::task::Entity")]
    Task,
}

impl Related<super::task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Task.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
