use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::airdrop::AirdropStatus;
use crate::entities::{airdrop, task};
use crate::store::airdrops::{AirdropPatch, NewAirdrop, NewTask, TaskPatch};
use crate::validation::{
    FieldErrors, MAX_TASKS_PER_AIRDROP, Nullable, sanitize_handle, sanitize_info, sanitize_name,
    sanitize_title, sanitize_url,
};

use super::nullable_field;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AirdropView {
    pub id: i32,
    pub name: String,
    pub x_handle: String,
    pub website_url: String,
    pub info: String,
    pub logo_url: Option<String>,
    pub status: AirdropStatus,
    pub created_at: DateTime<Utc>,
    pub tasks: Vec<TaskView>,
}

impl AirdropView {
    pub fn new(model: airdrop::Model, tasks: Vec<task::Model>) -> Self {
        Self {
            id: model.id,
            name: model.name,
            x_handle: model.x_handle,
            website_url: model.website_url,
            info: model.info,
            logo_url: model.logo_url,
            status: model.status,
            created_at: model.created_at.with_timezone(&Utc),
            tasks: tasks.into_iter().map(TaskView::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: i32,
    pub title: String,
    pub done: bool,
    pub airdrop_id: i32,
}

impl From<task::Model> for TaskView {
    fn from(model: task::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            done: model.done,
            airdrop_id: model.airdrop_id,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AirdropRequest {
    #[serde(deserialize_with = "nullable_field")]
    pub name: Nullable<String>,
    #[serde(deserialize_with = "nullable_field")]
    pub x_handle: Nullable<String>,
    #[serde(deserialize_with = "nullable_field")]
    pub website_url: Nullable<String>,
    #[serde(deserialize_with = "nullable_field")]
    pub info: Nullable<String>,
    #[serde(deserialize_with = "nullable_field")]
    pub logo_url: Nullable<String>,
    #[serde(deserialize_with = "nullable_field")]
    pub tasks: Nullable<Vec<TaskRequest>>,
}

impl AirdropRequest {
    pub fn into_new(self) -> Result<NewAirdrop, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = errors.require("name", self.name, sanitize_name);
        let x_handle = errors.require("xHandle", self.x_handle, sanitize_handle);
        let website_url = errors.require("websiteUrl", self.website_url, sanitize_url);
        let info = errors.require("info", self.info, sanitize_info);
        let logo_url = errors.check("logoUrl", self.logo_url.flatten().map(Some), sanitize_url);

        let requests = errors
            .non_null("tasks", self.tasks, "array")
            .unwrap_or_default();
        if requests.len() > MAX_TASKS_PER_AIRDROP {
            errors.push(
                "tasks",
                format!("At most {MAX_TASKS_PER_AIRDROP} tasks per airdrop"),
            );
        }
        let mut tasks = Vec::with_capacity(requests.len());
        for (index, request) in requests.into_iter().enumerate() {
            let title = errors.require(&format!("tasks.{index}.title"), request.title, sanitize_title);
            let done = errors.non_null(&format!("tasks.{index}.done"), request.done, "boolean");
            if let Some(title) = title {
                tasks.push(NewTask {
                    title,
                    done: done.unwrap_or(false),
                });
            }
        }

        match (name, x_handle, website_url, info) {
            (Some(name), Some(x_handle), Some(website_url), Some(info)) => errors.finish(NewAirdrop {
                name,
                x_handle,
                website_url,
                info,
                logo_url,
                tasks,
            }),
            _ => Err(errors),
        }
    }

    /// Validates the supplied fields only. `tasks` is ignored on update.
    pub fn into_patch(self) -> Result<AirdropPatch, FieldErrors> {
        let mut errors = FieldErrors::new();
        let patch = AirdropPatch {
            name: errors.check("name", self.name, sanitize_name),
            x_handle: errors.check("xHandle", self.x_handle, sanitize_handle),
            website_url: errors.check("websiteUrl", self.website_url, sanitize_url),
            info: errors.check("info", self.info, sanitize_info),
            logo_url: match self.logo_url {
                None => None,
                Some(None) => Some(None),
                Some(url) => errors.check("logoUrl", Some(url), sanitize_url).map(Some),
            },
        };
        errors.finish(patch)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TaskRequest {
    #[serde(deserialize_with = "nullable_field")]
    pub title: Nullable<String>,
    #[serde(deserialize_with = "nullable_field")]
    pub done: Nullable<bool>,
}

impl TaskRequest {
    pub fn into_new(self) -> Result<NewTask, FieldErrors> {
        let mut errors = FieldErrors::new();
        let title = errors.require("title", self.title, sanitize_title);
        let done = errors.non_null("done", self.done, "boolean");
        match title {
            Some(title) => errors.finish(NewTask {
                title,
                done: done.unwrap_or(false),
            }),
            None => Err(errors),
        }
    }

    pub fn into_patch(self) -> Result<TaskPatch, FieldErrors> {
        let mut errors = FieldErrors::new();
        let patch = TaskPatch {
            title: errors.check("title", self.title, sanitize_title),
            done: errors.non_null("done", self.done, "boolean"),
        };
        errors.finish(patch)
    }
}

const STATUS_CHOICES: &str = "'FINISHED' | 'NOT_FINISHED'";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusRequest {
    #[serde(deserialize_with = "nullable_field")]
    pub status: Nullable<String>,
}

impl StatusRequest {
    pub fn into_status(self) -> Result<AirdropStatus, FieldErrors> {
        let mut errors = FieldErrors::new();
        let status = errors
            .required("status", self.status, STATUS_CHOICES)
            .and_then(|raw| {
                let parsed = AirdropStatus::parse(&raw);
                if parsed.is_none() {
                    errors.push(
                        "status",
                        format!("Invalid enum value. Expected {STATUS_CHOICES}, received '{raw}'"),
                    );
                }
                parsed
            });
        match status {
            Some(status) => errors.finish(status),
            None => Err(errors),
        }
    }
}
