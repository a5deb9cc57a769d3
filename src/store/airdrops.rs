use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    LoaderTrait, ModelTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::debug;

use crate::entities::airdrop::{self, AirdropStatus};
use crate::entities::task;
use crate::validation::MAX_TASKS_PER_AIRDROP;

use super::{StoreError, contains_insensitive};

const AIRDROP: &str = "Airdrop";
const TASK: &str = "Task";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAirdrop {
    pub name: String,
    pub x_handle: String,
    pub website_url: String,
    pub info: String,
    pub logo_url: Option<String>,
    pub tasks: Vec<NewTask>,
}

/// Partial airdrop update. `None` leaves a field untouched; for `logo_url`
/// `Some(None)` clears the stored logo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AirdropPatch {
    pub name: Option<String>,
    pub x_handle: Option<String>,
    pub website_url: Option<String>,
    pub info: Option<String>,
    pub logo_url: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub done: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub done: Option<bool>,
}

/// An airdrop row together with its tasks, ordered by task id.
pub type AirdropWithTasks = (airdrop::Model, Vec<task::Model>);

pub async fn list_airdrops(
    database: &DatabaseConnection,
    filter: Option<&str>,
) -> Result<Vec<AirdropWithTasks>, StoreError> {
    let mut select = airdrop::Entity::find();
    if let Some(needle) = filter {
        let backend = database.get_database_backend();
        select = select.filter(
            Condition::any()
                .add(contains_insensitive(backend, airdrop::Column::Name, needle))
                .add(contains_insensitive(backend, airdrop::Column::Info, needle)),
        );
    }

    let airdrops = select
        .order_by_desc(airdrop::Column::CreatedAt)
        .order_by_desc(airdrop::Column::Id)
        .all(database)
        .await?;
    let tasks = airdrops.load_many(task::Entity, database).await?;
    assert_eq!(airdrops.len(), tasks.len(), "Task groups must align with airdrops");

    Ok(airdrops
        .into_iter()
        .zip(tasks)
        .map(|(model, mut tasks)| {
            tasks.sort_by_key(|task| task.id);
            (model, tasks)
        })
        .collect())
}

pub async fn create_airdrop(
    database: &DatabaseConnection,
    new: NewAirdrop,
) -> Result<AirdropWithTasks, StoreError> {
    assert!(
        new.tasks.len() <= MAX_TASKS_PER_AIRDROP,
        "Initial task count exceeds bound"
    );
    let txn = database.begin().await?;

    let created = airdrop::ActiveModel {
        id: NotSet,
        name: Set(new.name),
        x_handle: Set(new.x_handle),
        website_url: Set(new.website_url),
        info: Set(new.info),
        logo_url: Set(new.logo_url),
        status: Set(AirdropStatus::NotFinished),
        created_at: Set(Utc::now().fixed_offset()),
    }
    .insert(&txn)
    .await?;

    let mut tasks = Vec::with_capacity(new.tasks.len());
    for new_task in new.tasks {
        let task = task::ActiveModel {
            id: NotSet,
            title: Set(new_task.title),
            done: Set(new_task.done),
            airdrop_id: Set(created.id),
        }
        .insert(&txn)
        .await?;
        tasks.push(task);
    }

    txn.commit().await?;
    debug!("Created airdrop {} with {} tasks", created.id, tasks.len());
    Ok((created, tasks))
}

pub async fn update_airdrop(
    database: &DatabaseConnection,
    id: i32,
    patch: AirdropPatch,
) -> Result<AirdropWithTasks, StoreError> {
    let existing = find_airdrop(database, id).await?;
    let mut active: airdrop::ActiveModel = existing.clone().into();

    if let Some(name) = patch.name {
        active.name = Set(name);
    }
    if let Some(x_handle) = patch.x_handle {
        active.x_handle = Set(x_handle);
    }
    if let Some(website_url) = patch.website_url {
        active.website_url = Set(website_url);
    }
    if let Some(info) = patch.info {
        active.info = Set(info);
    }
    if let Some(logo_url) = patch.logo_url {
        active.logo_url = Set(logo_url);
    }

    let updated = if active.is_changed() {
        active.update(database).await?
    } else {
        existing
    };
    with_tasks(database, updated).await
}

pub async fn set_airdrop_status(
    database: &DatabaseConnection,
    id: i32,
    status: AirdropStatus,
) -> Result<AirdropWithTasks, StoreError> {
    let existing = find_airdrop(database, id).await?;
    let mut active: airdrop::ActiveModel = existing.into();
    active.status = Set(status);
    let updated = active.update(database).await?;
    with_tasks(database, updated).await
}

/// Deletes the airdrop and every task it owns.
pub async fn delete_airdrop(database: &DatabaseConnection, id: i32) -> Result<(), StoreError> {
    let txn = database.begin().await?;

    let removed_tasks = task::Entity::delete_many()
        .filter(task::Column::AirdropId.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;
    let removed = airdrop::Entity::delete_by_id(id)
        .exec(&txn)
        .await?
        .rows_affected;
    if removed == 0 {
        txn.rollback().await?;
        return Err(StoreError::not_found(AIRDROP, id));
    }

    txn.commit().await?;
    debug!("Deleted airdrop {id} and {removed_tasks} tasks");
    Ok(())
}

pub async fn create_task(
    database: &DatabaseConnection,
    airdrop_id: i32,
    new: NewTask,
) -> Result<task::Model, StoreError> {
    find_airdrop(database, airdrop_id).await?;
    let created = task::ActiveModel {
        id: NotSet,
        title: Set(new.title),
        done: Set(new.done),
        airdrop_id: Set(airdrop_id),
    }
    .insert(database)
    .await?;
    Ok(created)
}

pub async fn update_task(
    database: &DatabaseConnection,
    id: i32,
    patch: TaskPatch,
) -> Result<task::Model, StoreError> {
    let existing = task::Entity::find_by_id(id)
        .one(database)
        .await?
        .ok_or_else(|| StoreError::not_found(TASK, id))?;
    let mut active: task::ActiveModel = existing.clone().into();

    if let Some(title) = patch.title {
        active.title = Set(title);
    }
    if let Some(done) = patch.done {
        active.done = Set(done);
    }

    if active.is_changed() {
        Ok(active.update(database).await?)
    } else {
        Ok(existing)
    }
}

pub async fn delete_task(database: &DatabaseConnection, id: i32) -> Result<(), StoreError> {
    let removed = task::Entity::delete_by_id(id)
        .exec(database)
        .await?
        .rows_affected;
    if removed == 0 {
        return Err(StoreError::not_found(TASK, id));
    }
    Ok(())
}

async fn find_airdrop(database: &DatabaseConnection, id: i32) -> Result<airdrop::Model, StoreError> {
    airdrop::Entity::find_by_id(id)
        .one(database)
        .await?
        .ok_or_else(|| StoreError::not_found(AIRDROP, id))
}

async fn with_tasks(
    database: &DatabaseConnection,
    model: airdrop::Model,
) -> Result<AirdropWithTasks, StoreError> {
    let tasks = model
        .find_related(task::Entity)
        .order_by_asc(task::Column::Id)
        .all(database)
        .await?;
    Ok((model, tasks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::memory_database;

    fn sample(name: &str, info: &str) -> NewAirdrop {
        NewAirdrop {
            name: name.to_string(),
            x_handle: "@sample".to_string(),
            website_url: "https://sample.io".to_string(),
            info: info.to_string(),
            logo_url: None,
            tasks: Vec::new(),
        }
    }

    #[tokio::test]
    async fn created_airdrop_lists_with_tasks() {
        let db = memory_database().await;
        let mut new = sample("Test", "desc");
        new.tasks = vec![
            NewTask {
                title: "Follow on X".to_string(),
                done: false,
            },
            NewTask {
                title: "Bridge funds".to_string(),
                done: true,
            },
        ];

        let (created, tasks) = create_airdrop(&db, new).await.unwrap();
        assert_eq!(created.status, AirdropStatus::NotFinished);
        assert_eq!(tasks.len(), 2);

        let listed = list_airdrops(&db, None).await.unwrap();
        assert_eq!(listed.len(), 1);
        let (model, tasks) = &listed[0];
        assert_eq!(model.name, "Test");
        assert_eq!(model.x_handle, "@sample");
        assert_eq!(tasks[0].title, "Follow on X");
        assert!(!tasks[0].done);
        assert_eq!(tasks[1].title, "Bridge funds");
        assert!(tasks[1].done);
        assert!(tasks.iter().all(|task| task.airdrop_id == model.id));
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let db = memory_database().await;
        for name in ["first", "second", "third"] {
            create_airdrop(&db, sample(name, "info")).await.unwrap();
        }
        let names: Vec<String> = list_airdrops(&db, None)
            .await
            .unwrap()
            .into_iter()
            .map(|(model, _)| model.name)
            .collect();
        assert_eq!(names, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn filter_matches_name_or_info_case_insensitively() {
        let db = memory_database().await;
        create_airdrop(&db, sample("LayerZero", "omnichain")).await.unwrap();
        create_airdrop(&db, sample("Scroll", "zk rollup by LAYER team")).await.unwrap();
        create_airdrop(&db, sample("Blast", "yield l2")).await.unwrap();
        create_airdrop(&db, sample("Odd 100%", "literal percent")).await.unwrap();

        let mut names: Vec<String> = list_airdrops(&db, Some("layer"))
            .await
            .unwrap()
            .into_iter()
            .map(|(model, _)| model.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["LayerZero", "Scroll"]);

        let percent = list_airdrops(&db, Some("0%")).await.unwrap();
        assert_eq!(percent.len(), 1);
        assert_eq!(percent[0].0.name, "Odd 100%");

        assert!(list_airdrops(&db, Some("nothing")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn partial_update_keeps_omitted_fields() {
        let db = memory_database().await;
        let mut new = sample("Test", "desc");
        new.logo_url = Some("https://cdn.io/logo.png".to_string());
        let (created, _) = create_airdrop(&db, new).await.unwrap();

        let patch = AirdropPatch {
            info: Some("new info".to_string()),
            ..AirdropPatch::default()
        };
        let (updated, _) = update_airdrop(&db, created.id, patch).await.unwrap();
        assert_eq!(updated.info, "new info");
        assert_eq!(updated.name, "Test");
        assert_eq!(updated.logo_url.as_deref(), Some("https://cdn.io/logo.png"));

        let clear_logo = AirdropPatch {
            logo_url: Some(None),
            ..AirdropPatch::default()
        };
        let (cleared, _) = update_airdrop(&db, created.id, clear_logo).await.unwrap();
        assert_eq!(cleared.logo_url, None);

        let (unchanged, _) = update_airdrop(&db, created.id, AirdropPatch::default())
            .await
            .unwrap();
        assert_eq!(unchanged, cleared);
    }

    #[tokio::test]
    async fn missing_records_report_not_found() {
        let db = memory_database().await;
        assert!(matches!(
            update_airdrop(&db, 42, AirdropPatch::default()).await,
            Err(StoreError::NotFound { id: 42, .. })
        ));
        assert!(matches!(
            set_airdrop_status(&db, 42, AirdropStatus::Finished).await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            delete_airdrop(&db, 42).await,
            Err(StoreError::NotFound { .. })
        ));
        let orphan = NewTask {
            title: "orphan".to_string(),
            done: false,
        };
        assert!(matches!(
            create_task(&db, 42, orphan).await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            delete_task(&db, 42).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn deleting_airdrop_removes_its_tasks() {
        let db = memory_database().await;
        let (keep, _) = create_airdrop(&db, sample("keep", "info")).await.unwrap();
        let (doomed, _) = create_airdrop(&db, sample("doomed", "info")).await.unwrap();

        let kept_task = create_task(
            &db,
            keep.id,
            NewTask {
                title: "stay".to_string(),
                done: false,
            },
        )
        .await
        .unwrap();
        let doomed_task = create_task(
            &db,
            doomed.id,
            NewTask {
                title: "go".to_string(),
                done: false,
            },
        )
        .await
        .unwrap();

        delete_airdrop(&db, doomed.id).await.unwrap();

        let remaining = task::Entity::find()
            .filter(task::Column::AirdropId.eq(doomed.id))
            .all(&db)
            .await
            .unwrap();
        assert!(remaining.is_empty());
        assert!(matches!(
            update_task(&db, doomed_task.id, TaskPatch::default()).await,
            Err(StoreError::NotFound { .. })
        ));
        assert_eq!(
            update_task(&db, kept_task.id, TaskPatch::default())
                .await
                .unwrap(),
            kept_task
        );
    }

    #[tokio::test]
    async fn task_partial_update() {
        let db = memory_database().await;
        let (airdrop, _) = create_airdrop(&db, sample("Test", "desc")).await.unwrap();
        let task = create_task(
            &db,
            airdrop.id,
            NewTask {
                title: "Swap".to_string(),
                done: false,
            },
        )
        .await
        .unwrap();

        let toggled = update_task(
            &db,
            task.id,
            TaskPatch {
                done: Some(true),
                ..TaskPatch::default()
            },
        )
        .await
        .unwrap();
        assert!(toggled.done);
        assert_eq!(toggled.title, "Swap");

        delete_task(&db, task.id).await.unwrap();
        assert!(matches!(
            delete_task(&db, task.id).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn status_update_round_trips() {
        let db = memory_database().await;
        let (airdrop, _) = create_airdrop(&db, sample("Test", "desc")).await.unwrap();
        let (finished, _) = set_airdrop_status(&db, airdrop.id, AirdropStatus::Finished)
            .await
            .unwrap();
        assert_eq!(finished.status, AirdropStatus::Finished);
        let listed = list_airdrops(&db, None).await.unwrap();
        assert_eq!(listed[0].0.status, AirdropStatus::Finished);
    }
}
