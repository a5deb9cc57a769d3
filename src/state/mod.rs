use std::sync::Arc;
use std::time::Instant;

use sea_orm::DatabaseConnection;

use crate::reset::ResetGate;

#[derive(Clone)]
pub struct AppState {
    pub database: DatabaseConnection,
    pub reset_gate: Arc<ResetGate>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(database: DatabaseConnection, reset_gate: Arc<ResetGate>) -> Self {
        Self {
            database,
            reset_gate,
            start_time: Instant::now(),
        }
    }
}
