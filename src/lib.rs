pub mod domain {
    pub mod board;
    pub mod entity;
    pub mod focus;
    pub mod models;
}

pub mod infrastructure {
    pub mod config;
    pub mod credential_store;
    pub mod error;
    pub mod logging;
    pub mod remote_store;
}

pub mod application {
    pub mod bootstrap;
    pub mod commands;
    pub mod entity_manager;
    pub mod focus_timer;
    pub mod forms;
    pub mod mission_data;
    pub mod optimistic;

    #[cfg(test)]
    pub(crate) mod testing;
}

pub use application::commands::AppState;
pub use application::mission_data::{HydrationStatus, MissionData};
pub use domain::entity::{Entity, EntityKind};
pub use infrastructure::error::InfraError;
