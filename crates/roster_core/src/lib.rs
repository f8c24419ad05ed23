//! Typed data-access layer for members, teams and items over SQLite.
//!
//! Queries are expressed as structured specifications, related data is
//! fetched eagerly and explicitly, and every write runs through a
//! repository that validates entities first.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod projection;
pub mod query;
pub mod repo;

pub use config::{ConfigError, RosterConfig};
pub use db::{open_db, open_db_in_memory, open_from_config, DbError, DbResult, UnitOfWork};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::item::{Item, ItemId};
pub use model::member::{Member, MemberId};
pub use model::team::{Team, TeamId};
pub use model::{ModelError, ModelResult};
pub use projection::{MemberDto, MemberProjection, MemberWithTeam, UsernameOnly};
pub use query::{
    Direction, ItemField, MemberExample, MemberField, MemberSpec, Page, PageRequest, Slice, Sort,
    TeamField,
};
pub use repo::item_repo::SqliteItemRepository;
pub use repo::member_repo::{MemberRepository, SqliteMemberRepository};
pub use repo::team_repo::{SqliteTeamRepository, TeamRepository};
pub use repo::{CrudRepository, RepoError, RepoResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
