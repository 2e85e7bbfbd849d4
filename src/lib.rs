//! # Roster
//!
//! Member and team search over SQLite with type-safe dynamic predicates.
//!
//! Roster provides:
//! - Typed query paths for the `member` and `team` tables
//! - Search conditions whose absent fields contribute no constraint
//! - Paged search returning a bounded slice plus the total match count
//! - A repository over an in-memory or file-based SQLite database
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use roster::prelude::*;
//!
//! # async fn run() -> QueryResult<()> {
//! let repo = MemberRepository::in_memory().await?;
//! let team_a = repo.save_team("teamA").await?;
//! repo.save(NewMember::new("member1", 10).team(&team_a)).await?;
//! repo.save(NewMember::new("member2", 20).team(&team_a)).await?;
//!
//! let member = QMember::member();
//! let page = repo
//!     .search_page_simple(
//!         &MemberSearchCondition::default().age_goe(15),
//!         PageRequest::new(0, 10),
//!         [member.username.desc()],
//!     )
//!     .await?;
//!
//! assert_eq!(page.total(), 1);
//! assert_eq!(page.content()[0].username.as_deref(), Some("member2"));
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod condition;
pub mod config;
pub mod dto;
pub mod entity;
pub mod repository;
pub mod schema;

/// Query building and search.
pub mod query {
    pub use roster_query::*;
}

/// SQLite data source.
pub mod sqlite {
    pub use roster_sqlite::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::condition::MemberSearchCondition;
    pub use crate::config::RosterConfig;
    pub use crate::dto::{MemberDto, MemberTeamDto, TeamAgeDto, UserDto};
    pub use crate::entity::{Member, NewMember, QMember, QTeam, Team};
    pub use crate::repository::MemberRepository;
    pub use roster_query::prelude::*;
}

// Re-export key types at the crate root
pub use condition::MemberSearchCondition;
pub use config::{ConfigError, ConfigResult, RosterConfig};
pub use repository::MemberRepository;
pub use roster_query::{QueryError, QueryResult};
