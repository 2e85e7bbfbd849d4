//! Member search conditions.

use roster_query::{predicate_for, Filter, SearchCondition};
use serde::{Deserialize, Serialize};

use crate::entity::{QMember, QTeam};

/// Optional filters for a member search. Absent fields match everything.
///
/// ```rust
/// use roster::condition::MemberSearchCondition;
/// use roster_query::{Filter, SearchCondition};
///
/// assert_eq!(MemberSearchCondition::default().predicate(), Filter::None);
///
/// let cond = MemberSearchCondition::default().age_goe(20).age_loe(30);
/// assert_eq!(cond.predicate().condition_count(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberSearchCondition {
    /// Exact username.
    pub username: Option<String>,
    /// Exact team name.
    pub team_name: Option<String>,
    /// Minimum age, inclusive.
    pub age_goe: Option<i32>,
    /// Maximum age, inclusive.
    pub age_loe: Option<i32>,
}

impl MemberSearchCondition {
    /// Match this username.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Match members of the team with this name.
    pub fn team_name(mut self, team_name: impl Into<String>) -> Self {
        self.team_name = Some(team_name.into());
        self
    }

    /// Match members at least this old.
    pub fn age_goe(mut self, age: i32) -> Self {
        self.age_goe = Some(age);
        self
    }

    /// Match members at most this old.
    pub fn age_loe(mut self, age: i32) -> Self {
        self.age_loe = Some(age);
        self
    }

    /// Constraints against explicit member and team aliases.
    pub fn constraints_for(&self, member: &QMember, team: &QTeam) -> Vec<Option<Filter>> {
        vec![
            predicate_for(self.username.clone(), &member.username),
            predicate_for(self.team_name.clone(), &team.name),
            member.age.goe_opt(self.age_goe),
            member.age.loe_opt(self.age_loe),
        ]
    }
}

impl SearchCondition for MemberSearchCondition {
    fn constraints(&self) -> Vec<Option<Filter>> {
        self.constraints_for(&QMember::member(), &QTeam::team())
    }
}
