//! Member and team entities and their query paths.
//!
//! Entities are plain rows; relations are foreign key ids. Query paths
//! ([`QMember`], [`QTeam`]) bind typed column handles to a table alias, so
//! the same table can appear twice in one statement:
//!
//! ```rust
//! use roster::entity::QMember;
//!
//! let member = QMember::member();
//! let member_sub = QMember::new("memberSub");
//! assert_eq!(member.age.to_string(), "m.age");
//! assert_eq!(member_sub.age.to_string(), "memberSub.age");
//! ```

use std::borrow::Cow;

use roster_query::{Expr, Filter, InsertQuery, Path, SelectItem, TableRef};
use serde::{Deserialize, Serialize};

/// A team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Row id.
    pub id: i64,
    /// Team name.
    pub name: String,
}

/// A member, optionally belonging to one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Row id.
    pub id: i64,
    /// Display name; may be missing.
    pub username: Option<String>,
    /// Age in years.
    pub age: i32,
    /// Owning team.
    pub team_id: Option<i64>,
}

impl Member {
    /// Whether this member belongs to `team`.
    pub fn is_in(&self, team: &Team) -> bool {
        self.team_id == Some(team.id)
    }
}

/// A member that has not been saved yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewMember {
    /// Display name.
    pub username: Option<String>,
    /// Age in years.
    pub age: i32,
    /// Owning team.
    pub team_id: Option<i64>,
}

impl NewMember {
    /// A named member without a team.
    pub fn new(username: impl Into<String>, age: i32) -> Self {
        Self {
            username: Some(username.into()),
            age,
            team_id: None,
        }
    }

    /// A member with no username.
    pub fn anonymous(age: i32) -> Self {
        Self {
            username: None,
            age,
            team_id: None,
        }
    }

    /// Assign the member to `team`.
    pub fn team(mut self, team: &Team) -> Self {
        self.team_id = Some(team.id);
        self
    }

    pub(crate) fn insert_query(&self) -> InsertQuery {
        InsertQuery::into_table(QMember::TABLE)
            .value("username", self.username.clone())
            .value("age", self.age)
            .value("team_id", self.team_id)
    }
}

/// Query paths for the `member` table under one alias.
#[derive(Debug, Clone, PartialEq)]
pub struct QMember {
    alias: Cow<'static, str>,
    /// `id`
    pub id: Path<i64>,
    /// `username`
    pub username: Path<String>,
    /// `age`
    pub age: Path<i32>,
    /// `team_id`
    pub team_id: Path<i64>,
}

impl QMember {
    /// Table name.
    pub const TABLE: &'static str = "member";

    /// Paths under `alias`.
    pub fn new(alias: impl Into<Cow<'static, str>>) -> Self {
        let alias = alias.into();
        Self {
            id: Path::new(alias.clone(), "id"),
            username: Path::new(alias.clone(), "username"),
            age: Path::new(alias.clone(), "age"),
            team_id: Path::new(alias.clone(), "team_id"),
            alias,
        }
    }

    /// The default alias, `m`.
    pub fn member() -> Self {
        Self::new("m")
    }

    /// The table alias.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// `member AS alias`
    pub fn table(&self) -> TableRef {
        TableRef::aliased(Self::TABLE, self.alias.clone())
    }

    /// Every column of this alias.
    pub fn all(&self) -> SelectItem {
        SelectItem::AllFrom(self.alias.clone())
    }

    /// Number of members.
    pub fn count(&self) -> Expr {
        self.id.count()
    }
}

impl Default for QMember {
    fn default() -> Self {
        Self::member()
    }
}

/// Query paths for the `team` table under one alias.
#[derive(Debug, Clone, PartialEq)]
pub struct QTeam {
    alias: Cow<'static, str>,
    /// `id`
    pub id: Path<i64>,
    /// `name`
    pub name: Path<String>,
}

impl QTeam {
    /// Table name.
    pub const TABLE: &'static str = "team";

    /// Paths under `alias`.
    pub fn new(alias: impl Into<Cow<'static, str>>) -> Self {
        let alias = alias.into();
        Self {
            id: Path::new(alias.clone(), "id"),
            name: Path::new(alias.clone(), "name"),
            alias,
        }
    }

    /// The default alias, `t`.
    pub fn team() -> Self {
        Self::new("t")
    }

    /// The table alias.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// `team AS alias`
    pub fn table(&self) -> TableRef {
        TableRef::aliased(Self::TABLE, self.alias.clone())
    }

    /// Every column of this alias.
    pub fn all(&self) -> SelectItem {
        SelectItem::AllFrom(self.alias.clone())
    }

    /// Join condition between `member` and this team.
    pub fn owns(&self, member: &QMember) -> Filter {
        member.team_id.eq_path(&self.id)
    }
}

impl Default for QTeam {
    fn default() -> Self {
        Self::team()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_aliases() {
        let m = QMember::new("memberSub");
        assert_eq!(m.alias(), "memberSub");
        assert_eq!(m.username.to_string(), "memberSub.username");
        assert_eq!(QTeam::team().name.to_string(), "t.name");
    }

    #[test]
    fn test_join_condition() {
        let (sql, params) = QTeam::team().owns(&QMember::member()).to_sql();
        assert_eq!(sql, "\"m\".\"team_id\" = \"t\".\"id\"");
        assert!(params.is_empty());
    }

    #[test]
    fn test_new_member_insert() {
        let team = Team {
            id: 7,
            name: "teamA".into(),
        };
        let (sql, params) = NewMember::new("member1", 10).team(&team).insert_query().to_sql();
        assert_eq!(
            sql,
            "INSERT INTO \"member\" (\"username\", \"age\", \"team_id\") VALUES (?1, ?2, ?3)"
        );
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_member_is_in() {
        let team = Team {
            id: 1,
            name: "teamA".into(),
        };
        let member = Member {
            id: 1,
            username: None,
            age: 1,
            team_id: Some(1),
        };
        assert!(member.is_in(&team));
    }
}
