//! Projection targets.
//!
//! Each DTO is decoded from rows whose output column names match its fields;
//! the `projection` helpers select the right expressions under those names.

use roster_query::SelectQuery;
use serde::{Deserialize, Serialize};

use crate::entity::{QMember, QTeam};

/// Username and age of a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDto {
    /// Member username.
    pub username: Option<String>,
    /// Member age.
    pub age: i32,
}

impl MemberDto {
    /// `SELECT m.username, m.age FROM member m`
    pub fn projection(member: &QMember) -> SelectQuery {
        SelectQuery::new(member.table())
            .column(&member.username)
            .column(&member.age)
    }
}

/// A member projected under different field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDto {
    /// Projected from the username.
    pub name: Option<String>,
    /// Any age-valued expression, such as a subquery.
    pub age: Option<i32>,
}

/// One row of a member search: the member and its team, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberTeamDto {
    /// Member id.
    pub member_id: i64,
    /// Member username.
    pub username: Option<String>,
    /// Member age.
    pub age: i32,
    /// Team id, absent for members without a team.
    pub team_id: Option<i64>,
    /// Team name, absent for members without a team.
    pub team_name: Option<String>,
}

impl MemberTeamDto {
    /// Members left-joined to their teams, selected under this DTO's names.
    pub fn projection(member: &QMember, team: &QTeam) -> SelectQuery {
        SelectQuery::new(member.table())
            .left_join(team.table(), team.owns(member))
            .expr_as(&member.id, "member_id")
            .expr_as(&member.username, "username")
            .expr_as(&member.age, "age")
            .expr_as(&team.id, "team_id")
            .expr_as(&team.name, "team_name")
    }
}

/// Team name and the average age of its members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamAgeDto {
    /// Team name.
    pub name: String,
    /// Average age of the team's members.
    pub avg_age: f64,
}

impl TeamAgeDto {
    /// Average member age per team, ordered by team name.
    pub fn projection(member: &QMember, team: &QTeam) -> SelectQuery {
        SelectQuery::new(member.table())
            .inner_join(team.table(), team.owns(member))
            .expr_as(&team.name, "name")
            .expr_as(member.age.avg(), "avg_age")
            .group_by(&team.name)
            .order_by(team.name.asc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_member_team_projection_sql() {
        let (sql, params) =
            MemberTeamDto::projection(&QMember::member(), &QTeam::team()).to_sql();
        assert_eq!(
            sql,
            "SELECT \"m\".\"id\" AS \"member_id\", \"m\".\"username\" AS \"username\", \
             \"m\".\"age\" AS \"age\", \"t\".\"id\" AS \"team_id\", \"t\".\"name\" AS \"team_name\" \
             FROM \"member\" AS \"m\" LEFT JOIN \"team\" AS \"t\" ON \"m\".\"team_id\" = \"t\".\"id\""
        );
        assert!(params.is_empty());
    }

    #[test]
    fn test_team_age_projection_is_grouped() {
        let query = TeamAgeDto::projection(&QMember::member(), &QTeam::team());
        assert!(query.is_grouped());
    }

    #[test]
    fn test_decode_member_dto() {
        let dto: MemberDto =
            serde_json::from_value(serde_json::json!({"username": "member1", "age": 10})).unwrap();
        assert_eq!(
            dto,
            MemberDto {
                username: Some("member1".into()),
                age: 10
            }
        );
    }
}
