//! Shared fixture: two teams and four members.

#![allow(dead_code)]

use roster::prelude::*;

/// The seeded repository and its teams.
pub struct Fixture {
    pub repo: MemberRepository,
    pub team_a: Team,
    pub team_b: Team,
}

/// member1 (10) and member2 (20) in teamA; member3 (30) and member4 (40) in teamB.
pub async fn fixture() -> Fixture {
    fixture_with(&RosterConfig::default()).await
}

/// The same data in a repository opened with `config`.
pub async fn fixture_with(config: &RosterConfig) -> Fixture {
    roster_query::init_logging();
    let repo = MemberRepository::connect(config).await.unwrap();
    let team_a = repo.save_team("teamA").await.unwrap();
    let team_b = repo.save_team("teamB").await.unwrap();

    for (name, age, team) in [
        ("member1", 10, &team_a),
        ("member2", 20, &team_a),
        ("member3", 30, &team_b),
        ("member4", 40, &team_b),
    ] {
        repo.save(NewMember::new(name, age).team(team)).await.unwrap();
    }

    Fixture {
        repo,
        team_a,
        team_b,
    }
}

/// Usernames of `rows`, in order.
pub fn usernames(rows: &[MemberTeamDto]) -> Vec<&str> {
    rows.iter()
        .map(|r| r.username.as_deref().unwrap_or("<null>"))
        .collect()
}
