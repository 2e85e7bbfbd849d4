//! Integration tests for dynamic member search.
//!
//! These tests run searches against a seeded in-memory database and check
//! predicate composition, paging bounds, totals, and error surfacing.

mod common;

use common::{fixture, fixture_with, usernames};
use pretty_assertions::assert_eq;
use roster::prelude::*;
use roster_query::ErrorCode;

#[tokio::test]
async fn test_single_field_condition() {
    let f = fixture().await;
    let cond = MemberSearchCondition::default().username("member1");

    let rows = f.repo.search(&cond).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].age, 10);
    assert_eq!(rows[0].team_name.as_deref(), Some("teamA"));
    assert_eq!(rows[0].team_id, Some(f.team_a.id));
}

#[tokio::test]
async fn test_empty_condition_matches_all() {
    let f = fixture().await;
    let rows = f.repo.search(&MemberSearchCondition::default()).await.unwrap();
    assert_eq!(usernames(&rows), vec!["member1", "member2", "member3", "member4"]);
}

#[tokio::test]
async fn test_search_page_simple_first_page() {
    let f = fixture().await;
    let page = f
        .repo
        .search_page_simple(&MemberSearchCondition::default(), PageRequest::of(0, 3), [])
        .await
        .unwrap();

    assert_eq!(page.len(), 3);
    assert_eq!(page.total(), 4);
    assert_eq!(usernames(page.content()), vec!["member1", "member2", "member3"]);
    assert!(page.has_next());
    assert_eq!(page.total_pages(), 2);
}

#[tokio::test]
async fn test_offset_limit_with_descending_sort() {
    let f = fixture().await;
    let m = QMember::member();
    let page = f
        .repo
        .search_page_simple(
            &MemberSearchCondition::default(),
            PageRequest::new(1, 2),
            [m.username.desc()],
        )
        .await
        .unwrap();

    assert_eq!(usernames(page.content()), vec!["member3", "member2"]);
    assert_eq!(page.total(), 4);
    assert_eq!(page.offset(), 1);
    assert_eq!(page.limit(), 2);
}

#[tokio::test]
async fn test_zero_limit_is_rejected() {
    let f = fixture().await;
    let err = f
        .repo
        .search_page_simple(&MemberSearchCondition::default(), PageRequest::new(0, 0), [])
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidPageRequest);
}

#[tokio::test]
async fn test_negative_offset_is_rejected() {
    let f = fixture().await;
    let err = f
        .repo
        .search_page_complex(&MemberSearchCondition::default(), PageRequest::new(-1, 5), [])
        .await
        .unwrap_err();
    assert!(err.is_invalid_page_request());
}

#[tokio::test]
async fn test_invalid_page_never_reaches_data_source() {
    let f = fixture().await;
    let repo = f.repo.clone();
    f.repo.close().await.unwrap();

    // a closed source would fail with DataSourceUnavailable if it were used
    let err = repo
        .search_page_simple(&MemberSearchCondition::default(), PageRequest::new(0, 0), [])
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidPageRequest);
}

#[tokio::test]
async fn test_closed_connection_is_unavailable() {
    let f = fixture().await;
    let repo = f.repo.clone();
    f.repo.close().await.unwrap();

    let err = repo
        .search_page_simple(&MemberSearchCondition::default(), PageRequest::new(0, 10), [])
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::DataSourceUnavailable);

    let err = repo.search(&MemberSearchCondition::default()).await.unwrap_err();
    assert!(err.is_unavailable());
}

#[tokio::test]
async fn test_team_and_age_range() {
    let f = fixture().await;

    let by_team = f
        .repo
        .search(&MemberSearchCondition::default().team_name("teamB"))
        .await
        .unwrap();
    assert_eq!(usernames(&by_team), vec!["member3", "member4"]);
    assert!(by_team.iter().all(|r| r.team_id == Some(f.team_b.id)));

    let by_age = f
        .repo
        .search(&MemberSearchCondition::default().age_goe(15).age_loe(35))
        .await
        .unwrap();
    assert_eq!(usernames(&by_age), vec!["member2", "member3"]);

    let all = f
        .repo
        .search(
            &MemberSearchCondition::default()
                .username("member4")
                .team_name("teamB")
                .age_goe(35)
                .age_loe(40),
        )
        .await
        .unwrap();
    assert_eq!(usernames(&all), vec!["member4"]);
}

#[tokio::test]
async fn test_no_match() {
    let f = fixture().await;
    let cond = MemberSearchCondition::default().team_name("teamA").age_goe(30);
    let page = f
        .repo
        .search_page_simple(&cond, PageRequest::new(0, 10), [])
        .await
        .unwrap();
    assert!(page.is_empty());
    assert_eq!(page.total(), 0);
}

#[tokio::test]
async fn test_constraint_order_does_not_change_results() {
    let f = fixture().await;
    let m = QMember::member();
    let t = QTeam::team();
    let executor = SearchExecutor::new(f.repo.engine(), MemberTeamDto::projection(&m, &t));

    let forward = combine([Some(m.age.goe(15)), Some(t.name.eq("teamB")), None]);
    let backward = combine([None, Some(t.name.eq("teamB")), Some(m.age.goe(15))]);

    let a: Vec<MemberTeamDto> = executor.list(&forward, [m.id.asc()]).await.unwrap();
    let b: Vec<MemberTeamDto> = executor.list(&backward, [m.id.asc()]).await.unwrap();
    assert_eq!(a, b);
    assert_eq!(usernames(&a), vec!["member3", "member4"]);
}

#[tokio::test]
async fn test_page_bounded_by_limit() {
    let f = fixture().await;
    for limit in 1..=5 {
        let page = f
            .repo
            .search_page_simple(&MemberSearchCondition::default(), PageRequest::new(0, limit), [])
            .await
            .unwrap();
        assert!(page.len() as i64 <= limit);
        assert_eq!(page.total(), 4);
    }
}

#[tokio::test]
async fn test_lazy_count_totals() {
    let f = fixture().await;
    let cond = MemberSearchCondition::default();

    // short first page
    let page = f
        .repo
        .search_page_complex(&cond, PageRequest::new(0, 10), [])
        .await
        .unwrap();
    assert_eq!((page.len(), page.total()), (4, 4));

    // full page: count query decides
    let page = f
        .repo
        .search_page_complex(&cond, PageRequest::new(0, 2), [])
        .await
        .unwrap();
    assert_eq!((page.len(), page.total()), (2, 4));

    // partial last page
    let page = f
        .repo
        .search_page_complex(&cond, PageRequest::new(3, 2), [])
        .await
        .unwrap();
    assert_eq!(usernames(page.content()), vec!["member4"]);
    assert_eq!(page.total(), 4);

    // past the end
    let page = f
        .repo
        .search_page_complex(&cond, PageRequest::new(10, 2), [])
        .await
        .unwrap();
    assert!(page.is_empty());
    assert_eq!(page.total(), 4);
}

#[tokio::test]
async fn test_member_without_team_is_kept() {
    let f = fixture().await;
    f.repo.save(NewMember::new("loner", 50)).await.unwrap();

    let rows = f
        .repo
        .search(&MemberSearchCondition::default().age_goe(45))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].team_id, None);
    assert_eq!(rows[0].team_name, None);
}

#[tokio::test]
async fn test_configured_count_strategy() {
    let config: RosterConfig = r#"
        [search]
        default_page_size = 3
        count_strategy = "lazy"
    "#
    .parse()
    .unwrap();
    let f = fixture_with(&config).await;

    let page = f
        .repo
        .search_page(&MemberSearchCondition::default(), f.repo.default_page(), [])
        .await
        .unwrap();
    assert_eq!(page.len(), 3);
    assert_eq!(page.total(), 4);
}

#[tokio::test]
async fn test_nulls_last_sort_in_search() {
    let f = fixture().await;
    f.repo.save(NewMember::anonymous(25).team(&f.team_a)).await.unwrap();
    let m = QMember::member();

    let page = f
        .repo
        .search_page_simple(
            &MemberSearchCondition::default().team_name("teamA"),
            PageRequest::new(0, 10),
            [m.username.asc().nulls_last()],
        )
        .await
        .unwrap();
    assert_eq!(usernames(page.content()), vec!["member1", "member2", "<null>"]);
    assert_eq!(page.total(), 3);
}

#[tokio::test]
async fn test_nulls_first_sort_in_search() {
    let f = fixture().await;
    f.repo.save(NewMember::anonymous(25).team(&f.team_a)).await.unwrap();
    let m = QMember::member();

    let page = f
        .repo
        .search_page_simple(
            &MemberSearchCondition::default().team_name("teamA"),
            PageRequest::new(0, 10),
            [m.username.desc().nulls_first()],
        )
        .await
        .unwrap();
    assert_eq!(usernames(page.content()), vec!["<null>", "member2", "member1"]);
    assert_eq!(page.total(), 3);
}
