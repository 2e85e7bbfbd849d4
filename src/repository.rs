//! Member repository.
//!
//! CRUD-style lookups plus the dynamic member search, all over one
//! [`SqliteEngine`].

use roster_query::{
    CountStrategy, Filter, InsertQuery, OrderByField, Page, PageRequest, QueryResult,
    SearchCondition, SearchExecutor, SelectQuery,
};
use roster_sqlite::SqliteEngine;
use tracing::{debug, info};

use crate::condition::MemberSearchCondition;
use crate::config::RosterConfig;
use crate::dto::MemberTeamDto;
use crate::entity::{Member, NewMember, QMember, QTeam, Team};
use crate::schema::{DROP_SCHEMA, SCHEMA};

/// Data access for members and teams.
///
/// Cloning is cheap; clones share the engine and its connection.
#[derive(Debug, Clone)]
pub struct MemberRepository {
    engine: SqliteEngine,
    count_strategy: CountStrategy,
    default_page_size: i64,
}

impl MemberRepository {
    /// Wrap an engine whose schema already exists.
    pub fn new(engine: SqliteEngine) -> Self {
        let defaults = RosterConfig::default();
        Self {
            engine,
            count_strategy: defaults.search.count_strategy,
            default_page_size: defaults.search.default_page_size,
        }
    }

    /// Open the configured database and create the schema.
    pub async fn connect(config: &RosterConfig) -> QueryResult<Self> {
        let sqlite = config.sqlite_config()?;
        info!(path = %sqlite.path, "Opening member repository");
        let engine = SqliteEngine::connect(&sqlite).await?;

        let repo = Self {
            engine,
            count_strategy: config.search.count_strategy,
            default_page_size: config.search.default_page_size,
        };
        repo.create_schema().await?;
        Ok(repo)
    }

    /// A fresh in-memory database with default settings.
    pub async fn in_memory() -> QueryResult<Self> {
        Self::connect(&RosterConfig::default()).await
    }

    /// The underlying engine, for ad-hoc queries.
    pub fn engine(&self) -> &SqliteEngine {
        &self.engine
    }

    /// First page at the configured default size.
    pub fn default_page(&self) -> PageRequest {
        PageRequest::new(0, self.default_page_size)
    }

    /// Create the `team` and `member` tables if missing.
    pub async fn create_schema(&self) -> QueryResult<()> {
        self.engine.batch(SCHEMA).await?;
        Ok(())
    }

    /// Drop both tables and recreate them empty.
    pub async fn reset(&self) -> QueryResult<()> {
        self.engine.batch(DROP_SCHEMA).await?;
        self.create_schema().await
    }

    /// Insert a team.
    pub async fn save_team(&self, name: impl Into<String>) -> QueryResult<Team> {
        let name = name.into();
        let query = InsertQuery::into_table(QTeam::TABLE).value("name", name.as_str());
        let id = self.engine.insert(&query).await?;
        roster_query::roster_debug!(id, name = %name, "Saved team");
        Ok(Team { id, name })
    }

    /// Insert a member.
    pub async fn save(&self, member: NewMember) -> QueryResult<Member> {
        let id = self.engine.insert(&member.insert_query()).await?;
        roster_query::roster_debug!(id, username = ?member.username, "Saved member");
        Ok(Member {
            id,
            username: member.username,
            age: member.age,
            team_id: member.team_id,
        })
    }

    /// The member with this id.
    pub async fn find_by_id(&self, id: i64) -> QueryResult<Option<Member>> {
        let m = QMember::member();
        let query = Self::select_members(&m).r#where(m.id.eq(id));
        Ok(self.engine.fetch_optional(&query).await?)
    }

    /// Every member, by id.
    pub async fn find_all(&self) -> QueryResult<Vec<Member>> {
        self.find_all_matching(Filter::None).await
    }

    /// Members with exactly this username, by id.
    pub async fn find_by_username(&self, username: &str) -> QueryResult<Vec<Member>> {
        let m = QMember::member();
        self.find_all_matching(m.username.eq(username)).await
    }

    /// Members matching an arbitrary filter over the `m` alias, by id.
    ///
    /// Filters over other tables need a join; use [`search`](Self::search)
    /// or the engine directly for those.
    pub async fn find_all_matching(&self, filter: impl Into<Filter>) -> QueryResult<Vec<Member>> {
        let m = QMember::member();
        let query = Self::select_members(&m)
            .r#where(filter)
            .order_by(m.id.asc());
        Ok(self.engine.fetch_as(&query).await?)
    }

    /// Every member matching `condition`, with its team, by member id.
    pub async fn search(&self, condition: &MemberSearchCondition) -> QueryResult<Vec<MemberTeamDto>> {
        let m = QMember::member();
        let executor = SearchExecutor::new(&self.engine, Self::search_base());
        executor.list(condition, [m.id.asc()]).await
    }

    /// One page of members matching `condition`, always issuing a count query.
    pub async fn search_page_simple(
        &self,
        condition: &MemberSearchCondition,
        page: PageRequest,
        sort: impl IntoIterator<Item = OrderByField>,
    ) -> QueryResult<Page<MemberTeamDto>> {
        self.search_page_with(condition, page, sort, CountStrategy::Always)
            .await
    }

    /// One page of members matching `condition`, skipping the count query
    /// when the page itself proves the total.
    pub async fn search_page_complex(
        &self,
        condition: &MemberSearchCondition,
        page: PageRequest,
        sort: impl IntoIterator<Item = OrderByField>,
    ) -> QueryResult<Page<MemberTeamDto>> {
        self.search_page_with(condition, page, sort, CountStrategy::Lazy)
            .await
    }

    /// One page using the configured count strategy.
    pub async fn search_page(
        &self,
        condition: &MemberSearchCondition,
        page: PageRequest,
        sort: impl IntoIterator<Item = OrderByField>,
    ) -> QueryResult<Page<MemberTeamDto>> {
        self.search_page_with(condition, page, sort, self.count_strategy)
            .await
    }

    /// Close the connection. Clones of this repository fail afterwards.
    pub async fn close(self) -> QueryResult<()> {
        self.engine.connection().clone().close().await?;
        debug!("Member repository closed");
        Ok(())
    }

    async fn search_page_with(
        &self,
        condition: &MemberSearchCondition,
        page: PageRequest,
        sort: impl IntoIterator<Item = OrderByField>,
        strategy: CountStrategy,
    ) -> QueryResult<Page<MemberTeamDto>> {
        let m = QMember::member();
        // member id breaks ties so pages never overlap
        let sort: Vec<OrderByField> = sort.into_iter().chain([m.id.asc()]).collect();
        debug!(
            conditions = condition.predicate().condition_count(),
            offset = page.offset,
            limit = page.limit,
            "Searching members"
        );
        SearchExecutor::new(&self.engine, Self::search_base())
            .count_strategy(strategy)
            .search(condition, page, sort)
            .await
    }

    fn select_members(m: &QMember) -> SelectQuery {
        SelectQuery::new(m.table()).select(m.all())
    }

    fn search_base() -> SelectQuery {
        MemberTeamDto::projection(&QMember::member(), &QTeam::team())
    }
}
