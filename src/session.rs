//! Page navigation
//!
//! A [`Session`] owns the database handle, the compiled catalog, the active
//! [`PageInvocation`] and the result currently on screen. Keys are resolved
//! against the active page's bindings; a transition runs the destination
//! page's select and swaps invocation and result only when it succeeds.

use crate::config::{Catalog, Page, StatementKind, Transition};
use crate::db::bind::{substitute, translate};
use crate::db::materialize::execute;
use crate::db::{Database, QueryResult};
use crate::error::{BindResult, ConfigError, QueryError, Result, SqlviewError};
use crate::keymap::KeyBind;
use std::fmt;

/// Active page name plus its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInvocation {
    pub page: String,
    pub args: Vec<String>,
}

impl PageInvocation {
    pub fn new(page: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            page: page.into(),
            args,
        }
    }

    /// Split an invocation string on whitespace: page name, then arguments
    pub fn parse(text: &str) -> Option<Self> {
        let mut tokens = text.split_whitespace().map(str::to_string);
        let page = tokens.next()?;
        Some(Self {
            page,
            args: tokens.collect(),
        })
    }

    /// The page to open at startup: the named one, or the catalog default.
    ///
    /// Fails when neither exists or the page's select needs more arguments
    /// than given.
    pub fn initial(catalog: &Catalog, page: Option<String>, args: Vec<String>) -> Result<Self> {
        let page = page
            .or_else(|| catalog.default_page().map(str::to_string))
            .ok_or_else(|| {
                ConfigError::Invalid("no page given and no default page configured".into())
            })?;
        catalog.check_invocation(&page, args.len())?;
        Ok(Self { page, args })
    }
}

impl fmt::Display for PageInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.page)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Outcome of resolving a key against the active page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Load this page
    Goto(PageInvocation),
    /// Not a page key (or a switch-key without a destination for this row)
    PassThrough,
}

/// Build the invocation for a destination string and a row
fn destination(target: &str, row: &[String]) -> BindResult<Resolution> {
    let text = substitute(target, row)?;
    Ok(PageInvocation::parse(&text).map_or(Resolution::PassThrough, Resolution::Goto))
}

/// A row statement that went through
#[derive(Debug)]
pub struct Committed {
    /// Rows affected by the statement
    pub affected: u64,
    /// Why the page could not be reloaded afterwards, if it could not
    pub reload_error: Option<SqlviewError>,
}

/// Navigation state threaded through the event loop
pub struct Session<D: Database> {
    db: D,
    catalog: Catalog,
    invocation: PageInvocation,
    result: QueryResult,
}

impl<D: Database> Session<D> {
    /// Load the initial page
    pub async fn open(db: D, catalog: Catalog, invocation: PageInvocation) -> Result<Self> {
        let result = load(&db, &catalog, &invocation).await?;
        tracing::info!(page = %invocation, rows = result.source_count(), "page opened");
        Ok(Self {
            db,
            catalog,
            invocation,
            result,
        })
    }

    pub fn db(&self) -> &D {
        &self.db
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn invocation(&self) -> &PageInvocation {
        &self.invocation
    }

    pub fn result(&self) -> &QueryResult {
        &self.result
    }

    /// Definition of the active page
    pub fn page(&self) -> Option<&Page> {
        self.catalog.page(&self.invocation.page).ok()
    }

    /// Decide what `key` does on the active page with `row` highlighted.
    ///
    /// Literal bindings substitute the row into their target. Switch-keys
    /// pick a target by the row's first column and pass through when there
    /// is no row or no target for that value.
    pub fn resolve_key(&self, key: KeyBind, row: Option<&[String]>) -> BindResult<Resolution> {
        let Some(transition) = self.page().and_then(|p| p.bindings.get(&key)) else {
            return Ok(Resolution::PassThrough);
        };

        match transition {
            Transition::Goto { target } => destination(target, row.unwrap_or_default()),
            Transition::Switch { table } => {
                let Some(row) = row else {
                    return Ok(Resolution::PassThrough);
                };
                let Some(target) = row.first().and_then(|id| table.get(id)) else {
                    return Ok(Resolution::PassThrough);
                };
                destination(target, row)
            }
        }
    }

    /// Switch to another page. On failure the current page stays intact.
    pub async fn transition(&mut self, to: PageInvocation) -> Result<()> {
        let result = load(&self.db, &self.catalog, &to).await?;
        tracing::info!(from = %self.invocation, to = %to, rows = result.source_count(), "page transition");
        self.invocation = to;
        self.result = result;
        Ok(())
    }

    /// Run the active page's select again
    pub async fn reload(&mut self) -> Result<()> {
        let result = load(&self.db, &self.catalog, &self.invocation).await?;
        tracing::debug!(page = %self.invocation, rows = result.source_count(), "page reloaded");
        self.result = result;
        Ok(())
    }

    /// Run the active page's insert/update/delete with `args`, then reload.
    ///
    /// `Err` means the statement itself failed. A failed reload after a
    /// successful write is returned inside [`Committed`].
    pub async fn commit(&mut self, kind: StatementKind, args: &[String]) -> Result<Committed> {
        let page = self.catalog.page(&self.invocation.page)?;
        let template = page
            .template(kind)
            .ok_or_else(|| ConfigError::NoTemplate {
                page: page.name.clone(),
                kind: kind.to_string(),
            })?
            .to_string();

        let stmt = translate(&template, args, self.db.placeholder_style())?;
        tracing::info!(page = %self.invocation.page, %kind, sql = %stmt.sql, "commit");
        tracing::debug!(args = ?stmt.args, "commit arguments");
        let affected = self
            .db
            .execute(&stmt.sql, &stmt.args)
            .await
            .map_err(|e| QueryError::new(stmt.sql.as_str(), &stmt.args, e))?;

        let reload_error = self.reload().await.err();
        if let Some(e) = &reload_error {
            tracing::warn!(page = %self.invocation, error = %e, "reload after commit failed");
        }
        Ok(Committed {
            affected,
            reload_error,
        })
    }
}

async fn load<D: Database>(
    db: &D,
    catalog: &Catalog,
    invocation: &PageInvocation,
) -> Result<QueryResult> {
    let (_, select) = catalog.active_page(&invocation.page)?;
    let stmt = translate(select, &invocation.args, db.placeholder_style())?;
    Ok(execute(db, &stmt).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::db::SqlValue;
    use crate::db::mock::MockDatabase;
    use crate::error::{BindError, SqlviewError};
    use crossterm::event::KeyCode;

    const CONFIG: &str = r#"
default: countries
pages:
  countries:
    select: SELECT id, country FROM countries
    update: UPDATE countries SET country=$2 WHERE id=$1
    keys:
      enter: cities $1
      c: cities $2
    switch-keys:
      x:
        "42": detail $1
  cities:
    select: SELECT name FROM cities WHERE country=$1
  detail:
    select: SELECT * FROM detail WHERE id=$1
  broken:
    select: SELECT * FROM broken WHERE id=$1
"#;

    fn catalog() -> Catalog {
        Catalog::compile(&Settings::from_yaml(CONFIG).unwrap()).unwrap()
    }

    fn db() -> MockDatabase {
        MockDatabase::new()
            .with_result(
                "SELECT id, country FROM countries",
                &["id", "country"],
                vec![
                    vec![SqlValue::Integer(42), SqlValue::Text("Spain".into())],
                    vec![SqlValue::Integer(7), SqlValue::Text("New Zealand".into())],
                ],
            )
            .with_result(
                "SELECT name FROM cities WHERE country=$1",
                &["name"],
                vec![vec![SqlValue::Text("Madrid".into())]],
            )
            .failing_on("FROM broken")
    }

    async fn session() -> Session<MockDatabase> {
        let catalog = catalog();
        let start = PageInvocation::initial(&catalog, None, vec![]).unwrap();
        Session::open(db(), catalog, start).await.unwrap()
    }

    fn row(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_invocation() {
        let inv = PageInvocation::parse("  cities  42 x ").unwrap();
        assert_eq!(inv, PageInvocation::new("cities", row(&["42", "x"])));
        assert_eq!(inv.to_string(), "cities 42 x");
        assert!(PageInvocation::parse("   ").is_none());
    }

    #[test]
    fn test_initial_page() {
        let catalog = catalog();
        let inv = PageInvocation::initial(&catalog, None, vec![]).unwrap();
        assert_eq!(inv.page, "countries");
        assert!(PageInvocation::initial(&catalog, Some("cities".into()), row(&["1"])).is_ok());
        // cities needs an argument
        assert!(PageInvocation::initial(&catalog, Some("cities".into()), vec![]).is_err());
        assert!(PageInvocation::initial(&Catalog::default(), None, vec![]).is_err());
    }

    #[tokio::test]
    async fn test_open_loads_result() {
        let s = session().await;
        assert_eq!(s.invocation().page, "countries");
        assert_eq!(s.result().rows.len(), 2);
        for r in &s.result().rows {
            assert_eq!(r.len(), s.result().columns.len());
        }
    }

    #[tokio::test]
    async fn test_literal_key_substitutes_row() {
        let s = session().await;
        let res = s
            .resolve_key(KeyBind::plain(KeyCode::Enter), Some(&row(&["42", "Spain"])))
            .unwrap();
        assert_eq!(res, Resolution::Goto(PageInvocation::new("cities", row(&["42"]))));
    }

    #[tokio::test]
    async fn test_substituted_whitespace_splits_arguments() {
        let s = session().await;
        let res = s
            .resolve_key(KeyBind::char('c'), Some(&row(&["7", "New Zealand"])))
            .unwrap();
        assert_eq!(
            res,
            Resolution::Goto(PageInvocation::new("cities", row(&["New", "Zealand"])))
        );
    }

    #[tokio::test]
    async fn test_switch_key_matches_first_column() {
        let s = session().await;
        let hit = s
            .resolve_key(KeyBind::char('x'), Some(&row(&["42", "Spain"])))
            .unwrap();
        assert_eq!(hit, Resolution::Goto(PageInvocation::new("detail", row(&["42"]))));

        let miss = s
            .resolve_key(KeyBind::char('x'), Some(&row(&["7", "New Zealand"])))
            .unwrap();
        assert_eq!(miss, Resolution::PassThrough);

        let no_row = s.resolve_key(KeyBind::char('x'), None).unwrap();
        assert_eq!(no_row, Resolution::PassThrough);
    }

    #[tokio::test]
    async fn test_unbound_key_passes_through() {
        let s = session().await;
        assert_eq!(
            s.resolve_key(KeyBind::char('j'), Some(&row(&["1", "a"]))).unwrap(),
            Resolution::PassThrough
        );
    }

    #[tokio::test]
    async fn test_literal_key_without_row_is_bind_error() {
        let s = session().await;
        assert!(matches!(
            s.resolve_key(KeyBind::plain(KeyCode::Enter), None),
            Err(BindError::OutOfRange { index: 1, available: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_transition_replaces_state() {
        let mut s = session().await;
        s.transition(PageInvocation::new("cities", row(&["42"])))
            .await
            .unwrap();
        assert_eq!(s.invocation().page, "cities");
        assert_eq!(s.result().rows, vec![row(&["Madrid"])]);
        let log = s.db().statements();
        assert_eq!(log.last().unwrap().1, row(&["42"]));
    }

    #[tokio::test]
    async fn test_failed_transition_keeps_previous_page() {
        let mut s = session().await;
        let err = s
            .transition(PageInvocation::new("broken", row(&["1"])))
            .await
            .unwrap_err();
        match err {
            SqlviewError::Query(q) => {
                assert!(q.query.contains("FROM broken"));
                assert_eq!(q.args, row(&["1"]));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(s.invocation().page, "countries");
        assert_eq!(s.result().rows.len(), 2);
    }

    #[tokio::test]
    async fn test_transition_bind_error() {
        let mut s = session().await;
        let err = s
            .transition(PageInvocation::new("cities", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, SqlviewError::Bind(_)));
        assert_eq!(s.invocation().page, "countries");
    }

    #[tokio::test]
    async fn test_commit_runs_statement_and_reloads() {
        let mut s = session().await;
        let committed = s
            .commit(StatementKind::Update, &row(&["42", "España"]))
            .await
            .unwrap();
        assert_eq!(committed.affected, 1);
        assert!(committed.reload_error.is_none());
        let log = s.db().statements();
        let n = log.len();
        assert_eq!(log[n - 2].0, "UPDATE countries SET country=$1 WHERE id=$2");
        assert_eq!(log[n - 2].1, row(&["España", "42"]));
        assert_eq!(log[n - 1].0, "SELECT id, country FROM countries");
    }

    #[tokio::test]
    async fn test_commit_keeps_count_when_reload_fails() {
        let mut s = session().await;
        s.db().fail_on("FROM countries");
        let committed = s
            .commit(StatementKind::Update, &row(&["42", "España"]))
            .await
            .unwrap();
        assert_eq!(committed.affected, 1);
        assert!(matches!(committed.reload_error, Some(SqlviewError::Query(_))));
        // previous rows stay on screen
        assert_eq!(s.result().rows.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_write_is_an_error() {
        let mut s = session().await;
        s.db().fail_on("UPDATE countries");
        let err = s
            .commit(StatementKind::Update, &row(&["42", "España"]))
            .await
            .unwrap_err();
        assert!(matches!(err, SqlviewError::Query(_)));
    }

    #[tokio::test]
    async fn test_commit_without_template() {
        let mut s = session().await;
        let err = s.commit(StatementKind::Delete, &row(&["42"])).await.unwrap_err();
        assert!(matches!(
            err,
            SqlviewError::Config(ConfigError::NoTemplate { .. })
        ));
    }
}
