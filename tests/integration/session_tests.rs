//! End-to-end page sessions against a live server
//!
//! Each test creates temporary tables on its own connection, so nothing
//! outlives the test.

use crate::common::connect;
use crossterm::event::KeyCode;
use sqlview::config::{Catalog, Settings, StatementKind};
use sqlview::db::Database;
use sqlview::db::postgres::PostgresProvider;
use sqlview::keymap::KeyBind;
use sqlview::session::{PageInvocation, Resolution, Session};
use tokio_test::{assert_err, assert_ok};

const CONFIG: &str = r#"
default: countries
pages:
  countries:
    select: SELECT id, name FROM countries ORDER BY id
    insert: INSERT INTO countries (id, name) VALUES ($1, $2)
    update: UPDATE countries SET name=$2 WHERE id=$1
    delete: DELETE FROM countries WHERE id=$1
    keys:
      enter: cities $1
  cities:
    select: SELECT name, tags FROM cities WHERE country=$1 ORDER BY name
"#;

async fn setup(provider: &PostgresProvider) {
    for sql in [
        "CREATE TEMP TABLE countries (id int4 PRIMARY KEY, name text NOT NULL)",
        "CREATE TEMP TABLE cities (country int4, name text, tags text[])",
        "INSERT INTO countries VALUES (1, 'Spain'), (2, 'Portugal')",
        "INSERT INTO cities VALUES (1, 'Madrid', ARRAY['capital', 'inland']), (1, 'Bilbao', NULL)",
    ] {
        provider.execute(sql, &[]).await.expect("setup statement");
    }
}

async fn open() -> Option<Session<PostgresProvider>> {
    let provider = connect().await?;
    setup(&provider).await;
    let catalog = Catalog::compile(&Settings::from_yaml(CONFIG).unwrap()).unwrap();
    let start = PageInvocation::initial(&catalog, None, vec![]).unwrap();
    Some(Session::open(provider, catalog, start).await.unwrap())
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_open_default_page() {
    let Some(session) = open().await else {
        return;
    };

    assert_eq!(session.invocation().page, "countries");
    assert_eq!(session.result().columns, strings(&["id", "name"]));
    assert_eq!(
        session.result().rows,
        vec![strings(&["1", "Spain"]), strings(&["2", "Portugal"])]
    );
}

#[tokio::test]
async fn test_key_transition_expands_arrays() {
    let Some(mut session) = open().await else {
        return;
    };

    let row = session.result().rows[0].clone();
    let resolution = session
        .resolve_key(KeyBind::plain(KeyCode::Enter), Some(&row))
        .unwrap();
    let Resolution::Goto(invocation) = resolution else {
        panic!("enter should lead somewhere");
    };
    assert_eq!(invocation, PageInvocation::new("cities", strings(&["1"])));

    session.transition(invocation).await.unwrap();
    assert_eq!(session.invocation().page, "cities");
    assert_eq!(session.result().source_count(), 2);
    assert_eq!(
        session.result().rows,
        vec![
            strings(&["Bilbao", ""]),
            strings(&["Madrid", "capital"]),
            strings(&["Madrid", "inland"]),
        ]
    );
}

#[tokio::test]
async fn test_failed_transition_keeps_page() {
    let Some(mut session) = open().await else {
        return;
    };

    assert_err!(
        session
            .transition(PageInvocation::new("cities", strings(&["not-a-number"])))
            .await
    );
    assert_eq!(session.invocation().page, "countries");
    assert_eq!(session.result().rows.len(), 2);
}

#[tokio::test]
async fn test_insert_update_delete() {
    let Some(mut session) = open().await else {
        return;
    };

    let inserted = assert_ok!(
        session
            .commit(StatementKind::Insert, &strings(&["3", "France"]))
            .await
    );
    assert_eq!(inserted.affected, 1);
    assert_eq!(session.result().rows.len(), 3);

    let updated = assert_ok!(
        session
            .commit(StatementKind::Update, &strings(&["1", "España"]))
            .await
    );
    assert_eq!(updated.affected, 1);
    assert_eq!(session.result().rows[0], strings(&["1", "España"]));

    let deleted = assert_ok!(
        session
            .commit(StatementKind::Delete, &strings(&["2", "Portugal"]))
            .await
    );
    assert_eq!(deleted.affected, 1);
    assert!(deleted.reload_error.is_none());
    assert_eq!(
        session.result().rows,
        vec![strings(&["1", "España"]), strings(&["3", "France"])]
    );
}

#[tokio::test]
async fn test_failed_commit_keeps_rows() {
    let Some(mut session) = open().await else {
        return;
    };

    // duplicate primary key
    let err = assert_err!(
        session
            .commit(StatementKind::Insert, &strings(&["1", "Again"]))
            .await
    );
    assert!(err.to_string().contains("INSERT INTO countries"));
    assert_eq!(session.result().rows.len(), 2);
}

#[tokio::test]
async fn test_commit_without_template() {
    let Some(mut session) = open().await else {
        return;
    };

    session
        .transition(PageInvocation::new("cities", strings(&["1"])))
        .await
        .unwrap();
    let err = session
        .commit(StatementKind::Delete, &strings(&["Madrid"]))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("cities"));
    assert_eq!(
        session.db().placeholder_style(),
        sqlview::db::PlaceholderStyle::Numbered
    );
}
