//! sqlview - browse and edit PostgreSQL rows through configured pages
//!
//! This is the main entry point for the sqlview application.
//! The actual logic is in the library modules for better testability.

use anyhow::{Context, Result};
use clap::Parser;
use sqlview::app::App;
use sqlview::cli::{self, CliArgs};
use sqlview::config::{Catalog, ConnectionConfig, load_settings};
use sqlview::db::postgres::PostgresProvider;
use sqlview::editor::launch;
use sqlview::logging;
use sqlview::runtime::{EditOptions, Runtime};
use sqlview::session::{PageInvocation, Session};

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    logging::init(args.debug, args.dump);

    let path = args.config_path()?;
    let mut settings =
        load_settings(&path).with_context(|| format!("loading {}", path.display()))?;
    args.apply(&mut settings);

    let catalog = Catalog::compile(&settings)?;
    let invocation = PageInvocation::initial(&catalog, args.page.clone(), args.args.clone())?;
    let connection = ConnectionConfig::parse(cli::connection_string(&settings)?)?;

    let (db, conn_errors) = PostgresProvider::connect(&connection)
        .await
        .with_context(|| format!("connecting to {}", connection.display_name))?;
    let session = Session::open(db, catalog, invocation).await?;
    let format = settings.format.unwrap_or_default();

    if args.dump {
        let result = session.result();
        print!("{}", format.encode(&result.columns, &result.rows));
        return Ok(());
    }

    let edit = EditOptions {
        candidates: launch::candidates(settings.editor.as_deref()),
        format: settings.edit_format.unwrap_or_default(),
    };
    let app = App::new(connection.display_name.clone(), format);
    Runtime::new(session, app, edit, settings.on_error, conn_errors)
        .run()
        .await?;

    tracing::info!("session ended");
    Ok(())
}
