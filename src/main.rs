use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use lazymodal::config::{self, KeyResolver};
use lazymodal::theme;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;

mod app;
mod cli;
mod tui;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = initialize_logging()?;
    info!("Starting lazymodal");

    let args = cli::Args::parse();

    let mut config = config::load(args.config.as_deref())?;
    if let Some(name) = &args.theme {
        config.theme.name.clone_from(name);
    }
    if args.no_scroll_lock {
        config.modal.enable_scroll_lock = false;
    }
    if args.keep_on_close {
        config.modal.destroy_on_close = false;
    }

    let resolver = Arc::new(KeyResolver::new(Arc::new(config.keybindings.clone())));
    let theme = theme::theme_from_name(&config.theme.name);

    let mut app = App::new(&config, resolver, theme);
    app.run().await?;

    info!("Exiting lazymodal");
    Ok(())
}

fn initialize_logging() -> Result<WorkerGuard> {
    let directory = dirs::data_local_dir().map_or_else(
        || std::path::PathBuf::from("logs"),
        |path| path.join("lazymodal").join("logs"),
    );
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::daily(&directory, "lazymodal.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .init();

    Ok(guard)
}
