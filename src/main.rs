// src/main.rs

use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use notion_blog::config::{Command, CommandLineInput, QueryArgs, ServeArgs};
use notion_blog::loader::{HttpContentEndpoint, LoaderState};
use notion_blog::{
    select_warm_targets, server, warm_cache, AppError, ContentError, ContentLoader,
    ContentService, NotionHttpClient, PageId, ServerConfig,
};
use std::fs;
use std::sync::Arc;

/// Sets up logging configuration.
fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let log_file_path = std::env::temp_dir().join("notion_blog.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] {t} - {m}{n}"
    } else {
        "{d(%H:%M:%S)} [{l}] - {m}{n}"
    };

    let stdout_appender = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] {t} - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("stdout")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::debug!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// Builds the content service against the live Notion API.
fn connect(query: QueryArgs) -> Result<ContentService, AppError> {
    let config = ServerConfig::resolve(query)?;
    let client = NotionHttpClient::new(&config.api_key)?;
    log::info!("Using Notion database {}", config.database_id.short());
    Ok(ContentService::with_options(
        Arc::new(client),
        config.database_id,
        config.options,
    ))
}

/// Warms the newest `limit` posts. Failures only show up in the log.
async fn warm_newest(service: &ContentService, limit: usize) -> Result<(), ContentError> {
    let pages = service.get_collection().await?;
    let targets = select_warm_targets(&pages, limit);
    let report = warm_cache(service, &targets).await;
    log::info!(
        "Warmed {}/{} posts",
        report.succeeded,
        report.succeeded + report.failed
    );
    Ok(())
}

async fn run_serve(args: ServeArgs) -> Result<(), AppError> {
    let addr = args.socket_addr()?;
    let service = connect(args.query)?;

    if args.warm > 0 {
        let warming = service.clone();
        let limit = args.warm;
        tokio::spawn(async move {
            if let Err(err) = warm_newest(&warming, limit).await {
                log::warn!("Startup cache warming skipped: {}", err);
            }
        });
    }

    server::serve(service, addr).await
}

async fn run_warm(limit: usize, query: QueryArgs) -> Result<(), AppError> {
    let service = connect(query)?;
    let pages = service.get_collection().await?;
    let targets = select_warm_targets(&pages, limit);
    let report = warm_cache(&service, &targets).await;

    println!(
        "Warmed {} of {} posts ({} failed); collection {}",
        report.succeeded,
        targets.len(),
        report.failed,
        if report.collection_warmed {
            "cached"
        } else {
            "not cached"
        }
    );
    Ok(())
}

async fn run_load(page: &str, base_url: &str) -> Result<(), AppError> {
    let page_id = PageId::parse(page)?;
    let endpoint = HttpContentEndpoint::new(base_url)?;
    let mut loader = ContentLoader::new(Arc::new(endpoint), page_id);

    let mut updates = loader.subscribe();
    let progress = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            eprintln!("[{:>3}%] {}", snapshot.progress, snapshot.status);
        }
    });

    let state = loader.run().await;
    let snapshot = loader.snapshot();
    drop(loader);
    let _ = progress.await;

    match (state, snapshot.content) {
        (LoaderState::Loaded, Some(content)) => {
            if content.partial {
                eprintln!("⚠️  Some of this post could not be loaded.");
            }
            println!("{}", content.body);
            Ok(())
        }
        _ => Err(ContentError::Network(
            snapshot
                .last_error
                .unwrap_or_else(|| "Failed to load content".to_string()),
        )
        .into()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose)?;

    match cli.command {
        Command::Serve(args) => run_serve(args).await?,
        Command::Warm { limit, query } => run_warm(limit, query).await?,
        Command::Load { page, base_url } => run_load(&page, &base_url).await?,
    }

    Ok(())
}
