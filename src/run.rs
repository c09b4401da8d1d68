use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::cli::{DownloadArgs, RetryArgs, RunOverrides};
use docfetch::config::Config;
use docfetch::coordinator::{BatchCoordinator, BatchSettings, RunReport};
use docfetch::decode::{ContentDecoder, FieldMap};
use docfetch::fetch::{Fetcher, HttpFetcher};
use docfetch::humanize::HumanDuration;
use docfetch::input;
use docfetch::record::WorkItem;
use docfetch::sink::{FileSink, RunHeader};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub async fn download(mut config: Config, args: DownloadArgs) -> Result<(), AnyError> {
    apply_overrides(&mut config, &args.run)?;
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::from_config(&config.api, &config.auth)?);

    let (source, items) = if !args.ids.is_empty() {
        ("ID list".to_string(), input::ids_from_list(&args.ids))
    } else if let Some(path) = &args.csv {
        let column = args.column.as_deref().unwrap_or(&config.input.csv_column);
        let items = input::ids_from_csv(path, column, args.start_line)?;
        (format!("CSV {} (column {column})", path.display()), items)
    } else if config.api.list_endpoint.is_some() {
        let items = input::list_ids(fetcher.as_ref(), &config.api).await?;
        ("list endpoint".to_string(), items)
    } else {
        return Err("No ids given: pass --ids, --csv, or configure api.list_endpoint".into());
    };

    execute(config, fetcher, source, items).await
}

pub async fn retry(mut config: Config, args: RetryArgs) -> Result<(), AnyError> {
    apply_overrides(&mut config, &args.run)?;
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::from_config(&config.api, &config.auth)?);

    let items = input::failed_ids_from_log(&args.log)?;
    let source = format!("retry of {}", args.log.display());

    execute(config, fetcher, source, items).await
}

pub fn print_config(config: &Config) -> Result<(), AnyError> {
    print!("{}", config.to_toml()?);
    Ok(())
}

fn apply_overrides(config: &mut Config, overrides: &RunOverrides) -> Result<(), AnyError> {
    if overrides.no_resume {
        config.download.resume = false;
    }
    if let Some(workers) = overrides.workers {
        config.download.max_workers = workers;
    }
    if let Some(batch_size) = overrides.batch_size {
        config.download.batch_size = batch_size;
    }
    config.validate()?;
    Ok(())
}

async fn execute(
    config: Config,
    fetcher: Arc<dyn Fetcher>,
    source: String,
    items: Vec<WorkItem>,
) -> Result<(), AnyError> {
    let items = input::dedupe(items);
    if items.is_empty() {
        warn!(%source, "No ids to process");
        return Ok(());
    }

    let header = RunHeader {
        run_id: Uuid::now_v7(),
        source,
        total: items.len(),
        max_workers: config.download.max_workers,
        batch_size: config.download.batch_size,
        delay_between_batches: config.download.delay_between_batches,
    };
    info!(run_id = %header.run_id, source = %header.source, total = header.total, "Run starting");

    let sink = Arc::new(FileSink::create(&config.download.log_folder, &header)?);
    let decoder = ContentDecoder::new(FieldMap::from_config(&config.api)?);

    let token = CancellationToken::new();
    let coordinator = BatchCoordinator::new(
        BatchSettings::from_config(&config.download),
        config.api,
        fetcher,
        decoder,
        sink.clone(),
    )
    .with_cancellation(token.clone());

    let signal = tokio::spawn(cancel_on_shutdown(token));
    let report = coordinator.run(items).await;
    signal.abort();
    let report = report?;

    print_report(&report);
    info!(text = %sink.text_path().display(), csv = %sink.csv_path().display(), "Logs written");
    Ok(())
}

fn print_report(report: &RunReport) {
    let summary = &report.summary;
    println!();
    println!("=== SUMMARY ===");
    println!("Processed:    {}", summary.total);
    println!("Successful:   {}", summary.successful);
    println!("Failed:       {}", summary.failed);
    println!("Skipped:      {}", summary.skipped);
    println!("Success rate: {:.2}%", summary.success_rate);
    println!("Duration:     {}", HumanDuration(report.elapsed));
    for (kind, count) in summary.error_breakdown() {
        println!("  {kind}: {count}");
    }
    if report.interrupted {
        println!("Run interrupted; re-run with the same input to resume.");
    }
}

/// Ctrl+C or SIGTERM stops the run at the next batch boundary
async fn cancel_on_shutdown(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    warn!("Shutdown signal received, finishing current batch");
    token.cancel();
}
