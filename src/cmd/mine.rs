use std::io;
use std::path::{self, PathBuf};
use std::time::Duration;

use clap::Args;
use indicatif::ProgressBar;
use tokio::sync::mpsc;

use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::workflow::mine::produce_report;

pub const DEFAULT_OUTPUT: &str = "changes.xlsx";

#[derive(Args, Debug, Clone)]
pub struct MineArgs {
    /// Where to write the spreadsheet report.
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,
}

/// Runs the mining pipeline on a worker task and renders its progress.
/// Returns the absolute path of the saved report.
pub async fn run(ctx: AppContext, args: MineArgs) -> AppResult<PathBuf> {
    let destination = path::absolute(&args.output)?;
    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel::<usize>();

    let worker_destination = destination.clone();
    let worker = tokio::spawn(async move {
        produce_report(&ctx, &worker_destination, move |processed| {
            // The receiver only goes away when the foreground task is gone.
            let _ = progress_tx.send(processed);
        })
        .await
    });

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("working...");
    spinner.enable_steady_tick(Duration::from_millis(120));
    while let Some(processed) = progress_rx.recv().await {
        spinner.set_message(format!("{processed} changesets processed"));
    }
    spinner.finish_and_clear();

    worker
        .await
        .map_err(|err| AppError::Io(io::Error::other(err)))??;
    Ok(destination)
}
