//! Command handlers.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use relaydrop_transfer::{UploadSource, plan};
use relaydrop_uploader::{
    FileKind, HttpBackend, HttpStorage, UploadCoordinator, UploadFile, UploadReport,
    UploadSession,
};

use crate::config::Config;
use crate::render::ProgressRenderer;
use crate::{Cli, Commands};

/// Runs the parsed command line.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?.with_overrides(cli.endpoint, cli.bucket);

    match cli.command {
        Commands::Plan {
            size,
            chunk_size_mib,
        } => {
            let config = Config {
                chunk_size_mib: chunk_size_mib.unwrap_or(config.chunk_size_mib),
                ..config
            };
            print_plan(size, config.chunk_size()?)
        }
        Commands::Upload {
            game,
            folder,
            video,
            archive,
        } => {
            let report = upload(config, game, folder, video, archive).await?;
            print_report(&report);
            Ok(())
        }
    }
}

fn print_plan(size: u64, chunk_size: u64) -> anyhow::Result<()> {
    let chunk_plan = plan(size, chunk_size)?;
    if chunk_plan.is_single {
        println!("single PUT of {size} bytes");
        return Ok(());
    }

    println!(
        "multipart upload: {} parts of up to {chunk_size} bytes",
        chunk_plan.part_count()
    );
    for part in &chunk_plan.parts {
        println!(
            "  part {:>5}: bytes {}..{} ({} bytes)",
            part.index,
            part.byte_start,
            part.byte_end,
            part.len()
        );
    }
    Ok(())
}

async fn upload(
    config: Config,
    game: String,
    folder: Option<String>,
    video: Option<std::path::PathBuf>,
    archive: Option<std::path::PathBuf>,
) -> anyhow::Result<UploadReport> {
    config.validate()?;

    let http = reqwest::Client::builder()
        .build()
        .context("building HTTP client")?;
    let backend = HttpBackend::with_client(http.clone(), config.endpoint.clone());
    info!(endpoint = backend.endpoint(), bucket = %config.bucket, "uploading");
    let backend = Arc::new(backend);
    let storage = Arc::new(HttpStorage::with_client(http));
    let mut coordinator = UploadCoordinator::new(backend, storage, config.uploader_config()?);
    let mut events = coordinator
        .take_events()
        .context("upload events already taken")?;

    let mut session = UploadSession::new();
    session.set_game_name(game);
    if let Some(folder) = folder {
        session.set_folder(folder);
    }
    if let Some(path) = video {
        session.select_video(open_file(&path, FileKind::Video).await?);
    }
    if let Some(path) = archive {
        session.select_archive(open_file(&path, FileKind::Archive).await?);
    }

    let render = tokio::spawn(async move {
        let mut renderer = ProgressRenderer::new();
        while let Some(event) = events.recv().await {
            if let Some(line) = renderer.handle(&event) {
                info!("{line}");
            }
        }
    });

    let today = chrono::Local::now().date_naive();
    let result = session.submit(&coordinator, today).await;
    drop(coordinator);

    match result {
        Ok(report) => {
            let _ = render.await;
            Ok(report)
        }
        Err(e) => {
            render.abort();
            Err(anyhow::Error::new(e).context("Upload process failed"))
        }
    }
}

async fn open_file(path: &Path, kind: FileKind) -> anyhow::Result<UploadFile> {
    let source = UploadSource::from_path(path)
        .await
        .with_context(|| format!("opening {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))?;
    Ok(UploadFile::new(name, kind, source))
}

fn print_report(report: &UploadReport) {
    println!("Uploaded {} file(s) for {}:", report.files.len(), report.game_name);
    for file in &report.files {
        println!("  {} -> {}", file.name, file.key);
    }
    match &report.links {
        Some(links) => {
            println!("Folder: {}", links.folder_url);
            if let Some(url) = &links.object_url {
                println!("Video:  {url}");
            }
        }
        None => warn!("bucket name or region not configured; no result links"),
    }
}
