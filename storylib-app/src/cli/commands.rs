use crate::cli::opts::*;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::sync::Arc;
use std::time::Duration;
use storylib_core::{
    DefaultLocale, FixedProfile, Localizer, ProfileDirs, RetentionPolicy, StoryDirectory,
    TableLocale,
};
use storylib_json::JsonFile;
use tracing::{error, info};

pub async fn run_cli(args: Cli) -> Result<()> {
    let profile = open_profile(&args);
    match args.cmd.clone() {
        Command::Json(cmd) => json_cmd(JsonFile::new(profile), cmd).await,
        cmd => {
            let story = StoryDirectory::with_profile(profile, open_locale(&args)?);
            story_cmd(&story, cmd).await
        }
    }
}

fn open_profile(args: &Cli) -> Arc<dyn ProfileDirs> {
    Arc::new(FixedProfile {
        documents: args.documents_dir.clone(),
        app_data: args.data_dir.clone(),
    })
}

fn open_locale(args: &Cli) -> Result<Arc<dyn Localizer>> {
    match &args.locale_file {
        Some(path) => {
            let table = TableLocale::from_json_file(path)
                .with_context(|| format!("reading locale file {}", path.display()))?;
            Ok(Arc::new(table))
        }
        None => Ok(Arc::new(DefaultLocale)),
    }
}

async fn story_cmd(story: &StoryDirectory, cmd: Command) -> Result<()> {
    match cmd {
        Command::Path => println!("{}", story.path()?.display()),
        Command::Create => {
            story.create().await?;
            println!("{}", story.path()?.display());
        }
        Command::Lock => {
            story.lock().await?;
            println!("locked");
        }
        Command::Unlock => {
            story.unlock().await?;
            println!("unlocked");
        }
        Command::Status => {
            let state = if story.is_locked().await? { "locked" } else { "unlocked" };
            println!("{}\t{}", state, story.path()?.display());
        }
        Command::Reveal => story.reveal(),
        Command::Backup(r) => {
            let report = story.backup(RetentionPolicy::new(r.max)).await?;
            println!("{}", report.created.display());
            for p in report.pruned {
                println!("pruned\t{}", p.display());
            }
        }
        Command::Backups => {
            for b in story.list_backups().await? {
                let modified: DateTime<Local> = b.modified.into();
                println!("{}\t{}", modified.format("%Y-%m-%d %H:%M:%S"), b.path.display());
            }
        }
        Command::Watch(w) => watch_cmd(story, w).await?,
        Command::Json(_) => unreachable!("handled in run_cli"),
    }
    Ok(())
}

async fn watch_cmd(story: &StoryDirectory, cmd: WatchCmd) -> Result<()> {
    story.create().await?;
    let policy = RetentionPolicy::new(cmd.retention.max);
    let mut ticker = tokio::time::interval(Duration::from_secs(cmd.every.max(1)));
    info!(every = cmd.every, keep = policy.max_backups(), "watching story library");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // a failed run is reported and the next tick tries again
                match story.backup(policy).await {
                    Ok(report) => info!(
                        created = %report.created.display(),
                        pruned = report.pruned.len(),
                        "backup done"
                    ),
                    Err(e) => error!(error = %e, "backup failed"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("stopping");
                return Ok(());
            }
        }
    }
}

async fn json_cmd(files: JsonFile, cmd: JsonCmd) -> Result<()> {
    match cmd {
        JsonCmd::Load { file } => {
            let value: serde_json::Value = files.load(&file).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        JsonCmd::Save { file, json } => {
            let value: serde_json::Value =
                serde_json::from_str(&json).context("argument is not valid JSON")?;
            files.save(&file, &value).await?;
            println!("wrote {}", files.path_for(&file)?.display());
        }
    }
    Ok(())
}
