//! Photo inbox commands

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;

use super::output::Output;
use crate::domain::{EntityId, EntityKind, Record};
use crate::storage::{group_photos, plan_renames, PhotoGroup, PlannedMove, Project, RecordFile};

/// Pending files listed per inbox before eliding the rest
const PREVIEW_LIMIT: usize = 5;

#[derive(Subcommand)]
pub enum InboxCommands {
    /// Show photos waiting in the inboxes
    Status,

    /// File inbox photos under a piece, yarn or stitch
    ///
    /// Examples:
    ///   crochet inbox file PIECE-003 --dry-run
    ///   crochet inbox file YARN-001 --descriptor ball --descriptor label
    File {
        /// ID of the record the photos belong to
        id: String,

        /// Descriptor for each photo, in inbox order (repeatable)
        #[arg(long = "descriptor", short = 'd')]
        descriptors: Vec<String>,

        /// Show the new names without moving anything
        #[arg(long)]
        dry_run: bool,
    },
}

pub fn run(cmd: InboxCommands, output: &Output) -> Result<()> {
    match cmd {
        InboxCommands::Status => status(output),
        InboxCommands::File {
            id,
            descriptors,
            dry_run,
        } => file(output, &id, &descriptors, dry_run),
    }
}

#[derive(Serialize)]
struct InboxSummary {
    kind: EntityKind,
    inbox: PathBuf,
    files: Vec<String>,
    groups: Vec<PhotoGroup>,
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn status(output: &Output) -> Result<()> {
    let project = Project::open_current()?;

    let mut summaries = Vec::new();
    for kind in EntityKind::ALL {
        let inbox = project.inbox(kind);
        let pending = inbox.pending()?;
        summaries.push(InboxSummary {
            kind,
            inbox: inbox.inbox(),
            files: pending.iter().map(|p| display_name(p)).collect(),
            groups: group_photos(&pending),
        });
    }

    if output.is_json() {
        output.data(&summaries);
        return Ok(());
    }

    let waiting: Vec<&InboxSummary> = summaries.iter().filter(|s| !s.files.is_empty()).collect();
    if waiting.is_empty() {
        println!("All inboxes are empty.");
        return Ok(());
    }

    println!("Pending inbox files:");
    for summary in waiting {
        output.blank();
        println!(
            "{} inbox: {} file(s) in {} group(s)",
            capitalize(summary.kind.plural()),
            summary.files.len(),
            summary.groups.len()
        );
        for name in summary.files.iter().take(PREVIEW_LIMIT) {
            println!("  - {}", name);
        }
        if summary.files.len() > PREVIEW_LIMIT {
            println!("  ... and {} more", summary.files.len() - PREVIEW_LIMIT);
        }
    }

    Ok(())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn file(output: &Output, id_str: &str, descriptors: &[String], dry_run: bool) -> Result<()> {
    let project = Project::open_current()?;
    let id: EntityId = id_str.parse()?;
    let store = project.store();

    let exists = match id.kind() {
        EntityKind::Piece => store.pieces().get(&id)?.is_some(),
        EntityKind::Yarn => store.yarns().get(&id)?.is_some(),
        EntityKind::Stitch => store.stitches().get(&id)?.is_some(),
    };
    if !exists {
        anyhow::bail!("{} not found: {}", capitalize(id.kind().as_str()), id);
    }

    let inbox = project.inbox(id.kind());
    let pending = inbox.pending()?;
    if pending.is_empty() {
        output.success(&format!("No files in the {} inbox", id.kind().plural()));
        return Ok(());
    }

    let plan = plan_renames(&id, &pending, descriptors);
    output.verbose_ctx("inbox", &format!("Planned {} rename(s) for {}", plan.len(), id));

    if dry_run {
        if output.is_json() {
            output.data(&serde_json::json!({ "id": id, "dry_run": true, "plan": plan }));
        } else {
            print_plan(&plan);
        }
        return Ok(());
    }

    let filed = inbox.execute(&id, &plan)?;

    match id.kind() {
        EntityKind::Piece => attach_photos(store.pieces(), &id, &filed, |p| &mut p.photos)?,
        EntityKind::Yarn => attach_photos(store.yarns(), &id, &filed, |y| &mut y.photos)?,
        EntityKind::Stitch => attach_photos(store.stitches(), &id, &filed, |s| &mut s.photos)?,
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id,
            "directory": inbox.record_dir(&id),
            "files": filed,
        }));
    } else {
        print_plan(&plan);
        output.success(&format!(
            "Filed {} photo(s) in {}",
            filed.len(),
            inbox.record_dir(&id).display()
        ));
    }

    Ok(())
}

fn print_plan(plan: &[PlannedMove]) {
    for step in plan {
        println!("  {}", display_name(&step.from));
        println!("    -> {}", step.to_name);
    }
}

/// Appends filed photo names to the record
fn attach_photos<T: Record>(
    file: &RecordFile<T>,
    id: &EntityId,
    filed: &[String],
    photos: impl Fn(&mut T) -> &mut Vec<String>,
) -> Result<()> {
    let mut record = file
        .get(id)?
        .ok_or_else(|| anyhow::anyhow!("Record not found: {}", id))?;

    photos(&mut record).extend(filed.iter().cloned());
    file.update(record)?;
    Ok(())
}
