//! Photo inbox filing
//!
//! Photos dropped into `images/<kind>/inbox/` are renamed after the record
//! they belong to and moved into `images/<kind>/<ID>/`:
//!
//! - one photo:     `PIECE-001_front.jpg`
//! - several:       `PIECE-001_01_front.jpg`, `PIECE-001_02_detail.jpg`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::{date_from_filename, EntityId, EntityKind};

const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "heic"];

/// Keywords looked for in the original name, first hit wins
const DESCRIPTOR_KEYWORDS: [(&str, &[&str]); 14] = [
    ("front", &["front", "main", "hero"]),
    ("back", &["back", "reverse"]),
    ("detail", &["detail", "closeup", "close-up", "macro"]),
    ("label", &["label", "tag", "brand"]),
    ("ball", &["ball", "skein"]),
    ("texture", &["texture", "swatch"]),
    ("wip", &["wip", "progress", "working"]),
    ("finished", &["finished", "done", "complete", "final"]),
    ("worn", &["worn", "wearing", "model", "mannequin"]),
    ("folded", &["folded", "flat"]),
    ("diagram", &["diagram", "chart", "pattern"]),
    ("tutorial", &["tutorial", "screenshot", "screen"]),
    ("sample", &["sample", "example"]),
    ("shop", &["shop", "store", "website", "tienda"]),
];

pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Descriptor suggested by the original file stem, if any keyword matches
pub fn infer_descriptor(stem: &str) -> Option<&'static str> {
    let stem = stem.to_lowercase();
    DESCRIPTOR_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| stem.contains(k)))
        .map(|(descriptor, _)| *descriptor)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Photos that probably show the same thing, by date in their names
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhotoGroup {
    pub key: String,
    pub files: Vec<PathBuf>,
}

/// Groups consecutive files sharing a date in their name, or failing
/// that, the first ten characters of their stem
pub fn group_photos(files: &[PathBuf]) -> Vec<PhotoGroup> {
    let mut groups: Vec<PhotoGroup> = Vec::new();

    for file in files {
        let key = match date_from_filename(&file_name(file)) {
            Some(date) => date.to_string(),
            None => file_stem(file).chars().take(10).collect(),
        };

        match groups.last_mut() {
            Some(group) if group.key == key => group.files.push(file.clone()),
            _ => groups.push(PhotoGroup {
                key,
                files: vec![file.clone()],
            }),
        }
    }

    groups
}

/// One planned rename
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedMove {
    pub from: PathBuf,
    pub to_name: String,
}

/// Builds new names for `files`. Explicit descriptors are used in order,
/// then keywords from the old name, then `photoNN`.
pub fn plan_renames(id: &EntityId, files: &[PathBuf], descriptors: &[String]) -> Vec<PlannedMove> {
    let numbered = files.len() > 1;

    files
        .iter()
        .enumerate()
        .map(|(i, file)| {
            let descriptor = descriptors
                .get(i)
                .cloned()
                .or_else(|| infer_descriptor(&file_stem(file)).map(str::to_string))
                .unwrap_or_else(|| format!("photo{:02}", i + 1));

            let ext = file
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
                .unwrap_or_default();

            let to_name = if numbered {
                format!("{}_{:02}_{}{}", id, i + 1, descriptor, ext)
            } else {
                format!("{}_{}{}", id, descriptor, ext)
            };

            PlannedMove {
                from: file.clone(),
                to_name,
            }
        })
        .collect()
}

/// First free path for `name` in `dir`, appending `_1`, `_2`, ... to the stem
fn free_destination(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let (base, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 => name.split_at(dot),
        _ => (name, ""),
    };

    (1..)
        .map(|n| dir.join(format!("{}_{}{}", base, n, ext)))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// The inbox and photo folders of one record kind
pub struct PhotoInbox {
    images_dir: PathBuf,
    kind: EntityKind,
}

impl PhotoInbox {
    pub fn new(project_root: &Path, kind: EntityKind) -> Self {
        Self {
            images_dir: project_root.join("images").join(kind.plural()),
            kind,
        }
    }

    pub fn inbox_dir(project_root: &Path, kind: EntityKind) -> PathBuf {
        Self::new(project_root, kind).inbox()
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn inbox(&self) -> PathBuf {
        self.images_dir.join("inbox")
    }

    /// Folder holding the filed photos of one record
    pub fn record_dir(&self, id: &EntityId) -> PathBuf {
        self.images_dir.join(id.to_string())
    }

    /// Image files waiting in the inbox, sorted by name
    pub fn pending(&self) -> Result<Vec<PathBuf>> {
        let inbox = self.inbox();
        if !inbox.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&inbox)
            .with_context(|| format!("Failed to read inbox: {}", inbox.display()))?
        {
            let path = entry
                .with_context(|| format!("Failed to read inbox: {}", inbox.display()))?
                .path();
            if path.is_file() && is_image(&path) {
                files.push(path);
            }
        }

        files.sort_by_key(|p| file_name(p));
        Ok(files)
    }

    /// Moves the planned files into the record's folder.
    ///
    /// Returns the final file names, which differ from the plan when a
    /// name was already taken.
    pub fn execute(&self, id: &EntityId, plan: &[PlannedMove]) -> Result<Vec<String>> {
        let dest_dir = self.record_dir(id);
        fs::create_dir_all(&dest_dir)
            .with_context(|| format!("Failed to create directory: {}", dest_dir.display()))?;

        let mut filed = Vec::with_capacity(plan.len());
        for step in plan {
            let dest = free_destination(&dest_dir, &step.to_name);
            fs::rename(&step.from, &dest).with_context(|| {
                format!("Failed to move {} to {}", step.from.display(), dest.display())
            })?;

            tracing::info!(from = %step.from.display(), to = %dest.display(), "filed photo");
            filed.push(file_name(&dest));
        }

        Ok(filed)
    }
}
