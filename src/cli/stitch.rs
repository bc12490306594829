//! Stitch library commands

use anyhow::Result;
use clap::Subcommand;

use super::input::{id_arg, name_arg, today};
use super::output::Output;
use crate::domain::{EntityId, EntityKind, Record, Stitch, StitchCategory};
use crate::storage::Project;

#[derive(Subcommand)]
pub enum StitchCommands {
    /// Add a stitch to the library
    Add {
        /// Stitch name
        name: String,

        /// Pattern abbreviation, e.g. sc or dc
        #[arg(long)]
        abbreviation: Option<String>,

        /// Difficulty class (basic, textured, lace, colorwork, specialty)
        #[arg(long)]
        category: Option<StitchCategory>,

        #[arg(long, default_value = "")]
        description: String,

        /// Link to a tutorial
        #[arg(long)]
        link: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// List stitches
    List {
        /// Include archived stitches
        #[arg(long)]
        all: bool,
    },

    /// Show stitch details
    Show {
        /// Stitch ID
        id: String,
    },

    /// Archive a stitch
    Archive {
        /// Stitch ID
        id: String,

        #[arg(long)]
        reason: Option<String>,
    },
}

pub fn run(cmd: StitchCommands, output: &Output) -> Result<()> {
    match cmd {
        StitchCommands::Add {
            name,
            abbreviation,
            category,
            description,
            link,
            notes,
        } => {
            let mut stitch = Stitch::new(EntityId::stitch(1), name_arg(&name)?)
                .with_category(category.unwrap_or_default());
            stitch.abbreviation = abbreviation;
            stitch.description = description;
            stitch.instruction_link = link;
            stitch.notes = notes;

            let project = Project::open_current()?;
            let stitch = project.store().stitches().create(stitch)?;
            report_saved(output, &stitch, "Created")
        }
        StitchCommands::List { all } => list_stitches(output, all),
        StitchCommands::Show { id } => show_stitch(output, &id),
        StitchCommands::Archive { id, reason } => {
            let project = Project::open_current()?;
            let stitch_id = id_arg(&id, EntityKind::Stitch)?;
            let stitch = project
                .store()
                .stitches()
                .archive(&stitch_id, reason, today())?;
            report_saved(output, &stitch, "Archived")
        }
    }
}

fn report_saved(output: &Output, stitch: &Stitch, verb: &str) -> Result<()> {
    if output.is_json() {
        output.data(stitch);
    } else {
        output.success(&format!("{} stitch: {} - {}", verb, stitch.id, stitch.name));
    }
    Ok(())
}

fn list_stitches(output: &Output, include_archived: bool) -> Result<()> {
    let project = Project::open_current()?;
    let stitches = project.store().stitches().list(include_archived)?;

    if output.is_json() {
        output.data(&stitches);
    } else if stitches.is_empty() {
        println!("No stitches");
    } else {
        println!("{:<12} {:<11} {:<6} NAME", "ID", "CATEGORY", "ABBR");
        println!("{}", "-".repeat(60));

        for stitch in &stitches {
            println!(
                "{:<12} {:<11} {:<6} {}",
                stitch.id.to_string(),
                stitch.category().as_str(),
                stitch.abbreviation.as_deref().unwrap_or("-"),
                stitch.name
            );
        }
    }

    Ok(())
}

fn show_stitch(output: &Output, id_str: &str) -> Result<()> {
    let project = Project::open_current()?;
    let id = id_arg(id_str, EntityKind::Stitch)?;
    let stitch = project
        .store()
        .stitches()
        .get(&id)?
        .ok_or_else(|| anyhow::anyhow!("Stitch not found: {}", id))?;

    if output.is_json() {
        output.data(&stitch);
        return Ok(());
    }

    match &stitch.abbreviation {
        Some(abbr) => println!("{}: {} ({})", stitch.id, stitch.name, abbr),
        None => println!("{}: {}", stitch.id, stitch.name),
    }
    println!("Category: {}", stitch.category());
    if !stitch.description.is_empty() {
        println!("About:    {}", stitch.description);
    }
    if let Some(link) = &stitch.instruction_link {
        println!("Link:     {}", link);
    }
    if !stitch.photos.is_empty() {
        println!("Photos:   {}", stitch.photos.join(", "));
    }
    if let Some(notes) = &stitch.notes {
        println!("Notes:    {}", notes);
    }
    if stitch.is_archived() {
        println!("Archived");
    }

    Ok(())
}
