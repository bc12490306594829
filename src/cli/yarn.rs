//! Yarn inventory commands

use anyhow::Result;
use clap::Subcommand;
use rust_decimal::Decimal;

use super::input::{date_arg, id_arg, name_arg, today};
use super::output::{money, Output};
use crate::domain::{EntityId, EntityKind, Material, Record, Yarn};
use crate::storage::Project;

#[derive(Subcommand)]
pub enum YarnCommands {
    /// Add a yarn to the inventory
    Add {
        /// Yarn name
        name: String,

        #[arg(long, default_value = "")]
        color: String,

        #[arg(long)]
        brand: Option<String>,

        /// Fibre (cotton, wool, acrylic, silk, blend, other)
        #[arg(long)]
        material: Option<Material>,

        /// Weight category, e.g. DK or worsted
        #[arg(long)]
        weight: Option<String>,

        /// Price paid per ball
        #[arg(long)]
        price: Option<Decimal>,

        /// Balls owned
        #[arg(long, default_value_t = 1)]
        quantity: u32,

        /// Purchase date
        #[arg(long)]
        purchased: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// List yarns
    List {
        /// Include archived yarns
        #[arg(long)]
        all: bool,
    },

    /// Show yarn details
    Show {
        /// Yarn ID
        id: String,
    },

    /// Archive a yarn
    Archive {
        /// Yarn ID
        id: String,

        #[arg(long)]
        reason: Option<String>,
    },
}

pub fn run(cmd: YarnCommands, output: &Output) -> Result<()> {
    match cmd {
        YarnCommands::Add {
            name,
            color,
            brand,
            material,
            weight,
            price,
            quantity,
            purchased,
            notes,
        } => {
            if let Some(price) = price.filter(|p| *p < Decimal::ZERO) {
                anyhow::bail!("Price must not be negative, got {}", price);
            }

            let mut yarn = Yarn::new(EntityId::yarn(1), name_arg(&name)?, color.trim());
            yarn.brand = brand;
            yarn.material = material.unwrap_or_default();
            yarn.weight_category = weight;
            yarn.price_paid = price;
            yarn.quantity_owned = quantity;
            yarn.purchase_date = date_arg(purchased.as_deref())?;
            yarn.notes = notes;

            let project = Project::open_current()?;
            let yarn = project.store().yarns().create(yarn)?;
            report_saved(output, &yarn, "Created")
        }
        YarnCommands::List { all } => list_yarns(output, all),
        YarnCommands::Show { id } => show_yarn(output, &id),
        YarnCommands::Archive { id, reason } => {
            let project = Project::open_current()?;
            let yarn_id = id_arg(&id, EntityKind::Yarn)?;
            let yarn = project.store().yarns().archive(&yarn_id, reason, today())?;
            report_saved(output, &yarn, "Archived")
        }
    }
}

fn report_saved(output: &Output, yarn: &Yarn, verb: &str) -> Result<()> {
    if output.is_json() {
        output.data(yarn);
    } else {
        output.success(&format!("{} yarn: {} - {}", verb, yarn.id, yarn.name));
    }
    Ok(())
}

fn list_yarns(output: &Output, include_archived: bool) -> Result<()> {
    let project = Project::open_current()?;
    let yarns = project.store().yarns().list(include_archived)?;

    if output.is_json() {
        output.data(&yarns);
    } else if yarns.is_empty() {
        println!("No yarns");
    } else {
        println!("{:<12} {:<10} {:<14} {:>5} NAME", "ID", "MATERIAL", "COLOR", "BALLS");
        println!("{}", "-".repeat(60));

        for yarn in &yarns {
            println!(
                "{:<12} {:<10} {:<14} {:>5} {}",
                yarn.id.to_string(),
                yarn.material.as_str(),
                yarn.color,
                yarn.quantity_owned,
                yarn.name
            );
        }
    }

    Ok(())
}

fn show_yarn(output: &Output, id_str: &str) -> Result<()> {
    let project = Project::open_current()?;
    let id = id_arg(id_str, EntityKind::Yarn)?;
    let yarn = project
        .store()
        .yarns()
        .get(&id)?
        .ok_or_else(|| anyhow::anyhow!("Yarn not found: {}", id))?;

    if output.is_json() {
        output.data(&yarn);
        return Ok(());
    }

    println!("{}: {}", yarn.id, yarn.name);
    if let Some(brand) = &yarn.brand {
        println!("Brand:    {}", brand);
    }
    if !yarn.color.is_empty() {
        println!("Color:    {}", yarn.color);
    }
    println!("Material: {}", yarn.material);
    if let Some(weight) = &yarn.weight_category {
        println!("Weight:   {}", weight);
    }
    if let Some(price) = yarn.price_paid {
        println!("Price:    {}", money(&project.config().project.currency, price));
    }
    println!("Owned:    {} ball(s)", yarn.quantity_owned);
    if let Some(date) = yarn.purchase_date {
        println!("Bought:   {}", date);
    }
    if !yarn.photos.is_empty() {
        println!("Photos:   {}", yarn.photos.join(", "));
    }
    if let Some(notes) = &yarn.notes {
        println!("Notes:    {}", notes);
    }
    if yarn.is_archived() {
        println!("Archived");
    }

    Ok(())
}
