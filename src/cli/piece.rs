//! Piece CLI commands

use anyhow::Result;
use clap::{Args, Subcommand};
use rust_decimal::Decimal;

use super::input::{date_arg, hours_arg, id_arg, id_args, name_arg, today};
use super::output::{money, Output};
use crate::domain::{
    Destination, Dimensions, EntityId, EntityKind, Piece, PieceType, Record, WorkSession,
    WorkStatus,
};
use crate::storage::Project;

#[derive(Subcommand)]
pub enum PieceCommands {
    /// Add a piece
    ///
    /// Examples:
    ///   crochet piece add "Autumn cowl" --type cowl --yarn YARN-001 --stitch STITCH-002
    ///   crochet piece add "Baby blanket" --type blanket --status finished --hours 38
    Add {
        /// Piece name
        name: String,

        /// Piece type (shawl, scarf, bed_throw, blanket, cowl, poncho, cardigan,
        /// hat, bag, home_decor, other)
        #[arg(long = "type", short = 't')]
        piece_type: PieceType,

        /// Work status (in_progress, finished, ready)
        #[arg(long)]
        status: Option<WorkStatus>,

        /// Where the piece is going (for_sale, sold, for_gift, gifted, for_self, in_use)
        #[arg(long)]
        destination: Option<Destination>,

        /// Yarn used, once per ball (repeatable)
        #[arg(long = "yarn")]
        yarns: Vec<String>,

        /// Stitch used, main stitch first (repeatable)
        #[arg(long = "stitch")]
        stitches: Vec<String>,

        /// Hours already worked
        #[arg(long)]
        hours: Option<f64>,

        /// Start date
        #[arg(long)]
        started: Option<String>,

        /// Asking price
        #[arg(long)]
        price: Option<Decimal>,

        /// Hook size in millimetres
        #[arg(long)]
        hook: Option<f64>,

        #[command(flatten)]
        size: SizeArgs,

        #[arg(long)]
        notes: Option<String>,
    },

    /// List pieces
    List {
        /// Include archived pieces
        #[arg(long)]
        all: bool,

        /// Only pieces of this type
        #[arg(long = "type")]
        piece_type: Option<PieceType>,

        /// Only pieces with this status
        #[arg(long)]
        status: Option<WorkStatus>,
    },

    /// Show piece details
    Show {
        /// Piece ID
        id: String,
    },

    /// Log a work session
    Log {
        /// Piece ID
        id: String,

        /// Hours worked
        hours: f64,

        /// Session date (defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Note for the session
        #[arg(long)]
        note: Option<String>,
    },

    /// Update a piece
    Update {
        /// Piece ID
        id: String,

        #[arg(long)]
        status: Option<WorkStatus>,

        #[arg(long)]
        destination: Option<Destination>,

        /// Add a yarn (repeatable)
        #[arg(long = "add-yarn")]
        add_yarns: Vec<String>,

        /// Add a stitch (repeatable)
        #[arg(long = "add-stitch")]
        add_stitches: Vec<String>,

        #[arg(long)]
        price: Option<Decimal>,

        /// Finish date
        #[arg(long)]
        finished: Option<String>,

        #[command(flatten)]
        size: SizeArgs,

        /// Give the piece away (sets destination to gifted)
        #[arg(long)]
        gift_recipient: Option<String>,

        /// Listing or sale URL
        #[arg(long)]
        sale_link: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Record a sale
    Sell {
        /// Piece ID
        id: String,

        /// Price sold for
        price: Decimal,

        /// Sale date (defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Where it was sold
        #[arg(long)]
        platform: Option<String>,

        /// Link to the listing
        #[arg(long)]
        link: Option<String>,
    },

    /// Archive a piece
    Archive {
        /// Piece ID
        id: String,

        #[arg(long)]
        reason: Option<String>,
    },
}

#[derive(Args)]
pub struct SizeArgs {
    /// Width in centimetres
    #[arg(long)]
    width: Option<f64>,

    /// Length in centimetres
    #[arg(long)]
    length: Option<f64>,

    /// Depth in centimetres
    #[arg(long)]
    depth: Option<f64>,
}

impl SizeArgs {
    fn dimensions(&self) -> Result<Option<Dimensions>> {
        Ok(Dimensions::from_parts(self.width, self.length, self.depth)?)
    }
}

pub fn run(cmd: PieceCommands, output: &Output) -> Result<()> {
    match cmd {
        PieceCommands::Add {
            name,
            piece_type,
            status,
            destination,
            yarns,
            stitches,
            hours,
            started,
            price,
            hook,
            size,
            notes,
        } => {
            let mut piece = Piece::new(EntityId::piece(1), name_arg(&name)?, piece_type)
                .with_yarns(id_args(&yarns, EntityKind::Yarn)?)
                .with_stitches(id_args(&stitches, EntityKind::Stitch)?);
            if let Some(status) = status {
                piece.set_status(status, today());
            }
            if let Some(destination) = destination {
                piece.destination = destination;
            }
            if let Some(hours) = hours {
                piece.work_hours = Some(hours_arg(hours)?);
            }
            piece.date_started = date_arg(started.as_deref())?;
            piece.price = price;
            piece.hook_size_mm = hook;
            piece.dimensions = size.dimensions()?;
            piece.notes = notes;
            add_piece(output, piece)
        }
        PieceCommands::List {
            all,
            piece_type,
            status,
        } => list_pieces(output, all, piece_type, status),
        PieceCommands::Show { id } => show_piece(output, &id),
        PieceCommands::Log {
            id,
            hours,
            date,
            note,
        } => log_session(output, &id, hours, date.as_deref(), note),
        PieceCommands::Update {
            id,
            status,
            destination,
            add_yarns,
            add_stitches,
            price,
            finished,
            size,
            gift_recipient,
            sale_link,
            notes,
        } => {
            let project = Project::open_current()?;
            let store = project.store();
            let mut piece = find_piece(&project, &id)?;

            if let Some(status) = status {
                piece.set_status(status, today());
            }
            if let Some(destination) = destination {
                piece.destination = destination;
            }
            piece
                .yarns_used
                .extend(id_args(&add_yarns, EntityKind::Yarn)?);
            piece
                .stitches_used
                .extend(id_args(&add_stitches, EntityKind::Stitch)?);
            if price.is_some() {
                piece.price = price;
            }
            if let Some(finished) = date_arg(finished.as_deref())? {
                piece.date_finished = Some(finished);
            }
            if let Some(dims) = size.dimensions()? {
                piece.dimensions = Some(piece.dimensions.unwrap_or_default().merge(dims));
            }
            if let Some(recipient) = gift_recipient {
                piece.give(name_arg(&recipient)?);
            }
            if sale_link.is_some() {
                piece.sale_link = sale_link;
            }
            if notes.is_some() {
                piece.notes = notes;
            }

            let piece = store.pieces().update(piece)?;
            report_saved(output, &piece, "Updated")
        }
        PieceCommands::Sell {
            id,
            price,
            date,
            platform,
            link,
        } => sell_piece(output, &id, price, date.as_deref(), platform, link),
        PieceCommands::Archive { id, reason } => {
            let project = Project::open_current()?;
            let piece_id = id_arg(&id, EntityKind::Piece)?;
            let piece = project
                .store()
                .pieces()
                .archive(&piece_id, reason, today())?;
            report_saved(output, &piece, "Archived")
        }
    }
}

fn find_piece(project: &Project, id_str: &str) -> Result<Piece> {
    let id = id_arg(id_str, EntityKind::Piece)?;
    project
        .store()
        .pieces()
        .get(&id)?
        .ok_or_else(|| anyhow::anyhow!("Piece not found: {}", id))
}

fn report_saved(output: &Output, piece: &Piece, verb: &str) -> Result<()> {
    if output.is_json() {
        output.data(piece);
    } else {
        output.success(&format!("{} piece: {} - {}", verb, piece.id, piece.name));
    }
    Ok(())
}

fn add_piece(output: &Output, piece: Piece) -> Result<()> {
    let project = Project::open_current()?;
    let piece = project.store().pieces().create(piece)?;

    output.verbose_ctx("piece", &format!("Stored in {}", project.data_dir().display()));
    report_saved(output, &piece, "Created")
}

fn list_pieces(
    output: &Output,
    include_archived: bool,
    piece_type: Option<PieceType>,
    status: Option<WorkStatus>,
) -> Result<()> {
    let project = Project::open_current()?;
    let pieces: Vec<Piece> = project
        .store()
        .pieces()
        .list(include_archived)?
        .into_iter()
        .filter(|p| piece_type.map_or(true, |t| p.type_key() == t.as_str()))
        .filter(|p| status.map_or(true, |s| p.work_status == s))
        .collect();

    if output.is_json() {
        output.data(&pieces);
    } else if pieces.is_empty() {
        println!("No pieces");
    } else {
        println!("{:<12} {:<12} {:<12} {:>7} NAME", "ID", "TYPE", "STATUS", "HOURS");
        println!("{}", "-".repeat(60));

        for piece in &pieces {
            let name = if piece.is_archived() {
                format!("{} (archived)", piece.name)
            } else {
                piece.name.clone()
            };
            println!(
                "{:<12} {:<12} {:<12} {:>7.1} {}",
                piece.id.to_string(),
                piece.type_name,
                piece.work_status.as_str(),
                piece.total_hours(),
                name
            );
        }
    }

    Ok(())
}

fn show_piece(output: &Output, id_str: &str) -> Result<()> {
    let project = Project::open_current()?;
    let piece = find_piece(&project, id_str)?;

    if output.is_json() {
        output.data(&piece);
        return Ok(());
    }

    let currency = &project.config().project.currency;
    let join = |ids: &[EntityId]| {
        ids.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };

    println!("{}: {}", piece.id, piece.name);
    println!("Type:        {}", piece.type_name);
    println!("Status:      {}", piece.work_status);
    println!("Destination: {}", piece.destination);
    println!("Hours:       {:.1}", piece.total_hours());
    if !piece.yarns_used.is_empty() {
        println!("Yarns:       {}", join(&piece.yarns_used));
    }
    if !piece.stitches_used.is_empty() {
        println!("Stitches:    {}", join(&piece.stitches_used));
    }
    if let Some(hook) = piece.hook_size_mm {
        println!("Hook:        {} mm", hook);
    }
    if let Some(dims) = piece.dimensions {
        println!("Size:        {}", dims);
    }
    if let Some(started) = piece.date_started {
        println!("Started:     {}", started);
    }
    if let Some(finished) = piece.date_finished {
        println!("Finished:    {}", finished);
    }
    if let Some(price) = piece.price {
        println!("Price:       {}", money(currency, price));
    }
    if let Some(suggested) = piece.suggested_price {
        println!("Suggested:   {}", money(currency, suggested));
    }
    if let Some(sold) = piece.sold_price {
        let on = piece
            .sold_date
            .map(|d| format!(" on {}", d))
            .unwrap_or_default();
        println!("Sold for:    {}{}", money(currency, sold), on);
    }
    if let Some(platform) = &piece.sale_platform {
        println!("Sold via:    {}", platform);
    }
    if let Some(link) = &piece.sale_link {
        println!("Link:        {}", link);
    }
    if let Some(recipient) = &piece.gift_recipient {
        println!("Gift for:    {}", recipient);
    }
    if let Some(notes) = &piece.notes {
        println!("Notes:       {}", notes);
    }
    if piece.is_archived() {
        let reason = piece
            .lifecycle
            .archived_reason
            .as_deref()
            .map(|r| format!(" ({})", r))
            .unwrap_or_default();
        println!("Archived{}", reason);
    }

    if !piece.work_sessions.is_empty() {
        output.blank();
        println!("Sessions:");
        for session in &piece.work_sessions {
            match &session.notes {
                Some(note) => println!("  {}  {:>5.1}h  {}", session.date, session.hours, note),
                None => println!("  {}  {:>5.1}h", session.date, session.hours),
            }
        }
    }

    Ok(())
}

fn log_session(
    output: &Output,
    id_str: &str,
    hours: f64,
    date: Option<&str>,
    note: Option<String>,
) -> Result<()> {
    let project = Project::open_current()?;
    let mut piece = find_piece(&project, id_str)?;

    let date = date_arg(date)?.unwrap_or_else(today);
    let mut session = WorkSession::new(date, hours)?;
    if let Some(note) = note {
        session = session.with_notes(note);
    }

    // Sessions replace the legacy total, so carry it over as a first session
    if piece.work_sessions.is_empty() {
        if let Some(legacy) = piece.work_hours.filter(|h| *h > 0.0) {
            let start = piece.date_started.unwrap_or(date);
            let carried =
                WorkSession::new(start, legacy)?.with_notes("Hours before session logging");
            piece.log_session(carried);
        }
    }
    piece.log_session(session);

    let piece = project.store().pieces().update(piece)?;

    if output.is_json() {
        output.data(&piece);
    } else {
        output.success(&format!(
            "Logged {:.1} hours on {} (total {:.1})",
            hours,
            piece.id,
            piece.total_hours()
        ));
    }

    Ok(())
}

fn sell_piece(
    output: &Output,
    id_str: &str,
    price: Decimal,
    date: Option<&str>,
    platform: Option<String>,
    link: Option<String>,
) -> Result<()> {
    if price < Decimal::ZERO {
        anyhow::bail!("Sale price must not be negative, got {}", price);
    }

    let project = Project::open_current()?;
    let mut piece = find_piece(&project, id_str)?;

    piece.sell(price, date_arg(date)?.unwrap_or_else(today), platform, link);
    let piece = project.store().pieces().update(piece)?;

    if output.is_json() {
        output.data(&piece);
    } else {
        output.success(&format!(
            "Sold {} for {}",
            piece.id,
            money(&project.config().project.currency, price)
        ));
    }

    Ok(())
}
