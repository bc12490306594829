//! Price, time and statistics reports

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::input::id_arg;
use super::output::{money, Output};
use crate::domain::{
    get_statistics, EntityId, EntityKind, MarketComparison, PriceBreakdown, PriceRange,
    PricingEngine, RangeBasis, Record, RecordStore, Statistics, TimeEstimate, TimeEstimator,
};
use crate::storage::Project;

#[derive(Serialize)]
struct PriceReport<'a> {
    piece_id: EntityId,
    currency: &'a str,
    breakdown: PriceBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    range: Option<PriceRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comparison: Option<MarketComparison>,
}

pub fn price(
    output: &Output,
    id_str: &str,
    compare: bool,
    range: bool,
    save: bool,
) -> Result<()> {
    let project = Project::open_current()?;
    let id = id_arg(id_str, EntityKind::Piece)?;
    let catalog = project.store().snapshot()?;
    let engine = PricingEngine::new(&catalog, project.config().project.pricing.clone());

    output.verbose_ctx(
        "price",
        &format!("Pricing {} against {} pieces", id, catalog.pieces().count()),
    );

    let report = PriceReport {
        breakdown: engine.calculate_price(&id)?,
        range: if range { Some(engine.suggest_price_range(&id)?) } else { None },
        comparison: if compare { Some(engine.compare_to_market(&id)?) } else { None },
        currency: &project.config().project.currency,
        piece_id: id,
    };

    if save {
        let store = project.store();
        if let Some(mut piece) = store.pieces().get(&report.piece_id)? {
            piece.suggested_price = Some(report.breakdown.rounded_price);
            store.pieces().update(piece)?;
            tracing::info!(piece = %report.piece_id, "saved suggested price");
        }
    }

    if output.is_json() {
        output.data(&report);
        return Ok(());
    }

    let cur = report.currency;
    let b = &report.breakdown;
    println!("Price Breakdown for {}", report.piece_id);
    println!("{}", "-".repeat(40));
    println!("Material cost:      {}", money(cur, b.material_cost));
    println!("Labor cost:         {}", money(cur, b.labor_cost));
    println!("Subtotal:           {}", money(cur, b.subtotal));
    println!("Complexity factor:  {}", factor(b.complexity_factor));
    println!("Size factor:        {}", factor(b.size_factor));
    println!("Adjustment:         {}", money(cur, b.complexity_adjustment));
    println!("Profit margin:      {}", money(cur, b.profit_amount));
    println!("{}", "-".repeat(40));
    println!("Total:              {}", money(cur, b.total));
    println!("Suggested price:    {}", money(cur, b.rounded_price));

    if let Some(range) = &report.range {
        let source = match range.basis {
            RangeBasis::Comparables { count } => format!("from {} similar priced pieces", count),
            RangeBasis::OwnPrice => "suggested price ±20%".to_string(),
        };
        println!(
            "Price range:        {} - {} ({})",
            money(cur, range.min),
            money(cur, range.max),
            source
        );
    }

    if let Some(comparison) = &report.comparison {
        output.blank();
        println!("Market Comparison:");
        if let (Some(avg), Some(diff), Some(pct)) = (
            comparison.avg_sold_price,
            comparison.difference,
            comparison.difference_pct,
        ) {
            println!(
                "  Average sold price: {} ({} sold)",
                money(cur, avg),
                comparison.similar_pieces_count
            );
            let pct = pct.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
            let sign = if diff >= Decimal::ZERO { "+" } else { "" };
            println!("  Difference:         {} ({}{:.1}%)", money(cur, diff), sign, pct);
        }
        println!("  {}", comparison.recommendation);
    }

    Ok(())
}

fn factor(value: Decimal) -> String {
    let value = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}x", value)
}

pub fn time(
    output: &Output,
    id_str: &str,
    predict: bool,
    hours_per_week: Option<f64>,
) -> Result<()> {
    let project = Project::open_current()?;
    let id = id_arg(id_str, EntityKind::Piece)?;

    let time_config = project.config().project.time.clone();
    let hours_per_week = hours_per_week.unwrap_or(time_config.hours_per_week);
    if predict && (!hours_per_week.is_finite() || hours_per_week <= 0.0) {
        anyhow::bail!("Hours per week must be greater than 0, got {}", hours_per_week);
    }

    let store = project.store();
    let (mut estimate, predicted) = match store.snapshot() {
        Ok(catalog) => {
            let estimator = TimeEstimator::new(&catalog, time_config);
            estimate_with(&estimator, &id, predict.then_some(hours_per_week))
        }
        Err(e) => {
            tracing::warn!("records unreadable, estimating from the files directly: {:#}", e);
            let estimator = TimeEstimator::new(&store, time_config);
            estimate_with(&estimator, &id, predict.then_some(hours_per_week))
        }
    };
    if predicted.is_some() {
        estimate.estimated_completion_date = predicted;
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "piece_id": id,
            "estimate": estimate,
            "hours_per_week": if predict { Some(hours_per_week) } else { None },
        }));
        return Ok(());
    }

    print_estimate(output, &id, &estimate, predict.then_some((hours_per_week, predicted)));
    Ok(())
}

fn estimate_with<S: RecordStore>(
    estimator: &TimeEstimator<'_, S>,
    id: &EntityId,
    hours_per_week: Option<f64>,
) -> (TimeEstimate, Option<NaiveDate>) {
    let estimate = estimator.estimate_total_hours(id);
    let predicted = hours_per_week.and_then(|w| estimator.predict_completion_date(id, w));
    (estimate, predicted)
}

fn print_estimate(
    output: &Output,
    id: &EntityId,
    estimate: &TimeEstimate,
    prediction: Option<(f64, Option<NaiveDate>)>,
) {
    println!("Time Estimate for {}", id);
    println!("{}", "-".repeat(40));
    println!("Hours logged:       {:.1}", estimate.total_hours_logged);
    if let Some(total) = estimate.estimated_total_hours {
        println!("Estimated total:    {:.1} hours", total);
    }
    if let Some(remaining) = estimate.estimated_remaining_hours {
        println!("Remaining:          {:.1} hours", remaining);
    }
    println!("Confidence:         {}", estimate.confidence);
    println!("Basis:              {}", estimate.basis);

    if let Some((hours_per_week, predicted)) = prediction {
        output.blank();
        println!("At {} hours/week:", hours_per_week);
        match predicted {
            Some(date) => println!("  Predicted completion: {}", date),
            None => println!("  No remaining work to schedule"),
        }
    }
}

#[derive(Serialize)]
struct StatsReport {
    #[serde(flatten)]
    statistics: Statistics,
    yarn_types: usize,
    yarn_balls: u64,
    stitches: usize,
}

pub fn stats(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let catalog = project.store().snapshot()?;

    let active_yarns: Vec<_> = catalog.yarns().filter(|y| !y.is_archived()).collect();
    let report = StatsReport {
        statistics: get_statistics(&catalog)?,
        yarn_types: active_yarns.len(),
        yarn_balls: active_yarns.iter().map(|y| u64::from(y.quantity_owned)).sum(),
        stitches: catalog.stitches().filter(|s| !s.is_archived()).count(),
    };

    if output.is_json() {
        output.data(&report);
        return Ok(());
    }

    let stats = &report.statistics;
    println!("Crochet Project Statistics");
    println!("{}", "=".repeat(40));
    println!("Total hours worked:    {:.1}", stats.total_hours_all_time);
    println!("Pieces completed:      {}", stats.pieces_completed);
    println!("Pieces in progress:    {}", stats.pieces_in_progress);

    if !stats.averages_by_type.is_empty() {
        output.blank();
        println!("Average hours by type:");
        for (piece_type, hours) in &stats.averages_by_type {
            println!(
                "  {}: {:.1} hours ({} pieces)",
                piece_type, hours.average_hours, hours.count
            );
        }
    }

    output.blank();
    println!(
        "Yarn inventory:        {} types, {} balls",
        report.yarn_types, report.yarn_balls
    );
    println!("Stitch library:        {} stitches", report.stitches);

    Ok(())
}
