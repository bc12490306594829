//! CLI integration tests for crochet
//!
//! These tests drive the real binary inside temporary projects, from
//! initialization through pricing, time estimates and photo filing.

use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get a command instance for the crochet binary
fn crochet_cmd() -> assert_cmd::Command {
    assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("crochet"))
}

/// Create a temporary directory and initialize a crochet project
fn setup_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    crochet_cmd().arg("init").arg(dir.path()).assert().success();
    dir
}

/// Runs a command in the project and parses its JSON output
fn run_json(dir: &Path, args: &[&str]) -> serde_json::Value {
    let output = crochet_cmd()
        .current_dir(dir)
        .args(args)
        .args(["--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    serde_json::from_str(&stdout).unwrap()
}

fn decimal_field(value: &serde_json::Value) -> f64 {
    value.as_str().unwrap().parse().unwrap()
}

/// Two yarns, one textured stitch, a finished hat and a hat in progress
fn setup_workshop() -> TempDir {
    let dir = setup_project();
    let root = dir.path();

    run_json(root, &["yarn", "add", "Cotton", "--color", "blue", "--price", "5"]);
    run_json(
        root,
        &["yarn", "add", "Merino", "--color", "grey", "--price", "12.50", "--quantity", "3"],
    );
    run_json(root, &["stitch", "add", "Puff", "--category", "textured", "--abbreviation", "puff"]);
    run_json(
        root,
        &[
            "piece", "add", "Finished hat", "--type", "hat", "--status", "finished",
            "--yarn", "YARN-001", "--yarn", "YARN-001", "--stitch", "STITCH-001", "--hours", "10",
        ],
    );
    run_json(
        root,
        &["piece", "add", "Winter hat", "--type", "hat", "--stitch", "STITCH-001"],
    );
    run_json(root, &["piece", "log", "PIECE-002", "4", "--date", "2026-01-10"]);

    dir
}

// =============================================================================
// Initialization Tests
// =============================================================================

#[test]
fn test_init_creates_structure() {
    let dir = TempDir::new().unwrap();

    crochet_cmd()
        .arg("init")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized crochet project"));

    assert!(dir.path().join(".crochet/config.toml").is_file());
    assert!(dir.path().join(".crochet/pieces.json").is_file());
    assert!(dir.path().join(".crochet/yarns.json").is_file());
    assert!(dir.path().join(".crochet/stitches.json").is_file());
    assert!(dir.path().join("images/pieces/inbox").is_dir());
    assert!(dir.path().join("images/yarns/inbox").is_dir());
    assert!(dir.path().join("images/stitches/inbox").is_dir());
}

#[test]
fn test_init_is_idempotent() {
    let dir = setup_project();
    crochet_cmd()
        .current_dir(dir.path())
        .args(["yarn", "add", "Cotton"])
        .assert()
        .success();

    crochet_cmd().arg("init").arg(dir.path()).assert().success();

    let yarns = run_json(dir.path(), &["yarn", "list"]);
    assert_eq!(yarns.as_array().unwrap().len(), 1);
}

#[test]
fn test_not_in_project_error() {
    let dir = TempDir::new().unwrap();

    crochet_cmd()
        .current_dir(dir.path())
        .args(["piece", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("crochet init"));
}

#[test]
fn test_commands_work_from_subdirectory() {
    let dir = setup_project();

    crochet_cmd()
        .current_dir(dir.path().join("images/pieces"))
        .args(["stitch", "add", "Shell", "--category", "lace"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created stitch: STITCH-001 - Shell"));
}

// =============================================================================
// Record Tests
// =============================================================================

#[test]
fn test_piece_add_assigns_sequential_ids() {
    let dir = setup_project();

    let first = run_json(dir.path(), &["piece", "add", "Shawl", "--type", "shawl"]);
    let second = run_json(dir.path(), &["piece", "add", "Cowl", "--type", "cowl"]);

    assert_eq!(first["id"], "PIECE-001");
    assert_eq!(second["id"], "PIECE-002");
    assert_eq!(second["type"], "cowl");
    assert_eq!(second["work_status"], "in_progress");
    assert_eq!(second["destination"], "for_sale");
}

#[test]
fn test_piece_add_rejects_bad_input() {
    let dir = setup_project();

    crochet_cmd()
        .current_dir(dir.path())
        .args(["piece", "add", "Sock", "--type", "sock"])
        .assert()
        .failure();

    crochet_cmd()
        .current_dir(dir.path())
        .args(["piece", "add", "Hat", "--type", "hat", "--yarn", "STITCH-001"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("STITCH-001"));

    crochet_cmd()
        .current_dir(dir.path())
        .args(["piece", "add", "Hat", "--type", "hat", "--started", "next week"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("next week"));
}

#[test]
fn test_piece_list_filters() {
    let dir = setup_workshop();

    crochet_cmd()
        .current_dir(dir.path())
        .args(["piece", "list", "--status", "in_progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Winter hat"))
        .stdout(predicate::str::contains("Finished hat").not());

    let scarves = run_json(dir.path(), &["piece", "list", "--type", "scarf"]);
    assert!(scarves.as_array().unwrap().is_empty());
}

#[test]
fn test_piece_log_accumulates_sessions() {
    let dir = setup_workshop();

    let piece = run_json(
        dir.path(),
        &["piece", "log", "PIECE-002", "1.5", "--note", "crown decreases"],
    );

    let sessions = piece["work_sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0]["date"], "2026-01-10");
    assert_eq!(sessions[1]["notes"], "crown decreases");

    crochet_cmd()
        .current_dir(dir.path())
        .args(["piece", "show", "PIECE-002"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hours:       5.5"));
}

#[test]
fn test_piece_log_keeps_legacy_hours() {
    let dir = setup_workshop();

    let piece = run_json(dir.path(), &["piece", "log", "PIECE-001", "2"]);

    assert_eq!(piece["work_sessions"].as_array().unwrap().len(), 2);
    assert_eq!(piece["work_sessions"][0]["hours"], 10.0);
}

#[test]
fn test_piece_update_and_sell() {
    let dir = setup_workshop();

    let updated = run_json(
        dir.path(),
        &["piece", "update", "PIECE-002", "--status", "ready", "--add-yarn", "YARN-002"],
    );
    assert_eq!(updated["work_status"], "ready");
    assert!(updated["date_finished"].is_string());
    assert_eq!(updated["yarns_used"][0], "YARN-002");

    crochet_cmd()
        .current_dir(dir.path())
        .args([
            "piece", "sell", "PIECE-002", "45", "--platform", "market stall",
            "--link", "https://shop.example/winter-hat",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sold PIECE-002 for EUR 45.00"));

    let sold = run_json(dir.path(), &["piece", "show", "PIECE-002"]);
    assert_eq!(sold["destination"], "sold");
    assert_eq!(decimal_field(&sold["sold_price"]), 45.0);
    assert_eq!(sold["sale_platform"], "market stall");
    assert_eq!(sold["sale_link"], "https://shop.example/winter-hat");
}

#[test]
fn test_piece_dimensions_and_gift() {
    let dir = setup_project();

    let added = run_json(
        dir.path(),
        &["piece", "add", "Runner", "--type", "home_decor", "--width", "30", "--length", "120"],
    );
    assert_eq!(added["dimensions"]["width_cm"], 30.0);
    assert_eq!(added["dimensions"]["length_cm"], 120.0);
    assert!(added["dimensions"].get("depth_cm").is_none());

    let updated = run_json(
        dir.path(),
        &["piece", "update", "PIECE-001", "--depth", "0.5", "--gift-recipient", "Aunt May"],
    );
    assert_eq!(updated["dimensions"]["width_cm"], 30.0);
    assert_eq!(updated["dimensions"]["depth_cm"], 0.5);
    assert_eq!(updated["destination"], "gifted");
    assert_eq!(updated["gift_recipient"], "Aunt May");

    crochet_cmd()
        .current_dir(dir.path())
        .args(["piece", "show", "PIECE-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Size:        30 x 120 x 0.5 cm"))
        .stdout(predicate::str::contains("Gift for:    Aunt May"));

    crochet_cmd()
        .current_dir(dir.path())
        .args(["piece", "add", "Flat", "--type", "other", "--width", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Measurements must be positive"));
}

/// Appends a hand-written piece with a type the CLI does not offer
fn add_raw_piece(dir: &Path, piece: serde_json::Value) {
    let path = dir.join(".crochet/pieces.json");
    let mut doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    doc["pieces"].as_array_mut().unwrap().push(piece);
    fs::write(&path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();
}

#[test]
fn test_unrecognized_piece_type_in_file() {
    let dir = setup_workshop();
    add_raw_piece(
        dir.path(),
        serde_json::json!({
            "id": "PIECE-003",
            "name": "Bunny",
            "type": "amigurumi",
            "work_status": "finished",
            "work_hours": 6
        }),
    );

    // Other pieces are unaffected
    let other = run_json(dir.path(), &["time", "PIECE-002"]);
    assert_eq!(other["estimate"]["estimated_total_hours"], 10.0);

    // labor 48, size 1.0 for unlisted types, 20% profit: 57.60 rounds to 60
    crochet_cmd()
        .current_dir(dir.path())
        .args(["price", "PIECE-003"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Size factor:        1.00x"))
        .stdout(predicate::str::contains("Suggested price:    EUR 60.00"));

    let stats = run_json(dir.path(), &["stats"]);
    assert_eq!(stats["averages_by_type"]["amigurumi"]["count"], 1);
    assert_eq!(stats["total_hours_all_time"], 20.0);

    crochet_cmd()
        .current_dir(dir.path())
        .args(["piece", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("amigurumi"));
}

#[test]
fn test_archive_hides_records_from_lists() {
    let dir = setup_workshop();

    crochet_cmd()
        .current_dir(dir.path())
        .args(["yarn", "archive", "YARN-002", "--reason", "used up"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Archived yarn: YARN-002"));

    let active = run_json(dir.path(), &["yarn", "list"]);
    assert_eq!(active.as_array().unwrap().len(), 1);

    let all = run_json(dir.path(), &["yarn", "list", "--all"]);
    assert_eq!(all.as_array().unwrap().len(), 2);
    assert_eq!(all[1]["archived_reason"], "used up");

    // Archived IDs are never handed out again
    let next = run_json(dir.path(), &["yarn", "add", "Silk blend"]);
    assert_eq!(next["id"], "YARN-003");
}

#[test]
fn test_show_unknown_record_fails() {
    let dir = setup_project();

    crochet_cmd()
        .current_dir(dir.path())
        .args(["stitch", "show", "STITCH-042"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Stitch not found: STITCH-042"));
}

// =============================================================================
// Price Tests
// =============================================================================

#[test]
fn test_price_breakdown_text() {
    let dir = setup_workshop();

    // materials 10 + labor 80, textured 1.15 on a hat (0.8), 20% profit
    crochet_cmd()
        .current_dir(dir.path())
        .args(["price", "PIECE-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Price Breakdown for PIECE-001"))
        .stdout(predicate::str::contains("Material cost:      EUR 10.00"))
        .stdout(predicate::str::contains("Labor cost:         EUR 80.00"))
        .stdout(predicate::str::contains("Complexity factor:  1.15x"))
        .stdout(predicate::str::contains("Size factor:        0.80x"))
        .stdout(predicate::str::contains("Adjustment:         EUR 10.80"))
        .stdout(predicate::str::contains("Total:              EUR 120.96"))
        .stdout(predicate::str::contains("Suggested price:    EUR 120.00"));
}

#[test]
fn test_price_json_format() {
    let dir = setup_workshop();

    let json = run_json(dir.path(), &["price", "PIECE-001", "--range"]);

    assert_eq!(json["piece_id"], "PIECE-001");
    assert_eq!(json["currency"], "EUR");
    assert_eq!(decimal_field(&json["breakdown"]["subtotal"]), 90.0);
    assert_eq!(decimal_field(&json["breakdown"]["rounded_price"]), 120.0);
    assert_eq!(json["range"]["basis"]["kind"], "own_price");
    assert_eq!(decimal_field(&json["range"]["min"]), 96.0);
    assert_eq!(decimal_field(&json["range"]["max"]), 144.0);
    assert!(json.get("comparison").is_none());
}

#[test]
fn test_price_uses_project_config() {
    let dir = setup_workshop();
    fs::write(
        dir.path().join(".crochet/config.toml"),
        "currency = \"GBP\"\n\n[pricing]\nhourly_rate = 10\nprofit_margin = 0\n",
    )
    .unwrap();

    crochet_cmd()
        .current_dir(dir.path())
        .args(["price", "PIECE-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Labor cost:         GBP 100.00"));
}

#[test]
fn test_price_compare_to_market() {
    let dir = setup_workshop();
    run_json(dir.path(), &["piece", "sell", "PIECE-002", "200"]);

    crochet_cmd()
        .current_dir(dir.path())
        .args(["price", "PIECE-001", "--compare"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Market Comparison:"))
        .stdout(predicate::str::contains("You may be able to charge more."));
}

#[test]
fn test_price_save_stores_suggestion() {
    let dir = setup_workshop();

    crochet_cmd()
        .current_dir(dir.path())
        .args(["price", "PIECE-001", "--save"])
        .assert()
        .success();

    let piece = run_json(dir.path(), &["piece", "show", "PIECE-001"]);
    assert_eq!(decimal_field(&piece["suggested_price"]), 120.0);
}

#[test]
fn test_price_too_large_is_an_error() {
    let dir = setup_workshop();
    run_json(dir.path(), &["piece", "log", "PIECE-002", "1e28"]);

    crochet_cmd()
        .current_dir(dir.path())
        .args(["price", "PIECE-002"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Price of PIECE-002 is too large to calculate"));
}

#[test]
fn test_price_unknown_piece_fails() {
    let dir = setup_project();

    crochet_cmd()
        .current_dir(dir.path())
        .args(["price", "PIECE-009"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Piece not found: PIECE-009"));
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = setup_workshop();
    fs::write(
        dir.path().join(".crochet/config.toml"),
        "[pricing]\nround_to = 0\n",
    )
    .unwrap();

    crochet_cmd()
        .current_dir(dir.path())
        .args(["price", "PIECE-001"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("round_to"));
}

// =============================================================================
// Time and Statistics Tests
// =============================================================================

#[test]
fn test_time_estimate_from_similar_pieces() {
    let dir = setup_workshop();

    crochet_cmd()
        .current_dir(dir.path())
        .args(["time", "PIECE-002"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hours logged:       4.0"))
        .stdout(predicate::str::contains("Estimated total:    10.0 hours"))
        .stdout(predicate::str::contains("Remaining:          6.0 hours"))
        .stdout(predicate::str::contains("Confidence:         medium"))
        .stdout(predicate::str::contains("Based on similar hat pieces using STITCH-001"));
}

#[test]
fn test_time_predicts_completion() {
    let dir = setup_workshop();

    let json = run_json(
        dir.path(),
        &["time", "PIECE-002", "--predict", "--hours-per-week", "3"],
    );

    // 6 remaining hours at 3 per week is two weeks
    let expected = chrono::Local::now().date_naive() + chrono::Days::new(14);
    assert_eq!(
        json["estimate"]["estimated_completion_date"],
        expected.to_string()
    );
    assert_eq!(json["hours_per_week"], 3.0);
}

#[test]
fn test_time_rejects_zero_hours_per_week() {
    let dir = setup_workshop();

    crochet_cmd()
        .current_dir(dir.path())
        .args(["time", "PIECE-002", "--predict", "--hours-per-week", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("greater than 0"));
}

#[test]
fn test_time_for_finished_and_missing_pieces() {
    let dir = setup_workshop();

    let done = run_json(dir.path(), &["time", "PIECE-001"]);
    assert_eq!(done["estimate"]["confidence"], "high");
    assert_eq!(done["estimate"]["estimated_remaining_hours"], 0.0);

    // Estimates are advisory: a missing piece still gets an answer
    crochet_cmd()
        .current_dir(dir.path())
        .args(["time", "PIECE-077"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Piece not found"))
        .stdout(predicate::str::contains("Confidence:         low"));
}

#[test]
fn test_time_survives_unreadable_records() {
    let dir = setup_workshop();
    fs::write(dir.path().join(".crochet/pieces.json"), "{ not json").unwrap();

    crochet_cmd()
        .current_dir(dir.path())
        .args(["time", "PIECE-002"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Record store unavailable"))
        .stdout(predicate::str::contains("Confidence:         low"));
}

#[test]
fn test_stats_text() {
    let dir = setup_workshop();

    crochet_cmd()
        .current_dir(dir.path())
        .args(["stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total hours worked:    14.0"))
        .stdout(predicate::str::contains("Pieces completed:      1"))
        .stdout(predicate::str::contains("Pieces in progress:    1"))
        .stdout(predicate::str::contains("  hat: 10.0 hours (1 pieces)"))
        .stdout(predicate::str::contains("Yarn inventory:        2 types, 4 balls"))
        .stdout(predicate::str::contains("Stitch library:        1 stitches"));
}

#[test]
fn test_stats_json_format() {
    let dir = setup_workshop();

    let json = run_json(dir.path(), &["stats"]);

    assert_eq!(json["total_hours_all_time"], 14.0);
    assert_eq!(json["averages_by_type"]["hat"]["count"], 1);
    assert_eq!(json["yarn_balls"], 4);
}

// =============================================================================
// Photo Inbox Tests
// =============================================================================

fn drop_photo(dir: &Path, kind: &str, name: &str) {
    fs::write(dir.join("images").join(kind).join("inbox").join(name), b"jpeg").unwrap();
}

#[test]
fn test_inbox_status() {
    let dir = setup_project();

    crochet_cmd()
        .current_dir(dir.path())
        .args(["inbox", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All inboxes are empty."));

    for i in 1..=7 {
        drop_photo(dir.path(), "yarns", &format!("IMG_2026011{}_skein.jpg", i));
    }
    drop_photo(dir.path(), "yarns", "readme.txt");

    crochet_cmd()
        .current_dir(dir.path())
        .args(["inbox", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Yarns inbox: 7 file(s) in 7 group(s)"))
        .stdout(predicate::str::contains("  - IMG_20260111_skein.jpg"))
        .stdout(predicate::str::contains("  ... and 2 more"))
        .stdout(predicate::str::contains("readme").not());
}

#[test]
fn test_inbox_file_dry_run_moves_nothing() {
    let dir = setup_workshop();
    drop_photo(dir.path(), "pieces", "front_view.JPG");
    drop_photo(dir.path(), "pieces", "IMG_20260115_detail.png");

    crochet_cmd()
        .current_dir(dir.path())
        .args(["inbox", "file", "PIECE-001", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("    -> PIECE-001_01_detail.png"))
        .stdout(predicate::str::contains("    -> PIECE-001_02_front.jpg"));

    assert!(dir.path().join("images/pieces/inbox/front_view.JPG").is_file());
    assert!(!dir.path().join("images/pieces/PIECE-001").exists());
}

#[test]
fn test_inbox_file_moves_and_records_photos() {
    let dir = setup_workshop();
    drop_photo(dir.path(), "pieces", "a.jpg");
    drop_photo(dir.path(), "pieces", "b.jpg");

    crochet_cmd()
        .current_dir(dir.path())
        .args(["inbox", "file", "PIECE-002", "-d", "worn", "-d", "flatlay"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Filed 2 photo(s)"));

    let target = dir.path().join("images/pieces/PIECE-002");
    assert!(target.join("PIECE-002_01_worn.jpg").is_file());
    assert!(target.join("PIECE-002_02_flatlay.jpg").is_file());
    assert!(!dir.path().join("images/pieces/inbox/a.jpg").exists());

    let piece = run_json(dir.path(), &["piece", "show", "PIECE-002"]);
    assert_eq!(piece["photos"][0], "PIECE-002_01_worn.jpg");
    assert_eq!(piece["photos"][1], "PIECE-002_02_flatlay.jpg");
}

#[test]
fn test_inbox_file_requires_existing_record() {
    let dir = setup_project();
    drop_photo(dir.path(), "stitches", "swatch.jpg");

    crochet_cmd()
        .current_dir(dir.path())
        .args(["inbox", "file", "STITCH-005"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Stitch not found: STITCH-005"));

    assert!(dir.path().join("images/stitches/inbox/swatch.jpg").is_file());
}

// =============================================================================
// Global Flags
// =============================================================================

#[test]
fn test_verbose_flag() {
    let dir = setup_workshop();

    crochet_cmd()
        .current_dir(dir.path())
        .args(["--verbose", "price", "PIECE-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Suggested price"))
        .stderr(predicate::str::contains("Pricing PIECE-001"));
}

#[test]
fn test_success_messages_in_json() {
    let dir = setup_workshop();

    let json = run_json(dir.path(), &["inbox", "file", "YARN-001"]);

    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "No files in the yarns inbox");
}
