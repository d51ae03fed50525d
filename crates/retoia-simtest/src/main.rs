//! Retoia Headless Simulation Harness
//!
//! Drives every scenario end to end through the public engine API and
//! validates the results. Runs entirely in-process with no renderer.
//!
//! Usage:
//!   cargo run -p retoia-simtest
//!   cargo run -p retoia-simtest -- --verbose
//!   RUST_LOG=retoia_core=info cargo run -p retoia-simtest

use retoia_core::prelude::*;
use retoia_core::systems::Milestone;
use retoia_logic::catalog::KindClass;
use retoia_logic::economy::{settle_energy, settle_turn, TurnInputs};
use retoia_logic::maintenance::{decayed_health, HealthBand};
use retoia_logic::network::{line_efficiency, MIN_LINE_EFFICIENCY};
use retoia_logic::outcome::GameOverCause;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail: detail.into(),
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
    println!("=== Retoia Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Catalog & formula sweep
    results.extend(validate_logic(verbose));

    // 2. City builder session
    results.extend(validate_city_builder(verbose));

    // 3. Energy grid session
    results.extend(validate_energy_grid(verbose));

    // 4. Maintenance timing
    results.extend(validate_maintenance(verbose));

    // 5. Industrial park turns
    results.extend(validate_industrial_park(verbose));

    // 6. Configuration & snapshot export
    results.extend(validate_config_and_snapshot(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        log::error!("{} simulation checks failed", failed);
        std::process::exit(1);
    }
}

// ── 1. Catalog & Formulas ───────────────────────────────────────────────

fn validate_logic(verbose: bool) -> Vec<TestResult> {
    println!("--- Catalog & Formulas ---");
    let mut results = Vec::new();

    // Palettes only hold buildable, paid kinds
    let bad: Vec<String> = Scenario::ALL
        .iter()
        .flat_map(|s| s.palette().iter().map(move |k| (*s, *k)))
        .filter(|(_, k)| {
            matches!(k.class(), KindClass::Scenery | KindClass::Consumer) || k.stats().cost <= 0
        })
        .map(|(s, k)| format!("{:?}/{:?}", s, k))
        .collect();
    results.push(check(
        "palette_buildable",
        bad.is_empty(),
        if bad.is_empty() {
            "every palette entry is buildable".to_string()
        } else {
            format!("unbuildable entries: {}", bad.join(", "))
        },
    ));

    // Line efficiency is monotone and floored
    let mut monotone = true;
    let mut floored = true;
    for d in 0..200 {
        let e = line_efficiency(d);
        monotone &= line_efficiency(d + 1) <= e;
        floored &= e >= MIN_LINE_EFFICIENCY;
    }
    results.push(check(
        "line_efficiency_shape",
        monotone && floored,
        format!(
            "d=1 -> {:.2}, d=20 -> {:.2}, d=100 -> {:.2}",
            line_efficiency(1),
            line_efficiency(20),
            line_efficiency(100)
        ),
    ));

    // Decay clamps into range
    let clamped = (0..100).all(|t| {
        let h = decayed_health(100.0, 0.002, t as f32 * 10.0);
        (0.0..=100.0).contains(&h)
    });
    results.push(check(
        "decay_clamped",
        clamped,
        "health stays within 0..=100",
    ));

    // Settlement sign follows supply and demand
    let surplus = settle_energy(100.0, 40.0);
    let deficit = settle_energy(10.0, 60.0);
    results.push(check(
        "energy_settlement_sign",
        surplus.balance > 0 && deficit.balance < 0,
        format!(
            "surplus balance {}, deficit balance {}",
            surplus.balance, deficit.balance
        ),
    ));

    // Waste above target is penalised
    let clean = settle_turn(&TurnInputs {
        production_multiplier: 1.0,
        waste: 150.0,
        ..Default::default()
    });
    let dirty = settle_turn(&TurnInputs {
        production_multiplier: 1.0,
        waste: 260.0,
        ..Default::default()
    });
    results.push(check(
        "waste_penalty",
        clean.waste_penalty == 0 && dirty.waste_penalty == 300,
        format!("150 -> {}, 260 -> {}", clean.waste_penalty, dirty.waste_penalty),
    ));

    if verbose {
        println!("  Maintenance kinds:");
        for kind in MaintenanceKind::ALL {
            println!(
                "    {:12?} +{:>5.1} health, {}x upkeep, {:>4.1}s",
                kind,
                kind.restore_amount(),
                kind.cost_multiplier(),
                kind.duration_secs()
            );
        }
    }

    results
}

// ── 2. City Builder ─────────────────────────────────────────────────────

fn validate_city_builder(_verbose: bool) -> Vec<TestResult> {
    println!("--- City Builder ---");
    let mut results = Vec::new();

    let mut engine = match SimulationEngine::for_scenario(Scenario::CityBuilder) {
        Ok(e) => e,
        Err(e) => {
            results.push(check("city_create", false, format!("config error: {}", e)));
            return results;
        }
    };

    engine.handle_key("2");
    let placed = engine.click_at(0, 0).is_ok();
    results.push(check(
        "city_tower_points",
        placed && engine.money() == 95,
        format!("money after tower: {}", engine.money()),
    ));

    engine.handle_key("Delete");
    let removed = engine.click_at(0, 0).is_ok();
    results.push(check(
        "city_removal_forfeit",
        removed && engine.money() == 88,
        format!("money after removal: {}", engine.money()),
    ));

    let before = engine.money();
    let refused = matches!(engine.click_at(7, 2), Err(Rejection::Permanent(_)));
    results.push(check(
        "city_scenery_permanent",
        refused && engine.money() == before,
        "tree refuses the eraser",
    ));

    // Spend down to nothing; the last attempt must be refused cleanly
    engine.handle_key("1");
    let mut builds = 0;
    let mut refusal = None;
    'outer: for z in 0..10 {
        for x in 0..10 {
            match engine.click_at(x, z) {
                Ok(_) => builds += 1,
                Err(Rejection::InsufficientFunds { .. }) => {
                    refusal = Some((x, z));
                    break 'outer;
                }
                Err(_) => {}
            }
        }
    }
    let clean_refusal = refusal
        .map(|(x, z)| !engine.grid().is_occupied(Cell::new(x, z)))
        .unwrap_or(true);
    results.push(check(
        "city_budget_exhaustion",
        clean_refusal && engine.registry().len() == builds,
        format!("{} houses built, refusal at {:?}", builds, refusal),
    ));

    results
}

// ── 3. Energy Grid ──────────────────────────────────────────────────────

fn energy_engine(seed: u64, consumers: u32) -> Option<SimulationEngine> {
    let mut config = ScenarioConfig::for_scenario(Scenario::EnergyGrid).with_seed(seed);
    config.consumer_count = consumers;
    SimulationEngine::new(config).ok()
}

fn validate_energy_grid(verbose: bool) -> Vec<TestResult> {
    println!("--- Energy Grid ---");
    let mut results = Vec::new();

    let Some(mut engine) = energy_engine(42, 0) else {
        results.push(check("energy_create", false, "default config rejected"));
        return results;
    };

    // Solar next to a consumer
    let seeded = engine.seed_consumer(Cell::new(2, 3), 50).is_ok();
    engine.select_tool(Tool::Build(EntityKind::Solar));
    let built = engine.click_at(2, 2).is_ok();
    engine.select_tool(Tool::Connect);
    let connected = engine.click_at(2, 2).is_ok() && engine.click_at(2, 3).is_ok();
    let production = engine.aggregates().production;
    results.push(check(
        "energy_end_to_end",
        seeded && built && connected && (production - 49.0).abs() < 1e-3
            && engine.money() == 4850,
        format!("production {:.2}, money {}", production, engine.money()),
    ));

    let consumer_connected = engine
        .network()
        .consumers()
        .first()
        .is_some_and(|c| c.connected);
    results.push(check(
        "energy_consumer_connected",
        consumer_connected,
        "consumer is a line endpoint",
    ));

    // Run until the source wears out
    let mut elapsed = 0;
    while engine.game_over().is_none() && elapsed < 2000 {
        engine.update(1.0);
        elapsed += 1;
    }
    let cause = engine.game_over().map(|g| g.cause);
    results.push(check(
        "energy_wear_ends_game",
        matches!(
            cause,
            Some(GameOverCause::AllCritical { .. } | GameOverCause::SourceFailed { .. })
        ),
        format!(
            "after {}s: {}",
            elapsed,
            engine
                .game_over()
                .map_or("still running".to_string(), |g| g.reason.clone())
        ),
    ));

    let frozen = engine.click_at(2, 2) == Err(Rejection::Frozen);
    results.push(check("energy_frozen", frozen, "commands refused after loss"));

    engine.reset();
    results.push(check(
        "energy_reset",
        engine.game_over().is_none()
            && engine.money() == 5000
            && engine.registry().is_empty()
            && engine.network().lines().is_empty(),
        format!("money {}, entities {}", engine.money(), engine.registry().len()),
    ));

    // Seeded layouts repeat
    let layout = |seed| energy_engine(seed, 4).map(|e| e.network().consumers().to_vec());
    results.push(check(
        "energy_seeded_layout",
        layout(7).is_some() && layout(7) == layout(7),
        "same seed, same consumers",
    ));

    if verbose {
        if let Some(engine) = energy_engine(7, 4) {
            println!("  Consumers (seed 7):");
            for c in engine.network().consumers() {
                println!("    {} demand {}", c.cell, c.demand);
            }
        }
    }

    results
}

// ── 4. Maintenance ──────────────────────────────────────────────────────

fn validate_maintenance(_verbose: bool) -> Vec<TestResult> {
    println!("--- Maintenance ---");
    let mut results = Vec::new();

    let Some(mut engine) = energy_engine(1, 0) else {
        results.push(check("maintenance_create", false, "default config rejected"));
        return results;
    };
    engine.select_tool(Tool::Build(EntityKind::Wind));
    let _ = engine.click_at(4, 4);
    engine.update(400.0);
    let worn = engine
        .registry()
        .find(Cell::new(4, 4))
        .map_or(0.0, |v| v.health);

    let started = engine.maintain_at(4, 4, MaintenanceKind::Overhaul).is_ok();
    let duplicate = engine.maintain_at(4, 4, MaintenanceKind::Inspection)
        == Err(Rejection::AlreadyInMaintenance(Cell::new(4, 4)));
    results.push(check(
        "maintenance_single_job",
        started && duplicate && engine.pending_maintenance() == 1,
        format!("worn health {:.1}", worn),
    ));

    engine.update(10.0);
    let view = engine.registry().find(Cell::new(4, 4));
    let restored = view.is_some_and(|v| !v.in_maintenance() && v.health > 95.0);
    let bonus = view.is_some_and(|v| v.effective_efficiency(engine.now()) > 1.0);
    results.push(check(
        "maintenance_overhaul",
        restored && bonus,
        format!(
            "health {:.1}, band {:?}",
            view.map_or(0.0, |v| v.health),
            view.map(|v| HealthBand::from_health(v.health))
        ),
    ));

    engine.update(31.0);
    let expired = engine
        .registry()
        .find(Cell::new(4, 4))
        .is_some_and(|v| v.bonus.is_none());
    results.push(check(
        "maintenance_bonus_expires",
        expired,
        "bonus dropped after 30s",
    ));

    results
}

// ── 5. Industrial Park ──────────────────────────────────────────────────

fn validate_industrial_park(verbose: bool) -> Vec<TestResult> {
    println!("--- Industrial Park ---");
    let mut results = Vec::new();

    let mut config = ScenarioConfig::for_scenario(Scenario::IndustrialPark);
    config.starting_money = 60_000;
    let mut engine = match SimulationEngine::new(config) {
        Ok(e) => e,
        Err(e) => {
            results.push(check("industry_create", false, format!("config error: {}", e)));
            return results;
        }
    };

    // A research cluster
    let layout = [
        (EntityKind::ResearchCenter, 20, 20),
        (EntityKind::CleanFactory, 21, 20),
        (EntityKind::CleanFactory, 19, 20),
        (EntityKind::RecyclingPlant, 20, 21),
        (EntityKind::SmartHub, 20, 19),
        (EntityKind::SmartHub, 30, 30),
    ];
    let mut all_placed = true;
    for (kind, x, z) in layout {
        // select_tool toggles, so only switch when the kind changes
        if engine.selected_tool() != Some(Tool::Build(kind)) {
            engine.select_tool(Tool::Build(kind));
        }
        all_placed &= engine.click_at(x, z).is_ok();
    }
    let agg = *engine.aggregates();
    results.push(check(
        "industry_cluster",
        all_placed && agg.innovation >= 50.0 && agg.waste == 0.0,
        format!(
            "innovation {:.0}, resilience {:.0}, waste {:.0}",
            agg.innovation, agg.resilience, agg.waste
        ),
    ));

    let milestones = &engine.industrial().milestones;
    results.push(check(
        "industry_milestones",
        milestones.contains(&Milestone::InnovationLeader),
        format!("{:?}", milestones),
    ));

    let mut money_ok = true;
    for _ in 0..5 {
        match engine.advance_turn() {
            Some(report) => {
                money_ok &= report.money_after == engine.money();
                if verbose {
                    println!(
                        "  turn {}: balance {:+}, money {}",
                        report.turn, report.breakdown.balance, report.money_after
                    );
                }
            }
            None => money_ok = false,
        }
    }
    results.push(check(
        "industry_turns",
        money_ok && engine.industrial().turn == 5,
        format!(
            "multiplier {:.2} after 5 turns",
            engine.industrial().modifiers.production_multiplier
        ),
    ));

    results
}

// ── 6. Config & Snapshot ────────────────────────────────────────────────

fn validate_config_and_snapshot(_verbose: bool) -> Vec<TestResult> {
    println!("--- Config & Snapshot ---");
    let mut results = Vec::new();

    let parsed = ScenarioConfig::from_json(r#"{ "scenario": "EnergyGrid", "seed": 3 }"#);
    results.push(check(
        "config_json",
        parsed.as_ref().is_ok_and(|c| c.starting_money == 5000),
        match &parsed {
            Ok(c) => format!("grid {} with {} consumers", c.grid_size, c.consumer_count),
            Err(e) => e.to_string(),
        },
    ));

    let invalid = ScenarioConfig::from_json(r#"{ "scenario": "EnergyGrid", "grid_size": 0 }"#);
    results.push(check(
        "config_rejects_empty_grid",
        matches!(invalid, Err(ConfigError::EmptyGrid)),
        "grid_size 0 refused",
    ));

    let json = parsed
        .ok()
        .and_then(|c| SimulationEngine::new(c).ok())
        .and_then(|e| e.snapshot_json().ok());
    let value: Option<serde_json::Value> = json.as_deref().and_then(|j| serde_json::from_str(j).ok());
    results.push(check(
        "snapshot_json",
        value
            .as_ref()
            .is_some_and(|v| v["money"] == 5000 && v["game_over"].is_null()),
        format!("{} bytes", json.map_or(0, |j| j.len())),
    ));

    results
}
