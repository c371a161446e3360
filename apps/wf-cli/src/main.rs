use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};

use wf_energy::ReportPeriod;
use wf_engine::{CommandResult, Engine, EngineConfig, OutdoorConditions};
use wf_zone::SensorUpdate;

#[derive(Parser)]
#[command(name = "wf-cli")]
#[command(about = "warmflow CLI - multi-zone floor heating control engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration file
    Validate {
        /// Path to the engine YAML configuration
        config_path: PathBuf,
    },
    /// List the zones of a configuration
    Zones {
        /// Path to the engine YAML configuration
        config_path: PathBuf,
    },
    /// Drive the engine against a synthetic house model
    Simulate {
        /// Path to the engine YAML configuration
        config_path: PathBuf,
        /// Simulated duration in hours
        #[arg(long, default_value_t = 24)]
        hours: u64,
        /// Control tick interval in seconds
        #[arg(long, default_value_t = 60)]
        tick_secs: u64,
    },
}

fn main() -> CommandResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Zones { config_path } => cmd_zones(&config_path),
        Commands::Simulate {
            config_path,
            hours,
            tick_secs,
        } => cmd_simulate(&config_path, hours, tick_secs.max(1)),
    }
}

fn cmd_validate(config_path: &Path) -> CommandResult<()> {
    println!("Validating configuration: {}", config_path.display());
    let config = EngineConfig::load(config_path)?;
    // building the engine exercises the per-zone invariants too
    let engine = Engine::new(config)?;
    println!("✓ Configuration is valid ({} zones)", engine.zone_count());
    Ok(())
}

fn cmd_zones(config_path: &Path) -> CommandResult<()> {
    let config = EngineConfig::load(config_path)?;
    let engine = Engine::new(config)?;
    let zones = engine.all_zone_status();

    if zones.is_empty() {
        println!("No zones configured");
        return Ok(());
    }
    println!("Zones:");
    for zone in zones {
        println!(
            "  {} - {:?}/{:?}, mode {:?}, target {:.1}°C, floor limit {:.1}°C",
            zone.name, zone.tech, zone.material, zone.mode, zone.target_temp, zone.max_floor_temp
        );
    }
    Ok(())
}

/// First-order room model: the floor build-up follows the heater, the air
/// follows the floor and leaks toward outdoors.
struct Room {
    air: f64,
    floor: f64,
}

impl Room {
    fn step(&mut self, output_percent: f64, outdoor: f64, dt_s: f64) {
        let drive = output_percent / 100.0;
        let dt_min = dt_s / 60.0;
        self.floor += (drive * 0.12 - (self.floor - self.air) * 0.02) * dt_min;
        self.air += ((self.floor - self.air) * 0.01 - (self.air - outdoor) * 0.002) * dt_min;
    }
}

/// Winter day outdoor temperature, coldest before dawn.
fn outdoor_at(hour_of_day: f64) -> f64 {
    use std::f64::consts::TAU;
    5.0 + 3.0 * (TAU * (hour_of_day - 14.0) / 24.0).cos()
}

/// Spot price shape: cheap at night, peak in the evening.
fn price_at(hour_of_day: u64) -> f64 {
    match hour_of_day {
        0..=5 => 0.60,
        17..=20 => 2.80,
        _ => 1.50,
    }
}

fn cmd_simulate(config_path: &Path, hours: u64, tick_secs: u64) -> CommandResult<()> {
    let config = EngineConfig::load(config_path)?;
    let energy_s = config.ticks.energy_s.max(tick_secs);
    let weather_s = config.ticks.weather_s.max(tick_secs);
    let maintenance_s = config.ticks.maintenance_s.max(tick_secs);
    let mut engine = Engine::new(config)?;

    // Monday 00:00 keeps weekly schedules meaningful
    let start: NaiveDateTime = NaiveDate::from_ymd_opt(2026, 1, 5)
        .ok_or_else(invalid_clock)?
        .and_hms_opt(0, 0, 0)
        .ok_or_else(invalid_clock)?;

    let mut rooms: HashMap<String, Room> = engine
        .all_zone_status()
        .into_iter()
        .map(|z| {
            (
                z.name,
                Room {
                    air: z.air_temp,
                    floor: z.floor_temp,
                },
            )
        })
        .collect();

    println!(
        "Simulating {} zones for {hours}h at {tick_secs}s ticks",
        rooms.len()
    );

    let total_secs = hours * 3600;
    let mut elapsed = 0u64;
    while elapsed <= total_secs {
        let now = start + Duration::seconds(elapsed as i64);
        let hour_of_day = (elapsed / 3600) % 24;
        let outdoor = outdoor_at(elapsed as f64 / 3600.0 % 24.0);

        if elapsed % weather_s == 0 {
            engine.set_outdoor_conditions(OutdoorConditions {
                temperature: outdoor,
                ..Default::default()
            });
            engine.weather_tick();
        }
        if elapsed % 3600 == 0 {
            engine.update_energy_price(price_at(hour_of_day), now);
        }

        let statuses = engine.all_zone_status();
        for status in &statuses {
            let Some(room) = rooms.get_mut(&status.name) else {
                continue;
            };
            room.step(status.output_percent, outdoor, tick_secs as f64);
            engine.update_sensor_readings(
                &status.name,
                &SensorUpdate {
                    air_temp: Some(room.air),
                    floor_temp: Some(room.floor),
                    flow_rate: Some(status.output_percent * 0.04),
                    ..Default::default()
                },
            )?;
        }

        engine.schedule_tick(now);
        engine.control_tick(now);
        if elapsed % energy_s == 0 {
            engine.energy_tick(now);
        }
        if elapsed % maintenance_s == 0 {
            engine.maintenance_tick(now);
        }

        for event in engine.drain_events() {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{} {line}", now.format("%H:%M")),
                Err(e) => tracing::warn!(error = %e, "event serialization failed"),
            }
        }

        if elapsed % 3600 == 0 {
            print_status_line(&engine, now);
        }

        elapsed += tick_secs;
    }

    let report = engine.energy_report(ReportPeriod::Lifetime);
    println!(
        "✓ Done: {:.2} kWh, cost {:.2}, {:.2} heating degree days",
        report.kwh, report.cost, report.heating_degree_days
    );
    let maintenance = engine.maintenance_report();
    println!("  System health: {:.0}/100", maintenance.health_score);
    for zone in engine.all_zone_status() {
        if let Ok(comfort) = engine.comfort(&zone.name) {
            println!(
                "  {}: air {:.1}°C, comfort {:.0} ({:?})",
                zone.name, zone.air_temp, comfort.score, comfort.rating
            );
        }
    }
    Ok(())
}

fn print_status_line(engine: &Engine, now: NaiveDateTime) {
    let summary: Vec<String> = engine
        .all_zone_status()
        .iter()
        .map(|z| {
            format!(
                "{} {:.1}→{:.1}°C {:>3.0}%{}",
                z.name,
                z.air_temp,
                z.target_temp,
                z.output_percent,
                if z.heating_active { "*" } else { "" }
            )
        })
        .collect();
    println!("{} | {}", now.format("%a %H:%M"), summary.join(" | "));
}

fn invalid_clock() -> wf_engine::CommandError {
    wf_engine::CommandError::Config {
        what: "invalid simulation clock".to_string(),
    }
}
