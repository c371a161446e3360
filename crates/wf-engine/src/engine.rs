//! The engine aggregate: zones, controllers, schedules, energy, weather,
//! occupancy, maintenance and the outbound event queue.
//!
//! Tick entry points are driven by an external clock; command methods are
//! called by collaborators between ticks. Everything takes `&mut self`, so
//! ticks and commands are serialized by construction. The control tick fans
//! out over zones with rayon; each zone's slot, controller and window latch
//! are disjoint, so no locking is needed.

use chrono::{Duration, NaiveDateTime};
use rayon::prelude::*;

use wf_comfort::{assess, ComfortAssessment};
use wf_control::{LimiterAction, PidController};
use wf_core::{round_half_degree, ZoneId};
use wf_energy::{EnergyAccount, EnergyReport, PriceAction, PriceState, ReportPeriod, ThermalMassOptimizer};
use wf_schedule::{evaluate, ZoneSchedule};
use wf_zone::{FaultCode, OperatingMode, SensorUpdate, Zone, ZoneRegistry, ZoneSpec};

use crate::config::EngineConfig;
use crate::error::{CommandError, CommandResult};
use crate::events::EngineEvent;
use crate::maintenance::{
    health_report, AntiSeizeCycle, AntiSeizePhase, MaintenanceReport, MaintenanceState,
};
use crate::occupancy::{GeofencingState, GeofencingUpdate, OccupancyState};
use crate::status::ZoneStatus;
use crate::target::{effective_target, TargetInputs};
use crate::weather::{OutdoorConditions, WeatherState};

/// Parse a caller-supplied mode string.
pub fn parse_mode(s: &str) -> CommandResult<OperatingMode> {
    match s.to_ascii_lowercase().as_str() {
        "comfort" => Ok(OperatingMode::Comfort),
        "eco" => Ok(OperatingMode::Eco),
        "frost" => Ok(OperatingMode::Frost),
        _ => Err(CommandError::InvalidMode { what: s.to_string() }),
    }
}

/// The zone control engine.
///
/// Per-zone collaborator state (controller, schedule, occupancy, window
/// latch) lives in vectors indexed by [`ZoneId::index`], parallel to the
/// registry's slots. Removal tombstones every vector at once so ids handed
/// out earlier stay valid.
pub struct Engine {
    config: EngineConfig,
    registry: ZoneRegistry,
    controllers: Vec<Option<PidController>>,
    schedules: Vec<Option<ZoneSchedule>>,
    occupancy: Vec<Option<OccupancyState>>,
    window_paused: Vec<bool>,
    optimizer: ThermalMassOptimizer,
    prices: PriceState,
    account: EnergyAccount,
    weather: WeatherState,
    geofencing: GeofencingState,
    maintenance: MaintenanceState,
    events: Vec<EngineEvent>,
}

impl Engine {
    /// Build an engine from a validated configuration, registering every
    /// configured zone.
    pub fn new(config: EngineConfig) -> CommandResult<Self> {
        config.validate()?;
        let optimizer = ThermalMassOptimizer::new(config.optimizer);
        let zones = config.zones.clone();
        let mut engine = Self {
            config,
            registry: ZoneRegistry::new(),
            controllers: Vec::new(),
            schedules: Vec::new(),
            occupancy: Vec::new(),
            window_paused: Vec::new(),
            optimizer,
            prices: PriceState::new(),
            account: EnergyAccount::new(),
            weather: WeatherState::new(),
            geofencing: GeofencingState::default(),
            maintenance: MaintenanceState::default(),
            events: Vec::new(),
        };
        for zone in zones {
            engine.add_zone(zone.spec, zone.schedule)?;
        }
        Ok(engine)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn zone_count(&self) -> usize {
        self.registry.len()
    }

    /// Drain the queued events; callers deliver them however they like.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Zone lifecycle
    // ------------------------------------------------------------------

    /// Register a zone at runtime. The zone starts in eco with its own
    /// controller state.
    pub fn add_zone(
        &mut self,
        spec: ZoneSpec,
        schedule: Option<ZoneSchedule>,
    ) -> CommandResult<ZoneId> {
        let controller =
            PidController::new(self.config.pid).map_err(|e| CommandError::Config {
                what: e.to_string(),
            })?;
        let id = self.registry.add(spec)?;
        debug_assert_eq!(id.index() as usize, self.controllers.len());
        self.controllers.push(Some(controller));
        self.schedules.push(schedule);
        self.occupancy.push(Some(OccupancyState::default()));
        self.window_paused.push(false);
        tracing::info!(zone = id.index(), "zone registered");
        Ok(id)
    }

    /// Remove a zone by name. Its heating is forced off and its id is never
    /// reused.
    pub fn remove_zone(&mut self, name: &str) -> CommandResult<()> {
        let id = self.registry.resolve(name)?;
        let zone = self.registry.remove(id)?;
        let idx = id.index() as usize;
        self.controllers[idx] = None;
        self.schedules[idx] = None;
        self.occupancy[idx] = None;
        self.window_paused[idx] = false;
        self.maintenance.cycles.retain(|c| c.zone != id);
        tracing::info!(zone = %zone.name, "zone removed");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Tick entry points
    // ------------------------------------------------------------------

    /// Run one control pass over every zone: resolve the effective target,
    /// compute the PID output, clamp it through floor protection, commit.
    ///
    /// Zones are independent and processed in parallel. A fault in one zone
    /// forces that zone's output off and never affects its neighbours.
    pub fn control_tick(&mut self, now: NaiveDateTime) {
        self.abort_unsafe_cycles();
        let base = TargetInputs {
            unoccupied_minutes: 0.0,
            weather_adjust_c: self.weather.compensation(&self.config.weather),
            summer_shutdown: self.weather.summer_shutdown(),
            hard_frost: self.weather.hard_frost(&self.config.weather),
        };
        let config = &self.config;
        let occupancy = &self.occupancy;
        let maintenance = &self.maintenance;
        let time = now.time();

        let batches: Vec<Vec<EngineEvent>> = self
            .registry
            .slots_mut()
            .par_iter_mut()
            .zip(self.controllers.par_iter_mut())
            .zip(self.window_paused.par_iter_mut())
            .enumerate()
            .map(|(idx, ((slot, controller), paused))| {
                let mut events = Vec::new();
                let (Some(zone), Some(pid)) = (slot.as_mut(), controller.as_mut()) else {
                    return events;
                };
                // A valve mid-exercise is owned by the maintenance tick.
                if maintenance.cycle_active(ZoneId::from_index(idx as u32)) {
                    return events;
                }
                let unoccupied_minutes = occupancy
                    .get(idx)
                    .and_then(|o| o.as_ref())
                    .map_or(0.0, |o| o.unoccupied_minutes);
                let inputs = TargetInputs {
                    unoccupied_minutes,
                    ..base
                };
                control_zone(config, zone, pid, paused, &inputs, time, now, &mut events);
                events
            })
            .collect();

        for batch in batches {
            self.events.extend(batch);
        }
    }

    /// Evaluate every zone's weekly schedule at `now` and apply the decided
    /// mode. Pure evaluation keeps this idempotent: re-running at the same
    /// timestamp produces no further mode changes and no duplicate events.
    pub fn schedule_tick(&mut self, now: NaiveDateTime) {
        let anticipatory = self.config.scheduler.anticipatory_minutes;
        let slots = self.registry.slots_mut();
        for (slot, schedule) in slots.iter_mut().zip(self.schedules.iter()) {
            let (Some(zone), Some(schedule)) = (slot.as_mut(), schedule.as_ref()) else {
                continue;
            };
            let decision = evaluate(schedule, now, zone.mode, anticipatory);
            let Some(mode) = decision.mode else { continue };
            if let Some(from) = zone.set_mode(mode) {
                tracing::info!(
                    zone = %zone.name,
                    ?from,
                    to = ?mode,
                    quick_heat = decision.quick_heat,
                    "scheduled mode change"
                );
                self.events.push(EngineEvent::ModeChanged {
                    zone: zone.name.clone(),
                    from,
                    to: mode,
                    quick_heat: decision.quick_heat,
                });
            }
        }
    }

    /// Account energy and cost for the interval since the previous energy
    /// tick, rolling day/week/month buckets on boundaries.
    pub fn energy_tick(&mut self, now: NaiveDateTime) {
        let price = self.prices.current();
        let outdoor = self.weather.outdoor_temp();
        let Self {
            account, registry, ..
        } = self;
        let summary = account.log_tick(now, price, outdoor, registry.iter_mut().map(|(_, z)| z));
        tracing::debug!(kwh = summary.kwh, cost = summary.cost, "energy tick");
    }

    /// Re-evaluate summer shutdown from the rolling outdoor mean.
    pub fn weather_tick(&mut self) {
        if let Some(active) = self.weather.evaluate_summer_shutdown(&self.config.weather) {
            self.events.push(EngineEvent::SummerShutdown { active });
        }
    }

    /// Refresh each zone's derived unoccupied duration.
    pub fn occupancy_tick(&mut self, now: NaiveDateTime) {
        for occ in self.occupancy.iter_mut().flatten() {
            occ.tick(now);
        }
    }

    /// Maintenance pass: advance running anti-seize cycles, check valve
    /// health and flow plausibility, kick off the periodic anti-seize run.
    pub fn maintenance_tick(&mut self, now: NaiveDateTime) {
        self.advance_anti_seize(now);
        self.check_valves();
        if self.maintenance.anti_seize_due(now, &self.config.maintenance) {
            self.start_anti_seize(now);
        }
    }

    /// Drop any running anti-seize cycle whose zone has tripped a hard floor
    /// limit while the valve was forced open. The zone goes back to normal
    /// control with the output off; the next control tick re-evaluates it.
    fn abort_unsafe_cycles(&mut self) {
        let Self {
            maintenance,
            registry,
            ..
        } = self;
        maintenance.cycles.retain(|cycle| {
            let Ok(zone) = registry.get_mut(cycle.zone) else {
                return false;
            };
            if zone.floor_temp < zone.max_floor_temp && !zone.moisture {
                return true;
            }
            zone.output_percent = 0.0;
            zone.heating_active = false;
            tracing::warn!(
                zone = %zone.name,
                floor = zone.floor_temp,
                max = zone.max_floor_temp,
                "anti-seize cycle aborted by floor protection"
            );
            false
        });
    }

    fn advance_anti_seize(&mut self, now: NaiveDateTime) {
        self.abort_unsafe_cycles();
        let phase_s = self.config.maintenance.anti_seize_phase_s;
        let cycles = std::mem::take(&mut self.maintenance.cycles);
        let mut keep = Vec::with_capacity(cycles.len());
        for mut cycle in cycles {
            if (now - cycle.phase_started).num_seconds() < phase_s {
                keep.push(cycle);
                continue;
            }
            match cycle.phase {
                AntiSeizePhase::Opening => {
                    if let Ok(zone) = self.registry.get_mut(cycle.zone) {
                        zone.output_percent = 0.0;
                    }
                    cycle.phase = AntiSeizePhase::Closing;
                    cycle.phase_started = now;
                    keep.push(cycle);
                }
                AntiSeizePhase::Closing => {
                    if let Ok(zone) = self.registry.get_mut(cycle.zone) {
                        zone.output_percent = cycle.prior_output.clamp(0.0, 100.0);
                        zone.heating_active = zone.output_percent > 0.0;
                        tracing::debug!(zone = %zone.name, "anti-seize cycle complete");
                    }
                }
            }
        }
        self.maintenance.cycles = keep;
    }

    fn check_valves(&mut self) {
        let cfg = self.config.maintenance;
        let mut events = Vec::new();
        for (id, zone) in self.registry.iter_mut() {
            if !zone.tech.has_valve() || self.maintenance.cycle_active(id) {
                continue;
            }
            let expected = zone.output_percent * cfg.flow_constant;
            let stuck = zone.output_percent > cfg.valve_open_threshold_pct
                && zone.flow_rate < cfg.flow_epsilon;
            let anomaly = !stuck
                && expected > cfg.flow_epsilon
                && (zone.flow_rate - expected).abs() > cfg.flow_deviation_frac * expected;

            let observed = if stuck {
                Some(FaultCode::ValveStuck)
            } else if anomaly {
                Some(FaultCode::FlowAnomaly)
            } else {
                None
            };
            match observed {
                Some(fault) => {
                    if zone.fault != Some(fault) {
                        zone.fault = Some(fault);
                        tracing::warn!(zone = %zone.name, ?fault, "valve health fault");
                        events.push(match fault {
                            FaultCode::ValveStuck => EngineEvent::ValveStuck {
                                zone: zone.name.clone(),
                            },
                            _ => EngineEvent::FlowAnomaly {
                                zone: zone.name.clone(),
                                expected,
                                measured: zone.flow_rate,
                            },
                        });
                    }
                }
                None => {
                    // only the faults this check owns are cleared here
                    if matches!(
                        zone.fault,
                        Some(FaultCode::ValveStuck | FaultCode::FlowAnomaly)
                    ) {
                        zone.fault = None;
                        tracing::info!(zone = %zone.name, "valve health recovered");
                    }
                }
            }
        }
        self.events.extend(events);
    }

    fn start_anti_seize(&mut self, now: NaiveDateTime) {
        for (id, zone) in self.registry.iter_mut() {
            if !zone.tech.has_valve() || self.maintenance.cycle_active(id) {
                continue;
            }
            // Forcing the valve open must still respect the hard floor
            // limits; a zone at its limit sits this run out.
            if zone.floor_temp >= zone.max_floor_temp || zone.moisture {
                tracing::warn!(
                    zone = %zone.name,
                    floor = zone.floor_temp,
                    max = zone.max_floor_temp,
                    "anti-seize skipped while floor protection is active"
                );
                continue;
            }
            let prior_output = zone.output_percent;
            zone.output_percent = 100.0;
            tracing::info!(zone = %zone.name, "anti-seize cycle started");
            self.maintenance.cycles.push(AntiSeizeCycle {
                zone: id,
                phase: AntiSeizePhase::Opening,
                phase_started: now,
                prior_output,
            });
        }
    }

    // ------------------------------------------------------------------
    // Command API
    // ------------------------------------------------------------------

    /// Set a zone's target temperature, rounded to the nearest half degree.
    /// Material range and frost floor are validated; rejection changes
    /// nothing.
    pub fn set_zone_temp(&mut self, name: &str, target: f64) -> CommandResult<ZoneStatus> {
        let id = self.registry.resolve(name)?;
        let zone = self.registry.get_mut(id)?;
        zone.set_target(round_half_degree(target))?;
        tracing::info!(zone = %zone.name, target = zone.target_temp, "target set");
        Ok(ZoneStatus::from(&*zone))
    }

    /// Switch a zone's operating mode, re-basing its target.
    pub fn set_mode(&mut self, name: &str, mode: OperatingMode) -> CommandResult<ZoneStatus> {
        let id = self.registry.resolve(name)?;
        let zone = self.registry.get_mut(id)?;
        if let Some(from) = zone.set_mode(mode) {
            self.events.push(EngineEvent::ModeChanged {
                zone: zone.name.clone(),
                from,
                to: mode,
                quick_heat: false,
            });
        }
        Ok(ZoneStatus::from(&*zone))
    }

    /// Replace (or clear) a zone's weekly schedule.
    pub fn set_schedule(
        &mut self,
        name: &str,
        schedule: Option<ZoneSchedule>,
    ) -> CommandResult<()> {
        let id = self.registry.resolve(name)?;
        self.schedules[id.index() as usize] = schedule;
        Ok(())
    }

    pub fn schedule(&self, name: &str) -> CommandResult<Option<&ZoneSchedule>> {
        let id = self.registry.resolve(name)?;
        Ok(self.schedules[id.index() as usize].as_ref())
    }

    /// Apply a partial sensor update to a zone. Non-finite readings are
    /// filtered; absent fields leave state untouched.
    pub fn update_sensor_readings(
        &mut self,
        name: &str,
        update: &SensorUpdate,
    ) -> CommandResult<()> {
        let id = self.registry.resolve(name)?;
        self.registry.get_mut(id)?.apply_sensor_update(update);
        Ok(())
    }

    /// Record a spot-price update and run the thermal-mass optimizer over
    /// every zone. Returns the classification, or `None` when the price was
    /// rejected as invalid.
    pub fn update_energy_price(&mut self, price: f64, now: NaiveDateTime) -> Option<PriceAction> {
        if !self.prices.record(price, now) {
            tracing::warn!(price, "invalid price update rejected");
            return None;
        }
        let optimizer = self.optimizer;
        let action = optimizer.classify(price);
        for (_, zone) in self.registry.iter_mut() {
            optimizer.apply(action, zone);
        }
        self.events.push(EngineEvent::PriceUpdated { price, action });
        Some(action)
    }

    /// Inject an outdoor reading; compensation and summer shutdown use it.
    pub fn set_outdoor_conditions(&mut self, conditions: OutdoorConditions) {
        self.weather
            .update(conditions, self.config.weather.rolling_window);
    }

    /// Presence update for one zone.
    pub fn update_occupancy(
        &mut self,
        name: &str,
        occupied: bool,
        now: NaiveDateTime,
    ) -> CommandResult<()> {
        let id = self.registry.resolve(name)?;
        if let Some(occ) = self
            .occupancy
            .get_mut(id.index() as usize)
            .and_then(|o| o.as_mut())
        {
            occ.update(occupied, now);
        }
        Ok(())
    }

    /// Household geofencing update. When the one-shot pre-heat fires, every
    /// eco zone jumps to comfort ahead of arrival.
    pub fn update_geofencing(&mut self, update: GeofencingUpdate) {
        if !self.geofencing.update(update, &self.config.geofencing) {
            return;
        }
        tracing::info!(eta = update.eta_minutes, "geofencing pre-heat triggered");
        self.events.push(EngineEvent::PreHeatTriggered {
            eta_minutes: update.eta_minutes,
        });
        let mut changed = Vec::new();
        for (_, zone) in self.registry.iter_mut() {
            if zone.mode != OperatingMode::Eco {
                continue;
            }
            if let Some(from) = zone.set_mode(OperatingMode::Comfort) {
                changed.push(EngineEvent::ModeChanged {
                    zone: zone.name.clone(),
                    from,
                    to: OperatingMode::Comfort,
                    quick_heat: true,
                });
            }
        }
        self.events.extend(changed);
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn zone_status(&self, name: &str) -> CommandResult<ZoneStatus> {
        let id = self.registry.resolve(name)?;
        Ok(ZoneStatus::from(self.registry.get(id)?))
    }

    /// Snapshot of every live zone, in registration order.
    pub fn all_zone_status(&self) -> Vec<ZoneStatus> {
        self.registry
            .iter()
            .map(|(_, zone)| ZoneStatus::from(zone))
            .collect()
    }

    pub fn energy_report(&self, period: ReportPeriod) -> EnergyReport {
        self.account.report(period, self.prices.current())
    }

    pub fn comfort(&self, name: &str) -> CommandResult<ComfortAssessment> {
        let id = self.registry.resolve(name)?;
        Ok(assess(&self.config.comfort, self.registry.get(id)?))
    }

    pub fn maintenance_report(&self) -> MaintenanceReport {
        health_report(
            &self.config.maintenance,
            self.registry.iter().map(|(_, z)| z),
        )
    }

    pub fn outdoor_conditions(&self) -> Option<OutdoorConditions> {
        self.weather.current()
    }

    pub fn summer_shutdown(&self) -> bool {
        self.weather.summer_shutdown()
    }
}

/// One zone's control pass. Runs on a rayon worker; touches only this
/// zone's state and pushes events into the per-zone batch.
#[allow(clippy::too_many_arguments)]
fn control_zone(
    config: &EngineConfig,
    zone: &mut Zone,
    pid: &mut PidController,
    paused: &mut bool,
    inputs: &TargetInputs,
    time: chrono::NaiveTime,
    now: NaiveDateTime,
    events: &mut Vec<EngineEvent>,
) {
    // Open-window detection: a rapid air-temperature drop pauses heating
    // rather than letting the controller fight the draught.
    if config.window_pause.enabled {
        let drop = recent_air_drop(zone, now, config.window_pause.window_min);
        if *paused {
            if !drop.is_some_and(|d| d >= config.window_pause.drop_c / 2.0) {
                *paused = false;
                tracing::info!(zone = %zone.name, "window pause cleared");
            }
        } else if drop.is_some_and(|d| d >= config.window_pause.drop_c) {
            *paused = true;
            tracing::info!(zone = %zone.name, drop = drop.unwrap_or(0.0), "window open, pausing");
            events.push(EngineEvent::WindowOpenPause {
                zone: zone.name.clone(),
            });
        }
        if *paused {
            pid.reset();
            commit(zone, 0.0, now, events);
            return;
        }
    }

    let target = effective_target(zone, time, inputs, &config.target);

    let raw = match pid.compute(target, zone.air_temp, zone.response_time_s, now) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(zone = %zone.name, error = %e, "controller fault, output forced off");
            if zone.fault != Some(FaultCode::SensorFault) {
                zone.fault = Some(FaultCode::SensorFault);
                events.push(EngineEvent::ZoneFault {
                    zone: zone.name.clone(),
                    fault: FaultCode::SensorFault,
                });
            }
            commit(zone, 0.0, now, events);
            return;
        }
    };
    if zone.fault == Some(FaultCode::SensorFault) {
        zone.fault = None;
    }

    let outcome = config.limiter.clamp(zone, raw);
    for action in &outcome.actions {
        match action {
            // Alert only when the clamp actually interrupts active heating,
            // not on every tick the condition persists.
            LimiterAction::FloorLimit if zone.heating_active => {
                events.push(EngineEvent::FloorTempLimit {
                    zone: zone.name.clone(),
                    floor_temp: zone.floor_temp,
                });
            }
            LimiterAction::Moisture if zone.heating_active => {
                events.push(EngineEvent::MoistureAlert {
                    zone: zone.name.clone(),
                });
            }
            LimiterAction::RateLimited | LimiterAction::Derated => {
                tracing::debug!(zone = %zone.name, ?action, "output limited");
            }
            _ => {}
        }
    }

    commit(zone, outcome.output, now, events);
}

fn commit(zone: &mut Zone, output: f64, now: NaiveDateTime, events: &mut Vec<EngineEvent>) {
    let (was, is) = zone.commit_output(output, now);
    if !was && is {
        events.push(EngineEvent::HeatingStarted {
            zone: zone.name.clone(),
        });
    } else if was && !is {
        events.push(EngineEvent::HeatingStopped {
            zone: zone.name.clone(),
        });
    }
}

/// Air-temperature drop since the most recent history sample at least
/// `window_min` minutes old. `None` until the history reaches back that far.
fn recent_air_drop(zone: &Zone, now: NaiveDateTime, window_min: i64) -> Option<f64> {
    let cutoff = now - Duration::minutes(window_min);
    let mut reference = None;
    for sample in zone.history.iter() {
        if sample.timestamp <= cutoff {
            reference = Some(sample.air_temp);
        } else {
            break;
        }
    }
    reference.map(|earlier| earlier - zone.air_temp)
}
