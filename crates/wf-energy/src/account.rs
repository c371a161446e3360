//! Consumption accounting with calendar-bucket rollover.
//!
//! Integration is driven by the periodic energy logging tick: the interval
//! since the previous tick is charged to every zone that is currently
//! heating. Day, week and month buckets roll over when the tick's timestamp
//! crosses the bucket boundary; the completed bucket is archived unchanged.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use wf_zone::Zone;

use crate::report::{EnergyReport, ReportPeriod};

/// Accumulated kWh and cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub kwh: f64,
    pub cost: f64,
}

impl Totals {
    fn add(&mut self, kwh: f64, cost: f64) {
        self.kwh += kwh;
        self.cost += cost;
    }
}

/// Result of one logging tick, for engine-level tracing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LogSummary {
    pub interval_hours: f64,
    pub kwh: f64,
    pub cost: f64,
    pub day_rolled: bool,
    pub week_rolled: bool,
    pub month_rolled: bool,
}

/// Process-wide energy accounting state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnergyAccount {
    day_key: Option<NaiveDate>,
    day: Totals,
    week_key: Option<(i32, u32)>,
    week: Totals,
    month_key: Option<(i32, u32)>,
    month: Totals,
    lifetime: Totals,

    /// Most recently completed buckets, archived at rollover.
    archived_day: Option<(NaiveDate, Totals)>,
    archived_week: Option<((i32, u32), Totals)>,
    archived_month: Option<((i32, u32), Totals)>,

    /// Heating-degree-day accumulator (base 17 °C), lifetime.
    hdd: f64,
    hdd_base_c: f64,

    last_log: Option<NaiveDateTime>,
}

fn week_key(date: NaiveDate) -> (i32, u32) {
    let iso = date.iso_week();
    (iso.year(), iso.week())
}

fn month_key(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

impl EnergyAccount {
    pub fn new() -> Self {
        Self {
            hdd_base_c: 17.0,
            ..Self::default()
        }
    }

    pub fn heating_degree_days(&self) -> f64 {
        self.hdd
    }

    /// One energy logging tick.
    ///
    /// `price` is the current spot price (cost stays zero without one);
    /// `outdoor_temp` feeds the heating-degree-day counter. Zones currently
    /// heating are charged `power/1000 × interval` kWh; their today counters
    /// reset when the day bucket rolls.
    pub fn log_tick<'a>(
        &mut self,
        now: NaiveDateTime,
        price: Option<f64>,
        outdoor_temp: Option<f64>,
        zones: impl Iterator<Item = &'a mut Zone>,
    ) -> LogSummary {
        let mut summary = LogSummary::default();

        let Some(prev) = self.last_log else {
            // First tick just anchors the clock and the bucket keys.
            self.last_log = Some(now);
            self.day_key = Some(now.date());
            self.week_key = Some(week_key(now.date()));
            self.month_key = Some(month_key(now.date()));
            return summary;
        };

        let interval_hours = ((now - prev).num_seconds().max(0)) as f64 / 3600.0;
        self.last_log = Some(now);
        summary.interval_hours = interval_hours;

        self.roll_buckets(now.date(), &mut summary);

        let price_per_kwh = price.unwrap_or(0.0);
        for zone in zones {
            if summary.day_rolled {
                zone.energy_today_kwh = 0.0;
                zone.cost_today = 0.0;
            }
            if !zone.heating_active {
                continue;
            }
            let kwh = zone.power_w / 1000.0 * interval_hours;
            let cost = kwh * price_per_kwh;
            zone.energy_today_kwh += kwh;
            zone.cost_today += cost;
            zone.energy_lifetime_kwh += kwh;
            zone.cost_lifetime += cost;
            summary.kwh += kwh;
            summary.cost += cost;
        }

        self.day.add(summary.kwh, summary.cost);
        self.week.add(summary.kwh, summary.cost);
        self.month.add(summary.kwh, summary.cost);
        self.lifetime.add(summary.kwh, summary.cost);

        if let Some(outdoor) = outdoor_temp {
            let deficit = (self.hdd_base_c - outdoor).max(0.0);
            self.hdd += deficit * interval_hours / 24.0;
        }

        if summary.day_rolled {
            tracing::info!(
                kwh = self.archived_day.map(|(_, t)| t.kwh),
                "daily energy bucket archived"
            );
        }

        summary
    }

    fn roll_buckets(&mut self, today: NaiveDate, summary: &mut LogSummary) {
        if let Some(prev_day) = self.day_key {
            if prev_day != today {
                self.archived_day = Some((prev_day, self.day));
                self.day = Totals::default();
                summary.day_rolled = true;
            }
        }
        self.day_key = Some(today);

        let wk = week_key(today);
        if let Some(prev_week) = self.week_key {
            if prev_week != wk {
                self.archived_week = Some((prev_week, self.week));
                self.week = Totals::default();
                summary.week_rolled = true;
            }
        }
        self.week_key = Some(wk);

        let mk = month_key(today);
        if let Some(prev_month) = self.month_key {
            if prev_month != mk {
                self.archived_month = Some((prev_month, self.month));
                self.month = Totals::default();
                summary.month_rolled = true;
            }
        }
        self.month_key = Some(mk);
    }

    /// Report totals for a period. Day/week/month report the running bucket.
    pub fn report(&self, period: ReportPeriod, current_price: Option<f64>) -> EnergyReport {
        let totals = match period {
            ReportPeriod::Day => self.day,
            ReportPeriod::Week => self.week,
            ReportPeriod::Month => self.month,
            ReportPeriod::Lifetime => self.lifetime,
        };
        EnergyReport {
            period,
            kwh: totals.kwh,
            cost: totals.cost,
            current_price,
            heating_degree_days: self.hdd,
        }
    }

    /// The most recently completed day bucket, if any day has rolled yet.
    pub fn archived_day(&self) -> Option<(NaiveDate, Totals)> {
        self.archived_day
    }

    pub fn archived_week(&self) -> Option<((i32, u32), Totals)> {
        self.archived_week
    }

    pub fn archived_month(&self) -> Option<((i32, u32), Totals)> {
        self.archived_month
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wf_zone::{FloorMaterial, HeatingTech, ZoneSpec};

    fn zone(power_w: f64) -> Zone {
        let mut z = Zone::new(ZoneSpec {
            name: "z".to_string(),
            tech: HeatingTech::Electric,
            material: FloorMaterial::Tile,
            comfort_temp: 22.0,
            eco_temp: 18.0,
            frost_temp: 7.0,
            max_floor_temp: None,
            area_m2: 12.0,
            power_w,
            thermal_mass: 0.8,
            response_time_s: 1800.0,
        })
        .unwrap();
        z.heating_active = true;
        z
    }

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn first_tick_only_anchors() {
        let mut account = EnergyAccount::new();
        let mut z = zone(1000.0);
        let summary = account.log_tick(at(5, 12, 0), Some(1.0), None, [&mut z].into_iter());
        assert_eq!(summary.kwh, 0.0);
        assert_eq!(z.energy_today_kwh, 0.0);
    }

    #[test]
    fn integrates_power_over_interval() {
        let mut account = EnergyAccount::new();
        let mut z = zone(1000.0);
        account.log_tick(at(5, 12, 0), Some(1.5), None, [&mut z].into_iter());
        let summary = account.log_tick(at(5, 13, 0), Some(1.5), None, [&mut z].into_iter());
        // 1 kW for 1 h = 1 kWh at 1.5/kWh
        assert!((summary.kwh - 1.0).abs() < 1e-9);
        assert!((summary.cost - 1.5).abs() < 1e-9);
        assert!((z.energy_today_kwh - 1.0).abs() < 1e-9);
        assert!((z.energy_lifetime_kwh - 1.0).abs() < 1e-9);
        assert!((account.report(ReportPeriod::Day, None).kwh - 1.0).abs() < 1e-9);
    }

    #[test]
    fn idle_zones_cost_nothing() {
        let mut account = EnergyAccount::new();
        let mut z = zone(1000.0);
        z.heating_active = false;
        account.log_tick(at(5, 12, 0), Some(1.0), None, [&mut z].into_iter());
        let summary = account.log_tick(at(5, 13, 0), Some(1.0), None, [&mut z].into_iter());
        assert_eq!(summary.kwh, 0.0);
        assert_eq!(z.energy_lifetime_kwh, 0.0);
    }

    #[test]
    fn day_boundary_archives_and_resets() {
        let mut account = EnergyAccount::new();
        let mut z = zone(2000.0);
        account.log_tick(at(5, 23, 0), Some(1.0), None, [&mut z].into_iter());
        account.log_tick(at(5, 23, 30), Some(1.0), None, [&mut z].into_iter());
        let day_kwh = account.report(ReportPeriod::Day, None).kwh;
        assert!(day_kwh > 0.0);

        // Tick straddling midnight: previous bucket archived unchanged, the
        // straddling interval lands in the fresh bucket.
        let summary = account.log_tick(at(6, 0, 30), Some(1.0), None, [&mut z].into_iter());
        assert!(summary.day_rolled);
        let (date, archived) = account.archived_day().unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        assert!((archived.kwh - day_kwh).abs() < 1e-9);
        assert!((account.report(ReportPeriod::Day, None).kwh - summary.kwh).abs() < 1e-9);
        // zone's today counter restarted with the straddling interval only
        assert!((z.energy_today_kwh - summary.kwh).abs() < 1e-9);
        // lifetime is untouched by rollover
        assert!((z.energy_lifetime_kwh - (day_kwh + summary.kwh)).abs() < 1e-9);
    }

    #[test]
    fn week_and_month_roll_on_their_boundaries() {
        let mut account = EnergyAccount::new();
        let mut z = zone(1000.0);
        // Sunday 2026-01-04 -> Monday 2026-01-05 is an ISO week boundary
        account.log_tick(at(4, 23, 0), Some(1.0), None, [&mut z].into_iter());
        let summary = account.log_tick(at(5, 1, 0), Some(1.0), None, [&mut z].into_iter());
        assert!(summary.day_rolled);
        assert!(summary.week_rolled);
        assert!(!summary.month_rolled);

        // End of January -> February rolls the month
        let mut account = EnergyAccount::new();
        account.log_tick(at(31, 23, 0), Some(1.0), None, [&mut z].into_iter());
        let summary = account.log_tick(
            NaiveDate::from_ymd_opt(2026, 2, 1)
                .unwrap()
                .and_hms_opt(1, 0, 0)
                .unwrap(),
            Some(1.0),
            None,
            [&mut z].into_iter(),
        );
        assert!(summary.month_rolled);
    }

    #[test]
    fn heating_degree_days_accumulate_below_base() {
        let mut account = EnergyAccount::new();
        let mut z = zone(1000.0);
        z.heating_active = false;
        account.log_tick(at(5, 0, 0), None, Some(5.0), [&mut z].into_iter());
        // 24 h at 5 °C outdoor against the 17 °C base: 12 degree-days
        account.log_tick(at(6, 0, 0), None, Some(5.0), [&mut z].into_iter());
        assert!((account.heating_degree_days() - 12.0).abs() < 1e-9);

        // warm outdoor adds nothing
        account.log_tick(at(7, 0, 0), None, Some(20.0), [&mut z].into_iter());
        assert!((account.heating_degree_days() - 12.0).abs() < 1e-9);
    }
}
