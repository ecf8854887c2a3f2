//! Energy savings, payback and CO2 accounting for lamp replacement.
//!
//! Straight-line model: the wattage delta runs for `hours_per_day` every day
//! of the year at a flat tariff. No discounting, no lamp lifetime.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{guard, round_to, EngineError};

/// Grid emission factor (kg CO2 per kWh).
pub const CO2_KG_PER_KWH: f64 = 0.385;

pub const DEFAULT_HOURS_PER_DAY: f64 = 5.0;

pub const DEFAULT_KWH_COST_USD: f64 = 0.17;

/// Horizon of the cumulative cost timeline (three years).
pub const DEFAULT_TIMELINE_MONTHS: u32 = 36;

const DAYS_PER_YEAR: f64 = 365.0;
const DAYS_PER_MONTH: f64 = 30.0;

/// Inputs for a lamp replacement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrofitParams {
    /// Wattage of the installed lamp
    pub old_watts: f64,

    /// Wattage of the replacement lamp
    pub new_watts: f64,

    /// Price of ONE replacement lamp
    #[serde(default)]
    pub new_bulb_price: f64,

    #[serde(default = "default_hours")]
    pub hours_per_day: f64,

    #[serde(default = "default_tariff")]
    pub kwh_cost_usd: f64,

    /// Number of lamps replaced
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_hours() -> f64 {
    DEFAULT_HOURS_PER_DAY
}

fn default_tariff() -> f64 {
    DEFAULT_KWH_COST_USD
}

fn default_count() -> u32 {
    1
}

impl RetrofitParams {
    /// Replace one lamp at no cost with default usage and tariff.
    pub fn new(old_watts: f64, new_watts: f64) -> Self {
        Self {
            old_watts,
            new_watts,
            new_bulb_price: 0.0,
            hours_per_day: DEFAULT_HOURS_PER_DAY,
            kwh_cost_usd: DEFAULT_KWH_COST_USD,
            count: 1,
        }
    }

    pub fn with_price(mut self, new_bulb_price: f64) -> Self {
        self.new_bulb_price = new_bulb_price;
        self
    }

    pub fn with_hours(mut self, hours_per_day: f64) -> Self {
        self.hours_per_day = hours_per_day;
        self
    }

    pub fn with_tariff(mut self, kwh_cost_usd: f64) -> Self {
        self.kwh_cost_usd = kwh_cost_usd;
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    /// Validate every field.
    ///
    /// `new_watts > old_watts` is allowed; it simply produces negative savings.
    pub fn validate(&self) -> Result<(), EngineError> {
        guard::non_negative("old_watts", self.old_watts)?;
        guard::non_negative("new_watts", self.new_watts)?;
        guard::non_negative("new_bulb_price", self.new_bulb_price)?;
        guard::in_range("hours_per_day", self.hours_per_day, 0.0, 24.0)?;
        guard::non_negative("kwh_cost_usd", self.kwh_cost_usd)?;
        if self.count == 0 {
            return Err(EngineError::invalid("count", "must be at least 1"));
        }
        Ok(())
    }

    fn total_investment(&self) -> f64 {
        self.new_bulb_price * f64::from(self.count)
    }

    /// Energy (kWh) drawn by `count` lamps of `watts` over `days`.
    fn energy_kwh(&self, watts: f64, days: f64) -> f64 {
        watts * self.hours_per_day * days / 1000.0 * f64::from(self.count)
    }
}

/// When (if ever) the upfront spend is recovered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Payback {
    /// Recovered after this many months (rounded to 0.1)
    Months { months: f64 },

    /// Nothing was spent, so there is nothing to recover
    NoInvestmentNeeded,

    /// Savings are zero or negative; the spend is never recovered
    NeverRecovers,
}

impl Payback {
    pub fn months(&self) -> Option<f64> {
        match self {
            Self::Months { months } => Some(*months),
            _ => None,
        }
    }
}

/// Annual savings and payback for a retrofit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoiResult {
    pub annual_savings_usd: f64,
    pub payback: Payback,
    pub kwh_saved_year: f64,
    pub co2_reduction_kg: f64,
    pub lamp_count: u32,
    pub total_investment: f64,
    pub message: String,
}

impl RoiResult {
    pub fn payback_period_months(&self) -> Option<f64> {
        self.payback.months()
    }
}

/// Annual savings, CO2 reduction and payback for replacing `count` lamps.
pub fn roi_and_savings(params: &RetrofitParams) -> Result<RoiResult, EngineError> {
    params.validate()?;

    debug!(
        old_watts = params.old_watts,
        new_watts = params.new_watts,
        count = params.count,
        "calculating ROI"
    );

    let kwh_saved_daily_per_bulb =
        (params.old_watts - params.new_watts) * params.hours_per_day / 1000.0;
    let kwh_saved_year = kwh_saved_daily_per_bulb * DAYS_PER_YEAR * f64::from(params.count);

    let annual_savings = kwh_saved_year * params.kwh_cost_usd;
    let total_investment = params.total_investment();
    let co2_saved = kwh_saved_year * CO2_KG_PER_KWH;

    let payback = if total_investment <= 0.0 {
        Payback::NoInvestmentNeeded
    } else if annual_savings <= 0.0 {
        Payback::NeverRecovers
    } else {
        Payback::Months {
            months: round_to(total_investment / annual_savings * 12.0, 1),
        }
    };

    let annual_savings_usd = round_to(annual_savings, 2);
    let co2_reduction_kg = round_to(co2_saved, 1);

    debug!(annual_savings_usd, ?payback, "ROI calculated");

    Ok(RoiResult {
        annual_savings_usd,
        payback,
        kwh_saved_year: round_to(kwh_saved_year, 1),
        co2_reduction_kg,
        lamp_count: params.count,
        total_investment: round_to(total_investment, 2),
        message: format!(
            "Replacing {} bulbs saves ${} per year and reduces CO2 by {}kg.",
            params.count, annual_savings_usd, co2_reduction_kg
        ),
    })
}

/// Cumulative spend at the end of a month.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CostPoint {
    pub month: u32,

    /// Running energy cost of keeping the installed lamps
    pub legacy_cost: f64,

    /// Purchase price plus running energy cost of the replacements
    pub upgrade_cost: f64,
}

/// Month-by-month comparison of keeping versus replacing lamps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostTimeline {
    pub points: Vec<CostPoint>,

    /// First month at which the upgrade is strictly cheaper, if within the horizon
    pub payback_month: Option<u32>,
}

/// Cumulative cost curves over `months` (30-day months), starting at month 0.
pub fn cost_timeline(params: &RetrofitParams, months: u32) -> Result<CostTimeline, EngineError> {
    params.validate()?;

    let legacy_monthly = params.energy_kwh(params.old_watts, DAYS_PER_MONTH) * params.kwh_cost_usd;
    let upgrade_monthly = params.energy_kwh(params.new_watts, DAYS_PER_MONTH) * params.kwh_cost_usd;
    let investment = params.total_investment();

    let points: Vec<CostPoint> = (0..=months)
        .map(|month| {
            let m = f64::from(month);
            CostPoint {
                month,
                legacy_cost: m * legacy_monthly,
                upgrade_cost: investment + m * upgrade_monthly,
            }
        })
        .collect();

    let payback_month = points
        .iter()
        .find(|p| p.upgrade_cost < p.legacy_cost)
        .map(|p| p.month);

    debug!(months, ?payback_month, "cost timeline built");

    Ok(CostTimeline {
        points,
        payback_month,
    })
}

/// Annual energy before and after a retrofit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ConsumptionComparison {
    pub before_kwh_year: f64,
    pub after_kwh_year: f64,
    pub saved_kwh_year: f64,
}

pub fn consumption_comparison(params: &RetrofitParams) -> Result<ConsumptionComparison, EngineError> {
    params.validate()?;

    let before = params.energy_kwh(params.old_watts, DAYS_PER_YEAR);
    let after = params.energy_kwh(params.new_watts, DAYS_PER_YEAR);

    Ok(ConsumptionComparison {
        before_kwh_year: round_to(before, 1),
        after_kwh_year: round_to(after, 1),
        saved_kwh_year: round_to(before - after, 1),
    })
}
