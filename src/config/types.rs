//! Configuration types for payroll calculation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::OvertimeKind;

/// Metadata about the jurisdiction the parameters belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryMetadata {
    /// ISO country code (e.g., "CO").
    pub code: String,
    /// The human-readable country name.
    pub name: String,
    /// Statutes the parameters implement.
    pub legal_basis: String,
    /// URL to the official legal text.
    pub source_url: String,
}

/// Multipliers applied to the ordinary hourly rate, per overtime kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurchargeRates {
    /// Hora extra diurna (1.25).
    pub daytime_overtime: Decimal,
    /// Hora extra nocturna (1.75).
    pub night_overtime: Decimal,
    /// Recargo nocturno (0.35).
    pub night_surcharge: Decimal,
    /// Recargo dominical o festivo (0.75, rising by law).
    pub sunday_holiday_surcharge: Decimal,
    /// Hora extra diurna dominical (2.00).
    pub sunday_daytime_overtime: Decimal,
    /// Hora extra nocturna dominical (2.50).
    pub sunday_night_overtime: Decimal,
    /// Recargo nocturno dominical (1.10).
    pub sunday_night_surcharge: Decimal,
}

impl SurchargeRates {
    /// Returns the multiplier for an overtime kind.
    pub fn multiplier(&self, kind: OvertimeKind) -> Decimal {
        match kind {
            OvertimeKind::DaytimeOvertime => self.daytime_overtime,
            OvertimeKind::NightOvertime => self.night_overtime,
            OvertimeKind::NightSurcharge => self.night_surcharge,
            OvertimeKind::SundayHolidaySurcharge => self.sunday_holiday_surcharge,
            OvertimeKind::SundayDaytimeOvertime => self.sunday_daytime_overtime,
            OvertimeKind::SundayNightOvertime => self.sunday_night_overtime,
            OvertimeKind::SundayNightSurcharge => self.sunday_night_surcharge,
        }
    }
}

/// A solidarity fund bracket: IBC at or above `from_multiple` × SMMLV pays `rate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolidarityBracket {
    /// Lower bound in minimum wages (inclusive).
    pub from_multiple: Decimal,
    /// Contribution rate on the IBC.
    pub rate: Decimal,
}

/// A row of the ET art. 383 withholding table, in UVT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithholdingBracket {
    /// Lower bound (exclusive) in UVT.
    pub from_uvt: Decimal,
    /// Upper bound (inclusive) in UVT; open-ended when absent.
    #[serde(default)]
    pub to_uvt: Option<Decimal>,
    /// Marginal rate applied above `from_uvt`.
    pub marginal_rate: Decimal,
    /// Fixed UVT added for this bracket.
    pub base_uvt: Decimal,
}

/// Withholding-tax (procedure 1) parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithholdingTable {
    /// Share of the net base exempt as labor income (ET art. 206 num. 10).
    pub exempt_rate: Decimal,
    /// Monthly cap on the exempt amount, in UVT.
    pub exempt_cap_uvt: Decimal,
    /// Brackets ordered by `from_uvt`.
    pub brackets: Vec<WithholdingBracket>,
}

/// Legal parameters in force from `effective_date` until the next set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSet {
    /// The first date these parameters apply to.
    pub effective_date: NaiveDate,
    /// Salario mínimo mensual legal vigente (SMMLV).
    pub minimum_wage: Decimal,
    /// Monthly auxilio de transporte.
    pub transport_allowance: Decimal,
    /// Salaries up to this many SMMLV receive the transport allowance.
    pub transport_allowance_cap_multiple: Decimal,
    /// Unidad de valor tributario.
    pub uvt: Decimal,
    /// Ordinary hours per month; divides the salary into an hourly rate.
    pub monthly_hours: Decimal,
    /// Employee share of health contributions.
    pub health_employee_rate: Decimal,
    /// Employee share of pension contributions.
    pub pension_employee_rate: Decimal,
    /// IBC ceiling in SMMLV.
    pub ibc_cap_multiple: Decimal,
    /// Share of an integral salary that counts towards the IBC.
    pub integral_salary_factor: Decimal,
    /// Minimum integral salary in SMMLV.
    pub integral_salary_min_multiple: Decimal,
    /// Non-salary payments above this share of remuneration join the IBC.
    pub non_salary_cap_rate: Decimal,
    /// Share of the daily salary paid during general-illness incapacity.
    pub incapacity_rate: Decimal,
    /// Annual interest on cesantías.
    pub cesantias_interest_rate: Decimal,
    /// Paid vacation days earned per year of service.
    pub vacation_days_per_year: Decimal,
    /// Extra hours allowed per week.
    pub overtime_weekly_limit_hours: Decimal,
    /// Overtime and surcharge multipliers.
    pub surcharges: SurchargeRates,
    /// Solidarity fund brackets, ascending.
    pub solidarity_fund: Vec<SolidarityBracket>,
    /// Withholding-tax table.
    pub withholding: WithholdingTable,
}

/// The complete configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct PayrollConfig {
    /// Country metadata.
    metadata: CountryMetadata,
    /// Parameter sets by effective date (sorted oldest first).
    parameter_sets: Vec<ParameterSet>,
}

impl PayrollConfig {
    /// Creates a new PayrollConfig from its component parts.
    pub fn new(metadata: CountryMetadata, parameter_sets: Vec<ParameterSet>) -> Self {
        let mut sorted = parameter_sets;
        sorted.sort_by(|a, b| a.effective_date.cmp(&b.effective_date));
        Self {
            metadata,
            parameter_sets: sorted,
        }
    }

    /// Returns the country metadata.
    pub fn metadata(&self) -> &CountryMetadata {
        &self.metadata
    }

    /// Returns all parameter sets, oldest first.
    pub fn parameter_sets(&self) -> &[ParameterSet] {
        &self.parameter_sets
    }

    /// Returns the set in force on `date`, if any.
    pub fn parameters_for(&self, date: NaiveDate) -> Option<&ParameterSet> {
        self.parameter_sets
            .iter()
            .rfind(|p| p.effective_date <= date)
    }

    /// Mutable variant of [`PayrollConfig::parameters_for`].
    pub fn parameters_for_mut(&mut self, date: NaiveDate) -> Option<&mut ParameterSet> {
        self.parameter_sets
            .iter_mut()
            .rfind(|p| p.effective_date <= date)
    }
}
