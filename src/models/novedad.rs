//! Novedad (payroll variance) records.
//!
//! A novedad is anything that makes one period's pay differ from the plain
//! monthly salary: overtime, commissions, bonuses, leave, incapacity or a
//! voluntary deduction authorised by the worker.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The kinds of overtime and surcharge hours recognised by CST art. 168-179.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OvertimeKind {
    /// Hora extra diurna.
    DaytimeOvertime,
    /// Hora extra nocturna.
    NightOvertime,
    /// Recargo nocturno on ordinary hours.
    NightSurcharge,
    /// Recargo dominical o festivo on ordinary hours.
    SundayHolidaySurcharge,
    /// Hora extra diurna dominical o festiva.
    SundayDaytimeOvertime,
    /// Hora extra nocturna dominical o festiva.
    SundayNightOvertime,
    /// Recargo nocturno dominical o festivo.
    SundayNightSurcharge,
}

impl OvertimeKind {
    /// All kinds, in the order they appear on a payslip.
    pub const ALL: [OvertimeKind; 7] = [
        OvertimeKind::DaytimeOvertime,
        OvertimeKind::NightOvertime,
        OvertimeKind::NightSurcharge,
        OvertimeKind::SundayHolidaySurcharge,
        OvertimeKind::SundayDaytimeOvertime,
        OvertimeKind::SundayNightOvertime,
        OvertimeKind::SundayNightSurcharge,
    ];

    /// The snake_case code used in configuration keys and pay line details.
    pub fn code(self) -> &'static str {
        match self {
            OvertimeKind::DaytimeOvertime => "daytime_overtime",
            OvertimeKind::NightOvertime => "night_overtime",
            OvertimeKind::NightSurcharge => "night_surcharge",
            OvertimeKind::SundayHolidaySurcharge => "sunday_holiday_surcharge",
            OvertimeKind::SundayDaytimeOvertime => "sunday_daytime_overtime",
            OvertimeKind::SundayNightOvertime => "sunday_night_overtime",
            OvertimeKind::SundayNightSurcharge => "sunday_night_surcharge",
        }
    }

    /// Parses a snake_case code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    /// Returns true for extra hours; false for surcharges on ordinary hours.
    ///
    /// Only extra hours count towards the weekly overtime limit.
    pub fn is_extra_hours(self) -> bool {
        matches!(
            self,
            OvertimeKind::DaytimeOvertime
                | OvertimeKind::NightOvertime
                | OvertimeKind::SundayDaytimeOvertime
                | OvertimeKind::SundayNightOvertime
        )
    }

    /// The CST article that defines this kind.
    pub fn legal_ref(self) -> &'static str {
        match self {
            OvertimeKind::DaytimeOvertime => "CST art. 168 num. 3",
            OvertimeKind::NightOvertime => "CST art. 168 num. 4",
            OvertimeKind::NightSurcharge => "CST art. 168 num. 1",
            OvertimeKind::SundayHolidaySurcharge => "CST art. 179",
            OvertimeKind::SundayDaytimeOvertime
            | OvertimeKind::SundayNightOvertime
            | OvertimeKind::SundayNightSurcharge => "CST art. 179 num. 2",
        }
    }
}

/// What a novedad represents, with its quantities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NovedadKind {
    /// Overtime or surcharge hours.
    Overtime {
        /// Which overtime/surcharge rule applies.
        overtime_kind: OvertimeKind,
        /// Hours worked under that rule.
        hours: Decimal,
    },
    /// A sales commission; always salary.
    Commission {
        /// Amount in pesos.
        amount: Decimal,
    },
    /// A bonus, salary or not depending on what was agreed.
    Bonus {
        /// Amount in pesos.
        amount: Decimal,
        /// Whether the bonus constitutes salary (CST art. 127-128).
        #[serde(default)]
        constitutes_salary: bool,
    },
    /// Unpaid leave (licencia no remunerada).
    UnpaidLeave {
        /// Calendar days of leave.
        days: u32,
    },
    /// General-illness incapacity days.
    Incapacity {
        /// Days of incapacity.
        days: u32,
    },
    /// A deduction the worker authorised (loan, union dues, ...).
    VoluntaryDeduction {
        /// What the deduction is for.
        description: String,
        /// Amount in pesos.
        amount: Decimal,
    },
}

/// A payroll variance recorded against an employee on a date.
///
/// # Example
///
/// ```
/// use nomina_engine::models::{Novedad, NovedadKind, OvertimeKind};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let novedad = Novedad {
///     id: "nov_001".to_string(),
///     employee_id: "emp_001".to_string(),
///     date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
///     kind: NovedadKind::Overtime {
///         overtime_kind: OvertimeKind::DaytimeOvertime,
///         hours: Decimal::new(4, 0),
///     },
/// };
/// assert!(novedad.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Novedad {
    /// Unique identifier for the novedad.
    pub id: String,
    /// The employee the novedad applies to.
    pub employee_id: String,
    /// The date the novedad occurred (decides the payroll period).
    pub date: NaiveDate,
    /// What happened.
    pub kind: NovedadKind,
}

impl Novedad {
    /// Rejects non-positive quantities and empty descriptions.
    pub fn validate(&self) -> EngineResult<()> {
        match &self.kind {
            NovedadKind::Overtime { hours, .. } if *hours <= Decimal::ZERO => {
                Err(self.invalid("overtime hours must be positive"))
            }
            NovedadKind::Commission { amount }
            | NovedadKind::Bonus { amount, .. }
            | NovedadKind::VoluntaryDeduction { amount, .. }
                if *amount <= Decimal::ZERO =>
            {
                Err(self.invalid("amount must be positive"))
            }
            NovedadKind::UnpaidLeave { days } | NovedadKind::Incapacity { days } if *days == 0 => {
                Err(self.invalid("days must be positive"))
            }
            NovedadKind::VoluntaryDeduction { description, .. }
                if description.trim().is_empty() =>
            {
                Err(self.invalid("deduction description is required"))
            }
            _ => Ok(()),
        }
    }

    fn invalid(&self, message: &str) -> EngineError {
        EngineError::InvalidNovedad {
            novedad_id: self.id.clone(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn novedad(kind: NovedadKind) -> Novedad {
        Novedad {
            id: "nov_001".to_string(),
            employee_id: "emp_001".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            kind,
        }
    }

    #[test]
    fn test_deserialize_overtime_novedad() {
        let json = r#"{
            "id": "nov_001",
            "employee_id": "emp_001",
            "date": "2025-03-10",
            "kind": {"type": "overtime", "overtime_kind": "night_overtime", "hours": "3.5"}
        }"#;

        let novedad: Novedad = serde_json::from_str(json).unwrap();
        assert_eq!(
            novedad.kind,
            NovedadKind::Overtime {
                overtime_kind: OvertimeKind::NightOvertime,
                hours: Decimal::new(35, 1),
            }
        );
    }

    #[test]
    fn test_bonus_defaults_to_non_salary() {
        let json = r#"{
            "id": "nov_002",
            "employee_id": "emp_001",
            "date": "2025-03-10",
            "kind": {"type": "bonus", "amount": "300000"}
        }"#;

        let novedad: Novedad = serde_json::from_str(json).unwrap();
        match novedad.kind {
            NovedadKind::Bonus { constitutes_salary, .. } => assert!(!constitutes_salary),
            other => panic!("Expected Bonus, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_hours_overtime_is_invalid() {
        let result = novedad(NovedadKind::Overtime {
            overtime_kind: OvertimeKind::DaytimeOvertime,
            hours: Decimal::ZERO,
        })
        .validate();
        match result {
            Err(EngineError::InvalidNovedad { novedad_id, message }) => {
                assert_eq!(novedad_id, "nov_001");
                assert!(message.contains("hours"));
            }
            other => panic!("Expected InvalidNovedad, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_commission_is_invalid() {
        let result = novedad(NovedadKind::Commission {
            amount: Decimal::new(-1, 0),
        })
        .validate();
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_day_leave_is_invalid() {
        assert!(novedad(NovedadKind::UnpaidLeave { days: 0 }).validate().is_err());
        assert!(novedad(NovedadKind::Incapacity { days: 0 }).validate().is_err());
    }

    #[test]
    fn test_blank_deduction_description_is_invalid() {
        let result = novedad(NovedadKind::VoluntaryDeduction {
            description: "  ".to_string(),
            amount: Decimal::new(50_000, 0),
        })
        .validate();
        assert!(result.is_err());
    }

    #[test]
    fn test_overtime_kind_codes_round_trip() {
        for kind in OvertimeKind::ALL {
            assert_eq!(OvertimeKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(OvertimeKind::from_code("weekend"), None);
    }

    #[test]
    fn test_surcharges_are_not_extra_hours() {
        assert!(OvertimeKind::DaytimeOvertime.is_extra_hours());
        assert!(OvertimeKind::SundayNightOvertime.is_extra_hours());
        assert!(!OvertimeKind::NightSurcharge.is_extra_hours());
        assert!(!OvertimeKind::SundayHolidaySurcharge.is_extra_hours());
    }
}
