use crate::currency::{floor_cents, round_cents};
use crate::frequency::Frequency;
use chrono::NaiveDate;
use log::{debug, trace};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The inputs of a schedule computation, assembled by the sale form on every
/// recomputation. The request owns no state; calling [`generate_schedule`]
/// twice with equal requests yields equal schedules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub principal: Decimal,
    /// Ignored (treated as 0) unless `apply_interest` is set.
    pub annual_rate_percent: Decimal,
    pub frequency: Frequency,
    pub period_count: u32,
    pub first_due_date: NaiveDate,
    pub amortization_model: AmortizationModel,
    pub apply_interest: bool,
}

/// How payments split between principal and interest over the life of the
/// schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AmortizationModel {
    /// Level payment; interest falls and principal grows period by period.
    French,
    /// Level principal; the payment shrinks as the balance declines.
    German,
    /// Level principal plus level interest charged on the original principal.
    Japanese,
}

/// Collection status of a generated installment. Schedules are born pending;
/// payment tracking belongs to the sales backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InstallmentStatus {
    #[serde(rename = "PENDIENTE")]
    Pending,
}

/// One period of a generated schedule.
///
/// Serializes under the field names the sales-creation endpoint consumes, so
/// a schedule can be embedded in the outbound sale payload as-is. All money
/// fields are pre-rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Installment {
    #[serde(rename = "numeroCuota")]
    pub index: u32,
    #[serde(rename = "fechaVencimiento")]
    pub due_date: NaiveDate,
    #[serde(rename = "monto")]
    pub total_payment: Decimal,
    #[serde(rename = "montoCapital")]
    pub principal_portion: Decimal,
    #[serde(rename = "montoInteres")]
    pub interest_portion: Decimal,
    #[serde(rename = "saldoCapitalAnterior")]
    pub balance_before: Decimal,
    #[serde(rename = "saldoCapitalPosterior")]
    pub balance_posterior: Decimal,
    #[serde(rename = "estado")]
    pub status: InstallmentStatus,
    #[serde(rename = "montoPagado")]
    pub amount_paid: Decimal,
}

#[derive(Error, Debug, Eq, PartialEq)]
pub enum ScheduleError {
    #[error("the principal cannot be negative")]
    NegativePrincipal,
    #[error("a schedule needs at least one period")]
    NoPeriods,
    #[error("the annual rate must lie between 0 and 100")]
    RateOutOfRange,
    #[error("the initial payment cannot be negative")]
    NegativeInitialPayment,
    #[error("the initial payment exceeds the sale price")]
    InitialPaymentExceedsPrice,
    #[error("a due date falls outside the supported calendar range")]
    DateOutOfRange,
}

/// The amount left to finance once the initial payment comes off the sale
/// price.
pub fn financed_principal(
    sale_price: Decimal,
    initial_payment: Decimal,
) -> Result<Decimal, ScheduleError> {
    if sale_price < Decimal::ZERO {
        return Err(ScheduleError::NegativePrincipal);
    }
    if initial_payment < Decimal::ZERO {
        return Err(ScheduleError::NegativeInitialPayment);
    }
    if initial_payment > sale_price {
        return Err(ScheduleError::InitialPaymentExceedsPrice);
    }

    Ok(round_cents(sale_price - initial_payment))
}

/// Builds the full installment schedule for a financed sale.
///
/// One period loop serves all three models; a model only decides how a single
/// period splits into interest and principal. The final period always pays
/// exactly the remaining balance, which absorbs the residual cents of the
/// level amounts and lands the closing balance on zero, so the principal
/// portions sum to the principal to the cent.
pub fn generate_schedule(req: &ScheduleRequest) -> Result<Vec<Installment>, ScheduleError> {
    if req.principal < Decimal::ZERO {
        return Err(ScheduleError::NegativePrincipal);
    }
    if req.period_count == 0 {
        return Err(ScheduleError::NoPeriods);
    }

    let rate = req.period_rate()?;
    let principal = round_cents(req.principal);
    let terms = req
        .amortization_model
        .level_terms(principal, rate, req.period_count);

    debug!(
        "generating {:?} schedule: principal {}, {} periods at {} per period",
        req.amortization_model, principal, req.period_count, rate
    );

    let mut schedule = Vec::with_capacity(req.period_count as usize);
    let mut balance = principal;

    for index in 1..=req.period_count {
        let balance_before = balance;
        let (interest, split_principal) =
            req.amortization_model
                .period_split(balance, rate, &terms);

        // The final period collects whatever the running balance still
        // holds; earlier periods never pay down more than remains.
        let principal_portion = if index == req.period_count {
            balance
        } else {
            split_principal.min(balance)
        };

        let due_date = req
            .frequency
            .due_date(req.first_due_date, index)
            .ok_or(ScheduleError::DateOutOfRange)?;

        balance -= principal_portion;

        trace!(
            "period {}: due {}, interest {}, principal {}, balance {} -> {}",
            index,
            due_date,
            interest,
            principal_portion,
            balance_before,
            balance
        );

        schedule.push(Installment {
            index,
            due_date,
            total_payment: principal_portion + interest,
            principal_portion,
            interest_portion: interest,
            balance_before,
            balance_posterior: balance,
            status: InstallmentStatus::Pending,
            amount_paid: Decimal::new(0, 2),
        });
    }

    Ok(schedule)
}

impl ScheduleRequest {
    // Per-period rate, zero for an interest-free sale.
    fn period_rate(&self) -> Result<Decimal, ScheduleError> {
        if !self.apply_interest {
            return Ok(Decimal::ZERO);
        }
        if self.annual_rate_percent < Decimal::ZERO
            || self.annual_rate_percent > Decimal::from(100)
        {
            return Err(ScheduleError::RateOutOfRange);
        }

        Ok(self.annual_rate_percent
            / Decimal::from(self.frequency.periods_per_year())
            / Decimal::from(100))
    }
}

// The per-period amounts that stay level across a schedule. Which field a
// model reads is its own business; the others stay zero.
struct LevelTerms {
    payment: Decimal,
    principal: Decimal,
    interest: Decimal,
}

impl AmortizationModel {
    fn level_terms(&self, principal: Decimal, rate: Decimal, periods: u32) -> LevelTerms {
        let level_principal = floor_cents(principal / Decimal::from(periods));
        match *self {
            AmortizationModel::French => LevelTerms {
                payment: if rate.is_zero() {
                    level_principal
                } else {
                    round_cents(french_payment(principal, rate, periods))
                },
                principal: level_principal,
                interest: Decimal::ZERO,
            },
            AmortizationModel::German => LevelTerms {
                payment: Decimal::ZERO,
                principal: level_principal,
                interest: Decimal::ZERO,
            },
            AmortizationModel::Japanese => LevelTerms {
                payment: Decimal::ZERO,
                principal: level_principal,
                // Charged on the original principal, not the running balance.
                interest: round_cents(principal * rate),
            },
        }
    }

    // Splits one period into (interest, principal) given the running balance.
    fn period_split(&self, balance: Decimal, rate: Decimal, terms: &LevelTerms) -> (Decimal, Decimal) {
        match *self {
            AmortizationModel::French => {
                let interest = round_cents(balance * rate);
                (interest, terms.payment - interest)
            }
            AmortizationModel::German => (round_cents(balance * rate), terms.principal),
            AmortizationModel::Japanese => (terms.interest, terms.principal),
        }
    }
}

// Level payment for a principal amortized over `periods` at `rate` per
// period: P * r(1+r)^n / ((1+r)^n - 1). Callers guarantee rate > 0.
fn french_payment(principal: Decimal, rate: Decimal, periods: u32) -> Decimal {
    let compound = compound_factor(rate, periods);
    principal * rate * compound / (compound - Decimal::ONE)
}

// (1+r)^n by repeated multiplication.
fn compound_factor(rate: Decimal, periods: u32) -> Decimal {
    let base = Decimal::ONE + rate;
    let mut factor = Decimal::ONE;
    for _ in 0..periods {
        factor *= base;
    }
    factor
}
