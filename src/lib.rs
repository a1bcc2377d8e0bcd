mod codes;
mod currency;
mod custom;
mod frequency;
mod schedule;

pub use codes::{detect_holes, Holes};
pub use currency::{
    amount_from_percent, floor_cents, percent_from_amount, round_cents, to_cents, CurrencyError,
};
pub use custom::{allocate_interest, AllocationError, CustomEntry};
pub use frequency::Frequency;
pub use schedule::{
    financed_principal, generate_schedule, AmortizationModel, Installment, InstallmentStatus,
    ScheduleError, ScheduleRequest,
};

// The number of decimal places the handled currencies can express. Both
// currencies sales are priced in (PEN and USD) use two.
// @todo support the full ISO 4217 range of currency precisions
const CURRENCY_PRECISION: u32 = 2;
