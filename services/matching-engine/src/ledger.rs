//! Account ledger
//!
//! The only place an account changes. Base and term are quantized to the
//! configured number of decimal places; cost columns keep full precision.

use rust_decimal::Decimal;
use types::account::Account;
use types::execution::Execution;
use types::fee::CommissionRate;
use types::numeric::quantize;

/// Apply one execution to `account`.
///
/// Rejections return the account unchanged. `None` when any column would
/// overflow; the account is then left as it was.
pub fn apply(
    account: &Account,
    execution: &Execution,
    commission: CommissionRate,
    quantum: u32,
) -> Option<Account> {
    if execution.is_rejection() {
        return Some(*account);
    }
    let qty = execution.quantity;
    let traded: Decimal = qty.abs().as_decimal();
    Some(Account {
        base: quantize(account.base.checked_add(qty.as_decimal())?, quantum),
        term: quantize(account.term.checked_add(execution.notional()?)?, quantum),
        commission: account.commission.checked_add(commission.charge(qty)?)?,
        spread: account
            .spread
            .checked_sub(traded.checked_mul(execution.half_spread)?)?,
    })
}
