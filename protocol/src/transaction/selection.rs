//! Unspent-output selection.
//!
//! Two policies, both deterministic for a given input order:
//!
//! - **Spend-all** ([`select_all`]) takes every non-coinbase output in the
//!   order given. Used by the message, self-stash and handshake paths.
//! - **Minimal coverage** ([`select_for_payment`]) sorts by amount descending
//!   and accumulates until amount plus fee is covered.
//!
//! Whether a given total covers an amount is decided by [`decide`], a small
//! state machine over [`SelectionState`]. A change output is only emitted if
//! it exceeds the dust threshold. Otherwise the no-change variant is sized
//! and the would-be change is folded into the fee.

use tracing::debug;

use crate::error::{EngineError, Result};

use super::amount::{checked_add, checked_sum};
use super::types::UnspentOutput;

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Where a selection stands after considering some set of inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    /// Not enough yet. `required` is amount plus the no-change fee.
    Accumulating { total: u64, required: u64 },
    /// Covered with a change output above the dust threshold.
    FeasibleWithChange { total: u64, fee: u64, change: u64 },
    /// Covered without change. `fee` absorbs everything above the amount.
    FeasibleNoChange { total: u64, fee: u64 },
    /// Every candidate was taken and the amount is still not covered.
    Exhausted { total: u64, required: u64 },
}

impl SelectionState {
    pub fn is_feasible(&self) -> bool {
        matches!(self, Self::FeasibleWithChange { .. } | Self::FeasibleNoChange { .. })
    }

    /// Turns a still-accumulating state into `Exhausted`. Others are unchanged.
    pub fn exhaust(self) -> Self {
        match self {
            Self::Accumulating { total, required } => Self::Exhausted { total, required },
            other => other,
        }
    }
}

/// Decides whether `total` covers `amount`.
///
/// `estimate_fee(with_change)` returns the fee of the candidate transaction
/// with or without a change output. It is called at most twice.
pub fn decide<F>(total: u64, amount: u64, dust_threshold: u64, mut estimate_fee: F) -> Result<SelectionState>
where
    F: FnMut(bool) -> Result<u64>,
{
    let fee_with_change = estimate_fee(true)?;
    if total > amount && total - amount >= fee_with_change {
        let change = total - amount - fee_with_change;
        if change > dust_threshold {
            debug!(total, amount, fee = fee_with_change, change, "covered with change");
            return Ok(SelectionState::FeasibleWithChange { total, fee: fee_with_change, change });
        }
        debug!(total, amount, change, dust_threshold, "change would be dust, trying without");
    }

    let fee_without_change = estimate_fee(false)?;
    let required = checked_add(amount, fee_without_change)?;
    if total >= required {
        let fee = total - amount;
        debug!(total, amount, fee, "covered without change");
        return Ok(SelectionState::FeasibleNoChange { total, fee });
    }

    Ok(SelectionState::Accumulating { total, required })
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Outputs chosen by a spend-all pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpendAll {
    pub utxos: Vec<UnspentOutput>,
    pub total: u64,
}

/// Outputs chosen to cover an amount, with the settled fee and change.
///
/// `total == amount + fee + change` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSelection {
    pub utxos: Vec<UnspentOutput>,
    pub total: u64,
    pub fee: u64,
    /// Zero when no change output is emitted.
    pub change: u64,
}

impl PaymentSelection {
    pub fn has_change(&self) -> bool {
        self.change > 0
    }

    fn from_state(utxos: Vec<UnspentOutput>, state: SelectionState) -> Option<Self> {
        match state {
            SelectionState::FeasibleWithChange { total, fee, change } => Some(Self { utxos, total, fee, change }),
            SelectionState::FeasibleNoChange { total, fee } => Some(Self { utxos, total, fee, change: 0 }),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

fn spendable(utxos: &[UnspentOutput]) -> impl Iterator<Item = &UnspentOutput> {
    utxos.iter().filter(|u| !u.is_coinbase)
}

/// Takes every non-coinbase output, in order. Fails if the total is below
/// `required_minimum`.
pub fn select_all(utxos: &[UnspentOutput], required_minimum: u64) -> Result<SpendAll> {
    let selected: Vec<UnspentOutput> = spendable(utxos).cloned().collect();
    let total = checked_sum(selected.iter().map(|u| u.amount))?;
    if total < required_minimum || selected.is_empty() {
        return Err(EngineError::InsufficientFunds {
            required: required_minimum,
            available: total,
        });
    }
    debug!(inputs = selected.len(), total, "selected all spendable outputs");
    Ok(SpendAll { utxos: selected, total })
}

/// Spends everything and settles `amount` plus fee against the total.
///
/// `estimate_fee(selected, with_change)` sizes the candidate transaction.
pub fn select_all_for_amount<F>(
    utxos: &[UnspentOutput],
    amount: u64,
    dust_threshold: u64,
    mut estimate_fee: F,
) -> Result<PaymentSelection>
where
    F: FnMut(&[UnspentOutput], bool) -> Result<u64>,
{
    let all = select_all(utxos, 1)?;
    let state = decide(all.total, amount, dust_threshold, |with_change| estimate_fee(&all.utxos, with_change))?;
    match state.exhaust() {
        SelectionState::Exhausted { total, required } => Err(EngineError::InsufficientFunds {
            required,
            available: total,
        }),
        state => PaymentSelection::from_state(all.utxos, state).ok_or(EngineError::InsufficientFunds {
            required: amount,
            available: all.total,
        }),
    }
}

/// Largest-first greedy selection covering `amount` plus fee.
///
/// After each added output the fee is re-estimated for the current set; the
/// first feasible state wins. Running out of candidates is `InsufficientFunds`.
pub fn select_for_payment<F>(
    utxos: &[UnspentOutput],
    amount: u64,
    dust_threshold: u64,
    mut estimate_fee: F,
) -> Result<PaymentSelection>
where
    F: FnMut(&[UnspentOutput], bool) -> Result<u64>,
{
    let mut candidates: Vec<&UnspentOutput> = spendable(utxos).collect();
    // Stable, so equal amounts keep their input order.
    candidates.sort_by(|a, b| b.amount.cmp(&a.amount));
    let available = checked_sum(candidates.iter().map(|u| u.amount))?;

    let mut selected: Vec<UnspentOutput> = Vec::new();
    let mut total = 0u64;
    let mut state = SelectionState::Accumulating {
        total: 0,
        required: amount,
    };

    for utxo in candidates {
        total = checked_add(total, utxo.amount)?;
        selected.push(utxo.clone());

        state = decide(total, amount, dust_threshold, |with_change| estimate_fee(&selected, with_change))?;
        if state.is_feasible() {
            break;
        }
    }

    match state.exhaust() {
        SelectionState::Exhausted { required, .. } => {
            debug!(amount, required, available, "selection exhausted");
            Err(EngineError::InsufficientFunds { required, available })
        }
        state => {
            debug!(inputs = selected.len(), ?state, "payment selection settled");
            PaymentSelection::from_state(selected, state).ok_or(EngineError::InsufficientFunds {
                required: amount,
                available,
            })
        }
    }
}
