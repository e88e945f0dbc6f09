use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::balance::PersonalBalance;
use crate::schemas::UserNick;

/// Residues at or below this are division noise, not debts.
pub const EPSILON: Decimal = dec!(0.01);

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Settlement {
    pub from: UserNick,
    pub to: UserNick,
    pub amount: Decimal,
}

/// Turns net balances into a list of payments that zeroes them.
///
/// Greedy largest-to-largest matching: the biggest creditor is paid by the
/// biggest debtor until one side is exhausted, then the cursor moves on.
/// This keeps the number of transfers small for a handful of people but is
/// not guaranteed to be the minimum.
///
/// Sorting is stable, so members with equal balances are matched in the
/// order they appear in `balances` (roster order).
pub fn compute_settlements(balances: &[PersonalBalance]) -> Vec<Settlement> {
    let mut creditors: Vec<PersonalBalance> = balances
        .iter()
        .filter(|person| person.balance > Decimal::ZERO)
        .cloned()
        .collect();
    let mut debtors: Vec<PersonalBalance> = balances
        .iter()
        .filter(|person| person.balance < Decimal::ZERO)
        .cloned()
        .collect();

    creditors.sort_by(|a, b| b.balance.cmp(&a.balance));
    debtors.sort_by(|a, b| a.balance.cmp(&b.balance));

    let mut settlements = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < creditors.len() && j < debtors.len() {
        let creditor = &mut creditors[i];
        let debtor = &mut debtors[j];

        let amount = creditor.balance.min(debtor.balance.abs());
        if amount > EPSILON {
            settlements.push(Settlement {
                from: debtor.id.clone(),
                to: creditor.id.clone(),
                amount,
            });
        }

        creditor.balance -= amount;
        debtor.balance += amount;

        if creditor.balance < EPSILON {
            i += 1;
        }
        if debtor.balance.abs() < EPSILON {
            j += 1;
        }
    }
    settlements
}
