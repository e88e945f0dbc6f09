use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::SplitError;
use crate::schemas::{Expense, Member, UserNick};

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PersonalBalance {
    pub id: UserNick,
    pub balance: Decimal,
}

/// Net position of every member, in roster order. Positive means the member
/// is owed money, negative means they owe.
///
/// Each expense credits its payer with the full amount and debits every
/// beneficiary an equal share. The whole computation is rejected if any
/// expense breaks its invariants, so a bad record never skews the result.
pub fn compute_balances(
    members: &[Member],
    expenses: &[Expense],
) -> Result<Vec<PersonalBalance>, SplitError> {
    let mut balances: Vec<PersonalBalance> = members
        .iter()
        .map(|member| PersonalBalance {
            id: member.name.clone(),
            balance: Decimal::ZERO,
        })
        .collect();
    let slots: HashMap<&str, usize> = members
        .iter()
        .enumerate()
        .map(|(slot, member)| (member.name.as_str(), slot))
        .collect();

    for expense in expenses {
        expense.validate(members)?;
        let slot = |nick: &str| {
            slots
                .get(nick)
                .copied()
                .ok_or_else(|| SplitError::InvalidExpense {
                    id: expense.id,
                    reason: format!("{nick} is not a member"),
                })
        };

        let amount_per_receiver = expense
            .amount
            .checked_div(Decimal::from(expense.beneficiaries.len()))
            .ok_or_else(|| SplitError::InvalidExpense {
                id: expense.id,
                reason: "share cannot be represented".to_string(),
            })?;

        let out_of_range = || SplitError::InvalidExpense {
            id: expense.id,
            reason: "amount out of range".to_string(),
        };

        let payer = &mut balances[slot(&expense.payer)?];
        payer.balance = payer
            .balance
            .checked_add(expense.amount)
            .ok_or_else(out_of_range)?;
        for receiver in &expense.beneficiaries {
            let receiver = &mut balances[slot(receiver)?];
            receiver.balance = receiver
                .balance
                .checked_sub(amount_per_receiver)
                .ok_or_else(out_of_range)?;
        }
    }
    Ok(balances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::{Category, ExpenseDraft};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn members(names: &[&str]) -> Vec<Member> {
        names.iter().map(|name| Member::new(*name)).collect()
    }

    fn expense(id: u64, amount: Decimal, payer: &str, split: &[&str]) -> Expense {
        ExpenseDraft {
            description: format!("expense {id}"),
            amount,
            payer: payer.to_string(),
            beneficiaries: split.iter().map(|s| s.to_string()).collect(),
            category: Category::Other,
            date: None,
        }
        .into_expense(id, Utc::now())
    }

    fn balance_of(balances: &[PersonalBalance], id: &str) -> Decimal {
        balances.iter().find(|b| b.id == id).unwrap().balance
    }

    #[test]
    fn single_expense_split_three_ways() {
        let roster = members(&["Alice", "Bob", "Carol"]);
        let expenses = vec![expense(1, dec!(90), "Alice", &["Alice", "Bob", "Carol"])];
        let balances = compute_balances(&roster, &expenses).unwrap();
        assert_eq!(
            balances,
            vec![
                PersonalBalance { id: "Alice".into(), balance: dec!(60) },
                PersonalBalance { id: "Bob".into(), balance: dec!(-30) },
                PersonalBalance { id: "Carol".into(), balance: dec!(-30) },
            ]
        );
    }

    #[test]
    fn trip_with_three_payers() {
        let roster = members(&["John", "Jane", "Mike"]);
        let everyone = ["John", "Jane", "Mike"];
        let expenses = vec![
            expense(1, dec!(450), "John", &everyone),
            expense(2, dec!(120), "Jane", &everyone),
            expense(3, dec!(45), "Mike", &everyone),
        ];
        let balances = compute_balances(&roster, &expenses).unwrap();
        assert_eq!(balance_of(&balances, "John"), dec!(245));
        assert_eq!(balance_of(&balances, "Jane"), dec!(-85));
        assert_eq!(balance_of(&balances, "Mike"), dec!(-160));
    }

    #[test]
    fn members_without_expenses_stay_at_zero() {
        let roster = members(&["Alice", "Bob", "Dave"]);
        let expenses = vec![expense(1, dec!(20), "Alice", &["Bob"])];
        let balances = compute_balances(&roster, &expenses).unwrap();
        assert_eq!(balance_of(&balances, "Dave"), Decimal::ZERO);
        assert_eq!(balances.len(), 3);
    }

    #[test]
    fn paying_only_for_yourself_changes_nothing() {
        let roster = members(&["Alice", "Bob"]);
        let expenses = vec![expense(1, dec!(42.50), "Alice", &["Alice"])];
        let balances = compute_balances(&roster, &expenses).unwrap();
        assert_eq!(balance_of(&balances, "Alice"), Decimal::ZERO);
        assert_eq!(balance_of(&balances, "Bob"), Decimal::ZERO);
    }

    #[test]
    fn money_is_conserved_with_uneven_splits() {
        let roster = members(&["A", "B", "C", "D", "E", "F", "G"]);
        let mut expenses = Vec::new();
        for id in 0..50u64 {
            let payer = roster[(id % 7) as usize].name.clone();
            let split: Vec<&str> = roster
                .iter()
                .take(1 + (id % 7) as usize)
                .map(|m| m.name.as_str())
                .collect();
            expenses.push(expense(id, Decimal::new(1000 + id as i64 * 37, 2), &payer, &split));
        }
        let balances = compute_balances(&roster, &expenses).unwrap();
        let total: Decimal = balances.iter().map(|b| b.balance).sum();
        assert!(total.abs() < dec!(0.01), "leaked {total}");
    }

    #[test]
    fn rejects_non_positive_amounts() {
        let roster = members(&["Alice", "Bob"]);
        for amount in [dec!(0), dec!(-12)] {
            let err = compute_balances(&roster, &[expense(4, amount, "Alice", &["Bob"])]).unwrap_err();
            assert!(matches!(err, SplitError::InvalidExpense { id: 4, .. }));
        }
    }

    #[test]
    fn rejects_strangers() {
        let roster = members(&["Alice", "Bob"]);
        let unknown_beneficiary = expense(1, dec!(10), "Alice", &["Bob", "Zoe"]);
        assert!(matches!(
            compute_balances(&roster, &[unknown_beneficiary]),
            Err(SplitError::InvalidExpense { id: 1, .. })
        ));
        let unknown_payer = expense(2, dec!(10), "Zoe", &["Bob"]);
        assert!(matches!(
            compute_balances(&roster, &[unknown_payer]),
            Err(SplitError::InvalidExpense { id: 2, .. })
        ));
    }

    #[test]
    fn huge_amounts_are_rejected_not_panicked() {
        let roster = members(&["Alice", "Bob"]);
        let huge = Decimal::from_str_exact("50000000000000000000000000000").unwrap();
        let expenses = vec![
            expense(1, huge, "Alice", &["Bob"]),
            expense(2, huge, "Alice", &["Bob"]),
        ];
        let err = compute_balances(&roster, &expenses).unwrap_err();
        assert_eq!(
            err,
            SplitError::InvalidExpense {
                id: 2,
                reason: "amount out of range".to_string()
            }
        );
        assert!(compute_balances(&roster, &expenses[..1]).is_ok());
    }

    #[test]
    fn rejects_blank_description() {
        let roster = members(&["Alice", "Bob"]);
        let mut blank = expense(6, dec!(10), "Alice", &["Bob"]);
        blank.description = "   ".to_string();
        assert!(matches!(
            compute_balances(&roster, &[blank]),
            Err(SplitError::InvalidExpense { id: 6, .. })
        ));
    }

    #[test]
    fn rejects_empty_split() {
        let roster = members(&["Alice"]);
        let orphan = expense(5, dec!(10), "Alice", &[]);
        assert!(matches!(
            compute_balances(&roster, &[orphan]),
            Err(SplitError::InvalidExpense { id: 5, .. })
        ));
    }
}
