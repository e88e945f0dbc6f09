//! Edits to a group's members and expenses.
//!
//! Every operation takes the current state by reference and hands back a new
//! one, so a rejected edit leaves the caller's state exactly as it was.

use chrono::{DateTime, Utc};
use log::debug;
use rust_decimal::Decimal;

use crate::balance::{compute_balances, PersonalBalance};
use crate::error::SplitError;
use crate::schemas::{is_member, Expense, ExpenseDraft, ExpenseId, Group, GroupSummary, Member};
use crate::settlement::{compute_settlements, Settlement};

pub fn add_member(members: &[Member], member: Member) -> Result<Vec<Member>, SplitError> {
    let name = member.name.trim();
    if name.is_empty() {
        return Err(SplitError::InvalidMember(
            "name must not be blank".to_string(),
        ));
    }
    if is_member(members, name) {
        return Err(SplitError::DuplicateMember(name.to_string()));
    }
    let mut roster = members.to_vec();
    roster.push(Member {
        name: name.to_string(),
        contact: member.contact,
    });
    Ok(roster)
}

/// Drops `name` from the roster and from every split it took part in.
/// Expenses are kept even when their split ends up empty; balances for such
/// a group are rejected until the expense is fixed or removed.
pub fn remove_member(
    members: &[Member],
    expenses: &[Expense],
    name: &str,
) -> (Vec<Member>, Vec<Expense>) {
    let name = name.trim();
    let roster = members
        .iter()
        .filter(|member| member.name != name)
        .cloned()
        .collect();
    let expenses = expenses
        .iter()
        .cloned()
        .map(|mut expense| {
            expense.beneficiaries.retain(|nick| nick != name);
            expense
        })
        .collect();
    (roster, expenses)
}

pub fn add_expense(
    members: &[Member],
    expenses: &[Expense],
    expense: Expense,
) -> Result<Vec<Expense>, SplitError> {
    if expenses.iter().any(|stored| stored.id == expense.id) {
        return Err(SplitError::DuplicateExpense(expense.id));
    }
    expense.validate(members)?;
    let mut expenses = expenses.to_vec();
    expenses.push(expense);
    Ok(expenses)
}

pub fn remove_expense(expenses: &[Expense], id: ExpenseId) -> Result<Vec<Expense>, SplitError> {
    if !expenses.iter().any(|expense| expense.id == id) {
        return Err(SplitError::UnknownExpense(id));
    }
    Ok(expenses
        .iter()
        .filter(|expense| expense.id != id)
        .cloned()
        .collect())
}

impl Group {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Group {
            id: id.into(),
            name: name.into(),
            members: Vec::new(),
            expenses: Vec::new(),
            next_expense_id: 1,
            version: 0,
        }
    }

    /// Fails with `VersionConflict` when the caller edited a stale copy.
    pub fn check_version(&self, expected: Option<u64>) -> Result<(), SplitError> {
        match expected {
            Some(expected) if expected != self.version => Err(SplitError::VersionConflict {
                expected,
                actual: self.version,
            }),
            _ => Ok(()),
        }
    }

    pub fn add_member(&self, member: Member) -> Result<Group, SplitError> {
        let members = add_member(&self.members, member)?;
        Ok(self.next_version(members, self.expenses.clone()))
    }

    pub fn remove_member(&self, name: &str) -> Group {
        let name = name.trim();
        if !is_member(&self.members, name) {
            debug!("{name} is not in group {}, nothing to remove", self.id);
            return self.clone();
        }
        let (members, expenses) = remove_member(&self.members, &self.expenses, name);
        self.next_version(members, expenses)
    }

    /// Allocates an id for `draft` and appends it. Returns the new state
    /// together with the stored expense.
    pub fn add_expense(
        &self,
        draft: ExpenseDraft,
        now: DateTime<Utc>,
    ) -> Result<(Group, Expense), SplitError> {
        let expense = draft.into_expense(self.next_expense_id, now);
        let expenses = add_expense(&self.members, &self.expenses, expense.clone())?;
        let mut group = self.next_version(self.members.clone(), expenses);
        group.next_expense_id += 1;
        Ok((group, expense))
    }

    pub fn remove_expense(&self, id: ExpenseId) -> Result<Group, SplitError> {
        let expenses = remove_expense(&self.expenses, id)?;
        Ok(self.next_version(self.members.clone(), expenses))
    }

    pub fn balances(&self) -> Result<Vec<PersonalBalance>, SplitError> {
        compute_balances(&self.members, &self.expenses)
    }

    pub fn settlements(&self) -> Result<Vec<Settlement>, SplitError> {
        Ok(compute_settlements(&self.balances()?))
    }

    /// Net position of a single member.
    pub fn balance_of(&self, name: &str) -> Result<PersonalBalance, SplitError> {
        let name = name.trim();
        self.balances()?
            .into_iter()
            .find(|balance| balance.id == name)
            .ok_or_else(|| SplitError::UnknownMember(name.to_string()))
    }

    pub fn summary(&self) -> Result<GroupSummary, SplitError> {
        let mut total_expenses = Decimal::ZERO;
        for expense in &self.expenses {
            total_expenses = total_expenses.checked_add(expense.amount).ok_or_else(|| {
                SplitError::InvalidExpense {
                    id: expense.id,
                    reason: "amount out of range".to_string(),
                }
            })?;
        }
        Ok(GroupSummary {
            total_expenses,
            member_count: self.members.len(),
            expense_count: self.expenses.len(),
        })
    }

    fn next_version(&self, members: Vec<Member>, expenses: Vec<Expense>) -> Group {
        Group {
            id: self.id.clone(),
            name: self.name.clone(),
            members,
            expenses,
            next_expense_id: self.next_expense_id,
            version: self.version + 1,
        }
    }
}
