use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::SplitError;

pub type UserNick = String;
pub type ExpenseId = u64;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Member {
    pub name: UserNick,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

impl Member {
    pub fn new(name: impl Into<UserNick>) -> Self {
        Member {
            name: name.into(),
            contact: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Food,
    Accommodation,
    Transport,
    Activities,
    Shopping,
    Other,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub description: String,
    pub amount: Decimal,
    pub payer: UserNick,
    pub beneficiaries: Vec<UserNick>,
    pub category: Category,
    pub date: DateTime<Utc>,
}

impl Expense {
    /// Checks the expense against the roster it is meant to be split over.
    pub fn validate(&self, members: &[Member]) -> Result<(), SplitError> {
        let invalid = |reason: String| SplitError::InvalidExpense {
            id: self.id,
            reason,
        };
        if self.description.trim().is_empty() {
            return Err(invalid("description must not be blank".to_string()));
        }
        if self.amount <= Decimal::ZERO {
            return Err(invalid(format!("amount must be positive, got {}", self.amount)));
        }
        if self.beneficiaries.is_empty() {
            return Err(invalid("nobody to split the expense between".to_string()));
        }
        if !is_member(members, &self.payer) {
            return Err(invalid(format!("payer {} is not a member", self.payer)));
        }
        if let Some(stranger) = self
            .beneficiaries
            .iter()
            .find(|nick| !is_member(members, nick))
        {
            return Err(invalid(format!("beneficiary {stranger} is not a member")));
        }
        Ok(())
    }
}

/// What a caller submits before the group allocates an id.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ExpenseDraft {
    pub description: String,
    pub amount: Decimal,
    pub payer: UserNick,
    pub beneficiaries: Vec<UserNick>,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl ExpenseDraft {
    pub fn into_expense(self, id: ExpenseId, now: DateTime<Utc>) -> Expense {
        // The split is a set, the first mention of a name wins
        let mut beneficiaries: Vec<UserNick> = Vec::with_capacity(self.beneficiaries.len());
        for nick in self.beneficiaries {
            let nick = nick.trim().to_string();
            if !beneficiaries.contains(&nick) {
                beneficiaries.push(nick);
            }
        }
        Expense {
            id,
            description: self.description.trim().to_string(),
            amount: self.amount,
            payer: self.payer.trim().to_string(),
            beneficiaries,
            category: self.category,
            date: self.date.unwrap_or(now),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub members: Vec<Member>,
    pub expenses: Vec<Expense>,
    pub next_expense_id: ExpenseId,
    pub version: u64,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct GroupSummary {
    pub total_expenses: Decimal,
    pub member_count: usize,
    pub expense_count: usize,
}

pub fn is_member(members: &[Member], nick: &str) -> bool {
    members.iter().any(|member| member.name == nick)
}
