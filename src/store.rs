//! In-memory home of every group the service knows about.
//!
//! The store is a single actor: requests reach it as messages and are
//! handled one after another, so two edits to the same group can never
//! interleave.

use std::collections::HashMap;

use actix::{Actor, Context, Handler, Message};
use chrono::Utc;
use log::info;

use crate::error::SplitError;
use crate::schemas::{Expense, ExpenseDraft, ExpenseId, Group, Member};

#[derive(Default)]
pub struct GroupStore {
    groups: HashMap<String, Group>,
}

impl Actor for GroupStore {
    type Context = Context<Self>;
}

#[derive(Message)]
#[rtype(result = "Result<Group, SplitError>")]
pub struct CreateGroup {
    pub id: String,
    pub name: String,
    pub members: Vec<Member>,
}

#[derive(Message)]
#[rtype(result = "Result<Group, SplitError>")]
pub struct GetGroup(pub String);

#[derive(Debug, Clone)]
pub enum Edit {
    AddMember(Member),
    RemoveMember(String),
    RemoveExpense(ExpenseId),
}

/// Applies one edit to a group, optionally guarded by the version the
/// caller last saw.
#[derive(Message)]
#[rtype(result = "Result<Group, SplitError>")]
pub struct EditGroup {
    pub group_id: String,
    pub expected_version: Option<u64>,
    pub edit: Edit,
}

/// Stores a new expense and answers with the group and the expense as
/// stored, id included.
#[derive(Message)]
#[rtype(result = "Result<(Group, Expense), SplitError>")]
pub struct AddExpense {
    pub group_id: String,
    pub expected_version: Option<u64>,
    pub draft: ExpenseDraft,
}

impl GroupStore {
    fn commit<T>(
        &mut self,
        group_id: String,
        expected_version: Option<u64>,
        edit: impl FnOnce(&Group) -> Result<(Group, T), SplitError>,
    ) -> Result<(Group, T), SplitError> {
        let current = self
            .groups
            .get(&group_id)
            .ok_or_else(|| SplitError::UnknownGroup(group_id.clone()))?;
        current.check_version(expected_version)?;
        let (group, extra) = edit(current)?;

        info!("Group {} now at version {}", group.id, group.version);
        self.groups.insert(group_id, group.clone());
        Ok((group, extra))
    }
}

impl Handler<CreateGroup> for GroupStore {
    type Result = Result<Group, SplitError>;

    fn handle(&mut self, msg: CreateGroup, _ctx: &mut Context<Self>) -> Self::Result {
        if self.groups.contains_key(&msg.id) {
            return Err(SplitError::DuplicateGroup(msg.id));
        }
        let mut group = Group::new(msg.id, msg.name);
        for member in msg.members {
            group = group.add_member(member)?;
        }
        info!("Group {} created with {} members", group.id, group.members.len());
        self.groups.insert(group.id.clone(), group.clone());
        Ok(group)
    }
}

impl Handler<GetGroup> for GroupStore {
    type Result = Result<Group, SplitError>;

    fn handle(&mut self, msg: GetGroup, _ctx: &mut Context<Self>) -> Self::Result {
        self.groups
            .get(&msg.0)
            .cloned()
            .ok_or(SplitError::UnknownGroup(msg.0))
    }
}

impl Handler<EditGroup> for GroupStore {
    type Result = Result<Group, SplitError>;

    fn handle(&mut self, msg: EditGroup, _ctx: &mut Context<Self>) -> Self::Result {
        let edit = msg.edit;
        let (group, ()) = self.commit(msg.group_id, msg.expected_version, |current| {
            let group = match edit {
                Edit::AddMember(member) => current.add_member(member)?,
                Edit::RemoveMember(name) => current.remove_member(&name),
                Edit::RemoveExpense(id) => current.remove_expense(id)?,
            };
            Ok((group, ()))
        })?;
        Ok(group)
    }
}

impl Handler<AddExpense> for GroupStore {
    type Result = Result<(Group, Expense), SplitError>;

    fn handle(&mut self, msg: AddExpense, _ctx: &mut Context<Self>) -> Self::Result {
        let draft = msg.draft;
        self.commit(msg.group_id, msg.expected_version, |current| {
            current.add_expense(draft, Utc::now())
        })
    }
}
