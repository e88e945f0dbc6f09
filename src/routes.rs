use actix::{Addr, MailboxError};
use actix_web::{
    delete, get, http::header, post, put, web, Error, HttpRequest, HttpResponse,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::balance::{compute_balances, PersonalBalance};
use crate::error::SplitError;
use crate::roster::add_member;
use crate::schemas::{ExpenseDraft, ExpenseId, Group, Member};
use crate::settlement::{compute_settlements, Settlement};
use crate::store::{AddExpense, CreateGroup, Edit, EditGroup, GetGroup, GroupStore};

#[derive(Deserialize, Serialize)]
struct GroupJson {
    name: String,
    #[serde(default)]
    members: Vec<Member>,
}

#[derive(Deserialize, Serialize)]
pub struct SettleRequest {
    pub members: Vec<Member>,
    pub expenses: Vec<ExpenseDraft>,
}

#[derive(Deserialize, Serialize)]
pub struct SettleResponse {
    pub balances: Vec<PersonalBalance>,
    pub settlements: Vec<Settlement>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(add_group)
        .service(get_group)
        .service(add_group_member)
        .service(remove_group_member)
        .service(add_expense)
        .service(remove_expense)
        .service(get_balance)
        .service(get_member_balance)
        .service(get_settlements)
        .service(get_summary)
        .service(settle);
}

fn mailbox_error(err: MailboxError) -> Error {
    log::error!("Group store unreachable: {err}");
    actix_web::error::ErrorInternalServerError(err)
}

/// Reads the optimistic-concurrency guard from `If-Match`, if any.
fn expected_version(request: &HttpRequest) -> Result<Option<u64>, SplitError> {
    let Some(value) = request.headers().get(header::IF_MATCH) else {
        return Ok(None);
    };
    let raw = value
        .to_str()
        .map_err(|_| SplitError::InvalidVersion("<non-ascii>".to_string()))?;
    raw.trim()
        .trim_matches('"')
        .parse()
        .map(Some)
        .map_err(|_| SplitError::InvalidVersion(raw.to_string()))
}

fn etag(version: u64) -> (header::HeaderName, String) {
    (header::ETAG, format!("\"{version}\""))
}

async fn fetch(store: &Addr<GroupStore>, id: String) -> Result<Group, Error> {
    Ok(store.send(GetGroup(id)).await.map_err(mailbox_error)??)
}

async fn apply(
    store: &Addr<GroupStore>,
    request: &HttpRequest,
    group_id: String,
    edit: Edit,
) -> Result<Group, Error> {
    let message = EditGroup {
        group_id,
        expected_version: expected_version(request)?,
        edit,
    };
    Ok(store.send(message).await.map_err(mailbox_error)??)
}

#[put("/groups/{id}")]
async fn add_group(
    store: web::Data<Addr<GroupStore>>,
    id: web::Path<String>,
    json: web::Json<GroupJson>,
) -> Result<HttpResponse, Error> {
    let GroupJson { name, members } = json.into_inner();
    let group = store
        .send(CreateGroup {
            id: id.into_inner(),
            name,
            members,
        })
        .await
        .map_err(mailbox_error)??;
    Ok(HttpResponse::Created()
        .insert_header(etag(group.version))
        .json(group))
}

#[get("/groups/{id}")]
async fn get_group(
    store: web::Data<Addr<GroupStore>>,
    id: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let group = fetch(&store, id.into_inner()).await?;
    Ok(HttpResponse::Ok().insert_header(etag(group.version)).json(group))
}

#[post("/groups/{id}/members")]
async fn add_group_member(
    store: web::Data<Addr<GroupStore>>,
    request: HttpRequest,
    id: web::Path<String>,
    member: web::Json<Member>,
) -> Result<HttpResponse, Error> {
    let group = apply(
        &store,
        &request,
        id.into_inner(),
        Edit::AddMember(member.into_inner()),
    )
    .await?;
    Ok(HttpResponse::Ok().insert_header(etag(group.version)).json(group))
}

#[delete("/groups/{id}/members/{name}")]
async fn remove_group_member(
    store: web::Data<Addr<GroupStore>>,
    request: HttpRequest,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, Error> {
    let (id, name) = path.into_inner();
    let group = apply(&store, &request, id, Edit::RemoveMember(name)).await?;
    Ok(HttpResponse::Ok().insert_header(etag(group.version)).json(group))
}

#[post("/groups/{id}/expenses")]
async fn add_expense(
    store: web::Data<Addr<GroupStore>>,
    request: HttpRequest,
    id: web::Path<String>,
    expense: web::Json<ExpenseDraft>,
) -> Result<HttpResponse, Error> {
    let message = AddExpense {
        group_id: id.into_inner(),
        expected_version: expected_version(&request)?,
        draft: expense.into_inner(),
    };
    let (group, expense) = store.send(message).await.map_err(mailbox_error)??;
    Ok(HttpResponse::Created()
        .insert_header(etag(group.version))
        .json(expense))
}

#[delete("/groups/{id}/expenses/{expense_id}")]
async fn remove_expense(
    store: web::Data<Addr<GroupStore>>,
    request: HttpRequest,
    path: web::Path<(String, ExpenseId)>,
) -> Result<HttpResponse, Error> {
    let (id, expense_id) = path.into_inner();
    let group = apply(&store, &request, id, Edit::RemoveExpense(expense_id)).await?;
    Ok(HttpResponse::Ok().insert_header(etag(group.version)).json(group))
}

#[get("/groups/{id}/balance")]
async fn get_balance(
    store: web::Data<Addr<GroupStore>>,
    id: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let group = fetch(&store, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(group.balances()?))
}

#[get("/groups/{id}/balance/{name}")]
async fn get_member_balance(
    store: web::Data<Addr<GroupStore>>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, Error> {
    let (id, name) = path.into_inner();
    let group = fetch(&store, id).await?;
    Ok(HttpResponse::Ok().json(group.balance_of(&name)?))
}

#[get("/groups/{id}/settlements")]
async fn get_settlements(
    store: web::Data<Addr<GroupStore>>,
    id: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let group = fetch(&store, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(group.settlements()?))
}

#[get("/groups/{id}/summary")]
async fn get_summary(
    store: web::Data<Addr<GroupStore>>,
    id: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let group = fetch(&store, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(group.summary()?))
}

/// Settles an ad-hoc roster without storing anything. Expenses get ids in
/// the order they were sent, starting at 1.
#[post("/settle")]
async fn settle(json: web::Json<SettleRequest>) -> Result<HttpResponse, Error> {
    let SettleRequest { members, expenses } = json.into_inner();

    let mut roster: Vec<Member> = Vec::with_capacity(members.len());
    for member in members {
        roster = add_member(&roster, member)?;
    }
    let now = Utc::now();
    let expenses: Vec<_> = expenses
        .into_iter()
        .zip(1..)
        .map(|(draft, id)| draft.into_expense(id, now))
        .collect();

    let balances = compute_balances(&roster, &expenses)?;
    let settlements = compute_settlements(&balances);
    Ok(HttpResponse::Ok().json(SettleResponse {
        balances,
        settlements,
    }))
}
