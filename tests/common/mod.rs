//! In-process fake of the campaign API
//!
//! Mirrors the envelope, routes and business rules the client relies on,
//! backed by an in-memory store that tests can seed and inspect.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    routing::{get, patch, post},
};
use serde_json::{Value, json};
use uuid::Uuid;

use campaign_client::{ClientConfig, ClientState, storage::KeyValueStore, storage::MemoryStore};

#[derive(Debug, Clone)]
pub struct FakeUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub active: bool,
}

impl FakeUser {
    fn to_json(&self) -> Value {
        json!({
            "_id": self.id,
            "name": self.name,
            "email": self.email,
            "role": self.role,
            "active": self.active,
        })
    }

    fn can_organize(&self) -> bool {
        self.role == "organizer" || self.role == "admin"
    }
}

#[derive(Debug, Clone)]
pub struct FakeParticipant {
    pub id: String,
    pub user_id: String,
    pub attended: bool,
}

#[derive(Debug, Clone)]
pub struct FakeEvent {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub location: String,
    pub organizer: String,
    pub category: String,
    pub target_goal: u64,
    pub current_progress: u64,
    pub status: String,
    pub created_by: String,
    pub participants: Vec<FakeParticipant>,
}

impl FakeEvent {
    /// Full record, as `GET /events/:id` returns it: participants and creator
    /// populated
    fn to_json(&self, users: &[FakeUser]) -> Value {
        let populate = |user_id: &str| {
            users
                .iter()
                .find(|u| u.id == user_id)
                .map(|u| json!({ "_id": u.id, "name": u.name, "email": u.email }))
                .unwrap_or_else(|| json!(user_id))
        };

        json!({
            "_id": self.id,
            "title": self.title,
            "description": self.description,
            "date": self.date,
            "location": self.location,
            "organizer": self.organizer,
            "category": self.category,
            "targetGoal": self.target_goal,
            "currentProgress": self.current_progress,
            "status": self.status,
            "createdBy": populate(&self.created_by),
            "participants": self.participants.iter().map(|p| json!({
                "_id": p.id,
                "userId": populate(&p.user_id),
                "attended": p.attended,
            })).collect::<Vec<_>>(),
        })
    }

    /// List entry, as `GET /events` returns it: a count instead of the
    /// participant array and the creator as a bare id
    fn to_summary(&self) -> Value {
        json!({
            "id": self.id,
            "title": self.title,
            "date": self.date,
            "location": self.location,
            "organizer": self.organizer,
            "category": self.category,
            "targetGoal": self.target_goal,
            "currentProgress": self.current_progress,
            "participantsCount": self.participants.len(),
            "status": self.status,
            "createdBy": self.created_by,
        })
    }

    fn has_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p.user_id == user_id)
    }
}

#[derive(Debug, Default)]
pub struct Backend {
    pub users: Vec<FakeUser>,
    pub tokens: HashMap<String, String>,
    pub events: Vec<FakeEvent>,
}

impl Backend {
    fn issue_token(&mut self, user_id: &str) -> String {
        let token = Uuid::new_v4().to_string();
        self.tokens.insert(token.clone(), user_id.to_string());
        token
    }

    fn authenticate(&self, headers: &HeaderMap) -> Result<FakeUser, Reply> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "No token provided"))?;

        self.tokens
            .get(token)
            .and_then(|user_id| self.users.iter().find(|u| &u.id == user_id))
            .cloned()
            .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Invalid token"))
    }

    fn event_mut(&mut self, id: &str) -> Result<&mut FakeEvent, Reply> {
        self.events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Event not found"))
    }
}

pub type Shared = Arc<Mutex<Backend>>;

type Reply = (StatusCode, Json<Value>);

fn ok(status: StatusCode, data: Value) -> Reply {
    (status, Json(json!({ "success": true, "data": data })))
}

fn fail(status: StatusCode, message: &str) -> Reply {
    (status, Json(json!({ "success": false, "message": message })))
}

fn text(body: &Value, key: &str) -> String {
    body.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}

macro_rules! try_reply {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(reply) => return reply,
        }
    };
}

// =============================================================================
// Auth
// =============================================================================

async fn register(State(backend): State<Shared>, Json(body): Json<Value>) -> Reply {
    let mut backend = backend.lock().unwrap();
    let email = text(&body, "email");
    if backend.users.iter().any(|u| u.email == email) {
        return fail(StatusCode::BAD_REQUEST, "Email already registered");
    }

    let user = FakeUser {
        id: Uuid::new_v4().to_string(),
        name: text(&body, "name"),
        email,
        password: text(&body, "password"),
        role: text(&body, "role"),
        active: true,
    };
    let token = backend.issue_token(&user.id);
    backend.users.push(user.clone());

    ok(StatusCode::CREATED, json!({ "token": token, "user": user.to_json() }))
}

async fn login(State(backend): State<Shared>, Json(body): Json<Value>) -> Reply {
    let mut backend = backend.lock().unwrap();
    let email = text(&body, "email");
    let password = text(&body, "password");

    let Some(user) = backend
        .users
        .iter()
        .find(|u| u.email == email && u.password == password)
        .cloned()
    else {
        return fail(StatusCode::UNAUTHORIZED, "Invalid credentials");
    };
    if !user.active {
        return fail(StatusCode::FORBIDDEN, "Account disabled");
    }

    let token = backend.issue_token(&user.id);
    ok(StatusCode::OK, json!({ "token": token, "user": user.to_json() }))
}

async fn profile(State(backend): State<Shared>, headers: HeaderMap) -> Reply {
    let backend = backend.lock().unwrap();
    let user = try_reply!(backend.authenticate(&headers));
    ok(StatusCode::OK, json!({ "user": user.to_json() }))
}

// =============================================================================
// Events
// =============================================================================

async fn list_events(State(backend): State<Shared>) -> Reply {
    let backend = backend.lock().unwrap();
    ok(
        StatusCode::OK,
        Value::Array(backend.events.iter().map(FakeEvent::to_summary).collect()),
    )
}

async fn my_events(State(backend): State<Shared>, headers: HeaderMap) -> Reply {
    let backend = backend.lock().unwrap();
    let user = try_reply!(backend.authenticate(&headers));
    let mine = backend
        .events
        .iter()
        .filter(|e| e.created_by == user.id)
        .map(|e| e.to_json(&backend.users))
        .collect();
    ok(StatusCode::OK, Value::Array(mine))
}

async fn create_event(State(backend): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    let mut backend = backend.lock().unwrap();
    let user = try_reply!(backend.authenticate(&headers));
    if !user.can_organize() {
        return fail(StatusCode::FORBIDDEN, "Only organizers can create events");
    }

    let target_goal = body.get("targetGoal").and_then(Value::as_u64).unwrap_or(0);
    if target_goal < 1 {
        return fail(StatusCode::BAD_REQUEST, "Target goal must be at least 1");
    }

    let event = FakeEvent {
        id: Uuid::new_v4().to_string(),
        title: text(&body, "title"),
        description: text(&body, "description"),
        date: text(&body, "date"),
        location: text(&body, "location"),
        organizer: text(&body, "organizer"),
        category: text(&body, "category"),
        target_goal,
        current_progress: 0,
        status: "active".to_string(),
        created_by: user.id,
        participants: Vec::new(),
    };
    let data = event.to_json(&backend.users);
    backend.events.push(event);
    ok(StatusCode::CREATED, data)
}

async fn get_event(State(backend): State<Shared>, Path(id): Path<String>) -> Reply {
    let backend = backend.lock().unwrap();
    match backend.events.iter().find(|e| e.id == id) {
        Some(event) => ok(StatusCode::OK, event.to_json(&backend.users)),
        None => fail(StatusCode::NOT_FOUND, "Event not found"),
    }
}

async fn update_event(
    State(backend): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut backend = backend.lock().unwrap();
    let user = try_reply!(backend.authenticate(&headers));
    let event = try_reply!(backend.event_mut(&id));
    if event.created_by != user.id && user.role != "admin" {
        return fail(StatusCode::FORBIDDEN, "Not allowed to edit this event");
    }

    for (key, field) in [
        ("title", &mut event.title),
        ("description", &mut event.description),
        ("date", &mut event.date),
        ("location", &mut event.location),
        ("organizer", &mut event.organizer),
        ("category", &mut event.category),
        ("status", &mut event.status),
    ] {
        if let Some(value) = body.get(key).and_then(Value::as_str) {
            *field = value.to_string();
        }
    }
    if let Some(goal) = body.get("targetGoal").and_then(Value::as_u64) {
        event.target_goal = goal;
    }

    let event = event.clone();
    ok(StatusCode::OK, event.to_json(&backend.users))
}

async fn delete_event(State(backend): State<Shared>, Path(id): Path<String>, headers: HeaderMap) -> Reply {
    let mut backend = backend.lock().unwrap();
    let user = try_reply!(backend.authenticate(&headers));
    let event = try_reply!(backend.event_mut(&id));
    if event.created_by != user.id && user.role != "admin" {
        return fail(StatusCode::FORBIDDEN, "Not allowed to delete this event");
    }

    backend.events.retain(|e| e.id != id);
    ok(StatusCode::OK, Value::Null)
}

async fn join_event(State(backend): State<Shared>, Path(id): Path<String>, headers: HeaderMap) -> Reply {
    let mut backend = backend.lock().unwrap();
    let user = try_reply!(backend.authenticate(&headers));
    let event = try_reply!(backend.event_mut(&id));
    if event.status != "active" {
        return fail(StatusCode::BAD_REQUEST, "Event is not active");
    }
    if event.has_participant(&user.id) {
        return fail(StatusCode::BAD_REQUEST, "You are already participating in this event");
    }

    event.participants.push(FakeParticipant {
        id: Uuid::new_v4().to_string(),
        user_id: user.id,
        attended: false,
    });
    event.current_progress += 1;

    let event = event.clone();
    ok(StatusCode::OK, event.to_json(&backend.users))
}

async fn leave_event(State(backend): State<Shared>, Path(id): Path<String>, headers: HeaderMap) -> Reply {
    let mut backend = backend.lock().unwrap();
    let user = try_reply!(backend.authenticate(&headers));
    let event = try_reply!(backend.event_mut(&id));
    if !event.has_participant(&user.id) {
        return fail(StatusCode::BAD_REQUEST, "You are not participating in this event");
    }

    event.participants.retain(|p| p.user_id != user.id);
    event.current_progress = event.current_progress.saturating_sub(1);

    let event = event.clone();
    ok(StatusCode::OK, event.to_json(&backend.users))
}

async fn mark_attendance(
    State(backend): State<Shared>,
    Path((id, participant_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut backend = backend.lock().unwrap();
    let user = try_reply!(backend.authenticate(&headers));
    if !user.can_organize() {
        return fail(StatusCode::FORBIDDEN, "Only organizers can mark attendance");
    }

    let event = try_reply!(backend.event_mut(&id));
    let Some(participant) = event.participants.iter_mut().find(|p| p.id == participant_id) else {
        return fail(StatusCode::NOT_FOUND, "Participant not found");
    };
    participant.attended = body.get("attended").and_then(Value::as_bool).unwrap_or(false);

    let event = event.clone();
    ok(StatusCode::OK, event.to_json(&backend.users))
}

// =============================================================================
// Users
// =============================================================================

fn require_admin(backend: &Backend, headers: &HeaderMap) -> Result<FakeUser, Reply> {
    let user = backend.authenticate(headers)?;
    if user.role != "admin" {
        return Err(fail(StatusCode::FORBIDDEN, "Admins only"));
    }
    Ok(user)
}

async fn list_users(State(backend): State<Shared>, headers: HeaderMap) -> Reply {
    let backend = backend.lock().unwrap();
    try_reply!(require_admin(&backend, &headers));
    ok(
        StatusCode::OK,
        Value::Array(backend.users.iter().map(FakeUser::to_json).collect()),
    )
}

async fn update_user_role(
    State(backend): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut backend = backend.lock().unwrap();
    try_reply!(require_admin(&backend, &headers));
    let Some(user) = backend.users.iter_mut().find(|u| u.id == id) else {
        return fail(StatusCode::NOT_FOUND, "User not found");
    };
    user.role = text(&body, "role");
    ok(StatusCode::OK, user.to_json())
}

async fn update_user_active(
    State(backend): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut backend = backend.lock().unwrap();
    try_reply!(require_admin(&backend, &headers));
    let Some(user) = backend.users.iter_mut().find(|u| u.id == id) else {
        return fail(StatusCode::NOT_FOUND, "User not found");
    };
    user.active = body.get("active").and_then(Value::as_bool).unwrap_or(true);
    ok(StatusCode::OK, user.to_json())
}

fn router(backend: Shared) -> Router {
    let api = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/profile", get(profile))
        .route("/events", get(list_events).post(create_event))
        .route("/events/mine", get(my_events))
        .route("/events/{id}", get(get_event).put(update_event).delete(delete_event))
        .route("/events/{id}/join", post(join_event))
        .route("/events/{id}/leave", post(leave_event))
        .route(
            "/events/{id}/participants/{participant_id}/attendance",
            patch(mark_attendance),
        )
        .route("/users", get(list_users))
        .route("/users/{id}/role", patch(update_user_role))
        .route("/users/{id}/active", patch(update_user_active));

    Router::new().nest("/api", api).with_state(backend)
}

/// A running fake API
pub struct FakeApi {
    pub base_url: String,
    pub backend: Shared,
}

impl FakeApi {
    pub async fn spawn() -> Self {
        let backend = Shared::default();
        let app = router(backend.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake api");
        let addr = listener.local_addr().expect("fake api address");
        tokio::spawn(async move { axum::serve(listener, app).await.expect("serve fake api") });

        Self {
            base_url: format!("http://{}/api", addr),
            backend,
        }
    }

    /// A fresh client with its own empty device store
    pub fn client(&self) -> ClientState {
        self.client_with_store(Arc::new(MemoryStore::new()))
    }

    /// A client over an existing device store, as after an app restart
    pub fn client_with_store(&self, store: Arc<dyn KeyValueStore>) -> ClientState {
        ClientState::new(ClientConfig::for_base_url(&self.base_url), store).expect("build client")
    }

    /// Insert an account directly, returning its id
    pub fn seed_user(&self, name: &str, email: &str, password: &str, role: &str) -> String {
        let user = FakeUser {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: role.to_string(),
            active: true,
        };
        let id = user.id.clone();
        self.backend.lock().unwrap().users.push(user);
        id
    }

    /// Forget every issued token, as if all sessions expired
    pub fn revoke_tokens(&self) {
        self.backend.lock().unwrap().tokens.clear();
    }

    pub fn set_role(&self, user_id: &str, role: &str) {
        let mut backend = self.backend.lock().unwrap();
        if let Some(user) = backend.users.iter_mut().find(|u| u.id == user_id) {
            user.role = role.to_string();
        }
    }

    pub fn event(&self, id: &str) -> Option<FakeEvent> {
        self.backend.lock().unwrap().events.iter().find(|e| e.id == id).cloned()
    }

    /// Drop a member server-side without telling the client
    pub fn forget_participant(&self, event_id: &str, user_id: &str) {
        let mut backend = self.backend.lock().unwrap();
        if let Some(event) = backend.events.iter_mut().find(|e| e.id == event_id) {
            event.participants.retain(|p| p.user_id != user_id);
        }
    }
}
