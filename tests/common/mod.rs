// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process fake of the portal backend.
//!
//! Serves the same routes and error shapes as the real API on an ephemeral
//! port, records every request it sees, and exposes knobs for failure modes.

use axum::{
    extract::{Form, Multipart, Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use campus_portal::config::Config;
use campus_portal::db::MemoryStore;
use campus_portal::Portal;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub const PASSWORD: &str = "secret";

/// Student whose record the fake serves.
#[allow(dead_code)]
pub const STUDENT_ID: i64 = 1;

/// Course that answers enrollment with a 400 and a detail message.
#[allow(dead_code)]
pub const FULL_COURSE_ID: i64 = 99;

/// A request as seen by the fake backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
}

/// Uploaded submission file.
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub assignment_id: i64,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub struct BackendState {
    pub requests: Mutex<Vec<RecordedRequest>>,
    pub signups: Mutex<Vec<(String, Value)>>,
    pub uploads: Mutex<Vec<RecordedUpload>>,
    /// Overrides the `/token` response status when set.
    pub token_status: Mutex<Option<StatusCode>>,
    pub fail_profile: AtomicBool,
    /// Report every profile with both role flags set.
    pub both_roles: AtomicBool,
    /// Course whose assignment listing answers 500.
    pub failing_course: Mutex<Option<i64>>,
    pub courses: Mutex<Vec<Value>>,
    pub assignments: Mutex<HashMap<i64, Vec<Value>>>,
    pub submissions: Mutex<Vec<Value>>,
}

impl BackendState {
    /// Alice is enrolled in three courses. Course 1 has one open and one
    /// past-due assignment, course 2 has a past-due one she submitted, and
    /// course 3 has none.
    fn seeded() -> Self {
        let fmt = "%Y-%m-%dT%H:%M:%S";
        let next_week = (Utc::now() + Duration::days(7)).format(fmt).to_string();
        let yesterday = (Utc::now() - Duration::days(1)).format(fmt).to_string();

        let mut assignments = HashMap::new();
        assignments.insert(
            1,
            vec![
                json!({"assignment_id": 101, "content": "Problem set 1", "deadline": next_week, "status": "open", "teacher_id": 5}),
                json!({"assignment_id": 102, "content": "Problem set 0", "deadline": yesterday, "status": "open", "teacher_id": 5}),
            ],
        );
        assignments.insert(
            2,
            vec![json!({"assignment_id": 201, "content": "Essay", "deadline": yesterday, "status": "closed", "teacher_id": 6})],
        );
        assignments.insert(3, vec![]);

        Self {
            requests: Mutex::new(Vec::new()),
            signups: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
            token_status: Mutex::new(None),
            fail_profile: AtomicBool::new(false),
            both_roles: AtomicBool::new(false),
            failing_course: Mutex::new(None),
            courses: Mutex::new(vec![
                json!({"course_id": 1, "course_name": "Algebra", "credit": 4, "grade": null}),
                json!({"course_id": 2, "course_name": "History", "credit": 3, "grade": 88.5}),
                json!({"course_id": 3, "course_name": "Physics", "credit": 4, "grade": null}),
            ]),
            assignments: Mutex::new(assignments),
            submissions: Mutex::new(vec![json!({
                "submission_id": 501,
                "assignment_id": 201,
                "student_id": STUDENT_ID,
                "submit_time": "2025-03-01T10:00:00",
                "file_path": "uploads/essay.txt"
            })]),
        }
    }

    #[allow(dead_code)]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Recorded requests matching `method` and `path`.
    #[allow(dead_code)]
    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

pub struct FakeBackend {
    pub url: String,
    pub state: Arc<BackendState>,
}

/// Start the fake backend on an ephemeral local port.
pub async fn spawn_backend() -> FakeBackend {
    let state = Arc::new(BackendState::seeded());

    let app = Router::new()
        .route("/token", post(token))
        .route("/users/me", get(users_me))
        .route("/stu/students/", post(create_student))
        .route("/tea/teachers/", post(create_teacher))
        .route("/students/{id}", get(student_detail))
        .route("/students/{id}/transcript", get(transcript))
        .route("/courses", get(list_courses))
        .route("/courses/{id}/assignments", get(course_assignments))
        .route("/courses/{id}/enroll", post(enroll))
        .route("/submissions/my", get(my_submissions))
        .route("/assignments/{id}/submit", post(submit))
        .route("/submissions/download/{id}", get(download))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake backend");
    let addr = listener.local_addr().expect("fake backend address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake backend");
    });

    FakeBackend {
        url: format!("http://{}", addr),
        state,
    }
}

/// Portal wired to `url` with in-memory session storage.
#[allow(dead_code)]
pub fn portal_for(url: &str) -> (Portal, Arc<MemoryStore>) {
    let storage = Arc::new(MemoryStore::new());
    let config = Config::test_default().with_api_url(url);
    let portal = Portal::new(config, storage.clone()).expect("portal");
    (portal, storage)
}

/// Base URL with nothing listening behind it.
#[allow(dead_code)]
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("address");
    drop(listener);
    format!("http://{}", addr)
}

// ─── Handlers ────────────────────────────────────────────────────────────

type ApiResult = Result<Response, (StatusCode, Json<Value>)>;

fn detail(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": message })))
}

async fn record(State(state): State<Arc<BackendState>>, req: Request, next: Next) -> Response {
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.requests.lock().unwrap().push(RecordedRequest {
        method: req.method().to_string(),
        path: req.uri().path().to_string(),
        authorization,
    });
    next.run(req).await
}

/// Username behind a `Bearer token-<username>` header.
fn bearer_user(headers: &HeaderMap) -> Result<String, (StatusCode, Json<Value>)> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer token-"))
        .map(str::to_string)
        .ok_or_else(|| detail(StatusCode::UNAUTHORIZED, "Not authenticated"))
}

fn profile(username: &str) -> Option<Value> {
    let (user_id, is_student, is_teacher) = match username {
        "alice" => (7, true, false),
        "bob" => (8, false, true),
        // Flagged as both; the client cannot pick a role
        "carol" => (9, true, true),
        _ => return None,
    };
    Some(json!({
        "user_id": user_id,
        "username": username,
        "email": format!("{}@example.edu", username),
        "is_student": is_student,
        "is_teacher": is_teacher
    }))
}

async fn token(
    State(state): State<Arc<BackendState>>,
    Form(form): Form<HashMap<String, String>>,
) -> ApiResult {
    if let Some(status) = *state.token_status.lock().unwrap() {
        return Err(detail(status, "Token endpoint unavailable"));
    }

    let username = form.get("username").map(String::as_str).unwrap_or_default();
    let password = form.get("password").map(String::as_str).unwrap_or_default();
    if form.get("grant_type").map(String::as_str) != Some("password") {
        return Err(detail(StatusCode::BAD_REQUEST, "Unsupported grant type"));
    }
    if password != PASSWORD || profile(username).is_none() {
        return Err(detail(
            StatusCode::UNAUTHORIZED,
            "Incorrect username or password",
        ));
    }

    Ok(Json(json!({
        "access_token": format!("token-{}", username),
        "token_type": "bearer"
    }))
    .into_response())
}

async fn users_me(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> ApiResult {
    let username = bearer_user(&headers)?;
    if state.fail_profile.load(Ordering::SeqCst) {
        return Err((StatusCode::INTERNAL_SERVER_ERROR, Json(json!("Internal Server Error"))));
    }
    let mut me = profile(&username).ok_or_else(|| detail(StatusCode::UNAUTHORIZED, "Unknown user"))?;
    if state.both_roles.load(Ordering::SeqCst) {
        me["is_student"] = json!(true);
        me["is_teacher"] = json!(true);
    }
    Ok(Json(me).into_response())
}

fn register(state: &BackendState, path: &str, payload: &Value) -> Result<Value, (StatusCode, Json<Value>)> {
    state
        .signups
        .lock()
        .unwrap()
        .push((path.to_string(), payload.clone()));

    let username = payload["user"]["username"].as_str().unwrap_or_default();
    match username {
        "taken" => Err(detail(StatusCode::BAD_REQUEST, "Username already registered")),
        "crash" => Err((StatusCode::INTERNAL_SERVER_ERROR, Json(json!("oops")))),
        _ => Ok(json!({
            "user_id": 20,
            "username": username,
            "email": payload["user"]["email"]
        })),
    }
}

async fn create_student(
    State(state): State<Arc<BackendState>>,
    Json(payload): Json<Value>,
) -> ApiResult {
    let user = register(&state, "/stu/students/", &payload)?;
    Ok(Json(json!({
        "student_id": 10,
        "grade": payload["grade"],
        "major": payload["major"],
        "user": user
    }))
    .into_response())
}

async fn create_teacher(
    State(state): State<Arc<BackendState>>,
    Json(payload): Json<Value>,
) -> ApiResult {
    let user = register(&state, "/tea/teachers/", &payload)?;
    Ok(Json(json!({
        "teacher_id": 11,
        "title": payload["title"],
        "department": payload["department"],
        "user": user
    }))
    .into_response())
}

async fn student_detail(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> ApiResult {
    bearer_user(&headers)?;
    if id != STUDENT_ID {
        return Err(detail(StatusCode::NOT_FOUND, "Student not found"));
    }
    let courses = state.courses.lock().unwrap().clone();
    Ok(Json(json!({
        "student_id": STUDENT_ID,
        "grade": "2",
        "major": "Mathematics",
        "user": {"user_id": 7, "username": "alice", "email": "alice@example.edu"},
        "classes": [{"class_id": 1, "class_name": "Class A", "grade": "2"}],
        "courses": courses
    }))
    .into_response())
}

async fn transcript(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> ApiResult {
    bearer_user(&headers)?;
    if id != STUDENT_ID {
        return Err(detail(StatusCode::NOT_FOUND, "Student not found"));
    }
    let graded: Vec<Value> = state
        .courses
        .lock()
        .unwrap()
        .iter()
        .filter(|c| !c["grade"].is_null())
        .cloned()
        .collect();
    Ok(Json(graded).into_response())
}

async fn list_courses(headers: HeaderMap) -> ApiResult {
    bearer_user(&headers)?;
    Ok(Json(json!([
        {"course_id": 1, "course_name": "Algebra", "credit": 4},
        {"course_id": 2, "course_name": "History", "credit": 3},
        {"course_id": 3, "course_name": "Physics", "credit": 4},
        {"course_id": 4, "course_name": "Chemistry", "credit": 4},
        {"course_id": FULL_COURSE_ID, "course_name": "Seminar", "credit": 1}
    ]))
    .into_response())
}

async fn course_assignments(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> ApiResult {
    bearer_user(&headers)?;
    if *state.failing_course.lock().unwrap() == Some(id) {
        return Err(detail(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable"));
    }
    let list = state
        .assignments
        .lock()
        .unwrap()
        .get(&id)
        .cloned()
        .unwrap_or_default();
    Ok(Json(list).into_response())
}

async fn enroll(Path(id): Path<i64>, headers: HeaderMap) -> ApiResult {
    bearer_user(&headers)?;
    if id == FULL_COURSE_ID {
        return Err(detail(StatusCode::BAD_REQUEST, "Already enrolled in this course"));
    }
    Ok(Json(json!({"message": "Enrolled successfully"})).into_response())
}

async fn my_submissions(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> ApiResult {
    bearer_user(&headers)?;
    Ok(Json(state.submissions.lock().unwrap().clone()).into_response())
}

async fn submit(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> ApiResult {
    bearer_user(&headers)?;

    let mut upload = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|_| detail(StatusCode::BAD_REQUEST, "Upload interrupted"))?;
        upload = Some(RecordedUpload {
            assignment_id: id,
            file_name,
            bytes: bytes.to_vec(),
        });
    }
    let upload = upload.ok_or_else(|| detail(StatusCode::UNPROCESSABLE_ENTITY, "file is required"))?;

    let mut submissions = state.submissions.lock().unwrap();
    let submission = json!({
        "submission_id": 600 + submissions.len() as i64,
        "assignment_id": id,
        "student_id": STUDENT_ID,
        "submit_time": Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        "file_path": format!("uploads/{}", upload.file_name)
    });
    submissions.push(submission.clone());
    state.uploads.lock().unwrap().push(upload);

    Ok(Json(submission).into_response())
}

async fn download(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> ApiResult {
    bearer_user(&headers)?;
    let known = state
        .submissions
        .lock()
        .unwrap()
        .iter()
        .any(|s| s["submission_id"] == id);
    if !known {
        return Err(detail(StatusCode::NOT_FOUND, "Submission not found"));
    }
    Ok((
        [(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"essay.txt\"".to_string(),
        )],
        b"My essay".to_vec(),
    )
        .into_response())
}
