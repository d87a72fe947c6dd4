//! End-to-end router tests against in-memory collaborators.
//!
//! The router is driven with `tower::ServiceExt::oneshot`, so these run
//! without a listening socket, a database, or any external service.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

use echonote_api::{router, AppState, SessionStore};
use echonote_commands::{instruction_for, transform_commands};
use echonote_core::UserIdentity;
use echonote_db::MemoryNoteRepository;
use echonote_inference::MockGenerationBackend;
use echonote_media::MockMediaStore;

const TOKEN_A: &str = "Bearer tok-a";
const TOKEN_B: &str = "Bearer tok-b";

struct TestContext {
    state: AppState,
    notes: Arc<MemoryNoteRepository>,
    media: Arc<MockMediaStore>,
    generation: Arc<MockGenerationBackend>,
}

fn context() -> TestContext {
    context_with_generation(MockGenerationBackend::new())
}

fn context_with_generation(generation: MockGenerationBackend) -> TestContext {
    let notes = Arc::new(MemoryNoteRepository::new());
    let media = Arc::new(MockMediaStore::new());
    let generation = Arc::new(generation);

    let sessions = SessionStore::new();
    sessions.insert(
        "tok-a",
        UserIdentity {
            id: "user-a".into(),
            name: "Ada".into(),
        },
    );
    sessions.insert(
        "tok-b",
        UserIdentity {
            id: "user-b".into(),
            name: "Brin".into(),
        },
    );

    let state = AppState {
        notes: notes.clone(),
        media: media.clone(),
        generation: generation.clone(),
        sessions,
    };

    TestContext {
        state,
        notes,
        media,
        generation,
    }
}

async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = router(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", token)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// Hand-rolled multipart encoding; enough for the form shapes the API accepts.
const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

fn multipart_body(fields: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut buf = Vec::new();
    for (name, filename, data) in fields {
        buf.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match filename {
            Some(filename) => {
                buf.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
            }
            None => {
                buf.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
            }
        }
        buf.extend_from_slice(data);
        buf.extend_from_slice(b"\r\n");
    }
    buf.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    buf
}

fn multipart_request(
    method: &str,
    uri: &str,
    token: &str,
    fields: &[(&str, Option<&str>, &[u8])],
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", token)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(fields)))
        .unwrap()
}

// =============================================================================
// HEALTH AND AUTH
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let ctx = context();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&ctx.state, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_requests_without_token_are_unauthorized() {
    let ctx = context();

    for (method, uri) in [
        ("GET", "/notes"),
        ("POST", "/notes"),
        ("POST", "/transform-note"),
    ] {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();

        let (status, body) = send(&ctx.state, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        assert_eq!(body["error"], "Unauthorized");
    }
}

#[tokio::test]
async fn test_unknown_token_is_unauthorized() {
    let ctx = context();
    let request = Request::builder()
        .uri("/notes")
        .header("authorization", "Bearer no-such-token")
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(&ctx.state, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// NOTE CRUD
// =============================================================================

#[tokio::test]
async fn test_create_text_note_round_trip() {
    let ctx = context();

    let (status, created) = send(
        &ctx.state,
        json_request(
            "POST",
            "/notes",
            TOKEN_A,
            json!({ "title": "Groceries", "description": "milk, eggs" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["type"], "text");
    assert_eq!(created["title"], "Groceries");
    assert_eq!(created["description"], "milk, eggs");
    assert_eq!(created["isFavorite"], false);

    let (status, listed) = send(
        &ctx.state,
        Request::builder()
            .uri("/notes")
            .header("authorization", TOKEN_A)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], created["id"]);
}

#[tokio::test]
async fn test_text_note_title_defaults() {
    let ctx = context();

    let (status, created) = send(
        &ctx.state,
        json_request("POST", "/notes", TOKEN_A, json!({ "description": "untitled" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], "Text Note");
}

#[tokio::test]
async fn test_listing_is_scoped_to_the_session_user() {
    let ctx = context();

    send(
        &ctx.state,
        json_request("POST", "/notes", TOKEN_A, json!({ "description": "a's" })),
    )
    .await;
    send(
        &ctx.state,
        json_request("POST", "/notes", TOKEN_B, json!({ "description": "b's" })),
    )
    .await;

    let (_, listed) = send(
        &ctx.state,
        Request::builder()
            .uri("/notes")
            .header("authorization", TOKEN_B)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["description"], "b's");
}

#[tokio::test]
async fn test_create_audio_note_multipart() {
    let ctx = context();

    let (status, created) = send(
        &ctx.state,
        multipart_request(
            "POST",
            "/notes",
            TOKEN_A,
            &[
                ("audio", Some("recording.webm"), b"\x1aEaudio-bytes"),
                ("title", None, b"Standup"),
                ("transcript", None, b"we shipped the thing"),
                ("duration", None, b"01:42"),
            ],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["type"], "audio");
    assert_eq!(created["title"], "Standup");
    assert_eq!(created["transcript"], "we shipped the thing");
    assert_eq!(created["duration"], "01:42");
    assert_eq!(created["transcriptionState"], "completed");
    assert!(created["audioUrl"]
        .as_str()
        .unwrap()
        .contains("audio-notes"));

    let uploads = ctx.media.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].bytes, b"\x1aEaudio-bytes".len());
}

#[tokio::test]
async fn test_audio_note_without_file_is_rejected() {
    let ctx = context();

    let (status, body) = send(
        &ctx.state,
        multipart_request("POST", "/notes", TOKEN_A, &[("title", None, b"Standup")]),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No audio file provided");
    assert_eq!(ctx.media.upload_count(), 0);
    assert!(ctx.notes.all().is_empty());
}

#[tokio::test]
async fn test_update_requires_id_param() {
    let ctx = context();

    let (status, _) = send(
        &ctx.state,
        json_request("PATCH", "/notes", TOKEN_A, json!({ "title": "New" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_merges_only_provided_fields() {
    let ctx = context();

    let (_, created) = send(
        &ctx.state,
        json_request(
            "POST",
            "/notes",
            TOKEN_A,
            json!({ "title": "Draft", "description": "body" }),
        ),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &ctx.state,
        json_request(
            "PATCH",
            &format!("/notes?id={}", id),
            TOKEN_A,
            json!({ "title": "Final", "isFavorite": true }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Final");
    assert_eq!(updated["isFavorite"], true);
    assert_eq!(updated["description"], "body");
}

#[tokio::test]
async fn test_cross_user_update_is_forbidden_and_store_unchanged() {
    let ctx = context();

    let (_, created) = send(
        &ctx.state,
        json_request(
            "POST",
            "/notes",
            TOKEN_A,
            json!({ "title": "Private", "description": "secret" }),
        ),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &ctx.state,
        json_request(
            "PATCH",
            &format!("/notes?id={}", id),
            TOKEN_B,
            json!({ "title": "Stolen" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &ctx.state,
        Request::builder()
            .method("DELETE")
            .uri(format!("/notes/{}", id))
            .header("authorization", TOKEN_B)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let stored = ctx.notes.all();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].title, "Private");
}

#[tokio::test]
async fn test_delete_note() {
    let ctx = context();

    let (_, created) = send(
        &ctx.state,
        json_request("POST", "/notes", TOKEN_A, json!({ "description": "gone soon" })),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &ctx.state,
        Request::builder()
            .method("DELETE")
            .uri(format!("/notes/{}", id))
            .header("authorization", TOKEN_A)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(ctx.notes.all().is_empty());

    // Deleting again is a 404, not an error swallow.
    let (status, _) = send(
        &ctx.state,
        Request::builder()
            .method("DELETE")
            .uri(format!("/notes/{}", id))
            .header("authorization", TOKEN_A)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// IMAGES
// =============================================================================

#[tokio::test]
async fn test_attach_and_detach_image() {
    let ctx = context();

    let (_, created) = send(
        &ctx.state,
        json_request("POST", "/notes", TOKEN_A, json!({ "description": "pics" })),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    for _ in 0..2 {
        let (status, _) = send(
            &ctx.state,
            multipart_request(
                "POST",
                &format!("/notes/{}/images", id),
                TOKEN_A,
                &[("image", Some("photo.jpg"), b"jpeg-bytes")],
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let images = ctx.notes.all()[0].images.clone();
    assert_eq!(images.len(), 2);
    assert!(images[0].contains("note-images"));

    let (status, body) = send(
        &ctx.state,
        Request::builder()
            .method("DELETE")
            .uri(format!("/notes/{}/images?index=0", id))
            .header("authorization", TOKEN_A)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let remaining = body["images"].as_array().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0], images[1]);
}

#[tokio::test]
async fn test_detach_image_out_of_range_is_rejected() {
    let ctx = context();

    let (_, created) = send(
        &ctx.state,
        json_request("POST", "/notes", TOKEN_A, json!({ "description": "pics" })),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &ctx.state,
        Request::builder()
            .method("DELETE")
            .uri(format!("/notes/{}/images?index=3", id))
            .header("authorization", TOKEN_A)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Missing index is equally a client error.
    let (status, _) = send(
        &ctx.state,
        Request::builder()
            .method("DELETE")
            .uri(format!("/notes/{}/images", id))
            .header("authorization", TOKEN_A)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_media_upload_failure_is_internal_error() {
    let ctx = context();
    ctx.media.set_failing(true);

    let (status, _) = send(
        &ctx.state,
        multipart_request(
            "POST",
            "/notes",
            TOKEN_A,
            &[("audio", Some("a.webm"), b"bytes")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(ctx.notes.all().is_empty());
}

// =============================================================================
// TRANSFORM
// =============================================================================

#[tokio::test]
async fn test_transform_builds_instruction_prompt_for_every_command() {
    let ctx = context();
    let content = "meeting notes about the launch";

    let mut expected = Vec::new();
    for (category, command) in transform_commands() {
        let (status, body) = send(
            &ctx.state,
            json_request(
                "POST",
                "/transform-note",
                TOKEN_A,
                json!({ "content": content, "type": category.as_str(), "command": command }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}/{}", category.as_str(), command);
        assert!(body["transformedContent"].is_string());
        expected.push(instruction_for(category, command).unwrap());
    }

    let prompts = ctx.generation.prompts();
    assert_eq!(prompts.len(), expected.len());
    for (prompt, instruction) in prompts.iter().zip(expected) {
        assert!(
            prompt.starts_with(instruction),
            "prompt missing instruction: {}",
            prompt
        );
        assert!(prompt.ends_with(content));
    }
}

#[tokio::test]
async fn test_transform_returns_backend_output() {
    let ctx = context_with_generation(
        MockGenerationBackend::new().with_fixed_response("Dear team, per my last note."),
    );

    let (status, body) = send(
        &ctx.state,
        json_request(
            "POST",
            "/transform-note",
            TOKEN_A,
            json!({ "content": "yo team", "type": "tone", "command": "formal" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transformedContent"], "Dear team, per my last note.");
}

#[tokio::test]
async fn test_transform_rejects_unknown_pairs_without_calling_backend() {
    let ctx = context();

    for payload in [
        json!({ "content": "x", "type": "tone", "command": "sarcastic_extreme" }),
        json!({ "content": "x", "type": "navigation", "command": "go_home" }),
        json!({ "content": "x", "type": "mood", "command": "formal" }),
        json!({ "content": "x", "type": "format", "command": "formal" }),
    ] {
        let (status, _) = send(
            &ctx.state,
            json_request("POST", "/transform-note", TOKEN_A, payload),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    assert_eq!(ctx.generation.call_count(), 0);
}

#[tokio::test]
async fn test_transform_requires_nonempty_content() {
    let ctx = context();

    for payload in [
        json!({ "type": "tone", "command": "formal" }),
        json!({ "content": "", "type": "tone", "command": "formal" }),
        json!({ "content": "   ", "type": "tone", "command": "formal" }),
    ] {
        let (status, _) = send(
            &ctx.state,
            json_request("POST", "/transform-note", TOKEN_A, payload),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    assert_eq!(ctx.generation.call_count(), 0);
}

#[tokio::test]
async fn test_transform_backend_failure_is_internal_error() {
    let ctx = context_with_generation(MockGenerationBackend::new().with_failure());

    let (status, body) = send(
        &ctx.state,
        json_request(
            "POST",
            "/transform-note",
            TOKEN_A,
            json!({ "content": "x", "type": "edit", "command": "undo" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}
