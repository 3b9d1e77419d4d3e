//! HTTP API: sessions, error mapping, tournament flow, scrims and the sweep trigger.

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::web::Data;
use actix_web::{test, App};
use challenger::api::{self, session_middleware, AppState, SESSION_COOKIE};
use challenger::{EventBus, GameMatch, Retention, Scrim, Store, Team, Tournament, User};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

macro_rules! test_app {
    ($store:expr) => {{
        let state = Data::new(AppState::new(
            $store.clone(),
            EventBus::default(),
            Retention::default(),
        ));
        test::init_service(
            App::new()
                .app_data(state)
                .wrap(session_middleware(Key::generate()))
                .configure(api::configure),
        )
        .await
    }};
}

async fn call<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}

async fn register<S, B>(app: &S, username: &str) -> User
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/users")
        .set_json(json!({ "username": username }))
        .to_request();
    let (status, body) = call(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    serde_json::from_value(body).unwrap()
}

async fn sign_in<S, B>(app: &S, user: &User) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/session")
        .set_json(json!({ "user_id": user.id }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    resp.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .expect("session cookie set on sign in")
        .into_owned()
}

async fn create_team<S, B>(app: &S, cookie: &Cookie<'static>, name: &str) -> Team
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/teams")
        .cookie(cookie.clone())
        .set_json(json!({ "name": name }))
        .to_request();
    let (status, body) = call(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    serde_json::from_value(body).unwrap()
}

fn set_status(id: Uuid, cookie: &Cookie<'static>, status: &str) -> Request {
    test::TestRequest::put()
        .uri(&format!("/api/tournaments/{id}/status"))
        .cookie(cookie.clone())
        .set_json(json!({ "status": status }))
        .to_request()
}

fn new_tournament(phases: Value) -> Value {
    json!({
        "name": "Autumn Cup",
        "game": "Valorant",
        "start_date": "2026-11-01T18:00:00Z",
        "max_participants": 8,
        "phases": phases,
    })
}

#[actix_web::test]
async fn health() {
    let store = Arc::new(Store::new());
    let app = test_app!(store);
    let req = test::TestRequest::get().uri("/api/health").to_request();
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[actix_web::test]
async fn bracket_template_endpoint() {
    let store = Arc::new(Store::new());
    let app = test_app!(store);

    let req = test::TestRequest::get()
        .uri("/api/brackets/template?team_count=8&bracket_type=SINGLE_ELIM")
        .to_request();
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slots"].as_array().unwrap().len(), 7);
    assert_eq!(body["slots"][0], json!({ "slot": 0, "team_a": null, "team_b": null }));

    let req = test::TestRequest::get()
        .uri("/api/brackets/template?team_count=3&bracket_type=UNKNOWN_TYPE")
        .to_request();
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unsupported bracket type: UNKNOWN_TYPE");
}

#[actix_web::test]
async fn first_user_is_admin_and_usernames_are_unique() {
    let store = Arc::new(Store::new());
    let app = test_app!(store);
    let root = register(&app, "root").await;
    let alice = register(&app, "alice").await;
    assert!(root.is_admin());
    assert!(!alice.is_admin());

    let req = test::TestRequest::post()
        .uri("/api/users")
        .set_json(json!({ "username": "ALICE" }))
        .to_request();
    let (status, _) = call(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn signed_in_routes_need_a_session() {
    let store = Arc::new(Store::new());
    let app = test_app!(store);
    let req = test::TestRequest::post()
        .uri("/api/teams")
        .set_json(json!({ "name": "Nobody" }))
        .to_request();
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Not signed in");
}

#[actix_web::test]
async fn tournament_flow() {
    let store = Arc::new(Store::new());
    let app = test_app!(store);
    let organizer = register(&app, "organizer").await;
    let org = sign_in(&app, &organizer).await;

    let req = test::TestRequest::post()
        .uri("/api/tournaments")
        .cookie(org.clone())
        .set_json(new_tournament(json!(["SINGLE_ELIM"])))
        .to_request();
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let tournament: Tournament = serde_json::from_value(body).unwrap();
    let tid = tournament.id;
    assert_eq!(tournament.referee_code.len(), 6);

    let mut teams = Vec::new();
    for name in ["Alpha", "Bravo", "Charlie", "Delta"] {
        let owner = register(&app, &name.to_lowercase()).await;
        let cookie = sign_in(&app, &owner).await;
        let team = create_team(&app, &cookie, name).await;

        let req = test::TestRequest::post()
            .uri(&format!("/api/tournaments/{tid}/teams"))
            .cookie(cookie)
            .set_json(json!({ "team_id": team.id }))
            .to_request();
        let (status, body) = call(&app, req).await;
        assert_eq!(status, StatusCode::OK, "{body}");

        let req = test::TestRequest::post()
            .uri(&format!("/api/tournaments/{tid}/teams/{}/confirm", team.id))
            .cookie(org.clone())
            .to_request();
        let (status, body) = call(&app, req).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        teams.push(team);
    }

    for status in ["REGISTRATION_LOCKED", "BRACKET_LOCKED"] {
        let (code, body) = call(&app, set_status(tid, &org, status)).await;
        assert_eq!(code, StatusCode::OK, "{body}");
        assert_eq!(body["status"], status);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/tournaments/{tid}/matches"))
        .to_request();
    let (_, body) = call(&app, req).await;
    let matches: Vec<GameMatch> = serde_json::from_value(body).unwrap();
    assert_eq!(matches.len(), 3);
    let first = &matches[0];
    assert_eq!(first.slot, 0);

    let req = test::TestRequest::put()
        .uri(&format!("/api/tournaments/{tid}/matches/{}/teams", first.id))
        .cookie(org.clone())
        .set_json(json!({ "team_a": teams[0].id, "team_b": teams[1].id, "format": "BO3" }))
        .to_request();
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "SCHEDULED");

    let (status, _) = call(&app, set_status(tid, &org, "IN_PROGRESS")).await;
    assert_eq!(status, StatusCode::OK);

    let referee = register(&app, "referee").await;
    let rc = sign_in(&app, &referee).await;
    let req = test::TestRequest::post()
        .uri(&format!("/api/tournaments/{tid}/referees"))
        .cookie(rc.clone())
        .set_json(json!({ "code": tournament.referee_code.to_lowercase() }))
        .to_request();
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let req = test::TestRequest::put()
        .uri(&format!("/api/tournaments/{tid}/matches/{}/result", first.id))
        .cookie(rc)
        .set_json(json!({ "score_a": 2, "score_b": 1, "winner": teams[0].id }))
        .to_request();
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "COMPLETED");

    let (status, _) = call(&app, set_status(tid, &org, "COMPLETE")).await;
    assert_eq!(status, StatusCode::OK);
    let stored = store.tournaments.get(tid).await.unwrap();
    assert_eq!(stored.referees, vec![referee.id]);
    assert_eq!(stored.status.as_str(), "COMPLETE");
}

#[actix_web::test]
async fn rejected_status_changes() {
    let store = Arc::new(Store::new());
    let app = test_app!(store);
    let organizer = register(&app, "organizer").await;
    let org = sign_in(&app, &organizer).await;
    let stranger = register(&app, "stranger").await;
    let other = sign_in(&app, &stranger).await;

    let req = test::TestRequest::post()
        .uri("/api/tournaments")
        .cookie(org.clone())
        .set_json(new_tournament(json!([])))
        .to_request();
    let (_, body) = call(&app, req).await;
    let tid: Uuid = serde_json::from_value(body["id"].clone()).unwrap();

    let (status, body) = call(&app, set_status(tid, &org, "BRACKET_LOCKED")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Cannot move tournament from REGISTRATION_OPEN to BRACKET_LOCKED"
    );

    let (status, body) = call(&app, set_status(tid, &org, "REGISTRATION_LOCKED")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("at least 2"));

    let (status, _) = call(&app, set_status(tid, &other, "REGISTRATION_LOCKED")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri(&format!("/api/tournaments/{tid}/status"))
        .set_json(json!({ "status": "REGISTRATION_LOCKED" }))
        .to_request();
    let (status, _) = call(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&app, set_status(Uuid::new_v4(), &org, "REGISTRATION_LOCKED")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let stored = store.tournaments.get(tid).await.unwrap();
    assert_eq!(stored.status.as_str(), "REGISTRATION_OPEN");
}

#[actix_web::test]
async fn scrim_request_notifies_and_delete_cascades() {
    let store = Arc::new(Store::new());
    let app = test_app!(store);
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let ac = sign_in(&app, &alice).await;
    let bc = sign_in(&app, &bob).await;
    let a = create_team(&app, &ac, "Alpha").await;
    let b = create_team(&app, &bc, "Bravo").await;

    let req = test::TestRequest::post()
        .uri("/api/scrims")
        .cookie(ac.clone())
        .set_json(json!({ "team_id": a.id, "scheduled_at": "2026-11-02T19:00:00Z" }))
        .to_request();
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let scrim: Scrim = serde_json::from_value(body).unwrap();
    assert_eq!(scrim.format, "BO1");
    assert_eq!(store.chats.count().await, 1);

    let req = test::TestRequest::post()
        .uri(&format!("/api/scrims/{}/requests", scrim.id))
        .cookie(bc.clone())
        .set_json(json!({ "team_id": b.id }))
        .to_request();
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let notes = store.notifications.find(|n| n.recipient == alice.id).await;
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].scrim, Some(scrim.id));

    let req = test::TestRequest::post()
        .uri(&format!("/api/scrims/{}/requests", scrim.id))
        .cookie(ac.clone())
        .set_json(json!({ "team_id": a.id }))
        .to_request();
    let (status, _) = call(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/scrims/{}", scrim.id))
        .cookie(bc)
        .to_request();
    let (status, _) = call(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/scrims/{}", scrim.id))
        .cookie(ac)
        .to_request();
    let (status, _) = call(&app, req).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(store.scrims.count().await, 0);
    assert_eq!(store.chats.count().await, 0);
    assert_eq!(store.notifications.count().await, 0);
}

#[actix_web::test]
async fn sweep_trigger() {
    let store = Arc::new(Store::new());
    let app = test_app!(store);
    let admin = register(&app, "admin").await;
    let alice = register(&app, "alice").await;
    let admin_cookie = sign_in(&app, &admin).await;
    let ac = sign_in(&app, &alice).await;
    let team = create_team(&app, &ac, "Alpha").await;

    let req = test::TestRequest::post()
        .uri("/api/admin/sweep")
        .cookie(ac.clone())
        .to_request();
    let (status, _) = call(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // leave the team ownerless without going through the API
    store.users.delete(alice.id).await;

    let req = test::TestRequest::post()
        .uri("/api/admin/sweep?verbose=true")
        .cookie(admin_cookie.clone())
        .to_request();
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["dry_run"], true);
    assert_eq!(body["teams_deleted"], json!([team.id]));
    assert!(!body["details"].as_array().unwrap().is_empty());
    assert!(store.teams.exists(team.id).await);

    let req = test::TestRequest::post()
        .uri("/api/admin/sweep?dry_run=false")
        .cookie(admin_cookie)
        .to_request();
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["dry_run"], false);
    assert_eq!(body["teams_deleted"], json!([team.id]));
    assert!(!store.teams.exists(team.id).await);
}

#[actix_web::test]
async fn owner_adds_members_once() {
    let store = Arc::new(Store::new());
    let app = test_app!(store);
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let ac = sign_in(&app, &alice).await;
    let bc = sign_in(&app, &bob).await;
    let team = create_team(&app, &ac, "Alpha").await;

    let add = |cookie: &Cookie<'static>| {
        test::TestRequest::post()
            .uri(&format!("/api/teams/{}/members", team.id))
            .cookie(cookie.clone())
            .set_json(json!({ "user_id": bob.id }))
            .to_request()
    };

    let (status, _) = call(&app, add(&bc)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    for _ in 0..2 {
        let (status, body) = call(&app, add(&ac)).await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }
    let stored = store.teams.get(team.id).await.unwrap();
    assert_eq!(stored.members, vec![alice.id, bob.id]);
    assert!(stored.has_member(bob.id));
    assert_eq!(store.users.get(bob.id).await.unwrap().teams, vec![team.id]);
}

#[actix_web::test]
async fn user_can_only_delete_themself_unless_admin() {
    let store = Arc::new(Store::new());
    let app = test_app!(store);
    let admin = register(&app, "admin").await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let ac = sign_in(&app, &alice).await;
    let admin_cookie = sign_in(&app, &admin).await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/users/{}", bob.id))
        .cookie(ac.clone())
        .to_request();
    let (status, _) = call(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/users/{}", bob.id))
        .cookie(admin_cookie)
        .to_request();
    let (status, _) = call(&app, req).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/users/{}", alice.id))
        .cookie(ac)
        .to_request();
    let (status, _) = call(&app, req).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(store.users.count().await, 1);
}
