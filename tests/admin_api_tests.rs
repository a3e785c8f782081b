mod test_utils;

use std::time::Duration;

use reqwest::{redirect::Policy, StatusCode};
use serde_json::{json, Value};
use test_utils::*;

fn admin_gateway() -> InMemoryGateway {
    InMemoryGateway::with_admin(ADMIN_EMAIL, ADMIN_PASSWORD)
}

#[actix_rt::test]
async fn admin_routes_require_a_session() {
    let app = TestApp::spawn(admin_gateway()).await;

    for path in ["/admin/outputs", "/admin/sliders", "/admin/session", "/admin/health"] {
        let response = app.client.get(app.url(path)).send().await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{path}");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["redirect"], "/admin/login");
    }
}

#[actix_rt::test]
async fn unknown_token_is_rejected() {
    let app = TestApp::spawn(admin_gateway()).await;

    let response = app.admin_get("/admin/outputs", "token-forged").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn wrong_password_is_unauthorized() {
    let app = TestApp::spawn(admin_gateway()).await;

    let response = app.login(ADMIN_EMAIL, "nope").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("Invalid login credentials"));
}

#[actix_rt::test]
async fn malformed_email_fails_validation() {
    let app = TestApp::spawn(admin_gateway()).await;

    let response = app.login("not-an-email", ADMIN_PASSWORD).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!app.gateway.calls().iter().any(|c| c == "auth:sign_in"));
}

#[actix_rt::test]
async fn login_sets_the_session_cookie_and_points_at_outputs() {
    let app = TestApp::spawn(admin_gateway()).await;

    let response = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(&format!("{}=", app.config.session_cookie_name)))
        .expect("session cookie missing")
        .to_string();
    assert!(cookie.contains("HttpOnly"));

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["redirect"], "/admin/outputs");
    assert_eq!(body["user"]["email"], ADMIN_EMAIL);
}

#[actix_rt::test]
async fn admin_index_redirects_to_outputs() {
    let app = TestApp::spawn(admin_gateway()).await;
    let token = app.login_admin().await;
    let client = reqwest::Client::builder().redirect(Policy::none()).build().unwrap();

    let response = client.get(app.url("/admin")).bearer_auth(&token).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()["location"], "/admin/outputs");
}

#[actix_rt::test]
async fn create_list_and_delete_an_output() {
    let gateway = admin_gateway();
    gateway.seed("outputs", vec![output_row("Poster", "김소연")]);
    let app = TestApp::spawn(gateway).await;
    let token = app.login_admin().await;

    let listing: Value = app.admin_get("/admin/outputs", &token).await.json().await.unwrap();
    assert_eq!(listing["items"].as_array().unwrap().len(), 1);
    assert_eq!(listing["form"]["mode"], "listing");

    let draft = app.admin_post("/admin/outputs/draft", &token).await;
    assert_eq!(draft.status(), StatusCode::OK);

    let patched = app
        .admin_patch("/admin/outputs/draft", &token, &json!({
            "title": "Risograph Zine",
            "image_url": "https://cdn.test/zine.jpg",
            "author": "박지호"
        }))
        .await;
    assert_eq!(patched.status(), StatusCode::OK);

    let submitted: Value = app.admin_post("/admin/outputs/draft/submit", &token).await.json().await.unwrap();
    assert_eq!(submitted["outcome"], "created");
    assert_eq!(submitted["state"]["form"]["mode"], "listing");
    let items = submitted["state"]["items"].as_array().unwrap().clone();
    assert_eq!(items.len(), 2);

    let new_id = items
        .iter()
        .find(|item| item["title"] == "Risograph Zine")
        .and_then(|item| item["id"].as_i64())
        .unwrap();

    let declined: Value = app
        .admin_delete(&format!("/admin/outputs/{new_id}"), &token)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(declined["outcome"], "declined");
    assert_eq!(app.gateway.rows("outputs").len(), 2);

    let deleted: Value = app
        .admin_delete(&format!("/admin/outputs/{new_id}?confirm=true"), &token)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(deleted["outcome"], "deleted");
    assert_eq!(deleted["state"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(app.gateway.rows("outputs").len(), 1);
}

#[actix_rt::test]
async fn submitting_an_incomplete_slide_reports_field_errors() {
    let app = TestApp::spawn(admin_gateway()).await;
    let token = app.login_admin().await;

    app.admin_post("/admin/sliders/draft", &token).await;
    let response = app.admin_post("/admin/sliders/draft/submit", &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!app.gateway.calls().iter().any(|c| c.starts_with("insert:")));

    let state: Value = app.admin_get("/admin/sliders/state", &token).await.json().await.unwrap();
    assert_eq!(state["form"]["mode"], "editing");
}

#[actix_rt::test]
async fn unknown_patch_fields_are_rejected() {
    let app = TestApp::spawn(admin_gateway()).await;
    let token = app.login_admin().await;
    app.admin_post("/admin/sliders/draft", &token).await;

    let response = app
        .admin_patch("/admin/sliders/draft", &token, &json!({ "colour": "red" }))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn editing_without_a_loaded_row_is_not_found() {
    let app = TestApp::spawn(admin_gateway()).await;
    let token = app.login_admin().await;

    let response = app.admin_post("/admin/outputs/77/edit", &token).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn logout_ends_the_session_and_discards_its_desk() {
    let app = TestApp::spawn(admin_gateway()).await;
    let token = app.login_admin().await;

    app.admin_get("/admin/outputs", &token).await;
    assert_eq!(app.state.workspace.len(), 1);

    let response = app.admin_post("/admin/logout", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["redirect"], "/admin/login");

    let mut attempts = 0;
    while !app.state.workspace.is_empty() && attempts < 100 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        attempts += 1;
    }
    assert!(app.state.workspace.is_empty());

    let after = app.admin_get("/admin/outputs", &token).await;
    assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn public_pages_stay_open() {
    let gateway = admin_gateway();
    gateway.seed("outputs", vec![output_row("Poster", "김소연"), output_row("Zine", "박지호")]);
    let app = TestApp::spawn(gateway).await;

    let grid: Value = app
        .client
        .get(app.url("/output?author=%EA%B9%80%EC%86%8C%EC%97%B0"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(grid["count"], "01");
    assert_eq!(grid["source"], "remote");

    let nav: Value = app.client.get(app.url("/nav")).send().await.unwrap().json().await.unwrap();
    assert_eq!(nav["members"].as_array().unwrap().len(), 13);

    let slider = app.client.get(app.url("/slider")).send().await.unwrap();
    assert_eq!(slider.status(), StatusCode::OK);
    let frame: Value = slider.json().await.unwrap();
    assert_eq!(frame["slides"].as_array().unwrap().len(), 10);

    let missing = app.client.get(app.url("/work/999")).send().await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let unknown = app.client.get(app.url("/nowhere")).send().await.unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}
