use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use hackboard_api::build_router;
use hackboard_domain::{
    admin::{AdminRepository, NewAdmin},
    app::construct_app,
};
use hackboard_persistence_sqlite::{
    admins::SqliteAdminRepository, announcements::SqliteAnnouncementRepository, create_memory_pool,
    scores::SqliteScoreRepository, teams::SqliteTeamRepository, users::SqliteUserRepository,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Fresh in-memory app with a single seeded admin account (`root` / `adminpw`).
async fn test_app() -> Router {
    let pool = create_memory_pool().await;

    let admins = SqliteAdminRepository::new(pool.clone());
    admins
        .create_admin(&NewAdmin {
            username: "root".to_string(),
            password_hash: bcrypt::hash("adminpw", bcrypt::DEFAULT_COST).unwrap(),
        })
        .await
        .unwrap();

    let app = construct_app(
        Arc::new(Box::new(SqliteUserRepository::new(pool.clone()))),
        Arc::new(Box::new(admins)),
        Arc::new(Box::new(SqliteTeamRepository::new(pool.clone()))),
        Arc::new(Box::new(SqliteScoreRepository::new(pool.clone()))),
        Arc::new(Box::new(SqliteAnnouncementRepository::new(pool))),
    );
    build_router(app)
}

fn get(path: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(path: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn session_cookie(res: &Response<Body>) -> String {
    res.headers()
        .get(header::SET_COOKIE)
        .expect("no session cookie set")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

fn location(res: &Response<Body>) -> &str {
    res.headers()
        .get(header::LOCATION)
        .expect("no redirect location")
        .to_str()
        .unwrap()
}

async fn body_json(res: Response<Body>) -> serde_json::Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Registers a user, logs them in and returns their session cookie.
async fn login_user(router: &Router, email: &str, name: &str) -> String {
    let res = router
        .clone()
        .oneshot(post_form(
            "/register",
            &format!("email={}&full_name={}&password=password", email, name),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");
    let cookie = session_cookie(&res);

    let res = router
        .clone()
        .oneshot(post_form(
            "/login",
            &format!("email={}&password=password", email),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/dashboard");

    // Drain the login flash so later assertions see only their own.
    let res = router
        .clone()
        .oneshot(get("/dashboard", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    cookie
}

/// Logs in the seeded admin and returns the admin session cookie.
async fn login_admin(router: &Router) -> String {
    let res = router
        .clone()
        .oneshot(get("/admin/login", None))
        .await
        .unwrap();
    let cookie = session_cookie(&res);

    let res = router
        .clone()
        .oneshot(post_form(
            "/admin/login",
            "username=root&password=adminpw",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/admin/dashboard");

    let res = router
        .clone()
        .oneshot(get("/admin/dashboard", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    cookie
}

#[tokio::test]
async fn full_user_and_admin_flow() {
    let router = test_app().await;

    let alice = login_user(&router, "alice%40example.com", "Alice").await;

    let res = router
        .clone()
        .oneshot(get("/dashboard", Some(&alice)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let dashboard = body_json(res).await;
    assert_eq!(dashboard["user"]["email"], "alice@example.com");

    let res = router
        .clone()
        .oneshot(post_form("/team/create", "name=Alpha", Some(&alice)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/team/1");

    // A new team starts on the leaderboard with zero points.
    let res = router
        .clone()
        .oneshot(get("/leaderboard", Some(&alice)))
        .await
        .unwrap();
    let board = body_json(res).await;
    assert_eq!(board["leaderboard"][0]["name"], "Alpha");
    assert_eq!(board["leaderboard"][0]["points"], 0);

    // The team page shows the leader as its only member.
    let res = router
        .clone()
        .oneshot(get("/team/1", Some(&alice)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let team = body_json(res).await;
    assert_eq!(team["name"], "Alpha");
    assert_eq!(team["members"].as_array().unwrap().len(), 1);
    assert_eq!(team["points"], 0);

    // Second team to make the leaderboard ordering observable.
    let bob = login_user(&router, "bob%40example.com", "Bob").await;
    let res = router
        .clone()
        .oneshot(post_form("/team/create", "name=Beta", Some(&bob)))
        .await
        .unwrap();
    assert_eq!(location(&res), "/team/2");

    let admin = login_admin(&router).await;
    for (body, expected) in [
        ("team_id=1&points=50", "/admin/dashboard"),
        ("team_id=2&points=120", "/admin/dashboard"),
    ] {
        let res = router
            .clone()
            .oneshot(post_form("/admin/update_score", body, Some(&admin)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), expected);
    }

    let res = router
        .clone()
        .oneshot(get("/leaderboard", Some(&alice)))
        .await
        .unwrap();
    let board = body_json(res).await;
    let rows = board["leaderboard"].as_array().unwrap();
    assert_eq!(rows[0]["name"], "Beta");
    assert_eq!(rows[0]["points"], 120);
    assert_eq!(rows[1]["name"], "Alpha");
    assert_eq!(rows[1]["points"], 50);

    // Overwriting a score replaces it rather than adding to it.
    let res = router
        .clone()
        .oneshot(post_form(
            "/admin/update_score",
            "team_id=2&points=10",
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let res = router
        .clone()
        .oneshot(get("/leaderboard", Some(&alice)))
        .await
        .unwrap();
    let board = body_json(res).await;
    assert_eq!(board["leaderboard"][0]["name"], "Alpha");
    assert_eq!(board["leaderboard"][1]["points"], 10);
}

#[tokio::test]
async fn member_management_goes_through_the_leader() {
    let router = test_app().await;

    let alice = login_user(&router, "alice%40example.com", "Alice").await;
    let bob = login_user(&router, "bob%40example.com", "Bob").await;

    let res = router
        .clone()
        .oneshot(post_form("/team/create", "name=Alpha", Some(&alice)))
        .await
        .unwrap();
    assert_eq!(location(&res), "/team/1");
    let res = router
        .clone()
        .oneshot(get("/team/1", Some(&alice)))
        .await
        .unwrap();
    let team = body_json(res).await;
    assert_eq!(team["flashes"][0]["message"], "Team created.");

    // Only the leader may add members.
    let res = router
        .clone()
        .oneshot(post_form(
            "/team/1/add_member",
            "email=bob%40example.com",
            Some(&bob),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/team/1");
    let res = router
        .clone()
        .oneshot(get("/team/1", Some(&bob)))
        .await
        .unwrap();
    let team = body_json(res).await;
    assert_eq!(team["members"].as_array().unwrap().len(), 1);
    assert_eq!(
        team["flashes"][0]["message"],
        "Only team leader can add members."
    );

    let res = router
        .clone()
        .oneshot(post_form(
            "/team/1/add_member",
            "email=bob%40example.com",
            Some(&alice),
        ))
        .await
        .unwrap();
    assert_eq!(location(&res), "/team/1");
    let res = router
        .clone()
        .oneshot(get("/team/1", Some(&alice)))
        .await
        .unwrap();
    let team = body_json(res).await;
    assert_eq!(team["members"].as_array().unwrap().len(), 2);
    assert_eq!(team["flashes"][0]["message"], "Member added.");

    // Adding the same member again is a friendly no-op.
    let res = router
        .clone()
        .oneshot(post_form(
            "/team/1/add_member",
            "email=bob%40example.com",
            Some(&alice),
        ))
        .await
        .unwrap();
    assert_eq!(location(&res), "/team/1");
    let res = router
        .clone()
        .oneshot(get("/team/1", Some(&alice)))
        .await
        .unwrap();
    let team = body_json(res).await;
    assert_eq!(team["members"].as_array().unwrap().len(), 2);
    assert_eq!(team["flashes"][0]["category"], "info");
    assert_eq!(team["flashes"][0]["message"], "User already in team.");
}

#[tokio::test]
async fn gated_routes_redirect_to_the_matching_login() {
    let router = test_app().await;

    let res = router.clone().oneshot(get("/dashboard", None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");

    // A logged-in user is still not an admin.
    let alice = login_user(&router, "alice%40example.com", "Alice").await;
    let res = router
        .clone()
        .oneshot(get("/admin/dashboard", Some(&alice)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/admin/login");

    // The rejection leaves a flash behind for the login page to show.
    let res = router
        .clone()
        .oneshot(get("/admin/login", Some(&alice)))
        .await
        .unwrap();
    let page = body_json(res).await;
    assert_eq!(page["flashes"][0]["category"], "warning");
    assert_eq!(page["flashes"][0]["message"], "Admin login required.");
}

#[tokio::test]
async fn invalid_score_input_changes_nothing() {
    let router = test_app().await;

    let alice = login_user(&router, "alice%40example.com", "Alice").await;
    let res = router
        .clone()
        .oneshot(post_form("/team/create", "name=Alpha", Some(&alice)))
        .await
        .unwrap();
    assert_eq!(location(&res), "/team/1");

    let admin = login_admin(&router).await;
    let res = router
        .clone()
        .oneshot(post_form(
            "/admin/update_score",
            "team_id=1&points=abc",
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/admin/dashboard");

    let res = router
        .clone()
        .oneshot(get("/admin/dashboard", Some(&admin)))
        .await
        .unwrap();
    let dashboard = body_json(res).await;
    assert_eq!(dashboard["flashes"][0]["category"], "danger");
    assert_eq!(dashboard["flashes"][0]["message"], "Invalid points value.");

    // Scoring a team that does not exist is caught before the upsert.
    let res = router
        .clone()
        .oneshot(post_form(
            "/admin/update_score",
            "team_id=99&points=5",
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(location(&res), "/admin/dashboard");
    let res = router
        .clone()
        .oneshot(get("/admin/dashboard", Some(&admin)))
        .await
        .unwrap();
    let dashboard = body_json(res).await;
    assert_eq!(dashboard["flashes"][0]["message"], "Team not found.");

    let res = router
        .clone()
        .oneshot(get("/leaderboard", Some(&alice)))
        .await
        .unwrap();
    let board = body_json(res).await;
    assert_eq!(board["leaderboard"][0]["points"], 0);
}

#[tokio::test]
async fn duplicate_registration_bounces_back_with_a_flash() {
    let router = test_app().await;

    let res = router
        .clone()
        .oneshot(post_form(
            "/register",
            "email=alice%40example.com&full_name=Alice&password=password",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(location(&res), "/login");
    let cookie = session_cookie(&res);

    let res = router
        .clone()
        .oneshot(get("/login", Some(&cookie)))
        .await
        .unwrap();
    let page = body_json(res).await;
    assert_eq!(page["flashes"][0]["message"], "Account created. Please log in.");

    let res = router
        .clone()
        .oneshot(post_form(
            "/register",
            "email=alice%40example.com&full_name=Someone+Else&password=other",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/register");

    let res = router
        .clone()
        .oneshot(get("/register", Some(&cookie)))
        .await
        .unwrap();
    let page = body_json(res).await;
    assert_eq!(page["flashes"][0]["message"], "Email already registered.");

    // The original account still works.
    let res = router
        .clone()
        .oneshot(post_form(
            "/login",
            "email=alice%40example.com&password=password",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(location(&res), "/dashboard");
}

#[tokio::test]
async fn logout_keeps_the_session_for_the_farewell_flash() {
    let router = test_app().await;

    let alice = login_user(&router, "alice%40example.com", "Alice").await;

    let res = router
        .clone()
        .oneshot(get("/logout", Some(&alice)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");

    let res = router.clone().oneshot(get("/", Some(&alice))).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let home = body_json(res).await;
    assert_eq!(home["flashes"][0]["message"], "Logged out.");

    // The binding itself is gone.
    let res = router
        .clone()
        .oneshot(get("/dashboard", Some(&alice)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");
}

#[tokio::test]
async fn announcements_show_up_newest_first() {
    let router = test_app().await;
    let admin = login_admin(&router).await;

    for body in [
        "title=Kickoff&body=Welcome+everyone",
        "title=Lunch&body=Pizza+at+noon",
    ] {
        let res = router
            .clone()
            .oneshot(post_form("/admin/announce", body, Some(&admin)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), "/admin/dashboard");
    }

    let res = router.clone().oneshot(get("/", None)).await.unwrap();
    let home = body_json(res).await;
    let announcements = home["announcements"].as_array().unwrap();
    assert_eq!(announcements.len(), 2);
    assert_eq!(announcements[0]["title"], "Lunch");
    assert_eq!(announcements[1]["title"], "Kickoff");

    // An empty title never reaches the store.
    let res = router
        .clone()
        .oneshot(post_form("/admin/announce", "title=&body=oops", Some(&admin)))
        .await
        .unwrap();
    assert_eq!(location(&res), "/admin/dashboard");
    let res = router.clone().oneshot(get("/", None)).await.unwrap();
    let home = body_json(res).await;
    assert_eq!(home["announcements"].as_array().unwrap().len(), 2);
}
