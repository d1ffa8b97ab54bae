use std::sync::Arc;

use chrono::Duration as ChronoDuration;
use reqwest::StatusCode;
use serde_json::{Value, json};

use agencyhub_api::app::{build_router, services::AppServices};
use agencyhub_api::session::CookieSessionStore;
use agencyhub_auth::{Role, SessionSigner};
use agencyhub_core::AgencyId;
use agencyhub_infra::{UserAccount, UserDirectory};

const COOKIE: &str = "agencyhub_session";
const PASSWORD: &str = "correct horse battery staple";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    agency_a: AgencyId,
    agency_b: AgencyId,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let agency_a = AgencyId::new();
        let agency_b = AgencyId::new();

        let services = AppServices::in_memory();
        for (email, role, agency) in [
            ("root@platform.test", Role::SuperAdmin, None),
            ("admin@a.test", Role::Admin, Some(agency_a)),
            ("staff@a.test", Role::Staff, Some(agency_a)),
            ("admin@b.test", Role::Admin, Some(agency_b)),
        ] {
            let account = UserAccount::new(email, PASSWORD, role, agency).expect("hash password");
            services.users.insert(account).expect("seed user");
        }

        let sessions = CookieSessionStore::new(
            SessionSigner::new(b"black-box-test-secret-0123456789", ChronoDuration::hours(1)),
            COOKIE,
            false,
        );

        // Same router as prod, bound to an ephemeral port.
        let app = build_router(Arc::new(services), Arc::new(sessions));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            client: reqwest::Client::new(),
            agency_a,
            agency_b,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Log in and return the `Cookie` header value to send back.
    async fn login(&self, email: &str) -> String {
        let res = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": PASSWORD }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK, "login failed for {email}");

        let set_cookie = res
            .headers()
            .get(reqwest::header::SET_COOKIE)
            .expect("login sets a cookie")
            .to_str()
            .unwrap()
            .to_string();
        assert!(set_cookie.contains("HttpOnly"));

        set_cookie.split(';').next().unwrap().to_string()
    }

    async fn get(&self, path: &str, cookie: Option<&str>) -> reqwest::Response {
        let mut req = self.client.get(self.url(path));
        if let Some(cookie) = cookie {
            req = req.header(reqwest::header::COOKIE, cookie);
        }
        req.send().await.unwrap()
    }

    async fn post(&self, path: &str, cookie: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .header(reqwest::header::COOKIE, cookie)
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn create_client(&self, cookie: &str, name: &str, agency_id: Option<AgencyId>) -> Value {
        let mut body = json!({ "name": name, "email": "billing@client.test" });
        if let Some(agency_id) = agency_id {
            body["agency_id"] = json!(agency_id);
        }
        let res = self.post("/clients", cookie, body).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        res.json().await.unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn names(body: &Value) -> Vec<String> {
    let mut names: Vec<String> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn health_is_public() {
    let server = TestServer::spawn().await;
    let res = server.get("/health", None).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let server = TestServer::spawn().await;

    for path in ["/whoami", "/clients", "/projects", "/invoices", "/reminders", "/admin/rbac/roles"] {
        let res = server.get(path, None).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{path}");
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["error"], "unauthenticated");
    }

    // A forged cookie is the same as no cookie.
    let res = server.get("/clients", Some(&format!("{COOKIE}=not-a-token"))).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // The gate runs before body parsing.
    let res = server
        .client
        .post(server.url("/invoices"))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let server = TestServer::spawn().await;
    let res = server
        .client
        .post(server.url("/auth/login"))
        .json(&json!({ "email": "admin@a.test", "password": "nope" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().get(reqwest::header::SET_COOKIE).is_none());
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_credentials");
}

#[tokio::test]
async fn whoami_reports_role_and_scope() {
    let server = TestServer::spawn().await;

    let cookie = server.login("ADMIN@a.test").await;
    let body: Value = server.get("/whoami", Some(&cookie)).await.json().await.unwrap();
    assert_eq!(body["role"], "admin");
    assert_eq!(body["agency_id"], json!(server.agency_a));
    assert_eq!(body["scope"]["kind"], "agency");

    let cookie = server.login("root@platform.test").await;
    let body: Value = server.get("/whoami", Some(&cookie)).await.json().await.unwrap();
    assert_eq!(body["role"], "super_admin");
    assert!(body.get("agency_id").is_none());
    assert_eq!(body["scope"]["kind"], "global");
}

#[tokio::test]
async fn bearer_token_from_login_body_is_accepted() {
    let server = TestServer::spawn().await;
    let res = server
        .client
        .post(server.url("/auth/login"))
        .json(&json!({ "email": "staff@a.test", "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    let token = body["token"].as_str().unwrap();
    assert!(body["session"]["expires_at"].is_string());

    let res = server
        .client
        .get(server.url("/whoami"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn logout_clears_the_cookie() {
    let server = TestServer::spawn().await;
    let cookie = server.login("staff@a.test").await;

    let res = server
        .client
        .post(server.url("/auth/logout"))
        .header(reqwest::header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let set_cookie = res.headers().get(reqwest::header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.starts_with(&format!("{COOKIE}=;")));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn staff_cannot_issue_invoices() {
    let server = TestServer::spawn().await;
    let admin = server.login("admin@a.test").await;
    let staff = server.login("staff@a.test").await;

    let client = server.create_client(&admin, "Acme", None).await;

    let res = server
        .post(
            "/invoices",
            &staff,
            json!({ "client_id": client["id"], "number": "INV-1", "amount_cents": 1000 }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "forbidden");

    // Staff can still read invoices and manage clients.
    assert_eq!(server.get("/invoices", Some(&staff)).await.status(), StatusCode::OK);
    server.create_client(&staff, "Staff Client", None).await;

    let res = server
        .post(
            "/invoices",
            &admin,
            json!({ "client_id": client["id"], "number": "INV-1", "amount_cents": 1000 }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn agencies_cannot_see_each_others_records() {
    let server = TestServer::spawn().await;
    let admin_a = server.login("admin@a.test").await;
    let admin_b = server.login("admin@b.test").await;

    let a_client = server.create_client(&admin_a, "Alpha", None).await;
    server.create_client(&admin_b, "Bravo", None).await;
    assert_eq!(a_client["agency_id"], json!(server.agency_a));

    let listed: Value = server.get("/clients", Some(&admin_a)).await.json().await.unwrap();
    assert_eq!(names(&listed), vec!["Alpha"]);
    let listed: Value = server.get("/clients", Some(&admin_b)).await.json().await.unwrap();
    assert_eq!(names(&listed), vec!["Bravo"]);

    let path = format!("/clients/{}", a_client["id"].as_str().unwrap());
    assert_eq!(server.get(&path, Some(&admin_b)).await.status(), StatusCode::NOT_FOUND);

    let res = server
        .client
        .patch(server.url(&path))
        .header(reqwest::header::COOKIE, &admin_b)
        .json(&json!({ "name": "Hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server
        .client
        .delete(server.url(&path))
        .header(reqwest::header::COOKIE, &admin_b)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Still intact for its owner.
    let body: Value = server.get(&path, Some(&admin_a)).await.json().await.unwrap();
    assert_eq!(body["name"], "Alpha");

    // Naming another agency on create is refused.
    let res = server
        .post(
            "/clients",
            &admin_a,
            json!({ "name": "Sneaky", "email": "x@y.test", "agency_id": server.agency_b }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "tenant_isolation");

    // Linking a project to another agency's client is refused.
    let b_clients: Value = server.get("/clients", Some(&admin_b)).await.json().await.unwrap();
    let b_client_id = b_clients["items"][0]["id"].clone();
    let res = server
        .post("/projects", &admin_a, json!({ "client_id": b_client_id, "name": "Site" }))
        .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn super_admin_sees_every_agency() {
    let server = TestServer::spawn().await;
    let admin_a = server.login("admin@a.test").await;
    let admin_b = server.login("admin@b.test").await;
    let root = server.login("root@platform.test").await;

    server.create_client(&admin_a, "Alpha", None).await;
    server.create_client(&admin_b, "Bravo", None).await;

    let listed: Value = server.get("/clients", Some(&root)).await.json().await.unwrap();
    assert_eq!(names(&listed), vec!["Alpha", "Bravo"]);

    // Creating without an agency is refused; naming one is fine.
    let res = server
        .post("/clients", &root, json!({ "name": "Nowhere", "email": "n@w.test" }))
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let created = server.create_client(&root, "Charlie", Some(server.agency_b)).await;
    assert_eq!(created["agency_id"], json!(server.agency_b));

    let listed: Value = server.get("/clients", Some(&admin_b)).await.json().await.unwrap();
    assert_eq!(names(&listed), vec!["Bravo", "Charlie"]);
}

#[tokio::test]
async fn rbac_endpoints() {
    let server = TestServer::spawn().await;
    let admin = server.login("admin@a.test").await;
    let staff = server.login("staff@a.test").await;

    let res = server.get("/admin/rbac/roles", Some(&admin)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["roles"].as_array().unwrap().len(), 3);

    assert_eq!(server.get("/admin/rbac/roles", Some(&staff)).await.status(), StatusCode::FORBIDDEN);

    let res = server
        .get("/admin/rbac/explain?permission=canManageInvoices", Some(&staff))
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["explanation"]["granted"], false);

    let res = server
        .get("/admin/rbac/explain?permission=canFlyRockets", Some(&staff))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admins_create_users_in_their_own_agency() {
    let server = TestServer::spawn().await;
    let admin = server.login("admin@a.test").await;
    let staff = server.login("staff@a.test").await;
    let root = server.login("root@platform.test").await;

    let res = server
        .post(
            "/admin/users",
            &admin,
            json!({ "email": "new@a.test", "password": PASSWORD, "role": "staff" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["agency_id"], json!(server.agency_a));
    assert!(created.get("password_hash").is_none());

    let newcomer = server.login("new@a.test").await;
    let me: Value = server.get("/whoami", Some(&newcomer)).await.json().await.unwrap();
    assert_eq!(me["role"], "staff");

    let res = server
        .post(
            "/admin/users",
            &admin,
            json!({ "email": "New@A.test", "password": PASSWORD, "role": "staff" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = server
        .post(
            "/admin/users",
            &admin,
            json!({
                "email": "spy@a.test",
                "password": PASSWORD,
                "role": "admin",
                "agency_id": server.agency_b,
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "tenant_isolation");

    let res = server
        .post(
            "/admin/users",
            &admin,
            json!({ "email": "boss@a.test", "password": PASSWORD, "role": "super_admin" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server
        .post(
            "/admin/users",
            &staff,
            json!({ "email": "other@a.test", "password": PASSWORD, "role": "staff" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server
        .post(
            "/admin/users",
            &admin,
            json!({ "email": "weak@a.test", "password": "short", "role": "staff" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // A super-admin must say which agency a tenant-bound account joins.
    let res = server
        .post(
            "/admin/users",
            &root,
            json!({ "email": "admin2@b.test", "password": PASSWORD, "role": "admin" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server
        .post(
            "/admin/users",
            &root,
            json!({
                "email": "admin2@b.test",
                "password": PASSWORD,
                "role": "admin",
                "agency_id": server.agency_b,
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["agency_id"], json!(server.agency_b));
}
