use std::sync::Arc;

use bugspot_server::auth::{AuthConfig, JwtAuthorizer, SharedAuthorizer};
use bugspot_server::import::{ImportConfig, ImportResult};
use bugspot_server::models::{Course, DataResponse};
use bugspot_server::routes::admin::import_problems;
use bugspot_server::routes::content::list_courses;
use bugspot_server::store::InMemoryStore;
use bugspot_server::test_support::TestRocketBuilder;
use rocket::http::{Header, Status};
use rocket::local::asynchronous::Client;
use rocket::routes;

const HEADER: &str = "name,description,courseName,lectureName,codeSnippet,correctLines,hint,reasons\n";
const FIZZBUZZ: &str = "FizzBuzz,Simple,Intro Course,Week 1,for i in range(100):,\"1,2\",Think modulo,\"{\"\"1\"\":\"\"Div by 3\"\",\"\"2\"\":\"\"Div by 5\"\"}\"\n";

fn jwt_authorizer() -> (JwtAuthorizer, String) {
    let config = AuthConfig {
        issuer: "https://bugspot.test".into(),
        audience: "bugspot-api".into(),
        access_token_ttl_secs: 900,
        jwt_secret: "import-route-secret".into(),
        jwt_kid: None,
        content_role: "admin".into(),
    };
    let authorizer = JwtAuthorizer::new(&config).expect("authorizer");
    let token = authorizer
        .jwt_service()
        .issue_access_token("admin@example.com", "admin", &[])
        .expect("issue admin token")
        .token;
    (authorizer, token)
}

async fn client(store: Arc<InMemoryStore>, sheet: String, authorizer: SharedAuthorizer) -> Client {
    TestRocketBuilder::new()
        .manage_store(store)
        .manage_authorizer(authorizer)
        .with_sheet(sheet)
        .mount_api_routes(routes![import_problems, list_courses])
        .async_client()
        .await
}

#[rocket::async_test]
async fn import_reports_created_entities() {
    let store = Arc::new(InMemoryStore::new());
    let (authorizer, token) = jwt_authorizer();
    let client = client(
        store.clone(),
        format!("{HEADER}{FIZZBUZZ}"),
        Arc::new(authorizer),
    )
    .await;

    let response = client
        .post("/api/v1/admin/import")
        .header(Header::new("Authorization", format!("Bearer {token}")))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let body: ImportResult = response.into_json().await.expect("JSON response");
    assert!(body.success);
    let details = body.details.expect("details present");
    assert_eq!(details.imported, 1);
    assert_eq!(details.updated, 0);
    assert_eq!(details.skipped, 0);
    assert_eq!(details.courses_created, 1);
    assert_eq!(details.categories_created, 1);
    assert!(details.errors.is_empty());

    let courses = client
        .get("/api/v1/admin/courses")
        .header(Header::new("Authorization", format!("Bearer {token}")))
        .dispatch()
        .await;
    assert_eq!(courses.status(), Status::Ok);
    let courses: DataResponse<Vec<Course>> = courses.into_json().await.expect("JSON response");
    assert_eq!(courses.data.len(), 1);
    assert_eq!(courses.data[0].name, "Intro Course");
}

#[rocket::async_test]
async fn import_without_token_is_rejected() {
    let store = Arc::new(InMemoryStore::new());
    let (authorizer, _) = jwt_authorizer();
    let client = client(
        store.clone(),
        format!("{HEADER}{FIZZBUZZ}"),
        Arc::new(authorizer),
    )
    .await;

    let response = client.post("/api/v1/admin/import").dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);

    let body: ImportResult = response.into_json().await.expect("JSON response");
    assert!(!body.success);
    assert_eq!(body.error.as_deref(), Some("Invalid authentication"));
    assert!(body.details.is_none());
    assert!(store.take_mutations().await.is_empty());

    let courses = client.get("/api/v1/admin/courses").dispatch().await;
    assert_eq!(courses.status(), Status::Unauthorized);
}

#[rocket::async_test]
async fn missing_column_is_unprocessable() {
    let store = Arc::new(InMemoryStore::new());
    let sheet = "name,description,lectureName,codeSnippet,correctLines,hint,reasons\nA,B,C,D,1,F,{}\n";
    let client = client(store.clone(), sheet.to_string(), Arc::new(|_: Option<&str>| true)).await;

    let response = client.post("/api/v1/admin/import").dispatch().await;
    assert_eq!(response.status(), Status::UnprocessableEntity);

    let body: ImportResult = response.into_json().await.expect("JSON response");
    assert_eq!(body.error.as_deref(), Some("Missing required column: courseName"));
    assert!(store.take_mutations().await.is_empty());
}

#[rocket::async_test]
async fn unconfigured_sheet_is_unavailable() {
    let client = TestRocketBuilder::new()
        .manage_store(Arc::new(InMemoryStore::new()))
        .manage_import_config(ImportConfig::default())
        .mount_api_routes(routes![import_problems])
        .async_client()
        .await;

    let response = client.post("/api/v1/admin/import").dispatch().await;
    assert_eq!(response.status(), Status::ServiceUnavailable);

    let body: ImportResult = response.into_json().await.expect("JSON response");
    assert_eq!(body.error.as_deref(), Some("Spreadsheet ID not configured"));
}

#[rocket::async_test]
async fn rerunning_a_sheet_updates_in_place() {
    let store = Arc::new(InMemoryStore::new());
    let sheet = format!("{HEADER}{FIZZBUZZ}Second,,Intro Course,Week 1,x = 1,1,Look,{{}}\n");
    let client = client(store.clone(), sheet, Arc::new(|_: Option<&str>| true)).await;

    let first: ImportResult = client
        .post("/api/v1/admin/import")
        .dispatch()
        .await
        .into_json()
        .await
        .expect("JSON response");
    let second: ImportResult = client
        .post("/api/v1/admin/import")
        .dispatch()
        .await
        .into_json()
        .await
        .expect("JSON response");

    assert_eq!(first.details.as_ref().map(|d| d.imported), Some(2));
    let second = second.details.expect("details present");
    assert_eq!(second.imported, 0);
    assert_eq!(second.updated, 2);
    assert_eq!(second.courses_created, 0);
    assert_eq!(store.problems().await.len(), 2);
}

#[rocket::async_test]
async fn unterminated_quote_is_unprocessable() {
    let store = Arc::new(InMemoryStore::new());
    let sheet = format!("{HEADER}A,d,C,L,\"x = 1,1,h,{{}}\nB,d,C,L,y,1,h,{{}}\n");
    let client = client(store.clone(), sheet, Arc::new(|_: Option<&str>| true)).await;

    let response = client.post("/api/v1/admin/import").dispatch().await;
    assert_eq!(response.status(), Status::UnprocessableEntity);

    let body: ImportResult = response.into_json().await.expect("JSON response");
    assert_eq!(
        body.error.as_deref(),
        Some("Failed to parse CSV: unterminated quoted field starting on line 2")
    );
    assert!(store.take_mutations().await.is_empty());
}
