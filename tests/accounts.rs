//! Account endpoint integration tests
//!
//! These run against a live Postgres database (DATABASE_URL) and are
//! ignored by default. The database is shared and the suite runs in
//! parallel, so every test creates its own records, uses unique names,
//! and never asserts absolute row counts.
//!
//! Run with: cargo test -- --ignored

use axum::http::StatusCode;
use axum::Router;
use serde_json::{json, Value};
use tower::util::ServiceExt;
use uuid::Uuid;

mod common;

/// POST a minimal valid account and return its stored record.
async fn create_account(app: &Router, name: &str) -> Value {
    let body = json!({
        "name": name,
        "email": "test@example.com",
        "phone_number": "555-1111"
    });

    let response = app
        .clone()
        .oneshot(common::json_request("POST", "/accounts", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    common::response_json(response).await
}

/// Create and immediately delete an account, yielding an id that is
/// guaranteed absent.
async fn absent_account_id(app: &Router) -> i64 {
    let account = create_account(app, &format!("ghost-{}", Uuid::new_v4())).await;
    let id = account["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(common::request("DELETE", &format!("/accounts/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    id
}

#[tokio::test]
#[ignore = "Requires a Postgres database via DATABASE_URL"]
async fn test_create_account() {
    let app = common::setup_app().await;

    let body = json!({
        "name": format!("John Doe {}", Uuid::new_v4()),
        "email": "john@example.com",
        "phone_number": "555-1111"
    });

    let response = app
        .clone()
        .oneshot(common::json_request("POST", "/accounts", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let location = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .expect("Location header missing");

    let account = common::response_json(response).await;
    let id = account["id"].as_i64().expect("id is an integer");
    assert!(id > 0);
    assert_eq!(location, format!("/accounts/{id}"));

    assert_eq!(account["name"], body["name"]);
    assert_eq!(account["email"], "john@example.com");
    assert_eq!(account["addresses"], json!([]));

    // date_joined defaults to the day of creation
    let date = account["date_joined"].as_str().expect("date_joined is set");
    assert!(chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok());
}

#[tokio::test]
#[ignore = "Requires a Postgres database via DATABASE_URL"]
async fn test_create_account_with_explicit_date() {
    let app = common::setup_app().await;

    let body = json!({
        "name": format!("Jane Roe {}", Uuid::new_v4()),
        "email": "jane@example.com",
        "phone_number": "555-2222",
        "date_joined": "2020-06-15"
    });

    let response = app
        .oneshot(common::json_request("POST", "/accounts", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let account = common::response_json(response).await;
    assert_eq!(account["date_joined"], "2020-06-15");
}

#[tokio::test]
#[ignore = "Requires a Postgres database via DATABASE_URL"]
async fn test_create_account_with_nested_addresses() {
    let app = common::setup_app().await;

    let body = json!({
        "name": format!("Nested {}", Uuid::new_v4()),
        "email": "nested@example.com",
        "phone_number": "555-3333",
        "addresses": [
            {
                "name": "home",
                "street": "1 Main St",
                "city": "New York",
                "state": "NY",
                "postal_code": "10001"
            },
            {
                "name": "work",
                "street": "200 Broadway",
                "city": "New York",
                "state": "NY",
                "postal_code": "10038"
            }
        ]
    });

    let response = app
        .oneshot(common::json_request("POST", "/accounts", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let account = common::response_json(response).await;
    let id = account["id"].as_i64().unwrap();
    let addresses = account["addresses"].as_array().unwrap();
    assert_eq!(addresses.len(), 2);
    for address in addresses {
        assert_eq!(address["account_id"].as_i64(), Some(id));
        assert!(address["id"].as_i64().unwrap() > 0);
    }
    assert_eq!(addresses[0]["name"], "home");
    assert_eq!(addresses[1]["name"], "work");
}

#[tokio::test]
#[ignore = "Requires a Postgres database via DATABASE_URL"]
async fn test_create_account_ignores_supplied_id() {
    let app = common::setup_app().await;

    let body = json!({
        "id": 999_999_999,
        "name": format!("Impostor {}", Uuid::new_v4()),
        "email": "impostor@example.com",
        "phone_number": "555-4444"
    });

    let response = app
        .oneshot(common::json_request("POST", "/accounts", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let account = common::response_json(response).await;
    assert_ne!(account["id"].as_i64(), Some(999_999_999));
}

#[tokio::test]
#[ignore = "Requires a Postgres database via DATABASE_URL"]
async fn test_get_account_round_trip() {
    let app = common::setup_app().await;

    let created = create_account(&app, &format!("Round Trip {}", Uuid::new_v4())).await;
    let id = created["id"].as_i64().unwrap();

    let response = app
        .oneshot(common::request("GET", &format!("/accounts/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let fetched = common::response_json(response).await;
    assert_eq!(fetched, created);
}

#[tokio::test]
#[ignore = "Requires a Postgres database via DATABASE_URL"]
async fn test_get_account_not_found() {
    let app = common::setup_app().await;
    let id = absent_account_id(&app).await;

    let response = app
        .oneshot(common::request("GET", &format!("/accounts/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = common::response_json(response).await;
    assert_eq!(json["error_code"], "account_not_found");
    assert_eq!(
        json["error"],
        format!("Account with id '{id}' could not be found")
    );
}

#[tokio::test]
#[ignore = "Requires a Postgres database via DATABASE_URL"]
async fn test_list_accounts_contains_created() {
    let app = common::setup_app().await;

    let first = create_account(&app, &format!("List A {}", Uuid::new_v4())).await;
    let second = create_account(&app, &format!("List B {}", Uuid::new_v4())).await;

    let response = app.oneshot(common::request("GET", "/accounts")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let accounts = common::response_json(response).await;
    let ids: Vec<i64> = accounts
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_i64().unwrap())
        .collect();
    assert!(ids.contains(&first["id"].as_i64().unwrap()));
    assert!(ids.contains(&second["id"].as_i64().unwrap()));
}

#[tokio::test]
#[ignore = "Requires a Postgres database via DATABASE_URL"]
async fn test_list_accounts_name_filter() {
    let app = common::setup_app().await;

    // URL-safe unique name shared by two accounts
    let name = format!("filter-{}", Uuid::new_v4());
    let first = create_account(&app, &name).await;
    let second = create_account(&app, &name).await;
    let other = create_account(&app, &format!("other-{}", Uuid::new_v4())).await;

    let response = app
        .oneshot(common::request("GET", &format!("/accounts?name={name}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let accounts = common::response_json(response).await;
    let mut ids = Vec::new();
    for account in accounts.as_array().unwrap() {
        assert_eq!(account["name"].as_str(), Some(name.as_str()));
        ids.push(account["id"].as_i64().unwrap());
    }

    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&first["id"].as_i64().unwrap()));
    assert!(ids.contains(&second["id"].as_i64().unwrap()));
    assert!(!ids.contains(&other["id"].as_i64().unwrap()));
}

#[tokio::test]
#[ignore = "Requires a Postgres database via DATABASE_URL"]
async fn test_list_accounts_empty_name_filter_lists_all() {
    let app = common::setup_app().await;
    let created = create_account(&app, &format!("empty-filter-{}", Uuid::new_v4())).await;
    let id = created["id"].as_i64().unwrap();

    // An empty filter value behaves like no filter at all.
    let response = app
        .oneshot(common::request("GET", "/accounts?name="))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let accounts = common::response_json(response).await;
    assert!(accounts
        .as_array()
        .unwrap()
        .iter()
        .any(|account| account["id"] == id));
}

#[tokio::test]
#[ignore = "Requires a Postgres database via DATABASE_URL"]
async fn test_update_account() {
    let app = common::setup_app().await;

    let created = create_account(&app, &format!("Before {}", Uuid::new_v4())).await;
    let id = created["id"].as_i64().unwrap();

    let replacement = json!({
        "name": format!("After {}", Uuid::new_v4()),
        "email": "after@example.com",
        "phone_number": "555-9999",
        "date_joined": "2019-01-02"
    });

    let response = app
        .clone()
        .oneshot(common::json_request(
            "PUT",
            &format!("/accounts/{id}"),
            &replacement,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let updated = common::response_json(response).await;
    assert_eq!(updated["id"].as_i64(), Some(id));
    assert_eq!(updated["name"], replacement["name"]);
    assert_eq!(updated["email"], "after@example.com");
    assert_eq!(updated["date_joined"], "2019-01-02");

    // Replaying the same replacement leaves the record unchanged
    let response = app
        .clone()
        .oneshot(common::json_request(
            "PUT",
            &format!("/accounts/{id}"),
            &replacement,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let replayed = common::response_json(response).await;
    assert_eq!(replayed, updated);
}

#[tokio::test]
#[ignore = "Requires a Postgres database via DATABASE_URL"]
async fn test_update_account_not_found() {
    let app = common::setup_app().await;
    let id = absent_account_id(&app).await;

    let replacement = json!({
        "name": "Nobody",
        "email": "nobody@example.com",
        "phone_number": "555-0000",
        "date_joined": "2021-03-04"
    });

    let response = app
        .oneshot(common::json_request(
            "PUT",
            &format!("/accounts/{id}"),
            &replacement,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires a Postgres database via DATABASE_URL"]
async fn test_update_account_rejects_missing_date_joined() {
    let app = common::setup_app().await;
    let created = create_account(&app, &format!("partial-{}", Uuid::new_v4())).await;
    let id = created["id"].as_i64().unwrap();

    let replacement = json!({
        "name": "John Doe",
        "email": "john@example.com",
        "phone_number": "555-1111"
    });

    let response = app
        .oneshot(common::json_request(
            "PUT",
            &format!("/accounts/{id}"),
            &replacement,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = common::response_json(response).await;
    assert_eq!(json["error"], "Invalid Account: missing date_joined");
}

#[tokio::test]
#[ignore = "Requires a Postgres database via DATABASE_URL"]
async fn test_update_account_reports_missing_account_first() {
    let app = common::setup_app().await;
    let id = absent_account_id(&app).await;

    // The body is invalid too; the unknown id is what gets reported.
    let replacement = json!({ "name": "Nobody" });

    let response = app
        .oneshot(common::json_request(
            "PUT",
            &format!("/accounts/{id}"),
            &replacement,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = common::response_json(response).await;
    assert_eq!(json["error_code"], "account_not_found");
}

#[tokio::test]
#[ignore = "Requires a Postgres database via DATABASE_URL"]
async fn test_update_account_not_found_beats_undecodable_body() {
    let app = common::setup_app().await;
    let created = create_account(&app, &format!("decode-{}", Uuid::new_v4())).await;
    let id = created["id"].as_i64().unwrap();

    // A wrong-typed field fails in the deserializer, not in validation.
    let replacement = json!({ "name": 5 });

    let response = app
        .clone()
        .oneshot(common::json_request(
            "PUT",
            &format!("/accounts/{id}"),
            &replacement,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(common::request("DELETE", &format!("/accounts/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Same body, absent id: the missing account wins over the bad body.
    let response = app
        .oneshot(common::json_request(
            "PUT",
            &format!("/accounts/{id}"),
            &replacement,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = common::response_json(response).await;
    assert_eq!(json["error_code"], "account_not_found");
}

#[tokio::test]
#[ignore = "Requires a Postgres database via DATABASE_URL"]
async fn test_update_account_leaves_addresses_alone() {
    let app = common::setup_app().await;

    let body = json!({
        "name": format!("Keeper {}", Uuid::new_v4()),
        "email": "keeper@example.com",
        "phone_number": "555-5555",
        "addresses": [{
            "name": "home",
            "street": "1 Main St",
            "city": "New York",
            "state": "NY",
            "postal_code": "10001"
        }]
    });

    let response = app
        .clone()
        .oneshot(common::json_request("POST", "/accounts", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = common::response_json(response).await;
    let id = created["id"].as_i64().unwrap();

    // A fetched record sent back with an empty addresses array must not
    // drop the stored addresses.
    let replacement = json!({
        "id": id,
        "name": created["name"].clone(),
        "email": "keeper2@example.com",
        "phone_number": "555-5555",
        "date_joined": created["date_joined"].clone(),
        "addresses": []
    });

    let response = app
        .clone()
        .oneshot(common::json_request(
            "PUT",
            &format!("/accounts/{id}"),
            &replacement,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let updated = common::response_json(response).await;
    assert_eq!(updated["email"], "keeper2@example.com");
    assert_eq!(updated["addresses"].as_array().unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "Requires a Postgres database via DATABASE_URL"]
async fn test_delete_account_idempotent() {
    let app = common::setup_app().await;

    let created = create_account(&app, &format!("Doomed {}", Uuid::new_v4())).await;
    let id = created["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(common::request("DELETE", &format!("/accounts/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let body = common::response_bytes(response).await;
    assert!(body.is_empty());

    let response = app
        .clone()
        .oneshot(common::request("GET", &format!("/accounts/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Deleting again is still a success
    let response = app
        .clone()
        .oneshot(common::request("DELETE", &format!("/accounts/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore = "Requires a Postgres database via DATABASE_URL"]
async fn test_delete_account_cascades_to_addresses() {
    let pool = common::setup_test_db().await;
    let app = account_service::api::app(pool.clone());

    let body = json!({
        "name": format!("Cascade {}", Uuid::new_v4()),
        "email": "cascade@example.com",
        "phone_number": "555-6666",
        "addresses": [
            {"name": "home", "street": "1 Main St", "city": "New York",
             "state": "NY", "postal_code": "10001"},
            {"name": "work", "street": "200 Broadway", "city": "New York",
             "state": "NY", "postal_code": "10038"}
        ]
    });

    let response = app
        .clone()
        .oneshot(common::json_request("POST", "/accounts", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = common::response_json(response).await;
    let id = created["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(common::request("DELETE", &format!("/accounts/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // No orphaned rows remain
    let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM addresses WHERE account_id = $1")
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(orphans, 0);

    // The children's collection is gone along with the parent
    let response = app
        .clone()
        .oneshot(common::request("GET", &format!("/accounts/{id}/addresses")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires a Postgres database via DATABASE_URL"]
async fn test_account_lifecycle_with_address() {
    let app = common::setup_app().await;

    // Create an account, give it an address, tear the account down, and
    // confirm the address went with it.
    let account = create_account(&app, &format!("Doe {}", Uuid::new_v4())).await;
    let account_id = account["id"].as_i64().unwrap();

    let address_body = json!({
        "name": "home",
        "street": "1 Main St",
        "city": "NYC",
        "state": "NY",
        "postal_code": "10001"
    });

    let response = app
        .clone()
        .oneshot(common::json_request(
            "POST",
            &format!("/accounts/{account_id}/addresses"),
            &address_body,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let address = common::response_json(response).await;
    let address_id = address["id"].as_i64().unwrap();
    assert_eq!(address["account_id"].as_i64(), Some(account_id));

    let response = app
        .clone()
        .oneshot(common::request("DELETE", &format!("/accounts/{account_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(common::request(
            "GET",
            &format!("/accounts/{account_id}/addresses/{address_id}"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
