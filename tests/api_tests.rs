//! API integration tests
//!
//! Run against a live server with a clean database:
//! cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const BASE_URL: &str = "http://localhost:8080/api/v1";

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Unique suffix for emails and ISBNs so reruns don't collide
fn unique() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}{}", nanos, n)
}

/// Register a librarian and return their bearer token
async fn librarian_token(client: &Client) -> String {
    let email = format!("librarian{}@bookhub.test", unique());

    let response = client
        .post(format!("{}/users/register", BASE_URL))
        .json(&json!({
            "name": "Test Librarian",
            "email": email,
            "password": "password",
            "role": "LIBRARIAN"
        }))
        .send()
        .await
        .expect("Failed to register librarian");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "password" }))
        .send()
        .await
        .expect("Failed to send login request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Register a reader and return (id, token)
async fn reader(client: &Client) -> (i64, String) {
    let email = format!("reader{}@bookhub.test", unique());

    let response = client
        .post(format!("{}/users/register", BASE_URL))
        .json(&json!({
            "name": "Test Reader",
            "email": email,
            "password": "password"
        }))
        .send()
        .await
        .expect("Failed to register reader");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    let id = body["id"].as_i64().expect("No user ID");

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "password" }))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    (id, body["token"].as_str().unwrap().to_string())
}

/// Create a book with the given number of copies, returning its id
async fn create_book(client: &Client, token: &str, copies: i64) -> i64 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "title": format!("Test Book {}", unique()),
            "author": "Test Author",
            "isbn": format!("978{}", unique()),
            "total_copies": copies
        }))
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    body["id"].as_i64().expect("No book ID")
}

async fn create_loan(
    client: &Client,
    token: &str,
    user_id: i64,
    book_id: i64,
    loan_days: i64,
) -> reqwest::Response {
    client
        .post(format!("{}/loans", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "user_id": user_id,
            "book_id": book_id,
            "loan_days": loan_days
        }))
        .send()
        .await
        .expect("Failed to send loan request")
}

async fn available_copies(client: &Client, token: &str, book_id: i64) -> i64 {
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    body["available_copies"].as_i64().unwrap()
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "nobody@bookhub.test",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_loan_lifecycle_happy_path() {
    let client = Client::new();
    let token = librarian_token(&client).await;
    let (user_id, _) = reader(&client).await;
    let book_id = create_book(&client, &token, 2).await;

    // Borrow
    let response = create_loan(&client, &token, user_id, book_id, 14).await;
    assert_eq!(response.status(), 201);
    let loan: Value = response.json().await.unwrap();
    let loan_id = loan["id"].as_i64().unwrap();
    assert_eq!(loan["status"], "ACTIVE");
    assert_eq!(loan["renewal_count"], 0);
    assert_eq!(loan["overdue"], false);
    assert_eq!(available_copies(&client, &token, book_id).await, 1);

    // Extend by 7 days
    let due_before = loan["due_date"].as_str().unwrap().to_string();
    let response = client
        .patch(format!("{}/loans/{}/extend?additional_days=7", BASE_URL, loan_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let extended: Value = response.json().await.unwrap();
    assert_eq!(extended["renewal_count"], 1);
    assert_eq!(extended["loan_date"], loan["loan_date"]);
    let due_after = extended["due_date"].as_str().unwrap();
    assert_ne!(due_after, due_before);

    // Not overdue
    let response = client
        .get(format!("{}/loans/{}/overdue", BASE_URL, loan_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let overdue: Value = response.json().await.unwrap();
    assert_eq!(overdue, json!(false));

    // Appears in the user's active loans
    let response = client
        .get(format!("{}/loans/user/{}/active", BASE_URL, user_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let active: Value = response.json().await.unwrap();
    assert_eq!(active.as_array().unwrap().len(), 1);

    // Return
    let response = client
        .patch(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let returned: Value = response.json().await.unwrap();
    assert_eq!(returned["status"], "RETURNED");
    assert!(returned["return_date"].is_string());
    assert_eq!(available_copies(&client, &token, book_id).await, 2);
}

#[tokio::test]
#[ignore]
async fn test_loan_duration_bounds() {
    let client = Client::new();
    let token = librarian_token(&client).await;
    let (user_id, _) = reader(&client).await;
    let book_id = create_book(&client, &token, 10).await;

    assert_eq!(create_loan(&client, &token, user_id, book_id, 0).await.status(), 400);
    assert_eq!(create_loan(&client, &token, user_id, book_id, 61).await.status(), 400);
    assert_eq!(create_loan(&client, &token, user_id, book_id, 1).await.status(), 201);
    assert_eq!(create_loan(&client, &token, user_id, book_id, 60).await.status(), 201);
}

#[tokio::test]
#[ignore]
async fn test_loan_limit_allows_fifth_rejects_sixth() {
    let client = Client::new();
    let token = librarian_token(&client).await;
    let (user_id, _) = reader(&client).await;
    let book_id = create_book(&client, &token, 10).await;

    for _ in 0..5 {
        let response = create_loan(&client, &token, user_id, book_id, 14).await;
        assert_eq!(response.status(), 201);
    }

    let response = create_loan(&client, &token, user_id, book_id, 14).await;
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "ineligible_borrower");
}

#[tokio::test]
#[ignore]
async fn test_renewal_limit() {
    let client = Client::new();
    let token = librarian_token(&client).await;
    let (user_id, _) = reader(&client).await;
    let book_id = create_book(&client, &token, 1).await;

    let response = create_loan(&client, &token, user_id, book_id, 14).await;
    let loan: Value = response.json().await.unwrap();
    let loan_id = loan["id"].as_i64().unwrap();

    for expected in 1..=3 {
        let response = client
            .patch(format!("{}/loans/{}/extend?additional_days=7", BASE_URL, loan_id))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["renewal_count"], expected);
    }

    let response = client
        .patch(format!("{}/loans/{}/extend?additional_days=7", BASE_URL, loan_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "renewal_limit_reached");
}

#[tokio::test]
#[ignore]
async fn test_double_return_increments_once() {
    let client = Client::new();
    let token = librarian_token(&client).await;
    let (user_id, _) = reader(&client).await;
    let book_id = create_book(&client, &token, 1).await;

    let response = create_loan(&client, &token, user_id, book_id, 14).await;
    let loan: Value = response.json().await.unwrap();
    let loan_id = loan["id"].as_i64().unwrap();
    assert_eq!(available_copies(&client, &token, book_id).await, 0);

    let response = client
        .patch(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(available_copies(&client, &token, book_id).await, 1);

    let response = client
        .patch(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "already_returned");
    assert_eq!(available_copies(&client, &token, book_id).await, 1);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_loans_on_last_copy() {
    let client = Client::new();
    let token = librarian_token(&client).await;
    let (first, _) = reader(&client).await;
    let (second, _) = reader(&client).await;
    let book_id = create_book(&client, &token, 1).await;

    let (a, b) = tokio::join!(
        create_loan(&client, &token, first, book_id, 14),
        create_loan(&client, &token, second, book_id, 14),
    );

    let statuses = [a.status().as_u16(), b.status().as_u16()];
    assert!(
        statuses.contains(&201) && statuses.contains(&409),
        "expected exactly one success and one conflict, got {:?}",
        statuses
    );
    assert_eq!(available_copies(&client, &token, book_id).await, 0);
}

#[tokio::test]
#[ignore]
async fn test_unavailable_book_rejected() {
    let client = Client::new();
    let token = librarian_token(&client).await;
    let (first, _) = reader(&client).await;
    let (second, _) = reader(&client).await;
    let book_id = create_book(&client, &token, 1).await;

    assert_eq!(create_loan(&client, &token, first, book_id, 14).await.status(), 201);

    let response = create_loan(&client, &token, second, book_id, 14).await;
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "book_unavailable");
}

#[tokio::test]
#[ignore]
async fn test_loan_for_missing_user_or_book() {
    let client = Client::new();
    let token = librarian_token(&client).await;
    let (user_id, _) = reader(&client).await;
    let book_id = create_book(&client, &token, 1).await;

    assert_eq!(
        create_loan(&client, &token, 999_999_999, book_id, 14).await.status(),
        404
    );
    assert_eq!(
        create_loan(&client, &token, user_id, 999_999_999, 14).await.status(),
        404
    );
}

#[tokio::test]
#[ignore]
async fn test_book_crud_and_copy_ledger() {
    let client = Client::new();
    let token = librarian_token(&client).await;
    let book_id = create_book(&client, &token, 2).await;

    // Add copies
    let response = client
        .patch(format!("{}/books/{}/increment-copies?quantity=3", BASE_URL, book_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["total_copies"], 5);
    assert_eq!(body["available_copies"], 5);

    // Remove more copies than the shelf holds
    let response = client
        .patch(format!("{}/books/{}/decrement-copies?quantity=9", BASE_URL, book_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);

    // Zero quantity rejected
    let response = client
        .patch(format!("{}/books/{}/increment-copies?quantity=0", BASE_URL, book_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // Delete with no loans
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_reader_cannot_manage_catalog() {
    let client = Client::new();
    let (_, reader_token) = reader(&client).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(&reader_token)
        .json(&json!({
            "title": "Forbidden",
            "author": "Nobody"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_delete_user_with_active_loan_rejected() {
    let client = Client::new();
    let token = librarian_token(&client).await;
    let (user_id, _) = reader(&client).await;
    let book_id = create_book(&client, &token, 1).await;

    let response = create_loan(&client, &token, user_id, book_id, 14).await;
    let loan: Value = response.json().await.unwrap();
    let loan_id = loan["id"].as_i64().unwrap();

    let response = client
        .delete(format!("{}/users/{}", BASE_URL, user_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);

    // After returning, deletion goes through
    client
        .patch(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    let response = client
        .delete(format!("{}/users/{}", BASE_URL, user_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);
}
