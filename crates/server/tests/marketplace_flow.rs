mod support;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use support::{build_app, id_of, send, unique_email};

async fn register(app: &axum::Router, role: &str) -> anyhow::Result<Value> {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/register",
        Some(json!({
            "name": format!("{} user", role),
            "email": unique_email(role),
            "password": "Passw0rd!",
            "role": role,
            "business_name": "Tidy Homes",
            "business_category": "Cleaning",
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    Ok(body["user"].clone())
}

#[tokio::test]
async fn book_pay_invoice_refund() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let t = build_app().await?;
    let app = &t.router;
    let owner = register(app, "business").await?;
    let customer = register(app, "customer").await?;

    // Catalog
    let (status, body) = send(app, "POST", "/api/services", Some(json!({"provider_id": owner["id"], "name": "", "category": "Cleaning", "description": "d", "price_cents": 100, "location": "x", "phone": "1"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap_or_default().contains("name"));

    let (status, svc) = send(app, "POST", "/api/services", Some(json!({
        "provider_id": owner["id"],
        "name": "Window Washing",
        "category": "Cleaning",
        "description": "Streak free, inside and out",
        "price_cents": 10_000,
        "location": "Uptown",
        "phone": "555-0188",
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(svc["rating"], 0.0);
    assert!(svc["image"].as_str().is_some_and(|s| !s.is_empty()));
    let service_id = id_of(&svc);

    let (_, found) = send(app, "GET", &format!("/api/services?provider_id={}&q=STREAK", owner["id"].as_str().unwrap_or_default()), None).await?;
    assert_eq!(found.as_array().map(|a| a.len()), Some(1));
    let (_, cats) = send(app, "GET", "/api/services/categories/all", None).await?;
    assert!(cats.as_array().is_some_and(|c| c.iter().any(|x| x == "Cleaning")));

    // Booking
    let (status, booking) = send(app, "POST", "/api/bookings", Some(json!({"customer_id": customer["id"], "service_id": service_id, "date": "2031-07-01T10:00:00Z"}))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["status"], "pending");
    let booking_id = id_of(&booking);

    let (_, mine) = send(app, "GET", &format!("/api/bookings/{}?role=customer", customer["id"].as_str().unwrap_or_default()), None).await?;
    assert_eq!(mine[0]["service"]["name"], "Window Washing");
    assert_eq!(mine[0]["provider"]["id"], owner["id"]);

    // Card payment
    let (status, intent) = send(app, "POST", "/api/payments/create-intent", Some(json!({"booking_id": booking_id}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(intent["amount_cents"], 10_000);
    let payment_id = intent["payment_id"].as_str().unwrap_or_default().to_string();
    let (_, pending) = send(app, "GET", &format!("/api/payments/{}", payment_id), None).await?;
    let intent_id = pending["stripe_payment_intent_id"].as_str().unwrap_or_default().to_string();

    let (status, confirmed) = send(app, "POST", "/api/payments/confirm", Some(json!({"payment_intent_id": intent_id, "payment_id": payment_id}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmed["payment"]["status"], "succeeded");
    assert_eq!(confirmed["payment"]["platform_fee_cents"], 1_000);

    // confirmed booking cannot go back to pending
    let (status, _) = send(app, "PATCH", &format!("/api/bookings/{}", booking_id), Some(json!({"status": "pending"}))).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, bal) = send(app, "GET", &format!("/api/wallets/balance/{}", owner["id"].as_str().unwrap_or_default()), None).await?;
    assert_eq!(bal["balance_cents"], 9_000);

    let (_, history) = send(app, "GET", &format!("/api/payments/history/{}", customer["id"].as_str().unwrap_or_default()), None).await?;
    assert_eq!(history[0]["service"]["price_cents"], 10_000);

    // Invoice
    let (status, created) = send(app, "POST", "/api/invoices/create", Some(json!({"payment_id": payment_id}))).await?;
    assert_eq!(status, StatusCode::OK);
    let invoice = created["invoice"].clone();
    assert_eq!(invoice["status"], "sent");
    assert_eq!(invoice["payment_status"], "paid");
    assert_eq!(invoice["subtotal_cents"], 9_000);
    let invoice_id = id_of(&invoice);

    let resp = app.clone().oneshot(Request::builder().uri(format!("/api/invoices/{}/download", invoice_id)).body(Body::empty())?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("content-type").and_then(|v| v.to_str().ok()), Some("application/pdf"));
    let pdf = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    assert!(pdf.starts_with(b"%PDF-"));

    let pdf_url = invoice["pdf_url"].as_str().unwrap_or_default().to_string();
    let resp = app.clone().oneshot(Request::builder().uri(pdf_url).body(Body::empty())?).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let (_, listed) = send(app, "GET", &format!("/api/invoices/user/{}?role=provider", owner["id"].as_str().unwrap_or_default()), None).await?;
    assert_eq!(listed["total"], 1);
    assert_eq!(listed["page"], 1);

    // Refund flows back to the invoice
    let (status, refunded) = send(app, "POST", &format!("/api/payments/{}/refund", payment_id), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(refunded["payment"]["status"], "refunded");
    assert_eq!(t.gateway.refund_count(), 1);
    let (_, inv) = send(app, "GET", &format!("/api/invoices/{}", invoice_id), None).await?;
    assert_eq!(inv["payment_status"], "refunded");
    let (status, _) = send(app, "POST", &format!("/api/payments/{}/refund", payment_id), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(app, "DELETE", &format!("/api/invoices/{}", invoice_id), None).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(app, "GET", &format!("/api/invoices/{}/download", invoice_id), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Review updates the listing rating
    let (status, _) = send(app, "POST", "/api/reviews", Some(json!({"service_id": service_id, "user_id": customer["id"], "user_name": "C", "rating": 6, "comment": "great"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    for rating in [4, 5] {
        let (status, _) = send(app, "POST", "/api/reviews", Some(json!({"service_id": service_id, "user_id": customer["id"], "user_name": "C", "rating": rating, "comment": "great"}))).await?;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (_, svc) = send(app, "GET", &format!("/api/services/{}", service_id), None).await?;
    assert_eq!(svc["rating"], 4.5);
    assert_eq!(svc["review_count"], 2);
    let (_, reviews) = send(app, "GET", &format!("/api/reviews/{}", service_id), None).await?;
    assert_eq!(reviews.as_array().map(|r| r.len()), Some(2));

    // Listings with payment history stay; unpaid ones can go
    let (status, body) = send(app, "DELETE", &format!("/api/services/{}", service_id), None).await?;
    assert_eq!(status, StatusCode::CONFLICT, "{}", body);
    let (status, _) = send(app, "GET", &format!("/api/services/{}", service_id), None).await?;
    assert_eq!(status, StatusCode::OK);
    let (_, spare) = send(app, "POST", "/api/services", Some(json!({
        "provider_id": owner["id"], "name": "Oven Cleaning", "category": "Cleaning",
        "description": "Racks included", "price_cents": 4_000, "location": "Uptown", "phone": "555-0189",
    }))).await?;
    let (status, _) = send(app, "DELETE", &format!("/api/services/{}", id_of(&spare)), None).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(app, "GET", &format!("/api/services/{}", id_of(&spare)), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let _ = std::fs::remove_dir_all(&t.invoice_dir);
    Ok(())
}

#[tokio::test]
async fn wallet_topup_pay_and_withdraw() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let t = build_app().await?;
    let app = &t.router;
    let owner = register(app, "business").await?;
    let customer = register(app, "customer").await?;
    let cid = customer["id"].as_str().unwrap_or_default().to_string();

    let (status, _) = send(app, "POST", "/api/wallets/topup-intent", Some(json!({"user_id": cid, "amount_cents": 0}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, topup) = send(app, "POST", "/api/wallets/topup-intent", Some(json!({"user_id": cid, "amount_cents": 5_000}))).await?;
    assert_eq!(status, StatusCode::OK);
    let intent_id = topup["payment_intent_id"].as_str().unwrap_or_default().to_string();

    let (status, _) = send(app, "POST", "/api/wallets/add-money", Some(json!({"user_id": cid, "amount_cents": 4_000, "payment_intent_id": intent_id}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, added) = send(app, "POST", "/api/wallets/add-money", Some(json!({"user_id": cid, "amount_cents": 5_000, "payment_intent_id": intent_id}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(added["new_balance_cents"], 5_000);
    let (status, _) = send(app, "POST", "/api/wallets/add-money", Some(json!({"user_id": cid, "amount_cents": 5_000, "payment_intent_id": intent_id}))).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    // Pay a 30.00 booking from the wallet
    let (_, svc) = send(app, "POST", "/api/services", Some(json!({
        "provider_id": owner["id"], "name": "Dog Walking", "category": "Pet Services",
        "description": "Thirty minutes around the block", "price_cents": 3_000, "location": "Midtown", "phone": "555-0175",
    }))).await?;
    let (_, booking) = send(app, "POST", "/api/bookings", Some(json!({"customer_id": cid, "service_id": svc["id"], "date": "2031-09-09"}))).await?;
    let (status, paid) = send(app, "POST", "/api/payments/pay-with-wallet", Some(json!({"booking_id": booking["id"], "customer_id": cid}))).await?;
    assert_eq!(status, StatusCode::OK, "{}", paid);
    assert_eq!(paid["new_balance_cents"], 2_000);
    assert_eq!(paid["booking"]["status"], "confirmed");

    // Second booking costs more than what is left
    let (_, booking2) = send(app, "POST", "/api/bookings", Some(json!({"customer_id": cid, "service_id": svc["id"], "date": "2031-09-10"}))).await?;
    let (status, body) = send(app, "POST", "/api/payments/pay-with-wallet", Some(json!({"booking_id": booking2["id"], "customer_id": cid}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Insufficient wallet balance");

    // A card checkout intent for that booking cannot be cashed into the wallet
    let (_, checkout) = send(app, "POST", "/api/payments/create-intent", Some(json!({"booking_id": booking2["id"]}))).await?;
    let (_, pending) = send(app, "GET", &format!("/api/payments/{}", checkout["payment_id"].as_str().unwrap_or_default()), None).await?;
    let checkout_intent = pending["stripe_payment_intent_id"].as_str().unwrap_or_default().to_string();
    let (status, body) = send(app, "POST", "/api/wallets/add-money", Some(json!({"user_id": cid, "amount_cents": 3_000, "payment_intent_id": checkout_intent}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    let (_, bal) = send(app, "GET", &format!("/api/wallets/balance/{}", cid), None).await?;
    assert_eq!(bal["balance_cents"], 2_000);

    // Withdrawals
    let (status, body) = send(app, "POST", "/api/wallets/withdraw", Some(json!({"user_id": cid, "amount_cents": 1_000, "bank_account_token": "fail_closed_account"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap_or_default().starts_with("bank transfer failed"));
    let (status, out) = send(app, "POST", "/api/wallets/withdraw", Some(json!({"user_id": cid, "amount_cents": 1_500, "bank_account_token": "btok_ok"}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(out["new_balance_cents"], 500);
    assert!(out["payout_id"].as_str().is_some());

    let (_, summary) = send(app, "GET", &format!("/api/wallets/{}?limit=2", cid), None).await?;
    assert_eq!(summary["balance_cents"], 500);
    assert_eq!(summary["total_added_cents"], 5_000);
    assert_eq!(summary["total_spent_cents"], 4_500);
    assert_eq!(summary["transaction_count"], 3);
    assert_eq!(summary["transactions"].as_array().map(|a| a.len()), Some(2));
    assert_eq!(summary["transactions"][0]["balance_after_cents"], 500);

    let (_, debits) = send(app, "GET", &format!("/api/wallets/transactions/{}?kind=debit", cid), None).await?;
    assert_eq!(debits["total_transactions"], 2);
    let (status, _) = send(app, "GET", &format!("/api/wallets/transactions/{}?kind=bogus", cid), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn contact_form_lifecycle() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = build_app().await?.router;

    let (status, body) = send(&app, "POST", "/api/contacts", Some(json!({"first_name": "Ana", "email": "ana@example.com", "message": "Hello there, friends"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap_or_default().contains("last_name"));

    let (status, body) = send(&app, "POST", "/api/contacts", Some(json!({"first_name": "Ana", "last_name": "Diaz", "email": " Ana@Example.com ", "message": "Do you cover weekends?"}))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["contact"]["email"], "ana@example.com");
    let id = body["contact"]["id"].as_str().unwrap_or_default().to_string();

    let (_, opened) = send(&app, "GET", &format!("/api/contacts/{}", id), None).await?;
    assert_eq!(opened["is_read"], true);
    assert_eq!(opened["status"], "read");

    let (status, _) = send(&app, "PATCH", &format!("/api/contacts/{}", id), Some(json!({"status": "archived"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, body) = send(&app, "PATCH", &format!("/api/contacts/{}", id), Some(json!({"status": "replied"}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["contact"]["replied_at"].is_string());

    let (_, page) = send(&app, "GET", "/api/contacts?page=1&limit=5&status=replied", None).await?;
    assert_eq!(page["pagination"]["limit"], 5);
    assert!(page["contacts"].as_array().is_some_and(|c| c.iter().any(|x| x["id"] == id.as_str())));
    let (status, far) = send(&app, "GET", &format!("/api/contacts?page={}&limit=100", u64::MAX), None).await?;
    assert_eq!(status, StatusCode::OK, "{}", far);
    assert_eq!(far["contacts"].as_array().map(|c| c.len()), Some(0));

    let (status, _) = send(&app, "DELETE", &format!("/api/contacts/{}", id), None).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "DELETE", &format!("/api/contacts/{}", id), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
