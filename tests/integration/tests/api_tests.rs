//! API integration tests
//!
//! Each test spawns its own server on the in-memory backend, so tests run
//! in parallel without shared state.

use integration_tests::*;
use reqwest::StatusCode;
use serde_json::{json, Value};

/// Enroll a member and bill them one dated service (index 0) plus an
/// open-ended locker (index 1)
async fn member_with_service(
    server: &TestServer,
    start_date: &str,
    expiry_date: &str,
) -> anyhow::Result<(MemberResponse, InvoiceResponse)> {
    let member: MemberResponse =
        assert_json(server.post("/api/v1/members", &enroll_member_body()).await?, StatusCode::CREATED)
            .await?;
    let invoice: InvoiceResponse = assert_json(
        server
            .post("/api/v1/invoices", &invoice_body(&member.id, start_date, expiry_date))
            .await?,
        StatusCode::CREATED,
    )
    .await?;
    Ok((member, invoice))
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() -> anyhow::Result<()> {
    let server = TestServer::start().await?;

    let body: Value = assert_json(server.get("/health").await?, StatusCode::OK).await?;
    assert_eq!(body["status"], "healthy");

    Ok(())
}

#[tokio::test]
async fn test_readiness_check() -> anyhow::Result<()> {
    let server = TestServer::start().await?;

    let body: Value = assert_json(server.get("/health/ready").await?, StatusCode::OK).await?;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["storage"], "healthy");
    assert_eq!(body["checks"]["cache"], "healthy");

    Ok(())
}

#[tokio::test]
async fn test_request_id_is_echoed() -> anyhow::Result<()> {
    let server = TestServer::start().await?;

    let response = server
        .client
        .get(format!("{}/api/v1/members/1", server.base_url()))
        .header("x-request-id", "trace-me-123")
        .send()
        .await?;

    // Errors carry the caller's id too
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.headers().get("x-request-id").and_then(|v| v.to_str().ok()),
        Some("trace-me-123")
    );

    Ok(())
}

// ============================================================================
// Member Tests
// ============================================================================

#[tokio::test]
async fn test_enroll_and_get_member() -> anyhow::Result<()> {
    let server = TestServer::start().await?;

    let created: MemberResponse =
        assert_json(server.post("/api/v1/members", &enroll_member_body()).await?, StatusCode::CREATED)
            .await?;
    assert_eq!(created.status, "pending");
    assert_eq!(created.freeze_budget.used, 0);
    assert_eq!(created.freeze_budget.remaining, 30);
    assert_eq!(created.freeze_budget.budget, 30);

    let fetched: MemberResponse = assert_json(
        server.get(&format!("/api/v1/members/{}", created.id)).await?,
        StatusCode::OK,
    )
    .await?;
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.member_code, created.member_code);

    Ok(())
}

#[tokio::test]
async fn test_duplicate_member_code_conflicts() -> anyhow::Result<()> {
    let server = TestServer::start().await?;
    let body = enroll_member_body();

    assert_status(server.post("/api/v1/members", &body).await?, StatusCode::CREATED).await?;
    assert_error(
        server.post("/api/v1/members", &body).await?,
        StatusCode::CONFLICT,
        "MEMBER_CODE_EXISTS",
    )
    .await?;

    Ok(())
}

#[tokio::test]
async fn test_enroll_rejects_invalid_body() -> anyhow::Result<()> {
    let server = TestServer::start().await?;

    let mut body = enroll_member_body();
    body["email"] = json!("not-an-email");

    let error = assert_error(
        server.post("/api/v1/members", &body).await?,
        StatusCode::BAD_REQUEST,
        "VALIDATION_ERROR",
    )
    .await?;
    assert!(error["details"].get("email").is_some());

    Ok(())
}

#[tokio::test]
async fn test_unknown_member_is_not_found() -> anyhow::Result<()> {
    let server = TestServer::start().await?;

    assert_error(
        server.get("/api/v1/members/999999").await?,
        StatusCode::NOT_FOUND,
        "UNKNOWN_MEMBER",
    )
    .await?;

    Ok(())
}

#[tokio::test]
async fn test_malformed_member_id_is_bad_request() -> anyhow::Result<()> {
    let server = TestServer::start().await?;

    assert_error(
        server.get("/api/v1/members/not-a-number").await?,
        StatusCode::BAD_REQUEST,
        "INVALID_PATH_PARAMETER",
    )
    .await?;

    Ok(())
}

#[tokio::test]
async fn test_member_with_running_service_is_active() -> anyhow::Result<()> {
    let server = TestServer::start().await?;
    let (member, invoice) = member_with_service(&server, "2020-01-01", "2099-01-31").await?;

    let fetched: MemberResponse = assert_json(
        server.get(&format!("/api/v1/members/{}", member.id)).await?,
        StatusCode::OK,
    )
    .await?;
    assert_eq!(fetched.status, "active");

    let services: Vec<ServiceResponse> = assert_json(
        server.get(&format!("/api/v1/members/{}/services", member.id)).await?,
        StatusCode::OK,
    )
    .await?;
    assert_eq!(services.len(), 2);
    assert!(services.iter().all(|s| s.invoice_id == invoice.id));
    assert!(services[0].is_active);
    assert!(services[0].days_remaining > 0);
    // No expiry: counts as running, nothing to count down
    assert!(services[1].is_active);
    assert_eq!(services[1].days_remaining, 0);

    Ok(())
}

#[tokio::test]
async fn test_member_with_lapsed_service_keeps_stored_status() -> anyhow::Result<()> {
    let server = TestServer::start().await?;

    let mut body = enroll_member_body();
    body["status"] = json!("expired");
    let member: MemberResponse =
        assert_json(server.post("/api/v1/members", &body).await?, StatusCode::CREATED).await?;

    let invoice = json!({
        "invoice_number": format!("INV-{}", unique_suffix()),
        "member_id": member.id,
        "total": 5000,
        "items": [{"description": "Old plan", "start_date": "2020-01-01", "expiry_date": "2020-12-31"}]
    });
    assert_status(server.post("/api/v1/invoices", &invoice).await?, StatusCode::CREATED).await?;

    let fetched: MemberResponse = assert_json(
        server.get(&format!("/api/v1/members/{}", member.id)).await?,
        StatusCode::OK,
    )
    .await?;
    assert_eq!(fetched.status, "expired");
    assert_eq!(fetched.stored_status.as_deref(), Some("expired"));

    Ok(())
}

// ============================================================================
// Invoice Tests
// ============================================================================

#[tokio::test]
async fn test_create_invoice_and_record_payments() -> anyhow::Result<()> {
    let server = TestServer::start().await?;
    let (member, invoice) = member_with_service(&server, "2020-01-01", "2099-01-31").await?;

    assert_eq!(invoice.member_id, member.id);
    assert_eq!(invoice.total, 12000);
    assert_eq!(invoice.pending, 12000);
    assert_eq!(invoice.items.len(), 2);
    assert_eq!(invoice.items[1].description, "Locker");
    assert!(invoice.items[1].expiry_date.is_none());

    let path = format!("/api/v1/invoices/{}/payments", invoice.id);
    let partial: InvoiceResponse =
        assert_json(server.post(&path, &json!({"amount": 2000})).await?, StatusCode::OK).await?;
    assert_eq!(partial.status, "partial");
    assert_eq!(partial.total_paid, 2000);
    assert_eq!(partial.pending, 10000);

    let paid: InvoiceResponse =
        assert_json(server.post(&path, &json!({"amount": 10000})).await?, StatusCode::OK).await?;
    assert_eq!(paid.status, "paid");
    assert_eq!(paid.pending, 0);

    let fetched: InvoiceResponse = assert_json(
        server.get(&format!("/api/v1/invoices/{}", invoice.id)).await?,
        StatusCode::OK,
    )
    .await?;
    assert_eq!(fetched.total_paid, 12000);

    Ok(())
}

#[tokio::test]
async fn test_invoice_for_unknown_member() -> anyhow::Result<()> {
    let server = TestServer::start().await?;

    assert_error(
        server
            .post("/api/v1/invoices", &invoice_body("424242", "2024-01-01", "2024-12-31"))
            .await?,
        StatusCode::NOT_FOUND,
        "UNKNOWN_MEMBER",
    )
    .await?;

    Ok(())
}

#[tokio::test]
async fn test_invoice_with_reversed_window_is_rejected() -> anyhow::Result<()> {
    let server = TestServer::start().await?;
    let member: MemberResponse =
        assert_json(server.post("/api/v1/members", &enroll_member_body()).await?, StatusCode::CREATED)
            .await?;

    assert_error(
        server
            .post("/api/v1/invoices", &invoice_body(&member.id, "2024-12-31", "2024-01-01"))
            .await?,
        StatusCode::BAD_REQUEST,
        "VALIDATION_ERROR",
    )
    .await?;

    Ok(())
}

// ============================================================================
// Change-Date Tests
// ============================================================================

#[tokio::test]
async fn test_change_expiry_date() -> anyhow::Result<()> {
    let server = TestServer::start().await?;
    let (member, invoice) = member_with_service(&server, "2024-01-01", "2024-12-31").await?;

    let updated: InvoiceResponse = assert_json(
        server
            .post(
                "/api/v1/services/change-date",
                &json!({"invoice_id": invoice.id, "item_index": "0", "expiry_date": "2099-06-30"}),
            )
            .await?,
        StatusCode::OK,
    )
    .await?;

    let item = &updated.items[0];
    assert!(item.start_date.as_deref().is_some_and(|d| d.starts_with("2024-01-01")));
    assert!(item.expiry_date.as_deref().is_some_and(|d| d.starts_with("2099-06-30")));
    assert!(item.is_active);
    // Sibling item untouched
    assert!(updated.items[1].expiry_date.is_none());

    // Date changes never touch the freeze budget
    let fetched: MemberResponse = assert_json(
        server.get(&format!("/api/v1/members/{}", member.id)).await?,
        StatusCode::OK,
    )
    .await?;
    assert_eq!(fetched.freeze_budget.used, 0);

    Ok(())
}

#[tokio::test]
async fn test_change_date_rejections() -> anyhow::Result<()> {
    let server = TestServer::start().await?;
    let (_, invoice) = member_with_service(&server, "2024-01-01", "2024-12-31").await?;

    // Nothing to change
    assert_error(
        server
            .post("/api/v1/services/change-date", &json!({"invoice_id": invoice.id, "item_index": 0}))
            .await?,
        StatusCode::BAD_REQUEST,
        "VALIDATION_ERROR",
    )
    .await?;

    // Expiry before the existing start
    assert_error(
        server
            .post(
                "/api/v1/services/change-date",
                &json!({"invoice_id": invoice.id, "item_index": 0, "expiry_date": "2023-06-01"}),
            )
            .await?,
        StatusCode::BAD_REQUEST,
        "VALIDATION_ERROR",
    )
    .await?;

    // No such item
    let error = assert_error(
        server
            .post(
                "/api/v1/services/change-date",
                &json!({"invoice_id": invoice.id, "item_index": 7, "expiry_date": "2099-01-01"}),
            )
            .await?,
        StatusCode::NOT_FOUND,
        "UNKNOWN_INVOICE_ITEM",
    )
    .await?;
    assert_eq!(error["details"]["item_index"], 7);

    // No such invoice
    assert_error(
        server
            .post(
                "/api/v1/services/change-date",
                &json!({"invoice_id": "123", "item_index": 0, "expiry_date": "2099-01-01"}),
            )
            .await?,
        StatusCode::NOT_FOUND,
        "UNKNOWN_INVOICE",
    )
    .await?;

    Ok(())
}

// ============================================================================
// Freeze Tests
// ============================================================================

#[tokio::test]
async fn test_freeze_budget_scenario() -> anyhow::Result<()> {
    let server = TestServer::start().await?;
    let (member, invoice) = member_with_service(&server, "2099-01-01", "2099-01-31").await?;

    // 25 days: 2099-01-31 -> 2099-02-25
    let first: FreezeResponse = assert_json(
        server
            .post_with_headers(
                "/api/v1/services/freeze",
                &[("x-staff-id", "desk-7")],
                &freeze_body(&invoice.id, 0, "2099-01-01", "2099-01-25"),
            )
            .await?,
        StatusCode::OK,
    )
    .await?;
    assert_eq!(first.freeze.days, 25);
    assert_eq!(first.total_freeze_days_used, 25);
    assert_eq!(first.remaining_freeze_days, 5);
    assert!(first.freeze.previous_expiry_date.starts_with("2099-01-31"));
    assert!(first.freeze.new_expiry_date.starts_with("2099-02-25"));
    assert_eq!(first.freeze.actor.as_deref(), Some("desk-7"));
    assert_eq!(first.freeze.reason.as_deref(), Some("Travel"));
    assert!(first.invoice.items[0]
        .expiry_date
        .as_deref()
        .is_some_and(|d| d.starts_with("2099-02-25")));

    // 10 more days would overdraw the remaining 5
    let error = assert_error(
        server
            .post("/api/v1/services/freeze", &freeze_body(&invoice.id, 0, "2099-02-01", "2099-02-10"))
            .await?,
        StatusCode::UNPROCESSABLE_ENTITY,
        "FREEZE_BUDGET_EXCEEDED",
    )
    .await?;
    assert_eq!(error["details"]["requested_days"], 10);
    assert_eq!(error["details"]["remaining_freeze_days"], 5);

    // Rejected freeze left the item alone
    let unchanged: InvoiceResponse = assert_json(
        server.get(&format!("/api/v1/invoices/{}", invoice.id)).await?,
        StatusCode::OK,
    )
    .await?;
    assert!(unchanged.items[0]
        .expiry_date
        .as_deref()
        .is_some_and(|d| d.starts_with("2099-02-25")));

    // Exactly the remaining 5 days: 2099-02-25 -> 2099-03-02
    let last: FreezeResponse = assert_json(
        server
            .post("/api/v1/services/freeze", &freeze_body(&invoice.id, 0, "2099-02-01", "2099-02-05"))
            .await?,
        StatusCode::OK,
    )
    .await?;
    assert_eq!(last.total_freeze_days_used, 30);
    assert_eq!(last.remaining_freeze_days, 0);
    assert!(last.freeze.new_expiry_date.starts_with("2099-03-02"));

    let fetched: MemberResponse = assert_json(
        server.get(&format!("/api/v1/members/{}", member.id)).await?,
        StatusCode::OK,
    )
    .await?;
    assert_eq!(fetched.freeze_budget.used, 30);
    assert_eq!(fetched.freeze_budget.remaining, 0);

    let history: Vec<FreezeRecordResponse> = assert_json(
        server.get(&format!("/api/v1/members/{}/freezes", member.id)).await?,
        StatusCode::OK,
    )
    .await?;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, last.freeze.id);
    assert_eq!(history[1].id, first.freeze.id);

    Ok(())
}

#[tokio::test]
async fn test_freeze_rejections() -> anyhow::Result<()> {
    let server = TestServer::start().await?;
    let (_, invoice) = member_with_service(&server, "2099-01-01", "2099-01-31").await?;

    // Reversed window
    assert_error(
        server
            .post("/api/v1/services/freeze", &freeze_body(&invoice.id, 0, "2099-01-10", "2099-01-01"))
            .await?,
        StatusCode::BAD_REQUEST,
        "VALIDATION_ERROR",
    )
    .await?;

    // Open-ended locker has no expiry to extend
    assert_error(
        server
            .post("/api/v1/services/freeze", &freeze_body(&invoice.id, 1, "2099-01-01", "2099-01-05"))
            .await?,
        StatusCode::BAD_REQUEST,
        "VALIDATION_ERROR",
    )
    .await?;

    // Over-long reason
    let mut body = freeze_body(&invoice.id, 0, "2099-01-01", "2099-01-05");
    body["reason"] = json!("x".repeat(501));
    assert_error(
        server.post("/api/v1/services/freeze", &body).await?,
        StatusCode::BAD_REQUEST,
        "VALIDATION_ERROR",
    )
    .await?;

    // Missing end date
    assert_error(
        server
            .post(
                "/api/v1/services/freeze",
                &json!({"invoice_id": invoice.id, "item_index": 0, "start_date": "2099-01-01"}),
            )
            .await?,
        StatusCode::BAD_REQUEST,
        "VALIDATION_ERROR",
    )
    .await?;

    Ok(())
}

#[tokio::test]
async fn test_freeze_with_idempotency_key_replays() -> anyhow::Result<()> {
    let server = TestServer::start().await?;
    let (member, invoice) = member_with_service(&server, "2099-01-01", "2099-01-31").await?;

    let key = format!("freeze-{}", unique_suffix());
    let body = freeze_body(&invoice.id, 0, "2099-01-01", "2099-01-10");
    let headers = [("idempotency-key", key.as_str())];

    let first: FreezeResponse = assert_json(
        server.post_with_headers("/api/v1/services/freeze", &headers, &body).await?,
        StatusCode::OK,
    )
    .await?;
    let replay: FreezeResponse = assert_json(
        server.post_with_headers("/api/v1/services/freeze", &headers, &body).await?,
        StatusCode::OK,
    )
    .await?;

    assert_eq!(first.freeze.id, replay.freeze.id);
    assert_eq!(replay.total_freeze_days_used, 10);

    let fetched: MemberResponse = assert_json(
        server.get(&format!("/api/v1/members/{}", member.id)).await?,
        StatusCode::OK,
    )
    .await?;
    assert_eq!(fetched.freeze_budget.used, 10);

    Ok(())
}

#[tokio::test]
async fn test_idempotency_key_reused_for_another_invoice() -> anyhow::Result<()> {
    let server = TestServer::start().await?;
    let (_, invoice_a) = member_with_service(&server, "2099-01-01", "2099-01-31").await?;
    let (member_b, invoice_b) = member_with_service(&server, "2099-01-01", "2099-01-31").await?;

    let key = format!("freeze-{}", unique_suffix());
    let headers = [("idempotency-key", key.as_str())];

    let _: FreezeResponse = assert_json(
        server
            .post_with_headers(
                "/api/v1/services/freeze",
                &headers,
                &freeze_body(&invoice_a.id, 0, "2099-01-01", "2099-01-10"),
            )
            .await?,
        StatusCode::OK,
    )
    .await?;

    let error = assert_error(
        server
            .post_with_headers(
                "/api/v1/services/freeze",
                &headers,
                &freeze_body(&invoice_b.id, 0, "2099-01-01", "2099-01-10"),
            )
            .await?,
        StatusCode::UNPROCESSABLE_ENTITY,
        "IDEMPOTENCY_KEY_REUSED",
    )
    .await?;
    assert!(error["message"].as_str().is_some());

    let fetched: MemberResponse = assert_json(
        server.get(&format!("/api/v1/members/{}", member_b.id)).await?,
        StatusCode::OK,
    )
    .await?;
    assert_eq!(fetched.freeze_budget.used, 0);

    Ok(())
}

#[tokio::test]
async fn test_blank_idempotency_key_is_ignored() -> anyhow::Result<()> {
    let server = TestServer::start().await?;
    let (_, invoice) = member_with_service(&server, "2099-01-01", "2099-01-31").await?;

    let body = freeze_body(&invoice.id, 0, "2099-01-01", "2099-01-02");
    let headers = [("idempotency-key", "   ")];

    let first: FreezeResponse = assert_json(
        server.post_with_headers("/api/v1/services/freeze", &headers, &body).await?,
        StatusCode::OK,
    )
    .await?;
    let second: FreezeResponse = assert_json(
        server.post_with_headers("/api/v1/services/freeze", &headers, &body).await?,
        StatusCode::OK,
    )
    .await?;

    assert_ne!(first.freeze.id, second.freeze.id);
    assert_eq!(second.total_freeze_days_used, 4);

    Ok(())
}

#[tokio::test]
async fn test_oversized_idempotency_key_is_rejected() -> anyhow::Result<()> {
    let server = TestServer::start().await?;
    let (_, invoice) = member_with_service(&server, "2099-01-01", "2099-01-31").await?;

    let key = "k".repeat(200);
    assert_error(
        server
            .post_with_headers(
                "/api/v1/services/freeze",
                &[("idempotency-key", key.as_str())],
                &freeze_body(&invoice.id, 0, "2099-01-01", "2099-01-02"),
            )
            .await?,
        StatusCode::BAD_REQUEST,
        "INVALID_HEADER",
    )
    .await?;

    Ok(())
}

#[tokio::test]
async fn test_concurrent_freezes_never_overdraw() -> anyhow::Result<()> {
    let server = TestServer::start().await?;
    let (member, invoice) = member_with_service(&server, "2099-01-01", "2099-01-31").await?;

    // 20 of 30 days used up front
    assert_status(
        server
            .post("/api/v1/services/freeze", &freeze_body(&invoice.id, 0, "2099-01-01", "2099-01-20"))
            .await?,
        StatusCode::OK,
    )
    .await?;

    // Two 6-day requests race for the last 10 days
    let body = freeze_body(&invoice.id, 0, "2099-03-01", "2099-03-06");
    let (a, b) = tokio::join!(
        server.post("/api/v1/services/freeze", &body),
        server.post("/api/v1/services/freeze", &body),
    );
    let mut statuses = vec![a?.status(), b?.status()];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::UNPROCESSABLE_ENTITY]);

    let fetched: MemberResponse = assert_json(
        server.get(&format!("/api/v1/members/{}", member.id)).await?,
        StatusCode::OK,
    )
    .await?;
    assert_eq!(fetched.freeze_budget.used, 26);

    Ok(())
}

#[tokio::test]
async fn test_budget_spans_invoices() -> anyhow::Result<()> {
    let server = TestServer::start().await?;
    let (member, first) = member_with_service(&server, "2099-01-01", "2099-01-31").await?;
    let second: InvoiceResponse = assert_json(
        server
            .post("/api/v1/invoices", &invoice_body(&member.id, "2099-02-01", "2099-02-28"))
            .await?,
        StatusCode::CREATED,
    )
    .await?;

    assert_status(
        server
            .post("/api/v1/services/freeze", &freeze_body(&first.id, 0, "2099-01-01", "2099-01-20"))
            .await?,
        StatusCode::OK,
    )
    .await?;

    // The allowance belongs to the member, not to the invoice
    let error = assert_error(
        server
            .post("/api/v1/services/freeze", &freeze_body(&second.id, 0, "2099-02-01", "2099-02-15"))
            .await?,
        StatusCode::UNPROCESSABLE_ENTITY,
        "FREEZE_BUDGET_EXCEEDED",
    )
    .await?;
    assert_eq!(error["details"]["remaining_freeze_days"], 10);

    Ok(())
}
