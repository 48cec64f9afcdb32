use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::json;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn forexpay(server: &MockServer) -> Command {
    let mut cmd = Command::new(cargo_bin!("forexpay"));
    cmd.env("FOREXPAY_API_URL", server.uri())
        .env("FOREXPAY_USER_ID", "7")
        .env_remove("FOREXPAY_TOKEN");
    cmd
}

async fn backend() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/card/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 31,
            "cardNumber": "5105105105105100",
            "balance": 25000.0,
            "currency": {"code": "INR"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/currency/USD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(83.0)))
        .mount(&server)
        .await;
    server
}

#[test]
fn test_currencies_lists_catalog() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("forexpay"));
    cmd.arg("currencies");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("USD"))
        .stdout(predicate::str::contains("Indian Rupee"))
        .stdout(predicate::str::contains("Vietnamese Dong"));

    Ok(())
}

#[test]
fn test_quote_rejects_malformed_amount() {
    let mut cmd = Command::new(cargo_bin!("forexpay"));
    cmd.args(["quote", "--amount", "12.345678", "--currency", "USD"])
        .env("FOREXPAY_API_URL", "http://127.0.0.1:9");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid amount"));
}

#[test]
fn test_unknown_currency_is_rejected() {
    let mut cmd = Command::new(cargo_bin!("forexpay"));
    cmd.args(["quote", "--amount", "10", "--currency", "XYZ"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported currency"));
}

#[test]
fn test_pay_requires_user_id() {
    let mut cmd = Command::new(cargo_bin!("forexpay"));
    cmd.args([
        "pay",
        "--amount",
        "10",
        "--merchant",
        "Amazon",
        "--pin",
        "1234",
    ])
    .env_remove("FOREXPAY_USER_ID");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("User ID not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_quote_end_to_end() {
    let server = backend().await;

    let mut cmd = forexpay(&server);
    cmd.args(["quote", "--amount", "100", "--currency", "USD"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Converted amount: ₹ 8300.0000"))
        .stdout(predicate::str::contains("Convenience fee (2%): ₹ 166.0000"))
        .stdout(predicate::str::contains("Total amount: ₹ 8466.00"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_card_end_to_end() {
    let server = backend().await;

    let mut cmd = forexpay(&server);
    cmd.arg("card");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("•••• •••• •••• 5100"))
        .stdout(predicate::str::contains("Available balance: 25000.00 INR"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_pay_success_end_to_end() {
    let server = backend().await;
    Mock::given(method("POST"))
        .and(path("/transaction/process"))
        .and(query_param("userId", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"transactionId": "FX-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = forexpay(&server);
    cmd.args([
        "pay",
        "--amount",
        "100",
        "--currency",
        "USD",
        "--merchant",
        "Amazon",
        "--pin",
        "1234",
        "--processing-delay-ms",
        "0",
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Payment successful!"))
        .stdout(predicate::str::contains("INR 8466.00 to Amazon"))
        .stdout(predicate::str::contains("Transaction ID: FX-1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_pay_rejected_end_to_end() {
    let server = backend().await;
    Mock::given(method("POST"))
        .and(path("/transaction/process"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Insufficient balance"))
        .mount(&server)
        .await;

    let mut cmd = forexpay(&server);
    cmd.args([
        "pay",
        "--amount",
        "100",
        "--merchant",
        "Amazon",
        "--pin",
        "1234",
        "--processing-delay-ms",
        "0",
    ]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Insufficient balance"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_history_csv_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/transaction/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "date": "2025-01-03", "merchant": "Uber", "amount": 12.5,
             "status": "FAILED", "currentBalance": 100.0},
            {"id": 2, "date": "2025-01-04", "merchant": "Netflix", "amount": 649.0,
             "status": "SUCCESS", "currentBalance": 9351.0}
        ])))
        .mount(&server)
        .await;

    let mut cmd = forexpay(&server);
    cmd.args(["history", "--status", "success", "--csv"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "id,date,merchant,amount,status,currentBalance",
        ))
        .stdout(predicate::str::contains("2,2025-01-04,Netflix,649.0,SUCCESS,9351.0"))
        .stdout(predicate::str::contains("Uber").not());
}

#[test]
fn test_history_requires_both_dates() {
    let mut cmd = Command::new(cargo_bin!("forexpay"));
    cmd.args(["history", "--from", "2025-01-01"])
        .env("FOREXPAY_USER_ID", "7")
        .env("FOREXPAY_API_URL", "http://127.0.0.1:9");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Please select both From and To dates."));
}

fn salary_slip() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"%PDF-1.7 salary").unwrap();
    file
}

fn apply_args(pan: &str, slip: &NamedTempFile) -> Vec<String> {
    [
        "apply",
        "--pan",
        pan,
        "--dob",
        "1991-08-20",
        "--phone",
        "9988776655",
        "--gender",
        "male",
        "--salary",
        "64000",
        "--address",
        "9 Marine Drive",
        "--state",
        "maharashtra",
        "--salary-slip",
    ]
    .iter()
    .map(|arg| arg.to_string())
    .chain([slip.path().display().to_string()])
    .collect()
}

#[test]
fn test_apply_rejects_malformed_pan() {
    let slip = salary_slip();
    let mut cmd = Command::new(cargo_bin!("forexpay"));
    cmd.args(apply_args("ABC123", &slip))
        .env("FOREXPAY_USER_ID", "7")
        .env("FOREXPAY_API_URL", "http://127.0.0.1:9");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Enter valid PAN card number"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_apply_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/apply/7"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let slip = salary_slip();
    let mut cmd = forexpay(&server);
    cmd.args(apply_args("KLMNO4321P", &slip));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Forex card application submitted!"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_admin_summary_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}, {"id": 2}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user/approved"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 3}, {"id": 4}])))
        .mount(&server)
        .await;

    let mut cmd = forexpay(&server);
    cmd.args(["admin", "summary"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Pending:  2"))
        .stdout(predicate::str::contains("Approved: 2"))
        .stdout(predicate::str::contains("Rejected: 0"))
        .stdout(predicate::str::contains("Approval rate: 50%"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_admin_approve_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/admin/approve/5"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = forexpay(&server);
    cmd.args(["admin", "approve", "5"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("User approved successfully!"));
}
