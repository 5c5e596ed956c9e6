use crate::utils::{appointment_body, spawn_app, spawn_app_with, spawn_app_with_clock, HAL_JSON};
use chrono::{Duration, NaiveDate};
use easyappoint::calendar::OverlapRule;
use easyappoint::clock::SystemClock;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

#[tokio::test]
async fn booking_appointment_returns_201_and_can_be_fetched() {
    let app = spawn_app().await;
    let body = appointment_body("Smith", "2099-01-01T10:00", "2099-01-01T11:00");

    let response = app.post_appointment(&body).await;

    assert_eq!(201, response.status().as_u16());
    let location = response.headers()["Location"]
        .to_str()
        .expect("Location is not ASCII")
        .to_string();
    let created: Value = response.json().await.expect("Failed to parse response.");
    let id = created["id"].as_str().unwrap();
    assert_eq!(
        location,
        format!("http://127.0.0.1:{}/api/appointments/{}", app.port, id)
    );
    assert_eq!(
        created,
        json!({
            "id": id,
            "doctor": "Smith",
            "patient": "Jones",
            "startDate": "2099-01-01T10:00:00",
            "endDate": "2099-01-01T11:00:00",
        })
    );

    let fetched = app.get(&format!("/api/appointments/{}", id)).await;
    assert_eq!(200, fetched.status().as_u16());
    let fetched: Value = fetched.json().await.unwrap();
    assert_eq!(fetched, created);
}

#[rstest]
#[case::same_start("2099-01-01T10:00", "2099-01-01T10:30")]
#[case::same_end("2099-01-01T10:30", "2099-01-01T11:00")]
#[case::existing_end_inside("2099-01-01T10:30", "2099-01-01T11:30")]
#[case::existing_start_inside("2099-01-01T09:30", "2099-01-01T10:30")]
#[tokio::test]
async fn overlapping_appointment_returns_409(#[case] start: &str, #[case] end: &str) {
    let app = spawn_app().await;
    app.book("Smith", "2099-01-01T10:00", "2099-01-01T11:00").await;

    let response = app.post_appointment(&appointment_body("Smith", start, end)).await;

    assert_eq!(409, response.status().as_u16());
    let listed: Vec<Value> = app.get("/api/appointments").await.json().await.unwrap();
    assert_eq!(1, listed.len());
}

#[tokio::test]
async fn appointment_inside_an_existing_one_is_accepted_by_default() {
    let app = spawn_app().await;
    app.book("Smith", "2099-01-01T10:00", "2099-01-01T11:00").await;

    let response = app
        .post_appointment(&appointment_body("Smith", "2099-01-01T10:15", "2099-01-01T10:45"))
        .await;

    assert_eq!(201, response.status().as_u16());
}

#[tokio::test]
async fn appointment_inside_an_existing_one_is_rejected_by_interval_rule() {
    let app = spawn_app_with(OverlapRule::Interval, Arc::new(SystemClock)).await;
    app.book("Smith", "2099-01-01T10:00", "2099-01-01T11:00").await;

    let response = app
        .post_appointment(&appointment_body("Smith", "2099-01-01T10:15", "2099-01-01T10:45"))
        .await;

    assert_eq!(409, response.status().as_u16());
}

#[tokio::test]
async fn same_slot_with_another_doctor_is_accepted() {
    let app = spawn_app().await;
    app.book("Smith", "2099-01-01T10:00", "2099-01-01T11:00").await;
    app.book("Adams", "2099-01-01T10:00", "2099-01-01T11:00").await;
}

#[rstest]
#[case::inverted(json!({"doctor": "Smith", "patient": "Jones", "startDate": "2099-01-01T11:00", "endDate": "2099-01-01T10:00"}), "appointment")]
#[case::equal(json!({"doctor": "Smith", "patient": "Jones", "startDate": "2099-01-01T10:00", "endDate": "2099-01-01T10:00"}), "appointment")]
#[case::past(json!({"doctor": "Smith", "patient": "Jones", "startDate": "2000-01-01T10:00", "endDate": "2000-01-01T11:00"}), "appointment")]
#[case::missing_end(json!({"doctor": "Smith", "patient": "Jones", "startDate": "2099-01-01T10:00"}), "appointment")]
#[case::blank_patient(json!({"doctor": "Smith", "patient": " ", "startDate": "2099-01-01T10:00", "endDate": "2099-01-01T11:00"}), "patient")]
#[case::missing_doctor(json!({"patient": "Jones", "startDate": "2099-01-01T10:00", "endDate": "2099-01-01T11:00"}), "doctor")]
#[tokio::test]
async fn invalid_appointment_returns_400_with_field_errors(#[case] body: Value, #[case] field: &str) {
    let app = spawn_app().await;

    let response = app.post_appointment(&body).await;

    assert_eq!(400, response.status().as_u16());
    let error: Value = response.json().await.unwrap();
    let fields: Vec<&str> = error["errors"]
        .as_array()
        .expect("missing field errors")
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert_eq!(vec![field], fields);
    assert!(app.get("/api/doctors").await.json::<Vec<Value>>().await.unwrap().is_empty());
}

#[rstest]
#[case("bad input")]
#[case(r#"{"doctor": "Smith", "startDate": "not a date"}"#)]
#[tokio::test]
async fn malformed_body_returns_400(#[case] input: &str) {
    let app = spawn_app().await;

    let response = app
        .api_client
        .post(format!("{}/api/appointments", &app.address))
        .header("Content-Type", "application/json")
        .body(input.to_string())
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn listing_filters_by_date() {
    let app = spawn_app().await;
    app.book("Smith", "2099-01-01T09:00", "2099-01-01T10:00").await;
    let late = app.book("Smith", "2099-01-01T14:00", "2099-01-01T15:00").await;

    let all: Vec<Value> = app.get("/api/appointments").await.json().await.unwrap();
    assert_eq!(2, all.len());

    let response = app.get("/api/appointments?date=2099-01-01T09:00").await;
    assert_eq!(200, response.status().as_u16());
    let after: Vec<Value> = response.json().await.unwrap();
    assert_eq!(1, after.len());
    assert_eq!(late, after[0]["id"]);
}

#[tokio::test]
async fn fractional_seconds_are_truncated_on_input() {
    let app = spawn_app().await;

    let response = app
        .post_appointment(&appointment_body(
            "Smith",
            "2099-01-01T10:00:00.500",
            "2099-01-01T11:00:00",
        ))
        .await;
    assert_eq!(201, response.status().as_u16());
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["startDate"], "2099-01-01T10:00:00");
    let id = created["id"].as_str().unwrap().to_string();

    let fetched: Value = app
        .get(&format!("/api/appointments/{}", id))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, created);

    let after: Vec<Value> = app
        .get("/api/appointments?date=2099-01-01T10:00:00")
        .await
        .json()
        .await
        .unwrap();
    assert!(after.is_empty());

    // Collapses to a zero-length range.
    let response = app
        .post_appointment(&appointment_body(
            "Smith",
            "2099-01-01T10:00:00",
            "2099-01-01T10:00:00.250",
        ))
        .await;
    assert_eq!(400, response.status().as_u16());

    let response = app
        .post_appointment(&appointment_body(
            "Smith",
            "2099-01-01T10:00:00",
            "2099-01-01T10:30:00",
        ))
        .await;
    assert_eq!(409, response.status().as_u16());
}

#[rstest]
#[case("yesterday")]
#[case("2099-01-01")]
#[case("2099-02-30T10:00")]
#[tokio::test]
async fn listing_with_unparsable_date_returns_400(#[case] date: &str) {
    let app = spawn_app().await;

    let response = app.get(&format!("/api/appointments?date={}", date)).await;

    assert_eq!(400, response.status().as_u16());
}

#[rstest]
#[case::unknown(Uuid::new_v4().to_string())]
#[case::not_an_id("42".to_string())]
#[tokio::test]
async fn fetching_unknown_appointment_returns_404(#[case] id: String) {
    let app = spawn_app().await;

    let response = app.get(&format!("/api/appointments/{}", id)).await;

    assert_eq!(404, response.status().as_u16());
}

#[rstest]
#[case::get(reqwest::Method::GET, "/api/appointments/42")]
#[case::put(reqwest::Method::PUT, "/api/appointments/42")]
#[case::delete(reqwest::Method::DELETE, "/api/appointments/42")]
#[case::cancel(reqwest::Method::DELETE, "/42/cancel")]
#[case::api_cancel(reqwest::Method::DELETE, "/api/42/cancel")]
#[tokio::test]
async fn non_uuid_id_returns_json_404(#[case] method: reqwest::Method, #[case] path: &str) {
    let app = spawn_app().await;

    let response = app
        .api_client
        .request(method, format!("{}{}", app.address, path))
        .json(&appointment_body("Smith", "2099-01-01T10:00", "2099-01-01T11:00"))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(404, response.status().as_u16());
    assert_eq!(
        "application/json",
        response.headers()["content-type"].to_str().unwrap()
    );
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "status": 404,
            "error": "Not Found",
            "message": "could not find appointment 42",
        })
    );
}

#[tokio::test]
async fn replacing_existing_appointment_overwrites_it() {
    let app = spawn_app().await;
    let id = app.book("Smith", "2099-01-01T09:00", "2099-01-01T10:00").await;

    let mut body = appointment_body("Smith", "2099-01-02T09:00", "2099-01-02T10:00");
    body["patient"] = json!("Doe");
    let response = app.put_appointment(&id, &body).await;

    assert_eq!(200, response.status().as_u16());
    let fetched: Value = app.get(&format!("/api/appointments/{}", id)).await.json().await.unwrap();
    assert_eq!(fetched["patient"], "Doe");
    assert_eq!(fetched["startDate"], "2099-01-02T09:00:00");
}

#[tokio::test]
async fn replacing_skips_the_overlap_check() {
    let app = spawn_app().await;
    app.book("Smith", "2099-01-01T09:00", "2099-01-01T10:00").await;
    let other = app.book("Smith", "2099-01-01T13:00", "2099-01-01T14:00").await;

    let response = app
        .put_appointment(&other, &appointment_body("Smith", "2099-01-01T09:00", "2099-01-01T10:00"))
        .await;

    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn replacing_unknown_appointment_creates_it_under_that_id() {
    let app = spawn_app().await;
    let id = Uuid::new_v4().to_string();

    let response = app
        .put_appointment(&id, &appointment_body("Smith", "2099-01-01T09:00", "2099-01-01T10:00"))
        .await;

    assert_eq!(200, response.status().as_u16());
    let fetched: Value = app.get(&format!("/api/appointments/{}", id)).await.json().await.unwrap();
    assert_eq!(fetched["id"], id.as_str());
}

#[tokio::test]
async fn replacing_with_invalid_dates_returns_400() {
    let app = spawn_app().await;
    let id = app.book("Smith", "2099-01-01T09:00", "2099-01-01T10:00").await;

    let response = app
        .put_appointment(&id, &appointment_body("Smith", "2099-01-01T10:00", "2099-01-01T09:00"))
        .await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn deleting_appointment_returns_the_record_then_404() {
    let app = spawn_app().await;
    let id = app.book("Smith", "2099-01-01T09:00", "2099-01-01T10:00").await;

    let response = app.delete(&format!("/api/appointments/{}", id)).await;
    assert_eq!(200, response.status().as_u16());
    let deleted: Value = response.json().await.unwrap();
    assert_eq!(deleted["id"], id.as_str());

    let response = app.delete(&format!("/api/appointments/{}", id)).await;
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn deleting_all_appointments_empties_the_list() {
    let app = spawn_app().await;
    app.book("Smith", "2099-01-01T09:00", "2099-01-01T10:00").await;
    app.book("Adams", "2099-01-01T09:00", "2099-01-01T10:00").await;

    let response = app.delete("/api/appointments").await;

    assert_eq!(200, response.status().as_u16());
    let all: Vec<Value> = app.get("/api/appointments").await.json().await.unwrap();
    assert!(all.is_empty());
}

#[rstest]
#[case::root("/{}/cancel")]
#[case::api("/api/{}/cancel")]
#[tokio::test]
async fn cancelling_future_appointment_removes_it(#[case] path: &str) {
    let app = spawn_app().await;
    let id = app.book("Smith", "2099-01-01T09:00", "2099-01-01T10:00").await;

    let response = app.delete(&path.replace("{}", &id)).await;

    assert_eq!(200, response.status().as_u16());
    let response = app.get(&format!("/api/appointments/{}", id)).await;
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn cancelling_unknown_appointment_returns_404() {
    let app = spawn_app().await;

    let response = app.delete(&format!("/{}/cancel", Uuid::new_v4())).await;

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn cancelling_started_appointment_returns_409() {
    let now = NaiveDate::from_ymd_opt(2030, 1, 1)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap();
    let (app, clock) = spawn_app_with_clock(now).await;
    let id = app.book("Smith", "2030-01-01T09:00", "2030-01-01T10:00").await;
    clock.advance(Duration::minutes(90));

    let response = app.delete(&format!("/{}/cancel", id)).await;

    assert_eq!(409, response.status().as_u16());
    let response = app.get(&format!("/api/appointments/{}", id)).await;
    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn hal_representation_carries_the_same_fields_plus_links() {
    let app = spawn_app().await;
    let id = app.book("Smith", "2099-01-01T09:00", "2099-01-01T10:00").await;
    let path = format!("/api/appointments/{}", id);

    let plain: Value = app.get(&path).await.json().await.unwrap();
    let response = app.get_hal(&path).await;

    assert_eq!(200, response.status().as_u16());
    assert_eq!(response.headers()["Content-Type"], HAL_JSON);
    let mut hal: Value = response.json().await.unwrap();
    let links = hal.as_object_mut().unwrap().remove("_links").unwrap();
    assert_eq!(hal, plain);
    assert_eq!(links["self"]["href"], format!("{}{}", app.address, path));
    assert_eq!(links["appointments"]["href"], format!("{}/api/appointments", app.address));
    assert_eq!(links["cancel"]["href"], format!("{}/api/{}/cancel", app.address, id));
}

#[tokio::test]
async fn hal_listing_embeds_appointments() {
    let app = spawn_app().await;
    let id = app.book("Smith", "2099-01-01T09:00", "2099-01-01T10:00").await;

    let response = app.get_hal("/api/appointments").await;

    assert_eq!(200, response.status().as_u16());
    let hal: Value = response.json().await.unwrap();
    assert_eq!(hal["_embedded"]["appointmentList"][0]["id"], id.as_str());
    assert_eq!(hal["_links"]["self"]["href"], format!("{}/api/appointments", app.address));
}

#[tokio::test]
async fn hal_booking_returns_a_resource() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .post(format!("{}/api/appointments", &app.address))
        .header("Accept", HAL_JSON)
        .json(&appointment_body("Smith", "2099-01-01T09:00", "2099-01-01T10:00"))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(201, response.status().as_u16());
    assert!(response.headers().contains_key("Location"));
    let hal: Value = response.json().await.unwrap();
    assert_eq!(hal["doctor"], "Smith");
    assert!(hal["_links"]["self"]["href"].is_string());
}

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app().await;

    let response = app.get("/health_check").await;

    assert!(response.status().is_success());
    assert_eq!(Some(0), response.content_length());
}
