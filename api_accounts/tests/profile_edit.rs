mod support;

use actix_web::{http::StatusCode, test};
use bigdecimal::BigDecimal;
use serde_json::{Value, json};
use support::{Harness, PDF_BASE64, PNG_BASE64, bearer};

fn pdf(name: &str) -> Value {
    json!({ "filename": name, "content_base64": PDF_BASE64 })
}

#[actix_web::test]
async fn profile_requires_a_token() {
    let harness = Harness::new().await;
    let app = test::init_service(harness.app()).await;

    for req in [
        test::TestRequest::get().uri("/api/account/profile").to_request(),
        test::TestRequest::post()
            .uri("/api/account/profile/edit")
            .set_json(json!({}))
            .to_request(),
    ] {
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}

#[actix_web::test]
async fn approved_documents_ignore_new_certificates() {
    let harness = Harness::new().await;
    let app = test::init_service(harness.app()).await;
    let (user, token) = harness
        .tutor(|u| {
            u.documents_approved = true;
            u.qts_certificate = Some("documents/original.pdf".to_string());
        })
        .await;

    let req = test::TestRequest::post()
        .uri("/api/account/profile/edit")
        .insert_header(bearer(&token))
        .set_json(json!({ "qts_certificate": pdf("forged.pdf") }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let stored = harness.stored(&user).await;
    assert_eq!(stored.qts_certificate.as_deref(), Some("documents/original.pdf"));
    assert!(harness.files.is_empty());
    assert_eq!(harness.store.profile_writes().unwrap(), 0);
}

#[actix_web::test]
async fn pending_documents_accept_new_certificates() {
    let harness = Harness::new().await;
    let app = test::init_service(harness.app()).await;
    let (user, token) = harness
        .tutor(|u| u.qts_certificate = Some("documents/original.pdf".to_string()))
        .await;

    let req = test::TestRequest::post()
        .uri("/api/account/profile/edit")
        .insert_header(bearer(&token))
        .set_json(json!({ "qts_certificate": pdf("my qts.pdf") }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let stored = harness.stored(&user).await;
    let path = stored.qts_certificate.unwrap();
    assert_ne!(path, "documents/original.pdf");
    assert!(path.starts_with("documents/") && path.ends_with(".pdf"));
    assert_eq!(body["qts_certificate_url"], format!("/media/{}", path));
    assert_eq!(harness.files.len(), 1);
}

#[actix_web::test]
async fn referee_fields_lock_together() {
    let harness = Harness::new().await;
    let app = test::init_service(harness.app()).await;
    let (user, token) = harness
        .tutor(|u| {
            u.references_approved = true;
            u.referee1_name = "Grace Hopper".to_string();
            u.referee1_email = "grace@example.com".to_string();
        })
        .await;

    let req = test::TestRequest::post()
        .uri("/api/account/profile/edit")
        .insert_header(bearer(&token))
        .set_json(json!({
            "referee1_name": "Someone Else",
            "referee1_email": "else@example.com",
            "referee2_name": "Another",
            "referee2_email": "another@example.com",
            "first_name": "Augusta",
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let stored = harness.stored(&user).await;
    assert_eq!(stored.first_name, "Augusta");
    assert_eq!(stored.referee1_name, "Grace Hopper");
    assert_eq!(stored.referee1_email, "grace@example.com");
    assert_eq!(stored.referee2_name, "");
    assert_eq!(stored.referee2_email, "");
}

#[actix_web::test]
async fn edit_form_reflects_approvals() {
    let harness = Harness::new().await;
    let app = test::init_service(harness.app()).await;
    let (_, token) = harness.tutor(|u| u.documents_approved = true).await;

    let req = test::TestRequest::get()
        .uri("/api/account/profile/edit")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let names: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();

    assert_eq!(names.len(), 11);
    assert!(!names.contains(&"qts_certificate"));
    assert!(!names.contains(&"dbs_certificate"));
    assert!(names.contains(&"referee2_email"));
    assert_eq!(body["choices"]["subjects"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn empty_submission_is_a_no_op() {
    let harness = Harness::new().await;
    let app = test::init_service(harness.app()).await;
    let (_, token) = harness.tutor(|_| {}).await;

    let req = test::TestRequest::post()
        .uri("/api/account/profile/edit")
        .insert_header(bearer(&token))
        .set_json(json!({}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(harness.store.profile_writes().unwrap(), 0);
}

#[actix_web::test]
async fn invalid_submission_saves_nothing() {
    let harness = Harness::new().await;
    let app = test::init_service(harness.app()).await;
    let (user, token) = harness.tutor(|_| {}).await;

    let req = test::TestRequest::post()
        .uri("/api/account/profile/edit")
        .insert_header(bearer(&token))
        .set_json(json!({
            "first_name": "Augusta",
            "cost": "12.345",
            "profile_picture": pdf("me.pdf"),
            "subject_levels": [1, 42],
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(res).await;
    let fields = body["fields"].as_object().unwrap();
    let mut names: Vec<&str> = fields.keys().map(String::as_str).collect();
    names.sort();
    assert_eq!(names, ["cost", "profile_picture", "subject_levels"]);

    assert_eq!(harness.stored(&user).await.first_name, "Ada");
    assert_eq!(harness.store.profile_writes().unwrap(), 0);
    assert!(harness.files.is_empty());
}

#[actix_web::test]
async fn approval_flags_cannot_be_self_assigned() {
    let harness = Harness::new().await;
    let app = test::init_service(harness.app()).await;
    let (user, token) = harness.tutor(|_| {}).await;

    let req = test::TestRequest::post()
        .uri("/api/account/profile/edit")
        .insert_header(bearer(&token))
        .set_json(json!({
            "documents_approved": true,
            "references_approved": true,
            "id_check_completed": true,
            "is_staff": true,
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let stored = harness.stored(&user).await;
    assert!(!stored.documents_approved);
    assert!(!stored.references_approved);
    assert!(!stored.id_check_completed);
    assert!(!stored.is_staff);
}

#[actix_web::test]
async fn approving_documents_completes_the_profile() {
    let harness = Harness::new().await;
    let app = test::init_service(harness.app()).await;
    let (user, token) = harness
        .tutor(|u| {
            u.references_approved = true;
            u.id_check_completed = true;
        })
        .await;

    let req = test::TestRequest::post()
        .uri("/api/account/profile/edit")
        .insert_header(bearer(&token))
        .set_json(json!({
            "cost": 30,
            "subjects": [1],
            "subject_levels": [2],
            "profile_picture": { "filename": "me.png", "content_base64": PNG_BASE64 },
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["verification"]["profile_complete"], false);
    assert!(
        body["profile_picture_url"]
            .as_str()
            .unwrap()
            .starts_with("/media/profile_pics/")
    );

    let mut stored = harness.stored(&user).await;
    assert_eq!(stored.cost, Some(BigDecimal::from(30)));
    stored.documents_approved = true;
    harness.store.put_user(stored).unwrap();

    let req = test::TestRequest::get()
        .uri("/api/account/profile")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["verification"]["profile_complete"], true);
    assert_eq!(body["subjects"][0]["name"], "Maths");
    assert_eq!(body["subject_levels"][0]["name"], "A-Level");
}

#[actix_web::test]
async fn deactivated_tutor_cannot_edit_with_an_old_token() {
    let harness = Harness::new().await;
    let app = test::init_service(harness.app()).await;
    let (mut user, token) = harness.tutor(|_| {}).await;
    user.is_active = false;
    harness.store.put_user(user.clone()).unwrap();

    let req = test::TestRequest::post()
        .uri("/api/account/profile/edit")
        .insert_header(bearer(&token))
        .set_json(json!({ "first_name": "Mallory" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(harness.stored(&user).await.first_name, "Ada");
    assert_eq!(harness.store.profile_writes().unwrap(), 0);
}
