/// Integration tests for the menu endpoints
///
/// Drive the full router (auth middleware, handlers, repository, store)
/// through `tower::ServiceExt::oneshot`.

mod common;

use axum::http::{Method, StatusCode};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use common::TestContext;
use menucraft_shared::store::KvStore;
use serde_json::{json, Value};

fn menu(business_name: &str) -> Value {
    json!({
        "templateId": "classic",
        "businessName": business_name,
        "businessDescription": "Breakfast all day",
        "primaryColor": "#b91c1c",
        "items": [
            { "id": "1", "name": "Pancakes", "description": "Stack of three", "price": "6.50", "category": "Breakfast" },
            { "id": "2", "name": "Coffee", "description": "", "price": "2.00", "category": "Drinks" }
        ]
    })
}

#[tokio::test]
async fn test_save_assigns_slug_id() {
    let ctx = TestContext::new().await.unwrap();

    let body = ctx.save_menu(&ctx.user.token, menu("Joe's Diner")).await;

    assert_eq!(body["success"], json!(true));
    let menu_id = body["menuId"].as_str().unwrap();
    let suffix = menu_id.strip_prefix("joe-s-diner-").unwrap();
    assert_eq!(suffix.len(), 6);
    assert!(suffix.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));

    assert_eq!(body["menu"]["menuId"], json!(menu_id));
    assert_eq!(body["menu"]["userId"], json!(ctx.user.user.id));
    assert!(body["menu"]["createdAt"].is_string());
    assert!(body["menu"]["updatedAt"].is_string());
}

#[tokio::test]
async fn test_save_with_existing_id_overwrites() {
    let ctx = TestContext::new().await.unwrap();

    let first = ctx.save_menu(&ctx.user.token, menu("Joe's Diner")).await;
    let menu_id = first["menuId"].as_str().unwrap().to_string();

    let mut edited = first["menu"].clone();
    edited["businessName"] = json!("Joe's Place");
    let second = ctx.save_menu(&ctx.user.token, edited).await;

    assert_eq!(second["menuId"], json!(menu_id));
    assert_eq!(second["menu"]["createdAt"], first["menu"]["createdAt"]);

    let (status, body) = ctx.send_as_user(Method::GET, "/menus", None).await;
    assert_eq!(status, StatusCode::OK);
    let menus = body["menus"].as_array().unwrap();
    assert_eq!(menus.len(), 1);
    assert_eq!(menus[0]["businessName"], json!("Joe's Place"));
}

#[tokio::test]
async fn test_public_view_returns_latest_save() {
    let ctx = TestContext::new().await.unwrap();

    let first = ctx.save_menu(&ctx.user.token, menu("Joe's Diner")).await;
    let menu_id = first["menuId"].as_str().unwrap().to_string();

    let mut edited = first["menu"].clone();
    edited["items"] = json!([{ "id": "9", "name": "Waffles", "price": "7.00", "category": "Breakfast" }]);
    ctx.save_menu(&ctx.user.token, edited).await;

    let (status, body) = ctx
        .send(Method::GET, &format!("/menu/public/{}", menu_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["menu"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["menu"]["items"][0]["name"], json!("Waffles"));

    let (status, body) = ctx.send(Method::GET, "/menu/public/nope-000000", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("not_found"));
}

#[tokio::test]
async fn test_public_view_hides_owner() {
    let ctx = TestContext::new().await.unwrap();
    let saved = ctx.save_menu(&ctx.user.token, menu("Joe's Diner")).await;
    let menu_id = saved["menuId"].as_str().unwrap();

    let (status, body) = ctx
        .send(Method::GET, &format!("/menu/public/{}", menu_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["menu"]["businessName"], json!("Joe's Diner"));
    assert!(body["menu"].get("userId").is_none(), "{}", body);
    assert!(!body.to_string().contains(&ctx.user.user.id));
}

/// `alg: none` token naming `sub`, as anyone could build one
fn forged_token(sub: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(json!({ "alg": "none", "typ": "JWT" }).to_string());
    let exp = chrono::Utc::now().timestamp() + 3600;
    let payload = URL_SAFE_NO_PAD.encode(json!({ "sub": sub, "exp": exp }).to_string());
    format!("{}.{}.", header, payload)
}

#[tokio::test]
async fn test_forged_token_cannot_act_as_owner() {
    let ctx = TestContext::new().await.unwrap();
    let saved = ctx.save_menu(&ctx.user.token, menu("Joe's Diner")).await;
    let menu_id = saved["menuId"].as_str().unwrap().to_string();

    // Everything an anonymous caller can learn, plus the owner id itself
    let (_, public) = ctx
        .send(Method::GET, &format!("/menu/public/{}", menu_id), None, None)
        .await;
    let mut hijack = public["menu"].clone();
    hijack["businessName"] = json!("HACKED");
    let token = forged_token(&ctx.user.user.id);

    let (status, _) = ctx.send(Method::POST, "/menu", Some(&token), Some(hijack)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    for (method, path) in [
        (Method::GET, "/menus".to_string()),
        (Method::GET, format!("/menu/{}", menu_id)),
        (Method::DELETE, "/menu/item/1".to_string()),
    ] {
        let (status, _) = ctx.send(method.clone(), &path, Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, path);
    }

    let (_, after) = ctx
        .send(Method::GET, &format!("/menu/public/{}", menu_id), None, None)
        .await;
    assert_eq!(after["menu"]["businessName"], json!("Joe's Diner"));
    assert_eq!(after["menu"]["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_unauthenticated_requests_are_rejected() {
    let ctx = TestContext::new().await.unwrap();

    let cases = [
        (Method::POST, "/menu", Some(menu("Joe's"))),
        (Method::GET, "/menu", None),
        (Method::GET, "/menus", None),
        (Method::GET, "/menu/joe-s-abc123", None),
        (Method::DELETE, "/menu/item/1", None),
        (Method::POST, "/logout", None),
    ];

    for (method, path, body) in cases {
        let (status, _) = ctx.send(method.clone(), path, None, body.clone()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {} without token", method, path);

        let (status, json) = ctx.send(method.clone(), path, Some("garbage"), body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {} with bad token", method, path);
        assert_eq!(json["error"], json!("unauthorized"));
    }
}

#[tokio::test]
async fn test_list_sorted_by_updated_at_desc() {
    let ctx = TestContext::new().await.unwrap();

    let a = ctx.save_menu(&ctx.user.token, menu("Alpha")).await;
    ctx.save_menu(&ctx.user.token, menu("Bravo")).await;
    ctx.save_menu(&ctx.user.token, menu("Charlie")).await;

    // Saving Alpha again makes it the most recently updated
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    ctx.save_menu(&ctx.user.token, a["menu"].clone()).await;

    let (status, body) = ctx.send_as_user(Method::GET, "/menus", None).await;
    assert_eq!(status, StatusCode::OK);

    let menus = body["menus"].as_array().unwrap();
    assert_eq!(menus.len(), 3);
    assert_eq!(menus[0]["businessName"], json!("Alpha"));

    let stamps: Vec<&str> = menus
        .iter()
        .map(|m| m["updatedAt"].as_str().unwrap())
        .collect();
    let parsed: Vec<chrono::DateTime<chrono::Utc>> = stamps
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();
    assert!(parsed.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn test_latest_menu() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx.send_as_user(Method::GET, "/menu", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["menu"], Value::Null);

    ctx.save_menu(&ctx.user.token, menu("Alpha")).await;
    let bravo = ctx.save_menu(&ctx.user.token, menu("Bravo")).await;

    let (_, body) = ctx.send_as_user(Method::GET, "/menu", None).await;
    assert_eq!(body["menu"]["menuId"], bravo["menuId"]);
}

#[tokio::test]
async fn test_delete_item_reflected_in_public_view() {
    let ctx = TestContext::new().await.unwrap();

    let saved = ctx.save_menu(&ctx.user.token, menu("Joe's Diner")).await;
    let menu_id = saved["menuId"].as_str().unwrap().to_string();

    let (status, body) = ctx.send_as_user(Method::DELETE, "/menu/item/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["menu"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["menu"]["items"][0]["id"], json!("2"));

    let (_, latest) = ctx.send_as_user(Method::GET, "/menu", None).await;
    assert_eq!(latest["menu"]["items"].as_array().unwrap().len(), 1);

    let (_, public) = ctx
        .send(Method::GET, &format!("/menu/public/{}", menu_id), None, None)
        .await;
    assert_eq!(public["menu"]["items"], body["menu"]["items"]);

    let (status, _) = ctx.send_as_user(Method::DELETE, "/menu/item/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_item_without_menu_is_404() {
    let ctx = TestContext::new().await.unwrap();
    let (status, body) = ctx.send_as_user(Method::DELETE, "/menu/item/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("not_found"));
}

#[tokio::test]
async fn test_other_users_menu_is_protected() {
    let ctx = TestContext::new().await.unwrap();
    let other = ctx.create_user("Other Place").await.unwrap();

    let saved = ctx.save_menu(&ctx.user.token, menu("Joe's Diner")).await;
    let menu_id = saved["menuId"].as_str().unwrap().to_string();

    // Read by id
    let (status, _) = ctx
        .send(Method::GET, &format!("/menu/{}", menu_id), Some(&other.token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = ctx
        .send_as_user(Method::GET, &format!("/menu/{}", menu_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["menu"]["menuId"], json!(menu_id));

    // Overwrite by id
    let mut hijack = menu("Hijacked");
    hijack["menuId"] = json!(menu_id);
    let (status, body) = ctx
        .send(Method::POST, "/menu", Some(&other.token), Some(hijack))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], json!("forbidden"));

    let (_, public) = ctx
        .send(Method::GET, &format!("/menu/public/{}", menu_id), None, None)
        .await;
    assert_eq!(public["menu"]["businessName"], json!("Joe's Diner"));

    let (_, listed) = ctx.send(Method::GET, "/menus", Some(&other.token), None).await;
    assert!(listed["menus"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_menu_is_400() {
    let ctx = TestContext::new().await.unwrap();

    let mut bad = menu("");
    let (status, body) = ctx.send_as_user(Method::POST, "/menu", Some(bad.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("validation_error"));
    assert!(body["details"]
        .as_array()
        .unwrap()
        .iter()
        .any(|d| d["field"] == json!("business_name")));

    bad = menu("Joe's");
    bad["menuId"] = json!("../../etc/passwd");
    let (status, _) = ctx.send_as_user(Method::POST, "/menu", Some(bad)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = ctx
        .send_as_user(Method::POST, "/menu", Some(json!({ "items": "not a list" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("bad_request"));
}

#[tokio::test]
async fn test_unknown_fields_survive_roundtrip() {
    let ctx = TestContext::new().await.unwrap();

    let mut with_extra = menu("Joe's Diner");
    with_extra["showPrices"] = json!(false);
    with_extra["layout"] = json!({ "columns": 2 });
    let saved = ctx.save_menu(&ctx.user.token, with_extra).await;

    let (_, body) = ctx
        .send_as_user(Method::GET, &format!("/menu/{}", saved["menuId"].as_str().unwrap()), None)
        .await;
    assert_eq!(body["menu"]["showPrices"], json!(false));
    assert_eq!(body["menu"]["layout"]["columns"], json!(2));
}

#[tokio::test]
async fn test_storage_layout() {
    let ctx = TestContext::new().await.unwrap();
    let saved = ctx.save_menu(&ctx.user.token, menu("Joe's Diner")).await;
    let menu_id = saved["menuId"].as_str().unwrap();
    let user_id = &ctx.user.user.id;

    assert!(ctx.store.get(&format!("menu:{}", menu_id)).await.unwrap().is_some());
    assert_eq!(
        ctx.store.get(&format!("user_menus:{}", user_id)).await.unwrap(),
        Some(json!([menu_id]))
    );
    assert_eq!(
        ctx.store.get(&format!("user_latest_menu:{}", user_id)).await.unwrap(),
        Some(json!(menu_id))
    );
}

#[tokio::test]
async fn test_templates_are_public() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx.send(Method::GET, "/templates", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let templates = body["templates"].as_array().unwrap();
    assert!(!templates.is_empty());
    assert!(templates.iter().any(|t| t["id"] == json!("classic")));
}
