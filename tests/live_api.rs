//! Live end-to-end API coverage against a running mensa instance.
//!
//! - Reads the base URL from `MENSA_LIVE_BASE_URL` (default `http://127.0.0.1:8000`).
//! - Sends real HTTP requests; the server must be running with a database.
//! - Marked `#[ignore]` so it only runs manually: `cargo test -- --ignored`.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

type TestResult<T> = Result<T, Box<dyn std::error::Error>>;

const EXPORT_POLL_INTERVAL: Duration = Duration::from_millis(200);
const EXPORT_POLL_ATTEMPTS: u32 = 50;

fn base_url() -> String {
    std::env::var("MENSA_LIVE_BASE_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:8000".to_string())
        .trim_end_matches('/')
        .to_string()
}

async fn post_json(
    client: &Client,
    base: &str,
    path: &str,
    body: &Value,
    expected: StatusCode,
) -> TestResult<Value> {
    let response = client
        .post(format!("{base}{path}"))
        .json(body)
        .send()
        .await?;
    assert_eq!(response.status(), expected, "POST {path}");
    Ok(response.json().await?)
}

async fn get_json(
    client: &Client,
    base: &str,
    path: &str,
    expected: StatusCode,
) -> TestResult<Value> {
    let response = client.get(format!("{base}{path}")).send().await?;
    assert_eq!(response.status(), expected, "GET {path}");
    Ok(response.json().await?)
}

async fn patch_json(
    client: &Client,
    base: &str,
    path: &str,
    body: &Value,
    expected: StatusCode,
) -> TestResult<Value> {
    let response = client
        .patch(format!("{base}{path}"))
        .json(body)
        .send()
        .await?;
    assert_eq!(response.status(), expected, "PATCH {path}");
    Ok(response.json().await?)
}

async fn delete(
    client: &Client,
    base: &str,
    path: &str,
    expected: StatusCode,
) -> TestResult<Value> {
    let response = client.delete(format!("{base}{path}")).send().await?;
    assert_eq!(response.status(), expected, "DELETE {path}");
    Ok(response.json().await?)
}

const MISSING_ID: &str = "00000000-0000-0000-0000-000000000000";

#[tokio::test]
#[ignore]
async fn live_api_end_to_end() -> TestResult<()> {
    let base = base_url();
    let client = Client::builder().build()?;

    // MENU lifecycle
    let menu = post_json(
        &client,
        &base,
        "/api/v1/menus",
        &json!({"title": "Main", "description": "d"}),
        StatusCode::CREATED,
    )
    .await?;
    let menu_id = menu["id"].as_str().expect("menu id").to_string();
    assert_eq!(menu["title"], "Main");
    assert_eq!(menu["description"], "d");

    let detail = get_json(
        &client,
        &base,
        &format!("/api/v1/menus/{menu_id}"),
        StatusCode::OK,
    )
    .await?;
    assert_eq!(detail["id"].as_str(), Some(menu_id.as_str()));
    assert_eq!(detail["submenus_count"], 0);
    assert_eq!(detail["dishes_count"], 0);

    // Tampered but well-formed id
    let response = client
        .get(format!("{base}/api/v1/menus/{MISSING_ID}"))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Partial update leaves the other field untouched
    let updated = patch_json(
        &client,
        &base,
        &format!("/api/v1/menus/{menu_id}"),
        &json!({"title": "Updated main"}),
        StatusCode::OK,
    )
    .await?;
    assert_eq!(updated["title"], "Updated main");
    assert_eq!(updated["description"], "d");

    // SUBMENU under a missing menu
    let response = client
        .post(format!("{base}/api/v1/menus/{MISSING_ID}/submenus"))
        .json(&json!({"title": "Orphan", "description": "x"}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // SUBMENU lifecycle
    let submenu = post_json(
        &client,
        &base,
        &format!("/api/v1/menus/{menu_id}/submenus"),
        &json!({"title": "Soups", "description": "hot"}),
        StatusCode::CREATED,
    )
    .await?;
    let submenu_id = submenu["id"].as_str().expect("submenu id").to_string();

    let submenu_detail = get_json(
        &client,
        &base,
        &format!("/api/v1/menus/{menu_id}/submenus/{submenu_id}"),
        StatusCode::OK,
    )
    .await?;
    assert_eq!(submenu_detail["dishes_count"], 0);

    // DISH with a decimal price
    let dish = post_json(
        &client,
        &base,
        &format!("/api/v1/menus/{menu_id}/submenus/{submenu_id}/dishes"),
        &json!({"title": "Borscht", "description": "beetroot", "price": "12.50"}),
        StatusCode::CREATED,
    )
    .await?;
    let dish_id = dish["id"].as_str().expect("dish id").to_string();
    assert_eq!(dish["price"], "12.50");

    let second_dish = post_json(
        &client,
        &base,
        &format!("/api/v1/menus/{menu_id}/submenus/{submenu_id}/dishes"),
        &json!({"title": "Lapsha", "description": "noodles", "price": 180}),
        StatusCode::CREATED,
    )
    .await?;
    assert_eq!(second_dish["price"], "180.00");

    // Tampered dish id
    let response = client
        .get(format!(
            "{base}/api/v1/menus/{menu_id}/submenus/{submenu_id}/dishes/{MISSING_ID}"
        ))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Counts propagate to both levels after the dish writes
    let submenu_detail = get_json(
        &client,
        &base,
        &format!("/api/v1/menus/{menu_id}/submenus/{submenu_id}"),
        StatusCode::OK,
    )
    .await?;
    assert_eq!(submenu_detail["dishes_count"], 2);

    let menu_detail = get_json(
        &client,
        &base,
        &format!("/api/v1/menus/{menu_id}"),
        StatusCode::OK,
    )
    .await?;
    assert_eq!(menu_detail["submenus_count"], 1);
    assert_eq!(menu_detail["dishes_count"], 2);

    let menu_list = get_json(&client, &base, "/api/v1/menus", StatusCode::OK).await?;
    let listed = menu_list
        .as_array()
        .expect("menu list")
        .iter()
        .find(|entry| entry["id"].as_str() == Some(menu_id.as_str()))
        .expect("created menu in list");
    assert_eq!(listed["dishes_count"], 2);

    // Dish update propagates into the cached detail
    let updated_dish = patch_json(
        &client,
        &base,
        &format!("/api/v1/menus/{menu_id}/submenus/{submenu_id}/dishes/{dish_id}"),
        &json!({"price": "13.00"}),
        StatusCode::OK,
    )
    .await?;
    assert_eq!(updated_dish["price"], "13.00");
    assert_eq!(updated_dish["title"], "Borscht");

    let dish_detail = get_json(
        &client,
        &base,
        &format!("/api/v1/menus/{menu_id}/submenus/{submenu_id}/dishes/{dish_id}"),
        StatusCode::OK,
    )
    .await?;
    assert_eq!(dish_detail["price"], "13.00");

    // Delete a dish twice
    let deleted = delete(
        &client,
        &base,
        &format!("/api/v1/menus/{menu_id}/submenus/{submenu_id}/dishes/{dish_id}"),
        StatusCode::OK,
    )
    .await?;
    assert_eq!(deleted["deleted"], true);

    let response = client
        .delete(format!(
            "{base}/api/v1/menus/{menu_id}/submenus/{submenu_id}/dishes/{dish_id}"
        ))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Cascade: deleting the menu removes its submenu and dishes
    let deleted = delete(
        &client,
        &base,
        &format!("/api/v1/menus/{menu_id}"),
        StatusCode::OK,
    )
    .await?;
    assert_eq!(deleted["deleted"], true);

    let response = client
        .get(format!(
            "{base}/api/v1/menus/{menu_id}/submenus/{submenu_id}"
        ))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
#[ignore]
async fn live_seed_and_export() -> TestResult<()> {
    let base = base_url();
    let client = Client::builder().build()?;

    let seeded = post_json(&client, &base, "/api/v1/data", &json!({}), StatusCode::OK).await?;
    assert_eq!(seeded["seeded"], true);

    let menus = get_json(&client, &base, "/api/v1/menus", StatusCode::OK).await?;
    assert!(menus.as_array().expect("menu list").len() >= 2);

    let task = post_json(
        &client,
        &base,
        "/api/v1/data/tasks",
        &json!({}),
        StatusCode::CREATED,
    )
    .await?;
    let task_id = task["task_id"].as_str().expect("task id").to_string();

    let mut spreadsheet = None;
    for _ in 0..EXPORT_POLL_ATTEMPTS {
        let response = client
            .get(format!("{base}/api/v1/data/tasks/{task_id}"))
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::OK);

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if content_type.starts_with("text/csv") {
            spreadsheet = Some(response.text().await?);
            break;
        }

        tokio::time::sleep(EXPORT_POLL_INTERVAL).await;
    }

    let spreadsheet = spreadsheet.expect("export finished within the polling window");
    assert!(spreadsheet.lines().count() >= 1, "export has rows");

    // Unknown task id
    let response = client
        .get(format!("{base}/api/v1/data/tasks/{MISSING_ID}"))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}
