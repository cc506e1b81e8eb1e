use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub title: String,
}

/// What `/echo` saw: request headers (lowercased names) and the raw query.
#[derive(Debug, Serialize, Deserialize)]
pub struct Echo {
    pub headers: BTreeMap<String, Vec<String>>,
    pub query: Option<String>,
}

pub type Items = Arc<HashMap<Uuid, Item>>;

/// Body of `/bin`: not valid UTF-8.
pub const BINARY_BODY: &[u8] = &[0xff, 0xfe, 0x00, 0x01];

/// Items every fresh server starts with.
pub fn seed() -> Vec<Item> {
    vec![
        Item {
            id: Uuid::from_u128(1),
            title: "First".to_string(),
        },
        Item {
            id: Uuid::from_u128(2),
            title: "Second".to_string(),
        },
    ]
}

pub fn app() -> Router {
    app_with(seed())
}

pub fn app_with(items: Vec<Item>) -> Router {
    let items: Items = Arc::new(items.into_iter().map(|item| (item.id, item)).collect());
    Router::new()
        .route("/items", get(list_items))
        .route("/items/{id}", get(get_item))
        .route("/echo", get(echo))
        .route("/fail", get(fail))
        .route("/created", get(created))
        .route("/bin", get(binary))
        .with_state(items)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_items(State(items): State<Items>) -> Json<Vec<Item>> {
    let mut all: Vec<Item> = items.values().cloned().collect();
    all.sort_by_key(|item| item.id);
    Json(all)
}

async fn get_item(
    State(items): State<Items>,
    Path(id): Path<Uuid>,
) -> Result<Json<Item>, StatusCode> {
    items.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn echo(headers: HeaderMap, RawQuery(query): RawQuery) -> Json<Echo> {
    let mut seen: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in &headers {
        if let Ok(value) = value.to_str() {
            seen.entry(name.as_str().to_string())
                .or_default()
                .push(value.to_string());
        }
    }
    Json(Echo {
        headers: seen,
        query,
    })
}

async fn fail() -> impl IntoResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "text/plain")],
        "boom",
    )
}

async fn created() -> StatusCode {
    StatusCode::CREATED
}

async fn binary() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/octet-stream")], BINARY_BODY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_serializes_to_json() {
        let item = Item {
            id: Uuid::nil(),
            title: "Test".to_string(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["title"], "Test");
    }

    #[test]
    fn seed_ids_are_distinct() {
        let items = seed();
        assert_eq!(items.len(), 2);
        assert_ne!(items[0].id, items[1].id);
    }

    #[test]
    fn echo_omits_missing_query() {
        let echo: Echo = serde_json::from_str(r#"{"headers":{},"query":null}"#).unwrap();
        assert!(echo.query.is_none());
        assert!(echo.headers.is_empty());
    }
}
