//! Canteen menu pipeline.
//!
//! Fetches `GET {base}/locations/{id}/menu/{YYYY-MM-DD}` and turns the `meals`
//! array into a [`MenuTable`] of (name, student price) rows, in API order.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::transport::{fetch_json, Fetch, FetchError};

/// Errors from loading one location's menu.
#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("invalid menu URL: {0}")]
    InvalidUrl(String),

    #[error("response has no 'meals' array")]
    MissingMeals,
}

/// One menu item with its student price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealOffer {
    pub name: String,
    pub student_price: f64,
}

/// An upstream record that could not be turned into a row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedOffer {
    /// Index in the upstream `meals` array
    pub position: usize,
    pub reason: String,
}

/// Offers of one location for one day, in upstream order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MenuTable {
    pub rows: Vec<MealOffer>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedOffer>,
}

impl MenuTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// URL of a location's menu for `date`; the id is path-encoded.
pub fn menu_url(base_url: &str, location_id: &str, date: NaiveDate) -> Result<String, MenuError> {
    let mut url =
        reqwest::Url::parse(base_url).map_err(|e| MenuError::InvalidUrl(e.to_string()))?;
    let date = date.format("%Y-%m-%d").to_string();
    url.path_segments_mut()
        .map_err(|_| MenuError::InvalidUrl(format!("{base_url} cannot be a base")))?
        .pop_if_empty()
        .extend(["locations", location_id, "menu", date.as_str()]);
    Ok(url.to_string())
}

/// Fetch and normalize the menu of one location.
pub async fn fetch_menu<F: Fetch + ?Sized>(
    fetcher: &F,
    base_url: &str,
    location_id: &str,
    date: NaiveDate,
) -> Result<MenuTable, MenuError> {
    let url = menu_url(base_url, location_id, date)?;
    let body = fetch_json(fetcher, &url).await?;
    let table = normalize(&body)?;
    log::info!(
        "location {}: {} offers ({} skipped)",
        location_id,
        table.rows.len(),
        table.skipped.len()
    );
    Ok(table)
}

/// Normalize a full menu response body.
pub fn normalize(body: &Value) -> Result<MenuTable, MenuError> {
    let meals = body
        .get("meals")
        .and_then(Value::as_array)
        .ok_or(MenuError::MissingMeals)?;
    Ok(normalize_offers(meals))
}

/// Map each offer to a row. Records lacking `name` or `price.student` are
/// skipped and reported, so `rows + skipped == offers.len()`.
pub fn normalize_offers(offers: &[Value]) -> MenuTable {
    let mut table = MenuTable::default();
    for (position, offer) in offers.iter().enumerate() {
        match parse_offer(offer) {
            Ok(row) => table.rows.push(row),
            Err(reason) => {
                log::warn!("skipping offer #{}: {}", position, reason);
                table.skipped.push(SkippedOffer { position, reason });
            }
        }
    }
    table
}

fn parse_offer(offer: &Value) -> Result<MealOffer, String> {
    let name = offer
        .get("name")
        .and_then(Value::as_str)
        .ok_or("missing 'name'")?;
    let price = offer
        .get("price")
        .and_then(|p| p.get("student"))
        .ok_or("missing 'price.student'")?;
    let student_price = match price {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    }
    .ok_or_else(|| format!("'price.student' is not a number: {price}"))?;

    Ok(MealOffer {
        name: name.to_string(),
        student_price,
    })
}

/// Price cell text, e.g. `3.50 €`.
pub fn format_price(price: f64) -> String {
    format!("{:.2} €", price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::StaticFetcher;
    use serde_json::json;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 13).unwrap()
    }

    #[test]
    fn url_layout() {
        let url = menu_url("https://sls.api.stw-on.de/v1", "101", date()).unwrap();
        assert_eq!(url, "https://sls.api.stw-on.de/v1/locations/101/menu/2024-05-13");
    }

    #[test]
    fn url_trailing_slash_and_encoding() {
        let url = menu_url("https://sls.api.stw-on.de/v1/", "a b", date()).unwrap();
        assert_eq!(url, "https://sls.api.stw-on.de/v1/locations/a%20b/menu/2024-05-13");
    }

    #[test]
    fn url_rejects_garbage_base() {
        assert!(matches!(
            menu_url("not a url", "101", date()),
            Err(MenuError::InvalidUrl(_))
        ));
    }

    #[test]
    fn normalize_keeps_order_and_prices() {
        let body = json!({"meals": [
            {"name": "Pasta", "price": {"student": 3.5}},
            {"name": "Salad", "price": {"student": 2.2}},
        ]});
        let table = normalize(&body).unwrap();
        assert_eq!(
            table.rows,
            vec![
                MealOffer { name: "Pasta".into(), student_price: 3.5 },
                MealOffer { name: "Salad".into(), student_price: 2.2 },
            ]
        );
        assert!(table.skipped.is_empty());
        assert_eq!(format_price(table.rows[0].student_price), "3.50 €");
        assert_eq!(format_price(table.rows[1].student_price), "2.20 €");
    }

    #[test]
    fn normalize_keeps_duplicates() {
        let offer = json!({"name": "Soup", "price": {"student": 1.0}});
        let table = normalize_offers(&[offer.clone(), offer]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn normalize_skips_incomplete_records() {
        let offers = vec![
            json!({"name": "Curry", "price": {"student": 3.1, "employee": 4.5}}),
            json!({"price": {"student": 1.0}}),
            json!({"name": "Dessert", "price": {"guest": 2.0}}),
            json!({"name": "Bowl", "price": {"student": "2,90"}}),
            json!({"name": "Tea", "price": {"student": true}}),
        ];
        let table = normalize_offers(&offers);

        assert_eq!(table.rows.len() + table.skipped.len(), offers.len());
        let names: Vec<_> = table.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Curry", "Bowl"]);
        assert_eq!(table.rows[1].student_price, 2.9);

        let positions: Vec<_> = table.skipped.iter().map(|s| s.position).collect();
        assert_eq!(positions, [1, 2, 4]);
        assert!(table.skipped[0].reason.contains("name"));
        assert!(table.skipped[1].reason.contains("price.student"));
    }

    #[test]
    fn normalize_requires_meals_array() {
        assert!(matches!(
            normalize(&json!({"meals": "none"})),
            Err(MenuError::MissingMeals)
        ));
        assert!(matches!(normalize(&json!({})), Err(MenuError::MissingMeals)));
        assert!(normalize(&json!({"meals": []})).unwrap().is_empty());
    }

    #[tokio::test]
    async fn fetch_menu_uses_dated_url() {
        let fetcher = StaticFetcher::new().with(
            "http://menu.test/v1/locations/105/menu/2024-05-13",
            r#"{"meals":[{"name":"Pasta","price":{"student":3.5}}]}"#,
        );
        let table = fetch_menu(&fetcher, "http://menu.test/v1", "105", date())
            .await
            .unwrap();
        assert_eq!(table.rows[0].name, "Pasta");
    }

    #[tokio::test]
    async fn fetch_menu_surfaces_fetch_errors() {
        let err = fetch_menu(&StaticFetcher::new(), "http://menu.test/v1", "105", date())
            .await
            .unwrap_err();
        assert!(matches!(err, MenuError::Fetch(FetchError::Status { status: 404, .. })));
    }
}
