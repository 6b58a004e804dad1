//! Structured records carried by specialized tracker notifications.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One catalog entry reported by a merchant search step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
  #[serde(default)]
  pub id: String,
  pub name: String,
  pub price: f64,
  #[serde(default)]
  pub category: String,
  #[serde(default)]
  pub rating: f64,
}

impl Product {
  /// Whole stars out of five, e.g. `★★★★☆` for 4.5.
  pub fn stars(&self) -> String {
    let full = self.rating.clamp(0.0, 5.0).floor() as usize;
    format!("{}{}", "★".repeat(full), "☆".repeat(5 - full))
  }
}

/// Summary shown once the purchase flow completes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseSummary {
  pub product_name: String,
  pub amount: f64,
  pub order_id: String,
  pub estimated_delivery: String,
  pub new_balance: Option<f64>,
}

impl PurchaseSummary {
  /// Builds a summary from a `purchase_complete` payload (`product`, `order`,
  /// `new_balance`). Returns `None` if product or order are missing.
  pub fn from_payload(payload: &Map<String, Value>) -> Option<Self> {
    let product = payload.get("product")?;
    let order = payload.get("order")?;
    Some(Self {
      product_name: product.get("name")?.as_str()?.to_string(),
      amount: product.get("price")?.as_f64()?,
      order_id: order.get("order_id")?.as_str()?.to_string(),
      estimated_delivery: order
        .get("estimated_delivery")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string(),
      new_balance: payload.get("new_balance").and_then(Value::as_f64),
    })
  }
}

/// Products listed under `payload.products`; `None` if absent, empty or not products.
pub fn products_from_payload(payload: &Map<String, Value>) -> Option<Vec<Product>> {
  let products: Vec<Product> = serde_json::from_value(payload.get("products")?.clone()).ok()?;
  if products.is_empty() {
    None
  } else {
    Some(products)
  }
}

#[cfg(test)]
mod tests {
  use super::{Product, PurchaseSummary, products_from_payload};
  use serde_json::json;

  fn obj(v: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    v.as_object().cloned().unwrap()
  }

  #[test]
  fn summary_from_full_payload() {
    let payload = obj(json!({
      "product": {"id": "BB001", "name": "MacBook Air M2", "price": 1799, "category": "electronics", "rating": 4.8},
      "order": {"order_id": "BES_1a2b3c4d", "estimated_delivery": "2026-02-16"},
      "new_balance": 13201.0
    }));
    let s = PurchaseSummary::from_payload(&payload).unwrap();
    assert_eq!(s.product_name, "MacBook Air M2");
    assert_eq!(s.amount, 1799.0);
    assert_eq!(s.order_id, "BES_1a2b3c4d");
    assert_eq!(s.estimated_delivery, "2026-02-16");
    assert_eq!(s.new_balance, Some(13201.0));
  }

  #[test]
  fn summary_requires_product_and_order() {
    assert!(PurchaseSummary::from_payload(&obj(json!({"new_balance": 1.0}))).is_none());
    assert!(
      PurchaseSummary::from_payload(&obj(json!({"product": {"name": "x", "price": 1}}))).is_none()
    );
  }

  #[test]
  fn products_parse_and_empty_is_none() {
    let payload = obj(json!({"products": [
      {"id": "TGT002", "name": "Acer Swift 3", "price": 899, "category": "electronics", "rating": 4.3}
    ]}));
    let products = products_from_payload(&payload).unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Acer Swift 3");
    assert!(products_from_payload(&obj(json!({"products": []}))).is_none());
    assert!(products_from_payload(&obj(json!({"products": "none"}))).is_none());
    assert!(products_from_payload(&obj(json!({}))).is_none());
  }

  #[test]
  fn stars_floor_rating() {
    let p = Product {
      id: "x".into(),
      name: "x".into(),
      price: 1.0,
      category: String::new(),
      rating: 4.5,
    };
    assert_eq!(p.stars(), "★★★★☆");
  }
}
