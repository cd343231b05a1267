use serde::{Deserialize, Serialize};
use serde_json::Number;

/// A cheese record as held by the store
#[derive(Debug, Clone, PartialEq)]
pub struct Cheese {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub is_best_seller: bool,
}

/// Insert payload; the store assigns the id
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewCheese {
    pub name: String,
    pub price: f64,
    pub is_best_seller: bool,
}

impl NewCheese {
    pub fn into_cheese(self, id: i64) -> Cheese {
        Cheese {
            id,
            name: self.name,
            price: self.price,
            is_best_seller: self.is_best_seller,
        }
    }
}

/// Wire representation of a cheese
#[derive(Debug, Serialize, Deserialize, PartialEq, utoipa::ToSchema)]
pub struct CheeseResponse {
    pub id: i64,
    pub name: String,
    #[schema(value_type = f64)]
    pub price: Number,
    pub is_best_seller: bool,
}

impl From<&Cheese> for CheeseResponse {
    fn from(cheese: &Cheese) -> Self {
        CheeseResponse {
            id: cheese.id,
            name: cheese.name.clone(),
            price: price_to_json(cheese.price),
            is_best_seller: cheese.is_best_seller,
        }
    }
}

/// Integral prices go out as JSON integers so `3` is not rendered as `3.0`.
///
/// Non-finite values have no JSON form and are written as `0`.
fn price_to_json(price: f64) -> Number {
    if price.fract() == 0.0 && price >= i64::MIN as f64 && price < i64::MAX as f64 {
        Number::from(price as i64)
    } else {
        Number::from_f64(price).unwrap_or_else(|| Number::from(0))
    }
}
