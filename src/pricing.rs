//! Line-item and basket price arithmetic.
//!
//! Everything here is derived from the current product prices on every call;
//! no totals are ever persisted.

use serde::Serialize;

/// Price of a single cart or order line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinePrice {
    pub quantity: i32,
    pub price: f64,
    pub discount_price: Option<f64>,
}

impl LinePrice {
    pub fn new(quantity: i32, price: f64, discount_price: Option<f64>) -> Self {
        Self {
            quantity,
            price,
            discount_price,
        }
    }

    /// The discount price, if it is set and non-zero.
    pub fn effective_discount(&self) -> Option<f64> {
        self.discount_price.filter(|discount| *discount != 0.0)
    }

    pub fn total_item_price(&self) -> f64 {
        f64::from(self.quantity) * self.price
    }

    /// Falls back to the full price when the product carries no discount.
    pub fn total_discount_item_price(&self) -> f64 {
        match self.effective_discount() {
            Some(discount) => f64::from(self.quantity) * discount,
            None => self.total_item_price(),
        }
    }

    pub fn amount_saved(&self) -> f64 {
        round_cents(self.total_item_price() - self.total_discount_item_price())
    }

    pub fn final_price(&self) -> f64 {
        if self.effective_discount().is_some() {
            self.total_discount_item_price()
        } else {
            self.total_item_price()
        }
    }

    pub fn breakdown(&self) -> PriceBreakdown {
        PriceBreakdown {
            total_item_price: self.total_item_price(),
            total_discount_item_price: self.total_discount_item_price(),
            amount_saved: self.amount_saved(),
            final_price: self.final_price(),
        }
    }
}

/// Serialized next to every cart and order line.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PriceBreakdown {
    pub total_item_price: f64,
    pub total_discount_item_price: f64,
    pub amount_saved: f64,
    pub final_price: f64,
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Sum of the final prices of every line.
pub fn basket_total<'a>(lines: impl IntoIterator<Item = &'a LinePrice>) -> f64 {
    lines.into_iter().map(LinePrice::final_price).sum()
}

/// Subtotal of an order and what is left after the coupon.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct OrderTotals {
    pub before_coupon: f64,
    pub total: f64,
}

/// The coupon is a flat amount taken off once; the total bottoms out at zero.
pub fn order_totals<'a>(
    lines: impl IntoIterator<Item = &'a LinePrice>,
    coupon_amount: Option<i32>,
) -> OrderTotals {
    let before_coupon = basket_total(lines);
    let total = match coupon_amount {
        Some(amount) => (before_coupon - f64::from(amount)).max(0.0),
        None => before_coupon,
    };
    OrderTotals {
        before_coupon,
        total,
    }
}
