//! Single-vendor shopping cart.
//!
//! SYSTEM CONTEXT
//! ==============
//! Lives in `AppContext` and is mirrored to browser storage so a reload does
//! not lose it. Checkout turns it into a `NewOrder`.
//!
//! DESIGN
//! ======
//! A cart only ever holds one vendor's items. Adding from another vendor is
//! refused with `AddOutcome::OtherVendor`; the page asks the user, then calls
//! `replace_with`. All money is integer cents.

#[cfg(test)]
#[path = "cart_test.rs"]
mod cart_test;

use backend::rows::{MenuItem, NewOrder, OrderLine, VendorProfile};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub menu_item_id: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
}

impl CartLine {
    pub fn total_cents(&self) -> i64 {
        self.unit_price_cents * i64::from(self.quantity)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub vendor_id: Option<String>,
    pub vendor_name: String,
    pub delivery_fee_cents: i64,
    pub lines: Vec<CartLine>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// The cart holds another vendor's items; nothing changed.
    OtherVendor { current: String },
    Unavailable,
}

impl Cart {
    pub fn add(&mut self, vendor: &VendorProfile, item: &MenuItem) -> AddOutcome {
        if !item.is_available {
            return AddOutcome::Unavailable;
        }
        if let Some(current) = &self.vendor_id {
            if *current != vendor.id && !self.lines.is_empty() {
                return AddOutcome::OtherVendor { current: self.vendor_name.clone() };
            }
        }
        if self.vendor_id.as_deref() != Some(vendor.id.as_str()) {
            self.vendor_id = Some(vendor.id.clone());
            self.vendor_name.clone_from(&vendor.business_name);
        }
        self.delivery_fee_cents = vendor.delivery_fee_cents;

        if let Some(line) = self.lines.iter_mut().find(|l| l.menu_item_id == item.id) {
            line.quantity += 1;
        } else {
            self.lines.push(CartLine {
                menu_item_id: item.id.clone(),
                name: item.name.clone(),
                unit_price_cents: item.price_cents,
                quantity: 1,
            });
        }
        AddOutcome::Added
    }

    /// Empty the cart and start over with `item` from `vendor`.
    pub fn replace_with(&mut self, vendor: &VendorProfile, item: &MenuItem) -> AddOutcome {
        self.clear();
        self.add(vendor, item)
    }

    /// Set a line's quantity; zero removes the line.
    pub fn set_quantity(&mut self, menu_item_id: &str, quantity: u32) {
        if quantity == 0 {
            self.lines.retain(|l| l.menu_item_id != menu_item_id);
        } else if let Some(line) = self.lines.iter_mut().find(|l| l.menu_item_id == menu_item_id) {
            line.quantity = quantity;
        }
        if self.lines.is_empty() {
            self.clear();
        }
    }

    pub fn increment(&mut self, menu_item_id: &str) {
        if let Some(qty) = self.quantity_of(menu_item_id) {
            self.set_quantity(menu_item_id, qty + 1);
        }
    }

    pub fn decrement(&mut self, menu_item_id: &str) {
        if let Some(qty) = self.quantity_of(menu_item_id) {
            self.set_quantity(menu_item_id, qty.saturating_sub(1));
        }
    }

    pub fn quantity_of(&self, menu_item_id: &str) -> Option<u32> {
        self.lines.iter().find(|l| l.menu_item_id == menu_item_id).map(|l| l.quantity)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn subtotal_cents(&self) -> i64 {
        self.lines.iter().map(CartLine::total_cents).sum()
    }

    pub fn total_cents(&self) -> i64 {
        if self.is_empty() { 0 } else { self.subtotal_cents() + self.delivery_fee_cents }
    }

    /// Checkout payload, or `None` for an empty cart.
    pub fn to_order(&self, customer_id: &str, delivery_address: &str, notes: &str) -> Option<NewOrder> {
        let vendor_id = self.vendor_id.clone().filter(|_| !self.is_empty())?;
        let notes = notes.trim();
        Some(NewOrder {
            customer_id: customer_id.to_owned(),
            vendor_id,
            delivery_address: delivery_address.trim().to_owned(),
            notes: (!notes.is_empty()).then(|| notes.to_owned()),
            subtotal_cents: self.subtotal_cents(),
            delivery_fee_cents: self.delivery_fee_cents,
            total_cents: self.total_cents(),
            lines: self
                .lines
                .iter()
                .map(|l| OrderLine {
                    order_id: None,
                    menu_item_id: l.menu_item_id.clone(),
                    name: l.name.clone(),
                    quantity: l.quantity,
                    unit_price_cents: l.unit_price_cents,
                })
                .collect(),
        })
    }
}
