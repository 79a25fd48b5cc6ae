use super::*;
use backend::rows::{MenuItem, VendorProfile};

fn cart_with_item() -> Cart {
    let vendor: VendorProfile = serde_json::from_value(serde_json::json!({
        "id": "v1",
        "business_name": "Suya Spot",
        "is_online": true,
        "delivery_fee_cents": 300,
    }))
    .unwrap();
    let item: MenuItem = serde_json::from_value(serde_json::json!({
        "id": "m1",
        "vendor_id": "v1",
        "name": "Beef suya",
        "price_cents": 1200,
        "is_available": true,
    }))
    .unwrap();
    let mut cart = Cart::default();
    cart.add(&vendor, &item);
    cart
}

#[test]
fn blank_address_is_refused_before_anything_else() {
    assert_eq!(prepare_order(&Cart::default(), "c1", "   ", ""), Err("Enter a delivery address"));
}

#[test]
fn empty_cart_is_refused() {
    assert_eq!(prepare_order(&Cart::default(), "c1", "12 Marina Road", ""), Err("Your cart is empty"));
}

#[test]
fn order_carries_totals_and_trimmed_fields() {
    let order = prepare_order(&cart_with_item(), "c1", "  12 Marina Road ", "  ").unwrap();
    assert_eq!(order.customer_id, "c1");
    assert_eq!(order.vendor_id, "v1");
    assert_eq!(order.delivery_address, "12 Marina Road");
    assert_eq!(order.notes, None);
    assert_eq!(order.total_cents, 1500);
    assert_eq!(order.lines.len(), 1);
}
