use super::*;

#[test]
fn profile_decodes_with_timestamp_and_missing_optionals() {
    let json = r#"{"id":"u1","role":"vendor","created_at":"2025-03-01T10:00:00+00:00"}"#;
    let profile: Profile = serde_json::from_str(json).unwrap();
    assert_eq!(profile.role, Role::Vendor);
    assert!(profile.full_name.is_none());
    assert_eq!(profile.created_at.unwrap().year(), 2025);
}

#[test]
fn profile_without_timestamp_omits_it_when_serialized() {
    let profile = Profile {
        id: "u1".into(),
        email: None,
        role: Role::Customer,
        full_name: Some("Ada".into()),
        phone: None,
        address: None,
        avatar_url: None,
        created_at: None,
    };
    let value = serde_json::to_value(&profile).unwrap();
    assert!(value.get("created_at").is_none());
    assert_eq!(value["role"], "customer");
}

#[test]
fn review_status_uses_snake_case() {
    assert_eq!(serde_json::to_string(&ReviewStatus::PendingReview).unwrap(), "\"pending_review\"");
    assert_eq!(ReviewStatus::PendingReview.as_str(), "pending_review");
    assert_eq!(ReviewStatus::default(), ReviewStatus::Draft);
}

#[test]
fn vendor_defaults_fill_missing_columns() {
    let vendor: VendorProfile = serde_json::from_str(r#"{"id":"v1","business_name":"Tacos"}"#).unwrap();
    assert_eq!(vendor.status, ReviewStatus::Draft);
    assert!(!vendor.is_online);
    assert_eq!(vendor.delivery_fee_cents, 0);
}

#[test]
fn vehicle_type_parse_and_motorised() {
    assert_eq!(VehicleType::parse("car"), Some(VehicleType::Car));
    assert_eq!(VehicleType::parse(" bicycle "), Some(VehicleType::Bicycle));
    assert_eq!(VehicleType::parse("boat"), None);
    assert!(!VehicleType::Bicycle.is_motorised());
    assert!(VehicleType::Motorcycle.is_motorised());
}

#[test]
fn menu_item_is_available_by_default() {
    let item: MenuItem =
        serde_json::from_str(r#"{"id":"m1","vendor_id":"v1","name":"Taco","price_cents":450}"#).unwrap();
    assert!(item.is_available);
}

#[test]
fn order_status_happy_path_ends_at_delivered() {
    let mut status = OrderStatus::Pending;
    let mut steps = 0;
    while let Some(next) = status.next() {
        assert_eq!(next.progress_index(), status.progress_index() + 1);
        status = next;
        steps += 1;
    }
    assert_eq!(status, OrderStatus::Delivered);
    assert_eq!(steps, 5);
    assert!(status.is_terminal());
    assert!(OrderStatus::Cancelled.next().is_none());
}

#[test]
fn order_status_wire_names() {
    assert_eq!(serde_json::to_string(&OrderStatus::ReadyForPickup).unwrap(), "\"ready_for_pickup\"");
    let parsed: OrderStatus = serde_json::from_str("\"picked_up\"").unwrap();
    assert_eq!(parsed, OrderStatus::PickedUp);
}

#[test]
fn new_order_row_excludes_lines_and_starts_pending() {
    let order = NewOrder {
        customer_id: "c1".into(),
        vendor_id: "v1".into(),
        delivery_address: "1 Main St".into(),
        notes: None,
        subtotal_cents: 900,
        delivery_fee_cents: 200,
        total_cents: 1100,
        lines: vec![OrderLine {
            order_id: None,
            menu_item_id: "m1".into(),
            name: "Taco".into(),
            quantity: 2,
            unit_price_cents: 450,
        }],
    };
    let row = order.order_row();
    assert_eq!(row["status"], "pending");
    assert_eq!(row["total_cents"], 1100);
    assert!(row.get("lines").is_none());
    assert_eq!(order.lines[0].line_total_cents(), 900);
}

#[test]
fn order_line_without_order_id_omits_it() {
    let line = OrderLine {
        order_id: None,
        menu_item_id: "m1".into(),
        name: "Taco".into(),
        quantity: 1,
        unit_price_cents: 450,
    };
    assert!(serde_json::to_value(&line).unwrap().get("order_id").is_none());
}

#[test]
fn conversation_includes_participants() {
    let convo = Conversation {
        id: "c1".into(),
        order_id: None,
        customer_id: "u1".into(),
        vendor_id: Some("v1".into()),
        rider_id: None,
        created_at: None,
    };
    assert!(convo.includes("u1"));
    assert!(convo.includes("v1"));
    assert!(!convo.includes("r1"));
}
