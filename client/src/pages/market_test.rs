use super::*;

fn vendor(id: &str, name: &str, cuisine: &str, city: &str) -> VendorProfile {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "business_name": name,
        "cuisine": cuisine,
        "city": city,
        "status": "approved",
        "is_online": true,
    }))
    .unwrap()
}

fn item(id: &str, category: Option<&str>) -> MenuItem {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "vendor_id": "v1",
        "name": id,
        "price_cents": 500,
        "category": category,
        "is_available": true,
    }))
    .unwrap()
}

fn ids(vendors: &[VendorProfile]) -> Vec<&str> {
    vendors.iter().map(|v| v.id.as_str()).collect()
}

#[test]
fn search_matches_name_cuisine_and_city_case_insensitively() {
    let list = [
        vendor("a", "Suya Spot", "Grill", "Lagos"),
        vendor("b", "Jollof Hub", "Rice", "Abuja"),
        vendor("c", "Pepper Soup Co", "Soups", "Lagos"),
    ];
    let none = HashSet::new();
    assert_eq!(ids(&filter_vendors(&list, "  ", false, &none)), ["a", "b", "c"]);
    assert_eq!(ids(&filter_vendors(&list, "jollof", false, &none)), ["b"]);
    assert_eq!(ids(&filter_vendors(&list, "GRILL", false, &none)), ["a"]);
    assert_eq!(ids(&filter_vendors(&list, "lagos", false, &none)), ["a", "c"]);
}

#[test]
fn favourites_sort_first_and_can_be_the_only_results() {
    let list = [vendor("a", "A", "x", "y"), vendor("b", "B", "x", "y"), vendor("c", "C", "x", "y")];
    let liked: HashSet<String> = ["c".to_owned()].into();
    assert_eq!(ids(&filter_vendors(&list, "", false, &liked)), ["c", "a", "b"]);
    assert_eq!(ids(&filter_vendors(&list, "", true, &liked)), ["c"]);
}

#[test]
fn menu_groups_keep_first_seen_order_with_uncategorised_last() {
    let items = [item("1", Some("Mains")), item("2", None), item("3", Some("Drinks")), item("4", Some("Mains")), item("5", Some(" "))];
    let groups = group_menu(&items);
    let shape: Vec<(&str, Vec<&str>)> =
        groups.iter().map(|(c, list)| (c.as_str(), list.iter().map(|i| i.id.as_str()).collect())).collect();
    assert_eq!(shape, [("Mains", vec!["1", "4"]), ("Drinks", vec!["3"]), ("More", vec!["2", "5"])]);
}

#[test]
fn empty_menu_has_no_groups() {
    assert!(group_menu(&[]).is_empty());
}
