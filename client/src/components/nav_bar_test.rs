use super::*;

#[test]
fn guests_see_sign_in_and_sign_up() {
    let hrefs: Vec<&str> = nav_links(None).into_iter().map(|(_, href)| href).collect();
    assert!(hrefs.contains(&"/login"));
    assert!(hrefs.contains(&"/signup"));
}

#[test]
fn every_signed_in_role_has_a_home_link() {
    for role in Role::ALL {
        let hrefs: Vec<&str> = nav_links(Some(role)).into_iter().map(|(_, href)| href).collect();
        assert!(hrefs.contains(&role.home_path()), "{role}");
        assert!(!hrefs.contains(&"/login"), "{role}");
    }
}
