use super::*;
use backend::Role;
use backend::rows::VehicleType;
use wizard::{CustomerSignup, Flow, PasswordReset, RiderRegistration, VendorOnboarding};

fn keys<F: Flow>(flow: &F) -> Vec<&'static str> {
    F::STEPS
        .iter()
        .flat_map(|&step| flow.fields(step).iter().chain(flow.attachments(step)).copied())
        .collect()
}

#[test]
fn every_flow_key_has_a_label() {
    let mut all = keys(&CustomerSignup);
    all.extend(keys(&VendorOnboarding));
    all.extend(keys(&RiderRegistration));
    all.extend(keys(&PasswordReset::new(Role::Vendor)));
    for key in all {
        assert_ne!(field_spec(key).label, key, "no label for {key}");
    }
}

#[test]
fn attachments_render_as_file_inputs() {
    for step in <VendorOnboarding as Flow>::STEPS {
        for &key in VendorOnboarding.attachments(*step) {
            assert!(matches!(field_spec(key).kind, InputKind::File { .. }), "{key}");
        }
    }
}

#[test]
fn vehicle_choices_match_vehicle_types() {
    let InputKind::Select(choices) = field_spec("vehicle_type").kind else { panic!("vehicle_type is a select") };
    let values: Vec<&str> = choices.iter().map(|(v, _)| *v).collect();
    let expected: Vec<&str> = VehicleType::ALL.iter().map(|v| v.as_str()).collect();
    assert_eq!(values, expected);
}

#[test]
fn code_fields_are_plain_text_inputs() {
    assert_eq!(html_type(field_spec("code").kind), "text");
    assert_eq!(html_type(field_spec("password").kind), "password");
}
