//! How each wizard field key renders.
//!
//! Flows name their inputs by key; this table gives each key a label, an
//! input type, and any fixed choices. Keys not listed render as plain text.

#[cfg(test)]
#[path = "forms_test.rs"]
mod forms_test;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Email,
    Password,
    Tel,
    /// Six-digit one-time code; non-digits are stripped on input.
    Code,
    TextArea,
    Checkbox,
    Select(&'static [(&'static str, &'static str)]),
    File { accept: &'static str },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: InputKind,
    pub placeholder: &'static str,
    pub autocomplete: &'static str,
}

const fn field(key: &'static str, label: &'static str, kind: InputKind) -> FieldSpec {
    FieldSpec { key, label, kind, placeholder: "", autocomplete: "off" }
}

/// `(value, label)` pairs; values match `VehicleType::as_str`.
const VEHICLES: &[(&str, &str)] = &[("bicycle", "Bicycle"), ("motorcycle", "Motorcycle"), ("car", "Car")];

const DOCUMENT_TYPES: &str = "image/*,application/pdf";

/// Rendering for `key`. Unknown keys fall back to a text input labelled by key.
pub fn field_spec(key: &'static str) -> FieldSpec {
    match key {
        "email" => FieldSpec { placeholder: "you@example.com", autocomplete: "email", ..field(key, "Email", InputKind::Email) },
        "password" => FieldSpec { autocomplete: "new-password", ..field(key, "Password", InputKind::Password) },
        "confirm_password" => {
            FieldSpec { autocomplete: "new-password", ..field(key, "Confirm password", InputKind::Password) }
        }
        "code" => FieldSpec { placeholder: "123456", autocomplete: "one-time-code", ..field(key, "Verification code", InputKind::Code) },
        "full_name" => FieldSpec { autocomplete: "name", ..field(key, "Full name", InputKind::Text) },
        "phone" => FieldSpec { placeholder: "+234 801 234 5678", autocomplete: "tel", ..field(key, "Phone", InputKind::Tel) },
        "address" => FieldSpec { autocomplete: "street-address", ..field(key, "Address", InputKind::Text) },
        "business_name" => field(key, "Business name", InputKind::Text),
        "cuisine" => FieldSpec { placeholder: "e.g. Nigerian, Grill", ..field(key, "Cuisine", InputKind::Text) },
        "description" => field(key, "Description", InputKind::TextArea),
        "city" => field(key, "City", InputKind::Text),
        "vehicle_type" => field(key, "Vehicle type", InputKind::Select(VEHICLES)),
        "plate_number" => field(key, "Plate number", InputKind::Text),
        "bank_name" => field(key, "Bank name", InputKind::Text),
        "account_name" => field(key, "Account name", InputKind::Text),
        "account_number" => field(key, "Account number", InputKind::Text),
        "accept_terms" => field(key, "I accept the terms of service", InputKind::Checkbox),
        "business_license" => field(key, "Business license", InputKind::File { accept: DOCUMENT_TYPES }),
        "id_document" => field(key, "Government ID", InputKind::File { accept: DOCUMENT_TYPES }),
        "driver_license" => field(key, "Driving licence", InputKind::File { accept: DOCUMENT_TYPES }),
        "logo" => field(key, "Logo (optional)", InputKind::File { accept: "image/*" }),
        _ => field(key, key, InputKind::Text),
    }
}

pub fn html_type(kind: InputKind) -> &'static str {
    match kind {
        InputKind::Email => "email",
        InputKind::Password => "password",
        InputKind::Tel => "tel",
        InputKind::Code => "text",
        InputKind::Checkbox => "checkbox",
        InputKind::File { .. } => "file",
        InputKind::Text | InputKind::TextArea | InputKind::Select(_) => "text",
    }
}
