//! Shared façade types: roles, sessions, table names, and row queries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// ROLE
// =============================================================================

/// The closed set of account roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Vendor,
    Rider,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown account type `{0}`")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 4] = [Role::Customer, Role::Vendor, Role::Rider, Role::Admin];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Vendor => "vendor",
            Self::Rider => "rider",
            Self::Admin => "admin",
        }
    }

    /// Value used in `?type=` query parameters; customers are `user`.
    #[must_use]
    pub fn query_value(self) -> &'static str {
        match self {
            Self::Customer => "user",
            other => other.as_str(),
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Customer => "Customer",
            Self::Vendor => "Vendor",
            Self::Rider => "Rider",
            Self::Admin => "Admin",
        }
    }

    /// Landing route after sign-in.
    #[must_use]
    pub fn home_path(self) -> &'static str {
        match self {
            Self::Customer => "/market",
            Self::Vendor | Self::Rider | Self::Admin => "/dashboard",
        }
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" | "user" => Ok(Self::Customer),
            "vendor" => Ok(Self::Vendor),
            "rider" => Ok(Self::Rider),
            "admin" => Ok(Self::Admin),
            _ => Err(UnknownRole(s.to_owned())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// AUTH
// =============================================================================

/// Identity returned by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    /// Role recorded in user metadata at sign-up; absent for legacy accounts.
    pub role: Option<Role>,
}

/// Authenticated session cached in browser storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry as Unix seconds, when the auth service reports it.
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

impl Session {
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    /// Whether the access token has passed its reported expiry.
    #[must_use]
    pub fn is_expired(&self, now_unix: i64) -> bool {
        self.expires_at.is_some_and(|at| at <= now_unix)
    }
}

/// Result of a sign-up call. The session is absent while the email awaits
/// confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    pub user: AuthUser,
    pub session: Option<Session>,
}

/// What a one-time code is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpPurpose {
    /// Confirming the email address of a fresh account.
    Signup,
    /// Password recovery.
    Recovery,
}

impl OtpPurpose {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Signup => "signup",
            Self::Recovery => "recovery",
        }
    }
}

// =============================================================================
// STORAGE TARGETS
// =============================================================================

/// Row tables reachable through the façade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Profiles,
    Vendors,
    Riders,
    MenuItems,
    Orders,
    OrderItems,
    Conversations,
    Messages,
    Favorites,
}

impl Table {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Profiles => "profiles",
            Self::Vendors => "vendors",
            Self::Riders => "riders",
            Self::MenuItems => "menu_items",
            Self::Orders => "orders",
            Self::OrderItems => "order_items",
            Self::Conversations => "conversations",
            Self::Messages => "messages",
            Self::Favorites => "favorites",
        }
    }
}

/// File storage buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Bucket {
    Documents,
    Avatars,
    MenuImages,
}

impl Bucket {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Documents => "documents",
            Self::Avatars => "avatars",
            Self::MenuImages => "menu-images",
        }
    }

    /// Whether objects are served from the public endpoint.
    #[must_use]
    pub fn is_public(self) -> bool {
        !matches!(self, Self::Documents)
    }
}

/// A file selected by the user, held in memory until uploaded.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    #[must_use]
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), content_type: content_type.into(), bytes }
    }

    /// Lowercase extension derived from the file name, falling back to the MIME type.
    #[must_use]
    pub fn extension(&self) -> String {
        if let Some((_, ext)) = self.file_name.rsplit_once('.') {
            if !ext.is_empty() && ext.len() <= 5 {
                return ext.to_ascii_lowercase();
            }
        }
        match self.content_type.as_str() {
            "application/pdf" => "pdf",
            "image/png" => "png",
            "image/jpeg" => "jpg",
            "image/webp" => "webp",
            _ => "bin",
        }
        .to_owned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

// =============================================================================
// ROW QUERIES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    Is,
}

impl FilterOp {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::In => "in",
            Self::Is => "is",
        }
    }
}

/// A single column predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: String,
}

impl Filter {
    /// Render as a query pair in the row service's `column=op.value` syntax.
    #[must_use]
    pub fn to_pair(&self) -> (String, String) {
        let value = match self.op {
            FilterOp::In => format!("({})", self.value),
            _ => self.value.clone(),
        };
        (self.column.clone(), format!("{}.{value}", self.op.as_str()))
    }
}

/// Row selection: filters, ordering, and limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<(String, bool)>,
    pub limit: Option<usize>,
}

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filter(mut self, column: &str, op: FilterOp, value: impl Into<String>) -> Self {
        self.filters.push(Filter { column: column.to_owned(), op, value: value.into() });
        self
    }

    #[must_use]
    pub fn eq(self, column: &str, value: impl Into<String>) -> Self {
        self.filter(column, FilterOp::Eq, value)
    }

    #[must_use]
    pub fn any_of(self, column: &str, values: &[&str]) -> Self {
        self.filter(column, FilterOp::In, values.join(","))
    }

    #[must_use]
    pub fn order_asc(mut self, column: &str) -> Self {
        self.order = Some((column.to_owned(), true));
        self
    }

    #[must_use]
    pub fn order_desc(mut self, column: &str) -> Self {
        self.order = Some((column.to_owned(), false));
        self
    }

    #[must_use]
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Query-string pairs, excluding `select`.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self.filters.iter().map(Filter::to_pair).collect();
        if let Some((column, asc)) = &self.order {
            let dir = if *asc { "asc" } else { "desc" };
            pairs.push(("order".to_owned(), format!("{column}.{dir}")));
        }
        if let Some(n) = self.limit {
            pairs.push(("limit".to_owned(), n.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
