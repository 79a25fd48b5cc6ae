//! Typed rows for the hosted tables.
//!
//! These mirror the table columns so serde round-trips stay lossless. Rows
//! carry no invariants of their own beyond field typing; the backend enforces
//! constraints and row-level security.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::types::Role;

// =============================================================================
// PROFILES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<OffsetDateTime>,
}

/// Review lifecycle shared by vendor and rider accounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Onboarding started but not submitted.
    #[default]
    Draft,
    PendingReview,
    Approved,
    Rejected,
    Suspended,
}

impl ReviewStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingReview => "pending_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Suspended => "suspended",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Draft => "Incomplete",
            Self::PendingReview => "Pending review",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Suspended => "Suspended",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorProfile {
    pub id: String,
    pub business_name: String,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub status: ReviewStatus,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub delivery_fee_cents: i64,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    Bicycle,
    Motorcycle,
    Car,
}

impl VehicleType {
    pub const ALL: [VehicleType; 3] = [VehicleType::Bicycle, VehicleType::Motorcycle, VehicleType::Car];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bicycle => "bicycle",
            Self::Motorcycle => "motorcycle",
            Self::Car => "car",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Bicycle => "Bicycle",
            Self::Motorcycle => "Motorcycle",
            Self::Car => "Car",
        }
    }

    /// Motorised vehicles need a plate and a driving licence.
    #[must_use]
    pub fn is_motorised(self) -> bool {
        !matches!(self, Self::Bicycle)
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == raw.trim())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiderProfile {
    pub id: String,
    #[serde(default)]
    pub vehicle_type: Option<VehicleType>,
    #[serde(default)]
    pub plate_number: Option<String>,
    #[serde(default)]
    pub status: ReviewStatus,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<OffsetDateTime>,
}

// =============================================================================
// MARKET
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub vendor_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price_cents: i64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Accepted,
    Preparing,
    ReadyForPickup,
    PickedUp,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Preparing => "preparing",
            Self::ReadyForPickup => "ready_for_pickup",
            Self::PickedUp => "picked_up",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Waiting for restaurant",
            Self::Accepted => "Accepted",
            Self::Preparing => "Preparing",
            Self::ReadyForPickup => "Ready for pickup",
            Self::PickedUp => "On the way",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Next status along the happy path, `None` once terminal.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Accepted),
            Self::Accepted => Some(Self::Preparing),
            Self::Preparing => Some(Self::ReadyForPickup),
            Self::ReadyForPickup => Some(Self::PickedUp),
            Self::PickedUp => Some(Self::Delivered),
            Self::Delivered | Self::Cancelled => None,
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Position along the happy path, used for progress bars.
    #[must_use]
    pub fn progress_index(self) -> usize {
        match self {
            Self::Pending | Self::Cancelled => 0,
            Self::Accepted => 1,
            Self::Preparing => 2,
            Self::ReadyForPickup => 3,
            Self::PickedUp => 4,
            Self::Delivered => 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    pub vendor_id: String,
    #[serde(default)]
    pub rider_id: Option<String>,
    pub status: OrderStatus,
    pub subtotal_cents: i64,
    pub delivery_fee_cents: i64,
    pub total_cents: i64,
    pub delivery_address: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub menu_item_id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

impl OrderLine {
    #[must_use]
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * i64::from(self.quantity)
    }
}

/// Checkout payload: the order row plus its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_id: String,
    pub vendor_id: String,
    pub delivery_address: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub subtotal_cents: i64,
    pub delivery_fee_cents: i64,
    pub total_cents: i64,
    pub lines: Vec<OrderLine>,
}

impl NewOrder {
    /// The `orders` row, without lines.
    #[must_use]
    pub fn order_row(&self) -> serde_json::Value {
        serde_json::json!({
            "customer_id": self.customer_id,
            "vendor_id": self.vendor_id,
            "status": OrderStatus::Pending,
            "delivery_address": self.delivery_address,
            "notes": self.notes,
            "subtotal_cents": self.subtotal_cents,
            "delivery_fee_cents": self.delivery_fee_cents,
            "total_cents": self.total_cents,
        })
    }
}

// =============================================================================
// CHAT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    #[serde(default)]
    pub order_id: Option<String>,
    pub customer_id: String,
    #[serde(default)]
    pub vendor_id: Option<String>,
    #[serde(default)]
    pub rider_id: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<OffsetDateTime>,
}

impl Conversation {
    #[must_use]
    pub fn includes(&self, user_id: &str) -> bool {
        self.customer_id == user_id
            || self.vendor_id.as_deref() == Some(user_id)
            || self.rider_id.as_deref() == Some(user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub body: String,
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub user_id: String,
    pub vendor_id: String,
}

#[cfg(test)]
#[path = "rows_test.rs"]
mod tests;
