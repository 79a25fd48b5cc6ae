//! Typed helpers over the row calls of [`Backend`].
//!
//! Screens and operator tooling go through [`Repo`] rather than building
//! queries by hand, so table names, filter columns, and row decoding live in
//! one place.

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::{AppError, ErrorKind};
use crate::facade::Backend;
use crate::rows::{
    ChatMessage, Conversation, Favorite, MenuItem, NewOrder, Order, OrderLine, OrderStatus, Profile, ReviewStatus,
    RiderProfile, VendorProfile,
};
use crate::types::{FilterOp, Query, Role, Session, Table};

/// Decode a list of rows.
///
/// # Errors
///
/// Returns a `Decode` error naming the first row that does not match `T`.
pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, AppError> {
    rows.into_iter().map(decode_row).collect()
}

/// # Errors
///
/// Returns a `Decode` error when the row does not match `T`.
pub fn decode_row<T: DeserializeOwned>(row: Value) -> Result<T, AppError> {
    serde_json::from_value(row).map_err(|e| AppError::decode(200, format!("unexpected row shape: {e}")))
}

fn first<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Option<T>, AppError> {
    rows.into_iter().next().map(decode_row).transpose()
}

fn single<T: DeserializeOwned>(rows: Vec<Value>, what: &str) -> Result<T, AppError> {
    first(rows)?.ok_or_else(|| AppError::new(ErrorKind::NotFound, 200, format!("{what} not found")))
}

fn timestamp(at: OffsetDateTime) -> Result<String, AppError> {
    at.format(&Rfc3339)
        .map_err(|e| AppError::new(ErrorKind::Validation, 0, format!("bad timestamp: {e}")))
}

/// Row column identifying the owner of an order or conversation for `role`.
#[must_use]
pub fn participant_column(role: Role) -> Option<&'static str> {
    match role {
        Role::Customer => Some("customer_id"),
        Role::Vendor => Some("vendor_id"),
        Role::Rider => Some("rider_id"),
        Role::Admin => None,
    }
}

pub struct Repo<'a, B: Backend + ?Sized> {
    backend: &'a B,
    session: Option<&'a Session>,
}

impl<'a, B: Backend + ?Sized> Repo<'a, B> {
    #[must_use]
    pub fn new(backend: &'a B, session: Option<&'a Session>) -> Self {
        Self { backend, session }
    }

    // =========================================================================
    // PROFILES
    // =========================================================================

    /// # Errors
    ///
    /// Propagates backend and decode failures.
    pub async fn profile(&self, user_id: &str) -> Result<Option<Profile>, AppError> {
        let rows = self
            .backend
            .select(self.session, Table::Profiles, &Query::new().eq("id", user_id).limit(1))
            .await?;
        first(rows)
    }

    /// # Errors
    ///
    /// Propagates backend and decode failures.
    pub async fn save_profile(&self, profile: &Profile) -> Result<Profile, AppError> {
        let row = serde_json::to_value(profile)?;
        let stored = self.backend.upsert(self.session, Table::Profiles, row, "id").await?;
        decode_row(stored)
    }

    /// Profiles created before `cutoff`.
    ///
    /// # Errors
    ///
    /// Propagates backend and decode failures.
    pub async fn profiles_created_before(&self, cutoff: OffsetDateTime) -> Result<Vec<Profile>, AppError> {
        let query = Query::new().filter("created_at", FilterOp::Lt, timestamp(cutoff)?);
        decode_rows(self.backend.select(self.session, Table::Profiles, &query).await?)
    }

    // =========================================================================
    // VENDORS
    // =========================================================================

    /// # Errors
    ///
    /// Propagates backend and decode failures.
    pub async fn vendor(&self, id: &str) -> Result<Option<VendorProfile>, AppError> {
        let rows = self
            .backend
            .select(self.session, Table::Vendors, &Query::new().eq("id", id).limit(1))
            .await?;
        first(rows)
    }

    /// Approved vendors, by name. Offline vendors are included so the
    /// market can show them greyed out.
    ///
    /// # Errors
    ///
    /// Propagates backend and decode failures.
    pub async fn approved_vendors(&self) -> Result<Vec<VendorProfile>, AppError> {
        self.vendors_with_status(ReviewStatus::Approved).await
    }

    /// # Errors
    ///
    /// Propagates backend and decode failures.
    pub async fn vendors_with_status(&self, status: ReviewStatus) -> Result<Vec<VendorProfile>, AppError> {
        let query = Query::new().eq("status", status.as_str()).order_asc("business_name");
        decode_rows(self.backend.select(self.session, Table::Vendors, &query).await?)
    }

    /// Vendor rows left in `status` since before `cutoff`.
    ///
    /// # Errors
    ///
    /// Propagates backend and decode failures.
    pub async fn stale_vendors(
        &self,
        status: ReviewStatus,
        cutoff: OffsetDateTime,
    ) -> Result<Vec<VendorProfile>, AppError> {
        let query = Query::new()
            .eq("status", status.as_str())
            .filter("created_at", FilterOp::Lt, timestamp(cutoff)?);
        decode_rows(self.backend.select(self.session, Table::Vendors, &query).await?)
    }

    /// # Errors
    ///
    /// Returns `NotFound` when no vendor has this id.
    pub async fn set_vendor_status(&self, id: &str, status: ReviewStatus) -> Result<VendorProfile, AppError> {
        let rows = self
            .backend
            .update(self.session, Table::Vendors, &Query::new().eq("id", id), json!({ "status": status }))
            .await?;
        single(rows, "vendor")
    }

    /// # Errors
    ///
    /// Returns `NotFound` when no vendor has this id.
    pub async fn set_vendor_online(&self, id: &str, online: bool) -> Result<VendorProfile, AppError> {
        let rows = self
            .backend
            .update(self.session, Table::Vendors, &Query::new().eq("id", id), json!({ "is_online": online }))
            .await?;
        single(rows, "vendor")
    }

    // =========================================================================
    // RIDERS
    // =========================================================================

    /// # Errors
    ///
    /// Propagates backend and decode failures.
    pub async fn rider(&self, id: &str) -> Result<Option<RiderProfile>, AppError> {
        let rows = self
            .backend
            .select(self.session, Table::Riders, &Query::new().eq("id", id).limit(1))
            .await?;
        first(rows)
    }

    /// # Errors
    ///
    /// Propagates backend and decode failures.
    pub async fn riders_with_status(&self, status: ReviewStatus) -> Result<Vec<RiderProfile>, AppError> {
        let query = Query::new().eq("status", status.as_str()).order_asc("created_at");
        decode_rows(self.backend.select(self.session, Table::Riders, &query).await?)
    }

    /// # Errors
    ///
    /// Propagates backend and decode failures.
    pub async fn stale_riders(
        &self,
        status: ReviewStatus,
        cutoff: OffsetDateTime,
    ) -> Result<Vec<RiderProfile>, AppError> {
        let query = Query::new()
            .eq("status", status.as_str())
            .filter("created_at", FilterOp::Lt, timestamp(cutoff)?);
        decode_rows(self.backend.select(self.session, Table::Riders, &query).await?)
    }

    /// # Errors
    ///
    /// Returns `NotFound` when no rider has this id.
    pub async fn set_rider_available(&self, id: &str, available: bool) -> Result<RiderProfile, AppError> {
        let rows = self
            .backend
            .update(self.session, Table::Riders, &Query::new().eq("id", id), json!({ "is_available": available }))
            .await?;
        single(rows, "rider")
    }

    /// # Errors
    ///
    /// Returns `NotFound` when no rider has this id.
    pub async fn set_rider_status(&self, id: &str, status: ReviewStatus) -> Result<RiderProfile, AppError> {
        let rows = self
            .backend
            .update(self.session, Table::Riders, &Query::new().eq("id", id), json!({ "status": status }))
            .await?;
        single(rows, "rider")
    }

    // =========================================================================
    // MENU & ORDERS
    // =========================================================================

    /// # Errors
    ///
    /// Propagates backend and decode failures.
    pub async fn menu(&self, vendor_id: &str) -> Result<Vec<MenuItem>, AppError> {
        let query = Query::new().eq("vendor_id", vendor_id).order_asc("name");
        decode_rows(self.backend.select(self.session, Table::MenuItems, &query).await?)
    }

    /// Insert the order, then its lines. If the lines fail the order row is
    /// removed again so the customer never sees an empty order.
    ///
    /// # Errors
    ///
    /// Returns the first backend failure.
    pub async fn place_order(&self, order: &NewOrder) -> Result<Order, AppError> {
        let stored: Order = decode_row(self.backend.insert(self.session, Table::Orders, order.order_row()).await?)?;
        for line in &order.lines {
            let mut row = serde_json::to_value(line)?;
            row["order_id"] = Value::String(stored.id.clone());
            if let Err(err) = self.backend.insert(self.session, Table::OrderItems, row).await {
                tracing::warn!(order_id = %stored.id, kind = err.kind.as_str(), "order line insert failed; removing order");
                if let Err(cleanup) = self
                    .backend
                    .delete(self.session, Table::Orders, &Query::new().eq("id", &stored.id))
                    .await
                {
                    tracing::warn!(order_id = %stored.id, error = %cleanup, "order cleanup failed");
                }
                return Err(err);
            }
        }
        tracing::info!(order_id = %stored.id, lines = order.lines.len(), "order placed");
        Ok(stored)
    }

    /// Orders visible to `user_id` in `role`, newest first. Admins see all.
    ///
    /// # Errors
    ///
    /// Propagates backend and decode failures.
    pub async fn orders_for(&self, role: Role, user_id: &str) -> Result<Vec<Order>, AppError> {
        let mut query = Query::new().order_desc("created_at");
        if let Some(column) = participant_column(role) {
            query = query.eq(column, user_id);
        }
        decode_rows(self.backend.select(self.session, Table::Orders, &query).await?)
    }

    /// Orders ready for pickup with no rider, offered to available riders.
    ///
    /// # Errors
    ///
    /// Propagates backend and decode failures.
    pub async fn unassigned_orders(&self) -> Result<Vec<Order>, AppError> {
        let query = Query::new()
            .eq("status", OrderStatus::ReadyForPickup.as_str())
            .filter("rider_id", FilterOp::Is, "null")
            .order_asc("created_at");
        decode_rows(self.backend.select(self.session, Table::Orders, &query).await?)
    }

    /// # Errors
    ///
    /// Propagates backend and decode failures.
    pub async fn order_lines(&self, order_id: &str) -> Result<Vec<OrderLine>, AppError> {
        let query = Query::new().eq("order_id", order_id);
        decode_rows(self.backend.select(self.session, Table::OrderItems, &query).await?)
    }

    /// # Errors
    ///
    /// Returns `NotFound` when no order has this id.
    pub async fn update_order_status(&self, order_id: &str, status: OrderStatus) -> Result<Order, AppError> {
        let rows = self
            .backend
            .update(self.session, Table::Orders, &Query::new().eq("id", order_id), json!({ "status": status }))
            .await?;
        single(rows, "order")
    }

    /// Claim an unassigned order for `rider_id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the order does not exist or another rider
    /// already claimed it.
    pub async fn assign_rider(&self, order_id: &str, rider_id: &str) -> Result<Order, AppError> {
        let query = Query::new().eq("id", order_id).filter("rider_id", FilterOp::Is, "null");
        let rows = self
            .backend
            .update(self.session, Table::Orders, &query, json!({ "rider_id": rider_id }))
            .await?;
        single(rows, "order")
    }

    // =========================================================================
    // CHAT
    // =========================================================================

    /// # Errors
    ///
    /// Propagates backend and decode failures.
    pub async fn conversation(&self, id: &str) -> Result<Option<Conversation>, AppError> {
        let rows = self
            .backend
            .select(self.session, Table::Conversations, &Query::new().eq("id", id).limit(1))
            .await?;
        first(rows)
    }

    /// # Errors
    ///
    /// Propagates backend and decode failures.
    pub async fn conversations_for(&self, role: Role, user_id: &str) -> Result<Vec<Conversation>, AppError> {
        let mut query = Query::new().order_desc("created_at");
        if let Some(column) = participant_column(role) {
            query = query.eq(column, user_id);
        }
        decode_rows(self.backend.select(self.session, Table::Conversations, &query).await?)
    }

    /// Return the conversation attached to `order`, creating it on first use.
    ///
    /// # Errors
    ///
    /// Propagates backend and decode failures.
    pub async fn conversation_for_order(&self, order: &Order) -> Result<Conversation, AppError> {
        let rows = self
            .backend
            .select(self.session, Table::Conversations, &Query::new().eq("order_id", &order.id).limit(1))
            .await?;
        if let Some(existing) = first(rows)? {
            return Ok(existing);
        }
        let row = json!({
            "order_id": order.id,
            "customer_id": order.customer_id,
            "vendor_id": order.vendor_id,
            "rider_id": order.rider_id,
        });
        decode_row(self.backend.insert(self.session, Table::Conversations, row).await?)
    }

    /// Messages in a conversation, oldest first.
    ///
    /// # Errors
    ///
    /// Propagates backend and decode failures.
    pub async fn messages(&self, conversation_id: &str) -> Result<Vec<ChatMessage>, AppError> {
        let query = Query::new().eq("conversation_id", conversation_id).order_asc("created_at");
        decode_rows(self.backend.select(self.session, Table::Messages, &query).await?)
    }

    /// # Errors
    ///
    /// Returns `Validation` for a blank body, otherwise backend failures.
    pub async fn send_message(
        &self,
        conversation_id: &str,
        sender_id: &str,
        body: &str,
    ) -> Result<ChatMessage, AppError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(AppError::new(ErrorKind::Validation, 0, "message is empty"));
        }
        let row = json!({ "conversation_id": conversation_id, "sender_id": sender_id, "body": body });
        decode_row(self.backend.insert(self.session, Table::Messages, row).await?)
    }

    // =========================================================================
    // FAVORITES
    // =========================================================================

    /// # Errors
    ///
    /// Propagates backend and decode failures.
    pub async fn favorites(&self, user_id: &str) -> Result<Vec<Favorite>, AppError> {
        decode_rows(
            self.backend
                .select(self.session, Table::Favorites, &Query::new().eq("user_id", user_id))
                .await?,
        )
    }

    /// Mark or unmark `vendor_id` as a favorite of `user_id`.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub async fn set_favorite(&self, user_id: &str, vendor_id: &str, liked: bool) -> Result<(), AppError> {
        if liked {
            let row = json!({ "user_id": user_id, "vendor_id": vendor_id });
            self.backend
                .upsert(self.session, Table::Favorites, row, "user_id,vendor_id")
                .await
                .map(|_| ())
        } else {
            let query = Query::new().eq("user_id", user_id).eq("vendor_id", vendor_id);
            self.backend.delete(self.session, Table::Favorites, &query).await
        }
    }
}

#[cfg(test)]
#[path = "repo_test.rs"]
mod tests;
