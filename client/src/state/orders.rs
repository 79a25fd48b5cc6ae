//! Who may move an order to which status.

#[cfg(test)]
#[path = "orders_test.rs"]
mod orders_test;

use backend::Role;
use backend::rows::{Order, OrderStatus, ReviewStatus};

/// Statuses `role` may move an order to from `from`.
pub fn allowed_transitions(role: Role, from: OrderStatus) -> Vec<OrderStatus> {
    match (role, from) {
        (Role::Vendor, OrderStatus::Pending) => vec![OrderStatus::Accepted, OrderStatus::Cancelled],
        (Role::Vendor, OrderStatus::Accepted) => vec![OrderStatus::Preparing],
        (Role::Vendor, OrderStatus::Preparing) => vec![OrderStatus::ReadyForPickup],
        (Role::Rider, OrderStatus::ReadyForPickup) => vec![OrderStatus::PickedUp],
        (Role::Rider, OrderStatus::PickedUp) => vec![OrderStatus::Delivered],
        (Role::Customer, OrderStatus::Pending) => vec![OrderStatus::Cancelled],
        (Role::Admin, status) if !status.is_terminal() => vec![OrderStatus::Cancelled],
        _ => Vec::new(),
    }
}

/// Transitions `user_id` may apply to `order`. Riders act only on orders
/// assigned to them.
pub fn actions_for(role: Role, user_id: &str, order: &Order) -> Vec<OrderStatus> {
    if role == Role::Rider && order.rider_id.as_deref() != Some(user_id) {
        return Vec::new();
    }
    allowed_transitions(role, order.status)
}

/// Button text for moving an order into `to`.
pub fn action_label(to: OrderStatus) -> &'static str {
    match to {
        OrderStatus::Accepted => "Accept",
        OrderStatus::Preparing => "Start preparing",
        OrderStatus::ReadyForPickup => "Mark ready",
        OrderStatus::PickedUp => "Picked up",
        OrderStatus::Delivered => "Mark delivered",
        OrderStatus::Cancelled => "Cancel",
        OrderStatus::Pending => "Reopen",
    }
}

/// Orders still in progress, newest first as loaded.
pub fn active(orders: &[Order]) -> Vec<Order> {
    orders.iter().filter(|o| !o.status.is_terminal()).cloned().collect()
}

/// Replace the order with `updated.id`, or put it first when new.
pub fn merge_order(orders: &mut Vec<Order>, updated: Order) {
    match orders.iter_mut().find(|o| o.id == updated.id) {
        Some(slot) => *slot = updated,
        None => orders.insert(0, updated),
    }
}

/// Dashboard notice for an account still under review.
pub fn review_notice(status: ReviewStatus) -> Option<&'static str> {
    match status {
        ReviewStatus::Draft => Some("Your registration is incomplete. Finish it to be reviewed."),
        ReviewStatus::PendingReview => Some("Your application is under review. We will email you once it is approved."),
        ReviewStatus::Rejected => Some("Your application was not approved. Contact support for details."),
        ReviewStatus::Suspended => Some("Your account is suspended. Contact support."),
        ReviewStatus::Approved => None,
    }
}
