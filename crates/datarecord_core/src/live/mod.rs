//! Push-based live views over stored records.
//!
//! # Responsibility
//! - Track active subscriptions per query shape (all rows, one row by id).
//! - Re-deliver fresh snapshots to subscribers after each committed write.
//! - Release registrations when a view is unsubscribed or dropped.
//!
//! # Invariants
//! - Subscribers never poll; storage pushes.
//! - A released subscription is never notified again and leaves no entry.
//! - Snapshots reach each subscriber in commit order.

mod registry;
mod view;

pub use registry::{LiveQuery, LiveRegistry, SubscriptionId};
pub use view::{LiveView, LiveViewClosed};
