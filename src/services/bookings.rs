use serde::Serialize;

use crate::db::{
    decode_all, encode_fields, Collection, Document, OrderBy, SharedStore, StoreError,
    Subscription,
};
use crate::models::{generate_order_id, now_millis, Booking, BookingStatus, NewBooking};
use crate::services::notification::Notifier;

const CREATED_AT: &str = "createdAt";

/// Estimated revenue per completed repair, shown on the dashboard.
pub const REVENUE_PER_COMPLETED: i64 = 50;

#[derive(Clone)]
pub struct BookingRepository {
    store: SharedStore,
    notifier: Notifier,
}

impl BookingRepository {
    pub fn new(store: SharedStore, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    /// Stamp order id, status and creation time, write the booking, then fire
    /// the confirmation email without waiting for it.
    pub async fn create_booking(&self, input: NewBooking) -> Result<Booking, StoreError> {
        let now = now_millis();
        let mut booking = input.into_booking(generate_order_id(now), now);

        let fields = encode_fields(&booking)?;
        let id = self
            .store
            .create(Collection::Bookings, fields)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "failed to create booking");
                e
            })?;
        booking.id = id;

        tracing::info!(id = %booking.id, order_id = %booking.order_id, "booking created");

        // Detached; the handle is only useful to tests
        let _ = self.notifier.booking_created(&booking);

        Ok(booking)
    }

    /// Newest-first live snapshots of every booking. The first snapshot is
    /// delivered before this returns.
    pub async fn subscribe_to_bookings<F>(&self, on_change: F) -> Result<Subscription, StoreError>
    where
        F: Fn(Vec<Booking>) + Send + Sync + 'static,
    {
        self.store
            .subscribe(
                Collection::Bookings,
                OrderBy::desc(CREATED_AT),
                Box::new(move |docs| on_change(decode_snapshot(docs))),
            )
            .await
    }

    pub async fn update_booking_status(
        &self,
        id: &str,
        status: BookingStatus,
    ) -> Result<(), StoreError> {
        self.store
            .update_fields(
                Collection::Bookings,
                id,
                serde_json::json!({ "status": status }),
            )
            .await
            .map_err(|e| {
                tracing::error!(%id, error = %e, "failed to update booking status");
                e
            })?;

        tracing::info!(%id, status = status.as_str(), "booking status updated");
        Ok(())
    }

    pub async fn get_booking(&self, id: &str) -> Result<Option<Booking>, StoreError> {
        match self.store.get(Collection::Bookings, id).await? {
            Some(doc) => Ok(Some(doc.decode()?)),
            None => Ok(None),
        }
    }

    pub async fn list_bookings(&self) -> Result<Vec<Booking>, StoreError> {
        let docs = self
            .store
            .list_ordered(Collection::Bookings, OrderBy::desc(CREATED_AT))
            .await?;
        decode_all(docs)
    }
}

/// A document that no longer decodes is dropped from the snapshot so the
/// rest of the feed keeps flowing.
fn decode_snapshot(docs: Vec<Document>) -> Vec<Booking> {
    docs.into_iter()
        .filter_map(|doc| {
            let id = doc.id.clone();
            doc.decode()
                .map_err(|e| tracing::error!(%id, error = %e, "skipping undecodable booking"))
                .ok()
        })
        .collect()
}

/// Dashboard list filter: optional status plus free-text search.
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub search: Option<String>,
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        let status_ok = self.status.map_or(true, |s| booking.status == s);
        let search_ok = self
            .search
            .as_deref()
            .map_or(true, |term| booking.matches_search(term));
        status_ok && search_ok
    }

    pub fn apply<'a>(&self, bookings: &'a [Booking]) -> Vec<&'a Booking> {
        bookings.iter().filter(|b| self.matches(b)).collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    pub estimated_revenue: i64,
}

impl DashboardStats {
    /// Computed over the whole snapshot, independent of any filter.
    pub fn from_bookings(bookings: &[Booking]) -> Self {
        let pending = bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Pending)
            .count();
        let completed = bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Completed)
            .count();

        Self {
            total: bookings.len(),
            pending,
            completed,
            estimated_revenue: completed as i64 * REVENUE_PER_COMPLETED,
        }
    }
}
