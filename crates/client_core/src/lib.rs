use std::sync::Arc;

use chrono::NaiveDate;
use futures::future;
use reqwest::Client;
use shared::{
    domain::{DateKey, MonthKey, ResourceId, TimeLabel},
    protocol::{
        AvailabilityEntry, BookingRecord, ResourceAvailability, ResourceDetails, ServiceDescriptor,
    },
};
use tokio::sync::broadcast;
use tracing::{debug, info};

pub mod error;
pub mod store;

pub use error::ClientError;
use store::{
    BookingWindow, BookingsByResource, MonthSlots, StaffEvent, StaffMember, StaffState, StaffStore,
};

/// Staff whose portraits the widget can show. Unregistered names
/// render without an image; that is not an error.
fn image_for(name: &str) -> Option<&'static str> {
    match name {
        "James Hunter" => Some("http://i.pravatar.cc/300?img=69"),
        "Selena Yamada" => Some("http://i.pravatar.cc/300?img=25"),
        "Sarah Belmoris" => Some("http://i.pravatar.cc/300?img=32"),
        "Phillip Fry" => Some("http://i.pravatar.cc/300?img=15"),
        _ => None,
    }
}

/// Groups raw availability entries by their UTC calendar date, each
/// slot instant formatted as a display label.
fn key_off_date(entries: &[AvailabilityEntry]) -> MonthSlots {
    let mut formatted = MonthSlots::new();
    for entry in entries {
        let slots = entry.slots.iter().map(TimeLabel::of_timestamp).collect();
        formatted.insert(DateKey::of_timestamp(&entry.date), slots);
    }
    formatted
}

/// Groups bookings by resource then date, converting military times to
/// display labels. Same-day bookings accumulate into a list.
fn key_off_resource_id(bookings: Vec<BookingRecord>) -> Result<BookingsByResource, ClientError> {
    let mut bookings_by_resource = BookingsByResource::new();
    for booking in bookings {
        let window = BookingWindow {
            start_time: TimeLabel::from_military(booking.time_window.start_time)?,
            end_time: TimeLabel::from_military(booking.time_window.end_time)?,
        };
        bookings_by_resource
            .entry(booking.resource_id)
            .or_default()
            .entry(booking.time_window.start_date)
            .or_default()
            .push(window);
    }
    Ok(bookings_by_resource)
}

/// Issues the widget's REST requests and dispatches the resulting
/// events into an injected [`StaffStore`]. Subscribers see every
/// dispatched event in order via [`BookingClient::subscribe_events`].
pub struct BookingClient {
    http: Client,
    server_url: String,
    store: Arc<StaffStore>,
    events: broadcast::Sender<StaffEvent>,
}

impl BookingClient {
    pub fn new(server_url: impl Into<String>) -> Arc<Self> {
        Self::with_store(server_url, Arc::new(StaffStore::new()))
    }

    pub fn with_store(server_url: impl Into<String>, store: Arc<StaffStore>) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            http: Client::new(),
            server_url: server_url.into(),
            store,
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<StaffEvent> {
        self.events.subscribe()
    }

    pub async fn state(&self) -> StaffState {
        self.store.snapshot().await
    }

    async fn dispatch(&self, event: StaffEvent) {
        self.store.dispatch(&event).await;
        let _ = self.events.send(event);
    }

    /// Fetches the service descriptor, then every resource's details
    /// concurrently. Either all per-resource requests succeed and a
    /// single `StaffFetched` is dispatched, or the whole operation
    /// fails and no event is emitted.
    pub async fn fetch_staff(&self) -> Result<(), ClientError> {
        let descriptor: ServiceDescriptor = self
            .http
            .get(format!("{}/api/service", self.server_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let fetches = descriptor
            .resources
            .iter()
            .map(|resource_id| self.fetch_staff_member(*resource_id));
        let staff_members = future::try_join_all(fetches).await?;

        info!(count = staff_members.len(), "staff: roster fetched");
        self.dispatch(StaffEvent::StaffFetched {
            staff_members,
            duration: descriptor.duration,
            max_duration: descriptor.max_duration,
        })
        .await;
        Ok(())
    }

    async fn fetch_staff_member(&self, resource_id: ResourceId) -> Result<StaffMember, ClientError> {
        let details: ResourceDetails = self
            .http
            .get(format!("{}/api/resources/{}", self.server_url, resource_id.0))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let image_path = image_for(&details.name).map(str::to_string);
        Ok(StaffMember::new(details.id, details.name, image_path))
    }

    /// Dispatches `Loading`, then resolves the month's slots either
    /// from the cache or from the network. Callers cannot tell which
    /// path ran: both dispatch the same `SlotsFetched` shape and
    /// resolve `Ok(())`. Overlapping calls for the same key are not
    /// deduplicated, so two in-flight fetches may both hit the network.
    pub async fn fetch_slots_for_resource(
        &self,
        start_date: NaiveDate,
        resource_id: ResourceId,
    ) -> Result<(), ClientError> {
        let month = MonthKey::of(start_date);
        self.dispatch(StaffEvent::Loading { loading: true }).await;

        let cached = self
            .store
            .snapshot()
            .await
            .all_available_slots
            .get(&resource_id)
            .and_then(|months| months.get(&month))
            .cloned();

        let available_slots = match cached {
            Some(slots) => {
                debug!(
                    resource_id = resource_id.0,
                    year = month.year,
                    month = %month.month,
                    "slots: serving cached month"
                );
                slots
            }
            None => {
                let end_date = month.last_day();
                let response: Vec<ResourceAvailability> = self
                    .http
                    .get(format!("{}/api/slots", self.server_url))
                    .query(&[
                        ("start_date", start_date.to_string()),
                        ("end_date", end_date.to_string()),
                        ("resource_id", resource_id.0.to_string()),
                    ])
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?;
                let slots = response
                    .first()
                    .map(|resource| key_off_date(&resource.available_slots))
                    .unwrap_or_default();
                info!(
                    resource_id = resource_id.0,
                    year = month.year,
                    month = %month.month,
                    days = slots.len(),
                    "slots: month fetched"
                );
                slots
            }
        };

        self.dispatch(StaffEvent::SlotsFetched {
            id: resource_id,
            month,
            available_slots,
        })
        .await;
        Ok(())
    }

    /// Pure pass-through: dispatches `DateSelected`, no I/O.
    pub async fn select_date(&self, date: NaiveDate) {
        self.dispatch(StaffEvent::DateSelected { date }).await;
    }

    pub async fn fetch_bookings(&self) -> Result<(), ClientError> {
        let bookings: Vec<BookingRecord> = self
            .http
            .get(format!("{}/api/bookings", self.server_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let bookings_by_resource = key_off_resource_id(bookings)?;

        info!(
            resources = bookings_by_resource.len(),
            "bookings: fetched and grouped"
        );
        self.dispatch(StaffEvent::BookingsFetched {
            bookings_by_resource,
        })
        .await;
        Ok(())
    }
}
