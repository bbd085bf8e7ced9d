use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DateKey, ResourceId};

/// `GET /api/service` response: the bookable resources plus the
/// default and maximum appointment durations in minutes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub resources: Vec<ResourceId>,
    pub duration: u32,
    pub max_duration: u32,
}

/// `GET /api/resources/{resourceId}` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDetails {
    pub id: ResourceId,
    pub name: String,
}

/// One element of the `GET /api/slots` response. Element 0 carries the
/// availability for the requested resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceAvailability {
    pub available_slots: Vec<AvailabilityEntry>,
}

/// A day's worth of bookable instants, all timestamps ISO-8601 UTC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityEntry {
    pub date: DateTime<Utc>,
    pub slots: Vec<DateTime<Utc>>,
}

/// One element of the `GET /api/bookings` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRecord {
    pub resource_id: ResourceId,
    pub time_window: TimeWindow,
}

/// Booked interval, times in 24-hour numeric form (1430 = 2:30 PM).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start_date: DateKey,
    pub start_time: u16,
    pub end_time: u16,
}
