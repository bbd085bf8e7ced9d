use std::collections::BTreeMap;

use chrono::NaiveDate;
use shared::domain::{DateKey, MonthKey, ResourceId, TimeLabel};
use tokio::sync::RwLock;

/// One calendar month of availability, keyed by day.
pub type MonthSlots = BTreeMap<DateKey, Vec<TimeLabel>>;

/// Availability cache: resource, then (year, month), then day. Entries
/// are only ever added or overwritten at the `(ResourceId, MonthKey)`
/// granularity; sibling keys stay untouched.
pub type AllAvailableSlots = BTreeMap<ResourceId, BTreeMap<MonthKey, MonthSlots>>;

/// A booked interval converted to display times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingWindow {
    pub start_time: TimeLabel,
    pub end_time: TimeLabel,
}

pub type BookingsByResource = BTreeMap<ResourceId, BTreeMap<DateKey, Vec<BookingWindow>>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffMember {
    pub id: ResourceId,
    pub name: String,
    pub image_path: Option<String>,
    pub available_slots: MonthSlots,
    pub selected_date: Option<NaiveDate>,
    pub slots_for_date: Vec<TimeLabel>,
}

impl StaffMember {
    pub fn new(id: ResourceId, name: impl Into<String>, image_path: Option<String>) -> Self {
        Self {
            id,
            name: name.into(),
            image_path,
            available_slots: MonthSlots::new(),
            selected_date: None,
            slots_for_date: Vec::new(),
        }
    }
}

/// Everything dispatched through the widget store. The staff
/// projection only folds the variants it owns; the rest fall through
/// unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum StaffEvent {
    Loading {
        loading: bool,
    },
    StaffFetched {
        staff_members: Vec<StaffMember>,
        duration: u32,
        max_duration: u32,
    },
    SlotsFetched {
        id: ResourceId,
        month: MonthKey,
        available_slots: MonthSlots,
    },
    DateSelected {
        date: NaiveDate,
    },
    BookingsFetched {
        bookings_by_resource: BookingsByResource,
    },
    /// Emitted by the checkout layer when the user picks a time.
    SlotSelected {
        date: NaiveDate,
        slot: TimeLabel,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaffState {
    pub staff_members: Vec<StaffMember>,
    pub duration: u32,
    pub max_duration: u32,
    pub all_available_slots: AllAvailableSlots,
    pub selected_staff_member: Option<StaffMember>,
    pub bookings_by_resource: BookingsByResource,
    pub loading: bool,
}

impl StaffState {
    pub fn initial() -> Self {
        Self {
            staff_members: Vec::new(),
            duration: 0,
            max_duration: 0,
            all_available_slots: AllAvailableSlots::new(),
            selected_staff_member: None,
            bookings_by_resource: BookingsByResource::new(),
            loading: false,
        }
    }
}

impl Default for StaffState {
    fn default() -> Self {
        Self::initial()
    }
}

/// Pure transition function: `(state, event) -> next state`. Never
/// touches a clock or performs I/O, so equal inputs always produce
/// structurally equal output.
pub fn project(state: &StaffState, event: &StaffEvent) -> StaffState {
    match event {
        StaffEvent::StaffFetched {
            staff_members,
            duration,
            max_duration,
        } => StaffState {
            staff_members: staff_members.clone(),
            duration: *duration,
            max_duration: *max_duration,
            ..state.clone()
        },
        StaffEvent::DateSelected { date } => {
            let selected_staff_member = state.selected_staff_member.as_ref().map(|member| {
                let key = DateKey::from(*date);
                StaffMember {
                    // A date with no slots is a valid selection; it
                    // must yield an empty list, never an error.
                    slots_for_date: member
                        .available_slots
                        .get(&key)
                        .cloned()
                        .unwrap_or_default(),
                    selected_date: Some(*date),
                    ..member.clone()
                }
            });
            StaffState {
                selected_staff_member,
                ..state.clone()
            }
        }
        StaffEvent::SlotsFetched {
            id,
            month,
            available_slots,
        } => {
            let mut all_available_slots = state.all_available_slots.clone();
            all_available_slots
                .entry(*id)
                .or_default()
                .insert(*month, available_slots.clone());
            // Selection carries the single month just fetched, not the
            // merged history.
            let selected_staff_member = state
                .staff_members
                .iter()
                .find(|member| member.id == *id)
                .map(|member| StaffMember {
                    available_slots: available_slots.clone(),
                    ..member.clone()
                })
                .or_else(|| state.selected_staff_member.clone());
            StaffState {
                all_available_slots,
                selected_staff_member,
                loading: false,
                ..state.clone()
            }
        }
        StaffEvent::Loading { loading } => StaffState {
            loading: *loading,
            ..state.clone()
        },
        StaffEvent::BookingsFetched {
            bookings_by_resource,
        } => StaffState {
            bookings_by_resource: bookings_by_resource.clone(),
            ..state.clone()
        },
        // Events owned by other slices of the widget.
        StaffEvent::SlotSelected { .. } => state.clone(),
    }
}

/// Holds the current state behind a lock and funnels every transition
/// through [`project`]. There is no ambient singleton; hosts construct
/// a store and hand it to whichever client needs it.
#[derive(Debug, Default)]
pub struct StaffStore {
    state: RwLock<StaffState>,
}

impl StaffStore {
    pub fn new() -> Self {
        Self::with_state(StaffState::initial())
    }

    pub fn with_state(state: StaffState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    pub async fn dispatch(&self, event: &StaffEvent) {
        let mut state = self.state.write().await;
        *state = project(&state, event);
    }

    pub async fn snapshot(&self) -> StaffState {
        self.state.read().await.clone()
    }
}
