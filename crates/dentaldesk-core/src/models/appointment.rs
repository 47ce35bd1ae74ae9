//! Appointment (booking) models.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};

/// Booking lifecycle status.
///
/// `Completed` is never set through a plain status change; see
/// `Scheduler::complete_appointment`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
        }
    }

    /// Active bookings occupy their doctor's calendar.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Scheduled | AppointmentStatus::Confirmed
        )
    }

    /// Whether a direct status change from `self` to `next` is allowed.
    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        match (self, next) {
            (_, Completed) => false,
            (current, next) if *current == next => true,
            (_, Cancelled) => true,
            (Cancelled, _) => false,
            (Scheduled, Confirmed) | (Confirmed, Scheduled) => true,
            _ => false,
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            "completed" => Ok(AppointmentStatus::Completed),
            _ => Err(format!("Unknown appointment status: {}", s)),
        }
    }
}

/// Payment state of a booking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Partial,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "partial" => Ok(PaymentStatus::Partial),
            "paid" => Ok(PaymentStatus::Paid),
            _ => Err(format!("Unknown payment status: {}", s)),
        }
    }
}

/// A half-open time interval `[start, end)` with `start < end`.
///
/// Instants are truncated to microseconds, the precision they are stored at.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeSlot {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeSlot {
    /// Build a slot, or `None` if `start >= end`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Option<Self> {
        let start = start.trunc_subsecs(6);
        let end = end.trunc_subsecs(6);
        (start < end).then_some(Self { start, end })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Non-empty intersection. Touching endpoints do not overlap.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        !(other.end <= self.start || other.start >= self.end)
    }
}

/// A booked appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    /// Local UUID
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub service_id: String,
    /// Booked interval
    pub slot: TimeSlot,
    pub status: AppointmentStatus,
    pub notes: String,
    /// Independent of `status`
    pub is_completed: bool,
    pub payment_status: PaymentStatus,
    pub amount_paid: f64,
    /// Service price frozen at booking time
    pub total_amount: f64,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Appointment {
    /// Create a new, unpaid appointment.
    pub fn new(
        patient_id: String,
        doctor_id: String,
        service_id: String,
        slot: TimeSlot,
        total_amount: f64,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id,
            doctor_id,
            service_id,
            slot,
            status: AppointmentStatus::Scheduled,
            notes: String::new(),
            is_completed: false,
            payment_status: PaymentStatus::Pending,
            amount_paid: 0.0,
            total_amount,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Amount paid beyond the frozen total, if any.
    pub fn overpayment(&self) -> Option<f64> {
        (self.amount_paid > self.total_amount).then(|| self.amount_paid - self.total_amount)
    }

    /// Outstanding balance (never negative).
    pub fn balance_due(&self) -> f64 {
        (self.total_amount - self.amount_paid).max(0.0)
    }

    /// Touch the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}
