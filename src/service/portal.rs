use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, SubsecRound};
use serde::Serialize;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use super::{clock::Clock, resolver};
use crate::{
    error::PortalError,
    model::{
        attendance::{AttendanceRecord, PortalAction, PunchOut, RecordState},
        employee::{Employee, EmployeeSummary},
    },
    store::{AttendanceStore, InsertOutcome, UpdateOutcome},
    utils::shift_cache::ShiftCache,
};

/// Everything the page needs after an email is entered.
#[derive(Debug, Serialize, ToSchema)]
pub struct PortalView {
    pub employee: EmployeeSummary,
    #[schema(example = "Welcome John Doe")]
    pub welcome: String,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub record: Option<AttendanceRecord>,
    pub state: RecordState,
    /// `null` once the day is completed
    pub action: Option<PortalAction>,
}

/// Identity check, today's record and the two punches, all against one
/// store and one fixed UTC offset.
pub struct AttendancePortal {
    store: Arc<dyn AttendanceStore>,
    shifts: ShiftCache,
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl AttendancePortal {
    pub fn new(
        store: Arc<dyn AttendanceStore>,
        shifts: ShiftCache,
        clock: Arc<dyn Clock>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            store,
            shifts,
            clock,
            offset,
        }
    }

    /// Wall-clock time in the portal's zone, whole seconds.
    fn local_now(&self) -> NaiveDateTime {
        self.clock
            .now()
            .with_timezone(&self.offset)
            .naive_local()
            .trunc_subsecs(0)
    }

    pub fn today(&self) -> NaiveDate {
        self.local_now().date()
    }

    /// Resolves an email to an active employee.
    pub async fn identify(&self, email: &str) -> Result<Employee, PortalError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(PortalError::EmptyEmail);
        }

        let employee = self
            .store
            .find_employee(email)
            .await?
            .ok_or(PortalError::NotFound)?;

        if !employee.is_active() {
            info!(employee_id = %employee.employee_id, "Inactive employee turned away");
            return Err(PortalError::Inactive);
        }

        Ok(employee)
    }

    pub async fn view(&self, email: &str) -> Result<PortalView, PortalError> {
        let employee = self.identify(email).await?;
        let date = self.today();
        let record = self.store.find_daily_record(&employee.email, date).await?;
        let state = RecordState::of(record.as_ref());

        debug!(employee_id = %employee.employee_id, %date, ?state, "Portal view");

        Ok(PortalView {
            welcome: format!("Welcome {}", employee.employee_name),
            employee: EmployeeSummary::from(&employee),
            date,
            record,
            state,
            action: state.action(),
        })
    }

    pub async fn punch_in(&self, email: &str) -> Result<AttendanceRecord, PortalError> {
        let employee = self.identify(email).await?;
        let now = self.local_now();

        let record = AttendanceRecord {
            date: now.date(),
            employee_id: employee.employee_id,
            employee_name: employee.employee_name,
            email: employee.email,
            shift_name: employee.shift_name,
            punch_in: now,
            punch_out: None,
            work_hours: None,
            attendance_status: None,
        };

        match self.store.insert_punch_in(&record).await? {
            InsertOutcome::Inserted => {
                info!(employee_id = %record.employee_id, punch_in = %now, "Punched in");
                Ok(record)
            }
            InsertOutcome::AlreadyExists => Err(PortalError::AlreadyPunchedIn),
        }
    }

    pub async fn punch_out(&self, email: &str) -> Result<AttendanceRecord, PortalError> {
        let employee = self.identify(email).await?;
        let now = self.local_now();
        let date = now.date();

        let mut record = self
            .store
            .find_daily_record(&employee.email, date)
            .await?
            .ok_or(PortalError::NotPunchedIn)?;
        if record.punch_out.is_some() {
            return Err(PortalError::AlreadyPunchedOut);
        }

        let shift = self
            .shifts
            .get(self.store.as_ref(), &employee.shift_name)
            .await?
            .ok_or_else(|| PortalError::ShiftNotFound(employee.shift_name.clone()))?;
        if !shift.is_consistent() {
            warn!(
                shift = %shift.shift_name,
                full_day_hrs = shift.full_day_hrs,
                half_day_hrs = shift.half_day_hrs,
                "Shift thresholds out of order"
            );
        }

        let resolution = resolver::resolve(record.punch_in, now, &shift);
        let punch_out = PunchOut {
            punch_out: now,
            work_hours: resolution.work_hours,
            attendance_status: resolution.status,
        };

        match self
            .store
            .complete_punch_out(&employee.email, date, &punch_out)
            .await?
        {
            UpdateOutcome::Updated => {
                record.complete(&punch_out);
                info!(
                    employee_id = %record.employee_id,
                    work_hours = resolution.work_hours,
                    status = %resolution.status,
                    "Punched out"
                );
                Ok(record)
            }
            UpdateOutcome::Missing => Err(PortalError::NotPunchedIn),
            UpdateOutcome::AlreadyClosed => Err(PortalError::AlreadyPunchedOut),
        }
    }
}
