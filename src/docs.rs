use crate::api::attendance::EmailRequest;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, PortalAction, RecordState};
use crate::model::employee::EmployeeSummary;
use crate::service::portal::PortalView;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Portal API",
        version = "1.0.0",
        description = r#"
## Employee Attendance Portal

An employee enters their company email, sees today's attendance record and
punches in or out.

### Flow
- **Identify**: the email is looked up in the employee directory. Unknown
  emails and inactive employees are turned away.
- **Today**: the record for today (in the portal's fixed time zone) is shown
  together with the single action available.
- **Punch In**: opens today's record. Allowed once per day.
- **Punch Out**: closes it, computing worked hours and the attendance status
  (`Present`, `Half Day` or `Absent`) from the employee's shift thresholds.

### Storage
Either a MySQL database or a folder of CSV sheets (`Employees`,
`Shift_Rules`, `Attendance_Log`).

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::today,
        crate::api::attendance::punch_in,
        crate::api::attendance::punch_out,
    ),
    components(
        schemas(
            EmailRequest,
            PortalView,
            EmployeeSummary,
            AttendanceRecord,
            AttendanceStatus,
            RecordState,
            PortalAction
        )
    ),
    tags(
        (name = "Attendance", description = "Punch in / punch out APIs"),
    )
)]
pub struct ApiDoc;
