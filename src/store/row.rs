//! Mapping between typed records and sheet rows.
//!
//! The attendance log is positional. Columns are 1-based like the hosted
//! sheet, and data index `i` lives on sheet row `i + 2` (row 1 is the header).
//! The directory and shift sheets are read by header name.

use chrono::NaiveDate;

use crate::{
    model::{
        attendance::{AttendanceRecord, AttendanceStatus, DATE_FORMAT, PunchOut, TIMESTAMP_FORMAT},
        employee::{Employee, EmployeeStatus},
        shift_rule::ShiftRule,
    },
    utils::date_parse::{parse_date_lenient, parse_timestamp_lenient},
};

pub const ATTENDANCE_WIDTH: usize = 14;

pub const COL_DATE: usize = 2;
pub const COL_EMPLOYEE_ID: usize = 3;
pub const COL_EMPLOYEE_NAME: usize = 4;
pub const COL_EMAIL: usize = 5;
pub const COL_SHIFT_NAME: usize = 6;
pub const COL_PUNCH_IN: usize = 7;
pub const COL_PUNCH_OUT: usize = 8;
pub const COL_WORK_HOURS: usize = 9;
pub const COL_ATTENDANCE_STATUS: usize = 10;

pub const ATTENDANCE_HEADER: [&str; ATTENDANCE_WIDTH] = [
    "",
    "Date",
    "Employee_ID",
    "Employee_Name",
    "Email",
    "Shift_Name",
    "Punch_In",
    "Punch_Out",
    "Work_Hours",
    "Attendance_Status",
    "",
    "",
    "",
    "",
];

pub const EMPLOYEE_COLUMNS: [&str; 5] =
    ["Email", "Status", "Employee_ID", "Employee_Name", "Shift_Name"];

pub const SHIFT_COLUMNS: [&str; 3] = ["Shift_Name", "Full_Day_Hrs", "Half_Day_Hrs"];

/// Sheet row number of a zero-based data index.
pub fn sheet_row(index: usize) -> usize {
    index + 2
}

/// Cell at a 1-based column; short rows read as blank.
pub fn cell(cells: &[String], column: usize) -> &str {
    column
        .checked_sub(1)
        .and_then(|i| cells.get(i))
        .map(|c| c.trim())
        .unwrap_or("")
}

pub fn row_email(cells: &[String]) -> &str {
    cell(cells, COL_EMAIL)
}

/// `None` when the date cell cannot be read; such rows never match a day.
pub fn row_date(cells: &[String]) -> Option<NaiveDate> {
    parse_date_lenient(cell(cells, COL_DATE))
}

/// Full-width row appended on punch-in. Trailing fields stay blank.
pub fn attendance_to_row(record: &AttendanceRecord) -> Vec<String> {
    let mut row = vec![String::new(); ATTENDANCE_WIDTH];
    row[COL_DATE - 1] = record.date.format(DATE_FORMAT).to_string();
    row[COL_EMPLOYEE_ID - 1] = record.employee_id.clone();
    row[COL_EMPLOYEE_NAME - 1] = record.employee_name.clone();
    row[COL_EMAIL - 1] = record.email.clone();
    row[COL_SHIFT_NAME - 1] = record.shift_name.clone();
    row[COL_PUNCH_IN - 1] = record.punch_in.format(TIMESTAMP_FORMAT).to_string();
    if let Some(out) = record.punch_out {
        row[COL_PUNCH_OUT - 1] = out.format(TIMESTAMP_FORMAT).to_string();
    }
    if let Some(hours) = record.work_hours {
        row[COL_WORK_HOURS - 1] = hours.to_string();
    }
    if let Some(status) = record.attendance_status {
        row[COL_ATTENDANCE_STATUS - 1] = status.to_string();
    }
    row
}

/// The three cell writes that close a day, as (column, value).
pub fn punch_out_cells(punch_out: &PunchOut) -> [(usize, String); 3] {
    [
        (
            COL_PUNCH_OUT,
            punch_out.punch_out.format(TIMESTAMP_FORMAT).to_string(),
        ),
        (COL_WORK_HOURS, punch_out.work_hours.to_string()),
        (COL_ATTENDANCE_STATUS, punch_out.attendance_status.to_string()),
    ]
}

/// Reads a log row already matched to `date`. Errors carry a reason only;
/// the caller knows the sheet and row.
pub fn attendance_from_row(cells: &[String], date: NaiveDate) -> Result<AttendanceRecord, String> {
    let punch_in_raw = cell(cells, COL_PUNCH_IN);
    let punch_in = parse_timestamp_lenient(punch_in_raw)
        .ok_or_else(|| format!("unreadable Punch_In {punch_in_raw:?}"))?;

    let punch_out = match cell(cells, COL_PUNCH_OUT) {
        "" => None,
        raw => Some(
            parse_timestamp_lenient(raw).ok_or_else(|| format!("unreadable Punch_Out {raw:?}"))?,
        ),
    };

    let work_hours = match cell(cells, COL_WORK_HOURS) {
        "" => None,
        raw => Some(
            raw.parse::<f64>()
                .map_err(|_| format!("unreadable Work_Hours {raw:?}"))?,
        ),
    };

    let attendance_status = match cell(cells, COL_ATTENDANCE_STATUS) {
        "" => None,
        raw => Some(
            raw.parse::<AttendanceStatus>()
                .map_err(|_| format!("unknown Attendance_Status {raw:?}"))?,
        ),
    };

    Ok(AttendanceRecord {
        date,
        employee_id: cell(cells, COL_EMPLOYEE_ID).to_string(),
        employee_name: cell(cells, COL_EMPLOYEE_NAME).to_string(),
        email: row_email(cells).to_string(),
        shift_name: cell(cells, COL_SHIFT_NAME).to_string(),
        punch_in,
        punch_out,
        work_hours,
        attendance_status,
    })
}

/// Positions of named columns in a header row.
#[derive(Debug, Clone)]
pub struct Columns {
    positions: Vec<usize>,
}

impl Columns {
    /// Resolves `names` against `header`; returns the first missing name on failure.
    pub fn resolve(header: &[String], names: &[&str]) -> Result<Self, String> {
        let positions = names
            .iter()
            .map(|name| {
                header
                    .iter()
                    .position(|h| h.trim() == *name)
                    .ok_or_else(|| name.to_string())
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { positions })
    }

    /// Cell for the `n`th resolved name.
    pub fn get<'a>(&self, cells: &'a [String], n: usize) -> &'a str {
        self.positions
            .get(n)
            .and_then(|&p| cells.get(p))
            .map(|c| c.trim())
            .unwrap_or("")
    }
}

/// Directory row, with columns resolved from [`EMPLOYEE_COLUMNS`].
pub fn employee_from_row(columns: &Columns, cells: &[String]) -> Employee {
    Employee {
        email: columns.get(cells, 0).to_string(),
        status: EmployeeStatus::from_cell(columns.get(cells, 1)),
        employee_id: columns.get(cells, 2).to_string(),
        employee_name: columns.get(cells, 3).to_string(),
        shift_name: columns.get(cells, 4).to_string(),
    }
}

/// Shift row, with columns resolved from [`SHIFT_COLUMNS`].
pub fn shift_from_row(columns: &Columns, cells: &[String]) -> Result<ShiftRule, String> {
    let hours = |n: usize, label: &str| {
        let raw = columns.get(cells, n);
        raw.parse::<f64>()
            .map_err(|_| format!("unreadable {label} {raw:?}"))
    };

    Ok(ShiftRule {
        shift_name: columns.get(cells, 0).to_string(),
        full_day_hrs: hours(1, "Full_Day_Hrs")?,
        half_day_hrs: hours(2, "Half_Day_Hrs")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn open_record() -> AttendanceRecord {
        AttendanceRecord {
            date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            employee_id: "EMP-001".into(),
            employee_name: "John Doe".into(),
            email: "john.doe@company.com".into(),
            shift_name: "General".into(),
            punch_in: NaiveDateTime::parse_from_str("2026-01-05 09:00:00", TIMESTAMP_FORMAT)
                .unwrap(),
            punch_out: None,
            work_hours: None,
            attendance_status: None,
        }
    }

    #[test]
    fn appended_row_has_fixed_layout() {
        let row = attendance_to_row(&open_record());
        assert_eq!(row.len(), ATTENDANCE_WIDTH);
        assert_eq!(
            row,
            cells(&[
                "",
                "2026-01-05",
                "EMP-001",
                "John Doe",
                "john.doe@company.com",
                "General",
                "2026-01-05 09:00:00",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
            ])
        );
    }

    #[test]
    fn punch_out_targets_columns_eight_to_ten() {
        let writes = punch_out_cells(&PunchOut {
            punch_out: NaiveDateTime::parse_from_str("2026-01-05 13:30:00", TIMESTAMP_FORMAT)
                .unwrap(),
            work_hours: 4.5,
            attendance_status: AttendanceStatus::HalfDay,
        });
        assert_eq!(
            writes,
            [
                (8, "2026-01-05 13:30:00".to_string()),
                (9, "4.5".to_string()),
                (10, "Half Day".to_string()),
            ]
        );
        assert_eq!(ATTENDANCE_HEADER[COL_PUNCH_OUT - 1], "Punch_Out");
        assert_eq!(ATTENDANCE_HEADER[COL_WORK_HOURS - 1], "Work_Hours");
        assert_eq!(ATTENDANCE_HEADER[COL_ATTENDANCE_STATUS - 1], "Attendance_Status");
    }

    #[test]
    fn first_data_row_is_sheet_row_two() {
        assert_eq!(sheet_row(0), 2);
        assert_eq!(sheet_row(9), 11);
    }

    #[test]
    fn reads_back_a_completed_row() {
        let row = cells(&[
            "",
            "1/5/2026",
            "EMP-001",
            "John Doe",
            "john.doe@company.com",
            "General",
            "2026-01-05 09:00:00",
            "2026-01-05 18:00:00",
            "9",
            "Present",
        ]);
        let date = row_date(&row).unwrap();
        let record = attendance_from_row(&row, date).unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        assert_eq!(record.work_hours, Some(9.0));
        assert_eq!(record.attendance_status, Some(AttendanceStatus::Present));
        assert!(record.punch_out.is_some());
    }

    #[test]
    fn short_rows_read_as_open() {
        let row = cells(&["", "2026-01-05", "EMP-001", "John", "j@c.com", "General", "2026-01-05 09:00:00"]);
        let record = attendance_from_row(&row, row_date(&row).unwrap()).unwrap();
        assert_eq!(record.punch_out, None);
        assert_eq!(record.work_hours, None);
        assert_eq!(record.attendance_status, None);
    }

    #[test]
    fn bad_cells_are_reported() {
        let row = cells(&["", "2026-01-05", "EMP-001", "John", "j@c.com", "General", "soon"]);
        let err = attendance_from_row(&row, row_date(&row).unwrap()).unwrap_err();
        assert!(err.contains("Punch_In"));

        let row = cells(&[
            "", "2026-01-05", "EMP-001", "John", "j@c.com", "General", "2026-01-05 09:00:00", "", "", "Late",
        ]);
        let err = attendance_from_row(&row, row_date(&row).unwrap()).unwrap_err();
        assert!(err.contains("Attendance_Status"));
    }

    #[test]
    fn unreadable_date_is_none() {
        let row = cells(&["", "someday", "EMP-001"]);
        assert_eq!(row_date(&row), None);
    }

    #[test]
    fn directory_columns_by_name() {
        let header = cells(&["Employee_ID", "Employee_Name", "Email", "Shift_Name", "Status"]);
        let columns = Columns::resolve(&header, &EMPLOYEE_COLUMNS).unwrap();
        let employee = employee_from_row(
            &columns,
            &cells(&["EMP-7", "Asha", "asha@company.com", "Night", "Inactive"]),
        );
        assert_eq!(employee.email, "asha@company.com");
        assert_eq!(employee.employee_id, "EMP-7");
        assert_eq!(employee.shift_name, "Night");
        assert_eq!(employee.status, EmployeeStatus::Inactive);

        let missing = Columns::resolve(&header[..4], &EMPLOYEE_COLUMNS).unwrap_err();
        assert_eq!(missing, "Status");
    }

    #[test]
    fn shift_hours_must_be_numbers() {
        let header = cells(&["Shift_Name", "Full_Day_Hrs", "Half_Day_Hrs"]);
        let columns = Columns::resolve(&header, &SHIFT_COLUMNS).unwrap();
        let rule = shift_from_row(&columns, &cells(&["General", "9", "4.5"])).unwrap();
        assert_eq!(rule, ShiftRule::new("General", 9.0, 4.5));
        assert!(shift_from_row(&columns, &cells(&["General", "nine", "4.5"])).is_err());
    }
}
