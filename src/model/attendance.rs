use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Classification written on punch-out.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
    AsRefStr, ToSchema,
)]
pub enum AttendanceStatus {
    Absent,
    #[strum(serialize = "Half Day")]
    #[serde(rename = "Half Day")]
    HalfDay,
    Present,
}

/// Where a daily record sits in `NotStarted -> PunchedIn -> Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecordState {
    NotStarted,
    PunchedIn,
    Completed,
}

/// The one button the portal offers for a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PortalAction {
    PunchIn,
    PunchOut,
}

impl RecordState {
    pub fn of(record: Option<&AttendanceRecord>) -> Self {
        match record {
            None => RecordState::NotStarted,
            Some(r) if r.punch_out.is_none() => RecordState::PunchedIn,
            Some(_) => RecordState::Completed,
        }
    }

    pub fn action(self) -> Option<PortalAction> {
        match self {
            RecordState::NotStarted => Some(PortalAction::PunchIn),
            RecordState::PunchedIn => Some(PortalAction::PunchOut),
            RecordState::Completed => None,
        }
    }
}

mod timestamp {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use super::super::TIMESTAMP_FORMAT;
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<NaiveDateTime>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => s.serialize_str(&v.format(TIMESTAMP_FORMAT).to_string()),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            Option::<String>::deserialize(d)?
                .map(|raw| {
                    NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT)
                        .map_err(serde::de::Error::custom)
                })
                .transpose()
        }
    }
}

/// One employee's attendance for one day. Unique per (email, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "date": "2026-01-05",
    "employee_id": "EMP-001",
    "employee_name": "John Doe",
    "email": "john.doe@company.com",
    "shift_name": "General",
    "punch_in": "2026-01-05 09:00:00",
    "punch_out": "2026-01-05 18:00:00",
    "work_hours": 9.0,
    "attendance_status": "Present"
}))]
pub struct AttendanceRecord {
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub employee_id: String,
    pub employee_name: String,
    pub email: String,
    pub shift_name: String,

    #[serde(with = "timestamp")]
    #[schema(example = "2026-01-05 09:00:00", value_type = String)]
    pub punch_in: NaiveDateTime,

    #[serde(with = "timestamp::option")]
    #[schema(example = "2026-01-05 18:00:00", value_type = Option<String>, nullable = true)]
    pub punch_out: Option<NaiveDateTime>,

    #[schema(example = 9.0, nullable = true)]
    pub work_hours: Option<f64>,

    #[schema(nullable = true)]
    pub attendance_status: Option<AttendanceStatus>,
}

/// Fields written in place when a day is closed.
#[derive(Debug, Clone, PartialEq)]
pub struct PunchOut {
    pub punch_out: NaiveDateTime,
    pub work_hours: f64,
    pub attendance_status: AttendanceStatus,
}

impl AttendanceRecord {
    pub fn state(&self) -> RecordState {
        RecordState::of(Some(self))
    }

    pub fn complete(&mut self, punch_out: &PunchOut) {
        self.punch_out = Some(punch_out.punch_out);
        self.work_hours = Some(punch_out.work_hours);
        self.attendance_status = Some(punch_out.attendance_status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(punch_out: Option<&str>) -> AttendanceRecord {
        AttendanceRecord {
            date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            employee_id: "EMP-001".into(),
            employee_name: "John Doe".into(),
            email: "john.doe@company.com".into(),
            shift_name: "General".into(),
            punch_in: NaiveDateTime::parse_from_str("2026-01-05 09:00:00", TIMESTAMP_FORMAT)
                .unwrap(),
            punch_out: punch_out
                .map(|p| NaiveDateTime::parse_from_str(p, TIMESTAMP_FORMAT).unwrap()),
            work_hours: None,
            attendance_status: None,
        }
    }

    #[test]
    fn state_machine_offers_one_action_per_state() {
        assert_eq!(RecordState::of(None).action(), Some(PortalAction::PunchIn));

        let open = record(None);
        assert_eq!(open.state(), RecordState::PunchedIn);
        assert_eq!(open.state().action(), Some(PortalAction::PunchOut));

        let closed = record(Some("2026-01-05 18:00:00"));
        assert_eq!(closed.state(), RecordState::Completed);
        assert_eq!(closed.state().action(), None);
    }

    #[test]
    fn status_text_matches_the_log() {
        assert_eq!(AttendanceStatus::HalfDay.to_string(), "Half Day");
        assert_eq!("Half Day".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::HalfDay);
        assert_eq!(AttendanceStatus::Present.as_ref(), "Present");
        assert!("half day".parse::<AttendanceStatus>().is_err());
    }

    #[test]
    fn serializes_timestamps_in_log_format() {
        let value = serde_json::to_value(record(None)).unwrap();
        assert_eq!(value["punch_in"], "2026-01-05 09:00:00");
        assert_eq!(value["date"], "2026-01-05");
        assert!(value["punch_out"].is_null());

        let mut closed = record(None);
        closed.complete(&PunchOut {
            punch_out: NaiveDateTime::parse_from_str("2026-01-05 13:30:00", TIMESTAMP_FORMAT)
                .unwrap(),
            work_hours: 4.5,
            attendance_status: AttendanceStatus::HalfDay,
        });
        let value = serde_json::to_value(&closed).unwrap();
        assert_eq!(value["attendance_status"], "Half Day");
        assert_eq!(value["work_hours"], 4.5);
        let back: AttendanceRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, closed);
    }
}
