use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Directory status. Anything other than `Active` blocks punching.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
pub enum EmployeeStatus {
    Active,
    Inactive,
}

impl EmployeeStatus {
    /// Reads a directory cell. Only `Active` counts, case-sensitive, padding ignored.
    pub fn from_cell(value: &str) -> Self {
        match value.trim().parse::<EmployeeStatus>() {
            Ok(EmployeeStatus::Active) => EmployeeStatus::Active,
            _ => EmployeeStatus::Inactive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "employee_id": "EMP-001",
        "employee_name": "John Doe",
        "email": "john.doe@company.com",
        "shift_name": "General",
        "status": "Active"
    })
)]
pub struct Employee {
    #[schema(example = "EMP-001")]
    pub employee_id: String,

    #[schema(example = "John Doe")]
    pub employee_name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[schema(example = "General")]
    pub shift_name: String,

    pub status: EmployeeStatus,
}

impl Employee {
    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }
}

/// What the portal shows about the person once they are identified.
#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeSummary {
    #[schema(example = "EMP-001")]
    pub employee_id: String,
    #[schema(example = "John Doe")]
    pub employee_name: String,
    #[schema(example = "General")]
    pub shift_name: String,
}

impl From<&Employee> for EmployeeSummary {
    fn from(e: &Employee) -> Self {
        Self {
            employee_id: e.employee_id.clone(),
            employee_name: e.employee_name.clone(),
            shift_name: e.shift_name.clone(),
        }
    }
}
