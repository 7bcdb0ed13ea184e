use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::{
    error::PortalError,
    service::portal::{AttendancePortal, PortalView},
};

#[derive(Deserialize, Serialize, ToSchema)]
pub struct EmailRequest {
    #[schema(example = "john.doe@company.com", format = "email", value_type = String)]
    /// Company email as entered on the page
    pub email: String,
}

/// Today's attendance for an email
#[utoipa::path(
    get,
    path = "/api/attendance/today",
    params(
        ("email", Query, description = "Company email as entered on the page")
    ),
    responses(
        (status = 200, description = "Employee identified", body = PortalView),
        (status = 400, description = "Email is blank or missing", body = Object, example = json!({
            "message": "Please enter your company email."
        })),
        (status = 403, description = "Employee is inactive", body = Object, example = json!({
            "message": "Your account is inactive."
        })),
        (status = 404, description = "Email not in the directory", body = Object, example = json!({
            "message": "Email not found. Contact HR."
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn today(
    portal: web::Data<AttendancePortal>,
    query: web::Query<EmailRequest>,
) -> Result<HttpResponse, PortalError> {
    let view = portal.view(&query.email).await?;
    Ok(HttpResponse::Ok().json(view))
}

/// Punch-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/punch-in",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Punched in", body = Object, example = json!({
            "message": "Punch In successful",
            "record": {
                "date": "2026-01-05",
                "employee_id": "EMP-001",
                "employee_name": "John Doe",
                "email": "john.doe@company.com",
                "shift_name": "General",
                "punch_in": "2026-01-05 09:00:00",
                "punch_out": null,
                "work_hours": null,
                "attendance_status": null
            }
        })),
        (status = 400, description = "Email is blank"),
        (status = 403, description = "Employee is inactive"),
        (status = 404, description = "Email not in the directory"),
        (status = 409, description = "Already punched in today", body = Object, example = json!({
            "message": "Already punched in today"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn punch_in(
    portal: web::Data<AttendancePortal>,
    payload: web::Json<EmailRequest>,
) -> Result<HttpResponse, PortalError> {
    let record = portal.punch_in(&payload.email).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Punch In successful",
        "record": record
    })))
}

/// Punch-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/punch-out",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Punched out", body = Object, example = json!({
            "message": "Punch Out successful",
            "record": {
                "date": "2026-01-05",
                "employee_id": "EMP-001",
                "employee_name": "John Doe",
                "email": "john.doe@company.com",
                "shift_name": "General",
                "punch_in": "2026-01-05 09:00:00",
                "punch_out": "2026-01-05 18:00:00",
                "work_hours": 9.0,
                "attendance_status": "Present"
            }
        })),
        (status = 400, description = "Email is blank"),
        (status = 403, description = "Employee is inactive"),
        (status = 404, description = "Email not in the directory"),
        (status = 409, description = "No open punch-in for today", body = Object, example = json!({
            "message": "Already punched out today"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn punch_out(
    portal: web::Data<AttendancePortal>,
    payload: web::Json<EmailRequest>,
) -> Result<HttpResponse, PortalError> {
    let record = portal.punch_out(&payload.email).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Punch Out successful",
        "record": record
    })))
}
