//! Request/response bodies. Field names follow the wire format
//! (`user-id` in member payloads, snake_case elsewhere).

use serde::{Deserialize, Serialize};

use clubhouse_auth::Role;
use clubhouse_core::UserId;
use clubhouse_infra::store::{Club, ClubDetails, EventDetails, Member};

use crate::app::errors::ApiError;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub telephone_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub email: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMemberRequest {
    #[serde(rename = "user-id")]
    pub user_id: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveMemberRequest {
    #[serde(rename = "user-id")]
    pub user_id: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Serialize)]
pub struct ClubDetailsResponse {
    #[serde(flatten)]
    pub club: Club,
    pub members: Vec<Member>,
}

// -------------------------
// Parsing / validation
// -------------------------

/// Parse a role name for assignment through the member endpoints.
pub fn parse_assignable_role(raw: &str) -> Result<Role, ApiError> {
    let role: Role = raw
        .parse()
        .map_err(|_| ApiError::BadRequest("invalid role".to_string()))?;
    if !role.is_assignable() {
        return Err(ApiError::BadRequest(format!("role {role} cannot be assigned")));
    }
    Ok(role)
}

pub fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    UserId::new(raw.trim()).map_err(|_| ApiError::BadRequest("invalid user id".to_string()))
}

fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{field} is required")));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ApiError> {
    require("email", email)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ApiError::BadRequest("invalid email".to_string())),
    }
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        require("first_name", &self.first_name)?;
        require("last_name", &self.last_name)?;
        validate_email(&self.email)
    }
}

pub fn validate_club(details: &ClubDetails) -> Result<(), ApiError> {
    require("name", &details.name)
}

pub fn validate_event(details: &EventDetails) -> Result<(), ApiError> {
    require("title", &details.title)?;
    if details.end_date < details.start_date {
        return Err(ApiError::BadRequest("end_date precedes start_date".to_string()));
    }
    Ok(())
}
