//! Versioned response shapes
//!
//! `ResponseStrategy` turns a `User` or a `LoginResult` into the JSON body
//! for the resolved API version. Unknown versions are shaped as v1.

use atlas_auth::Role;
use atlas_common::{ApiVersion, Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::User;
use crate::service::LoginResult;

/// Maximum number of characters in generated initials
const MAX_INITIALS: usize = 2;

/// Response shaping strategy per API version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStrategy {
    V1,
    V2,
}

/// `{ id, email, name, role }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub display_name: String,
    pub initials: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMetadata {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    #[serde(flatten)]
    pub summary: UserSummary,
    pub is_active: bool,
    pub profile: UserProfile,
    pub metadata: UserMetadata,
}

/// User body for either version
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UserBody {
    V1(UserSummary),
    V2(UserDetail),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginV1 {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
    pub expires_in: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginUser {
    #[serde(flatten)]
    pub summary: UserSummary,
    pub profile: UserProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginMetadata {
    pub login_time: DateTime<Utc>,
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginV2 {
    pub tokens: TokenPair,
    pub user: LoginUser,
    pub metadata: LoginMetadata,
}

/// Login body for either version
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LoginBody {
    V1(LoginV1),
    V2(LoginV2),
}

impl ResponseStrategy {
    pub fn select(version: &ApiVersion) -> Self {
        match version.as_str() {
            "v2" => Self::V2,
            _ => Self::V1,
        }
    }

    pub fn user(&self, user: &User) -> Result<UserBody> {
        let summary = summarize(user)?;
        Ok(match self {
            Self::V1 => UserBody::V1(summary),
            Self::V2 => UserBody::V2(UserDetail {
                summary,
                is_active: user.is_active,
                profile: UserProfile {
                    display_name: user.name.clone(),
                    initials: initials(&user.name),
                    status: Some(if user.is_active { "active" } else { "inactive" }),
                },
                metadata: UserMetadata {
                    created_at: user.created_at,
                    updated_at: user.updated_at,
                },
            }),
        })
    }

    pub fn login(&self, result: &LoginResult) -> Result<LoginBody> {
        require("accessToken", &result.access_token)?;
        require("refreshToken", &result.refresh_token)?;
        let summary = summarize(&result.user)?;

        Ok(match self {
            Self::V1 => LoginBody::V1(LoginV1 {
                access_token: result.access_token.clone(),
                refresh_token: result.refresh_token.clone(),
                user: summary,
            }),
            Self::V2 => LoginBody::V2(LoginV2 {
                tokens: TokenPair {
                    access: result.access_token.clone(),
                    refresh: result.refresh_token.clone(),
                    expires_in: result.expires_in.clone(),
                },
                user: LoginUser {
                    summary,
                    profile: UserProfile {
                        display_name: result.user.name.clone(),
                        initials: initials(&result.user.name),
                        status: None,
                    },
                },
                metadata: LoginMetadata {
                    login_time: result.issued_at,
                    ip_address: result.ip_address.clone(),
                },
            }),
        })
    }
}

/// First letter of each word, uppercased, at most two characters
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(MAX_INITIALS)
        .collect()
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        tracing::error!(field, "Cannot shape response: missing field");
        return Err(Error::Internal(format!("Missing field: {}", field)));
    }
    Ok(())
}

fn summarize(user: &User) -> Result<UserSummary> {
    if user.id.is_nil() {
        require("id", "")?;
    }
    require("email", &user.email)?;
    require("name", &user.name)?;

    Ok(UserSummary {
        id: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role,
    })
}
