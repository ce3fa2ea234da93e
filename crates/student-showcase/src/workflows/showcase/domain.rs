use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for published students.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub String);

/// Identifier wrapper for pending submissions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(pub String);

/// Account identifier issued by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Employment status shown on every profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    Employed,
    Internship,
    #[default]
    Looking,
}

impl EmploymentStatus {
    pub const fn ordered() -> [Self; 3] {
        [Self::Employed, Self::Internship, Self::Looking]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Employed => "employed",
            Self::Internship => "internship",
            Self::Looking => "looking",
        }
    }

    pub const fn display_label(self) -> &'static str {
        match self {
            Self::Employed => "Employed",
            Self::Internship => "On Internship",
            Self::Looking => "Looking for Opportunities",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown employment status '{0}' (expected employed, internship or looking)")]
pub struct UnknownStatus(pub String);

impl FromStr for EmploymentStatus {
    type Err = UnknownStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ordered()
            .into_iter()
            .find(|status| status.label() == normalized)
            .ok_or_else(|| UnknownStatus(raw.trim().to_string()))
    }
}

/// Editable profile fields shared by the self-service editor and admin roster.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfileFields {
    pub name: String,
    pub specialization: String,
    #[serde(default)]
    pub status: EmploymentStatus,
    pub description: String,
    #[serde(default)]
    pub portfolio_link: Option<String>,
    #[serde(default)]
    pub profile_photo_url: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Published, publicly visible profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(flatten)]
    pub profile: ProfileFields,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for the student collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub owner: Option<UserId>,
    pub profile: ProfileFields,
}

/// Profile fields captured by the public submission form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubmittedProfile {
    pub name: String,
    pub email: String,
    pub specialization: String,
    #[serde(default)]
    pub status: EmploymentStatus,
    pub description: String,
    #[serde(default)]
    pub portfolio_link: Option<String>,
    #[serde(default)]
    pub profile_photo_url: Option<String>,
}

/// Moderation state stored on a submission row. Terminal outcomes remove the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    Pending,
}

/// Unmoderated candidate profile awaiting an admin decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    #[serde(flatten)]
    pub profile: SubmittedProfile,
    #[serde(default)]
    pub submission_status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
}

impl Submission {
    /// Fields copied into the published student on promotion.
    ///
    /// The submitter's email is contact data for the moderators and is not
    /// carried onto the public listing.
    pub fn promotion_fields(&self) -> ProfileFields {
        ProfileFields {
            name: self.profile.name.clone(),
            specialization: self.profile.specialization.clone(),
            status: self.profile.status,
            description: self.profile.description.clone(),
            portfolio_link: self.profile.portfolio_link.clone(),
            profile_photo_url: self.profile.profile_photo_url.clone(),
            email: None,
            phone_number: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
        }
    }
}

/// Associates a user with a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrant {
    pub user_id: UserId,
    pub role: Role,
}

/// Read-only card rendered by the public directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentCard {
    pub id: StudentId,
    pub name: String,
    pub specialization: String,
    pub status: EmploymentStatus,
    pub status_label: &'static str,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl From<&Student> for StudentCard {
    fn from(student: &Student) -> Self {
        let profile = &student.profile;
        Self {
            id: student.id.clone(),
            name: profile.name.clone(),
            specialization: profile.specialization.clone(),
            status: profile.status,
            status_label: profile.status.display_label(),
            description: profile.description.clone(),
            portfolio_link: profile.portfolio_link.clone(),
            profile_photo_url: profile.profile_photo_url.clone(),
            email: profile.email.clone(),
            phone_number: profile.phone_number.clone(),
        }
    }
}
