// src/applicants/models.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::uploads::{RawPayloadOrReference, StoredBlobReference};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(format!("unknown gender: {}", other)),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Applicant row as stored in the database
#[derive(Debug, FromRow)]
pub struct ApplicantRow {
    pub id: String,
    pub user_id: String,
    pub full_name: String,
    pub birth_date: String,
    pub city: String,
    pub country: String,
    pub gender: String,
    pub education: String,
    pub cv_files: String,
    pub profile_picture: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// An applicant's profile, one per user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicantProfile {
    pub id: String,
    pub user_id: String,
    pub full_name: String,
    pub birth_date: NaiveDate,
    pub city: String,
    pub country: String,
    pub gender: Gender,
    pub education: String,
    pub cv_files: BTreeSet<StoredBlobReference>,
    pub profile_picture: Option<StoredBlobReference>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl ApplicantProfile {
    /// Every blob this profile owns
    pub fn blob_references(&self) -> impl Iterator<Item = &StoredBlobReference> {
        self.profile_picture.iter().chain(self.cv_files.iter())
    }
}

impl TryFrom<ApplicantRow> for ApplicantProfile {
    type Error = String;

    fn try_from(row: ApplicantRow) -> Result<Self, Self::Error> {
        let birth_date = NaiveDate::parse_from_str(&row.birth_date, "%Y-%m-%d")
            .map_err(|e| format!("birth_date '{}': {}", row.birth_date, e))?;
        let gender = row.gender.parse::<Gender>()?;
        let cv_files: Vec<String> = serde_json::from_str(&row.cv_files)
            .map_err(|e| format!("cv_files: {}", e))?;

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            full_name: row.full_name,
            birth_date,
            city: row.city,
            country: row.country,
            gender,
            education: row.education,
            cv_files: cv_files
                .into_iter()
                .map(StoredBlobReference::from_persisted)
                .collect(),
            profile_picture: row.profile_picture.map(StoredBlobReference::from_persisted),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Body of `PUT /api/applications`
///
/// `profile_picture` and the entries of `cv_files` are either base64 payloads
/// or references previously returned by the API. A missing field leaves the
/// stored value alone.
#[derive(Debug, Default, Deserialize)]
pub struct ApplicationRequest {
    pub full_name: Option<String>,
    pub birth_date: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub gender: Option<String>,
    pub education: Option<String>,
    pub profile_picture: Option<String>,
    pub cv_files: Option<Vec<String>>,
}

/// Parsed scalar fields of a submission; `None` means "not submitted"
#[derive(Debug, Clone, Default)]
pub struct ProfileFields {
    pub full_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub gender: Option<Gender>,
    pub education: Option<String>,
}

impl ProfileFields {
    /// Names of the fields a new profile cannot be created without
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.full_name.is_none() {
            missing.push("full_name");
        }
        if self.birth_date.is_none() {
            missing.push("birth_date");
        }
        if self.city.is_none() {
            missing.push("city");
        }
        if self.country.is_none() {
            missing.push("country");
        }
        if self.gender.is_none() {
            missing.push("gender");
        }
        if self.education.is_none() {
            missing.push("education");
        }
        missing
    }

    pub fn apply_to(self, profile: &mut ApplicantProfile) {
        if let Some(v) = self.full_name {
            profile.full_name = v;
        }
        if let Some(v) = self.birth_date {
            profile.birth_date = v;
        }
        if let Some(v) = self.city {
            profile.city = v;
        }
        if let Some(v) = self.country {
            profile.country = v;
        }
        if let Some(v) = self.gender {
            profile.gender = v;
        }
        if let Some(v) = self.education {
            profile.education = v;
        }
    }
}

/// A submission after the transport boundary has decoded its files
#[derive(Debug, Default)]
pub struct ProfileSubmission {
    pub fields: ProfileFields,
    pub profile_picture: Option<RawPayloadOrReference>,
    pub cv_files: Option<Vec<RawPayloadOrReference>>,
}
