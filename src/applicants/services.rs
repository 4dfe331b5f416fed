// src/applicants/services.rs
//! Create-or-update of an applicant's profile together with its files.

use std::sync::Arc;
use tracing::{error, info, warn};

use super::models::{ApplicantProfile, ProfileFields, ProfileSubmission};
use super::repository::ApplicantRepository;
use crate::common::{generate_applicant_id, Page, PageQuery};
use crate::uploads::{
    BlobKind, BlobStore, DocumentReconciler, EmptyDocumentsPolicy, SlotPlan, UploadError,
};

#[derive(Debug, thiserror::Error)]
pub enum ApplicantError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Upload failed: {0}")]
    Upload(#[from] UploadError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

pub struct ApplicantService {
    repository: Arc<dyn ApplicantRepository>,
    blobs: Arc<BlobStore>,
    policy: EmptyDocumentsPolicy,
}

impl ApplicantService {
    pub fn new(
        repository: Arc<dyn ApplicantRepository>,
        blobs: Arc<BlobStore>,
        policy: EmptyDocumentsPolicy,
    ) -> Self {
        Self {
            repository,
            blobs,
            policy,
        }
    }

    pub async fn find_by_owner(
        &self,
        owner_id: &str,
    ) -> Result<Option<ApplicantProfile>, ApplicantError> {
        Ok(self.repository.find_by_owner(owner_id).await?)
    }

    pub async fn search(&self, query: &PageQuery) -> Result<Page<ApplicantProfile>, ApplicantError> {
        Ok(self.repository.search(query).await?)
    }

    /// Creates the owner's profile on first submission and updates it in place
    /// afterwards.
    ///
    /// Every file is classified before anything is written. Blobs written by a
    /// call that ends up failing are removed again, and blobs dropped from the
    /// profile are only deleted once the row has been saved, so a failed call
    /// leaves the stored profile exactly as it was.
    pub async fn upsert(
        &self,
        owner_id: &str,
        submission: ProfileSubmission,
    ) -> Result<ApplicantProfile, ApplicantError> {
        let ProfileSubmission {
            fields,
            profile_picture,
            cv_files,
        } = submission;

        let (mut profile, created) = match self.repository.find_by_owner(owner_id).await? {
            Some(mut existing) => {
                fields.apply_to(&mut existing);
                (existing, false)
            }
            None => (new_profile(owner_id, fields)?, true),
        };

        let picture_plan = SlotPlan::new(
            profile.profile_picture.as_ref(),
            profile_picture,
            BlobKind::Image,
        )?;
        let documents_plan = match cv_files {
            Some(incoming) => Some(
                DocumentReconciler::new(&self.blobs, self.policy)
                    .plan(&profile.cv_files, incoming)?,
            ),
            None => None,
        };

        let picture = picture_plan.persist(&self.blobs).await?;
        let documents = match documents_plan {
            Some(plan) => match plan.persist(&self.blobs).await {
                Ok(persisted) => Some(persisted),
                Err(e) => {
                    picture.abort(&self.blobs).await;
                    return Err(e.into());
                }
            },
            None => None,
        };

        profile.profile_picture = picture.value().cloned();
        if let Some(persisted) = &documents {
            profile.cv_files = persisted.documents().clone();
        }

        let saved = match self.repository.save(&profile).await {
            Ok(saved) => saved,
            Err(e) => {
                error!(user_id = %owner_id, error = %e, "Failed to save applicant, discarding new files");
                picture.abort(&self.blobs).await;
                if let Some(persisted) = documents {
                    persisted.abort(&self.blobs).await;
                }
                return Err(e.into());
            }
        };

        picture.commit(&self.blobs).await;
        if let Some(persisted) = documents {
            persisted.commit(&self.blobs).await;
        }

        if created {
            info!(user_id = %owner_id, applicant_id = %saved.id, documents = saved.cv_files.len(), "Applicant created");
        } else {
            info!(user_id = %owner_id, applicant_id = %saved.id, documents = saved.cv_files.len(), "Applicant updated");
        }

        Ok(saved)
    }

    /// Removes the owner's profile and, best-effort, every blob it held.
    pub async fn delete_by_owner(&self, owner_id: &str) -> Result<bool, ApplicantError> {
        let Some(profile) = self.repository.delete_by_owner(owner_id).await? else {
            return Ok(false);
        };

        for reference in profile.blob_references() {
            self.blobs.delete_best_effort(reference).await;
        }

        info!(user_id = %owner_id, applicant_id = %profile.id, "Applicant deleted");
        Ok(true)
    }
}

fn new_profile(owner_id: &str, fields: ProfileFields) -> Result<ApplicantProfile, ApplicantError> {
    match fields {
        ProfileFields {
            full_name: Some(full_name),
            birth_date: Some(birth_date),
            city: Some(city),
            country: Some(country),
            gender: Some(gender),
            education: Some(education),
        } => Ok(ApplicantProfile {
            id: generate_applicant_id(),
            user_id: owner_id.to_string(),
            full_name,
            birth_date,
            city,
            country,
            gender,
            education,
            cv_files: Default::default(),
            profile_picture: None,
            created_at: None,
            updated_at: None,
        }),
        incomplete => {
            let missing = incomplete.missing();
            warn!(user_id = %owner_id, missing = ?missing, "Incomplete first submission");
            Err(ApplicantError::MissingFields(missing))
        }
    }
}

impl From<ApplicantError> for crate::common::ApiError {
    fn from(e: ApplicantError) -> Self {
        use crate::common::ApiError;
        match e {
            ApplicantError::MissingFields(_) => ApiError::ValidationError(e.to_string()),
            ApplicantError::Upload(e) => ApiError::UploadFailed(e),
            ApplicantError::DatabaseError(e) => ApiError::DatabaseError(e),
        }
    }
}
