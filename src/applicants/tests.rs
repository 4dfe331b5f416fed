//! Tests for applicants module
//!
//! Covers the upsert of a profile together with its files: creation, in-place
//! updates, document reconciliation, and the guarantee that a failed
//! submission leaves both the row and the blob directory untouched.

#[cfg(test)]
mod tests {
    use super::super::models::*;
    use super::super::*;
    use crate::common::migrations::test_support::setup_test_db;
    use crate::common::PageQuery;
    use crate::uploads::fixtures;
    use crate::uploads::{
        BlobStore, BlobStoreConfig, EmptyDocumentsPolicy, RawPayloadOrReference,
        StoredBlobReference, UploadError,
    };
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use sqlx::SqlitePool;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Harness {
        db: SqlitePool,
        store: Arc<BlobStore>,
        service: ApplicantService,
        _dir: TempDir,
    }

    async fn harness(policy: EmptyDocumentsPolicy) -> Harness {
        let db = setup_test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(
            BlobStore::open(BlobStoreConfig {
                root: dir.path().join("uploads"),
            })
            .await
            .unwrap(),
        );
        let repository = Arc::new(SqliteApplicantRepository::new(db.clone()));
        let service = ApplicantService::new(repository, store.clone(), policy);
        Harness {
            db,
            store,
            service,
            _dir: dir,
        }
    }

    async fn insert_user(db: &SqlitePool, id: &str) {
        sqlx::query("INSERT INTO users (id, email, password_hash, full_name) VALUES (?, ?, 'x', ?)")
            .bind(id)
            .bind(format!("{}@example.com", id))
            .bind(id)
            .execute(db)
            .await
            .unwrap();
    }

    fn complete_fields(full_name: &str) -> ProfileFields {
        ProfileFields {
            full_name: Some(full_name.to_string()),
            birth_date: NaiveDate::from_ymd_opt(1990, 12, 10),
            city: Some("London".to_string()),
            country: Some("UK".to_string()),
            gender: Some(Gender::Female),
            education: Some("Mathematics".to_string()),
        }
    }

    fn file_count(store: &BlobStore, namespace: &str) -> usize {
        std::fs::read_dir(store.root().join(namespace))
            .unwrap()
            .count()
    }

    async fn exists(store: &BlobStore, reference: &StoredBlobReference) -> bool {
        store.read(reference).await.is_ok()
    }

    /// Creates a profile with one picture and two PDFs
    async fn seeded(h: &Harness, owner: &str) -> ApplicantProfile {
        insert_user(&h.db, owner).await;
        h.service
            .upsert(
                owner,
                ProfileSubmission {
                    fields: complete_fields("Ada Lovelace"),
                    profile_picture: Some(RawPayloadOrReference::Raw(fixtures::png_bytes())),
                    cv_files: Some(vec![
                        RawPayloadOrReference::Raw(fixtures::pdf_bytes()),
                        RawPayloadOrReference::Raw(fixtures::pdf_bytes()),
                    ]),
                },
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_first_submission_creates_profile_with_files() {
        let h = harness(EmptyDocumentsPolicy::ClearAll).await;
        insert_user(&h.db, "U1").await;

        let profile = h
            .service
            .upsert(
                "U1",
                ProfileSubmission {
                    fields: complete_fields("Ada Lovelace"),
                    profile_picture: Some(RawPayloadOrReference::Raw(fixtures::png_bytes())),
                    cv_files: Some(vec![RawPayloadOrReference::Raw(fixtures::pdf_bytes())]),
                },
            )
            .await
            .unwrap();

        assert_eq!(profile.user_id, "U1");
        assert_eq!(profile.full_name, "Ada Lovelace");
        assert!(profile.id.starts_with('A'));

        let picture = profile.profile_picture.as_ref().unwrap();
        assert!(h.store.is_stored_reference(picture.as_str()));
        assert!(picture.as_str().ends_with(".png"));
        assert_eq!(profile.cv_files.len(), 1);
        for reference in profile.blob_references() {
            assert!(exists(&h.store, reference).await);
        }

        let reloaded = h.service.find_by_owner("U1").await.unwrap().unwrap();
        assert_eq!(reloaded, profile);
    }

    #[tokio::test]
    async fn test_first_submission_requires_every_field() {
        let h = harness(EmptyDocumentsPolicy::ClearAll).await;
        insert_user(&h.db, "U1").await;

        let mut fields = complete_fields("Ada Lovelace");
        fields.city = None;
        fields.gender = None;

        let err = h
            .service
            .upsert(
                "U1",
                ProfileSubmission {
                    fields,
                    profile_picture: Some(RawPayloadOrReference::Raw(fixtures::png_bytes())),
                    cv_files: None,
                },
            )
            .await
            .unwrap_err();

        match err {
            ApplicantError::MissingFields(missing) => {
                assert_eq!(missing, vec!["city", "gender"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(file_count(&h.store, "images"), 0);
        assert!(h.service.find_by_owner("U1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_keeps_echoed_document_and_deletes_dropped_one() {
        let h = harness(EmptyDocumentsPolicy::ClearAll).await;
        let before = seeded(&h, "U1").await;
        let mut docs = before.cv_files.iter().cloned();
        let doc_a = docs.next().unwrap();
        let doc_b = docs.next().unwrap();

        let after = h
            .service
            .upsert(
                "U1",
                ProfileSubmission {
                    cv_files: Some(vec![
                        RawPayloadOrReference::Reference(doc_a.clone()),
                        RawPayloadOrReference::Raw(fixtures::docx_bytes()),
                    ]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(after.id, before.id);
        assert_eq!(after.cv_files.len(), 2);
        assert!(after.cv_files.contains(&doc_a));
        assert!(!after.cv_files.contains(&doc_b));
        assert!(after.cv_files.iter().any(|r| r.as_str().ends_with(".docx")));
        assert!(!exists(&h.store, &doc_b).await);
        assert_eq!(file_count(&h.store, "documents"), 2);

        // Untouched fields survive a partial update
        assert_eq!(after.profile_picture, before.profile_picture);
        assert_eq!(after.city, "London");
    }

    #[tokio::test]
    async fn test_scalar_update_leaves_files_alone() {
        let h = harness(EmptyDocumentsPolicy::ClearAll).await;
        let before = seeded(&h, "U1").await;

        let after = h
            .service
            .upsert(
                "U1",
                ProfileSubmission {
                    fields: ProfileFields {
                        city: Some("Paris".to_string()),
                        ..Default::default()
                    },
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(after.city, "Paris");
        assert_eq!(after.full_name, before.full_name);
        assert_eq!(after.cv_files, before.cv_files);
        assert_eq!(after.profile_picture, before.profile_picture);
        assert_eq!(file_count(&h.store, "documents"), 2);
        assert_eq!(file_count(&h.store, "images"), 1);
    }

    #[tokio::test]
    async fn test_unsupported_document_leaves_profile_unchanged() {
        let h = harness(EmptyDocumentsPolicy::ClearAll).await;
        let before = seeded(&h, "U1").await;
        let kept = before.cv_files.iter().next().unwrap().clone();

        let err = h
            .service
            .upsert(
                "U1",
                ProfileSubmission {
                    fields: ProfileFields {
                        full_name: Some("Someone Else".to_string()),
                        ..Default::default()
                    },
                    profile_picture: Some(RawPayloadOrReference::Raw(fixtures::jpeg_bytes())),
                    cv_files: Some(vec![
                        RawPayloadOrReference::Reference(kept),
                        RawPayloadOrReference::Raw(fixtures::pdf_bytes()),
                        RawPayloadOrReference::Raw(fixtures::plain_zip_bytes()),
                    ]),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApplicantError::Upload(UploadError::UnsupportedFormat(_))
        ));

        let after = h.service.find_by_owner("U1").await.unwrap().unwrap();
        assert_eq!(after, before);
        assert_eq!(file_count(&h.store, "documents"), 2);
        assert_eq!(file_count(&h.store, "images"), 1);
        for reference in before.blob_references() {
            assert!(exists(&h.store, reference).await);
        }
    }

    #[tokio::test]
    async fn test_empty_document_list_clears_by_default() {
        let h = harness(EmptyDocumentsPolicy::ClearAll).await;
        let before = seeded(&h, "U1").await;

        let after = h
            .service
            .upsert(
                "U1",
                ProfileSubmission {
                    cv_files: Some(Vec::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(after.cv_files.is_empty());
        for reference in &before.cv_files {
            assert!(!exists(&h.store, reference).await);
        }
        assert_eq!(file_count(&h.store, "documents"), 0);
        assert_eq!(after.profile_picture, before.profile_picture);
    }

    #[tokio::test]
    async fn test_empty_document_list_is_noop_with_keep_policy() {
        let h = harness(EmptyDocumentsPolicy::KeepExisting).await;
        let before = seeded(&h, "U1").await;

        let after = h
            .service
            .upsert(
                "U1",
                ProfileSubmission {
                    cv_files: Some(Vec::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(after.cv_files, before.cv_files);
        assert_eq!(file_count(&h.store, "documents"), 2);
    }

    #[tokio::test]
    async fn test_resubmitting_current_state_changes_nothing() {
        let h = harness(EmptyDocumentsPolicy::ClearAll).await;
        let before = seeded(&h, "U1").await;

        let after = h
            .service
            .upsert(
                "U1",
                ProfileSubmission {
                    fields: complete_fields("Ada Lovelace"),
                    profile_picture: before
                        .profile_picture
                        .clone()
                        .map(RawPayloadOrReference::Reference),
                    cv_files: Some(
                        before
                            .cv_files
                            .iter()
                            .cloned()
                            .map(RawPayloadOrReference::Reference)
                            .collect(),
                    ),
                },
            )
            .await
            .unwrap();

        assert_eq!(after.cv_files, before.cv_files);
        assert_eq!(after.profile_picture, before.profile_picture);
        assert_eq!(file_count(&h.store, "documents"), 2);
        assert_eq!(file_count(&h.store, "images"), 1);
    }

    #[tokio::test]
    async fn test_new_picture_replaces_old_one() {
        let h = harness(EmptyDocumentsPolicy::ClearAll).await;
        let before = seeded(&h, "U1").await;
        let old_picture = before.profile_picture.clone().unwrap();

        let after = h
            .service
            .upsert(
                "U1",
                ProfileSubmission {
                    profile_picture: Some(RawPayloadOrReference::Raw(fixtures::jpeg_bytes())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let new_picture = after.profile_picture.unwrap();
        assert_ne!(new_picture, old_picture);
        assert!(new_picture.as_str().ends_with(".jpeg"));
        assert!(!exists(&h.store, &old_picture).await);
        assert_eq!(file_count(&h.store, "images"), 1);
    }

    #[tokio::test]
    async fn test_document_cannot_be_used_as_picture() {
        let h = harness(EmptyDocumentsPolicy::ClearAll).await;
        let before = seeded(&h, "U1").await;

        let err = h
            .service
            .upsert(
                "U1",
                ProfileSubmission {
                    profile_picture: Some(RawPayloadOrReference::Raw(fixtures::pdf_bytes())),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApplicantError::Upload(UploadError::UnsupportedFormat(_))
        ));
        assert_eq!(
            h.service.find_by_owner("U1").await.unwrap().unwrap(),
            before
        );
    }

    #[tokio::test]
    async fn test_references_owned_by_another_applicant_are_rejected() {
        let h = harness(EmptyDocumentsPolicy::ClearAll).await;
        let victim = seeded(&h, "U1").await;
        let stolen = victim.cv_files.iter().next().unwrap().clone();
        insert_user(&h.db, "U2").await;

        let err = h
            .service
            .upsert(
                "U2",
                ProfileSubmission {
                    fields: complete_fields("Mallory"),
                    profile_picture: None,
                    cv_files: Some(vec![RawPayloadOrReference::Reference(stolen.clone())]),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApplicantError::Upload(UploadError::ForeignReference(_))
        ));
        assert!(h.service.find_by_owner("U2").await.unwrap().is_none());
        assert!(exists(&h.store, &stolen).await);
    }

    /// Reads through to SQLite but refuses to write
    struct ReadOnlyRepository {
        inner: SqliteApplicantRepository,
    }

    #[async_trait]
    impl ApplicantRepository for ReadOnlyRepository {
        async fn find_by_owner(
            &self,
            owner_id: &str,
        ) -> Result<Option<ApplicantProfile>, sqlx::Error> {
            self.inner.find_by_owner(owner_id).await
        }

        async fn save(&self, _profile: &ApplicantProfile) -> Result<ApplicantProfile, sqlx::Error> {
            Err(sqlx::Error::Protocol("database is read-only".to_string()))
        }

        async fn search(
            &self,
            query: &PageQuery,
        ) -> Result<crate::common::Page<ApplicantProfile>, sqlx::Error> {
            self.inner.search(query).await
        }

        async fn delete_by_owner(
            &self,
            owner_id: &str,
        ) -> Result<Option<ApplicantProfile>, sqlx::Error> {
            self.inner.delete_by_owner(owner_id).await
        }
    }

    #[tokio::test]
    async fn test_failed_save_discards_new_files_and_keeps_old_ones() {
        let h = harness(EmptyDocumentsPolicy::ClearAll).await;
        let before = seeded(&h, "U1").await;

        let failing = ApplicantService::new(
            Arc::new(ReadOnlyRepository {
                inner: SqliteApplicantRepository::new(h.db.clone()),
            }),
            h.store.clone(),
            EmptyDocumentsPolicy::ClearAll,
        );

        let err = failing
            .upsert(
                "U1",
                ProfileSubmission {
                    profile_picture: Some(RawPayloadOrReference::Raw(fixtures::jpeg_bytes())),
                    cv_files: Some(vec![RawPayloadOrReference::Raw(fixtures::docx_bytes())]),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicantError::DatabaseError(_)));
        assert_eq!(
            h.service.find_by_owner("U1").await.unwrap().unwrap(),
            before
        );
        assert_eq!(file_count(&h.store, "images"), 1);
        assert_eq!(file_count(&h.store, "documents"), 2);
        for reference in before.blob_references() {
            assert!(exists(&h.store, reference).await);
        }
    }

    #[tokio::test]
    async fn test_failed_document_write_discards_new_picture() {
        let h = harness(EmptyDocumentsPolicy::ClearAll).await;
        insert_user(&h.db, "U1").await;
        let unrelated = h
            .store
            .store(
                &fixtures::png_bytes(),
                crate::uploads::SniffedFormat::Image(crate::uploads::sniffer::ImageType::Png),
            )
            .await
            .unwrap();

        std::fs::remove_dir_all(h.store.root().join("documents")).unwrap();

        let err = h
            .service
            .upsert(
                "U1",
                ProfileSubmission {
                    fields: complete_fields("Ada Lovelace"),
                    profile_picture: Some(RawPayloadOrReference::Raw(fixtures::jpeg_bytes())),
                    cv_files: Some(vec![RawPayloadOrReference::Raw(fixtures::pdf_bytes())]),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApplicantError::Upload(UploadError::StorageFailure(_))
        ));
        assert!(h.service.find_by_owner("U1").await.unwrap().is_none());
        assert_eq!(file_count(&h.store, "images"), 1);
        assert!(exists(&h.store, &unrelated).await);
    }

    #[tokio::test]
    async fn test_delete_removes_profile_and_files() {
        let h = harness(EmptyDocumentsPolicy::ClearAll).await;
        let profile = seeded(&h, "U1").await;

        assert!(h.service.delete_by_owner("U1").await.unwrap());
        assert!(h.service.find_by_owner("U1").await.unwrap().is_none());
        for reference in profile.blob_references() {
            assert!(!exists(&h.store, reference).await);
        }

        assert!(!h.service.delete_by_owner("U1").await.unwrap());
    }

    #[tokio::test]
    async fn test_search_filters_by_name_and_paginates() {
        let h = harness(EmptyDocumentsPolicy::ClearAll).await;
        for (owner, name) in [("U1", "Ada Lovelace"), ("U2", "Alan Turing"), ("U3", "Grace Hopper")] {
            insert_user(&h.db, owner).await;
            h.service
                .upsert(
                    owner,
                    ProfileSubmission {
                        fields: complete_fields(name),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }

        let all = h
            .service
            .search(&PageQuery {
                page: Some(1),
                limit: Some(2),
                full_name: None,
            })
            .await
            .unwrap();
        assert_eq!(all.total_count, 3);
        assert_eq!(all.total_pages, 2);
        assert_eq!(all.items.len(), 2);

        let filtered = h
            .service
            .search(&PageQuery {
                page: None,
                limit: None,
                full_name: Some("TURING".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(filtered.total_count, 1);
        assert_eq!(filtered.items[0].full_name, "Alan Turing");
    }
}

#[cfg(test)]
mod http_tests {
    use crate::common::state::router_support::{app, register_and_login, send};
    use crate::common::state::test_support::{test_state, TEST_ADMIN_EMAIL, TEST_MAX_UPLOAD_BYTES};
    use crate::uploads::fixtures;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn application() -> Value {
        json!({
            "full_name": "Ada Lovelace",
            "birth_date": "1990-12-10",
            "city": "London",
            "country": "UK",
            "gender": "female",
            "education": "Mathematics",
            "profile_picture": STANDARD.encode(fixtures::png_bytes()),
            "cv_files": [
                STANDARD.encode(fixtures::pdf_bytes()),
                format!("data:application/octet-stream;base64,{}", STANDARD.encode(fixtures::docx_bytes()))
            ]
        })
    }

    #[tokio::test]
    async fn test_submit_then_read_back() {
        let (state, _dir) = test_state().await;
        let app = app(state);
        let token = register_and_login(&app, "ada@example.com", "Ada").await;

        let (status, body) = send(&app, Method::GET, "/api/applications/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_null());

        let (status, created) = send(
            &app,
            Method::PUT,
            "/api/applications",
            Some(&token),
            Some(application()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["gender"], "female");
        assert_eq!(created["birth_date"], "1990-12-10");
        assert_eq!(created["cv_files"].as_array().unwrap().len(), 2);

        let (_, mine) = send(&app, Method::GET, "/api/applications/me", Some(&token), None).await;
        assert_eq!(mine, created);
    }

    #[tokio::test]
    async fn test_echoed_references_round_trip_through_http() {
        let (state, _dir) = test_state().await;
        let app = app(state);
        let token = register_and_login(&app, "ada@example.com", "Ada").await;

        let (_, created) = send(
            &app,
            Method::PUT,
            "/api/applications",
            Some(&token),
            Some(application()),
        )
        .await;

        // Submit the profile exactly as it was returned
        let (status, updated) = send(
            &app,
            Method::PUT,
            "/api/applications",
            Some(&token),
            Some(json!({
                "profile_picture": created["profile_picture"],
                "cv_files": created["cv_files"],
                "city": "Paris"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["cv_files"], created["cv_files"]);
        assert_eq!(updated["profile_picture"], created["profile_picture"]);
        assert_eq!(updated["city"], "Paris");
    }

    #[tokio::test]
    async fn test_upload_errors_map_to_status_codes() {
        let (state, _dir) = test_state().await;
        let app = app(state);
        let token = register_and_login(&app, "ada@example.com", "Ada").await;

        let mut unsupported = application();
        unsupported["cv_files"] = json!([STANDARD.encode(fixtures::garbage_bytes())]);
        let (status, body) = send(&app, Method::PUT, "/api/applications", Some(&token), Some(unsupported)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "UPLOAD_FAILED");

        let mut not_base64 = application();
        not_base64["profile_picture"] = json!("this is not base64!");
        let (status, _) = send(&app, Method::PUT, "/api/applications", Some(&token), Some(not_base64)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let mut too_large = application();
        too_large["cv_files"] = json!([STANDARD.encode(vec![0u8; TEST_MAX_UPLOAD_BYTES + 1])]);
        let (status, _) = send(&app, Method::PUT, "/api/applications", Some(&token), Some(too_large)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

        let (_, mine) = send(&app, Method::GET, "/api/applications/me", Some(&token), None).await;
        assert!(mine.is_null());
    }

    #[tokio::test]
    async fn test_first_submission_needs_all_fields_and_valid_values() {
        let (state, _dir) = test_state().await;
        let app = app(state);
        let token = register_and_login(&app, "ada@example.com", "Ada").await;

        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/applications",
            Some(&token),
            Some(json!({ "full_name": "Ada Lovelace" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let mut invalid = application();
        invalid["gender"] = json!("unknown");
        let (status, _) = send(&app, Method::PUT, "/api/applications", Some(&token), Some(invalid)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_admin_lists_applications() {
        let (state, _dir) = test_state().await;
        let app = app(state);
        let admin = register_and_login(&app, TEST_ADMIN_EMAIL, "Admin").await;
        let ada = register_and_login(&app, "ada@example.com", "Ada").await;

        send(&app, Method::PUT, "/api/applications", Some(&ada), Some(application())).await;

        let (status, _) = send(&app, Method::GET, "/api/applications", Some(&ada), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, page) = send(
            &app,
            Method::GET,
            "/api/applications?page=1&limit=10&full_name=lovelace",
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["total_count"], 1);
        assert_eq!(page["total_pages"], 1);
        assert_eq!(page["items"][0]["full_name"], "Ada Lovelace");

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/applications?page=9223372036854775807&limit=100",
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_stored_files_are_served_with_their_content_type() {
        let (state, _dir) = test_state().await;
        let app = app(state);
        let token = register_and_login(&app, "ada@example.com", "Ada").await;

        let (_, created) = send(
            &app,
            Method::PUT,
            "/api/applications",
            Some(&token),
            Some(application()),
        )
        .await;
        let picture = created["profile_picture"].as_str().unwrap();
        let file_name = picture.rsplit('/').next().unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/uploads/images/{}", file_name))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "image/png");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(bytes.to_vec(), fixtures::png_bytes());

        for uri in [
            format!("/api/uploads/documents/{}", file_name),
            "/api/uploads/images/not-a-blob.png".to_string(),
            "/api/uploads/secrets/passwd".to_string(),
        ] {
            let (status, _) = send(&app, Method::GET, &uri, None, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        }
    }
}
