//! Repository for the `reviews` table.
//!
//! Recording a review also moves the reviewed document, so `record` runs
//! both writes in one transaction.

use sqlx::PgPool;
use wikidocs_core::status::DocumentStatus;
use wikidocs_core::types::DbId;

use crate::models::document::Document;
use crate::models::review::{NewReview, RecordedReview, Review};
use crate::repositories::document_repo;

/// Column list for reviews queries.
const COLUMNS: &str = "id, document_id, reviewer_id, status, comments, changes, created_at";

pub struct ReviewRepo;

impl ReviewRepo {
    /// List reviews for a document, newest first.
    pub async fn list_by_document(
        pool: &PgPool,
        document_id: DbId,
    ) -> Result<Vec<Review>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reviews
             WHERE document_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(document_id)
            .fetch_all(pool)
            .await
    }

    /// Move the document out of `expected` and insert the review.
    ///
    /// The document update is conditional on its current status, which also
    /// takes the row lock; if another review got there first nothing is
    /// written and `None` is returned.
    pub async fn record(
        pool: &PgPool,
        input: &NewReview,
        expected: DocumentStatus,
    ) -> Result<Option<RecordedReview>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let update_query = format!(
            "UPDATE documents SET
                status = $2,
                review_comments = $3,
                reviewer_id = $4,
                updated_at = GREATEST(NOW(), updated_at)
             WHERE id = $1 AND status = $5
             RETURNING {}",
            document_repo::COLUMNS
        );
        let document = sqlx::query_as::<_, Document>(&update_query)
            .bind(input.document_id)
            .bind(input.status.resulting_status().as_str())
            .bind(&input.comments)
            .bind(input.reviewer_id)
            .bind(expected.as_str())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(document) = document else {
            tx.rollback().await?;
            return Ok(None);
        };

        let insert_query = format!(
            "INSERT INTO reviews (document_id, reviewer_id, status, comments, changes)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let review = sqlx::query_as::<_, Review>(&insert_query)
            .bind(input.document_id)
            .bind(input.reviewer_id)
            .bind(input.status.as_str())
            .bind(&input.comments)
            .bind(&input.changes)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(RecordedReview { review, document }))
    }
}
