use crate::domain::enrollment::{Applicant, ApplicationCounts, ApplicationStatus, ReviewDecision};
use crate::domain::ports::ApplicationReviewRef;
use crate::error::Result;
use tracing::{info, warn};

/// Administrator workflow over pending, approved and rejected applications.
pub struct ReviewService {
    review: ApplicationReviewRef,
}

impl ReviewService {
    pub fn new(review: ApplicationReviewRef) -> Self {
        Self { review }
    }

    /// Number of applications in each status.
    ///
    /// The three listings are fetched concurrently. A listing that fails
    /// counts as zero.
    pub async fn counts(&self) -> ApplicationCounts {
        let (pending, approved, rejected) = tokio::join!(
            self.count(ApplicationStatus::Pending),
            self.count(ApplicationStatus::Approved),
            self.count(ApplicationStatus::Rejected),
        );
        ApplicationCounts {
            pending,
            approved,
            rejected,
        }
    }

    async fn count(&self, status: ApplicationStatus) -> usize {
        match self.review.applicants(status).await {
            Ok(applicants) => applicants.len(),
            Err(err) => {
                warn!(%status, error = %err, "applicant listing failed");
                0
            }
        }
    }

    pub async fn applicants(&self, status: ApplicationStatus) -> Result<Vec<Applicant>> {
        self.review.applicants(status).await
    }

    pub async fn approve(&self, applicant_id: u64) -> Result<()> {
        self.decide(applicant_id, ReviewDecision::Approve).await
    }

    pub async fn reject(&self, applicant_id: u64) -> Result<()> {
        self.decide(applicant_id, ReviewDecision::Reject).await
    }

    async fn decide(&self, applicant_id: u64, decision: ReviewDecision) -> Result<()> {
        self.review.decide(applicant_id, decision).await?;
        info!(applicant = applicant_id, ?decision, "application reviewed");
        Ok(())
    }

    /// The applicant's uploaded salary slip (PDF bytes).
    pub async fn salary_slip(&self, applicant_id: u64) -> Result<Vec<u8>> {
        self.review.salary_slip(applicant_id).await
    }
}
