use crate::domain::enrollment::{CardApplication, SalarySlip};
use crate::domain::ports::CardApplicationsRef;
use crate::domain::session::SessionContext;
use crate::error::{PaymentError, Result};
use tracing::{debug, info};

/// Submits the signed-in user's forex card application.
pub struct EnrollmentService {
    session: SessionContext,
    applications: CardApplicationsRef,
}

impl EnrollmentService {
    pub fn new(session: SessionContext, applications: CardApplicationsRef) -> Self {
        Self {
            session,
            applications,
        }
    }

    /// Validates the details and the salary slip, then uploads both.
    ///
    /// Nothing is sent when local validation fails.
    pub async fn apply(
        &self,
        mut application: CardApplication,
        salary_slip: SalarySlip,
    ) -> Result<CardApplication> {
        if self.session.user_id.is_empty() {
            return Err(PaymentError::validation("User not logged in!"));
        }
        application.validate()?;
        salary_slip.validate()?;

        debug!(
            slip = %salary_slip.file_name,
            bytes = salary_slip.bytes.len(),
            "submitting card application"
        );
        self.applications
            .apply(&self.session.user_id, &application, &salary_slip)
            .await?;
        info!(state = %application.state, "card application submitted");
        Ok(application)
    }
}
