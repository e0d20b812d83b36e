//! In-process dispatch. Implements DispatchPort by calling DispatchService directly.

use crate::domain::{DispatchOutcome, DomainError, EmailDispatchRequest, EmailDispatchResult};
use crate::ports::DispatchPort;
use crate::usecases::DispatchService;
use std::sync::Arc;

pub struct InProcessDispatch {
    service: Arc<DispatchService>,
}

impl InProcessDispatch {
    pub fn new(service: Arc<DispatchService>) -> Self {
        Self { service }
    }
}

#[async_trait::async_trait]
impl DispatchPort for InProcessDispatch {
    async fn dispatch(
        &self,
        request: &EmailDispatchRequest,
    ) -> Result<DispatchOutcome, DomainError> {
        Ok(match self.service.dispatch(request).await {
            EmailDispatchResult::Sent {
                message_id,
                file_name,
                file_size_kb,
            } => DispatchOutcome::Sent {
                message_id,
                file_name,
                file_size: format!("{} KB", file_size_kb),
            },
            EmailDispatchResult::Failed { human_message, .. } => DispatchOutcome::Rejected {
                error: human_message,
            },
        })
    }
}
