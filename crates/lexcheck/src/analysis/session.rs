//! Single-flight analysis submission.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::ApiError;

use super::request::AnalysisRequest;

/// Something that can run an analysis request.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<Value, ApiError>;
}

/// Rejects a second submission while one is outstanding.
pub struct AnalysisSession<B: AnalysisBackend> {
    backend: Arc<B>,
    in_flight: Mutex<()>,
}

impl<B: AnalysisBackend> AnalysisSession<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            in_flight: Mutex::new(()),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    pub async fn submit(&self, request: &AnalysisRequest) -> Result<Value, ApiError> {
        let _guard = self.in_flight.try_lock().map_err(|_| {
            debug!("Rejecting {} analysis: another is running", request.kind);
            ApiError::Busy
        })?;
        info!("Running {} analysis", request.kind);
        self.backend.analyze(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::sync::Notify;

    struct GatedBackend {
        release: Notify,
    }

    #[async_trait]
    impl AnalysisBackend for GatedBackend {
        async fn analyze(&self, request: &AnalysisRequest) -> Result<Value, ApiError> {
            self.release.notified().await;
            Ok(json!({ "Contract Summary": request.content }))
        }
    }

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            content: "lease".into(),
            kind: "contract_summary".into(),
            collection_name: None,
            custom_query: None,
        }
    }

    #[tokio::test]
    async fn test_second_submission_is_busy() {
        let backend = Arc::new(GatedBackend {
            release: Notify::new(),
        });
        let session = Arc::new(AnalysisSession::new(Arc::clone(&backend)));

        let first = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.submit(&request()).await })
        };
        while !session.is_busy() {
            tokio::task::yield_now().await;
        }

        assert_eq!(session.submit(&request()).await, Err(ApiError::Busy));

        backend.release.notify_one();
        let value = first.await.unwrap().unwrap();
        assert_eq!(value, json!({"Contract Summary": "lease"}));
        assert!(!session.is_busy());
    }
}
