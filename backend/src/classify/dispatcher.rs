use futures::future::join_all;
use shared::ClassifyMethod;
use std::sync::Arc;
use std::time::Duration;

use super::models::{ClassificationRequest, MethodOutcome};
use crate::recognition::error::ServiceError;
use crate::recognition::{ClassificationService, ClassifyParams};

pub const BOUNDED_METHOD_TIMEOUT: Duration = Duration::from_secs(20);

/// Runs every selected method concurrently and reports one outcome per
/// method, in the order the methods were selected.
#[derive(Clone)]
pub struct Dispatcher {
    service: Arc<dyn ClassificationService>,
    bounded_timeout: Duration,
}

impl Dispatcher {
    pub fn new(service: Arc<dyn ClassificationService>, bounded_timeout: Duration) -> Self {
        Self {
            service,
            bounded_timeout,
        }
    }

    pub async fn dispatch(&self, request: &ClassificationRequest) -> Vec<MethodOutcome> {
        let calls = request.methods.iter().map(|&method| {
            let deadline = method.is_time_bounded().then_some(self.bounded_timeout);
            self.run_method(method, request.params(), deadline)
        });
        join_all(calls).await
    }

    async fn run_method(
        &self,
        method: ClassifyMethod,
        params: ClassifyParams,
        deadline: Option<Duration>,
    ) -> MethodOutcome {
        let service = Arc::clone(&self.service);
        // Spawned so that a missed deadline only stops the wait; the call
        // itself keeps running detached.
        let handle = tokio::spawn(async move { service.call(method, &params).await });

        let joined = match deadline {
            Some(limit) => match tokio::time::timeout(limit, handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    log::warn!("{} did not answer within {:?}", method, limit);
                    return MethodOutcome::failed(method, ServiceError::Timeout(limit));
                }
            },
            None => handle.await,
        };

        match joined {
            Ok(Ok(value)) => {
                log::debug!("{} succeeded", method);
                MethodOutcome::success(method, value)
            }
            Ok(Err(e)) => {
                log::error!("{} failed: {}", method, e);
                MethodOutcome::failed(method, e)
            }
            Err(e) => {
                log::error!("{} task aborted: {}", method, e);
                MethodOutcome::failed(method, ServiceError::Aborted(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::models::{OutcomeStatus, ResolvedImage};
    use crate::classify::selector::MethodSelector;
    use crate::recognition::stub::{StubReply, StubService};
    use serde_json::json;

    fn exploratory_request() -> ClassificationRequest {
        MethodSelector::default()
            .build_request(ResolvedImage::remote("https://ex.com/a.jpg".into()), None)
    }

    #[tokio::test]
    async fn one_outcome_per_method_in_order() {
        let stub = Arc::new(
            StubService::all_ok().reply(
                ClassifyMethod::Classify,
                StubReply::Delayed(Duration::from_millis(30), json!({ "slow": true })),
            ),
        );
        let dispatcher = Dispatcher::new(stub.clone(), BOUNDED_METHOD_TIMEOUT);

        let outcomes = dispatcher.dispatch(&exploratory_request()).await;
        let methods: Vec<ClassifyMethod> = outcomes.iter().map(|o| o.method).collect();
        assert_eq!(
            methods,
            vec![
                ClassifyMethod::Classify,
                ClassifyMethod::DetectFaces,
                ClassifyMethod::RecognizeText
            ]
        );
        assert!(outcomes.iter().all(|o| o.status == OutcomeStatus::Success));
        assert_eq!(stub.calls().len(), 3);
    }

    #[tokio::test]
    async fn failures_are_captured_not_propagated() {
        let stub = Arc::new(StubService::all_ok().reply(
            ClassifyMethod::DetectFaces,
            StubReply::Fail(500, json!({ "error": "boom", "code": 500 })),
        ));
        let dispatcher = Dispatcher::new(stub, BOUNDED_METHOD_TIMEOUT);

        let outcomes = dispatcher.dispatch(&exploratory_request()).await;
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].status, OutcomeStatus::Success);
        assert_eq!(outcomes[1].status, OutcomeStatus::Error);
        assert_eq!(outcomes[1].error.as_ref().unwrap().code, 500);
        assert!(outcomes[1].value.is_none());
        assert_eq!(outcomes[2].status, OutcomeStatus::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_bounded_method_times_out_alone() {
        let stub = Arc::new(StubService::all_ok().reply(
            ClassifyMethod::DetectFaces,
            StubReply::Delayed(Duration::from_secs(60), json!({ "late": true })),
        ));
        let dispatcher = Dispatcher::new(stub, BOUNDED_METHOD_TIMEOUT);

        let outcomes = dispatcher.dispatch(&exploratory_request()).await;
        assert_eq!(outcomes[0].status, OutcomeStatus::Success);
        assert_eq!(outcomes[1].status, OutcomeStatus::Timeout);
        assert_eq!(outcomes[1].error.as_ref().unwrap().code, 504);
        assert_eq!(outcomes[2].status, OutcomeStatus::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn classify_is_not_time_bounded() {
        let stub = Arc::new(StubService::new().reply(
            ClassifyMethod::Classify,
            StubReply::Delayed(Duration::from_secs(90), json!({ "images": [] })),
        ));
        let dispatcher = Dispatcher::new(stub, BOUNDED_METHOD_TIMEOUT);
        let id = shared::ClassifierId::from("custom-1");
        let request = MethodSelector::default()
            .build_request(ResolvedImage::remote("https://ex.com/a.jpg".into()), Some(&id));

        let outcomes = dispatcher.dispatch(&request).await;
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].status, OutcomeStatus::Success);
    }
}
