use super::aggregator::aggregate;
use super::cleanup;
use super::dispatcher::Dispatcher;
use super::error::ClassifyError;
use super::models::AggregatedResponse;
use super::selector::MethodSelector;
use crate::imaging::resolver::ImageResolver;
use crate::imaging::upload::ClassifyForm;
use crate::recognition::error::ServiceError;

/// Resolve, select, dispatch, clean up, aggregate.
#[derive(Clone)]
pub struct ClassifyService {
    resolver: ImageResolver,
    selector: MethodSelector,
    dispatcher: Dispatcher,
}

impl ClassifyService {
    pub fn new(resolver: ImageResolver, selector: MethodSelector, dispatcher: Dispatcher) -> Self {
        Self {
            resolver,
            selector,
            dispatcher,
        }
    }

    /// Runs the request in its own task, so a caller that goes away (client
    /// disconnect) does not stop dispatch or skip the cleanup of files
    /// written for the request.
    pub async fn classify(&self, form: ClassifyForm) -> Result<AggregatedResponse, ClassifyError> {
        let service = self.clone();
        tokio::spawn(async move { service.run(form).await })
            .await
            .map_err(|e| ServiceError::Aborted(e.to_string()))?
    }

    async fn run(&self, form: ClassifyForm) -> Result<AggregatedResponse, ClassifyError> {
        let requested = form.classifier_id();
        let image = self.resolver.resolve(&form).await?;
        let request = self.selector.build_request(image, requested.as_ref());

        log::info!(
            "Classifying {} image with {:?} (classifiers: {:?})",
            request.image.source_kind,
            request.methods.iter().map(|m| m.as_ref()).collect::<Vec<_>>(),
            request.classifier_ids.iter().map(|id| id.as_str()).collect::<Vec<_>>()
        );

        let outcomes = self.dispatcher.dispatch(&request).await;
        cleanup::release(request.image).await;

        aggregate(&outcomes, requested.as_ref())
    }
}
