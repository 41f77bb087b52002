//! HTTP client for the practice service.

use std::sync::Arc;

use async_trait::async_trait;
use practice_core::{
    CardBatch, CardKey, Direction, ImportProgress, ImportSource, Rating, RatingOutcome,
    ReviewOverview, ReviewScope, Scheduler, ServiceError,
};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::api::{
    error_message, AnkiCardsResponse, ResetRequest, ResetResponse, ReviewRequest, ReviewResponse,
    StatusResponse,
};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Inner state shared across clones.
struct ApiClientInner {
    client: Client,
    base_url: String,
    token: Option<String>,
}

/// Client for the practice service's scheduling and import endpoints.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Http(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_url.trim_end_matches('/').to_string(),
                token: config.api_token.clone(),
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.inner.base_url, path);
        let builder = self.inner.client.request(method, url);
        match &self.inner.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> std::result::Result<Response, ServiceError> {
        let resp = builder
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Backend {
                status,
                message: error_message(&body),
            });
        }
        Ok(resp)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> std::result::Result<T, ServiceError> {
        self.send(builder)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))
    }
}

#[async_trait]
impl Scheduler for ApiClient {
    async fn fetch_cards(
        &self,
        scope: &ReviewScope,
    ) -> std::result::Result<CardBatch, ServiceError> {
        // The service reads an empty word_ids as "no filter".
        if scope.excludes_all_words() {
            return Ok(CardBatch::default());
        }

        let mut query = vec![
            ("mode", scope.card_type.mode_str().to_string()),
            ("direction", scope.direction.as_str().to_string()),
        ];
        if let Some(ids) = &scope.word_ids {
            let ids: Vec<String> = ids.iter().map(i64::to_string).collect();
            query.push(("word_ids", ids.join(",")));
        }

        tracing::debug!(quiz_id = scope.quiz_id, ?query, "Fetching review cards");
        let builder = self
            .request(Method::GET, &format!("/api/quiz/{}/anki-cards", scope.quiz_id))
            .query(&query);
        let response: AnkiCardsResponse = self.send_json(builder).await?;
        response.into_batch()
    }

    async fn rate(
        &self,
        card: CardKey,
        rating: Rating,
        direction: Direction,
    ) -> std::result::Result<RatingOutcome, ServiceError> {
        let path = format!("/api/{}/{}/review", card.card_type.as_str(), card.id);
        let body = ReviewRequest {
            rating: rating.to_value(),
            direction: direction.as_str(),
        };

        tracing::debug!(card_id = card.id, rating = body.rating, "Submitting rating");
        let response: ReviewResponse = self
            .send_json(self.request(Method::POST, &path).json(&body))
            .await?;
        if !response.tracking_enabled {
            tracing::debug!(card_id = card.id, "Progress tracking disabled for card");
        }
        response.into_outcome()
    }

    async fn reset_progress(&self, scope: &ReviewScope) -> std::result::Result<(), ServiceError> {
        let body = ResetRequest {
            mode: scope.card_type.mode_str(),
            direction: scope.direction.as_str(),
        };
        let builder = self
            .request(Method::POST, &format!("/api/quiz/{}/reset-anki", scope.quiz_id))
            .json(&body);
        let response: ResetResponse = self.send_json(builder).await?;

        tracing::debug!(
            quiz_id = scope.quiz_id,
            reset_count = response.reset_count,
            "Review progress reset"
        );
        Ok(())
    }

    async fn overview(&self) -> std::result::Result<ReviewOverview, ServiceError> {
        self.send_json(self.request(Method::GET, "/api/anki-stats"))
            .await
    }
}

#[async_trait]
impl ImportSource for ApiClient {
    async fn fetch_progress(
        &self,
        quiz_id: i64,
    ) -> std::result::Result<ImportProgress, ServiceError> {
        let response: StatusResponse = self
            .send_json(self.request(Method::GET, &format!("/quiz/{quiz_id}/status")))
            .await?;
        Ok(response.into_progress())
    }

    async fn cancel(&self, quiz_id: i64) -> std::result::Result<(), ServiceError> {
        tracing::info!(quiz_id, "Cancelling import processing");
        self.send(self.request(
            Method::POST,
            &format!("/api/quiz/{quiz_id}/cancel-processing"),
        ))
        .await?;
        Ok(())
    }
}
