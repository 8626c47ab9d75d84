//! REST client for the content relationship service
//!
//! Thin [`ContentRelationshipService`] implementation over the platform's
//! HTTP API. Reads deserialize straight into the domain types, which share
//! the service's camelCase wire shape. Structural rejections come back as
//! 409/422 responses and are surfaced as conflicts with the backend's
//! reason attached, never as transport errors.

use crate::commands::{CommandError, CommandResult, NewRelationship};
use crate::identifiers::{ContentId, RelationshipId, SuggestionId};
use crate::infrastructure::{ContentRelationshipService, FamilySnapshot, FetchError};
use crate::value_objects::{
    ContentMetrics, ContentRelationship, ContentSuggestion, CreationMethod, RelationshipType,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// HTTP-backed [`ContentRelationshipService`]
pub struct RestRelationshipService {
    client: reqwest::Client,
    base_url: String,
}

/// Wire body for relationship creation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateRelationshipBody {
    source_content_id: ContentId,
    target_content_id: ContentId,
    relationship_type: RelationshipType,
    confidence: f64,
    created_by: CreationMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected_version: Option<u64>,
}

/// Wire body for mutations that only carry a version precondition
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VersionBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    expected_version: Option<u64>,
}

/// Error payload the service attaches to non-success responses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl RestRelationshipService {
    /// Create a client against the given service base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, FetchError> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound { resource: url });
        }
        if !status.is_success() {
            return Err(FetchError::Backend {
                status: status.as_u16(),
                message: failure_message(response).await,
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|source| FetchError::Decode {
                url,
                detail: source.to_string(),
            })
    }

    async fn send_json<B: Serialize>(
        &self,
        method: reqwest::Method,
        url: &str,
        body: &B,
    ) -> Result<reqwest::Response, FetchError> {
        tracing::debug!("{} {}", method, url);
        self.client
            .request(method, url)
            .json(body)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        url: String,
        response: reqwest::Response,
    ) -> CommandResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|source| FetchError::Decode {
                url,
                detail: source.to_string(),
            })
            .map_err(CommandError::from)
    }
}

/// The backend's reason for refusing a request, from the error body when it
/// has one
async fn failure_message(response: reqwest::Response) -> String {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.message)
        .unwrap_or(text)
}

/// Map a non-success mutation response to the command error taxonomy
///
/// 409 and 422 are the service saying "the family as it stands refuses
/// this"; everything else is a backend fault.
async fn mutation_rejection(response: reqwest::Response) -> CommandError {
    let status = response.status().as_u16();
    let message = failure_message(response).await;
    if status == 409 || status == 422 {
        tracing::warn!("Mutation rejected by relationship service: {}", message);
        CommandError::StructuralConflict { detail: message }
    } else {
        CommandError::Fetch(FetchError::Backend { status, message })
    }
}

#[async_trait]
impl ContentRelationshipService for RestRelationshipService {
    async fn fetch_family(&self, content_id: ContentId) -> Result<FamilySnapshot, FetchError> {
        self.get_json(self.url(&format!("/content/{content_id}/family")))
            .await
    }

    async fn fetch_suggestions(
        &self,
        content_id: ContentId,
    ) -> Result<Vec<ContentSuggestion>, FetchError> {
        self.get_json(self.url(&format!("/content/{content_id}/suggestions")))
            .await
    }

    async fn create_relationship(
        &self,
        new_relationship: NewRelationship,
        expected_version: Option<u64>,
    ) -> CommandResult<ContentRelationship> {
        let url = self.url("/relationships");
        let body = CreateRelationshipBody {
            source_content_id: new_relationship.source,
            target_content_id: new_relationship.target,
            relationship_type: new_relationship.relationship_type,
            confidence: new_relationship.confidence.value(),
            created_by: new_relationship.created_by,
            expected_version,
        };
        let response = self.send_json(reqwest::Method::POST, &url, &body).await?;
        if !response.status().is_success() {
            return Err(mutation_rejection(response).await);
        }
        self.decode(url, response).await
    }

    async fn delete_relationship(
        &self,
        relationship_id: RelationshipId,
        expected_version: Option<u64>,
    ) -> CommandResult<()> {
        let url = self.url(&format!("/relationships/{relationship_id}"));
        let body = VersionBody { expected_version };
        let response = self.send_json(reqwest::Method::DELETE, &url, &body).await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CommandError::RelationshipNotFound(relationship_id));
        }
        if !status.is_success() {
            return Err(mutation_rejection(response).await);
        }
        Ok(())
    }

    async fn approve_suggestion(
        &self,
        suggestion_id: SuggestionId,
        expected_version: Option<u64>,
    ) -> CommandResult<ContentRelationship> {
        let url = self.url(&format!("/suggestions/{suggestion_id}/approve"));
        let body = VersionBody { expected_version };
        let response = self.send_json(reqwest::Method::POST, &url, &body).await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CommandError::SuggestionNotFound(suggestion_id));
        }
        if !status.is_success() {
            return Err(mutation_rejection(response).await);
        }
        self.decode(url, response).await
    }

    async fn reject_suggestion(&self, suggestion_id: SuggestionId) -> CommandResult<()> {
        let url = self.url(&format!("/suggestions/{suggestion_id}/reject"));
        let body = VersionBody {
            expected_version: None,
        };
        let response = self.send_json(reqwest::Method::POST, &url, &body).await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CommandError::SuggestionNotFound(suggestion_id));
        }
        if !status.is_success() {
            return Err(mutation_rejection(response).await);
        }
        Ok(())
    }

    async fn refresh_metrics(
        &self,
        content_id: ContentId,
        metrics: ContentMetrics,
    ) -> CommandResult<()> {
        let url = self.url(&format!("/content/{content_id}/metrics"));
        let response = self.send_json(reqwest::Method::PUT, &url, &metrics).await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CommandError::Structural(
                crate::aggregate::StructuralError::MissingContent(content_id),
            ));
        }
        if !status.is_success() {
            return Err(mutation_rejection(response).await);
        }
        Ok(())
    }
}
