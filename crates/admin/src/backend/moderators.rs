//! `/moderators` and `/user/role` endpoints.

use ms_apparels_core::{Moderator, ModeratorDraft, ModeratorId, Uid};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;

use super::client::{BackendClient, WriteAck};
use super::error::BackendError;

#[derive(Deserialize)]
struct RoleResponse {
    #[serde(default)]
    role: Option<String>,
}

impl BackendClient {
    /// `GET /moderators`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn list_moderators(&self) -> Result<Vec<Moderator>, BackendError> {
        let url = self.endpoint(&["moderators"])?;
        self.send(self.http().get(url)).await
    }

    /// `GET /moderators?uid=<uid>`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self), fields(uid = %uid))]
    pub async fn find_moderators_by_uid(&self, uid: &Uid) -> Result<Vec<Moderator>, BackendError> {
        let mut url = self.endpoint(&["moderators"])?;
        url.query_pairs_mut().append_pair("uid", uid.as_str());
        self.send(self.http().get(url)).await
    }

    /// `POST /moderators`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self, draft), fields(uid = %draft.uid, role = %draft.role))]
    pub async fn create_moderator(
        &self,
        draft: &ModeratorDraft,
    ) -> Result<WriteAck<Moderator>, BackendError> {
        let url = self.endpoint(&["moderators"])?;
        self.send(self.http().post(url).json(draft)).await
    }

    /// `PUT /moderators/:id`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self, draft), fields(id = %id))]
    pub async fn update_moderator(
        &self,
        id: &ModeratorId,
        draft: &ModeratorDraft,
    ) -> Result<WriteAck<Moderator>, BackendError> {
        let url = self.endpoint(&["moderators", id.as_str()])?;
        self.send(self.http().put(url).json(draft)).await
    }

    /// `DELETE /moderators/:id`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete_moderator(&self, id: &ModeratorId) -> Result<(), BackendError> {
        let url = self.endpoint(&["moderators", id.as_str()])?;
        self.send_discarding(self.http().delete(url)).await
    }

    /// `GET /user/role?uid=<uid>` with the caller's identity token.
    ///
    /// Returns the raw role string; an absent role comes back as `None`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self, id_token), fields(uid = %uid))]
    pub async fn fetch_role(
        &self,
        uid: &Uid,
        id_token: &SecretString,
    ) -> Result<Option<String>, BackendError> {
        let mut url = self.endpoint(&["user", "role"])?;
        url.query_pairs_mut().append_pair("uid", uid.as_str());
        let response: RoleResponse = self
            .send(self.http().get(url).bearer_auth(id_token.expose_secret()))
            .await?;
        Ok(response.role)
    }
}
