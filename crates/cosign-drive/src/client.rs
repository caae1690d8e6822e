//! Drive v2 REST client.

use std::time::Duration;

use async_trait::async_trait;
use cosign_core::{DocumentId, Email};
use reqwest::{header, Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{DriveError, Result};
use crate::service::{DocumentService, FileMeta, Grant, PermissionId, DOCUMENT_MIME_TYPE};

/// Connection settings for [`DriveClient`].
#[derive(Debug, Clone)]
pub struct DriveConfig {
    /// API root, e.g. `https://www.googleapis.com/drive/v2`.
    pub base_url: String,
    /// OAuth bearer token of the service account.
    pub access_token: String,
    /// Per-call deadline.
    pub timeout: Duration,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com/drive/v2".to_string(),
            access_token: String::new(),
            timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileResource {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    last_modifying_user: Option<UserResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserResource {
    #[serde(default)]
    email_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PermissionIdResource {
    id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewFile<'a> {
    title: &'a str,
    mime_type: &'a str,
}

#[derive(Debug, Serialize)]
struct CopyFile<'a> {
    title: &'a str,
}

#[derive(Debug, Serialize)]
struct PermissionBody<'a> {
    value: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    role: &'a str,
}

#[derive(Debug, Serialize)]
struct RoleBody<'a> {
    role: &'a str,
}

/// [`DocumentService`] backed by the Drive v2 REST API.
#[derive(Clone)]
pub struct DriveClient {
    http: Client,
    base: Url,
    token: String,
}

impl DriveClient {
    /// Build a client. Fails on an unparsable base URL.
    pub fn new(config: DriveConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| DriveError::Config(format!("base url {}: {e}", config.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(DriveError::Config(format!(
                "base url {} cannot carry a path",
                config.base_url
            )));
        }
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DriveError::Config(format!("http client build failed: {e}")))?;

        Ok(Self {
            http,
            base,
            token: config.access_token,
        })
    }

    /// Base URL with `segments` appended, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| DriveError::Config(format!("base url {} cannot carry a path", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let req = self.http.request(method, url);
        if self.token.is_empty() {
            req
        } else {
            req.header(header::AUTHORIZATION, format!("Bearer {}", self.token))
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder, what: &str) -> Result<T> {
        let resp = req.send().await.map_err(map_transport)?;
        let status = resp.status();
        let body = resp.text().await.map_err(map_transport)?;

        if status == StatusCode::NOT_FOUND {
            return Err(DriveError::NotFound(what.to_string()));
        }
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), what, "drive call rejected");
            return Err(DriveError::Upstream {
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| DriveError::Decode(format!("{what}: {e}")))
    }

    async fn get_file(&self, id: &DocumentId) -> Result<FileResource> {
        let url = self.endpoint(&["files", id.as_str()])?;
        self.send(self.request(Method::GET, url), &format!("file {id}"))
            .await
    }
}

fn map_transport(e: reqwest::Error) -> DriveError {
    if e.is_timeout() {
        DriveError::Timeout
    } else {
        DriveError::Transport(e.to_string())
    }
}

fn file_meta(file: FileResource) -> Result<FileMeta> {
    let id = DocumentId::parse(file.id).map_err(|e| DriveError::Decode(e.to_string()))?;
    Ok(FileMeta {
        id,
        title: file.title,
    })
}

#[async_trait]
impl DocumentService for DriveClient {
    async fn create_document(&self, title: &str) -> Result<FileMeta> {
        let url = self.endpoint(&["files"])?;
        let req = self.request(Method::POST, url).json(&NewFile {
            title,
            mime_type: DOCUMENT_MIME_TYPE,
        });
        let file: FileResource = self.send(req, "files").await?;
        file_meta(file)
    }

    async fn copy_template(&self, template_id: &DocumentId) -> Result<FileMeta> {
        let template = self.get_file(template_id).await?;

        let url = self.endpoint(&["files", template_id.as_str(), "copy"])?;
        let req = self.request(Method::POST, url).json(&CopyFile {
            title: &template.title,
        });
        let file: FileResource = self.send(req, &format!("file {template_id}")).await?;
        file_meta(file)
    }

    async fn insert_permission(&self, document_id: &DocumentId, grant: &Grant) -> Result<PermissionId> {
        let mut url = self.endpoint(&["files", document_id.as_str(), "permissions"])?;
        url.query_pairs_mut().append_pair(
            "sendNotificationEmails",
            if grant.send_notification_emails { "true" } else { "false" },
        );
        let req = self.request(Method::POST, url).json(&PermissionBody {
            value: grant.email.as_str(),
            kind: "user",
            role: grant.role.as_str(),
        });
        let perm: PermissionIdResource = self.send(req, &format!("file {document_id}")).await?;
        Ok(PermissionId(perm.id))
    }

    async fn permission_id_for_email(&self, email: &Email) -> Result<PermissionId> {
        let url = self.endpoint(&["permissionIds", email.as_str()])?;
        let perm: PermissionIdResource = self
            .send(self.request(Method::GET, url), &format!("user {email}"))
            .await?;
        Ok(PermissionId(perm.id))
    }

    async fn update_permission(
        &self,
        document_id: &DocumentId,
        permission_id: &PermissionId,
        grant: &Grant,
    ) -> Result<()> {
        let url = self.endpoint(&[
            "files",
            document_id.as_str(),
            "permissions",
            permission_id.0.as_str(),
        ])?;
        let req = self.request(Method::PUT, url).json(&RoleBody {
            role: grant.role.as_str(),
        });
        let _: serde_json::Value = self
            .send(req, &format!("permission {permission_id} on file {document_id}"))
            .await?;
        Ok(())
    }

    async fn last_modifying_user(&self, document_id: &DocumentId) -> Result<Option<Email>> {
        let file = self.get_file(document_id).await?;
        let address = file
            .last_modifying_user
            .and_then(|u| u.email_address)
            .filter(|a| !a.is_empty());

        match address {
            Some(a) => Email::parse(a)
                .map(Some)
                .map_err(|e| DriveError::Decode(e.to_string())),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> DriveClient {
        DriveClient::new(DriveConfig {
            base_url: base.to_string(),
            ..DriveConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_appends_encoded_segments() {
        let c = client("https://drive.example/drive/v2/");
        let url = c.endpoint(&["permissionIds", "a b@x.com"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://drive.example/drive/v2/permissionIds/a%20b@x.com"
        );
    }

    #[test]
    fn test_bad_base_url_is_config_error() {
        let err = DriveClient::new(DriveConfig {
            base_url: "not a url".into(),
            ..DriveConfig::default()
        })
        .err()
        .unwrap();
        assert!(matches!(err, DriveError::Config(_)));

        let err = DriveClient::new(DriveConfig {
            base_url: "mailto:drive@example.com".into(),
            ..DriveConfig::default()
        })
        .err()
        .unwrap();
        assert!(matches!(err, DriveError::Config(_)));
    }
}
