//! `/document/*` handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use cosign::drive::DocumentService;
use cosign::store::RecordStore;
use cosign::{Cosigner, DocumentId, DocumentRecord, DocumentSource, Email};
use serde::Deserialize;

use crate::error::{ApiError, Envelope};

type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub email: String,
    #[serde(default)]
    pub doc_title: Option<String>,
    #[serde(default)]
    pub template_id: Option<String>,
}

/// Body of `/document/perm` and `/document/sign`.
#[derive(Debug, Deserialize)]
pub struct DocumentRequest {
    pub email: String,
    pub doc_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ListRequest {
    pub email: String,
}

impl CreateRequest {
    /// A non-empty template id wins over the title.
    fn source(self) -> Result<(Email, DocumentSource), ApiError> {
        let email = Email::parse(self.email)?;
        let source = match self.template_id.filter(|t| !t.trim().is_empty()) {
            Some(template_id) => DocumentSource::Template(DocumentId::parse(template_id)?),
            None => DocumentSource::Title(self.doc_title.unwrap_or_default()),
        };
        Ok((email, source))
    }
}

impl DocumentRequest {
    fn parse(self) -> Result<(DocumentId, Email), ApiError> {
        Ok((DocumentId::parse(self.doc_id)?, Email::parse(self.email)?))
    }
}

pub async fn create<S, D>(
    State(cosigner): State<Arc<Cosigner<S, D>>>,
    body: Result<Json<CreateRequest>, JsonRejection>,
) -> ApiResult<DocumentRecord>
where
    S: RecordStore + 'static,
    D: DocumentService + 'static,
{
    let Json(body) = body?;
    let (email, source) = body.source()?;
    let record = cosigner.create_document(&email, source).await?;
    Ok(Envelope::ok(record))
}

pub async fn perm<S, D>(
    State(cosigner): State<Arc<Cosigner<S, D>>>,
    body: Result<Json<DocumentRequest>, JsonRejection>,
) -> ApiResult<DocumentRecord>
where
    S: RecordStore + 'static,
    D: DocumentService + 'static,
{
    let Json(body) = body?;
    let (document_id, email) = body.parse()?;
    let record = cosigner.grant_access(&document_id, &email).await?;
    Ok(Envelope::ok(record))
}

pub async fn sign<S, D>(
    State(cosigner): State<Arc<Cosigner<S, D>>>,
    body: Result<Json<DocumentRequest>, JsonRejection>,
) -> ApiResult<DocumentRecord>
where
    S: RecordStore + 'static,
    D: DocumentService + 'static,
{
    let Json(body) = body?;
    let (document_id, email) = body.parse()?;
    let record = cosigner.sign(&document_id, &email).await?;
    Ok(Envelope::ok(record))
}

pub async fn list<S, D>(
    State(cosigner): State<Arc<Cosigner<S, D>>>,
    body: Result<Json<ListRequest>, JsonRejection>,
) -> ApiResult<Vec<DocumentRecord>>
where
    S: RecordStore + 'static,
    D: DocumentService + 'static,
{
    let Json(body) = body?;
    let email = Email::parse(body.email)?;
    let records = cosigner.list_documents(&email).await?;
    Ok(Envelope::ok(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_wins_over_title() {
        let req = CreateRequest {
            email: "a@x.com".into(),
            doc_title: Some("Lease".into()),
            template_id: Some("tmpl".into()),
        };
        let (_, source) = req.source().unwrap();
        assert_eq!(
            source,
            DocumentSource::Template(DocumentId::parse("tmpl").unwrap())
        );
    }

    #[test]
    fn test_blank_template_falls_back_to_title() {
        let req = CreateRequest {
            email: "a@x.com".into(),
            doc_title: Some("Lease".into()),
            template_id: Some("".into()),
        };
        let (_, source) = req.source().unwrap();
        assert_eq!(source, DocumentSource::Title("Lease".into()));
    }

    #[test]
    fn test_invalid_ids_are_bad_requests() {
        let req = DocumentRequest {
            email: "a@x.com".into(),
            doc_id: "../etc".into(),
        };
        let err = req.parse().unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }
}
