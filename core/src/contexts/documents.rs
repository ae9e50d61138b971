use std::sync::Arc;

use super::{execute, send};
use crate::connection::Connection;
use crate::entity::{Entity, EntityResponseFactory};
use crate::error::{CouchError, Result};
use crate::factories::{DocumentHttpRequestFactory, HttpRequestFactory};
use crate::requests::{
    CopyDocumentRequest, DeleteDocumentRequest, GetDocumentRequest, HeadDocumentRequest,
    PostDocumentRequest, PutDocumentRequest,
};
use crate::responses::{
    DocumentHeaderResponse, DocumentHeaderResponseFactory, DocumentResponse,
    DocumentResponseFactory, HeadDocumentResponseFactory, Response,
};
use crate::serialization::to_json;

/// Documents as raw JSON.
pub struct Documents {
    connection: Arc<dyn Connection>,
    factory: DocumentHttpRequestFactory,
}

impl Documents {
    pub fn new(connection: Arc<dyn Connection>) -> Self {
        Self {
            connection,
            factory: DocumentHttpRequestFactory,
        }
    }

    /// Existence check; the revision is read from the `ETag`.
    pub async fn head(&self, request: &HeadDocumentRequest) -> Result<DocumentHeaderResponse> {
        let responses = HeadDocumentResponseFactory::new(request.id.clone());
        execute(self.connection.as_ref(), &self.factory, request, &responses).await
    }

    pub async fn get(&self, request: &GetDocumentRequest) -> Result<DocumentResponse> {
        execute(self.connection.as_ref(), &self.factory, request, &DocumentResponseFactory).await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<DocumentResponse> {
        self.get(&GetDocumentRequest::new(id)).await
    }

    pub async fn post(&self, request: &PostDocumentRequest) -> Result<DocumentHeaderResponse> {
        let responses = DocumentHeaderResponseFactory::new();
        execute(self.connection.as_ref(), &self.factory, request, &responses).await
    }

    pub async fn put(&self, request: &PutDocumentRequest) -> Result<DocumentHeaderResponse> {
        let responses = DocumentHeaderResponseFactory::new();
        execute(self.connection.as_ref(), &self.factory, request, &responses).await
    }

    pub async fn delete(&self, request: &DeleteDocumentRequest) -> Result<DocumentHeaderResponse> {
        let responses = DocumentHeaderResponseFactory::new();
        execute(self.connection.as_ref(), &self.factory, request, &responses).await
    }

    pub async fn copy(&self, request: &CopyDocumentRequest) -> Result<DocumentHeaderResponse> {
        let responses = DocumentHeaderResponseFactory::new();
        execute(self.connection.as_ref(), &self.factory, request, &responses).await
    }
}

/// Documents as [`Entity`] values; writes round-trip id and revision.
pub struct Entities {
    connection: Arc<dyn Connection>,
    factory: DocumentHttpRequestFactory,
    responses: EntityResponseFactory,
}

impl Entities {
    pub fn new(connection: Arc<dyn Connection>) -> Self {
        Self {
            connection,
            factory: DocumentHttpRequestFactory,
            responses: EntityResponseFactory,
        }
    }

    pub async fn get<T: Entity>(&self, id: &str) -> Result<Response<T>> {
        let request = self.factory.create(&GetDocumentRequest::new(id))?;
        let response = send(self.connection.as_ref(), request).await?;
        self.responses.create(response)
    }

    /// Creates the entity. The server assigns an id unless the entity has one.
    pub async fn post<T: Entity>(&self, entity: &mut T) -> Result<DocumentHeaderResponse> {
        let request = self
            .factory
            .create(&PostDocumentRequest::new(to_json(&*entity)?))?;
        let response = send(self.connection.as_ref(), request).await?;
        self.responses.create_for(response, entity)
    }

    pub async fn put<T: Entity>(&self, entity: &mut T) -> Result<DocumentHeaderResponse> {
        let id = required(entity.id(), "id")?;
        let mut put = PutDocumentRequest::new(id, to_json(&*entity)?);
        put.rev = entity.rev().filter(|r| !r.is_empty()).map(str::to_string);
        let request = self.factory.create(&put)?;
        let response = send(self.connection.as_ref(), request).await?;
        self.responses.create_for(response, entity)
    }

    /// Deletes the entity; on success its revision is the deletion revision.
    pub async fn delete<T: Entity>(&self, entity: &mut T) -> Result<DocumentHeaderResponse> {
        let id = required(entity.id(), "id")?;
        let rev = required(entity.rev(), "rev")?;
        let request = self.factory.create(&DeleteDocumentRequest::new(id, rev))?;
        let response = send(self.connection.as_ref(), request).await?;
        self.responses.create_for(response, entity)
    }
}

fn required(value: Option<&str>, name: &'static str) -> Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| CouchError::invalid(name, "entity has no value"))
}
