use anyhow::{bail, Result};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::http::Message;
use crate::models::{Client, ClientPatch, NewClient, NewProspect, Prospect, ProspectPatch};

/// A CRUD resource exposed under `/api/<PATH>`
pub trait Resource {
    const PATH: &'static str;
    type Record: DeserializeOwned;
    type New: Serialize + Sync;
    type Patch: Serialize + Sync;
}

pub struct Prospects;

impl Resource for Prospects {
    const PATH: &'static str = "prospects";
    type Record = Prospect;
    type New = NewProspect;
    type Patch = ProspectPatch;
}

pub struct Clients;

impl Resource for Clients {
    const PATH: &'static str = "clients";
    type Record = Client;
    type New = NewClient;
    type Patch = ClientPatch;
}

/// HTTP client for the record API
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn collection_url<R: Resource>(&self) -> String {
        format!("{}/api/{}", self.base_url, R::PATH)
    }

    fn record_url<R: Resource>(&self, id: Uuid) -> String {
        format!("{}/{}", self.collection_url::<R>(), id)
    }

    pub async fn list<R: Resource>(&self) -> Result<Vec<R::Record>> {
        send(self.http.get(self.collection_url::<R>())).await
    }

    pub async fn get<R: Resource>(&self, id: Uuid) -> Result<R::Record> {
        send(self.http.get(self.record_url::<R>(id))).await
    }

    pub async fn create<R: Resource>(&self, input: &R::New) -> Result<R::Record> {
        send(self.http.post(self.collection_url::<R>()).json(input)).await
    }

    pub async fn update<R: Resource>(&self, id: Uuid, patch: &R::Patch) -> Result<R::Record> {
        send(self.http.put(self.record_url::<R>(id)).json(patch)).await
    }

    pub async fn delete<R: Resource>(&self, id: Uuid) -> Result<()> {
        let _: Message = send(self.http.delete(self.record_url::<R>(id))).await?;
        Ok(())
    }
}

async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!(error_message(status, &body));
    }

    Ok(response.json::<T>().await?)
}

/// Prefer the server's `{"message": ...}` over the bare status line
fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<Message>(body) {
        Ok(Message { message }) => format!("{status}: {message}"),
        Err(_) => status.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::http::{self, AppState};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    #[test]
    fn test_urls_ignore_trailing_slash() {
        let api = ApiClient::new("http://localhost:3000/");
        assert_eq!(
            api.collection_url::<Prospects>(),
            "http://localhost:3000/api/prospects"
        );
        let id = Uuid::nil();
        assert_eq!(
            api.record_url::<Clients>(id),
            format!("http://localhost:3000/api/clients/{id}")
        );
    }

    #[test]
    fn test_error_message_uses_server_message() {
        assert_eq!(
            error_message(StatusCode::NOT_FOUND, r#"{"message":"Client not found"}"#),
            "404 Not Found: Client not found"
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "<html>"),
            "502 Bad Gateway"
        );
    }

    #[tokio::test]
    async fn test_round_trip_against_running_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();
        let server = tokio::spawn(http::serve(
            listener,
            AppState::from_store(MemoryStore::new()),
            async move {
                stopped.await.ok();
            },
        ));

        let api = ApiClient::new(&format!("http://{addr}"));
        let created = api
            .create::<Prospects>(&NewProspect {
                name: "Acme".into(),
                place: "Addis".into(),
                location: Some("Bole".into()),
            })
            .await
            .unwrap();
        assert_eq!(api.list::<Prospects>().await.unwrap().len(), 1);

        let updated = api
            .update::<Prospects>(
                created.id,
                &ProspectPatch {
                    place: Some("Adama".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.place, "Adama");
        assert_eq!(updated.location.as_deref(), Some("Bole"));

        api.delete::<Prospects>(created.id).await.unwrap();
        let err = api.get::<Prospects>(created.id).await.unwrap_err();
        assert!(err.to_string().contains("Prospect not found"));

        let err = api
            .create::<Clients>(&NewClient::default())
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("400"));

        stop.send(()).unwrap();
        server.await.unwrap().unwrap();
    }
}
