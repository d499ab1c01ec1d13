use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ClientStore, ProspectStore, StoreResult};
use crate::models::{Client, ClientPatch, NewClient, NewProspect, Prospect, ProspectPatch};

/// In-memory storage, used for tests and for running the API without a
/// database. Records keep insertion order.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    prospects: Arc<RwLock<Vec<Prospect>>>,
    clients: Arc<RwLock<Vec<Client>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProspectStore for MemoryStore {
    async fn create_prospect(&self, input: &NewProspect) -> StoreResult<Prospect> {
        let now = Utc::now();
        let prospect = Prospect {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            place: input.place.clone(),
            location: input.location.clone(),
            created_at: now,
            updated_at: now,
        };
        self.prospects.write().await.push(prospect.clone());
        Ok(prospect)
    }

    async fn list_prospects(&self) -> StoreResult<Vec<Prospect>> {
        Ok(self.prospects.read().await.clone())
    }

    async fn get_prospect(&self, id: Uuid) -> StoreResult<Option<Prospect>> {
        Ok(self.prospects.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn update_prospect(
        &self,
        id: Uuid,
        patch: &ProspectPatch,
    ) -> StoreResult<Option<Prospect>> {
        let mut prospects = self.prospects.write().await;
        Ok(prospects.iter_mut().find(|p| p.id == id).map(|prospect| {
            patch.apply_to(prospect);
            prospect.updated_at = Utc::now();
            prospect.clone()
        }))
    }

    async fn delete_prospect(&self, id: Uuid) -> StoreResult<bool> {
        let mut prospects = self.prospects.write().await;
        let before = prospects.len();
        prospects.retain(|p| p.id != id);
        Ok(prospects.len() < before)
    }
}

#[async_trait]
impl ClientStore for MemoryStore {
    async fn create_client(&self, input: &NewClient) -> StoreResult<Client> {
        let now = Utc::now();
        let client = Client {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            first_visit: input.first_visit,
            next_visit: input.next_visit,
            amount: input.amount,
            phone: input.phone.clone(),
            location: input.location.clone(),
            status: input.status,
            created_at: now,
            updated_at: now,
        };
        self.clients.write().await.push(client.clone());
        Ok(client)
    }

    async fn list_clients(&self) -> StoreResult<Vec<Client>> {
        Ok(self.clients.read().await.clone())
    }

    async fn get_client(&self, id: Uuid) -> StoreResult<Option<Client>> {
        Ok(self.clients.read().await.iter().find(|c| c.id == id).cloned())
    }

    async fn update_client(&self, id: Uuid, patch: &ClientPatch) -> StoreResult<Option<Client>> {
        let mut clients = self.clients.write().await;
        Ok(clients.iter_mut().find(|c| c.id == id).map(|client| {
            patch.apply_to(client);
            client.updated_at = Utc::now();
            client.clone()
        }))
    }

    async fn delete_client(&self, id: Uuid) -> StoreResult<bool> {
        let mut clients = self.clients.write().await;
        let before = clients.len();
        clients.retain(|c| c.id != id);
        Ok(clients.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acme() -> NewProspect {
        NewProspect {
            name: "Acme".into(),
            place: "Addis".into(),
            location: Some("Bole".into()),
        }
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let store = MemoryStore::new();
        let created = store.create_prospect(&acme()).await.unwrap();

        let fetched = store.get_prospect(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.name, "Acme");
        assert_eq!(fetched.created_at, fetched.updated_at);
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let store = MemoryStore::new();
        let first = store.create_prospect(&acme()).await.unwrap();
        let second = store
            .create_prospect(&NewProspect {
                name: "Globex".into(),
                place: "Adama".into(),
                location: None,
            })
            .await
            .unwrap();

        let ids: Vec<Uuid> = store
            .list_prospects()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let store = MemoryStore::new();
        let result = store
            .update_prospect(Uuid::new_v4(), &ProspectPatch::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let store = MemoryStore::new();
        let created = store.create_prospect(&acme()).await.unwrap();

        assert!(store.delete_prospect(created.id).await.unwrap());
        assert!(!store.delete_prospect(created.id).await.unwrap());
        assert!(store.get_prospect(created.id).await.unwrap().is_none());
        assert!(store.list_prospects().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_client_update_refreshes_timestamp() {
        let store = MemoryStore::new();
        let created = store
            .create_client(&NewClient {
                name: "Abebe".into(),
                phone: Some("0911000000".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let updated = store
            .update_client(
                created.id,
                &ClientPatch {
                    amount: Some(Some(250.0)),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.amount, Some(250.0));
        assert_eq!(updated.phone.as_deref(), Some("0911000000"));
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_client_update_clears_phone() {
        let store = MemoryStore::new();
        let created = store
            .create_client(&NewClient {
                name: "Abebe".into(),
                phone: Some("0911000000".into()),
                amount: Some(40.0),
                ..Default::default()
            })
            .await
            .unwrap();

        let updated = store
            .update_client(
                created.id,
                &ClientPatch {
                    phone: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(updated.phone.is_none());
        assert_eq!(updated.amount, Some(40.0));
    }
}
