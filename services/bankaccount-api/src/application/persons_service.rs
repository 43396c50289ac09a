/// 人物サービス
///
/// `personId`を業務キーとして人物頂点の作成・取得・更新・削除を行う。
use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use super::responses::{DeleteResponse, UpdateResponse};
use super::service_error::ServiceError;
use crate::domain::person::{PERSON_ID_PROPERTY, PERSON_LABEL};
use crate::domain::{CreatePerson, Person, UpdatePerson};
use crate::infrastructure::graph_store::{GraphStore, to_property_map};

fn person_not_found(person_id: &str) -> String {
    format!("Person with id {person_id} not found")
}

pub struct PersonsService<G>
where
    G: GraphStore,
{
    store: Arc<G>,
}

impl<G: GraphStore> Clone for PersonsService<G> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<G> PersonsService<G>
where
    G: GraphStore,
{
    pub fn new(store: Arc<G>) -> Self {
        Self { store }
    }

    /// 人物を作成する（`personId`はUUID v4で採番）
    pub async fn create(&self, payload: CreatePerson) -> Result<Person, ServiceError> {
        payload.validate()?;

        let person = payload.into_person(Uuid::new_v4().to_string());
        let properties = to_property_map(&person)?;
        let vertex = self.store.add_vertex(PERSON_LABEL, &properties).await.map_err(|e| {
            error!(error = %e, "人物の作成に失敗");
            ServiceError::from(e)
        })?;

        info!(person_id = %person.person_id, vertex_id = %vertex.id, "人物を作成");
        Ok(vertex.into_record()?)
    }

    pub async fn find_all(&self) -> Result<Vec<Person>, ServiceError> {
        let vertices = self.store.find_vertices(PERSON_LABEL).await.map_err(|e| {
            error!(error = %e, "人物一覧の取得に失敗");
            ServiceError::from(e)
        })?;

        vertices
            .into_iter()
            .map(|v| v.into_record().map_err(ServiceError::from))
            .collect()
    }

    pub async fn find_one(&self, person_id: &str) -> Result<Person, ServiceError> {
        let vertex = self
            .store
            .find_vertex_by_property(PERSON_LABEL, PERSON_ID_PROPERTY, person_id)
            .await
            .map_err(|e| {
                error!(error = %e, person_id, "人物の取得に失敗");
                ServiceError::from(e)
            })?;

        match vertex {
            Some(vertex) => Ok(vertex.into_record()?),
            None => {
                warn!(person_id, "人物が見つからない");
                Err(ServiceError::NotFound(person_not_found(person_id)))
            }
        }
    }

    /// 指定されたフィールドのみ上書きする
    pub async fn update(&self, person_id: &str, payload: UpdatePerson) -> Result<UpdateResponse, ServiceError> {
        payload.validate()?;

        let updates = to_property_map(&payload)?;
        let vertex_id = self
            .store
            .update_vertex(PERSON_LABEL, PERSON_ID_PROPERTY, person_id, &updates)
            .await
            .map_err(|e| {
                error!(error = %e, person_id, "人物の更新に失敗");
                ServiceError::from_keyed_write(e, || person_not_found(person_id))
            })?;

        info!(person_id, vertex_id = %vertex_id, "人物を更新");
        Ok(UpdateResponse {
            updated_vertex_id: vertex_id,
        })
    }

    /// 人物を削除する（所有口座や友人関係は削除しない）
    pub async fn remove(&self, person_id: &str) -> Result<DeleteResponse, ServiceError> {
        let vertex_id = self
            .store
            .delete_vertex(PERSON_LABEL, PERSON_ID_PROPERTY, person_id)
            .await
            .map_err(|e| {
                error!(error = %e, person_id, "人物の削除に失敗");
                ServiceError::from_keyed_write(e, || person_not_found(person_id))
            })?;

        info!(person_id, vertex_id = %vertex_id, "人物を削除");
        Ok(DeleteResponse {
            deleted_vertex_id: vertex_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::GraphStoreError;
    use crate::infrastructure::graph_store::tests::MockGraphStore;

    fn service() -> (Arc<MockGraphStore>, PersonsService<MockGraphStore>) {
        let store = Arc::new(MockGraphStore::new());
        (Arc::clone(&store), PersonsService::new(store))
    }

    fn alice() -> CreatePerson {
        CreatePerson {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_then_find_one_round_trips() {
        let (_, service) = service();

        let created = service.create(alice()).await.unwrap();
        assert_eq!(created.name, "Alice");
        assert_eq!(created.email, "alice@example.com");
        assert!(Uuid::parse_str(&created.person_id).is_ok());

        let found = service.find_one(&created.person_id).await.unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn test_create_generates_distinct_ids() {
        let (_, service) = service();
        let a = service.create(alice()).await.unwrap();
        let b = service.create(alice()).await.unwrap();
        assert_ne!(a.person_id, b.person_id);
        assert_eq!(service.find_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_invalid_email_performs_no_write() {
        let (store, service) = service();
        let result = service
            .create(CreatePerson {
                name: "Alice".to_string(),
                email: "not-an-email".to_string(),
            })
            .await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_find_one_missing_is_not_found() {
        let (_, service) = service();
        let result = service.find_one("missing").await;
        assert_eq!(
            result,
            Err(ServiceError::NotFound("Person with id missing not found".to_string()))
        );
    }

    #[tokio::test]
    async fn test_update_leaves_unspecified_fields() {
        let (_, service) = service();
        let created = service.create(alice()).await.unwrap();

        let response = service
            .update(
                &created.person_id,
                UpdatePerson {
                    name: Some("Alicia".to_string()),
                    email: None,
                },
            )
            .await
            .unwrap();

        let found = service.find_one(&created.person_id).await.unwrap();
        assert_eq!(found.name, "Alicia");
        assert_eq!(found.email, "alice@example.com");

        let all = service.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(!response.updated_vertex_id.to_string().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let (_, service) = service();
        let result = service.update("missing", UpdatePerson::default()).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_invalid_email_is_validation() {
        let (store, service) = service();
        let created = service.create(alice()).await.unwrap();
        let writes = store.write_count();

        let result = service
            .update(
                &created.person_id,
                UpdatePerson {
                    name: None,
                    email: Some("bad".to_string()),
                },
            )
            .await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
        assert_eq!(store.write_count(), writes);
    }

    #[tokio::test]
    async fn test_remove_then_find_is_not_found() {
        let (_, service) = service();
        let created = service.create(alice()).await.unwrap();

        service.remove(&created.person_id).await.unwrap();

        assert!(matches!(
            service.find_one(&created.person_id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_missing_is_not_found() {
        let (_, service) = service();
        let result = service.remove("missing").await;
        assert_eq!(
            result,
            Err(ServiceError::NotFound("Person with id missing not found".to_string()))
        );
    }

    #[tokio::test]
    async fn test_store_failure_is_operational() {
        let (store, service) = service();
        store.set_next_error(GraphStoreError::Connection("refused".to_string()));

        let result = service.find_all().await;
        assert!(matches!(result, Err(ServiceError::Operational(m)) if m.contains("refused")));
    }
}
