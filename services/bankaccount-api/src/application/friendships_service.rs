/// 友人関係サービス
///
/// 人物間の`has_friend`エッジを管理する。
/// 友人関係は順序なしのペアとして扱い、検索は向きを問わない。
use std::sync::Arc;

use tracing::{error, info, warn};

use super::responses::DeleteEdgeResponse;
use super::service_error::ServiceError;
use crate::domain::friendship::HAS_FRIEND_LABEL;
use crate::domain::person::{PERSON_ID_PROPERTY, PERSON_LABEL};
use crate::domain::{CreateFriendship, Friendship, Person};
use crate::infrastructure::graph_store::{ConnectedVertices, Edge, GraphStore};

fn into_friendship(pair: ConnectedVertices) -> Result<Friendship, ServiceError> {
    Ok(Friendship {
        from: pair.from.into_record::<Person>()?,
        to: pair.to.into_record::<Person>()?,
    })
}

pub struct FriendshipsService<G>
where
    G: GraphStore,
{
    store: Arc<G>,
}

impl<G: GraphStore> Clone for FriendshipsService<G> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<G> FriendshipsService<G>
where
    G: GraphStore,
{
    pub fn new(store: Arc<G>) -> Self {
        Self { store }
    }

    async fn find_pair(&self, person1_id: &str, person2_id: &str) -> Result<Option<ConnectedVertices>, ServiceError> {
        self.store
            .find_edge_between_vertices(HAS_FRIEND_LABEL, PERSON_LABEL, PERSON_ID_PROPERTY, person1_id, person2_id)
            .await
            .map_err(|e| {
                error!(error = %e, person1_id, person2_id, "友人関係の検索に失敗");
                ServiceError::from(e)
            })
    }

    /// 友人関係を作成する
    ///
    /// # 処理フロー
    /// 1. 自分自身との関係ならValidation（存在確認より前）
    /// 2. 既に向きを問わず関係があればConflict
    /// 3. 2人を並行して検索し、どちらかが無ければNotFound
    /// 4. `has_friend`エッジを1本作成
    pub async fn create(&self, payload: CreateFriendship) -> Result<Edge, ServiceError> {
        payload.validate()?;
        let (person1_id, person2_id) = (payload.person1_id.as_str(), payload.person2_id.as_str());

        if self.find_pair(person1_id, person2_id).await?.is_some() {
            warn!(person1_id, person2_id, "友人関係が既に存在");
            return Err(ServiceError::Conflict(format!(
                "Friendship between persons {person1_id} and {person2_id} already exists"
            )));
        }

        let (person1, person2) = tokio::try_join!(
            self.store
                .find_vertex_by_property(PERSON_LABEL, PERSON_ID_PROPERTY, person1_id),
            self.store
                .find_vertex_by_property(PERSON_LABEL, PERSON_ID_PROPERTY, person2_id),
        )
        .map_err(|e| {
            error!(error = %e, "人物の検索に失敗");
            ServiceError::from(e)
        })?;

        let missing = |person_id: &str| {
            warn!(person_id, "友人関係の当事者が見つからない");
            ServiceError::NotFound(format!("Person with id {person_id} not found"))
        };
        let person1 = person1.ok_or_else(|| missing(person1_id))?;
        let person2 = person2.ok_or_else(|| missing(person2_id))?;

        let edge = self
            .store
            .add_edge(HAS_FRIEND_LABEL, &person1.id, &person2.id)
            .await
            .map_err(|e| {
                error!(error = %e, person1_id, person2_id, "友人関係の作成に失敗");
                ServiceError::from(e)
            })?;

        info!(person1_id, person2_id, edge_id = %edge.id, "友人関係を作成");
        Ok(edge)
    }

    pub async fn find_all(&self) -> Result<Vec<Friendship>, ServiceError> {
        let pairs = self
            .store
            .find_connected_vertices(HAS_FRIEND_LABEL)
            .await
            .map_err(|e| {
                error!(error = %e, "友人関係一覧の取得に失敗");
                ServiceError::from(e)
            })?;

        pairs.into_iter().map(into_friendship).collect()
    }

    pub async fn find_one(&self, person1_id: &str, person2_id: &str) -> Result<Friendship, ServiceError> {
        match self.find_pair(person1_id, person2_id).await? {
            Some(pair) => into_friendship(pair),
            None => Err(ServiceError::NotFound(format!(
                "Friendship between persons {person1_id} and {person2_id} not found"
            ))),
        }
    }

    /// 友人関係を削除する
    ///
    /// 失敗時は種類を保ったまま「削除に失敗した」旨のメッセージに包む。
    pub async fn remove(&self, person1_id: &str, person2_id: &str) -> Result<DeleteEdgeResponse, ServiceError> {
        self.try_remove(person1_id, person2_id).await.map_err(|e| {
            error!(error = %e, person1_id, person2_id, "友人関係の削除に失敗");
            e.with_context(&format!(
                "Failed to delete friendship between persons {person1_id} and {person2_id}"
            ))
        })
    }

    async fn try_remove(&self, person1_id: &str, person2_id: &str) -> Result<DeleteEdgeResponse, ServiceError> {
        let pair = self.find_pair(person1_id, person2_id).await?.ok_or_else(|| {
            ServiceError::NotFound(format!(
                "Friendship between persons {person1_id} and {person2_id} not found"
            ))
        })?;

        let edge_id = self.store.delete_edge_by_id(&pair.edge_id).await?;
        info!(person1_id, person2_id, edge_id = %edge_id, "友人関係を削除");
        Ok(DeleteEdgeResponse {
            deleted_edge_id: edge_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::PersonsService;
    use crate::domain::CreatePerson;
    use crate::infrastructure::GraphStoreError;
    use crate::infrastructure::graph_store::tests::MockGraphStore;

    struct Fixture {
        store: Arc<MockGraphStore>,
        friendships: FriendshipsService<MockGraphStore>,
        alice: String,
        bob: String,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MockGraphStore::new());
        let persons = PersonsService::new(Arc::clone(&store));
        let mut ids = Vec::new();
        for (name, email) in [("Alice", "alice@example.com"), ("Bob", "bob@example.com")] {
            let person = persons
                .create(CreatePerson {
                    name: name.to_string(),
                    email: email.to_string(),
                })
                .await
                .unwrap();
            ids.push(person.person_id);
        }
        let bob = ids.pop().unwrap();
        let alice = ids.pop().unwrap();
        Fixture {
            friendships: FriendshipsService::new(Arc::clone(&store)),
            store,
            alice,
            bob,
        }
    }

    fn payload(a: &str, b: &str) -> CreateFriendship {
        CreateFriendship {
            person1_id: a.to_string(),
            person2_id: b.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_then_find_one_scenario() {
        let f = fixture().await;

        let edge = f.friendships.create(payload(&f.alice, &f.bob)).await.unwrap();
        assert_eq!(edge.label, HAS_FRIEND_LABEL);

        let friendship = f.friendships.find_one(&f.alice, &f.bob).await.unwrap();
        assert_eq!(friendship.from.person_id, f.alice);
        assert_eq!(friendship.to.person_id, f.bob);
        assert_eq!(friendship.from.name, "Alice");
    }

    #[tokio::test]
    async fn test_duplicate_pair_is_conflict_in_either_direction() {
        let f = fixture().await;
        f.friendships.create(payload(&f.alice, &f.bob)).await.unwrap();

        let same = f.friendships.create(payload(&f.alice, &f.bob)).await;
        assert!(matches!(same, Err(ServiceError::Conflict(_))));

        let reversed = f.friendships.create(payload(&f.bob, &f.alice)).await;
        assert!(matches!(reversed, Err(ServiceError::Conflict(_))));

        assert_eq!(f.store.edge_count(HAS_FRIEND_LABEL), 1);
    }

    #[tokio::test]
    async fn test_self_friendship_fails_before_lookup() {
        let f = fixture().await;
        // 次の呼び出しがストアに届けばエラーになるが、検証で先に弾かれる
        f.store.set_next_error(GraphStoreError::Connection("should not be called".to_string()));

        let result = f.friendships.create(payload(&f.alice, &f.alice)).await;
        assert_eq!(
            result,
            Err(ServiceError::Validation("A person cannot be friends with themselves.".to_string()))
        );
    }

    #[tokio::test]
    async fn test_missing_person_is_not_found() {
        let f = fixture().await;
        let result = f.friendships.create(payload(&f.alice, "ghost")).await;
        assert_eq!(
            result,
            Err(ServiceError::NotFound("Person with id ghost not found".to_string()))
        );
        assert_eq!(f.store.edge_count(HAS_FRIEND_LABEL), 0);
    }

    #[tokio::test]
    async fn test_find_all_returns_pairs() {
        let f = fixture().await;
        f.friendships.create(payload(&f.alice, &f.bob)).await.unwrap();

        let all = f.friendships.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].from.person_id, f.alice);
        assert_eq!(all[0].to.person_id, f.bob);
    }

    #[tokio::test]
    async fn test_find_one_reversed_order() {
        let f = fixture().await;
        f.friendships.create(payload(&f.alice, &f.bob)).await.unwrap();

        let friendship = f.friendships.find_one(&f.bob, &f.alice).await.unwrap();
        // エッジの向きはそのまま返る
        assert_eq!(friendship.from.person_id, f.alice);
    }

    #[tokio::test]
    async fn test_find_one_missing_is_not_found() {
        let f = fixture().await;
        assert!(matches!(
            f.friendships.find_one(&f.alice, &f.bob).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_deletes_edge() {
        let f = fixture().await;
        let edge = f.friendships.create(payload(&f.alice, &f.bob)).await.unwrap();

        let response = f.friendships.remove(&f.bob, &f.alice).await.unwrap();

        assert_eq!(response.deleted_edge_id, edge.id);
        assert_eq!(f.store.edge_count(HAS_FRIEND_LABEL), 0);
    }

    #[tokio::test]
    async fn test_remove_missing_wraps_not_found() {
        let f = fixture().await;
        let result = f.friendships.remove(&f.alice, &f.bob).await;

        let message = match result {
            Err(ServiceError::NotFound(message)) => message,
            other => panic!("expected NotFound, got {other:?}"),
        };
        assert!(message.starts_with(&format!(
            "Failed to delete friendship between persons {} and {}: ",
            f.alice, f.bob
        )));
    }

    #[tokio::test]
    async fn test_remove_store_failure_wraps_operational() {
        let f = fixture().await;
        f.store.set_next_error(GraphStoreError::Connection("refused".to_string()));

        let result = f.friendships.remove(&f.alice, &f.bob).await;
        assert!(matches!(
            result,
            Err(ServiceError::Operational(m)) if m.starts_with("Failed to delete friendship") && m.contains("refused")
        ));
    }
}
