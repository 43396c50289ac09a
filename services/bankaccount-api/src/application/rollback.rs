/// 作成途中で失敗した頂点の取り消し
///
/// 頂点の追加とエッジの追加は別々のクエリで確定するため、
/// エッジの追加に失敗した場合は追加済みの頂点を削除してから元のエラーを返す。
use tracing::{error, warn};

use super::service_error::ServiceError;
use crate::infrastructure::GraphStore;

/// 業務キーで特定した頂点を削除し、`cause`をそのまま返す
///
/// 削除自体の失敗はログに残すのみで、呼び出し元には`cause`を返す。
/// 頂点の`drop`は接続済みのエッジも削除する。
pub(crate) async fn discard_vertex<G>(
    store: &G,
    label: &str,
    key_property: &str,
    key_value: &str,
    cause: ServiceError,
) -> ServiceError
where
    G: GraphStore + ?Sized,
{
    match store.delete_vertex(label, key_property, key_value).await {
        Ok(vertex_id) => {
            warn!(%vertex_id, label, key_value, "エッジ作成に失敗したため頂点を取り消し");
        }
        Err(e) => {
            error!(error = %e, label, key_value, "頂点の取り消しに失敗");
        }
    }
    cause
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::GraphStoreError;
    use crate::infrastructure::graph_store::PropertyMap;
    use crate::infrastructure::graph_store::tests::MockGraphStore;
    use serde_json::json;

    fn key(value: &str) -> PropertyMap {
        [("IBAN".to_string(), json!(value))].into_iter().collect()
    }

    #[tokio::test]
    async fn test_discard_vertex_removes_vertex_and_returns_cause() {
        let store = MockGraphStore::new();
        store.add_vertex("BankAccount", &key("DE1")).await.unwrap();

        let cause = ServiceError::Operational("link failed".to_string());
        let returned = discard_vertex(&store, "BankAccount", "IBAN", "DE1", cause.clone()).await;

        assert_eq!(returned, cause);
        assert_eq!(store.vertex_count("BankAccount"), 0);
    }

    #[tokio::test]
    async fn test_discard_vertex_failure_keeps_cause() {
        let store = MockGraphStore::new();
        store.add_vertex("BankAccount", &key("DE1")).await.unwrap();
        store.set_next_error(GraphStoreError::Connection("down".to_string()));

        let cause = ServiceError::Operational("link failed".to_string());
        let returned = discard_vertex(&store, "BankAccount", "IBAN", "DE1", cause.clone()).await;

        assert_eq!(returned, cause);
        assert_eq!(store.vertex_count("BankAccount"), 1);
    }
}
