/// 銀行取引サービス
///
/// 取引頂点を作成し、送金元口座と相手口座の両方からエッジで接続する。
use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use super::responses::{DeleteResponse, UpdateResponse};
use super::rollback::discard_vertex;
use super::service_error::ServiceError;
use crate::domain::bank_account::{BANK_ACCOUNT_LABEL, IBAN_PROPERTY};
use crate::domain::bank_transaction::{
    BANK_TRANSACTION_LABEL, RECEIVED_TRANSACTION_LABEL, SENT_TRANSACTION_LABEL, TRANSACTION_ID_PROPERTY,
};
use crate::domain::{BankTransaction, CreateBankTransaction, UpdateBankTransaction};
use crate::infrastructure::graph_store::{ElementId, GraphStore, to_property_map};

fn transaction_not_found(transaction_id: &str) -> String {
    format!("Bank transaction with id {transaction_id} not found")
}

pub struct BankTransactionsService<G>
where
    G: GraphStore,
{
    store: Arc<G>,
}

impl<G: GraphStore> Clone for BankTransactionsService<G> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<G> BankTransactionsService<G>
where
    G: GraphStore,
{
    pub fn new(store: Arc<G>) -> Self {
        Self { store }
    }

    async fn link(&self, label: &str, account_id: &ElementId, transaction_id: &ElementId) -> Result<(), ServiceError> {
        self.store
            .add_edge(label, account_id, transaction_id)
            .await
            .map(|_| ())
            .map_err(|e| {
                error!(error = %e, label, "取引エッジの作成に失敗");
                ServiceError::from(e)
            })
    }

    /// 取引を作成する
    ///
    /// # 処理フロー
    /// 1. 金額を検証（不正なら口座の検索も書き込みも行わない）
    /// 2. 2つの口座を並行して検索し、どちらかが無ければNotFound（相手口座を先に報告）
    /// 3. 取引頂点を追加
    /// 4. 送金元口座 → 取引（`sent_transaction`）、相手口座 → 取引（`received_transaction`）
    ///    いずれかに失敗した場合は取引頂点ごと削除する
    pub async fn create(&self, payload: CreateBankTransaction) -> Result<BankTransaction, ServiceError> {
        payload.validate()?;

        let (account, counterparty) = tokio::try_join!(
            self.store
                .find_vertex_by_property(BANK_ACCOUNT_LABEL, IBAN_PROPERTY, &payload.bank_account_iban),
            self.store
                .find_vertex_by_property(BANK_ACCOUNT_LABEL, IBAN_PROPERTY, &payload.other_person_iban),
        )
        .map_err(|e| {
            error!(error = %e, "取引口座の検索に失敗");
            ServiceError::from(e)
        })?;

        let Some(counterparty) = counterparty else {
            warn!(iban = %payload.other_person_iban, "相手口座が見つからない");
            return Err(ServiceError::NotFound(format!(
                "Bank account with IBAN {} not found",
                payload.other_person_iban
            )));
        };
        let Some(account) = account else {
            warn!(iban = %payload.bank_account_iban, "送金元口座が見つからない");
            return Err(ServiceError::NotFound(format!(
                "Bank account with IBAN {} not found",
                payload.bank_account_iban
            )));
        };

        let transaction = payload.into_transaction(Uuid::new_v4().to_string());
        let properties = to_property_map(&transaction)?;
        let vertex = self
            .store
            .add_vertex(BANK_TRANSACTION_LABEL, &properties)
            .await
            .map_err(|e| {
                error!(error = %e, "取引の作成に失敗");
                ServiceError::from(e)
            })?;

        let mut linked = self.link(SENT_TRANSACTION_LABEL, &account.id, &vertex.id).await;
        if linked.is_ok() {
            linked = self.link(RECEIVED_TRANSACTION_LABEL, &counterparty.id, &vertex.id).await;
        }
        if let Err(e) = linked {
            // 片方の口座にしか繋がらない取引を残さない
            return Err(discard_vertex(
                self.store.as_ref(),
                BANK_TRANSACTION_LABEL,
                TRANSACTION_ID_PROPERTY,
                &transaction.transaction_id,
                e,
            )
            .await);
        }

        info!(
            transaction_id = %transaction.transaction_id,
            amount = transaction.amount,
            "取引を作成"
        );
        Ok(vertex.into_record()?)
    }

    pub async fn find_all(&self) -> Result<Vec<BankTransaction>, ServiceError> {
        let vertices = self
            .store
            .find_vertices(BANK_TRANSACTION_LABEL)
            .await
            .map_err(|e| {
                error!(error = %e, "取引一覧の取得に失敗");
                ServiceError::from(e)
            })?;

        vertices
            .into_iter()
            .map(|v| v.into_record().map_err(ServiceError::from))
            .collect()
    }

    pub async fn find_one(&self, transaction_id: &str) -> Result<BankTransaction, ServiceError> {
        let vertex = self
            .store
            .find_vertex_by_property(BANK_TRANSACTION_LABEL, TRANSACTION_ID_PROPERTY, transaction_id)
            .await
            .map_err(|e| {
                error!(error = %e, transaction_id, "取引の取得に失敗");
                ServiceError::from(e)
            })?;

        match vertex {
            Some(vertex) => Ok(vertex.into_record()?),
            None => {
                warn!(transaction_id, "取引が見つからない");
                Err(ServiceError::NotFound(transaction_not_found(transaction_id)))
            }
        }
    }

    /// 金額のみ更新可能（必須かつ正の値）
    pub async fn update(
        &self,
        transaction_id: &str,
        payload: UpdateBankTransaction,
    ) -> Result<UpdateResponse, ServiceError> {
        payload.validate()?;

        let updates = to_property_map(&payload)?;
        let vertex_id = self
            .store
            .update_vertex(BANK_TRANSACTION_LABEL, TRANSACTION_ID_PROPERTY, transaction_id, &updates)
            .await
            .map_err(|e| {
                error!(error = %e, transaction_id, "取引の更新に失敗");
                ServiceError::from_keyed_write(e, || transaction_not_found(transaction_id))
            })?;

        info!(transaction_id, vertex_id = %vertex_id, "取引を更新");
        Ok(UpdateResponse {
            updated_vertex_id: vertex_id,
        })
    }

    pub async fn remove(&self, transaction_id: &str) -> Result<DeleteResponse, ServiceError> {
        let vertex_id = self
            .store
            .delete_vertex(BANK_TRANSACTION_LABEL, TRANSACTION_ID_PROPERTY, transaction_id)
            .await
            .map_err(|e| {
                error!(error = %e, transaction_id, "取引の削除に失敗");
                ServiceError::from_keyed_write(e, || transaction_not_found(transaction_id))
            })?;

        info!(transaction_id, vertex_id = %vertex_id, "取引を削除");
        Ok(DeleteResponse {
            deleted_vertex_id: vertex_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::GraphStoreError;
    use crate::infrastructure::graph_store::PropertyMap;
    use crate::infrastructure::graph_store::tests::MockGraphStore;
    use serde_json::json;

    async fn fixture_with_accounts(ibans: &[&str]) -> (Arc<MockGraphStore>, BankTransactionsService<MockGraphStore>) {
        let store = Arc::new(MockGraphStore::new());
        for iban in ibans {
            let properties: PropertyMap = [
                ("IBAN".to_string(), json!(iban)),
                ("currentBalance".to_string(), json!(100.0)),
            ]
            .into_iter()
            .collect();
            store.add_vertex(BANK_ACCOUNT_LABEL, &properties).await.unwrap();
        }
        (Arc::clone(&store), BankTransactionsService::new(store))
    }

    fn payload(from: &str, to: &str, amount: f64) -> CreateBankTransaction {
        CreateBankTransaction {
            bank_account_iban: from.to_string(),
            other_person_iban: to.to_string(),
            amount,
        }
    }

    #[tokio::test]
    async fn test_create_links_both_accounts() {
        let (store, service) = fixture_with_accounts(&["DE1", "DE2"]).await;

        let created = service.create(payload("DE1", "DE2", 25.0)).await.unwrap();
        assert_eq!(created.bank_account_iban, "DE1");
        assert_eq!(created.other_person_iban, "DE2");
        assert_eq!(created.amount, 25.0);
        assert!(Uuid::parse_str(&created.transaction_id).is_ok());

        let sent = store.edges(SENT_TRANSACTION_LABEL);
        let received = store.edges(RECEIVED_TRANSACTION_LABEL);
        assert_eq!(sent.len(), 1);
        assert_eq!(received.len(), 1);
        assert_eq!(store.vertex(&sent[0].out_v).unwrap().property("IBAN"), Some(&json!("DE1")));
        assert_eq!(
            store.vertex(&received[0].out_v).unwrap().property("IBAN"),
            Some(&json!("DE2"))
        );
        assert_eq!(sent[0].in_v, received[0].in_v);
    }

    #[tokio::test]
    async fn test_create_then_find_one_round_trips() {
        let (_, service) = fixture_with_accounts(&["DE1", "DE2"]).await;
        let created = service.create(payload("DE1", "DE2", 25.0)).await.unwrap();

        assert_eq!(service.find_one(&created.transaction_id).await.unwrap(), created);
        assert_eq!(service.find_all().await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn test_non_positive_amount_performs_no_writes() {
        let (store, service) = fixture_with_accounts(&["DE1", "DE2"]).await;
        let writes = store.write_count();

        for amount in [0.0, -5.0] {
            let result = service.create(payload("DE1", "DE2", amount)).await;
            assert_eq!(
                result,
                Err(ServiceError::Validation("Transaction amount must be positive".to_string()))
            );
        }
        assert_eq!(store.write_count(), writes);
    }

    #[tokio::test]
    async fn test_invalid_amount_checked_before_lookup() {
        // 口座が存在しなくても金額エラーが先に返る
        let (_, service) = fixture_with_accounts(&[]).await;
        let result = service.create(payload("DE1", "DE2", -1.0)).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_failed_second_link_discards_transaction() {
        let (store, service) = fixture_with_accounts(&["DE1", "DE2"]).await;
        store.fail_on(
            "add_edge",
            2,
            GraphStoreError::MissingResult("addE(received_transaction)".to_string()),
        );

        let result = service.create(payload("DE1", "DE2", 10.0)).await;

        assert!(matches!(result, Err(ServiceError::Operational(_))));
        assert_eq!(store.vertex_count(BANK_TRANSACTION_LABEL), 0);
        assert_eq!(store.edge_count(SENT_TRANSACTION_LABEL), 0);
        assert_eq!(store.edge_count(RECEIVED_TRANSACTION_LABEL), 0);
        assert_eq!(store.vertex_count(BANK_ACCOUNT_LABEL), 2);
    }

    #[tokio::test]
    async fn test_failed_first_link_skips_second() {
        let (store, service) = fixture_with_accounts(&["DE1", "DE2"]).await;
        store.fail_on("add_edge", 1, GraphStoreError::Connection("reset".to_string()));

        let result = service.create(payload("DE1", "DE2", 10.0)).await;

        assert!(matches!(result, Err(ServiceError::Operational(m)) if m.contains("reset")));
        assert_eq!(store.vertex_count(BANK_TRANSACTION_LABEL), 0);
        assert_eq!(store.edge_count(RECEIVED_TRANSACTION_LABEL), 0);
    }

    #[tokio::test]
    async fn test_missing_counterparty_creates_nothing() {
        let (store, service) = fixture_with_accounts(&["DE1"]).await;

        let result = service.create(payload("DE1", "DE404", 10.0)).await;

        assert_eq!(
            result,
            Err(ServiceError::NotFound("Bank account with IBAN DE404 not found".to_string()))
        );
        assert_eq!(store.vertex_count(BANK_TRANSACTION_LABEL), 0);
    }

    #[tokio::test]
    async fn test_missing_both_reports_counterparty() {
        let (_, service) = fixture_with_accounts(&[]).await;
        let result = service.create(payload("DE1", "DE2", 10.0)).await;
        assert_eq!(
            result,
            Err(ServiceError::NotFound("Bank account with IBAN DE2 not found".to_string()))
        );
    }

    #[tokio::test]
    async fn test_missing_initiating_account() {
        let (store, service) = fixture_with_accounts(&["DE2"]).await;
        let result = service.create(payload("DE1", "DE2", 10.0)).await;
        assert_eq!(
            result,
            Err(ServiceError::NotFound("Bank account with IBAN DE1 not found".to_string()))
        );
        assert_eq!(store.vertex_count(BANK_TRANSACTION_LABEL), 0);
    }

    #[tokio::test]
    async fn test_update_amount() {
        let (_, service) = fixture_with_accounts(&["DE1", "DE2"]).await;
        let created = service.create(payload("DE1", "DE2", 25.0)).await.unwrap();

        service
            .update(&created.transaction_id, UpdateBankTransaction { amount: Some(40.0) })
            .await
            .unwrap();

        let found = service.find_one(&created.transaction_id).await.unwrap();
        assert_eq!(found.amount, 40.0);
        assert_eq!(found.bank_account_iban, "DE1");
    }

    #[tokio::test]
    async fn test_update_requires_positive_amount() {
        let (_, service) = fixture_with_accounts(&["DE1", "DE2"]).await;
        let created = service.create(payload("DE1", "DE2", 25.0)).await.unwrap();

        let missing = service
            .update(&created.transaction_id, UpdateBankTransaction { amount: None })
            .await;
        assert_eq!(
            missing,
            Err(ServiceError::Validation("Malformed request: amount is required".to_string()))
        );

        let negative = service
            .update(&created.transaction_id, UpdateBankTransaction { amount: Some(-1.0) })
            .await;
        assert!(matches!(negative, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_and_remove_missing_are_not_found() {
        let (_, service) = fixture_with_accounts(&[]).await;
        assert!(matches!(
            service
                .update("nope", UpdateBankTransaction { amount: Some(1.0) })
                .await,
            Err(ServiceError::NotFound(_))
        ));
        assert_eq!(
            service.remove("nope").await,
            Err(ServiceError::NotFound("Bank transaction with id nope not found".to_string()))
        );
    }

    #[tokio::test]
    async fn test_remove_drops_transaction_edges() {
        let (store, service) = fixture_with_accounts(&["DE1", "DE2"]).await;
        let created = service.create(payload("DE1", "DE2", 25.0)).await.unwrap();

        service.remove(&created.transaction_id).await.unwrap();

        assert_eq!(store.vertex_count(BANK_TRANSACTION_LABEL), 0);
        assert_eq!(store.vertex_count(BANK_ACCOUNT_LABEL), 2);
        assert_eq!(store.edge_count(SENT_TRANSACTION_LABEL), 0);
    }
}
