/// 銀行口座サービス
///
/// IBANを業務キーとして口座頂点を管理する。
/// IBANの一意性は挿入前の検索で確認するのみで、同時作成の競合は防がない。
use std::sync::Arc;

use tracing::{error, info, warn};

use super::responses::{DeleteResponse, UpdateResponse};
use super::rollback::discard_vertex;
use super::service_error::ServiceError;
use crate::domain::bank_account::{BANK_ACCOUNT_LABEL, IBAN_PROPERTY, OWNS_ACCOUNT_LABEL};
use crate::domain::person::{PERSON_ID_PROPERTY, PERSON_LABEL};
use crate::domain::{BankAccount, CreateBankAccount, UpdateBankAccount};
use crate::infrastructure::graph_store::{GraphStore, Vertex, to_property_map};

fn account_not_found(iban: &str) -> String {
    format!("Bank account with IBAN {iban} not found")
}

fn account_exists(iban: &str) -> String {
    format!("Bank account with IBAN {iban} already exists")
}

pub struct BankAccountsService<G>
where
    G: GraphStore,
{
    store: Arc<G>,
}

impl<G: GraphStore> Clone for BankAccountsService<G> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<G> BankAccountsService<G>
where
    G: GraphStore,
{
    pub fn new(store: Arc<G>) -> Self {
        Self { store }
    }

    async fn find_account_vertex(&self, iban: &str) -> Result<Option<Vertex>, ServiceError> {
        self.store
            .find_vertex_by_property(BANK_ACCOUNT_LABEL, IBAN_PROPERTY, iban)
            .await
            .map_err(|e| {
                error!(error = %e, iban, "銀行口座の検索に失敗");
                ServiceError::from(e)
            })
    }

    /// 口座を作成し、所有者から`owns_account`エッジを張る
    ///
    /// # 処理フロー
    /// 1. ペイロードを検証
    /// 2. 同じIBANの口座があればConflict
    /// 3. 所有者が存在しなければNotFound
    /// 4. 口座頂点を追加し、所有者からエッジを張る（失敗時は口座頂点を削除）
    pub async fn create(&self, payload: CreateBankAccount) -> Result<BankAccount, ServiceError> {
        payload.validate()?;

        if self.find_account_vertex(&payload.iban).await?.is_some() {
            warn!(iban = %payload.iban, "IBANが重複");
            return Err(ServiceError::Conflict(account_exists(&payload.iban)));
        }

        let owner = self
            .store
            .find_vertex_by_property(PERSON_LABEL, PERSON_ID_PROPERTY, &payload.person_id)
            .await
            .map_err(|e| {
                error!(error = %e, person_id = %payload.person_id, "所有者の検索に失敗");
                ServiceError::from(e)
            })?
            .ok_or_else(|| {
                warn!(person_id = %payload.person_id, "所有者が見つからない");
                ServiceError::NotFound(format!("Person with id {} not found", payload.person_id))
            })?;

        let properties = to_property_map(&payload.to_account())?;
        let vertex = self
            .store
            .add_vertex(BANK_ACCOUNT_LABEL, &properties)
            .await
            .map_err(|e| {
                error!(error = %e, iban = %payload.iban, "銀行口座の作成に失敗");
                ServiceError::from(e)
            })?;

        if let Err(e) = self.store.add_edge(OWNS_ACCOUNT_LABEL, &owner.id, &vertex.id).await {
            error!(error = %e, iban = %payload.iban, "所有関係エッジの作成に失敗");
            // 所有者のいない口座を残さない
            return Err(discard_vertex(
                self.store.as_ref(),
                BANK_ACCOUNT_LABEL,
                IBAN_PROPERTY,
                &payload.iban,
                ServiceError::from(e),
            )
            .await);
        }

        info!(iban = %payload.iban, person_id = %payload.person_id, "銀行口座を作成");
        Ok(vertex.into_record()?)
    }

    pub async fn find_all(&self) -> Result<Vec<BankAccount>, ServiceError> {
        let vertices = self.store.find_vertices(BANK_ACCOUNT_LABEL).await.map_err(|e| {
            error!(error = %e, "銀行口座一覧の取得に失敗");
            ServiceError::from(e)
        })?;

        vertices
            .into_iter()
            .map(|v| v.into_record().map_err(ServiceError::from))
            .collect()
    }

    pub async fn find_one(&self, iban: &str) -> Result<BankAccount, ServiceError> {
        match self.find_account_vertex(iban).await? {
            Some(vertex) => Ok(vertex.into_record()?),
            None => {
                warn!(iban, "銀行口座が見つからない");
                Err(ServiceError::NotFound(account_not_found(iban)))
            }
        }
    }

    /// IBANと残高を部分更新する
    ///
    /// IBANを他の口座が使用しているIBANに変更しようとした場合はConflict。
    pub async fn update(&self, iban: &str, payload: UpdateBankAccount) -> Result<UpdateResponse, ServiceError> {
        payload.validate()?;

        if let Some(new_iban) = payload.iban.as_deref().filter(|new| *new != iban) {
            if self.find_account_vertex(new_iban).await?.is_some() {
                warn!(iban, new_iban, "変更先のIBANが重複");
                return Err(ServiceError::Conflict(account_exists(new_iban)));
            }
        }

        let updates = to_property_map(&payload)?;
        let vertex_id = self
            .store
            .update_vertex(BANK_ACCOUNT_LABEL, IBAN_PROPERTY, iban, &updates)
            .await
            .map_err(|e| {
                error!(error = %e, iban, "銀行口座の更新に失敗");
                ServiceError::from_keyed_write(e, || account_not_found(iban))
            })?;

        info!(iban, vertex_id = %vertex_id, "銀行口座を更新");
        Ok(UpdateResponse {
            updated_vertex_id: vertex_id,
        })
    }

    pub async fn remove(&self, iban: &str) -> Result<DeleteResponse, ServiceError> {
        let vertex_id = self
            .store
            .delete_vertex(BANK_ACCOUNT_LABEL, IBAN_PROPERTY, iban)
            .await
            .map_err(|e| {
                error!(error = %e, iban, "銀行口座の削除に失敗");
                ServiceError::from_keyed_write(e, || account_not_found(iban))
            })?;

        info!(iban, vertex_id = %vertex_id, "銀行口座を削除");
        Ok(DeleteResponse {
            deleted_vertex_id: vertex_id,
        })
    }
}
