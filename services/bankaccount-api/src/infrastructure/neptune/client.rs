// NeptuneGraphStore - Gremlin HTTPエンドポイント向けGraphStore実装
//
// トラバーサルをスクリプトとして`POST /gremlin`に送信し、
// GraphSONレスポンスを頂点・エッジに変換する。
// 読み取りは指数バックオフで再試行し、書き込みは重複実行を避けるため再試行しない。

use async_trait::async_trait;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use url::Url;

use super::graphson::{self, connected_from_projection, edge_from_projection, vertex_from_value_map};
use super::traversal::{self, Traversal};
use crate::infrastructure::config::NeptuneConfig;
use crate::infrastructure::graph_store::{
    ConnectedVertices, Edge, ElementId, GraphStore, GraphStoreError, PropertyMap, Vertex,
};

/// 読み取りクエリの最大再試行回数
const MAX_READ_RETRIES: u32 = 3;

/// 接続タイムアウト（秒）
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// クエリの種別（再試行の可否を決める）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Read,
    Write,
}

/// Neptune(Gremlin HTTP)に接続するGraphStore
///
/// 起動時に1度だけ`connect`し、`Arc`で共有する。
#[derive(Clone)]
pub struct NeptuneGraphStore {
    /// 読み取り用クライアント（再試行ミドルウェア付き）
    read_client: ClientWithMiddleware,
    /// 書き込み用クライアント（再試行なし）
    write_client: ClientWithMiddleware,
    /// GremlinエンドポイントURL
    gremlin_url: Url,
}

impl std::fmt::Debug for NeptuneGraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NeptuneGraphStore")
            .field("gremlin_url", &self.gremlin_url.as_str())
            .finish_non_exhaustive()
    }
}

impl NeptuneGraphStore {
    /// 設定からクライアントを構築する
    ///
    /// HTTPはコネクションレスのため、ここではネットワーク接続は行わない。
    /// エンドポイントに到達できない場合は最初のクエリで`Connection`エラーになる。
    pub fn connect(config: &NeptuneConfig) -> Result<Self, GraphStoreError> {
        let gremlin_url = config
            .gremlin_url()
            .map_err(|e| GraphStoreError::Connection(e.to_string()))?;

        info!(
            gremlin_url = %gremlin_url,
            timeout_secs = config.request_timeout().as_secs(),
            "Neptuneクライアントを初期化"
        );

        let base_client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| GraphStoreError::Connection(format!("HTTPクライアントの構築に失敗: {e}")))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(MAX_READ_RETRIES);
        let read_client = ClientBuilder::new(base_client.clone())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();
        let write_client = ClientBuilder::new(base_client).build();

        Ok(Self {
            read_client,
            write_client,
            gremlin_url,
        })
    }

    /// クライアントを破棄する（シャットダウン時）
    pub fn close(self) {
        info!(gremlin_url = %self.gremlin_url, "Neptuneクライアントを終了");
    }

    /// トラバーサルを送信し、デコード済みの結果リストを返す
    async fn submit(&self, access: Access, traversal: Traversal) -> Result<Vec<Value>, GraphStoreError> {
        let script = traversal.into_script();
        debug!(script = %script, access = ?access, "Gremlinクエリを送信");

        let body = serde_json::to_string(&json!({ "gremlin": script }))
            .map_err(|e| GraphStoreError::Serialization(e.to_string()))?;
        let client = match access {
            Access::Read => &self.read_client,
            Access::Write => &self.write_client,
        };

        let response = client
            .post(self.gremlin_url.clone())
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Gremlinリクエスト失敗");
                GraphStoreError::Connection(e.to_string())
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            error!(error = %e, "Gremlinレスポンスの読み取りに失敗");
            GraphStoreError::Connection(e.to_string())
        })?;

        if !status.is_success() {
            error!(status = %status, body = %text, "Gremlinエンドポイントがエラーを返却");
            return Err(GraphStoreError::Http {
                status: status.as_u16(),
                message: error_message(text),
            });
        }

        graphson::parse_response(&text).inspect_err(|e| {
            error!(error = %e, "Gremlinクエリが失敗");
        })
    }

    /// プロパティ値で一意に特定される頂点のIDを解決する
    async fn resolve_single(&self, label: &str, property: &str, value: &str) -> Result<ElementId, GraphStoreError> {
        let ids = self
            .submit(Access::Read, traversal::vertex_ids_by_property(label, property, value))
            .await?;

        if ids.len() != 1 {
            debug!(label, property, value, found = ids.len(), "一意な頂点が見つからない");
            return Err(GraphStoreError::UnexpectedMatchCount {
                label: label.to_string(),
                property: property.to_string(),
                value: value.to_string(),
                found: ids.len(),
            });
        }

        ElementId::from_json(&ids[0])
            .ok_or_else(|| GraphStoreError::Decode(format!("invalid element id: {}", ids[0])))
    }
}

/// エラーレスポンス本文からメッセージを取り出す（Neptuneは`detailedMessage`に詳細を入れる）
fn error_message(body: String) -> String {
    serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("detailedMessage").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(body)
}

fn first_or_missing(items: Vec<Value>, operation: &str) -> Result<Value, GraphStoreError> {
    items
        .into_iter()
        .next()
        .ok_or_else(|| GraphStoreError::MissingResult(operation.to_string()))
}

#[async_trait]
impl GraphStore for NeptuneGraphStore {
    #[instrument(skip(self, properties))]
    async fn add_vertex(&self, label: &str, properties: &PropertyMap) -> Result<Vertex, GraphStoreError> {
        let items = self
            .submit(Access::Write, traversal::add_vertex(label, properties)?)
            .await?;
        let vertex = vertex_from_value_map(first_or_missing(items, "addV")?)?;
        info!(vertex_id = %vertex.id, "頂点を追加");
        Ok(vertex)
    }

    #[instrument(skip(self))]
    async fn find_vertices(&self, label: &str) -> Result<Vec<Vertex>, GraphStoreError> {
        let items = self.submit(Access::Read, traversal::find_vertices(label)).await?;
        items.into_iter().map(vertex_from_value_map).collect()
    }

    #[instrument(skip(self))]
    async fn find_vertex_by_property(
        &self,
        label: &str,
        property: &str,
        value: &str,
    ) -> Result<Option<Vertex>, GraphStoreError> {
        let items = self
            .submit(Access::Read, traversal::find_vertex_by_property(label, property, value))
            .await?;
        items.into_iter().next().map(vertex_from_value_map).transpose()
    }

    #[instrument(skip(self, updates))]
    async fn update_vertex(
        &self,
        label: &str,
        id_property: &str,
        id_value: &str,
        updates: &PropertyMap,
    ) -> Result<ElementId, GraphStoreError> {
        let id = self.resolve_single(label, id_property, id_value).await?;
        let items = self
            .submit(Access::Write, traversal::update_vertex(&id, updates)?)
            .await?;
        // 解決後に削除された場合は結果が空になる
        first_or_missing(items, "update")?;
        info!(vertex_id = %id, "頂点を更新");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn delete_vertex(&self, label: &str, id_property: &str, id_value: &str) -> Result<ElementId, GraphStoreError> {
        let id = self.resolve_single(label, id_property, id_value).await?;
        let items = self.submit(Access::Write, traversal::delete_vertex(&id)).await?;
        // 解決後に削除された場合は結果が空になる
        first_or_missing(items, "drop vertex")?;
        info!(vertex_id = %id, "頂点を削除");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn add_edge(&self, label: &str, from: &ElementId, to: &ElementId) -> Result<Edge, GraphStoreError> {
        let items = self
            .submit(Access::Write, traversal::add_edge(label, from, to))
            .await?;
        let edge = edge_from_projection(first_or_missing(items, "addE")?)?;
        info!(edge_id = %edge.id, "エッジを追加");
        Ok(edge)
    }

    #[instrument(skip(self))]
    async fn find_connected_vertices(&self, label: &str) -> Result<Vec<ConnectedVertices>, GraphStoreError> {
        let items = self
            .submit(Access::Read, traversal::find_connected_vertices(label))
            .await?;
        items.into_iter().map(connected_from_projection).collect()
    }

    #[instrument(skip(self))]
    async fn find_edge_between_vertices(
        &self,
        label: &str,
        vertex_label: &str,
        id_property: &str,
        from_value: &str,
        to_value: &str,
    ) -> Result<Option<ConnectedVertices>, GraphStoreError> {
        let items = self
            .submit(
                Access::Read,
                traversal::find_edge_between_vertices(label, vertex_label, id_property, from_value, to_value),
            )
            .await?;
        items.into_iter().next().map(connected_from_projection).transpose()
    }

    #[instrument(skip(self))]
    async fn delete_edge_by_id(&self, edge_id: &ElementId) -> Result<ElementId, GraphStoreError> {
        let items = self.submit(Access::Write, traversal::delete_edge(edge_id)).await?;
        first_or_missing(items, "drop edge")?;
        info!(edge_id = %edge_id, "エッジを削除");
        Ok(edge_id.clone())
    }
}
