/// グラフストア抽象
///
/// ラベル付き頂点・エッジに対するCRUDプリミティブをトレイトとして定義する。
/// 実装はNeptune(Gremlin HTTP)版と、テスト用のインメモリ版がある。
///
/// 「見つからない」はエラーではなく`Ok(None)`で表現し、
/// ドメイン上の「存在しない」への変換は呼び出し側（サービス層）が行う。
use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// 頂点プロパティ（キー順を安定させるためBTreeMapを使用）
pub type PropertyMap = BTreeMap<String, Value>;

/// グラフストア操作のエラー型
///
/// いずれもグラフエンジン側の運用上の失敗を表す。
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphStoreError {
    /// エンドポイントへの接続・送信に失敗
    #[error("Connection failed: {0}")]
    Connection(String),

    /// HTTPエラーレスポンス
    #[error("HTTP error: status={status}, message={message}")]
    Http { status: u16, message: String },

    /// Gremlinレスポンスのステータスが失敗を示している
    #[error("Gremlin query failed: code={code}, message={message}")]
    Query { code: u16, message: String },

    /// レスポンスの解釈に失敗
    #[error("Failed to decode graph response: {0}")]
    Decode(String),

    /// プロパティのシリアライズに失敗
    #[error("Failed to serialize properties: {0}")]
    Serialization(String),

    /// 頂点プロパティとして保存できない値（配列・オブジェクト）
    #[error("Unsupported property value for {key}: {value}")]
    UnsupportedValue { key: String, value: String },

    /// 一意であるべき検索結果の件数が1件ではない
    #[error("Expected exactly 1 vertex but found {found} for {property}={value}, label={label}")]
    UnexpectedMatchCount {
        label: String,
        property: String,
        value: String,
        found: usize,
    },

    /// 結果を返すはずの操作が空の結果を返した
    #[error("Graph operation returned no result: {0}")]
    MissingResult(String),
}

impl GraphStoreError {
    /// 対象の頂点が1件も存在しなかったことを示すか
    pub fn is_no_match(&self) -> bool {
        matches!(self, GraphStoreError::UnexpectedMatchCount { found: 0, .. })
    }
}

/// グラフ要素（頂点・エッジ）の内部ID
///
/// Neptuneは文字列ID、TinkerGraph系のサーバーは整数IDを採番するため両方を扱う。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementId {
    Number(i64),
    String(String),
}

impl ElementId {
    /// デコード済みJSON値からIDを取り出す
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(ElementId::String(s.clone())),
            Value::Number(n) => n.as_i64().map(ElementId::Number),
            _ => None,
        }
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementId::Number(n) => write!(f, "{n}"),
            ElementId::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        ElementId::String(value.to_string())
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        ElementId::String(value)
    }
}

impl From<i64> for ElementId {
    fn from(value: i64) -> Self {
        ElementId::Number(value)
    }
}

/// 頂点
///
/// `properties`は単一要素の配列をスカラーに平坦化したもので、`id`と`label`は含まない。
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub id: ElementId,
    pub label: String,
    pub properties: PropertyMap,
}

impl Vertex {
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// プロパティを型付きレコードに変換する
    pub fn into_record<T: DeserializeOwned>(self) -> Result<T, GraphStoreError> {
        let object = self.properties.into_iter().collect::<serde_json::Map<_, _>>();
        serde_json::from_value(Value::Object(object)).map_err(|e| {
            GraphStoreError::Decode(format!("{} vertex {}: {}", self.label, self.id, e))
        })
    }
}

/// エッジ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: ElementId,
    pub label: String,
    #[serde(rename = "outV")]
    pub out_v: ElementId,
    #[serde(rename = "inV")]
    pub in_v: ElementId,
}

/// エッジで結ばれた頂点のペア
///
/// `from`はエッジの始点（outV）、`to`は終点（inV）。
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectedVertices {
    pub edge_id: ElementId,
    pub from: Vertex,
    pub to: Vertex,
}

/// レコードを頂点プロパティに変換する
pub fn to_property_map<T: Serialize>(record: &T) -> Result<PropertyMap, GraphStoreError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(object)) => Ok(object.into_iter().collect()),
        Ok(other) => Err(GraphStoreError::Serialization(format!(
            "expected an object, got {other}"
        ))),
        Err(e) => Err(GraphStoreError::Serialization(e.to_string())),
    }
}

/// グラフストア操作用トレイト
///
/// 各操作はグラフエンジンへの1回以上の往復を伴う。
/// 一意性制約は持たないため、重複チェックは呼び出し側の責務。
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// 頂点を追加し、採番されたIDを含む頂点を返す
    async fn add_vertex(&self, label: &str, properties: &PropertyMap) -> Result<Vertex, GraphStoreError>;

    /// 指定ラベルの全頂点を取得
    async fn find_vertices(&self, label: &str) -> Result<Vec<Vertex>, GraphStoreError>;

    /// ラベルとプロパティ値で頂点を検索し、最初の1件を返す
    ///
    /// # 戻り値
    /// * 見つかった場合は`Ok(Some(Vertex))`
    /// * 見つからなかった場合は`Ok(None)`
    async fn find_vertex_by_property(
        &self,
        label: &str,
        property: &str,
        value: &str,
    ) -> Result<Option<Vertex>, GraphStoreError>;

    /// 一意に特定される頂点のプロパティを上書きし、頂点IDを返す
    ///
    /// `updates`中の`null`値は未指定として扱い、既存値を維持する。
    /// 該当が0件または複数件の場合は`UnexpectedMatchCount`。
    async fn update_vertex(
        &self,
        label: &str,
        id_property: &str,
        id_value: &str,
        updates: &PropertyMap,
    ) -> Result<ElementId, GraphStoreError>;

    /// 一意に特定される頂点を削除し、頂点IDを返す
    ///
    /// 該当が0件または複数件の場合は`UnexpectedMatchCount`。
    async fn delete_vertex(
        &self,
        label: &str,
        id_property: &str,
        id_value: &str,
    ) -> Result<ElementId, GraphStoreError>;

    /// 内部IDで指定した2頂点間に有向エッジを追加
    async fn add_edge(&self, label: &str, from: &ElementId, to: &ElementId) -> Result<Edge, GraphStoreError>;

    /// 指定ラベルの全エッジについて、両端の頂点ペアを取得
    async fn find_connected_vertices(&self, label: &str) -> Result<Vec<ConnectedVertices>, GraphStoreError>;

    /// プロパティ値で特定した2頂点間のエッジを向きを問わず検索
    async fn find_edge_between_vertices(
        &self,
        label: &str,
        vertex_label: &str,
        id_property: &str,
        from_value: &str,
        to_value: &str,
    ) -> Result<Option<ConnectedVertices>, GraphStoreError>;

    /// 内部IDでエッジを削除し、そのIDを返す
    async fn delete_edge_by_id(&self, edge_id: &ElementId) -> Result<ElementId, GraphStoreError>;
}
