// GraphSONレスポンスのデコード
//
// Gremlin HTTPエンドポイントはGraphSON v1〜v3のいずれかで結果を返す。
// 型付きラッパー（@type/@value）を剥がして素のJSONに変換し、
// valueMap(true)の結果を頂点・エッジ構造体に平坦化する。

use serde_json::{Map, Value};

use crate::infrastructure::graph_store::{ConnectedVertices, Edge, ElementId, GraphStoreError, Vertex};

/// 成功を示すGremlinステータスコード
const STATUS_SUCCESS: u64 = 200;
/// 成功（結果なし）
const STATUS_NO_CONTENT: u64 = 204;
/// 成功（部分結果）
const STATUS_PARTIAL_CONTENT: u64 = 206;

/// GraphSON値を素のJSONに変換する
pub fn decode(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(decode).collect()),
        Value::Object(mut object) => {
            let typed = object.len() == 2
                && object.contains_key("@value")
                && object.get("@type").is_some_and(Value::is_string);
            if typed {
                let type_name = match object.remove("@type") {
                    Some(Value::String(name)) => name,
                    _ => String::new(),
                };
                let inner = object.remove("@value").unwrap_or(Value::Null);
                return decode_typed(&type_name, inner);
            }
            Value::Object(object.into_iter().map(|(k, v)| (k, decode(v))).collect())
        }
        scalar => scalar,
    }
}

fn decode_typed(type_name: &str, inner: Value) -> Value {
    match (type_name, inner) {
        ("g:Map", Value::Array(pairs)) => {
            let mut object = Map::with_capacity(pairs.len() / 2);
            let mut iter = pairs.into_iter();
            while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
                object.insert(key_to_string(decode(key)), decode(value));
            }
            Value::Object(object)
        }
        ("g:VertexProperty" | "g:Property" | "g:Traverser", Value::Object(mut object)) => {
            decode(object.remove("value").unwrap_or(Value::Null))
        }
        (_, inner) => decode(inner),
    }
}

fn key_to_string(key: Value) -> String {
    match key {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Gremlin HTTPレスポンス本文から結果リストを取り出す
///
/// ステータスコードが失敗を示す場合は`Query`エラー。
pub fn parse_response(body: &str) -> Result<Vec<Value>, GraphStoreError> {
    let response: Value = serde_json::from_str(body)
        .map_err(|e| GraphStoreError::Decode(format!("invalid JSON response: {e}")))?;

    let status = response.get("status");
    let code = status
        .and_then(|s| s.get("code"))
        .and_then(Value::as_u64)
        .unwrap_or(STATUS_SUCCESS);
    if !matches!(code, STATUS_SUCCESS | STATUS_NO_CONTENT | STATUS_PARTIAL_CONTENT) {
        let message = status
            .and_then(|s| s.get("message"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Err(GraphStoreError::Query {
            code: u16::try_from(code).unwrap_or(u16::MAX),
            message,
        });
    }

    let data = response
        .get("result")
        .and_then(|r| r.get("data"))
        .cloned()
        .unwrap_or(Value::Null);
    Ok(match decode(data) {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        single => vec![single],
    })
}

/// valueMap(true)の結果を頂点に変換する
///
/// 単一要素の配列はスカラーに平坦化し、`id`と`label`はプロパティから外す。
pub fn vertex_from_value_map(value: Value) -> Result<Vertex, GraphStoreError> {
    let mut object = match value {
        Value::Object(object) => object,
        other => return Err(GraphStoreError::Decode(format!("expected a value map, got {other}"))),
    };

    let id = object
        .remove("id")
        .as_ref()
        .and_then(ElementId::from_json)
        .ok_or_else(|| GraphStoreError::Decode("value map has no element id".to_string()))?;
    let label = match object.remove("label") {
        Some(Value::String(label)) => label,
        _ => return Err(GraphStoreError::Decode(format!("vertex {id} has no label"))),
    };

    let properties = object
        .into_iter()
        .filter_map(|(key, value)| flatten_property(value).map(|v| (key, v)))
        .collect();

    Ok(Vertex { id, label, properties })
}

fn flatten_property(value: Value) -> Option<Value> {
    match value {
        Value::Array(mut items) => match items.len() {
            0 => None,
            1 => items.pop(),
            _ => Some(Value::Array(items)),
        },
        other => Some(other),
    }
}

/// id/label/outV/inVへの射影結果をエッジに変換する
pub fn edge_from_projection(value: Value) -> Result<Edge, GraphStoreError> {
    serde_json::from_value(value).map_err(|e| GraphStoreError::Decode(format!("invalid edge: {e}")))
}

/// id/from/toへの射影結果を頂点ペアに変換する
pub fn connected_from_projection(value: Value) -> Result<ConnectedVertices, GraphStoreError> {
    let mut object = match value {
        Value::Object(object) => object,
        other => return Err(GraphStoreError::Decode(format!("expected a projection, got {other}"))),
    };

    let edge_id = object
        .remove("id")
        .as_ref()
        .and_then(ElementId::from_json)
        .ok_or_else(|| GraphStoreError::Decode("projection has no edge id".to_string()))?;
    let from = vertex_from_value_map(object.remove("from").unwrap_or(Value::Null))?;
    let to = vertex_from_value_map(object.remove("to").unwrap_or(Value::Null))?;

    Ok(ConnectedVertices { edge_id, from, to })
}
