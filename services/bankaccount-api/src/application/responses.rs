// 更新・削除操作のレスポンス
use serde::{Deserialize, Serialize};

use crate::infrastructure::ElementId;

/// 更新された頂点の内部ID
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse {
    pub updated_vertex_id: ElementId,
}

/// 削除された頂点の内部ID
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub deleted_vertex_id: ElementId,
}

/// 削除されたエッジの内部ID
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEdgeResponse {
    pub deleted_edge_id: ElementId,
}
