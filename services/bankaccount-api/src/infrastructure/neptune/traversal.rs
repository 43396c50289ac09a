// Gremlinトラバーサルの組み立て
//
// 呼び出し元から渡されるラベル・プロパティ名・値はすべてリテラルとしてエスケープし、
// スクリプトへの埋め込みによるクエリ改変を防ぐ。

use std::fmt;

use serde_json::Value;

use crate::infrastructure::graph_store::{ElementId, GraphStoreError, PropertyMap};

/// 両端頂点を射影する際のキー
pub const PROJECTION_KEYS: [&str; 3] = ["id", "from", "to"];

/// 文字列リテラル（シングルクォート）を生成
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// 要素IDのリテラル（整数IDはlong）
pub fn id_literal(id: &ElementId) -> String {
    match id {
        ElementId::Number(n) => format!("{n}L"),
        ElementId::String(s) => string_literal(s),
    }
}

/// プロパティ値のリテラル
///
/// `null`は`Ok(None)`を返し、呼び出し側で読み飛ばす。
pub fn value_literal(key: &str, value: &Value) -> Result<Option<String>, GraphStoreError> {
    let literal = match value {
        Value::Null => return Ok(None),
        Value::String(s) => string_literal(s),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                format!("{i}L")
            } else if let Some(u) = n.as_u64() {
                format!("{u}L")
            } else {
                let f = n.as_f64().unwrap_or_default();
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    format!("{f:.1}d")
                } else {
                    format!("{f}d")
                }
            }
        }
        Value::Array(_) | Value::Object(_) => {
            return Err(GraphStoreError::UnsupportedValue {
                key: key.to_string(),
                value: value.to_string(),
            });
        }
    };
    Ok(Some(literal))
}

/// Gremlinトラバーサル
///
/// `g`または匿名トラバーサル`__`から始め、ステップを連結していく。
#[derive(Debug, Clone, PartialEq)]
pub struct Traversal(String);

impl Traversal {
    pub fn g() -> Self {
        Self("g".to_string())
    }

    /// 匿名トラバーサル（`__`）
    pub fn anonymous() -> Self {
        Self("__".to_string())
    }

    /// ステップを追加（引数はリテラル化済みの文字列）
    pub fn step<I, S>(mut self, name: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args = args
            .into_iter()
            .map(|a| a.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.0.push('.');
        self.0.push_str(name);
        self.0.push('(');
        self.0.push_str(&args);
        self.0.push(')');
        self
    }

    fn has_label(self, label: &str) -> Self {
        self.step("hasLabel", [string_literal(label)])
    }

    fn has(self, property: &str, value: &str) -> Self {
        self.step("has", [string_literal(property), string_literal(value)])
    }

    fn value_map(self) -> Self {
        self.step("valueMap", ["true"])
    }

    /// エッジIDと両端頂点のvalueMapに射影
    fn project_endpoints(self) -> Self {
        let keys = PROJECTION_KEYS.map(string_literal);
        self.step("project", keys)
            .step("by", ["T.id"])
            .step("by", [Traversal::anonymous().step("outV", NO_ARGS).value_map().0])
            .step("by", [Traversal::anonymous().step("inV", NO_ARGS).value_map().0])
    }

    pub fn into_script(self) -> String {
        self.0
    }
}

impl fmt::Display for Traversal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

const NO_ARGS: [&str; 0] = [];

/// 頂点を追加してvalueMapを返す
pub fn add_vertex(label: &str, properties: &PropertyMap) -> Result<Traversal, GraphStoreError> {
    let mut traversal = Traversal::g().step("addV", [string_literal(label)]);
    for (key, value) in properties {
        if let Some(literal) = value_literal(key, value)? {
            traversal = traversal.step("property", [string_literal(key), literal]);
        }
    }
    Ok(traversal.value_map())
}

pub fn find_vertices(label: &str) -> Traversal {
    Traversal::g().step("V", NO_ARGS).has_label(label).value_map()
}

pub fn find_vertex_by_property(label: &str, property: &str, value: &str) -> Traversal {
    Traversal::g()
        .step("V", NO_ARGS)
        .has_label(label)
        .has(property, value)
        .step("limit", ["1"])
        .value_map()
}

/// プロパティ値に一致する頂点のIDをすべて返す
pub fn vertex_ids_by_property(label: &str, property: &str, value: &str) -> Traversal {
    Traversal::g()
        .step("V", NO_ARGS)
        .has_label(label)
        .has(property, value)
        .step("id", NO_ARGS)
}

/// 単一値カーディナリティでプロパティを上書きしてIDを返す
pub fn update_vertex(id: &ElementId, updates: &PropertyMap) -> Result<Traversal, GraphStoreError> {
    let mut traversal = Traversal::g().step("V", [id_literal(id)]);
    for (key, value) in updates {
        if let Some(literal) = value_literal(key, value)? {
            traversal = traversal.step("property", ["single".to_string(), string_literal(key), literal]);
        }
    }
    Ok(traversal.step("id", NO_ARGS))
}

/// 削除確認用の定数
const DROPPED_MARKER: &str = "gone";

/// 削除できた要素ごとに`DROPPED_MARKER`を1件返すトラバーサルにする
///
/// `drop()`単体は対象の有無に関わらず空の結果を返す。
fn drop_confirmed(traversal: Traversal) -> Traversal {
    traversal
        .step("sideEffect", [Traversal::anonymous().step("drop", NO_ARGS).0])
        .step("constant", [string_literal(DROPPED_MARKER)])
}

pub fn delete_vertex(id: &ElementId) -> Traversal {
    drop_confirmed(Traversal::g().step("V", [id_literal(id)]))
}

/// エッジを追加し、id・label・両端IDに射影して返す
pub fn add_edge(label: &str, from: &ElementId, to: &ElementId) -> Traversal {
    let target = Traversal::anonymous().step("V", [id_literal(to)]);
    let keys = ["id", "label", "outV", "inV"].map(string_literal);
    Traversal::g()
        .step("V", [id_literal(from)])
        .step("addE", [string_literal(label)])
        .step("to", [target.0])
        .step("project", keys)
        .step("by", ["T.id"])
        .step("by", ["T.label"])
        .step("by", [Traversal::anonymous().step("outV", NO_ARGS).step("id", NO_ARGS).0])
        .step("by", [Traversal::anonymous().step("inV", NO_ARGS).step("id", NO_ARGS).0])
}

pub fn find_connected_vertices(label: &str) -> Traversal {
    Traversal::g()
        .step("E", NO_ARGS)
        .has_label(label)
        .project_endpoints()
}

/// 2頂点間のエッジを向きを問わず検索
pub fn find_edge_between_vertices(
    label: &str,
    vertex_label: &str,
    id_property: &str,
    from_value: &str,
    to_value: &str,
) -> Traversal {
    let other = Traversal::anonymous()
        .step("otherV", NO_ARGS)
        .has_label(vertex_label)
        .has(id_property, to_value);
    Traversal::g()
        .step("V", NO_ARGS)
        .has_label(vertex_label)
        .has(id_property, from_value)
        .step("bothE", [string_literal(label)])
        .step("where", [other.0])
        .step("limit", ["1"])
        .project_endpoints()
}

pub fn delete_edge(id: &ElementId) -> Traversal {
    drop_confirmed(Traversal::g().step("E", [id_literal(id)]))
}
