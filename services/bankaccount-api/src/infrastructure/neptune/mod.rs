// Neptune(Gremlin HTTP)グラフストアモジュール
//
// - traversal: Gremlinスクリプトの組み立てとリテラルのエスケープ
// - graphson: GraphSONレスポンスのデコードと頂点・エッジへの変換
// - client: GraphStoreトレイトのNeptune実装

mod client;
mod graphson;
mod traversal;

pub use client::NeptuneGraphStore;
