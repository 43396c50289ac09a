// インフラストラクチャ層
pub mod config;
pub mod graph_store;
pub mod logging;
pub mod neptune;

pub use config::{NeptuneConfig, NeptuneConfigError};
pub use graph_store::{ConnectedVertices, Edge, ElementId, GraphStore, GraphStoreError, PropertyMap, Vertex};
pub use logging::init_logging;
pub use neptune::NeptuneGraphStore;
