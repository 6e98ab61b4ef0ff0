//! Built-in configuration defaults.

/// Default store URI: an embedded RocksDB database in the working directory.
pub const DEFAULT_STORE_URI: &str = "rocksdb://.matchup/graph.db";

/// Namespace selected on every connection.
pub const DEFAULT_NAMESPACE: &str = "matchup";

/// Database selected on every connection.
pub const DEFAULT_DATABASE: &str = "graph";

/// Root directory of the curated YAML sources.
pub const DEFAULT_DATA_ROOT: &str = "data";

/// Directory for pre-ingestion checkpoints.
pub const DEFAULT_TEMP_DIR: &str = "temp";

/// Default path of the exported relationship table.
pub const DEFAULT_MATCHUPS_FILE: &str = "matchups.json";

/// Default path of the exported static graph artifact.
pub const DEFAULT_GRAPH_FILE: &str = "website/public/graph.json";

/// Directory where archived relationship tables accumulate.
pub const DEFAULT_HISTORY_DIR: &str = "matchups_history";
