//! Diesel table definitions for the SQLite tree store.

diesel::table! {
    /// Leaf values keyed by their escaped `/`-joined path.
    tree_nodes (path) {
        path -> Text,
        value -> Text,
    }
}
