//! Target collections.

/// A remote collection written by the importer.
///
/// Variants are declared in foreign-key dependency order: users reference
/// roles, so roles must be imported first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Roles,
    Users,
    Tasks,
}

impl Table {
    /// All tables in import order.
    pub const ALL: [Table; 3] = [Table::Roles, Table::Users, Table::Tasks];

    /// Collection name used in REST paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Roles => "roles",
            Table::Users => "users",
            Table::Tasks => "tasks",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
