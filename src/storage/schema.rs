//! Store schema definitions
//!
//! The schema contract is a data table of structured specs, not raw SQL
//! blobs: the builder iterates [`TABLES`] in declaration order, which must
//! respect every spec's `depends_on` list. Declaration order is validated
//! by test rather than trusted.

/// Schema version written by a fresh bootstrap and targeted by migrations
pub const CURRENT_VERSION: u32 = 1;

/// Name of the metadata table
pub const TABLE_INFO: &str = "db_info";
/// Name of the activity type table
pub const TABLE_ACTIVITY_TYPE: &str = "activity_type";
/// Name of the user table
pub const TABLE_USER: &str = "user";
/// Name of the session table
pub const TABLE_SESSION: &str = "session";

/// `db_info` property key under which the schema version is stored
pub const VERSION_PROPERTY: &str = "version";

/// A single column: name plus its type/constraint text
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub definition: &'static str,
}

/// A foreign key constraint on a table
#[derive(Debug, Clone, Copy)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references_table: &'static str,
    pub references_column: &'static str,
}

/// Declarative spec for one table in the store
#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub name: &'static str,
    pub columns: &'static [ColumnSpec],
    pub foreign_keys: &'static [ForeignKey],
    /// Tables that must exist before this one is created
    pub depends_on: &'static [&'static str],
}

impl TableSpec {
    /// Render the CREATE TABLE statement for this spec.
    ///
    /// Deliberately no IF NOT EXISTS: re-creating an existing table must
    /// fail so a partial or repeated bootstrap surfaces loudly.
    pub fn create_sql(&self) -> String {
        let mut parts: Vec<String> = self
            .columns
            .iter()
            .map(|col| format!("{} {}", col.name, col.definition))
            .collect();

        for fk in self.foreign_keys {
            parts.push(format!(
                "FOREIGN KEY({}) REFERENCES {}({})",
                fk.column, fk.references_table, fk.references_column
            ));
        }

        format!("CREATE TABLE {}({})", self.name, parts.join(","))
    }
}

/// All tables of the current schema, in dependency order
pub const TABLES: [TableSpec; 4] = [
    TableSpec {
        name: TABLE_INFO,
        columns: &[
            ColumnSpec {
                name: "property",
                definition: "TEXT NOT NULL UNIQUE PRIMARY KEY",
            },
            ColumnSpec {
                name: "value",
                definition: "TEXT NOT NULL",
            },
        ],
        foreign_keys: &[],
        depends_on: &[],
    },
    TableSpec {
        name: TABLE_ACTIVITY_TYPE,
        columns: &[
            ColumnSpec {
                name: "id",
                definition: "INTEGER NOT NULL PRIMARY KEY ASC AUTOINCREMENT",
            },
            ColumnSpec {
                name: "short_name",
                definition: "TEXT NOT NULL UNIQUE",
            },
            ColumnSpec {
                name: "full_name",
                definition: "TEXT NOT NULL",
            },
            ColumnSpec {
                name: "description",
                definition: "TEXT",
            },
        ],
        foreign_keys: &[],
        depends_on: &[],
    },
    TableSpec {
        name: TABLE_USER,
        columns: &[
            ColumnSpec {
                name: "id",
                definition: "INTEGER NOT NULL PRIMARY KEY ASC AUTOINCREMENT",
            },
            ColumnSpec {
                name: "full_name",
                definition: "TEXT NOT NULL UNIQUE",
            },
        ],
        foreign_keys: &[],
        depends_on: &[],
    },
    TableSpec {
        name: TABLE_SESSION,
        columns: &[
            ColumnSpec {
                name: "id",
                definition: "INTEGER NOT NULL PRIMARY KEY ASC AUTOINCREMENT",
            },
            ColumnSpec {
                name: "user_id",
                definition: "INTEGER NOT NULL",
            },
            ColumnSpec {
                name: "activity_type_id",
                definition: "INTEGER NOT NULL",
            },
            ColumnSpec {
                name: "start_time",
                definition: "DATETIME NOT NULL",
            },
            ColumnSpec {
                name: "end_time",
                definition: "DATETIME NOT NULL",
            },
            ColumnSpec {
                name: "rating",
                definition: "INTEGER",
            },
        ],
        foreign_keys: &[
            ForeignKey {
                column: "user_id",
                references_table: TABLE_USER,
                references_column: "id",
            },
            ForeignKey {
                column: "activity_type_id",
                references_table: TABLE_ACTIVITY_TYPE,
                references_column: "id",
            },
        ],
        depends_on: &[TABLE_ACTIVITY_TYPE, TABLE_USER],
    },
];

/// Default activity types seeded at bootstrap: (short_name, full_name, description)
pub const ACTIVITY_SEEDS: [(&str, &str, &str); 3] = [
    ("work", "Pomodoro", "Productive work"),
    ("short_break", "Short Break", "Short break between working bursts"),
    ("long_break", "Long Break", "Take a breather!"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_in_dependency_order() {
        for (i, table) in TABLES.iter().enumerate() {
            for dep in table.depends_on {
                let dep_index = TABLES
                    .iter()
                    .position(|t| t.name == *dep)
                    .unwrap_or_else(|| panic!("unknown dependency {dep} of {}", table.name));
                assert!(
                    dep_index < i,
                    "{} must be created before {}",
                    dep,
                    table.name
                );
            }
        }
    }

    #[test]
    fn test_foreign_keys_match_dependencies() {
        for table in &TABLES {
            for fk in table.foreign_keys {
                assert!(
                    table.depends_on.contains(&fk.references_table),
                    "{} references {} without depending on it",
                    table.name,
                    fk.references_table
                );
            }
        }
    }

    #[test]
    fn test_info_create_sql() {
        assert_eq!(
            TABLES[0].create_sql(),
            "CREATE TABLE db_info(property TEXT NOT NULL UNIQUE PRIMARY KEY,value TEXT NOT NULL)"
        );
    }

    #[test]
    fn test_session_create_sql_includes_foreign_keys() {
        let sql = TABLES[3].create_sql();
        assert!(sql.starts_with("CREATE TABLE session("));
        assert!(sql.contains("FOREIGN KEY(user_id) REFERENCES user(id)"));
        assert!(sql.contains("FOREIGN KEY(activity_type_id) REFERENCES activity_type(id)"));
    }

    #[test]
    fn test_no_if_not_exists() {
        for table in &TABLES {
            assert!(!table.create_sql().contains("IF NOT EXISTS"));
        }
    }
}
