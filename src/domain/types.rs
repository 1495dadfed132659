// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Type Mapping Logic
//!
//! MySQL and BigQuery speak different languages when it comes to data types.
//! `DESCRIBE` reports a native type such as `varchar(255)` or `int(10) unsigned`;
//! this module reduces it to a base token (`varchar`, `int`) and looks that
//! token up in a static table to get the BigQuery column type.
//!
//! Anything the table does not know becomes `STRING`. `tinyint` is an
//! `INTEGER` unless the model flags the column as a boolean, which is how
//! MySQL stores booleans.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Native column type tokens as reported by `DESCRIBE`.
pub mod tokens {
    pub const JSON: &str = "json";
    pub const BIGINT: &str = "bigint";
    pub const DATETIME: &str = "datetime";
    pub const TIMESTAMP: &str = "timestamp";
    pub const DATE: &str = "date";
    pub const TIME: &str = "time";
    pub const DECIMAL: &str = "decimal";
    pub const INTEGER: &str = "integer";
    pub const SMALLINT: &str = "smallint";
    /// Also how MySQL stores booleans.
    pub const TINYINT: &str = "tinyint";
    pub const INT: &str = "int";
    pub const FLOAT: &str = "float";
    pub const DOUBLE: &str = "double";
}

/// BigQuery column types produced by the bridge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum WarehouseType {
    String,
    Integer,
    Float,
    Boolean,
    Timestamp,
    Datetime,
    Time,
    /// Nested record. `RECORD` is accepted as an alias when reading schemas back.
    #[serde(alias = "RECORD")]
    Struct,
}

impl fmt::Display for WarehouseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WarehouseType::String => "STRING",
            WarehouseType::Integer => "INTEGER",
            WarehouseType::Float => "FLOAT",
            WarehouseType::Boolean => "BOOLEAN",
            WarehouseType::Timestamp => "TIMESTAMP",
            WarehouseType::Datetime => "DATETIME",
            WarehouseType::Time => "TIME",
            WarehouseType::Struct => "STRUCT",
        };
        write!(f, "{}", name)
    }
}

/// Base token -> warehouse type. Tokens missing here map to `STRING`.
static TYPE_TABLE: &[(&str, WarehouseType)] = &[
    (tokens::TIMESTAMP, WarehouseType::Timestamp),
    (tokens::INT, WarehouseType::Integer),
    (tokens::TINYINT, WarehouseType::Integer),
    (tokens::BIGINT, WarehouseType::Integer),
    (tokens::INTEGER, WarehouseType::Integer),
    (tokens::SMALLINT, WarehouseType::Integer),
    (tokens::DATE, WarehouseType::Datetime),
    (tokens::DATETIME, WarehouseType::Datetime),
    (tokens::DECIMAL, WarehouseType::Float),
    (tokens::FLOAT, WarehouseType::Float),
    (tokens::DOUBLE, WarehouseType::Float),
    (tokens::TIME, WarehouseType::Time),
    (tokens::JSON, WarehouseType::Struct),
];

/// Strips length/precision suffixes and modifiers from a native type.
///
/// `varchar(255)` -> `varchar`, `int(10) unsigned` -> `int`, `BIGINT UNSIGNED` -> `bigint`.
pub fn base_token(native_type: &str) -> String {
    native_type
        .split(|c: char| c == '(' || c.is_whitespace())
        .find(|part| !part.is_empty())
        .unwrap_or("")
        .to_lowercase()
}

/// Maps a native column type to its BigQuery type.
///
/// `boolean_flagged` marks a column the model treats as a boolean; it only
/// changes the outcome for `tinyint`. JSON columns map to `Struct`: whether
/// such a column is kept depends on struct hints, which is the caller's call.
pub fn map_native_type(native_type: &str, boolean_flagged: bool) -> WarehouseType {
    let token = base_token(native_type);

    if boolean_flagged && token == tokens::TINYINT {
        return WarehouseType::Boolean;
    }

    TYPE_TABLE
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, bq)| *bq)
        .unwrap_or(WarehouseType::String)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_integers() {
        for native in ["int", "tinyint", "bigint", "integer", "smallint"] {
            assert_eq!(map_native_type(native, false), WarehouseType::Integer);
        }
    }

    #[test]
    fn test_map_temporal_types() {
        assert_eq!(map_native_type("timestamp", false), WarehouseType::Timestamp);
        assert_eq!(map_native_type("date", false), WarehouseType::Datetime);
        assert_eq!(map_native_type("datetime", false), WarehouseType::Datetime);
        assert_eq!(map_native_type("time", false), WarehouseType::Time);
    }

    #[test]
    fn test_map_floats() {
        assert_eq!(map_native_type("decimal(10,2)", false), WarehouseType::Float);
        assert_eq!(map_native_type("float", false), WarehouseType::Float);
        assert_eq!(map_native_type("double", false), WarehouseType::Float);
    }

    #[test]
    fn test_length_suffix_is_ignored() {
        for native in ["int", "tinyint", "varchar", "decimal", "timestamp", "char"] {
            let suffixed = format!("{}(11)", native);
            assert_eq!(
                map_native_type(&suffixed, false),
                map_native_type(native, false),
                "{} mapped differently",
                suffixed
            );
        }
        assert_eq!(map_native_type("int(10) unsigned", false), WarehouseType::Integer);
        assert_eq!(map_native_type("BIGINT UNSIGNED", false), WarehouseType::Integer);
    }

    #[test]
    fn test_boolean_flag_only_affects_tinyint() {
        assert_eq!(map_native_type("tinyint(1)", true), WarehouseType::Boolean);
        assert_eq!(map_native_type("tinyint(1)", false), WarehouseType::Integer);
        assert_eq!(map_native_type("int(11)", true), WarehouseType::Integer);
    }

    #[test]
    fn test_unknown_types_fall_back_to_string() {
        assert_eq!(map_native_type("varchar(255)", false), WarehouseType::String);
        assert_eq!(map_native_type("longtext", false), WarehouseType::String);
        assert_eq!(map_native_type("enum('a','b')", false), WarehouseType::String);
        assert_eq!(map_native_type("mediumint", false), WarehouseType::String);
        assert_eq!(map_native_type("", false), WarehouseType::String);
    }

    #[test]
    fn test_every_token_is_mapped() {
        let all = [
            tokens::JSON,
            tokens::BIGINT,
            tokens::DATETIME,
            tokens::TIMESTAMP,
            tokens::DATE,
            tokens::TIME,
            tokens::DECIMAL,
            tokens::INTEGER,
            tokens::SMALLINT,
            tokens::TINYINT,
            tokens::INT,
            tokens::FLOAT,
            tokens::DOUBLE,
        ];
        assert_eq!(all.len(), TYPE_TABLE.len());
        for token in all {
            assert!(
                TYPE_TABLE.iter().any(|(name, _)| *name == token),
                "{} has no mapping",
                token
            );
        }
    }

    #[test]
    fn test_json_maps_to_struct() {
        assert_eq!(map_native_type("json", false), WarehouseType::Struct);
        assert_eq!(map_native_type("JSON", false), WarehouseType::Struct);
    }

    #[test]
    fn test_display_matches_serde_name() {
        assert_eq!(WarehouseType::Struct.to_string(), "STRUCT");
        assert_eq!(
            serde_json::to_string(&WarehouseType::Datetime).unwrap(),
            "\"DATETIME\""
        );
        let parsed: WarehouseType = serde_json::from_str("\"RECORD\"").unwrap();
        assert_eq!(parsed, WarehouseType::Struct);
    }
}
