//! Schema registry and initializer for the LoadMaster database.
//!
//! Table definitions are registered in a fixed order matching their
//! foreign-key dependencies (parents before referencing tables) and
//! concatenated into one canonical DDL script. Every statement uses
//! `CREATE TABLE IF NOT EXISTS`, so the script can be re-applied without
//! error.

use crate::db::Database;
use crate::error::DbResult;

/// A named unit of schema.
#[derive(Debug, Clone)]
pub struct SchemaDefinition {
    pub table_name: &'static str,
    pub create_statement: &'static str,
}

/// All table definitions, in dependency order.
pub fn schema_definitions() -> Vec<SchemaDefinition> {
    vec![
        user_table(),
        aircraft_table(),
        mission_table(),
        cargo_type_table(),
        cargo_item_table(),
        fuel_state_table(),
        fuel_mac_quants_table(),
        compartment_table(),
        load_constraints_table(),
        allowed_mac_constraints_table(),
    ]
}

/// Concatenate the registered definitions into the canonical schema
/// script.
pub fn generate_schema_sql() -> String {
    schema_definitions()
        .iter()
        .map(|schema| schema.create_statement)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Apply the canonical schema through the contract. Idempotent.
pub async fn initialize_database(db: &Database) -> DbResult<()> {
    db.initialize_schema(&generate_schema_sql()).await
}

fn user_table() -> SchemaDefinition {
    SchemaDefinition {
        table_name: "user",
        create_statement: "\
CREATE TABLE IF NOT EXISTS user (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  username TEXT NOT NULL UNIQUE,
  last_login TEXT
);",
    }
}

fn aircraft_table() -> SchemaDefinition {
    SchemaDefinition {
        table_name: "aircraft",
        create_statement: "\
CREATE TABLE IF NOT EXISTS aircraft (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  type TEXT NOT NULL,
  name TEXT NOT NULL,
  empty_weight REAL NOT NULL,
  empty_mac REAL NOT NULL,
  cargo_bay_width REAL NOT NULL,
  treadways_width REAL NOT NULL,
  treadways_dist_from_center REAL NOT NULL,
  ramp_length REAL NOT NULL,
  ramp_max_incline REAL NOT NULL,
  ramp_min_incline REAL NOT NULL
);",
    }
}

fn mission_table() -> SchemaDefinition {
    SchemaDefinition {
        table_name: "mission",
        create_statement: "\
CREATE TABLE IF NOT EXISTS mission (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  name TEXT NOT NULL,
  created_date TEXT NOT NULL,
  modified_date TEXT NOT NULL,
  front_crew_weight REAL NOT NULL DEFAULT 0,
  back_crew_weight REAL NOT NULL DEFAULT 0,
  configuration_weights REAL NOT NULL DEFAULT 0,
  crew_gear_weight REAL NOT NULL DEFAULT 0,
  food_weight REAL NOT NULL DEFAULT 0,
  safety_gear_weight REAL NOT NULL DEFAULT 0,
  etc_weight REAL NOT NULL DEFAULT 0,
  outboard_fuel REAL NOT NULL DEFAULT 0,
  inboard_fuel REAL NOT NULL DEFAULT 0,
  fuselage_fuel REAL NOT NULL DEFAULT 0,
  auxiliary_fuel REAL NOT NULL DEFAULT 0,
  external_fuel REAL NOT NULL DEFAULT 0,
  aircraft_id INTEGER NOT NULL,
  FOREIGN KEY (aircraft_id) REFERENCES aircraft (id)
);",
    }
}

fn cargo_type_table() -> SchemaDefinition {
    SchemaDefinition {
        table_name: "cargo_type",
        create_statement: "\
CREATE TABLE IF NOT EXISTS cargo_type (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  user_id INTEGER,
  name TEXT NOT NULL,
  default_weight REAL NOT NULL,
  default_length REAL NOT NULL,
  default_width REAL NOT NULL,
  default_height REAL NOT NULL,
  default_forward_overhang REAL NOT NULL,
  default_back_overhang REAL NOT NULL,
  default_cog REAL NOT NULL,
  type TEXT CHECK (type IN ('bulk', '2_wheeled', '4_wheeled')) NOT NULL,
  FOREIGN KEY (user_id) REFERENCES user (id)
);",
    }
}

fn cargo_item_table() -> SchemaDefinition {
    SchemaDefinition {
        table_name: "cargo_item",
        create_statement: "\
CREATE TABLE IF NOT EXISTS cargo_item (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  mission_id INTEGER NOT NULL,
  cargo_type_id INTEGER NOT NULL,
  name TEXT NOT NULL,
  weight REAL NOT NULL,
  length REAL NOT NULL,
  width REAL NOT NULL,
  height REAL NOT NULL,
  forward_overhang REAL NOT NULL,
  back_overhang REAL NOT NULL,
  cog REAL NOT NULL,
  x_start_position REAL NOT NULL,
  y_start_position REAL NOT NULL,
  status TEXT CHECK (status IN ('inventory', 'onStage', 'onDeck')) NOT NULL,
  FOREIGN KEY (mission_id) REFERENCES mission (id),
  FOREIGN KEY (cargo_type_id) REFERENCES cargo_type (id)
);",
    }
}

fn fuel_state_table() -> SchemaDefinition {
    SchemaDefinition {
        table_name: "fuel_state",
        create_statement: "\
CREATE TABLE IF NOT EXISTS fuel_state (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  mission_id INTEGER NOT NULL,
  total_fuel REAL NOT NULL,
  main_tank_1_fuel REAL NOT NULL,
  main_tank_2_fuel REAL NOT NULL,
  main_tank_3_fuel REAL NOT NULL,
  main_tank_4_fuel REAL NOT NULL,
  external_1_fuel REAL NOT NULL,
  external_2_fuel REAL NOT NULL,
  mac_contribution REAL NOT NULL,
  FOREIGN KEY (mission_id) REFERENCES mission (id)
);",
    }
}

fn fuel_mac_quants_table() -> SchemaDefinition {
    SchemaDefinition {
        table_name: "fuel_mac_quants",
        create_statement: "\
CREATE TABLE IF NOT EXISTS fuel_mac_quants (
  outboard_fuel REAL NOT NULL,
  inboard_fuel REAL NOT NULL,
  fuselage_fuel REAL NOT NULL,
  auxiliary_fuel REAL NOT NULL,
  external_fuel REAL NOT NULL,
  mac_contribution REAL NOT NULL
);",
    }
}

fn compartment_table() -> SchemaDefinition {
    SchemaDefinition {
        table_name: "compartment",
        create_statement: "\
CREATE TABLE IF NOT EXISTS compartment (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  aircraft_id INTEGER NOT NULL,
  name TEXT NOT NULL,
  x_start REAL NOT NULL,
  x_end REAL NOT NULL,
  floor_area REAL NOT NULL,
  usable_volume REAL NOT NULL,
  FOREIGN KEY (aircraft_id) REFERENCES aircraft (id)
);",
    }
}

fn load_constraints_table() -> SchemaDefinition {
    SchemaDefinition {
        table_name: "load_constraints",
        create_statement: "\
CREATE TABLE IF NOT EXISTS load_constraints (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  compartment_id INTEGER NOT NULL,
  max_cumulative_weight REAL,
  max_concentrated_load REAL,
  max_running_load_treadway REAL,
  max_running_load_between_treadways REAL,
  FOREIGN KEY (compartment_id) REFERENCES compartment (id)
);",
    }
}

fn allowed_mac_constraints_table() -> SchemaDefinition {
    SchemaDefinition {
        table_name: "allowed_mac_constraints",
        create_statement: "\
CREATE TABLE IF NOT EXISTS allowed_mac_constraints (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  gross_aircraft_weight REAL NOT NULL,
  min_mac REAL NOT NULL,
  max_mac REAL NOT NULL
);",
    }
}
