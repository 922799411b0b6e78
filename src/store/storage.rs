//! VIN storage trait and SQLite implementation.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{named_params, params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;

use super::record::DecodedVin;

/// Trait for VIN storage backends.
///
/// Every mutating call that changes at least one row bumps the revision
/// published by `subscribe` before it returns.
pub trait VinStorage: Send + Sync {
  /// Insert a record, fully replacing any record with the same VIN.
  fn insert_vin(&self, record: &DecodedVin) -> Result<()>;

  /// Point lookup by VIN.
  fn get_vin(&self, vin: &str) -> Result<Option<DecodedVin>>;

  /// All records, newest first.
  fn get_all_vins(&self) -> Result<Vec<DecodedVin>>;

  /// Favorite records, newest first.
  fn get_favorite_vins(&self) -> Result<Vec<DecodedVin>>;

  /// Records whose VIN, make, model or year contains `query`, newest first.
  fn search_vins(&self, query: &str) -> Result<Vec<DecodedVin>>;

  /// Set the favorite flag. Returns false when the VIN is not stored.
  fn update_favorite(&self, vin: &str, is_favorite: bool) -> Result<bool>;

  /// Delete one record. Returns false when the VIN is not stored.
  fn delete_vin(&self, vin: &str) -> Result<bool>;

  /// Delete every record, returning how many were removed.
  fn delete_all(&self) -> Result<usize>;

  /// Number of stored records.
  fn count(&self) -> Result<usize>;

  /// Revision counter that changes after every mutation.
  fn subscribe(&self) -> watch::Receiver<u64>;
}

/// Schema for the VIN table.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS decoded_vins (
    vin TEXT PRIMARY KEY NOT NULL,
    make TEXT,
    model TEXT,
    year TEXT,
    body_class TEXT,
    vehicle_type TEXT,
    drive_type TEXT,
    doors TEXT,
    trim TEXT,
    engine_cylinders TEXT,
    engine_displacement TEXT,
    engine_hp TEXT,
    fuel_type TEXT,
    transmission_style TEXT,
    manufacturer TEXT,
    plant_city TEXT,
    plant_country TEXT,
    plant_state TEXT,
    abs TEXT,
    tpms TEXT,
    air_bag_loc_front TEXT,
    air_bag_loc_side TEXT,
    air_bag_loc_curtain TEXT,
    series TEXT,
    gvwr TEXT,
    error_code TEXT,
    error_text TEXT,
    timestamp INTEGER NOT NULL,
    is_favorite INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_decoded_vins_timestamp
    ON decoded_vins(timestamp DESC);
"#;

/// Newest first; rowid breaks ties in favor of the latest write.
const ORDER_BY: &str = "ORDER BY timestamp DESC, rowid DESC";

/// SQLite-based VIN storage.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
  changes: watch::Sender<u64>,
}

impl SqliteStorage {
  /// Open or create the database at `path`.
  pub fn open(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create database directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open database at {}: {}", path.display(), e))?;

    Self::with_connection(conn)
  }

  /// Open a private in-memory database.
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .map_err(|e| eyre!("Failed to open in-memory database: {}", e))?;

    Self::with_connection(conn)
  }

  fn with_connection(conn: Connection) -> Result<Self> {
    let (changes, _) = watch::channel(0);
    let storage = Self {
      conn: Mutex::new(conn),
      changes,
    };
    storage.run_migrations()?;

    Ok(storage)
  }

  /// Run database migrations
  fn run_migrations(&self) -> Result<()> {
    self
      .conn()?
      .execute_batch(SCHEMA)
      .map_err(|e| eyre!("Failed to run migrations: {}", e))?;
    Ok(())
  }

  fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
    self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))
  }

  fn notify(&self) {
    self.changes.send_modify(|rev| *rev = rev.wrapping_add(1));
  }

  fn query_list(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<DecodedVin>> {
    let conn = self.conn()?;

    let mut stmt = conn
      .prepare(sql)
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let records = stmt
      .query_map(params, DecodedVin::from_row)
      .map_err(|e| eyre!("Failed to query VINs: {}", e))?
      .collect::<rusqlite::Result<Vec<_>>>()
      .map_err(|e| eyre!("Failed to read VIN row: {}", e))?;

    Ok(records)
  }
}

impl VinStorage for SqliteStorage {
  fn insert_vin(&self, record: &DecodedVin) -> Result<()> {
    let v = &record.vehicle;

    self
      .conn()?
      .execute(
        "INSERT OR REPLACE INTO decoded_vins (
           vin, make, model, year, body_class, vehicle_type, drive_type, doors, trim,
           engine_cylinders, engine_displacement, engine_hp, fuel_type, transmission_style,
           manufacturer, plant_city, plant_country, plant_state,
           abs, tpms, air_bag_loc_front, air_bag_loc_side, air_bag_loc_curtain,
           series, gvwr, error_code, error_text, timestamp, is_favorite
         ) VALUES (
           :vin, :make, :model, :year, :body_class, :vehicle_type, :drive_type, :doors, :trim,
           :engine_cylinders, :engine_displacement, :engine_hp, :fuel_type, :transmission_style,
           :manufacturer, :plant_city, :plant_country, :plant_state,
           :abs, :tpms, :air_bag_loc_front, :air_bag_loc_side, :air_bag_loc_curtain,
           :series, :gvwr, :error_code, :error_text, :timestamp, :is_favorite
         )",
        named_params! {
          ":vin": v.vin,
          ":make": v.make,
          ":model": v.model,
          ":year": v.year,
          ":body_class": v.body_class,
          ":vehicle_type": v.vehicle_type,
          ":drive_type": v.drive_type,
          ":doors": v.doors,
          ":trim": v.trim,
          ":engine_cylinders": v.engine_cylinders,
          ":engine_displacement": v.engine_displacement,
          ":engine_hp": v.engine_hp,
          ":fuel_type": v.fuel_type,
          ":transmission_style": v.transmission_style,
          ":manufacturer": v.manufacturer,
          ":plant_city": v.plant_city,
          ":plant_country": v.plant_country,
          ":plant_state": v.plant_state,
          ":abs": v.abs,
          ":tpms": v.tpms,
          ":air_bag_loc_front": v.air_bag_loc_front,
          ":air_bag_loc_side": v.air_bag_loc_side,
          ":air_bag_loc_curtain": v.air_bag_loc_curtain,
          ":series": v.series,
          ":gvwr": v.gvwr,
          ":error_code": v.error_code,
          ":error_text": v.error_text,
          ":timestamp": record.timestamp,
          ":is_favorite": record.is_favorite,
        },
      )
      .map_err(|e| eyre!("Failed to store VIN {}: {}", v.vin, e))?;

    self.notify();
    Ok(())
  }

  fn get_vin(&self, vin: &str) -> Result<Option<DecodedVin>> {
    self
      .conn()?
      .query_row(
        "SELECT * FROM decoded_vins WHERE vin = ? LIMIT 1",
        params![vin],
        DecodedVin::from_row,
      )
      .optional()
      .map_err(|e| eyre!("Failed to look up VIN {}: {}", vin, e))
  }

  fn get_all_vins(&self) -> Result<Vec<DecodedVin>> {
    self.query_list(&format!("SELECT * FROM decoded_vins {}", ORDER_BY), [])
  }

  fn get_favorite_vins(&self) -> Result<Vec<DecodedVin>> {
    self.query_list(
      &format!("SELECT * FROM decoded_vins WHERE is_favorite = 1 {}", ORDER_BY),
      [],
    )
  }

  fn search_vins(&self, query: &str) -> Result<Vec<DecodedVin>> {
    self.query_list(
      &format!(
        "SELECT * FROM decoded_vins
         WHERE vin LIKE '%' || :q || '%'
            OR make LIKE '%' || :q || '%'
            OR model LIKE '%' || :q || '%'
            OR year LIKE '%' || :q || '%'
         {}",
        ORDER_BY
      ),
      named_params! { ":q": query },
    )
  }

  fn update_favorite(&self, vin: &str, is_favorite: bool) -> Result<bool> {
    let updated = self
      .conn()?
      .execute(
        "UPDATE decoded_vins SET is_favorite = ? WHERE vin = ?",
        params![is_favorite, vin],
      )
      .map_err(|e| eyre!("Failed to update favorite for {}: {}", vin, e))?;

    if updated > 0 {
      self.notify();
    }
    Ok(updated > 0)
  }

  fn delete_vin(&self, vin: &str) -> Result<bool> {
    let deleted = self
      .conn()?
      .execute("DELETE FROM decoded_vins WHERE vin = ?", params![vin])
      .map_err(|e| eyre!("Failed to delete VIN {}: {}", vin, e))?;

    if deleted > 0 {
      self.notify();
    }
    Ok(deleted > 0)
  }

  fn delete_all(&self) -> Result<usize> {
    let deleted = self
      .conn()?
      .execute("DELETE FROM decoded_vins", [])
      .map_err(|e| eyre!("Failed to clear VIN history: {}", e))?;

    if deleted > 0 {
      self.notify();
    }
    Ok(deleted)
  }

  fn count(&self) -> Result<usize> {
    let count: i64 = self
      .conn()?
      .query_row("SELECT COUNT(*) FROM decoded_vins", [], |row| row.get(0))
      .map_err(|e| eyre!("Failed to count VINs: {}", e))?;

    Ok(count as usize)
  }

  fn subscribe(&self) -> watch::Receiver<u64> {
    self.changes.subscribe()
  }
}
