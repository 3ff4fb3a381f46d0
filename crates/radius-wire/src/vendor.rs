//! Vendor dictionary: runtime lookup tables for vendor-specific attributes
//!
//! Populated once at startup from a text definition source and then read
//! concurrently by every packet worker, so the tables sit behind a
//! reader/writer lock. The codec never sees the file format, only the
//! resulting lookups.

use std::collections::HashMap;
use std::io::BufRead;
use std::sync::RwLock;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum DictionaryError {
    #[error("unknown vendor: {0}")]
    UnknownVendor(String),
    #[error("malformed dictionary line {line}: {text}")]
    Parse { line: usize, text: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A resolved vendor attribute definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VsaDefinition {
    pub vendor_id: u32,
    pub vendor_type: u8,
}

#[derive(Debug, Default)]
struct Tables {
    vendors: HashMap<String, u32>,
    attributes: HashMap<String, VsaDefinition>,
    names: HashMap<(u32, u8), String>,
}

/// Concurrently-readable vendor attribute dictionary
///
/// Readers are the per-packet name lookups; the only writer is the initial
/// (or occasional re-) load. Duplicate attribute registrations keep the
/// first definition and log the conflict rather than failing the load.
#[derive(Debug, Default)]
pub struct VendorDictionary {
    tables: RwLock<Tables>,
}

impl VendorDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a vendor name to id mapping
    pub fn register_vendor(&self, name: impl Into<String>, vendor_id: u32) {
        let mut tables = self.write_tables();
        tables.vendors.insert(name.into(), vendor_id);
    }

    /// Register a vendor attribute
    ///
    /// The vendor must already be registered. A duplicate attribute name is
    /// not an error: the first registration wins and the conflict is logged.
    pub fn register_attribute(
        &self,
        name: impl Into<String>,
        vendor_name: &str,
        vendor_type: u8,
    ) -> Result<(), DictionaryError> {
        let name = name.into();
        let mut tables = self.write_tables();
        let vendor_id = *tables
            .vendors
            .get(vendor_name)
            .ok_or_else(|| DictionaryError::UnknownVendor(vendor_name.to_string()))?;

        if tables.attributes.contains_key(&name) {
            warn!(attribute = %name, vendor = %vendor_name, "duplicate vendor attribute ignored");
            return Ok(());
        }

        let def = VsaDefinition {
            vendor_id,
            vendor_type,
        };
        tables.names.insert((vendor_id, vendor_type), name.clone());
        tables.attributes.insert(name, def);
        Ok(())
    }

    /// Load definitions from a text source, one entry per line:
    ///
    /// ```text
    /// # comment
    /// VENDOR    Cisco         9
    /// ATTRIBUTE Cisco-AVPair  Cisco  1
    /// ```
    ///
    /// Vendors must appear before attributes that reference them.
    pub fn load<R: BufRead>(&self, reader: R) -> Result<(), DictionaryError> {
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let text = line.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }

            let parse_err = || DictionaryError::Parse {
                line: index + 1,
                text: text.to_string(),
            };

            let fields: Vec<&str> = text.split_whitespace().collect();
            match fields.as_slice() {
                ["VENDOR", name, id] => {
                    let vendor_id: u32 = id.parse().map_err(|_| parse_err())?;
                    self.register_vendor(*name, vendor_id);
                }
                ["ATTRIBUTE", name, vendor_name, vendor_type] => {
                    let vendor_type: u8 = vendor_type.parse().map_err(|_| parse_err())?;
                    self.register_attribute(*name, vendor_name, vendor_type)?;
                }
                _ => return Err(parse_err()),
            }
        }
        Ok(())
    }

    /// Resolve a vendor attribute name to its (vendor-id, vendor-type) pair
    pub fn find_attribute(&self, name: &str) -> Option<VsaDefinition> {
        self.read_tables().attributes.get(name).copied()
    }

    /// Resolve a vendor name to its id
    pub fn find_vendor(&self, name: &str) -> Option<u32> {
        self.read_tables().vendors.get(name).copied()
    }

    /// Reverse lookup: human-readable name for a decoded VSA
    pub fn attribute_name(&self, vendor_id: u32, vendor_type: u8) -> Option<String> {
        self.read_tables().names.get(&(vendor_id, vendor_type)).cloned()
    }

    pub fn len(&self) -> usize {
        self.read_tables().attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_tables().attributes.is_empty()
    }

    fn read_tables(&self) -> std::sync::RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_tables(&self) -> std::sync::RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|e| e.into_inner())
    }
}
