//! Server-side purchase records and the buyers they reference.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::utils::{write_atomic, PathResolver};
use crate::errors::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buyer {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    pub id: Uuid,
    pub description: String,
    pub amount: f64,
    pub installments: u32,
    pub paid_installments: u32,
    pub first_payment_date: NaiveDate,
    pub buyer_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A record with its buyer resolved. Unknown buyers join as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseRecordWithBuyer {
    #[serde(flatten)]
    pub record: PurchaseRecord,
    pub buyer: Option<Buyer>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RecordFile {
    #[serde(default)]
    buyers: Vec<Buyer>,
    #[serde(default)]
    purchases: Vec<PurchaseRecord>,
}

/// JSON file holding buyers and purchase records.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_data_dir(root: Option<PathBuf>) -> Self {
        let base = PathResolver::resolve_base(root);
        Self::new(PathResolver::records_file_in(&base))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn buyers(&self) -> Result<Vec<Buyer>> {
        Ok(self.read()?.buyers)
    }

    pub fn buyer(&self, id: Uuid) -> Result<Option<Buyer>> {
        Ok(self.read()?.buyers.into_iter().find(|buyer| buyer.id == id))
    }

    pub fn purchases(&self) -> Result<Vec<PurchaseRecord>> {
        Ok(self.read()?.purchases)
    }

    pub fn insert_buyer(&self, buyer: Buyer) -> Result<()> {
        let mut file = self.read()?;
        file.buyers.push(buyer);
        self.write(&file)
    }

    pub fn insert_purchase(&self, record: PurchaseRecord) -> Result<()> {
        let mut file = self.read()?;
        file.purchases.push(record);
        self.write(&file)
    }

    fn read(&self) -> Result<RecordFile> {
        if !self.path.exists() {
            return Ok(RecordFile::default());
        }
        let data = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }

    fn write(&self, file: &RecordFile) -> Result<()> {
        let json = serde_json::to_string_pretty(file)?;
        write_atomic(&self.path, &json)
    }
}
