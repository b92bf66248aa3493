use sha2::{Digest, Sha256};

use crate::frame::{Cell, RawTable};

const FIELD_SEP: u8 = 0x1f;
const ROW_SEP: u8 = 0x1e;

/// SHA-256 fingerprint of a table's header and rows, row index included.
///
/// Used for audit logging only. Identical extracted data always yields the
/// same hex string; reordering rows changes it.
pub fn table_checksum(table: &RawTable) -> String {
    let mut hasher = Sha256::new();

    for column in &table.columns {
        hasher.update(column.as_bytes());
        hasher.update([FIELD_SEP]);
    }
    hasher.update([ROW_SEP]);

    for (index, row) in table.rows.iter().enumerate() {
        hasher.update((index as u64).to_le_bytes());
        for cell in row {
            hash_cell(&mut hasher, cell);
        }
        hasher.update([ROW_SEP]);
    }

    hex::encode(hasher.finalize())
}

fn hash_cell(hasher: &mut Sha256, cell: &Cell) {
    match cell {
        Cell::Null => hasher.update([0u8]),
        Cell::Bool(b) => {
            hasher.update([1u8]);
            hasher.update([u8::from(*b)]);
        }
        Cell::Int(i) => {
            hasher.update([2u8]);
            hasher.update(i.to_le_bytes());
        }
        Cell::Float(f) => {
            hasher.update([3u8]);
            hasher.update(f.to_bits().to_le_bytes());
        }
        Cell::Text(s) => {
            hasher.update([4u8]);
            hasher.update((s.len() as u64).to_le_bytes());
            hasher.update(s.as_bytes());
        }
    }
}
