use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::contacts::ensure_contact_in;
use super::transactions::insert_transaction_in;
use super::{not_found, Database};
use crate::error::KayuError;
use crate::models::{
    BatchIntake, InventoryItem, InventoryStatus, InventoryUpdate, TransactionLog,
    WoodLogMeasurement, WoodLogValuation,
};

const SELECT_INVENTORY: &str = "SELECT i.*, c.name AS contact_name
    FROM inventory i LEFT JOIN contacts c ON c.id = i.contact_id";

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<InventoryItem> {
    Ok(InventoryItem {
        id: row.get("id")?,
        invoice_number: row.get("invoice_number")?,
        contact_id: row.get("contact_id")?,
        contact_name: row.get("contact_name")?,
        wood_type: row.get("wood_type")?,
        measurement: WoodLogMeasurement {
            length: row.get("length")?,
            d1: row.get("d1")?,
            d2: row.get("d2")?,
            d3: row.get("d3")?,
            d4: row.get("d4")?,
            trim: row.get("trim")?,
            gr: row.get("gr")?,
        },
        valuation: WoodLogValuation {
            avg_diameter: row.get("avg_diameter")?,
            effective_length: row.get("effective_length")?,
            gross_volume: row.get("gross_volume")?,
            gr_volume: row.get("gr_volume")?,
            net_volume: row.get("net_volume")?,
        },
        unit_price: row.get("unit_price")?,
        total_value: row.get("total_value")?,
        status: row.get("status")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub(super) fn insert_item_in(conn: &Connection, item: &InventoryItem) -> Result<(), KayuError> {
    let m = &item.measurement;
    let v = &item.valuation;
    conn.execute(
        "INSERT INTO inventory (id, invoice_number, contact_id, wood_type,
            length, d1, d2, d3, d4, trim, gr,
            avg_diameter, effective_length, gross_volume, gr_volume, net_volume,
            unit_price, total_value, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
            ?16, ?17, ?18, ?19, ?20, ?21)",
        params![
            item.id,
            item.invoice_number,
            item.contact_id,
            item.wood_type,
            m.length,
            m.d1,
            m.d2,
            m.d3,
            m.d4,
            m.trim,
            m.gr,
            v.avg_diameter,
            v.effective_length,
            v.gross_volume,
            v.gr_volume,
            v.net_volume,
            item.unit_price,
            item.total_value,
            item.status,
            item.created_at,
            item.updated_at
        ],
    )?;
    Ok(())
}

pub(super) fn get_item_in(conn: &Connection, id: Uuid) -> Result<InventoryItem, KayuError> {
    conn.query_row(
        &format!("{SELECT_INVENTORY} WHERE i.id = ?1"),
        [id],
        item_from_row,
    )
    .map_err(not_found("Inventory item", id))
}

pub(super) fn list_items_in(conn: &Connection) -> Result<Vec<InventoryItem>, KayuError> {
    let mut stmt = conn.prepare(&format!("{SELECT_INVENTORY} ORDER BY i.created_at DESC"))?;
    let rows = stmt.query_map([], item_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub(super) fn set_item_status_in(
    conn: &Connection,
    id: Uuid,
    status: InventoryStatus,
) -> Result<(), KayuError> {
    conn.execute(
        "UPDATE inventory SET status = ?2, updated_at = ?3 WHERE id = ?1",
        params![id, status, chrono::Utc::now()],
    )?;
    Ok(())
}

impl Database {
    /// Value and price a purchased batch and store one inventory row per log,
    /// plus a `Purchase` ledger row when the invoice total is positive. All or
    /// nothing.
    pub fn create_batch(&self, batch: &BatchIntake) -> Result<Vec<InventoryItem>, KayuError> {
        batch.validate()?;
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        ensure_contact_in(&tx, batch.contact_id)?;

        let items = batch.to_items();
        for item in &items {
            insert_item_in(&tx, item)?;
        }
        if batch.total_invoice_price > 0.0 {
            let ledger = TransactionLog::for_purchase(
                &batch.invoice_number,
                batch.contact_id,
                batch.total_invoice_price,
            );
            insert_transaction_in(&tx, &ledger)?;
        }

        let stored = items
            .iter()
            .map(|item| get_item_in(&tx, item.id))
            .collect::<Result<Vec<_>, _>>()?;
        tx.commit()?;

        tracing::info!(
            "Stored batch '{}': {} logs of {}, invoice total {:.2}",
            batch.invoice_number,
            stored.len(),
            batch.wood_type,
            batch.total_invoice_price
        );
        Ok(stored)
    }

    /// All inventory rows, newest first, with the supplier name joined in.
    pub fn list_inventory(&self) -> Result<Vec<InventoryItem>, KayuError> {
        list_items_in(&self.conn())
    }

    pub fn get_inventory_item(&self, id: Uuid) -> Result<InventoryItem, KayuError> {
        get_item_in(&self.conn(), id)
    }

    pub fn update_inventory_item(
        &self,
        id: Uuid,
        update: &InventoryUpdate,
    ) -> Result<InventoryItem, KayuError> {
        let conn = self.conn();
        let mut item = get_item_in(&conn, id)?;
        ensure_contact_in(&conn, update.contact_id)?;
        update.apply(&mut item)?;

        let m = &item.measurement;
        let v = &item.valuation;
        conn.execute(
            "UPDATE inventory SET invoice_number = ?2, contact_id = ?3, wood_type = ?4,
                length = ?5, d1 = ?6, d2 = ?7, d3 = ?8, d4 = ?9, trim = ?10, gr = ?11,
                avg_diameter = ?12, effective_length = ?13, gross_volume = ?14,
                gr_volume = ?15, net_volume = ?16, unit_price = ?17, total_value = ?18,
                status = ?19, updated_at = ?20
             WHERE id = ?1",
            params![
                item.id,
                item.invoice_number,
                item.contact_id,
                item.wood_type,
                m.length,
                m.d1,
                m.d2,
                m.d3,
                m.d4,
                m.trim,
                m.gr,
                v.avg_diameter,
                v.effective_length,
                v.gross_volume,
                v.gr_volume,
                v.net_volume,
                item.unit_price,
                item.total_value,
                item.status,
                item.updated_at
            ],
        )?;
        get_item_in(&conn, id)
    }

    pub fn delete_inventory_item(&self, id: Uuid) -> Result<(), KayuError> {
        let affected = self.conn().execute("DELETE FROM inventory WHERE id = ?1", [id])?;
        if affected == 0 {
            return Err(KayuError::NotFound(format!("Inventory item {id} not found")));
        }
        tracing::info!("Deleted inventory item {id}");
        Ok(())
    }
}
