use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::contacts::ensure_contact_in;
use super::inventory::{get_item_in, set_item_status_in};
use super::transactions::insert_transaction_in;
use super::{not_found, Database};
use crate::error::KayuError;
use crate::models::{
    InventoryStatus, NewSale, ReferenceType, Sale, SaleSource, SaleUpdate, TransactionLog,
    WoodLogMeasurement, WoodLogValuation,
};

const SELECT_SALE: &str = "SELECT s.*, c.name AS contact_name
    FROM sales s LEFT JOIN contacts c ON c.id = s.contact_id";

fn measurement_from_row(row: &Row<'_>) -> rusqlite::Result<Option<WoodLogMeasurement>> {
    let length: Option<f64> = row.get("length")?;
    let Some(length) = length else {
        return Ok(None);
    };
    Ok(Some(WoodLogMeasurement {
        length,
        d1: row.get("d1")?,
        d2: row.get("d2")?,
        d3: row.get("d3")?,
        d4: row.get("d4")?,
        trim: row.get::<_, Option<f64>>("trim")?.unwrap_or(0.0),
        gr: row.get::<_, Option<f64>>("gr")?.unwrap_or(0.0),
    }))
}

fn valuation_from_row(row: &Row<'_>) -> rusqlite::Result<Option<WoodLogValuation>> {
    let avg: Option<f64> = row.get("avg_diameter")?;
    let Some(avg_diameter) = avg else {
        return Ok(None);
    };
    Ok(Some(WoodLogValuation {
        avg_diameter,
        effective_length: row.get("effective_length")?,
        gross_volume: row.get("gross_volume")?,
        gr_volume: row.get("gr_volume")?,
        net_volume: row.get("net_volume")?,
    }))
}

fn sale_from_row(row: &Row<'_>) -> rusqlite::Result<Sale> {
    Ok(Sale {
        id: row.get("id")?,
        invoice_number: row.get("invoice_number")?,
        contact_id: row.get("contact_id")?,
        contact_name: row.get("contact_name")?,
        inventory_id: row.get("inventory_id")?,
        wood_type: row.get("wood_type")?,
        measurement: measurement_from_row(row)?,
        valuation: valuation_from_row(row)?,
        net_volume: row.get("net_volume")?,
        unit_price: row.get("unit_price")?,
        total_price: row.get("total_price")?,
        status: row.get("status")?,
        notes: row.get("notes")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub(super) fn insert_sale_in(conn: &Connection, s: &Sale) -> Result<(), KayuError> {
    let m = s.measurement.as_ref();
    let v = s.valuation.as_ref();
    conn.execute(
        "INSERT INTO sales (id, invoice_number, contact_id, inventory_id, wood_type,
            length, d1, d2, d3, d4, trim, gr,
            avg_diameter, effective_length, gross_volume, gr_volume,
            net_volume, unit_price, total_price, status, notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
            ?17, ?18, ?19, ?20, ?21, ?22, ?23)",
        params![
            s.id,
            s.invoice_number,
            s.contact_id,
            s.inventory_id,
            s.wood_type,
            m.map(|m| m.length),
            m.map(|m| m.d1),
            m.map(|m| m.d2),
            m.map(|m| m.d3),
            m.map(|m| m.d4),
            m.map(|m| m.trim),
            m.map(|m| m.gr),
            v.map(|v| v.avg_diameter),
            v.map(|v| v.effective_length),
            v.map(|v| v.gross_volume),
            v.map(|v| v.gr_volume),
            s.net_volume,
            s.unit_price,
            s.total_price,
            s.status,
            s.notes,
            s.created_at,
            s.updated_at
        ],
    )?;
    Ok(())
}

pub(super) fn get_sale_in(conn: &Connection, id: Uuid) -> Result<Sale, KayuError> {
    conn.query_row(&format!("{SELECT_SALE} WHERE s.id = ?1"), [id], sale_from_row)
        .map_err(not_found("Sale", id))
}

pub(super) fn list_sales_in(conn: &Connection) -> Result<Vec<Sale>, KayuError> {
    let mut stmt = conn.prepare(&format!("{SELECT_SALE} ORDER BY s.created_at DESC"))?;
    let rows = stmt.query_map([], sale_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn delete_sale_ledger_in(conn: &Connection, sale_id: Uuid) -> Result<(), KayuError> {
    conn.execute(
        "DELETE FROM transactions WHERE reference_id = ?1 AND reference_type = ?2",
        params![sale_id, ReferenceType::Sale],
    )?;
    Ok(())
}

impl Database {
    /// Record a sale. For inventory sales the stock row is marked sold in the
    /// same transaction; every non-cancelled sale gets an income ledger row.
    pub fn create_sale(&self, new: &NewSale) -> Result<Sale, KayuError> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        ensure_contact_in(&tx, new.contact_id)?;

        let stock = match &new.source {
            SaleSource::Inventory { inventory_id } => Some(get_item_in(&tx, *inventory_id)?),
            SaleSource::Manual { .. } => None,
        };
        let sale = Sale::build(new, stock.as_ref())?;

        insert_sale_in(&tx, &sale)?;
        if let Some(inventory_id) = sale.inventory_id {
            set_item_status_in(&tx, inventory_id, InventoryStatus::Sold)?;
        }
        if !sale.is_cancelled() {
            insert_transaction_in(&tx, &TransactionLog::for_sale(&sale))?;
        }
        let stored = get_sale_in(&tx, sale.id)?;
        tx.commit()?;

        tracing::info!(
            "Recorded sale '{}': {:.4} m3 at {:.2} = {:.2}",
            stored.invoice_number,
            stored.net_volume,
            stored.unit_price,
            stored.total_price
        );
        Ok(stored)
    }

    /// All sales, newest first.
    pub fn list_sales(&self) -> Result<Vec<Sale>, KayuError> {
        list_sales_in(&self.conn())
    }

    pub fn get_sale(&self, id: Uuid) -> Result<Sale, KayuError> {
        get_sale_in(&self.conn(), id)
    }

    /// Change status, notes or price. Cancelling a stock sale puts the log
    /// back on the shelf and drops its income row.
    pub fn update_sale(&self, id: Uuid, update: &SaleUpdate) -> Result<Sale, KayuError> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let mut sale = get_sale_in(&tx, id)?;
        let was_cancelled = sale.is_cancelled();
        update.apply(&mut sale)?;

        if was_cancelled && !sale.is_cancelled() {
            return Err(KayuError::ValidationError(format!(
                "Sale {id} is cancelled and cannot be reopened"
            )));
        }

        tx.execute(
            "UPDATE sales SET status = ?2, notes = ?3, unit_price = ?4, total_price = ?5,
                updated_at = ?6
             WHERE id = ?1",
            params![
                sale.id,
                sale.status,
                sale.notes,
                sale.unit_price,
                sale.total_price,
                sale.updated_at
            ],
        )?;

        if sale.is_cancelled() && !was_cancelled {
            if let Some(inventory_id) = sale.inventory_id {
                set_item_status_in(&tx, inventory_id, InventoryStatus::Available)?;
            }
            delete_sale_ledger_in(&tx, id)?;
            tracing::info!("Cancelled sale '{}'", sale.invoice_number);
        } else if !sale.is_cancelled() {
            tx.execute(
                "UPDATE transactions SET amount = ?3
                 WHERE reference_id = ?1 AND reference_type = ?2",
                params![id, ReferenceType::Sale, sale.total_price],
            )?;
        }

        let stored = get_sale_in(&tx, id)?;
        tx.commit()?;
        Ok(stored)
    }

    /// Delete a sale and its ledger row. Stock it consumed becomes available
    /// again.
    pub fn delete_sale(&self, id: Uuid) -> Result<(), KayuError> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let sale = get_sale_in(&tx, id)?;
        if let (Some(inventory_id), false) = (sale.inventory_id, sale.is_cancelled()) {
            set_item_status_in(&tx, inventory_id, InventoryStatus::Available)?;
        }
        delete_sale_ledger_in(&tx, id)?;
        tx.execute("DELETE FROM sales WHERE id = ?1", [id])?;
        tx.commit()?;
        tracing::info!("Deleted sale {id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::db::{test_db, Database};
    use crate::error::KayuError;
    use crate::models::{
        BatchIntake, InventoryItem, InventoryStatus, NewSale, SaleSource, SaleStatus, SaleUpdate,
        TransactionKind, WoodLogMeasurement, SALES_CATEGORY,
    };

    fn stocked(db: &Database) -> InventoryItem {
        db.create_batch(&BatchIntake {
            invoice_number: "BELI-01".to_string(),
            contact_id: None,
            wood_type: "Meranti".to_string(),
            total_invoice_price: 0.0,
            logs: vec![WoodLogMeasurement::new(400.0, 40.0, 40.0, 40.0, 40.0)],
        })
        .unwrap()
        .remove(0)
    }

    fn stock_sale(item: &InventoryItem, invoice: &str) -> NewSale {
        NewSale {
            invoice_number: invoice.to_string(),
            contact_id: None,
            source: SaleSource::Inventory { inventory_id: item.id },
            unit_price: 3_000_000.0,
            status: Some(SaleStatus::Completed),
            notes: None,
        }
    }

    #[test]
    fn test_stock_sale_marks_sold_and_writes_income() {
        let db = test_db();
        let item = stocked(&db);
        let sale = db.create_sale(&stock_sale(&item, "JUAL-01")).unwrap();

        assert_eq!(sale.net_volume, item.valuation.net_volume);
        assert_eq!(
            db.get_inventory_item(item.id).unwrap().status,
            InventoryStatus::Sold
        );
        let ledger = db.list_transactions().unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].kind, TransactionKind::Income);
        assert_eq!(ledger[0].category, SALES_CATEGORY);
        assert_eq!(ledger[0].amount, sale.total_price);
        assert_eq!(ledger[0].reference_id, Some(sale.id));
    }

    #[test]
    fn test_second_sale_of_same_log_fails() {
        let db = test_db();
        let item = stocked(&db);
        db.create_sale(&stock_sale(&item, "JUAL-01")).unwrap();
        let err = db.create_sale(&stock_sale(&item, "JUAL-02")).unwrap_err();
        assert!(matches!(err, KayuError::ValidationError(_)));
        assert_eq!(db.list_sales().unwrap().len(), 1);
        assert_eq!(db.list_transactions().unwrap().len(), 1);
    }

    #[test]
    fn test_manual_sale_keeps_measurement() {
        let db = test_db();
        let m = WoodLogMeasurement::new(300.0, 30.0, 31.0, 32.0, 33.0).with_gr(4.0);
        let sale = db
            .create_sale(&NewSale {
                invoice_number: "JUAL-M".to_string(),
                contact_id: None,
                source: SaleSource::Manual {
                    wood_type: "Kamper".to_string(),
                    measurement: m,
                },
                unit_price: 2_000_000.0,
                status: None,
                notes: Some("tunai".to_string()),
            })
            .unwrap();
        let fetched = db.get_sale(sale.id).unwrap();
        assert_eq!(fetched.measurement, Some(m));
        assert_eq!(fetched.valuation, Some(m.valuate()));
        assert_eq!(fetched.status, SaleStatus::Pending);
        assert_eq!(fetched.notes.as_deref(), Some("tunai"));
    }

    #[test]
    fn test_cancel_releases_stock() {
        let db = test_db();
        let item = stocked(&db);
        let sale = db.create_sale(&stock_sale(&item, "JUAL-01")).unwrap();
        let cancelled = db
            .update_sale(
                sale.id,
                &SaleUpdate {
                    status: Some(SaleStatus::Cancelled),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(cancelled.is_cancelled());
        assert!(db.get_inventory_item(item.id).unwrap().is_available());
        assert!(db.list_transactions().unwrap().is_empty());

        let reopen = db.update_sale(
            sale.id,
            &SaleUpdate {
                status: Some(SaleStatus::Completed),
                ..Default::default()
            },
        );
        assert!(matches!(reopen, Err(KayuError::ValidationError(_))));
    }

    #[test]
    fn test_cancelled_stock_sale_leaves_log_available() {
        let db = test_db();
        let item = stocked(&db);
        let mut new = stock_sale(&item, "JUAL-01");
        new.status = Some(SaleStatus::Cancelled);

        let err = db.create_sale(&new).unwrap_err();
        assert!(matches!(err, KayuError::ValidationError(_)));
        assert!(db.get_inventory_item(item.id).unwrap().is_available());
        assert!(db.list_sales().unwrap().is_empty());
        assert_eq!(db.list_transactions().unwrap().len(), 0);
    }

    #[test]
    fn test_price_change_updates_ledger() {
        let db = test_db();
        let item = stocked(&db);
        let sale = db.create_sale(&stock_sale(&item, "JUAL-01")).unwrap();
        let updated = db
            .update_sale(
                sale.id,
                &SaleUpdate {
                    unit_price: Some(4_000_000.0),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(db.list_transactions().unwrap()[0].amount, updated.total_price);
    }

    #[test]
    fn test_delete_sale() {
        let db = test_db();
        let item = stocked(&db);
        let sale = db.create_sale(&stock_sale(&item, "JUAL-01")).unwrap();
        db.delete_sale(sale.id).unwrap();
        assert!(db.list_sales().unwrap().is_empty());
        assert!(db.list_transactions().unwrap().is_empty());
        assert!(db.get_inventory_item(item.id).unwrap().is_available());
        assert!(matches!(db.delete_sale(sale.id), Err(KayuError::NotFound(_))));
    }
}
