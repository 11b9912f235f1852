use chrono::Utc;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::{not_found, Database};
use crate::error::KayuError;
use crate::models::{Contact, ContactUpdate, NewContact};

const SELECT_CONTACT: &str = "SELECT id, name, contact_type, email, phone, address, balance,
        created_at, updated_at FROM contacts";

fn contact_from_row(row: &Row<'_>) -> rusqlite::Result<Contact> {
    Ok(Contact {
        id: row.get("id")?,
        name: row.get("name")?,
        contact_type: row.get("contact_type")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        address: row.get("address")?,
        balance: row.get("balance")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub(super) fn insert_contact_in(conn: &Connection, c: &Contact) -> Result<(), KayuError> {
    conn.execute(
        "INSERT INTO contacts (id, name, contact_type, email, phone, address, balance,
            created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            c.id,
            c.name,
            c.contact_type,
            c.email,
            c.phone,
            c.address,
            c.balance,
            c.created_at,
            c.updated_at
        ],
    )?;
    Ok(())
}

pub(super) fn get_contact_in(conn: &Connection, id: Uuid) -> Result<Contact, KayuError> {
    conn.query_row(
        &format!("{SELECT_CONTACT} WHERE id = ?1"),
        [id],
        contact_from_row,
    )
    .map_err(not_found("Contact", id))
}

pub(super) fn list_contacts_in(conn: &Connection) -> Result<Vec<Contact>, KayuError> {
    let mut stmt = conn.prepare(&format!("{SELECT_CONTACT} ORDER BY created_at DESC"))?;
    let rows = stmt.query_map([], contact_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Fail with `NotFound` unless the contact exists.
pub(super) fn ensure_contact_in(conn: &Connection, id: Option<Uuid>) -> Result<(), KayuError> {
    if let Some(id) = id {
        get_contact_in(conn, id)?;
    }
    Ok(())
}

impl Database {
    pub fn create_contact(&self, new: &NewContact) -> Result<Contact, KayuError> {
        new.validate()?;
        let now = Utc::now();
        let contact = Contact {
            id: Uuid::new_v4(),
            name: new.name.trim().to_string(),
            contact_type: new.contact_type,
            email: new.email.clone(),
            phone: new.phone.clone(),
            address: new.address.clone(),
            balance: new.balance,
            created_at: now,
            updated_at: now,
        };
        insert_contact_in(&self.conn(), &contact)?;
        tracing::info!("Created {} contact '{}'", contact.contact_type, contact.name);
        Ok(contact)
    }

    /// All contacts, newest first.
    pub fn list_contacts(&self) -> Result<Vec<Contact>, KayuError> {
        list_contacts_in(&self.conn())
    }

    pub fn get_contact(&self, id: Uuid) -> Result<Contact, KayuError> {
        get_contact_in(&self.conn(), id)
    }

    pub fn update_contact(&self, id: Uuid, update: &ContactUpdate) -> Result<Contact, KayuError> {
        let conn = self.conn();
        let mut contact = get_contact_in(&conn, id)?;
        update.apply(&mut contact);
        if contact.name.trim().is_empty() {
            return Err(KayuError::ValidationError(
                "Contact name must not be empty".to_string(),
            ));
        }
        if !contact.balance.is_finite() {
            return Err(KayuError::ValidationError(
                "Contact balance must be a finite number".to_string(),
            ));
        }
        contact.updated_at = Utc::now();
        conn.execute(
            "UPDATE contacts SET name = ?2, contact_type = ?3, email = ?4, phone = ?5,
                address = ?6, balance = ?7, updated_at = ?8
             WHERE id = ?1",
            params![
                contact.id,
                contact.name,
                contact.contact_type,
                contact.email,
                contact.phone,
                contact.address,
                contact.balance,
                contact.updated_at
            ],
        )?;
        Ok(contact)
    }

    /// Delete a contact. Inventory, sales and ledger rows keep their data but
    /// lose the link.
    pub fn delete_contact(&self, id: Uuid) -> Result<(), KayuError> {
        let affected = self.conn().execute("DELETE FROM contacts WHERE id = ?1", [id])?;
        if affected == 0 {
            return Err(KayuError::NotFound(format!("Contact {id} not found")));
        }
        tracing::info!("Deleted contact {id}");
        Ok(())
    }
}
