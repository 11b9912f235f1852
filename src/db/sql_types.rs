//! SQLite storage for the status/kind enums.
//!
//! Each enum is stored as its lowercase `Display` string and read back through
//! `FromStr`.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

use crate::models::{
    ContactType, InventoryStatus, ReferenceType, Role, SaleStatus, TransactionKind, UserStatus,
};

macro_rules! text_enum_sql {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ToSql for $ty {
                fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                    Ok(ToSqlOutput::from(self.to_string()))
                }
            }

            impl FromSql for $ty {
                fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                    let s = value.as_str()?;
                    s.parse().map_err(|e: crate::error::KayuError| {
                        FromSqlError::Other(Box::new(std::io::Error::new(
                            std::io::ErrorKind::InvalidData,
                            e.to_string(),
                        )))
                    })
                }
            }
        )+
    };
}

text_enum_sql!(
    ContactType,
    InventoryStatus,
    SaleStatus,
    TransactionKind,
    ReferenceType,
    Role,
    UserStatus,
);
