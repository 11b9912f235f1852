use assert_approx_eq::assert_approx_eq;
use proptest::prelude::*;

use kayulog::{
    analysis::{cash_flow, compute_dashboard, expense_breakdown, profit_loss, Period, Reporter},
    auth::{authorize, SessionStore},
    db::Database,
    error::KayuError,
    io,
    models::{
        allocate_batch_pricing, average_diameter, effective_length, gr_volume, gross_volume,
        net_volume, price_batch, BatchIntake, ContactType, InventoryStatus, NewContact,
        NewExpense, NewSale, NewUser, Permission, Role, SaleSource, SaleStatus, SaleUpdate,
        TransactionKind, WoodLogMeasurement,
    },
};

fn test_db() -> Database {
    Database::open_in_memory().unwrap().with_hash_cost(4)
}

fn sample_batch(invoice: &str, contact_id: Option<uuid::Uuid>) -> BatchIntake {
    BatchIntake {
        invoice_number: invoice.to_string(),
        contact_id,
        wood_type: "Meranti".to_string(),
        total_invoice_price: 3_000_000.0,
        logs: vec![
            WoodLogMeasurement::new(400.0, 42.0, 44.0, 43.0, 45.0).with_trim(10.0),
            WoodLogMeasurement::new(380.0, 40.0, 41.0, 42.0, 43.0).with_gr(5.0),
            WoodLogMeasurement::new(300.0, 30.0, 30.0, 30.0, 30.0),
        ],
    }
}

// ---------------------------------------------------------------------------
// Valuation engine
// ---------------------------------------------------------------------------

#[test]
fn test_reference_log() {
    let avg = average_diameter(42.0, 44.0, 43.0, 45.0);
    assert_eq!(avg, 43.5);
    let eff = effective_length(400.0, 10.0);
    assert_eq!(eff, 390.0);
    assert_approx_eq!(gross_volume(avg, eff), 57.96075285, 1e-8);
    assert_approx_eq!(gr_volume(5.0, 380.0), 0.74613, 1e-5);
    assert_eq!(gr_volume(0.0, 380.0), 0.0);
}

#[test]
fn test_net_volume_not_clamped() {
    let m = WoodLogMeasurement::new(100.0, 10.0, 10.0, 10.0, 10.0).with_gr(20.0);
    let v = m.valuate();
    assert!(v.net_volume < 0.0);
    assert_eq!(v.net_volume, v.gross_volume - v.gr_volume);
}

#[test]
fn test_batch_pricing_examples() {
    let pricing = allocate_batch_pricing(&[0.5, 0.5], 1_000_000.0);
    assert_eq!(pricing.unit_price, 1_000_000.0);
    assert_eq!(pricing.per_log_value, vec![500_000.0, 500_000.0]);

    let empty = allocate_batch_pricing(&[0.0, 0.0], 1_000_000.0);
    assert_eq!(empty.unit_price, 0.0);
    assert_eq!(empty.per_log_value, vec![0.0, 0.0]);
}

proptest! {
    #[test]
    fn prop_equal_diameters_average_exactly(d in 0.1f64..500.0) {
        prop_assert_eq!(average_diameter(d, d, d, d), d);
    }

    #[test]
    fn prop_net_is_gross_minus_gr(
        length in 1.0f64..2000.0,
        d in 1.0f64..200.0,
        trim in 0.0f64..100.0,
        gr in 0.0f64..100.0,
    ) {
        let v = WoodLogMeasurement::new(length, d, d, d, d).with_trim(trim).with_gr(gr).valuate();
        prop_assert_eq!(v.net_volume, v.gross_volume - v.gr_volume);
        prop_assert_eq!(v.effective_length, length - trim);
    }

    #[test]
    fn prop_valuation_is_deterministic(
        length in 1.0f64..2000.0,
        d1 in 1.0f64..200.0,
        d2 in 1.0f64..200.0,
        gr in 0.0f64..50.0,
    ) {
        let m = WoodLogMeasurement::new(length, d1, d2, d1, d2).with_gr(gr);
        let a = m.valuate();
        let b = m.valuate();
        prop_assert_eq!(a.net_volume.to_bits(), b.net_volume.to_bits());
        prop_assert_eq!(a.gross_volume.to_bits(), b.gross_volume.to_bits());
    }

    #[test]
    fn prop_batch_values_sum_to_invoice(
        volumes in prop::collection::vec(0.01f64..10.0, 1..20),
        total in 1.0f64..1e9,
    ) {
        let pricing = allocate_batch_pricing(&volumes, total);
        let sum: f64 = pricing.per_log_value.iter().sum();
        prop_assert!((sum - total).abs() <= total * 1e-9);
    }
}

// ---------------------------------------------------------------------------
// Database flows
// ---------------------------------------------------------------------------

#[test]
fn test_intake_sale_and_dashboard() {
    let db = test_db();
    let supplier = db
        .create_contact(&NewContact {
            name: "CV. Hutan Jaya".to_string(),
            contact_type: ContactType::Supplier,
            email: None,
            phone: None,
            address: None,
            balance: 0.0,
        })
        .unwrap();

    let items = db.create_batch(&sample_batch("BELI-100", Some(supplier.id))).unwrap();
    assert_eq!(items.len(), 3);
    let total: f64 = items.iter().map(|i| i.total_value).sum();
    assert_approx_eq!(total, 3_000_000.0, 1e-6);
    assert!(items.iter().all(|i| i.contact_name.as_deref() == Some("CV. Hutan Jaya")));

    let sale = db
        .create_sale(&NewSale {
            invoice_number: "JUAL-100".to_string(),
            contact_id: None,
            source: SaleSource::Inventory {
                inventory_id: items[0].id,
            },
            unit_price: 5_000_000.0,
            status: Some(SaleStatus::Paid),
            notes: None,
        })
        .unwrap();
    assert_eq!(sale.net_volume, items[0].valuation.net_volume);
    assert_eq!(
        db.get_inventory_item(items[0].id).unwrap().status,
        InventoryStatus::Sold
    );

    let again = db.create_sale(&NewSale {
        invoice_number: "JUAL-101".to_string(),
        contact_id: None,
        source: SaleSource::Inventory {
            inventory_id: items[0].id,
        },
        unit_price: 5_000_000.0,
        status: None,
        notes: None,
    });
    assert!(matches!(again, Err(KayuError::ValidationError(_))));

    let stats = compute_dashboard(&db.snapshot().unwrap());
    assert_eq!(stats.available_logs, 2);
    assert_approx_eq!(
        stats.total_stock_volume,
        items[1].valuation.net_volume + items[2].valuation.net_volume,
        1e-12
    );
    assert_eq!(stats.total_sales, 1);
}

#[test]
fn test_cancelled_sale_releases_stock() {
    let db = test_db();
    let items = db.create_batch(&sample_batch("BELI-200", None)).unwrap();
    let sale = db
        .create_sale(&NewSale {
            invoice_number: "JUAL-200".to_string(),
            contact_id: None,
            source: SaleSource::Inventory {
                inventory_id: items[1].id,
            },
            unit_price: 4_000_000.0,
            status: None,
            notes: None,
        })
        .unwrap();

    db.update_sale(
        sale.id,
        &SaleUpdate {
            status: Some(SaleStatus::Cancelled),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(db.get_inventory_item(items[1].id).unwrap().is_available());

    let snapshot = db.snapshot().unwrap();
    assert!(profit_loss(&snapshot, Period::Yearly).is_empty());
    // Only the purchase row is left in the ledger.
    assert_eq!(snapshot.transactions.len(), 1);
    assert_eq!(snapshot.transactions[0].kind, TransactionKind::Expense);
}

#[test]
fn test_manual_sale_and_reports() {
    let db = test_db();
    db.create_sale(&NewSale {
        invoice_number: "JUAL-300".to_string(),
        contact_id: None,
        source: SaleSource::Manual {
            wood_type: "Jati".to_string(),
            measurement: WoodLogMeasurement::new(200.0, 50.0, 50.0, 50.0, 50.0),
        },
        unit_price: 10_000_000.0,
        status: Some(SaleStatus::Paid),
        notes: Some("walk-in".to_string()),
    })
    .unwrap();
    db.create_expense(NewExpense {
        category: "Transport".to_string(),
        amount: 200_000.0,
        description: None,
        date: None,
    })
    .unwrap();
    db.create_expense(NewExpense {
        category: "Fuel".to_string(),
        amount: 600_000.0,
        description: Some("solar".to_string()),
        date: None,
    })
    .unwrap();

    let snapshot = db.snapshot().unwrap();
    let pl = profit_loss(&snapshot, Period::Monthly);
    assert_eq!(pl.len(), 1);
    let revenue = 0.7854 * 2500.0 * 200.0 / 10_000.0 * 10_000_000.0;
    assert_approx_eq!(pl[0].revenue, revenue, 1e-3);
    assert_eq!(pl[0].cogs, 0.0);
    assert_approx_eq!(pl[0].net_profit, revenue - 800_000.0, 1e-3);

    let flow = cash_flow(&snapshot, Period::Monthly);
    assert_eq!(flow.len(), 1);
    assert_approx_eq!(flow[0].outflow, 800_000.0, 1e-9);

    let breakdown = expense_breakdown(&snapshot);
    assert_eq!(breakdown[0].category, "Fuel");
    assert_approx_eq!(breakdown[0].percent, 75.0, 1e-9);
}

#[test]
fn test_backup_file_restores_into_new_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("backup.json");

    let source = test_db();
    source.create_batch(&sample_batch("BELI-400", None)).unwrap();
    io::write_backup(&source.snapshot().unwrap(), &path, false).unwrap();

    let target = Database::open(dir.path().join("restored.db")).unwrap();
    target.restore(&io::read_backup(&path).unwrap()).unwrap();
    assert_eq!(target.list_inventory().unwrap().len(), 3);
    assert_eq!(target.list_transactions().unwrap().len(), 1);
}

#[test]
fn test_report_bundle_to_xlsx() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.xlsx");
    let db = test_db();
    db.create_batch(&sample_batch("BELI-500", None)).unwrap();

    let snapshot = db.snapshot().unwrap();
    let bundle = Reporter::new(&snapshot).bundle(Period::Monthly);
    io::write_report_excel(&bundle, "PT. Uji", &path).unwrap();
    assert!(std::fs::metadata(&path).unwrap().len() > 0);
}

// ---------------------------------------------------------------------------
// Log sheets
// ---------------------------------------------------------------------------

#[test]
fn test_log_sheet_to_priced_batch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logs.csv");
    std::fs::write(
        &path,
        "length,d1,d2,d3,d4,trim,gr\n400,42,44,43,45,10,\n380,40,41,42,43,,5\n",
    )
    .unwrap();

    let logs = kayulog::reader_for("logs.csv").unwrap().read(&path).unwrap();
    let priced = price_batch(&logs, 2_000_000.0);
    assert_eq!(priced.len(), 2);
    assert_approx_eq!(priced[0].valuation.gross_volume, 57.96075285, 1e-8);
    let sum: f64 = priced.iter().map(|p| p.total_value).sum();
    assert_approx_eq!(sum, 2_000_000.0, 1e-6);
    assert_approx_eq!(
        priced[1].valuation.net_volume,
        net_volume(priced[1].valuation.gross_volume, 0.7854 * 25.0 * 380.0 / 10_000.0),
        1e-12
    );
}

// ---------------------------------------------------------------------------
// Users and sessions
// ---------------------------------------------------------------------------

#[test]
fn test_login_and_permissions() {
    let db = test_db();
    db.bootstrap_admin("admin@kayulog.com", "admin123").unwrap();
    let cashier = db
        .create_user(&NewUser {
            email: "kasir@kayulog.com".to_string(),
            name: "Kasir".to_string(),
            role: Role::Cashier,
            password: "kasir123".to_string(),
            status: None,
        })
        .unwrap();

    let sessions = SessionStore::new(std::time::Duration::from_secs(60), 10);
    let outcome = sessions.login(&db, "KASIR@kayulog.com", "kasir123").unwrap();
    assert_eq!(outcome.user.id, cashier.id);
    assert!(sessions.resolve(&outcome.token).is_some());

    assert!(authorize(&cashier, Permission::SalesAdd).is_ok());
    assert!(matches!(
        authorize(&cashier, Permission::InventoryAdd),
        Err(KayuError::Forbidden(_))
    ));

    let admin = db.find_user_by_email("admin@kayulog.com").unwrap().unwrap();
    for p in Permission::ALL {
        assert!(authorize(&admin, p).is_ok());
    }

    assert!(matches!(
        sessions.login(&db, "kasir@kayulog.com", "wrong-pass"),
        Err(KayuError::Unauthorized(_))
    ));
}
