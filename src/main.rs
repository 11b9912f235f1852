use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use kayulog::{
    analysis::{Period, Reporter},
    config::AppConfig,
    db::Database,
    io,
    models::{price_batch, BatchIntake, NewUser, Role, WoodLogMeasurement},
    visualization::{
        print_cash_flow_table, print_dashboard, print_expense_chart, print_expense_table,
        print_profit_loss_table, print_stock_chart, print_user_table, print_valuation_table,
    },
};

#[derive(Parser)]
#[command(
    name = "kayulog",
    about = "Log yard backend - log valuation, stock, sales and bookkeeping",
    version,
    author
)]
struct Cli {
    /// Path to a TOML config file (defaults to ./kayulog.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file, overriding the config
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Valuate a single log
    Calc {
        /// Log length (cm)
        #[arg(short, long)]
        length: f64,

        /// Four caliper diameters (cm)
        #[arg(short, long, num_args = 4, value_names = ["D1", "D2", "D3", "D4"])]
        diameters: Vec<f64>,

        /// Length trimmed off for defects (cm)
        #[arg(short, long, default_value = "0")]
        trim: f64,

        /// Diameter of the internal defect (cm)
        #[arg(short, long, default_value = "0")]
        gr: f64,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Price a CSV/XLSX log sheet against an invoice total
    Batch {
        /// Log sheet (.csv or .xlsx)
        #[arg(short, long)]
        input: PathBuf,

        /// Invoice total to spread across the logs
        #[arg(short, long, default_value = "0")]
        total: f64,

        /// Store the batch as inventory under this invoice number
        #[arg(long, requires = "wood_type")]
        invoice: Option<String>,

        /// Wood type of the stored batch
        #[arg(long, requires = "invoice")]
        wood_type: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Create the database and the first admin account
    Init,

    /// Show stock and bookkeeping headline figures
    Dashboard,

    /// Profit & loss, cash flow and expense reports
    Report {
        /// monthly or yearly
        #[arg(short, long, default_value = "monthly")]
        period: String,

        /// Write every report to an .xlsx workbook instead of printing
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export inventory (or sales) to CSV
    Export {
        #[arg(short, long)]
        output: PathBuf,

        /// Export sales instead of inventory
        #[arg(long)]
        sales: bool,
    },

    /// Write a JSON snapshot of all business data
    Backup {
        #[arg(short, long)]
        output: PathBuf,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Replace all business data with a JSON snapshot
    Restore {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Add a user account
    UserAdd {
        #[arg(long)]
        email: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        password: String,

        /// admin or cashier
        #[arg(long, default_value = "cashier")]
        role: String,
    },

    /// Start the JSON API server
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,
    },
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_database(config: &AppConfig) -> Result<Database> {
    let path = &config.database.path;
    Database::open(path).with_context(|| format!("opening database {}", path.display()))
}

fn read_log_sheet(path: &Path) -> Result<Vec<WoodLogMeasurement>> {
    let name = path.to_string_lossy();
    let reader = io::reader_for(&name)?;
    Ok(reader.read(path)?)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(db_path) = cli.database {
        config.database.path = db_path;
    }
    init_tracing(&config.logging.filter);

    match cli.command {
        Commands::Calc {
            length,
            diameters,
            trim,
            gr,
            json,
        } => {
            let [d1, d2, d3, d4] = diameters[..] else {
                anyhow::bail!("Expected exactly four diameters, got {}", diameters.len());
            };
            let log = WoodLogMeasurement::new(length, d1, d2, d3, d4)
                .with_trim(trim)
                .with_gr(gr);
            for issue in log.validate_all(0) {
                eprintln!("{}: {}", "Warning".yellow(), issue.message);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&log.valuate())?);
            } else {
                print_valuation_table(&price_batch(&[log], 0.0));
            }
        }

        Commands::Batch {
            input,
            total,
            invoice,
            wood_type,
            json,
        } => {
            let logs = read_log_sheet(&input)?;

            if let (Some(invoice_number), Some(wood_type)) = (invoice, wood_type) {
                let db = open_database(&config)?;
                let items = db.create_batch(&BatchIntake {
                    invoice_number,
                    contact_id: None,
                    wood_type,
                    total_invoice_price: total,
                    logs: logs.clone(),
                })?;
                eprintln!(
                    "{} Stored {} logs in {}",
                    "Success:".green().bold(),
                    items.len(),
                    config.database.path.display()
                );
            }

            let priced = price_batch(&logs, total);
            if json {
                println!("{}", serde_json::to_string_pretty(&priced)?);
            } else {
                println!(
                    "\n{}",
                    format!("Batch: {}", input.display()).bold().cyan()
                );
                print_valuation_table(&priced);
            }
        }

        Commands::Init => {
            let db = open_database(&config)?;
            let info = db.info()?;
            println!(
                "{} Database ready at {} (schema v{})",
                "Success:".green().bold(),
                config.database.path.display(),
                info.schema_version
            );
            match db.bootstrap_admin(
                &config.auth.bootstrap_admin_email,
                &config.auth.bootstrap_admin_password,
            )? {
                Some(admin) => println!(
                    "  Created admin {} - change its password after first login",
                    admin.email.bold()
                ),
                None => println!("  Users already exist; no admin created"),
            }
        }

        Commands::Dashboard => {
            let db = open_database(&config)?;
            let snapshot = db.snapshot()?;
            let stats = Reporter::new(&snapshot).dashboard();
            println!("\n{}", config.company.name.bold().cyan());
            print_dashboard(&stats);
            print_stock_chart(&stats.stock_by_type);
        }

        Commands::Report { period, output } => {
            let period: Period = period.parse()?;
            let db = open_database(&config)?;
            let snapshot = db.snapshot()?;
            let bundle = Reporter::new(&snapshot).bundle(period);

            match output {
                Some(path) => {
                    io::write_report_excel(&bundle, &config.company.name, &path)?;
                    println!(
                        "{} Wrote {period} report to {}",
                        "Success:".green().bold(),
                        path.display()
                    );
                }
                None => {
                    print_profit_loss_table(&bundle.profit_loss, Some(&bundle.profit_loss_total));
                    print_cash_flow_table(&bundle.cash_flow);
                    print_expense_table(&bundle.expenses);
                    print_expense_chart(&bundle.expenses);
                }
            }
        }

        Commands::Export { output, sales } => {
            let db = open_database(&config)?;
            let count = if sales {
                let rows = db.list_sales()?;
                io::write_sales_csv(&rows, &output)?;
                rows.len()
            } else {
                let rows = db.list_inventory()?;
                io::write_inventory_csv(&rows, &output)?;
                rows.len()
            };
            println!(
                "{} Exported {count} rows to {}",
                "Success:".green().bold(),
                output.display()
            );
        }

        Commands::Backup { output, pretty } => {
            let db = open_database(&config)?;
            let snapshot = db.snapshot()?;
            io::write_backup(&snapshot, &output, pretty)?;
            println!(
                "{} Backed up {} records to {}",
                "Success:".green().bold(),
                snapshot.num_records(),
                output.display()
            );
        }

        Commands::Restore { input } => {
            let snapshot = io::read_backup(&input)?;
            let db = open_database(&config)?;
            db.restore(&snapshot)?;
            println!(
                "{} Restored {} records from {}",
                "Success:".green().bold(),
                snapshot.num_records(),
                input.display()
            );
        }

        Commands::UserAdd {
            email,
            name,
            password,
            role,
        } => {
            let role: Role = role.parse()?;
            let db = open_database(&config)?;
            let user = db.create_user(&NewUser {
                email,
                name,
                role,
                password,
                status: None,
            })?;
            println!(
                "{} Created {} user {}",
                "Success:".green().bold(),
                user.role,
                user.email
            );
            print_user_table(&db.list_users()?);
        }

        #[cfg(feature = "web")]
        Commands::Serve { port, host } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }
            let db = open_database(&config)?;
            if db
                .bootstrap_admin(
                    &config.auth.bootstrap_admin_email,
                    &config.auth.bootstrap_admin_password,
                )?
                .is_some()
            {
                tracing::warn!("No users found; bootstrap admin account created");
            }
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(kayulog::web::start_server(config, db))?;
        }
    }

    Ok(())
}
