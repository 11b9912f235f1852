use actix_multipart::Multipart;
use actix_web::http::{header, StatusCode};
use actix_web::{web, HttpRequest, HttpResponse};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{Period, Reporter};
use crate::auth::{authorize, parse_bearer};
use crate::config::CompanyConfig;
use crate::db::DatabaseInfo;
use crate::error::KayuError;
use crate::io;
use crate::models::{
    price_batch, suggested_unit_price, BatchIntake, ContactUpdate, InventoryItem,
    InventoryUpdate, NewContact, NewExpense, NewSale, NewUser, Permission, PricedLog, SaleUpdate,
    Snapshot, User, UserStatus, UserUpdate, ValidationIssue, WoodLogMeasurement, WoodLogValuation,
    DEFAULT_EXPENSE_CATEGORIES, KNOWN_WOOD_TYPES,
};

use super::state::AppState;

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

// ---------------------------------------------------------------------------
// Response envelope and error wrapper
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse {
        success: true,
        data: Some(data),
        message: None,
    })
}

fn created<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Created().json(ApiResponse {
        success: true,
        data: Some(data),
        message: None,
    })
}

fn done(message: impl Into<String>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::<()> {
        success: true,
        data: None,
        message: Some(message.into()),
    })
}

#[derive(Debug, Serialize, Deserialize)]
struct ErrorBody {
    success: bool,
    error: String,
    message: String,
}

#[derive(Debug)]
pub(crate) struct WebError(KayuError);

impl From<KayuError> for WebError {
    fn from(e: KayuError) -> Self {
        WebError(e)
    }
}

impl std::fmt::Display for WebError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl actix_web::ResponseError for WebError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            KayuError::ValidationError(_)
            | KayuError::ParseError(_)
            | KayuError::Csv(_)
            | KayuError::Json(_)
            | KayuError::Excel(_) => StatusCode::BAD_REQUEST,
            KayuError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            KayuError::Forbidden(_) => StatusCode::FORBIDDEN,
            KayuError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }
        HttpResponse::build(status).json(ErrorBody {
            success: false,
            error: status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            message: self.0.to_string(),
        })
    }
}

/// Malformed JSON bodies get the same error envelope as everything else.
pub(crate) fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| WebError(KayuError::ParseError(err.to_string())).into())
}

// ---------------------------------------------------------------------------
// Authentication helpers
// ---------------------------------------------------------------------------

fn bearer_token(req: &HttpRequest) -> Result<Uuid, WebError> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_bearer)
        .ok_or_else(|| {
            WebError(KayuError::Unauthorized(
                "Missing or malformed bearer token".to_string(),
            ))
        })
}

/// Resolve the caller's session to a current, active user.
fn current_user(req: &HttpRequest, state: &AppState) -> Result<User, WebError> {
    let token = bearer_token(req)?;
    let session = state
        .sessions
        .resolve(&token)
        .ok_or_else(|| {
            WebError(KayuError::Unauthorized(
                "Session expired or invalid".to_string(),
            ))
        })?;
    let user = state.db.get_user(session.user_id).map_err(|e| match e {
        KayuError::NotFound(_) => KayuError::Unauthorized("Account no longer exists".to_string()),
        other => other,
    })?;
    if !user.is_active() {
        state.sessions.revoke_user(&user.id);
        return Err(WebError(KayuError::Unauthorized("Account is inactive".to_string())));
    }
    Ok(user)
}

/// Authenticate the caller and check one permission.
fn require(req: &HttpRequest, state: &AppState, permission: Permission) -> Result<User, WebError> {
    let user = current_user(req, state)?;
    authorize(&user, permission)?;
    Ok(user)
}

/// Sanitize a filename for use in Content-Disposition headers.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_' || *c == '.' || *c == ' ')
        .collect::<String>()
        .replace("..", "")
}

fn attachment(
    content_type: impl header::TryIntoHeaderValue,
    file_name: &str,
    body: impl actix_web::body::MessageBody + 'static,
) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(content_type)
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", sanitize_filename(file_name)),
        ))
        .body(body)
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct MeResponse {
    user: User,
    permissions: Vec<Permission>,
}

pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, WebError> {
    let outcome = state.sessions.login(&state.db, &body.email, &body.password)?;
    tracing::info!("{} logged in", outcome.user.email);
    Ok(ok(outcome))
}

pub async fn logout(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, WebError> {
    let token = bearer_token(&req)?;
    if !state.sessions.logout(&token) {
        return Err(WebError(KayuError::Unauthorized("Session expired or invalid".to_string())));
    }
    Ok(done("Logged out"))
}

pub async fn me(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, WebError> {
    let user = current_user(&req, &state)?;
    Ok(ok(MeResponse {
        permissions: user.role.permissions().to_vec(),
        user,
    }))
}

// ---------------------------------------------------------------------------
// Valuation previews
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CalculateRequest {
    Batch {
        logs: Vec<WoodLogMeasurement>,
        #[serde(default)]
        total_invoice_price: f64,
    },
    Single(WoodLogMeasurement),
}

#[derive(Debug, Serialize, Deserialize)]
struct LogPreview {
    measurement: WoodLogMeasurement,
    valuation: WoodLogValuation,
    issues: Vec<ValidationIssue>,
}

#[derive(Debug, Serialize, Deserialize)]
struct BatchPreview {
    unit_price: f64,
    total_volume: f64,
    total_value: f64,
    logs: Vec<PricedLog>,
    issues: Vec<ValidationIssue>,
}

impl BatchPreview {
    fn build(
        logs: &[WoodLogMeasurement],
        total_invoice_price: f64,
        issues: Vec<ValidationIssue>,
    ) -> Self {
        let priced = price_batch(logs, total_invoice_price);
        Self {
            unit_price: priced.first().map(|p| p.unit_price).unwrap_or(0.0),
            total_volume: priced.iter().map(|p| p.valuation.net_volume).sum(),
            total_value: priced.iter().map(|p| p.total_value).sum(),
            logs: priced,
            issues,
        }
    }
}

/// Valuate one log or price a batch without storing anything.
pub async fn calculate(body: web::Json<CalculateRequest>) -> HttpResponse {
    match body.into_inner() {
        CalculateRequest::Single(measurement) => ok(LogPreview {
            valuation: measurement.valuate(),
            issues: measurement.validate_all(0),
            measurement,
        }),
        CalculateRequest::Batch {
            logs,
            total_invoice_price,
        } => {
            let issues = logs
                .iter()
                .enumerate()
                .flat_map(|(i, log)| log.validate_all(i))
                .collect();
            ok(BatchPreview::build(&logs, total_invoice_price, issues))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    total_invoice_price: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct UploadPreview {
    file_name: String,
    has_errors: bool,
    #[serde(flatten)]
    batch: BatchPreview,
}

/// Parse an uploaded CSV/XLSX log sheet and price it, reporting every bad row.
pub async fn upload_logs(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<UploadQuery>,
    mut payload: Multipart,
) -> Result<HttpResponse, WebError> {
    require(&req, &state, Permission::InventoryAdd)?;

    if let Some(Ok(mut field)) = payload.next().await {
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|s| s.to_string()))
            .unwrap_or_else(|| "unknown".to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| KayuError::ParseError(format!("Upload failed: {e}")))?;
            bytes.extend_from_slice(&chunk);
        }

        let reader = io::reader_for(&file_name)?;
        let (logs, issues) = reader.parse_lenient(&bytes)?;
        tracing::info!(
            "Parsed log sheet {file_name}: {} rows, {} issues",
            logs.len(),
            issues.len()
        );

        return Ok(ok(UploadPreview {
            file_name,
            has_errors: !issues.is_empty(),
            batch: BatchPreview::build(&logs, query.total_invoice_price.unwrap_or(0.0), issues),
        }));
    }

    Err(WebError(KayuError::ValidationError("No file uploaded".to_string())))
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// A stock row plus the selling price suggested by the configured markup.
#[derive(Debug, Serialize, Deserialize)]
struct StockView {
    #[serde(flatten)]
    item: InventoryItem,
    suggested_unit_price: f64,
}

impl StockView {
    fn new(item: InventoryItem, markup: f64) -> Self {
        Self {
            suggested_unit_price: suggested_unit_price(item.unit_price, markup),
            item,
        }
    }
}

pub async fn list_inventory(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, WebError> {
    require(&req, &state, Permission::InventoryView)?;
    let markup = state.config.company.markup;
    let items: Vec<StockView> = state
        .db
        .list_inventory()?
        .into_iter()
        .map(|item| StockView::new(item, markup))
        .collect();
    Ok(ok(items))
}

pub async fn create_batch(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<BatchIntake>,
) -> Result<HttpResponse, WebError> {
    let user = require(&req, &state, Permission::InventoryAdd)?;
    let items = state.db.create_batch(&body)?;
    tracing::info!(
        "{} recorded batch {} ({} logs)",
        user.email,
        body.invoice_number,
        items.len()
    );
    Ok(created(items))
}

pub async fn get_inventory_item(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, WebError> {
    require(&req, &state, Permission::InventoryView)?;
    let item = state.db.get_inventory_item(path.into_inner())?;
    Ok(ok(StockView::new(item, state.config.company.markup)))
}

pub async fn update_inventory_item(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<InventoryUpdate>,
) -> Result<HttpResponse, WebError> {
    require(&req, &state, Permission::InventoryEdit)?;
    Ok(ok(state.db.update_inventory_item(path.into_inner(), &body)?))
}

pub async fn delete_inventory_item(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, WebError> {
    require(&req, &state, Permission::InventoryDelete)?;
    state.db.delete_inventory_item(path.into_inner())?;
    Ok(done("Inventory item deleted"))
}

pub async fn export_inventory(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, WebError> {
    require(&req, &state, Permission::ReportsExport)?;
    let data = io::inventory_csv_bytes(&state.db.list_inventory()?)?;
    Ok(attachment(mime::TEXT_CSV, "inventory.csv", data))
}

// ---------------------------------------------------------------------------
// Sales
// ---------------------------------------------------------------------------

pub async fn list_sales(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, WebError> {
    require(&req, &state, Permission::SalesView)?;
    Ok(ok(state.db.list_sales()?))
}

pub async fn create_sale(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<NewSale>,
) -> Result<HttpResponse, WebError> {
    let user = require(&req, &state, Permission::SalesAdd)?;
    let sale = state.db.create_sale(&body)?;
    tracing::info!("{} recorded sale {}", user.email, sale.invoice_number);
    Ok(created(sale))
}

pub async fn get_sale(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, WebError> {
    require(&req, &state, Permission::SalesView)?;
    Ok(ok(state.db.get_sale(path.into_inner())?))
}

pub async fn update_sale(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<SaleUpdate>,
) -> Result<HttpResponse, WebError> {
    require(&req, &state, Permission::SalesEdit)?;
    Ok(ok(state.db.update_sale(path.into_inner(), &body)?))
}

pub async fn delete_sale(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, WebError> {
    require(&req, &state, Permission::SalesDelete)?;
    state.db.delete_sale(path.into_inner())?;
    Ok(done("Sale deleted"))
}

// ---------------------------------------------------------------------------
// Contacts
// ---------------------------------------------------------------------------

pub async fn list_contacts(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, WebError> {
    require(&req, &state, Permission::ContactsView)?;
    Ok(ok(state.db.list_contacts()?))
}

pub async fn create_contact(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<NewContact>,
) -> Result<HttpResponse, WebError> {
    require(&req, &state, Permission::ContactsAdd)?;
    Ok(created(state.db.create_contact(&body)?))
}

pub async fn get_contact(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, WebError> {
    require(&req, &state, Permission::ContactsView)?;
    Ok(ok(state.db.get_contact(path.into_inner())?))
}

pub async fn update_contact(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<ContactUpdate>,
) -> Result<HttpResponse, WebError> {
    require(&req, &state, Permission::ContactsEdit)?;
    Ok(ok(state.db.update_contact(path.into_inner(), &body)?))
}

pub async fn delete_contact(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, WebError> {
    require(&req, &state, Permission::ContactsDelete)?;
    state.db.delete_contact(path.into_inner())?;
    Ok(done("Contact deleted"))
}

// ---------------------------------------------------------------------------
// Expenses and ledger
// ---------------------------------------------------------------------------

pub async fn list_expenses(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, WebError> {
    require(&req, &state, Permission::ExpensesView)?;
    Ok(ok(state.db.list_expenses()?))
}

pub async fn create_expense(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<NewExpense>,
) -> Result<HttpResponse, WebError> {
    require(&req, &state, Permission::ExpensesAdd)?;
    Ok(created(state.db.create_expense(body.into_inner())?))
}

pub async fn delete_expense(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, WebError> {
    require(&req, &state, Permission::ExpensesDelete)?;
    state.db.delete_expense(path.into_inner())?;
    Ok(done("Expense deleted"))
}

pub async fn list_transactions(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, WebError> {
    require(&req, &state, Permission::ReportsView)?;
    Ok(ok(state.db.list_transactions()?))
}

// ---------------------------------------------------------------------------
// Dashboard and reports
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    period: Option<String>,
}

impl PeriodQuery {
    fn period(&self) -> Result<Period, KayuError> {
        self.period
            .as_deref()
            .map(str::parse::<Period>)
            .transpose()
            .map(Option::unwrap_or_default)
    }
}

pub async fn dashboard(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, WebError> {
    require(&req, &state, Permission::DashboardView)?;
    let snapshot = state.db.snapshot()?;
    Ok(ok(Reporter::new(&snapshot).dashboard()))
}

pub async fn profit_loss_report(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<PeriodQuery>,
) -> Result<HttpResponse, WebError> {
    require(&req, &state, Permission::ReportsView)?;
    let period = query.period()?;
    let snapshot = state.db.snapshot()?;
    Ok(ok(Reporter::new(&snapshot).profit_loss(period)))
}

pub async fn cash_flow_report(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<PeriodQuery>,
) -> Result<HttpResponse, WebError> {
    require(&req, &state, Permission::ReportsView)?;
    let period = query.period()?;
    let snapshot = state.db.snapshot()?;
    Ok(ok(Reporter::new(&snapshot).cash_flow(period)))
}

pub async fn expense_report(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, WebError> {
    require(&req, &state, Permission::ReportsView)?;
    let snapshot = state.db.snapshot()?;
    Ok(ok(Reporter::new(&snapshot).expense_breakdown()))
}

/// Every report for a period as one XLSX workbook.
pub async fn export_reports(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<PeriodQuery>,
) -> Result<HttpResponse, WebError> {
    require(&req, &state, Permission::ReportsExport)?;
    let period = query.period()?;
    let snapshot = state.db.snapshot()?;
    let bundle = Reporter::new(&snapshot).bundle(period);
    let data = io::report_excel_bytes(&bundle, &state.config.company.name)?;
    Ok(attachment(
        XLSX_CONTENT_TYPE,
        &format!("report-{period}.xlsx"),
        data,
    ))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

pub async fn list_users(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, WebError> {
    require(&req, &state, Permission::UsersView)?;
    Ok(ok(state.db.list_users()?))
}

pub async fn create_user(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<NewUser>,
) -> Result<HttpResponse, WebError> {
    let admin = require(&req, &state, Permission::UsersAdd)?;
    let user = state.db.create_user(&body)?;
    tracing::info!("{} created user {} ({})", admin.email, user.email, user.role);
    Ok(created(user))
}

pub async fn update_user(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UserUpdate>,
) -> Result<HttpResponse, WebError> {
    require(&req, &state, Permission::UsersEdit)?;
    let user = state.db.update_user(path.into_inner(), &body)?;
    if body.password.is_some() || user.status == UserStatus::Inactive {
        state.sessions.revoke_user(&user.id);
    }
    Ok(ok(user))
}

pub async fn delete_user(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, WebError> {
    let admin = require(&req, &state, Permission::UsersDelete)?;
    let id = path.into_inner();
    if id == admin.id {
        return Err(WebError(KayuError::ValidationError(
            "You cannot delete your own account".to_string(),
        )));
    }
    state.db.delete_user(id)?;
    state.sessions.revoke_user(&id);
    Ok(done("User deleted"))
}

// ---------------------------------------------------------------------------
// Settings, backup and health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct SettingsView<'a> {
    company: &'a CompanyConfig,
    database: DatabaseInfo,
    session_ttl_secs: u64,
    wood_types: &'a [&'a str],
    expense_categories: &'a [&'a str],
}

pub async fn settings(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, WebError> {
    require(&req, &state, Permission::SettingsView)?;
    Ok(ok(SettingsView {
        company: &state.config.company,
        database: state.db.info()?,
        session_ttl_secs: state.config.auth.session_ttl_secs,
        wood_types: &KNOWN_WOOD_TYPES,
        expense_categories: &DEFAULT_EXPENSE_CATEGORIES,
    }))
}

pub async fn backup(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, WebError> {
    require(&req, &state, Permission::SettingsEdit)?;
    let snapshot = state.db.snapshot()?;
    let body = io::backup_to_string(&snapshot, true)?;
    let file_name = format!("kayulog-backup-{}.json", snapshot.exported_at.format("%Y%m%d-%H%M%S"));
    Ok(attachment(mime::APPLICATION_JSON, &file_name, body))
}

pub async fn restore(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<Snapshot>,
) -> Result<HttpResponse, WebError> {
    let user = require(&req, &state, Permission::SettingsEdit)?;
    state.db.restore(&body)?;
    tracing::warn!(
        "{} restored a backup from {} ({} records)",
        user.email,
        body.exported_at,
        body.num_records()
    );
    Ok(done(format!("Restored {} records", body.num_records())))
}

pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let status = state.db.health_check();
    let code = if status.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    HttpResponse::build(code).json(ApiResponse {
        success: status.healthy,
        data: Some(status),
        message: None,
    })
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Register every API route.
pub(crate) fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/auth/login", web::post().to(login))
            .route("/auth/logout", web::post().to(logout))
            .route("/auth/me", web::get().to(me))
            .route("/calculate", web::post().to(calculate))
            .route("/logs/upload", web::post().to(upload_logs))
            .route("/inventory/export", web::get().to(export_inventory))
            .route("/inventory", web::get().to(list_inventory))
            .route("/inventory", web::post().to(create_batch))
            .route("/inventory/{id}", web::get().to(get_inventory_item))
            .route("/inventory/{id}", web::put().to(update_inventory_item))
            .route("/inventory/{id}", web::delete().to(delete_inventory_item))
            .route("/sales", web::get().to(list_sales))
            .route("/sales", web::post().to(create_sale))
            .route("/sales/{id}", web::get().to(get_sale))
            .route("/sales/{id}", web::put().to(update_sale))
            .route("/sales/{id}", web::delete().to(delete_sale))
            .route("/contacts", web::get().to(list_contacts))
            .route("/contacts", web::post().to(create_contact))
            .route("/contacts/{id}", web::get().to(get_contact))
            .route("/contacts/{id}", web::put().to(update_contact))
            .route("/contacts/{id}", web::delete().to(delete_contact))
            .route("/expenses", web::get().to(list_expenses))
            .route("/expenses", web::post().to(create_expense))
            .route("/expenses/{id}", web::delete().to(delete_expense))
            .route("/transactions", web::get().to(list_transactions))
            .route("/dashboard/stats", web::get().to(dashboard))
            .route("/reports/profit-loss", web::get().to(profit_loss_report))
            .route("/reports/cash-flow", web::get().to(cash_flow_report))
            .route("/reports/expenses", web::get().to(expense_report))
            .route("/reports/export", web::get().to(export_reports))
            .route("/users", web::get().to(list_users))
            .route("/users", web::post().to(create_user))
            .route("/users/{id}", web::put().to(update_user))
            .route("/users/{id}", web::delete().to(delete_user))
            .route("/settings", web::get().to(settings))
            .route("/backup", web::get().to(backup))
            .route("/restore", web::post().to(restore))
            .route("/database/health", web::get().to(health)),
    );
}
