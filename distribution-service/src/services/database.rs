//! Database service for distribution-service.
//!
//! All multi-row mutations (a recorded transaction plus its debt update, or
//! the close plus its distribution rows) run inside a single sqlx
//! transaction. Anything touching a daily operation first locks that
//! operation's row with `SELECT ... FOR UPDATE`, which serializes
//! same-operation recorders, sequence assignment, and the open/closed check
//! against a concurrent close.

use crate::models::{
    Buyer, BuyerDebtPayment, ChickenType, CostCategory, CreateBuyer, CreateChickenType,
    CreateCostCategory, CreateFarm, CreateOperation, CreatePartner, CreateVehicle, DailyCost,
    DailyOperation, DailyReport, DebtHistory, DistributionResult, Farm, FarmDebtPayment,
    FarmTransaction, OperationDetail, Partner, PartnerPeriodTotals, PartnerProfit, PartnerShare,
    PeriodProfitReport, PeriodTotals, ProfitDistribution, RecordDailyCost, RecordDebtPayment,
    RecordFarmPurchase, RecordSale, RecordTransportLoss, SaleTransaction, TransportLoss,
    UpdateBuyer, UpdateFarm, UpdatePartner, UpdateVehicle, Vehicle,
};
use crate::services::metrics::{
    record_debt_payment, record_operation_event, record_reconciliation_warning,
    record_transaction, DB_QUERY_DURATION,
};
use crate::services::profit;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use std::time::Duration;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Tolerance for the close-time reconciliation check: one unit of currency.
const RECONCILIATION_TOLERANCE: Decimal = Decimal::ONE;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "distribution-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Daily Operation Lifecycle
    // -------------------------------------------------------------------------

    /// Start a daily operation. The one-per-date rule is the UNIQUE
    /// constraint on `operation_date`; a duplicate surfaces as Conflict
    /// without any check-then-insert window.
    #[instrument(skip(self, input), fields(operation_date = %input.operation_date))]
    pub async fn create_operation(
        &self,
        input: &CreateOperation,
    ) -> Result<DailyOperation, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_operation"])
            .start_timer();

        let operation_id = Uuid::new_v4();
        let operation = sqlx::query_as::<_, DailyOperation>(
            r#"
            INSERT INTO daily_operations (operation_id, operation_date, vehicle_id, created_by, status, notes)
            VALUES ($1, $2, $3, $4, 'open', $5)
            RETURNING operation_id, operation_date, vehicle_id, created_by, status, notes, created_utc, closed_utc
            "#,
        )
        .bind(operation_id)
        .bind(input.operation_date)
        .bind(input.vehicle_id)
        .bind(input.created_by)
        .bind(&input.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "A daily operation already exists for {}",
                    input.operation_date
                ))
            }
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::NotFound(anyhow::anyhow!("Vehicle {} does not exist", input.vehicle_id))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create operation: {}", e)),
        })?;

        timer.observe_duration();
        record_operation_event("started");

        info!(
            operation_id = %operation.operation_id,
            operation_date = %operation.operation_date,
            "Daily operation started"
        );

        Ok(operation)
    }

    /// Get an operation with all of its recorded child rows.
    #[instrument(skip(self), fields(operation_id = %operation_id))]
    pub async fn get_operation(
        &self,
        operation_id: Uuid,
    ) -> Result<Option<OperationDetail>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_operation"])
            .start_timer();

        let operation = sqlx::query_as::<_, DailyOperation>(
            r#"
            SELECT operation_id, operation_date, vehicle_id, created_by, status, notes, created_utc, closed_utc
            FROM daily_operations
            WHERE operation_id = $1
            "#,
        )
        .bind(operation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get operation: {}", e)))?;

        let operation = match operation {
            Some(op) => op,
            None => return Ok(None),
        };

        let detail = self.load_operation_detail(operation).await?;
        timer.observe_duration();

        Ok(Some(detail))
    }

    /// Get an operation by its calendar date.
    #[instrument(skip(self), fields(operation_date = %operation_date))]
    pub async fn get_operation_by_date(
        &self,
        operation_date: NaiveDate,
    ) -> Result<Option<OperationDetail>, AppError> {
        let operation = sqlx::query_as::<_, DailyOperation>(
            r#"
            SELECT operation_id, operation_date, vehicle_id, created_by, status, notes, created_utc, closed_utc
            FROM daily_operations
            WHERE operation_date = $1
            "#,
        )
        .bind(operation_date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get operation: {}", e)))?;

        match operation {
            Some(op) => Ok(Some(self.load_operation_detail(op).await?)),
            None => Ok(None),
        }
    }

    async fn load_operation_detail(
        &self,
        operation: DailyOperation,
    ) -> Result<OperationDetail, AppError> {
        let operation_id = operation.operation_id;

        let farm_transactions = sqlx::query_as::<_, FarmTransaction>(
            r#"
            SELECT transaction_id, operation_id, farm_id, chicken_type_id, sequence_number,
                   empty_vehicle_weight, loaded_vehicle_weight, cage_count, cage_weight_per_unit,
                   net_chicken_weight, price_per_kg, total_amount, paid_amount, remaining_amount,
                   recorded_utc
            FROM farm_transactions
            WHERE operation_id = $1
            ORDER BY sequence_number
            "#,
        )
        .bind(operation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to load purchases: {}", e)))?;

        let sale_transactions = sqlx::query_as::<_, SaleTransaction>(
            r#"
            SELECT transaction_id, operation_id, buyer_id, chicken_type_id, sequence_number,
                   loaded_cages_weight, empty_cages_weight, cage_count, net_chicken_weight,
                   price_per_kg, total_amount, paid_amount, remaining_amount, old_debt_paid,
                   recorded_utc
            FROM sale_transactions
            WHERE operation_id = $1
            ORDER BY sequence_number
            "#,
        )
        .bind(operation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to load sales: {}", e)))?;

        let transport_losses = sqlx::query_as::<_, TransportLoss>(
            r#"
            SELECT loss_id, operation_id, chicken_type_id, dead_weight, price_per_kg, loss_amount,
                   location, recorded_utc
            FROM transport_losses
            WHERE operation_id = $1
            ORDER BY recorded_utc
            "#,
        )
        .bind(operation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to load losses: {}", e)))?;

        let daily_costs = sqlx::query_as::<_, DailyCost>(
            r#"
            SELECT cost_id, operation_id, cost_category_id, amount, description, recorded_utc
            FROM daily_costs
            WHERE operation_id = $1
            ORDER BY recorded_utc
            "#,
        )
        .bind(operation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to load costs: {}", e)))?;

        let distribution = self.load_distribution(operation_id).await?;

        Ok(OperationDetail {
            operation,
            farm_transactions,
            sale_transactions,
            transport_losses,
            daily_costs,
            distribution,
        })
    }

    async fn load_distribution(
        &self,
        operation_id: Uuid,
    ) -> Result<Option<DistributionResult>, AppError> {
        let distribution = sqlx::query_as::<_, ProfitDistribution>(
            r#"
            SELECT distribution_id, operation_id, total_revenue, total_purchases, total_losses,
                   total_costs, vehicle_costs, net_profit, created_utc
            FROM profit_distributions
            WHERE operation_id = $1
            "#,
        )
        .bind(operation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to load distribution: {}", e))
        })?;

        let distribution = match distribution {
            Some(d) => d,
            None => return Ok(None),
        };

        let partner_shares = sqlx::query_as::<_, PartnerShare>(
            r#"
            SELECT pp.partner_id, p.name AS partner_name, p.investment_percentage,
                   p.is_vehicle_partner, pp.base_profit_share, pp.vehicle_cost_share,
                   pp.final_profit
            FROM partner_profits pp
            JOIN partners p ON p.partner_id = pp.partner_id
            WHERE pp.distribution_id = $1
            ORDER BY p.name
            "#,
        )
        .bind(distribution.distribution_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to load partner shares: {}", e))
        })?;

        let other_costs = distribution.total_costs - distribution.vehicle_costs;

        Ok(Some(DistributionResult {
            distribution,
            other_costs,
            partner_shares,
        }))
    }

    /// Lock the operation row for the remainder of the transaction. Missing
    /// operation is NotFound; callers decide what a closed one means.
    async fn lock_operation(
        tx: &mut Transaction<'_, Postgres>,
        operation_id: Uuid,
    ) -> Result<DailyOperation, AppError> {
        sqlx::query_as::<_, DailyOperation>(
            r#"
            SELECT operation_id, operation_date, vehicle_id, created_by, status, notes, created_utc, closed_utc
            FROM daily_operations
            WHERE operation_id = $1
            FOR UPDATE
            "#,
        )
        .bind(operation_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to lock operation: {}", e)))?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Operation {} not found", operation_id)))
    }

    /// Lock the operation and require it to still accept recordings.
    async fn lock_open_operation(
        tx: &mut Transaction<'_, Postgres>,
        operation_id: Uuid,
    ) -> Result<DailyOperation, AppError> {
        let operation = Self::lock_operation(tx, operation_id).await?;
        if !operation.is_open() {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Operation {} is already closed",
                operation_id
            )));
        }
        Ok(operation)
    }

    /// Next per-operation sequence number for the given transaction table.
    /// Only valid while the operation row is locked.
    async fn next_sequence_number(
        tx: &mut Transaction<'_, Postgres>,
        table: &str,
        operation_id: Uuid,
    ) -> Result<i32, AppError> {
        let query = format!(
            "SELECT COALESCE(MAX(sequence_number), 0) + 1 FROM {} WHERE operation_id = $1",
            table
        );
        sqlx::query_scalar::<_, i32>(&query)
            .bind(operation_id)
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to assign sequence number: {}", e))
            })
    }

    // -------------------------------------------------------------------------
    // Transaction Recorder
    // -------------------------------------------------------------------------

    /// Record a farm purchase: insert the transaction and add its unpaid
    /// remainder to the farm's debt, atomically.
    #[instrument(skip(self, input), fields(operation_id = %operation_id, farm_id = %input.farm_id))]
    pub async fn record_farm_purchase(
        &self,
        operation_id: Uuid,
        input: &RecordFarmPurchase,
    ) -> Result<FarmTransaction, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["record_farm_purchase"])
            .start_timer();

        let figures = profit::purchase_figures(
            input.empty_vehicle_weight,
            input.loaded_vehicle_weight,
            input.cage_count,
            input.cage_weight_per_unit,
            input.price_per_kg,
            input.paid_amount,
        );
        if figures.net_chicken_weight < Decimal::ZERO {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Computed net chicken weight is negative ({})",
                figures.net_chicken_weight
            )));
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        Self::lock_open_operation(&mut tx, operation_id).await?;
        let sequence_number =
            Self::next_sequence_number(&mut tx, "farm_transactions", operation_id).await?;

        let transaction = sqlx::query_as::<_, FarmTransaction>(
            r#"
            INSERT INTO farm_transactions (
                transaction_id, operation_id, farm_id, chicken_type_id, sequence_number,
                empty_vehicle_weight, loaded_vehicle_weight, cage_count, cage_weight_per_unit,
                net_chicken_weight, price_per_kg, total_amount, paid_amount, remaining_amount
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING transaction_id, operation_id, farm_id, chicken_type_id, sequence_number,
                      empty_vehicle_weight, loaded_vehicle_weight, cage_count, cage_weight_per_unit,
                      net_chicken_weight, price_per_kg, total_amount, paid_amount, remaining_amount,
                      recorded_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(operation_id)
        .bind(input.farm_id)
        .bind(input.chicken_type_id)
        .bind(sequence_number)
        .bind(input.empty_vehicle_weight)
        .bind(input.loaded_vehicle_weight)
        .bind(input.cage_count)
        .bind(input.cage_weight_per_unit)
        .bind(figures.net_chicken_weight)
        .bind(input.price_per_kg)
        .bind(figures.total_amount)
        .bind(input.paid_amount)
        .bind(figures.remaining_amount)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::NotFound(anyhow::anyhow!("Unknown farm or chicken type"))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to insert purchase: {}", e)),
        })?;

        // Single-statement read-modify-write; no lost update under
        // concurrent purchases against the same farm.
        let updated = sqlx::query_scalar::<_, Decimal>(
            "UPDATE farms SET total_debt = total_debt + $1 WHERE farm_id = $2 RETURNING total_debt",
        )
        .bind(figures.remaining_amount)
        .bind(input.farm_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update farm debt: {}", e)))?;

        if updated.is_none() {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Farm {} does not exist",
                input.farm_id
            )));
        }

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        timer.observe_duration();
        record_transaction("purchase");

        info!(
            transaction_id = %transaction.transaction_id,
            sequence_number = transaction.sequence_number,
            total_amount = %transaction.total_amount,
            remaining_amount = %transaction.remaining_amount,
            "Farm purchase recorded"
        );

        Ok(transaction)
    }

    /// Record a sale: insert the transaction and move the buyer's debt by
    /// `remaining - old_debt_paid`, atomically.
    #[instrument(skip(self, input), fields(operation_id = %operation_id, buyer_id = %input.buyer_id))]
    pub async fn record_sale(
        &self,
        operation_id: Uuid,
        input: &RecordSale,
    ) -> Result<SaleTransaction, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["record_sale"])
            .start_timer();

        let figures = profit::sale_figures(
            input.loaded_cages_weight,
            input.empty_cages_weight,
            input.price_per_kg,
            input.paid_amount,
        );
        if figures.net_chicken_weight < Decimal::ZERO {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Computed net chicken weight is negative ({})",
                figures.net_chicken_weight
            )));
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        Self::lock_open_operation(&mut tx, operation_id).await?;
        let sequence_number =
            Self::next_sequence_number(&mut tx, "sale_transactions", operation_id).await?;

        let transaction = sqlx::query_as::<_, SaleTransaction>(
            r#"
            INSERT INTO sale_transactions (
                transaction_id, operation_id, buyer_id, chicken_type_id, sequence_number,
                loaded_cages_weight, empty_cages_weight, cage_count, net_chicken_weight,
                price_per_kg, total_amount, paid_amount, remaining_amount, old_debt_paid
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING transaction_id, operation_id, buyer_id, chicken_type_id, sequence_number,
                      loaded_cages_weight, empty_cages_weight, cage_count, net_chicken_weight,
                      price_per_kg, total_amount, paid_amount, remaining_amount, old_debt_paid,
                      recorded_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(operation_id)
        .bind(input.buyer_id)
        .bind(input.chicken_type_id)
        .bind(sequence_number)
        .bind(input.loaded_cages_weight)
        .bind(input.empty_cages_weight)
        .bind(input.cage_count)
        .bind(figures.net_chicken_weight)
        .bind(input.price_per_kg)
        .bind(figures.total_amount)
        .bind(input.paid_amount)
        .bind(figures.remaining_amount)
        .bind(input.old_debt_paid)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::NotFound(anyhow::anyhow!("Unknown buyer or chicken type"))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to insert sale: {}", e)),
        })?;

        // One sale can retire old debt and realize new debt at once.
        let updated = sqlx::query_scalar::<_, Decimal>(
            "UPDATE buyers SET total_debt = total_debt - $1 + $2 WHERE buyer_id = $3 RETURNING total_debt",
        )
        .bind(input.old_debt_paid)
        .bind(figures.remaining_amount)
        .bind(input.buyer_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to update buyer debt: {}", e))
        })?;

        if updated.is_none() {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Buyer {} does not exist",
                input.buyer_id
            )));
        }

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        timer.observe_duration();
        record_transaction("sale");

        info!(
            transaction_id = %transaction.transaction_id,
            sequence_number = transaction.sequence_number,
            total_amount = %transaction.total_amount,
            old_debt_paid = %transaction.old_debt_paid,
            "Sale recorded"
        );

        Ok(transaction)
    }

    /// Record chickens lost in transit. No debt effect.
    #[instrument(skip(self, input), fields(operation_id = %operation_id))]
    pub async fn record_transport_loss(
        &self,
        operation_id: Uuid,
        input: &RecordTransportLoss,
    ) -> Result<TransportLoss, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["record_transport_loss"])
            .start_timer();

        let loss_amount = profit::loss_amount(input.dead_weight, input.price_per_kg);

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        Self::lock_open_operation(&mut tx, operation_id).await?;

        let loss = sqlx::query_as::<_, TransportLoss>(
            r#"
            INSERT INTO transport_losses (
                loss_id, operation_id, chicken_type_id, dead_weight, price_per_kg, loss_amount, location
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING loss_id, operation_id, chicken_type_id, dead_weight, price_per_kg, loss_amount,
                      location, recorded_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(operation_id)
        .bind(input.chicken_type_id)
        .bind(input.dead_weight)
        .bind(input.price_per_kg)
        .bind(loss_amount)
        .bind(&input.location)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::NotFound(anyhow::anyhow!("Unknown chicken type"))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to insert loss: {}", e)),
        })?;

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        timer.observe_duration();
        record_transaction("loss");

        info!(loss_id = %loss.loss_id, loss_amount = %loss.loss_amount, "Transport loss recorded");

        Ok(loss)
    }

    /// Record an operating cost against the day.
    #[instrument(skip(self, input), fields(operation_id = %operation_id))]
    pub async fn record_daily_cost(
        &self,
        operation_id: Uuid,
        input: &RecordDailyCost,
    ) -> Result<DailyCost, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["record_daily_cost"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        Self::lock_open_operation(&mut tx, operation_id).await?;

        let cost = sqlx::query_as::<_, DailyCost>(
            r#"
            INSERT INTO daily_costs (cost_id, operation_id, cost_category_id, amount, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING cost_id, operation_id, cost_category_id, amount, description, recorded_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(operation_id)
        .bind(input.cost_category_id)
        .bind(input.amount)
        .bind(&input.description)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::NotFound(anyhow::anyhow!(
                    "Cost category {} does not exist",
                    input.cost_category_id
                ))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to insert cost: {}", e)),
        })?;

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        timer.observe_duration();
        record_transaction("cost");

        info!(cost_id = %cost.cost_id, amount = %cost.amount, "Daily cost recorded");

        Ok(cost)
    }

    // -------------------------------------------------------------------------
    // Debt Ledger
    // -------------------------------------------------------------------------

    /// Record a payment to a farm and decrease its debt, atomically. The
    /// balance is deliberately not floored at zero; overpayment goes
    /// negative.
    #[instrument(skip(self, input), fields(farm_id = %farm_id, amount = %input.amount))]
    pub async fn record_farm_debt_payment(
        &self,
        farm_id: Uuid,
        input: &RecordDebtPayment,
    ) -> Result<FarmDebtPayment, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["record_farm_debt_payment"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let updated = sqlx::query_scalar::<_, Decimal>(
            "UPDATE farms SET total_debt = total_debt - $1 WHERE farm_id = $2 RETURNING total_debt",
        )
        .bind(input.amount)
        .bind(farm_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update farm debt: {}", e)))?;

        let new_debt = updated
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Farm {} not found", farm_id)))?;

        let payment = sqlx::query_as::<_, FarmDebtPayment>(
            r#"
            INSERT INTO farm_debt_payments (payment_id, farm_id, operation_id, amount, payment_date, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING payment_id, farm_id, operation_id, amount, payment_date, notes, recorded_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(farm_id)
        .bind(input.operation_id)
        .bind(input.amount)
        .bind(input.payment_date)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to insert payment: {}", e)))?;

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        timer.observe_duration();
        record_debt_payment("farm");

        info!(
            payment_id = %payment.payment_id,
            amount = %payment.amount,
            new_debt = %new_debt,
            "Farm debt payment recorded"
        );

        Ok(payment)
    }

    /// Record a payment from a buyer and decrease its debt, atomically.
    #[instrument(skip(self, input), fields(buyer_id = %buyer_id, amount = %input.amount))]
    pub async fn record_buyer_debt_payment(
        &self,
        buyer_id: Uuid,
        input: &RecordDebtPayment,
    ) -> Result<BuyerDebtPayment, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["record_buyer_debt_payment"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let updated = sqlx::query_scalar::<_, Decimal>(
            "UPDATE buyers SET total_debt = total_debt - $1 WHERE buyer_id = $2 RETURNING total_debt",
        )
        .bind(input.amount)
        .bind(buyer_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to update buyer debt: {}", e))
        })?;

        let new_debt = updated
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Buyer {} not found", buyer_id)))?;

        let payment = sqlx::query_as::<_, BuyerDebtPayment>(
            r#"
            INSERT INTO buyer_debt_payments (payment_id, buyer_id, operation_id, amount, payment_date, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING payment_id, buyer_id, operation_id, amount, payment_date, notes, recorded_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(buyer_id)
        .bind(input.operation_id)
        .bind(input.amount)
        .bind(input.payment_date)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to insert payment: {}", e)))?;

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        timer.observe_duration();
        record_debt_payment("buyer");

        info!(
            payment_id = %payment.payment_id,
            amount = %payment.amount,
            new_debt = %new_debt,
            "Buyer debt payment recorded"
        );

        Ok(payment)
    }

    /// Full debt history for a farm.
    #[instrument(skip(self), fields(farm_id = %farm_id))]
    pub async fn get_farm_debt_history(
        &self,
        farm_id: Uuid,
    ) -> Result<Option<(Farm, DebtHistory<FarmTransaction, FarmDebtPayment>)>, AppError> {
        let farm = match self.get_farm(farm_id).await? {
            Some(f) => f,
            None => return Ok(None),
        };

        let transactions = sqlx::query_as::<_, FarmTransaction>(
            r#"
            SELECT transaction_id, operation_id, farm_id, chicken_type_id, sequence_number,
                   empty_vehicle_weight, loaded_vehicle_weight, cage_count, cage_weight_per_unit,
                   net_chicken_weight, price_per_kg, total_amount, paid_amount, remaining_amount,
                   recorded_utc
            FROM farm_transactions
            WHERE farm_id = $1
            ORDER BY recorded_utc DESC
            "#,
        )
        .bind(farm_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to load purchases: {}", e)))?;

        let payments = sqlx::query_as::<_, FarmDebtPayment>(
            r#"
            SELECT payment_id, farm_id, operation_id, amount, payment_date, notes, recorded_utc
            FROM farm_debt_payments
            WHERE farm_id = $1
            ORDER BY payment_date DESC, recorded_utc DESC
            "#,
        )
        .bind(farm_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to load payments: {}", e)))?;

        let total_transacted = transactions.iter().map(|t| t.total_amount).sum();
        let total_paid = transactions
            .iter()
            .map(|t| t.paid_amount)
            .chain(payments.iter().map(|p| p.amount))
            .sum();

        let history = DebtHistory {
            current_debt: farm.total_debt,
            transactions,
            payments,
            total_transacted,
            total_paid,
        };

        Ok(Some((farm, history)))
    }

    /// Full debt history for a buyer. `old_debt_paid` on sales counts as
    /// money received.
    #[instrument(skip(self), fields(buyer_id = %buyer_id))]
    pub async fn get_buyer_debt_history(
        &self,
        buyer_id: Uuid,
    ) -> Result<Option<(Buyer, DebtHistory<SaleTransaction, BuyerDebtPayment>)>, AppError> {
        let buyer = match self.get_buyer(buyer_id).await? {
            Some(b) => b,
            None => return Ok(None),
        };

        let transactions = sqlx::query_as::<_, SaleTransaction>(
            r#"
            SELECT transaction_id, operation_id, buyer_id, chicken_type_id, sequence_number,
                   loaded_cages_weight, empty_cages_weight, cage_count, net_chicken_weight,
                   price_per_kg, total_amount, paid_amount, remaining_amount, old_debt_paid,
                   recorded_utc
            FROM sale_transactions
            WHERE buyer_id = $1
            ORDER BY recorded_utc DESC
            "#,
        )
        .bind(buyer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to load sales: {}", e)))?;

        let payments = sqlx::query_as::<_, BuyerDebtPayment>(
            r#"
            SELECT payment_id, buyer_id, operation_id, amount, payment_date, notes, recorded_utc
            FROM buyer_debt_payments
            WHERE buyer_id = $1
            ORDER BY payment_date DESC, recorded_utc DESC
            "#,
        )
        .bind(buyer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to load payments: {}", e)))?;

        let total_transacted = transactions.iter().map(|t| t.total_amount).sum();
        let total_paid = transactions
            .iter()
            .map(|t| t.paid_amount + t.old_debt_paid)
            .chain(payments.iter().map(|p| p.amount))
            .sum();

        let history = DebtHistory {
            current_debt: buyer.total_debt,
            transactions,
            payments,
            total_transacted,
            total_paid,
        };

        Ok(Some((buyer, history)))
    }

    // -------------------------------------------------------------------------
    // Close / Profit Distribution Engine
    // -------------------------------------------------------------------------

    /// Close a daily operation: aggregate the day, write the distribution
    /// and per-partner shares, and flip the status, all in one transaction.
    /// A failure anywhere leaves the operation open and nothing persisted.
    #[instrument(skip(self), fields(operation_id = %operation_id))]
    pub async fn close_operation(
        &self,
        operation_id: Uuid,
    ) -> Result<DistributionResult, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["close_operation"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let operation = Self::lock_operation(&mut tx, operation_id).await?;
        if !operation.is_open() {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Operation {} is already closed",
                operation_id
            )));
        }

        // Aggregates come from the operation's own child rows, never from
        // anything cached.
        let total_revenue = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(total_amount), 0) FROM sale_transactions WHERE operation_id = $1",
        )
        .bind(operation_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to sum revenue: {}", e)))?;

        let total_purchases = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(total_amount), 0) FROM farm_transactions WHERE operation_id = $1",
        )
        .bind(operation_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to sum purchases: {}", e)))?;

        let total_losses = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(loss_amount), 0) FROM transport_losses WHERE operation_id = $1",
        )
        .bind(operation_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to sum losses: {}", e)))?;

        let (vehicle_costs, other_costs) = sqlx::query_as::<_, (Decimal, Decimal)>(
            r#"
            SELECT
                COALESCE(SUM(dc.amount) FILTER (WHERE cc.is_vehicle_cost), 0),
                COALESCE(SUM(dc.amount) FILTER (WHERE NOT cc.is_vehicle_cost), 0)
            FROM daily_costs dc
            JOIN cost_categories cc ON cc.cost_category_id = dc.cost_category_id
            WHERE dc.operation_id = $1
            "#,
        )
        .bind(operation_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to sum costs: {}", e)))?;

        let total_costs = vehicle_costs + other_costs;
        let net_profit = total_revenue - total_purchases - total_losses - total_costs;

        let distribution = sqlx::query_as::<_, ProfitDistribution>(
            r#"
            INSERT INTO profit_distributions (
                distribution_id, operation_id, total_revenue, total_purchases, total_losses,
                total_costs, vehicle_costs, net_profit
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING distribution_id, operation_id, total_revenue, total_purchases, total_losses,
                      total_costs, vehicle_costs, net_profit, created_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(operation_id)
        .bind(total_revenue)
        .bind(total_purchases)
        .bind(total_losses)
        .bind(total_costs)
        .bind(vehicle_costs)
        .bind(net_profit)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "Operation {} already has a profit distribution",
                    operation_id
                ))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to insert distribution: {}", e)),
        })?;

        // Every partner currently on record participates, not a
        // per-operation subset.
        let partners = Self::list_partners_in_tx(&mut tx).await?;
        let allocations = profit::allocate_shares(net_profit, vehicle_costs, &partners);

        let mut partner_shares = Vec::with_capacity(allocations.len());
        for (partner, allocation) in partners.iter().zip(&allocations) {
            sqlx::query_as::<_, PartnerProfit>(
                r#"
                INSERT INTO partner_profits (
                    partner_profit_id, distribution_id, partner_id, base_profit_share,
                    vehicle_cost_share, final_profit
                )
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING partner_profit_id, distribution_id, partner_id, base_profit_share,
                          vehicle_cost_share, final_profit
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(distribution.distribution_id)
            .bind(allocation.partner_id)
            .bind(allocation.base_profit_share)
            .bind(allocation.vehicle_cost_share)
            .bind(allocation.final_profit)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to insert partner share: {}", e))
            })?;

            partner_shares.push(PartnerShare {
                partner_id: partner.partner_id,
                partner_name: partner.name.clone(),
                investment_percentage: partner.investment_percentage,
                is_vehicle_partner: partner.is_vehicle_partner,
                base_profit_share: allocation.base_profit_share,
                vehicle_cost_share: allocation.vehicle_cost_share,
                final_profit: allocation.final_profit,
            });
        }

        sqlx::query(
            "UPDATE daily_operations SET status = 'closed', closed_utc = NOW() WHERE operation_id = $1",
        )
        .bind(operation_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to close operation: {}", e)))?;

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        // Non-fatal by design: rounding drift or percentages not summing to
        // 100 are reported, never allowed to block the close.
        let drift = profit::reconciliation_drift(net_profit, &allocations);
        if drift > RECONCILIATION_TOLERANCE {
            record_reconciliation_warning();
            warn!(
                operation_id = %operation_id,
                net_profit = %net_profit,
                drift = %drift,
                "Profit distribution drift exceeds tolerance"
            );
        }

        timer.observe_duration();
        record_operation_event("closed");

        info!(
            operation_id = %operation_id,
            distribution_id = %distribution.distribution_id,
            net_profit = %net_profit,
            partner_count = partner_shares.len(),
            "Daily operation closed"
        );

        Ok(DistributionResult {
            distribution,
            other_costs,
            partner_shares,
        })
    }

    // -------------------------------------------------------------------------
    // Reports
    // -------------------------------------------------------------------------

    /// Daily report: the full operation detail for a date plus per-section
    /// totals.
    #[instrument(skip(self), fields(operation_date = %operation_date))]
    pub async fn get_daily_report(
        &self,
        operation_date: NaiveDate,
    ) -> Result<Option<DailyReport>, AppError> {
        let detail = match self.get_operation_by_date(operation_date).await? {
            Some(d) => d,
            None => return Ok(None),
        };

        let purchase_total = detail
            .farm_transactions
            .iter()
            .map(|t| t.total_amount)
            .sum();
        let sale_total = detail
            .sale_transactions
            .iter()
            .map(|t| t.total_amount)
            .sum();
        let loss_total = detail.transport_losses.iter().map(|l| l.loss_amount).sum();
        let cost_total = detail.daily_costs.iter().map(|c| c.amount).sum();

        Ok(Some(DailyReport {
            detail,
            purchase_total,
            sale_total,
            loss_total,
            cost_total,
        }))
    }

    /// Aggregate all closed-day distributions in a date range, with
    /// per-partner cumulative shares.
    #[instrument(skip(self), fields(from_date = %from_date, to_date = %to_date))]
    pub async fn get_period_profit_report(
        &self,
        from_date: NaiveDate,
        to_date: NaiveDate,
    ) -> Result<PeriodProfitReport, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_period_profit_report"])
            .start_timer();

        let row = sqlx::query_as::<_, (i64, Decimal, Decimal, Decimal, Decimal, Decimal, Decimal)>(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(pd.total_revenue), 0),
                   COALESCE(SUM(pd.total_purchases), 0),
                   COALESCE(SUM(pd.total_losses), 0),
                   COALESCE(SUM(pd.total_costs), 0),
                   COALESCE(SUM(pd.vehicle_costs), 0),
                   COALESCE(SUM(pd.net_profit), 0)
            FROM profit_distributions pd
            JOIN daily_operations op ON op.operation_id = pd.operation_id
            WHERE op.operation_date BETWEEN $1 AND $2
            "#,
        )
        .bind(from_date)
        .bind(to_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to aggregate period: {}", e))
        })?;

        let partner_totals = sqlx::query_as::<_, PartnerPeriodTotals>(
            r#"
            SELECT p.partner_id, p.name AS partner_name,
                   COALESCE(SUM(pp.base_profit_share), 0) AS total_base_share,
                   COALESCE(SUM(pp.vehicle_cost_share), 0) AS total_vehicle_cost_share,
                   COALESCE(SUM(pp.final_profit), 0) AS total_final_profit
            FROM partner_profits pp
            JOIN profit_distributions pd ON pd.distribution_id = pp.distribution_id
            JOIN daily_operations op ON op.operation_id = pd.operation_id
            JOIN partners p ON p.partner_id = pp.partner_id
            WHERE op.operation_date BETWEEN $1 AND $2
            GROUP BY p.partner_id, p.name
            ORDER BY p.name
            "#,
        )
        .bind(from_date)
        .bind(to_date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to aggregate partner totals: {}", e))
        })?;

        timer.observe_duration();

        Ok(PeriodProfitReport {
            from_date,
            to_date,
            operations_closed: row.0,
            totals: PeriodTotals {
                total_revenue: row.1,
                total_purchases: row.2,
                total_losses: row.3,
                total_costs: row.4,
                vehicle_costs: row.5,
                net_profit: row.6,
            },
            partner_totals,
        })
    }
}

// -----------------------------------------------------------------------------
// Entity and catalog CRUD
// -----------------------------------------------------------------------------

impl Database {
    // ---- Vehicles ----

    #[instrument(skip(self, input), fields(plate_number = %input.plate_number))]
    pub async fn create_vehicle(&self, input: &CreateVehicle) -> Result<Vehicle, AppError> {
        sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (vehicle_id, plate_number, model, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING vehicle_id, plate_number, model, notes, created_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.plate_number)
        .bind(&input.model)
        .bind(&input.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "Vehicle with plate {} already exists",
                    input.plate_number
                ))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create vehicle: {}", e)),
        })
    }

    pub async fn list_vehicles(&self) -> Result<Vec<Vehicle>, AppError> {
        sqlx::query_as::<_, Vehicle>(
            "SELECT vehicle_id, plate_number, model, notes, created_utc FROM vehicles ORDER BY plate_number",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list vehicles: {}", e)))
    }

    pub async fn get_vehicle(&self, vehicle_id: Uuid) -> Result<Option<Vehicle>, AppError> {
        sqlx::query_as::<_, Vehicle>(
            "SELECT vehicle_id, plate_number, model, notes, created_utc FROM vehicles WHERE vehicle_id = $1",
        )
        .bind(vehicle_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get vehicle: {}", e)))
    }

    #[instrument(skip(self, input), fields(vehicle_id = %vehicle_id))]
    pub async fn update_vehicle(
        &self,
        vehicle_id: Uuid,
        input: &UpdateVehicle,
    ) -> Result<Vehicle, AppError> {
        sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET plate_number = COALESCE($1, plate_number),
                model = COALESCE($2, model),
                notes = COALESCE($3, notes)
            WHERE vehicle_id = $4
            RETURNING vehicle_id, plate_number, model, notes, created_utc
            "#,
        )
        .bind(&input.plate_number)
        .bind(&input.model)
        .bind(&input.notes)
        .bind(vehicle_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update vehicle: {}", e)))?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Vehicle {} not found", vehicle_id)))
    }

    #[instrument(skip(self), fields(vehicle_id = %vehicle_id))]
    pub async fn delete_vehicle(&self, vehicle_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM vehicles WHERE vehicle_id = $1")
            .bind(vehicle_id)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                    AppError::Conflict(anyhow::anyhow!(
                        "Vehicle {} is referenced by daily operations",
                        vehicle_id
                    ))
                }
                _ => AppError::DatabaseError(anyhow::anyhow!("Failed to delete vehicle: {}", e)),
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Vehicle {} not found",
                vehicle_id
            )));
        }
        Ok(())
    }

    // ---- Partners ----

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_partner(&self, input: &CreatePartner) -> Result<Partner, AppError> {
        sqlx::query_as::<_, Partner>(
            r#"
            INSERT INTO partners (partner_id, name, phone, address, investment_amount,
                                  investment_percentage, is_vehicle_partner)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING partner_id, name, phone, address, investment_amount,
                      investment_percentage, is_vehicle_partner, created_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(input.investment_amount)
        .bind(input.investment_percentage)
        .bind(input.is_vehicle_partner)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_check_violation() => {
                AppError::BadRequest(anyhow::anyhow!(
                    "Investment percentage must be between 0 and 100"
                ))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create partner: {}", e)),
        })
    }

    pub async fn list_partners(&self) -> Result<Vec<Partner>, AppError> {
        sqlx::query_as::<_, Partner>(
            r#"
            SELECT partner_id, name, phone, address, investment_amount,
                   investment_percentage, is_vehicle_partner, created_utc
            FROM partners
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list partners: {}", e)))
    }

    /// Partner snapshot inside a close transaction. The allocation must see
    /// the same roster the inserted shares will reference.
    async fn list_partners_in_tx(
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<Partner>, AppError> {
        sqlx::query_as::<_, Partner>(
            r#"
            SELECT partner_id, name, phone, address, investment_amount,
                   investment_percentage, is_vehicle_partner, created_utc
            FROM partners
            ORDER BY name
            "#,
        )
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list partners: {}", e)))
    }

    pub async fn get_partner(&self, partner_id: Uuid) -> Result<Option<Partner>, AppError> {
        sqlx::query_as::<_, Partner>(
            r#"
            SELECT partner_id, name, phone, address, investment_amount,
                   investment_percentage, is_vehicle_partner, created_utc
            FROM partners
            WHERE partner_id = $1
            "#,
        )
        .bind(partner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get partner: {}", e)))
    }

    #[instrument(skip(self, input), fields(partner_id = %partner_id))]
    pub async fn update_partner(
        &self,
        partner_id: Uuid,
        input: &UpdatePartner,
    ) -> Result<Partner, AppError> {
        sqlx::query_as::<_, Partner>(
            r#"
            UPDATE partners
            SET name = COALESCE($1, name),
                phone = COALESCE($2, phone),
                address = COALESCE($3, address),
                investment_amount = COALESCE($4, investment_amount),
                investment_percentage = COALESCE($5, investment_percentage),
                is_vehicle_partner = COALESCE($6, is_vehicle_partner)
            WHERE partner_id = $7
            RETURNING partner_id, name, phone, address, investment_amount,
                      investment_percentage, is_vehicle_partner, created_utc
            "#,
        )
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(input.investment_amount)
        .bind(input.investment_percentage)
        .bind(input.is_vehicle_partner)
        .bind(partner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_check_violation() => {
                AppError::BadRequest(anyhow::anyhow!(
                    "Investment percentage must be between 0 and 100"
                ))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to update partner: {}", e)),
        })?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Partner {} not found", partner_id)))
    }

    #[instrument(skip(self), fields(partner_id = %partner_id))]
    pub async fn delete_partner(&self, partner_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM partners WHERE partner_id = $1")
            .bind(partner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                    AppError::Conflict(anyhow::anyhow!(
                        "Partner {} has recorded profit shares",
                        partner_id
                    ))
                }
                _ => AppError::DatabaseError(anyhow::anyhow!("Failed to delete partner: {}", e)),
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Partner {} not found",
                partner_id
            )));
        }
        Ok(())
    }

    // ---- Farms ----

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_farm(&self, input: &CreateFarm) -> Result<Farm, AppError> {
        sqlx::query_as::<_, Farm>(
            r#"
            INSERT INTO farms (farm_id, name, owner_name, location, phone)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING farm_id, name, owner_name, location, phone, total_debt, created_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.owner_name)
        .bind(&input.location)
        .bind(&input.phone)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create farm: {}", e)))
    }

    pub async fn list_farms(&self) -> Result<Vec<Farm>, AppError> {
        sqlx::query_as::<_, Farm>(
            "SELECT farm_id, name, owner_name, location, phone, total_debt, created_utc FROM farms ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list farms: {}", e)))
    }

    pub async fn get_farm(&self, farm_id: Uuid) -> Result<Option<Farm>, AppError> {
        sqlx::query_as::<_, Farm>(
            "SELECT farm_id, name, owner_name, location, phone, total_debt, created_utc FROM farms WHERE farm_id = $1",
        )
        .bind(farm_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get farm: {}", e)))
    }

    /// Update farm contact fields. `total_debt` is owned by the recorder and
    /// the payment path and cannot be set here.
    #[instrument(skip(self, input), fields(farm_id = %farm_id))]
    pub async fn update_farm(&self, farm_id: Uuid, input: &UpdateFarm) -> Result<Farm, AppError> {
        sqlx::query_as::<_, Farm>(
            r#"
            UPDATE farms
            SET name = COALESCE($1, name),
                owner_name = COALESCE($2, owner_name),
                location = COALESCE($3, location),
                phone = COALESCE($4, phone)
            WHERE farm_id = $5
            RETURNING farm_id, name, owner_name, location, phone, total_debt, created_utc
            "#,
        )
        .bind(&input.name)
        .bind(&input.owner_name)
        .bind(&input.location)
        .bind(&input.phone)
        .bind(farm_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update farm: {}", e)))?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Farm {} not found", farm_id)))
    }

    #[instrument(skip(self), fields(farm_id = %farm_id))]
    pub async fn delete_farm(&self, farm_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM farms WHERE farm_id = $1")
            .bind(farm_id)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                    AppError::Conflict(anyhow::anyhow!(
                        "Farm {} has recorded transactions",
                        farm_id
                    ))
                }
                _ => AppError::DatabaseError(anyhow::anyhow!("Failed to delete farm: {}", e)),
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Farm {} not found",
                farm_id
            )));
        }
        Ok(())
    }

    // ---- Buyers ----

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_buyer(&self, input: &CreateBuyer) -> Result<Buyer, AppError> {
        sqlx::query_as::<_, Buyer>(
            r#"
            INSERT INTO buyers (buyer_id, name, shop_name, location, phone)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING buyer_id, name, shop_name, location, phone, total_debt, created_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.shop_name)
        .bind(&input.location)
        .bind(&input.phone)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create buyer: {}", e)))
    }

    pub async fn list_buyers(&self) -> Result<Vec<Buyer>, AppError> {
        sqlx::query_as::<_, Buyer>(
            "SELECT buyer_id, name, shop_name, location, phone, total_debt, created_utc FROM buyers ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list buyers: {}", e)))
    }

    pub async fn get_buyer(&self, buyer_id: Uuid) -> Result<Option<Buyer>, AppError> {
        sqlx::query_as::<_, Buyer>(
            "SELECT buyer_id, name, shop_name, location, phone, total_debt, created_utc FROM buyers WHERE buyer_id = $1",
        )
        .bind(buyer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get buyer: {}", e)))
    }

    /// Update buyer contact fields. `total_debt` is owned by the recorder
    /// and the payment path and cannot be set here.
    #[instrument(skip(self, input), fields(buyer_id = %buyer_id))]
    pub async fn update_buyer(
        &self,
        buyer_id: Uuid,
        input: &UpdateBuyer,
    ) -> Result<Buyer, AppError> {
        sqlx::query_as::<_, Buyer>(
            r#"
            UPDATE buyers
            SET name = COALESCE($1, name),
                shop_name = COALESCE($2, shop_name),
                location = COALESCE($3, location),
                phone = COALESCE($4, phone)
            WHERE buyer_id = $5
            RETURNING buyer_id, name, shop_name, location, phone, total_debt, created_utc
            "#,
        )
        .bind(&input.name)
        .bind(&input.shop_name)
        .bind(&input.location)
        .bind(&input.phone)
        .bind(buyer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update buyer: {}", e)))?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Buyer {} not found", buyer_id)))
    }

    #[instrument(skip(self), fields(buyer_id = %buyer_id))]
    pub async fn delete_buyer(&self, buyer_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM buyers WHERE buyer_id = $1")
            .bind(buyer_id)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                    AppError::Conflict(anyhow::anyhow!(
                        "Buyer {} has recorded transactions",
                        buyer_id
                    ))
                }
                _ => AppError::DatabaseError(anyhow::anyhow!("Failed to delete buyer: {}", e)),
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Buyer {} not found",
                buyer_id
            )));
        }
        Ok(())
    }

    // ---- Catalogs ----

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_chicken_type(
        &self,
        input: &CreateChickenType,
    ) -> Result<ChickenType, AppError> {
        sqlx::query_as::<_, ChickenType>(
            r#"
            INSERT INTO chicken_types (chicken_type_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING chicken_type_id, name, description
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "Chicken type {} already exists",
                    input.name
                ))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create chicken type: {}", e)),
        })
    }

    pub async fn list_chicken_types(&self) -> Result<Vec<ChickenType>, AppError> {
        sqlx::query_as::<_, ChickenType>(
            "SELECT chicken_type_id, name, description FROM chicken_types ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list chicken types: {}", e))
        })
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_cost_category(
        &self,
        input: &CreateCostCategory,
    ) -> Result<CostCategory, AppError> {
        sqlx::query_as::<_, CostCategory>(
            r#"
            INSERT INTO cost_categories (cost_category_id, name, is_vehicle_cost, description)
            VALUES ($1, $2, $3, $4)
            RETURNING cost_category_id, name, description, is_vehicle_cost
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(input.is_vehicle_cost)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "Cost category {} already exists",
                    input.name
                ))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create cost category: {}", e)),
        })
    }

    pub async fn list_cost_categories(&self) -> Result<Vec<CostCategory>, AppError> {
        sqlx::query_as::<_, CostCategory>(
            "SELECT cost_category_id, name, description, is_vehicle_cost FROM cost_categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list cost categories: {}", e))
        })
    }
}
