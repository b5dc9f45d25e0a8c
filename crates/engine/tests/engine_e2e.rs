//! End-to-end engine behavior over the in-memory repositories.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use stockwise_core::domain::order::{Order, OrderId, OrderItem, OrderStatus};
use stockwise_core::domain::product::{Product, ProductId};
use stockwise_core::domain::store::StoreContext;
use stockwise_core::scenarios::ScenarioOutcome;
use stockwise_core::RiskLevel;
use stockwise_db::{
    InMemoryOrderRepository, InMemoryProductRepository, OrderRepository, ProductRepository,
};
use stockwise_engine::{
    ApplyMode, PlannedAction, ReportAggregator, ReportOutput, SimulationEngine,
    SimulationRunResult, StatsReader,
};

fn product(id: &str, category: &str, quantity: i64, reorder_level: i64) -> Product {
    Product {
        id: ProductId(id.to_string()),
        name: id.to_string(),
        sku: format!("SKU-{id}"),
        category: category.to_string(),
        quantity,
        price: Decimal::from(100),
        cost_price: Decimal::from(60),
        supplier_id: 1,
        reorder_level,
        expiry_date: None,
        last_updated: Utc::now(),
    }
}

fn essentials_product() -> Product {
    product("prod-soap", "Essentials", 8, 15)
}

async fn engine_for(
    products: Vec<Product>,
) -> (SimulationEngine, Arc<InMemoryProductRepository>, Arc<InMemoryOrderRepository>) {
    let product_repo = Arc::new(InMemoryProductRepository::with_products(products).await);
    let order_repo = Arc::new(InMemoryOrderRepository::default());
    let engine = SimulationEngine::new(
        product_repo.clone(),
        order_repo.clone(),
        StoreContext::default(),
    )
    .with_sales_rng_seed(11);
    (engine, product_repo, order_repo)
}

#[tokio::test]
async fn unknown_scenario_tag_returns_a_structured_error() {
    let (engine, _, _) = engine_for(vec![essentials_product()]).await;

    let result = engine.run_simulation("weather", ApplyMode::DryRun).await;
    assert_eq!(
        result,
        SimulationRunResult::Error { message: "Unknown simulation type".to_string() }
    );
}

#[tokio::test]
async fn reordering_reports_zero_days_and_positive_eoq_for_the_fixture_product() {
    let (engine, _, _) = engine_for(vec![essentials_product()]).await;

    let result = engine.run_simulation("reordering", ApplyMode::DryRun).await;
    let SimulationRunResult::Completed(run) = result else {
        panic!("reordering must complete");
    };
    let ScenarioOutcome::Reordering(analysis) = &run.outcome else {
        panic!("wrong outcome variant");
    };

    let row = &analysis.products[0];
    assert_eq!(row.days_until_reorder, 0);
    assert!(row.eoq > 0);
    // Dry run plans but does not touch state.
    assert_eq!(run.planned.len(), 1);
    assert!(run.adjustments.applied.is_empty());
}

#[tokio::test]
async fn stockout_uses_the_demand_floor_for_the_fixture_product() {
    let (engine, _, _) = engine_for(vec![essentials_product()]).await;

    let result = engine.run_simulation("stockout", ApplyMode::DryRun).await;
    let SimulationRunResult::Completed(run) = result else {
        panic!("stockout must complete");
    };
    let ScenarioOutcome::Stockout(analysis) = &run.outcome else {
        panic!("wrong outcome variant");
    };

    let row = &analysis.products[0];
    assert_eq!(row.daily_sales_avg, 1);
    assert_eq!(row.days_until_stockout, 8);
    assert_eq!(row.risk_level, RiskLevel::Medium);
}

#[tokio::test]
async fn committed_reordering_run_raises_stock_by_eoq() {
    let (engine, product_repo, _) = engine_for(vec![essentials_product()]).await;

    let result = engine.run_simulation("reordering", ApplyMode::Commit).await;
    let SimulationRunResult::Completed(run) = result else {
        panic!("reordering must complete");
    };

    assert_eq!(run.adjustments.applied.len(), 1);
    assert!(run.adjustments.is_complete());
    let PlannedAction::AdjustQuantity { delta } = run.adjustments.applied[0].action.clone() else {
        panic!("expected a quantity adjustment");
    };

    let after = product_repo
        .find_by_id(&ProductId("prod-soap".to_string()))
        .await
        .expect("find")
        .expect("present");
    assert_eq!(after.quantity, 8 + delta);
}

#[tokio::test]
async fn seeded_sales_runs_are_reproducible() {
    let catalog = vec![product("prod-rice", "Staples", 240, 20)];
    let (engine_a, _, _) = engine_for(catalog.clone()).await;
    let (engine_b, _, _) = engine_for(catalog).await;

    let run_a = engine_a.run_simulation("sales", ApplyMode::DryRun).await;
    let run_b = engine_b.run_simulation("sales", ApplyMode::DryRun).await;

    let (SimulationRunResult::Completed(a), SimulationRunResult::Completed(b)) = (run_a, run_b)
    else {
        panic!("sales must complete");
    };
    assert_eq!(a.outcome, b.outcome);
}

#[tokio::test]
async fn sales_report_generation_is_idempotent() {
    let product_repo = Arc::new(
        InMemoryProductRepository::with_products(vec![product("prod-rice", "Staples", 240, 20)])
            .await,
    );
    let order_repo = Arc::new(InMemoryOrderRepository::default());
    let order = Order {
        id: OrderId("o1".to_string()),
        counterparty: "Cafe".to_string(),
        order_date: Utc::now() - Duration::days(2),
        status: OrderStatus::Completed,
        total_amount: Decimal::from(500),
    };
    let item = OrderItem {
        order_id: OrderId("o1".to_string()),
        product_id: ProductId("prod-rice".to_string()),
        quantity: 5,
        unit_price: Decimal::from(100),
    };
    order_repo.record_order(order, vec![item]).await.expect("record");

    let aggregator = ReportAggregator::new(product_repo, order_repo);
    let first = aggregator.generate_report("sales", "daily").await;
    let second = aggregator.generate_report("sales", "daily").await;

    assert_eq!(first, second);
    let ReportOutput::Series(series) = first else {
        panic!("sales report must be a series");
    };
    assert_eq!(series.labels.len(), 30);
    assert_eq!(series.datasets.len(), 1);
    let total: f64 = series.datasets[0].data.iter().sum();
    assert!((total - 500.0).abs() < 1e-9);
}

#[tokio::test]
async fn expiry_report_warns_when_no_product_carries_an_expiry_date() {
    let product_repo = Arc::new(
        InMemoryProductRepository::with_products(vec![essentials_product()]).await,
    );
    let order_repo = Arc::new(InMemoryOrderRepository::default());
    let aggregator = ReportAggregator::new(product_repo, order_repo);

    let output = aggregator.generate_report("expiry", "daily").await;
    assert!(matches!(output, ReportOutput::Warning { .. }));
}

#[tokio::test]
async fn unknown_report_inputs_return_structured_errors() {
    let product_repo = Arc::new(InMemoryProductRepository::default());
    let order_repo = Arc::new(InMemoryOrderRepository::default());
    let aggregator = ReportAggregator::new(product_repo, order_repo);

    let bad_kind = aggregator.generate_report("velocity", "daily").await;
    assert!(matches!(bad_kind, ReportOutput::Error { .. }));

    let bad_period = aggregator.generate_report("sales", "hourly").await;
    assert!(matches!(bad_period, ReportOutput::Error { .. }));
}

#[tokio::test]
async fn inventory_stats_cover_the_seeded_catalog() {
    let product_repo = Arc::new(
        InMemoryProductRepository::with_products(vec![
            essentials_product(),
            product("prod-rice", "Staples", 120, 20),
        ])
        .await,
    );
    let order_repo = Arc::new(InMemoryOrderRepository::default());

    let stats = StatsReader::new(product_repo, order_repo)
        .inventory_stats()
        .await
        .expect("stats");
    assert_eq!(stats.total_items, 2);
    assert_eq!(stats.low_stock_count, 1);
    assert_eq!(stats.inventory_value, Decimal::from(8 * 60 + 120 * 60));
    assert!((stats.turnover_rate - 0.1).abs() < 1e-9);
}
