use stockwise_db::{migrations, DemoSeedDataset};

use crate::commands::{with_connection, CommandResult};

pub fn run() -> CommandResult {
    let result = with_connection("seed", |_config, pool| async move {
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let seed_result = DemoSeedDataset::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

        let verification = DemoSeedDataset::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;

        if !verification.all_present {
            let failed_checks = verification
                .checks
                .iter()
                .filter_map(|(check, passed)| (!passed).then_some(*check))
                .collect::<Vec<_>>();
            let message = if failed_checks.is_empty() {
                "Some seed data failed to load".to_string()
            } else {
                format!("Seed verification failed for checks: {}", failed_checks.join(", "))
            };
            return Err(("seed_verification", message, 6u8));
        }

        Ok(seed_result)
    });

    match result {
        Ok(seed_result) => {
            let product_lines: Vec<String> = seed_result
                .products_seeded
                .iter()
                .map(|product| format!("  - {} ({}): {}", product.id, product.category, product.name))
                .collect();
            let message = format!(
                "Demo inventory loaded: {} products with order history\n{}",
                seed_result.products_seeded.len(),
                product_lines.join("\n")
            );
            CommandResult::success("seed", message)
        }
        Err(failure) => failure,
    }
}
