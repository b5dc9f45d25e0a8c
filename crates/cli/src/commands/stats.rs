use stockwise_engine::StatsReader;

use crate::commands::{repositories, with_connection, CommandResult};

pub fn run() -> CommandResult {
    let result = with_connection("stats", |_config, pool| async move {
        let (products, orders) = repositories(&pool);
        StatsReader::new(products, orders)
            .inventory_stats()
            .await
            .map_err(|error| ("stats", error.to_string(), 5u8))
    });

    match result {
        Ok(stats) => match serde_json::to_string(&stats) {
            Ok(payload) => CommandResult::success("stats", payload),
            Err(error) => CommandResult::failure("stats", "serialization", error.to_string(), 5),
        },
        Err(failure) => failure,
    }
}
