use stockwise_engine::{ReportAggregator, ReportOutput};

use crate::commands::{repositories, with_connection, CommandResult};

pub fn run(report: &str, period: &str) -> CommandResult {
    let report = report.to_string();
    let period = period.to_string();
    let result = with_connection("report", |_config, pool| async move {
        let (products, orders) = repositories(&pool);
        let aggregator = ReportAggregator::new(products, orders);
        match aggregator.generate_report(&report, &period).await {
            ReportOutput::Error { message } => Err(("report", message, 5u8)),
            output => Ok(output),
        }
    });

    match result {
        Ok(ReportOutput::Warning { message }) => CommandResult::success("report", message),
        Ok(output) => match serde_json::to_string(&output) {
            Ok(payload) => CommandResult::success("report", payload),
            Err(error) => CommandResult::failure("report", "serialization", error.to_string(), 5),
        },
        Err(failure) => failure,
    }
}
