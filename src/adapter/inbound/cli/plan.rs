//! Plan and execute a fulfillment from the command line.

use serde_json::json;
use tabled::{Table, Tabled};
use tracing::info;

use crate::adapter::inbound::cli::command::PlanArgs;
use crate::adapter::inbound::cli::output;
use crate::application::{Action, ApprovalKind, FulfillRequest, Plan};
use crate::domain::{DomainTag, Order};
use crate::error::Result;
use crate::infrastructure::bootstrap::build_planner;
use crate::infrastructure::config::Config;

#[derive(Tabled)]
struct ActionRow {
    #[tabled(rename = "#")]
    step: usize,
    #[tabled(rename = "Action")]
    action: &'static str,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Operator")]
    operator: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl ActionRow {
    fn new(step: usize, action: &Action) -> Self {
        match action {
            Action::Approval(approval) => Self {
                step,
                action: action.label(),
                target: approval.token().to_string(),
                operator: approval.operator().to_string(),
                detail: match approval.kind() {
                    ApprovalKind::Allowance { amount } => format!("allowance {amount}"),
                    ApprovalKind::Operator => format!("{} collection", approval.item_type()),
                },
            },
            Action::Exchange(exchange) => {
                let call = exchange.call();
                Self {
                    step,
                    action: action.label(),
                    target: call.settlement.to_string(),
                    operator: "-".to_string(),
                    detail: format!("{} {} value {}", call.strategy, call.fraction, call.value),
                }
            }
        }
    }
}

/// Read a signed order from a JSON file.
fn read_order(path: &std::path::Path) -> Result<Order> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn action_json(action: &Action) -> serde_json::Value {
    match action {
        Action::Approval(approval) => {
            let amount = match approval.kind() {
                ApprovalKind::Allowance { amount } => Some(amount.to_string()),
                ApprovalKind::Operator => None,
            };
            json!({
                "action": action.label(),
                "token": approval.token().to_string(),
                "itemType": approval.item_type().to_string(),
                "operator": approval.operator().to_string(),
                "amount": amount,
            })
        }
        Action::Exchange(exchange) => {
            let call = exchange.call();
            json!({
                "action": action.label(),
                "settlement": call.settlement.to_string(),
                "strategy": call.strategy.to_string(),
                "fraction": call.fraction.to_string(),
                "recipient": call.recipient.to_string(),
                "value": call.value.to_string(),
                "domainTag": call.domain_tag.map(|tag| tag.to_string()),
            })
        }
    }
}

fn render(order: &Order, plan: &Plan) {
    if output::is_json() {
        output::json_output(json!({
            "command": "plan",
            "order": order.hash.to_string(),
            "strategy": plan.strategy().to_string(),
            "actions": plan.actions().iter().map(action_json).collect::<Vec<_>>(),
        }));
        return;
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::section("Order");
    output::field("Hash", order.hash);
    output::field("Offerer", order.offerer);
    output::field("Type", order.order_type);

    output::section("Plan");
    let call = plan.exchange().call();
    output::field("Strategy", plan.strategy());
    output::field("Fraction", call.fraction);
    output::field("Value", call.value);
    if let Some(tag) = call.domain_tag {
        output::field("Tag", tag);
    }

    let rows: Vec<ActionRow> = plan
        .actions()
        .iter()
        .enumerate()
        .map(|(index, action)| ActionRow::new(index + 1, action))
        .collect();
    output::lines(&Table::new(rows).to_string());
}

/// Plan the fulfillment described by `args`, submitting it with `--execute`.
///
/// # Errors
///
/// Returns an error if the configuration or order cannot be loaded, planning
/// fails validation, or a submitted action fails.
pub async fn execute(args: PlanArgs) -> Result<()> {
    let order = read_order(&args.order)?;
    let config = Config::load(&args.config)?;
    config.init_logging();

    let planner = build_planner(&config)?;
    let account = planner.submitter().account();

    let mut request = FulfillRequest::new(order.clone(), account);
    if let Some(units) = args.units {
        request = request.units(units);
    }
    if let Some(domain) = args.domain.as_deref() {
        request = request.domain_tag(DomainTag::from_domain(domain));
    }
    if let Some(recipient) = args.recipient {
        request = request.recipient(recipient);
    }
    if let Some(key) = args.conduit_key {
        request = request.conduit_key(key);
    }
    for tip in args.tips {
        request = request.tip(tip);
    }

    let plan = planner.plan(request).await?;
    render(&order, &plan);

    if !args.execute {
        output::hint("Dry run. Pass --execute to submit every action.");
        return Ok(());
    }

    info!(actions = plan.len(), "Executing plan");
    let receipt = plan.execute_all().await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "plan.execute",
            "txHash": receipt.tx_hash.to_string(),
        }));
    } else {
        output::success(&format!("Order fulfilled in {}", receipt.tx_hash));
    }
    Ok(())
}
