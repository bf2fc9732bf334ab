//! Domain tag derivation.

use serde_json::json;

use crate::adapter::inbound::cli::command::TagArgs;
use crate::adapter::inbound::cli::output;
use crate::domain::DomainTag;
use crate::error::Result;

/// Print the tag a domain contributes to settlement calldata.
pub fn execute(args: &TagArgs) -> Result<()> {
    let tag = DomainTag::from_domain(args.domain.trim());

    if output::is_json() {
        output::json_output(json!({
            "command": "tag",
            "domain": args.domain,
            "tag": tag.to_string(),
        }));
        return Ok(());
    }

    // Bare value so the output pipes cleanly into other tools.
    println!("{tag}");
    Ok(())
}
