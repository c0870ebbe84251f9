//! Guidance prompts served over `prompts/list` and `prompts/get`.
//!
//! One prompt per tool. Each explains which arguments the tool takes and
//! shows an example call; a few accept an optional argument that is
//! substituted into the example.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::safety::TEST_IDENTIFIER_PREFIX;

const TESTNET_NOTE: &str = "Only the 'Preprod' network is accepted; Mainnet requests are \
                            rejected before anything is sent.";

const PAGING_ARGS: &str = "Optional parameters:\n\
     - `limit`: number of records (1-100, default 10)\n\
     - `cursor_id`: pagination cursor from a previous page\n\
     - `smart_contract_address`: filter by contract address\n\
     - `include_history`: include status history (default false)\n\n";

#[derive(Debug, Clone, Serialize)]
pub struct PromptArgument {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Prompt {
    pub name: &'static str,
    pub description: &'static str,
    pub arguments: Vec<PromptArgument>,
}

fn optional(name: &'static str, description: &'static str) -> PromptArgument {
    PromptArgument {
        name,
        description,
        required: false,
    }
}

/// The prompt catalog, in a stable order.
pub fn prompt_catalog() -> Vec<Prompt> {
    let prompt = |name, description, arguments| Prompt {
        name,
        description,
        arguments,
    };
    vec![
        prompt(
            "prompt_list_agents",
            "How to list available Masumi agents",
            vec![],
        ),
        prompt(
            "prompt_get_agent_input_schema",
            "How to retrieve an agent's input schema",
            vec![optional("agent_identifier", "Agent to look up")],
        ),
        prompt(
            "prompt_hire_agent",
            "How to hire an agent (start a job and pay for it)",
            vec![optional("agent_identifier", "Agent to hire")],
        ),
        prompt(
            "prompt_check_job_status",
            "How to check the status of a job",
            vec![optional("job_id", "Job returned by hire_agent")],
        ),
        prompt(
            "prompt_get_job_full_result",
            "How to retrieve a job's complete result",
            vec![optional("job_id", "Job returned by hire_agent")],
        ),
        prompt(
            "prompt_query_payments",
            "How to query payments from the payment service",
            vec![],
        ),
        prompt(
            "prompt_get_purchase_history",
            "How to retrieve purchase history",
            vec![],
        ),
        prompt(
            "prompt_query_registry",
            "How to browse the agent registry",
            vec![optional("network", "Network to query (Preprod)")],
        ),
        prompt(
            "prompt_register_agent",
            "How to register a test agent",
            vec![],
        ),
        prompt(
            "prompt_unregister_agent",
            "How to unregister a test agent",
            vec![optional("agent_identifier", "Agent to remove")],
        ),
        prompt(
            "prompt_get_agents_by_wallet",
            "How to find the agents registered to a wallet",
            vec![optional("wallet_vkey", "Wallet verification key")],
        ),
    ]
}

/// Render a prompt's text, or `None` for an unknown name.
///
/// Empty or non-string argument values are treated as absent.
pub fn render_prompt(name: &str, arguments: &Map<String, Value>) -> Option<String> {
    let arg = |key: &str| {
        arguments
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    };

    let text = match name {
        "prompt_list_agents" => "To see the available Masumi agents, call `list_agents`. Keep \
             the `agentIdentifier` and `apiBaseUrl` of the agents you are interested in; the \
             other tools need both."
            .to_string(),
        "prompt_get_agent_input_schema" => match arg("agent_identifier") {
            Some(agent) => format!(
                "To see the inputs agent `{agent}` expects, call `get_agent_input_schema` with \
                 its `api_base_url` as well.\n\n\
                 Once you have the schema, provide the exact input values you want to use.\n\n\
                 Example: `get_agent_input_schema(agent_identifier='{agent}', api_base_url='URL')`"
            ),
            None => "After `list_agents`, call `get_agent_input_schema` with `agent_identifier` \
                 and `api_base_url` to see the inputs an agent requires.\n\n\
                 You will need to provide concrete values for those inputs before the agent \
                 can be hired.\n\n\
                 Example: `get_agent_input_schema(agent_identifier='ID', api_base_url='URL')`"
                .to_string(),
        },
        "prompt_hire_agent" => match arg("agent_identifier") {
            Some(agent) => format!(
                "To hire agent `{agent}`:\n\
                 1. Check its required inputs with `get_agent_input_schema`\n\
                 2. Tell me the exact value for each required field\n\
                 3. I will call `hire_agent` with those values\n\n\
                 Hiring spends funds, so nothing is started until you provide the inputs \
                 yourself.\n\n\
                 Example: `hire_agent(agent_identifier='{agent}', api_base_url='URL', \
                 input_data={{\"param\": \"your-value\"}})`"
            ),
            None => "To hire an agent, call `hire_agent` with:\n\
                 1. `agent_identifier` (from `list_agents`)\n\
                 2. `api_base_url` (from `list_agents`)\n\
                 3. `input_data`: an object matching the agent's input schema\n\n\
                 Hiring spends funds. Input values must come from you; after reviewing the \
                 schema from `get_agent_input_schema`, say which value to use for each \
                 required field.\n\n\
                 Workflow:\n\
                 1. `list_agents`\n\
                 2. `get_agent_input_schema`\n\
                 3. Provide the input values\n\
                 4. `hire_agent`\n\n\
                 Example: `hire_agent(agent_identifier='ID', api_base_url='URL', \
                 input_data={\"text\": \"Research topic...\"})`"
                .to_string(),
        },
        "prompt_check_job_status" => match arg("job_id") {
            Some(job) => format!(
                "To check job `{job}`, call `check_job_status` with the agent's \
                 `agent_identifier` and `api_base_url`.\n\n\
                 Example: `check_job_status(agent_identifier='ID', api_base_url='URL', \
                 job_id='{job}')`"
            ),
            None => "To check a job, call `check_job_status` with:\n\
                 1. `agent_identifier`\n\
                 2. `api_base_url`\n\
                 3. `job_id` (from `hire_agent`)\n\n\
                 Example: `check_job_status(agent_identifier='ID', api_base_url='URL', \
                 job_id='JOB_ID')`"
                .to_string(),
        },
        "prompt_get_job_full_result" => match arg("job_id") {
            Some(job) => format!(
                "To get the complete result of job `{job}`, call `get_job_full_result` with \
                 the agent's `agent_identifier` and `api_base_url`.\n\n\
                 Example: `get_job_full_result(agent_identifier='ID', api_base_url='URL', \
                 job_id='{job}')`"
            ),
            None => "`get_job_full_result` returns a job's result without truncation. Use it \
                 when `check_job_status` only showed a preview. Provide:\n\
                 1. `agent_identifier`\n\
                 2. `api_base_url`\n\
                 3. `job_id` (from `hire_agent`)\n\n\
                 Example: `get_job_full_result(agent_identifier='ID', api_base_url='URL', \
                 job_id='JOB_ID')`"
                .to_string(),
        },
        "prompt_query_payments" => format!(
            "`query_payments` lists payments recorded by the Masumi Payment Service.\n\n\
             Required parameters:\n\
             - `network`: 'Preprod'\n\n\
             {PAGING_ARGS}\
             Example: `query_payments(network='Preprod', limit=5, include_history=True)`\n\n\
             {TESTNET_NOTE}"
        ),
        "prompt_get_purchase_history" => format!(
            "`get_purchase_history` lists past purchases and their current state.\n\n\
             Required parameters:\n\
             - `network`: 'Preprod'\n\n\
             {PAGING_ARGS}\
             Example: `get_purchase_history(network='Preprod', limit=20)`\n\n\
             The response includes the raw purchase records and a per-purchase summary.\n\n\
             {TESTNET_NOTE}"
        ),
        "prompt_query_registry" => {
            let network = arg("network").unwrap_or("Preprod");
            format!(
                "`query_registry` browses every agent registered on the Masumi network, with \
                 capabilities and pricing.\n\n\
                 Required parameters:\n\
                 - `network`: 'Preprod'\n\n\
                 Optional parameters:\n\
                 - `cursor_id`: pagination cursor from a previous page\n\
                 - `smart_contract_address`: filter by contract address\n\n\
                 Example: `query_registry(network='{network}')`\n\n\
                 {TESTNET_NOTE}"
            )
        }
        "prompt_register_agent" => format!(
            "`register_agent` publishes an agent to the Masumi registry.\n\n\
             Required parameters:\n\
             - `network`: 'Preprod'\n\
             - `name`: must start with '{TEST_IDENTIFIER_PREFIX}'\n\
             - `api_base_url`: the agent's http:// or https:// endpoint\n\
             - `selling_wallet_vkey`: wallet verification key that receives payments\n\
             - `capability_name` and `capability_version`, e.g. 'Content Writing' and '1.0.0'\n\
             - `base_price`: price in lovelace (1000000 = 1 ADA)\n\n\
             Optional parameters: `tags`, `description`, `author`, `legal_info`.\n\n\
             Example: `register_agent(network='Preprod', name='{TEST_IDENTIFIER_PREFIX}writer-001', \
             api_base_url='https://my-agent.example/', selling_wallet_vkey='vkey...', \
             capability_name='Content Writing', capability_version='1.0.0', base_price=1000000)`\n\n\
             Only names with the '{TEST_IDENTIFIER_PREFIX}' prefix can be registered."
        ),
        "prompt_unregister_agent" => {
            let agent = arg("agent_identifier")
                .map(str::to_string)
                .unwrap_or_else(|| format!("{TEST_IDENTIFIER_PREFIX}writer-001"));
            format!(
                "`unregister_agent` removes an agent from the Masumi registry.\n\n\
                 Required parameters:\n\
                 - `agent_identifier`: must start with '{TEST_IDENTIFIER_PREFIX}'\n\
                 - `network`: 'Preprod'\n\n\
                 Optional parameters:\n\
                 - `smart_contract_address`\n\n\
                 Example: `unregister_agent(agent_identifier='{agent}', network='Preprod')`\n\n\
                 Only identifiers with the '{TEST_IDENTIFIER_PREFIX}' prefix can be removed."
            )
        }
        "prompt_get_agents_by_wallet" => {
            let vkey = arg("wallet_vkey").unwrap_or("vkey_test_writer_123...");
            format!(
                "`get_agents_by_wallet` lists the agents registered under one wallet.\n\n\
                 Required parameters:\n\
                 - `network`: 'Preprod'\n\
                 - `wallet_vkey`: the wallet verification key\n\n\
                 Example: `get_agents_by_wallet(network='Preprod', wallet_vkey='{vkey}')`\n\n\
                 A wallet with no agents returns an empty list rather than an error.\n\n\
                 {TESTNET_NOTE}"
            )
        }
        _ => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn every_catalog_entry_renders() {
        let empty = Map::new();
        let catalog = prompt_catalog();
        assert_eq!(catalog.len(), 11);
        for prompt in catalog {
            let text = render_prompt(prompt.name, &empty).unwrap();
            assert!(!text.is_empty(), "{} rendered empty", prompt.name);
        }
    }

    #[test]
    fn argument_is_substituted() {
        let mut args = Map::new();
        args.insert("job_id".into(), json!("job-42"));
        let text = render_prompt("prompt_check_job_status", &args).unwrap();
        assert!(text.contains("job_id='job-42'"));
    }

    #[test]
    fn empty_argument_falls_back_to_general_text() {
        let mut args = Map::new();
        args.insert("agent_identifier".into(), json!(""));
        let text = render_prompt("prompt_hire_agent", &args).unwrap();
        assert!(text.starts_with("To hire an agent, call `hire_agent`"));
    }

    #[test]
    fn unknown_prompt() {
        assert!(render_prompt("prompt_nope", &Map::new()).is_none());
    }
}
