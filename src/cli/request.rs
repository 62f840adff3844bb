use anyhow::{Context as _, bail};
use indexmap::IndexMap;
use serde_json::Value;
use sisense::{Body, Query, QueryValue, Shape};

use crate::cli::{
    Cli, KeyValue, Output,
    color::{CliExamples, status_style},
};

#[derive(Debug, clap::Args)]
#[command(after_long_help = CliExamples(r#"
  # List users with their groups and role
  sisense request GET /api/v1/users -q expand=groups,role

  # Create a group
  sisense request POST /api/v1/groups -d '{"name": "Finance"}'
"#))]
pub(crate) struct RequestArgs {
    /// HTTP method: GET, POST, PUT, PATCH or DELETE
    pub method: String,
    /// Path relative to the deployment, e.g. /api/v1/users
    pub path: String,
    /// Query parameter; repeat a key to send a list
    #[arg(short, long = "query", value_name = "KEY=VALUE")]
    pub query: Vec<KeyValue>,
    /// JSON payload
    #[arg(short, long = "data", value_name = "JSON")]
    pub data: Option<String>,
}

pub(crate) fn handle(cli: &Cli, args: RequestArgs) -> anyhow::Result<()> {
    let RequestArgs {
        method,
        path,
        query,
        data,
    } = args;

    let query = build_query(query);
    let data: Option<Value> = data
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .context("Invalid JSON payload")?;

    let resp = cli.client.dispatch(
        &method,
        &path,
        (!query.is_empty()).then_some(&query),
        data.as_ref(),
    )?;

    let style = status_style(resp.status);
    anstream::eprintln!("{style}{}{style:#}", resp.status);

    match &resp.body {
        Body::Json(value) if resp.is_success() => match cli.global.output.unwrap_or_default() {
            // Not everything the API returns is tabular.
            Output::Tty if cli.global.csv.is_none() && !is_tabular(value) => {
                println!("{}", serde_json::to_string_pretty(value)?);
            }
            _ => cli.emit(value)?,
        },
        Body::Json(value) => eprintln!("{}", serde_json::to_string_pretty(value)?),
        Body::Text(text) if !text.is_empty() => println!("{text}"),
        Body::Text(_) => (),
    }

    if !resp.is_success() {
        bail!("Request failed with status {}", resp.status);
    }

    Ok(())
}

fn is_tabular(value: &Value) -> bool {
    !matches!(Shape::of(value), Shape::Mixed | Shape::Unsupported)
}

fn build_query(pairs: Vec<KeyValue>) -> Query {
    let mut grouped: IndexMap<String, Vec<String>> = IndexMap::new();
    for (key, value) in pairs.into_iter().map(KeyValue::into_strings) {
        grouped.entry(key).or_default().push(value);
    }

    grouped
        .into_iter()
        .map(|(key, mut values)| {
            let value = if values.len() == 1 {
                QueryValue::One(values.remove(0))
            } else {
                QueryValue::Many(values)
            };
            (key, value)
        })
        .collect()
}
