//! Basic query builder usage against a running PostgREST instance.
//!
//! Run with: cargo run --example query_basics -p postgrest-client
//!
//! Reads `POSTGREST_URL` (default http://127.0.0.1:3000), and optionally
//! `POSTGREST_SCHEMA` and `POSTGREST_API_KEY`.

use serde_json::json;
use postgrest_client::prelude::*;

const DEFAULT_URL: &str = "http://127.0.0.1:3000";

fn create_client() -> PostgrestResult<PostgrestClient> {
    let config = match PostgrestConfig::from_env() {
        Ok(config) => config,
        Err(_) => PostgrestConfig::new(DEFAULT_URL),
    };
    PostgrestClient::new(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = create_client()?;

    // ── SELECT with filters ──
    println!("=== Cities with population > 1,000,000 ===");
    let resp = client
        .from("cities")
        .select("name, population")
        .gt("population", 1_000_000_i64)
        .order("population", OrderOptions::desc())
        .execute()
        .await?;
    if let Some(rows) = resp.into_result()? {
        println!("  {rows}");
    }

    // ── SELECT with range and count ──
    println!("\n=== Second page of cities ===");
    let resp = client
        .from("cities")
        .select_with(
            "name",
            SelectOptions {
                head: false,
                count: Some(CountOption::Exact),
            },
        )
        .order("name", OrderOptions::asc())
        .range(2, 3)
        .await?;
    println!("  total: {:?}, page: {:?}", resp.count, resp.data);

    // ── maybe_single: zero rows is not an error ──
    println!("\n=== Lookup that may miss ===");
    let resp = client
        .from("cities")
        .select("*")
        .eq("name", "Atlantis")
        .maybe_single()
        .await?;
    println!("  status {} {}, data: {:?}", resp.status, resp.status_text, resp.data);

    // ── INSERT and return the new row ──
    println!("\n=== Insert a country ===");
    let resp = client
        .from("countries")
        .insert(&json!({"name": "Iceland", "code": "IS"}), InsertOptions::default())?
        .select_columns("id, name")
        .rollback()
        .await?;
    println!("  status {}, data: {:?}", resp.status, resp.data);

    // ── RPC ──
    println!("\n=== RPC add_numbers(2, 3) ===");
    let resp = client
        .rpc("add_numbers", json!({"a": 2, "b": 3}), RpcOptions::default())?
        .await?;
    match resp.error {
        Some(err) => println!("  error: {err}"),
        None => println!("  result: {:?}", resp.data),
    }

    // ── throw_on_error turns server errors into Err ──
    println!("\n=== Unknown table with throw_on_error ===");
    match client.from("no_such_table").select("*").throw_on_error().await {
        Ok(resp) => println!("  unexpected success: {}", resp.status),
        Err(err) => println!("  error code {:?}: {err}", err.code()),
    }

    Ok(())
}
